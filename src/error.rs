use thiserror::Error;

/// Every failure the bank can report.
///
/// Domain variants are recoverable: the interactive session prints their
/// message and carries on. Operational variants (I/O, storage, encoding)
/// abort the current operation, see [`BankError::is_operational`].
#[derive(Error, Debug)]
pub enum BankError {
    #[error("Invalid card format: {0}")]
    Configuration(String),

    #[error("Probably you made a mistake in the card number. Please try again!")]
    InvalidNumberFormat,

    #[error("You can't transfer money to the same account!")]
    SelfTransferRejected,

    #[error("Such a card does not exist.")]
    ReceiverNotFound,

    #[error("Amount must be a positive whole number, got '{0}'")]
    InvalidAmount(String),

    #[error("Not enough money!")]
    InsufficientFunds { available: u64, requested: u64 },

    #[error("Wrong card number or PIN!")]
    InvalidCredentials,

    #[error("Could not issue a unique card number after {0} attempts")]
    GenerationExhausted(usize),

    #[error("Card number {0} is already issued")]
    DuplicateNumber(String),

    #[error("Account {0} does not exist")]
    AccountNotFound(u64),

    #[error("Balance of account {0} would overflow")]
    BalanceOverflow(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    Storage(#[from] rocksdb::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BankError {
    /// True for failures of the machinery rather than of the request.
    pub fn is_operational(&self) -> bool {
        match self {
            Self::Io(_) | Self::Serialization(_) | Self::Csv(_) | Self::Internal(_) => true,
            #[cfg(feature = "storage-rocksdb")]
            Self::Storage(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, BankError>;
