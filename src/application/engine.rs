use crate::domain::account::{Account, AccountId, Amount, Balance};
use crate::domain::generator::{CardFormat, NumberGenerator};
use crate::domain::ports::AccountStoreBox;
use crate::error::{BankError, Result};
use tracing::{info, warn};

/// How many card numbers are drawn before giving up on finding a free one.
pub const DEFAULT_GENERATION_ATTEMPTS: usize = 100;

/// Outcome of a successful transfer: both accounts as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub sender: Account,
    pub receiver: Account,
    pub amount: Amount,
}

/// The main entry point for every banking operation.
///
/// `BankEngine` owns the account store and the number generator. Every
/// operation re-reads the accounts it touches from the store, so callers may
/// hold on to stale copies without risk.
pub struct BankEngine {
    store: AccountStoreBox,
    generator: NumberGenerator,
    max_attempts: usize,
}

impl BankEngine {
    /// Creates a new `BankEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `store` - The store for accounts.
    /// * `generator` - Issues card numbers and PINs for new accounts.
    pub fn new(store: AccountStoreBox, generator: NumberGenerator) -> Self {
        Self {
            store,
            generator,
            max_attempts: DEFAULT_GENERATION_ATTEMPTS,
        }
    }

    pub fn with_generation_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn format(&self) -> &CardFormat {
        self.generator.format()
    }

    /// Issues a new card and persists it with a zero balance.
    ///
    /// Numbers already in use are redrawn, up to the configured number of
    /// attempts, after which `GenerationExhausted` is returned.
    pub async fn open_account(&self) -> Result<Account> {
        for attempt in 1..=self.max_attempts {
            let mut account = Account::open(&self.generator, &mut rand::thread_rng());

            if self.store.get_by_number(&account.number).await?.is_some() {
                warn!(attempt, "generated card number is already issued");
                continue;
            }

            match self.store.create(&account).await {
                Ok(id) => {
                    account.id = Some(id);
                    info!(id, "account opened");
                    return Ok(account);
                }
                // Lost a race with another writer for the same number.
                Err(BankError::DuplicateNumber(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(BankError::GenerationExhausted(self.max_attempts))
    }

    /// Authenticates a card number and PIN pair.
    ///
    /// Unknown numbers and wrong PINs are indistinguishable to the caller.
    pub async fn log_in(&self, number: &str, pin: &str) -> Result<Account> {
        match self.store.get_by_number(number).await? {
            Some(account) if account.verify_pin(pin) => {
                info!(id = account.id, "logged in");
                Ok(account)
            }
            _ => Err(BankError::InvalidCredentials),
        }
    }

    /// Fetches the current state of an account.
    pub async fn account(&self, id: AccountId) -> Result<Account> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(BankError::AccountNotFound(id))
    }

    pub async fn balance(&self, id: AccountId) -> Result<Balance> {
        Ok(self.account(id).await?.balance)
    }

    /// Deposits `amount`, given as raw user input, into the account.
    pub async fn add_income(&self, id: AccountId, amount: &str) -> Result<Account> {
        let amount = Amount::parse(amount)?;
        let mut account = self.account(id).await?;
        account.deposit(amount)?;
        self.store.update(&account).await?;
        info!(id, amount = amount.value(), "income added");
        Ok(account)
    }

    /// Checks that `receiver_number` can receive money from `sender`.
    ///
    /// In order: the number must be well formed and pass Luhn, differ from
    /// the sender's own number, and belong to a stored account.
    pub async fn check_receiver(&self, sender: &Account, receiver_number: &str) -> Result<Account> {
        if !self.generator.format().accepts(receiver_number) {
            return Err(BankError::InvalidNumberFormat);
        }
        if receiver_number == sender.number {
            return Err(BankError::SelfTransferRejected);
        }
        self.store
            .get_by_number(receiver_number)
            .await?
            .ok_or(BankError::ReceiverNotFound)
    }

    /// Moves `amount`, given as raw user input, from `sender` to the account
    /// numbered `receiver_number`.
    ///
    /// Nothing is written unless every check passes, and the debit and the
    /// credit are persisted as one atomic store operation.
    pub async fn transfer(
        &self,
        sender: &Account,
        receiver_number: &str,
        amount: &str,
    ) -> Result<TransferReceipt> {
        let receiver = self.check_receiver(sender, receiver_number).await?;
        let amount = Amount::parse(amount)?;

        let sender_id = sender
            .id
            .ok_or_else(|| BankError::Internal("sender has not been stored yet".to_string()))?;
        let receiver_id = receiver.id.ok_or(BankError::ReceiverNotFound)?;

        let current = self.account(sender_id).await?;
        if current.balance.value() < amount.value() {
            return Err(BankError::InsufficientFunds {
                available: current.balance.value(),
                requested: amount.value(),
            });
        }

        let (sender, receiver) = self.store.transfer(sender_id, receiver_id, amount).await?;
        info!(
            from = sender_id,
            to = receiver_id,
            amount = amount.value(),
            "transfer executed"
        );
        Ok(TransferReceipt {
            sender,
            receiver,
            amount,
        })
    }

    /// Deletes the account for good. No pending-operation checks are made.
    pub async fn close_account(&self, id: AccountId) -> Result<()> {
        self.account(id).await?;
        self.store.delete(id).await?;
        info!(id, "account closed");
        Ok(())
    }

    /// Every stored account, ordered by id.
    pub async fn accounts(&self) -> Result<Vec<Account>> {
        self.store.all().await
    }
}
