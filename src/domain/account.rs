use super::generator::NumberGenerator;
use crate::error::{BankError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the store when an account is first persisted.
pub type AccountId = u64;

/// Money held on an account, in minor units. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(pub u64);

impl Balance {
    pub const ZERO: Self = Self(0);

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A strictly positive amount to move into or between accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(u64);

impl Amount {
    pub fn new(value: u64) -> Result<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(BankError::InvalidAmount(value.to_string()))
        }
    }

    /// Parses raw user input. Only plain ASCII digits are accepted, so signs,
    /// whitespace and decimals are all rejected.
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BankError::InvalidAmount(input.to_string()));
        }
        let value = input
            .parse::<u64>()
            .map_err(|_| BankError::InvalidAmount(input.to_string()))?;
        Self::new(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

/// Persisted shape of an account: `(id, number, pin, balance)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: Option<AccountId>,
    pub number: String,
    pub pin: String,
    pub balance: u64,
}

/// One issued card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// `None` until the store has created the account.
    pub id: Option<AccountId>,
    pub number: String,
    pub pin: String,
    pub balance: Balance,
}

impl Account {
    /// Issues a fresh card: new number, new PIN, empty balance, no id yet.
    pub fn open<R: Rng + ?Sized>(generator: &NumberGenerator, rng: &mut R) -> Self {
        Self {
            id: None,
            number: generator.generate(rng),
            pin: generator.generate_pin(rng),
            balance: Balance::ZERO,
        }
    }

    /// Rebuilds an account from storage, taking every value verbatim.
    pub fn from_record(record: AccountRecord) -> Self {
        Self {
            id: record.id,
            number: record.number,
            pin: record.pin,
            balance: Balance(record.balance),
        }
    }

    pub fn to_record(&self) -> AccountRecord {
        AccountRecord {
            id: self.id,
            number: self.number.clone(),
            pin: self.pin.clone(),
            balance: self.balance.0,
        }
    }

    pub fn verify_pin(&self, pin: &str) -> bool {
        self.pin == pin
    }

    /// Credits `amount`, failing rather than wrapping on overflow.
    pub fn deposit(&mut self, amount: Amount) -> Result<()> {
        self.balance.0 = self
            .balance
            .0
            .checked_add(amount.0)
            .ok_or_else(|| BankError::BalanceOverflow(self.number.clone()))?;
        Ok(())
    }

    /// Debits `amount` if the balance covers it; leaves the account untouched otherwise.
    pub fn withdraw(&mut self, amount: Amount) -> Result<()> {
        if self.balance.0 >= amount.0 {
            self.balance.0 -= amount.0;
            Ok(())
        } else {
            Err(BankError::InsufficientFunds {
                available: self.balance.0,
                requested: amount.0,
            })
        }
    }
}

impl From<AccountRecord> for Account {
    fn from(record: AccountRecord) -> Self {
        Self::from_record(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn account(balance: u64) -> Account {
        Account::from_record(AccountRecord {
            id: Some(1),
            number: "4000003305160034".to_string(),
            pin: "5639".to_string(),
            balance,
        })
    }

    #[test]
    fn test_amount_validation() {
        assert_eq!(Amount::parse("10000").unwrap().value(), 10000);
        assert!(matches!(Amount::parse("0"), Err(BankError::InvalidAmount(_))));
        assert!(matches!(Amount::parse("-5"), Err(BankError::InvalidAmount(_))));
        assert!(matches!(Amount::parse("abc"), Err(BankError::InvalidAmount(_))));
        assert!(matches!(Amount::parse("+5"), Err(BankError::InvalidAmount(_))));
        assert!(matches!(Amount::parse(""), Err(BankError::InvalidAmount(_))));
        assert!(matches!(
            Amount::parse("99999999999999999999999"),
            Err(BankError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_open_is_fresh() {
        let mut rng = StdRng::seed_from_u64(11);
        let account = Account::open(&NumberGenerator::default(), &mut rng);
        assert_eq!(account.id, None);
        assert_eq!(account.balance, Balance::ZERO);
        assert_eq!(account.number.len(), 16);
        assert_eq!(account.pin.len(), 4);
    }

    #[test]
    fn test_rehydration_keeps_zero_balance_and_id() {
        let account = account(0);
        assert_eq!(account.id, Some(1));
        assert_eq!(account.balance, Balance::ZERO);
        assert_eq!(account.number, "4000003305160034");
        assert_eq!(Account::from(account.to_record()), account);
    }

    #[test]
    fn test_deposit() {
        let mut account = account(0);
        account.deposit(Amount::new(10000).unwrap()).unwrap();
        assert_eq!(account.balance, Balance(10000));
    }

    #[test]
    fn test_deposit_overflow() {
        let mut account = account(u64::MAX);
        let result = account.deposit(Amount::new(1).unwrap());
        assert!(matches!(result, Err(BankError::BalanceOverflow(_))));
        assert_eq!(account.balance, Balance(u64::MAX));
    }

    #[test]
    fn test_withdraw_insufficient() {
        let mut account = account(100);
        let result = account.withdraw(Amount::new(101).unwrap());
        assert!(matches!(
            result,
            Err(BankError::InsufficientFunds {
                available: 100,
                requested: 101
            })
        ));
        assert_eq!(account.balance, Balance(100));

        account.withdraw(Amount::new(100).unwrap()).unwrap();
        assert_eq!(account.balance, Balance::ZERO);
    }

    #[test]
    fn test_verify_pin() {
        let account = account(0);
        assert!(account.verify_pin("5639"));
        assert!(!account.verify_pin("0000"));
    }
}
