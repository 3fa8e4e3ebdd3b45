use crate::domain::account::{Account, AccountId, Amount};
use crate::domain::ports::AccountStore;
use crate::error::{BankError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct Ledger {
    accounts: BTreeMap<AccountId, Account>,
    numbers: HashMap<String, AccountId>,
    last_id: AccountId,
}

/// A thread-safe in-memory account store.
///
/// Uses `Arc<RwLock<..>>` so clones share the same ledger. Every mutation
/// happens under the write lock, which makes transfers atomic.
/// Ideal for testing or sessions where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    ledger: Arc<RwLock<Ledger>>,
}

impl InMemoryAccountStore {
    /// Creates a new, empty in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn stored_id(account: &Account) -> Result<AccountId> {
    account
        .id
        .ok_or_else(|| BankError::Internal("account has not been stored yet".to_string()))
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create(&self, account: &Account) -> Result<AccountId> {
        let mut ledger = self.ledger.write().await;
        if ledger.numbers.contains_key(&account.number) {
            return Err(BankError::DuplicateNumber(account.number.clone()));
        }

        ledger.last_id += 1;
        let id = ledger.last_id;
        let mut stored = account.clone();
        stored.id = Some(id);
        ledger.numbers.insert(stored.number.clone(), id);
        ledger.accounts.insert(id, stored);
        debug!(id, "account created in memory");
        Ok(id)
    }

    async fn get_by_number(&self, number: &str) -> Result<Option<Account>> {
        let ledger = self.ledger.read().await;
        Ok(ledger
            .numbers
            .get(number)
            .and_then(|id| ledger.accounts.get(id))
            .cloned())
    }

    async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        let ledger = self.ledger.read().await;
        Ok(ledger.accounts.get(&id).cloned())
    }

    async fn update(&self, account: &Account) -> Result<()> {
        let id = stored_id(account)?;
        let mut ledger = self.ledger.write().await;
        let previous = ledger
            .accounts
            .get(&id)
            .map(|a| a.number.clone())
            .ok_or(BankError::AccountNotFound(id))?;

        if previous != account.number {
            if ledger.numbers.contains_key(&account.number) {
                return Err(BankError::DuplicateNumber(account.number.clone()));
            }
            ledger.numbers.remove(&previous);
            ledger.numbers.insert(account.number.clone(), id);
        }
        ledger.accounts.insert(id, account.clone());
        Ok(())
    }

    async fn delete(&self, id: AccountId) -> Result<()> {
        let mut ledger = self.ledger.write().await;
        if let Some(account) = ledger.accounts.remove(&id) {
            ledger.numbers.remove(&account.number);
        }
        Ok(())
    }

    async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(Account, Account)> {
        if from == to {
            return Err(BankError::SelfTransferRejected);
        }
        let mut ledger = self.ledger.write().await;
        let mut sender = ledger
            .accounts
            .get(&from)
            .cloned()
            .ok_or(BankError::AccountNotFound(from))?;
        let mut receiver = ledger
            .accounts
            .get(&to)
            .cloned()
            .ok_or(BankError::ReceiverNotFound)?;

        // Work on copies so a failed step leaves the ledger untouched.
        sender.withdraw(amount)?;
        receiver.deposit(amount)?;

        ledger.accounts.insert(from, sender.clone());
        ledger.accounts.insert(to, receiver.clone());
        Ok((sender, receiver))
    }

    async fn all(&self) -> Result<Vec<Account>> {
        let ledger = self.ledger.read().await;
        Ok(ledger.accounts.values().cloned().collect())
    }
}
