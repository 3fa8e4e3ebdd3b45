#![allow(dead_code)]

use async_trait::async_trait;
use cardbank::application::engine::BankEngine;
use cardbank::domain::account::{Account, AccountId, AccountRecord, Amount};
use cardbank::domain::generator::NumberGenerator;
use cardbank::domain::ports::AccountStore;
use cardbank::error::Result;
use cardbank::infrastructure::in_memory::InMemoryAccountStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory store that counts every call able to change the ledger.
#[derive(Clone, Default)]
pub struct RecordingStore {
    inner: InMemoryAccountStore,
    writes: Arc<AtomicUsize>,
}

impl RecordingStore {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AccountStore for RecordingStore {
    async fn create(&self, account: &Account) -> Result<AccountId> {
        self.record();
        self.inner.create(account).await
    }

    async fn get_by_number(&self, number: &str) -> Result<Option<Account>> {
        self.inner.get_by_number(number).await
    }

    async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        self.inner.get_by_id(id).await
    }

    async fn update(&self, account: &Account) -> Result<()> {
        self.record();
        self.inner.update(account).await
    }

    async fn delete(&self, id: AccountId) -> Result<()> {
        self.record();
        self.inner.delete(id).await
    }

    async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(Account, Account)> {
        self.record();
        self.inner.transfer(from, to, amount).await
    }

    async fn all(&self) -> Result<Vec<Account>> {
        self.inner.all().await
    }
}

/// Stores an account with a known number, PIN and balance.
pub async fn seed<S: AccountStore + ?Sized>(
    store: &S,
    number: &str,
    pin: &str,
    balance: u64,
) -> Account {
    let mut account = Account::from_record(AccountRecord {
        id: None,
        number: number.to_string(),
        pin: pin.to_string(),
        balance,
    });
    let id = store.create(&account).await.expect("Failed to seed account");
    account.id = Some(id);
    account
}

pub fn engine_over(store: RecordingStore) -> BankEngine {
    BankEngine::new(Box::new(store), NumberGenerator::default())
}
