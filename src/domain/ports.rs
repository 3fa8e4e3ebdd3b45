use super::account::{Account, AccountId, Amount};
use crate::error::Result;
use async_trait::async_trait;

/// Durable keyed storage of accounts.
///
/// Implementations serialize their mutating operations, so a store can be
/// shared between tasks without lost updates.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persists a new account and returns the id assigned to it.
    ///
    /// Fails with `DuplicateNumber` if the number is already issued.
    async fn create(&self, account: &Account) -> Result<AccountId>;

    async fn get_by_number(&self, number: &str) -> Result<Option<Account>>;

    async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>>;

    /// Overwrites the stored record carrying `account.id`.
    async fn update(&self, account: &Account) -> Result<()>;

    async fn delete(&self, id: AccountId) -> Result<()>;

    /// Moves `amount` from `from` to `to` as one atomic read-modify-write.
    ///
    /// Both records are re-read under the store's write lock; either both
    /// balances change or neither does. Returns the updated sender and receiver.
    async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(Account, Account)>;

    /// Every stored account, ordered by id.
    async fn all(&self) -> Result<Vec<Account>>;
}

pub type AccountStoreBox = Box<dyn AccountStore>;
