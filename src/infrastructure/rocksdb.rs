use crate::domain::account::{Account, AccountId, AccountRecord, Amount};
use crate::domain::ports::AccountStore;
use crate::error::{BankError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Column Family for account records, keyed by big-endian id.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column Family mapping card numbers to account ids.
pub const CF_NUMBERS: &str = "numbers";
/// Column Family for store bookkeeping such as the id sequence.
pub const CF_META: &str = "meta";

const NEXT_ID_KEY: &[u8] = b"next_id";

/// A persistent account store backed by RocksDB.
///
/// Records are JSON-encoded `AccountRecord`s. Every mutation is a single
/// `WriteBatch`, and read-modify-write sequences are serialized by a writer
/// lock, so a transfer persists both balances or neither.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    writer: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_ACCOUNTS, CF_NUMBERS, CF_META]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            writer: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| BankError::Internal(format!("column family '{name}' not found")))
    }

    fn read_account(&self, id: AccountId) -> Result<Option<Account>> {
        let cf = self.cf(CF_ACCOUNTS)?;
        match self.db.get_cf(&cf, id.to_be_bytes())? {
            Some(bytes) => {
                let record: AccountRecord = serde_json::from_slice(&bytes)?;
                Ok(Some(Account::from_record(record)))
            }
            None => Ok(None),
        }
    }

    fn lookup_id(&self, number: &str) -> Result<Option<AccountId>> {
        let cf = self.cf(CF_NUMBERS)?;
        self.db
            .get_cf(&cf, number.as_bytes())?
            .map(|bytes| decode_id(&bytes))
            .transpose()
    }

    fn next_id(&self) -> Result<AccountId> {
        let cf = self.cf(CF_META)?;
        match self.db.get_cf(&cf, NEXT_ID_KEY)? {
            Some(bytes) => decode_id(&bytes),
            None => Ok(1),
        }
    }

    fn put_account(&self, batch: &mut WriteBatch, id: AccountId, account: &Account) -> Result<()> {
        let cf = self.cf(CF_ACCOUNTS)?;
        let mut record = account.to_record();
        record.id = Some(id);
        batch.put_cf(&cf, id.to_be_bytes(), serde_json::to_vec(&record)?);
        Ok(())
    }
}

fn decode_id(bytes: &[u8]) -> Result<AccountId> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| BankError::Internal(format!("corrupt account id of {} bytes", bytes.len())))?;
    Ok(AccountId::from_be_bytes(raw))
}

fn stored_id(account: &Account) -> Result<AccountId> {
    account
        .id
        .ok_or_else(|| BankError::Internal("account has not been stored yet".to_string()))
}

#[async_trait]
impl AccountStore for RocksDBStore {
    async fn create(&self, account: &Account) -> Result<AccountId> {
        let _guard = self.writer.lock().await;
        if self.lookup_id(&account.number)?.is_some() {
            return Err(BankError::DuplicateNumber(account.number.clone()));
        }

        let id = self.next_id()?;
        let mut batch = WriteBatch::default();
        self.put_account(&mut batch, id, account)?;
        batch.put_cf(&self.cf(CF_NUMBERS)?, account.number.as_bytes(), id.to_be_bytes());
        batch.put_cf(&self.cf(CF_META)?, NEXT_ID_KEY, (id + 1).to_be_bytes());
        self.db.write(&batch)?;

        debug!(id, "account persisted");
        Ok(id)
    }

    async fn get_by_number(&self, number: &str) -> Result<Option<Account>> {
        match self.lookup_id(number)? {
            Some(id) => self.read_account(id),
            None => Ok(None),
        }
    }

    async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        self.read_account(id)
    }

    async fn update(&self, account: &Account) -> Result<()> {
        let id = stored_id(account)?;
        let _guard = self.writer.lock().await;
        let previous = self
            .read_account(id)?
            .ok_or(BankError::AccountNotFound(id))?;

        let mut batch = WriteBatch::default();
        if previous.number != account.number {
            if self.lookup_id(&account.number)?.is_some() {
                return Err(BankError::DuplicateNumber(account.number.clone()));
            }
            let numbers = self.cf(CF_NUMBERS)?;
            batch.delete_cf(&numbers, previous.number.as_bytes());
            batch.put_cf(&numbers, account.number.as_bytes(), id.to_be_bytes());
        }
        self.put_account(&mut batch, id, account)?;
        self.db.write(&batch)?;
        Ok(())
    }

    async fn delete(&self, id: AccountId) -> Result<()> {
        let _guard = self.writer.lock().await;
        let Some(account) = self.read_account(id)? else {
            return Ok(());
        };

        let mut batch = WriteBatch::default();
        batch.delete_cf(&self.cf(CF_ACCOUNTS)?, id.to_be_bytes());
        batch.delete_cf(&self.cf(CF_NUMBERS)?, account.number.as_bytes());
        self.db.write(&batch)?;

        debug!(id, "account deleted");
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
        let _guard = self.writer.lock().await;
        let mut sender = self
            .read_account(from)?
            .ok_or(BankError::AccountNotFound(from))?;
        let mut receiver = self
            .read_account(to)?
            .ok_or(BankError::ReceiverNotFound)?;

        sender.withdraw(amount)?;
        receiver.deposit(amount)?;

        let mut batch = WriteBatch::default();
        self.put_account(&mut batch, from, &sender)?;
        self.put_account(&mut batch, to, &receiver)?;
        self.db.write(&batch)?;

        Ok((sender, receiver))
    }

    async fn all(&self) -> Result<Vec<Account>> {
        let cf = self.cf(CF_ACCOUNTS)?;
        let mut accounts = Vec::new();

        // Big-endian keys iterate in id order.
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let record: AccountRecord = serde_json::from_slice(&value)?;
            accounts.push(Account::from_record(record));
        }

        Ok(accounts)
    }
}
