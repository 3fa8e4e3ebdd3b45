use crate::domain::account::Account;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct LedgerRow<'a> {
    id: Option<u64>,
    number: &'a str,
    balance: u64,
}

/// Writes the ledger as CSV: `id,number,balance`. PINs are never written.
pub struct AccountWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AccountWriter<W> {
    pub fn new(destination: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(destination),
        }
    }

    pub fn write_accounts(&mut self, mut accounts: Vec<Account>) -> Result<()> {
        accounts.sort_by_key(|account| account.id);
        for account in &accounts {
            self.writer.serialize(LedgerRow {
                id: account.id,
                number: &account.number,
                balance: account.balance.value(),
            })?;
        }
        // An empty ledger still gets its header.
        if accounts.is_empty() {
            self.writer.write_record(["id", "number", "balance"])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
