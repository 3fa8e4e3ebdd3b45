//! CSV export of the ledger.

pub mod account_writer;
