//! Card numbers, accounts and the storage port they are persisted through.

pub mod account;
pub mod generator;
pub mod luhn;
pub mod ports;
