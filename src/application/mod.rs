//! Application layer containing the banking operations.
//!
//! This module defines the `BankEngine`, which validates requests, drives the
//! number generator and applies balance changes through the account store.

pub mod engine;
