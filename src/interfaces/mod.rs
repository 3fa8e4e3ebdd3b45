//! Front ends driving the [`BankEngine`](crate::application::engine::BankEngine).

pub mod cli;
pub mod csv;
