//! `dokon-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure
//! concerns): currencies, amount parsing/formatting, exchange-rate
//! reconciliation, and strongly-typed identifiers.

pub mod error;
pub mod fx;
pub mod id;
pub mod money;

pub use error::{DomainError, DomainResult};
pub use fx::{convert, sum_in, CurrencyLine, ExchangeRate, ReconciledTotal};
pub use id::{CreditId, ItemId, LogEntryId};
pub use money::{format_amount, parse_amount, Currency};
