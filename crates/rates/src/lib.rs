//! `dokon-rates` — the USD→UZS exchange-rate provider.
//!
//! A manually stored override always wins and suppresses any fetch;
//! otherwise the provider fetches from a remote rate endpoint. A failed
//! fetch records an error string and leaves the last known rate in place
//! (stale-or-none); it is never silently reset to a default.

pub mod provider;
pub mod source;

pub use provider::{RateProvider, RateState};
pub use source::{HttpRateSource, RateError, RateSource, StaticRateSource};
