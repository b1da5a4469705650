//! `dokon-ledger` — application state and the pure reducer.
//!
//! This crate contains the write model of the shop: the [`state::AppState`]
//! aggregate, the [`action::Action`] sum type (one variant per state
//! transition, each with a typed payload), and the side-effect-free
//! [`reducer::reduce`] function. No IO, no HTTP, no storage.

pub mod action;
pub mod reducer;
pub mod state;

pub use action::Action;
pub use reducer::{reduce, Applied};
pub use state::{
    AppState, CreditEntry, CreditKind, CreditPatch, InventoryItem, ItemPatch, LogKind,
    SaleLogEntry, UiPatch, UiPrefs,
};
