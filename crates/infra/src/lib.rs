//! `dokon-infra` — persistence bridge and state ownership.
//!
//! The whole application state is persisted as **one JSON document** behind a
//! small key-value [`store::StateStore`] abstraction (in-memory for tests,
//! SQLite for the desktop deployment). Writes are debounced and coalesced by
//! [`saver::DebouncedSaver`]; [`controller::ShopController`] is the single
//! owner of the in-memory state and the only dispatcher of reducer actions.

pub mod controller;
pub mod document;
pub mod saver;
pub mod store;

pub use controller::ShopController;
pub use document::{clean_document, decode_state, user_key, FALLBACK_KEY};
pub use saver::{DebouncedSaver, SaveStatus};
pub use store::{InMemoryStateStore, SqliteStateStore, StateStore, StoreError};
