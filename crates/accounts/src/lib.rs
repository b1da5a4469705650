//! `dokon-accounts` — account entities and capability policy (pure).
//!
//! This crate is intentionally decoupled from HTTP and storage: accounts
//! live inside the application state and are looked up by username
//! (case-insensitive). Authorization is a pure policy check.

pub mod account;

pub use account::{
    capabilities, find, is_protected, Account, AccountPatch, Capability, PermissionSet, Username,
    PROTECTED_USERNAMES,
};
