//! The action sum type: one variant per state transition.
//!
//! Actions represent **intent** and carry fully-materialized payloads: the
//! dispatcher (HTTP layer) stamps ids, timestamps and the audit log entry so
//! the reducer stays deterministic. Account actions may omit the log entry;
//! the reducer then synthesizes a minimal one from `entry_id`/`occurred_at`/
//! `actor`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use dokon_accounts::{Account, AccountPatch};
use dokon_core::{CreditId, ItemId, LogEntryId};

use crate::state::{CreditEntry, CreditPatch, InventoryItem, ItemPatch, SaleLogEntry, UiPatch};

/// Payload: append a new inventory item to a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddItem {
    pub item: InventoryItem,
    pub log: SaleLogEntry,
}

/// Payload: remove an inventory item from a pool by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteItem {
    pub id: ItemId,
    pub log: SaleLogEntry,
}

/// Payload: shallow-merge a patch into a pool item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditItem {
    pub id: ItemId,
    pub patch: ItemPatch,
    pub log: SaleLogEntry,
}

/// Payload: transfer quantity from the warehouse pool into the store pool.
///
/// `item` is the row inserted into the store when no store row with this `id`
/// exists yet (it carries the price/currency the store sells at).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveToStore {
    pub id: ItemId,
    pub qty: f64,
    pub item: InventoryItem,
    pub log: SaleLogEntry,
}

/// Payload: deduct a sale from a pool.
///
/// The dispatcher is responsible for not selling more than is available; the
/// reducer does not clamp or reject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sell {
    pub id: ItemId,
    pub qty: f64,
    pub log: SaleLogEntry,
}

/// Payload: apply a signed correction delta to a warehouse item's quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustQty {
    pub id: ItemId,
    pub delta: f64,
    pub log: SaleLogEntry,
}

/// Payload: append a credit-ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddCredit {
    pub entry: CreditEntry,
    pub log: SaleLogEntry,
}

/// Payload: shallow-merge a patch into a credit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditCredit {
    pub id: CreditId,
    pub patch: CreditPatch,
    pub log: SaleLogEntry,
}

/// Payload: remove a credit entry by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteCredit {
    pub id: CreditId,
    pub log: SaleLogEntry,
}

/// Payload: set or clear the manual USD→UZS override rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetExchangeRate {
    pub rate: Option<f64>,
}

/// Payload: append an account. The caller pre-validates case-insensitive
/// username uniqueness; the reducer does not deduplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddAccount {
    pub account: Account,
    pub log: Option<SaleLogEntry>,
    pub entry_id: LogEntryId,
    pub occurred_at: DateTime<Utc>,
    pub actor: String,
}

/// Payload: patch an account. A no-op when the username is protected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditAccount {
    pub username: String,
    pub patch: AccountPatch,
    pub log: Option<SaleLogEntry>,
    pub entry_id: LogEntryId,
    pub occurred_at: DateTime<Utc>,
    pub actor: String,
}

/// Payload: delete an account. A no-op when the username is protected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteAccount {
    pub username: String,
    pub log: Option<SaleLogEntry>,
    pub entry_id: LogEntryId,
    pub occurred_at: DateTime<Utc>,
    pub actor: String,
}

/// Payload: shallow-merge display preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetUi {
    pub patch: UiPatch,
}

/// Payload: store a named draft blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetDraft {
    pub name: String,
    pub value: Value,
}

/// Payload: discard a named draft blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearDraft {
    pub name: String,
}

/// Every state transition of the shop, as a tagged union.
///
/// The reducer's match over this enum is exhaustive; there is no "unknown
/// action" at this layer. Ineffective payloads (missing ids, protected
/// usernames, equal values) reduce to identity instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    AddWarehouse(AddItem),
    AddStore(AddItem),
    EditWarehouse(EditItem),
    DeleteWarehouse(DeleteItem),
    DeleteStore(DeleteItem),
    MoveToStore(MoveToStore),
    SellWarehouse(Sell),
    SellStore(Sell),
    AdjustWarehouseQty(AdjustQty),
    AddCredit(AddCredit),
    EditCredit(EditCredit),
    DeleteCredit(DeleteCredit),
    SetExchangeRate(SetExchangeRate),
    AddAccount(AddAccount),
    EditAccount(EditAccount),
    DeleteAccount(DeleteAccount),
    SetUi(SetUi),
    SetDraft(SetDraft),
    ClearDraft(ClearDraft),
}
