//! The persisted application state and its entities.
//!
//! The whole [`AppState`] is persisted and restored as **one JSON document**;
//! field names serialize in the document's historical camelCase shape. There
//! is no partial update and no referential integrity beyond convention.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use dokon_accounts::Account;
use dokon_core::{CreditId, Currency, ItemId, LogEntryId};

// ─────────────────────────────────────────────────────────────────────────────
// Inventory
// ─────────────────────────────────────────────────────────────────────────────

/// One inventory row. The same `id` may exist independently in the warehouse
/// pool and the store pool; a transfer moves quantity between the two.
///
/// `currency` is sticky: `unit_cost`/`unit_price` stay in this currency for
/// the life of the row, and conversion happens only at display time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: ItemId,
    pub name: String,
    pub qty: f64,
    #[serde(default)]
    pub unit_cost: f64,
    pub unit_price: f64,
    pub currency: Currency,
    #[serde(default)]
    pub arrived_date: Option<NaiveDate>,
    #[serde(default)]
    pub note: String,
}

/// Shallow patch for an inventory item; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub qty: Option<f64>,
    pub unit_cost: Option<f64>,
    pub unit_price: Option<f64>,
    pub currency: Option<Currency>,
    pub arrived_date: Option<NaiveDate>,
    pub note: Option<String>,
}

impl InventoryItem {
    pub fn apply_patch(&mut self, patch: &ItemPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(qty) = patch.qty {
            self.qty = qty;
        }
        if let Some(unit_cost) = patch.unit_cost {
            self.unit_cost = unit_cost;
        }
        if let Some(unit_price) = patch.unit_price {
            self.unit_price = unit_price;
        }
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
        if let Some(arrived_date) = patch.arrived_date {
            self.arrived_date = Some(arrived_date);
        }
        if let Some(note) = &patch.note {
            self.note = note.clone();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sale log
// ─────────────────────────────────────────────────────────────────────────────

/// What kind of mutation a log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogKind {
    Sell,
    Add,
    Edit,
    Delete,
}

/// Immutable audit record appended on every inventory/credit/account
/// mutation. Append-only: entries are never edited or deleted by normal
/// operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLogEntry {
    pub id: LogEntryId,
    #[serde(rename = "timestamp")]
    pub occurred_at: DateTime<Utc>,
    pub user: String,
    pub action_label: String,
    pub kind: LogKind,
    #[serde(default)]
    pub product_id: Option<ItemId>,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub qty: f64,
    #[serde(default)]
    pub unit_price: f64,
    pub currency: Currency,
    /// Line total in the native currency of the line.
    #[serde(default)]
    pub total_local: f64,
    /// Line total in the other currency, when the dispatcher had a rate.
    #[serde(default)]
    pub total_foreign: Option<f64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Credits
// ─────────────────────────────────────────────────────────────────────────────

/// Direction of a credit: money we received (olingan) or gave out (berilgan).
/// Serialized values are the historical Uzbek document strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditKind {
    #[serde(rename = "olingan")]
    Olingan,
    #[serde(rename = "berilgan")]
    Berilgan,
}

/// A credit-ledger row, independent of inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditEntry {
    pub id: CreditId,
    pub name: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub currency: Currency,
    #[serde(rename = "type")]
    pub kind: CreditKind,
    #[serde(default)]
    pub note: String,
}

/// Shallow patch for a credit entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreditPatch {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub currency: Option<Currency>,
    #[serde(rename = "type")]
    pub kind: Option<CreditKind>,
    pub note: Option<String>,
}

impl CreditEntry {
    pub fn apply_patch(&mut self, patch: &CreditPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(note) = &patch.note {
            self.note = note.clone();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UI preferences
// ─────────────────────────────────────────────────────────────────────────────

/// Display preferences, patched by shallow merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiPrefs {
    pub display_currency: Currency,
    pub language: String,
    pub compact_numbers: bool,
}

impl Default for UiPrefs {
    fn default() -> Self {
        Self {
            display_currency: Currency::Uzs,
            language: "uz".to_string(),
            compact_numbers: false,
        }
    }
}

/// Shallow patch for [`UiPrefs`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiPatch {
    pub display_currency: Option<Currency>,
    pub language: Option<String>,
    pub compact_numbers: Option<bool>,
}

impl UiPrefs {
    /// The preferences after applying `patch` (the current value is not
    /// modified; the reducer compares before committing).
    pub fn merged(&self, patch: &UiPatch) -> UiPrefs {
        UiPrefs {
            display_currency: patch.display_currency.unwrap_or(self.display_currency),
            language: patch
                .language
                .clone()
                .unwrap_or_else(|| self.language.clone()),
            compact_numbers: patch.compact_numbers.unwrap_or(self.compact_numbers),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate root
// ─────────────────────────────────────────────────────────────────────────────

/// The aggregate root: everything the shop persists, as one document.
///
/// Created once at process start (defaults merged with whatever loads from
/// storage), mutated exclusively through [`crate::reducer::reduce`], and
/// persisted opportunistically after each change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub warehouse: Vec<InventoryItem>,
    pub store: Vec<InventoryItem>,
    pub logs: Vec<SaleLogEntry>,
    pub credits: Vec<CreditEntry>,
    /// Manual USD→UZS override; `None` means "use the fetched rate".
    pub exchange_rate: Option<f64>,
    pub ui: UiPrefs,
    /// Named in-progress form blobs, persisted so a reload does not lose them.
    pub drafts: BTreeMap<String, Value>,
    pub accounts: Vec<Account>,
}

impl AppState {
    pub fn find_warehouse(&self, id: ItemId) -> Option<&InventoryItem> {
        self.warehouse.iter().find(|i| i.id == id)
    }

    pub fn find_store(&self, id: ItemId) -> Option<&InventoryItem> {
        self.store.iter().find(|i| i.id == id)
    }

    pub fn find_credit(&self, id: CreditId) -> Option<&CreditEntry> {
        self.credits.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dokon_accounts::{PermissionSet, Username};

    fn sample_state() -> AppState {
        let item = InventoryItem {
            id: ItemId::new(),
            name: "Olma".to_string(),
            qty: 12.0,
            unit_cost: 8_000.0,
            unit_price: 10_000.0,
            currency: Currency::Uzs,
            arrived_date: NaiveDate::from_ymd_opt(2024, 3, 14),
            note: String::new(),
        };
        let log = SaleLogEntry {
            id: LogEntryId::new(),
            occurred_at: Utc::now(),
            user: "aziza".to_string(),
            action_label: "Mahsulot qo'shildi".to_string(),
            kind: LogKind::Add,
            product_id: Some(item.id),
            product_name: item.name.clone(),
            qty: 12.0,
            unit_price: 10_000.0,
            currency: Currency::Uzs,
            total_local: 120_000.0,
            total_foreign: None,
        };
        let credit = CreditEntry {
            id: CreditId::new(),
            name: "Karim aka".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            amount: 50.0,
            currency: Currency::Usd,
            kind: CreditKind::Berilgan,
            note: "qaytarish: aprel".to_string(),
        };
        let account = Account {
            username: Username::new("aziza").unwrap(),
            label: "Aziza".to_string(),
            permissions: PermissionSet {
                wholesale_allowed: true,
                ..PermissionSet::none()
            },
        };

        let mut state = AppState::default();
        state.warehouse.push(item.clone());
        state.store.push(InventoryItem { qty: 3.0, ..item });
        state.logs.push(log);
        state.credits.push(credit);
        state.exchange_rate = Some(12_650.0);
        state.accounts.push(account);
        state
            .drafts
            .insert("sale".to_string(), serde_json::json!({"qty": 2}));
        state
    }

    #[test]
    fn document_round_trip_preserves_state() {
        let state = sample_state();
        let doc = serde_json::to_value(&state).unwrap();
        let restored: AppState = serde_json::from_value(doc).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn document_uses_historical_field_names() {
        let state = sample_state();
        let doc = serde_json::to_value(&state).unwrap();

        assert!(doc.get("exchangeRate").is_some());
        assert!(doc["warehouse"][0].get("unitPrice").is_some());
        assert_eq!(doc["credits"][0]["type"], "berilgan");
        assert_eq!(doc["logs"][0]["kind"], "ADD");
        assert!(doc["logs"][0].get("actionLabel").is_some());
        assert_eq!(doc["warehouse"][0]["currency"], "UZS");
    }

    #[test]
    fn empty_document_deserializes_to_defaults() {
        let state: AppState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, AppState::default());
        assert_eq!(state.ui.display_currency, Currency::Uzs);
        assert!(state.exchange_rate.is_none());
    }

    #[test]
    fn ui_merge_is_shallow() {
        let prefs = UiPrefs::default();
        let merged = prefs.merged(&UiPatch {
            display_currency: Some(Currency::Usd),
            ..UiPatch::default()
        });
        assert_eq!(merged.display_currency, Currency::Usd);
        assert_eq!(merged.language, prefs.language);
        assert_eq!(merged.compact_numbers, prefs.compact_numbers);
    }
}
