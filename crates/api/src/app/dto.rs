//! Request DTOs and audit-log construction.
//!
//! Ids, timestamps and log entries are stamped **here**, at the dispatch
//! boundary, so the reducer stays deterministic. Patch types from the domain
//! crates double as request bodies.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use dokon_core::{convert, Currency, ExchangeRate, ItemId, LogEntryId};
use dokon_ledger::{CreditEntry, CreditKind, InventoryItem, LogKind, SaleLogEntry};

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
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

impl AddItemRequest {
    pub fn into_item(self, id: ItemId) -> InventoryItem {
        InventoryItem {
            id,
            name: self.name,
            qty: self.qty,
            unit_cost: self.unit_cost,
            unit_price: self.unit_price,
            currency: self.currency,
            arrived_date: self.arrived_date,
            note: self.note,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustQtyRequest {
    pub delta: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToStoreRequest {
    pub id: ItemId,
    pub qty: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellRequest {
    pub id: ItemId,
    pub qty: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WholesaleRequest {
    pub lines: Vec<SellRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCreditRequest {
    pub name: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub currency: Currency,
    #[serde(rename = "type")]
    pub kind: CreditKind,
    #[serde(default)]
    pub note: String,
}

impl AddCreditRequest {
    pub fn into_entry(self, id: dokon_core::CreditId) -> CreditEntry {
        CreditEntry {
            id,
            name: self.name,
            date: self.date,
            amount: self.amount,
            currency: self.currency,
            kind: self.kind,
            note: self.note,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAccountRequest {
    pub username: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub permissions: dokon_accounts::PermissionSet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRateRequest {
    /// `null` clears the manual override.
    pub rate: Option<f64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Audit-log construction
// ─────────────────────────────────────────────────────────────────────────────

/// Log entry for an inventory mutation: totals in the item's native currency,
/// plus the other-currency total when a rate is at hand (never fabricated
/// from an implicit 1:1).
pub fn item_log(
    actor: &str,
    label: &str,
    kind: LogKind,
    item: &InventoryItem,
    qty: f64,
    rate: Option<f64>,
) -> SaleLogEntry {
    let native_total = qty * item.unit_price;
    let total_foreign = rate
        .and_then(|r| ExchangeRate::new(r).ok())
        .map(|r| convert(native_total, item.currency, other(item.currency), r));

    SaleLogEntry {
        id: LogEntryId::new(),
        occurred_at: Utc::now(),
        user: actor.to_string(),
        action_label: label.to_string(),
        kind,
        product_id: Some(item.id),
        product_name: item.name.clone(),
        qty,
        unit_price: item.unit_price,
        currency: item.currency,
        total_local: native_total,
        total_foreign,
    }
}

/// Minimal log entry for non-inventory mutations (credits, accounts).
pub fn plain_log(actor: &str, label: &str, kind: LogKind) -> SaleLogEntry {
    SaleLogEntry {
        id: LogEntryId::new(),
        occurred_at: Utc::now(),
        user: actor.to_string(),
        action_label: label.to_string(),
        kind,
        product_id: None,
        product_name: String::new(),
        qty: 0.0,
        unit_price: 0.0,
        currency: Currency::Uzs,
        total_local: 0.0,
        total_foreign: None,
    }
}

fn other(currency: Currency) -> Currency {
    match currency {
        Currency::Uzs => Currency::Usd,
        Currency::Usd => Currency::Uzs,
    }
}
