//! The pure state-transition function.
//!
//! `reduce` maps `(state, action)` to the next state in place and reports
//! whether anything changed. It never fails and performs no IO: malformed or
//! ineffective payloads reduce to identity (with a tracing line so debug
//! builds surface them), matching the historical reducer's
//! unknown-action-returns-state semantics.

use tracing::{debug, warn};

use dokon_accounts::is_protected;
use dokon_core::{Currency, ItemId};

use crate::action::Action;
use crate::state::{AppState, InventoryItem, LogKind, SaleLogEntry};

/// Outcome of applying an action.
///
/// `Unchanged` is the Rust rendition of "the reducer returned the same
/// reference": the persistence layer uses it to skip redundant writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Changed,
    Unchanged,
}

impl Applied {
    pub fn is_changed(self) -> bool {
        matches!(self, Applied::Changed)
    }
}

/// Apply one action to the state.
///
/// Invariants upheld here:
/// - every warehouse/store/credits/accounts mutation appends exactly one log
///   entry (synthesized for account actions when none is supplied);
/// - no pool ever stores an item with qty ≤ 0 (depleted rows are filtered
///   out, not kept as zero rows);
/// - protected usernames are never edited or deleted (early identity return,
///   no log).
pub fn reduce(state: &mut AppState, action: &Action) -> Applied {
    match action {
        Action::AddWarehouse(a) => {
            state.warehouse.push(a.item.clone());
            state.logs.push(a.log.clone());
            Applied::Changed
        }
        Action::AddStore(a) => {
            state.store.push(a.item.clone());
            state.logs.push(a.log.clone());
            Applied::Changed
        }
        Action::EditWarehouse(a) => {
            match state.warehouse.iter_mut().find(|i| i.id == a.id) {
                Some(item) => item.apply_patch(&a.patch),
                None => debug!(id = %a.id, "edit: no warehouse item with this id"),
            }
            drop_depleted(&mut state.warehouse);
            state.logs.push(a.log.clone());
            Applied::Changed
        }
        Action::DeleteWarehouse(a) => {
            state.warehouse.retain(|i| i.id != a.id);
            state.logs.push(a.log.clone());
            Applied::Changed
        }
        Action::DeleteStore(a) => {
            state.store.retain(|i| i.id != a.id);
            state.logs.push(a.log.clone());
            Applied::Changed
        }
        Action::MoveToStore(a) => {
            // Atomic within this call: both pools settle before we return.
            deduct(&mut state.warehouse, a.id, a.qty, "warehouse");
            match state.store.iter_mut().find(|i| i.id == a.id) {
                Some(existing) => existing.qty += a.qty,
                None => state.store.push(InventoryItem {
                    qty: a.qty,
                    ..a.item.clone()
                }),
            }
            state.logs.push(a.log.clone());
            Applied::Changed
        }
        Action::SellWarehouse(a) => {
            deduct(&mut state.warehouse, a.id, a.qty, "warehouse");
            state.logs.push(a.log.clone());
            Applied::Changed
        }
        Action::SellStore(a) => {
            deduct(&mut state.store, a.id, a.qty, "store");
            state.logs.push(a.log.clone());
            Applied::Changed
        }
        Action::AdjustWarehouseQty(a) => {
            match state.warehouse.iter_mut().find(|i| i.id == a.id) {
                Some(item) => item.qty += a.delta,
                None => debug!(id = %a.id, "adjust: no warehouse item with this id"),
            }
            drop_depleted(&mut state.warehouse);
            state.logs.push(a.log.clone());
            Applied::Changed
        }
        Action::AddCredit(a) => {
            state.credits.push(a.entry.clone());
            state.logs.push(a.log.clone());
            Applied::Changed
        }
        Action::EditCredit(a) => {
            match state.credits.iter_mut().find(|c| c.id == a.id) {
                Some(entry) => entry.apply_patch(&a.patch),
                None => debug!(id = %a.id, "edit: no credit entry with this id"),
            }
            state.logs.push(a.log.clone());
            Applied::Changed
        }
        Action::DeleteCredit(a) => {
            state.credits.retain(|c| c.id != a.id);
            state.logs.push(a.log.clone());
            Applied::Changed
        }
        Action::SetExchangeRate(a) => {
            if let Some(rate) = a.rate {
                if !rate.is_finite() || rate <= 0.0 {
                    warn!(rate, "ignoring invalid exchange-rate override");
                    return Applied::Unchanged;
                }
            }
            if state.exchange_rate == a.rate {
                return Applied::Unchanged;
            }
            state.exchange_rate = a.rate;
            Applied::Changed
        }
        Action::AddAccount(a) => {
            state.accounts.push(a.account.clone());
            let log = a.log.clone().unwrap_or_else(|| {
                account_log(a.entry_id, a.occurred_at, &a.actor, "account added", LogKind::Add)
            });
            state.logs.push(log);
            Applied::Changed
        }
        Action::EditAccount(a) => {
            if is_protected(&a.username) {
                debug!(username = %a.username, "refusing to edit protected account");
                return Applied::Unchanged;
            }
            match state
                .accounts
                .iter_mut()
                .find(|acc| acc.username.matches(&a.username))
            {
                Some(account) => account.apply_patch(&a.patch),
                None => debug!(username = %a.username, "edit: no account with this username"),
            }
            let log = a.log.clone().unwrap_or_else(|| {
                account_log(a.entry_id, a.occurred_at, &a.actor, "account updated", LogKind::Edit)
            });
            state.logs.push(log);
            Applied::Changed
        }
        Action::DeleteAccount(a) => {
            if is_protected(&a.username) {
                debug!(username = %a.username, "refusing to delete protected account");
                return Applied::Unchanged;
            }
            state.accounts.retain(|acc| !acc.username.matches(&a.username));
            let log = a.log.clone().unwrap_or_else(|| {
                account_log(a.entry_id, a.occurred_at, &a.actor, "account removed", LogKind::Delete)
            });
            state.logs.push(log);
            Applied::Changed
        }
        Action::SetUi(a) => {
            let next = state.ui.merged(&a.patch);
            if next == state.ui {
                return Applied::Unchanged;
            }
            state.ui = next;
            Applied::Changed
        }
        Action::SetDraft(a) => {
            if state.drafts.get(&a.name) == Some(&a.value) {
                return Applied::Unchanged;
            }
            state.drafts.insert(a.name.clone(), a.value.clone());
            Applied::Changed
        }
        Action::ClearDraft(a) => match state.drafts.remove(&a.name) {
            Some(_) => Applied::Changed,
            None => Applied::Unchanged,
        },
    }
}

/// Subtract `qty` from the matching item and drop any row driven to ≤ 0.
fn deduct(pool: &mut Vec<InventoryItem>, id: ItemId, qty: f64, pool_name: &'static str) {
    match pool.iter_mut().find(|i| i.id == id) {
        Some(item) => {
            if qty > item.qty {
                // Caller contract violation: the dispatcher should have
                // validated available stock.
                warn!(
                    id = %id,
                    pool = pool_name,
                    requested = qty,
                    available = item.qty,
                    "sale exceeds available quantity"
                );
            }
            item.qty -= qty;
        }
        None => debug!(id = %id, pool = pool_name, "sell: no item with this id"),
    }
    drop_depleted(pool);
}

fn drop_depleted(pool: &mut Vec<InventoryItem>) {
    pool.retain(|i| i.qty > 0.0);
}

fn account_log(
    id: dokon_core::LogEntryId,
    occurred_at: chrono::DateTime<chrono::Utc>,
    actor: &str,
    label: &str,
    kind: LogKind,
) -> SaleLogEntry {
    SaleLogEntry {
        id,
        occurred_at,
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    use dokon_accounts::{Account, AccountPatch, PermissionSet, Username};
    use dokon_core::{CreditId, LogEntryId};

    use crate::action::{
        AddAccount, AddCredit, AddItem, AdjustQty, ClearDraft, DeleteAccount, DeleteItem,
        EditAccount, EditItem, MoveToStore, Sell, SetDraft, SetExchangeRate, SetUi,
    };
    use crate::state::{CreditEntry, CreditKind, ItemPatch, UiPatch};

    fn item(id: ItemId, qty: f64) -> InventoryItem {
        InventoryItem {
            id,
            name: "Guruch".to_string(),
            qty,
            unit_cost: 9_000.0,
            unit_price: 11_000.0,
            currency: Currency::Uzs,
            arrived_date: None,
            note: String::new(),
        }
    }

    fn log(kind: LogKind) -> SaleLogEntry {
        SaleLogEntry {
            id: LogEntryId::new(),
            occurred_at: Utc::now(),
            user: "aziza".to_string(),
            action_label: "test".to_string(),
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

    fn credit(id: CreditId) -> CreditEntry {
        CreditEntry {
            id,
            name: "Karim aka".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            amount: 150_000.0,
            currency: Currency::Uzs,
            kind: CreditKind::Olingan,
            note: String::new(),
        }
    }

    fn account(username: &str) -> Account {
        Account {
            username: Username::new(username).unwrap(),
            label: username.to_string(),
            permissions: PermissionSet::none(),
        }
    }

    #[test]
    fn sell_deducts_and_keeps_remainder() {
        let id = ItemId::new();
        let mut state = AppState::default();
        state.store.push(item(id, 10.0));

        let applied = reduce(
            &mut state,
            &Action::SellStore(Sell {
                id,
                qty: 4.0,
                log: log(LogKind::Sell),
            }),
        );

        assert!(applied.is_changed());
        assert_eq!(state.find_store(id).unwrap().qty, 6.0);
        assert_eq!(state.logs.len(), 1);
    }

    #[test]
    fn sell_filters_out_depleted_items() {
        let id = ItemId::new();
        let mut state = AppState::default();
        state.store.push(item(id, 4.0));

        reduce(
            &mut state,
            &Action::SellStore(Sell {
                id,
                qty: 4.0,
                log: log(LogKind::Sell),
            }),
        );

        // Removed entirely, not kept as a zero row.
        assert!(state.store.is_empty());
    }

    #[test]
    fn oversell_is_not_clamped_but_row_is_dropped() {
        let id = ItemId::new();
        let mut state = AppState::default();
        state.warehouse.push(item(id, 2.0));

        reduce(
            &mut state,
            &Action::SellWarehouse(Sell {
                id,
                qty: 5.0,
                log: log(LogKind::Sell),
            }),
        );

        assert!(state.warehouse.is_empty());
    }

    #[test]
    fn sell_unknown_id_still_appends_the_log() {
        let mut state = AppState::default();
        state.store.push(item(ItemId::new(), 5.0));

        reduce(
            &mut state,
            &Action::SellStore(Sell {
                id: ItemId::new(),
                qty: 1.0,
                log: log(LogKind::Sell),
            }),
        );

        assert_eq!(state.store[0].qty, 5.0);
        assert_eq!(state.logs.len(), 1);
    }

    #[test]
    fn move_to_store_transfers_quantity_to_existing_row() {
        let id = ItemId::new();
        let mut state = AppState::default();
        state.warehouse.push(item(id, 10.0));
        state.store.push(item(id, 3.0));

        reduce(
            &mut state,
            &Action::MoveToStore(MoveToStore {
                id,
                qty: 4.0,
                item: item(id, 4.0),
                log: log(LogKind::Edit),
            }),
        );

        assert_eq!(state.find_warehouse(id).unwrap().qty, 6.0);
        assert_eq!(state.find_store(id).unwrap().qty, 7.0);
    }

    #[test]
    fn move_to_store_inserts_row_when_absent() {
        let id = ItemId::new();
        let mut state = AppState::default();
        state.warehouse.push(item(id, 10.0));

        reduce(
            &mut state,
            &Action::MoveToStore(MoveToStore {
                id,
                qty: 10.0,
                item: item(id, 10.0),
                log: log(LogKind::Edit),
            }),
        );

        // Warehouse row fully moved out, store row created with the quantity.
        assert!(state.warehouse.is_empty());
        assert_eq!(state.find_store(id).unwrap().qty, 10.0);
    }

    #[test]
    fn edit_warehouse_merges_patch_fields() {
        let id = ItemId::new();
        let mut state = AppState::default();
        state.warehouse.push(item(id, 10.0));

        reduce(
            &mut state,
            &Action::EditWarehouse(EditItem {
                id,
                patch: ItemPatch {
                    unit_price: Some(12_500.0),
                    note: Some("narx oshdi".to_string()),
                    ..ItemPatch::default()
                },
                log: log(LogKind::Edit),
            }),
        );

        let edited = state.find_warehouse(id).unwrap();
        assert_eq!(edited.unit_price, 12_500.0);
        assert_eq!(edited.note, "narx oshdi");
        assert_eq!(edited.qty, 10.0);
        assert_eq!(edited.name, "Guruch");
    }

    #[test]
    fn adjust_qty_applies_signed_delta_and_filters() {
        let id = ItemId::new();
        let mut state = AppState::default();
        state.warehouse.push(item(id, 10.0));

        reduce(
            &mut state,
            &Action::AdjustWarehouseQty(AdjustQty {
                id,
                delta: -3.0,
                log: log(LogKind::Edit),
            }),
        );
        assert_eq!(state.find_warehouse(id).unwrap().qty, 7.0);

        reduce(
            &mut state,
            &Action::AdjustWarehouseQty(AdjustQty {
                id,
                delta: -7.0,
                log: log(LogKind::Edit),
            }),
        );
        assert!(state.warehouse.is_empty());
    }

    #[test]
    fn credit_lifecycle_add_edit_delete() {
        let id = CreditId::new();
        let mut state = AppState::default();

        reduce(
            &mut state,
            &Action::AddCredit(AddCredit {
                entry: credit(id),
                log: log(LogKind::Add),
            }),
        );
        assert_eq!(state.credits.len(), 1);

        reduce(
            &mut state,
            &Action::EditCredit(crate::action::EditCredit {
                id,
                patch: crate::state::CreditPatch {
                    amount: Some(200_000.0),
                    ..Default::default()
                },
                log: log(LogKind::Edit),
            }),
        );
        assert_eq!(state.find_credit(id).unwrap().amount, 200_000.0);

        reduce(
            &mut state,
            &Action::DeleteCredit(crate::action::DeleteCredit {
                id,
                log: log(LogKind::Delete),
            }),
        );
        assert!(state.credits.is_empty());
        assert_eq!(state.logs.len(), 3);
    }

    #[test]
    fn every_pool_mutation_appends_exactly_one_log() {
        let id = ItemId::new();
        let credit_id = CreditId::new();
        let actions = vec![
            Action::AddWarehouse(AddItem {
                item: item(id, 10.0),
                log: log(LogKind::Add),
            }),
            Action::MoveToStore(MoveToStore {
                id,
                qty: 5.0,
                item: item(id, 5.0),
                log: log(LogKind::Edit),
            }),
            Action::SellStore(Sell {
                id,
                qty: 1.0,
                log: log(LogKind::Sell),
            }),
            Action::AddCredit(AddCredit {
                entry: credit(credit_id),
                log: log(LogKind::Add),
            }),
            Action::DeleteCredit(crate::action::DeleteCredit {
                id: credit_id,
                log: log(LogKind::Delete),
            }),
            Action::AddAccount(AddAccount {
                account: account("karim"),
                log: None,
                entry_id: LogEntryId::new(),
                occurred_at: Utc::now(),
                actor: "admin".to_string(),
            }),
            Action::DeleteWarehouse(DeleteItem {
                id,
                log: log(LogKind::Delete),
            }),
        ];

        let mut state = AppState::default();
        for action in &actions {
            let before = state.logs.len();
            reduce(&mut state, action);
            assert_eq!(state.logs.len(), before + 1, "action {action:?}");
        }
    }

    #[test]
    fn protected_account_edit_is_identity() {
        let mut state = AppState::default();
        state.accounts.push(account("karim"));
        let before = state.clone();

        let applied = reduce(
            &mut state,
            &Action::EditAccount(EditAccount {
                username: "Admin".to_string(),
                patch: AccountPatch {
                    label: Some("hacked".to_string()),
                    permissions: Some(PermissionSet::none()),
                },
                log: None,
                entry_id: LogEntryId::new(),
                occurred_at: Utc::now(),
                actor: "karim".to_string(),
            }),
        );

        assert_eq!(applied, Applied::Unchanged);
        assert_eq!(state, before);
    }

    #[test]
    fn protected_account_delete_is_identity() {
        let mut state = AppState::default();
        let before = state.clone();

        let applied = reduce(
            &mut state,
            &Action::DeleteAccount(DeleteAccount {
                username: "boss".to_string(),
                log: None,
                entry_id: LogEntryId::new(),
                occurred_at: Utc::now(),
                actor: "karim".to_string(),
            }),
        );

        assert_eq!(applied, Applied::Unchanged);
        assert_eq!(state, before);
        assert!(state.logs.is_empty());
    }

    #[test]
    fn account_actions_synthesize_minimal_log_when_absent() {
        let mut state = AppState::default();
        let entry_id = LogEntryId::new();

        reduce(
            &mut state,
            &Action::AddAccount(AddAccount {
                account: account("karim"),
                log: None,
                entry_id,
                occurred_at: Utc::now(),
                actor: "admin".to_string(),
            }),
        );

        assert_eq!(state.logs.len(), 1);
        let synthesized = &state.logs[0];
        assert_eq!(synthesized.id, entry_id);
        assert_eq!(synthesized.user, "admin");
        assert_eq!(synthesized.kind, LogKind::Add);
    }

    #[test]
    fn delete_account_is_case_insensitive() {
        let mut state = AppState::default();
        state.accounts.push(account("Karim"));

        reduce(
            &mut state,
            &Action::DeleteAccount(DeleteAccount {
                username: "KARIM".to_string(),
                log: None,
                entry_id: LogEntryId::new(),
                occurred_at: Utc::now(),
                actor: "admin".to_string(),
            }),
        );

        assert!(state.accounts.is_empty());
    }

    #[test]
    fn set_ui_short_circuits_on_equal_value() {
        let mut state = AppState::default();
        let patch = UiPatch {
            display_currency: Some(Currency::Usd),
            ..UiPatch::default()
        };

        let first = reduce(&mut state, &Action::SetUi(SetUi { patch: patch.clone() }));
        let after_first = state.clone();
        let second = reduce(&mut state, &Action::SetUi(SetUi { patch }));

        assert_eq!(first, Applied::Changed);
        assert_eq!(second, Applied::Unchanged);
        assert_eq!(state, after_first);
    }

    #[test]
    fn set_draft_short_circuits_on_deep_equal_value() {
        let mut state = AppState::default();
        let value = serde_json::json!({"qty": 3, "name": "Olma"});

        let first = reduce(
            &mut state,
            &Action::SetDraft(SetDraft {
                name: "sale".to_string(),
                value: value.clone(),
            }),
        );
        let second = reduce(
            &mut state,
            &Action::SetDraft(SetDraft {
                name: "sale".to_string(),
                value,
            }),
        );

        assert_eq!(first, Applied::Changed);
        assert_eq!(second, Applied::Unchanged);
    }

    #[test]
    fn clear_missing_draft_is_identity() {
        let mut state = AppState::default();
        let applied = reduce(
            &mut state,
            &Action::ClearDraft(ClearDraft {
                name: "nope".to_string(),
            }),
        );
        assert_eq!(applied, Applied::Unchanged);
    }

    #[test]
    fn exchange_rate_override_set_and_short_circuit() {
        let mut state = AppState::default();

        let first = reduce(
            &mut state,
            &Action::SetExchangeRate(SetExchangeRate { rate: Some(12_650.0) }),
        );
        let second = reduce(
            &mut state,
            &Action::SetExchangeRate(SetExchangeRate { rate: Some(12_650.0) }),
        );

        assert_eq!(first, Applied::Changed);
        assert_eq!(second, Applied::Unchanged);
        assert_eq!(state.exchange_rate, Some(12_650.0));
    }

    #[test]
    fn invalid_exchange_rate_is_ignored() {
        let mut state = AppState::default();
        state.exchange_rate = Some(12_650.0);

        let applied = reduce(
            &mut state,
            &Action::SetExchangeRate(SetExchangeRate { rate: Some(-5.0) }),
        );

        assert_eq!(applied, Applied::Unchanged);
        assert_eq!(state.exchange_rate, Some(12_650.0));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: after any sequence of sells against either pool, no pool
        /// contains an item with qty ≤ 0.
        #[test]
        fn pools_never_hold_nonpositive_quantities(
            initial in prop::collection::vec(0.5f64..100.0, 1..8),
            sells in prop::collection::vec((0usize..8, 0.5f64..150.0, prop::bool::ANY), 0..24),
        ) {
            let ids: Vec<ItemId> = initial.iter().map(|_| ItemId::new()).collect();
            let mut state = AppState::default();
            for (id, qty) in ids.iter().zip(&initial) {
                state.warehouse.push(item(*id, *qty));
                state.store.push(item(*id, *qty));
            }

            for (idx, qty, from_store) in sells {
                let id = ids[idx % ids.len()];
                let action = if from_store {
                    Action::SellStore(Sell { id, qty, log: log(LogKind::Sell) })
                } else {
                    Action::SellWarehouse(Sell { id, qty, log: log(LogKind::Sell) })
                };
                reduce(&mut state, &action);
            }

            prop_assert!(state.warehouse.iter().all(|i| i.qty > 0.0));
            prop_assert!(state.store.iter().all(|i| i.qty > 0.0));
        }

        /// Property: a warehouse→store transfer preserves the item's total
        /// quantity across both pools.
        #[test]
        fn move_preserves_total_quantity(
            warehouse_qty in 1.0f64..1000.0,
            store_qty in prop::option::of(1.0f64..1000.0),
            move_qty in 0.5f64..500.0,
        ) {
            prop_assume!(move_qty < warehouse_qty);

            let id = ItemId::new();
            let mut state = AppState::default();
            state.warehouse.push(item(id, warehouse_qty));
            if let Some(q) = store_qty {
                state.store.push(item(id, q));
            }
            let total_before = warehouse_qty + store_qty.unwrap_or(0.0);

            reduce(&mut state, &Action::MoveToStore(MoveToStore {
                id,
                qty: move_qty,
                item: item(id, move_qty),
                log: log(LogKind::Edit),
            }));

            let warehouse_after = state.find_warehouse(id).map(|i| i.qty).unwrap_or(0.0);
            let store_after = state.find_store(id).map(|i| i.qty).unwrap_or(0.0);

            prop_assert_eq!(warehouse_after, warehouse_qty - move_qty);
            prop_assert_eq!(store_after, store_qty.unwrap_or(0.0) + move_qty);
            prop_assert!((warehouse_after + store_after - total_before).abs() < 1e-9);
        }
    }
}
