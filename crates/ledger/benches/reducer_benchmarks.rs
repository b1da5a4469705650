use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::Utc;
use dokon_core::{Currency, ItemId, LogEntryId};
use dokon_ledger::action::{AddItem, Sell};
use dokon_ledger::{reduce, Action, AppState, InventoryItem, LogKind, SaleLogEntry};

fn item(id: ItemId) -> InventoryItem {
    InventoryItem {
        id,
        name: "Guruch 25kg".to_string(),
        qty: 1_000_000.0,
        unit_cost: 9_000.0,
        unit_price: 11_000.0,
        currency: Currency::Uzs,
        arrived_date: None,
        note: String::new(),
    }
}

fn log(kind: LogKind, product_id: ItemId) -> SaleLogEntry {
    SaleLogEntry {
        id: LogEntryId::new(),
        occurred_at: Utc::now(),
        user: "aziza".to_string(),
        action_label: "Sotuv".to_string(),
        kind,
        product_id: Some(product_id),
        product_name: "Guruch 25kg".to_string(),
        qty: 1.0,
        unit_price: 11_000.0,
        currency: Currency::Uzs,
        total_local: 11_000.0,
        total_foreign: None,
    }
}

/// Sell dispatch throughput against pools of varying size: the reducer's hot
/// path is a linear scan, and shop inventories are small (tens to hundreds of
/// rows), so this documents where the linear model stops being free.
fn bench_sell_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("reducer/sell_store");

    for pool_size in [10usize, 100, 1_000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::from_parameter(pool_size),
            &pool_size,
            |b, &pool_size| {
                let ids: Vec<ItemId> = (0..pool_size).map(|_| ItemId::new()).collect();
                let mut base = AppState::default();
                for id in &ids {
                    base.store.push(item(*id));
                }
                let target = ids[pool_size / 2];

                b.iter(|| {
                    let mut state = base.clone();
                    let action = Action::SellStore(Sell {
                        id: target,
                        qty: 1.0,
                        log: log(LogKind::Sell, target),
                    });
                    black_box(reduce(&mut state, &action))
                });
            },
        );
    }

    group.finish();
}

/// A mixed day of trading: stock arrivals followed by a burst of sales.
fn bench_trading_day(c: &mut Criterion) {
    c.bench_function("reducer/trading_day_200_actions", |b| {
        let ids: Vec<ItemId> = (0..50).map(|_| ItemId::new()).collect();

        b.iter(|| {
            let mut state = AppState::default();
            for id in &ids {
                reduce(
                    &mut state,
                    &Action::AddStore(AddItem {
                        item: item(*id),
                        log: log(LogKind::Add, *id),
                    }),
                );
            }
            for (i, id) in ids.iter().cycle().take(150).enumerate() {
                reduce(
                    &mut state,
                    &Action::SellStore(Sell {
                        id: *id,
                        qty: (i % 3) as f64 + 1.0,
                        log: log(LogKind::Sell, *id),
                    }),
                );
            }
            black_box(state.logs.len())
        });
    });
}

criterion_group!(benches, bench_sell_store, bench_trading_day);
criterion_main!(benches);
