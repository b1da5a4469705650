use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use dokon_core::{sum_in, Currency, CurrencyLine, ExchangeRate};
use dokon_ledger::{CreditKind, LogKind};

use crate::app::routes::inventory::effective_rate;
use crate::context::ApiContext;

pub fn router() -> Router {
    Router::new().route("/summary", get(summary))
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Display currency; defaults to the stored UI preference.
    pub currency: Option<Currency>,
}

/// Reconciled shop totals in one display currency.
///
/// Every total carries its skipped-line count so callers can disclose
/// "N items excluded, no rate available" instead of showing a silently
/// understated number.
pub async fn summary(
    Extension(context): Extension<ApiContext>,
    Query(query): Query<SummaryQuery>,
) -> impl IntoResponse {
    let rate = effective_rate(&context)
        .await
        .and_then(|r| ExchangeRate::new(r).ok());

    let report = context
        .controller
        .with_state(|state| {
            let display = query.currency.unwrap_or(state.ui.display_currency);

            let value_lines = |items: &[dokon_ledger::InventoryItem]| {
                items
                    .iter()
                    .map(|i| CurrencyLine::new(i.qty * i.unit_price, i.currency))
                    .collect::<Vec<_>>()
            };

            let warehouse_value = sum_in(value_lines(&state.warehouse), display, rate);
            let store_value = sum_in(value_lines(&state.store), display, rate);

            let sales = sum_in(
                state
                    .logs
                    .iter()
                    .filter(|l| l.kind == LogKind::Sell)
                    .map(|l| CurrencyLine::new(l.total_local, l.currency)),
                display,
                rate,
            );

            let credit_lines = |kind: CreditKind| {
                state
                    .credits
                    .iter()
                    .filter(move |c| c.kind == kind)
                    .map(|c| CurrencyLine::new(c.amount, c.currency))
                    .collect::<Vec<_>>()
            };
            let olingan = sum_in(credit_lines(CreditKind::Olingan), display, rate);
            let berilgan = sum_in(credit_lines(CreditKind::Berilgan), display, rate);

            serde_json::json!({
                "currency": display,
                "rateUsed": rate.map(ExchangeRate::get),
                "inventoryValue": {
                    "warehouse": warehouse_value,
                    "store": store_value,
                },
                "sales": sales,
                "credits": {
                    "olingan": olingan,
                    "berilgan": berilgan,
                },
            })
        })
        .await;

    Json(report)
}
