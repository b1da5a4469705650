use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use dokon_accounts::Capability;
use dokon_core::{format_amount, DomainError};
use dokon_ledger::action::Sell;
use dokon_ledger::{Action, InventoryItem, LogKind};

use crate::app::routes::common::require_capability;
use crate::app::routes::inventory::effective_rate;
use crate::app::{dto, errors};
use crate::context::{ActorContext, ApiContext};

pub fn router() -> Router {
    Router::new()
        .route("/store", post(sell_store))
        .route("/warehouse", post(sell_warehouse))
        .route("/wholesale", post(wholesale))
}

#[derive(Clone, Copy)]
enum Pool {
    Warehouse,
    Store,
}

pub async fn sell_store(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::SellRequest>,
) -> axum::response::Response {
    sell(context, actor, body, Pool::Store, "Sotuv (do'kon)").await
}

pub async fn sell_warehouse(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::SellRequest>,
) -> axum::response::Response {
    sell(context, actor, body, Pool::Warehouse, "Sotuv (ombor)").await
}

/// One sale against one pool. The over-sell guard lives here: the reducer
/// deliberately does not clamp, so the dispatch boundary must refuse
/// quantities above the available stock.
async fn sell(
    context: ApiContext,
    actor: ActorContext,
    body: dto::SellRequest,
    pool: Pool,
    label: &str,
) -> axum::response::Response {
    if body.qty <= 0.0 || !body.qty.is_finite() {
        return errors::domain_error_to_response(DomainError::validation(
            "qty must be a positive number",
        ));
    }

    let found = context
        .controller
        .with_state(|s| match pool {
            Pool::Warehouse => s.find_warehouse(body.id).cloned(),
            Pool::Store => s.find_store(body.id).cloned(),
        })
        .await;
    let Some(item) = found else {
        return errors::domain_error_to_response(DomainError::not_found());
    };

    if let Err(response) = check_stock(&item, body.qty) {
        return response;
    }

    let rate = effective_rate(&context).await;
    let log = dto::item_log(actor.username(), label, LogKind::Sell, &item, body.qty, rate);

    let payload = Sell {
        id: body.id,
        qty: body.qty,
        log,
    };
    let action = match pool {
        Pool::Warehouse => Action::SellWarehouse(payload),
        Pool::Store => Action::SellStore(payload),
    };
    context.controller.dispatch(action).await;

    let total = body.qty * item.unit_price;
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "totalNative": total,
            "formatted": format_amount(total, item.currency),
            "currency": item.currency,
        })),
    )
        .into_response()
}

/// Wholesale checkout: a batch of store sales dispatched line by line, gated
/// by the `wholesaleAllowed` capability. All lines are validated against the
/// current stock before the first dispatch.
pub async fn wholesale(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::WholesaleRequest>,
) -> axum::response::Response {
    if let Err(response) =
        require_capability(&context, &actor, Capability::WholesaleAllowed).await
    {
        return response;
    }

    if body.lines.is_empty() {
        return errors::domain_error_to_response(DomainError::validation(
            "wholesale checkout needs at least one line",
        ));
    }

    // Resolve and validate every line up front.
    let mut resolved: Vec<(InventoryItem, f64)> = Vec::with_capacity(body.lines.len());
    for line in &body.lines {
        if line.qty <= 0.0 || !line.qty.is_finite() {
            return errors::domain_error_to_response(DomainError::validation(
                "qty must be a positive number",
            ));
        }
        let Some(item) = context
            .controller
            .with_state(|s| s.find_store(line.id).cloned())
            .await
        else {
            return errors::domain_error_to_response(DomainError::not_found());
        };
        if let Err(response) = check_stock(&item, line.qty) {
            return response;
        }
        resolved.push((item, line.qty));
    }

    let rate = effective_rate(&context).await;
    let mut lines_out = Vec::with_capacity(resolved.len());
    for (item, qty) in resolved {
        let log = dto::item_log(
            actor.username(),
            "Ulgurji sotuv",
            LogKind::Sell,
            &item,
            qty,
            rate,
        );
        context
            .controller
            .dispatch(Action::SellStore(Sell { id: item.id, qty, log }))
            .await;
        let total = qty * item.unit_price;
        lines_out.push(serde_json::json!({
            "id": item.id.to_string(),
            "qty": qty,
            "totalNative": total,
            "formatted": format_amount(total, item.currency),
            "currency": item.currency,
        }));
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({ "lines": lines_out })),
    )
        .into_response()
}

fn check_stock(item: &InventoryItem, qty: f64) -> Result<(), axum::response::Response> {
    if qty > item.qty {
        Err(errors::domain_error_to_response(DomainError::validation(
            format!(
                "cannot sell {qty} of '{}'; only {} in stock",
                item.name, item.qty
            ),
        )))
    } else {
        Ok(())
    }
}
