use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use dokon_core::ExchangeRate;
use dokon_ledger::action::SetExchangeRate;
use dokon_ledger::Action;

use crate::app::{dto, errors};
use crate::context::ApiContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(current))
        .route("/refresh", post(refresh))
        .route("/override", post(set_override))
}

pub async fn current(Extension(context): Extension<ApiContext>) -> impl IntoResponse {
    let manual = context.controller.with_state(|s| s.exchange_rate).await;
    let state = context.rates.current().await;
    let effective = context.rates.effective_rate(manual).await;

    Json(serde_json::json!({
        "override": manual,
        "fetched": state,
        "effective": effective,
    }))
}

/// Re-query the remote source. With a manual override in effect the
/// override wins and no fetch happens.
pub async fn refresh(Extension(context): Extension<ApiContext>) -> impl IntoResponse {
    let manual = context.controller.with_state(|s| s.exchange_rate).await;
    let state = context.rates.refresh(manual).await;
    Json(state)
}

pub async fn set_override(
    Extension(context): Extension<ApiContext>,
    Json(body): Json<dto::OverrideRateRequest>,
) -> axum::response::Response {
    if let Some(rate) = body.rate {
        if let Err(e) = ExchangeRate::new(rate) {
            return errors::domain_error_to_response(e);
        }
    }

    let applied = context
        .controller
        .dispatch(Action::SetExchangeRate(SetExchangeRate { rate: body.rate }))
        .await;

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "applied": applied.is_changed(),
            "override": body.rate,
        })),
    )
        .into_response()
}
