use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::context::{ActorContext, ApiContext};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
) -> impl IntoResponse {
    let capabilities = context.controller.capabilities(actor.username()).await;
    let protected = dokon_accounts::is_protected(actor.username());

    Json(serde_json::json!({
        "username": actor.username(),
        "protected": protected,
        "permissions": capabilities,
    }))
}

/// Full state snapshot for rendering/reporting layers (read-only).
pub async fn state(Extension(context): Extension<ApiContext>) -> impl IntoResponse {
    Json(context.controller.snapshot().await)
}

pub async fn save_status(Extension(context): Extension<ApiContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": context.controller.save_status(),
    }))
}
