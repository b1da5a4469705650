use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use dokon_ledger::action::{ClearDraft, SetDraft, SetUi};
use dokon_ledger::{Action, UiPatch};

use crate::context::ApiContext;

pub fn router() -> Router {
    Router::new()
        .route("/prefs", get(get_prefs).post(set_prefs))
        .route("/drafts", get(list_drafts))
        .route("/drafts/:name", post(set_draft).delete(clear_draft))
}

pub async fn get_prefs(Extension(context): Extension<ApiContext>) -> impl IntoResponse {
    Json(context.controller.with_state(|s| s.ui.clone()).await)
}

pub async fn set_prefs(
    Extension(context): Extension<ApiContext>,
    Json(patch): Json<UiPatch>,
) -> impl IntoResponse {
    let applied = context
        .controller
        .dispatch(Action::SetUi(SetUi { patch }))
        .await;

    Json(serde_json::json!({ "applied": applied.is_changed() }))
}

pub async fn list_drafts(Extension(context): Extension<ApiContext>) -> impl IntoResponse {
    Json(context.controller.with_state(|s| s.drafts.clone()).await)
}

pub async fn set_draft(
    Extension(context): Extension<ApiContext>,
    Path(name): Path<String>,
    Json(value): Json<serde_json::Value>,
) -> impl IntoResponse {
    let applied = context
        .controller
        .dispatch(Action::SetDraft(SetDraft { name, value }))
        .await;

    Json(serde_json::json!({ "applied": applied.is_changed() }))
}

pub async fn clear_draft(
    Extension(context): Extension<ApiContext>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let applied = context
        .controller
        .dispatch(Action::ClearDraft(ClearDraft { name }))
        .await;

    match applied.is_changed() {
        true => StatusCode::OK,
        false => StatusCode::NOT_FOUND,
    }
}
