use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

use dokon_accounts::Capability;
use dokon_core::{CreditId, DomainError};
use dokon_ledger::action::{AddCredit, DeleteCredit, EditCredit};
use dokon_ledger::{Action, CreditPatch, LogKind};

use crate::app::routes::common::require_capability;
use crate::app::{dto, errors};
use crate::context::{ActorContext, ApiContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(add))
        .route("/:id/edit", post(edit))
        .route("/:id", delete(remove))
}

pub async fn list(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
) -> axum::response::Response {
    if let Err(response) =
        require_capability(&context, &actor, Capability::CreditsManage).await
    {
        return response;
    }

    let credits = context.controller.with_state(|s| s.credits.clone()).await;
    Json(credits).into_response()
}

pub async fn add(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::AddCreditRequest>,
) -> axum::response::Response {
    if let Err(response) =
        require_capability(&context, &actor, Capability::CreditsManage).await
    {
        return response;
    }

    if body.name.trim().is_empty() {
        return errors::domain_error_to_response(DomainError::validation("name cannot be empty"));
    }
    if body.amount <= 0.0 || !body.amount.is_finite() {
        return errors::domain_error_to_response(DomainError::validation(
            "amount must be a positive number",
        ));
    }

    let id = CreditId::new();
    let entry = body.into_entry(id);
    let log = dto::plain_log(actor.username(), "Nasiya qo'shildi", LogKind::Add);

    context
        .controller
        .dispatch(Action::AddCredit(AddCredit { entry, log }))
        .await;

    (
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": id.to_string() })),
    )
        .into_response()
}

pub async fn edit(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(patch): Json<CreditPatch>,
) -> axum::response::Response {
    if let Err(response) =
        require_capability(&context, &actor, Capability::CreditsManage).await
    {
        return response;
    }

    let id: CreditId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let exists = context
        .controller
        .with_state(|s| s.find_credit(id).is_some())
        .await;
    if !exists {
        return errors::domain_error_to_response(DomainError::not_found());
    }

    let log = dto::plain_log(actor.username(), "Nasiya tahrirlandi", LogKind::Edit);
    context
        .controller
        .dispatch(Action::EditCredit(EditCredit { id, patch, log }))
        .await;

    StatusCode::OK.into_response()
}

pub async fn remove(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(response) =
        require_capability(&context, &actor, Capability::CreditsManage).await
    {
        return response;
    }

    let id: CreditId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let exists = context
        .controller
        .with_state(|s| s.find_credit(id).is_some())
        .await;
    if !exists {
        return errors::domain_error_to_response(DomainError::not_found());
    }

    let log = dto::plain_log(actor.username(), "Nasiya o'chirildi", LogKind::Delete);
    context
        .controller
        .dispatch(Action::DeleteCredit(DeleteCredit { id, log }))
        .await;

    StatusCode::OK.into_response()
}
