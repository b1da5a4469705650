use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;

use dokon_accounts::{find, is_protected, Account, AccountPatch, Capability, Username};
use dokon_core::{DomainError, LogEntryId};
use dokon_ledger::action::{AddAccount, DeleteAccount, EditAccount};
use dokon_ledger::Action;

use crate::app::routes::common::require_capability;
use crate::app::{dto, errors};
use crate::context::{ActorContext, ApiContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(add))
        .route("/:username/edit", post(edit))
        .route("/:username", delete(remove))
}

pub async fn list(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
) -> axum::response::Response {
    if let Err(response) =
        require_capability(&context, &actor, Capability::ManageAccounts).await
    {
        return response;
    }

    let accounts = context.controller.with_state(|s| s.accounts.clone()).await;
    Json(accounts).into_response()
}

/// Create an account. Uniqueness is pre-validated here (case-insensitive,
/// including the protected names); the reducer appends without checking.
pub async fn add(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::AddAccountRequest>,
) -> axum::response::Response {
    if let Err(response) =
        require_capability(&context, &actor, Capability::ManageAccounts).await
    {
        return response;
    }

    let username = match Username::new(body.username) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if is_protected(username.as_str()) {
        return errors::domain_error_to_response(DomainError::conflict(format!(
            "'{username}' is a reserved admin identity"
        )));
    }

    let taken = context
        .controller
        .with_state(|s| find(&s.accounts, username.as_str()).is_some())
        .await;
    if taken {
        return errors::domain_error_to_response(DomainError::conflict(format!(
            "an account named '{username}' already exists"
        )));
    }

    let account = Account {
        username: username.clone(),
        label: body.label,
        permissions: body.permissions,
    };

    context
        .controller
        .dispatch(Action::AddAccount(AddAccount {
            account,
            log: None,
            entry_id: LogEntryId::new(),
            occurred_at: Utc::now(),
            actor: actor.username().to_string(),
        }))
        .await;

    (
        StatusCode::CREATED,
        Json(serde_json::json!({ "username": username.as_str() })),
    )
        .into_response()
}

pub async fn edit(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Path(username): Path<String>,
    Json(patch): Json<AccountPatch>,
) -> axum::response::Response {
    if let Err(response) =
        require_capability(&context, &actor, Capability::ManageAccounts).await
    {
        return response;
    }

    // The reducer would silently no-op on a protected target; answer 403 so
    // the dispatcher gets feedback.
    if is_protected(&username) {
        return errors::domain_error_to_response(DomainError::forbidden(format!(
            "'{username}' is a protected account and cannot be edited"
        )));
    }

    let exists = context
        .controller
        .with_state(|s| find(&s.accounts, &username).is_some())
        .await;
    if !exists {
        return errors::domain_error_to_response(DomainError::not_found());
    }

    context
        .controller
        .dispatch(Action::EditAccount(EditAccount {
            username,
            patch,
            log: None,
            entry_id: LogEntryId::new(),
            occurred_at: Utc::now(),
            actor: actor.username().to_string(),
        }))
        .await;

    StatusCode::OK.into_response()
}

pub async fn remove(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Path(username): Path<String>,
) -> axum::response::Response {
    if let Err(response) =
        require_capability(&context, &actor, Capability::ManageAccounts).await
    {
        return response;
    }

    if is_protected(&username) {
        return errors::domain_error_to_response(DomainError::forbidden(format!(
            "'{username}' is a protected account and cannot be deleted"
        )));
    }

    let exists = context
        .controller
        .with_state(|s| find(&s.accounts, &username).is_some())
        .await;
    if !exists {
        return errors::domain_error_to_response(DomainError::not_found());
    }

    context
        .controller
        .dispatch(Action::DeleteAccount(DeleteAccount {
            username,
            log: None,
            entry_id: LogEntryId::new(),
            occurred_at: Utc::now(),
            actor: actor.username().to_string(),
        }))
        .await;

    StatusCode::OK.into_response()
}
