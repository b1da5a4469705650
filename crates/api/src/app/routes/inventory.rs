use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

use dokon_accounts::Capability;
use dokon_core::{DomainError, ItemId};
use dokon_ledger::action::{AddItem, AdjustQty, DeleteItem, EditItem, MoveToStore};
use dokon_ledger::{Action, InventoryItem, ItemPatch, LogKind};

use crate::app::routes::common::require_capability;
use crate::app::{dto, errors};
use crate::context::{ActorContext, ApiContext};

pub fn router() -> Router {
    Router::new()
        .route("/warehouse", get(list_warehouse).post(add_warehouse))
        .route("/store", get(list_store).post(add_store))
        .route("/warehouse/:id/edit", post(edit_warehouse))
        .route("/warehouse/:id/adjust", post(adjust_warehouse))
        .route("/warehouse/:id", delete(delete_warehouse))
        .route("/store/:id", delete(delete_store))
        .route("/move", post(move_to_store))
}

pub async fn list_warehouse(Extension(context): Extension<ApiContext>) -> impl IntoResponse {
    let items = context.controller.with_state(|s| s.warehouse.clone()).await;
    Json(items)
}

pub async fn list_store(Extension(context): Extension<ApiContext>) -> impl IntoResponse {
    let items = context.controller.with_state(|s| s.store.clone()).await;
    Json(items)
}

pub async fn add_warehouse(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::AddItemRequest>,
) -> axum::response::Response {
    add_item(context, actor, body, Pool::Warehouse).await
}

pub async fn add_store(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::AddItemRequest>,
) -> axum::response::Response {
    add_item(context, actor, body, Pool::Store).await
}

#[derive(Clone, Copy)]
enum Pool {
    Warehouse,
    Store,
}

async fn add_item(
    context: ApiContext,
    actor: ActorContext,
    body: dto::AddItemRequest,
    pool: Pool,
) -> axum::response::Response {
    if let Err(response) =
        require_capability(&context, &actor, Capability::AddProducts).await
    {
        return response;
    }

    if body.name.trim().is_empty() {
        return errors::domain_error_to_response(DomainError::validation("name cannot be empty"));
    }
    if body.qty <= 0.0 || !body.qty.is_finite() {
        return errors::domain_error_to_response(DomainError::validation(
            "qty must be a positive number",
        ));
    }

    let id = ItemId::new();
    let item = body.into_item(id);
    let rate = effective_rate(&context).await;
    let log = dto::item_log(
        actor.username(),
        "Mahsulot qo'shildi",
        LogKind::Add,
        &item,
        item.qty,
        rate,
    );

    let payload = AddItem { item, log };
    let action = match pool {
        Pool::Warehouse => Action::AddWarehouse(payload),
        Pool::Store => Action::AddStore(payload),
    };
    context.controller.dispatch(action).await;

    (
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": id.to_string() })),
    )
        .into_response()
}

pub async fn edit_warehouse(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(patch): Json<ItemPatch>,
) -> axum::response::Response {
    let id: ItemId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let Some(item) = context
        .controller
        .with_state(|s| s.find_warehouse(id).cloned())
        .await
    else {
        return errors::domain_error_to_response(DomainError::not_found());
    };

    let rate = effective_rate(&context).await;
    let log = dto::item_log(
        actor.username(),
        "Mahsulot tahrirlandi",
        LogKind::Edit,
        &item,
        item.qty,
        rate,
    );

    context
        .controller
        .dispatch(Action::EditWarehouse(EditItem { id, patch, log }))
        .await;

    StatusCode::OK.into_response()
}

pub async fn adjust_warehouse(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::AdjustQtyRequest>,
) -> axum::response::Response {
    let id: ItemId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if !body.delta.is_finite() || body.delta == 0.0 {
        return errors::domain_error_to_response(DomainError::validation(
            "delta must be a non-zero number",
        ));
    }

    let Some(item) = context
        .controller
        .with_state(|s| s.find_warehouse(id).cloned())
        .await
    else {
        return errors::domain_error_to_response(DomainError::not_found());
    };

    let rate = effective_rate(&context).await;
    let log = dto::item_log(
        actor.username(),
        "Miqdor tuzatildi",
        LogKind::Edit,
        &item,
        body.delta,
        rate,
    );

    context
        .controller
        .dispatch(Action::AdjustWarehouseQty(AdjustQty {
            id,
            delta: body.delta,
            log,
        }))
        .await;

    StatusCode::OK.into_response()
}

pub async fn delete_warehouse(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    delete_item(context, actor, id, Pool::Warehouse).await
}

pub async fn delete_store(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    delete_item(context, actor, id, Pool::Store).await
}

async fn delete_item(
    context: ApiContext,
    actor: ActorContext,
    id: String,
    pool: Pool,
) -> axum::response::Response {
    let id: ItemId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let found = context
        .controller
        .with_state(|s| match pool {
            Pool::Warehouse => s.find_warehouse(id).cloned(),
            Pool::Store => s.find_store(id).cloned(),
        })
        .await;
    let Some(item) = found else {
        return errors::domain_error_to_response(DomainError::not_found());
    };

    let rate = effective_rate(&context).await;
    let log = dto::item_log(
        actor.username(),
        "Mahsulot o'chirildi",
        LogKind::Delete,
        &item,
        item.qty,
        rate,
    );

    let payload = DeleteItem { id, log };
    let action = match pool {
        Pool::Warehouse => Action::DeleteWarehouse(payload),
        Pool::Store => Action::DeleteStore(payload),
    };
    context.controller.dispatch(action).await;

    StatusCode::OK.into_response()
}

/// Transfer quantity from the warehouse into the store. The store row keeps
/// the warehouse row's pricing when it is created by the transfer.
pub async fn move_to_store(
    Extension(context): Extension<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::MoveToStoreRequest>,
) -> axum::response::Response {
    if body.qty <= 0.0 || !body.qty.is_finite() {
        return errors::domain_error_to_response(DomainError::validation(
            "qty must be a positive number",
        ));
    }

    let Some(source) = context
        .controller
        .with_state(|s| s.find_warehouse(body.id).cloned())
        .await
    else {
        return errors::domain_error_to_response(DomainError::not_found());
    };

    if body.qty > source.qty {
        return errors::domain_error_to_response(DomainError::validation(format!(
            "cannot move {} units; only {} in the warehouse",
            body.qty, source.qty
        )));
    }

    let rate = effective_rate(&context).await;
    let log = dto::item_log(
        actor.username(),
        "Do'konga o'tkazildi",
        LogKind::Edit,
        &source,
        body.qty,
        rate,
    );

    let item = InventoryItem {
        qty: body.qty,
        ..source
    };
    context
        .controller
        .dispatch(Action::MoveToStore(MoveToStore {
            id: body.id,
            qty: body.qty,
            item,
            log,
        }))
        .await;

    StatusCode::OK.into_response()
}

pub(super) async fn effective_rate(context: &ApiContext) -> Option<f64> {
    let manual = context.controller.with_state(|s| s.exchange_rate).await;
    context.rates.effective_rate(manual).await
}
