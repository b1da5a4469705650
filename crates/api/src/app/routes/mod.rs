use axum::{routing::get, Router};

pub mod accounts;
pub mod common;
pub mod credits;
pub mod inventory;
pub mod rates;
pub mod reports;
pub mod sales;
pub mod system;
pub mod ui;

/// Router for all actor-scoped endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/state", get(system::state))
        .route("/save-status", get(system::save_status))
        .nest("/inventory", inventory::router())
        .nest("/sales", sales::router())
        .nest("/credits", credits::router())
        .nest("/accounts", accounts::router())
        .nest("/rates", rates::router())
        .nest("/reports", reports::router())
        .nest("/ui", ui::router())
}
