//! HTTP API application wiring (Axum router + service wiring).
//!
//! This folder is structured like:
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and audit-log construction
//! - `errors.rs`: consistent error responses

use axum::{routing::get, Extension, Router};

use crate::context::ApiContext;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(context: ApiContext) -> Router {
    // Domain routes require an acting account (audit logs + capabilities).
    let domain = routes::router()
        .layer(Extension(context))
        .layer(axum::middleware::from_fn(middleware::actor_middleware));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(domain)
}
