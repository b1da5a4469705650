use std::path::PathBuf;
use std::sync::Arc;

use dokon_api::context::ApiContext;
use dokon_infra::{DebouncedSaver, InMemoryStateStore, ShopController, SqliteStateStore, StateStore};
use dokon_rates::{HttpRateSource, RateProvider};

const DEFAULT_RATE_URL: &str = "https://open.er-api.com/v6/latest/USD";

#[tokio::main]
async fn main() {
    dokon_observability::init();

    let store: Arc<dyn StateStore> = match std::env::var("DOKON_DB_PATH").ok() {
        Some(path) if path == ":memory:" => {
            tracing::warn!("DOKON_DB_PATH=:memory:; state will not survive restarts");
            Arc::new(InMemoryStateStore::new())
        }
        Some(path) => Arc::new(SqliteStateStore::new(PathBuf::from(path))),
        None => {
            let path = SqliteStateStore::default_db_path()
                .expect("failed to resolve default state database path");
            Arc::new(SqliteStateStore::new(path))
        }
    };

    let owner = std::env::var("DOKON_OWNER").unwrap_or_else(|_| {
        tracing::warn!("DOKON_OWNER not set; using 'admin'");
        "admin".to_string()
    });

    let rate_url =
        std::env::var("DOKON_RATE_URL").unwrap_or_else(|_| DEFAULT_RATE_URL.to_string());

    let controller = Arc::new(
        ShopController::load(store, &owner, DebouncedSaver::DEFAULT_WINDOW).await,
    );
    let rates = Arc::new(RateProvider::new(Arc::new(HttpRateSource::new(rate_url))));

    let app = dokon_api::app::build_app(ApiContext { controller, rates });

    let addr = std::env::var("DOKON_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
