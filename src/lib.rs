use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::{middleware as axum_middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod types;
pub mod uploads;

/// Shared application state injected into every handler.
///
/// The sequence lock serializes identifier allocation (contract, receipt and
/// pre-contract numbers) across concurrent requests; see `services::sequence`.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub uploads_dir: PathBuf,
    pub sequence_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(pool: SqlitePool, uploads_dir: PathBuf) -> Self {
        Self {
            pool,
            uploads_dir,
            sequence_lock: Arc::new(Mutex::new(())),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let max_body = config::config().uploads.max_request_size_bytes;

    Router::new()
        .route("/health", get(health))
        // Uploaded documents are served without authentication
        .nest_service("/uploads", ServeDir::new(&state.uploads_dir))
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(max_body))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use axum::routing::post;

    Router::new().route("/api/auth/login", post(handlers::auth::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(contract_routes())
        .merge(precontract_routes())
        .merge(receipt_routes())
        .merge(broker_routes())
        .merge(clearance_routes())
        .merge(property_routes())
        .merge(user_routes())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::auth::require_user,
        ))
}

fn contract_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::{commissions, contracts};

    Router::new()
        .route("/api/contract", post(contracts::create))
        .route("/api/contracts", get(contracts::list))
        .route(
            "/api/contract/:id",
            get(contracts::get_one)
                .put(contracts::update)
                .delete(contracts::delete),
        )
        .route("/api/broker-commissions", get(commissions::list))
        .route("/api/broker-reports/:broker_id", get(commissions::reports))
        .route(
            "/api/broker-statistics/:broker_id",
            get(commissions::statistics),
        )
}

fn precontract_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::precontracts;

    Router::new()
        .route("/api/precontract", post(precontracts::create))
        .route("/api/precontracts", get(precontracts::list))
        .route(
            "/api/precontract/:id",
            axum::routing::patch(precontracts::patch).delete(precontracts::delete),
        )
}

fn receipt_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::receipts;

    Router::new()
        .route("/api/receipt", post(receipts::create))
        .route("/api/receipts", get(receipts::list))
        .route(
            "/api/receipt/:id",
            get(receipts::get_one).delete(receipts::delete),
        )
        .route("/api/receipts-stats", get(receipts::stats))
}

fn broker_routes() -> Router<AppState> {
    use handlers::brokers;

    Router::new()
        .route("/api/brokers", get(brokers::list).post(brokers::create))
        .route(
            "/api/brokers/:id",
            get(brokers::get_one)
                .put(brokers::update)
                .delete(brokers::delete),
        )
}

fn clearance_routes() -> Router<AppState> {
    use handlers::clearances;

    Router::new()
        .route(
            "/api/clearances",
            get(clearances::list).post(clearances::create),
        )
        .route(
            "/api/clearances/:id",
            get(clearances::get_one)
                .put(clearances::update)
                .delete(clearances::delete),
        )
}

fn property_routes() -> Router<AppState> {
    use axum::routing::put;
    use handlers::{buildings, invoices, payments, units};

    Router::new()
        .route("/api/buildings", get(buildings::list).post(buildings::create))
        .route(
            "/api/buildings/:id",
            get(buildings::get_one)
                .put(buildings::update)
                .delete(buildings::delete),
        )
        .route("/api/units", get(units::list).post(units::create))
        .route(
            "/api/units/:id",
            get(units::get_one).put(units::update).delete(units::delete),
        )
        .route("/api/payments", get(payments::list).post(payments::create))
        .route(
            "/api/payments/:id/payment-status",
            put(payments::update_status),
        )
        .route("/api/payments/:id/details", get(payments::details))
        .route("/api/invoices", get(invoices::list).post(invoices::create))
}

fn user_routes() -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/api/users", get(users::list).post(users::create))
        .route(
            "/api/users/:id",
            get(users::get_one).put(users::update).delete(users::delete),
        )
        .route("/api/permissions", get(users::permissions))
}

async fn health(State(state): State<AppState>) -> (axum::http::StatusCode, Json<Value>) {
    let now = chrono::Utc::now();

    match database::manager::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": { "status": "degraded", "timestamp": now, "database_error": e.to_string() }
            })),
        ),
    }
}
