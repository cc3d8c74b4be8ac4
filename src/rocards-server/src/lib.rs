//! rocards API server
//!
//! REST API for drawing cards, opening packs and tracking per-user card
//! collections.

pub mod config;
pub mod error;
pub mod handlers;
pub mod rate_limit;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use rocards::DrawEngine;
use rocards_ledger::{CollectionLedger, LedgerDb};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::ServerConfig;
pub use error::ApiError;
use handlers::ApiDoc;
use rate_limit::RateLimiter;

// =============================================================================
// App State
// =============================================================================

pub struct AppState {
    pub engine: DrawEngine,
    pub ledger: CollectionLedger<LedgerDb>,
    pub max_pack_size: usize,
}

impl AppState {
    pub fn new(engine: DrawEngine, ledger: CollectionLedger<LedgerDb>, max_pack_size: usize) -> Self {
        Self {
            engine,
            ledger,
            max_pack_size,
        }
    }
}

// =============================================================================
// Router
// =============================================================================

/// Build the full application router with middleware
pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let mut open_pack: MethodRouter<Arc<AppState>> = post(handlers::open_pack);
    if config.pack_rate_limit > 0 {
        let limiter = Arc::new(RateLimiter::per_minute(config.pack_rate_limit));
        open_pack = open_pack.layer(middleware::from_fn_with_state(
            limiter,
            rate_limit::enforce,
        ));
    }

    let api_routes = Router::new()
        .route("/cards", get(handlers::list_cards))
        .route("/cards/generate", post(handlers::generate_card))
        .route("/cards/{card_id}", get(handlers::get_card))
        .route("/packs/open", open_pack)
        .route(
            "/collection/{user_id}",
            get(handlers::get_collection).post(handlers::add_to_collection),
        )
        .route(
            "/collection/{user_id}/cards/{card_id}",
            get(handlers::get_card_quantity),
        );

    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::get_stats))
        .nest("/api", api_routes)
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state);

    if config.rate_limit > 0 {
        let limiter = Arc::new(RateLimiter::per_minute(config.rate_limit));
        app = app.layer(middleware::from_fn_with_state(limiter, rate_limit::enforce));
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    app.layer(cors)
        .layer(timeout_layer(config.request_timeout))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// Requests running past `timeout` are answered with 408
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}
