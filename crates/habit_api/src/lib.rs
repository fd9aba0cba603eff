//! HTTP surface of the habit tracker.
//!
//! # Responsibility
//! - Expose items, achievements and quotes as JSON endpoints.
//! - Map service errors onto `{"detail": ...}` responses.
//! - Answer browser preflights for the configured origins.
//!
//! # Invariants
//! - Handlers lock the shared connection only around synchronous storage calls.

mod cors;
mod error;
mod handlers;

pub use error::ApiError;

use axum::routing::{get, post};
use axum::{middleware, Router};
use habit_core::db::SharedConnection;
use habit_core::{QuotePipeline, QuoteService};
use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    conn: SharedConnection,
    quotes: QuoteService,
}

impl AppState {
    pub fn new(conn: SharedConnection, pipeline: QuotePipeline) -> Self {
        Self {
            quotes: QuoteService::new(conn.clone(), pipeline),
            conn,
        }
    }
}

/// Builds the router with CORS restricted to `allowed_origins`.
pub fn router(state: AppState, allowed_origins: Vec<String>) -> Router {
    let origins: Arc<[String]> = allowed_origins.into();

    // `{key}` is shared by date lookups and id-scoped routes: sibling
    // parameters at one path position must carry the same name.
    Router::new()
        .route("/", get(handlers::root))
        .route("/items", get(handlers::list_items).post(handlers::create_item))
        .route(
            "/achievements",
            get(handlers::list_month).post(handlers::record_achievement),
        )
        .route("/achievements/quotes", post(handlers::reveal_quote))
        .route("/achievements/{key}", get(handlers::get_achievement))
        .route("/achievements/{key}/quotes", post(handlers::attach_quote))
        .layer(middleware::from_fn_with_state(origins, cors::cors))
        .layer(middleware::from_fn(cors::log_requests))
        .with_state(state)
}

/// Serves the API on `listener` until the server stops.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    allowed_origins: Vec<String>,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!("event=server_start module=api status=ok addr={addr}");
    axum::serve(listener, router(state, allowed_origins)).await
}
