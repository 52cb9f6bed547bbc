//! HTTP application wiring (Axum router + service wiring).
//!
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: response envelopes and definition JSON mapping
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use stocklens_engine::{
    DocumentStore, EngineConfig, InMemoryCache, InMemoryStore, ReportCache, ReportGenerator,
};

pub mod dto;
pub mod errors;
pub mod routes;

/// Shared per-process services handed to every handler.
pub struct AppServices<S: DocumentStore, C: ReportCache> {
    pub generator: ReportGenerator<S, C>,
}

/// The concrete service set of the dev binary and the test suite.
pub type DevServices = AppServices<InMemoryStore, InMemoryCache>;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(store: Arc<InMemoryStore>, config: EngineConfig) -> Router {
    let services = Arc::new(AppServices {
        generator: ReportGenerator::new(store, InMemoryCache::new(), config),
    });
    Router::new()
        .route("/health", get(routes::health))
        .merge(routes::router())
        .with_state(services)
}
