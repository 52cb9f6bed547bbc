use std::sync::Arc;

use stocklens_api::{app, seed};
use stocklens_engine::{EngineConfig, InMemoryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stocklens_observability::init();

    let store = Arc::new(InMemoryStore::new());
    seed::demo_data(&store);

    let router = app::build_app(store, EngineConfig::default());

    let addr = std::env::var("STOCKLENS_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;
    Ok(())
}
