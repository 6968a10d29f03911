use std::net::SocketAddr;

use flower_shop_api::mock_store::MockStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Serves an empty in-memory store, for running the API without the hosted one.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = std::env::var("MOCK_STORE_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(4000);
    let store = MockStore::new();
    let (addr, handle) = store.spawn(SocketAddr::from(([127, 0, 0, 1], port))).await?;
    tracing::info!("mock store listening on http://{}", addr);

    handle.await?;
    Ok(())
}
