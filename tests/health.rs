mod common;

use axum::extract::State;
use common::TestShop;
use flower_shop_api::routes::health::health_check;

#[tokio::test]
async fn health_check_returns_ok() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let response = health_check(State(shop.state.clone())).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert!(data.store.starts_with("http://127.0.0.1:"));
    Ok(())
}
