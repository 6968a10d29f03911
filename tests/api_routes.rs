mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::TestShop;
use flower_shop_api::app::create_app;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn send(shop: &TestShop, request: Request<Body>) -> (StatusCode, Value) {
    let response = create_app(shop.state.clone())
        .oneshot(request)
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    builder.body(Body::empty()).expect("request")
}

async fn register_and_login(shop: &TestShop, email: &str) -> String {
    let (status, _) = send(
        shop,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "name": "Rosa", "email": email, "password": "secret123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        shop,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": email, "password": "secret123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn cart_requires_login() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let product = shop.product("Roses", "roses", 4500, 5).await;

    let (status, body) = send(
        &shop,
        json_request(
            "POST",
            "/api/cart",
            None,
            json!({ "productId": product, "quantity": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["data"]["code"], "not_logged_in");
    assert!(shop.mock.records(flower_shop_api::store::Collection::Cart).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_invalid_session() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let (status, body) = send(&shop, get("/api/cart", Some("Bearer nope"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["data"]["code"], "invalid_session");
    Ok(())
}

#[tokio::test]
async fn login_then_shop_over_http() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let product = shop.product("Peonies", "peonies", 5200, 5).await;
    let token = register_and_login(&shop, "rosa@example.com").await;

    let (status, body) = send(&shop, get("/api/auth/me", Some(token.as_str()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "rosa@example.com");
    assert_eq!(body["data"]["role"], "customer");

    let add = |quantity: i32| {
        json_request(
            "POST",
            "/api/cart",
            Some(token.as_str()),
            json!({ "productId": product, "quantity": quantity }),
        )
    };
    let (status, _) = send(&shop, add(3)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&shop, add(3)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["data"]["code"], "exceeds_stock");

    let (status, body) = send(&shop, get("/api/cart", Some(token.as_str()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["itemCount"], 3);
    let row_id = body["data"]["items"][0]["id"]
        .as_str()
        .expect("row id")
        .to_string();

    let (status, body) = send(
        &shop,
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/cart/{row_id}"))
            .header(header::AUTHORIZATION, &token)
            .body(Body::empty())?,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "cancelled");

    let (status, body) = send(
        &shop,
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/cart/{row_id}?confirm=true"))
            .header(header::AUTHORIZATION, &token)
            .body(Body::empty())?,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "removed");
    Ok(())
}

#[tokio::test]
async fn customer_cannot_reach_admin_routes() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let token = register_and_login(&shop, "buyer@example.com").await;

    let (status, body) = send(&shop, get("/api/admin/dashboard", Some(token.as_str()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["data"]["code"], "forbidden");
    Ok(())
}

#[tokio::test]
async fn catalog_is_public_and_filterable() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    shop.product("Roses", "roses", 4500, 5).await;
    shop.product("Tulips", "tulips", 3000, 0).await;
    shop.product("Lilies", "lilies", 3800, 2).await;

    let (status, body) = send(
        &shop,
        get("/api/products?inStock=true&sortBy=price&sortOrder=asc&perPage=10", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|p| p["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Lilies", "Roses"]);
    assert_eq!(body["meta"]["total"], 2);
    Ok(())
}

#[tokio::test]
async fn unknown_path_is_json_not_found() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let (status, body) = send(&shop, get("/nowhere", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"]["path"], "/nowhere");
    Ok(())
}
