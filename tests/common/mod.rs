#![allow(dead_code)]

use std::{net::SocketAddr, time::Duration};

use chrono::Utc;
use flower_shop_api::{
    middleware::auth::SessionUser,
    mock_store::MockStore,
    models::Role,
    state::AppState,
    store::{Collection, RemoteStore},
};
use serde_json::json;

pub const SECRET: &str = "test-secret";

pub struct TestShop {
    pub mock: MockStore,
    pub state: AppState,
}

impl TestShop {
    pub async fn start() -> anyhow::Result<Self> {
        let mock = MockStore::new();
        let (addr, _handle) = mock.spawn(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let store = RemoteStore::new(&format!("http://{addr}"), Duration::from_secs(5))?;
        Ok(Self {
            mock,
            state: AppState::new(store, SECRET, 5),
        })
    }

    pub fn store(&self) -> &RemoteStore {
        &self.state.store
    }

    pub async fn product(&self, title: &str, category: &str, price: i64, stock: i32) -> String {
        self.mock
            .insert(
                Collection::Products,
                json!({
                    "title": title,
                    "description": format!("{title} from the test greenhouse"),
                    "category": category,
                    "image": "",
                    "price": price,
                    "discountPrice": null,
                    "stock": stock,
                    "rating": 0.0,
                    "createdAt": Utc::now(),
                }),
            )
            .await
    }

    pub async fn stock_of(&self, product_id: &str) -> i64 {
        self.mock
            .records(Collection::Products)
            .await
            .into_iter()
            .find(|p| p["id"] == product_id)
            .and_then(|p| p["stock"].as_i64())
            .unwrap_or(-1)
    }
}

pub fn customer(id: &str) -> SessionUser {
    SessionUser {
        user_id: id.to_string(),
        name: format!("Customer {id}"),
        email: format!("customer{id}@example.com"),
        role: Role::Customer,
    }
}

pub fn admin(id: &str) -> SessionUser {
    SessionUser {
        user_id: id.to_string(),
        name: "Admin".to_string(),
        email: "admin@example.com".to_string(),
        role: Role::Admin,
    }
}
