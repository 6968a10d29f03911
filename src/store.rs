//! Client for the hosted REST store that holds every collection of the shop.
//!
//! The store speaks plain JSON CRUD: a full listing per collection, single-record
//! reads, and create/overwrite/delete by id. It has no notion of users or sessions,
//! so callers filter listings by owner themselves.

use std::{fmt, sync::Arc, time::Duration};

use reqwest::{Client, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Products,
    Orders,
    Cart,
    Wishlist,
    Reviews,
    Contacts,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Users,
        Collection::Products,
        Collection::Orders,
        Collection::Cart,
        Collection::Wishlist,
        Collection::Reviews,
        Collection::Contacts,
    ];

    pub fn as_path(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Products => "products",
            Collection::Orders => "orders",
            Collection::Cart => "cart",
            Collection::Wishlist => "wishlist",
            Collection::Reviews => "reviews",
            Collection::Contacts => "contacts",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_path() == path)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store answered {status} for {collection}")]
    Status {
        collection: Collection,
        status: u16,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Clone)]
pub struct RemoteStore {
    client: Client,
    base_url: Arc<str>,
}

impl RemoteStore {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!("{}/{}", self.base_url, collection.as_path())
    }

    fn record_url(&self, collection: Collection, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection.as_path(), id)
    }

    /// Full listing of a collection. The hosted store answers 404 for a collection
    /// with no records, which is reported as an empty list.
    pub async fn list<T: DeserializeOwned>(&self, collection: Collection) -> StoreResult<Vec<T>> {
        let response = self.client.get(self.collection_url(collection)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let response = check_status(collection, response)?;
        Ok(response.json().await?)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
    ) -> StoreResult<Option<T>> {
        let response = self
            .client
            .get(self.record_url(collection, id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(collection, response)?;
        Ok(Some(response.json().await?))
    }

    pub async fn create<B, T>(&self, collection: Collection, body: &B) -> StoreResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.collection_url(collection))
            .json(body)
            .send()
            .await?;
        let response = check_status(collection, response)?;
        Ok(response.json().await?)
    }

    /// Overwrites the fields present in `body`. Returns `None` when the record is gone.
    pub async fn update<B, T>(
        &self,
        collection: Collection,
        id: &str,
        body: &B,
    ) -> StoreResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .put(self.record_url(collection, id))
            .json(body)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(collection, response)?;
        Ok(Some(response.json().await?))
    }

    /// Returns `false` when there was nothing to delete.
    pub async fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        let response = self
            .client
            .delete(self.record_url(collection, id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(collection, response)?;
        Ok(true)
    }
}

fn check_status(
    collection: Collection,
    response: reqwest::Response,
) -> StoreResult<reqwest::Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(StoreError::Status {
            collection,
            status: response.status().as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_paths_round_trip() {
        for collection in Collection::ALL {
            assert_eq!(Collection::from_path(collection.as_path()), Some(collection));
        }
        assert_eq!(Collection::from_path("favorites"), None);
    }

    #[test]
    fn urls_ignore_trailing_slash() {
        let store = RemoteStore::new("http://localhost:4000/", Duration::from_secs(1)).unwrap();
        assert_eq!(store.collection_url(Collection::Cart), "http://localhost:4000/cart");
        assert_eq!(
            store.record_url(Collection::Products, "7"),
            "http://localhost:4000/products/7"
        );
    }
}
