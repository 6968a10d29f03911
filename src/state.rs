use std::sync::Arc;

use crate::{config::AppConfig, store::RemoteStore};

#[derive(Clone)]
pub struct AppState {
    pub store: RemoteStore,
    pub session_secret: Arc<str>,
    pub low_stock_threshold: i32,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store = RemoteStore::new(&config.store_url, config.store_timeout)?;
        Ok(Self::new(store, &config.session_secret, config.low_stock_threshold))
    }

    pub fn new(store: RemoteStore, session_secret: &str, low_stock_threshold: i32) -> Self {
        Self {
            store,
            session_secret: Arc::from(session_secret),
            low_stock_threshold,
        }
    }
}
