//! Store connection lifecycle
//!
//! The application owns one `StoreConnection` and shares it. `connect()` opens
//! the store on first use and reuses the handle afterwards; `disconnect()`
//! closes it and clears the handle.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{ApiError, Result};
use crate::platform::{DbOptions, FixtureStore, StoreConnector};

pub struct StoreConnection {
    connector: Arc<dyn StoreConnector>,
    options: DbOptions,
    // Held across the open call so concurrent first callers open once
    store: Mutex<Option<Arc<dyn FixtureStore>>>,
}

impl StoreConnection {
    pub fn new(connector: Arc<dyn StoreConnector>, options: DbOptions) -> Self {
        Self {
            connector,
            options,
            store: Mutex::new(None),
        }
    }

    pub fn options(&self) -> &DbOptions {
        &self.options
    }

    /// Open the store if needed and return the shared handle
    pub async fn connect(&self) -> Result<Arc<dyn FixtureStore>> {
        let mut guard = self.store.lock().await;
        if let Some(store) = guard.as_ref() {
            return Ok(store.clone());
        }

        let store = self.connector.open(&self.options).await.map_err(|e| {
            warn!(db_name = %self.options.db_name, error = %e, "failed to open fixture store");
            match e {
                ApiError::StoreUnavailable { .. } => e,
                other => ApiError::store_unavailable(other.to_string()),
            }
        })?;

        info!(
            db_name = %self.options.db_name,
            version = self.options.version,
            "fixture store connected"
        );
        *guard = Some(store.clone());
        Ok(store)
    }

    /// Close and forget the cached store. Close failures are logged only.
    pub async fn disconnect(&self) {
        let store = self.store.lock().await.take();
        match store {
            Some(store) => {
                if let Err(e) = store.close().await {
                    warn!(error = %e, "failed to close fixture store");
                }
                debug!(db_name = %self.options.db_name, "fixture store disconnected");
            }
            None => debug!("disconnect called without an open store"),
        }
    }

    /// The connected store, or `StoreUnavailable` when not connected
    pub async fn store(&self) -> Result<Arc<dyn FixtureStore>> {
        self.store
            .lock()
            .await
            .clone()
            .ok_or_else(|| ApiError::store_unavailable("fixture store is not connected"))
    }

    pub async fn is_connected(&self) -> bool {
        self.store.lock().await.is_some()
    }
}
