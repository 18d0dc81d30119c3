//! Fixture client
//!
//! CRUD and lookup operations over the connected store, with scan fallbacks
//! for stores that lack (or fail on) indexed lookups.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ApiError, Result};
use crate::fixture::{
    Fixture, FixtureId, FixtureSchema, SERVICE_CODE_INDEX, SERVICE_CODE_KEY_PATH, URL_INDEX,
    URL_KEY_PATH,
};
use crate::platform::FixtureStore;

use super::StoreConnection;

#[derive(Clone)]
pub struct FixtureClient {
    connection: Arc<StoreConnection>,
}

impl FixtureClient {
    pub fn new(connection: Arc<StoreConnection>) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &Arc<StoreConnection> {
        &self.connection
    }

    async fn store(&self) -> Result<Arc<dyn FixtureStore>> {
        self.connection.store().await
    }

    pub async fn create_mock(&self, fixture: Fixture) -> Result<Fixture> {
        self.store().await?.create_mock(fixture).await
    }

    pub async fn get_mock_by_id(&self, id: FixtureId) -> Result<Option<Fixture>> {
        self.store().await?.get_mock_by_id(id).await
    }

    pub async fn update_mock(&self, fixture: Fixture) -> Result<Fixture> {
        if fixture.id.is_none() {
            return Err(ApiError::invalid_request("cannot update a fixture without an id"));
        }
        self.store().await?.update_mock(fixture).await
    }

    pub async fn delete_mock(&self, id: FixtureId) -> Result<bool> {
        self.store().await?.delete_mock(id).await
    }

    pub async fn get_all_mocks(&self) -> Result<Vec<Fixture>> {
        self.store().await?.get_all_mocks().await
    }

    /// Indexed lookup; falls back to a naive scan only when the store reports
    /// the index as unsupported. Other index errors propagate.
    pub async fn find_by_index(
        &self,
        value: &str,
        index_name: &str,
        key_path: &str,
    ) -> Result<Vec<Fixture>> {
        let store = self.store().await?;
        match store.find_by_index(value, index_name, key_path).await {
            Err(ApiError::Unsupported { .. }) => {
                debug!(index = index_name, "index unsupported, scanning all fixtures");
                scan(store.as_ref(), key_path, value).await
            }
            other => other,
        }
    }

    pub async fn find_by_url(&self, url: &str) -> Result<Vec<Fixture>> {
        self.find_with_fallback(url, URL_INDEX, URL_KEY_PATH).await
    }

    pub async fn find_by_service_code(&self, service_code: &str) -> Result<Vec<Fixture>> {
        self.find_with_fallback(service_code, SERVICE_CODE_INDEX, SERVICE_CODE_KEY_PATH)
            .await
    }

    // Any index failure degrades to a full scan
    async fn find_with_fallback(
        &self,
        value: &str,
        index_name: &str,
        key_path: &str,
    ) -> Result<Vec<Fixture>> {
        let store = self.store().await?;
        match store.find_by_index(value, index_name, key_path).await {
            Ok(found) => Ok(found),
            Err(e) => {
                debug!(index = index_name, error = %e, "indexed lookup failed, scanning");
                scan(store.as_ref(), key_path, value).await
            }
        }
    }

    /// The stored response body of a fixture decoded as `T`
    pub async fn get_response_body_as<T: DeserializeOwned>(
        &self,
        id: FixtureId,
    ) -> Result<Option<T>> {
        let Some(fixture) = self.get_mock_by_id(id).await? else {
            return Ok(None);
        };
        let Some(body) = fixture.response_body else {
            return Ok(None);
        };

        let value = match body {
            Value::String(raw) => serde_json::from_str(&raw)
                .map_err(|e| {
                    ApiError::decode_failed(format!("fixture {} body is not JSON: {}", id, e))
                })?,
            other => other,
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| {
                ApiError::decode_failed(format!("fixture {} body has unexpected shape: {}", id, e))
            })
    }

    /// Upsert by service code: update the first fixture sharing the code,
    /// or create a new one. Returns the saved fixture's id.
    pub async fn save_schema(&self, schema: FixtureSchema) -> Result<FixtureId> {
        if schema.service_code.is_empty() {
            return Err(ApiError::invalid_request("serviceCode cannot be empty"));
        }

        let existing = match self.find_by_service_code(&schema.service_code).await {
            Ok(found) => found.into_iter().next(),
            Err(e) => {
                warn!(
                    service_code = %schema.service_code,
                    error = %e,
                    "lookup before save failed, creating"
                );
                None
            }
        };

        let saved = match existing {
            Some(mut fixture) => {
                fixture.apply_schema(&schema);
                self.update_mock(fixture).await?
            }
            None => self.create_mock(Fixture::from(schema)).await?,
        };

        saved
            .id
            .ok_or_else(|| ApiError::internal("store returned a fixture without an id"))
    }

    /// Replace the response body of a stored fixture
    pub async fn save_body(&self, id: FixtureId, body: Value) -> Result<Fixture> {
        let mut fixture = self
            .get_mock_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("fixture {}", id)))?;
        fixture.response_body = Some(body);
        self.update_mock(fixture).await
    }
}

async fn scan(store: &dyn FixtureStore, key_path: &str, value: &str) -> Result<Vec<Fixture>> {
    let all = store.get_all_mocks().await?;
    Ok(all
        .into_iter()
        .filter(|f| f.key_value(key_path).as_deref() == Some(value))
        .collect())
}
