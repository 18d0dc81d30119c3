//! Platform abstraction traits
//!
//! These traits define the boundary between the platform-agnostic resolution
//! logic and the platform-specific implementations (file-backed store, native
//! HTTP client, tokio timers, process environment).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, Result};
use crate::fixture::{Fixture, FixtureId};

/// Fixture persistence contract
///
/// The resolution path only reads (`get_all_mocks`, `find_by_index`); the
/// write operations back the workbench editor.
#[async_trait(?Send)]
pub trait FixtureStore: Send + Sync {
    async fn create_mock(&self, fixture: Fixture) -> Result<Fixture>;
    async fn get_mock_by_id(&self, id: FixtureId) -> Result<Option<Fixture>>;
    async fn update_mock(&self, fixture: Fixture) -> Result<Fixture>;
    async fn delete_mock(&self, id: FixtureId) -> Result<bool>;
    async fn get_all_mocks(&self) -> Result<Vec<Fixture>>;

    /// Indexed lookup. Stores without indexes keep the default, which
    /// reports the capability as unsupported so callers scan instead.
    async fn find_by_index(
        &self,
        value: &str,
        index_name: &str,
        key_path: &str,
    ) -> Result<Vec<Fixture>> {
        let _ = (value, key_path);
        Err(ApiError::unsupported(format!("index '{}' not available", index_name)))
    }

    /// Release the underlying storage
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Options used to open a fixture store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbOptions {
    pub db_name: String,
    pub version: u32,
    pub http_only: bool,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            db_name: "myDb".to_string(),
            version: 2,
            http_only: true,
        }
    }
}

/// Opens a fixture store
#[async_trait(?Send)]
pub trait StoreConnector: Send + Sync {
    async fn open(&self, options: &DbOptions) -> Result<Arc<dyn FixtureStore>>;
}

/// HTTP client for the live track API
#[async_trait(?Send)]
pub trait HttpClient {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse>;
}

/// HTTP response from an outbound request
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Parse body as UTF-8 string
    pub fn text(&self) -> std::result::Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.clone())
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Suspends the caller for a duration (enables testing without wall-clock waits)
#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
}

/// Environment/settings access
pub trait Environment {
    fn get_var(&self, name: &str) -> Result<String>;
}
