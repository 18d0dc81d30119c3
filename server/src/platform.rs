//! Native platform implementations
//!
//! Implements core platform traits using native Rust libraries:
//! - HttpClient: reqwest
//! - Timer: tokio::time
//! - Environment: std::env
//!
//! The fixture store lives in `store.rs`.

use async_trait::async_trait;
use std::time::Duration;

use mock_workbench_core::error::{ApiError, Result};
use mock_workbench_core::platform::{Environment, HttpClient, HttpResponse, Timer};

/// reqwest-based HTTP client
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait(?Send)]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        let mut builder = self.client.get(url);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::upstream_error(format!("HTTP GET failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::upstream_error(format!("failed to read response: {}", e)))?
            .to_vec();

        Ok(HttpResponse { status, body })
    }
}

/// Timer on the tokio runtime clock
pub struct TokioTimer;

#[async_trait(?Send)]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Process environment
pub struct SystemEnv;

impl Environment for SystemEnv {
    fn get_var(&self, name: &str) -> Result<String> {
        std::env::var(name)
            .map_err(|_| ApiError::internal(format!("environment variable '{}' not set", name)))
    }
}
