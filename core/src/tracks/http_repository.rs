//! Track repository backed by the live track API

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::error;

use crate::error::{ApiError, Result};
use crate::platform::{HttpClient, HttpResponse};

use super::model::DataEnvelope;
use super::{Track, TrackId, TrackRepository};

pub struct HttpTrackRepository<H> {
    api_url: String,
    http: H,
}

impl<H: HttpClient> HttpTrackRepository<H> {
    pub fn new(api_url: impl Into<String>, http: H) -> Self {
        Self {
            api_url: api_url.into(),
            http,
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.api_url, path);
        let headers = [("Accept", "application/json")];

        let response = self
            .http
            .get(&url, &headers)
            .await
            .map_err(|e| ApiError::upstream_error(format!("failed to call track API: {}", e)))?;

        if !response.is_success() {
            return Err(handle_error(&response));
        }

        let envelope: DataEnvelope<T> = response
            .json()
            .map_err(|e| ApiError::upstream_error(format!("invalid track API response: {}", e)))?;
        Ok(envelope.data)
    }
}

#[async_trait(?Send)]
impl<H: HttpClient> TrackRepository for HttpTrackRepository<H> {
    async fn get_all_tracks(&self) -> Result<Vec<Track>> {
        self.fetch("/tracks").await
    }

    async fn get_random_tracks(&self) -> Result<Vec<Track>> {
        self.fetch("/tracks").await
    }

    async fn get_track_by_id(&self, id: TrackId) -> Result<Track> {
        self.fetch(&format!("/tracks/{}", id)).await
    }
}

/// Map a failed API response to an error with a readable message
fn handle_error(response: &HttpResponse) -> ApiError {
    let message = match response.status {
        400 => "bad request".to_string(),
        401 => "unauthorized".to_string(),
        404 => "resource not found".to_string(),
        500 => "internal server error".to_string(),
        status => {
            let detail = response.text().unwrap_or_default();
            if detail.is_empty() {
                format!("Error {}", status)
            } else {
                format!("Error {}: {}", status, detail)
            }
        }
    };

    error!(status = response.status, %message, "track API request failed");
    ApiError::http(response.status, message)
}
