//! Track repositories and services
//!
//! The repository contract has a mock implementation (fixture replay) and a
//! live one (HTTP). The service layer composes repository calls with filters.

mod filter;
mod http_repository;
mod mock_repository;
pub mod model;
mod service;

pub use filter::TrackFilter;
pub use http_repository::HttpTrackRepository;
pub use mock_repository::MockTrackRepository;
pub use model::{Artist, DataEnvelope, Track, TrackDuration, TrackId};
pub use service::TrackService;

use async_trait::async_trait;

use crate::error::Result;

/// Source of track data
#[async_trait(?Send)]
pub trait TrackRepository {
    async fn get_all_tracks(&self) -> Result<Vec<Track>>;
    async fn get_random_tracks(&self) -> Result<Vec<Track>>;
    async fn get_track_by_id(&self, id: TrackId) -> Result<Track>;
}
