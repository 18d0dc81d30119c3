//! Track service composing repository calls with filters

use std::sync::Arc;
use std::time::Duration;

use crate::config::{RANDOM_EXCLUDED_IDS, RANDOM_EXTRA_DELAY_MS};
use crate::error::Result;
use crate::platform::Timer;

use super::{Track, TrackFilter, TrackId, TrackRepository};

pub struct TrackService {
    repository: Arc<dyn TrackRepository>,
    timer: Arc<dyn Timer>,
    filter: TrackFilter,
    excluded_ids: Vec<TrackId>,
    random_delay: Duration,
}

impl TrackService {
    pub fn new(repository: Arc<dyn TrackRepository>, timer: Arc<dyn Timer>) -> Self {
        Self {
            repository,
            timer,
            filter: TrackFilter,
            excluded_ids: RANDOM_EXCLUDED_IDS.to_vec(),
            random_delay: Duration::from_millis(RANDOM_EXTRA_DELAY_MS),
        }
    }

    pub fn with_excluded_ids(mut self, ids: Vec<TrackId>) -> Self {
        self.excluded_ids = ids;
        self
    }

    pub fn with_random_delay(mut self, delay: Duration) -> Self {
        self.random_delay = delay;
        self
    }

    pub async fn get_all_tracks(&self) -> Result<Vec<Track>> {
        self.repository.get_all_tracks().await
    }

    pub async fn get_track_by_id(&self, id: TrackId) -> Result<Track> {
        self.repository.get_track_by_id(id).await
    }

    /// Random tracks without the excluded ids
    pub async fn get_random_tracks(&self) -> Result<Vec<Track>> {
        let tracks = self.repository.get_random_tracks().await?;
        Ok(self.filter.filter_by_multiple_ids(tracks, &self.excluded_ids))
    }

    /// Random tracks without the excluded ids, delivered after the extra delay
    pub async fn get_random_tracks_delayed(&self) -> Result<Vec<Track>> {
        let tracks = self.get_random_tracks().await?;
        Ok(self
            .filter
            .filter_with_delay(self.timer.as_ref(), tracks, self.random_delay)
            .await)
    }
}
