//! Track list filtering

use std::time::Duration;

use crate::platform::Timer;

use super::{Track, TrackId};

pub struct TrackFilter;

impl TrackFilter {
    /// Tracks other than `id`
    pub fn filter_by_id(&self, tracks: Vec<Track>, id: TrackId) -> Vec<Track> {
        tracks.into_iter().filter(|t| t.id != id).collect()
    }

    /// Tracks whose id is not listed in `ids`
    pub fn filter_by_multiple_ids(&self, tracks: Vec<Track>, ids: &[TrackId]) -> Vec<Track> {
        tracks.into_iter().filter(|t| !ids.contains(&t.id)).collect()
    }

    /// Hand the tracks back after `delay`
    pub async fn filter_with_delay(
        &self,
        timer: &dyn Timer,
        tracks: Vec<Track>,
        delay: Duration,
    ) -> Vec<Track> {
        timer.sleep(delay).await;
        tracks
    }

    pub async fn filter_by_id_with_delay(
        &self,
        timer: &dyn Timer,
        tracks: Vec<Track>,
        id: TrackId,
        delay: Duration,
    ) -> Vec<Track> {
        timer.sleep(delay).await;
        self.filter_by_id(tracks, id)
    }
}
