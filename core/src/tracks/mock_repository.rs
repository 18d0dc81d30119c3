//! Track repository replaying stored fixtures
//!
//! Every call resolves its service code again; nothing is cached between calls.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::{Config, ServiceCodes};
use crate::error::{ApiError, Result};
use crate::platform::Timer;
use crate::resolve::{resolve, MockContext};
use crate::store::FixtureClient;

use super::{Track, TrackId, TrackRepository};

pub struct MockTrackRepository {
    client: FixtureClient,
    timer: Arc<dyn Timer>,
    service_codes: ServiceCodes,
    default_delay_ms: u64,
    fallback_delay_ms: u64,
    fallback: Vec<Track>,
}

impl MockTrackRepository {
    pub fn new(client: FixtureClient, timer: Arc<dyn Timer>, config: &Config) -> Self {
        Self {
            client,
            timer,
            service_codes: config.service_codes.clone(),
            default_delay_ms: config.default_delay_ms,
            fallback_delay_ms: config.fallback_delay_ms,
            fallback: Vec::new(),
        }
    }

    /// Records returned when no fixture resolves
    pub fn with_fallback(mut self, fallback: Vec<Track>) -> Self {
        self.fallback = fallback;
        self
    }

    async fn load_context(&self, service_code: &str) -> MockContext<Track> {
        match resolve(&self.client, service_code).await {
            Some(fixture) => {
                let context = MockContext::from_fixture(&fixture, self.default_delay_ms);
                debug!(
                    service_code,
                    fixture_id = ?fixture.id,
                    http_code = context.http_code,
                    records = context.data.len(),
                    "replaying fixture"
                );
                context
            }
            None => {
                info!(service_code, "no fixture resolved, using fallback records");
                MockContext::fallback(self.fallback.clone(), self.fallback_delay_ms)
            }
        }
    }

    async fn replay(&self, service_code: &str) -> Result<Vec<Track>> {
        self.load_context(service_code)
            .await
            .replay(self.timer.as_ref())
            .await
    }
}

#[async_trait(?Send)]
impl TrackRepository for MockTrackRepository {
    async fn get_all_tracks(&self) -> Result<Vec<Track>> {
        self.replay(&self.service_codes.all_tracks).await
    }

    async fn get_random_tracks(&self) -> Result<Vec<Track>> {
        self.replay(&self.service_codes.random_tracks).await
    }

    async fn get_track_by_id(&self, id: TrackId) -> Result<Track> {
        let tracks = self.replay(&self.service_codes.track_by_id).await?;
        tracks
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| ApiError::not_found(format!("track {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::DbOptions;
    use crate::store::StoreConnection;
    use crate::test_support::{fixture, MockConnector, MockFixtureStore, MockTimer, TokioTimer};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::time::Instant;

    async fn repository(
        fixtures: Vec<crate::fixture::Fixture>,
        timer: Arc<dyn Timer>,
    ) -> MockTrackRepository {
        let conn = Arc::new(StoreConnection::new(
            Arc::new(MockConnector::new(Arc::new(MockFixtureStore::new(fixtures)))),
            DbOptions::default(),
        ));
        conn.connect().await.unwrap();
        MockTrackRepository::new(FixtureClient::new(conn), timer, &Config::default())
    }

    fn track(id: TrackId, name: &str) -> Track {
        Track {
            id,
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn body(tracks: Value) -> Value {
        Value::String(json!({ "data": tracks }).to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_tracks_replays_fixture_after_delay() {
        let repo = repository(
            vec![fixture(
                "music-service-1",
                200,
                100,
                json!("{\"data\":[{\"id\":1,\"name\":\"A\"}]}"),
            )],
            Arc::new(TokioTimer),
        )
        .await;

        let start = Instant::now();
        let tracks = repo.get_all_tracks().await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(100));
        assert_eq!(tracks, vec![track(1, "A")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_tracks_error_status_rejects_after_delay() {
        let repo = repository(
            vec![fixture(
                "music-service-1",
                404,
                100,
                json!("{\"data\":[{\"id\":1,\"name\":\"A\"}]}"),
            )],
            Arc::new(TokioTimer),
        )
        .await;

        let start = Instant::now();
        let err = repo.get_all_tracks().await.unwrap_err();

        assert!(start.elapsed() >= Duration::from_millis(100));
        assert!(err.to_string().contains("404"));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_missing_fixture_uses_fallback() {
        let timer = Arc::new(MockTimer::new());
        let repo = repository(vec![fixture("unrelated", 500, 5, json!([]))], timer.clone())
            .await
            .with_fallback(vec![track(9, "default")]);

        let tracks = repo.get_all_tracks().await.unwrap();
        assert_eq!(tracks, vec![track(9, "default")]);
        assert_eq!(timer.recorded(), vec![Duration::ZERO]);
    }

    #[tokio::test]
    async fn test_missing_fixture_default_fallback_is_empty() {
        let repo = repository(vec![], Arc::new(MockTimer::new())).await;
        assert!(repo.get_all_tracks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disconnected_store_uses_fallback() {
        let conn = Arc::new(StoreConnection::new(
            Arc::new(MockConnector::unavailable()),
            DbOptions::default(),
        ));
        let repo = MockTrackRepository::new(
            FixtureClient::new(conn),
            Arc::new(MockTimer::new()),
            &Config::default(),
        );
        assert!(repo.get_random_tracks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_content_yields_empty() {
        let repo = repository(
            vec![fixture("music-service-2", 204, 0, body(json!([{"_id": 1, "name": "A"}])))],
            Arc::new(MockTimer::new()),
        )
        .await;
        assert!(repo.get_random_tracks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_default_delay_applies_when_absent() {
        let timer = Arc::new(MockTimer::new());
        let mut f = fixture("music-service-1", 200, 0, body(json!([{"_id": 1}])));
        f.delay_ms = None;
        let repo = repository(vec![f], timer.clone()).await;

        repo.get_all_tracks().await.unwrap();
        assert_eq!(timer.recorded(), vec![Duration::from_millis(1000)]);
    }

    #[tokio::test]
    async fn test_each_call_resolves_again() {
        let store = Arc::new(MockFixtureStore::new(vec![fixture(
            "music-service-1",
            200,
            0,
            body(json!([{"_id": 1, "name": "A"}])),
        )]));
        let conn = Arc::new(StoreConnection::new(
            Arc::new(MockConnector::new(store.clone())),
            DbOptions::default(),
        ));
        conn.connect().await.unwrap();
        let client = FixtureClient::new(conn);
        let timer = Arc::new(MockTimer::new());
        let repo = MockTrackRepository::new(client.clone(), timer, &Config::default());

        assert_eq!(repo.get_all_tracks().await.unwrap().len(), 1);

        client.save_body(1, body(json!([{"_id": 1}, {"_id": 2}]))).await.unwrap();
        assert_eq!(repo.get_all_tracks().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_track_by_id_found() {
        let repo = repository(
            vec![fixture(
                "music-service-3",
                200,
                0,
                body(json!([{"_id": 1, "name": "A"}, {"_id": 2, "name": "B"}])),
            )],
            Arc::new(MockTimer::new()),
        )
        .await;

        assert_eq!(repo.get_track_by_id(2).await.unwrap(), track(2, "B"));
    }

    #[tokio::test]
    async fn test_track_by_id_not_found() {
        let repo = repository(
            vec![fixture("music-service-3", 200, 0, body(json!([{"_id": 1, "name": "A"}])))],
            Arc::new(MockTimer::new()),
        )
        .await;

        let err = repo.get_track_by_id(7).await.unwrap_err();
        assert_eq!(err.error_key(), "not_found");
    }

    #[tokio::test]
    async fn test_track_by_id_propagates_simulated_error() {
        let repo = repository(
            vec![fixture("music-service-3", 500, 0, body(json!([{"_id": 1, "name": "A"}])))],
            Arc::new(MockTimer::new()),
        )
        .await;

        let err = repo.get_track_by_id(1).await.unwrap_err();
        assert_eq!(err, ApiError::simulated_http(500));
    }

    #[tokio::test]
    async fn test_track_by_id_no_content_is_not_found() {
        let repo = repository(
            vec![fixture("music-service-3", 204, 0, body(json!([{"_id": 1, "name": "A"}])))],
            Arc::new(MockTimer::new()),
        )
        .await;

        assert_eq!(repo.get_track_by_id(1).await.unwrap_err().error_key(), "not_found");
    }
}
