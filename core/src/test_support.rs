//! Mock implementations of platform traits for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{ApiError, Result};
use crate::fixture::{Fixture, FixtureId};
use crate::platform::{
    DbOptions, Environment, FixtureStore, HttpClient, HttpResponse, StoreConnector, Timer,
};

/// How the mock store answers indexed lookups
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    Supported,
    Unsupported,
    Failing,
}

/// Mock fixture store backed by an in-memory Vec (insertion order is store order)
pub struct MockFixtureStore {
    fixtures: Mutex<Vec<Fixture>>,
    next_id: Mutex<FixtureId>,
    index_mode: IndexMode,
    fail_all: bool,
    pub index_calls: AtomicUsize,
    pub scan_calls: AtomicUsize,
    pub close_calls: AtomicUsize,
}

impl MockFixtureStore {
    pub fn new(fixtures: Vec<Fixture>) -> Self {
        Self::with_index_mode(fixtures, IndexMode::Supported)
    }

    pub fn with_index_mode(fixtures: Vec<Fixture>, index_mode: IndexMode) -> Self {
        let mut next_id = 1;
        let fixtures = fixtures
            .into_iter()
            .map(|mut f| {
                if f.id.is_none() {
                    f.id = Some(next_id);
                }
                next_id = next_id.max(f.id.unwrap_or(0) + 1);
                f
            })
            .collect();

        Self {
            fixtures: Mutex::new(fixtures),
            next_id: Mutex::new(next_id),
            index_mode,
            fail_all: false,
            index_calls: AtomicUsize::new(0),
            scan_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
        }
    }

    /// A store whose every query fails
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::with_index_mode(Vec::new(), IndexMode::Failing)
        }
    }

    pub fn snapshot(&self) -> Vec<Fixture> {
        self.fixtures.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        if self.fail_all {
            return Err(ApiError::lookup_failed("mock store failure"));
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl FixtureStore for MockFixtureStore {
    async fn create_mock(&self, mut fixture: Fixture) -> Result<Fixture> {
        self.check()?;
        let mut next_id = self.next_id.lock().unwrap();
        fixture.id = Some(*next_id);
        *next_id += 1;
        self.fixtures.lock().unwrap().push(fixture.clone());
        Ok(fixture)
    }

    async fn get_mock_by_id(&self, id: FixtureId) -> Result<Option<Fixture>> {
        self.check()?;
        let fixtures = self.fixtures.lock().unwrap();
        Ok(fixtures.iter().find(|f| f.id == Some(id)).cloned())
    }

    async fn update_mock(&self, fixture: Fixture) -> Result<Fixture> {
        self.check()?;
        let mut fixtures = self.fixtures.lock().unwrap();
        let slot = fixtures
            .iter_mut()
            .find(|f| f.id.is_some() && f.id == fixture.id)
            .ok_or_else(|| ApiError::not_found(format!("fixture {:?}", fixture.id)))?;
        *slot = fixture.clone();
        Ok(fixture)
    }

    async fn delete_mock(&self, id: FixtureId) -> Result<bool> {
        self.check()?;
        let mut fixtures = self.fixtures.lock().unwrap();
        let before = fixtures.len();
        fixtures.retain(|f| f.id != Some(id));
        Ok(fixtures.len() != before)
    }

    async fn get_all_mocks(&self) -> Result<Vec<Fixture>> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.snapshot())
    }

    async fn find_by_index(
        &self,
        value: &str,
        index_name: &str,
        key_path: &str,
    ) -> Result<Vec<Fixture>> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        match self.index_mode {
            IndexMode::Unsupported => {
                Err(ApiError::unsupported(format!("index '{}'", index_name)))
            }
            IndexMode::Failing => Err(ApiError::lookup_failed(format!(
                "index '{}' is broken",
                index_name
            ))),
            IndexMode::Supported => Ok(self
                .snapshot()
                .into_iter()
                .filter(|f| f.key_value(key_path).as_deref() == Some(value))
                .collect()),
        }
    }

    async fn close(&self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Mock connector handing out a shared store
pub struct MockConnector {
    store: Option<Arc<MockFixtureStore>>,
    pub open_calls: AtomicUsize,
}

impl MockConnector {
    pub fn new(store: Arc<MockFixtureStore>) -> Self {
        Self {
            store: Some(store),
            open_calls: AtomicUsize::new(0),
        }
    }

    /// A connector that never manages to open the store
    pub fn unavailable() -> Self {
        Self {
            store: None,
            open_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait(?Send)]
impl StoreConnector for MockConnector {
    async fn open(&self, options: &DbOptions) -> Result<Arc<dyn FixtureStore>> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        match &self.store {
            Some(store) => Ok(store.clone() as Arc<dyn FixtureStore>),
            None => Err(ApiError::store_unavailable(format!("cannot open '{}'", options.db_name))),
        }
    }
}

/// Mock HTTP client with pre-configured responses
pub struct MockHttp {
    responses: Vec<(String, HttpResponse)>,
}

impl MockHttp {
    pub fn new(responses: Vec<(String, HttpResponse)>) -> Self {
        Self { responses }
    }
}

#[async_trait(?Send)]
impl HttpClient for MockHttp {
    async fn get(&self, url: &str, _headers: &[(&str, &str)]) -> Result<HttpResponse> {
        for (pattern, response) in &self.responses {
            if url.ends_with(pattern) {
                return Ok(HttpResponse {
                    status: response.status,
                    body: response.body.clone(),
                });
            }
        }
        Err(ApiError::upstream_error(format!("no mock response for GET {}", url)))
    }
}

/// Timer that returns immediately and records the requested durations
pub struct MockTimer {
    pub sleeps: Mutex<Vec<Duration>>,
}

impl MockTimer {
    pub fn new() -> Self {
        Self {
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait(?Send)]
impl Timer for MockTimer {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Timer on the tokio clock, for tests running with a paused runtime
pub struct TokioTimer;

#[async_trait(?Send)]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Mock environment backed by an in-memory HashMap
pub struct MockEnv {
    vars: HashMap<String, String>,
}

impl MockEnv {
    pub fn new(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl Environment for MockEnv {
    fn get_var(&self, name: &str) -> Result<String> {
        self.vars
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::internal(format!("variable '{}' not found", name)))
    }
}

/// Fixture shorthand for tests
pub fn fixture(
    service_code: &str,
    http_code: u16,
    delay_ms: u64,
    body: serde_json::Value,
) -> Fixture {
    Fixture {
        service_code: service_code.to_string(),
        url: format!("/api/{}", service_code),
        method: "GET".to_string(),
        http_code_response_value: Some(http_code),
        delay_ms: Some(delay_ms),
        response_body: Some(body),
        ..Default::default()
    }
}
