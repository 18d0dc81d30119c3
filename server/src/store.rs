//! JSON-file fixture store
//!
//! One file per database (`{dir}/{db_name}.json`) holding the id counter and
//! the fixtures in insertion order. The whole file is rewritten after every
//! mutation; reads are served from memory. Entries that do not parse as
//! fixtures are skipped when loading and written back untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use mock_workbench_core::error::{ApiError, Result};
use mock_workbench_core::fixture::{
    Fixture, FixtureId, SERVICE_CODE_INDEX, SERVICE_CODE_KEY_PATH, URL_INDEX, URL_KEY_PATH,
};
use mock_workbench_core::platform::{DbOptions, FixtureStore, StoreConnector};

/// On-disk layout; fixtures stay raw until each one is parsed on its own
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStoreFile {
    version: u32,
    next_id: FixtureId,
    #[serde(default)]
    fixtures: Vec<Value>,
}

#[derive(Debug, Clone)]
struct StoreFile {
    version: u32,
    next_id: FixtureId,
    fixtures: Vec<Fixture>,
    unreadable: Vec<Value>,
}

impl StoreFile {
    fn empty(version: u32) -> Self {
        Self {
            version,
            next_id: 1,
            fixtures: Vec::new(),
            unreadable: Vec::new(),
        }
    }

    fn from_raw(raw: RawStoreFile, path: &Path) -> Self {
        let mut fixtures = Vec::with_capacity(raw.fixtures.len());
        let mut unreadable = Vec::new();

        for (position, entry) in raw.fixtures.into_iter().enumerate() {
            match serde_json::from_value::<Fixture>(entry.clone()) {
                Ok(fixture) => fixtures.push(fixture),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        position,
                        error = %e,
                        "skipping unreadable fixture"
                    );
                    unreadable.push(entry);
                }
            }
        }

        // Keep new ids clear of anything already stored
        let highest = fixtures.iter().filter_map(|f| f.id).max().unwrap_or(0);
        Self {
            version: raw.version,
            next_id: raw.next_id.max(highest + 1),
            fixtures,
            unreadable,
        }
    }

    fn to_json(&self) -> Result<Value> {
        let mut entries = Vec::with_capacity(self.fixtures.len() + self.unreadable.len());
        for fixture in &self.fixtures {
            entries.push(
                serde_json::to_value(fixture)
                    .map_err(|e| ApiError::internal(format!("store serialization error: {}", e)))?,
            );
        }
        entries.extend(self.unreadable.iter().cloned());

        Ok(json!({
            "version": self.version,
            "nextId": self.next_id,
            "fixtures": entries,
        }))
    }
}

pub struct FileFixtureStore {
    path: PathBuf,
    state: RwLock<StoreFile>,
}

impl FileFixtureStore {
    /// Load the store at `path`, creating an empty one if the file is missing.
    /// Opening with a version older than the file's is refused.
    pub async fn open(path: impl Into<PathBuf>, version: u32) -> Result<Self> {
        let path = path.into();

        let mut state = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let raw = serde_json::from_slice::<RawStoreFile>(&bytes).map_err(|e| {
                    ApiError::store_unavailable(format!(
                        "corrupt store file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                StoreFile::from_raw(raw, &path)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreFile::empty(version),
            Err(e) => {
                return Err(ApiError::store_unavailable(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        if state.version > version {
            return Err(ApiError::store_unavailable(format!(
                "store version {} is newer than requested {}",
                state.version, version
            )));
        }
        if state.version < version {
            info!(from = state.version, to = version, "upgrading fixture store");
            state.version = version;
        }

        let store = Self {
            path,
            state: RwLock::new(state),
        };
        store.persist(&*store.state.read().await).await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, state: &StoreFile) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&state.to_json()?)
            .map_err(|e| ApiError::internal(format!("store serialization error: {}", e)))?;
        tokio::fs::write(&self.path, bytes).await.map_err(|e| {
            ApiError::store_unavailable(format!("cannot write {}: {}", self.path.display(), e))
        })
    }

    /// Apply `change` to a copy of the state and keep it only once it is on
    /// disk. A failed change or write leaves memory as it was.
    async fn mutate<T>(&self, change: impl FnOnce(&mut StoreFile) -> Result<T>) -> Result<T> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let outcome = change(&mut next)?;
        self.persist(&next).await?;
        *state = next;
        Ok(outcome)
    }
}

#[async_trait(?Send)]
impl FixtureStore for FileFixtureStore {
    async fn create_mock(&self, fixture: Fixture) -> Result<Fixture> {
        let created = self
            .mutate(|state| {
                let mut fixture = fixture;
                fixture.id = Some(state.next_id);
                state.next_id += 1;
                state.fixtures.push(fixture.clone());
                Ok(fixture)
            })
            .await?;
        debug!(id = ?created.id, service_code = %created.service_code, "fixture created");
        Ok(created)
    }

    async fn get_mock_by_id(&self, id: FixtureId) -> Result<Option<Fixture>> {
        let state = self.state.read().await;
        Ok(state.fixtures.iter().find(|f| f.id == Some(id)).cloned())
    }

    async fn update_mock(&self, fixture: Fixture) -> Result<Fixture> {
        let id = fixture
            .id
            .ok_or_else(|| ApiError::invalid_request("cannot update a fixture without an id"))?;

        self.mutate(|state| {
            let slot = state
                .fixtures
                .iter_mut()
                .find(|f| f.id == Some(id))
                .ok_or_else(|| ApiError::not_found(format!("fixture {}", id)))?;
            *slot = fixture.clone();
            Ok(fixture)
        })
        .await
    }

    async fn delete_mock(&self, id: FixtureId) -> Result<bool> {
        if self.get_mock_by_id(id).await?.is_none() {
            return Ok(false);
        }
        self.mutate(|state| {
            let before = state.fixtures.len();
            state.fixtures.retain(|f| f.id != Some(id));
            Ok(state.fixtures.len() != before)
        })
        .await
    }

    async fn get_all_mocks(&self) -> Result<Vec<Fixture>> {
        Ok(self.state.read().await.fixtures.clone())
    }

    async fn find_by_index(
        &self,
        value: &str,
        index_name: &str,
        key_path: &str,
    ) -> Result<Vec<Fixture>> {
        let indexed = matches!(
            (index_name, key_path),
            (SERVICE_CODE_INDEX, SERVICE_CODE_KEY_PATH) | (URL_INDEX, URL_KEY_PATH)
        );
        if !indexed {
            return Err(ApiError::unsupported(format!(
                "no index '{}' on '{}'",
                index_name, key_path
            )));
        }

        let state = self.state.read().await;
        Ok(state
            .fixtures
            .iter()
            .filter(|f| f.key_value(key_path).as_deref() == Some(value))
            .cloned()
            .collect())
    }

    async fn close(&self) -> Result<()> {
        self.persist(&*self.state.read().await).await
    }
}

/// Opens `{dir}/{db_name}.json`
pub struct FileStoreConnector {
    dir: PathBuf,
}

impl FileStoreConnector {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait(?Send)]
impl StoreConnector for FileStoreConnector {
    async fn open(&self, options: &DbOptions) -> Result<Arc<dyn FixtureStore>> {
        let name = &options.db_name;
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(ApiError::invalid_request(format!("invalid database name '{}'", name)));
        }

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            ApiError::store_unavailable(format!("cannot create {}: {}", self.dir.display(), e))
        })?;

        let path = self.dir.join(format!("{}.json", name));
        let store = FileFixtureStore::open(path, options.version).await?;
        debug!(
            path = %store.path().display(),
            http_only = options.http_only,
            "file fixture store opened"
        );
        Ok(Arc::new(store))
    }
}
