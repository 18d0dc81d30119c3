//! Data source selection
//!
//! The workbench persists the chosen context option as JSON under the
//! configured mock key. A context with `useMock: true` switches the track
//! repository to fixture replay; anything else keeps the live API.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{optional_var, Config};
use crate::platform::{Environment, HttpClient, Timer};
use crate::store::FixtureClient;
use crate::tracks::{HttpTrackRepository, MockTrackRepository, TrackRepository};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextOption {
    pub id: u32,
    pub value: String,
    #[serde(default)]
    pub use_mock: bool,
}

impl ContextOption {
    fn new(id: u32, value: &str, use_mock: bool) -> Self {
        Self {
            id,
            value: value.to_string(),
            use_mock,
        }
    }
}

/// Options offered by the workbench context selector
pub fn default_context_options() -> Vec<ContextOption> {
    vec![
        ContextOption::new(1, "---------", false),
        ContextOption::new(2, "Use HTTP service", false),
        ContextOption::new(3, "Use HTTP interceptor", false),
        ContextOption::new(4, "Use data", true),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Live,
    Mock,
}

impl DataSource {
    pub fn from_context(context: Option<&ContextOption>) -> Self {
        match context {
            Some(c) if c.use_mock => DataSource::Mock,
            _ => DataSource::Live,
        }
    }
}

/// Read the persisted context stored under `mock_key`. Missing or malformed
/// values yield `None`.
pub fn load_context(env: &dyn Environment, mock_key: &str) -> Option<ContextOption> {
    let raw = optional_var(env, mock_key)?;
    match serde_json::from_str(&raw) {
        Ok(context) => Some(context),
        Err(e) => {
            warn!(mock_key, error = %e, "ignoring malformed context option");
            None
        }
    }
}

/// Pick the track repository for the persisted context
pub fn select_repository<H: HttpClient + 'static>(
    config: &Config,
    env: &dyn Environment,
    client: FixtureClient,
    timer: Arc<dyn Timer>,
    http: H,
) -> (DataSource, Arc<dyn TrackRepository>) {
    let context = load_context(env, &config.mock_key);
    let source = DataSource::from_context(context.as_ref());
    info!(mock_key = %config.mock_key, ?source, ?context, "track data source selected");

    let repository: Arc<dyn TrackRepository> = match source {
        DataSource::Mock => Arc::new(MockTrackRepository::new(client, timer, config)),
        DataSource::Live => Arc::new(HttpTrackRepository::new(config.api_url.clone(), http)),
    };
    (source, repository)
}
