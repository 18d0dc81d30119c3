//! Configuration management

use std::str::FromStr;

use crate::error::{ApiError, Result};
use crate::platform::{DbOptions, Environment};

/// Delay applied when a fixture does not declare one (1 second)
pub const DEFAULT_DELAY_MS: u64 = 1000;

/// Delay applied to the fallback response when no fixture resolves
pub const FALLBACK_DELAY_MS: u64 = 0;

/// Extra delay before random tracks are delivered (3.5 seconds)
pub const RANDOM_EXTRA_DELAY_MS: u64 = 3500;

/// Track ids hidden from the random listing
pub const RANDOM_EXCLUDED_IDS: [u64; 2] = [1, 2];

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/1.0";

pub const DEFAULT_MOCK_KEY: &str = "test";

/// Service code bound to each repository operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCodes {
    pub all_tracks: String,
    pub random_tracks: String,
    pub track_by_id: String,
}

impl Default for ServiceCodes {
    fn default() -> Self {
        Self {
            all_tracks: "music-service-1".to_string(),
            random_tracks: "music-service-2".to_string(),
            track_by_id: "music-service-3".to_string(),
        }
    }
}

/// Application configuration loaded from environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the live track API
    pub api_url: String,
    /// Name of the setting holding the persisted context option
    pub mock_key: String,
    /// Options used to open the fixture store
    pub db: DbOptions,
    /// Delay for fixtures without `delayMs`
    pub default_delay_ms: u64,
    /// Delay for the fallback response when nothing resolves
    pub fallback_delay_ms: u64,
    pub service_codes: ServiceCodes,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            mock_key: DEFAULT_MOCK_KEY.to_string(),
            db: DbOptions::default(),
            default_delay_ms: DEFAULT_DELAY_MS,
            fallback_delay_ms: FALLBACK_DELAY_MS,
            service_codes: ServiceCodes::default(),
        }
    }
}

impl Config {
    /// Load configuration from platform environment; unset variables keep
    /// their defaults, malformed ones are rejected.
    pub fn from_env(env: &dyn Environment) -> Result<Self> {
        let defaults = Config::default();
        let codes = defaults.service_codes;

        Ok(Self {
            api_url: optional_var(env, "API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            mock_key: optional_var(env, "MOCK_KEY").unwrap_or(defaults.mock_key),
            db: DbOptions {
                db_name: optional_var(env, "MOCK_DB_NAME").unwrap_or(defaults.db.db_name),
                version: parse_var(env, "MOCK_DB_VERSION")?.unwrap_or(defaults.db.version),
                http_only: parse_var(env, "MOCK_HTTP_ONLY")?.unwrap_or(defaults.db.http_only),
            },
            default_delay_ms: parse_var(env, "MOCK_DEFAULT_DELAY_MS")?
                .unwrap_or(defaults.default_delay_ms),
            fallback_delay_ms: parse_var(env, "MOCK_FALLBACK_DELAY_MS")?
                .unwrap_or(defaults.fallback_delay_ms),
            service_codes: ServiceCodes {
                all_tracks: optional_var(env, "SERVICE_CODE_ALL_TRACKS")
                    .unwrap_or(codes.all_tracks),
                random_tracks: optional_var(env, "SERVICE_CODE_RANDOM_TRACKS")
                    .unwrap_or(codes.random_tracks),
                track_by_id: optional_var(env, "SERVICE_CODE_TRACK_BY_ID")
                    .unwrap_or(codes.track_by_id),
            },
        })
    }
}

/// A set, non-empty variable
pub fn optional_var(env: &dyn Environment, name: &str) -> Option<String> {
    env.get_var(name).ok().filter(|v| !v.trim().is_empty())
}

/// A set variable parsed as `T`
pub fn parse_var<T: FromStr>(env: &dyn Environment, name: &str) -> Result<Option<T>> {
    match optional_var(env, name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| {
                ApiError::invalid_request(format!("{} has an invalid value: '{}'", name, raw))
            }),
        None => Ok(None),
    }
}
