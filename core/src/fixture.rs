//! Stored HTTP fixture model
//!
//! Fixtures are owned by the external fixture store. Field aliases accept the
//! older shapes written by earlier workbench versions (`responseCode`, `delay`,
//! `body`, `httpMethod`, `nameMock`).

use std::collections::BTreeMap;

use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Store key assigned on create
pub type FixtureId = u64;

/// Status simulated when a fixture does not declare one
pub const DEFAULT_HTTP_CODE: u16 = 200;

/// Index over `serviceCode`
pub const SERVICE_CODE_INDEX: &str = "by_serviceCode";
pub const SERVICE_CODE_KEY_PATH: &str = "serviceCode";

/// Index over `url`
pub const URL_INDEX: &str = "by_url";
pub const URL_KEY_PATH: &str = "url";

/// A stored HTTP mock
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FixtureId>,

    #[serde(alias = "nameMock", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub service_code: String,

    #[serde(default)]
    pub url: String,

    #[serde(alias = "httpMethod", default)]
    pub method: String,

    #[serde(
        alias = "responseCode",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub http_code_response_value: Option<u16>,

    #[serde(
        alias = "delay",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub delay_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,

    /// JSON-encoded string, an object with a `data` list, or a list
    #[serde(
        alias = "body",
        alias = "response",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub response_body: Option<Value>,
}

impl Fixture {
    /// Status to simulate, defaulting to 200
    pub fn http_code(&self) -> u16 {
        self.http_code_response_value.unwrap_or(DEFAULT_HTTP_CODE)
    }

    /// Delay to simulate, falling back to `default_ms` when absent
    pub fn delay_or(&self, default_ms: u64) -> u64 {
        self.delay_ms.unwrap_or(default_ms)
    }

    /// Read an indexable field by key path, as used by scan fallbacks
    pub fn key_value(&self, key_path: &str) -> Option<String> {
        match key_path {
            "_id" | "id" => self.id.map(|id| id.to_string()),
            "serviceCode" => Some(self.service_code.clone()),
            "url" => Some(self.url.clone()),
            "method" => Some(self.method.clone()),
            "name" => self.name.clone(),
            _ => None,
        }
    }

    /// Overwrite metadata from a saved schema, keeping id and body
    pub fn apply_schema(&mut self, schema: &FixtureSchema) {
        self.name = schema.name.clone();
        self.service_code = schema.service_code.clone();
        self.url = schema.url.clone();
        self.method = schema.method.clone();
        self.http_code_response_value = Some(schema.http_code_response_value);
        self.delay_ms = Some(schema.delay_ms);
        self.headers = schema.headers.clone();
    }
}

/// Fixture metadata submitted by the workbench editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureSchema {
    #[serde(alias = "nameMock", default)]
    pub name: Option<String>,
    pub service_code: String,
    #[serde(default)]
    pub url: String,
    #[serde(alias = "httpMethod", default = "default_method")]
    pub method: String,
    #[serde(default = "default_http_code")]
    pub http_code_response_value: u16,
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
}

/// Accept an unsigned number or a string holding one; null means absent
fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + FromStr,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| T::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("number {} is out of range", n))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("'{}' is not a valid number", s))),
        Some(other) => Err(de::Error::custom(format!("expected a number, got {}", other))),
    }
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_http_code() -> u16 {
    DEFAULT_HTTP_CODE
}

impl From<FixtureSchema> for Fixture {
    fn from(schema: FixtureSchema) -> Self {
        let mut fixture = Fixture::default();
        fixture.apply_schema(&schema);
        fixture
    }
}
