//! HTTP routing for the track API and the fixture editor

use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Method, Response, StatusCode};
use serde::Serialize;
use serde_json::json;

use mock_workbench_core::context::{default_context_options, DataSource};
use mock_workbench_core::error::{ApiError, ErrorResponse};
use mock_workbench_core::fixture::{FixtureId, FixtureSchema};
use mock_workbench_core::store::FixtureClient;
use mock_workbench_core::tracks::{DataEnvelope, TrackId, TrackService};

/// Shared application state
pub struct AppState {
    pub tracks: TrackService,
    pub fixtures: FixtureClient,
    pub source: DataSource,
}

pub type HyperResponse = Response<Full<Bytes>>;

pub async fn route(
    method: &Method,
    path: &str,
    query: &str,
    body: Bytes,
    state: &Arc<AppState>,
) -> HyperResponse {
    let segments: Vec<&str> = path.trim_matches('/').split('/').filter(|s| !s.is_empty()).collect();

    match (method, segments.as_slice()) {
        (&Method::GET, []) => handle_health(state),
        (&Method::GET, ["contexts"]) => handle_contexts(state),
        (&Method::GET, ["tracks"]) => respond_data(state.tracks.get_all_tracks().await),
        (&Method::GET, ["tracks", "random"]) => {
            respond_data(state.tracks.get_random_tracks_delayed().await)
        }
        (&Method::GET, ["tracks", id]) => match parse_id::<TrackId>(id) {
            Ok(id) => respond_data(state.tracks.get_track_by_id(id).await),
            Err(e) => error_response(&e),
        },
        (&Method::GET, ["mocks"]) => handle_list_mocks(query, state).await,
        (&Method::POST, ["mocks"]) => handle_save_schema(&body, state).await,
        (&Method::GET, ["mocks", id]) => handle_get_mock(id, state).await,
        (&Method::DELETE, ["mocks", id]) => handle_delete_mock(id, state).await,
        (&Method::PUT, ["mocks", id, "body"]) => handle_save_body(id, &body, state).await,
        _ => json_response(StatusCode::NOT_FOUND, &json!({"error": "not_found"})),
    }
}

fn handle_health(state: &AppState) -> HyperResponse {
    json_response(
        StatusCode::OK,
        &json!({
            "name": "mock-workbench",
            "source": source_name(state.source),
        }),
    )
}

fn handle_contexts(state: &AppState) -> HyperResponse {
    json_response(
        StatusCode::OK,
        &json!({
            "source": source_name(state.source),
            "options": default_context_options(),
        }),
    )
}

async fn handle_list_mocks(query: &str, state: &AppState) -> HyperResponse {
    let result = match query_param(query, "serviceCode") {
        Some(code) => state.fixtures.find_by_service_code(&code).await,
        None => state.fixtures.get_all_mocks().await,
    };
    respond_data(result)
}

async fn handle_save_schema(body: &Bytes, state: &AppState) -> HyperResponse {
    let schema: FixtureSchema = match serde_json::from_slice(body) {
        Ok(s) => s,
        Err(e) => {
            let err = ApiError::invalid_request(format!("invalid fixture schema: {}", e));
            return error_response(&err);
        }
    };

    match state.fixtures.save_schema(schema).await {
        Ok(id) => json_response(StatusCode::OK, &json!({ "id": id })),
        Err(e) => error_response(&e),
    }
}

async fn handle_get_mock(id: &str, state: &AppState) -> HyperResponse {
    let id = match parse_id::<FixtureId>(id) {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };

    match state.fixtures.get_mock_by_id(id).await {
        Ok(Some(fixture)) => json_response(StatusCode::OK, &DataEnvelope { data: fixture }),
        Ok(None) => error_response(&ApiError::not_found(format!("fixture {}", id))),
        Err(e) => error_response(&e),
    }
}

async fn handle_delete_mock(id: &str, state: &AppState) -> HyperResponse {
    let id = match parse_id::<FixtureId>(id) {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };

    match state.fixtures.delete_mock(id).await {
        Ok(true) => empty_response(StatusCode::NO_CONTENT),
        Ok(false) => error_response(&ApiError::not_found(format!("fixture {}", id))),
        Err(e) => error_response(&e),
    }
}

async fn handle_save_body(id: &str, body: &Bytes, state: &AppState) -> HyperResponse {
    let id = match parse_id::<FixtureId>(id) {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };
    let value: serde_json::Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            let err = ApiError::invalid_request(format!("body must be JSON: {}", e));
            return error_response(&err);
        }
    };

    respond_data(state.fixtures.save_body(id, value).await)
}

fn source_name(source: DataSource) -> &'static str {
    match source {
        DataSource::Live => "live",
        DataSource::Mock => "mock",
    }
}

fn parse_id<T: std::str::FromStr>(raw: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_request(format!("invalid id: '{}'", raw)))
}

/// Read one query parameter
fn query_param(query: &str, name: &str) -> Option<String> {
    let url = url::Url::parse(&format!("http://localhost?{}", query)).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.to_string())
        .filter(|v| !v.is_empty())
}

fn respond_data<T: Serialize>(result: Result<T, ApiError>) -> HyperResponse {
    match result {
        Ok(data) => json_response(StatusCode::OK, &DataEnvelope { data }),
        Err(e) => error_response(&e),
    }
}

pub fn error_response(err: &ApiError) -> HyperResponse {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse::from(err);
    json_response(status, &body)
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HyperResponse {
    let json = serde_json::to_vec(body).unwrap_or_default();
    let mut response = Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn empty_response(status: StatusCode) -> HyperResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}
