//! mock-workbench: track API with switchable live/mock data
//!
//! Lightweight HTTP server using hyper. Serves the track API from either the
//! live upstream or replayed fixtures, plus the fixture editor endpoints.
//! Runs on a single-threaded tokio runtime; connections are local tasks on a
//! `LocalSet` since core's async traits are !Send.

use std::future::Future;
use std::sync::Arc;

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use tokio::net::TcpListener;
use tokio::task::LocalSet;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use mock_workbench_core::config::{optional_var, parse_var, Config};
use mock_workbench_core::context::select_repository;
use mock_workbench_core::error::ApiError;
use mock_workbench_core::platform::Timer;
use mock_workbench_core::store::{FixtureClient, StoreConnection};
use mock_workbench_core::tracks::TrackService;

mod platform;
mod routes;
mod store;

use platform::{ReqwestHttpClient, SystemEnv, TokioTimer};
use routes::{AppState, HyperResponse};
use store::FileStoreConnector;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let env = SystemEnv;
    let config = match Config::from_env(&env) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };
    let port: u16 = match parse_var(&env, "PORT") {
        Ok(port) => port.unwrap_or(8080),
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };
    let store_dir = optional_var(&env, "STORE_DIR").unwrap_or_else(|| ".".into());

    let connection = Arc::new(StoreConnection::new(
        Arc::new(FileStoreConnector::new(store_dir)),
        config.db.clone(),
    ));
    // Without a store the mock repository serves fallback data
    if let Err(e) = connection.connect().await {
        warn!(error = %e, "starting without a fixture store");
    }

    let fixtures = FixtureClient::new(connection.clone());
    let timer: Arc<dyn Timer> = Arc::new(TokioTimer);
    let http = ReqwestHttpClient::new();
    let (source, repository) =
        select_repository(&config, &env, fixtures.clone(), timer.clone(), http);

    let state = Arc::new(AppState {
        tracks: TrackService::new(repository, timer),
        fixtures,
        source,
    });

    let listener = match TcpListener::bind(format!("0.0.0.0:{}", port)).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(port, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(port, ?source, "mock-workbench listening");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    LocalSet::new().run_until(serve(listener, state, shutdown)).await;

    connection.disconnect().await;
    info!("mock-workbench stopped");
}

/// Accept connections until `shutdown` completes, serving each one as its own
/// local task. Must run inside a `LocalSet`.
async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()>,
) {
    tokio::pin!(shutdown);

    loop {
        let stream = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    continue;
                }
            },
            _ = &mut shutdown => break,
        };

        let state = state.clone();
        tokio::task::spawn_local(async move {
            let io = hyper_util::rt::TokioIo::new(stream);
            let service = service_fn(move |req| {
                let state = state.clone();
                async move { handle_request(req, &state).await }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                warn!(error = %e, "connection error");
            }
        });
    }

    debug!("stopped accepting connections");
}

async fn handle_request(
    req: Request<Incoming>,
    state: &Arc<AppState>,
) -> Result<HyperResponse, std::convert::Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().unwrap_or("").to_string();

    let body = match req.collect().await {
        Ok(b) => b.to_bytes(),
        Err(e) => {
            let err = ApiError::invalid_request(format!("failed to read body: {}", e));
            return Ok(routes::error_response(&err));
        }
    };

    let response = routes::route(&method, &path, &query, body, state).await;
    info!(%method, %path, status = response.status().as_u16(), "request handled");
    Ok(response)
}
