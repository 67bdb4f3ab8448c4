//! Request routing
//!
//! ```text
//! GET  /                              banner
//! GET  /health                        liveness
//! GET  /api/v1/game/{id}              reconciled state and priced catalog
//! POST /api/v1/game/{id}/click        one manual action (body ignored)
//! POST /api/v1/game/{id}/upgrade      {"upgrade_id": "..."}
//! POST /api/v1/game/{id}/sync         reconcile and persist
//! GET  /api/v1/game/{id}/save         reconcile and persist, report time
//! GET  /api/v1/stats                  global totals
//! GET  /api/v1/leaderboard?limit=N    top players
//! ```
//!
//! Service calls block on storage, so they run on the blocking pool.

use crate::config::ConfigError;
use crate::response::{
    apply_cors, empty_response, error_response, json_response, service_error_response,
    HttpResponse,
};
use chrono::{DateTime, Utc};
use crumbs_core::Clock;
use crumbs_service::{GameService, GameStore};
use http_body_util::{BodyExt, Limited};
use hyper::body::Body;
use hyper::header::HeaderValue;
use hyper::{Method, Request, StatusCode};
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Largest request body accepted
const MAX_BODY_BYTES: usize = 16 * 1024;

/// State shared across all connections
pub struct AppState<S, C> {
    service: GameService<S, C>,
    cors_origin: HeaderValue,
}

impl<S: GameStore, C: Clock> AppState<S, C> {
    pub fn new(service: GameService<S, C>, cors_origin: &str) -> Result<Self, ConfigError> {
        let cors_origin = HeaderValue::from_str(cors_origin).map_err(|_| {
            ConfigError::Validation(format!("invalid cors_origin: {}", cors_origin))
        })?;
        Ok(Self {
            service,
            cors_origin,
        })
    }

    pub fn service(&self) -> &GameService<S, C> {
        &self.service
    }
}

#[derive(Debug, Deserialize)]
struct UpgradeRequest {
    upgrade_id: String,
}

#[derive(Serialize)]
struct Banner {
    message: &'static str,
    version: &'static str,
    status: &'static str,
    database: &'static str,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    upgrades: usize,
    timestamp: DateTime<Utc>,
}

/// Handle one request. Every response carries CORS headers.
pub async fn handle<B, S, C>(
    state: Arc<AppState<S, C>>,
    req: Request<B>,
) -> Result<HttpResponse, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    S: GameStore + 'static,
    C: Clock + 'static,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut response = route(&state, req).await;
    apply_cors(&mut response, &state.cors_origin);

    debug!(%method, %path, status = response.status().as_u16(), "request");
    Ok(response)
}

async fn route<B, S, C>(state: &Arc<AppState<S, C>>, req: Request<B>) -> HttpResponse
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    S: GameStore + 'static,
    C: Clock + 'static,
{
    if req.method() == Method::OPTIONS {
        return empty_response(StatusCode::NO_CONTENT);
    }

    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method.as_str(), segments.as_slice()) {
        ("GET", []) => json_response(
            StatusCode::OK,
            &Banner {
                message: "Crumbs idle-clicker API",
                version: env!("CARGO_PKG_VERSION"),
                status: "running",
                database: "native_db",
                timestamp: state.service.clock().now(),
            },
        ),
        ("GET", ["health"]) => json_response(
            StatusCode::OK,
            &Health {
                status: "healthy",
                upgrades: state.service.catalog().len(),
                timestamp: state.service.clock().now(),
            },
        ),
        ("GET", ["api", "v1", "stats"]) => call(state, |svc| svc.global_stats()).await,
        ("GET", ["api", "v1", "leaderboard"]) => match leaderboard_limit(query.as_deref()) {
            Ok(limit) => call(state, move |svc| svc.leaderboard(limit)).await,
            Err(response) => response,
        },
        (method, ["api", "v1", "game", player, rest @ ..]) => {
            let player = match decode_segment(player) {
                Ok(player) => player,
                Err(response) => return response,
            };
            match (method, rest) {
                ("GET", []) => call(state, move |svc| svc.get_state(&player)).await,
                ("POST", ["click"]) => call(state, move |svc| svc.click(&player)).await,
                ("POST", ["upgrade"]) => match read_json::<_, UpgradeRequest>(req.into_body()).await
                {
                    Ok(request) => {
                        call(state, move |svc| {
                            svc.purchase_upgrade(&player, &request.upgrade_id)
                        })
                        .await
                    }
                    Err(response) => response,
                },
                ("POST", ["sync"]) => call(state, move |svc| svc.sync(&player)).await,
                ("GET", ["save"]) => call(state, move |svc| svc.save(&player)).await,
                _ => not_found(&path),
            }
        }
        _ => not_found(&path),
    }
}

/// Run a service operation on the blocking pool and render its result
async fn call<S, C, T, F>(state: &Arc<AppState<S, C>>, op: F) -> HttpResponse
where
    S: GameStore + 'static,
    C: Clock + 'static,
    T: Serialize + Send + 'static,
    F: FnOnce(&GameService<S, C>) -> crumbs_service::Result<T> + Send + 'static,
{
    let state = Arc::clone(state);
    match tokio::task::spawn_blocking(move || op(&state.service)).await {
        Ok(Ok(value)) => json_response(StatusCode::OK, &value),
        Ok(Err(err)) => service_error_response(&err),
        Err(err) => {
            error!(error = %err, "service task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn read_json<B, T>(body: B) -> Result<T, HttpResponse>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    T: DeserializeOwned,
{
    let bytes = Limited::new(body, MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| {
            warn!(error = %e, "failed to read request body");
            error_response(StatusCode::BAD_REQUEST, "Failed to read request body")
        })?
        .to_bytes();

    serde_json::from_slice(&bytes).map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            &format!("Invalid request body: {}", e),
        )
    })
}

fn decode_segment(segment: &str) -> Result<String, HttpResponse> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "Player id is not valid UTF-8"))
}

/// `limit` from the query string, if present
fn leaderboard_limit(query: Option<&str>) -> Result<Option<usize>, HttpResponse> {
    let Some(query) = query else {
        return Ok(None);
    };
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key != "limit" {
            continue;
        }
        let value = percent_decode_str(value).decode_utf8_lossy();
        return value.parse::<usize>().map(Some).map_err(|_| {
            error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid limit: {}", value),
            )
        });
    }
    Ok(None)
}

fn not_found(path: &str) -> HttpResponse {
    error_response(StatusCode::NOT_FOUND, &format!("Not found: {}", path))
}
