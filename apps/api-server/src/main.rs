//! api-server — HTTP API in front of the URL validation core.
//!
//! Serves the browser QR generator:
//! - `POST /api/validate`: run the validator and return its result as JSON.
//! - `POST /api/generate`: validate for generation; corrected URLs need an
//!   explicit `approve` before they are accepted and recorded.
//! - `GET /api/history`, `DELETE /api/history`: in-memory generation history.
//!
//! QR rendering itself happens in the browser; this server only hands out the
//! final canonical URL.
//!
//! Run:
//! ```bash
//! # pretty logs (default); PORT optional
//! cargo run -p api-server
//!
//! # json logs with a wider TLD allow-list
//! LOG_FORMAT=json ALLOWED_TLDS=com,org,net,edu,gov,eu,io cargo run -p api-server
//! ```
//!
//! Configuration: See `config.rs` for all environment variables.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use domain::adapters::memory_history::InMemoryHistory;
use domain::service::{Decision, QrService, Submission};
use domain::{Clock, HistoryEntry, Validator};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Clone)]
struct StdClock;
impl Clock for StdClock {
    fn now(&self) -> std::time::SystemTime {
        std::time::SystemTime::now()
    }
}

type Service = QrService<InMemoryHistory, StdClock>;

#[derive(Clone)]
struct AppState {
    service: Arc<Service>,
}

#[derive(Deserialize)]
struct ValidateReq {
    url: String,
}

#[derive(Deserialize)]
struct GenerateReq {
    url: String,
    #[serde(default)]
    approve: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedOut {
    url: String,
    original_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryItemOut {
    timestamp: String,
    original_url: String,
    encoded_url: String,
}

#[derive(Serialize)]
struct HistoryOut {
    items: Vec<HistoryItemOut>,
}

const DEFAULT_HISTORY_PAGE: usize = 50;

#[tokio::main]
async fn main() {
    // Load and validate config first (fail fast on misconfiguration)
    let cfg = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&cfg);
    cfg.warn_if_customized();

    let service = QrService::new(
        Validator::new(cfg.validator_config()),
        InMemoryHistory::with_capacity(cfg.history_limit),
        StdClock,
    );
    let state = AppState {
        service: Arc::new(service),
    };

    // Request ID header name
    let x_request_id = axum::http::HeaderName::from_static("x-request-id");

    let mut app = routes(state)
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid));

    // CORS - already validated in Config::from_env()
    let cors = if cfg.cors_allow_origin == HeaderValue::from_static("*") {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list([cfg.cors_allow_origin]))
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    };
    app = app.layer(cors);

    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(%addr, err = %e, "bind failed");
            std::process::exit(1);
        }
    };
    info!(%addr, core = %domain::about(), "api-server listening");
    if let Err(e) = axum::serve(listener, app).await {
        error!(err = %e, "server error");
        std::process::exit(1);
    }
}

fn init_tracing(cfg: &config::Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.log_format {
        config::LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
        config::LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
    }
}

fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/validate", post(validate_url).options(preflight))
        .route("/api/generate", post(generate).options(preflight))
        .route(
            "/api/history",
            get(list_history).delete(clear_history).options(preflight),
        )
        .with_state(state)
}

async fn validate_url(
    State(state): State<AppState>,
    Json(body): Json<ValidateReq>,
) -> impl IntoResponse {
    let result = state.service.check(&body.url);
    let status = if result.is_valid {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    info!(verdict = ?result.verdict(), has_warnings = result.has_warnings, "validate");
    (status, Json(result)).into_response()
}

async fn generate(
    State(state): State<AppState>,
    Json(body): Json<GenerateReq>,
) -> impl IntoResponse {
    let submission = match state.service.submit(&body.url) {
        Ok(s) => s,
        Err(e) => {
            error!(err = ?e, "submit error");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(http_common::json_error_with_message(
                    "internal",
                    "server error",
                )),
            )
                .into_response();
        }
    };

    match submission {
        Submission::Ready(url) => {
            info!(url = %url, "generate ok");
            (
                StatusCode::CREATED,
                Json(GeneratedOut {
                    original_url: url.clone(),
                    url,
                }),
            )
                .into_response()
        }
        Submission::Rejected {
            error,
            suggested_url,
        } => {
            warn!(error = %error, "generate rejected");
            let mut out = http_common::json_error_with_message("invalid_url", &error);
            if let Some(s) = suggested_url {
                out["suggestedUrl"] = serde_json::Value::String(s);
            }
            (StatusCode::UNPROCESSABLE_ENTITY, Json(out)).into_response()
        }
        Submission::NeedsApproval(pending) => {
            let Some(approve) = body.approve else {
                let mut out = http_common::json_err("confirmation_required");
                out["originalUrl"] = serde_json::json!(pending.original_url());
                out["proposedUrl"] = serde_json::json!(pending.proposed_url());
                out["reasons"] = serde_json::json!(pending.reasons());
                return (StatusCode::CONFLICT, Json(out)).into_response();
            };
            let original_url = pending.original_url().to_string();
            let decision = if approve {
                Decision::Approve
            } else {
                Decision::Reject
            };
            match state.service.decide(pending, decision) {
                Ok(Some(url)) => {
                    info!(url = %url, "generate ok after approval");
                    (
                        StatusCode::CREATED,
                        Json(GeneratedOut { url, original_url }),
                    )
                        .into_response()
                }
                Ok(None) => (
                    StatusCode::OK,
                    Json(serde_json::json!({ "discarded": true })),
                )
                    .into_response(),
                Err(e) => {
                    error!(err = ?e, "decide error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(http_common::json_error_with_message(
                            "internal",
                            "server error",
                        )),
                    )
                        .into_response()
                }
            }
        }
    }
}

async fn list_history(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let limit = match http_common::parse_limit_query(query.as_deref()) {
        Some(n) => n,
        None if http_common::has_limit_param(query.as_deref()) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(http_common::json_error_with_message(
                    "bad_request",
                    "limit must be between 1 and 500",
                )),
            )
                .into_response()
        }
        None => DEFAULT_HISTORY_PAGE,
    };

    match state.service.history(limit) {
        Ok(entries) => (
            StatusCode::OK,
            Json(HistoryOut {
                items: entries.into_iter().map(entry_to_out).collect(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!(err = ?e, "history error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(http_common::json_err("internal")),
            )
                .into_response()
        }
    }
}

async fn clear_history(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.clear_history() {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!(err = ?e, "clear history error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(http_common::json_err("internal")),
            )
                .into_response()
        }
    }
}

async fn preflight() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

fn entry_to_out(entry: HistoryEntry) -> HistoryItemOut {
    HistoryItemOut {
        timestamp: http_common::system_time_to_rfc3339(entry.timestamp),
        original_url: entry.original_url,
        encoded_url: entry.encoded_url,
    }
}
