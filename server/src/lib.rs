//! HTTP proxy for speech synthesis.
//!
//! One synthesis endpoint validates requests and forwards them to the
//! provider through the [`Synthesizer`] seam, plus a small supporting
//! surface: health, voice/model listings, metrics, and static hosting of
//! the browser form.

pub mod config;
pub mod error;
pub mod metrics;
pub mod validation;

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use speech_core::{SpeechModel, Synthesizer, Voice};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::metrics::{EndpointMetrics, MetricsResponse, SystemMetrics};
use crate::validation::{validate_synthesis_request, RawSynthesisRequest};

pub static START_TIME: OnceLock<Instant> = OnceLock::new();

#[derive(Clone)]
pub struct AppState {
    /// None when no provider credential is configured; every synthesis
    /// request then fails with a configuration error.
    pub synthesizer: Option<Arc<dyn Synthesizer>>,
    pub metrics: EndpointMetrics,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(synthesizer: Option<Arc<dyn Synthesizer>>, config: ServerConfig) -> Self {
        Self {
            synthesizer,
            metrics: EndpointMetrics::new(),
            config,
        }
    }
}

pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_voices() -> Json<Vec<&'static str>> {
    Json(Voice::ALL.iter().map(Voice::as_str).collect())
}

pub async fn list_models() -> Json<Vec<&'static str>> {
    Json(SpeechModel::ALL.iter().map(SpeechModel::as_str).collect())
}

pub async fn synthesize_endpoint(
    State(state): State<AppState>,
    payload: Result<Json<RawSynthesisRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let result = synthesize(&state, payload).await;
    match &result {
        Ok(_) => state
            .metrics
            .record_success(started.elapsed().as_millis() as u64),
        Err(_) => state.metrics.record_error(),
    }
    result
}

/// One atomic round trip: credential, body shape, field validation,
/// provider call, verbatim audio response.
async fn synthesize(
    state: &AppState,
    payload: Result<Json<RawSynthesisRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    // Credential comes first: a missing key is a configuration error even
    // when the request body is invalid.
    let synthesizer = state.synthesizer.as_ref().ok_or_else(|| {
        ApiError::Configuration(
            "OpenAI API key is not configured. Set OPENAI_API_KEY in the environment.".to_string(),
        )
    })?;

    let Json(raw) =
        payload.map_err(|e| ApiError::InvalidInput(format!("Invalid request body: {e}")))?;
    let request = validate_synthesis_request(raw)?;

    let audio = synthesizer.synthesize(&request).await?;
    info!(
        voice = %request.voice(),
        model = %request.model(),
        bytes = audio.len(),
        "synthesis complete"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/mpeg".to_string()),
            (header::CONTENT_LENGTH, audio.len().to_string()),
        ],
        audio,
    )
        .into_response())
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> Json<MetricsResponse> {
    let mut system = sysinfo::System::new();
    system.refresh_cpu();
    system.refresh_memory();

    let cpu_usage = system.global_cpu_info().cpu_usage();
    let memory_used = system.used_memory();
    let memory_total = system.total_memory();
    let memory_usage_percent = if memory_total > 0 {
        (memory_used as f64 / memory_total as f64 * 100.0) as f32
    } else {
        0.0
    };

    let uptime = START_TIME
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0);

    let system_load = {
        #[cfg(unix)]
        {
            std::fs::read_to_string("/proc/loadavg")
                .ok()
                .and_then(|loadavg| {
                    loadavg
                        .split_whitespace()
                        .next()
                        .and_then(|s| s.parse::<f64>().ok())
                })
        }
        #[cfg(not(unix))]
        None
    };

    Json(MetricsResponse {
        timestamp: chrono::Utc::now(),
        system: SystemMetrics {
            cpu_usage_percent: cpu_usage,
            memory_used_mb: memory_used / 1024 / 1024,
            memory_total_mb: memory_total / 1024 / 1024,
            memory_usage_percent,
            uptime_seconds: uptime,
            system_load,
        },
        synthesis: state.metrics.stats(),
    })
}

/// Request ID middleware for tracing.
async fn add_request_id(mut request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    match HeaderValue::from_str(&request_id) {
        Ok(value) => {
            request.headers_mut().insert("x-request-id", value.clone());
            let mut response = next.run(request).await;
            response.headers_mut().insert("x-request-id", value);
            response
        }
        Err(_) => next.run(request).await,
    }
}

/// CORS configuration - environment-aware.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let methods = [
        axum::http::Method::GET,
        axum::http::Method::POST,
        axum::http::Method::OPTIONS,
    ];

    if let Some(ref allowed_origins) = config.cors_allowed_origins {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse::<HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            warn!("CORS_ALLOWED_ORIGINS is empty, falling back to permissive CORS");
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(methods)
                .allow_headers(tower_http::cors::Any)
        } else {
            info!("CORS configured for {} origin(s)", origins.len());
            CorsLayer::new()
                .allow_origin(tower_http::cors::AllowOrigin::list(origins))
                .allow_methods(methods)
                .allow_headers(tower_http::cors::Any)
        }
    } else {
        warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (development mode)");
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let api = Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/voices", get(list_voices))
        .route("/models", get(list_models))
        .route("/metrics", get(metrics_endpoint))
        .route("/text-to-speech", post(synthesize_endpoint));

    let static_files =
        ServeDir::new(&state.config.static_dir).append_index_html_on_directories(true);

    Router::new()
        .merge(api.clone()) // root paths
        .nest("/api", api) // /api prefix
        .fallback_service(static_files)
        .layer(middleware::from_fn(add_request_id))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .into_inner(),
        )
        .with_state(state)
}
