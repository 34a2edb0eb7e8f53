//! HTTP server exposing the dashboard.
//!
//! The server loads the CSV once at startup and keeps the dashboard in
//! shared state. Gesture endpoints mutate the timeline; rendering endpoints
//! return either JSON scenes or SVG documents.
//!
//! # Routes
//!
//! ```text
//! GET  /health                 liveness
//! GET  /timeline               view state + scene (JSON)
//! GET  /timeline.svg           rendered timeline
//! POST /timeline/zoom          apply a zoom gesture
//! POST /timeline/brush         finish a brush gesture
//! POST /timeline/reset         animate the zoom back to identity
//! GET  /timeline/hover?x=&y=   tooltip for the marker under a pixel
//! GET  /simulator              simulator state, optional ?stress=&exercise=
//! GET  /simulator.svg          rendered simulator
//! ```

use crate::config::Config;
use crate::core::brush::BrushSelection;
use crate::core::simulator::{SimPoint, SimulatorAnimation};
use crate::core::timeline::{Marker, TimelineState, Tooltip, ZoomAnimation};
use crate::core::zoom::ZoomTransform;
use crate::dashboard::{Dashboard, LoadState};
use crate::data::loader::{parse_csv, LoadError};
use crate::render::Scene;
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
    /// Dashboard configuration, including the CSV path
    pub config: Config,
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(port: u16, config: Config) -> Self {
        Self { port, config }
    }
}

/// Shared server state
pub struct ServerState {
    load: RwLock<LoadState>,
    config: Config,
}

impl ServerState {
    /// Create state that is still waiting for its data.
    pub fn new(config: Config) -> Self {
        Self {
            load: RwLock::new(LoadState::Loading),
            config,
        }
    }

    /// Read and parse the configured CSV, then build the dashboard.
    pub async fn load_data(&self) {
        let path = &self.config.data_path;
        let result = match tokio::fs::read(path).await {
            Ok(bytes) => parse_csv(bytes.as_slice()),
            Err(source) => Err(LoadError::Io {
                path: path.clone(),
                source,
            }),
        };
        if let Ok(readings) = &result {
            tracing::info!(path = %path.display(), count = readings.len(), "loaded readings");
        }
        *self.load.write().await = LoadState::complete(result, &self.config);
    }
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.to_string(),
        }),
    )
}

fn unavailable(load: &LoadState) -> ApiError {
    match load {
        LoadState::Failed(e) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "LOAD_FAILED",
            format!("Failed to load data: {}", e),
        ),
        _ => api_error(StatusCode::SERVICE_UNAVAILABLE, "LOADING", "Data is still loading"),
    }
}

fn ready(load: &LoadState) -> Result<&Dashboard, ApiError> {
    match load {
        LoadState::Ready(dashboard) => Ok(dashboard.as_ref()),
        other => Err(unavailable(other)),
    }
}

fn ready_mut(load: &mut LoadState) -> Result<&mut Dashboard, ApiError> {
    match load {
        LoadState::Ready(dashboard) => Ok(dashboard.as_mut()),
        other => Err(unavailable(other)),
    }
}

/// Response from GET /timeline
#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub state: TimelineState,
    pub scene: Scene,
}

/// Body of POST /timeline/zoom
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "gesture", rename_all = "snake_case")]
pub enum ZoomRequest {
    /// Set the transform directly; it is constrained before use
    Transform { k: f64, x: f64, y: f64 },
    /// Wheel zoom about `anchor`, the viewport centre when absent
    Scale {
        factor: f64,
        #[serde(default)]
        anchor: Option<[f64; 2]>,
    },
    /// Drag by `dx` pixels
    Pan { dx: f64 },
}

/// Response from POST /timeline/zoom
#[derive(Debug, Serialize)]
pub struct ZoomResponse {
    pub applied: ZoomTransform,
    pub state: TimelineState,
}

/// Body of POST /timeline/brush. A missing selection is a cleared brush.
#[derive(Debug, Clone, Deserialize)]
pub struct BrushRequest {
    #[serde(default)]
    pub selection: Option<[f64; 2]>,
}

/// Response from POST /timeline/brush
#[derive(Debug, Serialize)]
pub struct BrushResponse {
    pub applied: bool,
    pub state: TimelineState,
}

/// Response from POST /timeline/reset
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub animation: ZoomAnimation,
    /// Time axis domain shown by each animation frame
    pub frame_domains: Vec<(DateTime<Utc>, DateTime<Utc>)>,
    pub state: TimelineState,
}

#[derive(Debug, Deserialize)]
pub struct HoverQuery {
    pub x: f64,
    pub y: f64,
}

/// Response from GET /timeline/hover. Empty when no marker is hit.
#[derive(Debug, Serialize)]
pub struct HoverResponse {
    pub marker: Option<Marker>,
    pub tooltip: Option<Tooltip>,
    pub lines: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SimulatorQuery {
    pub stress: Option<f64>,
    pub exercise: Option<f64>,
}

/// Response from GET /simulator
#[derive(Debug, Serialize)]
pub struct SimulatorResponse {
    pub stress: String,
    pub exercise: String,
    pub points: Vec<SimPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<SimulatorAnimation>,
    pub scene: Scene,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /timeline
async fn timeline(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<TimelineResponse>, ApiError> {
    let load = state.load.read().await;
    let dashboard = ready(&load)?;
    Ok(Json(TimelineResponse {
        state: dashboard.timeline.state(),
        scene: dashboard.timeline_scene(),
    }))
}

/// GET /timeline.svg
async fn timeline_svg(State(state): State<Arc<ServerState>>) -> Result<impl IntoResponse, ApiError> {
    let load = state.load.read().await;
    let dashboard = ready(&load)?;
    Ok(([(header::CONTENT_TYPE, SVG_CONTENT_TYPE)], dashboard.timeline_svg()))
}

/// POST /timeline/zoom
async fn zoom(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ZoomRequest>,
) -> Result<Json<ZoomResponse>, ApiError> {
    let finite = match &request {
        ZoomRequest::Transform { k, x, y } => k.is_finite() && *k > 0.0 && x.is_finite() && y.is_finite(),
        ZoomRequest::Scale { factor, anchor } => {
            factor.is_finite()
                && *factor > 0.0
                && anchor.map_or(true, |[ax, ay]| ax.is_finite() && ay.is_finite())
        }
        ZoomRequest::Pan { dx } => dx.is_finite(),
    };
    if !finite {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_ZOOM",
            "Zoom parameters must be finite and scale factors positive",
        ));
    }

    let mut load = state.load.write().await;
    let dashboard = ready_mut(&mut load)?;

    let applied = match request {
        ZoomRequest::Transform { k, x, y } => dashboard.timeline.on_zoom(ZoomTransform::new(k, x, y)),
        ZoomRequest::Scale { factor, anchor } => dashboard.timeline.zoom_by(factor, anchor),
        ZoomRequest::Pan { dx } => dashboard.timeline.pan_by(dx),
    };

    Ok(Json(ZoomResponse {
        applied,
        state: dashboard.timeline.state(),
    }))
}

/// POST /timeline/brush
async fn brush(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<BrushRequest>,
) -> Result<Json<BrushResponse>, ApiError> {
    if let Some([x0, x1]) = request.selection {
        if !x0.is_finite() || !x1.is_finite() {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "INVALID_SELECTION",
                "Brush bounds must be finite",
            ));
        }
    }

    let mut load = state.load.write().await;
    let dashboard = ready_mut(&mut load)?;

    let applied = dashboard
        .timeline
        .on_brush_end(request.selection.map(BrushSelection::from));
    Ok(Json(BrushResponse {
        applied,
        state: dashboard.timeline.state(),
    }))
}

/// POST /timeline/reset
async fn reset(State(state): State<Arc<ServerState>>) -> Result<Json<ResetResponse>, ApiError> {
    let mut load = state.load.write().await;
    let dashboard = ready_mut(&mut load)?;

    let animation = dashboard.timeline.reset_zoom();
    let frame_domains = animation
        .frames
        .iter()
        .map(|t| dashboard.timeline.frame_time_scale(*t).domain())
        .collect();
    Ok(Json(ResetResponse {
        animation,
        frame_domains,
        state: dashboard.timeline.state(),
    }))
}

/// GET /timeline/hover
async fn hover(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<HoverQuery>,
) -> Result<Json<HoverResponse>, ApiError> {
    let load = state.load.read().await;
    let dashboard = ready(&load)?;

    let response = match dashboard.timeline.hit_test(query.x, query.y) {
        Some((marker, tooltip)) => HoverResponse {
            marker: Some(marker),
            lines: tooltip.lines(dashboard.tz()),
            tooltip: Some(tooltip),
        },
        None => HoverResponse {
            marker: None,
            tooltip: None,
            lines: Vec::new(),
        },
    };
    Ok(Json(response))
}

/// Apply slider values from the query, if any were given.
fn apply_slider_query(dashboard: &mut Dashboard, query: &SimulatorQuery) -> Option<SimulatorAnimation> {
    if query.stress.is_none() && query.exercise.is_none() {
        return None;
    }
    let (stress, exercise) = dashboard.simulator.slider_values().unwrap_or((0.0, 0.0));
    Some(dashboard.simulate(
        query.stress.unwrap_or(stress),
        query.exercise.unwrap_or(exercise),
    ))
}

/// GET /simulator
async fn simulator(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<SimulatorQuery>,
) -> Result<Json<SimulatorResponse>, ApiError> {
    let mut load = state.load.write().await;
    let dashboard = ready_mut(&mut load)?;

    let animation = apply_slider_query(dashboard, &query);
    let (stress, exercise) = dashboard.simulator.labels();
    Ok(Json(SimulatorResponse {
        stress,
        exercise,
        points: dashboard.simulator.points().to_vec(),
        animation,
        scene: dashboard.simulator_scene(),
    }))
}

/// GET /simulator.svg
async fn simulator_svg(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<SimulatorQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut load = state.load.write().await;
    let dashboard = ready_mut(&mut load)?;

    apply_slider_query(dashboard, &query);
    Ok(([(header::CONTENT_TYPE, SVG_CONTENT_TYPE)], dashboard.simulator_svg()))
}

/// Build the router over existing state.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/timeline", get(timeline))
        .route("/timeline.svg", get(timeline_svg))
        .route("/timeline/zoom", post(zoom))
        .route("/timeline/brush", post(brush))
        .route("/timeline/reset", post(reset))
        .route("/timeline/hover", get(hover))
        .route("/simulator", get(simulator))
        .route("/simulator.svg", get(simulator_svg))
        .layer(
            CorsLayer::new()
                .allow_origin([
                    HeaderValue::from_static("http://localhost"),
                    HeaderValue::from_static("http://127.0.0.1"),
                ])
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(config: ServerConfig) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let state = Arc::new(ServerState::new(config.config.clone()));
    state.load_data().await;
    if let LoadState::Failed(e) = &*state.load.read().await {
        anyhow::bail!("Failed to load {}: {}", config.config.data_path.display(), e);
    }

    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Timeline server listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}
