use axum::{
    extract::{Path, Query, State},
    response::{Html, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::error::ApiError;
use crate::report::{Dashboard, ReportOptions};
use crate::source::{ScanRange, SourceSet};
use crate::tracker;

const DASHBOARD_HTML: &str = include_str!("../assets/dashboard.html");

#[derive(Clone)]
pub struct AppState {
    pub sources: SourceSet,
    pub scan_blocks: u64,
    pub report: ReportOptions,
}

#[derive(Debug, Deserialize)]
pub struct WalletQuery {
    /// Mirrors the "use Seiscan API" checkbox; on by default.
    pub use_explorer: Option<bool>,
    /// RPC scan depth override, at most `MAX_SCAN_BLOCKS`. Ignored when the
    /// explorer serves the request: it always returns the full history.
    pub blocks: Option<u64>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    explorer: bool,
}

pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { Html(DASHBOARD_HTML) }))
        .route("/health", get(health))
        .route("/api/wallet/", get(missing_address))
        .route("/api/wallet/:address", get(wallet))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(port: u16, state: AppState) -> eyre::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Dashboard listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app_router(state).into_make_service()).await?;

    Ok(())
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        explorer: state.sources.explorer.is_some(),
    })
}

async fn missing_address() -> Result<Json<Dashboard>, ApiError> {
    Err(ApiError::MissingAddress)
}

async fn wallet(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(q): Query<WalletQuery>,
) -> Result<Json<Dashboard>, ApiError> {
    let range = ScanRange::Latest {
        blocks: q.blocks.unwrap_or(state.scan_blocks),
    };
    let (source, result) = tracker::fetch_and_normalize(
        &state.sources,
        &address,
        q.use_explorer.unwrap_or(true),
        range,
    )
    .await?;

    Ok(Json(Dashboard::build(address.trim(), source, &result, &state.report)))
}
