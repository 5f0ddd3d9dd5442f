use crate::state::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub app_name: String,
    pub version: &'static str,
    pub model: String,
    pub provider: String,
    pub uptime_seconds: f64,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: chatrelay_core::version(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        app_name: state.settings.app.name.clone(),
        version: chatrelay_core::version(),
        model: state.service.model().to_string(),
        provider: state.service.provider_name().to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Routes mounted under `/api/v1`
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/info", get(info))
}
