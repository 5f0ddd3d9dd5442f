use crate::state::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chatrelay_core::protocol::ToolSchema;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolSchema>,
    pub count: usize,
}

async fn list_tools(State(state): State<AppState>) -> Json<ToolsResponse> {
    let tools = state.service.tools();
    Json(ToolsResponse {
        count: tools.len(),
        tools,
    })
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/tools", get(list_tools))
}
