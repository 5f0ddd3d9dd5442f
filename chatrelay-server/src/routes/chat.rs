use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chatrelay_core::chat::{ChatReply, ChatRequest};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

/// Chat parameters, accepted as a JSON body or as query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ChatParams {
    /// A missing prompt is treated as empty and rejected with 400
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub max_iterations: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub include_metadata: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub iterations: u32,
    pub tools_called: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

async fn post_chat(
    State(state): State<AppState>,
    Json(params): Json<ChatParams>,
) -> Result<Json<ChatResponse>, ApiError> {
    run_chat(&state, params).await.map(Json)
}

async fn get_chat(
    State(state): State<AppState>,
    Query(params): Query<ChatParams>,
) -> Result<Json<ChatResponse>, ApiError> {
    run_chat(&state, params).await.map(Json)
}

async fn run_chat(state: &AppState, params: ChatParams) -> Result<ChatResponse, ApiError> {
    info!("Chat request received: {} chars", params.prompt.len());

    let request = ChatRequest {
        prompt: params.prompt,
        max_iterations: params.max_iterations,
        temperature: params.temperature,
        max_tokens: params.max_tokens,
    };

    let reply = state.service.process_query(&request).await.map_err(|e| {
        error!("Chat request failed: {}", e);
        ApiError::from(e)
    })?;

    info!(
        "Chat completed: {} iteration(s), {} tool(s)",
        reply.iterations, reply.tools_called
    );

    let metadata = params.include_metadata.then(|| metadata(&reply));
    Ok(ChatResponse {
        response: reply.response,
        iterations: reply.iterations,
        tools_called: reply.tools_called,
        metadata,
    })
}

fn metadata(reply: &ChatReply) -> Value {
    json!({
        "model": reply.model,
        "stop_reason": reply.stop_reason,
        "tool_names": reply.tool_names,
        "max_iterations_reached": reply.max_iterations_reached,
        "usage": reply.usage,
    })
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/chat", get(get_chat).post(post_chat))
}
