//! Tests for the conversation loop with scripted providers and tools

use async_trait::async_trait;
use chatrelay_core::chat::{ChatError, ChatRequest, ChatService, ToolExecutor, NO_RESPONSE};
use chatrelay_core::config::ChatDefaults;
use chatrelay_core::http::ChatOptions;
use chatrelay_core::protocol::{
    ChatMessage, Content, ContentBlock, LlmResponse, Role, ToolCall, ToolResult, ToolSchema,
    Usage, STOP_REASON_TOOL_USE,
};
use chatrelay_core::providers::{LlmProvider, ProviderError, ProviderResult};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Provider that replays canned responses and records what it was sent
struct ScriptedProvider {
    responses: Mutex<VecDeque<ProviderResult<LlmResponse>>>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
    seen_tools: Mutex<Vec<usize>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ProviderResult<LlmResponse>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            seen: Mutex::new(Vec::new()),
            seen_tools: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    fn conversation(&self, call: usize) -> Vec<ChatMessage> {
        self.seen.lock().unwrap()[call].clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
        _options: &ChatOptions,
    ) -> ProviderResult<LlmResponse> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.seen_tools
            .lock()
            .unwrap()
            .push(tools.map_or(0, <[ToolSchema]>::len));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(text_response("out of script", "stop")))
    }

    fn model(&self) -> &str {
        "scripted/model"
    }

    fn provider_name(&self) -> &str {
        "Scripted"
    }
}

/// Executor exposing a single `add` tool
struct AddTool;

#[async_trait]
impl ToolExecutor for AddTool {
    fn tools(&self) -> Vec<ToolSchema> {
        vec![ToolSchema {
            name: "add".to_string(),
            description: "Add two numbers".to_string(),
            input_schema: json!({"type": "object"}),
        }]
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        match (call.input["a"].as_i64(), call.input["b"].as_i64()) {
            (Some(a), Some(b)) => ToolResult::success(call.id.clone(), json!(a + b)),
            _ => ToolResult::error(call.id.clone(), "missing operands"),
        }
    }
}

fn text_response(text: &str, stop_reason: &str) -> LlmResponse {
    LlmResponse::new(
        vec![ContentBlock::text(text)],
        Some(stop_reason.to_string()),
    )
}

fn tool_response(id: &str, a: i64, b: i64) -> LlmResponse {
    let mut response = LlmResponse::new(
        vec![ContentBlock::tool_use(id, "add", json!({"a": a, "b": b}))],
        Some(STOP_REASON_TOOL_USE.to_string()),
    );
    response.usage = Some(Usage {
        prompt_tokens: 10,
        completion_tokens: 5,
        total_tokens: 15,
    });
    response
}

#[tokio::test]
async fn test_single_turn() {
    let provider = ScriptedProvider::new(vec![Ok(text_response("Paris", "stop"))]);
    let service = ChatService::new(provider.clone(), ChatDefaults::default());

    let reply = service
        .process_query(&ChatRequest::new("Capital of France?"))
        .await
        .unwrap();

    assert_eq!(reply.response, "Paris");
    assert_eq!(reply.iterations, 1);
    assert_eq!(reply.tools_called, 0);
    assert_eq!(reply.stop_reason.as_deref(), Some("stop"));
    assert_eq!(reply.model, "scripted/model");
    assert!(!reply.max_iterations_reached);

    let sent = provider.conversation(0);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].role(), Role::User);
    assert_eq!(sent[0].content(), &Content::Text("Capital of France?".to_string()));
}

#[tokio::test]
async fn test_system_prompt_sent_first() {
    let provider = ScriptedProvider::new(vec![Ok(text_response("ok", "stop"))]);
    let defaults = ChatDefaults {
        system_prompt: Some("Answer in one word.".to_string()),
        ..Default::default()
    };
    let service = ChatService::new(provider.clone(), defaults);

    service.process_query(&ChatRequest::new("hi")).await.unwrap();

    let sent = provider.conversation(0);
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].role(), Role::System);
    assert_eq!(sent[1].role(), Role::User);
}

#[tokio::test]
async fn test_tool_loop() {
    let provider = ScriptedProvider::new(vec![
        Ok(tool_response("call_1", 2, 3)),
        Ok(text_response("The sum is 5", "stop")),
    ]);
    let service =
        ChatService::new(provider.clone(), ChatDefaults::default()).with_tool_executor(Arc::new(AddTool));

    let reply = service
        .process_query(&ChatRequest::new("What is 2 + 3?"))
        .await
        .unwrap();

    assert_eq!(reply.response, "The sum is 5");
    assert_eq!(reply.iterations, 2);
    assert_eq!(reply.tools_called, 1);
    assert_eq!(reply.tool_names, vec!["add".to_string()]);
    assert_eq!(reply.usage.total_tokens, 15);
    assert_eq!(*provider.seen_tools.lock().unwrap(), vec![1, 1]);

    // user, assistant tool_use, user tool_result
    let second = provider.conversation(1);
    assert_eq!(second.len(), 3);
    assert_eq!(second[1].role(), Role::Assistant);
    assert_eq!(second[2].role(), Role::User);
    assert_eq!(
        serde_json::to_value(second[2].content()).unwrap(),
        json!([{"type": "tool_result", "tool_use_id": "call_1", "content": 5, "is_error": false}])
    );
}

#[tokio::test]
async fn test_iteration_cap() {
    let provider = ScriptedProvider::new(vec![
        Ok(tool_response("call_1", 1, 1)),
        Ok(tool_response("call_2", 2, 2)),
        Ok(tool_response("call_3", 3, 3)),
    ]);
    let service =
        ChatService::new(provider.clone(), ChatDefaults::default()).with_tool_executor(Arc::new(AddTool));

    let reply = service
        .process_query(&ChatRequest::new("keep adding").with_max_iterations(2))
        .await
        .unwrap();

    assert_eq!(provider.calls(), 2);
    assert_eq!(reply.iterations, 2);
    assert_eq!(reply.tools_called, 2);
    assert!(reply.max_iterations_reached);
    assert_eq!(reply.response, NO_RESPONSE);
}

#[tokio::test]
async fn test_tool_calls_without_executor_stop() {
    let provider = ScriptedProvider::new(vec![Ok(tool_response("call_1", 1, 2))]);
    let service = ChatService::new(provider.clone(), ChatDefaults::default());

    let reply = service.process_query(&ChatRequest::new("add")).await.unwrap();

    assert_eq!(provider.calls(), 1);
    assert_eq!(reply.tools_called, 0);
    assert_eq!(reply.response, NO_RESPONSE);
    assert_eq!(*provider.seen_tools.lock().unwrap(), vec![0]);
}

#[tokio::test]
async fn test_empty_prompt_rejected() {
    let provider = ScriptedProvider::new(vec![]);
    let service = ChatService::new(provider.clone(), ChatDefaults::default());

    let result = service.process_query(&ChatRequest::new("   ")).await;

    assert!(matches!(result, Err(ChatError::InvalidRequest(_))));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_provider_error_propagates() {
    let provider = ScriptedProvider::new(vec![Err(ProviderError::Authentication(
        "invalid key".to_string(),
    ))]);
    let service = ChatService::new(provider, ChatDefaults::default());

    let err = service.process_query(&ChatRequest::new("hi")).await.unwrap_err();

    assert_eq!(err.provider_error(), Some(&ProviderError::Authentication("invalid key".to_string())));
    assert!(matches!(err, ChatError::Provider { iteration: 1, .. }));
}

#[test]
fn test_tools_come_from_executor() {
    let provider = ScriptedProvider::new(vec![]);
    let bare = ChatService::new(provider.clone(), ChatDefaults::default());
    assert!(bare.tools().is_empty());

    let with_tools = bare.with_tool_executor(Arc::new(AddTool));
    let names: Vec<String> = with_tools.tools().into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["add".to_string()]);
}
