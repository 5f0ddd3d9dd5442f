use super::{ChatError, ChatReply, ChatRequest, ChatResult, ToolExecutor, NO_RESPONSE};
use crate::config::ChatDefaults;
use crate::converter::MessageConverter;
use crate::http::ChatOptions;
use crate::protocol::{ChatMessage, ToolSchema, Usage, STOP_REASON_END_TURN};
use crate::providers::LlmProvider;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs conversations against an [`LlmProvider`]
#[derive(Clone)]
pub struct ChatService {
    provider: Arc<dyn LlmProvider>,
    tool_executor: Option<Arc<dyn ToolExecutor>>,
    defaults: ChatDefaults,
}

impl ChatService {
    pub fn new(provider: Arc<dyn LlmProvider>, defaults: ChatDefaults) -> Self {
        Self {
            provider,
            tool_executor: None,
            defaults,
        }
    }

    /// Install an executor; its tools are offered on every call
    pub fn with_tool_executor(mut self, executor: Arc<dyn ToolExecutor>) -> Self {
        self.tool_executor = Some(executor);
        self
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Tools offered to the model; empty without an executor
    pub fn tools(&self) -> Vec<ToolSchema> {
        self.tool_executor
            .as_ref()
            .map(|executor| executor.tools())
            .unwrap_or_default()
    }

    /// Process a query end-to-end, running tools until the model is done
    pub async fn process_query(&self, request: &ChatRequest) -> ChatResult<ChatReply> {
        if request.prompt.trim().is_empty() {
            return Err(ChatError::InvalidRequest(
                "Prompt must not be empty".to_string(),
            ));
        }

        let max_iterations = request
            .max_iterations
            .unwrap_or(self.defaults.max_iterations)
            .max(1);
        let options = ChatOptions::new()
            .with_max_tokens(request.max_tokens.unwrap_or(self.defaults.max_tokens))
            .with_temperature(request.temperature.unwrap_or(self.defaults.temperature));
        let request_id = options.request_id;

        info!(
            "Processing query of {} chars, max {} iteration(s) [request_id: {}]",
            request.prompt.len(),
            max_iterations,
            request_id
        );

        let mut conversation = Vec::new();
        if let Some(system_prompt) = &self.defaults.system_prompt {
            conversation.push(ChatMessage::system(system_prompt.as_str()));
        }
        conversation.push(MessageConverter::create_user_message(request.prompt.as_str()));

        let tools = self.tools();
        let offered_tools = (!tools.is_empty()).then_some(tools.as_slice());

        let mut iterations = 0;
        let mut final_text = String::new();
        let mut tool_names = Vec::new();
        let mut stop_reason = None;
        let mut usage = Usage::default();

        while iterations < max_iterations {
            iterations += 1;
            debug!(
                "Iteration {}/{} [request_id: {}]",
                iterations, max_iterations, request_id
            );

            let response = self
                .provider
                .chat(&conversation, offered_tools, &options)
                .await
                .map_err(|source| ChatError::Provider {
                    iteration: iterations,
                    source,
                })?;

            if let Some(turn_usage) = &response.usage {
                usage.prompt_tokens = usage.prompt_tokens.saturating_add(turn_usage.prompt_tokens);
                usage.completion_tokens = usage
                    .completion_tokens
                    .saturating_add(turn_usage.completion_tokens);
                usage.total_tokens = usage.total_tokens.saturating_add(turn_usage.total_tokens);
            }

            let text = response.text();
            let tool_calls = response.tool_calls();
            stop_reason = response.stop_reason.clone();
            conversation.push(MessageConverter::create_assistant_message(response));

            if stop_reason.as_deref() == Some(STOP_REASON_END_TURN) {
                final_text = text;
                break;
            }
            if !text.is_empty() {
                final_text = text;
            }

            let Some(executor) = self.tool_executor.as_deref() else {
                break;
            };
            if tool_calls.is_empty() {
                break;
            }

            info!(
                "Executing {} tool call(s) [request_id: {}]",
                tool_calls.len(),
                request_id
            );

            let mut results = Vec::with_capacity(tool_calls.len());
            for call in &tool_calls {
                debug!("Calling tool {} ({}) [request_id: {}]", call.name, call.id, request_id);
                results.push(executor.execute(call).await);
                tool_names.push(call.name.clone());
            }
            conversation.push(MessageConverter::create_tool_result_message(&results));
        }

        info!(
            "Query processed: {} iteration(s), {} tool call(s) [request_id: {}]",
            iterations,
            tool_names.len(),
            request_id
        );

        Ok(ChatReply {
            response: if final_text.is_empty() {
                NO_RESPONSE.to_string()
            } else {
                final_text
            },
            iterations,
            tools_called: tool_names.len(),
            tool_names,
            stop_reason,
            max_iterations_reached: iterations >= max_iterations,
            usage,
            model: self.provider.model().to_string(),
        })
    }
}
