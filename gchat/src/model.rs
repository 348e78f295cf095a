//! The chat model: synchronous tool-call loop and streaming assembler.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;
use gcommon::{MetadataMap, SessionId};
use gprovider::{
    CompletionRequest, FinishReason, FunctionSpec, GigaChatTransport, Message, ResponseMessage,
    Role, TokenUsage, ToolCall, WireRole,
};
use gtooling::{
    DefaultToolRuntime, STRUCTURED_OUTPUT_TOOL_NAME, ToolExecutionContext, ToolRegistry,
    ToolRuntime, attach_structured_output, extract_structured_arguments,
    extract_structured_content, is_structured_output_call,
};

use crate::{
    ChatDelta, ChatError, ChatRequest, ChatResponse, ChatStream, GigaChatOptions, mapper, media,
    options::{resolve_function_call, validate_single_system},
};

pub const DEFAULT_MODEL: &str = "GigaChat";

/// Orchestrates multi-step tool calling over the completion API's single
/// stateless call.
///
/// Each call owns its growing message sequence; nothing is shared across
/// concurrent calls and the caller's own history is never mutated.
#[derive(Clone)]
pub struct GigaChatModel {
    transport: Arc<dyn GigaChatTransport>,
    registry: Arc<ToolRegistry>,
    tool_runtime: Arc<dyn ToolRuntime>,
    default_options: GigaChatOptions,
    system_prompt_first: bool,
    max_tool_round_trips: Option<u32>,
}

impl GigaChatModel {
    pub fn builder(transport: Arc<dyn GigaChatTransport>) -> GigaChatModelBuilder {
        GigaChatModelBuilder::new(transport)
    }

    pub fn default_options(&self) -> GigaChatOptions {
        self.default_options.clone()
    }

    /// One full synchronous call: send, execute any requested tools, resend,
    /// until the service stops requesting calls.
    pub async fn call(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        let prepared = self.prepare(request).await?;
        self.run_tool_loop(prepared).await
    }

    /// The same loop over streaming fragments. Fragments of non-tool turns
    /// are forwarded as distinct items in arrival order; tool turns are
    /// assembled, executed, and replaced by a fresh upstream stream.
    ///
    /// Dropping the returned stream aborts the in-flight upstream call and
    /// triggers no further tool execution.
    pub async fn stream(&self, request: ChatRequest) -> Result<ChatStream<'_>, ChatError> {
        let prepared = self.prepare(request).await?;
        Ok(self.stream_tool_loop(prepared))
    }

    async fn prepare(&self, request: ChatRequest) -> Result<PreparedCall, ChatError> {
        let options = self.default_options.merge(request.options.as_ref());
        validate_single_system(&request.messages)?;

        if options.structured_output_enabled() && self.registry.contains(STRUCTURED_OUTPUT_TOOL_NAME)
        {
            return Err(ChatError::invalid_request(format!(
                "tool name '{STRUCTURED_OUTPUT_TOOL_NAME}' is reserved for structured output"
            )));
        }

        let mut conversation = request.messages;
        let uploaded_media_ids =
            media::resolve_attachments(self.transport.as_ref(), &mut conversation).await?;
        let headers = options.effective_headers();

        Ok(PreparedCall {
            options,
            conversation,
            uploaded_media_ids,
            headers,
        })
    }

    fn build_completion_request(
        &self,
        conversation: &[Message],
        options: &GigaChatOptions,
        stream: bool,
    ) -> Result<CompletionRequest, ChatError> {
        let wire_messages = mapper::to_wire_messages(conversation, self.system_prompt_first)?;
        let model = options
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let mut request = CompletionRequest::new(model, wire_messages);
        request.temperature = options.temperature;
        request.top_p = options.top_p;
        request.max_tokens = options.max_tokens;
        request.repetition_penalty = options.repetition_penalty;
        if stream {
            request.update_interval = options.update_interval;
        }
        request.stream = stream;

        let definitions = self.registry.definitions();
        if !definitions.is_empty() {
            let functions = definitions
                .into_iter()
                .map(FunctionSpec::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map_err(ChatError::from)?;
            request.functions = Some(functions);
        }

        attach_structured_output(&mut request, options.output_schema.as_deref())
            .map_err(ChatError::from)?;

        let has_functions = request
            .functions
            .as_ref()
            .is_some_and(|functions| !functions.is_empty());
        request.function_call = resolve_function_call(options, has_functions)?;

        Ok(request)
    }

    async fn run_tool_loop(&self, prepared: PreparedCall) -> Result<ChatResponse, ChatError> {
        let PreparedCall {
            options,
            mut conversation,
            uploaded_media_ids,
            headers,
        } = prepared;

        let structured = options.structured_output_enabled();
        let mut usage = TokenUsage::default();
        let mut tool_exchange: Vec<Message> = Vec::new();
        let mut model_name: Option<String> = None;
        let mut round_trips = 0u32;

        loop {
            let request = self.build_completion_request(&conversation, &options, false)?;
            let response = self
                .transport
                .chat_completion(request, headers.clone())
                .await
                .map_err(ChatError::from)?;

            let Some(response) = response else {
                tracing::debug!(
                    event = "empty_completion",
                    "completion returned no body, treating as zero results"
                );
                return Ok(ChatResponse::empty(
                    usage,
                    tool_exchange,
                    uploaded_media_ids,
                    model_name,
                ));
            };

            if let Some(wire_usage) = response.usage {
                usage.merge(wire_usage.into());
            }
            if model_name.is_none() {
                model_name = response.model.clone();
            }

            let Some(choice) = response.choices.into_iter().next() else {
                return Ok(ChatResponse::empty(
                    usage,
                    tool_exchange,
                    uploaded_media_ids,
                    model_name,
                ));
            };

            let finish_reason = choice.finish_reason.map(FinishReason::from);
            let message = choice.message.or(choice.delta).unwrap_or_default();

            if matches!(finish_reason, Some(FinishReason::ToolCall)) {
                if structured && is_structured_output_call(&message) {
                    return Ok(ChatResponse {
                        text: extract_structured_content(&message),
                        finish_reason: Some(FinishReason::Stop),
                        usage,
                        model: model_name,
                        tool_exchange,
                        uploaded_media_ids,
                        tool_round_limit_reached: false,
                    });
                }

                let tool_call = tool_call_from_message(&message)?;
                let context = self.execution_context(&options);
                let result = self
                    .tool_runtime
                    .execute(tool_call.clone(), context)
                    .await
                    .map_err(ChatError::from)?;

                let invocation = Message::assistant_tool_call(tool_call);
                let tool_message = result.into_message();
                conversation.push(invocation.clone());
                conversation.push(tool_message.clone());
                tool_exchange.push(invocation);
                tool_exchange.push(tool_message);

                round_trips += 1;
                if let Some(limit) = self.max_tool_round_trips
                    && round_trips >= limit
                {
                    tracing::warn!(
                        event = "tool_round_limit",
                        limit,
                        "tool round-trip limit reached, returning without a final answer"
                    );
                    return Ok(ChatResponse {
                        text: String::new(),
                        finish_reason,
                        usage,
                        model: model_name,
                        tool_exchange,
                        uploaded_media_ids,
                        tool_round_limit_reached: true,
                    });
                }

                continue;
            }

            return Ok(ChatResponse {
                text: message.content.unwrap_or_default(),
                finish_reason,
                usage,
                model: model_name,
                tool_exchange,
                uploaded_media_ids,
                tool_round_limit_reached: false,
            });
        }
    }

    fn stream_tool_loop(&self, prepared: PreparedCall) -> ChatStream<'_> {
        let PreparedCall {
            options,
            conversation,
            uploaded_media_ids: _,
            headers,
        } = prepared;

        let structured = options.structured_output_enabled();

        let stream = try_stream! {
            let mut conversation = conversation;
            let mut round_trips = 0u32;

            'turns: loop {
                let request = self.build_completion_request(&conversation, &options, true)?;
                let mut chunks = self
                    .transport
                    .chat_completion_stream(request, headers.clone())
                    .await
                    .map_err(ChatError::from)?;

                let mut accumulators: BTreeMap<u32, TurnAccumulator> = BTreeMap::new();
                let mut completed_tool_turn: Option<TurnAccumulator> = None;

                while let Some(item) = chunks.next().await {
                    let chunk = item.map_err(ChatError::from)?;
                    let chunk_usage = chunk.usage.map(TokenUsage::from);

                    let Some(choice) = chunk.choices.first() else {
                        continue;
                    };

                    let fragment = choice.turn();
                    if let Some(fragment) = fragment {
                        accumulators
                            .entry(choice.index)
                            .or_default()
                            .apply(fragment);
                    }

                    let finish_reason = choice.finish_reason.map(FinishReason::from);

                    if matches!(finish_reason, Some(FinishReason::ToolCall)) {
                        // The tool turn is complete: stop forwarding and
                        // resolve it before any further fragment goes out.
                        completed_tool_turn =
                            Some(accumulators.remove(&choice.index).unwrap_or_default());
                        break;
                    }

                    if let Some(reason) = finish_reason {
                        yield ChatDelta {
                            role: fragment.and_then(|fragment| fragment.role).map(Role::from),
                            content: fragment
                                .and_then(|fragment| fragment.content.clone())
                                .unwrap_or_default(),
                            finish_reason: Some(reason),
                            usage: chunk_usage,
                        };
                        break 'turns;
                    }

                    let carries_tool_fragment =
                        fragment.is_some_and(|fragment| fragment.function_call.is_some());
                    if carries_tool_fragment {
                        continue;
                    }

                    yield ChatDelta {
                        role: fragment.and_then(|fragment| fragment.role).map(Role::from),
                        content: fragment
                            .and_then(|fragment| fragment.content.clone())
                            .unwrap_or_default(),
                        finish_reason: None,
                        usage: chunk_usage,
                    };
                }

                let Some(turn) = completed_tool_turn else {
                    // Upstream closed without a terminal finish reason.
                    break;
                };

                if structured && turn.tool_name.as_deref() == Some(STRUCTURED_OUTPUT_TOOL_NAME) {
                    let arguments = (!turn.tool_arguments.is_empty())
                        .then_some(turn.tool_arguments.as_str());
                    yield ChatDelta {
                        role: turn.role.map(Role::from).or(Some(Role::Assistant)),
                        content: extract_structured_arguments(arguments),
                        finish_reason: Some(FinishReason::Stop),
                        usage: None,
                    };
                    break;
                }

                // Any text the turn carried alongside the call stays on the
                // invocation record; the wire sends it as an empty content.
                let invocation_content = turn.content.clone();
                let tool_call = turn.into_tool_call()?;
                let context = self.execution_context(&options);
                let result = self
                    .tool_runtime
                    .execute(tool_call.clone(), context)
                    .await
                    .map_err(ChatError::from)?;

                conversation.push(Message::Assistant {
                    content: invocation_content,
                    tool_call: Some(tool_call),
                });
                conversation.push(result.into_message());

                round_trips += 1;
                if let Some(limit) = self.max_tool_round_trips
                    && round_trips >= limit
                {
                    tracing::warn!(
                        event = "tool_round_limit",
                        limit,
                        "tool round-trip limit reached, closing stream"
                    );
                    break;
                }
            }
        };

        Box::pin(stream)
    }

    fn execution_context(&self, options: &GigaChatOptions) -> ToolExecutionContext {
        let session_id = options
            .session_id
            .clone()
            .unwrap_or_else(|| SessionId::new("untracked"));
        ToolExecutionContext::new(session_id)
    }
}

struct PreparedCall {
    options: GigaChatOptions,
    conversation: Vec<Message>,
    uploaded_media_ids: Vec<String>,
    headers: MetadataMap,
}

fn tool_call_from_message(message: &ResponseMessage) -> Result<ToolCall, ChatError> {
    let call = message.function_call.as_ref().ok_or_else(|| {
        ChatError::state("tool-call finish reason without a function call payload")
    })?;
    let name = call
        .name
        .clone()
        .ok_or_else(|| ChatError::state("function call without a function name"))?;

    // The state token correlates the invocation with its result; when the
    // service omits it the function name stands in.
    let id = message
        .functions_state_id
        .clone()
        .unwrap_or_else(|| name.clone());
    let arguments = call
        .arguments
        .clone()
        .unwrap_or_else(|| "{}".to_string());

    Ok(ToolCall::new(id, name, arguments))
}

/// In-progress assembly of one streamed turn for one choice index. Content
/// and tool-call argument fragments concatenate in arrival order; the role
/// and state token are set by the first fragment carrying them.
#[derive(Debug, Default)]
struct TurnAccumulator {
    role: Option<WireRole>,
    content: String,
    tool_name: Option<String>,
    tool_arguments: String,
    functions_state_id: Option<String>,
}

impl TurnAccumulator {
    fn apply(&mut self, fragment: &ResponseMessage) {
        if self.role.is_none() {
            self.role = fragment.role;
        }

        if let Some(content) = &fragment.content {
            self.content.push_str(content);
        }

        if let Some(call) = &fragment.function_call {
            if let Some(name) = &call.name {
                self.tool_name = Some(name.clone());
            }
            if let Some(arguments) = &call.arguments {
                self.tool_arguments.push_str(arguments);
            }
        }

        if let Some(state_id) = &fragment.functions_state_id {
            self.functions_state_id = Some(state_id.clone());
        }
    }

    fn into_tool_call(self) -> Result<ToolCall, ChatError> {
        let name = self
            .tool_name
            .ok_or_else(|| ChatError::state("tool-call turn completed without a function name"))?;
        let id = self.functions_state_id.unwrap_or_else(|| name.clone());
        let arguments = if self.tool_arguments.is_empty() {
            "{}".to_string()
        } else {
            self.tool_arguments
        };

        Ok(ToolCall::new(id, name, arguments))
    }
}

pub struct GigaChatModelBuilder {
    transport: Arc<dyn GigaChatTransport>,
    registry: Option<Arc<ToolRegistry>>,
    tool_runtime: Option<Arc<dyn ToolRuntime>>,
    default_options: GigaChatOptions,
    system_prompt_first: bool,
    max_tool_round_trips: Option<u32>,
}

impl GigaChatModelBuilder {
    fn new(transport: Arc<dyn GigaChatTransport>) -> Self {
        Self {
            transport,
            registry: None,
            tool_runtime: None,
            default_options: GigaChatOptions::default(),
            system_prompt_first: false,
            max_tool_round_trips: None,
        }
    }

    pub fn tools(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn tool_runtime(mut self, tool_runtime: Arc<dyn ToolRuntime>) -> Self {
        self.tool_runtime = Some(tool_runtime);
        self
    }

    pub fn default_options(mut self, default_options: GigaChatOptions) -> Self {
        self.default_options = default_options;
        self
    }

    /// Move a system message found mid-sequence to the front of the request.
    pub fn system_prompt_first(mut self, enabled: bool) -> Self {
        self.system_prompt_first = enabled;
        self
    }

    /// Bound the tool-call loop. Unset, the loop runs until the service
    /// stops requesting calls; the caller controls termination through tool
    /// design.
    pub fn max_tool_round_trips(mut self, limit: u32) -> Self {
        self.max_tool_round_trips = Some(limit);
        self
    }

    pub fn build(self) -> GigaChatModel {
        let registry = self.registry.unwrap_or_default();
        let tool_runtime = self
            .tool_runtime
            .unwrap_or_else(|| Arc::new(DefaultToolRuntime::new(Arc::clone(&registry))));

        GigaChatModel {
            transport: self.transport,
            registry,
            tool_runtime,
            default_options: self.default_options,
            system_prompt_first: self.system_prompt_first,
            max_tool_round_trips: self.max_tool_round_trips,
        }
    }
}
