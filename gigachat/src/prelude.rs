//! Common imports for most applications using the client.

pub use crate::{
    assistant_message, chat_request, http_transport, http_transport_with_base_url, model,
    model_from_token, model_with, model_with_tools, system_message, tool_call_message,
    tool_message, user_message, user_message_with_media,
};
pub use crate::{gc_messages, gc_msg};
pub use crate::{
    ChatDelta, ChatError, ChatErrorKind, ChatRequest, ChatResponse, ChatStream,
    DefaultToolRuntime, FinishReason, FunctionCallMode, FunctionTool, GigaChatAuth,
    GigaChatHttpTransport, GigaChatModel, GigaChatModelBuilder, GigaChatOptions,
    GigaChatTransport, Media, Message, MetadataMap, ProviderError, Role, SessionId, TokenUsage,
    Tool, ToolCall, ToolDefinition, ToolError, ToolRegistry, ToolRuntime,
};
