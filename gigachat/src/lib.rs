//! Unified facade over the gigachat-rust workspace crates.
//!
//! This crate is designed to be the single dependency for most applications.
//! It re-exports the member crates and provides convenience utilities and
//! macros for common setup and request-building flows.

mod macros;

pub mod prelude;
pub mod runtime;
pub mod util;

pub use gchat;
pub use gcommon;
pub use gprovider;
pub use gtooling;

pub use gchat::{
    ChatDelta, ChatError, ChatErrorKind, ChatRequest, ChatResponse, ChatStream, DEFAULT_MODEL,
    FunctionCallMode, GigaChatModel, GigaChatModelBuilder, GigaChatOptions,
};
pub use gcommon::{BoxFuture, MetadataMap, SessionId, TraceId};
pub use gprovider::{
    CompletionChunkStream, CompletionRequest, CompletionResponse, FewShotExample, FileUpload,
    FinishReason, FunctionCallDirective, FunctionCallParam, GigaChatAuth, GigaChatHttpTransport,
    GigaChatTransport, Media, Message, ProviderError, ProviderErrorKind, ProviderFuture, Role,
    TokenUsage, ToolCall, ToolDefinition, ToolResult, UploadedFile, VecChunkStream,
    X_SESSION_ID_HEADER,
};
pub use gtooling::{
    DefaultToolRuntime, FunctionTool, STRUCTURED_OUTPUT_TOOL_NAME, Tool, ToolError,
    ToolErrorKind, ToolExecutionContext, ToolExecutionResult, ToolFuture, ToolRegistry,
    ToolRuntime, attach_structured_output, extract_structured_content, is_structured_output_call,
    parse_json_object, parse_json_value, required_string, structured_output_tool,
};

pub use runtime::{
    http_transport, http_transport_with_base_url, model, model_from_token, model_with,
    model_with_tools,
};
pub use util::{
    assistant_message, chat_request, system_message, tool_call_message, tool_message,
    user_message, user_message_with_media,
};
