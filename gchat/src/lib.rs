//! Conversational orchestration over the GigaChat completion API.
//!
//! The completion API is a single stateless call; this crate builds the
//! multi-step behaviors on top of it: the synchronous tool-call loop, the
//! streaming assembler, attachment resolution, and schema-constrained output
//! through the structured-output virtual function.

mod error;
mod mapper;
mod media;
mod model;
mod options;
mod types;

pub mod prelude {
    pub use crate::{
        ChatDelta, ChatError, ChatErrorKind, ChatRequest, ChatResponse, ChatStream,
        FunctionCallMode, GigaChatModel, GigaChatModelBuilder, GigaChatOptions,
    };
    pub use gcommon::{MetadataMap, SessionId, TraceId};
    pub use gprovider::{
        FinishReason, GigaChatAuth, GigaChatHttpTransport, GigaChatTransport, Media, Message,
        Role, TokenUsage, ToolCall, ToolDefinition,
    };
    pub use gtooling::{
        DefaultToolRuntime, FunctionTool, Tool, ToolError, ToolErrorKind, ToolExecutionContext,
        ToolExecutionResult, ToolRegistry, ToolRuntime,
    };
}

pub use error::{ChatError, ChatErrorKind};
pub use mapper::to_wire_messages;
pub use model::{DEFAULT_MODEL, GigaChatModel, GigaChatModelBuilder};
pub use options::{
    FunctionCallMode, GigaChatOptions, resolve_function_call, validate_single_system,
};
pub use types::{ChatDelta, ChatRequest, ChatResponse, ChatStream};
