//! GigaChat data model, wire payloads, and transport.
//!
//! The crate is split along the request path: a neutral conversation model
//! ([`Message`], [`ToolDefinition`], [`FinishReason`]), the serde payloads of
//! the chat-completions and file APIs ([`CompletionRequest`],
//! [`CompletionResponse`], [`FileUpload`]), and the [`GigaChatTransport`]
//! trait with its reqwest implementation. Orchestration lives upstream in
//! `gchat`; nothing here loops or executes tools.

mod error;
mod message;
mod model;
mod transport;
mod wire;

pub mod prelude {
    pub use crate::{
        CompletionChunkStream, CompletionRequest, CompletionResponse, FinishReason,
        GigaChatAuth, GigaChatHttpTransport, GigaChatTransport, Media, Message, ProviderError,
        ProviderErrorKind, ProviderFuture, Role, TokenUsage, ToolCall, ToolDefinition,
        ToolResult,
    };
}

pub use error::{ProviderError, ProviderErrorKind};
pub use message::{Media, Message, Role, ToolCall, ToolResult};
pub use model::{FewShotExample, FinishReason, TokenUsage, ToolDefinition};
pub use transport::{
    CompletionChunkStream, GigaChatAuth, GigaChatHttpTransport, GigaChatTransport,
    ProviderFuture, VecChunkStream, X_SESSION_ID_HEADER,
};
pub use wire::{
    Choice, CompletionRequest, CompletionResponse, FileUpload, FunctionCallDirective,
    FunctionCallParam, FunctionSpec, ResponseFunctionCall, ResponseMessage, UploadedFile,
    WireFewShotExample, WireFinishReason, WireFunctionCall, WireMessage, WireRole, WireUsage,
};
