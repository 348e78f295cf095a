//! Chat request, response envelope, and streaming event types.

use std::pin::Pin;

use futures_core::Stream;
use gprovider::{FinishReason, Message, Role, TokenUsage};

use crate::{ChatError, GigaChatOptions};

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub options: Option<GigaChatOptions>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            options: None,
        }
    }

    pub fn with_options(mut self, options: GigaChatOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// The outward envelope of one completed call.
///
/// `tool_exchange` is the conversation grown during the tool-call loop (the
/// invocation-record and tool-result message pairs, in append order);
/// `uploaded_media_ids` lists every attachment id the request referenced.
/// Neither touches the caller's own message history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResponse {
    pub text: String,
    pub finish_reason: Option<FinishReason>,
    pub usage: TokenUsage,
    pub model: Option<String>,
    pub tool_exchange: Vec<Message>,
    pub uploaded_media_ids: Vec<String>,
    pub tool_round_limit_reached: bool,
}

impl ChatResponse {
    pub(crate) fn empty(
        usage: TokenUsage,
        tool_exchange: Vec<Message>,
        uploaded_media_ids: Vec<String>,
        model: Option<String>,
    ) -> Self {
        Self {
            text: String::new(),
            finish_reason: None,
            usage,
            model,
            tool_exchange,
            uploaded_media_ids,
            tool_round_limit_reached: false,
        }
    }
}

/// One forwarded fragment of a streaming turn. Fragments from different
/// physical upstream calls are never merged into one delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatDelta {
    pub role: Option<Role>,
    pub content: String,
    pub finish_reason: Option<FinishReason>,
    pub usage: Option<TokenUsage>,
}

pub type ChatStream<'a> = Pin<Box<dyn Stream<Item = Result<ChatDelta, ChatError>> + Send + 'a>>;
