//! Chat-layer errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidRequest,
    State,
    Provider,
    Tooling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    /// A conversation sequence that violates a protocol invariant. Not
    /// recoverable by retrying the same request.
    pub fn state(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::State, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Provider, message)
    }

    pub fn tooling(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Tooling, message)
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

impl From<gprovider::ProviderError> for ChatError {
    fn from(value: gprovider::ProviderError) -> Self {
        ChatError::provider(value.to_string())
    }
}

impl From<gtooling::ToolError> for ChatError {
    fn from(value: gtooling::ToolError) -> Self {
        ChatError::tooling(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_and_tool_errors_convert_with_kind() {
        let provider: ChatError = gprovider::ProviderError::timeout("slow").into();
        assert_eq!(provider.kind, ChatErrorKind::Provider);
        assert!(provider.message.contains("slow"));

        let tooling: ChatError = gtooling::ToolError::execution("boom").into();
        assert_eq!(tooling.kind, ChatErrorKind::Tooling);
        assert!(tooling.message.contains("boom"));
    }
}
