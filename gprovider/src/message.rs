//! Conversation message model.
//!
//! Messages are a sum type with the role as discriminant. A message is
//! immutable once constructed; multi-turn flows build new sequences instead
//! of mutating prior entries.
//!
//! ```rust
//! use gprovider::{Message, Role, ToolCall};
//!
//! let call = ToolCall::new("state-1", "lookup", "{\"id\":1}");
//! let invocation = Message::assistant_tool_call(call);
//! let result = Message::tool_result("state-1", "lookup", "{\"ok\":true}");
//!
//! assert_eq!(invocation.role(), Role::Assistant);
//! assert_eq!(result.role(), Role::Tool);
//! ```

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A binary media reference attached to a user message.
///
/// `id` is the remote file identifier; media without one must be uploaded
/// before a completion request can reference it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub id: Option<String>,
    pub data: Vec<u8>,
    pub mime_type: String,
    pub file_name: Option<String>,
}

impl Media {
    pub fn new(data: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            id: None,
            data: data.into(),
            mime_type: mime_type.into(),
            file_name: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn is_uploaded(&self) -> bool {
        self.id.is_some()
    }
}

/// A tool invocation requested by the model.
///
/// `id` is the correlation token (`functions_state_id` on the wire) that
/// links the invocation to its result message; `arguments` is the serialized
/// JSON argument payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
        media: Vec<Media>,
    },
    Assistant {
        content: String,
        tool_call: Option<ToolCall>,
    },
    Tool {
        content: String,
        tool_call_id: String,
        tool_name: String,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
            media: Vec::new(),
        }
    }

    pub fn user_with_media(content: impl Into<String>, media: Vec<Media>) -> Self {
        Self::User {
            content: content.into(),
            media,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_call: None,
        }
    }

    /// The assistant turn recording a pending tool invocation. Its content
    /// is empty on the wire; the invocation rides the tool-call field.
    pub fn assistant_tool_call(tool_call: ToolCall) -> Self {
        Self::Assistant {
            content: String::new(),
            tool_call: Some(tool_call),
        }
    }

    pub fn tool_result(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::Tool {
            content: content.into(),
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::System { .. } => Role::System,
            Self::User { .. } => Role::User,
            Self::Assistant { .. } => Role::Assistant,
            Self::Tool { .. } => Role::Tool,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::System { content }
            | Self::User { content, .. }
            | Self::Assistant { content, .. }
            | Self::Tool { content, .. } => content,
        }
    }

    pub fn tool_call(&self) -> Option<&ToolCall> {
        match self {
            Self::Assistant { tool_call, .. } => tool_call.as_ref(),
            _ => None,
        }
    }

    pub fn media(&self) -> &[Media] {
        match self {
            Self::User { media, .. } => media,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_role_and_content() {
        let system = Message::system("be concise");
        assert_eq!(system.role(), Role::System);
        assert_eq!(system.content(), "be concise");

        let user = Message::user("hello");
        assert_eq!(user.role(), Role::User);
        assert!(user.media().is_empty());

        let assistant = Message::assistant("hi there");
        assert_eq!(assistant.role(), Role::Assistant);
        assert!(assistant.tool_call().is_none());
    }

    #[test]
    fn assistant_tool_call_has_empty_content_and_carries_invocation() {
        let message = Message::assistant_tool_call(ToolCall::new("s1", "lookup", "{}"));
        assert_eq!(message.content(), "");

        let call = message.tool_call().expect("tool call should be present");
        assert_eq!(call.id, "s1");
        assert_eq!(call.name, "lookup");
    }

    #[test]
    fn tool_result_carries_correlation_fields() {
        let message = Message::tool_result("s1", "lookup", "{\"ok\":true}");
        assert_eq!(message.role(), Role::Tool);

        match &message {
            Message::Tool {
                tool_call_id,
                tool_name,
                ..
            } => {
                assert_eq!(tool_call_id, "s1");
                assert_eq!(tool_name, "lookup");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn media_reports_upload_state() {
        let pending = Media::new(b"bytes".to_vec(), "image/png");
        assert!(!pending.is_uploaded());

        let uploaded = pending.with_id("file-1");
        assert!(uploaded.is_uploaded());
    }
}
