//! Message and request construction shorthands.

use gchat::ChatRequest;
use gprovider::{Media, Message, ToolCall};

pub fn system_message(content: impl Into<String>) -> Message {
    Message::system(content)
}

pub fn user_message(content: impl Into<String>) -> Message {
    Message::user(content)
}

pub fn user_message_with_media(content: impl Into<String>, media: Vec<Media>) -> Message {
    Message::user_with_media(content, media)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::assistant(content)
}

pub fn tool_call_message(tool_call: ToolCall) -> Message {
    Message::assistant_tool_call(tool_call)
}

pub fn tool_message(
    tool_call_id: impl Into<String>,
    tool_name: impl Into<String>,
    content: impl Into<String>,
) -> Message {
    Message::tool_result(tool_call_id, tool_name, content)
}

pub fn chat_request(messages: Vec<Message>) -> ChatRequest {
    ChatRequest::new(messages)
}
