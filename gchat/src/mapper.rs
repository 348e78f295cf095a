//! Conversion from the conversation model to wire messages.

use std::collections::HashSet;

use gprovider::{Media, Message, Role, WireFunctionCall, WireMessage, WireRole};

use crate::ChatError;

/// Maps the typed sequence onto wire messages, preserving input order.
///
/// With `system_first` enabled, a system message found anywhere in the
/// sequence is moved to index 0; the relative order of the remaining
/// messages is untouched. Disabled, the order passes through unchanged.
pub fn to_wire_messages(
    messages: &[Message],
    system_first: bool,
) -> Result<Vec<WireMessage>, ChatError> {
    validate_correlations(messages)?;

    let ordered: Vec<&Message> = if system_first {
        normalize_system_first(messages)
    } else {
        messages.iter().collect()
    };

    ordered.into_iter().map(to_wire_message).collect()
}

fn normalize_system_first(messages: &[Message]) -> Vec<&Message> {
    match messages
        .iter()
        .position(|message| message.role() == Role::System)
    {
        Some(position) if position > 0 => {
            let mut ordered = Vec::with_capacity(messages.len());
            ordered.push(&messages[position]);
            ordered.extend(
                messages
                    .iter()
                    .enumerate()
                    .filter(|(index, _)| *index != position)
                    .map(|(_, message)| message),
            );
            ordered
        }
        _ => messages.iter().collect(),
    }
}

/// A tool result must answer an invocation recorded earlier in the sequence;
/// an unmatched correlation id is a fatal mismatch, not something to drop.
fn validate_correlations(messages: &[Message]) -> Result<(), ChatError> {
    let mut pending: HashSet<&str> = HashSet::new();

    for message in messages {
        match message {
            Message::Assistant {
                tool_call: Some(call),
                ..
            } => {
                pending.insert(call.id.as_str());
            }
            Message::Tool {
                tool_call_id,
                tool_name,
                ..
            } => {
                if !pending.contains(tool_call_id.as_str()) {
                    return Err(ChatError::state(format!(
                        "tool result for '{tool_name}' does not match any pending \
                         invocation (correlation id '{tool_call_id}')"
                    )));
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn to_wire_message(message: &Message) -> Result<WireMessage, ChatError> {
    match message {
        Message::System { content } => Ok(WireMessage::new(WireRole::System, content.clone())),
        Message::User { content, media } => {
            let mut wire = WireMessage::new(WireRole::User, content.clone());
            if !media.is_empty() {
                wire.attachments = Some(attachment_ids(media)?);
            }
            Ok(wire)
        }
        Message::Assistant {
            tool_call: Some(call),
            ..
        } => {
            let arguments = serde_json::from_str(&call.arguments).map_err(|_| {
                ChatError::invalid_request(format!(
                    "tool call arguments for '{}' must be valid JSON",
                    call.name
                ))
            })?;

            let mut wire = WireMessage::new(WireRole::Assistant, "");
            wire.functions_state_id = Some(call.id.clone());
            wire.function_call = Some(WireFunctionCall {
                name: call.name.clone(),
                arguments,
            });
            Ok(wire)
        }
        Message::Assistant {
            content,
            tool_call: None,
        } => Ok(WireMessage::new(WireRole::Assistant, content.clone())),
        Message::Tool {
            content, tool_name, ..
        } => {
            let mut wire = WireMessage::new(WireRole::Function, content.clone());
            wire.name = Some(tool_name.clone());
            Ok(wire)
        }
    }
}

fn attachment_ids(media: &[Media]) -> Result<Vec<String>, ChatError> {
    media
        .iter()
        .map(|item| {
            item.id.clone().ok_or_else(|| {
                ChatError::state("user media is missing a remote identifier; uploads must \
                     complete before request construction")
            })
        })
        .collect()
}
