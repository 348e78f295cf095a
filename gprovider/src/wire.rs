//! GigaChat chat-completions wire payloads and conversions.
//!
//! Request payloads serialize the neutral model into the completion API's
//! shape; response payloads tolerate absent fields because streaming deltas
//! carry only the fragments that changed.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::{
    FewShotExample, FinishReason, ProviderError, Role, TokenUsage, ToolDefinition,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCallDirective>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<FunctionSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_interval: Option<f32>,
    pub stream: bool,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<WireMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            function_call: None,
            functions: None,
            temperature: None,
            top_p: None,
            max_tokens: None,
            repetition_penalty: None,
            update_interval: None,
            stream: false,
        }
    }

    pub fn function_names(&self) -> Vec<&str> {
        self.functions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|function| function.name.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: WireRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions_state_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<WireFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
}

impl WireMessage {
    pub fn new(role: WireRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            functions_state_id: None,
            function_call: None,
            name: None,
            attachments: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    System,
    User,
    Assistant,
    Function,
}

impl From<Role> for WireRole {
    fn from(value: Role) -> Self {
        match value {
            Role::System => Self::System,
            Role::User => Self::User,
            Role::Assistant => Self::Assistant,
            Role::Tool => Self::Function,
        }
    }
}

impl From<WireRole> for Role {
    fn from(value: WireRole) -> Self {
        match value {
            WireRole::System => Self::System,
            WireRole::User => Self::User,
            WireRole::Assistant => Self::Assistant,
            WireRole::Function => Self::Tool,
        }
    }
}

/// A pending invocation recorded on an assistant request message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFunctionCall {
    pub name: String,
    pub arguments: Value,
}

/// The request's function-call directive: the `"auto"`/`"none"` literals, or
/// an object pinning one function with optional pre-filled arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionCallDirective {
    Auto,
    None,
    Custom(FunctionCallParam),
}

impl Serialize for FunctionCallDirective {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Auto => serializer.serialize_str("auto"),
            Self::None => serializer.serialize_str("none"),
            Self::Custom(param) => param.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallParam {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_arguments: Option<Value>,
}

impl FunctionCallParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partial_arguments: None,
        }
    }

    pub fn with_partial_arguments(mut self, partial_arguments: Value) -> Self {
        self.partial_arguments = Some(partial_arguments);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_parameters: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub few_shot_examples: Option<Vec<WireFewShotExample>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireFewShotExample {
    pub request: String,
    pub params: Value,
}

impl TryFrom<ToolDefinition> for FunctionSpec {
    type Error = ProviderError;

    fn try_from(value: ToolDefinition) -> Result<Self, Self::Error> {
        let parameters = parse_schema(&value.parameters_schema, &value.name, "parameter")?;
        let return_parameters = value
            .response_schema
            .as_deref()
            .map(|schema| parse_schema(schema, &value.name, "response"))
            .transpose()?;

        let few_shot_examples = if value.few_shot_examples.is_empty() {
            None
        } else {
            Some(
                value
                    .few_shot_examples
                    .iter()
                    .map(|example| WireFewShotExample::try_from_example(example, &value.name))
                    .collect::<Result<Vec<_>, _>>()?,
            )
        };

        Ok(Self {
            name: value.name,
            description: value.description,
            parameters,
            return_parameters,
            few_shot_examples,
        })
    }
}

impl WireFewShotExample {
    fn try_from_example(
        example: &FewShotExample,
        tool_name: &str,
    ) -> Result<Self, ProviderError> {
        let params = parse_schema(&example.params_schema, tool_name, "few-shot params")?;
        Ok(Self {
            request: example.request.clone(),
            params,
        })
    }
}

fn parse_schema(schema: &str, tool_name: &str, label: &str) -> Result<Value, ProviderError> {
    serde_json::from_str::<Value>(schema).map_err(|_| {
        ProviderError::invalid_request(format!(
            "tool '{tool_name}' {label} schema must be valid JSON"
        ))
    })
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub object: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
    #[serde(default)]
    pub delta: Option<ResponseMessage>,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub finish_reason: Option<WireFinishReason>,
}

impl Choice {
    /// The turn payload, whichever of the terminal or incremental fields the
    /// service populated.
    pub fn turn(&self) -> Option<&ResponseMessage> {
        self.message.as_ref().or(self.delta.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<WireRole>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub function_call: Option<ResponseFunctionCall>,
    #[serde(default)]
    pub functions_state_id: Option<String>,
}

/// A (possibly partial) invocation on a response message. Argument payloads
/// are kept as raw JSON text so streaming fragments can be concatenated in
/// arrival order before parsing.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ResponseFunctionCall {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "raw_json_text")]
    pub arguments: Option<String>,
}

fn raw_json_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|value| match value {
        Value::String(text) => text,
        other => other.to_string(),
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFinishReason {
    Stop,
    Length,
    FunctionCall,
    Blacklist,
    Error,
    #[serde(other)]
    Unknown,
}

impl From<WireFinishReason> for FinishReason {
    fn from(value: WireFinishReason) -> Self {
        match value {
            WireFinishReason::Stop => Self::Stop,
            WireFinishReason::Length => Self::Length,
            WireFinishReason::FunctionCall => Self::ToolCall,
            WireFinishReason::Blacklist => Self::ContentFilter,
            WireFinishReason::Error | WireFinishReason::Unknown => Self::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct WireUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl From<WireUsage> for TokenUsage {
    fn from(value: WireUsage) -> Self {
        Self {
            prompt_tokens: value.prompt_tokens,
            completion_tokens: value.completion_tokens,
            total_tokens: value.total_tokens,
        }
    }
}

/// One media payload bound for the file-upload call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
    pub purpose: String,
}

impl FileUpload {
    pub fn new(
        data: impl Into<Vec<u8>>,
        mime_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
            file_name: file_name.into(),
            purpose: "general".to_string(),
        }
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = purpose.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_directive_literals_and_custom_object() {
        let mut request = CompletionRequest::new(
            "GigaChat",
            vec![WireMessage::new(WireRole::User, "hi")],
        );
        request.function_call = Some(FunctionCallDirective::Auto);

        let rendered = serde_json::to_value(&request).expect("serialize");
        assert_eq!(rendered["function_call"], json!("auto"));
        assert_eq!(rendered["messages"][0]["role"], json!("user"));
        assert!(rendered.get("functions").is_none());
        assert!(rendered.get("temperature").is_none());

        request.function_call = Some(FunctionCallDirective::Custom(
            FunctionCallParam::new("lookup").with_partial_arguments(json!({"id": 7})),
        ));
        let rendered = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            rendered["function_call"],
            json!({"name": "lookup", "partial_arguments": {"id": 7}})
        );
    }

    #[test]
    fn assistant_invocation_record_serializes_state_and_call() {
        let mut message = WireMessage::new(WireRole::Assistant, "");
        message.functions_state_id = Some("state-1".to_string());
        message.function_call = Some(WireFunctionCall {
            name: "lookup".to_string(),
            arguments: json!({"id": 1}),
        });

        let rendered = serde_json::to_value(&message).expect("serialize");
        assert_eq!(rendered["role"], json!("assistant"));
        assert_eq!(rendered["content"], json!(""));
        assert_eq!(rendered["functions_state_id"], json!("state-1"));
        assert_eq!(rendered["function_call"]["name"], json!("lookup"));
    }

    #[test]
    fn function_spec_parses_schema_strings() {
        let definition = ToolDefinition::new("lookup", "Looks up", "{\"type\":\"object\"}")
            .with_response_schema("{\"type\":\"object\"}")
            .with_few_shot_example(FewShotExample::new("find 7", "{\"id\":7}"));

        let spec = FunctionSpec::try_from(definition).expect("conversion should succeed");
        assert_eq!(spec.parameters, json!({"type": "object"}));
        assert_eq!(spec.return_parameters, Some(json!({"type": "object"})));
        assert_eq!(spec.few_shot_examples.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn function_spec_rejects_invalid_schema_json() {
        let definition = ToolDefinition::new("lookup", "Looks up", "not json");
        let error = FunctionSpec::try_from(definition).expect_err("conversion should fail");
        assert!(error.message.contains("lookup"));
    }

    #[test]
    fn response_decodes_object_arguments_as_raw_text() {
        let body = r#"{
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "",
                    "functions_state_id": "state-9",
                    "function_call": {"name": "lookup", "arguments": {"id": 1}}
                },
                "index": 0,
                "finish_reason": "function_call"
            }],
            "model": "GigaChat",
            "usage": {"prompt_tokens": 7, "completion_tokens": 3, "total_tokens": 10}
        }"#;

        let response: CompletionResponse = serde_json::from_str(body).expect("deserialize");
        let choice = &response.choices[0];
        assert_eq!(choice.finish_reason, Some(WireFinishReason::FunctionCall));

        let message = choice.turn().expect("message should be present");
        let call = message.function_call.as_ref().expect("call present");
        assert_eq!(call.name.as_deref(), Some("lookup"));
        assert_eq!(call.arguments.as_deref(), Some("{\"id\":1}"));
        assert_eq!(message.functions_state_id.as_deref(), Some("state-9"));
    }

    #[test]
    fn response_tolerates_delta_only_fragments() {
        let body = r#"{"choices": [{"delta": {"content": "Hello "}, "index": 0}]}"#;
        let response: CompletionResponse = serde_json::from_str(body).expect("deserialize");

        let choice = &response.choices[0];
        assert!(choice.message.is_none());
        assert_eq!(
            choice.turn().and_then(|turn| turn.content.as_deref()),
            Some("Hello ")
        );
        assert!(choice.finish_reason.is_none());
    }

    #[test]
    fn finish_reasons_map_onto_neutral_enum() {
        let cases = [
            ("\"stop\"", FinishReason::Stop),
            ("\"length\"", FinishReason::Length),
            ("\"function_call\"", FinishReason::ToolCall),
            ("\"blacklist\"", FinishReason::ContentFilter),
            ("\"error\"", FinishReason::Error),
            ("\"something_new\"", FinishReason::Error),
        ];

        for (wire, expected) in cases {
            let parsed: WireFinishReason = serde_json::from_str(wire).expect("deserialize");
            assert_eq!(FinishReason::from(parsed), expected, "case {wire}");
        }
    }

    #[test]
    fn uploaded_file_decodes_minimal_payload() {
        let body = r#"{"id": "file-123", "purpose": "general"}"#;
        let uploaded: UploadedFile = serde_json::from_str(body).expect("deserialize");
        assert_eq!(uploaded.id, "file-123");
        assert_eq!(uploaded.purpose.as_deref(), Some("general"));
        assert!(uploaded.bytes.is_none());
    }
}
