//! Per-call options, default/override merging, and request validation.

use gcommon::{MetadataMap, SessionId};
use gprovider::{FunctionCallDirective, FunctionCallParam, Message, Role, X_SESSION_ID_HEADER};

use crate::ChatError;

/// How the request directs the model's function calling.
///
/// `Auto` lets the model decide, `None` forbids calls, `CustomFunction`
/// pins one specific function through [`FunctionCallParam`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCallMode {
    Auto,
    None,
    CustomFunction,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GigaChatOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
    pub repetition_penalty: Option<f32>,
    pub update_interval: Option<f32>,
    pub function_call_mode: Option<FunctionCallMode>,
    pub function_call_param: Option<FunctionCallParam>,
    pub output_schema: Option<String>,
    pub session_id: Option<SessionId>,
    pub http_headers: MetadataMap,
}

impl GigaChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_repetition_penalty(mut self, repetition_penalty: f32) -> Self {
        self.repetition_penalty = Some(repetition_penalty);
        self
    }

    /// Seconds between streamed fragments; only meaningful on the streaming
    /// call.
    pub fn with_update_interval(mut self, update_interval: f32) -> Self {
        self.update_interval = Some(update_interval);
        self
    }

    pub fn with_function_call_mode(mut self, mode: FunctionCallMode) -> Self {
        self.function_call_mode = Some(mode);
        self
    }

    pub fn with_function_call_param(mut self, param: FunctionCallParam) -> Self {
        self.function_call_param = Some(param);
        self
    }

    pub fn with_output_schema(mut self, output_schema: impl Into<String>) -> Self {
        self.output_schema = Some(output_schema.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<SessionId>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_http_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.http_headers.insert(name.into(), value.into());
        self
    }

    /// Effective options for one call: every field present in the override
    /// replaces the default, absent fields fall back. Headers are unioned
    /// with override entries winning.
    pub fn merge(&self, overrides: Option<&GigaChatOptions>) -> GigaChatOptions {
        let Some(overrides) = overrides else {
            return self.clone();
        };

        let mut http_headers = self.http_headers.clone();
        http_headers.extend(
            overrides
                .http_headers
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );

        GigaChatOptions {
            model: overrides.model.clone().or_else(|| self.model.clone()),
            temperature: overrides.temperature.or(self.temperature),
            top_p: overrides.top_p.or(self.top_p),
            max_tokens: overrides.max_tokens.or(self.max_tokens),
            repetition_penalty: overrides.repetition_penalty.or(self.repetition_penalty),
            update_interval: overrides.update_interval.or(self.update_interval),
            function_call_mode: overrides.function_call_mode.or(self.function_call_mode),
            function_call_param: overrides
                .function_call_param
                .clone()
                .or_else(|| self.function_call_param.clone()),
            output_schema: overrides
                .output_schema
                .clone()
                .or_else(|| self.output_schema.clone()),
            session_id: overrides
                .session_id
                .clone()
                .or_else(|| self.session_id.clone()),
            http_headers,
        }
    }

    pub fn structured_output_enabled(&self) -> bool {
        self.output_schema
            .as_deref()
            .is_some_and(|schema| !schema.trim().is_empty())
    }

    /// Headers forwarded to the transport untouched, with the session
    /// correlation header folded in when a session id is set.
    pub fn effective_headers(&self) -> MetadataMap {
        let mut headers = self.http_headers.clone();
        if let Some(session_id) = &self.session_id {
            headers.insert(X_SESSION_ID_HEADER.to_string(), session_id.to_string());
        }
        headers
    }
}

/// Resolves the wire function-call directive from the explicit mode, falling
/// back to `"auto"` whenever any functions ride the request.
pub fn resolve_function_call(
    options: &GigaChatOptions,
    has_functions: bool,
) -> Result<Option<FunctionCallDirective>, ChatError> {
    match options.function_call_mode {
        Some(FunctionCallMode::CustomFunction) => {
            let param = options.function_call_param.clone().ok_or_else(|| {
                ChatError::invalid_request(
                    "custom function call mode requires a function call param",
                )
            })?;
            Ok(Some(FunctionCallDirective::Custom(param)))
        }
        Some(FunctionCallMode::Auto) => Ok(Some(FunctionCallDirective::Auto)),
        Some(FunctionCallMode::None) => Ok(Some(FunctionCallDirective::None)),
        None if has_functions => Ok(Some(FunctionCallDirective::Auto)),
        None => Ok(None),
    }
}

/// The completion API accepts at most one system prompt per conversation.
pub fn validate_single_system(messages: &[Message]) -> Result<(), ChatError> {
    let system_count = messages
        .iter()
        .filter(|message| message.role() == Role::System)
        .count();

    if system_count > 1 {
        return Err(ChatError::state(
            "system prompt message must be the only one of its kind",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use gprovider::FunctionCallDirective;
    use serde_json::json;

    use super::*;

    #[test]
    fn merge_prefers_override_fields_and_falls_back_to_defaults() {
        let defaults = GigaChatOptions::new()
            .with_model("GigaChat")
            .with_temperature(0.5)
            .with_max_tokens(256)
            .with_http_header("X-Client-ID", "default-client");

        let overrides = GigaChatOptions::new()
            .with_temperature(0.8)
            .with_http_header("X-Client-ID", "per-call-client");

        let merged = defaults.merge(Some(&overrides));
        assert_eq!(merged.model.as_deref(), Some("GigaChat"));
        assert_eq!(merged.temperature, Some(0.8));
        assert_eq!(merged.max_tokens, Some(256));
        assert_eq!(
            merged.http_headers.get("X-Client-ID").map(String::as_str),
            Some("per-call-client")
        );
    }

    #[test]
    fn merge_without_override_returns_defaults() {
        let defaults = GigaChatOptions::new().with_temperature(0.7);
        let merged = defaults.merge(None);
        assert_eq!(merged, defaults);
    }

    #[test]
    fn directive_is_absent_without_mode_or_functions() {
        let options = GigaChatOptions::new();
        let directive = resolve_function_call(&options, false).expect("resolution should work");
        assert!(directive.is_none());
    }

    #[test]
    fn directive_defaults_to_auto_when_functions_are_present() {
        let options = GigaChatOptions::new();
        let directive = resolve_function_call(&options, true).expect("resolution should work");
        assert_eq!(directive, Some(FunctionCallDirective::Auto));
    }

    #[test]
    fn explicit_modes_resolve_to_their_directives() {
        let auto = GigaChatOptions::new().with_function_call_mode(FunctionCallMode::Auto);
        assert_eq!(
            resolve_function_call(&auto, false).expect("resolution should work"),
            Some(FunctionCallDirective::Auto)
        );

        let none = GigaChatOptions::new().with_function_call_mode(FunctionCallMode::None);
        assert_eq!(
            resolve_function_call(&none, true).expect("resolution should work"),
            Some(FunctionCallDirective::None)
        );

        let param = FunctionCallParam::new("lookup").with_partial_arguments(json!({"id": 7}));
        let custom = GigaChatOptions::new()
            .with_function_call_mode(FunctionCallMode::CustomFunction)
            .with_function_call_param(param.clone());
        assert_eq!(
            resolve_function_call(&custom, true).expect("resolution should work"),
            Some(FunctionCallDirective::Custom(param))
        );
    }

    #[test]
    fn custom_mode_without_param_is_invalid() {
        let options =
            GigaChatOptions::new().with_function_call_mode(FunctionCallMode::CustomFunction);
        let error = resolve_function_call(&options, true).expect_err("resolution should fail");
        assert_eq!(error.kind, crate::ChatErrorKind::InvalidRequest);
    }

    #[test]
    fn at_most_one_system_message_is_enforced() {
        let valid = vec![Message::system("a"), Message::user("b")];
        assert!(validate_single_system(&valid).is_ok());

        let invalid = vec![
            Message::user("q1"),
            Message::assistant("a1"),
            Message::system("expert one"),
            Message::user("q2"),
            Message::system("expert two"),
        ];
        let error = validate_single_system(&invalid).expect_err("validation should fail");
        assert_eq!(error.kind, crate::ChatErrorKind::State);
        assert!(error.message.contains("only one"));
    }

    #[test]
    fn effective_headers_fold_in_session_id() {
        let options = GigaChatOptions::new()
            .with_session_id("session-7")
            .with_http_header("X-Request-ID", "req-1");

        let headers = options.effective_headers();
        assert_eq!(
            headers.get("X-Session-ID").map(String::as_str),
            Some("session-7")
        );
        assert_eq!(headers.get("X-Request-ID").map(String::as_str), Some("req-1"));
    }

    #[test]
    fn structured_output_requires_non_blank_schema() {
        assert!(!GigaChatOptions::new().structured_output_enabled());
        assert!(
            !GigaChatOptions::new()
                .with_output_schema("   ")
                .structured_output_enabled()
        );
        assert!(
            GigaChatOptions::new()
                .with_output_schema("{\"type\":\"object\"}")
                .structured_output_enabled()
        );
    }
}
