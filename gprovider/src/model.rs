//! Tool descriptors, finish reasons, and usage accounting.

/// A registered callable the model may ask to have executed locally.
///
/// Schemas travel as JSON text; they are parsed at the wire boundary.
/// `response_schema` and few-shot examples are optional prompt-engineering
/// hints the completion API accepts alongside the parameter schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters_schema: String,
    pub response_schema: Option<String>,
    pub few_shot_examples: Vec<FewShotExample>,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters_schema: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters_schema: parameters_schema.into(),
            response_schema: None,
            few_shot_examples: Vec::new(),
        }
    }

    pub fn with_response_schema(mut self, response_schema: impl Into<String>) -> Self {
        self.response_schema = Some(response_schema.into());
        self
    }

    pub fn with_few_shot_example(mut self, example: FewShotExample) -> Self {
        self.few_shot_examples.push(example);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FewShotExample {
    pub request: String,
    pub params_schema: String,
}

impl FewShotExample {
    pub fn new(request: impl Into<String>, params_schema: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            params_schema: params_schema.into(),
        }
    }
}

/// Why a turn ended. A turn still in progress carries no finish reason
/// (`Option::None` at the call sites).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ToolCall,
    ContentFilter,
    Error,
}

impl FinishReason {
    pub fn is_tool_call(self) -> bool {
        matches!(self, Self::ToolCall)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32, total_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }

    /// Accumulates counters across the round trips of one tool-call loop.
    pub fn merge(&mut self, other: TokenUsage) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(other.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }
}
