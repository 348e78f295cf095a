//! Structured output through a virtual function.
//!
//! The completion API cannot promise that free-text answers match a caller
//! schema. Instead, a reserved function whose parameter schema *is* the
//! target schema is appended to the request; the model is instructed to call
//! it last, and its invocation arguments are decoded as the final answer.
//!
//! ```rust
//! use gtooling::structured_output_tool;
//!
//! let tool = structured_output_tool(r#"{"type":"object"}"#);
//! assert_eq!(tool.name, gtooling::STRUCTURED_OUTPUT_TOOL_NAME);
//! ```

use gprovider::{
    CompletionRequest, FunctionSpec, ProviderError, ResponseMessage, ToolDefinition,
};

/// Reserved virtual function name. Not overridable by caller-registered
/// tools.
pub const STRUCTURED_OUTPUT_TOOL_NAME: &str = "_structured_output_function";

const STRUCTURED_OUTPUT_DESCRIPTION: &str = "Produces the structured final answer \
for the conversation. First call ALL functions needed to gather data, then call \
this function with the answer data. This function must be called LAST.";

pub fn structured_output_tool(output_schema: &str) -> ToolDefinition {
    ToolDefinition::new(
        STRUCTURED_OUTPUT_TOOL_NAME,
        STRUCTURED_OUTPUT_DESCRIPTION,
        output_schema,
    )
}

/// Appends the virtual function to the request when a schema is present.
///
/// A `None` or blank schema is a no-op, not an error: callers whose target
/// shape needs no generated schema simply keep plain-text output. The
/// function lands after all caller-registered functions.
pub fn attach_structured_output(
    request: &mut CompletionRequest,
    output_schema: Option<&str>,
) -> Result<(), ProviderError> {
    let Some(schema) = output_schema else {
        return Ok(());
    };

    if schema.trim().is_empty() {
        tracing::debug!(
            event = "structured_output_skipped",
            "blank output schema, structured output not attached"
        );
        return Ok(());
    }

    let spec = FunctionSpec::try_from(structured_output_tool(schema))?;
    request.functions.get_or_insert_with(Vec::new).push(spec);

    tracing::debug!(
        event = "structured_output_attached",
        "structured output function added, model decides execution order"
    );
    Ok(())
}

/// True iff the message carries an invocation of the reserved function.
pub fn is_structured_output_call(message: &ResponseMessage) -> bool {
    message
        .function_call
        .as_ref()
        .and_then(|call| call.name.as_deref())
        .is_some_and(|name| name == STRUCTURED_OUTPUT_TOOL_NAME)
}

/// Decodes the invocation arguments as the final structured answer.
///
/// Absent arguments degrade to the empty-object literal rather than failing
/// the call.
pub fn extract_structured_content(message: &ResponseMessage) -> String {
    extract_structured_arguments(
        message
            .function_call
            .as_ref()
            .and_then(|call| call.arguments.as_deref()),
    )
}

pub fn extract_structured_arguments(arguments: Option<&str>) -> String {
    match arguments {
        Some(content) if !content.is_empty() => content.to_string(),
        _ => {
            tracing::warn!(
                event = "structured_output_empty_arguments",
                "structured output function returned no arguments, using empty object"
            );
            "{}".to_string()
        }
    }
}
