//! Tool runtime trait and default registry-backed executor.

use std::sync::Arc;

use gprovider::ToolCall;

use crate::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolFuture, ToolRegistry};

pub trait ToolRuntime: Send + Sync {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>>;
}

#[derive(Clone, Default)]
pub struct DefaultToolRuntime {
    registry: Arc<ToolRegistry>,
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>> {
        Box::pin(async move {
            let tool = self.registry.get(&tool_call.name).ok_or_else(|| {
                ToolError::not_found(format!("tool '{}' is not registered", tool_call.name))
                    .with_tool_name(tool_call.name.clone())
                    .with_tool_call_id(tool_call.id.clone())
            })?;

            let output = tool
                .invoke(&tool_call.arguments, &context)
                .await
                .map_err(|err| {
                    err.with_tool_name(tool_call.name.clone())
                        .with_tool_call_id(tool_call.id.clone())
                })?;

            Ok(ToolExecutionResult::from_call(&tool_call, output))
        })
    }
}
