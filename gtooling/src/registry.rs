//! Tool registry for lookup by tool definition name.
//!
//! Tool names are unique within one registry: registering a second tool
//! under an existing name replaces the first.

use std::future::Future;
use std::sync::Arc;

use gcommon::Registry;
use gprovider::ToolDefinition;

use crate::{FunctionTool, Tool, ToolError, ToolExecutionContext};

#[derive(Default)]
pub struct ToolRegistry {
    tools: Registry<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        let name = tool.definition().name;
        if !self.tools.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn register_fn<F, Fut>(&mut self, definition: ToolDefinition, handler: F)
    where
        F: Fn(String, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
    {
        self.register(FunctionTool::new(definition, handler));
    }

    pub fn register_sync_fn<F>(&mut self, definition: ToolDefinition, handler: F)
    where
        F: Fn(String, ToolExecutionContext) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        self.register_fn(definition, move |args_json, context| {
            let output = handler(args_json, context);
            async move { output }
        });
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        self.order.retain(|registered| registered != name);
        self.tools.remove(name)
    }

    /// Definitions in registration order, the order they are sent to the
    /// completion API.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.definition())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_definition(name: &str) -> ToolDefinition {
        ToolDefinition::new(name, "Echoes arguments", "{\"type\":\"object\"}")
    }

    #[test]
    fn registry_tracks_registered_tools() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register_sync_fn(echo_definition("echo"), |args, _ctx| Ok(args));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("echo"));

        let removed = registry.remove("echo");
        assert!(removed.is_some());
        assert!(registry.is_empty());
        assert!(registry.definitions().is_empty());
    }

    #[test]
    fn definitions_preserve_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(echo_definition("beta"), |args, _ctx| Ok(args));
        registry.register_sync_fn(echo_definition("alpha"), |args, _ctx| Ok(args));

        let names: Vec<String> = registry
            .definitions()
            .into_iter()
            .map(|definition| definition.name)
            .collect();
        assert_eq!(names, vec!["beta".to_string(), "alpha".to_string()]);
    }

    #[test]
    fn re_registering_a_name_replaces_without_duplicating_order() {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(echo_definition("echo"), |args, _ctx| Ok(args));
        registry.register_sync_fn(echo_definition("echo"), |_args, _ctx| Ok("v2".to_string()));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.definitions().len(), 1);
    }
}
