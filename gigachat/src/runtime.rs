//! Wiring helpers for assembling a ready-to-use chat model.

use std::sync::Arc;

use gchat::{GigaChatModel, GigaChatOptions};
use gprovider::{GigaChatAuth, GigaChatHttpTransport, GigaChatTransport};
use gtooling::ToolRegistry;

/// HTTP transport against the default completion API endpoint.
pub fn http_transport(auth: GigaChatAuth) -> GigaChatHttpTransport {
    GigaChatHttpTransport::new(reqwest::Client::new(), auth)
}

pub fn http_transport_with_base_url(
    auth: GigaChatAuth,
    base_url: impl Into<String>,
) -> GigaChatHttpTransport {
    http_transport(auth).with_base_url(base_url)
}

pub fn model(transport: Arc<dyn GigaChatTransport>) -> GigaChatModel {
    GigaChatModel::builder(transport).build()
}

pub fn model_with_tools(
    transport: Arc<dyn GigaChatTransport>,
    tools: Arc<ToolRegistry>,
) -> GigaChatModel {
    GigaChatModel::builder(transport).tools(tools).build()
}

pub fn model_with(
    transport: Arc<dyn GigaChatTransport>,
    tools: Arc<ToolRegistry>,
    default_options: GigaChatOptions,
) -> GigaChatModel {
    GigaChatModel::builder(transport)
        .tools(tools)
        .default_options(default_options)
        .build()
}

/// The shortest path from a bearer token to a usable model.
pub fn model_from_token(token: impl Into<String>) -> GigaChatModel {
    model(Arc::new(http_transport(GigaChatAuth::bearer(token))))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gchat::GigaChatOptions;
    use gprovider::ToolDefinition;
    use gtooling::ToolRegistry;

    use super::*;

    #[test]
    fn model_from_token_builds_without_configuration() {
        let model = model_from_token("token-123");
        assert!(model.default_options().model.is_none());
    }

    #[test]
    fn model_with_applies_default_options() {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(
            ToolDefinition::new("echo", "Echoes input", "{\"type\":\"object\"}"),
            |args, _ctx| Ok(args),
        );

        let transport = Arc::new(http_transport_with_base_url(
            gprovider::GigaChatAuth::bearer("token"),
            "https://example.test/api/v1",
        ));
        let options = GigaChatOptions::new().with_model("GigaChat-Pro");
        let model = model_with(transport, Arc::new(registry), options);

        assert_eq!(model.default_options().model.as_deref(), Some("GigaChat-Pro"));
    }
}
