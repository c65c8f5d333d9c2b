//! Webhook trigger
//!
//! Like the HTTP endpoint, but can require a shared secret header on
//! production requests.

use catalyst_core::{
    EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata, NodeType,
    Result,
};
use serde_json::json;

use crate::python::FunctionBuilder;

const BODY: &str = r#"request = ctx["execution"].get("request")
secret_name = config.get("secret")
if request is not None and secret_name:
    expected = ctx["secrets"].get(secret_name)
    if not expected:
        raise NodeConfigurationError("Webhook secret '%s' is not set" % secret_name, node_id=node_id)
    header = str(config.get("secretHeader") or "x-webhook-secret").lower()
    provided = str((request.get("headers") or {}).get(header) or "")
    import hmac
    if not hmac.compare_digest(provided, str(expected)):
        raise NodeExecutionError("Webhook secret header '%s' did not match" % header, node_id=node_id)
return copy.deepcopy(ctx["input"])"#;

/// Emits the webhook trigger
///
/// Test-mode runs carry no request, so the secret check only applies in
/// production.
pub struct WebhookTriggerEmitter;

impl WebhookTriggerEmitter {
    pub const FIELD_SECRET: &'static str = "secret";
    pub const FIELD_SECRET_HEADER: &'static str = "secretHeader";
}

impl NodeEmitter for WebhookTriggerEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::WebhookTrigger
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(
            NodeType::WebhookTrigger,
            "Webhook",
            "Starts the workflow from an incoming webhook call",
        )
        .with_fields(vec![
            FieldMetadata::optional(Self::FIELD_SECRET, "Secret", FieldKind::Secret)
                .describe("Name of the project secret the caller must send"),
            FieldMetadata::optional(Self::FIELD_SECRET_HEADER, "Secret header", FieldKind::Text)
                .with_default(json!("x-webhook-secret")),
        ])
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        let metadata = self.metadata();
        Ok(FunctionBuilder::new(node, &metadata).body(BODY).build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_checks_secret() {
        let node = NodeDefinition::new("hook", "webhookTrigger", "Hook")
            .with_config(json!({"secret": "HOOK_TOKEN"}));
        let emitted = WebhookTriggerEmitter.emit(&node).unwrap();
        let src = &emitted.function_source;
        assert!(src.contains("config = {\"secret\": \"HOOK_TOKEN\"}"));
        assert!(src.contains("hmac.compare_digest"));
        assert!(src.contains("        return copy.deepcopy(ctx[\"input\"])\n"));
    }
}
