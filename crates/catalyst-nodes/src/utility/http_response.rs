//! HTTP Response node
//!
//! Shapes the production HTTP response. When several run, the last one to
//! succeed wins.

use catalyst_core::{
    EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata, NodeType,
    Result,
};
use serde_json::json;

use crate::python::FunctionBuilder;

const BODY: &str = r#"variables = build_variables(ctx, config)
raw_status = render_value(config.get("statusCode", 200), variables)
try:
    status = int(raw_status)
except (TypeError, ValueError) as exc:
    raise NodeConfigurationError("'statusCode' must be an integer, got %r" % (raw_status,), node_id=node_id) from exc
if not 100 <= status <= 599:
    raise NodeConfigurationError("'statusCode' %d is not a valid HTTP status" % status, node_id=node_id)
headers = interpolate_value(config.get("headers") or {}, variables)
if not isinstance(headers, dict):
    raise NodeConfigurationError("'headers' must be an object", node_id=node_id)
if "body" in config:
    body = render_value(config["body"], variables)
else:
    last = ctx["lastNode"]
    body = ctx["nodes"].get(last) if last is not None else None
return {"statusCode": status, "headers": headers, "body": body}"#;

/// Emits the response shaper
///
/// # Output
/// `{"statusCode": int, "headers": dict, "body": any}`; without a `body`
/// config the previous node's result is sent.
pub struct HttpResponseEmitter;

impl NodeEmitter for HttpResponseEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::HttpResponse
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(NodeType::HttpResponse, "HTTP Response", "Sets the status, headers and body returned to the caller")
            .with_fields(vec![
                FieldMetadata::optional("statusCode", "Status code", FieldKind::Number)
                    .with_default(json!(200)),
                FieldMetadata::optional("headers", "Headers", FieldKind::Json),
                FieldMetadata::optional("body", "Body", FieldKind::Json)
                    .describe("Defaults to the previous node's result"),
            ])
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        let metadata = self.metadata();
        Ok(FunctionBuilder::new(node, &metadata).body(BODY).build())
    }
}
