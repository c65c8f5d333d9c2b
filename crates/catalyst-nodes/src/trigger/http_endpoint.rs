//! HTTP Endpoint trigger
//!
//! The default entry point: in production the workflow is served on
//! `/<slug>` with the configured method, in test mode the payload comes
//! from stdin.

use catalyst_core::{
    EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata, NodeType,
    Result,
};
use serde_json::json;

use crate::python::FunctionBuilder;

/// Emits the HTTP endpoint trigger
///
/// # Output
/// The trigger payload after input-schema defaults are applied.
pub struct HttpEndpointEmitter;

impl HttpEndpointEmitter {
    pub const FIELD_METHOD: &'static str = "method";
    pub const FIELD_PATH: &'static str = "path";
}

impl NodeEmitter for HttpEndpointEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::HttpEndpoint
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(
            NodeType::HttpEndpoint,
            "HTTP Endpoint",
            "Starts the workflow when an HTTP request arrives",
        )
        .with_fields(vec![
            FieldMetadata::optional(Self::FIELD_METHOD, "Method", FieldKind::Select)
                .with_options(&["GET", "POST", "PUT", "PATCH", "DELETE"])
                .with_default(json!("POST"))
                .describe("HTTP method of the production route"),
            FieldMetadata::optional(Self::FIELD_PATH, "Path", FieldKind::Text)
                .describe("Informational; the route is always derived from the workflow name"),
        ])
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        let metadata = self.metadata();
        Ok(FunctionBuilder::new(node, &metadata)
            .line("return copy.deepcopy(ctx[\"input\"])")
            .build())
    }
}
