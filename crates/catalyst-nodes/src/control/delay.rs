//! Delay node

use catalyst_core::{
    EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata, NodeType,
    Result,
};

use crate::python::FunctionBuilder;

const BODY: &str = r#"variables = build_variables(ctx, config)
raw = render_value(config["duration"], variables)
try:
    duration_ms = float(raw)
except (TypeError, ValueError) as exc:
    raise NodeConfigurationError("'duration' must be a number of milliseconds, got %r" % (raw,), node_id=node_id) from exc
if duration_ms < 0:
    raise NodeConfigurationError("'duration' must not be negative", node_id=node_id)
await asyncio.sleep(duration_ms / 1000.0)
last = ctx["lastNode"]
return {"delayedMs": duration_ms, "passthrough": ctx["nodes"].get(last) if last is not None else None}"#;

/// Emits a pause of `duration` milliseconds
pub struct DelayEmitter;

impl NodeEmitter for DelayEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::Delay
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(NodeType::Delay, "Delay", "Waits before continuing")
            .with_fields(vec![FieldMetadata::required("duration", "Duration (ms)", FieldKind::Number)
                .describe("Milliseconds to wait; may be a template")])
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        let metadata = self.metadata();
        Ok(FunctionBuilder::new(node, &metadata).body(BODY).build())
    }
}
