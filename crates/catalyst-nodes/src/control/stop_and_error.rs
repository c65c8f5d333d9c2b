//! Stop and Error node

use catalyst_core::{
    EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata, NodeType,
    Result,
};

use crate::python::FunctionBuilder;

const BODY: &str = r#"variables = build_variables(ctx, config)
message = interpolate(config["message"], variables)
code = config.get("errorCode")
if code:
    message = "[%s] %s" % (code, message)
raise WorkflowStoppedError(message, node_id=node_id)"#;

/// Emits a deliberate stop
///
/// Raises `WorkflowStoppedError`, which is never retried; the node's
/// `onError` policy still applies.
pub struct StopAndErrorEmitter;

impl NodeEmitter for StopAndErrorEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::StopAndError
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(NodeType::StopAndError, "Stop and Error", "Ends the execution with an error")
            .with_fields(vec![
                FieldMetadata::required("message", "Message", FieldKind::Template),
                FieldMetadata::optional("errorCode", "Error code", FieldKind::Text),
            ])
            .with_outputs(Vec::new())
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        let metadata = self.metadata();
        Ok(FunctionBuilder::new(node, &metadata).body(BODY).build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_emit_stop() {
        let node = NodeDefinition::new("halt", "stopAndError", "Halt")
            .with_config(json!({"message": "Rejected {{ input.id }}", "errorCode": "E42"}));
        let emitted = StopAndErrorEmitter.emit(&node).unwrap();
        assert!(emitted
            .function_source
            .contains("raise WorkflowStoppedError(message, node_id=node_id)"));
        assert!(StopAndErrorEmitter.metadata().outputs.is_empty());
    }
}
