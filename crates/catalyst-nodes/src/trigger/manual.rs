//! Manual trigger

use catalyst_core::{
    EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata, NodeType,
    Result,
};

use crate::python::FunctionBuilder;

const BODY: &str = r#"payload = copy.deepcopy(ctx["input"])
sample = config.get("sampleData")
if not payload and isinstance(sample, dict):
    payload = copy.deepcopy(sample)
return payload"#;

/// Emits the manual trigger; an empty payload falls back to `sampleData`
pub struct ManualTriggerEmitter;

impl NodeEmitter for ManualTriggerEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::ManualTrigger
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(
            NodeType::ManualTrigger,
            "Manual Trigger",
            "Starts the workflow by hand from the editor",
        )
        .with_fields(vec![FieldMetadata::optional("sampleData", "Sample data", FieldKind::Json)
            .describe("Payload used when the run provides none")])
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
    fn test_emit_uses_sample_data() {
        let node = NodeDefinition::new("go", "manualTrigger", "Go")
            .with_config(json!({"sampleData": {"name": "Test"}}));
        let emitted = ManualTriggerEmitter.emit(&node).unwrap();
        assert!(emitted
            .function_source
            .contains("config = {\"sampleData\": {\"name\": \"Test\"}}"));
        assert!(emitted.function_source.contains("payload = copy.deepcopy(sample)"));
    }
}
