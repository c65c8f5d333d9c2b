//! Set Variable node
//!
//! Writes into this execution's copy of the global variables; other
//! executions never see the change.

use catalyst_core::{
    EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata, NodeType,
    Result,
};

use crate::python::FunctionBuilder;

const BODY: &str = r#"variables = build_variables(ctx, config)
name = str(config["name"]).strip()
value = render_value(config["value"], variables)
ctx["globals"][name] = value
return {"name": name, "value": value}"#;

/// Emits a per-execution assignment to `globals.<name>`
pub struct SetVariableEmitter;

impl NodeEmitter for SetVariableEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::SetVariable
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(NodeType::SetVariable, "Set Variable", "Stores a value under globals for later nodes")
            .with_fields(vec![
                FieldMetadata::required("name", "Name", FieldKind::Text),
                FieldMetadata::required("value", "Value", FieldKind::Template)
                    .describe("A lone placeholder keeps the resolved type"),
            ])
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        let metadata = self.metadata();
        Ok(FunctionBuilder::new(node, &metadata).body(BODY).build())
    }
}
