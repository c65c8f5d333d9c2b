//! Condition node
//!
//! Two-way branch. Either a single `condition` expression judged by
//! truthiness, or a `left` / `operator` / `right` comparison.

use catalyst_core::{
    CompileError, EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata,
    NodeType, PortMetadata, Result,
};
use serde_json::json;

use super::OPERATORS;
use crate::python::FunctionBuilder;

const BODY: &str = r#"variables = build_variables(ctx, config)
if config.get("condition") is not None:
    result = evaluate_condition(config["condition"], variables)
elif config.get("left") is not None:
    left = render_value(config["left"], variables)
    right = render_value(config.get("right"), variables)
    result = compare_values(left, config.get("operator") or "equals", right)
else:
    raise NodeConfigurationError("Set either 'condition' or 'left'/'operator'/'right'", node_id=node_id)
return {"result": bool(result), "branch": "true" if result else "false"}"#;

/// Emits a two-way branch
///
/// # Output
/// `{"result": bool, "branch": "true" | "false"}`
pub struct ConditionEmitter;

impl ConditionEmitter {
    pub const PORT_TRUE: &'static str = "true";
    pub const PORT_FALSE: &'static str = "false";
}

impl NodeEmitter for ConditionEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::Condition
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(NodeType::Condition, "Condition", "Routes execution down the true or false branch")
            .with_fields(vec![
                FieldMetadata::optional("condition", "Condition", FieldKind::Template)
                    .describe("Expression judged by truthiness; takes precedence over left/right"),
                FieldMetadata::optional("left", "Left value", FieldKind::Template),
                FieldMetadata::optional("operator", "Operator", FieldKind::Select)
                    .with_options(OPERATORS)
                    .with_default(json!("equals")),
                FieldMetadata::optional("right", "Right value", FieldKind::Template),
            ])
            .with_outputs(vec![
                PortMetadata::conditional(Self::PORT_TRUE, "True"),
                PortMetadata::conditional(Self::PORT_FALSE, "False"),
            ])
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        if let Some(operator) = node.config.get("operator") {
            let known = operator.as_str().is_some_and(|op| OPERATORS.contains(&op));
            if !known {
                return Err(CompileError::invalid_config(
                    &node.id,
                    format!("unknown operator {}", operator),
                ));
            }
        }
        let metadata = self.metadata();
        Ok(FunctionBuilder::new(node, &metadata).body(BODY).build())
    }
}
