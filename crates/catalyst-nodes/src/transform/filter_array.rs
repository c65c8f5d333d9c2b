//! Filter Array node

use catalyst_core::{
    EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata, NodeType,
    Result,
};
use serde_json::json;

use crate::control::OPERATORS;
use crate::python::FunctionBuilder;

const BODY: &str = r#"variables = build_variables(ctx, config)
items = resolve_required(config["source"], variables, node_id)
if not isinstance(items, list):
    raise NodeExecutionError("Source '%s' is not a list" % config["source"], node_id=node_id)
condition = config.get("condition")
field = config.get("field")
if condition is None and not field:
    raise NodeConfigurationError("Set either 'condition' or 'field'", node_id=node_id)
kept = []
for index, item in enumerate(items):
    scope = dict(variables)
    scope["item"] = item
    scope["index"] = index
    if condition is not None:
        keep = evaluate_condition(condition, scope)
    else:
        left = resolve_path(field, item)
        left = None if left is _MISSING else left
        keep = compare_values(left, config.get("operator") or "truthy", render_value(config.get("value"), scope))
    if keep:
        kept.append(item)
limit = config.get("limit")
if limit is not None:
    kept = kept[: max(int(limit), 0)]
return {"items": kept, "count": len(kept), "total": len(items)}"#;

/// Emits the array filter
///
/// `condition` is evaluated per element with `item` and `index` in scope;
/// alternatively `field`, `operator` and `value` compare one field of each
/// element.
pub struct FilterArrayEmitter;

impl NodeEmitter for FilterArrayEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::FilterArray
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(NodeType::FilterArray, "Filter Array", "Keeps the list items that match")
            .with_fields(vec![
                FieldMetadata::required("source", "Source", FieldKind::Template),
                FieldMetadata::optional("condition", "Condition", FieldKind::Template)
                    .describe("Judged per item, e.g. {{ item.active }}"),
                FieldMetadata::optional("field", "Field", FieldKind::Text),
                FieldMetadata::optional("operator", "Operator", FieldKind::Select)
                    .with_options(OPERATORS)
                    .with_default(json!("truthy")),
                FieldMetadata::optional("value", "Value", FieldKind::Template),
                FieldMetadata::optional("limit", "Limit", FieldKind::Number),
            ])
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        let metadata = self.metadata();
        Ok(FunctionBuilder::new(node, &metadata).body(BODY).build())
    }
}
