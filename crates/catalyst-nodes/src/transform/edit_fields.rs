//! Edit Fields node
//!
//! Builds an object from named templates, optionally on top of an existing
//! object.

use catalyst_core::{
    EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata, NodeType,
    Result,
};
use serde_json::json;

use crate::python::FunctionBuilder;

const BODY: &str = r#"variables = build_variables(ctx, config)
assignments = config["fields"]
if not isinstance(assignments, dict):
    raise NodeConfigurationError("'fields' must be an object of name -> value", node_id=node_id)
source = config.get("source")
if source:
    base = resolve_required(source, variables, node_id)
    if not isinstance(base, dict):
        raise NodeExecutionError("Source '%s' is not an object" % source, node_id=node_id)
    result = copy.deepcopy(base)
else:
    result = {}
for name in config.get("remove") or []:
    result.pop(name, None)
if config.get("keepTypes", True):
    rendered = render_value(assignments, variables)
else:
    rendered = interpolate_value(assignments, variables)
result.update(rendered)
return result"#;

/// Emits the field editor
///
/// With `keepTypes` (the default) a value that is a lone placeholder keeps
/// the resolved type; otherwise every string value is interpolated to text.
pub struct EditFieldsEmitter;

impl NodeEmitter for EditFieldsEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::EditFields
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(NodeType::EditFields, "Edit Fields", "Sets, renames or removes fields")
            .with_fields(vec![
                FieldMetadata::required("fields", "Fields", FieldKind::Json)
                    .describe("Object of field name -> value template"),
                FieldMetadata::optional("source", "Source", FieldKind::Template)
                    .describe("Object to start from, e.g. {{ nodes.fetch.body }}"),
                FieldMetadata::optional("remove", "Remove", FieldKind::Json)
                    .describe("Field names to drop from the source"),
                FieldMetadata::optional("keepTypes", "Keep types", FieldKind::Boolean)
                    .with_default(json!(true)),
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
    fn test_emit_edit_fields() {
        let node = NodeDefinition::new("shape", "editFields", "Shape").with_config(json!({
            "fields": {"fullName": "{{ input.first }} {{ input.last }}", "age": "{{ input.age }}"},
            "keepTypes": false
        }));
        let emitted = EditFieldsEmitter.emit(&node).unwrap();
        let src = &emitted.function_source;
        assert!(src.contains("\"keepTypes\": False"));
        assert!(src.contains("rendered = interpolate_value(assignments, variables)"));
        assert!(src.contains("base = resolve_required(source, variables, node_id)"));
    }
}
