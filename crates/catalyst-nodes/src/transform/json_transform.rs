//! JSON Transform node
//!
//! Parses JSON text if needed, then picks a sub-path or maps several paths
//! into a new object.

use catalyst_core::{
    EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata, NodeType,
    Result,
};

use crate::python::FunctionBuilder;

const BODY: &str = r#"variables = build_variables(ctx, config)
data = resolve_required(config["source"], variables, node_id)
if isinstance(data, str) and config.get("parse", True):
    try:
        data = json.loads(data)
    except ValueError as exc:
        raise NodeExecutionError("Source is not valid JSON: %s" % exc, node_id=node_id) from exc
path = config.get("path")
if path:
    data = resolve_path(path, data)
    if data is _MISSING:
        raise ExpressionResolutionError("Path '%s' not found in source" % path, node_id=node_id)
mapping = config.get("mapping")
if mapping is None:
    return data
if not isinstance(mapping, dict):
    raise NodeConfigurationError("'mapping' must be an object of name -> path", node_id=node_id)
result = {}
for name, item_path in mapping.items():
    value = resolve_path(str(item_path), data)
    result[name] = None if value is _MISSING else value
return result"#;

/// Emits the JSON transform
///
/// Unmapped paths in `mapping` produce `None` instead of failing.
pub struct JsonTransformEmitter;

impl NodeEmitter for JsonTransformEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::JsonTransform
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(NodeType::JsonTransform, "JSON Transform", "Extracts and reshapes JSON data")
            .with_fields(vec![
                FieldMetadata::required("source", "Source", FieldKind::Template)
                    .describe("Expression for the data, e.g. {{ nodes.fetch.body }}"),
                FieldMetadata::optional("path", "Path", FieldKind::Text)
                    .describe("Dot path into the source, e.g. data.items[0]"),
                FieldMetadata::optional("mapping", "Mapping", FieldKind::Json)
                    .describe("Object of output name -> dot path"),
                FieldMetadata::optional("parse", "Parse strings", FieldKind::Boolean),
            ])
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        let metadata = self.metadata();
        Ok(FunctionBuilder::new(node, &metadata).body(BODY).build())
    }
}
