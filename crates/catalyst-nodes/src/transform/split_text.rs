//! Split Text node

use catalyst_core::{
    EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata, NodeType,
    Result,
};
use serde_json::json;

use crate::python::FunctionBuilder;

const BODY: &str = r#"variables = build_variables(ctx, config)
text = interpolate(config["text"], variables)
chunk_size = config.get("chunkSize")
if chunk_size:
    size = int(chunk_size)
    overlap = int(config.get("overlap") or 0)
    if size <= 0 or overlap < 0 or overlap >= size:
        raise NodeConfigurationError("Need chunkSize > 0 and 0 <= overlap < chunkSize", node_id=node_id)
    parts = [text[start:start + size] for start in range(0, len(text), size - overlap)]
else:
    separator = config.get("separator")
    if separator is None:
        separator = "\n"
    if separator == "":
        raise NodeConfigurationError("'separator' must not be empty", node_id=node_id)
    parts = text.split(separator)
if config.get("trim", True):
    parts = [part.strip() for part in parts]
if config.get("removeEmpty", True):
    parts = [part for part in parts if part]
return {"parts": parts, "count": len(parts)}"#;

/// Emits the text splitter (by separator, or fixed-size chunks with overlap)
pub struct SplitTextEmitter;

impl NodeEmitter for SplitTextEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::SplitText
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(NodeType::SplitText, "Split Text", "Splits text into parts or chunks")
            .with_fields(vec![
                FieldMetadata::required("text", "Text", FieldKind::Template),
                FieldMetadata::optional("separator", "Separator", FieldKind::Text).with_default(json!("\n")),
                FieldMetadata::optional("chunkSize", "Chunk size", FieldKind::Number)
                    .describe("Split into fixed-size chunks instead of by separator"),
                FieldMetadata::optional("overlap", "Overlap", FieldKind::Number).with_default(json!(0)),
                FieldMetadata::optional("trim", "Trim parts", FieldKind::Boolean).with_default(json!(true)),
                FieldMetadata::optional("removeEmpty", "Remove empty parts", FieldKind::Boolean)
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
    fn test_emit_split_text() {
        let node = NodeDefinition::new("split", "splitText", "Split")
            .with_config(json!({"text": "{{ input.csv }}", "separator": ","}));
        let emitted = SplitTextEmitter.emit(&node).unwrap();
        let src = &emitted.function_source;
        assert!(src.contains("\"separator\": \",\""));
        assert!(src.contains("            separator = \"\\n\"\n"));
    }
}
