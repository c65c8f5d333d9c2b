//! Static node metadata
//!
//! `NodeMetadata` describes everything the canvas needs to render a node
//! (ports, configurable fields) and everything the compiler needs to know
//! before emitting it (whether it is implemented, whether it streams).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{NodeCategory, NodeType};

/// Whether a port carries data or selects a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortKind {
    Data,
    Conditional,
}

/// Metadata for a port (input or output)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMetadata {
    /// Port identifier, matched against edge handles
    pub id: String,
    /// Human-readable label
    pub label: String,
    pub kind: PortKind,
}

impl PortMetadata {
    /// Create a data port
    pub fn data(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: PortKind::Data,
        }
    }

    /// Create a conditional (branch) port
    pub fn conditional(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: PortKind::Conditional,
        }
    }
}

/// Editor widget for a configurable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    /// Text that may contain `{{ }}` placeholders
    Template,
    Number,
    Boolean,
    Select,
    Json,
    Code,
    /// Name of a secret or an API key template
    Secret,
}

/// One configurable field of a node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    /// Key in `NodeDefinition::config`
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldMetadata {
    fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind, required: bool) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            required,
            description: String::new(),
            options: Vec::new(),
            default: None,
        }
    }

    /// Create a required field
    pub fn required(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self::new(key, label, kind, true)
    }

    /// Create an optional field
    pub fn optional(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self::new(key, label, kind, false)
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// Complete metadata for a node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    pub node_type: NodeType,
    pub category: NodeCategory,
    /// Human-readable label
    pub label: String,
    pub description: String,
    pub inputs: Vec<PortMetadata>,
    pub outputs: Vec<PortMetadata>,
    pub fields: Vec<FieldMetadata>,
    /// False for stub types that the canvas can show but the compiler refuses
    pub implemented: bool,
    /// Whether the emitter has a streaming variant
    pub supports_streaming: bool,
}

impl NodeMetadata {
    /// Metadata with the usual single data input and output ports
    pub fn new(node_type: NodeType, label: impl Into<String>, description: impl Into<String>) -> Self {
        let inputs = if node_type.category() == NodeCategory::Trigger {
            Vec::new()
        } else {
            vec![PortMetadata::data("input", "Input")]
        };
        Self {
            node_type,
            category: node_type.category(),
            label: label.into(),
            description: description.into(),
            inputs,
            outputs: vec![PortMetadata::data("output", "Output")],
            fields: Vec::new(),
            implemented: true,
            supports_streaming: false,
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldMetadata>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<PortMetadata>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn streaming(mut self) -> Self {
        self.supports_streaming = true;
        self
    }

    /// Mark as declared but not implemented
    pub fn stub(mut self) -> Self {
        self.implemented = false;
        self
    }

    /// Keys of the fields that must be present at run time
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.key.as_str())
            .collect()
    }

    /// Look up a field by key
    pub fn field(&self, key: &str) -> Option<&FieldMetadata> {
        self.fields.iter().find(|f| f.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_metadata_required() {
        let field = FieldMetadata::required("template", "Template", FieldKind::Template);
        assert_eq!(field.key, "template");
        assert!(field.required);
        assert!(field.options.is_empty());
    }

    #[test]
    fn test_trigger_metadata_has_no_inputs() {
        let meta = NodeMetadata::new(NodeType::HttpEndpoint, "HTTP Endpoint", "Entry point");
        assert!(meta.inputs.is_empty());
        assert_eq!(meta.outputs.len(), 1);
        assert_eq!(meta.category, NodeCategory::Trigger);

        let meta = NodeMetadata::new(NodeType::LogMessage, "Log", "Logs");
        assert_eq!(meta.inputs.len(), 1);
    }

    #[test]
    fn test_required_fields() {
        let meta = NodeMetadata::new(NodeType::PromptTemplate, "Prompt", "Renders text").with_fields(vec![
            FieldMetadata::required("template", "Template", FieldKind::Template),
            FieldMetadata::optional("variables", "Variables", FieldKind::Json),
        ]);
        assert_eq!(meta.required_fields(), vec!["template"]);
        assert!(meta.field("variables").is_some());
    }

    #[test]
    fn test_metadata_serialization() {
        let meta = NodeMetadata::new(NodeType::Condition, "Condition", "Branches")
            .with_outputs(vec![
                PortMetadata::conditional("true", "True"),
                PortMetadata::conditional("false", "False"),
            ])
            .stub();
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("\"nodeType\":\"condition\""));
        assert!(json.contains("\"supportsStreaming\":false"));
        assert!(json.contains("\"kind\":\"conditional\""));
        assert!(!meta.implemented);
    }
}
