//! Prompt Template node
//!
//! Renders a text template against the execution's variables.

use catalyst_core::{
    EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata, NodeType,
    Result,
};

use crate::python::FunctionBuilder;

const BODY: &str = r#"variables = build_variables(ctx, config)
text, referenced, warnings = interpolate_tracked(config["template"], variables)
return {"prompt": text, "referencedVariables": referenced, "warnings": warnings}"#;

/// Emits the prompt template node
///
/// # Output
/// `{"prompt": str, "referencedVariables": [str], "warnings": [str]}`
pub struct PromptTemplateEmitter;

impl PromptTemplateEmitter {
    pub const FIELD_TEMPLATE: &'static str = "template";
    pub const FIELD_VARIABLES: &'static str = "variables";
}

impl NodeEmitter for PromptTemplateEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::PromptTemplate
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(
            NodeType::PromptTemplate,
            "Prompt Template",
            "Renders text with {{ }} placeholders",
        )
        .with_fields(vec![
            FieldMetadata::required(Self::FIELD_TEMPLATE, "Template", FieldKind::Template)
                .describe("Text with {{ }} placeholders"),
            FieldMetadata::optional(Self::FIELD_VARIABLES, "Variables", FieldKind::Json)
                .describe("Extra named values; they override every other variable"),
        ])
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        let metadata = self.metadata();
        Ok(FunctionBuilder::new(node, &metadata).body(BODY).build())
    }
}
