//! Log Message node

use catalyst_core::{
    CompileError, EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata,
    NodeType, Result,
};
use serde_json::json;

use crate::python::FunctionBuilder;

const LEVELS: &[&str] = &["debug", "info", "warning", "error"];

const BODY: &str = r#"variables = build_variables(ctx, config)
message = interpolate(config["message"], variables)
level = str(config.get("level") or "info").lower()
logger.log(getattr(logging, level.upper(), logging.INFO), "[%s] %s", node_id, message)
return {"message": message, "level": level}"#;

/// Emits a log line on the workflow's logger
pub struct LogMessageEmitter;

impl NodeEmitter for LogMessageEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::LogMessage
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(NodeType::LogMessage, "Log Message", "Writes a message to the workflow log")
            .with_fields(vec![
                FieldMetadata::required("message", "Message", FieldKind::Template),
                FieldMetadata::optional("level", "Level", FieldKind::Select)
                    .with_options(LEVELS)
                    .with_default(json!("info")),
            ])
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        if let Some(level) = node.config_str("level") {
            if !LEVELS.contains(&level.to_lowercase().as_str()) {
                return Err(CompileError::invalid_config(
                    &node.id,
                    format!("unknown log level '{}'", level),
                ));
            }
        }
        let metadata = self.metadata();
        Ok(FunctionBuilder::new(node, &metadata).body(BODY).build())
    }
}
