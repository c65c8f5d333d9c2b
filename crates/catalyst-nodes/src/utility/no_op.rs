//! No Operation node

use catalyst_core::{EmittedNode, NodeDefinition, NodeEmitter, NodeMetadata, NodeType, Result};

use crate::python::FunctionBuilder;

const BODY: &str = r#"last = ctx["lastNode"]
return ctx["nodes"].get(last) if last is not None else copy.deepcopy(ctx["input"])"#;

/// Emits a pass-through of the previous node's result
pub struct NoOpEmitter;

impl NodeEmitter for NoOpEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::NoOp
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(NodeType::NoOp, "No Operation", "Passes the previous result through unchanged")
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
    fn test_emit_no_op() {
        let node = NodeDefinition::new("pass", "noOp", "Pass");
        let emitted = NoOpEmitter.emit(&node).unwrap();
        assert!(emitted.function_source.contains("config = {}\n"));
        assert!(emitted.function_source.contains("last = ctx[\"lastNode\"]"));
    }
}
