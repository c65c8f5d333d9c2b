//! Error types for workflow compilation

use thiserror::Error;

use crate::validation::ValidationIssue;

/// Result type alias using CompileError
pub type Result<T> = std::result::Result<T, CompileError>;

/// Generation-time errors.
///
/// Any of these stops compilation before source text is assembled, so a
/// failed compile never yields partial code.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Node type string is not in the registry
    #[error("Node '{node_id}' has unknown node type '{node_type}'")]
    UnknownNodeType { node_id: String, node_type: String },

    /// Node type is declared but has no emitter yet
    #[error("Node '{node_id}' uses node type '{node_type}', which is not implemented")]
    NodeNotImplemented { node_id: String, node_type: String },

    /// Edge references a node that does not exist
    #[error("Edge '{edge_id}' references unknown node '{node_id}'")]
    DanglingEdge { edge_id: String, node_id: String },

    /// The graph contains a cycle
    #[error("Cycle detected in workflow graph involving nodes: {}", .0.join(", "))]
    CycleDetected(Vec<String>),

    /// Validation reported ERROR-level issues
    #[error("Workflow failed validation with {} error(s): {}", .0.len(), summarize(.0))]
    Validation(Vec<ValidationIssue>),

    /// A node's configuration cannot be turned into code
    #[error("Invalid configuration for node '{node_id}': {message}")]
    InvalidConfig { node_id: String, message: String },

    /// Runtime/framework combination has no code generator
    #[error("Unsupported target: runtime '{runtime}' with framework '{framework}'")]
    UnsupportedTarget { runtime: String, framework: String },

    /// Requested workflow is not in the manifest
    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    /// Create an invalid configuration error
    pub fn invalid_config(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            node_id: node_id.into(),
            message: message.into(),
        }
    }
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
