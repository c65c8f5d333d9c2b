//! Catalyst Core - workflow model, node registry and validation
//!
//! This crate holds everything the compiler needs to know about a workflow
//! before any source text is produced:
//!
//! - The manifest model (`Manifest`, `WorkflowDefinition`, `NodeDefinition`,
//!   `EdgeDefinition`) as persisted by the editor
//! - The closed `NodeType` enum and static `NodeMetadata` for every kind
//! - `NodeRegistry`, an explicit read-only table of metadata and emitters
//! - Manifest/workflow validation with field-path issues
//! - The expression resolver used for `{{ ... }}` placeholders
//!
//! # Architecture
//!
//! The registry is built once by the host (see `catalyst-nodes`) and passed
//! by reference into the compiler. Nothing in this crate holds global state.
//!
//! # Example
//!
//! ```ignore
//! use catalyst_core::{validate_workflow, has_errors, WorkflowBuilder};
//!
//! let workflow = WorkflowBuilder::new("wf-1", "Hello")
//!     .add_node("trigger", "httpEndpoint", "Trigger")
//!     .add_node("greet", "promptTemplate", "Greeting")
//!     .with_config(serde_json::json!({"template": "Hello {{ input.name }}"}))
//!     .add_edge("trigger", "greet")
//!     .build();
//!
//! let issues = validate_workflow(&workflow, None);
//! assert!(!has_errors(&issues));
//! ```

pub mod builder;
pub mod descriptor;
pub mod error;
pub mod expression;
pub mod registry;
pub mod types;
pub mod validation;

// Re-export key types
pub use builder::WorkflowBuilder;
pub use descriptor::{FieldKind, FieldMetadata, NodeMetadata, PortKind, PortMetadata};
pub use error::{CompileError, Result};
pub use expression::{Interpolation, VariableScope};
pub use registry::{EmittedNode, NodeEmitter, NodeRegistry};
pub use types::{
    EdgeDefinition, ExecutionConfig, InputField, Manifest, NodeCategory, NodeDefinition, NodeId,
    NodeType, OnErrorPolicy, OutputSpec, ProjectConfig, TriggerDefinition, WorkflowDefinition,
};
pub use validation::{
    has_errors, validate_manifest, validate_workflow, Severity, ValidationIssue,
};
