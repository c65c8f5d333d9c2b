//! Node type registry for emitter dispatch
//!
//! Maps each `NodeType` to its static metadata and, for implemented types,
//! to the emitter that turns a node's configuration into source code.
//!
//! # Usage
//!
//! ```ignore
//! use catalyst_core::NodeRegistry;
//!
//! let registry = catalyst_nodes::builtin_registry();
//! let node_type = registry.resolve("n1", "promptTemplate")?;
//! let emitter = registry.emitter_for_node("n1", node_type)?;
//! ```
//!
//! The registry is read-only once built and is shared by reference, so the
//! same table can serve concurrent compilations.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::descriptor::NodeMetadata;
use crate::error::{CompileError, Result};
use crate::types::{NodeCategory, NodeDefinition, NodeType};

/// The code produced for one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmittedNode {
    /// Name of the async function defined by `function_source`
    pub function_name: String,
    /// Complete, self-contained function definition
    pub function_source: String,
    /// Third-party packages the function imports
    pub dependencies: Vec<String>,
}

/// Per-node-type code emitter
///
/// Emitters are pure: the same node always yields byte-identical output.
pub trait NodeEmitter: Send + Sync {
    /// The node type this emitter handles
    fn node_type(&self) -> NodeType;

    /// Static metadata for the palette and validation
    fn metadata(&self) -> NodeMetadata;

    /// Emit the function for one node
    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode>;
}

/// A registration entry combining metadata with an optional emitter
struct RegistryEntry {
    metadata: NodeMetadata,
    emitter: Option<Arc<dyn NodeEmitter>>,
}

/// Registry of node types with their metadata and emitters
pub struct NodeRegistry {
    entries: HashMap<NodeType, RegistryEntry>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register an implemented node type; metadata comes from the emitter
    pub fn register(&mut self, emitter: Arc<dyn NodeEmitter>) {
        let metadata = emitter.metadata();
        self.entries.insert(
            metadata.node_type,
            RegistryEntry {
                metadata,
                emitter: Some(emitter),
            },
        );
    }

    /// Register a node type with metadata only (stub types)
    pub fn register_metadata(&mut self, metadata: NodeMetadata) {
        self.entries.insert(
            metadata.node_type,
            RegistryEntry {
                metadata,
                emitter: None,
            },
        );
    }

    /// Get metadata for a node type
    pub fn get_metadata(&self, node_type: NodeType) -> Option<&NodeMetadata> {
        self.entries.get(&node_type).map(|e| &e.metadata)
    }

    /// Get the emitter for a node type
    pub fn get_emitter(&self, node_type: NodeType) -> Option<Arc<dyn NodeEmitter>> {
        self.entries.get(&node_type).and_then(|e| e.emitter.clone())
    }

    /// Check if a node type string is registered
    pub fn has_node_type(&self, node_type: &str) -> bool {
        NodeType::from_name(node_type).is_some_and(|t| self.entries.contains_key(&t))
    }

    /// Resolve a node's type string, reporting unknown types as a compile error
    pub fn resolve(&self, node_id: &str, node_type: &str) -> Result<NodeType> {
        NodeType::from_name(node_type)
            .filter(|t| self.entries.contains_key(t))
            .ok_or_else(|| CompileError::UnknownNodeType {
                node_id: node_id.to_string(),
                node_type: node_type.to_string(),
            })
    }

    /// Get the emitter for a node, reporting stub types as a compile error
    pub fn emitter_for_node(&self, node_id: &str, node_type: NodeType) -> Result<Arc<dyn NodeEmitter>> {
        match self.entries.get(&node_type) {
            None => Err(CompileError::UnknownNodeType {
                node_id: node_id.to_string(),
                node_type: node_type.as_str().to_string(),
            }),
            Some(RegistryEntry { emitter: None, .. }) => Err(CompileError::NodeNotImplemented {
                node_id: node_id.to_string(),
                node_type: node_type.as_str().to_string(),
            }),
            Some(RegistryEntry {
                emitter: Some(emitter),
                ..
            }) => Ok(emitter.clone()),
        }
    }

    /// Get all registered metadata in palette order
    pub fn all_metadata(&self) -> Vec<&NodeMetadata> {
        NodeType::ALL
            .iter()
            .filter_map(|t| self.get_metadata(*t))
            .collect()
    }

    /// Get metadata grouped by category
    pub fn metadata_by_category(&self) -> BTreeMap<NodeCategory, Vec<&NodeMetadata>> {
        let mut grouped: BTreeMap<NodeCategory, Vec<&NodeMetadata>> = BTreeMap::new();
        for metadata in self.all_metadata() {
            grouped.entry(metadata.category).or_default().push(metadata);
        }
        grouped
    }

    /// Node types that have an emitter
    pub fn implemented_types(&self) -> Vec<NodeType> {
        NodeType::ALL
            .iter()
            .copied()
            .filter(|t| self.entries.get(t).is_some_and(|e| e.emitter.is_some()))
            .collect()
    }

    /// Number of registered node types
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
