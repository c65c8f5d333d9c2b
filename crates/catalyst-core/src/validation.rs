//! Manifest and workflow validation
//!
//! Validates graph structure, node identities, error policies and trigger
//! types. Every problem is reported as a `ValidationIssue` with a field path
//! so the editor can point at the offending input.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::registry::NodeRegistry;
use crate::types::{Manifest, NodeCategory, NodeType, OnErrorPolicy, WorkflowDefinition};

/// Methods a trigger route may be registered under
const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE"];

/// How serious a validation issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The compiler refuses the workflow
    Error,
    /// Reported but compilable
    Warning,
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Field path such as `workflows.hello.nodes.n1.type`
    pub path: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{} at {}: {}", level, self.path, self.message)
    }
}

/// Whether any issue is an error
pub fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(ValidationIssue::is_error)
}

/// Validate a single workflow
///
/// Returns all issues found (not just the first). Pass a registry to enable
/// node type checks.
pub fn validate_workflow(
    workflow: &WorkflowDefinition,
    registry: Option<&NodeRegistry>,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    validate_workflow_at(workflow, "", registry, &mut issues);
    issues
}

/// Validate every workflow of a manifest
pub fn validate_manifest(manifest: &Manifest, registry: Option<&NodeRegistry>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (key, workflow) in &manifest.workflows {
        let prefix = format!("workflows.{}.", key);
        if workflow.id != *key {
            issues.push(ValidationIssue::new(
                format!("{}id", prefix),
                format!("Workflow id '{}' does not match its key '{}'", workflow.id, key),
                Severity::Error,
            ));
        }
        validate_workflow_at(workflow, &prefix, registry, &mut issues);
    }

    for (name, env_var) in &manifest.secrets {
        if env_var.trim().is_empty() {
            issues.push(ValidationIssue::new(
                format!("secrets.{}", name),
                "Secret has no environment variable",
                Severity::Warning,
            ));
        }
    }

    issues
}

fn validate_workflow_at(
    workflow: &WorkflowDefinition,
    prefix: &str,
    registry: Option<&NodeRegistry>,
    issues: &mut Vec<ValidationIssue>,
) {
    if workflow.id.trim().is_empty() {
        issues.push(ValidationIssue::new(
            format!("{}id", prefix),
            "Workflow id must not be empty",
            Severity::Error,
        ));
    }

    if workflow.nodes.is_empty() {
        issues.push(ValidationIssue::new(
            format!("{}nodes", prefix),
            "Workflow has no nodes",
            Severity::Warning,
        ));
    }

    validate_trigger(workflow, prefix, issues);
    validate_nodes(workflow, prefix, registry, issues);
    validate_edges(workflow, prefix, issues);
}

fn validate_trigger(workflow: &WorkflowDefinition, prefix: &str, issues: &mut Vec<ValidationIssue>) {
    let trigger_type = workflow.trigger.trigger_type.as_str();
    let is_trigger = NodeType::from_name(trigger_type)
        .is_some_and(|t| t.category() == NodeCategory::Trigger);
    if !is_trigger {
        issues.push(ValidationIssue::new(
            format!("{}trigger.type", prefix),
            format!("Unknown trigger type '{}'", trigger_type),
            Severity::Error,
        ));
    }

    if let Some(method) = workflow.trigger.config.get("method") {
        let known = method
            .as_str()
            .map(|m| m.trim().to_uppercase())
            .is_some_and(|m| HTTP_METHODS.contains(&m.as_str()));
        if !known {
            issues.push(ValidationIssue::new(
                format!("{}trigger.config.method", prefix),
                format!(
                    "Unsupported HTTP method {}; expected one of {}",
                    method,
                    HTTP_METHODS.join(", ")
                ),
                Severity::Error,
            ));
        }
    }
}

/// Check node identities, types and execution settings
fn validate_nodes(
    workflow: &WorkflowDefinition,
    prefix: &str,
    registry: Option<&NodeRegistry>,
    issues: &mut Vec<ValidationIssue>,
) {
    if workflow
        .execution_config
        .as_ref()
        .is_some_and(|c| c.timeout == Some(0))
    {
        issues.push(ValidationIssue::new(
            format!("{}executionConfig.timeout", prefix),
            "Timeout must be greater than zero",
            Severity::Error,
        ));
    }

    for (key, node) in &workflow.nodes {
        let path = format!("{}nodes.{}", prefix, key);

        if node.id.trim().is_empty() {
            issues.push(ValidationIssue::new(
                format!("{}.id", path),
                "Node id must not be empty",
                Severity::Error,
            ));
        } else if node.id != *key {
            issues.push(ValidationIssue::new(
                format!("{}.id", path),
                format!("Node id '{}' does not match its key '{}'", node.id, key),
                Severity::Error,
            ));
        }

        if let Some(reg) = registry {
            match NodeType::from_name(&node.node_type).and_then(|t| reg.get_metadata(t)) {
                None => issues.push(ValidationIssue::new(
                    format!("{}.type", path),
                    format!("Unknown node type '{}'", node.node_type),
                    Severity::Error,
                )),
                Some(meta) if !meta.implemented => issues.push(ValidationIssue::new(
                    format!("{}.type", path),
                    format!("Node type '{}' is not implemented yet and cannot be compiled", node.node_type),
                    Severity::Warning,
                )),
                Some(_) => {}
            }
        }

        if node.timeout == Some(0) {
            issues.push(ValidationIssue::new(
                format!("{}.timeout", path),
                "Timeout must be greater than zero",
                Severity::Error,
            ));
        }

        if workflow.effective_on_error(node) == OnErrorPolicy::Fallback && node.fallback_value.is_none() {
            issues.push(ValidationIssue::new(
                format!("{}.fallbackValue", path),
                "onError 'fallback' requires a fallbackValue",
                Severity::Error,
            ));
        }

        if node.cache.is_some() {
            issues.push(ValidationIssue::new(
                format!("{}.cache", path),
                "Caching is reserved and ignored by the compiler",
                Severity::Warning,
            ));
        }
    }
}

/// Check edge identities and references
fn validate_edges(workflow: &WorkflowDefinition, prefix: &str, issues: &mut Vec<ValidationIssue>) {
    let mut seen_ids: HashSet<&str> = HashSet::new();

    for (index, edge) in workflow.edges.iter().enumerate() {
        let path = format!("{}edges[{}]", prefix, index);

        if !seen_ids.insert(edge.id.as_str()) {
            issues.push(ValidationIssue::new(
                format!("{}.id", path),
                format!("Duplicate edge id '{}'", edge.id),
                Severity::Error,
            ));
        }

        for (field, node_id) in [("source", &edge.source), ("target", &edge.target)] {
            if !workflow.nodes.contains_key(node_id) {
                issues.push(ValidationIssue::new(
                    format!("{}.{}", path, field),
                    format!("Edge '{}' references unknown node '{}'", edge.id, node_id),
                    Severity::Error,
                ));
            }
        }

        if edge.source == edge.target {
            issues.push(ValidationIssue::new(
                path,
                format!("Edge '{}' connects node '{}' to itself", edge.id, edge.source),
                Severity::Error,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::NodeMetadata;
    use crate::types::{EdgeDefinition, NodeDefinition};
    use serde_json::json;

    fn make_workflow() -> WorkflowDefinition {
        let mut workflow = WorkflowDefinition::new("wf", "Test");
        workflow.add_node(NodeDefinition::new("a", "httpEndpoint", "A"));
        workflow.add_node(NodeDefinition::new("b", "logMessage", "B"));
        workflow.add_edge(EdgeDefinition::new("e1", "a", "b")).unwrap();
        workflow
    }

    fn paths(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.path.as_str()).collect()
    }

    #[test]
    fn test_valid_workflow() {
        let issues = validate_workflow(&make_workflow(), None);
        assert!(issues.is_empty(), "{:?}", issues);
        assert!(!has_errors(&issues));
    }

    #[test]
    fn test_dangling_and_self_loop_edges() {
        let mut workflow = make_workflow();
        workflow.edges.push(EdgeDefinition::new("e2", "b", "ghost"));
        workflow.edges.push(EdgeDefinition::new("e3", "b", "b"));
        workflow.edges.push(EdgeDefinition::new("e1", "a", "b"));

        let issues = validate_workflow(&workflow, None);
        assert!(has_errors(&issues));
        assert!(paths(&issues).contains(&"edges[1].target"));
        assert!(paths(&issues).contains(&"edges[2]"));
        assert!(paths(&issues).contains(&"edges[3].id"));
    }

    #[test]
    fn test_node_key_mismatch() {
        let mut workflow = make_workflow();
        workflow
            .nodes
            .insert("c".to_string(), NodeDefinition::new("other", "noOp", "C"));
        workflow
            .nodes
            .insert("d".to_string(), NodeDefinition::new("", "noOp", "D"));

        let issues = validate_workflow(&workflow, None);
        assert!(paths(&issues).contains(&"nodes.c.id"));
        assert!(paths(&issues).contains(&"nodes.d.id"));
        assert!(issues.iter().all(|i| i.is_error()));
    }

    #[test]
    fn test_fallback_requires_value() {
        let mut workflow = make_workflow();
        let node = workflow.nodes.get_mut("b").unwrap();
        node.on_error = Some(OnErrorPolicy::Fallback);
        let issues = validate_workflow(&workflow, None);
        assert_eq!(paths(&issues), vec!["nodes.b.fallbackValue"]);

        let node = workflow.nodes.get_mut("b").unwrap();
        node.fallback_value = Some(json!({"ok": false}));
        assert!(validate_workflow(&workflow, None).is_empty());
    }

    #[test]
    fn test_zero_timeout_and_cache() {
        let mut workflow = make_workflow();
        let node = workflow.nodes.get_mut("b").unwrap();
        node.timeout = Some(0);
        node.cache = Some(json!({"ttl": 60}));

        let issues = validate_workflow(&workflow, None);
        let timeout = issues.iter().find(|i| i.path == "nodes.b.timeout").unwrap();
        assert_eq!(timeout.severity, Severity::Error);
        let cache = issues.iter().find(|i| i.path == "nodes.b.cache").unwrap();
        assert_eq!(cache.severity, Severity::Warning);
    }

    #[test]
    fn test_unknown_trigger_type() {
        let mut workflow = make_workflow();
        workflow.trigger.trigger_type = "logMessage".to_string();
        let issues = validate_workflow(&workflow, None);
        assert_eq!(paths(&issues), vec!["trigger.type"]);
    }

    #[test]
    fn test_trigger_method_must_be_known() {
        let mut workflow = make_workflow();
        workflow.trigger.config.insert("method".to_string(), json!(" patch "));
        assert!(validate_workflow(&workflow, None).is_empty());

        workflow.trigger.config.insert("method".to_string(), json!("GETT"));
        let issues = validate_workflow(&workflow, None);
        assert_eq!(paths(&issues), vec!["trigger.config.method"]);
        assert!(issues[0].is_error());
        assert!(issues[0].message.contains("\"GETT\""));

        workflow.trigger.config.insert("method".to_string(), json!(7));
        assert_eq!(paths(&validate_workflow(&workflow, None)), vec!["trigger.config.method"]);
    }

    #[test]
    fn test_registry_type_checks() {
        let mut registry = NodeRegistry::new();
        registry.register_metadata(NodeMetadata::new(NodeType::HttpEndpoint, "HTTP", "Entry"));
        registry.register_metadata(NodeMetadata::new(NodeType::Loop, "Loop", "Iterate").stub());

        let mut workflow = make_workflow();
        workflow.add_node(NodeDefinition::new("c", "loop", "C"));
        workflow.add_edge(EdgeDefinition::new("e2", "b", "c")).unwrap();

        let issues = validate_workflow(&workflow, Some(&registry));
        let b = issues.iter().find(|i| i.path == "nodes.b.type").unwrap();
        assert_eq!(b.severity, Severity::Error);
        let c = issues.iter().find(|i| i.path == "nodes.c.type").unwrap();
        assert_eq!(c.severity, Severity::Warning);
    }

    #[test]
    fn test_manifest_paths_are_prefixed() {
        let mut manifest = Manifest::default();
        let mut workflow = make_workflow();
        workflow.id = "renamed".to_string();
        workflow.edges.push(EdgeDefinition::new("e9", "a", "nowhere"));
        manifest.workflows.insert("wf".to_string(), workflow);

        let issues = validate_manifest(&manifest, None);
        assert!(paths(&issues).contains(&"workflows.wf.id"));
        assert!(paths(&issues).contains(&"workflows.wf.edges[1].target"));
        assert_eq!(
            issues[0].to_string(),
            "error at workflows.wf.id: Workflow id 'renamed' does not match its key 'wf'"
        );
    }

    #[test]
    fn test_empty_workflow_warns() {
        let workflow = WorkflowDefinition::new("empty", "Empty");
        let issues = validate_workflow(&workflow, None);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }
}
