//! Compile-time expression checks
//!
//! Runs the `{{ }}` scanner over node configuration, edge conditions and the
//! workflow output before any code is produced. Nothing here fails a
//! compilation; findings become warnings on the generation result.

use std::collections::BTreeSet;

use catalyst_core::expression::{placeholders, root_name, FIXED_ROOTS};
use catalyst_core::{FieldKind, NodeRegistry, NodeType, WorkflowDefinition};
use serde_json::Value;

use crate::planner::ExecutionPlan;

/// Roots bound per item by nodes that evaluate expressions in a loop
const ITEM_ROOTS: &[&str] = &["item", "index"];

/// Collect placeholder expressions from every string inside a value
fn collect_expressions(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(text) => {
            out.extend(placeholders(text).into_iter().map(str::to_string));
        }
        Value::Array(items) => items.iter().for_each(|item| collect_expressions(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_expressions(item, out)),
        _ => {}
    }
}

/// Node id addressed through the `nodes` root (`nodes.fetch.body` -> `fetch`)
fn nodes_member(expression: &str) -> Option<&str> {
    let member = expression.trim().split('.').nth(1)?;
    let member = member.split('[').next().unwrap_or("");
    (!member.is_empty()).then_some(member)
}

struct Checker<'a> {
    workflow: &'a WorkflowDefinition,
    plan: &'a ExecutionPlan,
    warnings: Vec<String>,
}

impl<'a> Checker<'a> {
    fn warn(&mut self, message: String) {
        if !self.warnings.contains(&message) {
            self.warnings.push(message);
        }
    }

    /// Check one expression; `before` is the plan index the referenced nodes
    /// must precede, if any
    fn check(&mut self, subject: &str, expression: &str, before: Option<usize>) {
        let root = root_name(expression);
        let referenced = if root == "nodes" {
            match nodes_member(expression) {
                Some(member) => member,
                None => return,
            }
        } else if FIXED_ROOTS.contains(&root) {
            return;
        } else if self.workflow.nodes.contains_key(root) {
            root
        } else {
            self.warn(format!(
                "{} references unknown variable '{}' in {{{{ {} }}}}",
                subject, root, expression
            ));
            return;
        };

        match self.plan.position(referenced) {
            None => self.warn(format!(
                "{} references node '{}', which does not exist",
                subject, referenced
            )),
            Some(position) if before.is_some_and(|limit| position >= limit) => self.warn(format!(
                "{} references node '{}', which does not run before it",
                subject, referenced
            )),
            Some(_) => {}
        }
    }
}

/// Static checks over every expression in a planned workflow
///
/// Reports placeholders whose root is unknown, references to nodes that are
/// not scheduled before the referencing node, and config `variables`
/// entries that no template of the node uses.
pub fn analyze_workflow(
    workflow: &WorkflowDefinition,
    plan: &ExecutionPlan,
    registry: &NodeRegistry,
) -> Vec<String> {
    let mut checker = Checker {
        workflow,
        plan,
        warnings: Vec::new(),
    };

    for (index, step) in plan.steps.iter().enumerate() {
        let Some(node) = workflow.find_node(&step.node_id) else {
            continue;
        };
        let node_type = NodeType::from_name(&node.node_type);
        let metadata = node_type.and_then(|t| registry.get_metadata(t));
        let local_roots: &[&str] = if node_type == Some(NodeType::FilterArray) {
            ITEM_ROOTS
        } else {
            &[]
        };
        let variables: Vec<&str> = node
            .config
            .get("variables")
            .and_then(Value::as_object)
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default();
        let subject = format!("Node '{}'", node.id);

        let mut expressions = Vec::new();
        for (key, value) in &node.config {
            if key == "variables" {
                continue;
            }
            // Code fields (SQL text, regex patterns) are never interpolated
            let is_code = metadata
                .and_then(|m| m.field(key))
                .is_some_and(|field| field.kind == FieldKind::Code);
            if !is_code {
                collect_expressions(value, &mut expressions);
            }
        }

        let mut used: BTreeSet<&str> = BTreeSet::new();
        for expression in &expressions {
            let root = root_name(expression);
            if let Some(name) = variables.iter().find(|v| **v == root) {
                used.insert(*name);
            } else if !local_roots.contains(&root) {
                checker.check(&subject, expression, Some(index));
            }
        }

        // Variable values render against the scope without the overrides
        let mut variable_expressions = Vec::new();
        if let Some(value) = node.config.get("variables") {
            collect_expressions(value, &mut variable_expressions);
        }
        for expression in &variable_expressions {
            checker.check(&subject, expression, Some(index));
        }

        for name in variables {
            if !used.contains(name) {
                checker.warn(format!(
                    "Node '{}' defines variable '{}', which none of its templates use",
                    node.id, name
                ));
            }
        }
    }

    for edge in &workflow.edges {
        let Some(condition) = edge.condition.as_deref() else {
            continue;
        };
        let before = plan.position(&edge.target);
        let subject = format!("Condition of edge '{}'", edge.id);
        for expression in placeholders(condition) {
            checker.check(&subject, expression, before);
        }
    }

    if let Some(source) = workflow.output.source.as_deref().filter(|s| !s.trim().is_empty()) {
        let expressions = if source.contains("{{") {
            placeholders(source)
        } else {
            vec![source.trim()]
        };
        for expression in expressions {
            checker.check("Workflow output", expression, None);
        }
    }

    checker.warnings
}
