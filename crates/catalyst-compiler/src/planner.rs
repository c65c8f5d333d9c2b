//! Execution planning
//!
//! Orders the nodes of a workflow with Kahn's algorithm and records, for
//! every node, the incoming edges that can activate it at run time. The
//! generated program walks the plan sequentially and evaluates the gates.

use std::collections::{BTreeMap, HashMap, VecDeque};

use catalyst_core::{CompileError, NodeType, Result, WorkflowDefinition};
use serde::{Deserialize, Serialize};

/// An incoming edge that can activate a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeGate {
    pub edge_id: String,
    pub source: String,
    /// Branch the source must have chosen; set for branching sources only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Expression that must be truthy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// One node in execution order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedStep {
    pub node_id: String,
    /// Empty for roots, which always run
    pub gates: Vec<EdgeGate>,
}

impl PlannedStep {
    pub fn is_root(&self) -> bool {
        self.gates.is_empty()
    }
}

/// Sequential schedule for a workflow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    pub steps: Vec<PlannedStep>,
    pub warnings: Vec<String>,
}

impl ExecutionPlan {
    /// Node ids in execution order
    pub fn order(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.node_id.as_str()).collect()
    }

    /// Index of a node in the schedule
    pub fn position(&self, node_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.node_id == node_id)
    }
}

/// Plan the execution order of a workflow
///
/// Roots are taken in node-id order. When a node is scheduled its outgoing
/// edges are followed in declaration order, and a target becomes ready once
/// every one of its predecessors is scheduled.
pub fn plan_execution(workflow: &WorkflowDefinition) -> Result<ExecutionPlan> {
    let mut in_degree: BTreeMap<&str, usize> =
        workflow.nodes.keys().map(|id| (id.as_str(), 0)).collect();
    let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();

    for edge in &workflow.edges {
        for endpoint in [&edge.source, &edge.target] {
            if !workflow.nodes.contains_key(endpoint) {
                return Err(CompileError::DanglingEdge {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
        outgoing.entry(edge.source.as_str()).or_default().push(edge.target.as_str());
        if let Some(count) = in_degree.get_mut(edge.target.as_str()) {
            *count += 1;
        }
    }

    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut order: Vec<&str> = Vec::with_capacity(workflow.nodes.len());

    while let Some(node_id) = queue.pop_front() {
        order.push(node_id);
        for target in outgoing.get(node_id).into_iter().flatten() {
            if let Some(count) = in_degree.get_mut(target) {
                *count -= 1;
                if *count == 0 {
                    queue.push_back(*target);
                }
            }
        }
    }

    if order.len() != workflow.nodes.len() {
        let remaining: Vec<String> = in_degree
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(id, _)| id.to_string())
            .collect();
        return Err(CompileError::CycleDetected(remaining));
    }

    let steps = order
        .into_iter()
        .map(|node_id| PlannedStep {
            node_id: node_id.to_string(),
            gates: gates_for(workflow, node_id),
        })
        .collect();

    let mut warnings = Vec::new();
    if workflow.nodes.len() > 1 {
        for node_id in workflow.nodes.keys() {
            let connected = workflow
                .edges
                .iter()
                .any(|e| &e.source == node_id || &e.target == node_id);
            if !connected {
                warnings.push(format!(
                    "Node '{}' is not connected to any other node; it runs as a root",
                    node_id
                ));
            }
        }
    }

    log::debug!(
        "Planned workflow '{}': {} step(s), {} warning(s)",
        workflow.id,
        workflow.nodes.len(),
        warnings.len()
    );

    Ok(ExecutionPlan { steps, warnings })
}

fn gates_for(workflow: &WorkflowDefinition, node_id: &str) -> Vec<EdgeGate> {
    workflow
        .incoming_edges(node_id)
        .map(|edge| {
            let branching = workflow
                .find_node(&edge.source)
                .and_then(|n| NodeType::from_name(&n.node_type))
                .is_some_and(|t| t.is_branching());
            EdgeGate {
                edge_id: edge.id.clone(),
                source: edge.source.clone(),
                branch: if branching {
                    edge.source_handle.clone().filter(|h| !h.is_empty())
                } else {
                    None
                },
                condition: edge.condition.clone().filter(|c| !c.trim().is_empty()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalyst_core::{EdgeDefinition, WorkflowBuilder};

    #[test]
    fn test_linear_order() {
        let workflow = WorkflowBuilder::new("wf", "Linear")
            .add_node("c", "noOp", "C")
            .add_node("a", "httpEndpoint", "A")
            .add_node("b", "logMessage", "B")
            .add_edge("a", "b")
            .add_edge("b", "c")
            .build();

        let plan = plan_execution(&workflow).unwrap();
        assert_eq!(plan.order(), vec!["a", "b", "c"]);
        assert!(plan.steps[0].is_root());
        assert_eq!(plan.steps[1].gates[0].source, "a");
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn test_diamond_waits_for_all_predecessors() {
        let workflow = WorkflowBuilder::new("wf", "Diamond")
            .add_node("start", "httpEndpoint", "Start")
            .add_node("left", "noOp", "Left")
            .add_node("right", "noOp", "Right")
            .add_node("join", "noOp", "Join")
            .add_edge("start", "right")
            .add_edge("start", "left")
            .add_edge("left", "join")
            .add_edge("right", "join")
            .build();

        let plan = plan_execution(&workflow).unwrap();
        // Outgoing edges are followed in declaration order
        assert_eq!(plan.order(), vec!["start", "right", "left", "join"]);
        assert_eq!(plan.steps[3].gates.len(), 2);
    }

    #[test]
    fn test_roots_in_id_order() {
        let workflow = WorkflowBuilder::new("wf", "Roots")
            .add_node("zeta", "noOp", "Z")
            .add_node("alpha", "noOp", "A")
            .add_node("mid", "noOp", "M")
            .add_edge("zeta", "mid")
            .add_edge("alpha", "mid")
            .build();

        let plan = plan_execution(&workflow).unwrap();
        assert_eq!(plan.order(), vec!["alpha", "zeta", "mid"]);
    }

    #[test]
    fn test_branch_gates() {
        let workflow = WorkflowBuilder::new("wf", "Branch")
            .add_node("check", "condition", "Check")
            .add_node("yes", "logMessage", "Yes")
            .add_node("no", "logMessage", "No")
            .add_node("after", "noOp", "After")
            .add_branch_edge("check", "true", "yes")
            .add_branch_edge("check", "false", "no")
            .add_conditional_edge("yes", "after", "{{ input.more }}")
            .build();

        let plan = plan_execution(&workflow).unwrap();
        let yes = &plan.steps[plan.position("yes").unwrap()];
        assert_eq!(yes.gates[0].branch.as_deref(), Some("true"));
        let no = &plan.steps[plan.position("no").unwrap()];
        assert_eq!(no.gates[0].branch.as_deref(), Some("false"));

        let after = &plan.steps[plan.position("after").unwrap()];
        assert_eq!(after.gates[0].branch, None);
        assert_eq!(after.gates[0].condition.as_deref(), Some("{{ input.more }}"));
    }

    #[test]
    fn test_handle_ignored_for_plain_source() {
        let workflow = WorkflowBuilder::new("wf", "Handles")
            .add_node("a", "noOp", "A")
            .add_node("b", "noOp", "B")
            .add_branch_edge("a", "output", "b")
            .build();

        let plan = plan_execution(&workflow).unwrap();
        assert_eq!(plan.steps[1].gates[0].branch, None);
    }

    #[test]
    fn test_cycle_detected() {
        let workflow = WorkflowBuilder::new("wf", "Cycle")
            .add_node("start", "httpEndpoint", "Start")
            .add_node("a", "noOp", "A")
            .add_node("b", "noOp", "B")
            .add_edge("start", "a")
            .add_edge("a", "b")
            .add_edge("b", "a")
            .build();

        let err = plan_execution(&workflow).unwrap_err();
        match err {
            CompileError::CycleDetected(nodes) => assert_eq!(nodes, vec!["a", "b"]),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_orphan_warning() {
        let workflow = WorkflowBuilder::new("wf", "Orphan")
            .add_node("a", "httpEndpoint", "A")
            .add_node("b", "noOp", "B")
            .add_node("lonely", "logMessage", "Lonely")
            .add_edge("a", "b")
            .build();

        let plan = plan_execution(&workflow).unwrap();
        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].contains("'lonely'"));
        assert!(plan.steps[plan.position("lonely").unwrap()].is_root());

        let single = WorkflowBuilder::new("wf", "Single").add_node("only", "noOp", "Only").build();
        assert!(plan_execution(&single).unwrap().warnings.is_empty());
    }

    #[test]
    fn test_dangling_edge() {
        let mut workflow = WorkflowBuilder::new("wf", "Dangling").add_node("a", "noOp", "A").build();
        workflow.edges.push(EdgeDefinition::new("e1", "a", "ghost"));

        let err = plan_execution(&workflow).unwrap_err();
        assert!(matches!(err, CompileError::DanglingEdge { ref node_id, .. } if node_id == "ghost"));
    }
}
