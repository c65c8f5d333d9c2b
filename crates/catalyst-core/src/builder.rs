//! Fluent builder for workflow definitions
//!
//! Provides a fluent API for constructing workflows programmatically, mainly
//! for tests and tooling. Edges are recorded as given; run
//! `validate_workflow` on the result to check references.

use serde_json::Value;

use crate::types::{
    EdgeDefinition, ExecutionConfig, InputField, NodeDefinition, OnErrorPolicy, TriggerDefinition,
    WorkflowDefinition,
};

/// Fluent builder for constructing workflow definitions
///
/// # Example
///
/// ```ignore
/// let workflow = WorkflowBuilder::new("wf-1", "Branching")
///     .add_node("check", "condition", "Check")
///     .with_config(serde_json::json!({"condition": "{{ input.ok }}"}))
///     .add_node("yes", "logMessage", "Yes")
///     .add_node("no", "logMessage", "No")
///     .add_branch_edge("check", "true", "yes")
///     .add_branch_edge("check", "false", "no")
///     .build();
/// ```
pub struct WorkflowBuilder {
    id: String,
    name: String,
    trigger: TriggerDefinition,
    input: Vec<(String, InputField)>,
    output_source: Option<String>,
    nodes: Vec<NodeDefinition>,
    edges: Vec<EdgeDefinition>,
    execution_config: Option<ExecutionConfig>,
    edge_counter: usize,
}

impl WorkflowBuilder {
    /// Create a new workflow builder
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            trigger: TriggerDefinition::default(),
            input: Vec::new(),
            output_source: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            execution_config: None,
            edge_counter: 0,
        }
    }

    /// Set the trigger type and configuration
    pub fn with_trigger(mut self, trigger_type: impl Into<String>, config: Value) -> Self {
        self.trigger.trigger_type = trigger_type.into();
        if let Value::Object(map) = config {
            self.trigger.config = map;
        }
        self
    }

    /// Declare an input field
    pub fn with_input(mut self, name: impl Into<String>, field_type: &str, required: bool) -> Self {
        self.input.push((
            name.into(),
            InputField {
                field_type: Some(field_type.to_string()),
                required,
                ..Default::default()
            },
        ));
        self
    }

    /// Set the workflow's output expression
    pub fn with_output(mut self, source: impl Into<String>) -> Self {
        self.output_source = Some(source.into());
        self
    }

    pub fn with_execution_config(mut self, config: ExecutionConfig) -> Self {
        self.execution_config = Some(config);
        self
    }

    /// Add a node to the workflow
    pub fn add_node(
        mut self,
        id: impl Into<String>,
        node_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.nodes.push(NodeDefinition::new(id, node_type, name));
        self
    }

    /// Set configuration on the most recently added node
    ///
    /// Must be called immediately after `add_node`.
    pub fn with_config(mut self, config: Value) -> Self {
        if let Some(node) = self.nodes.pop() {
            self.nodes.push(node.with_config(config));
        }
        self
    }

    /// Set the error policy on the most recently added node
    pub fn with_on_error(mut self, policy: OnErrorPolicy, fallback: Option<Value>) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.on_error = Some(policy);
            node.fallback_value = fallback;
        }
        self
    }

    /// Pin a test-mode result on the most recently added node
    pub fn with_pinned_data(mut self, data: Value) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.pinned_data = Some(data);
        }
        self
    }

    /// Add an edge between two nodes (auto-generates edge ID)
    pub fn add_edge(self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.push_edge(source, target, None, None)
    }

    /// Add an edge leaving a branching node through `handle`
    pub fn add_branch_edge(
        self,
        source: impl Into<String>,
        handle: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.push_edge(source, target, Some(handle.into()), None)
    }

    /// Add an edge that is only followed when `condition` is truthy
    pub fn add_conditional_edge(
        self,
        source: impl Into<String>,
        target: impl Into<String>,
        condition: impl Into<String>,
    ) -> Self {
        self.push_edge(source, target, None, Some(condition.into()))
    }

    /// Add an edge with an explicit ID
    pub fn add_edge_with_id(
        mut self,
        edge_id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.edges.push(EdgeDefinition::new(edge_id, source, target));
        self
    }

    fn push_edge(
        mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        source_handle: Option<String>,
        condition: Option<String>,
    ) -> Self {
        self.edge_counter += 1;
        let mut edge = EdgeDefinition::new(format!("edge-{}", self.edge_counter), source, target);
        edge.source_handle = source_handle;
        edge.condition = condition;
        self.edges.push(edge);
        self
    }

    /// Build the workflow without validation
    pub fn build(self) -> WorkflowDefinition {
        let mut workflow = WorkflowDefinition::new(self.id, self.name);
        workflow.trigger = self.trigger;
        workflow.input = self.input.into_iter().collect();
        workflow.output.source = self.output_source;
        workflow.execution_config = self.execution_config;
        for node in self.nodes {
            workflow.add_node(node);
        }
        workflow.edges = self.edges;
        workflow
    }
}
