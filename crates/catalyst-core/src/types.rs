//! Core types for workflow manifests
//!
//! These types mirror the manifest the editor persists: a project holds
//! workflows, a workflow holds nodes and edges. The compiler only reads them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CompileError, Result};

/// Unique identifier for a node (unique within its workflow)
pub type NodeId = String;

/// Unique identifier for an edge
pub type EdgeId = String;

/// Category of a node type, used for palette grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    /// Entry events (HTTP calls, schedules, ...)
    Trigger,
    /// LLM calls, prompts, embeddings
    Ai,
    /// Databases and storage
    Data,
    /// Branching, delays, flow control
    Control,
    /// Reshaping data between nodes
    Transform,
    /// Calls to external services
    Integration,
    /// Logging, variables, responses
    Utility,
}

impl NodeCategory {
    pub fn label(&self) -> &'static str {
        match self {
            NodeCategory::Trigger => "Triggers",
            NodeCategory::Ai => "AI",
            NodeCategory::Data => "Data",
            NodeCategory::Control => "Control Flow",
            NodeCategory::Transform => "Transform",
            NodeCategory::Integration => "Integrations",
            NodeCategory::Utility => "Utilities",
        }
    }
}

macro_rules! define_node_types {
    ( $( $variant:ident => $name:literal, $category:ident; )* ) => {
        /// Every node kind the editor can place on the canvas.
        ///
        /// Serialized with the manifest's camelCase identifiers.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum NodeType {
            $( #[serde(rename = $name)] $variant, )*
        }

        impl NodeType {
            /// All node types in palette order
            pub const ALL: &'static [NodeType] = &[ $( NodeType::$variant, )* ];

            /// Manifest identifier (e.g. `"promptTemplate"`)
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( NodeType::$variant => $name, )*
                }
            }

            /// Palette category
            pub fn category(&self) -> NodeCategory {
                match self {
                    $( NodeType::$variant => NodeCategory::$category, )*
                }
            }

            /// Look up a node type by its manifest identifier
            pub fn from_name(name: &str) -> Option<NodeType> {
                match name {
                    $( $name => Some(NodeType::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

define_node_types! {
    HttpEndpoint => "httpEndpoint", Trigger;
    WebhookTrigger => "webhookTrigger", Trigger;
    ManualTrigger => "manualTrigger", Trigger;
    ScheduleTrigger => "scheduleTrigger", Trigger;
    EmailTrigger => "emailTrigger", Trigger;
    QueueTrigger => "queueTrigger", Trigger;
    FileWatchTrigger => "fileWatchTrigger", Trigger;

    PromptTemplate => "promptTemplate", Ai;
    AnthropicCompletion => "anthropicCompletion", Ai;
    OpenaiCompletion => "openaiCompletion", Ai;
    GroqCompletion => "groqCompletion", Ai;
    GeminiCompletion => "geminiCompletion", Ai;
    OllamaCompletion => "ollamaCompletion", Ai;
    EmbeddingGenerate => "embeddingGenerate", Ai;
    TextClassifier => "textClassifier", Ai;
    AgentTool => "agentTool", Ai;
    VectorSearch => "vectorSearch", Ai;

    PostgresQuery => "postgresQuery", Data;
    SqliteQuery => "sqliteQuery", Data;
    MysqlQuery => "mysqlQuery", Data;
    MongoQuery => "mongoQuery", Data;
    RedisGet => "redisGet", Data;
    RedisSet => "redisSet", Data;
    S3Upload => "s3Upload", Data;
    S3Download => "s3Download", Data;
    VectorUpsert => "vectorUpsert", Data;

    Condition => "condition", Control;
    Switch => "switch", Control;
    Delay => "delay", Control;
    StopAndError => "stopAndError", Control;
    Loop => "loop", Control;
    Parallel => "parallel", Control;
    Aggregate => "aggregate", Control;
    Merge => "merge", Control;
    SubWorkflow => "subWorkflow", Control;

    EditFields => "editFields", Transform;
    JsonTransform => "jsonTransform", Transform;
    FilterArray => "filterArray", Transform;
    SplitText => "splitText", Transform;
    RegexExtract => "regexExtract", Transform;
    MapArray => "mapArray", Transform;
    SortArray => "sortArray", Transform;
    MergeObjects => "mergeObjects", Transform;
    DateFormat => "dateFormat", Transform;
    CodeSnippet => "codeSnippet", Transform;

    HttpRequest => "httpRequest", Integration;
    SendEmail => "sendEmail", Integration;
    SlackMessage => "slackMessage", Integration;
    DiscordMessage => "discordMessage", Integration;
    GithubIssue => "githubIssue", Integration;
    GraphqlRequest => "graphqlRequest", Integration;

    LogMessage => "logMessage", Utility;
    SetVariable => "setVariable", Utility;
    HttpResponse => "httpResponse", Utility;
    NoOp => "noOp", Utility;
    RandomValue => "randomValue", Utility;
}

impl NodeType {
    /// Branching nodes pick an outgoing handle at run time
    pub fn is_branching(&self) -> bool {
        matches!(self, NodeType::Condition | NodeType::Switch)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to the execution when a node fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnErrorPolicy {
    /// Abort the whole execution
    #[default]
    Throw,
    /// Record the error, store a null result and keep going
    Continue,
    /// Record the error and use the node's `fallbackValue`
    Fallback,
}

impl OnErrorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnErrorPolicy::Throw => "throw",
            OnErrorPolicy::Continue => "continue",
            OnErrorPolicy::Fallback => "fallback",
        }
    }
}

/// Canvas position. Ignored by the compiler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A node instance in a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDefinition {
    /// Unique identifier within the workflow
    pub id: NodeId,
    /// Node type identifier, resolved through the registry
    #[serde(rename = "type")]
    pub node_type: String,
    /// Display name (user-editable, not unique)
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub position: Position,
    /// Type-specific configuration
    #[serde(default)]
    pub config: Map<String, Value>,
    /// Per-attempt timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Extra attempts after the first failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    /// Reserved; not consumed by code generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<OnErrorPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_value: Option<Value>,
    /// Result to use instead of running the node in test mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_data: Option<Value>,
}

impl NodeDefinition {
    /// Create a node with empty configuration
    pub fn new(id: impl Into<String>, node_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            name: name.into(),
            description: None,
            position: Position::default(),
            config: Map::new(),
            timeout: None,
            retries: None,
            cache: None,
            on_error: None,
            fallback_value: None,
            pinned_data: None,
        }
    }

    /// Replace the configuration; non-object values are ignored
    pub fn with_config(mut self, config: Value) -> Self {
        if let Value::Object(map) = config {
            self.config = map;
        }
        self
    }

    /// Get a string config value
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(Value::as_str)
    }

    /// Get a boolean config value
    pub fn config_bool(&self, key: &str) -> Option<bool> {
        self.config.get(key).and_then(Value::as_bool)
    }
}

/// A directed link between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDefinition {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// Output port on the source; selects a branch for branching nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    /// `{{ }}` expression that must be truthy for the target to run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl EdgeDefinition {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
            condition: None,
        }
    }
}

/// The entry event of a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerDefinition {
    #[serde(rename = "type")]
    pub trigger_type: String,
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl Default for TriggerDefinition {
    fn default() -> Self {
        Self {
            trigger_type: NodeType::HttpEndpoint.as_str().to_string(),
            config: Map::new(),
        }
    }
}

impl TriggerDefinition {
    /// HTTP method for the production route (defaults to POST)
    pub fn http_method(&self) -> String {
        self.config
            .get("method")
            .and_then(Value::as_str)
            .map(|m| m.trim().to_uppercase())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "POST".to_string())
    }
}

/// One field of the workflow's input schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputField {
    /// `string`, `number`, `integer`, `boolean`, `object` or `array`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Which value the workflow returns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    /// Expression such as `nodes.respond.body`; defaults to the last node's result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Workflow-wide defaults applied to nodes that do not set their own
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<OnErrorPolicy>,
}

/// A complete workflow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub trigger: TriggerDefinition,
    #[serde(default)]
    pub input: BTreeMap<String, InputField>,
    #[serde(default)]
    pub output: OutputSpec,
    #[serde(default)]
    pub nodes: BTreeMap<NodeId, NodeDefinition>,
    #[serde(default)]
    pub edges: Vec<EdgeDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_config: Option<ExecutionConfig>,
}

impl WorkflowDefinition {
    /// Create a new empty workflow
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            trigger: TriggerDefinition::default(),
            input: BTreeMap::new(),
            output: OutputSpec::default(),
            nodes: BTreeMap::new(),
            edges: Vec::new(),
            execution_config: None,
        }
    }

    /// Find a node by ID
    pub fn find_node(&self, id: &str) -> Option<&NodeDefinition> {
        self.nodes.get(id)
    }

    /// Get edges coming into a node
    pub fn incoming_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a EdgeDefinition> + 'a {
        self.edges.iter().filter(move |e| e.target == node_id)
    }

    /// Get edges going out of a node
    pub fn outgoing_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a EdgeDefinition> + 'a {
        self.edges.iter().filter(move |e| e.source == node_id)
    }

    /// Get the IDs of nodes that this node depends on (upstream nodes)
    pub fn get_dependencies(&self, node_id: &str) -> Vec<NodeId> {
        self.incoming_edges(node_id).map(|e| e.source.clone()).collect()
    }

    /// Get the IDs of nodes that depend on this node (downstream nodes)
    pub fn get_dependents(&self, node_id: &str) -> Vec<NodeId> {
        self.outgoing_edges(node_id).map(|e| e.target.clone()).collect()
    }

    /// Insert or replace a node, keyed by its id
    pub fn add_node(&mut self, node: NodeDefinition) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Add an edge; both endpoints must already exist
    pub fn add_edge(&mut self, edge: EdgeDefinition) -> Result<()> {
        for endpoint in [&edge.source, &edge.target] {
            if !self.nodes.contains_key(endpoint) {
                return Err(CompileError::DanglingEdge {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Remove a node and every edge touching it.
    ///
    /// Returns the removed node and the edges that went with it.
    pub fn remove_node(&mut self, node_id: &str) -> Option<(NodeDefinition, Vec<EdgeDefinition>)> {
        let node = self.nodes.remove(node_id)?;
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|e| e.source == node_id || e.target == node_id);
        self.edges = kept;
        log::debug!(
            "Removed node '{}' from workflow '{}' with {} edge(s)",
            node_id,
            self.id,
            removed.len()
        );
        Some((node, removed))
    }

    /// Remove an edge by ID
    pub fn remove_edge(&mut self, edge_id: &str) -> Option<EdgeDefinition> {
        let pos = self.edges.iter().position(|e| e.id == edge_id)?;
        Some(self.edges.remove(pos))
    }

    /// Effective per-node policy after applying workflow defaults
    pub fn effective_on_error(&self, node: &NodeDefinition) -> OnErrorPolicy {
        node.on_error
            .or_else(|| self.execution_config.as_ref().and_then(|c| c.on_error))
            .unwrap_or_default()
    }

    /// Effective per-attempt timeout in milliseconds
    pub fn effective_timeout(&self, node: &NodeDefinition) -> Option<u64> {
        node.timeout
            .or_else(|| self.execution_config.as_ref().and_then(|c| c.timeout))
    }

    /// Effective retry count
    pub fn effective_retries(&self, node: &NodeDefinition) -> u32 {
        node.retries
            .or_else(|| self.execution_config.as_ref().and_then(|c| c.retries))
            .unwrap_or(0)
    }
}

/// Project-level target configuration from the manifest's `config` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    /// Target runtime (only `python` is generated)
    pub runtime: String,
    /// Web framework for production mode (only `fastapi` is generated)
    pub framework: String,
    /// Default bind address of the generated service
    pub host: String,
    /// Default port of the generated service
    pub port: u16,
    /// Minimum Python version the generated program targets
    pub python_version: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            runtime: "python".to_string(),
            framework: "fastapi".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            python_version: "3.10".to_string(),
        }
    }
}

/// A project's full workflow set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Manifest schema version
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub config: ProjectConfig,
    /// Secret name -> environment variable that holds its value
    #[serde(default)]
    pub secrets: BTreeMap<String, String>,
    #[serde(default)]
    pub global_variables: Map<String, Value>,
    #[serde(default)]
    pub workflows: BTreeMap<String, WorkflowDefinition>,
}

impl Manifest {
    /// Parse a manifest from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Look up a workflow by id
    pub fn workflow(&self, id: &str) -> Result<&WorkflowDefinition> {
        self.workflows
            .get(id)
            .ok_or_else(|| CompileError::WorkflowNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_node_workflow() -> WorkflowDefinition {
        let mut workflow = WorkflowDefinition::new("wf", "Test");
        workflow.add_node(NodeDefinition::new("a", "httpEndpoint", "A"));
        workflow.add_node(NodeDefinition::new("b", "logMessage", "B"));
        workflow.add_node(NodeDefinition::new("c", "noOp", "C"));
        workflow.add_edge(EdgeDefinition::new("e1", "a", "b")).unwrap();
        workflow.add_edge(EdgeDefinition::new("e2", "b", "c")).unwrap();
        workflow.add_edge(EdgeDefinition::new("e3", "a", "c")).unwrap();
        workflow
    }

    #[test]
    fn test_node_type_round_trip_names() {
        assert_eq!(NodeType::ALL.len(), 56);
        for node_type in NodeType::ALL {
            assert_eq!(NodeType::from_name(node_type.as_str()), Some(*node_type));
        }
        assert_eq!(NodeType::from_name("notARealNode"), None);
    }

    #[test]
    fn test_node_type_serialization() {
        let json = serde_json::to_string(&NodeType::PromptTemplate).unwrap();
        assert_eq!(json, "\"promptTemplate\"");
        let parsed: NodeType = serde_json::from_str("\"httpEndpoint\"").unwrap();
        assert_eq!(parsed, NodeType::HttpEndpoint);
    }

    #[test]
    fn test_remove_node_cascades_edges() {
        let mut workflow = two_node_workflow();
        let (node, removed) = workflow.remove_node("b").unwrap();
        assert_eq!(node.id, "b");
        assert_eq!(removed.len(), 2);
        assert_eq!(workflow.edges.len(), 1);
        assert!(workflow
            .edges
            .iter()
            .all(|e| workflow.nodes.contains_key(&e.source) && workflow.nodes.contains_key(&e.target)));
        assert!(workflow.remove_node("b").is_none());
    }

    #[test]
    fn test_add_edge_rejects_unknown_node() {
        let mut workflow = two_node_workflow();
        let err = workflow
            .add_edge(EdgeDefinition::new("bad", "a", "ghost"))
            .unwrap_err();
        assert!(matches!(err, CompileError::DanglingEdge { ref node_id, .. } if node_id == "ghost"));
        assert_eq!(workflow.edges.len(), 3);
    }

    #[test]
    fn test_dependencies() {
        let workflow = two_node_workflow();
        assert_eq!(workflow.get_dependencies("c"), vec!["b", "a"]);
        assert_eq!(workflow.get_dependents("a"), vec!["b", "c"]);
    }

    #[test]
    fn test_manifest_parsing_defaults() {
        let manifest = Manifest::from_json(
            &json!({
                "version": "1.0",
                "workflows": {
                    "hello": {
                        "id": "hello",
                        "name": "Hello",
                        "trigger": {"type": "httpEndpoint", "config": {"method": "get"}},
                        "nodes": {
                            "n1": {
                                "id": "n1",
                                "type": "promptTemplate",
                                "name": "Prompt",
                                "position": {"x": 10.0, "y": 20.0},
                                "config": {"template": "Hi"},
                                "onError": "continue"
                            }
                        },
                        "edges": []
                    }
                }
            })
            .to_string(),
        )
        .unwrap();

        assert_eq!(manifest.config, ProjectConfig::default());
        let workflow = manifest.workflow("hello").unwrap();
        assert_eq!(workflow.trigger.http_method(), "GET");
        let node = workflow.find_node("n1").unwrap();
        assert_eq!(node.config_str("template"), Some("Hi"));
        assert_eq!(workflow.effective_on_error(node), OnErrorPolicy::Continue);
        assert!(matches!(
            manifest.workflow("missing"),
            Err(CompileError::WorkflowNotFound(_))
        ));
    }

    #[test]
    fn test_execution_config_defaults_apply() {
        let mut workflow = two_node_workflow();
        workflow.execution_config = Some(ExecutionConfig {
            timeout: Some(3000),
            retries: Some(2),
            on_error: Some(OnErrorPolicy::Fallback),
        });
        let mut node = NodeDefinition::new("x", "noOp", "X");
        assert_eq!(workflow.effective_timeout(&node), Some(3000));
        assert_eq!(workflow.effective_retries(&node), 2);
        node.retries = Some(0);
        node.on_error = Some(OnErrorPolicy::Throw);
        assert_eq!(workflow.effective_retries(&node), 0);
        assert_eq!(workflow.effective_on_error(&node), OnErrorPolicy::Throw);
    }
}
