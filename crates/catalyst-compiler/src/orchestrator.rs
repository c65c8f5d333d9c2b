//! Workflow compilation
//!
//! `WorkflowCompiler` drives one compilation from a workflow definition to
//! program text:
//!
//! 1. Resolve every node's type and emitter
//! 2. Validate the workflow
//! 3. Plan the execution order
//! 4. Emit one function per node and collect pip dependencies
//! 5. Check expressions statically
//! 6. Assemble the program
//!
//! Any error stops the pipeline before assembly, so a failed compile never
//! yields partial code.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use catalyst_core::{
    has_errors, validate_workflow, CompileError, EmittedNode, Manifest, NodeEmitter, NodeRegistry,
    Result, WorkflowDefinition,
};
use serde::{Deserialize, Serialize};

use crate::analysis::analyze_workflow;
use crate::config::{CompilerConfig, ProjectContext};
use crate::constants::packages;
use crate::planner::plan_execution;
use crate::slug::sanitize_workflow_name;
use crate::template::{self, section};

/// Output of a successful compilation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Slug of the workflow name; also the route and suggested file stem
    pub workflow_name: String,
    /// Complete program text
    pub code: String,
    pub node_count: usize,
    /// Pip packages, sorted and de-duplicated
    pub dependencies: Vec<String>,
    pub warnings: Vec<String>,
}

/// Compiles workflows against a node registry
///
/// Holds no mutable state; one compiler can serve any number of
/// compilations.
pub struct WorkflowCompiler<'a> {
    registry: &'a NodeRegistry,
    config: CompilerConfig,
}

impl<'a> WorkflowCompiler<'a> {
    pub fn new(registry: &'a NodeRegistry, config: CompilerConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile one workflow of a manifest, using the manifest's secrets and
    /// global variables
    pub fn compile_manifest_workflow(&self, manifest: &Manifest, workflow_id: &str) -> Result<GenerationResult> {
        let workflow = manifest.workflow(workflow_id)?;
        self.compile(workflow, &ProjectContext::from_manifest(manifest))
    }

    /// Compile a workflow into a standalone program
    pub fn compile(&self, workflow: &WorkflowDefinition, project: &ProjectContext) -> Result<GenerationResult> {
        self.config.ensure_supported()?;
        log::debug!(
            "Compiling workflow '{}' ({} nodes, {} edges)",
            workflow.id,
            workflow.nodes.len(),
            workflow.edges.len()
        );

        let emitters = self.resolve_emitters(workflow)?;

        let issues = validate_workflow(workflow, Some(self.registry));
        if has_errors(&issues) {
            let errors: Vec<_> = issues.into_iter().filter(|issue| issue.is_error()).collect();
            log::warn!("Workflow '{}' failed validation with {} error(s)", workflow.id, errors.len());
            return Err(CompileError::Validation(errors));
        }
        let mut warnings: Vec<String> = issues.iter().map(ToString::to_string).collect();

        let plan = plan_execution(workflow)?;
        warnings.extend(plan.warnings.iter().cloned());

        let mut fragments: Vec<(&str, EmittedNode)> = Vec::with_capacity(plan.steps.len());
        let mut dependencies: BTreeSet<String> = packages::SERVER.iter().map(|p| p.to_string()).collect();
        let mut function_owners: HashMap<String, &str> = HashMap::new();
        for step in &plan.steps {
            let (Some(node), Some(emitter)) = (workflow.find_node(&step.node_id), emitters.get(step.node_id.as_str())) else {
                continue;
            };
            let emitted = emitter.emit(node)?;
            if let Some(owner) = function_owners.insert(emitted.function_name.clone(), node.id.as_str()) {
                return Err(CompileError::invalid_config(
                    &node.id,
                    format!("function name '{}' collides with node '{}'", emitted.function_name, owner),
                ));
            }
            dependencies.extend(emitted.dependencies.iter().cloned());
            fragments.push((node.id.as_str(), emitted));
        }

        warnings.extend(analyze_workflow(workflow, &plan, self.registry));
        for warning in &warnings {
            log::warn!("{}: {}", workflow.id, warning);
        }

        let slug = sanitize_workflow_name(&workflow.name);
        let dependencies: Vec<String> = dependencies.into_iter().collect();
        let branching: Vec<&str> = workflow
            .nodes
            .values()
            .filter(|node| {
                emitters
                    .get(node.id.as_str())
                    .is_some_and(|emitter| emitter.node_type().is_branching())
            })
            .map(|node| node.id.as_str())
            .collect();

        let mut code = template::render_header(workflow, &slug, &self.config, &dependencies);
        let mut append = |block: &str| {
            code.push_str("\n\n");
            code.push_str(block.trim_end());
            code.push('\n');
        };
        append(&template::render_constants(workflow, &slug, &self.config, project));
        append(template::RUNTIME_ERRORS);
        append(template::RUNTIME_INTERPOLATION);
        append(template::RUNTIME_CONTEXT);
        append(template::RUNTIME_EXECUTOR);
        append(&section("Nodes"));
        for (_, emitted) in &fragments {
            append(&emitted.function_source);
        }
        append(&template::render_node_specs(workflow, &plan, &branching));
        let calls: Vec<(&str, &str)> = fragments
            .iter()
            .map(|(node_id, emitted)| (*node_id, emitted.function_name.as_str()))
            .collect();
        append(&template::render_execute_workflow(&calls));
        append(template::RUNTIME_ENTRYPOINTS);

        log::info!(
            "Compiled workflow '{}' as '{}': {} node(s), {} dependencies, {} warning(s)",
            workflow.id,
            slug,
            workflow.nodes.len(),
            dependencies.len(),
            warnings.len()
        );

        Ok(GenerationResult {
            workflow_name: slug,
            code,
            node_count: workflow.nodes.len(),
            dependencies,
            warnings,
        })
    }

    /// Look up every node's emitter, in node-id order
    fn resolve_emitters<'w>(
        &self,
        workflow: &'w WorkflowDefinition,
    ) -> Result<BTreeMap<&'w str, Arc<dyn NodeEmitter>>> {
        let mut emitters = BTreeMap::new();
        for node in workflow.nodes.values() {
            let node_type = self.registry.resolve(&node.id, &node.node_type)?;
            let emitter = self.registry.emitter_for_node(&node.id, node_type)?;
            emitters.insert(node.id.as_str(), emitter);
        }
        Ok(emitters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::protocol;
    use crate::parse_execution_output;
    use catalyst_core::{EdgeDefinition, NodeDefinition, OnErrorPolicy, WorkflowBuilder};
    use serde_json::{json, Value};

    fn hello_workflow() -> WorkflowDefinition {
        WorkflowBuilder::new("wf-hello", "Hello World")
            .with_input("name", "string", true)
            .with_output("nodes.greet.prompt")
            .add_node("start", "httpEndpoint", "Start")
            .add_node("greet", "promptTemplate", "Greeting")
            .with_config(json!({"template": "Hello {{ input.name }}"}))
            .add_edge("start", "greet")
            .build()
    }

    fn branching_workflow() -> WorkflowDefinition {
        WorkflowBuilder::new("wf-branch", "Age Gate")
            .with_input("age", "integer", true)
            .add_node("start", "httpEndpoint", "Start")
            .add_node("check", "condition", "Adult?")
            .with_config(json!({"left": "{{ input.age }}", "operator": "greaterThanOrEqual", "right": 18}))
            .add_node("adult", "editFields", "Adult")
            .with_config(json!({"fields": {"verdict": "adult"}}))
            .add_node("minor", "editFields", "Minor")
            .with_config(json!({"fields": {"verdict": "minor"}}))
            .add_edge("start", "check")
            .add_branch_edge("check", "true", "adult")
            .add_branch_edge("check", "false", "minor")
            .build()
    }

    fn compile(workflow: &WorkflowDefinition) -> Result<GenerationResult> {
        let registry = catalyst_nodes::builtin_registry();
        let compiler = WorkflowCompiler::new(&registry, CompilerConfig::default());
        compiler.compile(workflow, &ProjectContext::default())
    }

    #[test]
    fn test_compile_hello_world() {
        let result = compile(&hello_workflow()).unwrap();

        assert_eq!(result.workflow_name, "hello_world");
        assert_eq!(result.node_count, 2);
        assert_eq!(result.dependencies, vec!["fastapi", "uvicorn"]);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);

        let code = &result.code;
        assert!(code.starts_with("#!/usr/bin/env python3\n"));
        assert!(code.contains("ROUTE_PATH = \"/hello_world\""));
        assert!(code.contains("async def node_start(ctx: Dict[str, Any]) -> Any:"));
        assert!(code.contains("async def node_greet(ctx: Dict[str, Any]) -> Any:"));
        assert!(code.contains("async def run_test_mode():"));
        assert!(code.contains("def create_app():"));
        assert!(code.trim_end().ends_with("main()"));
        assert!(!code.contains("from __future__"));
    }

    #[test]
    fn test_one_call_site_per_node() {
        for workflow in [hello_workflow(), branching_workflow()] {
            let result = compile(&workflow).unwrap();
            assert_eq!(result.code.matches("await _invoke_node(").count(), workflow.nodes.len());
            for node_id in workflow.nodes.keys() {
                let call = format!("NODE_SPECS[\"{}\"], node_{})", node_id, node_id);
                assert_eq!(result.code.matches(&call).count(), 1, "{}", node_id);
            }
        }
    }

    #[test]
    fn test_both_branches_emitted() {
        let result = compile(&branching_workflow()).unwrap();
        let code = &result.code;
        assert!(code.contains("async def node_adult("));
        assert!(code.contains("async def node_minor("));
        assert!(code.contains("\"branch\": \"true\""));
        assert!(code.contains("\"branch\": \"false\""));
        assert!(code.contains("\"branching\": True"));
        // Plan order: start, check, then targets in edge order
        let adult = code.find("NODE_SPECS[\"adult\"]").unwrap();
        let minor = code.find("NODE_SPECS[\"minor\"]").unwrap();
        let check = code.find("NODE_SPECS[\"check\"]").unwrap();
        assert!(check < adult && adult < minor);
    }

    #[test]
    fn test_compile_is_idempotent() {
        let workflow = branching_workflow();
        let first = compile(&workflow).unwrap();
        let second = compile(&workflow).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_dependencies_collected() {
        let workflow = WorkflowBuilder::new("wf", "Deps")
            .add_node("a", "httpRequest", "Fetch")
            .with_config(json!({"url": "https://example.com"}))
            .add_node("b", "httpRequest", "Fetch again")
            .with_config(json!({"url": "https://example.org"}))
            .add_node("c", "anthropicCompletion", "Ask")
            .with_config(json!({"prompt": "{{ nodes.a.body }}"}))
            .add_edge("a", "b")
            .add_edge("b", "c")
            .build();

        let result = compile(&workflow).unwrap();
        assert_eq!(result.dependencies, vec!["anthropic", "fastapi", "httpx", "uvicorn"]);
        assert!(result.code.contains("# Dependencies: pip install anthropic fastapi httpx uvicorn"));
    }

    #[test]
    fn test_unknown_type_yields_no_code() {
        let mut workflow = hello_workflow();
        workflow.add_node(NodeDefinition::new("mystery", "teleport", "Mystery"));

        let err = compile(&workflow).unwrap_err();
        assert!(matches!(err, CompileError::UnknownNodeType { ref node_type, .. } if node_type == "teleport"));
    }

    #[test]
    fn test_stub_type_not_implemented() {
        let mut workflow = hello_workflow();
        workflow.add_node(NodeDefinition::new("fan", "parallel", "Fan out"));
        workflow
            .add_edge(EdgeDefinition::new("e-fan", "greet", "fan"))
            .unwrap();

        let err = compile(&workflow).unwrap_err();
        assert!(matches!(err, CompileError::NodeNotImplemented { ref node_id, .. } if node_id == "fan"));
    }

    #[test]
    fn test_validation_errors_block_compile() {
        let mut workflow = hello_workflow();
        workflow.edges.push(EdgeDefinition::new("e-bad", "greet", "ghost"));

        match compile(&workflow).unwrap_err() {
            CompileError::Validation(issues) => {
                assert!(issues.iter().all(|i| i.is_error()));
                assert!(issues.iter().any(|i| i.path == "edges[1].target"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_rejected() {
        let workflow = WorkflowBuilder::new("wf", "Loop")
            .add_node("a", "noOp", "A")
            .add_node("b", "noOp", "B")
            .add_edge("a", "b")
            .add_edge("b", "a")
            .build();

        assert!(matches!(compile(&workflow).unwrap_err(), CompileError::CycleDetected(_)));
    }

    #[test]
    fn test_warnings_surface() {
        let workflow = WorkflowBuilder::new("wf", "Warn")
            .add_node("a", "logMessage", "A")
            .with_config(json!({"message": "{{ who.name }}"}))
            .add_node("b", "noOp", "B")
            .add_node("c", "noOp", "C")
            .add_edge("a", "b")
            .build();

        let result = compile(&workflow).unwrap();
        assert!(result.warnings.iter().any(|w| w.contains("'c' is not connected")));
        assert!(result.warnings.iter().any(|w| w.contains("unknown variable 'who'")));
    }

    #[test]
    fn test_unsupported_target() {
        let registry = catalyst_nodes::builtin_registry();
        let config = CompilerConfig {
            framework: "django".to_string(),
            ..Default::default()
        };
        let compiler = WorkflowCompiler::new(&registry, config);
        let err = compiler.compile(&hello_workflow(), &ProjectContext::default()).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedTarget { .. }));
    }

    #[test]
    fn test_compile_manifest_workflow() {
        let manifest: Manifest = serde_json::from_value(json!({
            "version": "1.0",
            "config": {"port": 9001},
            "secrets": {"anthropic": "ANTHROPIC_API_KEY"},
            "globalVariables": {"greeting": "Hi"},
            "workflows": {"wf-hello": hello_workflow()}
        }))
        .unwrap();
        let registry = catalyst_nodes::builtin_registry();
        let compiler = WorkflowCompiler::new(&registry, CompilerConfig::from(&manifest.config));

        let result = compiler.compile_manifest_workflow(&manifest, "wf-hello").unwrap();
        assert!(result.code.contains("DEFAULT_PORT = 9001"));
        assert!(result.code.contains("SECRET_SOURCES = {\"anthropic\": \"ANTHROPIC_API_KEY\"}"));
        assert!(result.code.contains("GLOBAL_VARIABLES = {\"greeting\": \"Hi\"}"));

        let err = compiler.compile_manifest_workflow(&manifest, "nope").unwrap_err();
        assert!(matches!(err, CompileError::WorkflowNotFound(_)));
    }

    #[test]
    fn test_generation_result_serializes_camel_case() {
        let result = compile(&hello_workflow()).unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["workflowName"], json!("hello_world"));
        assert_eq!(value["nodeCount"], json!(2));
    }

    /// Run a compiled program in test mode; `None` when python3 is missing
    fn run_test_mode(code: &str, input: &str) -> Option<(i32, Value)> {
        use std::io::Write;
        use std::process::{Command, Stdio};

        let python = which::which("python3").ok()?;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workflow.py");
        std::fs::write(&path, code).unwrap();

        let mut child = Command::new(python)
            .arg(&path)
            .env(protocol::EXECUTION_MODE_ENV, protocol::TEST_MODE_VALUE)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
        let output = child.wait_with_output().unwrap();
        let stdout = String::from_utf8_lossy(&output.stdout);
        let result = parse_execution_output(&stdout)
            .unwrap_or_else(|| panic!("no marked result in output: {stdout}\n{}", String::from_utf8_lossy(&output.stderr)));
        Some((output.status.code().unwrap_or(-1), result))
    }

    #[test]
    fn test_python_hello_world() {
        let result = compile(&hello_workflow()).unwrap();
        let Some((code, output)) = run_test_mode(&result.code, r#"{"name": "World"}"#) else {
            return;
        };
        assert_eq!(code, 0);
        assert_eq!(output["status"], json!("success"));
        assert_eq!(output["output"], json!("Hello World"));
        assert_eq!(output["executions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_python_branch_skips_other_side() {
        let result = compile(&branching_workflow()).unwrap();
        let Some((code, output)) = run_test_mode(&result.code, r#"{"age": 30}"#) else {
            return;
        };
        assert_eq!(code, 0);
        let status = |id: &str| {
            output["executions"]
                .as_array()
                .unwrap()
                .iter()
                .find(|e| e["nodeId"] == json!(id))
                .map(|e| e["status"].clone())
        };
        assert_eq!(status("adult"), Some(json!("success")));
        assert_eq!(status("minor"), Some(json!("skipped")));
        assert_eq!(output["output"]["verdict"], json!("adult"));
    }

    #[test]
    fn test_python_invalid_input() {
        let result = compile(&hello_workflow()).unwrap();
        let Some((code, output)) = run_test_mode(&result.code, "{not json") else {
            return;
        };
        assert_eq!(code, 1);
        assert_eq!(output["status"], json!("error"));
        assert_eq!(output["error"]["category"], json!("invalid_input"));
    }

    #[test]
    fn test_python_fallback_and_pinned() {
        let workflow = WorkflowBuilder::new("wf", "Recover")
            .add_node("boom", "stopAndError", "Boom")
            .with_config(json!({"message": "nope"}))
            .with_on_error(OnErrorPolicy::Fallback, Some(json!({"recovered": true})))
            .add_node("pinned", "httpRequest", "Pinned call")
            .with_config(json!({"url": "http://127.0.0.1:9/unreachable"}))
            .with_pinned_data(json!({"status": 200}))
            .add_edge("boom", "pinned")
            .with_output("{{ boom }}")
            .build();
        let result = compile(&workflow).unwrap();
        let Some((code, output)) = run_test_mode(&result.code, "{}") else {
            return;
        };
        assert_eq!(code, 0);
        assert_eq!(output["output"], json!({"recovered": true}));
        let executions = output["executions"].as_array().unwrap();
        assert_eq!(executions[0]["handledBy"], json!("fallback"));
        assert_eq!(executions[1]["pinned"], json!(true));
    }

    fn record<'a>(output: &'a Value, node_id: &str) -> &'a Value {
        output["executions"]
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["nodeId"] == json!(node_id))
            .unwrap_or_else(|| panic!("no execution record for {node_id}"))
    }

    #[test]
    fn test_python_unresolved_expressions_render_empty() {
        let workflow = WorkflowBuilder::new("wf", "Prompt")
            .with_input("xs", "array", true)
            .add_node("p", "promptTemplate", "Prompt")
            .with_config(json!({
                "template": "A{{ missing.path }}B {{ input.xs[-1] }} {{ input.xs[5] }} {{ input.xs[0] }}"
            }))
            .with_output("{{ p }}")
            .build();
        let result = compile(&workflow).unwrap();
        let Some((code, output)) = run_test_mode(&result.code, r#"{"xs": [1, 2]}"#) else {
            return;
        };
        assert_eq!(code, 0);
        assert_eq!(output["output"]["prompt"], json!("AB   1"));
        let warnings = output["output"]["warnings"].as_array().unwrap();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].as_str().unwrap().contains("missing.path"));
        assert_eq!(output["output"]["referencedVariables"], json!(["missing", "input"]));
    }

    #[test]
    fn test_python_timeout_retries_then_fails() {
        let mut workflow = WorkflowBuilder::new("wf", "Slow")
            .add_node("wait", "delay", "Wait")
            .with_config(json!({"duration": 2000}))
            .add_node("after", "noOp", "After")
            .add_edge("wait", "after")
            .build();
        let wait = workflow.nodes.get_mut("wait").unwrap();
        wait.timeout = Some(100);
        wait.retries = Some(1);

        let result = compile(&workflow).unwrap();
        let Some((code, output)) = run_test_mode(&result.code, "{}") else {
            return;
        };
        assert_eq!(code, 1);
        assert_eq!(output["status"], json!("error"));
        assert_eq!(output["error"]["category"], json!("timeout"));
        assert_eq!(output["error"]["nodeId"], json!("wait"));
        let wait = record(&output, "wait");
        assert_eq!(wait["attempts"], json!(2));
        assert_eq!(wait["error"]["category"], json!("timeout"));
        assert_eq!(record(&output, "after")["status"], json!("skipped"));
    }

    #[test]
    fn test_python_configuration_error_not_retried() {
        let mut workflow = WorkflowBuilder::new("wf", "Continue")
            .add_node("bad", "delay", "Bad delay")
            .with_config(json!({"duration": "soon"}))
            .with_on_error(OnErrorPolicy::Continue, None)
            .add_node("after", "noOp", "After")
            .add_edge("bad", "after")
            .with_output("{{ bad }}")
            .build();
        workflow.nodes.get_mut("bad").unwrap().retries = Some(2);

        let result = compile(&workflow).unwrap();
        let Some((code, output)) = run_test_mode(&result.code, "{}") else {
            return;
        };
        assert_eq!(code, 0);
        assert_eq!(output["status"], json!("success"));
        assert_eq!(output["output"], Value::Null);
        let bad = record(&output, "bad");
        assert_eq!(bad["status"], json!("error"));
        assert_eq!(bad["attempts"], json!(1));
        assert_eq!(bad["handledBy"], json!("continue"));
        assert_eq!(bad["error"]["category"], json!("configuration"));
        assert_eq!(record(&output, "after")["status"], json!("success"));
    }

    #[test]
    fn test_python_resolution_error_not_retried() {
        let mut workflow = WorkflowBuilder::new("wf", "Resolve")
            .add_node("pick", "filterArray", "Pick")
            .with_config(json!({
                "source": "{{ input.people }}",
                "field": "age",
                "operator": "greaterThanOrEqual",
                "value": 18
            }))
            .build();
        workflow.nodes.get_mut("pick").unwrap().retries = Some(3);

        let result = compile(&workflow).unwrap();
        let Some((code, output)) = run_test_mode(&result.code, "{}") else {
            return;
        };
        assert_eq!(code, 1);
        assert_eq!(output["error"]["category"], json!("resolution"));
        assert_eq!(record(&output, "pick")["attempts"], json!(1));
    }

    #[test]
    fn test_python_falsy_edge_condition_skips_target() {
        let workflow = WorkflowBuilder::new("wf", "Gate")
            .with_input("go", "boolean", true)
            .add_node("a", "noOp", "A")
            .add_node("b", "noOp", "B")
            .add_conditional_edge("a", "b", "{{ input.go }}")
            .build();
        let result = compile(&workflow).unwrap();

        let Some((code, output)) = run_test_mode(&result.code, r#"{"go": false}"#) else {
            return;
        };
        assert_eq!(code, 0);
        assert_eq!(record(&output, "a")["status"], json!("success"));
        assert_eq!(record(&output, "b")["status"], json!("skipped"));

        let Some((_, output)) = run_test_mode(&result.code, r#"{"go": true}"#) else {
            return;
        };
        assert_eq!(record(&output, "b")["status"], json!("success"));
    }
}
