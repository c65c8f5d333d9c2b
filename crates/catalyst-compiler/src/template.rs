//! Program assembly
//!
//! The runtime sections (error taxonomy, interpolation helpers, context
//! builder, node wrapper and entry points) are fixed Python sources compiled
//! into the binary. This module renders the workflow-specific parts around
//! them: the header, the constants block, the node table and
//! `execute_workflow`.

use catalyst_core::{InputField, WorkflowDefinition};
use catalyst_nodes::python::{py_dict, py_literal, py_str};
use serde_json::{json, Map, Value};

use crate::config::{CompilerConfig, ProjectContext};
use crate::constants::protocol;
use crate::planner::ExecutionPlan;

/// Error classes raised by node functions
pub const RUNTIME_ERRORS: &str = include_str!("runtime/errors.py");
/// `{{ }}` resolution helpers, emitted once per program
pub const RUNTIME_INTERPOLATION: &str = include_str!("runtime/interpolation.py");
/// Per-execution context and input schema handling
pub const RUNTIME_CONTEXT: &str = include_str!("runtime/context.py");
/// `_invoke_node` and result finalization
pub const RUNTIME_EXECUTOR: &str = include_str!("runtime/executor.py");
/// Test mode, production app and `main()`
pub const RUNTIME_ENTRYPOINTS: &str = include_str!("runtime/entrypoints.py");

const IMPORTS: &str = "import asyncio
import copy
import json
import logging
import os
import re
import sys
import time
import uuid
from datetime import datetime, timezone
from typing import Any, Dict
";

/// Banner comment separating program sections
pub fn section(title: &str) -> String {
    let rule = "# ---------------------------------------------------------------------------";
    format!("{rule}\n# {title}\n{rule}\n")
}

fn comment_text(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

/// Shebang, provenance comment and imports
pub fn render_header(workflow: &WorkflowDefinition, slug: &str, config: &CompilerConfig, dependencies: &[String]) -> String {
    let mut out = String::new();
    out.push_str("#!/usr/bin/env python3\n");
    out.push_str("# Generated by Catalyst. Do not edit by hand.\n");
    out.push_str("#\n");
    out.push_str(&format!(
        "# Workflow: {} ({})\n",
        comment_text(&workflow.name),
        comment_text(&workflow.id)
    ));
    out.push_str(&format!("# Requires Python {}+\n", comment_text(&config.python_version)));
    if !dependencies.is_empty() {
        out.push_str(&format!("# Dependencies: pip install {}\n", dependencies.join(" ")));
    }
    out.push_str("#\n");
    out.push_str(&format!(
        "# Test run:  {}={} python3 {}.py < input.json\n",
        protocol::EXECUTION_MODE_ENV,
        protocol::TEST_MODE_VALUE,
        slug
    ));
    out.push_str(&format!("# Serve:     python3 {}.py\n", slug));
    out.push('\n');
    out.push_str(IMPORTS);
    out
}

fn input_schema(input: &std::collections::BTreeMap<String, InputField>) -> Value {
    let mut schema = Map::new();
    for (name, field) in input {
        let mut entry = Map::new();
        if let Some(field_type) = &field.field_type {
            entry.insert("type".to_string(), json!(field_type));
        }
        entry.insert("required".to_string(), json!(field.required));
        if let Some(default) = &field.default {
            entry.insert("default".to_string(), default.clone());
        }
        schema.insert(name.clone(), Value::Object(entry));
    }
    Value::Object(schema)
}

/// Module-level constants read by the runtime sections
pub fn render_constants(
    workflow: &WorkflowDefinition,
    slug: &str,
    config: &CompilerConfig,
    project: &ProjectContext,
) -> String {
    let secrets: Map<String, Value> = project
        .secrets
        .iter()
        .map(|(name, env)| (name.clone(), json!(env)))
        .collect();
    let mut output = Map::new();
    if let Some(source) = workflow.output.source.as_deref().filter(|s| !s.trim().is_empty()) {
        output.insert("source".to_string(), json!(source.trim()));
    }

    let mut out = section("Workflow constants");
    let mut constant = |name: &str, value: String| {
        out.push_str(name);
        out.push_str(" = ");
        out.push_str(&value);
        out.push('\n');
    };
    constant("WORKFLOW_ID", py_str(&workflow.id));
    constant("WORKFLOW_NAME", py_str(&workflow.name));
    constant("WORKFLOW_SLUG", py_str(slug));
    constant("ROUTE_PATH", py_str(&format!("/{}", slug)));
    constant("HTTP_METHOD", py_str(&workflow.trigger.http_method()));
    constant("DEFAULT_HOST", py_str(&config.host));
    constant("DEFAULT_PORT", config.port.to_string());
    constant("EXECUTION_MODE_ENV", py_str(protocol::EXECUTION_MODE_ENV));
    constant("TEST_MODE_VALUE", py_str(protocol::TEST_MODE_VALUE));
    constant("EXECUTION_START_MARKER", py_str(protocol::EXECUTION_START_MARKER));
    constant("EXECUTION_END_MARKER", py_str(protocol::EXECUTION_END_MARKER));
    constant("GLOBAL_VARIABLES", py_dict(&project.global_variables));
    constant("SECRET_SOURCES", py_dict(&secrets));
    constant("INPUT_SCHEMA", py_literal(&input_schema(&workflow.input)));
    constant("OUTPUT_SPEC", py_dict(&output));
    out.push('\n');
    out.push_str(&format!("logger = logging.getLogger({})\n", py_str(&format!("catalyst.{}", slug))));
    out
}

/// Per-node policy table consumed by `_invoke_node`
pub fn render_node_specs(workflow: &WorkflowDefinition, plan: &ExecutionPlan, branching: &[&str]) -> String {
    let mut out = section("Execution plan");
    out.push_str("NODE_SPECS = {\n");
    for step in &plan.steps {
        let Some(node) = workflow.find_node(&step.node_id) else {
            continue;
        };
        let mut spec = Map::new();
        spec.insert("id".to_string(), json!(node.id));
        spec.insert("name".to_string(), json!(node.name));
        spec.insert("type".to_string(), json!(node.node_type));
        spec.insert("timeout".to_string(), json!(workflow.effective_timeout(node)));
        spec.insert("retries".to_string(), json!(workflow.effective_retries(node)));
        spec.insert("onError".to_string(), json!(workflow.effective_on_error(node).as_str()));
        if let Some(fallback) = &node.fallback_value {
            spec.insert("fallbackValue".to_string(), fallback.clone());
        }
        if let Some(pinned) = &node.pinned_data {
            spec.insert("pinnedData".to_string(), pinned.clone());
        }
        spec.insert("branching".to_string(), json!(branching.contains(&node.id.as_str())));
        let gates: Vec<Value> = step
            .gates
            .iter()
            .map(|gate| {
                json!({
                    "edge": gate.edge_id,
                    "source": gate.source,
                    "branch": gate.branch,
                    "condition": gate.condition,
                })
            })
            .collect();
        spec.insert("gates".to_string(), Value::Array(gates));
        out.push_str(&format!("    {}: {},\n", py_str(&node.id), py_dict(&spec)));
    }
    out.push_str("}\n");
    let order: Vec<String> = plan.steps.iter().map(|s| py_str(&s.node_id)).collect();
    out.push_str(&format!("NODE_ORDER = [{}]\n", order.join(", ")));
    out
}

/// `execute_workflow`, with exactly one `_invoke_node` call per node
pub fn render_execute_workflow(calls: &[(&str, &str)]) -> String {
    let mut out = section("Workflow execution");
    out.push_str("\n\nasync def execute_workflow(input_data, request=None, test_mode=False):\n");
    out.push_str("    \"\"\"Run every node once in plan order and return the execution result.\"\"\"\n");
    out.push_str("    ctx = create_context(input_data, request=request, test_mode=test_mode)\n");
    out.push_str("    records = []\n");
    out.push_str("    started = time.perf_counter()\n");
    out.push_str("    logger.info(\"Starting execution %s\", ctx[\"execution\"][\"id\"])\n");
    out.push_str("    ok = True\n");
    for (node_id, function_name) in calls {
        out.push_str("    if ok:\n");
        out.push_str(&format!(
            "        ok = await _invoke_node(ctx, records, NODE_SPECS[{}], {})\n",
            py_str(node_id),
            function_name
        ));
    }
    out.push_str("    result = _finalize(ctx, records, started)\n");
    out.push_str("    logger.info(\"Execution %s finished with status %s\", result[\"executionId\"], result[\"status\"])\n");
    out.push_str("    return result\n");
    out
}
