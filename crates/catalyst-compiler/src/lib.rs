//! Catalyst Compiler
//!
//! Turns a validated workflow graph into a standalone Python program. The
//! program runs every node as an async function in a planned order and can
//! be started in two modes:
//!
//! - **Test mode** (`CATALYST_EXECUTION_MODE=test`): reads one JSON payload
//!   from stdin and prints the execution result between
//!   `EXECUTION_START_MARKER` and `EXECUTION_END_MARKER`
//! - **Production mode** (default): serves the workflow over HTTP with
//!   FastAPI on `/<slug>`
//!
//! # Example
//!
//! ```ignore
//! use catalyst_compiler::{CompilerConfig, ProjectContext, WorkflowCompiler};
//!
//! let registry = catalyst_nodes::builtin_registry();
//! let compiler = WorkflowCompiler::new(&registry, CompilerConfig::default());
//! let result = compiler.compile(&workflow, &ProjectContext::default())?;
//! std::fs::write(format!("{}.py", result.workflow_name), result.code)?;
//! ```

pub mod analysis;
pub mod config;
pub mod constants;
pub mod orchestrator;
pub mod planner;
pub mod slug;
pub mod template;

use serde_json::Value;

pub use config::{CompilerConfig, ProjectContext};
pub use constants::protocol::{
    EXECUTION_END_MARKER, EXECUTION_MODE_ENV, EXECUTION_START_MARKER, TEST_MODE_VALUE,
};
pub use orchestrator::{GenerationResult, WorkflowCompiler};
pub use planner::{plan_execution, EdgeGate, ExecutionPlan, PlannedStep};
pub use slug::sanitize_workflow_name;

/// Extract the result JSON a test-mode run printed between the markers
///
/// Uses the last start marker so stray output from node code before the
/// result does not interfere. Returns `None` when either marker is missing
/// or the enclosed text is not JSON.
pub fn parse_execution_output(stdout: &str) -> Option<Value> {
    let start = stdout.rfind(EXECUTION_START_MARKER)? + EXECUTION_START_MARKER.len();
    let rest = &stdout[start..];
    let end = rest.find(EXECUTION_END_MARKER)?;
    serde_json::from_str(rest[..end].trim()).ok()
}
