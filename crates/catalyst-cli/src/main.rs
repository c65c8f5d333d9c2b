//! `catalyst` command line front end
//!
//! Compiles workflows from a manifest file, validates manifests, lists the
//! node palette and previews `{{ }}` interpolation.

mod error;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use catalyst_compiler::{CompilerConfig, WorkflowCompiler};
use catalyst_core::expression::interpolate;
use catalyst_core::{has_errors, validate_manifest, Manifest, NodeRegistry};
use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::error::{CliError, Result};

/// Compile visual workflows into standalone Python services
#[derive(Parser, Debug)]
#[command(name = "catalyst", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// More log output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile one workflow of a manifest into a Python program
    Compile {
        /// Path to the project manifest (JSON)
        manifest: PathBuf,

        /// Id of the workflow to compile
        #[arg(short, long)]
        workflow: String,

        /// Write the program here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Default port of the generated service
        #[arg(long, env = "CATALYST_PORT")]
        port: Option<u16>,
    },

    /// Validate every workflow of a manifest
    Validate {
        /// Path to the project manifest (JSON)
        manifest: PathBuf,
    },

    /// List node types by category
    Nodes {
        /// Only show node types that can be compiled
        #[arg(long)]
        implemented: bool,

        /// Print metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Preview how a template interpolates against a set of variables
    Interpolate {
        /// Text containing {{ }} placeholders
        template: String,

        /// Variables as a JSON object
        #[arg(long, default_value = "{}")]
        vars: String,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn load_manifest(path: &Path) -> Result<Manifest> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Manifest::from_json(&text).map_err(|source| CliError::Manifest {
        path: path.to_path_buf(),
        source,
    })
}

fn compile(
    registry: &NodeRegistry,
    manifest_path: &Path,
    workflow_id: &str,
    out_path: Option<&Path>,
    port: Option<u16>,
    out: &mut dyn Write,
) -> Result<()> {
    let manifest = load_manifest(manifest_path)?;
    let mut config = CompilerConfig::from(&manifest.config);
    if let Some(port) = port {
        config = config.with_port(port);
    }

    let compiler = WorkflowCompiler::new(registry, config);
    let result = compiler.compile_manifest_workflow(&manifest, workflow_id)?;

    for warning in &result.warnings {
        eprintln!("warning: {}", warning);
    }
    eprintln!("dependencies: {}", result.dependencies.join(" "));

    match out_path {
        Some(path) => {
            fs::write(path, &result.code).map_err(|source| CliError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            writeln!(
                out,
                "Wrote {} ({} node(s), route /{})",
                path.display(),
                result.node_count,
                result.workflow_name
            )?;
        }
        None => out.write_all(result.code.as_bytes())?,
    }
    Ok(())
}

fn validate(registry: &NodeRegistry, manifest_path: &Path, out: &mut dyn Write) -> Result<()> {
    let manifest = load_manifest(manifest_path)?;
    let issues = validate_manifest(&manifest, Some(registry));
    for issue in &issues {
        writeln!(out, "{}", issue)?;
    }
    if has_errors(&issues) {
        let count = issues.iter().filter(|issue| issue.is_error()).count();
        return Err(CliError::ValidationFailed(count));
    }
    writeln!(
        out,
        "{} workflow(s) valid, {} warning(s)",
        manifest.workflows.len(),
        issues.len()
    )?;
    Ok(())
}

fn list_nodes(registry: &NodeRegistry, implemented_only: bool, as_json: bool, out: &mut dyn Write) -> Result<()> {
    if as_json {
        let metadata: Vec<_> = registry
            .all_metadata()
            .into_iter()
            .filter(|m| m.implemented || !implemented_only)
            .collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&metadata)?)?;
        return Ok(());
    }

    for (category, nodes) in registry.metadata_by_category() {
        let nodes: Vec<_> = nodes
            .into_iter()
            .filter(|m| m.implemented || !implemented_only)
            .collect();
        if nodes.is_empty() {
            continue;
        }
        writeln!(out, "{}", category.label())?;
        for meta in nodes {
            let marker = if meta.implemented { "" } else { " (not implemented)" };
            writeln!(out, "  {:<22} {}{}", meta.node_type.as_str(), meta.label, marker)?;
        }
    }
    Ok(())
}

fn preview_interpolation(template: &str, vars: &str, out: &mut dyn Write) -> Result<()> {
    let variables: Value = serde_json::from_str(vars).map_err(CliError::Variables)?;
    let result = interpolate(template, &variables);
    for warning in &result.warnings {
        eprintln!("warning: {}", warning);
    }
    log::info!("Referenced variables: {}", result.referenced.join(", "));
    writeln!(out, "{}", result.text)?;
    Ok(())
}

fn run(command: Commands, out: &mut dyn Write) -> Result<()> {
    let registry = catalyst_nodes::builtin_registry();
    match command {
        Commands::Compile {
            manifest,
            workflow,
            out: out_path,
            port,
        } => compile(&registry, &manifest, &workflow, out_path.as_deref(), port, out),
        Commands::Validate { manifest } => validate(&registry, &manifest, out),
        Commands::Nodes { implemented, json } => list_nodes(&registry, implemented, json, out),
        Commands::Interpolate { template, vars } => preview_interpolation(&template, &vars, out),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(cli.command, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("Command failed: {:?}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_manifest(dir: &Path, manifest: &Value) -> PathBuf {
        let path = dir.join("catalyst.json");
        fs::write(&path, serde_json::to_string_pretty(manifest).unwrap()).unwrap();
        path
    }

    fn hello_manifest() -> Value {
        json!({
            "version": "1.0",
            "config": {"port": 8100},
            "workflows": {
                "hello": {
                    "id": "hello",
                    "name": "Hello World",
                    "trigger": {"type": "httpEndpoint", "config": {}},
                    "output": {"source": "nodes.greet.prompt"},
                    "nodes": {
                        "start": {"id": "start", "type": "httpEndpoint", "name": "Start"},
                        "greet": {
                            "id": "greet",
                            "type": "promptTemplate",
                            "name": "Greet",
                            "config": {"template": "Hello {{ input.name }}"}
                        }
                    },
                    "edges": [{"id": "e1", "source": "start", "target": "greet"}]
                }
            }
        })
    }

    fn run_to_string(command: Commands) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = run(command, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_compile_args() {
        let cli = Cli::try_parse_from([
            "catalyst", "-vv", "compile", "catalyst.json", "--workflow", "hello", "--port", "9000",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Compile { workflow, port, out, .. } => {
                assert_eq!(workflow, "hello");
                assert_eq!(port, Some(9000));
                assert!(out.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(Cli::try_parse_from(["catalyst", "compile", "catalyst.json"]).is_err());
    }

    #[test]
    fn test_compile_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(dir.path(), &hello_manifest());
        let target = dir.path().join("hello.py");

        let (result, stdout) = run_to_string(Commands::Compile {
            manifest,
            workflow: "hello".to_string(),
            out: Some(target.clone()),
            port: Some(9300),
        });
        result.unwrap();
        assert!(stdout.contains("route /hello_world"));

        let code = fs::read_to_string(target).unwrap();
        assert!(code.contains("DEFAULT_PORT = 9300"));
        assert_eq!(code.matches("await _invoke_node(").count(), 2);
    }

    #[test]
    fn test_compile_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(dir.path(), &hello_manifest());

        let (result, stdout) = run_to_string(Commands::Compile {
            manifest,
            workflow: "hello".to_string(),
            out: None,
            port: None,
        });
        result.unwrap();
        assert!(stdout.starts_with("#!/usr/bin/env python3"));
        assert!(stdout.contains("DEFAULT_PORT = 8100"));
    }

    #[test]
    fn test_compile_unknown_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(dir.path(), &hello_manifest());

        let (result, stdout) = run_to_string(Commands::Compile {
            manifest,
            workflow: "missing".to_string(),
            out: None,
            port: None,
        });
        assert!(matches!(
            result,
            Err(CliError::Compile(catalyst_core::CompileError::WorkflowNotFound(_)))
        ));
        assert!(stdout.is_empty());
    }

    #[test]
    fn test_validate_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = hello_manifest();
        manifest["workflows"]["hello"]["edges"]
            .as_array_mut()
            .unwrap()
            .push(json!({"id": "e2", "source": "greet", "target": "ghost"}));
        let path = write_manifest(dir.path(), &manifest);

        let (result, stdout) = run_to_string(Commands::Validate { manifest: path });
        assert!(matches!(result, Err(CliError::ValidationFailed(1))));
        assert!(stdout.contains("workflows.hello.edges[1].target"));
    }

    #[test]
    fn test_validate_clean_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), &hello_manifest());

        let (result, stdout) = run_to_string(Commands::Validate { manifest: path });
        result.unwrap();
        assert!(stdout.contains("1 workflow(s) valid"));
    }

    #[test]
    fn test_missing_manifest_file() {
        let (result, _) = run_to_string(Commands::Validate {
            manifest: PathBuf::from("/nonexistent/catalyst.json"),
        });
        assert!(matches!(result, Err(CliError::Read { .. })));
    }

    #[test]
    fn test_list_nodes() {
        let (result, stdout) = run_to_string(Commands::Nodes {
            implemented: false,
            json: false,
        });
        result.unwrap();
        assert!(stdout.contains("promptTemplate"));
        assert!(stdout.contains("parallel"));
        assert!(stdout.contains("(not implemented)"));

        let (result, stdout) = run_to_string(Commands::Nodes {
            implemented: true,
            json: false,
        });
        result.unwrap();
        assert!(!stdout.contains("(not implemented)"));

        let (result, stdout) = run_to_string(Commands::Nodes {
            implemented: true,
            json: true,
        });
        result.unwrap();
        let parsed: Value = serde_json::from_str(&stdout).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 23);
    }

    #[test]
    fn test_interpolate_preview() {
        let (result, stdout) = run_to_string(Commands::Interpolate {
            template: "Hi {{ user.name }}, {{ missing }}!".to_string(),
            vars: r#"{"user": {"name": "Ada"}}"#.to_string(),
        });
        result.unwrap();
        assert_eq!(stdout, "Hi Ada, !\n");

        let (result, _) = run_to_string(Commands::Interpolate {
            template: "x".to_string(),
            vars: "{oops".to_string(),
        });
        assert!(matches!(result, Err(CliError::Variables(_))));
    }
}
