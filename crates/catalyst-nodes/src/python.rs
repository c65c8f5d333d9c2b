//! Python source helpers shared by every emitter
//!
//! Emitters describe a node function as a list of body lines; the
//! `FunctionBuilder` wraps them in the common frame (signature, docstring,
//! config literal, required-field check and the error boundary) so every
//! node function looks the same to the executor.

use catalyst_core::{EmittedNode, NodeDefinition, NodeMetadata};
use serde_json::{Map, Value};

const BODY_INDENT: &str = "        ";

/// Render a JSON value as a Python literal
///
/// Strings use JSON escaping, which Python string literals accept.
pub fn py_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => py_str(s),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(py_literal).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Object(map) => py_dict(map),
    }
}

/// Render a JSON object as a Python dict literal
pub fn py_dict(map: &Map<String, Value>) -> String {
    let parts: Vec<String> = map
        .iter()
        .map(|(k, v)| format!("{}: {}", py_str(k), py_literal(v)))
        .collect();
    format!("{{{}}}", parts.join(", "))
}

/// Render a Python string literal
pub fn py_str(text: &str) -> String {
    // serde_json only fails on non-string map keys, which a &str never hits
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

/// Make text safe inside a triple-quoted docstring
pub fn docstring_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\r', '\n'], " ")
}

/// 32-bit FNV-1a, used for stable name suffixes
fn fnv1a(text: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in text.as_bytes() {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Python function name for a node id
///
/// Characters outside `[A-Za-z0-9_]` become `_`. When that loses
/// information a hash of the original id is appended so distinct ids never
/// share a name.
pub fn function_name(node_id: &str) -> String {
    let sanitized: String = node_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if sanitized == node_id && !node_id.is_empty() {
        format!("node_{}", sanitized)
    } else {
        format!("node_{}_{:08x}", sanitized, fnv1a(node_id))
    }
}

/// Assembles one node function around emitter-specific body lines
pub struct FunctionBuilder<'a> {
    node: &'a NodeDefinition,
    metadata: &'a NodeMetadata,
    config: Map<String, Value>,
    imports: Vec<(String, String)>,
    body: Vec<String>,
    dependencies: Vec<String>,
}

impl<'a> FunctionBuilder<'a> {
    pub fn new(node: &'a NodeDefinition, metadata: &'a NodeMetadata) -> Self {
        Self {
            node,
            metadata,
            config: node.config.clone(),
            imports: Vec::new(),
            body: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Replace the config literal (used when an emitter normalizes config)
    pub fn config(mut self, config: Map<String, Value>) -> Self {
        self.config = config;
        self
    }

    /// Append body lines; relative indentation inside `block` is kept
    pub fn body(mut self, block: &str) -> Self {
        for line in block.lines() {
            self.body.push(line.to_string());
        }
        self
    }

    /// Append a single body line
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.body.push(line.into());
        self
    }

    /// Import a third-party module at the top of the body
    ///
    /// A missing package surfaces as a configuration error naming it.
    pub fn requires(mut self, package: &str, statement: &str) -> Self {
        self.imports.push((statement.to_string(), package.to_string()));
        self.dependency(package)
    }

    /// Declare a pip package the body imports
    pub fn dependency(mut self, package: &str) -> Self {
        if !self.dependencies.iter().any(|d| d == package) {
            self.dependencies.push(package.to_string());
        }
        self
    }

    pub fn build(self) -> EmittedNode {
        let function_name = function_name(&self.node.id);
        let mut out = String::new();

        out.push_str(&format!("async def {}(ctx: Dict[str, Any]) -> Any:\n", function_name));
        out.push_str(&self.docstring());
        out.push_str(&format!("    node_id = {}\n", py_str(&self.node.id)));
        out.push_str(&format!("    config = {}\n", py_dict(&self.config)));

        let required = self.metadata.required_fields();
        if !required.is_empty() {
            let fields: Vec<String> = required.iter().map(|f| py_str(f)).collect();
            out.push_str(&format!(
                "    _require_config(node_id, config, [{}])\n",
                fields.join(", ")
            ));
        }

        out.push_str("    try:\n");
        for (statement, package) in &self.imports {
            out.push_str(&format!("        try:\n            {}\n", statement));
            out.push_str("        except ImportError as exc:\n");
            out.push_str(&format!(
                "            raise NodeConfigurationError(\"Package '{0}' is required (pip install {0})\", node_id=node_id) from exc\n",
                package
            ));
        }
        if self.body.is_empty() && self.imports.is_empty() {
            out.push_str(BODY_INDENT);
            out.push_str("return None\n");
        }
        for line in &self.body {
            if line.trim().is_empty() {
                out.push('\n');
            } else {
                out.push_str(BODY_INDENT);
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push_str("    except CatalystError:\n");
        out.push_str("        raise\n");
        out.push_str("    except Exception as exc:\n");
        out.push_str(&format!(
            "        raise UnexpectedNodeError(\"{} node '%s' failed: %s\" % (node_id, exc), node_id=node_id) from exc\n",
            self.metadata.label.replace(['"', '\\', '%'], "")
        ));

        let mut dependencies = self.dependencies;
        dependencies.sort();

        EmittedNode {
            function_name,
            function_source: out,
            dependencies,
        }
    }

    fn docstring(&self) -> String {
        let mut doc = format!(
            "    \"\"\"{} \"{}\" (id: {}).\n",
            docstring_text(&self.metadata.label),
            docstring_text(&self.node.name),
            docstring_text(&self.node.id)
        );
        if let Some(description) = self.node.description.as_deref().filter(|d| !d.trim().is_empty()) {
            doc.push_str(&format!("\n    {}\n", docstring_text(description.trim())));
        }
        if !self.metadata.fields.is_empty() {
            doc.push_str("\n    Config:\n");
            for field in &self.metadata.fields {
                let marker = if field.required { "required" } else { "optional" };
                let mut line = format!("        {} ({})", field.key, marker);
                if !field.description.is_empty() {
                    line.push_str(": ");
                    line.push_str(&docstring_text(&field.description));
                }
                doc.push_str(&line);
                doc.push('\n');
            }
        }
        doc.push_str("    \"\"\"\n");
        doc
    }
}
