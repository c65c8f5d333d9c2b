//! `{{ ... }}` expression resolution
//!
//! The generated program resolves placeholders at run time with its own
//! helpers. This module applies the same rules at compile time so the
//! compiler can warn about unresolvable references and the CLI can preview
//! a template against sample data.
//!
//! Rules:
//! - Placeholders match `\{\{\s*(.+?)\s*\}\}` (non-greedy, single line)
//! - Paths split on `.`; each segment is a key optionally followed by one or
//!   more `[n]` with `n` a non-negative integer literal
//! - A path that does not resolve renders as `""` and records one warning
//! - Strings render as-is, `null` as `""`, booleans as `true`/`false`,
//!   numbers in their shortest round-trip form and collections as compact JSON

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

static TEMPLATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*(.+?)\s*\}\}").expect("placeholder pattern is valid"));

static SEGMENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^\[\]]*)((?:\[[0-9]+\])*)$").expect("segment pattern is valid"));

static INDEX_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([0-9]+)\]").expect("index pattern is valid"));

/// Roots every expression can start from, besides node ids
pub const FIXED_ROOTS: &[&str] = &["input", "nodes", "env", "globals", "secrets", "execution"];

const FALSY_STRINGS: &[&str] = &["", "false", "0", "null", "none"];

/// Result of interpolating one template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpolation {
    pub text: String,
    /// Root names in first-seen order, without duplicates
    pub referenced: Vec<String>,
    /// One entry per placeholder that did not resolve
    pub warnings: Vec<String>,
}

/// Walk a dot path such as `user.tags[0].name`
///
/// Returns `None` as soon as a segment does not resolve.
pub fn resolve_path<'a>(expression: &str, variables: &'a Value) -> Option<&'a Value> {
    let mut current = variables;
    for segment in expression.trim().split('.') {
        let caps = SEGMENT_PATTERN.captures(segment)?;
        let key = caps.get(1).map_or("", |m| m.as_str());
        let indices = caps.get(2).map_or("", |m| m.as_str());
        if key.is_empty() && indices.is_empty() {
            return None;
        }
        if !key.is_empty() {
            current = current.as_object()?.get(key)?;
        }
        for index in INDEX_PATTERN.captures_iter(indices) {
            let index: usize = index[1].parse().ok()?;
            current = current.as_array()?.get(index)?;
        }
    }
    Some(current)
}

/// First key of a path (`nodes` for `nodes.fetch.body[0]`)
pub fn root_name(expression: &str) -> &str {
    let head = expression.trim().split('.').next().unwrap_or("");
    head.split('[').next().unwrap_or("")
}

/// Inner expressions of every placeholder, in order
pub fn placeholders(template: &str) -> Vec<&str> {
    TEMPLATE_PATTERN
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim()))
        .collect()
}

/// Root names referenced by a template, first-seen order
pub fn referenced_roots(template: &str) -> Vec<String> {
    let mut roots: Vec<String> = Vec::new();
    for expression in placeholders(template) {
        let root = root_name(expression);
        if !root.is_empty() && !roots.iter().any(|r| r == root) {
            roots.push(root.to_string());
        }
    }
    roots
}

/// The inner expression when `text` is exactly one placeholder
pub fn lone_expression(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    let mut matches = TEMPLATE_PATTERN.captures_iter(trimmed);
    let caps = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    let whole = caps.get(0)?;
    if whole.start() != 0 || whole.end() != trimmed.len() {
        return None;
    }
    caps.get(1).map(|m| m.as_str().trim())
}

/// Render a value the way it appears inside interpolated text
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                n.to_string()
            } else {
                n.as_f64().map(format_float).unwrap_or_else(|| n.to_string())
            }
        }
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Shortest round-trip float text: `1.5`, `100.0`, `1e+16`, `1e-05`
fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = x.abs();
    if x == 0.0 || (1e-4..1e16).contains(&magnitude) {
        let text = format!("{}", x);
        if text.contains('.') {
            text
        } else {
            format!("{}.0", text)
        }
    } else {
        let text = format!("{:e}", x);
        match text.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => text,
        }
    }
}

/// Replace every placeholder in `template`
///
/// Unresolved expressions become empty strings and add one warning each.
pub fn interpolate(template: &str, variables: &Value) -> Interpolation {
    let mut result = Interpolation::default();
    let mut text = String::with_capacity(template.len());
    let mut last = 0;

    for caps in TEMPLATE_PATTERN.captures_iter(template) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        text.push_str(&template[last..whole.start()]);
        last = whole.end();

        let expression = inner.as_str().trim();
        let root = root_name(expression);
        if !root.is_empty() && !result.referenced.iter().any(|r| r == root) {
            result.referenced.push(root.to_string());
        }
        match resolve_path(expression, variables) {
            Some(value) => text.push_str(&stringify(value)),
            None => {
                let message = format!("Expression '{}' could not be resolved", expression);
                log::warn!("{}", message);
                result.warnings.push(message);
            }
        }
    }

    text.push_str(&template[last..]);
    result.text = text;
    result
}

/// Like `interpolate`, but a lone placeholder keeps the resolved value's type
///
/// Objects and arrays are rendered recursively; other non-string values are
/// returned unchanged.
pub fn render_value(template: &Value, variables: &Value) -> Value {
    match template {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), render_value(v, variables)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|v| render_value(v, variables)).collect()),
        Value::String(text) => match lone_expression(text) {
            Some(expression) => match resolve_path(expression, variables) {
                Some(value) => value.clone(),
                None => {
                    log::warn!("Expression '{}' could not be resolved", expression);
                    Value::Null
                }
            },
            None => Value::String(interpolate(text, variables).text),
        },
        other => other.clone(),
    }
}

/// Interpolate every string inside a value, always producing text for strings
pub fn interpolate_value(value: &Value, variables: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), interpolate_value(v, variables)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|v| interpolate_value(v, variables)).collect()),
        Value::String(text) => Value::String(interpolate(text, variables).text),
        other => other.clone(),
    }
}

/// Truthiness used by conditions and filters
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !FALSY_STRINGS.contains(&s.trim().to_lowercase().as_str()),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Judge an edge or branch condition
///
/// A missing or blank condition passes. A lone placeholder is judged on the
/// resolved value (unresolvable means false), anything else on its
/// interpolated text.
pub fn evaluate_condition(expression: Option<&str>, variables: &Value) -> bool {
    let Some(text) = expression.map(str::trim).filter(|t| !t.is_empty()) else {
        return true;
    };
    match lone_expression(text) {
        Some(inner) => match resolve_path(inner, variables) {
            Some(value) => is_truthy(value),
            None => {
                log::warn!("Condition expression '{}' could not be resolved", inner);
                false
            }
        },
        None => is_truthy(&Value::String(interpolate(text, variables).text)),
    }
}

/// Builds the variables mapping an expression is resolved against
///
/// Priority, lowest first: node outputs by id, the fixed roots, then the
/// node's `variables` config, whose values are themselves rendered against
/// the lower layers.
#[derive(Debug, Clone, Default)]
pub struct VariableScope {
    node_outputs: Map<String, Value>,
    roots: Map<String, Value>,
    overrides: Map<String, Value>,
}

impl VariableScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose a node's result under its id
    pub fn with_node_output(mut self, node_id: impl Into<String>, output: Value) -> Self {
        self.node_outputs.insert(node_id.into(), output);
        self
    }

    /// Set one of the fixed roots (`input`, `env`, ...)
    pub fn with_root(mut self, name: impl Into<String>, value: Value) -> Self {
        self.roots.insert(name.into(), value);
        self
    }

    /// Apply a node's `variables` config
    pub fn with_config_variables(mut self, variables: &Map<String, Value>) -> Self {
        for (name, value) in variables {
            self.overrides.insert(name.clone(), value.clone());
        }
        self
    }

    pub fn build(self) -> Value {
        let mut merged = self.node_outputs.clone();
        merged.insert("nodes".to_string(), Value::Object(self.node_outputs));
        for (name, value) in self.roots {
            merged.insert(name, value);
        }

        if self.overrides.is_empty() {
            return Value::Object(merged);
        }

        let base = Value::Object(merged.clone());
        for (name, value) in self.overrides {
            merged.insert(name, render_value(&value, &base));
        }
        Value::Object(merged)
    }
}
