//! HTTP Request node
//!
//! Calls an HTTP API through httpx. URL, headers, query and body are all
//! templates; a JSON-shaped body is sent as JSON, anything else as text.

use catalyst_core::{
    CompileError, EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata,
    NodeType, Result,
};
use serde_json::json;

use crate::python::FunctionBuilder;

const METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

const BODY: &str = r#"variables = build_variables(ctx, config)
url = interpolate(config["url"], variables).strip()
if not url:
    raise NodeConfigurationError("'url' resolved to an empty string", node_id=node_id)
method = str(config.get("method") or "GET").upper()
headers = interpolate_value(config.get("headers") or {}, variables)
if not isinstance(headers, dict):
    raise NodeConfigurationError("'headers' must be an object", node_id=node_id)
query = render_value(config.get("query") or {}, variables)
if not isinstance(query, dict):
    raise NodeConfigurationError("'query' must be an object", node_id=node_id)
request = {
    "headers": {str(key): stringify_value(value) for key, value in headers.items()},
    "params": {str(key): stringify_value(value) for key, value in query.items()},
}
if config.get("body") is not None and method not in ("GET", "HEAD"):
    body = render_value(config["body"], variables)
    if isinstance(body, (dict, list)):
        request["json"] = body
    else:
        request["content"] = stringify_value(body)
timeout = float(config.get("timeoutSeconds") or 30)
try:
    async with httpx.AsyncClient(timeout=timeout, follow_redirects=True) as client:
        response = await client.request(method, url, **request)
except httpx.HTTPError as exc:
    raise NodeExecutionError("%s %s failed: %s" % (method, url, exc), node_id=node_id) from exc
if response.status_code >= 400 and config.get("failOnStatus", True):
    raise NodeExecutionError("%s %s returned HTTP %d" % (method, url, response.status_code), node_id=node_id)
try:
    data = response.json()
except ValueError:
    data = response.text
return {"status": response.status_code, "ok": response.is_success, "headers": dict(response.headers), "body": data}"#;

/// Emits an outgoing HTTP call
///
/// # Output
/// `{"status": int, "ok": bool, "headers": dict, "body": JSON | str}`
pub struct HttpRequestEmitter;

impl NodeEmitter for HttpRequestEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::HttpRequest
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(NodeType::HttpRequest, "HTTP Request", "Calls an HTTP API")
            .with_fields(vec![
                FieldMetadata::required("url", "URL", FieldKind::Template),
                FieldMetadata::optional("method", "Method", FieldKind::Select)
                    .with_options(METHODS)
                    .with_default(json!("GET")),
                FieldMetadata::optional("headers", "Headers", FieldKind::Json),
                FieldMetadata::optional("query", "Query parameters", FieldKind::Json),
                FieldMetadata::optional("body", "Body", FieldKind::Json)
                    .describe("Ignored for GET and HEAD"),
                FieldMetadata::optional("timeoutSeconds", "Timeout (s)", FieldKind::Number)
                    .with_default(json!(30)),
                FieldMetadata::optional("failOnStatus", "Fail on 4xx/5xx", FieldKind::Boolean)
                    .with_default(json!(true)),
            ])
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        if let Some(method) = node.config_str("method") {
            let upper = method.trim().to_uppercase();
            if !METHODS.contains(&upper.as_str()) {
                return Err(CompileError::invalid_config(
                    &node.id,
                    format!("unsupported HTTP method '{}'", method),
                ));
            }
        }
        let metadata = self.metadata();
        Ok(FunctionBuilder::new(node, &metadata)
            .requires("httpx", "import httpx")
            .body(BODY)
            .build())
    }
}
