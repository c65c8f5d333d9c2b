//! AI nodes
//!
//! Prompt rendering and chat completions. Completion nodes share one field
//! layout and one prelude; only these nodes may emit streaming code, and only
//! when `config.stream` is true.

mod anthropic;
mod openai_compatible;
mod prompt_template;

pub use anthropic::AnthropicCompletionEmitter;
pub use openai_compatible::{GroqCompletionEmitter, OpenAiCompletionEmitter};
pub use prompt_template::PromptTemplateEmitter;

use catalyst_core::{FieldKind, FieldMetadata, NodeDefinition};
use serde_json::json;

pub(crate) const FIELD_PROMPT: &str = "prompt";
pub(crate) const FIELD_STREAM: &str = "stream";

/// Fields shared by every completion node
pub(crate) fn completion_fields(default_model: &str, api_key_env: &str) -> Vec<FieldMetadata> {
    vec![
        FieldMetadata::required(FIELD_PROMPT, "Prompt", FieldKind::Template)
            .describe("User message; supports {{ }} placeholders"),
        FieldMetadata::optional("model", "Model", FieldKind::Text).with_default(json!(default_model)),
        FieldMetadata::optional("systemPrompt", "System prompt", FieldKind::Template),
        FieldMetadata::optional("apiKey", "API key", FieldKind::Secret)
            .describe(&format!("Template such as {{{{ secrets.key }}}}; defaults to ${}", api_key_env)),
        FieldMetadata::optional("temperature", "Temperature", FieldKind::Number),
        FieldMetadata::optional("maxTokens", "Max tokens", FieldKind::Number).with_default(json!(1024)),
        FieldMetadata::optional(FIELD_STREAM, "Stream", FieldKind::Boolean)
            .with_default(json!(false))
            .describe("Accumulate the response from a streaming request"),
    ]
}

/// Whether the node asked for a streaming request
pub(crate) fn is_streaming(node: &NodeDefinition) -> bool {
    node.config_bool(FIELD_STREAM).unwrap_or(false)
}

/// Python lines resolving the prompt, system prompt and API key
pub(crate) fn completion_prelude(api_key_env: &str) -> String {
    format!(
        r#"variables = build_variables(ctx, config)
prompt = interpolate(config["prompt"], variables)
system_prompt = interpolate(config.get("systemPrompt") or "", variables).strip()
api_key = interpolate(config.get("apiKey") or "", variables).strip() or os.environ.get("{env}")
if not api_key:
    raise NodeConfigurationError("No API key configured: set apiKey or {env}", node_id=node_id)"#,
        env = api_key_env
    )
}
