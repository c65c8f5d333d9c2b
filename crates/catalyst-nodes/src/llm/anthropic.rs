//! Anthropic completion node

use catalyst_core::{EmittedNode, NodeDefinition, NodeEmitter, NodeMetadata, NodeType, Result};

use super::{completion_fields, completion_prelude, is_streaming};
use crate::python::FunctionBuilder;

const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const REQUEST: &str = r#"client = AsyncAnthropic(api_key=api_key)
request = {
    "model": config.get("model") or "claude-3-5-sonnet-latest",
    "max_tokens": int(config.get("maxTokens") or 1024),
    "messages": [{"role": "user", "content": prompt}],
}
if system_prompt:
    request["system"] = system_prompt
if config.get("temperature") is not None:
    request["temperature"] = float(config["temperature"])"#;

const COMPLETE: &str = r#"try:
    response = await client.messages.create(**request)
except Exception as exc:
    raise NodeExecutionError("Anthropic request failed: %s" % exc, node_id=node_id) from exc
text = "".join(getattr(block, "text", "") for block in response.content)
return {
    "text": text,
    "model": response.model,
    "stopReason": response.stop_reason,
    "usage": {"inputTokens": response.usage.input_tokens, "outputTokens": response.usage.output_tokens},
}"#;

const STREAM: &str = r#"chunks = []
try:
    async with client.messages.stream(**request) as stream:
        async for delta in stream.text_stream:
            chunks.append(delta)
        final = await stream.get_final_message()
except Exception as exc:
    raise NodeExecutionError("Anthropic streaming request failed: %s" % exc, node_id=node_id) from exc
return {
    "text": "".join(chunks),
    "model": final.model,
    "stopReason": final.stop_reason,
    "usage": {"inputTokens": final.usage.input_tokens, "outputTokens": final.usage.output_tokens},
    "chunks": len(chunks),
}"#;

/// Emits an Anthropic Messages API call
///
/// # Output
/// `{"text", "model", "stopReason", "usage"}`; streaming runs add `chunks`.
pub struct AnthropicCompletionEmitter;

impl NodeEmitter for AnthropicCompletionEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::AnthropicCompletion
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(
            NodeType::AnthropicCompletion,
            "Anthropic Completion",
            "Generates text with an Anthropic Claude model",
        )
        .with_fields(completion_fields(DEFAULT_MODEL, API_KEY_ENV))
        .streaming()
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        let metadata = self.metadata();
        let builder = FunctionBuilder::new(node, &metadata)
            .requires("anthropic", "from anthropic import AsyncAnthropic")
            .body(&completion_prelude(API_KEY_ENV))
            .body(REQUEST);

        let builder = if is_streaming(node) {
            log::debug!("Emitting streaming Anthropic call for node '{}'", node.id);
            builder.body(STREAM)
        } else {
            builder.body(COMPLETE)
        };
        Ok(builder.build())
    }
}
