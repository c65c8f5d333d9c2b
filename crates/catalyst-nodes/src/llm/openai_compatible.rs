//! OpenAI-style chat completion nodes
//!
//! OpenAI and Groq expose the same async chat completions client, so both
//! nodes share one generator parameterized by provider.

use catalyst_core::{EmittedNode, NodeDefinition, NodeEmitter, NodeMetadata, NodeType, Result};

use super::{completion_fields, completion_prelude, is_streaming};
use crate::python::FunctionBuilder;

/// Provider-specific names for an OpenAI-compatible client
struct ChatProvider {
    node_type: NodeType,
    label: &'static str,
    description: &'static str,
    package: &'static str,
    client_class: &'static str,
    api_key_env: &'static str,
    default_model: &'static str,
}

const OPENAI: ChatProvider = ChatProvider {
    node_type: NodeType::OpenaiCompletion,
    label: "OpenAI Completion",
    description: "Generates text with an OpenAI chat model",
    package: "openai",
    client_class: "AsyncOpenAI",
    api_key_env: "OPENAI_API_KEY",
    default_model: "gpt-4o-mini",
};

const GROQ: ChatProvider = ChatProvider {
    node_type: NodeType::GroqCompletion,
    label: "Groq Completion",
    description: "Generates text with a model hosted on Groq",
    package: "groq",
    client_class: "AsyncGroq",
    api_key_env: "GROQ_API_KEY",
    default_model: "llama-3.1-8b-instant",
};

const COMPLETE: &str = r#"try:
    response = await client.chat.completions.create(**request)
except Exception as exc:
    raise NodeExecutionError("%s request failed: %s" % (provider, exc), node_id=node_id) from exc
choice = response.choices[0]
usage = response.usage
return {
    "text": choice.message.content or "",
    "model": response.model,
    "finishReason": choice.finish_reason,
    "usage": {"inputTokens": usage.prompt_tokens, "outputTokens": usage.completion_tokens} if usage else None,
}"#;

const STREAM: &str = r#"chunks = []
finish_reason = None
try:
    stream = await client.chat.completions.create(stream=True, **request)
    async for chunk in stream:
        if not chunk.choices:
            continue
        choice = chunk.choices[0]
        if choice.delta and choice.delta.content:
            chunks.append(choice.delta.content)
        if choice.finish_reason:
            finish_reason = choice.finish_reason
except Exception as exc:
    raise NodeExecutionError("%s streaming request failed: %s" % (provider, exc), node_id=node_id) from exc
return {
    "text": "".join(chunks),
    "model": request["model"],
    "finishReason": finish_reason,
    "chunks": len(chunks),
}"#;

impl ChatProvider {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(self.node_type, self.label, self.description)
            .with_fields(completion_fields(self.default_model, self.api_key_env))
            .streaming()
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        let metadata = self.metadata();
        let request = format!(
            r#"provider = "{label}"
client = {class}(api_key=api_key)
messages = []
if system_prompt:
    messages.append({{"role": "system", "content": system_prompt}})
messages.append({{"role": "user", "content": prompt}})
request = {{"model": config.get("model") or "{model}", "messages": messages}}
if config.get("maxTokens") is not None:
    request["max_tokens"] = int(config["maxTokens"])
if config.get("temperature") is not None:
    request["temperature"] = float(config["temperature"])"#,
            label = self.label.trim_end_matches(" Completion"),
            class = self.client_class,
            model = self.default_model,
        );

        let builder = FunctionBuilder::new(node, &metadata)
            .requires(
                self.package,
                &format!("from {} import {}", self.package, self.client_class),
            )
            .body(&completion_prelude(self.api_key_env))
            .body(&request);

        let builder = if is_streaming(node) {
            log::debug!("Emitting streaming {} call for node '{}'", self.label, node.id);
            builder.body(STREAM)
        } else {
            builder.body(COMPLETE)
        };
        Ok(builder.build())
    }
}

/// Emits an OpenAI chat completion call
pub struct OpenAiCompletionEmitter;

impl NodeEmitter for OpenAiCompletionEmitter {
    fn node_type(&self) -> NodeType {
        OPENAI.node_type
    }

    fn metadata(&self) -> NodeMetadata {
        OPENAI.metadata()
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        OPENAI.emit(node)
    }
}

/// Emits a Groq chat completion call
pub struct GroqCompletionEmitter;

impl NodeEmitter for GroqCompletionEmitter {
    fn node_type(&self) -> NodeType {
        GROQ.node_type
    }

    fn metadata(&self) -> NodeMetadata {
        GROQ.metadata()
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        GROQ.emit(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_openai_completion() {
        let node = NodeDefinition::new("chat", "openaiCompletion", "Chat")
            .with_config(json!({"prompt": "Hi", "model": "gpt-4o"}));
        let emitted = OpenAiCompletionEmitter.emit(&node).unwrap();
        let src = &emitted.function_source;
        assert_eq!(emitted.dependencies, vec!["openai"]);
        assert!(src.contains("from openai import AsyncOpenAI"));
        assert!(src.contains("client = AsyncOpenAI(api_key=api_key)"));
        assert!(src.contains("provider = \"OpenAI\""));
        assert!(!src.contains("stream=True"));
        assert!(!src.contains("async for"));
    }

    #[test]
    fn test_groq_streaming() {
        let node = NodeDefinition::new("chat", "groqCompletion", "Chat")
            .with_config(json!({"prompt": "Hi", "stream": true}));
        let emitted = GroqCompletionEmitter.emit(&node).unwrap();
        let src = &emitted.function_source;
        assert_eq!(emitted.dependencies, vec!["groq"]);
        assert!(src.contains("client = AsyncGroq(api_key=api_key)"));
        assert!(src.contains("os.environ.get(\"GROQ_API_KEY\")"));
        assert!(src.contains("create(stream=True, **request)"));
        assert!(src.contains("async for chunk in stream:"));
    }

    #[test]
    fn test_metadata_supports_streaming() {
        assert!(OpenAiCompletionEmitter.metadata().supports_streaming);
        assert_eq!(GroqCompletionEmitter.metadata().node_type, NodeType::GroqCompletion);
    }
}
