//! Catalyst Nodes
//!
//! Code emitters for every implemented node type, plus metadata for the
//! declared-but-unimplemented ones.
//!
//! # Categories
//!
//! - **Trigger**: HTTP endpoint, webhook and manual entry points
//! - **AI**: Prompt templates and chat completions (Anthropic, OpenAI, Groq)
//! - **Data**: PostgreSQL and SQLite queries
//! - **Control**: Condition, switch, delay and stop
//! - **Transform**: Field editing, JSON reshaping, filtering, splitting, regex
//! - **Integration**: Outgoing HTTP requests
//! - **Utility**: Logging, variables, HTTP responses and pass-through
//!
//! Each emitter produces one self-contained async Python function; the
//! shared frame lives in `python`.

pub mod control;
pub mod data;
pub mod integration;
pub mod llm;
pub mod python;
pub mod stubs;
pub mod transform;
pub mod trigger;
pub mod utility;

use std::sync::Arc;

use catalyst_core::{NodeEmitter, NodeRegistry, NodeType};

pub use control::{ConditionEmitter, DelayEmitter, StopAndErrorEmitter, SwitchEmitter};
pub use data::{PostgresQueryEmitter, SqliteQueryEmitter};
pub use integration::HttpRequestEmitter;
pub use llm::{
    AnthropicCompletionEmitter, GroqCompletionEmitter, OpenAiCompletionEmitter,
    PromptTemplateEmitter,
};
pub use transform::{
    EditFieldsEmitter, FilterArrayEmitter, JsonTransformEmitter, RegexExtractEmitter,
    SplitTextEmitter,
};
pub use trigger::{HttpEndpointEmitter, ManualTriggerEmitter, WebhookTriggerEmitter};
pub use utility::{HttpResponseEmitter, LogMessageEmitter, NoOpEmitter, SetVariableEmitter};

/// The emitter for a node type, or `None` for stub types
pub fn emitter_for(node_type: NodeType) -> Option<Arc<dyn NodeEmitter>> {
    let emitter: Arc<dyn NodeEmitter> = match node_type {
        NodeType::HttpEndpoint => Arc::new(HttpEndpointEmitter),
        NodeType::WebhookTrigger => Arc::new(WebhookTriggerEmitter),
        NodeType::ManualTrigger => Arc::new(ManualTriggerEmitter),
        NodeType::PromptTemplate => Arc::new(PromptTemplateEmitter),
        NodeType::AnthropicCompletion => Arc::new(AnthropicCompletionEmitter),
        NodeType::OpenaiCompletion => Arc::new(OpenAiCompletionEmitter),
        NodeType::GroqCompletion => Arc::new(GroqCompletionEmitter),
        NodeType::PostgresQuery => Arc::new(PostgresQueryEmitter),
        NodeType::SqliteQuery => Arc::new(SqliteQueryEmitter),
        NodeType::Condition => Arc::new(ConditionEmitter),
        NodeType::Switch => Arc::new(SwitchEmitter),
        NodeType::Delay => Arc::new(DelayEmitter),
        NodeType::StopAndError => Arc::new(StopAndErrorEmitter),
        NodeType::EditFields => Arc::new(EditFieldsEmitter),
        NodeType::JsonTransform => Arc::new(JsonTransformEmitter),
        NodeType::FilterArray => Arc::new(FilterArrayEmitter),
        NodeType::SplitText => Arc::new(SplitTextEmitter),
        NodeType::RegexExtract => Arc::new(RegexExtractEmitter),
        NodeType::HttpRequest => Arc::new(HttpRequestEmitter),
        NodeType::LogMessage => Arc::new(LogMessageEmitter),
        NodeType::SetVariable => Arc::new(SetVariableEmitter),
        NodeType::HttpResponse => Arc::new(HttpResponseEmitter),
        NodeType::NoOp => Arc::new(NoOpEmitter),
        NodeType::ScheduleTrigger
        | NodeType::EmailTrigger
        | NodeType::QueueTrigger
        | NodeType::FileWatchTrigger
        | NodeType::GeminiCompletion
        | NodeType::OllamaCompletion
        | NodeType::EmbeddingGenerate
        | NodeType::TextClassifier
        | NodeType::AgentTool
        | NodeType::VectorSearch
        | NodeType::MysqlQuery
        | NodeType::MongoQuery
        | NodeType::RedisGet
        | NodeType::RedisSet
        | NodeType::S3Upload
        | NodeType::S3Download
        | NodeType::VectorUpsert
        | NodeType::Loop
        | NodeType::Parallel
        | NodeType::Aggregate
        | NodeType::Merge
        | NodeType::SubWorkflow
        | NodeType::MapArray
        | NodeType::SortArray
        | NodeType::MergeObjects
        | NodeType::DateFormat
        | NodeType::CodeSnippet
        | NodeType::SendEmail
        | NodeType::SlackMessage
        | NodeType::DiscordMessage
        | NodeType::GithubIssue
        | NodeType::GraphqlRequest
        | NodeType::RandomValue => return None,
    };
    Some(emitter)
}

/// Build the registry of every node type
///
/// Implemented types are registered with their emitter, the rest with stub
/// metadata only.
pub fn builtin_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    for node_type in NodeType::ALL {
        if let Some(emitter) = emitter_for(*node_type) {
            registry.register(emitter);
        } else if let Some(metadata) = stubs::stub_metadata(*node_type) {
            registry.register_metadata(metadata);
        } else {
            log::warn!("Node type '{}' has neither an emitter nor stub metadata", node_type);
        }
    }
    log::debug!(
        "Built node registry: {} types, {} implemented",
        registry.len(),
        registry.implemented_types().len()
    );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalyst_core::{NodeCategory, NodeDefinition};
    use serde_json::{json, Value};

    #[test]
    fn test_registry_covers_all_types() {
        let registry = builtin_registry();
        assert_eq!(registry.len(), NodeType::ALL.len());
        assert_eq!(registry.implemented_types().len(), 23);

        assert!(registry.has_node_type("promptTemplate"));
        assert!(registry.has_node_type("parallel"));
        assert!(registry.get_emitter(NodeType::Parallel).is_none());
        assert!(registry.get_emitter(NodeType::Aggregate).is_none());
    }

    #[test]
    fn test_emitter_metadata_matches_type() {
        for node_type in NodeType::ALL {
            if let Some(emitter) = emitter_for(*node_type) {
                assert_eq!(emitter.node_type(), *node_type);
                let meta = emitter.metadata();
                assert_eq!(meta.node_type, *node_type);
                assert!(meta.implemented);
            }
        }
    }

    #[test]
    fn test_only_completions_stream() {
        let registry = builtin_registry();
        let streaming: Vec<NodeType> = registry
            .all_metadata()
            .into_iter()
            .filter(|m| m.supports_streaming)
            .map(|m| m.node_type)
            .collect();
        assert_eq!(
            streaming,
            vec![
                NodeType::AnthropicCompletion,
                NodeType::OpenaiCompletion,
                NodeType::GroqCompletion
            ]
        );
    }

    #[test]
    fn test_non_streaming_emitters_ignore_stream_flag() {
        for node_type in NodeType::ALL {
            let Some(emitter) = emitter_for(*node_type) else {
                continue;
            };
            if emitter.metadata().supports_streaming {
                continue;
            }
            // Fill every required field so the emitters accept the node
            let mut config = serde_json::Map::new();
            for field in emitter.metadata().required_fields() {
                config.insert(field.to_string(), json!("x"));
            }
            config.insert("stream".to_string(), Value::Bool(true));
            let node = NodeDefinition::new("n", node_type.as_str(), "N").with_config(Value::Object(config));

            let emitted = emitter.emit(&node).unwrap();
            assert!(!emitted.function_source.contains("async for"), "{}", node_type);
            assert!(!emitted.function_source.contains("stream=True"), "{}", node_type);
        }
    }

    #[test]
    fn test_emitters_check_required_config() {
        for node_type in NodeType::ALL {
            let Some(emitter) = emitter_for(*node_type) else {
                continue;
            };
            let meta = emitter.metadata();
            if meta.required_fields().is_empty() {
                continue;
            }
            let node = NodeDefinition::new("n", node_type.as_str(), "N");
            let emitted = emitter.emit(&node).unwrap();
            assert!(
                emitted.function_source.contains("_require_config(node_id, config, ["),
                "{} does not check its required config",
                node_type
            );
        }
    }

    #[test]
    fn test_every_category_has_an_implemented_type() {
        let registry = builtin_registry();
        let grouped = registry.metadata_by_category();
        for category in [
            NodeCategory::Trigger,
            NodeCategory::Ai,
            NodeCategory::Data,
            NodeCategory::Control,
            NodeCategory::Transform,
            NodeCategory::Integration,
            NodeCategory::Utility,
        ] {
            let implemented = grouped
                .get(&category)
                .map(|metas| metas.iter().filter(|m| m.implemented).count())
                .unwrap_or(0);
            assert!(implemented > 0, "{} has no implemented node", category.label());
        }
    }
}
