//! Declared node types without an emitter
//!
//! The canvas can place these, and validation warns about them, but
//! compiling a workflow that contains one fails.

use catalyst_core::{NodeMetadata, NodeType};

/// Metadata for a node type that has no emitter yet
///
/// Returns `None` for implemented types.
pub fn stub_metadata(node_type: NodeType) -> Option<NodeMetadata> {
    let (label, description) = match node_type {
        NodeType::ScheduleTrigger => ("Schedule", "Starts the workflow on a cron schedule"),
        NodeType::EmailTrigger => ("Email Trigger", "Starts the workflow when an email arrives"),
        NodeType::QueueTrigger => ("Queue Trigger", "Starts the workflow from a message queue"),
        NodeType::FileWatchTrigger => ("File Watch", "Starts the workflow when a file changes"),
        NodeType::GeminiCompletion => ("Gemini Completion", "Generates text with a Google Gemini model"),
        NodeType::OllamaCompletion => ("Ollama Completion", "Generates text with a local Ollama model"),
        NodeType::EmbeddingGenerate => ("Generate Embedding", "Turns text into an embedding vector"),
        NodeType::TextClassifier => ("Text Classifier", "Assigns a label to text"),
        NodeType::AgentTool => ("Agent Tool", "Exposes a sub-graph as an agent tool"),
        NodeType::VectorSearch => ("Vector Search", "Finds the nearest stored vectors"),
        NodeType::MysqlQuery => ("MySQL Query", "Runs a SQL query on MySQL"),
        NodeType::MongoQuery => ("MongoDB Query", "Queries a MongoDB collection"),
        NodeType::RedisGet => ("Redis Get", "Reads a key from Redis"),
        NodeType::RedisSet => ("Redis Set", "Writes a key to Redis"),
        NodeType::S3Upload => ("S3 Upload", "Uploads an object to S3"),
        NodeType::S3Download => ("S3 Download", "Downloads an object from S3"),
        NodeType::VectorUpsert => ("Vector Upsert", "Stores vectors in a vector database"),
        NodeType::Loop => ("Loop", "Runs the downstream nodes once per item"),
        NodeType::Parallel => ("Parallel", "Runs branches concurrently"),
        NodeType::Aggregate => ("Aggregate", "Collects results from parallel branches"),
        NodeType::Merge => ("Merge", "Waits for several branches and combines them"),
        NodeType::SubWorkflow => ("Sub-workflow", "Runs another workflow of the project"),
        NodeType::MapArray => ("Map Array", "Transforms every element of a list"),
        NodeType::SortArray => ("Sort Array", "Sorts a list"),
        NodeType::MergeObjects => ("Merge Objects", "Deep-merges several objects"),
        NodeType::DateFormat => ("Date Format", "Parses and formats dates"),
        NodeType::CodeSnippet => ("Code", "Runs a user-written code snippet"),
        NodeType::SendEmail => ("Send Email", "Sends an email"),
        NodeType::SlackMessage => ("Slack Message", "Posts a message to Slack"),
        NodeType::DiscordMessage => ("Discord Message", "Posts a message to Discord"),
        NodeType::GithubIssue => ("GitHub Issue", "Creates a GitHub issue"),
        NodeType::GraphqlRequest => ("GraphQL Request", "Calls a GraphQL API"),
        NodeType::RandomValue => ("Random Value", "Generates a random number or id"),
        _ => return None,
    };
    Some(NodeMetadata::new(node_type, label, description).stub())
}
