//! Trigger nodes
//!
//! Entry points of a workflow. Each one hands the validated trigger payload
//! to the rest of the graph.

mod http_endpoint;
mod manual;
mod webhook;

pub use http_endpoint::HttpEndpointEmitter;
pub use manual::ManualTriggerEmitter;
pub use webhook::WebhookTriggerEmitter;
