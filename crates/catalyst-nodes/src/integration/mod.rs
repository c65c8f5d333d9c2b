//! Integration nodes
//!
//! Calls to external services.

mod http_request;

pub use http_request::HttpRequestEmitter;
