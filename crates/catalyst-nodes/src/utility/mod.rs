//! Utility nodes
//!
//! Logging, per-execution variables, HTTP response shaping and pass-through.

mod http_response;
mod log_message;
mod no_op;
mod set_variable;

pub use http_response::HttpResponseEmitter;
pub use log_message::LogMessageEmitter;
pub use no_op::NoOpEmitter;
pub use set_variable::SetVariableEmitter;
