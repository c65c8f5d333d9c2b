//! Control flow nodes
//!
//! Branching nodes return a dict with a `branch` key; the executor records
//! it and only follows outgoing edges whose source handle matches.

mod condition;
mod delay;
mod stop_and_error;
mod switch;

pub use condition::ConditionEmitter;
pub use delay::DelayEmitter;
pub use stop_and_error::StopAndErrorEmitter;
pub use switch::SwitchEmitter;

/// Comparison operators understood by `compare_values` in the runtime
pub(crate) const OPERATORS: &[&str] = &[
    "equals",
    "notEquals",
    "contains",
    "notContains",
    "startsWith",
    "endsWith",
    "greaterThan",
    "greaterThanOrEqual",
    "lessThan",
    "lessThanOrEqual",
    "isEmpty",
    "isNotEmpty",
    "truthy",
];
