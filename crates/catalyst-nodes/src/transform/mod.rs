//! Transform nodes
//!
//! Reshape data between nodes. Sources are `{{ }}` expressions resolved with
//! `resolve_required`, so a missing source is a resolution error rather than
//! an empty string.

mod edit_fields;
mod filter_array;
mod json_transform;
mod regex_extract;
mod split_text;

pub use edit_fields::EditFieldsEmitter;
pub use filter_array::FilterArrayEmitter;
pub use json_transform::JsonTransformEmitter;
pub use regex_extract::RegexExtractEmitter;
pub use split_text::SplitTextEmitter;
