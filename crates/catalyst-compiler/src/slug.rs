//! Workflow name to identifier conversion

use crate::constants::defaults;

/// Turn a display name into a route and file identifier
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into a
/// single `_` and trims underscores at both ends. An empty result becomes
/// `workflow`.
pub fn sanitize_workflow_name(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }
    if slug.is_empty() {
        defaults::WORKFLOW_SLUG.to_string()
    } else {
        slug
    }
}
