//! Data nodes
//!
//! Database queries. The SQL text is never interpolated; values reach the
//! query only through bound `parameters`, each of which may be a template.

mod postgres;
mod sqlite;

pub use postgres::PostgresQueryEmitter;
pub use sqlite::SqliteQueryEmitter;

use catalyst_core::{FieldKind, FieldMetadata};

pub(crate) const FIELD_QUERY: &str = "query";
pub(crate) const FIELD_PARAMETERS: &str = "parameters";

/// Query and parameter fields shared by the SQL nodes
pub(crate) fn query_fields(placeholder_style: &str) -> Vec<FieldMetadata> {
    vec![
        FieldMetadata::required(FIELD_QUERY, "Query", FieldKind::Code)
            .describe(format!("SQL text with {} placeholders; not interpolated", placeholder_style)),
        FieldMetadata::optional(FIELD_PARAMETERS, "Parameters", FieldKind::Json)
            .describe("List of bound values; each may be a {{ }} template"),
    ]
}

/// Python lines rendering the bound parameters into `params`
pub(crate) const PARAMETERS: &str = r#"raw_params = config.get("parameters") or []
if not isinstance(raw_params, list):
    raise NodeConfigurationError("'parameters' must be a list", node_id=node_id)
params = [render_value(param, variables) for param in raw_params]"#;
