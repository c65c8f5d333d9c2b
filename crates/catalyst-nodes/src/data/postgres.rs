//! PostgreSQL query node

use catalyst_core::{
    EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata, NodeType,
    Result,
};

use super::{query_fields, PARAMETERS};
use crate::python::FunctionBuilder;

const BODY: &str = r#"dsn = interpolate(config.get("connectionString") or "", variables).strip() or os.environ.get("DATABASE_URL")
if not dsn:
    raise NodeConfigurationError("No connection string: set connectionString or DATABASE_URL", node_id=node_id)
try:
    connection = await asyncpg.connect(dsn)
except (OSError, asyncpg.PostgresError) as exc:
    raise NodeExecutionError("Could not connect to PostgreSQL: %s" % exc, node_id=node_id) from exc
try:
    records = await connection.fetch(config["query"], *params)
except asyncpg.PostgresError as exc:
    raise NodeExecutionError("Query failed: %s" % exc, node_id=node_id) from exc
finally:
    await connection.close()
rows = [dict(record) for record in records]
return {"rows": rows, "rowCount": len(rows)}"#;

/// Emits a PostgreSQL query through asyncpg
///
/// # Output
/// `{"rows": [dict], "rowCount": int}`
pub struct PostgresQueryEmitter;

impl NodeEmitter for PostgresQueryEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::PostgresQuery
    }

    fn metadata(&self) -> NodeMetadata {
        let mut fields = query_fields("$1, $2, ...");
        fields.push(
            FieldMetadata::optional("connectionString", "Connection string", FieldKind::Secret)
                .describe("Template such as {{ secrets.db }}; defaults to $DATABASE_URL"),
        );
        NodeMetadata::new(NodeType::PostgresQuery, "PostgreSQL Query", "Runs a SQL query on PostgreSQL")
            .with_fields(fields)
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        let metadata = self.metadata();
        Ok(FunctionBuilder::new(node, &metadata)
            .requires("asyncpg", "import asyncpg")
            .line("variables = build_variables(ctx, config)")
            .body(PARAMETERS)
            .body(BODY)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_emit_postgres_query() {
        let node = NodeDefinition::new("users", "postgresQuery", "Users").with_config(json!({
            "query": "SELECT * FROM users WHERE id = $1",
            "parameters": ["{{ input.userId }}"]
        }));
        let emitted = PostgresQueryEmitter.emit(&node).unwrap();
        let src = &emitted.function_source;
        assert_eq!(emitted.dependencies, vec!["asyncpg"]);
        assert!(src.contains("params = [render_value(param, variables) for param in raw_params]"));
        assert!(src.contains("await connection.fetch(config[\"query\"], *params)"));
        assert!(!src.contains("interpolate(config[\"query\"]"));
        assert!(src.contains("_require_config(node_id, config, [\"query\"])"));
    }
}
