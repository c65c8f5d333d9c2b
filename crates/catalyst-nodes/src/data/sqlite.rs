//! SQLite query node

use catalyst_core::{
    EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata, NodeType,
    Result,
};

use super::{query_fields, PARAMETERS};
use crate::python::FunctionBuilder;

const CONNECT: &str = r#"database = interpolate(config["database"], variables).strip()
if not database:
    raise NodeConfigurationError("'database' resolved to an empty path", node_id=node_id)
try:
    async with aiosqlite.connect(database) as db:
        db.row_factory = aiosqlite.Row
        cursor = await db.execute(config["query"], params)
        rows = [dict(row) for row in await cursor.fetchall()]
        await db.commit()
        row_count = len(rows) if cursor.description else cursor.rowcount
        last_row_id = cursor.lastrowid
except aiosqlite.Error as exc:
    raise NodeExecutionError("Query failed: %s" % exc, node_id=node_id) from exc
return {"rows": rows, "rowCount": row_count, "lastRowId": last_row_id}"#;

/// Emits a SQLite query through aiosqlite
///
/// # Output
/// `{"rows": [dict], "rowCount": int, "lastRowId": int | None}`
pub struct SqliteQueryEmitter;

impl SqliteQueryEmitter {
    pub const FIELD_DATABASE: &'static str = "database";
}

impl NodeEmitter for SqliteQueryEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::SqliteQuery
    }

    fn metadata(&self) -> NodeMetadata {
        let mut fields = vec![FieldMetadata::required(Self::FIELD_DATABASE, "Database", FieldKind::Template)
            .describe("Path of the database file")];
        fields.extend(query_fields("?"));
        NodeMetadata::new(NodeType::SqliteQuery, "SQLite Query", "Runs a SQL query on a SQLite file")
            .with_fields(fields)
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        let metadata = self.metadata();
        Ok(FunctionBuilder::new(node, &metadata)
            .requires("aiosqlite", "import aiosqlite")
            .line("variables = build_variables(ctx, config)")
            .body(PARAMETERS)
            .body(CONNECT)
            .build())
    }
}
