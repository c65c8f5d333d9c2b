//! Regex Extract node

use catalyst_core::{
    CompileError, EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata,
    NodeType, Result,
};

use crate::python::FunctionBuilder;

const FLAGS: &str = "imsx";

const BODY: &str = r#"variables = build_variables(ctx, config)
text = interpolate(config["text"], variables)
flag_map = {"i": re.IGNORECASE, "m": re.MULTILINE, "s": re.DOTALL, "x": re.VERBOSE}
flags = 0
for flag in str(config.get("flags") or ""):
    flags |= flag_map[flag]
try:
    pattern = re.compile(config["pattern"], flags)
except re.error as exc:
    raise NodeConfigurationError("Invalid pattern: %s" % exc, node_id=node_id) from exc
found = pattern.finditer(text) if config.get("global") else filter(None, [pattern.search(text)])
matches = [
    {"match": m.group(0), "groups": list(m.groups()), "named": m.groupdict(), "start": m.start(), "end": m.end()}
    for m in found
]
return {"matched": bool(matches), "first": matches[0] if matches else None, "matches": matches}"#;

/// Emits the regex extractor
///
/// Flags are checked at compile time; the pattern itself is compiled by
/// Python's `re` at run time.
pub struct RegexExtractEmitter;

impl NodeEmitter for RegexExtractEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::RegexExtract
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(NodeType::RegexExtract, "Regex Extract", "Extracts matches of a regular expression")
            .with_fields(vec![
                FieldMetadata::required("text", "Text", FieldKind::Template),
                FieldMetadata::required("pattern", "Pattern", FieldKind::Code)
                    .describe("Python regular expression"),
                FieldMetadata::optional("flags", "Flags", FieldKind::Text).describe("Any of i, m, s, x"),
                FieldMetadata::optional("global", "All matches", FieldKind::Boolean),
            ])
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        if let Some(flags) = node.config_str("flags") {
            if let Some(bad) = flags.chars().find(|c| !FLAGS.contains(*c)) {
                return Err(CompileError::invalid_config(
                    &node.id,
                    format!("unsupported regex flag '{}'", bad),
                ));
            }
        }
        let metadata = self.metadata();
        Ok(FunctionBuilder::new(node, &metadata).body(BODY).build())
    }
}
