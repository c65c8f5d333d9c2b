//! Switch node
//!
//! Multi-way branch: the first matching case selects the branch, otherwise
//! the default handle is taken.

use catalyst_core::{
    EmittedNode, FieldKind, FieldMetadata, NodeDefinition, NodeEmitter, NodeMetadata, NodeType,
    PortMetadata, Result,
};
use serde_json::json;

use crate::python::FunctionBuilder;

const BODY: &str = r#"variables = build_variables(ctx, config)
value = render_value(config["value"], variables)
cases = config["cases"]
if isinstance(cases, dict):
    cases = [{"value": key, "handle": handle} for key, handle in cases.items()]
if not isinstance(cases, list):
    raise NodeConfigurationError("'cases' must be a list or a mapping", node_id=node_id)
branch = str(config.get("defaultHandle") or "default")
matched = None
for index, case in enumerate(cases):
    if not isinstance(case, dict):
        raise NodeConfigurationError("Case %d must be an object" % index, node_id=node_id)
    expected = render_value(case.get("value"), variables)
    if compare_values(value, case.get("operator") or "equals", expected):
        branch = str(case.get("handle") or case.get("output") or index)
        matched = index
        break
return {"value": value, "branch": branch, "matchedCase": matched}"#;

/// Emits a multi-way branch
///
/// `cases` is either a list of `{"value", "handle", "operator"?}` objects or
/// a mapping of value to handle.
///
/// # Output
/// `{"value", "branch": str, "matchedCase": int | None}`
pub struct SwitchEmitter;

impl SwitchEmitter {
    pub const PORT_DEFAULT: &'static str = "default";
}

impl NodeEmitter for SwitchEmitter {
    fn node_type(&self) -> NodeType {
        NodeType::Switch
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(NodeType::Switch, "Switch", "Routes execution by matching a value against cases")
            .with_fields(vec![
                FieldMetadata::required("value", "Value", FieldKind::Template),
                FieldMetadata::required("cases", "Cases", FieldKind::Json)
                    .describe("List of {value, handle, operator?} or a value -> handle mapping"),
                FieldMetadata::optional("defaultHandle", "Default handle", FieldKind::Text)
                    .with_default(json!(Self::PORT_DEFAULT)),
            ])
            .with_outputs(vec![PortMetadata::conditional(Self::PORT_DEFAULT, "Default")])
    }

    fn emit(&self, node: &NodeDefinition) -> Result<EmittedNode> {
        let metadata = self.metadata();
        Ok(FunctionBuilder::new(node, &metadata).body(BODY).build())
    }
}
