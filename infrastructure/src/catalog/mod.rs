//! JSON Schema catalog converter.
//!
//! Renders the domain operation registry into the wire tool definitions the
//! reasoning service sees. Bounds and enums come straight from each
//! parameter's [`ParamKind`], so the wire catalog can never drift from what
//! the validator enforces.

use easel_application::ports::catalog_schema::CatalogSchemaPort;
use easel_domain::catalog::color;
use easel_domain::{OperationSchema, ParamKind};

/// Default implementation producing provider-neutral JSON Schema.
pub struct JsonCatalogConverter;

fn param_schema_json(kind: &ParamKind, description: &str) -> serde_json::Value {
    match kind {
        ParamKind::Coordinate => serde_json::json!({
            "type": "number",
            "minimum": easel_domain::catalog::COORD_MIN,
            "maximum": easel_domain::catalog::COORD_MAX,
            "description": description,
        }),
        ParamKind::Size => serde_json::json!({
            "type": "number",
            "minimum": easel_domain::catalog::SIZE_MIN,
            "maximum": easel_domain::catalog::SIZE_MAX,
            "description": description,
        }),
        ParamKind::Opacity => serde_json::json!({
            "type": "number",
            "minimum": 0.0,
            "maximum": 1.0,
            "description": description,
        }),
        ParamKind::Rotation => serde_json::json!({
            "type": "number",
            "minimum": easel_domain::catalog::ROTATION_MIN,
            "maximum": easel_domain::catalog::ROTATION_MAX,
            "description": description,
        }),
        ParamKind::Color => serde_json::json!({
            "type": "string",
            "description": format!(
                "{} (#rrggbb hex, or one of: {})",
                description,
                color::color_names().join(", ")
            ),
        }),
        ParamKind::Text | ParamKind::ObjectId => serde_json::json!({
            "type": "string",
            "description": description,
        }),
        ParamKind::Choice(options) => serde_json::json!({
            "type": "string",
            "enum": options,
            "description": description,
        }),
        ParamKind::ObjectIdList { min } => serde_json::json!({
            "type": "array",
            "items": { "type": "string" },
            "minItems": min,
            "description": description,
        }),
    }
}

impl CatalogSchemaPort for JsonCatalogConverter {
    fn operation_to_schema(&self, op: &OperationSchema) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &op.params {
            properties.insert(
                param.name.to_string(),
                param_schema_json(&param.kind, param.description),
            );
            if param.required {
                required.push(serde_json::json!(param.name));
            }
        }

        serde_json::json!({
            "name": op.name,
            "description": op.description,
            "input_schema": {
                "type": "object",
                "properties": properties,
                "required": required,
            }
        })
    }
}
