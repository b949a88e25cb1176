//! Tool-call validator.
//!
//! Two independent passes over every operation call returned by the
//! reasoning service:
//!
//! 1. **Schema pass** — the operation name must exist in the registry and
//!    every parameter must satisfy its declared type, bounds, enum, and
//!    cardinality rules.
//! 2. **Reference pass** — every parameter declared as an object reference
//!    must name ids present in the live id set, which is read after the
//!    summarizer ran so objects deleted between snapshot and validation are
//!    caught here.
//!
//! Both passes must pass for a call to be accepted. Rejections carry a
//! per-operation reason list; callers treat a batch with any rejection as a
//! validation failure and execute none of it.

use std::collections::HashSet;

use serde_json::Value;

use crate::canvas::ObjectKind;
use crate::catalog::color::resolve_color;
use crate::catalog::{OperationRegistry, OperationSchema, names};
use crate::operation::{AlignEdge, DistributeAxis, OperationCall, ValidatedOperation};

/// A call that failed validation, with every reason collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOperation {
    pub name: String,
    pub reasons: Vec<String>,
}

impl RejectedOperation {
    pub fn describe(&self) -> String {
        format!("{}: {}", self.name, self.reasons.join("; "))
    }
}

/// Result of validating one batch of operation calls.
#[derive(Debug, Default)]
pub struct ValidationOutcome {
    pub accepted: Vec<ValidatedOperation>,
    pub rejected: Vec<RejectedOperation>,
}

impl ValidationOutcome {
    /// True when every call in the batch was accepted
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// All rejection reasons, flattened for the user-facing error message
    pub fn rejection_reasons(&self) -> Vec<String> {
        self.rejected
            .iter()
            .flat_map(|r| r.reasons.iter().cloned())
            .collect()
    }
}

/// Validate a batch of calls against the registry and the live id set.
pub fn validate_calls(
    registry: &OperationRegistry,
    calls: &[OperationCall],
    live_ids: &HashSet<String>,
) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();

    for call in calls {
        let Some(schema) = registry.get(&call.name) else {
            outcome.rejected.push(RejectedOperation {
                name: call.name.clone(),
                reasons: vec![format!("Unknown operation: {}", call.name)],
            });
            continue;
        };

        let mut reasons = schema_pass(schema, call);
        reasons.extend(reference_pass(schema, call, live_ids));

        if !reasons.is_empty() {
            outcome.rejected.push(RejectedOperation {
                name: call.name.clone(),
                reasons,
            });
            continue;
        }

        match build_validated(call) {
            Ok(op) => outcome.accepted.push(op),
            Err(reason) => outcome.rejected.push(RejectedOperation {
                name: call.name.clone(),
                reasons: vec![reason],
            }),
        }
    }

    outcome
}

/// Check declared types, bounds, enums, and required fields.
fn schema_pass(schema: &OperationSchema, call: &OperationCall) -> Vec<String> {
    let mut reasons = Vec::new();

    for param in &schema.params {
        match call.get(param.name) {
            None if param.required => {
                reasons.push(format!("Missing required parameter: {}", param.name));
            }
            None => {}
            Some(value) => {
                if let Err(reason) = param.kind.check(value) {
                    reasons.push(format!("{}: {}", param.name, reason));
                }
            }
        }
    }

    // style_shape is a no-op without at least one styled field
    if schema.name == names::STYLE_SHAPE
        && call.get("color").is_none()
        && call.get("opacity").is_none()
    {
        reasons.push("at least one of color or opacity is required".to_string());
    }

    reasons
}

/// Check referenced object ids against the live id set.
///
/// Runs on the raw arguments so a schema failure elsewhere in the call does
/// not mask a dangling reference.
fn reference_pass(
    schema: &OperationSchema,
    call: &OperationCall,
    live_ids: &HashSet<String>,
) -> Vec<String> {
    let mut reasons = Vec::new();

    for param in schema.params.iter().filter(|p| p.kind.references_objects()) {
        let Some(value) = call.get(param.name) else {
            continue;
        };
        for id in extract_ids(value) {
            if !live_ids.contains(id) {
                reasons.push(format!(
                    "{}: Shape ID \"{}\" does not exist",
                    call.name, id
                ));
            }
        }
    }

    reasons
}

fn extract_ids(value: &Value) -> Vec<&str> {
    match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(|v| v.as_str()).collect(),
        _ => Vec::new(),
    }
}

/// Construct the typed operation from a call that passed both passes.
fn build_validated(call: &OperationCall) -> Result<ValidatedOperation, String> {
    let str_arg = |key: &str| -> Result<String, String> {
        call.get_str(key)
            .map(String::from)
            .ok_or_else(|| format!("Missing required parameter: {}", key))
    };
    let num_arg = |key: &str| -> Result<f64, String> {
        call.get_f64(key)
            .ok_or_else(|| format!("Missing required parameter: {}", key))
    };
    let color_arg = |key: &str| -> Result<Option<String>, String> {
        match call.get_str(key) {
            Some(raw) => resolve_color(raw)
                .map(Some)
                .ok_or_else(|| format!("{}: unrecognized color", key)),
            None => Ok(None),
        }
    };
    let ids_arg = |key: &str| -> Result<Vec<String>, String> {
        call.get_str_list(key)
            .ok_or_else(|| format!("Missing required parameter: {}", key))
    };

    match call.name.as_str() {
        names::CREATE_SHAPE => Ok(ValidatedOperation::CreateShape {
            kind: ObjectKind::parse(&str_arg("shape_type")?)
                .ok_or_else(|| "shape_type: unknown shape type".to_string())?,
            x: num_arg("x")?,
            y: num_arg("y")?,
            width: num_arg("width")?,
            height: num_arg("height")?,
            color: color_arg("color")?.ok_or_else(|| "Missing required parameter: color".to_string())?,
            opacity: call.get_f64("opacity"),
            rotation: call.get_f64("rotation"),
        }),
        names::CREATE_TEXT => Ok(ValidatedOperation::CreateText {
            text: str_arg("text")?,
            x: num_arg("x")?,
            y: num_arg("y")?,
            font_size: num_arg("font_size")?,
            color: color_arg("color")?,
        }),
        names::MOVE_SHAPE => Ok(ValidatedOperation::MoveShape {
            id: str_arg("id")?,
            x: num_arg("x")?,
            y: num_arg("y")?,
        }),
        names::RESIZE_SHAPE => Ok(ValidatedOperation::ResizeShape {
            id: str_arg("id")?,
            width: num_arg("width")?,
            height: num_arg("height")?,
        }),
        names::STYLE_SHAPE => Ok(ValidatedOperation::StyleShape {
            id: str_arg("id")?,
            color: color_arg("color")?,
            opacity: call.get_f64("opacity"),
        }),
        names::ROTATE_SHAPE => Ok(ValidatedOperation::RotateShape {
            id: str_arg("id")?,
            rotation: num_arg("rotation")?,
        }),
        names::DELETE_SHAPE => Ok(ValidatedOperation::DeleteShape { id: str_arg("id")? }),
        names::ALIGN_SHAPES => Ok(ValidatedOperation::AlignShapes {
            ids: ids_arg("ids")?,
            edge: AlignEdge::parse(&str_arg("edge")?)
                .ok_or_else(|| "edge: unknown alignment edge".to_string())?,
        }),
        names::DISTRIBUTE_SHAPES => Ok(ValidatedOperation::DistributeShapes {
            ids: ids_arg("ids")?,
            axis: DistributeAxis::parse(&str_arg("axis")?)
                .ok_or_else(|| "axis: unknown distribution axis".to_string())?,
        }),
        names::FIND_SHAPES => Ok(ValidatedOperation::FindShapes {
            kind: call.get_str("shape_type").and_then(ObjectKind::parse),
            color: color_arg("color")?,
        }),
        names::DESCRIBE_CANVAS => Ok(ValidatedOperation::DescribeCanvas),
        other => Err(format!("Unknown operation: {}", other)),
    }
}
