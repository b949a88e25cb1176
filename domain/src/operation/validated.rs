//! Typed, bounds-checked operations.
//!
//! [`ValidatedOperation`] is the tagged union the executor consumes: one
//! variant per catalog operation, each carrying a strongly-typed parameter
//! record. Values are only constructed by the validator, so the executor
//! never sees an out-of-bounds coordinate or an unknown color.

use serde::{Deserialize, Serialize};

use crate::canvas::ObjectKind;
use crate::catalog::names;

/// Edge or center line used by `align_shapes`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignEdge {
    Left,
    Right,
    Top,
    Bottom,
    CenterX,
    CenterY,
}

impl AlignEdge {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(AlignEdge::Left),
            "right" => Some(AlignEdge::Right),
            "top" => Some(AlignEdge::Top),
            "bottom" => Some(AlignEdge::Bottom),
            "center_x" => Some(AlignEdge::CenterX),
            "center_y" => Some(AlignEdge::CenterY),
            _ => None,
        }
    }
}

/// Axis used by `distribute_shapes`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributeAxis {
    Horizontal,
    Vertical,
}

impl DistributeAxis {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "horizontal" => Some(DistributeAxis::Horizontal),
            "vertical" => Some(DistributeAxis::Vertical),
            _ => None,
        }
    }
}

/// A schema-checked, reference-checked operation ready for execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidatedOperation {
    CreateShape {
        kind: ObjectKind,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        /// Normalized `#rrggbb`
        color: String,
        opacity: Option<f64>,
        rotation: Option<f64>,
    },
    CreateText {
        text: String,
        x: f64,
        y: f64,
        font_size: f64,
        color: Option<String>,
    },
    MoveShape {
        id: String,
        x: f64,
        y: f64,
    },
    ResizeShape {
        id: String,
        width: f64,
        height: f64,
    },
    StyleShape {
        id: String,
        color: Option<String>,
        opacity: Option<f64>,
    },
    RotateShape {
        id: String,
        rotation: f64,
    },
    DeleteShape {
        id: String,
    },
    AlignShapes {
        ids: Vec<String>,
        edge: AlignEdge,
    },
    DistributeShapes {
        ids: Vec<String>,
        axis: DistributeAxis,
    },
    FindShapes {
        kind: Option<ObjectKind>,
        color: Option<String>,
    },
    DescribeCanvas,
}

impl ValidatedOperation {
    /// The catalog name of this operation
    pub fn name(&self) -> &'static str {
        match self {
            ValidatedOperation::CreateShape { .. } => names::CREATE_SHAPE,
            ValidatedOperation::CreateText { .. } => names::CREATE_TEXT,
            ValidatedOperation::MoveShape { .. } => names::MOVE_SHAPE,
            ValidatedOperation::ResizeShape { .. } => names::RESIZE_SHAPE,
            ValidatedOperation::StyleShape { .. } => names::STYLE_SHAPE,
            ValidatedOperation::RotateShape { .. } => names::ROTATE_SHAPE,
            ValidatedOperation::DeleteShape { .. } => names::DELETE_SHAPE,
            ValidatedOperation::AlignShapes { .. } => names::ALIGN_SHAPES,
            ValidatedOperation::DistributeShapes { .. } => names::DISTRIBUTE_SHAPES,
            ValidatedOperation::FindShapes { .. } => names::FIND_SHAPES,
            ValidatedOperation::DescribeCanvas => names::DESCRIBE_CANVAS,
        }
    }

    /// True for read-only operations whose results feed the next iteration
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            ValidatedOperation::FindShapes { .. } | ValidatedOperation::DescribeCanvas
        )
    }

    /// True for operations that bring a new object into existence
    pub fn is_creation(&self) -> bool {
        matches!(
            self,
            ValidatedOperation::CreateShape { .. } | ValidatedOperation::CreateText { .. }
        )
    }

    /// Ids of live objects this operation references
    pub fn referenced_ids(&self) -> Vec<&str> {
        match self {
            ValidatedOperation::MoveShape { id, .. }
            | ValidatedOperation::ResizeShape { id, .. }
            | ValidatedOperation::StyleShape { id, .. }
            | ValidatedOperation::RotateShape { id, .. }
            | ValidatedOperation::DeleteShape { id } => vec![id.as_str()],
            ValidatedOperation::AlignShapes { ids, .. }
            | ValidatedOperation::DistributeShapes { ids, .. } => {
                ids.iter().map(String::as_str).collect()
            }
            _ => Vec::new(),
        }
    }
}
