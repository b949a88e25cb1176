//! Parameter schema registry.
//!
//! One declarative schema per operation, keyed by operation name. The
//! registry is the single source of truth for parameter rules: the validator
//! checks calls against it, and the wire catalog shown to the reasoning
//! service is rendered from it, so the two views can never drift apart.

use serde_json::Value;
use std::collections::BTreeMap;

use super::color;

/// Catalog version exposed alongside the wire schema
pub const CATALOG_VERSION: &str = "1";

/// Coordinate bounds in document units
pub const COORD_MIN: f64 = -10_000.0;
pub const COORD_MAX: f64 = 10_000.0;

/// Size bounds in document units
pub const SIZE_MIN: f64 = 1.0;
pub const SIZE_MAX: f64 = 5_000.0;

/// Rotation bounds in degrees
pub const ROTATION_MIN: f64 = -360.0;
pub const ROTATION_MAX: f64 = 360.0;

/// Canonical operation names
pub mod names {
    pub const CREATE_SHAPE: &str = "create_shape";
    pub const CREATE_TEXT: &str = "create_text";
    pub const MOVE_SHAPE: &str = "move_shape";
    pub const RESIZE_SHAPE: &str = "resize_shape";
    pub const STYLE_SHAPE: &str = "style_shape";
    pub const ROTATE_SHAPE: &str = "rotate_shape";
    pub const DELETE_SHAPE: &str = "delete_shape";
    pub const ALIGN_SHAPES: &str = "align_shapes";
    pub const DISTRIBUTE_SHAPES: &str = "distribute_shapes";
    pub const FIND_SHAPES: &str = "find_shapes";
    pub const DESCRIBE_CANVAS: &str = "describe_canvas";
}

/// Whether an operation reads or mutates the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Read-only; results feed back into the reasoning loop
    Query,
    /// Mutates the live document
    Mutation,
}

/// Declared type and bounds of one parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    /// Number in [`COORD_MIN`, `COORD_MAX`]
    Coordinate,
    /// Number in [`SIZE_MIN`, `SIZE_MAX`]
    Size,
    /// Number in [0, 1]
    Opacity,
    /// Number in [`ROTATION_MIN`, `ROTATION_MAX`] degrees
    Rotation,
    /// `#rrggbb` hex or a name from the color table
    Color,
    /// Free-form non-empty string
    Text,
    /// One of a fixed set of lowercase strings
    Choice(&'static [&'static str]),
    /// A single object id
    ObjectId,
    /// A list of object ids with a minimum cardinality
    ObjectIdList { min: usize },
}

impl ParamKind {
    fn expect_number(value: &Value) -> Result<f64, String> {
        value.as_f64().ok_or_else(|| "must be a number".to_string())
    }

    fn expect_string(value: &Value) -> Result<&str, String> {
        value.as_str().ok_or_else(|| "must be a string".to_string())
    }

    /// Check a raw JSON value against this kind, returning a reason on failure
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            ParamKind::Coordinate => {
                let n = Self::expect_number(value)?;
                if !(COORD_MIN..=COORD_MAX).contains(&n) {
                    return Err(format!("must be between {} and {}", COORD_MIN, COORD_MAX));
                }
                Ok(())
            }
            ParamKind::Size => {
                let n = Self::expect_number(value)?;
                if !(SIZE_MIN..=SIZE_MAX).contains(&n) {
                    return Err(format!("must be between {} and {}", SIZE_MIN, SIZE_MAX));
                }
                Ok(())
            }
            ParamKind::Opacity => {
                let n = Self::expect_number(value)?;
                if !(0.0..=1.0).contains(&n) {
                    return Err("must be between 0 and 1".to_string());
                }
                Ok(())
            }
            ParamKind::Rotation => {
                let n = Self::expect_number(value)?;
                if !(ROTATION_MIN..=ROTATION_MAX).contains(&n) {
                    return Err(format!(
                        "must be between {} and {} degrees",
                        ROTATION_MIN, ROTATION_MAX
                    ));
                }
                Ok(())
            }
            ParamKind::Color => {
                let s = Self::expect_string(value)?;
                if color::resolve_color(s).is_none() {
                    return Err(format!(
                        "must be #rrggbb hex or one of: {}",
                        color::color_names().join(", ")
                    ));
                }
                Ok(())
            }
            ParamKind::Text => {
                let s = Self::expect_string(value)?;
                if s.is_empty() {
                    return Err("must not be empty".to_string());
                }
                Ok(())
            }
            ParamKind::Choice(options) => {
                let s = Self::expect_string(value)?;
                if !options.contains(&s) {
                    return Err(format!("must be one of: {}", options.join(", ")));
                }
                Ok(())
            }
            ParamKind::ObjectId => {
                let s = Self::expect_string(value)?;
                if s.is_empty() {
                    return Err("must be a non-empty object id".to_string());
                }
                Ok(())
            }
            ParamKind::ObjectIdList { min } => {
                let items = value
                    .as_array()
                    .ok_or_else(|| "must be an array of object ids".to_string())?;
                if items.len() < *min {
                    return Err(format!("requires at least {} object ids", min));
                }
                if !items.iter().all(|v| v.as_str().is_some_and(|s| !s.is_empty())) {
                    return Err("must contain only non-empty string ids".to_string());
                }
                Ok(())
            }
        }
    }

    /// True for parameters that reference live objects
    pub fn references_objects(&self) -> bool {
        matches!(self, ParamKind::ObjectId | ParamKind::ObjectIdList { .. })
    }
}

/// Schema for one parameter of an operation
#[derive(Debug, Clone)]
pub struct ParamSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub kind: ParamKind,
}

impl ParamSchema {
    pub const fn required(name: &'static str, description: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            description,
            required: true,
            kind,
        }
    }

    pub const fn optional(name: &'static str, description: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            description,
            required: false,
            kind,
        }
    }
}

/// Schema for one operation in the catalog
#[derive(Debug, Clone)]
pub struct OperationSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: OperationKind,
    pub params: Vec<ParamSchema>,
}

impl OperationSchema {
    pub fn is_query(&self) -> bool {
        self.kind == OperationKind::Query
    }

    pub fn param(&self, name: &str) -> Option<&ParamSchema> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// The operation registry: every operation the reasoning service may request.
#[derive(Debug, Clone)]
pub struct OperationRegistry {
    ops: BTreeMap<&'static str, OperationSchema>,
}

pub const SHAPE_TYPES: &[&str] = &["rectangle", "ellipse", "line"];
pub const ALIGN_EDGES: &[&str] = &["left", "right", "top", "bottom", "center_x", "center_y"];
pub const DISTRIBUTE_AXES: &[&str] = &["horizontal", "vertical"];

impl OperationRegistry {
    /// The standard catalog (version [`CATALOG_VERSION`])
    pub fn standard() -> Self {
        use ParamKind::*;
        let mut ops = BTreeMap::new();
        let mut register = |schema: OperationSchema| {
            ops.insert(schema.name, schema);
        };

        register(OperationSchema {
            name: names::CREATE_SHAPE,
            description: "Create a new shape on the canvas",
            kind: OperationKind::Mutation,
            params: vec![
                ParamSchema::required("shape_type", "Kind of shape to create", Choice(SHAPE_TYPES)),
                ParamSchema::required("x", "Left edge position", Coordinate),
                ParamSchema::required("y", "Top edge position", Coordinate),
                ParamSchema::required("width", "Shape width", Size),
                ParamSchema::required("height", "Shape height", Size),
                ParamSchema::required("color", "Fill color", Color),
                ParamSchema::optional("opacity", "Fill opacity", Opacity),
                ParamSchema::optional("rotation", "Rotation in degrees", Rotation),
            ],
        });
        register(OperationSchema {
            name: names::CREATE_TEXT,
            description: "Create a text element on the canvas",
            kind: OperationKind::Mutation,
            params: vec![
                ParamSchema::required("text", "Text content", Text),
                ParamSchema::required("x", "Left edge position", Coordinate),
                ParamSchema::required("y", "Top edge position", Coordinate),
                ParamSchema::required("font_size", "Font size in document units", Size),
                ParamSchema::optional("color", "Text color", Color),
            ],
        });
        register(OperationSchema {
            name: names::MOVE_SHAPE,
            description: "Move an existing object to a new position",
            kind: OperationKind::Mutation,
            params: vec![
                ParamSchema::required("id", "Id of the object to move", ObjectId),
                ParamSchema::required("x", "New left edge position", Coordinate),
                ParamSchema::required("y", "New top edge position", Coordinate),
            ],
        });
        register(OperationSchema {
            name: names::RESIZE_SHAPE,
            description: "Resize an existing object",
            kind: OperationKind::Mutation,
            params: vec![
                ParamSchema::required("id", "Id of the object to resize", ObjectId),
                ParamSchema::required("width", "New width", Size),
                ParamSchema::required("height", "New height", Size),
            ],
        });
        register(OperationSchema {
            name: names::STYLE_SHAPE,
            description: "Change the color and/or opacity of an existing object",
            kind: OperationKind::Mutation,
            params: vec![
                ParamSchema::required("id", "Id of the object to style", ObjectId),
                ParamSchema::optional("color", "New fill color", Color),
                ParamSchema::optional("opacity", "New fill opacity", Opacity),
            ],
        });
        register(OperationSchema {
            name: names::ROTATE_SHAPE,
            description: "Set the rotation of an existing object",
            kind: OperationKind::Mutation,
            params: vec![
                ParamSchema::required("id", "Id of the object to rotate", ObjectId),
                ParamSchema::required("rotation", "Rotation in degrees", Rotation),
            ],
        });
        register(OperationSchema {
            name: names::DELETE_SHAPE,
            description: "Delete an object from the canvas",
            kind: OperationKind::Mutation,
            params: vec![ParamSchema::required(
                "id",
                "Id of the object to delete",
                ObjectId,
            )],
        });
        register(OperationSchema {
            name: names::ALIGN_SHAPES,
            description: "Align two or more objects along an edge or center line",
            kind: OperationKind::Mutation,
            params: vec![
                ParamSchema::required("ids", "Objects to align", ObjectIdList { min: 2 }),
                ParamSchema::required("edge", "Alignment edge", Choice(ALIGN_EDGES)),
            ],
        });
        register(OperationSchema {
            name: names::DISTRIBUTE_SHAPES,
            description: "Distribute three or more objects evenly along an axis",
            kind: OperationKind::Mutation,
            params: vec![
                ParamSchema::required("ids", "Objects to distribute", ObjectIdList { min: 3 }),
                ParamSchema::required("axis", "Distribution axis", Choice(DISTRIBUTE_AXES)),
            ],
        });
        register(OperationSchema {
            name: names::FIND_SHAPES,
            description: "Find objects matching a type and/or color filter",
            kind: OperationKind::Query,
            params: vec![
                ParamSchema::optional(
                    "shape_type",
                    "Only return objects of this kind",
                    Choice(&["rectangle", "ellipse", "line", "text"]),
                ),
                ParamSchema::optional("color", "Only return objects with this fill color", Color),
            ],
        });
        register(OperationSchema {
            name: names::DESCRIBE_CANVAS,
            description: "Get a fresh summary of the current canvas state",
            kind: OperationKind::Query,
            params: vec![],
        });

        Self { ops }
    }

    pub fn get(&self, name: &str) -> Option<&OperationSchema> {
        self.ops.get(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &OperationSchema> {
        self.ops.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ops.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
