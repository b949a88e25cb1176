//! Operation catalog: the schema registry and the fixed color table.

pub mod color;
pub mod registry;

pub use registry::{
    ALIGN_EDGES, CATALOG_VERSION, COORD_MAX, COORD_MIN, DISTRIBUTE_AXES, OperationKind,
    OperationRegistry, OperationSchema, ParamKind, ParamSchema, ROTATION_MAX, ROTATION_MIN,
    SHAPE_TYPES, SIZE_MAX, SIZE_MIN, names,
};
