//! Canvas document model

pub mod entities;

pub use entities::{CanvasObject, CanvasSize, DocumentSnapshot, ObjectKind, ObjectPatch};
