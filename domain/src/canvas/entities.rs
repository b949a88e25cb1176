//! Canvas domain entities
//!
//! The live document model: objects on a shared 2-D canvas, the immutable
//! point-in-time snapshot the summarizer works from, and the patch shape
//! the executor sends to the document store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of object on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Rectangle,
    Ellipse,
    Line,
    Text,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Rectangle => "rectangle",
            ObjectKind::Ellipse => "ellipse",
            ObjectKind::Line => "line",
            ObjectKind::Text => "text",
        }
    }

    /// Parse from the lowercase wire name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rectangle" => Some(ObjectKind::Rectangle),
            "ellipse" => Some(ObjectKind::Ellipse),
            "line" => Some(ObjectKind::Line),
            "text" => Some(ObjectKind::Text),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single object on the canvas.
///
/// `author` and `updated_at` are stamped on every mutation so downstream
/// attribution UI can distinguish agent-driven edits from direct user edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasObject {
    pub id: String,
    pub kind: ObjectKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Normalized `#rrggbb` fill color
    pub color: String,
    pub opacity: f64,
    /// Rotation in degrees
    pub rotation: f64,
    /// Text content (text objects only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CanvasObject {
    pub fn new(
        id: impl Into<String>,
        kind: ObjectKind,
        author: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            color: "#000000".to_string(),
            opacity: 1.0,
            rotation: 0.0,
            text: None,
            author: author.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn colored(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Canvas dimensions in document units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// An immutable point-in-time read of a document.
///
/// Snapshots are re-taken each reasoning iteration; they are never mutated
/// in place, so stale object references cannot persist across iterations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub document_id: String,
    pub size: CanvasSize,
    pub objects: Vec<CanvasObject>,
    /// Ids of currently selected objects
    pub selected_ids: Vec<String>,
}

impl DocumentSnapshot {
    pub fn object(&self, id: &str) -> Option<&CanvasObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

/// A partial update to one canvas object.
///
/// Only set fields are applied; `author` and `updated_at` are always set by
/// the executor so every agent mutation carries its attribution stamp.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ObjectPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn stamped(mut self, author: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.author = Some(author.into());
        self.updated_at = Some(at);
        self
    }

    /// True when no geometry or style field is set (the stamp alone does not count)
    pub fn is_empty(&self) -> bool {
        self.x.is_none()
            && self.y.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.color.is_none()
            && self.opacity.is_none()
            && self.rotation.is_none()
            && self.text.is_none()
    }

    /// Apply every set field to `object`
    pub fn apply_to(&self, object: &mut CanvasObject) {
        if let Some(x) = self.x {
            object.x = x;
        }
        if let Some(y) = self.y {
            object.y = y;
        }
        if let Some(width) = self.width {
            object.width = width;
        }
        if let Some(height) = self.height {
            object.height = height;
        }
        if let Some(color) = &self.color {
            object.color = color.clone();
        }
        if let Some(opacity) = self.opacity {
            object.opacity = opacity;
        }
        if let Some(rotation) = self.rotation {
            object.rotation = rotation;
        }
        if let Some(text) = &self.text {
            object.text = Some(text.clone());
        }
        if let Some(author) = &self.author {
            object.author = author.clone();
        }
        if let Some(updated_at) = self.updated_at {
            object.updated_at = updated_at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_object_kind_roundtrip() {
        for kind in [
            ObjectKind::Rectangle,
            ObjectKind::Ellipse,
            ObjectKind::Line,
            ObjectKind::Text,
        ] {
            assert_eq!(ObjectKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ObjectKind::parse("triangle"), None);
    }

    #[test]
    fn test_object_builder() {
        let obj = CanvasObject::new("shape-1", ObjectKind::Rectangle, "user-1", t0())
            .at(10.0, 20.0)
            .sized(200.0, 50.0)
            .colored("#ff0000");

        assert_eq!(obj.id, "shape-1");
        assert_eq!(obj.x, 10.0);
        assert_eq!(obj.width, 200.0);
        assert_eq!(obj.color, "#ff0000");
        assert_eq!(obj.opacity, 1.0);
        assert_eq!(obj.created_at, obj.updated_at);
    }

    #[test]
    fn test_patch_apply() {
        let mut obj = CanvasObject::new("shape-1", ObjectKind::Ellipse, "user-1", t0());
        let later = t0() + chrono::Duration::seconds(5);

        let patch = ObjectPatch::new()
            .position(5.0, 6.0)
            .color("#00ff00")
            .stamped("agent", later);
        assert!(!patch.is_empty());
        patch.apply_to(&mut obj);

        assert_eq!(obj.x, 5.0);
        assert_eq!(obj.y, 6.0);
        assert_eq!(obj.color, "#00ff00");
        assert_eq!(obj.author, "agent");
        assert_eq!(obj.updated_at, later);
        // Untouched fields keep their values
        assert_eq!(obj.width, 100.0);
        assert_eq!(obj.created_at, t0());
    }

    #[test]
    fn test_stamp_only_patch_is_empty() {
        let patch = ObjectPatch::new().stamped("agent", t0());
        assert!(patch.is_empty());
    }

    #[test]
    fn test_snapshot_lookup() {
        let snapshot = DocumentSnapshot {
            document_id: "doc-1".to_string(),
            size: CanvasSize::default(),
            objects: vec![CanvasObject::new(
                "shape-1",
                ObjectKind::Rectangle,
                "user-1",
                t0(),
            )],
            selected_ids: vec![],
        };

        assert_eq!(snapshot.object_count(), 1);
        assert!(snapshot.object("shape-1").is_some());
        assert!(snapshot.object("shape-2").is_none());
    }
}
