//! Canvas state summarizer
//!
//! Reduces an arbitrarily large [`DocumentSnapshot`] into a token-bounded
//! [`Digest`] for the reasoning call. Summarization is a pure function of the
//! snapshot: identical input yields identical output.
//!
//! Below [`FULL_DIGEST_THRESHOLD`] objects the digest carries the full object
//! set. At or above it, the digest carries every selected object (selection
//! is assumed small) plus at most [`RECENT_OBJECT_CAP`] of the most recently
//! edited non-selected objects, and the per-kind histogram always covers the
//! entire object set. This bounds the reasoning payload independent of
//! document size.

mod format;

pub use format::{estimate_tokens, format_for_prompt};

use crate::canvas::{CanvasObject, CanvasSize, DocumentSnapshot, ObjectKind};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Object count at which the digest switches from full to summarized
pub const FULL_DIGEST_THRESHOLD: usize = 100;

/// Maximum non-selected objects included in a summarized digest
pub const RECENT_OBJECT_CAP: usize = 5;

/// One object as rendered into the digest — the lean shape the reasoning
/// service sees, with document-internal fields dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct DigestObject {
    pub id: String,
    pub kind: ObjectKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub rotation: f64,
    pub text: Option<String>,
    pub author: String,
    pub updated_at: DateTime<Utc>,
    pub selected: bool,
}

impl DigestObject {
    fn from_object(object: &CanvasObject, selected: bool) -> Self {
        Self {
            id: object.id.clone(),
            kind: object.kind,
            x: object.x,
            y: object.y,
            width: object.width,
            height: object.height,
            color: object.color.clone(),
            rotation: object.rotation,
            text: object.text.clone(),
            author: object.author.clone(),
            updated_at: object.updated_at,
            selected,
        }
    }
}

/// Size-bounded view of a [`DocumentSnapshot`]
#[derive(Debug, Clone)]
pub struct Digest {
    pub document_id: String,
    pub canvas_size: CanvasSize,
    /// Total objects in the snapshot, included or not
    pub total_objects: usize,
    /// True when the object list was summarized rather than complete
    pub truncated: bool,
    pub objects: Vec<DigestObject>,
    /// Kind -> count histogram over the entire object set
    pub kind_counts: BTreeMap<&'static str, usize>,
}

impl Digest {
    pub fn included_ids(&self) -> Vec<&str> {
        self.objects.iter().map(|o| o.id.as_str()).collect()
    }

    pub fn selected_ids(&self) -> Vec<&str> {
        self.objects
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.id.as_str())
            .collect()
    }
}

/// Summarize a snapshot into a digest. Pure and deterministic.
pub fn summarize(snapshot: &DocumentSnapshot) -> Digest {
    let mut kind_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for object in &snapshot.objects {
        *kind_counts.entry(object.kind.as_str()).or_insert(0) += 1;
    }

    let total = snapshot.objects.len();
    let is_selected = |id: &str| snapshot.selected_ids.iter().any(|s| s == id);

    if total < FULL_DIGEST_THRESHOLD {
        let objects = snapshot
            .objects
            .iter()
            .map(|o| DigestObject::from_object(o, is_selected(&o.id)))
            .collect();
        return Digest {
            document_id: snapshot.document_id.clone(),
            canvas_size: snapshot.size,
            total_objects: total,
            truncated: false,
            objects,
            kind_counts,
        };
    }

    // Summarized digest: every selected object, then up to RECENT_OBJECT_CAP
    // non-selected objects by most-recent edit, ties by creation timestamp,
    // then id for a stable order.
    let mut objects: Vec<DigestObject> = snapshot
        .objects
        .iter()
        .filter(|o| is_selected(&o.id))
        .map(|o| DigestObject::from_object(o, true))
        .collect();

    let mut recent: Vec<&CanvasObject> = snapshot
        .objects
        .iter()
        .filter(|o| !is_selected(&o.id))
        .collect();
    recent.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then(b.created_at.cmp(&a.created_at))
            .then(a.id.cmp(&b.id))
    });
    objects.extend(
        recent
            .into_iter()
            .take(RECENT_OBJECT_CAP)
            .map(|o| DigestObject::from_object(o, false)),
    );

    Digest {
        document_id: snapshot.document_id.clone(),
        canvas_size: snapshot.size,
        total_objects: total,
        truncated: true,
        objects,
        kind_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn object(id: &str, edited_secs: i64) -> CanvasObject {
        let mut o = CanvasObject::new(id, ObjectKind::Rectangle, "user-1", t0());
        o.updated_at = t0() + Duration::seconds(edited_secs);
        o
    }

    fn snapshot(objects: Vec<CanvasObject>, selected: Vec<&str>) -> DocumentSnapshot {
        DocumentSnapshot {
            document_id: "doc-1".to_string(),
            size: CanvasSize::default(),
            objects,
            selected_ids: selected.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn small_document_gets_full_digest() {
        let objects: Vec<_> = (0..99).map(|i| object(&format!("s{:03}", i), i)).collect();
        let digest = summarize(&snapshot(objects, vec!["s001"]));

        assert!(!digest.truncated);
        assert_eq!(digest.total_objects, 99);
        assert_eq!(digest.objects.len(), 99);
        assert_eq!(digest.selected_ids(), vec!["s001"]);
    }

    #[test]
    fn large_document_gets_summarized_digest() {
        let objects: Vec<_> = (0..150).map(|i| object(&format!("s{:03}", i), i)).collect();
        let digest = summarize(&snapshot(objects, vec!["s000", "s001"]));

        assert!(digest.truncated);
        assert_eq!(digest.total_objects, 150);
        // 2 selected + 5 most recently edited non-selected
        assert_eq!(digest.objects.len(), 7);

        let ids = digest.included_ids();
        assert!(ids.contains(&"s000"));
        assert!(ids.contains(&"s001"));
        // Most recent edits are s149..s145
        for id in ["s149", "s148", "s147", "s146", "s145"] {
            assert!(ids.contains(&id), "missing {}", id);
        }
    }

    #[test]
    fn selected_objects_are_uncapped_and_excluded_from_recents() {
        let objects: Vec<_> = (0..120).map(|i| object(&format!("s{:03}", i), i)).collect();
        // Select the eight most recently edited objects
        let selected: Vec<String> = (112..120).map(|i| format!("s{:03}", i)).collect();
        let selected_refs: Vec<&str> = selected.iter().map(|s| s.as_str()).collect();
        let digest = summarize(&snapshot(objects, selected_refs));

        assert_eq!(digest.selected_ids().len(), 8);
        // The recent slots skip selected ids and fall back to s111..s107
        assert_eq!(digest.objects.len(), 13);
        let ids = digest.included_ids();
        for id in ["s111", "s110", "s109", "s108", "s107"] {
            assert!(ids.contains(&id), "missing {}", id);
        }
    }

    #[test]
    fn recency_ties_break_by_creation_then_id() {
        let mut objects: Vec<_> = (0..100).map(|i| object(&format!("s{:03}", i), 0)).collect();
        // Everything edited at the same instant; give two objects later creation
        objects[10].created_at = t0() + Duration::seconds(1);
        objects[20].created_at = t0() + Duration::seconds(1);
        let digest = summarize(&snapshot(objects, vec![]));

        let ids = digest.included_ids();
        assert_eq!(ids.len(), 5);
        // Later-created objects win the tie; the remaining slots fill in id order
        assert_eq!(ids[0], "s010");
        assert_eq!(ids[1], "s020");
        assert_eq!(&ids[2..], &["s000", "s001", "s002"]);
    }

    #[test]
    fn histogram_covers_entire_object_set() {
        let mut objects: Vec<_> = (0..140).map(|i| object(&format!("s{:03}", i), i)).collect();
        for o in objects.iter_mut().take(30) {
            o.kind = ObjectKind::Ellipse;
        }
        objects[0].kind = ObjectKind::Text;
        let digest = summarize(&snapshot(objects, vec![]));

        let total: usize = digest.kind_counts.values().sum();
        assert_eq!(total, 140);
        assert_eq!(digest.kind_counts["ellipse"], 29);
        assert_eq!(digest.kind_counts["text"], 1);
        assert_eq!(digest.kind_counts["rectangle"], 110);
    }

    #[test]
    fn summarize_is_deterministic() {
        let objects: Vec<_> = (0..150).map(|i| object(&format!("s{:03}", i), i % 7)).collect();
        let snap = snapshot(objects, vec!["s003"]);
        let a = summarize(&snap);
        let b = summarize(&snap);
        assert_eq!(a.included_ids(), b.included_ids());
    }
}
