//! Tool executor: applies validated operations to the live document.
//!
//! Operations execute strictly in the order the reasoning call returned
//! them. Every mutation is stamped with the synthetic agent author identity
//! and a fresh edit timestamp. Per-operation failures are recorded and the
//! batch continues — the document store has no multi-object transaction
//! primitive, so partial application is the accepted outcome.
//!
//! During a multi-operation creation burst (a new object created and then
//! immediately restyled), outward replication is suspended and re-enabled
//! with one consolidated flush, so collaborators never see a half-styled
//! object.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use easel_domain::{
    AlignEdge, CanvasObject, DistributeAxis, ExecutionResult, ObjectPatch, ValidatedOperation,
    format_for_prompt, summarize,
};

use crate::ports::document_store::DocumentStorePort;

/// Author identity stamped on every agent-driven mutation
pub const AGENT_AUTHOR: &str = "easel-agent";

/// Default settle delay between successive mutations in a batch
pub const DEFAULT_PACING: Duration = Duration::from_millis(120);

/// Applies validated operations through the document store port.
pub struct OperationExecutor<S: DocumentStorePort> {
    store: Arc<S>,
    pacing: Duration,
    id_seq: AtomicU64,
}

impl<S: DocumentStorePort> OperationExecutor<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            pacing: DEFAULT_PACING,
            id_seq: AtomicU64::new(0),
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    fn next_id(&self, prefix: &str) -> String {
        let seq = self.id_seq.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}-{}", prefix, Utc::now().timestamp_millis(), seq)
    }

    /// Execute a batch in model-returned order, one result per operation.
    pub async fn execute(
        &self,
        document_id: &str,
        operations: &[ValidatedOperation],
    ) -> Vec<ExecutionResult> {
        let mutation_count = operations.iter().filter(|op| !op.is_query()).count();
        let creation_burst =
            mutation_count > 1 && operations.iter().any(ValidatedOperation::is_creation);

        if creation_burst {
            self.store.suspend_replication(document_id).await;
        }

        let mut results = Vec::with_capacity(operations.len());
        let mut mutations_applied = 0usize;
        for operation in operations {
            if !operation.is_query() {
                if mutations_applied > 0 && !self.pacing.is_zero() {
                    // Let downstream state settle before the next mutation reads it
                    tokio::time::sleep(self.pacing).await;
                }
                mutations_applied += 1;
            }

            let result = self.apply(document_id, operation).await;
            if !result.success {
                warn!(
                    document_id,
                    operation = operation.name(),
                    error = result.error.as_deref().unwrap_or(""),
                    "Operation failed, continuing batch"
                );
            }
            results.push(result);
        }

        if creation_burst {
            self.store.flush_replication(document_id).await;
        }

        debug!(
            document_id,
            operations = operations.len(),
            failed = results.iter().filter(|r| !r.success).count(),
            "Batch executed"
        );
        results
    }

    async fn apply(&self, document_id: &str, operation: &ValidatedOperation) -> ExecutionResult {
        let name = operation.name();
        match operation {
            ValidatedOperation::CreateShape {
                kind,
                x,
                y,
                width,
                height,
                color,
                opacity,
                rotation,
            } => {
                let id = self.next_id("shape");
                let mut object = CanvasObject::new(&id, *kind, AGENT_AUTHOR, Utc::now())
                    .at(*x, *y)
                    .sized(*width, *height)
                    .colored(color.clone());
                if let Some(opacity) = opacity {
                    object.opacity = *opacity;
                }
                if let Some(rotation) = rotation {
                    object.rotation = *rotation;
                }
                match self.store.create_object(document_id, object).await {
                    Ok(()) => ExecutionResult::created(name, id),
                    Err(error) => ExecutionResult::failure(name, error.to_string()),
                }
            }

            ValidatedOperation::CreateText {
                text,
                x,
                y,
                font_size,
                color,
            } => {
                let id = self.next_id("text");
                let mut object =
                    CanvasObject::new(&id, easel_domain::ObjectKind::Text, AGENT_AUTHOR, Utc::now())
                        .at(*x, *y)
                        .sized(font_size * 0.6 * text.chars().count() as f64, font_size * 1.2)
                        .with_text(text.clone());
                if let Some(color) = color {
                    object.color = color.clone();
                }
                match self.store.create_object(document_id, object).await {
                    Ok(()) => ExecutionResult::created(name, id),
                    Err(error) => ExecutionResult::failure(name, error.to_string()),
                }
            }

            ValidatedOperation::MoveShape { id, x, y } => {
                self.patch_one(document_id, name, id, ObjectPatch::new().position(*x, *y))
                    .await
            }

            ValidatedOperation::ResizeShape { id, width, height } => {
                self.patch_one(document_id, name, id, ObjectPatch::new().size(*width, *height))
                    .await
            }

            ValidatedOperation::StyleShape { id, color, opacity } => {
                let mut patch = ObjectPatch::new();
                if let Some(color) = color {
                    patch = patch.color(color.clone());
                }
                if let Some(opacity) = opacity {
                    patch = patch.opacity(*opacity);
                }
                self.patch_one(document_id, name, id, patch).await
            }

            ValidatedOperation::RotateShape { id, rotation } => {
                self.patch_one(document_id, name, id, ObjectPatch::new().rotation(*rotation))
                    .await
            }

            ValidatedOperation::DeleteShape { id } => {
                match self.store.delete_object(document_id, id).await {
                    Ok(()) => ExecutionResult::modified(name, vec![id.clone()]),
                    Err(error) => ExecutionResult::failure(name, error.to_string()),
                }
            }

            ValidatedOperation::AlignShapes { ids, edge } => {
                self.apply_layout(document_id, name, ids, |objects| {
                    align_positions(objects, *edge)
                })
                .await
            }

            ValidatedOperation::DistributeShapes { ids, axis } => {
                self.apply_layout(document_id, name, ids, |objects| {
                    distribute_positions(objects, *axis)
                })
                .await
            }

            ValidatedOperation::FindShapes { kind, color } => {
                match self.store.read_snapshot(document_id).await {
                    Ok(snapshot) => {
                        let matches: Vec<&CanvasObject> = snapshot
                            .objects
                            .iter()
                            .filter(|o| kind.is_none_or(|k| o.kind == k))
                            .filter(|o| color.as_deref().is_none_or(|c| o.color == c))
                            .collect();
                        ExecutionResult::query_output(name, render_matches(&matches))
                    }
                    Err(error) => ExecutionResult::failure(name, error.to_string()),
                }
            }

            ValidatedOperation::DescribeCanvas => {
                match self.store.read_snapshot(document_id).await {
                    Ok(snapshot) => ExecutionResult::query_output(
                        name,
                        format_for_prompt(&summarize(&snapshot)),
                    ),
                    Err(error) => ExecutionResult::failure(name, error.to_string()),
                }
            }
        }
    }

    async fn patch_one(
        &self,
        document_id: &str,
        name: &str,
        id: &str,
        patch: ObjectPatch,
    ) -> ExecutionResult {
        let patch = patch.stamped(AGENT_AUTHOR, Utc::now());
        match self.store.apply_mutation(document_id, id, patch).await {
            Ok(()) => ExecutionResult::modified(name, vec![id.to_string()]),
            Err(error) => ExecutionResult::failure(name, error.to_string()),
        }
    }

    /// Compute new positions from a fresh snapshot and patch each object.
    ///
    /// If a referenced object vanished since validation, the operation fails
    /// without applying anything; a patch failure mid-way leaves earlier
    /// patches applied and reports the operation as failed.
    async fn apply_layout<F>(
        &self,
        document_id: &str,
        name: &str,
        ids: &[String],
        layout: F,
    ) -> ExecutionResult
    where
        F: Fn(&[CanvasObject]) -> Vec<(String, f64, f64)>,
    {
        let snapshot = match self.store.read_snapshot(document_id).await {
            Ok(s) => s,
            Err(error) => return ExecutionResult::failure(name, error.to_string()),
        };

        let mut objects = Vec::with_capacity(ids.len());
        for id in ids {
            match snapshot.object(id) {
                Some(object) => objects.push(object.clone()),
                None => {
                    return ExecutionResult::failure(
                        name,
                        format!("Shape ID \"{}\" no longer exists", id),
                    );
                }
            }
        }

        let mut modified = Vec::with_capacity(ids.len());
        for (id, x, y) in layout(&objects) {
            let patch = ObjectPatch::new()
                .position(x, y)
                .stamped(AGENT_AUTHOR, Utc::now());
            match self.store.apply_mutation(document_id, &id, patch).await {
                Ok(()) => modified.push(id),
                Err(error) => {
                    let mut result = ExecutionResult::failure(name, error.to_string());
                    result.modified_ids = modified;
                    return result;
                }
            }
        }
        ExecutionResult::modified(name, modified)
    }
}

/// New `(id, x, y)` for each object so they align on `edge`.
fn align_positions(objects: &[CanvasObject], edge: AlignEdge) -> Vec<(String, f64, f64)> {
    let min_x = objects.iter().map(|o| o.x).fold(f64::INFINITY, f64::min);
    let max_right = objects
        .iter()
        .map(|o| o.x + o.width)
        .fold(f64::NEG_INFINITY, f64::max);
    let min_y = objects.iter().map(|o| o.y).fold(f64::INFINITY, f64::min);
    let max_bottom = objects
        .iter()
        .map(|o| o.y + o.height)
        .fold(f64::NEG_INFINITY, f64::max);

    objects
        .iter()
        .map(|o| {
            let (x, y) = match edge {
                AlignEdge::Left => (min_x, o.y),
                AlignEdge::Right => (max_right - o.width, o.y),
                AlignEdge::Top => (o.x, min_y),
                AlignEdge::Bottom => (o.x, max_bottom - o.height),
                AlignEdge::CenterX => ((min_x + max_right) / 2.0 - o.width / 2.0, o.y),
                AlignEdge::CenterY => (o.x, (min_y + max_bottom) / 2.0 - o.height / 2.0),
            };
            (o.id.clone(), x, y)
        })
        .collect()
}

/// New `(id, x, y)` so object centers are evenly spaced along `axis`.
///
/// The outermost objects keep their positions; the rest spread between them.
fn distribute_positions(objects: &[CanvasObject], axis: DistributeAxis) -> Vec<(String, f64, f64)> {
    let center = |o: &CanvasObject| match axis {
        DistributeAxis::Horizontal => o.x + o.width / 2.0,
        DistributeAxis::Vertical => o.y + o.height / 2.0,
    };

    let mut ordered: Vec<&CanvasObject> = objects.iter().collect();
    ordered.sort_by(|a, b| center(a).total_cmp(&center(b)));

    let first = center(ordered[0]);
    let last = center(ordered[ordered.len() - 1]);
    let step = (last - first) / (ordered.len() - 1) as f64;

    ordered
        .iter()
        .enumerate()
        .map(|(i, o)| {
            let c = first + step * i as f64;
            match axis {
                DistributeAxis::Horizontal => (o.id.clone(), c - o.width / 2.0, o.y),
                DistributeAxis::Vertical => (o.id.clone(), o.x, c - o.height / 2.0),
            }
        })
        .collect()
}

fn render_matches(matches: &[&CanvasObject]) -> String {
    if matches.is_empty() {
        return "No matching objects".to_string();
    }
    let mut out = format!("Found {} matching objects:\n", matches.len());
    for object in matches {
        out.push_str(&format!(
            "- {} {} at ({}, {}) size {}x{} color {}\n",
            object.id, object.kind, object.x, object.y, object.width, object.height, object.color
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;
    use easel_domain::ObjectKind;

    fn rect(id: &str, x: f64, y: f64, w: f64, h: f64) -> CanvasObject {
        CanvasObject::new(id, ObjectKind::Rectangle, "user-1", Utc::now())
            .at(x, y)
            .sized(w, h)
            .colored("#ef4444")
    }

    fn executor(store: &Arc<MemoryStore>) -> OperationExecutor<MemoryStore> {
        OperationExecutor::new(store.clone()).with_pacing(Duration::ZERO)
    }

    #[tokio::test]
    async fn create_shape_stamps_agent_author() {
        let store = Arc::new(MemoryStore::with_document("doc-1", vec![]));
        let exec = executor(&store);

        let results = exec
            .execute(
                "doc-1",
                &[ValidatedOperation::CreateShape {
                    kind: ObjectKind::Ellipse,
                    x: 10.0,
                    y: 20.0,
                    width: 30.0,
                    height: 40.0,
                    color: "#3b82f6".to_string(),
                    opacity: Some(0.5),
                    rotation: None,
                }],
            )
            .await;

        assert_eq!(results.len(), 1);
        assert!(results[0].success);
        let id = &results[0].created_ids[0];
        let snapshot = store.read_snapshot("doc-1").await.unwrap();
        let object = snapshot.object(id).unwrap();
        assert_eq!(object.author, AGENT_AUTHOR);
        assert_eq!(object.kind, ObjectKind::Ellipse);
        assert_eq!(object.opacity, 0.5);
    }

    #[tokio::test]
    async fn mutations_are_stamped_and_ordered() {
        let store = Arc::new(MemoryStore::with_document(
            "doc-1",
            vec![rect("shape-1", 0.0, 0.0, 10.0, 10.0)],
        ));
        let exec = executor(&store);

        let results = exec
            .execute(
                "doc-1",
                &[
                    ValidatedOperation::MoveShape {
                        id: "shape-1".to_string(),
                        x: 50.0,
                        y: 60.0,
                    },
                    ValidatedOperation::RotateShape {
                        id: "shape-1".to_string(),
                        rotation: 45.0,
                    },
                ],
            )
            .await;

        assert!(results.iter().all(|r| r.success));
        let snapshot = store.read_snapshot("doc-1").await.unwrap();
        let object = snapshot.object("shape-1").unwrap();
        assert_eq!((object.x, object.y), (50.0, 60.0));
        assert_eq!(object.rotation, 45.0);
        assert_eq!(object.author, AGENT_AUTHOR);
    }

    #[tokio::test]
    async fn failed_operation_does_not_unwind_prior_ones() {
        let store = Arc::new(MemoryStore::with_document(
            "doc-1",
            vec![rect("shape-1", 0.0, 0.0, 10.0, 10.0)],
        ));
        let exec = executor(&store);

        let results = exec
            .execute(
                "doc-1",
                &[
                    ValidatedOperation::MoveShape {
                        id: "shape-1".to_string(),
                        x: 5.0,
                        y: 5.0,
                    },
                    ValidatedOperation::DeleteShape {
                        id: "ghost".to_string(),
                    },
                ],
            )
            .await;

        assert!(results[0].success);
        assert!(!results[1].success);
        // The move stayed applied
        let snapshot = store.read_snapshot("doc-1").await.unwrap();
        assert_eq!(snapshot.object("shape-1").unwrap().x, 5.0);
    }

    #[tokio::test]
    async fn creation_burst_suspends_and_flushes_replication_once() {
        let store = Arc::new(MemoryStore::with_document("doc-1", vec![]));
        let exec = executor(&store);

        // A multi-creation burst: collaborators must not see it half-built
        let create = |color: &str| ValidatedOperation::CreateShape {
            kind: ObjectKind::Rectangle,
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            color: color.to_string(),
            opacity: None,
            rotation: None,
        };
        let results = exec
            .execute("doc-1", &[create("#000000"), create("#ffffff")])
            .await;

        assert!(results.iter().all(|r| r.success));
        assert_eq!(store.suspend_count("doc-1"), 1);
        assert_eq!(store.flush_count("doc-1"), 1);
        // Both writes consolidated into the single flush
        assert_eq!(store.replicated_writes("doc-1"), 1);
    }

    #[tokio::test]
    async fn single_mutation_replicates_directly() {
        let store = Arc::new(MemoryStore::with_document(
            "doc-1",
            vec![rect("shape-1", 0.0, 0.0, 10.0, 10.0)],
        ));
        let exec = executor(&store);

        exec.execute(
            "doc-1",
            &[ValidatedOperation::MoveShape {
                id: "shape-1".to_string(),
                x: 1.0,
                y: 1.0,
            }],
        )
        .await;

        assert_eq!(store.suspend_count("doc-1"), 0);
        assert_eq!(store.replicated_writes("doc-1"), 1);
    }

    #[tokio::test]
    async fn align_left_moves_objects_to_common_edge() {
        let store = Arc::new(MemoryStore::with_document(
            "doc-1",
            vec![
                rect("a", 10.0, 0.0, 10.0, 10.0),
                rect("b", 50.0, 20.0, 20.0, 10.0),
            ],
        ));
        let exec = executor(&store);

        let results = exec
            .execute(
                "doc-1",
                &[ValidatedOperation::AlignShapes {
                    ids: vec!["a".to_string(), "b".to_string()],
                    edge: AlignEdge::Left,
                }],
            )
            .await;

        assert!(results[0].success);
        assert_eq!(results[0].modified_ids, vec!["a", "b"]);
        let snapshot = store.read_snapshot("doc-1").await.unwrap();
        assert_eq!(snapshot.object("a").unwrap().x, 10.0);
        assert_eq!(snapshot.object("b").unwrap().x, 10.0);
        // y untouched
        assert_eq!(snapshot.object("b").unwrap().y, 20.0);
    }

    #[tokio::test]
    async fn distribute_spaces_centers_evenly() {
        let store = Arc::new(MemoryStore::with_document(
            "doc-1",
            vec![
                rect("a", 0.0, 0.0, 10.0, 10.0),    // center 5
                rect("b", 12.0, 0.0, 10.0, 10.0),   // center 17
                rect("c", 95.0, 0.0, 10.0, 10.0),   // center 100
            ],
        ));
        let exec = executor(&store);

        let results = exec
            .execute(
                "doc-1",
                &[ValidatedOperation::DistributeShapes {
                    ids: vec!["a".to_string(), "b".to_string(), "c".to_string()],
                    axis: DistributeAxis::Horizontal,
                }],
            )
            .await;

        assert!(results[0].success);
        let snapshot = store.read_snapshot("doc-1").await.unwrap();
        // Centers become 5, 52.5, 100
        assert_eq!(snapshot.object("a").unwrap().x, 0.0);
        assert_eq!(snapshot.object("b").unwrap().x, 47.5);
        assert_eq!(snapshot.object("c").unwrap().x, 95.0);
    }

    #[tokio::test]
    async fn align_fails_whole_operation_when_object_vanished() {
        let store = Arc::new(MemoryStore::with_document(
            "doc-1",
            vec![rect("a", 0.0, 0.0, 10.0, 10.0)],
        ));
        let exec = executor(&store);

        let results = exec
            .execute(
                "doc-1",
                &[ValidatedOperation::AlignShapes {
                    ids: vec!["a".to_string(), "ghost".to_string()],
                    edge: AlignEdge::Top,
                }],
            )
            .await;

        assert!(!results[0].success);
        assert!(
            results[0]
                .error
                .as_deref()
                .unwrap()
                .contains("Shape ID \"ghost\" no longer exists")
        );
        // Nothing moved
        let snapshot = store.read_snapshot("doc-1").await.unwrap();
        assert_eq!(snapshot.object("a").unwrap().x, 0.0);
    }

    #[tokio::test]
    async fn find_shapes_filters_by_kind_and_color() {
        let mut blue = rect("b", 0.0, 0.0, 10.0, 10.0);
        blue.color = "#3b82f6".to_string();
        let store = Arc::new(MemoryStore::with_document(
            "doc-1",
            vec![rect("a", 0.0, 0.0, 10.0, 10.0), blue],
        ));
        let exec = executor(&store);

        let results = exec
            .execute(
                "doc-1",
                &[ValidatedOperation::FindShapes {
                    kind: Some(ObjectKind::Rectangle),
                    color: Some("#ef4444".to_string()),
                }],
            )
            .await;

        let output = results[0].output.as_deref().unwrap();
        assert!(output.starts_with("Found 1 matching objects:"));
        assert!(output.contains("- a rectangle"));
        assert!(!output.contains("- b "));
    }

    #[tokio::test]
    async fn describe_canvas_returns_digest() {
        let store = Arc::new(MemoryStore::with_document(
            "doc-1",
            vec![rect("a", 0.0, 0.0, 10.0, 10.0)],
        ));
        let exec = executor(&store);

        let results = exec
            .execute("doc-1", &[ValidatedOperation::DescribeCanvas])
            .await;

        assert!(results[0].success);
        let output = results[0].output.as_deref().unwrap();
        assert!(output.contains("Objects: 1 total"));
        // Queries never touch replication
        assert_eq!(store.replicated_writes("doc-1"), 0);
    }
}
