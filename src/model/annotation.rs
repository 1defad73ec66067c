//! Annotation types and the ordered annotation collection.

use serde::{Deserialize, Serialize};

use crate::error::ViewerError;
use crate::units::ImageRect;

/// Where an annotation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationKind {
    /// Curated ground-truth region from the dataset.
    GroundTruth,
    /// Detection produced by the classification backend.
    MachineDetection,
    /// Region of interest drawn by the reviewer.
    UserDrawn,
}

impl AnnotationKind {
    /// Display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationKind::GroundTruth => "Ground truth",
            AnnotationKind::MachineDetection => "Detection",
            AnnotationKind::UserDrawn => "User region",
        }
    }

    /// All annotation kinds.
    pub fn all() -> &'static [AnnotationKind] {
        &[
            AnnotationKind::GroundTruth,
            AnnotationKind::MachineDetection,
            AnnotationKind::UserDrawn,
        ]
    }
}

/// A labeled rectangular region in image-native coordinates.
///
/// Ground-truth and machine annotations are immutable once loaded.
/// User-drawn annotations are created by the drawing session and may be
/// deleted interactively; their collection order is creation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Region bounds in image-native pixels.
    pub bounds: ImageRect,
    /// Classification label, if assigned.
    pub label: Option<String>,
    /// Detection confidence in `[0, 1]`, machine detections only.
    pub score: Option<f64>,
    /// Provenance of this annotation.
    pub kind: AnnotationKind,
}

impl Annotation {
    /// Create an annotation, validating its bounds.
    pub fn new(
        bounds: ImageRect,
        label: Option<String>,
        score: Option<f64>,
        kind: AnnotationKind,
    ) -> Result<Self, ViewerError> {
        if !bounds.is_valid() {
            return Err(ViewerError::invalid_bounds(format!(
                "bounds {bounds:?} are degenerate or non-finite"
            )));
        }
        if let Some(s) = score {
            if !(0.0..=1.0).contains(&s) {
                return Err(ViewerError::invalid_bounds(format!(
                    "score {s} outside [0, 1]"
                )));
            }
        }
        Ok(Self {
            bounds,
            label,
            score,
            kind,
        })
    }

    /// Ground-truth region with a known label.
    pub fn ground_truth(bounds: ImageRect, label: impl Into<String>) -> Result<Self, ViewerError> {
        Self::new(bounds, Some(label.into()), None, AnnotationKind::GroundTruth)
    }

    /// Machine detection with label and confidence.
    pub fn detection(
        bounds: ImageRect,
        label: impl Into<String>,
        score: f64,
    ) -> Result<Self, ViewerError> {
        Self::new(
            bounds,
            Some(label.into()),
            Some(score),
            AnnotationKind::MachineDetection,
        )
    }

    /// User-drawn region, optionally labeled.
    pub fn user_drawn(bounds: ImageRect, label: Option<String>) -> Result<Self, ViewerError> {
        Self::new(bounds, label, None, AnnotationKind::UserDrawn)
    }
}

/// Ordered annotation collection with per-kind visibility toggles.
///
/// Reference annotations (ground truth and machine detections) are replaced
/// wholesale when a new dataset arrives; user annotations are appended in
/// creation order, which doubles as the index space for interactive
/// deletion and the z-order of hover affordances.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    reference: Vec<Annotation>,
    user: Vec<Annotation>,
    show_ground_truth: bool,
    show_detections: bool,
    show_user: bool,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self {
            reference: Vec::new(),
            user: Vec::new(),
            show_ground_truth: true,
            show_detections: true,
            show_user: true,
        }
    }

    /// Replace the immutable reference annotations. Any `UserDrawn` entries
    /// in the input are dropped with a warning; they belong to the user
    /// collection.
    pub fn set_reference(&mut self, items: Vec<Annotation>) {
        let before = items.len();
        self.reference = items
            .into_iter()
            .filter(|a| a.kind != AnnotationKind::UserDrawn)
            .collect();
        if self.reference.len() != before {
            log::warn!(
                "annotation store: dropped {} user-drawn items from reference set",
                before - self.reference.len()
            );
        }
    }

    /// Append a user-drawn annotation.
    pub fn push_user(&mut self, annotation: Annotation) {
        debug_assert_eq!(annotation.kind, AnnotationKind::UserDrawn);
        self.user.push(annotation);
    }

    /// Remove a user annotation by creation index.
    pub fn remove_user(&mut self, index: usize) -> Result<Annotation, ViewerError> {
        if index >= self.user.len() {
            return Err(ViewerError::IndexOutOfRange {
                index,
                len: self.user.len(),
            });
        }
        Ok(self.user.remove(index))
    }

    pub fn reference(&self) -> &[Annotation] {
        &self.reference
    }

    pub fn user(&self) -> &[Annotation] {
        &self.user
    }

    /// Drop everything (used when a new image is loaded).
    pub fn clear(&mut self) {
        self.reference.clear();
        self.user.clear();
    }

    pub fn set_visible(&mut self, kind: AnnotationKind, visible: bool) {
        match kind {
            AnnotationKind::GroundTruth => self.show_ground_truth = visible,
            AnnotationKind::MachineDetection => self.show_detections = visible,
            AnnotationKind::UserDrawn => self.show_user = visible,
        }
    }

    pub fn is_visible(&self, kind: AnnotationKind) -> bool {
        match kind {
            AnnotationKind::GroundTruth => self.show_ground_truth,
            AnnotationKind::MachineDetection => self.show_detections,
            AnnotationKind::UserDrawn => self.show_user,
        }
    }

    /// Reference annotations whose kind is currently visible.
    pub fn visible_reference(&self) -> impl Iterator<Item = &Annotation> {
        self.reference.iter().filter(|a| self.is_visible(a.kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> ImageRect {
        ImageRect::new(10.0, 10.0, 50.0, 40.0)
    }

    #[test]
    fn test_annotation_validation() {
        assert!(Annotation::ground_truth(rect(), "HSIL").is_ok());
        assert!(Annotation::detection(rect(), "LSIL", 0.93).is_ok());
        assert!(Annotation::detection(rect(), "LSIL", 1.5).is_err());
        assert!(Annotation::user_drawn(ImageRect::new(5.0, 5.0, 5.0, 9.0), None).is_err());
    }

    #[test]
    fn test_store_removal_by_creation_order() {
        let mut store = AnnotationStore::new();
        store.push_user(Annotation::user_drawn(rect(), Some("first".into())).unwrap());
        store.push_user(Annotation::user_drawn(rect(), Some("second".into())).unwrap());

        let removed = store.remove_user(0).unwrap();
        assert_eq!(removed.label.as_deref(), Some("first"));
        assert_eq!(store.user().len(), 1);
        assert!(store.remove_user(5).is_err());
    }

    #[test]
    fn test_store_reference_filters_user_drawn() {
        let mut store = AnnotationStore::new();
        store.set_reference(vec![
            Annotation::ground_truth(rect(), "HSIL").unwrap(),
            Annotation::user_drawn(rect(), None).unwrap(),
        ]);
        assert_eq!(store.reference().len(), 1);
    }

    #[test]
    fn test_visibility_toggles() {
        let mut store = AnnotationStore::new();
        store.set_reference(vec![
            Annotation::ground_truth(rect(), "HSIL").unwrap(),
            Annotation::detection(rect(), "LSIL", 0.8).unwrap(),
        ]);
        assert_eq!(store.visible_reference().count(), 2);

        store.set_visible(AnnotationKind::MachineDetection, false);
        assert_eq!(store.visible_reference().count(), 1);
        assert!(!store.is_visible(AnnotationKind::MachineDetection));
    }

    #[test]
    fn test_annotation_serializes_for_export() {
        let annotation = Annotation::detection(rect(), "HSIL", 0.91).unwrap();
        let json = serde_json::to_value(&annotation).unwrap();
        assert_eq!(json["bounds"]["xmin"], 10.0);
        assert_eq!(json["label"], "HSIL");
        assert_eq!(json["score"], 0.91);
    }
}
