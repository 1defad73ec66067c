//! Drawing gestures and delete-affordance hit testing.
//!
//! A small state machine turns pointer/touch gestures into a committed
//! rectangle in image-native coordinates. Gestures live entirely in
//! surface-logical space; only a committed rectangle is converted through
//! the inverse transform, so browser zoom and resizes mid-gesture cannot
//! skew the result.

use crate::constants::{DELETE_HANDLE_SIZE, MIN_DRAW_SIZE};
use crate::model::Annotation;
use crate::transform::ViewTransform;
use crate::units::{ImageRect, SurfacePoint, SurfaceRect};

/// Gesture state. `Idle` and `Active` cycle; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DrawingSession {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A rectangle is being dragged out.
    Active {
        /// Where the gesture started, in surface-logical coordinates.
        start: SurfacePoint,
        /// Bounding box of start and current point.
        current: SurfaceRect,
    },
}

impl DrawingSession {
    pub fn new() -> Self {
        Self::Idle
    }

    pub fn is_active(&self) -> bool {
        matches!(self, DrawingSession::Active { .. })
    }

    /// The in-progress rectangle, if a gesture is active.
    pub fn current_rect(&self) -> Option<SurfaceRect> {
        match self {
            DrawingSession::Active { current, .. } => Some(*current),
            DrawingSession::Idle => None,
        }
    }

    /// Begin a gesture at the given surface point.
    pub fn start(&mut self, p: SurfacePoint) {
        if !p.is_finite() {
            log::warn!("drawing: ignoring non-finite start point");
            return;
        }
        *self = DrawingSession::Active {
            start: p,
            current: SurfaceRect::from_corners(p, p),
        };
    }

    /// Update the in-progress rectangle. The rectangle is the axis-aligned
    /// bounding box of the start and current points, so dragging in any of
    /// the four directions works.
    pub fn update(&mut self, p: SurfacePoint) {
        if let DrawingSession::Active { start, current } = self {
            if p.is_finite() {
                *current = SurfaceRect::from_corners(*start, p);
            }
        }
    }

    /// End the gesture.
    ///
    /// If both logical dimensions exceed the minimum draw size, the
    /// rectangle is converted to image-native coordinates (clamped to the
    /// image) and returned for the needs-label flow. Sub-threshold gestures
    /// are discarded silently; either way the session returns to `Idle`.
    pub fn finish(&mut self, p: SurfacePoint, transform: &ViewTransform) -> Option<ImageRect> {
        let DrawingSession::Active { start, .. } = *self else {
            return None;
        };
        *self = DrawingSession::Idle;

        if !p.is_finite() {
            return None;
        }
        let rect = SurfaceRect::from_corners(start, p);
        if rect.width < MIN_DRAW_SIZE || rect.height < MIN_DRAW_SIZE {
            log::debug!(
                "drawing: discarding {:.1}x{:.1} gesture below minimum size",
                rect.width,
                rect.height
            );
            return None;
        }

        let bounds = transform
            .rect_to_image(rect)
            .clamped_to(transform.image_size());
        if !bounds.is_valid() {
            log::debug!("drawing: gesture fell entirely outside the image");
            return None;
        }
        Some(bounds)
    }

    /// Abandon any gesture in progress (e.g. pointer left the surface).
    pub fn cancel(&mut self) {
        *self = DrawingSession::Idle;
    }
}

/// On-surface rectangle of the delete affordance for an annotation box:
/// a small square hanging off the top-right corner.
pub fn delete_handle_rect(bounds: SurfaceRect) -> SurfaceRect {
    SurfaceRect::new(
        bounds.x + bounds.width - DELETE_HANDLE_SIZE / 2.0,
        bounds.y - DELETE_HANDLE_SIZE / 2.0,
        DELETE_HANDLE_SIZE,
        DELETE_HANDLE_SIZE,
    )
}

/// Which user annotation's delete affordance is under the pointer, if any.
///
/// Screen-space boxes are recomputed from the live transform on every call
/// rather than cached, since the transform can change between frames. Later
/// annotations sit on top, so the scan runs in reverse creation order.
pub fn hovered_delete_handle(
    user: &[Annotation],
    transform: &ViewTransform,
    p: SurfacePoint,
) -> Option<usize> {
    user.iter()
        .enumerate()
        .rev()
        .find(|(_, annotation)| {
            let bounds = transform.rect_to_surface(annotation.bounds);
            delete_handle_rect(bounds).contains(p)
        })
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{ImageSize, LogicalSize, PanOffset, ZoomLevel};

    const EPSILON: f64 = 1e-6;

    /// Identity-ish transform: 1000x1000 image fit into a 1000x1000 surface.
    fn unit_transform() -> ViewTransform {
        let mut t = ViewTransform::new();
        assert!(t.recalculate(
            ImageSize::new(1000, 1000),
            LogicalSize::new(1000.0, 1000.0),
            ZoomLevel::FIT,
            PanOffset::ZERO,
        ));
        t
    }

    #[test]
    fn test_gesture_commits_above_threshold() {
        let t = unit_transform();
        let mut session = DrawingSession::new();
        session.start(SurfacePoint::new(100.0, 100.0));
        session.update(SurfacePoint::new(115.0, 110.0));
        assert!(session.is_active());

        let bounds = session.finish(SurfacePoint::new(120.0, 120.0), &t).unwrap();
        assert!(!session.is_active());
        assert!((bounds.xmin - 100.0).abs() < EPSILON);
        assert!((bounds.xmax - 120.0).abs() < EPSILON);
    }

    #[test]
    fn test_small_gesture_discarded() {
        let t = unit_transform();
        let mut session = DrawingSession::new();
        session.start(SurfacePoint::new(100.0, 100.0));
        assert!(session.finish(SurfacePoint::new(105.0, 105.0), &t).is_none());
        assert!(!session.is_active());
    }

    #[test]
    fn test_exact_threshold_boundary() {
        let t = unit_transform();
        let mut session = DrawingSession::new();
        // 5x5 discarded, 20x20 committed (per the drawing contract).
        session.start(SurfacePoint::new(0.0, 0.0));
        assert!(session.finish(SurfacePoint::new(5.0, 5.0), &t).is_none());

        session.start(SurfacePoint::new(0.0, 0.0));
        assert!(session.finish(SurfacePoint::new(20.0, 20.0), &t).is_some());
    }

    #[test]
    fn test_drag_in_any_direction() {
        let t = unit_transform();
        let mut session = DrawingSession::new();
        session.start(SurfacePoint::new(200.0, 200.0));
        let bounds = session.finish(SurfacePoint::new(150.0, 140.0), &t).unwrap();
        assert!((bounds.xmin - 150.0).abs() < EPSILON);
        assert!((bounds.ymin - 140.0).abs() < EPSILON);
        assert!((bounds.xmax - 200.0).abs() < EPSILON);
    }

    #[test]
    fn test_committed_bounds_clamped_to_image() {
        let t = unit_transform();
        let mut session = DrawingSession::new();
        session.start(SurfacePoint::new(950.0, 950.0));
        let bounds = session.finish(SurfacePoint::new(1100.0, 1080.0), &t).unwrap();
        assert!(bounds.xmax <= 1000.0 + EPSILON);
        assert!(bounds.ymax <= 1000.0 + EPSILON);
    }

    #[test]
    fn test_hover_topmost_wins() {
        let t = unit_transform();
        let shared = ImageRect::new(100.0, 100.0, 300.0, 300.0);
        let user = vec![
            Annotation::user_drawn(shared, Some("bottom".into())).unwrap(),
            Annotation::user_drawn(shared, Some("top".into())).unwrap(),
        ];

        // Both delete handles occupy the same spot; the newest wins.
        let handle = delete_handle_rect(t.rect_to_surface(shared));
        let center = SurfacePoint::new(handle.x + handle.width / 2.0, handle.y + handle.height / 2.0);
        assert_eq!(hovered_delete_handle(&user, &t, center), Some(1));

        // Far away from any handle.
        assert_eq!(
            hovered_delete_handle(&user, &t, SurfacePoint::new(600.0, 600.0)),
            None
        );
    }
}
