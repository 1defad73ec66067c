//! The viewer facade.
//!
//! [`Viewer`] owns every piece of per-instance state: the probe into the
//! host environment, the zoom detector, the authoritative transform, both
//! rendering surfaces, the annotation store, the drawing session, and the
//! resize coordinator. Hosts feed it pointer and resize events and read
//! back the rendered surfaces; all coordinate conversion happens inside.

use image::RgbaImage;

use crate::drawing::{DrawingSession, hovered_delete_handle};
use crate::error::ViewerError;
use crate::model::{Annotation, AnnotationKind, AnnotationStore};
use crate::probe::ViewportProbe;
use crate::render::{FrameInputs, RenderPipeline};
use crate::resize::{ResizeCoordinator, ResizeKind};
use crate::surface::{Surface, SurfaceSizeResolver};
use crate::transform::ViewTransform;
use crate::units::{
    BrowserZoom, ImageRect, ImageSize, PanOffset, ScreenPoint, SurfacePoint, ZoomLevel,
};
use crate::zoom_detect::ZoomFactorDetector;

/// A decoded image and its native dimensions.
struct LoadedImage {
    raster: RgbaImage,
    size: ImageSize,
}

/// Host hook invoked when a drawn region needs a label.
type NeedsLabelFn = Box<dyn FnMut(ImageRect)>;

/// One viewer instance. Multiple viewers can coexist; nothing is shared.
pub struct Viewer {
    probe: Box<dyn ViewportProbe>,
    zoom_detector: ZoomFactorDetector,
    transform: ViewTransform,
    zoom: ZoomLevel,
    pan: PanOffset,
    image: Option<LoadedImage>,
    image_layer: Surface,
    overlay_layer: Surface,
    annotations: AnnotationStore,
    session: DrawingSession,
    resize: ResizeCoordinator,
    pipeline: RenderPipeline,
    hovered_delete: Option<usize>,
    pending: Option<ImageRect>,
    needs_label: Option<NeedsLabelFn>,
}

impl Viewer {
    /// Create a viewer over the given host probe. Nothing is rendered until
    /// an image is loaded and the surface has a measurable size.
    pub fn new(probe: Box<dyn ViewportProbe>) -> Self {
        Self {
            probe,
            zoom_detector: ZoomFactorDetector::new(),
            transform: ViewTransform::new(),
            zoom: ZoomLevel::FIT,
            pan: PanOffset::ZERO,
            image: None,
            image_layer: Surface::new("image"),
            overlay_layer: Surface::new("overlay"),
            annotations: AnnotationStore::new(),
            session: DrawingSession::new(),
            resize: ResizeCoordinator::new(),
            pipeline: RenderPipeline::new(),
            hovered_delete: None,
            pending: None,
            needs_label: None,
        }
    }

    /// Register the hook raised whenever a drawn region awaits a label
    /// (typically the host's label-selection prompt).
    pub fn set_needs_label(&mut self, hook: impl FnMut(ImageRect) + 'static) {
        self.needs_label = Some(Box::new(hook));
    }

    // -------------------------------------------------------------------------
    // Image lifecycle
    // -------------------------------------------------------------------------

    /// Load a new image, resetting all view and annotation state.
    pub fn load_image(&mut self, raster: RgbaImage) -> Result<(), ViewerError> {
        let size = ImageSize::new(raster.width(), raster.height());
        if size.is_empty() {
            return Err(ViewerError::EmptyImage {
                width: size.width,
                height: size.height,
            });
        }
        log::debug!("viewer: loading {size} image");

        self.image = Some(LoadedImage { raster, size });
        self.zoom = ZoomLevel::FIT;
        self.pan = PanOffset::ZERO;
        self.transform = ViewTransform::new();
        self.annotations.clear();
        self.session.cancel();
        self.pending = None;
        self.hovered_delete = None;
        self.refresh();
        Ok(())
    }

    /// Replace the reference (ground-truth / machine) annotations.
    pub fn set_reference_annotations(&mut self, items: Vec<Annotation>) {
        self.annotations.set_reference(items);
        self.render();
    }

    /// Toggle visibility of one annotation kind.
    pub fn set_kind_visible(&mut self, kind: AnnotationKind, visible: bool) {
        self.annotations.set_visible(kind, visible);
        self.render();
    }

    // -------------------------------------------------------------------------
    // Resize handling
    // -------------------------------------------------------------------------

    /// Record a host resize/viewport event. The actual refresh is deferred
    /// until [`poll_resize`] observes a quiet period.
    ///
    /// [`poll_resize`]: Viewer::poll_resize
    pub fn notify_resize(&mut self, kind: ResizeKind, now: web_time::Instant) {
        self.resize.schedule(kind, now);
    }

    /// Run the deferred refresh if its quiet period has elapsed. Returns
    /// `true` when a refresh ran.
    pub fn poll_resize(&mut self, now: web_time::Instant) -> bool {
        if !self.resize.poll(now) {
            return false;
        }
        self.refresh();
        true
    }

    /// Re-measure the environment, resize surfaces, recompute the transform
    /// and redraw. Safe to call at any time, with or without an image.
    pub fn refresh(&mut self) {
        let logical = SurfaceSizeResolver::resolve(self.probe.as_ref());
        let dpr = self.probe.device_pixel_ratio();
        self.image_layer.ensure_sized(logical, dpr);
        self.overlay_layer.ensure_sized(logical, dpr);

        if let Some(image) = &self.image {
            self.transform
                .recalculate(image.size, logical, self.zoom, self.pan);
        }
        self.render();
    }

    // -------------------------------------------------------------------------
    // Zoom and pan
    // -------------------------------------------------------------------------

    /// Zoom in one step, keeping the view centered.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom.zoom_in());
    }

    /// Zoom out one step, keeping the view centered.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom.zoom_out());
    }

    /// Jump to an absolute zoom level (clamped).
    pub fn set_zoom(&mut self, zoom: ZoomLevel) {
        self.zoom = zoom.clamp();
        self.refresh();
    }

    /// Multiply the zoom level, keeping the image point under `anchor`
    /// stationary when an anchor is given (wheel zoom at the cursor).
    pub fn zoom_by(&mut self, factor: f64, anchor: Option<ScreenPoint>) {
        let new_zoom = self.zoom.zoom_by(factor);
        if let Some(anchor) = anchor {
            let anchor = self.screen_to_surface(anchor);
            self.pan = self.transform.pan_preserving_anchor(new_zoom, anchor);
        }
        self.zoom = new_zoom;
        self.refresh();
    }

    /// Reset to fit-to-container with no pan.
    pub fn reset_view(&mut self) {
        self.zoom = ZoomLevel::FIT;
        self.pan = PanOffset::ZERO;
        self.refresh();
    }

    /// Pan by a delta in surface-logical pixels. The transform clamps the
    /// accumulated offset so the image cannot leave the viewport.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan = self.pan.offset_by(dx, dy);
        self.refresh();
    }

    // -------------------------------------------------------------------------
    // Pointer input
    // -------------------------------------------------------------------------

    /// Convert a raw pointer position to surface-logical coordinates,
    /// compensating for the element's on-page position and browser zoom.
    pub fn screen_to_surface(&mut self, p: ScreenPoint) -> SurfacePoint {
        let origin = self
            .probe
            .bounding_rect()
            .map(|r| (r.left, r.top))
            .unwrap_or((0.0, 0.0));
        let zoom = self.zoom_detector.detect(self.probe.as_ref()).value();
        SurfacePoint::new((p.x - origin.0) / zoom, (p.y - origin.1) / zoom)
    }

    /// Pointer pressed. Over a delete affordance this deletes the
    /// annotation; anywhere else it begins a drawing gesture.
    pub fn pointer_down(&mut self, p: ScreenPoint) {
        let p = self.screen_to_surface(p);
        if let Some(index) = hovered_delete_handle(self.annotations.user(), &self.transform, p) {
            if let Err(err) = self.annotations.remove_user(index) {
                log::warn!("viewer: stale delete affordance: {err}");
            }
            self.hovered_delete = None;
            self.render();
            return;
        }
        self.session.start(p);
        self.render();
    }

    /// Pointer moved. Updates the delete-affordance hover state and, during
    /// a gesture, the in-progress rectangle.
    pub fn pointer_move(&mut self, p: ScreenPoint) {
        let p = self.screen_to_surface(p);
        if self.session.is_active() {
            self.session.update(p);
            self.hovered_delete = None;
        } else {
            self.hovered_delete =
                hovered_delete_handle(self.annotations.user(), &self.transform, p);
        }
        self.render();
    }

    /// Pointer released. A large-enough gesture becomes the pending region
    /// awaiting a label via [`complete_pending`]; the committed bounds are
    /// also returned so hosts can raise their label prompt.
    ///
    /// [`complete_pending`]: Viewer::complete_pending
    pub fn pointer_up(&mut self, p: ScreenPoint) -> Option<ImageRect> {
        let p = self.screen_to_surface(p);
        let committed = self.session.finish(p, &self.transform);
        if let Some(bounds) = committed {
            self.pending = Some(bounds);
            if let Some(hook) = &mut self.needs_label {
                hook(bounds);
            }
        }
        self.render();
        committed
    }

    /// Pointer left the surface; abandon any gesture.
    pub fn pointer_cancel(&mut self) {
        self.session.cancel();
        self.hovered_delete = None;
        self.render();
    }

    // -------------------------------------------------------------------------
    // Pending-region flow
    // -------------------------------------------------------------------------

    /// The drawn region awaiting a label, if any.
    pub fn pending_region(&self) -> Option<ImageRect> {
        self.pending
    }

    /// Attach a label (or none) to the pending region and store it as a
    /// user annotation.
    pub fn complete_pending(&mut self, label: Option<String>) -> Result<(), ViewerError> {
        let bounds = self.pending.take().ok_or(ViewerError::NoPendingRegion)?;
        let annotation = Annotation::user_drawn(bounds, label)?;
        self.annotations.push_user(annotation);
        self.render();
        Ok(())
    }

    /// Discard the pending region without creating an annotation.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
        self.render();
    }

    /// Delete a user annotation by creation index.
    pub fn delete_user_annotation(&mut self, index: usize) -> Result<(), ViewerError> {
        self.annotations.remove_user(index)?;
        self.render();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    pub fn zoom(&self) -> ZoomLevel {
        self.zoom
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    pub fn image_layer(&self) -> &Surface {
        &self.image_layer
    }

    pub fn overlay_layer(&self) -> &Surface {
        &self.overlay_layer
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn is_drawing(&self) -> bool {
        self.session.is_active()
    }

    pub fn hovered_delete(&self) -> Option<usize> {
        self.hovered_delete
    }

    /// Current browser zoom factor (measured, cached on success).
    pub fn browser_zoom(&mut self) -> BrowserZoom {
        self.zoom_detector.detect(self.probe.as_ref())
    }

    fn render(&mut self) {
        self.pipeline.render(
            &mut self.image_layer,
            &mut self.overlay_layer,
            FrameInputs {
                raster: self.image.as_ref().map(|i| &i.raster),
                transform: &self.transform,
                annotations: &self.annotations,
                session: &self.session,
                hovered_delete: self.hovered_delete,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::delete_handle_rect;
    use crate::probe::{ElementRect, ScriptedProbe, VisualViewport};
    use crate::units::LogicalSize;
    use std::cell::RefCell;
    use std::rc::Rc;
    use web_time::{Duration, Instant};

    const EPSILON: f64 = 1e-6;

    /// Probe whose measurements tests can mutate after the viewer owns it.
    #[derive(Clone)]
    struct SharedProbe(Rc<RefCell<ScriptedProbe>>);

    impl SharedProbe {
        fn desktop() -> (Self, Rc<RefCell<ScriptedProbe>>) {
            let inner = Rc::new(RefCell::new(ScriptedProbe::desktop()));
            (Self(inner.clone()), inner)
        }
    }

    impl ViewportProbe for SharedProbe {
        fn bounding_rect(&self) -> Option<ElementRect> {
            self.0.borrow().rect
        }

        fn computed_style_size(&self) -> Option<LogicalSize> {
            self.0.borrow().style
        }

        fn visual_viewport(&self) -> Option<VisualViewport> {
            self.0.borrow().visual
        }

        fn window_inner_size(&self) -> Option<LogicalSize> {
            self.0.borrow().inner
        }

        fn window_outer_size(&self) -> Option<LogicalSize> {
            self.0.borrow().outer
        }

        fn device_pixel_ratio(&self) -> f64 {
            self.0.borrow().dpr
        }
    }

    fn viewer_with_image() -> (Viewer, Rc<RefCell<ScriptedProbe>>) {
        let _ = env_logger::builder().is_test(true).try_init();
        let (probe, handle) = SharedProbe::desktop();
        let mut viewer = Viewer::new(Box::new(probe));
        viewer.load_image(RgbaImage::new(400, 300)).unwrap();
        (viewer, handle)
    }

    #[test]
    fn test_load_image_fits_and_sizes_surfaces() {
        let (viewer, _) = viewer_with_image();
        // 400x300 in the 800x600 desktop container: fit scale 2, centered.
        assert!((viewer.transform().scale() - 2.0).abs() < EPSILON);
        assert!((viewer.transform().translate_x()).abs() < EPSILON);
        assert_eq!(
            viewer.image_layer().logical_size(),
            LogicalSize::new(800.0, 600.0)
        );
        assert!(viewer.has_image());
    }

    #[test]
    fn test_load_empty_image_rejected() {
        let (probe, _) = SharedProbe::desktop();
        let mut viewer = Viewer::new(Box::new(probe));
        assert!(matches!(
            viewer.load_image(RgbaImage::new(0, 100)),
            Err(ViewerError::EmptyImage { .. })
        ));
        assert!(!viewer.has_image());
    }

    #[test]
    fn test_draw_gesture_produces_pending_region() {
        let (mut viewer, _) = viewer_with_image();
        viewer.pointer_down(ScreenPoint::new(50.0, 50.0));
        assert!(viewer.is_drawing());
        viewer.pointer_move(ScreenPoint::new(80.0, 70.0));
        let bounds = viewer.pointer_up(ScreenPoint::new(100.0, 100.0)).unwrap();

        // Surface (50,50)-(100,100) at scale 2 maps to image (25,25)-(50,50).
        assert!((bounds.xmin - 25.0).abs() < EPSILON);
        assert!((bounds.ymax - 50.0).abs() < EPSILON);
        assert_eq!(viewer.pending_region(), Some(bounds));

        viewer.complete_pending(Some("ASC-H".into())).unwrap();
        assert_eq!(viewer.annotations().user().len(), 1);
        assert_eq!(viewer.pending_region(), None);
    }

    #[test]
    fn test_tiny_gesture_leaves_no_pending_region() {
        let (mut viewer, _) = viewer_with_image();
        viewer.pointer_down(ScreenPoint::new(50.0, 50.0));
        assert!(viewer.pointer_up(ScreenPoint::new(53.0, 53.0)).is_none());
        assert_eq!(viewer.pending_region(), None);
        assert!(matches!(
            viewer.complete_pending(None),
            Err(ViewerError::NoPendingRegion)
        ));
    }

    #[test]
    fn test_pointer_offset_by_element_origin() {
        let (mut viewer, handle) = viewer_with_image();
        handle.borrow_mut().rect = Some(ElementRect::new(100.0, 50.0, 800.0, 600.0));

        viewer.pointer_down(ScreenPoint::new(150.0, 100.0));
        let bounds = viewer.pointer_up(ScreenPoint::new(250.0, 200.0)).unwrap();
        // Surface (50,50)-(150,150) at scale 2 maps to image (25,25)-(75,75).
        assert!((bounds.xmin - 25.0).abs() < EPSILON);
        assert!((bounds.xmax - 75.0).abs() < EPSILON);
    }

    #[test]
    fn test_pointer_scaled_by_browser_zoom() {
        let (mut viewer, handle) = viewer_with_image();
        // Rect reads 2x the style: browser zoom 200%. Keep the resolver fed
        // through the visual viewport so the logical size stays 800x600.
        {
            let mut probe = handle.borrow_mut();
            probe.rect = Some(ElementRect::new(0.0, 0.0, 1600.0, 1200.0));
            probe.visual = Some(VisualViewport {
                width: 800.0,
                height: 600.0,
                scale: 1.0,
            });
        }
        viewer.refresh();

        let p = viewer.screen_to_surface(ScreenPoint::new(200.0, 100.0));
        assert!((p.x - 100.0).abs() < EPSILON);
        assert!((p.y - 50.0).abs() < EPSILON);
    }

    #[test]
    fn test_click_on_delete_affordance_removes_annotation() {
        let (mut viewer, _) = viewer_with_image();
        viewer.pointer_down(ScreenPoint::new(50.0, 50.0));
        viewer.pointer_up(ScreenPoint::new(100.0, 100.0));
        viewer.complete_pending(Some("LSIL".into())).unwrap();
        assert_eq!(viewer.annotations().user().len(), 1);

        let bounds = viewer
            .transform()
            .rect_to_surface(viewer.annotations().user()[0].bounds);
        let handle_rect = delete_handle_rect(bounds);
        let center = ScreenPoint::new(
            handle_rect.x + handle_rect.width / 2.0,
            handle_rect.y + handle_rect.height / 2.0,
        );

        viewer.pointer_move(center);
        assert_eq!(viewer.hovered_delete(), Some(0));
        viewer.pointer_down(center);
        assert!(viewer.annotations().user().is_empty());
        assert!(!viewer.is_drawing());
    }

    #[test]
    fn test_resize_debounced_then_refreshes() {
        let (mut viewer, handle) = viewer_with_image();
        let t0 = Instant::now();

        {
            let mut probe = handle.borrow_mut();
            probe.rect = Some(ElementRect::new(0.0, 0.0, 400.0, 300.0));
            probe.style = Some(LogicalSize::new(400.0, 300.0));
        }
        viewer.notify_resize(ResizeKind::Window, t0);

        // Still the old geometry inside the quiet period.
        assert!(!viewer.poll_resize(t0 + Duration::from_millis(20)));
        assert_eq!(
            viewer.image_layer().logical_size(),
            LogicalSize::new(800.0, 600.0)
        );

        assert!(viewer.poll_resize(t0 + Duration::from_millis(150)));
        assert_eq!(
            viewer.image_layer().logical_size(),
            LogicalSize::new(400.0, 300.0)
        );
        // 400x300 image in the 400x300 container: fit scale 1.
        assert!((viewer.transform().scale() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_anchor_zoom_keeps_image_point_under_cursor() {
        let (mut viewer, _) = viewer_with_image();
        let anchor = ScreenPoint::new(600.0, 200.0);
        let surface_anchor = viewer.screen_to_surface(anchor);
        let before = viewer.transform().to_image(surface_anchor);

        viewer.zoom_by(1.5, Some(anchor));

        let after = viewer.transform().to_image(surface_anchor);
        assert!((before.x - after.x).abs() < EPSILON);
        assert!((before.y - after.y).abs() < EPSILON);
    }

    #[test]
    fn test_needs_label_hook_fires_on_commit() {
        let (mut viewer, _) = viewer_with_image();
        let asked = Rc::new(RefCell::new(None));
        let sink = asked.clone();
        viewer.set_needs_label(move |bounds| *sink.borrow_mut() = Some(bounds));

        viewer.pointer_down(ScreenPoint::new(50.0, 50.0));
        let bounds = viewer.pointer_up(ScreenPoint::new(100.0, 100.0)).unwrap();
        assert_eq!(*asked.borrow(), Some(bounds));

        // Sub-threshold gestures never raise the hook.
        *asked.borrow_mut() = None;
        viewer.pointer_down(ScreenPoint::new(50.0, 50.0));
        viewer.pointer_up(ScreenPoint::new(52.0, 52.0));
        assert_eq!(*asked.borrow(), None);
    }

    #[test]
    fn test_loading_new_image_resets_state() {
        let (mut viewer, _) = viewer_with_image();
        viewer.zoom_by(2.0, None);
        viewer.pointer_down(ScreenPoint::new(50.0, 50.0));
        viewer.pointer_up(ScreenPoint::new(100.0, 100.0));
        viewer.complete_pending(None).unwrap();

        viewer.load_image(RgbaImage::new(640, 480)).unwrap();
        assert_eq!(viewer.zoom(), ZoomLevel::FIT);
        assert!(viewer.annotations().user().is_empty());
        assert_eq!(viewer.pending_region(), None);
    }
}
