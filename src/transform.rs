//! The authoritative image-to-surface transform.
//!
//! [`ViewTransform`] is the single mapping between image-native and
//! surface-logical coordinates: `surface = native * scale + translate`.
//! It is recomputed from first principles on every zoom/pan/resize event
//! (never integrated from deltas), so repeated recalculation with the same
//! inputs is bit-identical and drift cannot accumulate.

use crate::units::{
    ImagePoint, ImageRect, ImageSize, LogicalSize, PanOffset, SurfacePoint, SurfaceRect, ZoomLevel,
};

/// The `{scale, translate}` mapping plus the inputs that produced it.
///
/// Mutated only through [`ViewTransform::recalculate`]; read by the render
/// pipeline and the drawing session. A default transform is the identity
/// with empty sizes, which every consumer treats as "nothing to show yet".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    scale: f64,
    translate_x: f64,
    translate_y: f64,
    zoom: ZoomLevel,
    pan: PanOffset,
    image_size: ImageSize,
    surface_size: LogicalSize,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            zoom: ZoomLevel::FIT,
            pan: PanOffset::ZERO,
            image_size: ImageSize::default(),
            surface_size: LogicalSize::ZERO,
        }
    }
}

impl ViewTransform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute scale and translation from the current inputs.
    ///
    /// Fit-to-container base scale (aspect preserved, small images may
    /// upscale), multiplied by the clamped zoom level, centered, with the
    /// pan clamped per axis so the image can never be dragged fully out of
    /// view. On an axis where the scaled image fits inside the surface the
    /// pan is ignored and the image stays centered.
    ///
    /// Returns `false` without touching the previous state when an input is
    /// unusable (zero/invalid size) or the result fails validation; a
    /// broken transform is never published.
    pub fn recalculate(
        &mut self,
        image: ImageSize,
        surface: LogicalSize,
        zoom: ZoomLevel,
        pan: PanOffset,
    ) -> bool {
        if image.is_empty() || surface.is_empty() {
            log::debug!(
                "transform: skipping recalculate, image {image} surface {surface} not ready"
            );
            return false;
        }

        let zoom = zoom.clamp();
        let image_w = image.width as f64;
        let image_h = image.height as f64;

        let base_scale = (surface.width / image_w).min(surface.height / image_h);
        let scale = base_scale * zoom.value();
        let scaled_w = image_w * scale;
        let scaled_h = image_h * scale;

        let mut translate_x = (surface.width - scaled_w) / 2.0;
        let mut translate_y = (surface.height - scaled_h) / 2.0;

        if scaled_w > surface.width {
            let max_pan_x = (scaled_w - surface.width) / 2.0;
            translate_x += pan.x.clamp(-max_pan_x, max_pan_x);
        }
        if scaled_h > surface.height {
            let max_pan_y = (scaled_h - surface.height) / 2.0;
            translate_y += pan.y.clamp(-max_pan_y, max_pan_y);
        }

        if !(scale.is_finite() && scale > 0.0)
            || !translate_x.is_finite()
            || !translate_y.is_finite()
        {
            log::warn!(
                "transform: discarding non-finite result (scale {scale}, translate \
                 {translate_x},{translate_y}), keeping previous state"
            );
            return false;
        }

        self.scale = scale;
        self.translate_x = translate_x;
        self.translate_y = translate_y;
        self.zoom = zoom;
        self.pan = pan;
        self.image_size = image;
        self.surface_size = surface;
        true
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate_x(&self) -> f64 {
        self.translate_x
    }

    pub fn translate_y(&self) -> f64 {
        self.translate_y
    }

    pub fn zoom(&self) -> ZoomLevel {
        self.zoom
    }

    pub fn pan(&self) -> PanOffset {
        self.pan
    }

    pub fn image_size(&self) -> ImageSize {
        self.image_size
    }

    pub fn surface_size(&self) -> LogicalSize {
        self.surface_size
    }

    /// On-surface size of the scaled image.
    pub fn scaled_size(&self) -> LogicalSize {
        LogicalSize::new(
            self.image_size.width as f64 * self.scale,
            self.image_size.height as f64 * self.scale,
        )
    }

    /// On-surface rectangle the image occupies.
    pub fn image_bounds(&self) -> SurfaceRect {
        let scaled = self.scaled_size();
        SurfaceRect::new(
            self.translate_x,
            self.translate_y,
            scaled.width,
            scaled.height,
        )
    }

    /// Map an image-native point to surface-logical coordinates.
    pub fn to_surface(&self, p: ImagePoint) -> SurfacePoint {
        SurfacePoint::new(
            p.x * self.scale + self.translate_x,
            p.y * self.scale + self.translate_y,
        )
    }

    /// Map a surface-logical point back to image-native coordinates.
    pub fn to_image(&self, p: SurfacePoint) -> ImagePoint {
        ImagePoint::new(
            (p.x - self.translate_x) / self.scale,
            (p.y - self.translate_y) / self.scale,
        )
    }

    /// Map an image-native rectangle to surface-logical coordinates.
    pub fn rect_to_surface(&self, r: ImageRect) -> SurfaceRect {
        let origin = self.to_surface(ImagePoint::new(r.xmin, r.ymin));
        SurfaceRect::new(
            origin.x,
            origin.y,
            r.width() * self.scale,
            r.height() * self.scale,
        )
    }

    /// Map a surface-logical rectangle to image-native coordinates.
    pub fn rect_to_image(&self, r: SurfaceRect) -> ImageRect {
        let a = self.to_image(SurfacePoint::new(r.x, r.y));
        let b = self.to_image(SurfacePoint::new(r.x + r.width, r.y + r.height));
        ImageRect::from_corners(a, b)
    }

    /// Solve the pan offset that would keep `anchor` over the same image
    /// point after switching to `new_zoom`.
    ///
    /// The caller feeds the result back through [`recalculate`], whose
    /// per-axis clamp still applies; near the pan limits the clamp wins
    /// over anchor fidelity.
    ///
    /// [`recalculate`]: ViewTransform::recalculate
    pub fn pan_preserving_anchor(&self, new_zoom: ZoomLevel, anchor: SurfacePoint) -> PanOffset {
        if self.image_size.is_empty() || self.surface_size.is_empty() {
            return self.pan;
        }

        let image_w = self.image_size.width as f64;
        let image_h = self.image_size.height as f64;
        let base_scale =
            (self.surface_size.width / image_w).min(self.surface_size.height / image_h);
        let new_scale = base_scale * new_zoom.clamp().value();

        // Image point currently under the anchor.
        let under = self.to_image(anchor);

        // Translate that keeps it there at the new scale, expressed as a
        // pan relative to the centered position.
        let center_x = (self.surface_size.width - image_w * new_scale) / 2.0;
        let center_y = (self.surface_size.height - image_h * new_scale) / 2.0;
        PanOffset::new(
            anchor.x - under.x * new_scale - center_x,
            anchor.y - under.y * new_scale - center_y,
        )
    }
}
