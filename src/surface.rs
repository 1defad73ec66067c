//! Rendering surfaces: logical-size resolution, pixel-buffer management,
//! and an immediate-mode software painter.
//!
//! Each surface owns a physical RGBA buffer sized `round(logical * dpr)`.
//! Reallocation clears pixel content and is comparatively expensive, so the
//! buffer is only reallocated when the target physical size actually
//! changes; the logical size and device-pixel-ratio scale are re-applied on
//! every call. Painting happens in surface-logical coordinates and is
//! scaled to physical pixels internally.

use image::{Rgba, RgbaImage};

use crate::color::Color;
use crate::constants::CHROME_HEIGHT;
use crate::probe::{Strategy, ViewportProbe, first_valid};
use crate::units::{LogicalSize, PhysicalSize, SurfacePoint, SurfaceRect};

// =============================================================================
// SurfaceSizeResolver
// =============================================================================

/// Resolves the authoritative logical size of the rendering viewport.
pub struct SurfaceSizeResolver;

impl SurfaceSizeResolver {
    /// Determine the logical viewport size from the most trustworthy signal
    /// available. Returns [`LogicalSize::ZERO`] only when every method
    /// fails; callers must treat that as "not yet laid out" and skip work.
    pub fn resolve(probe: &dyn ViewportProbe) -> LogicalSize {
        let strategies: Vec<Strategy<'_, LogicalSize>> = vec![
            (
                "visual viewport",
                Box::new(|| {
                    probe
                        .visual_viewport()
                        .map(|vv| LogicalSize::new(vv.width, vv.height))
                }),
            ),
            (
                "bounding rect",
                Box::new(|| {
                    probe
                        .bounding_rect()
                        .map(|r| LogicalSize::new(r.width, r.height))
                }),
            ),
            ("computed style", Box::new(|| probe.computed_style_size())),
            (
                "window minus chrome",
                Box::new(|| {
                    probe
                        .window_inner_size()
                        .map(|s| LogicalSize::new(s.width, s.height - CHROME_HEIGHT))
                }),
            ),
        ];

        first_valid("surface size", strategies, |s| !s.is_empty()).unwrap_or_else(|| {
            log::debug!("surface size: no measurement available yet");
            LogicalSize::ZERO
        })
    }
}

// =============================================================================
// Surface
// =============================================================================

/// A rendering surface with a physical pixel buffer and logical dimensions.
#[derive(Debug, Clone)]
pub struct Surface {
    label: &'static str,
    logical: LogicalSize,
    physical: PhysicalSize,
    dpr: f64,
    buffer: RgbaImage,
}

impl Surface {
    /// Create an empty, unsized surface.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            logical: LogicalSize::ZERO,
            physical: PhysicalSize::ZERO,
            dpr: 1.0,
            buffer: RgbaImage::new(0, 0),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn logical_size(&self) -> LogicalSize {
        self.logical
    }

    pub fn physical_size(&self) -> PhysicalSize {
        self.physical
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.dpr
    }

    /// The physical pixel buffer (for compositing or inspection).
    pub fn buffer(&self) -> &RgbaImage {
        &self.buffer
    }

    /// Bring the pixel buffer in line with the requested logical size and
    /// device pixel ratio. Reallocates (and thereby clears) the buffer only
    /// when the target physical size differs from the current one.
    ///
    /// Returns `true` when a reallocation happened. A zero logical size or
    /// invalid dpr leaves the existing buffer intact and returns `false`,
    /// so a transient layout collapse cannot destroy a valid frame.
    pub fn ensure_sized(&mut self, logical: LogicalSize, dpr: f64) -> bool {
        if logical.is_empty() || !dpr.is_finite() || dpr <= 0.0 {
            log::debug!(
                "surface[{}]: ignoring ensure_sized with logical {logical} dpr {dpr}",
                self.label
            );
            return false;
        }

        let target = PhysicalSize::from_logical(logical, dpr);
        // Logical size and context scale are cheap and always re-applied.
        self.logical = logical;
        self.dpr = dpr;

        if target == self.physical {
            return false;
        }

        log::debug!(
            "surface[{}]: reallocating {} -> {target}",
            self.label,
            self.physical
        );
        self.buffer = RgbaImage::new(target.width, target.height);
        self.physical = target;
        true
    }

    // -------------------------------------------------------------------------
    // Painter (surface-logical coordinates)
    // -------------------------------------------------------------------------

    /// Fill the whole surface with one color (no blending).
    pub fn clear(&mut self, color: Color) {
        let px = Rgba(color.to_rgba8());
        for pixel in self.buffer.pixels_mut() {
            *pixel = px;
        }
    }

    /// Fill an axis-aligned rectangle, alpha-blended over existing content.
    pub fn fill_rect(&mut self, rect: SurfaceRect, color: Color) {
        let (x0, y0, x1, y1) = self.to_pixel_span(rect);
        let src = color.to_rgba8();
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend_pixel(x, y, src);
            }
        }
    }

    /// Stroke the border of a rectangle with the given logical line width.
    pub fn stroke_rect(&mut self, rect: SurfaceRect, color: Color, width: f64) {
        let w = width.max(0.0);
        // Four edge strips drawn just inside the rectangle.
        self.fill_rect(SurfaceRect::new(rect.x, rect.y, rect.width, w), color);
        self.fill_rect(
            SurfaceRect::new(rect.x, rect.y + rect.height - w, rect.width, w),
            color,
        );
        self.fill_rect(
            SurfaceRect::new(rect.x, rect.y + w, w, rect.height - 2.0 * w),
            color,
        );
        self.fill_rect(
            SurfaceRect::new(
                rect.x + rect.width - w,
                rect.y + w,
                w,
                rect.height - 2.0 * w,
            ),
            color,
        );
    }

    /// Stroke a rectangle with a dashed border (no fill).
    pub fn stroke_rect_dashed(
        &mut self,
        rect: SurfaceRect,
        color: Color,
        width: f64,
        dash_length: f64,
    ) {
        let top_left = SurfacePoint::new(rect.x, rect.y);
        let top_right = SurfacePoint::new(rect.x + rect.width, rect.y);
        let bottom_left = SurfacePoint::new(rect.x, rect.y + rect.height);
        let bottom_right = SurfacePoint::new(rect.x + rect.width, rect.y + rect.height);

        self.draw_line_dashed(top_left, top_right, color, width, dash_length);
        self.draw_line_dashed(bottom_left, bottom_right, color, width, dash_length);
        self.draw_line_dashed(top_left, bottom_left, color, width, dash_length);
        self.draw_line_dashed(top_right, bottom_right, color, width, dash_length);
    }

    /// Draw a solid line between two logical points.
    pub fn draw_line(&mut self, from: SurfacePoint, to: SurfacePoint, color: Color, width: f64) {
        self.draw_line_internal(from, to, color, width, None);
    }

    /// Draw a dashed line between two logical points.
    pub fn draw_line_dashed(
        &mut self,
        from: SurfacePoint,
        to: SurfacePoint,
        color: Color,
        width: f64,
        dash_length: f64,
    ) {
        self.draw_line_internal(from, to, color, width, Some(dash_length));
    }

    /// Blit a raster into a destination rectangle, scaling as needed.
    pub fn blit_scaled(&mut self, src: &RgbaImage, dst: SurfaceRect) {
        let dst_w = (dst.width * self.dpr).round() as i64;
        let dst_h = (dst.height * self.dpr).round() as i64;
        if dst_w <= 0 || dst_h <= 0 {
            return;
        }
        let dst_x = (dst.x * self.dpr).round() as i64;
        let dst_y = (dst.y * self.dpr).round() as i64;

        if src.width() as i64 == dst_w && src.height() as i64 == dst_h {
            image::imageops::overlay(&mut self.buffer, src, dst_x, dst_y);
        } else {
            let resized = image::imageops::resize(
                src,
                dst_w as u32,
                dst_h as u32,
                image::imageops::FilterType::Triangle,
            );
            image::imageops::overlay(&mut self.buffer, &resized, dst_x, dst_y);
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Logical rect to a clamped physical pixel span `[x0, x1) x [y0, y1)`.
    fn to_pixel_span(&self, rect: SurfaceRect) -> (u32, u32, u32, u32) {
        let w = self.physical.width as f64;
        let h = self.physical.height as f64;
        let x0 = (rect.x * self.dpr).round().clamp(0.0, w) as u32;
        let y0 = (rect.y * self.dpr).round().clamp(0.0, h) as u32;
        let x1 = ((rect.x + rect.width) * self.dpr).round().clamp(0.0, w) as u32;
        let y1 = ((rect.y + rect.height) * self.dpr).round().clamp(0.0, h) as u32;
        (x0, y0, x1, y1)
    }

    fn blend_pixel(&mut self, x: u32, y: u32, src: [u8; 4]) {
        if x >= self.physical.width || y >= self.physical.height {
            return;
        }
        let dst = self.buffer.get_pixel_mut(x, y);
        let sa = src[3] as f32 / 255.0;
        if sa >= 1.0 {
            *dst = Rgba(src);
            return;
        }
        if sa <= 0.0 {
            return;
        }
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            *dst = Rgba([0, 0, 0, 0]);
            return;
        }
        let mut out = [0u8; 4];
        for c in 0..3 {
            let s = src[c] as f32 / 255.0;
            let d = dst[c] as f32 / 255.0;
            out[c] = (((s * sa + d * da * (1.0 - sa)) / out_a) * 255.0).round() as u8;
        }
        out[3] = (out_a * 255.0).round() as u8;
        *dst = Rgba(out);
    }

    fn draw_line_internal(
        &mut self,
        from: SurfacePoint,
        to: SurfacePoint,
        color: Color,
        width: f64,
        dash_length: Option<f64>,
    ) {
        if !from.is_finite() || !to.is_finite() {
            return;
        }
        let x0 = from.x * self.dpr;
        let y0 = from.y * self.dpr;
        let x1 = to.x * self.dpr;
        let y1 = to.y * self.dpr;
        let dx = x1 - x0;
        let dy = y1 - y0;
        let length = (dx * dx + dy * dy).sqrt();
        if length < 0.5 {
            return;
        }

        let steps = length.ceil() as u32;
        let half = (width * self.dpr / 2.0).max(0.5);
        let dash_px = dash_length.map(|d| (d * self.dpr).max(1.0));
        let src = color.to_rgba8();

        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            if let Some(dash) = dash_px {
                // Alternate on/off segments along the arc length.
                let phase = (t * length / dash).floor() as u64;
                if phase % 2 == 1 {
                    continue;
                }
            }
            let cx = x0 + dx * t;
            let cy = y0 + dy * t;
            let px0 = (cx - half).floor().max(0.0) as u32;
            let py0 = (cy - half).floor().max(0.0) as u32;
            let px1 = (cx + half).ceil().max(0.0) as u32;
            let py1 = (cy + half).ceil().max(0.0) as u32;
            for y in py0..py1 {
                for x in px0..px1 {
                    self.blend_pixel(x, y, src);
                }
            }
        }
    }
}
