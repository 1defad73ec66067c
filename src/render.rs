//! Deterministic render pipeline.
//!
//! Every frame fully redraws both surfaces from scratch in a fixed order:
//! clear, image, reference overlays, user regions, in-progress drawing.
//! There is no incremental diffing; at this scale a full immediate-mode
//! redraw is cheaper than tracking damage. Every annotation coordinate is
//! converted from image-native to surface-logical space immediately before
//! drawing, never cached, because the transform can change between frames.

use image::RgbaImage;

use crate::color::{Color, label_color};
use crate::constants::{
    CAPTION_FONT_SIZE, CAPTION_HEIGHT, CHAR_WIDTH_FACTOR, DELETE_HANDLE_SIZE, PREVIEW_DASH_LENGTH,
    PREVIEW_STROKE_WIDTH, REFERENCE_STROKE_WIDTH, USER_STROKE_WIDTH,
};
use crate::drawing::{DrawingSession, delete_handle_rect};
use crate::model::{AnnotationKind, AnnotationStore};
use crate::surface::Surface;
use crate::transform::ViewTransform;
use crate::units::{SurfacePoint, SurfaceRect};

/// Everything a frame is drawn from.
pub struct FrameInputs<'a> {
    /// Decoded raster of the loaded image, if any.
    pub raster: Option<&'a RgbaImage>,
    /// The current authoritative transform.
    pub transform: &'a ViewTransform,
    /// Reference and user annotations plus visibility toggles.
    pub annotations: &'a AnnotationStore,
    /// Drawing gesture in progress, if any.
    pub session: &'a DrawingSession,
    /// Index of the user annotation whose delete affordance is hovered.
    pub hovered_delete: Option<usize>,
}

/// Draws frames onto the image and overlay surfaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderPipeline;

impl RenderPipeline {
    pub fn new() -> Self {
        Self
    }

    /// Redraw both surfaces.
    pub fn render(&self, image_layer: &mut Surface, overlay_layer: &mut Surface, inputs: FrameInputs<'_>) {
        // 1. Clear.
        image_layer.clear(Color::BLACK);
        overlay_layer.clear(Color::TRANSPARENT);

        // 2. The image, positioned by the transform.
        let Some(raster) = inputs.raster else {
            return;
        };
        let transform = inputs.transform;
        image_layer.blit_scaled(raster, transform.image_bounds());

        // 3. Immutable reference overlays.
        for annotation in inputs.annotations.visible_reference() {
            let bounds = transform.rect_to_surface(annotation.bounds);
            let color = annotation
                .label
                .as_deref()
                .map(label_color)
                .unwrap_or(Color::WHITE);
            if annotation.kind == AnnotationKind::MachineDetection {
                overlay_layer.fill_rect(bounds, color.with_alpha(0.15));
            }
            overlay_layer.stroke_rect(bounds, color, REFERENCE_STROKE_WIDTH);
        }

        // 4. User-drawn regions with captions and delete affordances.
        if inputs.annotations.is_visible(AnnotationKind::UserDrawn) {
            for (index, annotation) in inputs.annotations.user().iter().enumerate() {
                let bounds = transform.rect_to_surface(annotation.bounds);
                let color = annotation
                    .label
                    .as_deref()
                    .map(label_color)
                    .unwrap_or(Color::rgb8(96, 165, 250));
                overlay_layer.stroke_rect(bounds, color, USER_STROKE_WIDTH);
                if let Some(label) = annotation.label.as_deref() {
                    draw_caption(overlay_layer, bounds, label, color);
                }
                draw_delete_handle(
                    overlay_layer,
                    bounds,
                    inputs.hovered_delete == Some(index),
                );
            }
        }

        // 5. In-progress drawing rectangle: dashed stroke, no fill.
        if let Some(rect) = inputs.session.current_rect() {
            overlay_layer.stroke_rect_dashed(
                rect,
                Color::WHITE,
                PREVIEW_STROKE_WIDTH,
                PREVIEW_DASH_LENGTH,
            );
        }
    }
}

/// Caption chip above the box's top-left corner. Glyph rasterization is the
/// host's concern; the software painter renders a measured chip so layout
/// and hit-testing stay faithful headlessly.
fn draw_caption(surface: &mut Surface, bounds: SurfaceRect, label: &str, color: Color) {
    let width = (label.chars().count() as f64 * CAPTION_FONT_SIZE * CHAR_WIDTH_FACTOR + 8.0)
        .min(bounds.width.max(24.0));
    let chip = SurfaceRect::new(bounds.x, bounds.y - CAPTION_HEIGHT, width, CAPTION_HEIGHT);
    surface.fill_rect(chip, color.with_alpha(0.85));
    surface.fill_rect(
        SurfaceRect::new(chip.x, chip.y + chip.height - 2.0, chip.width, 2.0),
        Color::BLACK.with_alpha(0.4),
    );
}

/// Square delete affordance at the top-right corner with an X across it.
fn draw_delete_handle(surface: &mut Surface, bounds: SurfaceRect, hovered: bool) {
    let handle = delete_handle_rect(bounds);
    let fill = if hovered {
        Color::rgb8(229, 57, 53)
    } else {
        Color::rgb8(66, 66, 66)
    };
    surface.fill_rect(handle, fill);
    surface.stroke_rect(handle, Color::WHITE, 1.0);

    let inset = DELETE_HANDLE_SIZE * 0.3;
    let x0 = handle.x + inset;
    let y0 = handle.y + inset;
    let x1 = handle.x + handle.width - inset;
    let y1 = handle.y + handle.height - inset;
    surface.draw_line(
        SurfacePoint::new(x0, y0),
        SurfacePoint::new(x1, y1),
        Color::WHITE,
        1.5,
    );
    surface.draw_line(
        SurfacePoint::new(x0, y1),
        SurfacePoint::new(x1, y0),
        Color::WHITE,
        1.5,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Annotation;
    use crate::units::{ImageRect, ImageSize, LogicalSize, PanOffset, ZoomLevel};
    use image::Rgba;

    fn setup() -> (Surface, Surface, ViewTransform, RgbaImage) {
        let mut image_layer = Surface::new("image");
        let mut overlay_layer = Surface::new("overlay");
        let logical = LogicalSize::new(200.0, 200.0);
        image_layer.ensure_sized(logical, 1.0);
        overlay_layer.ensure_sized(logical, 1.0);

        let mut transform = ViewTransform::new();
        assert!(transform.recalculate(
            ImageSize::new(100, 100),
            logical,
            ZoomLevel::FIT,
            PanOffset::ZERO,
        ));

        let mut raster = RgbaImage::new(100, 100);
        for p in raster.pixels_mut() {
            *p = Rgba([40, 80, 120, 255]);
        }
        (image_layer, overlay_layer, transform, raster)
    }

    fn alpha_at(surface: &Surface, x: u32, y: u32) -> u8 {
        surface.buffer().get_pixel(x, y).0[3]
    }

    #[test]
    fn test_image_drawn_at_transform_position() {
        let (mut image_layer, mut overlay_layer, transform, raster) = setup();
        let store = AnnotationStore::new();
        let session = DrawingSession::new();

        RenderPipeline::new().render(
            &mut image_layer,
            &mut overlay_layer,
            FrameInputs {
                raster: Some(&raster),
                transform: &transform,
                annotations: &store,
                session: &session,
                hovered_delete: None,
            },
        );

        // 100x100 image fit into 200x200 surface covers it fully at 2x.
        assert_eq!(image_layer.buffer().get_pixel(100, 100).0, [40, 80, 120, 255]);
        // Overlay stays transparent with nothing to draw.
        assert_eq!(alpha_at(&overlay_layer, 100, 100), 0);
    }

    #[test]
    fn test_hidden_kind_not_drawn() {
        let (mut image_layer, mut overlay_layer, transform, raster) = setup();
        let mut store = AnnotationStore::new();
        store.set_reference(vec![
            Annotation::detection(ImageRect::new(10.0, 10.0, 60.0, 60.0), "HSIL", 0.9).unwrap(),
        ]);
        store.set_visible(AnnotationKind::MachineDetection, false);
        let session = DrawingSession::new();

        RenderPipeline::new().render(
            &mut image_layer,
            &mut overlay_layer,
            FrameInputs {
                raster: Some(&raster),
                transform: &transform,
                annotations: &store,
                session: &session,
                hovered_delete: None,
            },
        );

        // Box would sit at surface (20,20)-(120,120); edge must be absent.
        assert_eq!(alpha_at(&overlay_layer, 70, 20), 0);
    }

    #[test]
    fn test_reference_box_stroked_on_overlay() {
        let (mut image_layer, mut overlay_layer, transform, raster) = setup();
        let mut store = AnnotationStore::new();
        store.set_reference(vec![
            Annotation::ground_truth(ImageRect::new(10.0, 10.0, 60.0, 60.0), "HSIL").unwrap(),
        ]);
        let session = DrawingSession::new();

        RenderPipeline::new().render(
            &mut image_layer,
            &mut overlay_layer,
            FrameInputs {
                raster: Some(&raster),
                transform: &transform,
                annotations: &store,
                session: &session,
                hovered_delete: None,
            },
        );

        // Top edge at surface y=20 spanning x=20..120.
        assert!(alpha_at(&overlay_layer, 70, 20) > 0);
        // Interior not filled for ground truth.
        assert_eq!(alpha_at(&overlay_layer, 70, 70), 0);
    }

    #[test]
    fn test_active_session_draws_dashed_preview() {
        let (mut image_layer, mut overlay_layer, transform, raster) = setup();
        let store = AnnotationStore::new();
        let mut session = DrawingSession::new();
        session.start(SurfacePoint::new(30.0, 30.0));
        session.update(SurfacePoint::new(170.0, 170.0));

        RenderPipeline::new().render(
            &mut image_layer,
            &mut overlay_layer,
            FrameInputs {
                raster: Some(&raster),
                transform: &transform,
                annotations: &store,
                session: &session,
                hovered_delete: None,
            },
        );

        let top_edge: Vec<bool> = (30..170)
            .map(|x| alpha_at(&overlay_layer, x, 30) != 0)
            .collect();
        assert!(top_edge.iter().any(|on| *on));
        assert!(top_edge.iter().any(|on| !*on));
        // No fill inside the preview.
        assert_eq!(alpha_at(&overlay_layer, 100, 100), 0);
    }

    #[test]
    fn test_no_image_clears_and_returns() {
        let (mut image_layer, mut overlay_layer, transform, _raster) = setup();
        let store = AnnotationStore::new();
        let session = DrawingSession::new();

        RenderPipeline::new().render(
            &mut image_layer,
            &mut overlay_layer,
            FrameInputs {
                raster: None,
                transform: &transform,
                annotations: &store,
                session: &session,
                hovered_delete: None,
            },
        );

        assert_eq!(image_layer.buffer().get_pixel(100, 100).0, [0, 0, 0, 255]);
        assert_eq!(alpha_at(&overlay_layer, 100, 100), 0);
    }
}
