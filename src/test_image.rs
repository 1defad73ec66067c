//! Synthetic slide generation.
//!
//! Produces deterministic cytology-slide-like rasters for demos and tests,
//! so neither depends on bundled image assets: a pale background with
//! stained cell clusters, plus matching reference annotations.

use image::{Rgba, RgbaImage};

use crate::model::Annotation;
use crate::units::ImageRect;

/// Deterministic hash noise in `[0, 1)` from pixel coordinates.
fn noise(x: u32, y: u32) -> f32 {
    ((x as f32 * 12.9898 + y as f32 * 78.233).sin() * 43758.5453).fract().abs()
}

/// Generate a synthetic slide field: pale cytoplasm background with a grid
/// of darker stained "cells". Deterministic for a given size.
pub fn synthetic_slide(width: u32, height: u32) -> RgbaImage {
    log::debug!("generating {width}x{height} synthetic slide");
    let mut raster = RgbaImage::new(width, height);
    let cell_pitch = (width.min(height) / 6).max(16) as f32;

    for y in 0..height {
        for x in 0..width {
            // Pale eosin-tinted background with mild noise.
            let n = noise(x, y);
            let mut r = 232.0 + n * 12.0;
            let mut g = 214.0 + n * 10.0;
            let mut b = 224.0 + n * 10.0;

            // Distance to the nearest cell center on a jittered grid.
            let gx = (x as f32 / cell_pitch).floor();
            let gy = (y as f32 / cell_pitch).floor();
            let jx = noise(gx as u32, gy as u32 + 7) - 0.5;
            let jy = noise(gx as u32 + 13, gy as u32) - 0.5;
            let cx = (gx + 0.5 + jx * 0.4) * cell_pitch;
            let cy = (gy + 0.5 + jy * 0.4) * cell_pitch;
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let dist = (dx * dx + dy * dy).sqrt();

            // Cytoplasm halo, then a dense hematoxylin-dark nucleus.
            let cell_radius = cell_pitch * 0.35;
            let nucleus_radius = cell_pitch * 0.12;
            if dist < cell_radius {
                let t = 1.0 - dist / cell_radius;
                r -= t * 60.0;
                g -= t * 40.0;
                b -= t * 20.0;
            }
            if dist < nucleus_radius {
                r = 70.0 + n * 20.0;
                g = 40.0 + n * 15.0;
                b = 110.0 + n * 20.0;
            }

            raster.put_pixel(
                x,
                y,
                Rgba([r.clamp(0.0, 255.0) as u8, g.clamp(0.0, 255.0) as u8, b.clamp(0.0, 255.0) as u8, 255]),
            );
        }
    }
    raster
}

/// Reference annotations matching [`synthetic_slide`]: one ground-truth
/// region and one machine detection over plausible cell clusters.
pub fn sample_annotations(width: u32, height: u32) -> Vec<Annotation> {
    let w = width as f64;
    let h = height as f64;
    [
        Annotation::ground_truth(ImageRect::new(w * 0.1, h * 0.1, w * 0.35, h * 0.4), "HSIL"),
        Annotation::detection(ImageRect::new(w * 0.5, h * 0.45, w * 0.85, h * 0.8), "LSIL", 0.87),
    ]
    .into_iter()
    .flatten()
    .collect()
}
