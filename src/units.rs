//! Type-safe wrappers for the viewer's coordinate spaces.
//!
//! The engine juggles four distinct 2-D spaces: on-screen pointer
//! coordinates, logical surface coordinates, physical pixel-buffer
//! coordinates, and image-native pixel coordinates. Each gets its own
//! newtype so the compiler rejects accidental mixing (e.g. passing a
//! screen-space point where image-space is expected).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};

// =============================================================================
// Points
// =============================================================================

/// A point in on-screen (pointer/client) coordinates.
///
/// These are the raw coordinates the host event system reports. They are
/// affected by the element's position on the page and by browser zoom, and
/// must be converted to [`SurfacePoint`] before any transform math.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in surface-logical coordinates (CSS-equivalent units, origin at
/// the surface's top-left, independent of device pixel ratio).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfacePoint {
    pub x: f64,
    pub y: f64,
}

impl SurfacePoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A point in image-native pixel coordinates (the original, unscaled image).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}

impl ImagePoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// =============================================================================
// Sizes
// =============================================================================

/// Logical (CSS-space) size of the rendering viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogicalSize {
    pub width: f64,
    pub height: f64,
}

impl LogicalSize {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when this size cannot drive any layout or transform math.
    /// Callers must treat an empty size as "not yet laid out" and skip work.
    pub fn is_empty(self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

impl fmt::Display for LogicalSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}x{:.1}", self.width, self.height)
    }
}

/// Physical pixel-buffer dimensions of a rendering surface
/// (`round(logical * devicePixelRatio)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

impl PhysicalSize {
    pub const ZERO: Self = Self::new(0, 0);

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Physical size for a logical size at the given device pixel ratio.
    pub fn from_logical(logical: LogicalSize, dpr: f64) -> Self {
        Self {
            width: (logical.width * dpr).round().max(0.0) as u32,
            height: (logical.height * dpr).round().max(0.0) as u32,
        }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for PhysicalSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}px", self.width, self.height)
    }
}

/// Native pixel dimensions of a loaded image. Set once per image,
/// immutable until the image is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// =============================================================================
// Rectangles
// =============================================================================

/// An axis-aligned rectangle in surface-logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Axis-aligned bounding box of two corner points, whichever drag
    /// direction produced them.
    pub fn from_corners(a: SurfacePoint, b: SurfacePoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn contains(&self, p: SurfacePoint) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// An axis-aligned rectangle in image-native coordinates, stored as the two
/// corners the annotation data layer uses (`xmin/ymin/xmax/ymax`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageRect {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl ImageRect {
    pub const fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Rectangle spanning two arbitrary corner points.
    pub fn from_corners(a: ImagePoint, b: ImagePoint) -> Self {
        Self {
            xmin: a.x.min(b.x),
            ymin: a.y.min(b.y),
            xmax: a.x.max(b.x),
            ymax: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// True when all corners are finite and the rectangle has positive area.
    pub fn is_valid(&self) -> bool {
        [self.xmin, self.ymin, self.xmax, self.ymax]
            .iter()
            .all(|v| v.is_finite())
            && self.xmax > self.xmin
            && self.ymax > self.ymin
    }

    /// Copy of this rectangle clamped to the given image bounds.
    pub fn clamped_to(&self, image: ImageSize) -> Self {
        let w = image.width as f64;
        let h = image.height as f64;
        Self {
            xmin: self.xmin.clamp(0.0, w),
            ymin: self.ymin.clamp(0.0, h),
            xmax: self.xmax.clamp(0.0, w),
            ymax: self.ymax.clamp(0.0, h),
        }
    }
}

// =============================================================================
// ZoomLevel
// =============================================================================

/// In-viewer zoom level. 1.0 means fit-to-container; 2.0 doubles the fitted
/// size. Distinct from [`BrowserZoom`], which the page cannot control.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ZoomLevel(pub f64);

impl ZoomLevel {
    /// Minimum zoom level (50%).
    pub const MIN: Self = Self(ZOOM_MIN);

    /// Maximum zoom level (500%).
    pub const MAX: Self = Self(ZOOM_MAX);

    /// Fit-to-container zoom.
    pub const FIT: Self = Self(1.0);

    pub const fn new(zoom: f64) -> Self {
        Self(zoom)
    }

    pub const fn value(self) -> f64 {
        self.0
    }

    /// Clamp to the valid zoom range.
    pub fn clamp(self) -> Self {
        Self(self.0.clamp(Self::MIN.0, Self::MAX.0))
    }

    /// Zoom in by the standard step.
    pub fn zoom_in(self) -> Self {
        Self(self.0 * ZOOM_STEP).clamp()
    }

    /// Zoom out by the standard step.
    pub fn zoom_out(self) -> Self {
        Self(self.0 / ZOOM_STEP).clamp()
    }

    /// Zoom by an arbitrary factor, clamped to the valid range.
    pub fn zoom_by(self, factor: f64) -> Self {
        Self(self.0 * factor).clamp()
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self::FIT
    }
}

impl fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.0 * 100.0)
    }
}

// =============================================================================
// PanOffset
// =============================================================================

/// Requested pan offset in surface-logical pixels, relative to the centered
/// position. The transform calculator clamps it per axis; it is ignored on
/// an axis where the scaled image fits inside the surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanOffset {
    pub x: f64,
    pub y: f64,
}

impl PanOffset {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset_by(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

// =============================================================================
// BrowserZoom
// =============================================================================

/// Ambient browser zoom factor, detected indirectly from layout measurements.
/// Distinct from [`ZoomLevel`]: the user controls this through the browser
/// chrome and the page is never told directly.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct BrowserZoom(pub f64);

impl BrowserZoom {
    /// Assumed zoom before the first valid measurement.
    pub const DEFAULT: Self = Self(1.0);

    pub const fn new(zoom: f64) -> Self {
        Self(zoom)
    }

    pub const fn value(self) -> f64 {
        self.0
    }

    /// Whether a raw measurement is worth trusting at all.
    pub fn is_plausible(value: f64) -> bool {
        value.is_finite()
            && value >= crate::constants::BROWSER_ZOOM_MIN
            && value <= crate::constants::BROWSER_ZOOM_MAX
    }
}

impl Default for BrowserZoom {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for BrowserZoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.0 * 100.0)
    }
}

// =============================================================================
// Tests
// =============================================================================
