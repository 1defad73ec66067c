//! Centralized constants for the viewer core.
//!
//! All magic numbers and repeated constants are defined here for consistency
//! and easy maintenance.

// =============================================================================
// Zoom & pan
// =============================================================================

/// Minimum in-viewer zoom level (50%).
pub const ZOOM_MIN: f64 = 0.5;

/// Maximum in-viewer zoom level (500%).
pub const ZOOM_MAX: f64 = 5.0;

/// Multiplicative step applied per wheel/keyboard zoom increment.
pub const ZOOM_STEP: f64 = 1.1;

// =============================================================================
// Browser zoom detection
// =============================================================================

/// Lowest browser zoom factor accepted as a plausible measurement.
pub const BROWSER_ZOOM_MIN: f64 = 0.25;

/// Highest browser zoom factor accepted as a plausible measurement.
pub const BROWSER_ZOOM_MAX: f64 = 5.0;

// =============================================================================
// Layout
// =============================================================================

/// Height of the page chrome (header bar) subtracted when the surface size
/// has to be derived from the whole window as a last resort.
pub const CHROME_HEIGHT: f64 = 64.0;

// =============================================================================
// Drawing
// =============================================================================

/// Minimum width and height, in logical pixels, a drawn rectangle must reach
/// before it is committed as an annotation. Smaller gestures are discarded.
pub const MIN_DRAW_SIZE: f64 = 10.0;

/// Side length of the square delete affordance at an annotation's top-right
/// corner, in logical pixels.
pub const DELETE_HANDLE_SIZE: f64 = 14.0;

// =============================================================================
// Rendering style
// =============================================================================

/// Stroke width for reference (ground-truth / machine) boxes.
pub const REFERENCE_STROKE_WIDTH: f64 = 2.0;

/// Stroke width for user-drawn boxes.
pub const USER_STROKE_WIDTH: f64 = 2.0;

/// Stroke width for the in-progress drawing rectangle.
pub const PREVIEW_STROKE_WIDTH: f64 = 1.5;

/// Dash segment length for the in-progress drawing rectangle.
pub const PREVIEW_DASH_LENGTH: f64 = 6.0;

/// Height of the caption chip rendered above user-drawn boxes.
pub const CAPTION_HEIGHT: f64 = 16.0;

/// Nominal caption font size, used only for chip width estimation.
pub const CAPTION_FONT_SIZE: f64 = 12.0;

/// Approximate character width as a ratio of font size.
/// Used for caption chip width estimation.
pub const CHAR_WIDTH_FACTOR: f64 = 0.6;

// =============================================================================
// Resize coalescing
// =============================================================================

/// Debounce window for bursts of resize/viewport events, in milliseconds.
pub const RESIZE_DEBOUNCE_MS: u64 = 100;

/// Extra settle delay after an orientation change, in milliseconds, so the
/// platform can finish its own layout pass before we measure.
pub const ORIENTATION_SETTLE_MS: u64 = 300;
