//! Indirect browser-zoom detection.
//!
//! Browsers do not report page zoom directly. The primary signal is the
//! ratio between the container's on-screen rectangle and its computed-style
//! size; when that is unavailable the detector falls back through window
//! outer/inner ratio, the visual-viewport scale, and finally the last value
//! that ever measured cleanly. Detection never fails: a cold cache yields
//! 1.0.

use crate::probe::{Strategy, ViewportProbe, first_valid};
use crate::units::BrowserZoom;

/// Detects the ambient browser zoom factor and caches the last valid read.
#[derive(Debug, Clone, Default)]
pub struct ZoomFactorDetector {
    cached: Option<BrowserZoom>,
}

impl ZoomFactorDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last valid measurement, if any.
    pub fn cached(&self) -> Option<BrowserZoom> {
        self.cached
    }

    /// Drop the cached value (used when a new display/window is attached).
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Measure the current browser zoom factor.
    ///
    /// Updates the cache on every valid read. Implausible candidates
    /// (non-finite or outside the accepted window) are discarded in favor
    /// of the next fallback tier.
    pub fn detect(&mut self, probe: &dyn ViewportProbe) -> BrowserZoom {
        let strategies: Vec<Strategy<'_, f64>> = vec![
            ("rect/style ratio", Box::new(|| rect_style_ratio(probe))),
            ("outer/inner ratio", Box::new(|| window_ratio(probe))),
            (
                "visual viewport scale",
                Box::new(|| probe.visual_viewport().map(|vv| vv.scale)),
            ),
        ];

        match first_valid("browser zoom", strategies, |v| BrowserZoom::is_plausible(*v)) {
            Some(value) => {
                let zoom = BrowserZoom::new(value);
                self.cached = Some(zoom);
                zoom
            }
            None => self.cached.unwrap_or_else(|| {
                log::warn!("browser zoom unknown before first valid measurement, assuming 100%");
                BrowserZoom::DEFAULT
            }),
        }
    }
}

/// Mean of the two axis ratios between the element's on-screen rectangle
/// and its computed style. Requires both style dimensions to be non-zero.
fn rect_style_ratio(probe: &dyn ViewportProbe) -> Option<f64> {
    let rect = probe.bounding_rect()?;
    let style = probe.computed_style_size()?;
    if style.is_empty() {
        return None;
    }
    Some((rect.width / style.width + rect.height / style.height) / 2.0)
}

/// Ratio of outer to inner window width. Coarse, but tracks page zoom on
/// desktop browsers where the chrome keeps its physical size.
fn window_ratio(probe: &dyn ViewportProbe) -> Option<f64> {
    let outer = probe.window_outer_size()?;
    let inner = probe.window_inner_size()?;
    if inner.is_empty() {
        return None;
    }
    Some(outer.width / inner.width)
}
