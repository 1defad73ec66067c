//! Host measurement seam.
//!
//! Everything the engine needs to know about its environment (element
//! geometry, viewport dimensions, device pixel ratio) comes through
//! [`ViewportProbe`]. A browser host backs it with DOM APIs; tests drive the
//! engine with a scripted probe. The fallback cascades in
//! [`crate::zoom_detect`] and [`crate::surface`] are built on the
//! first-success-wins combinator defined here.

use crate::units::LogicalSize;

/// On-screen rectangle of the viewer element, in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementRect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Platform-reported visual viewport (dimensions plus pinch-zoom scale).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualViewport {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

/// Environment measurements the engine depends on.
///
/// Every method may fail; the engine layers fallbacks on top and survives
/// any combination of `None`s. Implementations must not cause layout side
/// effects when queried.
pub trait ViewportProbe {
    /// On-screen bounding rectangle of the viewer container.
    fn bounding_rect(&self) -> Option<ElementRect>;

    /// Computed-style width/height of the viewer container.
    fn computed_style_size(&self) -> Option<LogicalSize>;

    /// Platform visual-viewport dimensions and scale, if the API exists.
    fn visual_viewport(&self) -> Option<VisualViewport>;

    /// Inner size of the host window.
    fn window_inner_size(&self) -> Option<LogicalSize>;

    /// Outer size of the host window (includes browser chrome).
    fn window_outer_size(&self) -> Option<LogicalSize>;

    /// Device pixel ratio of the display the container sits on.
    fn device_pixel_ratio(&self) -> f64;
}

/// A named fallback strategy producing a candidate measurement.
pub(crate) type Strategy<'a, T> = (&'static str, Box<dyn Fn() -> Option<T> + 'a>);

/// Try an ordered list of strategies, returning the first candidate the
/// `accept` predicate approves. Strategies after the winner are not run.
pub(crate) fn first_valid<'a, T>(
    what: &str,
    strategies: impl IntoIterator<Item = Strategy<'a, T>>,
    accept: impl Fn(&T) -> bool,
) -> Option<T> {
    for (name, strategy) in strategies {
        match strategy() {
            Some(candidate) if accept(&candidate) => {
                log::trace!("{what}: using {name}");
                return Some(candidate);
            }
            Some(_) => log::trace!("{what}: rejected {name}"),
            None => log::trace!("{what}: {name} unavailable"),
        }
    }
    None
}

/// Scripted probe for tests. Fields are plain `Option`s so individual
/// measurements can be knocked out to exercise each fallback tier.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct ScriptedProbe {
    pub rect: Option<ElementRect>,
    pub style: Option<LogicalSize>,
    pub visual: Option<VisualViewport>,
    pub inner: Option<LogicalSize>,
    pub outer: Option<LogicalSize>,
    pub dpr: f64,
}

#[cfg(test)]
impl ScriptedProbe {
    /// A healthy desktop layout: 800x600 container at the page origin,
    /// no browser zoom, 1.0 device pixel ratio.
    pub fn desktop() -> Self {
        Self {
            rect: Some(ElementRect::new(0.0, 0.0, 800.0, 600.0)),
            style: Some(LogicalSize::new(800.0, 600.0)),
            visual: None,
            inner: Some(LogicalSize::new(1280.0, 900.0)),
            outer: Some(LogicalSize::new(1280.0, 900.0)),
            dpr: 1.0,
        }
    }
}

#[cfg(test)]
impl ViewportProbe for ScriptedProbe {
    fn bounding_rect(&self) -> Option<ElementRect> {
        self.rect
    }

    fn computed_style_size(&self) -> Option<LogicalSize> {
        self.style
    }

    fn visual_viewport(&self) -> Option<VisualViewport> {
        self.visual
    }

    fn window_inner_size(&self) -> Option<LogicalSize> {
        self.inner
    }

    fn window_outer_size(&self) -> Option<LogicalSize> {
        self.outer
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.dpr
    }
}
