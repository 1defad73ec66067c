//! Cytoview: coordinate-transform and rendering-surface engine for a
//! cytology slide viewer.
//!
//! The engine keeps four coordinate spaces honest (on-screen pointer,
//! surface-logical, physical pixel buffer, image-native), detects ambient
//! browser zoom indirectly, sizes physical buffers to the device pixel
//! ratio, renders immutable reference overlays and user-drawn regions with
//! a deterministic pipeline, and coalesces resize bursts before measuring.
//!
//! The host supplies environment measurements through
//! [`probe::ViewportProbe`] and pumps events into a [`viewer::Viewer`];
//! everything else is internal. Per-frame anomalies (collapsed layouts,
//! non-finite math) are logged and skipped rather than surfaced as errors,
//! so a transient bad measurement can never destroy a valid view.

pub mod color;
pub mod constants;
pub mod drawing;
pub mod error;
pub mod model;
pub mod probe;
pub mod render;
pub mod resize;
pub mod surface;
pub mod test_image;
pub mod transform;
pub mod units;
pub mod viewer;
pub mod zoom_detect;

pub use color::Color;
pub use error::ViewerError;
pub use model::{Annotation, AnnotationKind, AnnotationStore};
pub use probe::{ElementRect, ViewportProbe, VisualViewport};
pub use resize::ResizeKind;
pub use transform::ViewTransform;
pub use units::{
    BrowserZoom, ImagePoint, ImageRect, ImageSize, LogicalSize, PanOffset, PhysicalSize,
    ScreenPoint, SurfacePoint, SurfaceRect, ZoomLevel,
};
pub use viewer::Viewer;

/// Common imports for hosts embedding the viewer.
pub mod prelude {
    pub use crate::error::ViewerError;
    pub use crate::model::{Annotation, AnnotationKind};
    pub use crate::probe::{ElementRect, ViewportProbe, VisualViewport};
    pub use crate::resize::ResizeKind;
    pub use crate::units::{
        ImageRect, ImageSize, LogicalSize, ScreenPoint, SurfacePoint, ZoomLevel,
    };
    pub use crate::viewer::Viewer;
}
