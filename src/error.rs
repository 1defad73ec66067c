//! Error types for viewer API boundaries.
//!
//! Per-frame failures (transient zero sizes, non-finite math) never surface
//! as errors; they are logged and the previous state is kept. The variants
//! here cover misuse of the public API only.

use thiserror::Error;

/// Errors returned by the viewer's public API.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// A loaded raster had zero width or height.
    #[error("image has zero area ({width}x{height})")]
    EmptyImage {
        /// Raster width in pixels
        width: u32,
        /// Raster height in pixels
        height: u32,
    },

    /// A label was supplied but no drawn region is awaiting one.
    #[error("no pending region to label")]
    NoPendingRegion,

    /// A user-annotation index did not exist.
    #[error("annotation index {index} out of range ({len} user annotations)")]
    IndexOutOfRange {
        /// The requested index
        index: usize,
        /// Number of user annotations present
        len: usize,
    },

    /// Annotation bounds were degenerate or non-finite.
    #[error("invalid annotation bounds: {message}")]
    InvalidBounds {
        /// Description of the problem
        message: String,
    },
}

impl ViewerError {
    /// Create an invalid-bounds error with a message.
    pub fn invalid_bounds(message: impl Into<String>) -> Self {
        Self::InvalidBounds {
            message: message.into(),
        }
    }
}
