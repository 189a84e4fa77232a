//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and display operations ([`Error`]).
//!
//! The bus is write-only, so nothing the panel does can surface here. Every
//! [`Error`] except [`Error::Interface`] is raised by argument validation
//! before a single byte goes out.
//!
//! ## Example
//!
//! ```
//! use st7793::{BuilderError, Dimensions};
//!
//! let result = Dimensions::new(480, 800); // Too large
//! assert!(matches!(result, Err(BuilderError::InvalidDimensions { .. })));
//! ```

use crate::interface::DisplayInterface;
use crate::window::Rect;

/// Maximum columns (source outputs) of the ST7793
pub const MAX_COLUMNS: u16 = 240;

/// Maximum rows (gate outputs) of the ST7793
pub const MAX_ROWS: u16 = 400;

/// Errors that can occur when interacting with the display
///
/// Generic over the interface type to preserve the specific error type.
#[derive(Debug)]
pub enum Error<I: DisplayInterface> {
    /// The interface could not be brought up
    ///
    /// Only returned from initialization; once attached the bus cannot fail.
    Interface(I::Error),
    /// Rectangle reaches outside the panel
    InvalidRegion {
        /// Rectangle requested
        rect: Rect,
        /// Panel width
        width: u16,
        /// Panel height
        height: u16,
    },
    /// Pixel buffer length does not match the panel
    BufferSize {
        /// Required buffer size in bytes
        required: usize,
        /// Provided buffer size in bytes
        provided: usize,
    },
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Interface(e) => write!(f, "Interface error: {e:?}"),
            Error::InvalidRegion {
                rect,
                width,
                height,
            } => write!(
                f,
                "Region {}x{}+{}+{} outside {width}x{height} panel",
                rect.width, rect.height, rect.x, rect.y
            ),
            Error::BufferSize { required, provided } => {
                write!(
                    f,
                    "Buffer size mismatch: required {required} bytes, provided {provided}"
                )
            }
        }
    }
}

impl<I: DisplayInterface + core::fmt::Debug> core::error::Error for Error<I> {}

/// Errors that can occur when building configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderError {
    /// Invalid dimensions provided
    ///
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions {
        /// Width requested
        width: u16,
        /// Height requested
        height: u16,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BuilderError::InvalidDimensions { width, height } => write!(
                f,
                "Invalid dimensions {width}x{height} (max {MAX_COLUMNS}x{MAX_ROWS})"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}
