//! Surface errors
//!
//! Driver errors are generic over the bus; the surface flattens them so one
//! error type crosses the thread boundary and the `std::io` adapter.

use st7793::{DisplayInterface, Rect};
use thiserror::Error;

/// Errors from [`FrameSurface`](crate::FrameSurface) operations
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The surface is suspended or detached
    #[error("surface is not running")]
    NotRunning,

    /// Offset lies past the end of the buffer; nothing was copied
    #[error("offset {offset} past end of {size}-byte buffer")]
    OffsetOutOfRange { offset: usize, size: usize },

    /// Request was longer than the whole buffer; the copy was clamped
    #[error("request larger than buffer, {transferred} bytes transferred")]
    TooLarge { transferred: usize },

    /// Request ran past the end of the buffer; the copy was clamped
    #[error("request runs past end of buffer, {transferred} bytes transferred")]
    NoSpace { transferred: usize },

    /// Rectangle reaches outside the panel
    #[error("region {}x{}+{}+{} outside {width}x{height} panel", .rect.width, .rect.height, .rect.x, .rect.y)]
    Region { rect: Rect, width: u16, height: u16 },

    /// Buffer handed to the driver does not match the panel
    #[error("buffer size mismatch: required {required} bytes, provided {provided}")]
    BufferSize { required: usize, provided: usize },

    /// Blit source length does not match the destination rectangle
    #[error("blit source is {provided} bytes, rectangle needs {expected}")]
    BlitSize { expected: usize, provided: usize },

    /// Bus lines could not be brought up
    #[error("failed to attach panel: {0}")]
    Attach(String),

    /// Refresh thread could not be started
    #[error("failed to start refresh thread")]
    Spawn(#[source] std::io::Error),
}

impl SurfaceError {
    /// Bytes copied before the request was clamped, if any were
    pub fn transferred(&self) -> Option<usize> {
        match self {
            SurfaceError::TooLarge { transferred } | SurfaceError::NoSpace { transferred } => {
                Some(*transferred)
            }
            _ => None,
        }
    }
}

impl<I: DisplayInterface> From<st7793::Error<I>> for SurfaceError {
    fn from(err: st7793::Error<I>) -> Self {
        match err {
            st7793::Error::Interface(e) => SurfaceError::Attach(format!("{e:?}")),
            st7793::Error::InvalidRegion {
                rect,
                width,
                height,
            } => SurfaceError::Region {
                rect,
                width,
                height,
            },
            st7793::Error::BufferSize { required, provided } => {
                SurfaceError::BufferSize { required, provided }
            }
        }
    }
}

impl From<SurfaceError> for std::io::Error {
    fn from(err: SurfaceError) -> Self {
        use std::io::ErrorKind;

        let kind = match &err {
            SurfaceError::NotRunning => ErrorKind::PermissionDenied,
            SurfaceError::OffsetOutOfRange { .. } | SurfaceError::TooLarge { .. } => {
                ErrorKind::FileTooLarge
            }
            SurfaceError::NoSpace { .. } => ErrorKind::StorageFull,
            SurfaceError::Region { .. }
            | SurfaceError::BufferSize { .. }
            | SurfaceError::BlitSize { .. } => ErrorKind::InvalidInput,
            SurfaceError::Attach(_) | SurfaceError::Spawn(_) => ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}
