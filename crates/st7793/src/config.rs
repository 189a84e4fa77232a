//! Display configuration types and builder

pub use crate::error::{BuilderError, MAX_COLUMNS, MAX_ROWS};
use crate::command::PIXEL_FORMAT_RGB565;

/// Bytes per RGB565 pixel
pub const BYTES_PER_PIXEL: usize = 2;

/// Panel dimensions in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if either side is zero or
    /// larger than the controller supports (`MAX_COLUMNS` x `MAX_ROWS`).
    pub fn new(width: u16, height: u16) -> Result<Self, BuilderError> {
        if width == 0 || width > MAX_COLUMNS || height == 0 || height > MAX_ROWS {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Number of pixels on the panel
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Required framebuffer size in bytes
    pub fn buffer_size(&self) -> usize {
        self.pixel_count() * BYTES_PER_PIXEL
    }

    /// Bytes per framebuffer row
    pub fn line_length(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }
}

impl Default for Dimensions {
    /// The 240x400 glass this driver was written for
    fn default() -> Self {
        Self {
            width: MAX_COLUMNS,
            height: MAX_ROWS,
        }
    }
}

/// How framebuffer axes map onto the controller's address windows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// x runs along the column address (0x2A), y along the row address (0x2B)
    #[default]
    Landscape,
    /// x runs along the row address (0x2B), y along the column address (0x2A)
    Portrait,
}

/// Display configuration
///
/// Fixed once the driver is created. Use `Builder` to create a Config.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Panel dimensions
    pub dimensions: Dimensions,
    /// Axis mapping
    pub orientation: Orientation,
    /// Argument for the interface pixel format command
    pub pixel_format: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dimensions: Dimensions::default(),
            orientation: Orientation::default(),
            pixel_format: PIXEL_FORMAT_RGB565,
        }
    }
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```
/// use st7793::{Builder, Dimensions, Orientation};
///
/// let config = Builder::new()
///     .dimensions(Dimensions::new(240, 400).unwrap())
///     .orientation(Orientation::Portrait)
///     .build();
/// assert_eq!(config.dimensions.buffer_size(), 240 * 400 * 2);
/// ```
#[derive(Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set panel dimensions (defaults to 240x400)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.config.dimensions = dims;
        self
    }

    /// Set orientation
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.config.orientation = orientation;
        self
    }

    /// Override the interface pixel format byte
    ///
    /// Everything else in the driver assumes 16 bits per pixel; only change
    /// this for a panel that needs a different encoding of the same format.
    pub fn pixel_format(mut self, format: u8) -> Self {
        self.config.pixel_format = format;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}
