//! Address window translation
//!
//! The controller fills its RAM inside a window set by two commands: column
//! address (0x2A) and row address (0x2B), then memory write (0x2C). Once the
//! window is open, pixel data lands column by column, row after row.
//!
//! [`AxisMap`] is the single place where the configured [`Orientation`]
//! decides which framebuffer axis is fed to which command. The pixel
//! transfer walks the window through the same map, so the window and the
//! byte stream can never disagree.

use crate::command::Command;
use crate::config::{Dimensions, Orientation};

/// Rectangle in framebuffer pixel coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole panel
    pub const fn full(dims: Dimensions) -> Self {
        Self::new(0, 0, dims.width, dims.height)
    }

    /// Zero width or height
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether the rectangle lies within a panel of the given size
    pub fn fits(&self, dims: Dimensions) -> bool {
        u32::from(self.x) + u32::from(self.width) <= u32::from(dims.width)
            && u32::from(self.y) + u32::from(self.height) <= u32::from(dims.height)
    }

    /// Bounds along x as sent to the controller
    fn x_bounds(&self) -> (u16, u16) {
        (self.x, self.x.saturating_add(self.width))
    }

    /// Bounds along y as sent to the controller
    fn y_bounds(&self) -> (u16, u16) {
        (self.y, self.y.saturating_add(self.height))
    }
}

/// Mapping between framebuffer axes and controller address axes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisMap {
    swap: bool,
}

impl AxisMap {
    /// Map for an orientation
    pub const fn new(orientation: Orientation) -> Self {
        Self {
            swap: matches!(orientation, Orientation::Portrait),
        }
    }

    /// Column and row address commands for a rectangle, in issue order
    ///
    /// Callers must have checked the rectangle against the panel.
    pub fn address_commands(&self, rect: &Rect) -> [Command; 2] {
        let (x0, x1) = rect.x_bounds();
        let (y0, y1) = rect.y_bounds();
        if self.swap {
            [Command::SetRowAddress(x0, x1), Command::SetColumnAddress(y0, y1)]
        } else {
            [Command::SetColumnAddress(x0, x1), Command::SetRowAddress(y0, y1)]
        }
    }

    /// Window extent as (columns, rows) in controller terms
    pub fn panel_extent(&self, rect: &Rect) -> (u16, u16) {
        if self.swap {
            (rect.height, rect.width)
        } else {
            (rect.width, rect.height)
        }
    }

    /// Framebuffer (x, y) of the pixel at `col`, `row` inside the window
    ///
    /// `col` and `row` are offsets from the window origin in the
    /// controller's own scan order.
    #[inline]
    pub fn to_framebuffer(&self, rect: &Rect, col: u16, row: u16) -> (usize, usize) {
        let (dx, dy) = if self.swap { (row, col) } else { (col, row) };
        (rect.x as usize + dx as usize, rect.y as usize + dy as usize)
    }
}

/// Commands that open a window for `rect` ready for pixel data
///
/// Always column/row address in orientation order followed by memory write.
pub fn window_commands(rect: &Rect, orientation: Orientation) -> [Command; 3] {
    let [first, second] = AxisMap::new(orientation).address_commands(rect);
    [first, second, Command::MemoryWrite]
}
