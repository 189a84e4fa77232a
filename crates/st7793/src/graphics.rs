//! Graphics support via embedded-graphics
//!
//! This module provides the [`GraphicDisplay`] struct which wraps [`Display`](crate::display::Display)
//! together with an RGB565 framebuffer and implements the
//! [`DrawTarget`](embedded_graphics_core::draw_target::DrawTarget) trait from
//! the embedded-graphics ecosystem.
//!
//! Drawing only touches the framebuffer; call [`GraphicDisplay::update`] or
//! [`GraphicDisplay::update_region`] to push it to the panel. Solid fills are
//! the exception: they are written to the framebuffer and sent straight to
//! the panel as a fill, which needs no buffer reads at all.
//!
//! ## Example
//!
//! ```rust,ignore
//! use st7793::GraphicDisplay;
//! use embedded_graphics::{
//!     pixelcolor::Rgb565,
//!     prelude::*,
//!     primitives::{Circle, PrimitiveStyle},
//! };
//!
//! let mut display = GraphicDisplay::new(display_driver, vec![0u8; 240 * 400 * 2])?;
//!
//! Circle::new(Point::new(100, 50), 40)
//!     .into_styled(PrimitiveStyle::with_stroke(Rgb565::RED, 2))
//!     .draw(&mut display)?;
//!
//! display.update()?;
//! ```

use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{Dimensions as _, OriginDimensions, Point, Size},
    pixelcolor::{IntoStorage, Rgb565},
    prelude::Pixel,
    primitives::Rectangle,
};

use crate::display::Display;
use crate::error::Error;
use crate::interface::DisplayInterface;
use crate::window::Rect;

/// Display with an RGB565 framebuffer
///
/// ## Type Parameters
///
/// * `I` - Interface type implementing [`DisplayInterface`](crate::interface::DisplayInterface)
/// * `B` - Buffer type implementing `AsMut<[u8]>`, exactly `dimensions.buffer_size()` bytes
pub struct GraphicDisplay<I, B>
where
    I: DisplayInterface,
    B: AsMut<[u8]>,
{
    /// The underlying display driver
    display: Display<I>,
    /// Framebuffer, row-major little-endian RGB565
    buffer: B,
}

impl<I, B> GraphicDisplay<I, B>
where
    I: DisplayInterface,
    B: AsMut<[u8]>,
{
    /// Create a new GraphicDisplay
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSize`] if the buffer does not match the panel.
    pub fn new(display: Display<I>, mut buffer: B) -> Result<Self, Error<I>> {
        let required = display.dimensions().buffer_size();
        let provided = buffer.as_mut().len();
        if provided != required {
            return Err(Error::BufferSize { required, provided });
        }
        Ok(Self { display, buffer })
    }

    /// Push the whole framebuffer to the panel
    pub fn update(&mut self) -> Result<(), Error<I>> {
        self.display.transfer_full_frame(self.buffer.as_mut())
    }

    /// Push one rectangle of the framebuffer to the panel
    pub fn update_region(&mut self, rect: Rect) -> Result<(), Error<I>> {
        self.display.transfer_region(self.buffer.as_mut(), rect)
    }

    /// Fill `rect` on the panel and in the framebuffer
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] with the framebuffer untouched if
    /// the rectangle reaches outside the panel.
    pub fn fill_rect(&mut self, rect: Rect, color: u16) -> Result<(), Error<I>> {
        self.display.fill_region(rect, color)?;
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                self.set_pixel(x as usize, y as usize, color);
            }
        }
        Ok(())
    }

    /// Framebuffer contents
    pub fn buffer(&mut self) -> &[u8] {
        self.buffer.as_mut()
    }

    /// Framebuffer contents, for callers that fill it in bulk
    ///
    /// Nothing reaches the panel until the next update.
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        self.buffer.as_mut()
    }

    /// Access the underlying Display
    pub fn display(&self) -> &Display<I> {
        &self.display
    }

    /// Access the underlying Display mutably
    pub fn display_mut(&mut self) -> &mut Display<I> {
        &mut self.display
    }

    /// Split into driver and buffer
    pub fn release(self) -> (Display<I>, B) {
        (self.display, self.buffer)
    }

    fn set_pixel(&mut self, x: usize, y: usize, raw: u16) {
        let width = self.display.dimensions().width as usize;
        let offset = (y * width + x) * 2;
        self.buffer.as_mut()[offset..offset + 2].copy_from_slice(&raw.to_le_bytes());
    }
}

impl<I, B> DrawTarget for GraphicDisplay<I, B>
where
    I: DisplayInterface,
    B: AsMut<[u8]>,
{
    type Color = Rgb565;
    type Error = Error<I>;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let sz = self.size();

        for Pixel(Point { x, y }, color) in pixels {
            if x >= 0 && y >= 0 && (x as u32) < sz.width && (y as u32) < sz.height {
                self.set_pixel(x as usize, y as usize, color.into_storage());
            }
        }

        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        if area.size.width == 0 || area.size.height == 0 {
            return Ok(());
        }
        let rect = Rect::new(
            area.top_left.x as u16,
            area.top_left.y as u16,
            area.size.width as u16,
            area.size.height as u16,
        );
        self.fill_rect(rect, color.into_storage())
    }
}

impl<I, B> OriginDimensions for GraphicDisplay<I, B>
where
    I: DisplayInterface,
    B: AsMut<[u8]>,
{
    fn size(&self) -> Size {
        let dims = self.display.dimensions();
        Size::new(dims.width as u32, dims.height as u32)
    }
}
