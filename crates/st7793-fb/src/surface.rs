//! Framebuffer surface
//!
//! [`FrameSurface`] owns the pixel buffer and the panel driver behind one
//! mutex, so a buffer mutation and a transfer can never interleave. Byte
//! writes only mark the surface dirty; the refresh thread pushes a full
//! frame on its next tick. Fills, blits and copies go to the panel at once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::Rgb565,
    prelude::Pixel,
    primitives::Rectangle,
};
use embedded_hal::delay::DelayNs;
use st7793::{BYTES_PER_PIXEL, Dimensions, Display, DisplayInterface, GraphicDisplay, Rect};

use crate::config::SurfaceConfig;
use crate::error::SurfaceError;
use crate::file::SurfaceFile;
use crate::info::ScreenInfo;
use crate::refresh::Refresher;

/// Host power state of the surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SurfaceState {
    /// Transfers and buffer access allowed
    #[default]
    Running,
    /// Buffer access refused, nothing sent to the panel
    Suspended,
}

/// Part of the buffer a caller has changed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Damage {
    /// Resend this rectangle from the buffer
    Rect(Rect),
    /// Fill this rectangle on the panel with one RGB565 colour
    Fill(Rect, u16),
    /// Resend the whole buffer
    Full,
}

/// Buffer, driver and flags guarded together
pub(crate) struct Shared<I>
where
    I: DisplayInterface,
{
    pub(crate) gfx: GraphicDisplay<I, Vec<u8>>,
    pub(crate) state: SurfaceState,
    pub(crate) dirty: bool,
}

impl<I> Shared<I>
where
    I: DisplayInterface,
{
    fn ensure_running(&self) -> Result<(), SurfaceError> {
        match self.state {
            SurfaceState::Running => Ok(()),
            SurfaceState::Suspended => Err(SurfaceError::NotRunning),
        }
    }

    fn check_region(&self, rect: &Rect) -> Result<(), SurfaceError> {
        let dims = self.gfx.display().dimensions();
        if rect.fits(dims) {
            return Ok(());
        }
        Err(SurfaceError::Region {
            rect: *rect,
            width: dims.width,
            height: dims.height,
        })
    }

    fn full_refresh(&mut self) -> Result<(), SurfaceError> {
        self.gfx.update()?;
        self.dirty = false;
        Ok(())
    }

    /// Push a full frame if anything changed since the last one
    ///
    /// Returns whether a frame went out.
    pub(crate) fn flush_pending(&mut self) -> Result<bool, SurfaceError> {
        if !self.dirty || self.state != SurfaceState::Running {
            return Ok(false);
        }
        self.full_refresh()?;
        Ok(true)
    }
}

pub(crate) fn lock<I>(shared: &Mutex<Shared<I>>) -> MutexGuard<'_, Shared<I>>
where
    I: DisplayInterface,
{
    // the buffer is plain bytes; a panic mid-draw leaves nothing to repair
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Bytes a read or write may move, and the error to report alongside
fn clamp(
    offset: usize,
    len: usize,
    total: usize,
) -> Result<(usize, Option<SurfaceError>), SurfaceError> {
    if offset > total {
        log::warn!("st7793-fb: offset {offset} past {total}-byte buffer");
        return Err(SurfaceError::OffsetOutOfRange {
            offset,
            size: total,
        });
    }

    let mut count = len;
    let too_large = count > total;
    if too_large {
        count = total;
    }
    let no_space = count + offset > total;
    if no_space {
        count = total - offset;
    }

    let err = if too_large {
        Some(SurfaceError::TooLarge { transferred: count })
    } else if no_space {
        Some(SurfaceError::NoSpace { transferred: count })
    } else {
        None
    };
    if err.is_some() {
        log::warn!("st7793-fb: {len}-byte request at {offset} clamped to {count}");
    }
    Ok((count, err))
}

/// A panel exposed as a byte-addressable RGB565 framebuffer
///
/// ## Example
///
/// ```rust,ignore
/// use st7793::{Builder, Display, Interface, Rect};
/// use st7793_fb::{FrameSurface, StdDelay, SurfaceConfig};
///
/// let display = Display::new(Interface::new(bus), Builder::new().build());
/// let surface = FrameSurface::create(display, &mut StdDelay, SurfaceConfig::default())?;
///
/// surface.fill_rect(Rect::new(0, 0, 240, 20), 0xF800)?;
/// surface.write(0, &frame)?; // pushed on the next refresh tick
/// ```
pub struct FrameSurface<I>
where
    I: DisplayInterface + Send + 'static,
{
    shared: Arc<Mutex<Shared<I>>>,
    refresher: Option<Refresher>,
    info: ScreenInfo,
}

impl<I> FrameSurface<I>
where
    I: DisplayInterface + Send + 'static,
{
    /// Bring up the panel, allocate a zeroed buffer and start refreshing
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Attach`] if the bus cannot be configured and
    /// [`SurfaceError::Spawn`] if the refresh thread cannot be started.
    pub fn create<D: DelayNs>(
        mut display: Display<I>,
        delay: &mut D,
        config: SurfaceConfig,
    ) -> Result<Self, SurfaceError> {
        display.init(delay)?;

        let dims = display.dimensions();
        let gfx = GraphicDisplay::new(display, vec![0u8; dims.buffer_size()])?;
        let shared = Arc::new(Mutex::new(Shared {
            gfx,
            state: SurfaceState::Running,
            dirty: false,
        }));
        let refresher = Refresher::spawn(Arc::clone(&shared), &config)?;

        log::info!(
            "st7793-fb: {}x{} RGB565 framebuffer attached, refresh {} Hz",
            dims.width,
            dims.height,
            refresher.rate()
        );

        Ok(Self {
            shared,
            refresher: Some(refresher),
            info: ScreenInfo::rgb565(dims),
        })
    }

    /// Copy buffer bytes starting at `offset` into `buf`
    ///
    /// Returns the number of bytes copied. Requests reaching past the end
    /// are clamped and reported as [`SurfaceError::TooLarge`] or
    /// [`SurfaceError::NoSpace`] carrying the clamped count.
    pub fn read(&self, offset: usize, buf: &mut [u8]) -> Result<usize, SurfaceError> {
        let mut shared = lock(&self.shared);
        shared.ensure_running()?;

        let buffer = shared.gfx.buffer();
        let (count, err) = clamp(offset, buf.len(), buffer.len())?;
        buf[..count].copy_from_slice(&buffer[offset..offset + count]);
        err.map_or(Ok(count), Err)
    }

    /// Copy `data` into the buffer at `offset` and schedule a full refresh
    ///
    /// Clamping follows [`FrameSurface::read`]. Clamped writes still land
    /// and are still refreshed.
    pub fn write(&self, offset: usize, data: &[u8]) -> Result<usize, SurfaceError> {
        let mut shared = lock(&self.shared);
        shared.ensure_running()?;

        let buffer = shared.gfx.buffer_mut();
        let (count, err) = clamp(offset, data.len(), buffer.len())?;
        buffer[offset..offset + count].copy_from_slice(&data[..count]);
        shared.dirty = true;
        err.map_or(Ok(count), Err)
    }

    /// Push the whole buffer now instead of waiting for the next tick
    pub fn flush(&self) -> Result<(), SurfaceError> {
        let mut shared = lock(&self.shared);
        shared.ensure_running()?;
        shared.full_refresh()
    }

    /// Fill `rect` with an RGB565 colour in the buffer and on the panel
    pub fn fill_rect(&self, rect: Rect, color: u16) -> Result<(), SurfaceError> {
        let mut shared = lock(&self.shared);
        shared.ensure_running()?;
        shared.gfx.fill_rect(rect, color)?;
        Ok(())
    }

    /// Copy the pixels of `src` so its top-left lands on (`dst_x`, `dst_y`)
    ///
    /// Overlapping areas copy as if through a temporary. The controller has
    /// no on-chip copy, so the whole frame is resent afterwards.
    pub fn copy_area(&self, src: Rect, dst_x: u16, dst_y: u16) -> Result<(), SurfaceError> {
        let mut shared = lock(&self.shared);
        shared.ensure_running()?;

        let dst = Rect::new(dst_x, dst_y, src.width, src.height);
        shared.check_region(&src)?;
        shared.check_region(&dst)?;

        let line_length = shared.gfx.display().dimensions().line_length();
        let row_bytes = src.width as usize * BYTES_PER_PIXEL;
        let buffer = shared.gfx.buffer_mut();
        let row_offset = |x: u16, y: u16| y as usize * line_length + x as usize * BYTES_PER_PIXEL;

        // bottom-up when moving down so unread source rows are not overwritten
        let downward = dst_y > src.y;
        for i in 0..src.height {
            let row = if downward { src.height - 1 - i } else { i };
            let from = row_offset(src.x, src.y + row);
            let to = row_offset(dst_x, dst_y + row);
            buffer.copy_within(from..from + row_bytes, to);
        }

        shared.full_refresh()
    }

    /// Copy an RGB565 image into `rect` and send just that rectangle
    ///
    /// `src` is row-major, little-endian, exactly `rect.width * rect.height`
    /// pixels.
    pub fn image_blit(&self, rect: Rect, src: &[u8]) -> Result<(), SurfaceError> {
        let mut shared = lock(&self.shared);
        shared.ensure_running()?;
        shared.check_region(&rect)?;

        let expected = rect.pixel_count() * BYTES_PER_PIXEL;
        if src.len() != expected {
            return Err(SurfaceError::BlitSize {
                expected,
                provided: src.len(),
            });
        }
        if rect.is_empty() {
            return Ok(());
        }

        let line_length = shared.gfx.display().dimensions().line_length();
        let row_bytes = rect.width as usize * BYTES_PER_PIXEL;
        let buffer = shared.gfx.buffer_mut();
        for (row, pixels) in src.chunks_exact(row_bytes).enumerate() {
            let start = (rect.y as usize + row) * line_length + rect.x as usize * BYTES_PER_PIXEL;
            buffer[start..start + row_bytes].copy_from_slice(pixels);
        }

        shared.gfx.update_region(rect)?;
        Ok(())
    }

    /// Tell the surface which part of the buffer changed
    pub fn notify_dirty(&self, damage: Damage) -> Result<(), SurfaceError> {
        let mut shared = lock(&self.shared);
        shared.ensure_running()?;
        match damage {
            Damage::Rect(rect) => shared.gfx.update_region(rect)?,
            Damage::Fill(rect, color) => shared.gfx.display_mut().fill_region(rect, color)?,
            Damage::Full => shared.full_refresh()?,
        }
        Ok(())
    }

    /// Stop panel traffic and refuse buffer access
    pub fn suspend(&self) {
        let mut shared = lock(&self.shared);
        if shared.state != SurfaceState::Suspended {
            log::info!("st7793-fb: suspended");
            shared.state = SurfaceState::Suspended;
        }
    }

    /// Allow access again and repaint on the next tick
    pub fn resume(&self) {
        let mut shared = lock(&self.shared);
        if shared.state != SurfaceState::Running {
            log::info!("st7793-fb: resumed");
            shared.state = SurfaceState::Running;
            shared.dirty = true;
        }
    }

    /// Current power state
    pub fn state(&self) -> SurfaceState {
        lock(&self.shared).state
    }

    /// Whether buffer changes are waiting for the refresh thread
    pub fn is_dirty(&self) -> bool {
        lock(&self.shared).dirty
    }

    /// Screen description
    pub fn info(&self) -> &ScreenInfo {
        &self.info
    }

    /// Panel dimensions
    pub fn dimensions(&self) -> Dimensions {
        lock(&self.shared).gfx.display().dimensions()
    }

    /// Buffer length in bytes
    pub fn size(&self) -> usize {
        self.info.smem_len as usize
    }

    /// Change the periodic refresh rate; 0 selects the default
    pub fn set_refresh_rate(&self, rate: u32) {
        if let Some(refresher) = &self.refresher {
            refresher.set_rate(rate);
        }
    }

    /// Current periodic refresh rate in Hz
    pub fn refresh_rate(&self) -> u32 {
        self.refresher.as_ref().map_or(0, Refresher::rate)
    }

    /// Draw into the buffer with embedded-graphics
    ///
    /// The surface stays locked, and the refresh thread waits, for as long
    /// as the canvas lives.
    pub fn canvas(&self) -> Result<Canvas<'_, I>, SurfaceError> {
        let shared = lock(&self.shared);
        shared.ensure_running()?;
        Ok(Canvas { shared })
    }

    /// Seekable `std::io` view of the buffer
    pub fn file(&self) -> SurfaceFile<'_, I> {
        SurfaceFile::new(self)
    }

    /// Stop refreshing and hand the driver back
    ///
    /// Returns `None` only if the refresh thread still holds the surface.
    pub fn destroy(mut self) -> Option<Display<I>> {
        self.detach();
        let shared = Arc::clone(&self.shared);
        drop(self);

        let shared = Arc::try_unwrap(shared).ok()?;
        let shared = shared.into_inner().unwrap_or_else(PoisonError::into_inner);
        let (display, _buffer) = shared.gfx.release();
        Some(display)
    }

    fn detach(&mut self) {
        if let Some(refresher) = self.refresher.take() {
            refresher.stop();
            log::info!("st7793-fb: framebuffer detached");
        }
    }
}

impl<I> Drop for FrameSurface<I>
where
    I: DisplayInterface + Send + 'static,
{
    fn drop(&mut self) {
        self.detach();
    }
}

/// embedded-graphics target over a locked surface
///
/// Pixel draws mark the surface dirty; solid fills go to the panel at once.
pub struct Canvas<'a, I>
where
    I: DisplayInterface,
{
    shared: MutexGuard<'a, Shared<I>>,
}

impl<I> DrawTarget for Canvas<'_, I>
where
    I: DisplayInterface,
{
    type Color = Rgb565;
    type Error = SurfaceError;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.shared.gfx.draw_iter(pixels)?;
        self.shared.dirty = true;
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.shared.gfx.fill_solid(area, color)?;
        Ok(())
    }
}

impl<I> OriginDimensions for Canvas<'_, I>
where
    I: DisplayInterface,
{
    fn size(&self) -> Size {
        self.shared.gfx.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_in_range() {
        assert!(matches!(clamp(10, 20, 100), Ok((20, None))));
        assert!(matches!(clamp(100, 0, 100), Ok((0, None))));
    }

    #[test]
    fn test_clamp_offset_past_end() {
        assert!(matches!(
            clamp(101, 1, 100),
            Err(SurfaceError::OffsetOutOfRange {
                offset: 101,
                size: 100
            })
        ));
    }

    #[test]
    fn test_clamp_runs_past_end() {
        assert!(matches!(
            clamp(90, 20, 100),
            Ok((10, Some(SurfaceError::NoSpace { transferred: 10 })))
        ));
        assert!(matches!(
            clamp(100, 1, 100),
            Ok((0, Some(SurfaceError::NoSpace { transferred: 0 })))
        ));
    }

    #[test]
    fn test_clamp_larger_than_buffer_wins_over_no_space() {
        assert!(matches!(
            clamp(0, 150, 100),
            Ok((100, Some(SurfaceError::TooLarge { transferred: 100 })))
        ));
        assert!(matches!(
            clamp(30, 150, 100),
            Ok((70, Some(SurfaceError::TooLarge { transferred: 70 })))
        ));
    }
}
