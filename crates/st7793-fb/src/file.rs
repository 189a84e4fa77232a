//! `std::io` adapter over a surface
//!
//! [`SurfaceFile`] keeps a byte position the way an open device file does.
//! Clamped transfers become short reads and writes, so `read_to_end`,
//! `write_all` and `io::copy` behave as they would on a fixed-size file.

use std::io::{self, Read, Seek, SeekFrom, Write};

use st7793::DisplayInterface;

use crate::error::SurfaceError;
use crate::surface::FrameSurface;

/// Cursor over a [`FrameSurface`] buffer
pub struct SurfaceFile<'a, I>
where
    I: DisplayInterface + Send + 'static,
{
    surface: &'a FrameSurface<I>,
    pos: u64,
}

impl<'a, I> SurfaceFile<'a, I>
where
    I: DisplayInterface + Send + 'static,
{
    pub(crate) fn new(surface: &'a FrameSurface<I>) -> Self {
        Self { surface, pos: 0 }
    }

    /// Current byte position
    pub fn position(&self) -> u64 {
        self.pos
    }

    fn offset(&self) -> usize {
        usize::try_from(self.pos).unwrap_or(usize::MAX)
    }

    fn advance(&mut self, count: usize) -> usize {
        self.pos += count as u64;
        count
    }
}

impl<I> Read for SurfaceFile<'_, I>
where
    I: DisplayInterface + Send + 'static,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.surface.read(self.offset(), buf) {
            Ok(count) => Ok(self.advance(count)),
            Err(SurfaceError::OffsetOutOfRange { .. }) => Ok(0),
            Err(err) => match err.transferred() {
                Some(count) => Ok(self.advance(count)),
                None => Err(err.into()),
            },
        }
    }
}

impl<I> Write for SurfaceFile<'_, I>
where
    I: DisplayInterface + Send + 'static,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.surface.write(self.offset(), buf) {
            Ok(count) => Ok(self.advance(count)),
            Err(err) => match err.transferred() {
                Some(count) if count > 0 => Ok(self.advance(count)),
                _ => Err(err.into()),
            },
        }
    }

    /// Push the buffer to the panel without waiting for the refresh tick
    fn flush(&mut self) -> io::Result<()> {
        self.surface.flush().map_err(io::Error::from)
    }
}

impl<I> Seek for SurfaceFile<'_, I>
where
    I: DisplayInterface + Send + 'static,
{
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(delta) => (self.surface.size() as u64).checked_add_signed(delta),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
        };
        match target {
            Some(n) => {
                self.pos = n;
                Ok(n)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of framebuffer",
            )),
        }
    }
}
