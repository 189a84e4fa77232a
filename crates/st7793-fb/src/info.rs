//! Screen description handed to graphics consumers

use st7793::{BYTES_PER_PIXEL, Dimensions};

/// Identifier reported by every surface
pub const SCREEN_ID: &str = "st7793";

/// Memory layout of the buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// Each pixel occupies consecutive bytes
    PackedPixels,
}

/// How pixel values map to colours
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visual {
    /// Channels are encoded directly in the pixel value
    TrueColor,
}

/// Hardware drawing acceleration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accel {
    None,
}

/// Position of one colour channel within a pixel value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bitfield {
    /// Least significant bit of the channel
    pub offset: u8,
    /// Channel width in bits
    pub length: u8,
}

impl Bitfield {
    pub const fn new(offset: u8, length: u8) -> Self {
        Self { offset, length }
    }
}

/// Fixed and variable screen parameters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScreenInfo {
    pub id: &'static str,
    pub layout: PixelLayout,
    pub visual: Visual,
    pub accel: Accel,
    pub xres: u32,
    pub yres: u32,
    pub xres_virtual: u32,
    pub yres_virtual: u32,
    pub bits_per_pixel: u32,
    /// Bytes per buffer row
    pub line_length: u32,
    /// Buffer length in bytes
    pub smem_len: u32,
    pub red: Bitfield,
    pub green: Bitfield,
    pub blue: Bitfield,
    pub transp: Bitfield,
}

impl ScreenInfo {
    /// RGB565 description of a panel with the given size
    pub fn rgb565(dims: Dimensions) -> Self {
        let xres = u32::from(dims.width);
        let yres = u32::from(dims.height);
        Self {
            id: SCREEN_ID,
            layout: PixelLayout::PackedPixels,
            visual: Visual::TrueColor,
            accel: Accel::None,
            xres,
            yres,
            xres_virtual: xres,
            yres_virtual: yres,
            bits_per_pixel: (BYTES_PER_PIXEL * 8) as u32,
            line_length: dims.line_length() as u32,
            smem_len: dims.buffer_size() as u32,
            red: Bitfield::new(11, 5),
            green: Bitfield::new(5, 6),
            blue: Bitfield::new(0, 5),
            transp: Bitfield::default(),
        }
    }
}
