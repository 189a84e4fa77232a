//! ST7793 Framebuffer Surface
//!
//! Presents an [`st7793`] panel as a fixed-size RGB565 framebuffer: a zeroed
//! byte buffer that graphics code reads, writes, fills and blits into, kept
//! in sync with the glass by direct transfers and a periodic refresh thread.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::io::{Seek, SeekFrom, Write};
//! use st7793::{Builder, Display, Interface, RegisterBus, PinMap};
//! use st7793_fb::{FrameSurface, StdDelay, SurfaceConfig};
//!
//! let bus = unsafe { RegisterBus::new(gpio_base, PinMap::default())? };
//! let display = Display::new(Interface::new(bus), Builder::new().build());
//! let config = SurfaceConfig::builder().refresh_rate(30).build();
//! let surface = FrameSurface::create(display, &mut StdDelay, config)?;
//!
//! let mut file = surface.file();
//! file.seek(SeekFrom::Start(480))?;
//! file.write_all(&[0x00, 0xF8])?; // one red pixel at (0, 1)
//! ```

mod config;
mod delay;
mod error;
mod file;
mod info;
mod refresh;
mod surface;

pub use config::{
    DEFAULT_REFRESH_RATE, DEFAULT_THREAD_NAME, SurfaceConfig, SurfaceConfigBuilder,
    effective_rate, refresh_interval,
};
pub use delay::StdDelay;
pub use error::SurfaceError;
pub use file::SurfaceFile;
pub use info::{Accel, Bitfield, PixelLayout, SCREEN_ID, ScreenInfo, Visual};
pub use surface::{Canvas, Damage, FrameSurface, SurfaceState};
