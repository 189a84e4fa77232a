//! ST7793 TFT LCD Driver
//!
//! A driver for the ST7793 controller on a bit-banged 8-bit 8080-style
//! parallel bus, as found on the 240x400 3.0" RGB565 panels.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Landscape and portrait address-window mapping
//! - Region transfers, solid fills and full-frame streaming
//! - Memory-mapped BCM283x GPIO backend
//! - Simulated panel with a virtual clock (with `sim` feature)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use st7793::{Builder, Display, Interface, Orientation, ParallelBus, Rect};
//!
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let data = [MockPin, MockPin, MockPin, MockPin, MockPin, MockPin, MockPin, MockPin];
//! # let (dc, cs, rd, wr, rst) = (MockPin, MockPin, MockPin, MockPin, MockPin);
//! # let mut delay = MockDelay;
//! let bus = ParallelBus::new(data, dc, cs, rd, wr, rst);
//! let config = Builder::new().orientation(Orientation::Landscape).build();
//!
//! let mut display = Display::new(Interface::new(bus), config);
//! if display.init(&mut delay).is_err() {
//!     return;
//! }
//! let _ = display.fill_region(Rect::new(0, 0, 240, 40), 0xF800);
//! ```

#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

#[cfg(test)]
extern crate alloc;

/// Bus lines and the embedded-hal pin backend
pub mod bus;
/// ST7793 command definitions
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// Memory-mapped BCM283x GPIO backend
pub mod gpio;
/// Hardware interface abstraction
pub mod interface;
/// Rectangles and address windows
pub mod window;

/// Simulated panel for host-side tests (requires `sim` feature)
#[cfg(any(test, feature = "sim"))]
pub mod sim;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

pub use bus::{BusLines, Line, ParallelBus};
pub use command::Command;
pub use config::{BYTES_PER_PIXEL, Builder, Config, Dimensions, MAX_COLUMNS, MAX_ROWS, Orientation};
pub use display::Display;
pub use error::{BuilderError, Error};
pub use gpio::{PinMap, PinMapError, RegisterBus};
pub use interface::{DisplayInterface, Interface, RESET_HOLD_MS};
pub use window::Rect;

#[cfg(feature = "graphics")]
pub use graphics::GraphicDisplay;
