//! Core display operations

use embedded_hal::delay::DelayNs;

use crate::command::Command;
use crate::config::{BYTES_PER_PIXEL, Config, Dimensions, Orientation};
use crate::error::Error;
use crate::interface::DisplayInterface;
use crate::window::{AxisMap, Rect, window_commands};

/// Settle time after software reset and after sleep out
pub const INIT_SETTLE_MS: u32 = 120;

/// Core display driver for ST7793
///
/// Owns the interface and the fixed configuration. The pixel buffer is
/// always borrowed from the caller for the length of one transfer.
/// For graphics support, use `GraphicDisplay` (requires `graphics` feature).
pub struct Display<I>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Display configuration
    config: Config,
    /// Axis mapping derived from the orientation
    axes: AxisMap,
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    /// Create a new Display instance
    pub fn new(interface: I, config: Config) -> Self {
        Self {
            interface,
            axes: AxisMap::new(config.orientation),
            config,
        }
    }

    /// Configure the bus, pulse reset and run the panel init sequence
    ///
    /// Blocks for at least 480ms.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Interface`] if the bus lines cannot be configured.
    /// Nothing is written to the panel in that case.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I>> {
        self.interface.init().map_err(Error::Interface)?;
        self.hard_reset(delay);
        self.initialize_panel(delay);
        Ok(())
    }

    /// Pulse the reset line
    pub fn hard_reset<D: DelayNs>(&mut self, delay: &mut D) {
        log::debug!("st7793: hard reset");
        self.interface.hard_reset(delay);
    }

    /// Bring the controller out of reset into 16-bit RGB565 mode
    ///
    /// Software reset, sleep out, pixel format, display on. The controller
    /// acknowledges nothing, so the settle delays are the only guarantee the
    /// next command is honoured.
    pub fn initialize_panel<D: DelayNs>(&mut self, delay: &mut D) {
        log::debug!("st7793: software reset");
        self.send(Command::SoftwareReset);
        delay.delay_ms(INIT_SETTLE_MS);

        log::debug!("st7793: sleep out");
        self.send(Command::SleepOut);
        delay.delay_ms(INIT_SETTLE_MS);

        log::debug!("st7793: pixel format {:#04x}", self.config.pixel_format);
        self.send(Command::SetPixelFormat(self.config.pixel_format));
        self.send(Command::DisplayOn);
    }

    /// Open an address window for `rect` and start a memory write
    ///
    /// Every data byte written afterwards fills the window in the
    /// controller's scan order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] without touching the bus if the
    /// rectangle reaches outside the panel.
    pub fn set_window(&mut self, rect: Rect) -> Result<(), Error<I>> {
        self.check_region(&rect)?;
        self.open_window(&rect);
        Ok(())
    }

    /// Stream the pixels of `rect` from a full-panel `buffer`
    ///
    /// `buffer` is the whole framebuffer, row-major RGB565, two bytes per
    /// pixel sent in memory order. Exactly `rect.width * rect.height` pixels
    /// are written. Empty rectangles are accepted and produce no traffic.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSize`] or [`Error::InvalidRegion`] before any
    /// bus traffic.
    pub fn transfer_region(&mut self, buffer: &[u8], rect: Rect) -> Result<(), Error<I>> {
        self.check_buffer(buffer)?;
        self.check_region(&rect)?;
        if rect.is_empty() {
            return Ok(());
        }

        self.open_window(&rect);
        let line_length = self.config.dimensions.line_length();
        let (cols, rows) = self.axes.panel_extent(&rect);
        for row in 0..rows {
            for col in 0..cols {
                let (x, y) = self.axes.to_framebuffer(&rect, col, row);
                let offset = y * line_length + x * BYTES_PER_PIXEL;
                let pixel = &buffer[offset..offset + BYTES_PER_PIXEL];
                self.interface.write_data(pixel[0]);
                self.interface.write_data(pixel[1]);
            }
        }
        self.finish();
        Ok(())
    }

    /// Fill `rect` with a single RGB565 colour without reading any buffer
    ///
    /// Each pixel is sent low byte first, matching the framebuffer layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] before any bus traffic.
    pub fn fill_region(&mut self, rect: Rect, color: u16) -> Result<(), Error<I>> {
        self.check_region(&rect)?;
        if rect.is_empty() {
            return Ok(());
        }

        self.open_window(&rect);
        let [lo, hi] = color.to_le_bytes();
        for _ in 0..rect.pixel_count() {
            self.interface.write_data(lo);
            self.interface.write_data(hi);
        }
        self.finish();
        Ok(())
    }

    /// Send the whole framebuffer as one window
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSize`] if `buffer` does not match the panel.
    pub fn transfer_full_frame(&mut self, buffer: &[u8]) -> Result<(), Error<I>> {
        self.check_buffer(buffer)?;
        let rect = Rect::full(self.config.dimensions);
        self.open_window(&rect);
        match self.config.orientation {
            // window scan order is buffer order
            Orientation::Landscape => {
                for byte in buffer {
                    self.interface.write_data(*byte);
                }
            }
            Orientation::Portrait => {
                let line_length = self.config.dimensions.line_length();
                for x in 0..self.config.dimensions.width as usize {
                    for pixel in buffer[x * BYTES_PER_PIXEL..]
                        .chunks(BYTES_PER_PIXEL)
                        .step_by(line_length / BYTES_PER_PIXEL)
                    {
                        self.interface.write_data(pixel[0]);
                        self.interface.write_data(pixel[1]);
                    }
                }
            }
        }
        self.finish();
        Ok(())
    }

    /// Get display dimensions
    pub fn dimensions(&self) -> Dimensions {
        self.config.dimensions
    }

    /// Get display orientation
    pub fn orientation(&self) -> Orientation {
        self.config.orientation
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Access the interface
    pub fn interface(&self) -> &I {
        &self.interface
    }

    /// Give the interface back
    pub fn release(self) -> I {
        self.interface
    }

    fn check_region(&self, rect: &Rect) -> Result<(), Error<I>> {
        let dims = self.config.dimensions;
        if rect.fits(dims) {
            return Ok(());
        }
        log::warn!(
            "st7793: rejecting region {}x{}+{}+{}",
            rect.width,
            rect.height,
            rect.x,
            rect.y
        );
        Err(Error::InvalidRegion {
            rect: *rect,
            width: dims.width,
            height: dims.height,
        })
    }

    fn check_buffer(&self, buffer: &[u8]) -> Result<(), Error<I>> {
        let required = self.config.dimensions.buffer_size();
        if buffer.len() != required {
            return Err(Error::BufferSize {
                required,
                provided: buffer.len(),
            });
        }
        Ok(())
    }

    fn open_window(&mut self, rect: &Rect) {
        for command in window_commands(rect, self.config.orientation) {
            self.send(command);
        }
    }

    /// Some panels drop the output path after a fault; re-enable it after every write
    fn finish(&mut self) {
        self.send(Command::DisplayOn);
    }

    fn send(&mut self, command: Command) {
        self.interface.send(&command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::*;
    use crate::config::Builder;
    use crate::interface::Interface;
    use crate::sim::{BusEvent, SimBus, SimDelay, SimProbe};
    use alloc::vec;
    use alloc::vec::Vec;
    use embedded_hal::digital::PinState;

    use crate::bus::Line;

    fn test_display(orientation: Orientation) -> (Display<Interface<SimBus>>, SimProbe) {
        let bus = SimBus::new();
        let probe = bus.probe();
        let config = Builder::new().orientation(orientation).build();
        (Display::new(Interface::new(bus), config), probe)
    }

    fn small_display(
        width: u16,
        height: u16,
        orientation: Orientation,
    ) -> (Display<Interface<SimBus>>, SimProbe) {
        let bus = SimBus::new();
        let probe = bus.probe();
        let config = Builder::new()
            .dimensions(Dimensions::new(width, height).unwrap())
            .orientation(orientation)
            .build();
        (Display::new(Interface::new(bus), config), probe)
    }

    /// Buffer where every byte is distinct enough to spot reordering
    fn pattern(dims: Dimensions) -> Vec<u8> {
        (0..dims.buffer_size()).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_init_sequence_and_timing() {
        let (mut display, probe) = test_display(Orientation::Landscape);
        let mut delay = SimDelay::new(&probe);
        display.init(&mut delay).unwrap();

        let events = probe.events();
        let kinds: Vec<BusEvent> = events.iter().map(|s| s.event).collect();
        assert_eq!(
            kinds,
            [
                BusEvent::Configured,
                BusEvent::Line(Line::Reset, PinState::Low),
                BusEvent::Line(Line::Reset, PinState::High),
                BusEvent::Command(SOFT_RESET),
                BusEvent::Command(SLEEP_OUT),
                BusEvent::Command(INTERFACE_PIXEL_FORMAT),
                BusEvent::Data(PIXEL_FORMAT_RGB565),
                BusEvent::Command(DISPLAY_ON),
            ]
        );

        const MS: u64 = 1_000_000;
        assert!(events[2].at_ns - events[1].at_ns >= 120 * MS);
        assert!(events[3].at_ns - events[2].at_ns >= 120 * MS);
        assert!(events[4].at_ns - events[3].at_ns >= 120 * MS);
        assert!(events[5].at_ns - events[4].at_ns >= 120 * MS);
        // pixel format and display on need no settle time
        assert_eq!(events[7].at_ns, events[5].at_ns);
    }

    #[test]
    fn test_set_window_landscape_order() {
        let (mut display, probe) = test_display(Orientation::Landscape);
        display.set_window(Rect::new(0x10, 0x120, 0x20, 0x30)).unwrap();

        assert_eq!(
            probe.bus_events(),
            [
                BusEvent::Command(COLUMN_ADDRESS_SET),
                BusEvent::Data(0x00),
                BusEvent::Data(0x10),
                BusEvent::Data(0x00),
                BusEvent::Data(0x30),
                BusEvent::Command(ROW_ADDRESS_SET),
                BusEvent::Data(0x01),
                BusEvent::Data(0x20),
                BusEvent::Data(0x01),
                BusEvent::Data(0x50),
                BusEvent::Command(MEMORY_WRITE),
            ]
        );
    }

    #[test]
    fn test_set_window_portrait_swaps_axes() {
        let (mut display, probe) = test_display(Orientation::Portrait);
        display.set_window(Rect::new(0x10, 0x120, 0x20, 0x30)).unwrap();

        assert_eq!(
            probe.bus_events(),
            [
                BusEvent::Command(ROW_ADDRESS_SET),
                BusEvent::Data(0x00),
                BusEvent::Data(0x10),
                BusEvent::Data(0x00),
                BusEvent::Data(0x30),
                BusEvent::Command(COLUMN_ADDRESS_SET),
                BusEvent::Data(0x01),
                BusEvent::Data(0x20),
                BusEvent::Data(0x01),
                BusEvent::Data(0x50),
                BusEvent::Command(MEMORY_WRITE),
            ]
        );
    }

    #[test]
    fn test_set_window_every_valid_rect_on_small_panel() {
        for orientation in [Orientation::Landscape, Orientation::Portrait] {
            let (mut display, probe) = small_display(6, 5, orientation);
            for x in 0..6u16 {
                for y in 0..5u16 {
                    for w in 0..=(6 - x) {
                        for h in 0..=(5 - y) {
                            probe.clear();
                            display.set_window(Rect::new(x, y, w, h)).unwrap();
                            let commands = probe.commands();
                            let expected: [u8; 3] = match orientation {
                                Orientation::Landscape => [0x2A, 0x2B, 0x2C],
                                Orientation::Portrait => [0x2B, 0x2A, 0x2C],
                            };
                            assert_eq!(commands, expected);
                            assert_eq!(
                                probe.data(),
                                [0u8, x as u8, 0, (x + w) as u8, 0, y as u8, 0, (y + h) as u8]
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_window_one_past_edge_rejected_without_traffic() {
        let (mut display, probe) = test_display(Orientation::Landscape);
        let buffer = vec![0u8; display.dimensions().buffer_size()];

        let rect = Rect::new(1, 0, 240, 1);
        assert!(matches!(
            display.set_window(rect),
            Err(Error::InvalidRegion { width: 240, .. })
        ));
        assert!(display.fill_region(rect, 0xFFFF).is_err());
        assert!(display.transfer_region(&buffer, rect).is_err());
        assert!(display.fill_region(Rect::new(0, 0, 1, 401), 0).is_err());

        assert_eq!(probe.transitions(), 0);
    }

    #[test]
    fn test_transfer_region_row_major_from_origin() {
        let (mut display, probe) = test_display(Orientation::Landscape);
        let dims = display.dimensions();
        let buffer = pattern(dims);
        let rect = Rect::new(3, 7, 5, 4);

        display.transfer_region(&buffer, rect).unwrap();

        let sent = probe.data_after_last(MEMORY_WRITE);
        assert_eq!(sent.len(), 2 * 5 * 4);
        let mut expected = Vec::new();
        for y in 7..11 {
            let start = y * dims.line_length() + 3 * 2;
            expected.extend_from_slice(&buffer[start..start + 5 * 2]);
        }
        assert_eq!(sent, expected);
        assert_eq!(probe.commands().last(), Some(&DISPLAY_ON));
    }

    #[test]
    fn test_transfer_region_portrait_walks_columns() {
        let (mut display, probe) = small_display(4, 3, Orientation::Portrait);
        let buffer = pattern(display.dimensions());
        let rect = Rect::new(1, 0, 2, 3);

        display.transfer_region(&buffer, rect).unwrap();

        let sent = probe.data_after_last(MEMORY_WRITE);
        let line = 4 * 2;
        let mut expected = Vec::new();
        for x in 1..3 {
            for y in 0..3 {
                let offset = y * line + x * 2;
                expected.extend_from_slice(&buffer[offset..offset + 2]);
            }
        }
        assert_eq!(sent, expected);
    }

    #[test]
    fn test_transfer_region_rejects_wrong_buffer() {
        let (mut display, probe) = test_display(Orientation::Landscape);
        let short = vec![0u8; 100];
        assert!(matches!(
            display.transfer_region(&short, Rect::new(0, 0, 1, 1)),
            Err(Error::BufferSize {
                required: 192_000,
                provided: 100
            })
        ));
        assert_eq!(probe.transitions(), 0);
    }

    #[test]
    fn test_fill_region_pairs_low_then_high() {
        let (mut display, probe) = test_display(Orientation::Portrait);
        display.fill_region(Rect::new(20, 30, 7, 3), 0x1234).unwrap();

        let sent = probe.data_after_last(MEMORY_WRITE);
        assert_eq!(sent.len(), 2 * 7 * 3);
        for pair in sent.chunks(2) {
            assert_eq!(pair, [0x34u8, 0x12]);
        }
    }

    #[test]
    fn test_fill_red_strip_end_to_end() {
        let (mut display, probe) = test_display(Orientation::Landscape);
        let mut delay = SimDelay::new(&probe);
        display.init(&mut delay).unwrap();
        probe.clear();

        display.fill_region(Rect::new(0, 0, 10, 1), 0xF800).unwrap();

        let mut expected = vec![
            BusEvent::Command(COLUMN_ADDRESS_SET),
            BusEvent::Data(0),
            BusEvent::Data(0),
            BusEvent::Data(0),
            BusEvent::Data(10),
            BusEvent::Command(ROW_ADDRESS_SET),
            BusEvent::Data(0),
            BusEvent::Data(0),
            BusEvent::Data(0),
            BusEvent::Data(1),
            BusEvent::Command(MEMORY_WRITE),
        ];
        for _ in 0..10 {
            expected.push(BusEvent::Data(0x00));
            expected.push(BusEvent::Data(0xF8));
        }
        expected.push(BusEvent::Command(DISPLAY_ON));
        assert_eq!(probe.bus_events(), expected);
    }

    #[test]
    fn test_empty_region_is_silent() {
        let (mut display, probe) = test_display(Orientation::Landscape);
        let buffer = vec![0u8; display.dimensions().buffer_size()];
        display.fill_region(Rect::new(5, 5, 0, 10), 0xFFFF).unwrap();
        display.transfer_region(&buffer, Rect::new(5, 5, 10, 0)).unwrap();
        assert_eq!(probe.transitions(), 0);
    }

    #[test]
    fn test_full_frame_round_trip_preserves_bytes() {
        let (mut display, probe) = test_display(Orientation::Landscape);
        let mut buffer = vec![0u8; display.dimensions().buffer_size()];
        let k = 1234;
        let marker = [0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x02];
        buffer[k..k + marker.len()].copy_from_slice(&marker);

        display.transfer_full_frame(&buffer).unwrap();

        assert_eq!(
            probe.commands(),
            [COLUMN_ADDRESS_SET, ROW_ADDRESS_SET, MEMORY_WRITE, DISPLAY_ON]
        );
        assert_eq!(probe.data_after_last(MEMORY_WRITE), buffer);
    }

    #[test]
    fn test_full_frame_matches_full_region_transfer() {
        for orientation in [Orientation::Landscape, Orientation::Portrait] {
            let (mut display, probe) = small_display(7, 5, orientation);
            let dims = display.dimensions();
            let buffer = pattern(dims);

            display.transfer_full_frame(&buffer).unwrap();
            let full = probe.bus_events();
            probe.clear();
            display.transfer_region(&buffer, Rect::full(dims)).unwrap();

            assert_eq!(full, probe.bus_events());
        }
    }

    #[test]
    fn test_full_frame_rejects_wrong_buffer() {
        let (mut display, probe) = small_display(8, 8, Orientation::Landscape);
        let buffer = vec![0u8; 8 * 8 * 2 + 1];
        assert!(display.transfer_full_frame(&buffer).is_err());
        assert_eq!(probe.transitions(), 0);
    }
}
