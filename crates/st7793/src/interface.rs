//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait and the [`Interface`]
//! struct, which turns bus line toggling into the controller's command/data
//! write cycles.
//!
//! ## Write cycle
//!
//! ```text
//!  DC  ____________________   (low = command, high = data)
//!  D7-D0 ====< byte >=======
//!  WR  ‾‾‾‾‾‾‾‾‾‾\______/‾‾‾  latched on the rising edge
//! ```
//!
//! There is no acknowledge and no read-back: a panel that is not listening
//! looks exactly like one that is.
//!
//! ## Example
//!
//! ```rust,ignore
//! use st7793::{Interface, ParallelBus};
//!
//! let bus = ParallelBus::new(data_pins, dc, cs, rd, wr, rst);
//! let mut interface = Interface::new(bus);
//! interface.init()?;
//! interface.hard_reset(&mut delay);
//! interface.write_command(0x11); // Sleep out
//! ```

use core::fmt::Debug;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;

use crate::bus::{BusLines, Line};
use crate::command::Command;

/// Time the reset line is held low, and the settle time after release
pub const RESET_HOLD_MS: u32 = 120;

/// Trait for the command/data channel to the ST7793
///
/// This trait abstracts over how the write cycles are produced, allowing
/// the [`Display`](crate::display::Display) to work over GPIO bit-banging,
/// a register bank, or a test double.
pub trait DisplayInterface {
    /// Error type for bringing the interface up
    type Error: Debug;

    /// Configure the bus and drive it to idle
    ///
    /// # Errors
    ///
    /// Returns an error if a line cannot be configured.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Write one command byte
    fn write_command(&mut self, command: u8);

    /// Write one data byte, either a command argument or pixel payload
    fn write_data(&mut self, data: u8);

    /// Pulse the reset line
    ///
    /// Implementations must hold reset low at least [`RESET_HOLD_MS`] and
    /// wait at least as long after releasing it. Shorter waits leave the
    /// controller unresponsive.
    fn hard_reset<D: DelayNs>(&mut self, delay: &mut D);

    /// Write a command followed by its arguments
    fn send(&mut self, command: &Command) {
        self.write_command(command.opcode());
        for byte in command.params().iter() {
            self.write_data(*byte);
        }
    }
}

impl<T: DisplayInterface + ?Sized> DisplayInterface for &mut T {
    type Error = T::Error;

    fn init(&mut self) -> Result<(), Self::Error> {
        T::init(self)
    }

    fn write_command(&mut self, command: u8) {
        T::write_command(self, command)
    }

    fn write_data(&mut self, data: u8) {
        T::write_data(self, data)
    }

    fn hard_reset<D: DelayNs>(&mut self, delay: &mut D) {
        T::hard_reset(self, delay)
    }
}

/// 8080-style write cycles over [`BusLines`]
///
/// ## Type Parameters
///
/// * `B` - Bus implementing [`BusLines`]
#[derive(Debug)]
pub struct Interface<B> {
    /// Line controller
    bus: B,
}

impl<B> Interface<B>
where
    B: BusLines,
{
    /// Create a new Interface
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.bus
    }

    /// Access the bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    #[inline]
    fn cycle(&mut self, dc: PinState, byte: u8) {
        self.bus.set_line(Line::Dc, dc);
        self.bus.write_parallel_byte(byte);
        self.bus.set_line(Line::Wr, PinState::Low);
        self.bus.set_line(Line::Wr, PinState::High);
    }
}

impl<B> DisplayInterface for Interface<B>
where
    B: BusLines,
{
    type Error = B::Error;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.bus.configure_outputs()
    }

    fn write_command(&mut self, command: u8) {
        self.cycle(PinState::Low, command);
    }

    fn write_data(&mut self, data: u8) {
        self.cycle(PinState::High, data);
    }

    fn hard_reset<D: DelayNs>(&mut self, delay: &mut D) {
        // Reset sequence: LOW -> wait 120ms -> HIGH -> wait 120ms
        self.bus.set_line(Line::Reset, PinState::Low);
        delay.delay_ms(RESET_HOLD_MS);
        self.bus.set_line(Line::Reset, PinState::High);
        delay.delay_ms(RESET_HOLD_MS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use core::convert::Infallible;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Set(Line, bool),
        Byte(u8),
        Delay(u32),
    }

    #[derive(Debug, Default)]
    struct MockBus {
        ops: Vec<Op>,
    }

    impl BusLines for MockBus {
        type Error = Infallible;

        fn configure_outputs(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn set_line(&mut self, line: Line, level: PinState) {
            self.ops.push(Op::Set(line, level == PinState::High));
        }

        fn write_parallel_byte(&mut self, byte: u8) {
            self.ops.push(Op::Byte(byte));
        }
    }

    struct MockDelay<'a>(&'a mut Vec<Op>);

    impl DelayNs for MockDelay<'_> {
        fn delay_ns(&mut self, ns: u32) {
            self.0.push(Op::Delay(ns));
        }

        fn delay_ms(&mut self, ms: u32) {
            self.0.push(Op::Delay(ms * 1_000_000));
        }
    }

    #[test]
    fn test_write_command_drives_dc_low_and_strobes() {
        let mut interface = Interface::new(MockBus::default());
        interface.write_command(0x2C);
        assert_eq!(
            interface.bus().ops,
            [
                Op::Set(Line::Dc, false),
                Op::Byte(0x2C),
                Op::Set(Line::Wr, false),
                Op::Set(Line::Wr, true),
            ]
        );
    }

    #[test]
    fn test_write_data_drives_dc_high_and_strobes() {
        let mut interface = Interface::new(MockBus::default());
        interface.write_data(0xF8);
        assert_eq!(
            interface.bus().ops,
            [
                Op::Set(Line::Dc, true),
                Op::Byte(0xF8),
                Op::Set(Line::Wr, false),
                Op::Set(Line::Wr, true),
            ]
        );
    }

    #[test]
    fn test_send_writes_opcode_then_params() {
        let mut interface = Interface::new(MockBus::default());
        interface.send(&Command::SetRowAddress(0x0102, 0x0304));
        let bytes: Vec<u8> = interface
            .bus()
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Byte(b) => Some(*b),
                _ => None,
            })
            .collect();
        assert_eq!(bytes, [0x2B, 0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_hard_reset_holds_low_then_settles() {
        let mut interface = Interface::new(MockBus::default());
        let mut delays = Vec::new();
        interface.hard_reset(&mut MockDelay(&mut delays));
        let bus_ops = &interface.bus().ops;
        assert_eq!(
            *bus_ops,
            [Op::Set(Line::Reset, false), Op::Set(Line::Reset, true)]
        );
        assert_eq!(delays, [Op::Delay(120_000_000), Op::Delay(120_000_000)]);
    }
}
