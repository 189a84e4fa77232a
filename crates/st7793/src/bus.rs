//! Bus line control
//!
//! The ST7793 is wired over an 8080-style 8-bit parallel bus: eight data
//! lines plus data/command select (DC), chip select (CS), read strobe (RD),
//! write strobe (WR) and reset. [`BusLines`] is the seam between the protocol
//! engine and whatever actually toggles those lines.
//!
//! ## Idle state
//!
//! | line  | level |
//! |-------|-------|
//! | D0-D7 | low   |
//! | DC    | high  |
//! | CS    | low   |
//! | RD    | high  |
//! | WR    | high  |
//! | RESET | high  |

use core::fmt::Debug;

use embedded_hal::digital::{OutputPin, PinState};

/// A single line of the parallel bus
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Line {
    D0,
    D1,
    D2,
    D3,
    D4,
    D5,
    D6,
    D7,
    /// Data/command select (low=command, high=data)
    Dc,
    /// Chip select (active low)
    Cs,
    /// Read strobe (active low)
    Rd,
    /// Write strobe, latched on the rising edge
    Wr,
    /// Reset (active low)
    Reset,
}

impl Line {
    /// Data lines, least significant bit first
    pub const DATA: [Line; 8] = [
        Line::D0,
        Line::D1,
        Line::D2,
        Line::D3,
        Line::D4,
        Line::D5,
        Line::D6,
        Line::D7,
    ];

    /// Control lines with their idle levels
    pub const CONTROL_IDLE: [(Line, PinState); 5] = [
        (Line::Dc, PinState::High),
        (Line::Cs, PinState::Low),
        (Line::Rd, PinState::High),
        (Line::Wr, PinState::High),
        (Line::Reset, PinState::High),
    ];

    /// Bit position for D0-D7, `None` for control lines
    pub fn data_bit(self) -> Option<usize> {
        Line::DATA.iter().position(|line| *line == self)
    }
}

/// Write-only access to the bus lines
///
/// Nothing can be read back from the panel in this wiring, so only
/// [`configure_outputs`](BusLines::configure_outputs) reports failure. A
/// line that cannot be driven is a hardware mapping problem and has to show
/// up before the driver attaches.
pub trait BusLines {
    /// Error raised while bringing the lines up
    type Error: Debug;

    /// Switch every line to output mode and drive the idle state
    ///
    /// Must be called before anything else touches the bus.
    fn configure_outputs(&mut self) -> Result<(), Self::Error>;

    /// Drive a single line
    fn set_line(&mut self, line: Line, level: PinState);

    /// Drive D0-D7 to the bits of `byte`
    ///
    /// No other line may change while the data lines settle.
    fn write_parallel_byte(&mut self, byte: u8);
}

impl<T: BusLines + ?Sized> BusLines for &mut T {
    type Error = T::Error;

    fn configure_outputs(&mut self) -> Result<(), Self::Error> {
        T::configure_outputs(self)
    }

    fn set_line(&mut self, line: Line, level: PinState) {
        T::set_line(self, line, level)
    }

    fn write_parallel_byte(&mut self, byte: u8) {
        T::write_parallel_byte(self, byte)
    }
}

/// [`BusLines`] over embedded-hal output pins
///
/// ## Type Parameters
///
/// * `D` - Data pins D0-D7, one type so they fit an array (use erased pins)
/// * `DC`, `CS`, `RD`, `WR`, `RST` - Control pins
///
/// All pins share one error type.
pub struct ParallelBus<D, DC, CS, RD, WR, RST> {
    /// Data pins, D0 first
    data: [D; 8],
    /// Data/Command select pin (low=command, high=data)
    dc: DC,
    /// Chip select pin (active low)
    cs: CS,
    /// Read strobe pin (active low)
    rd: RD,
    /// Write strobe pin (latched on rising edge)
    wr: WR,
    /// Reset pin (active low)
    rst: RST,
}

impl<D, DC, CS, RD, WR, RST> ParallelBus<D, DC, CS, RD, WR, RST> {
    /// Create a new bus from its pins
    ///
    /// Pins are expected to already be in output mode, which is how
    /// embedded-hal HALs hand them out.
    pub fn new(data: [D; 8], dc: DC, cs: CS, rd: RD, wr: WR, rst: RST) -> Self {
        Self {
            data,
            dc,
            cs,
            rd,
            wr,
            rst,
        }
    }

    /// Give the pins back
    pub fn release(self) -> ([D; 8], DC, CS, RD, WR, RST) {
        (self.data, self.dc, self.cs, self.rd, self.wr, self.rst)
    }
}

impl<D, DC, CS, RD, WR, RST, PinErr> ParallelBus<D, DC, CS, RD, WR, RST>
where
    D: OutputPin<Error = PinErr>,
    DC: OutputPin<Error = PinErr>,
    CS: OutputPin<Error = PinErr>,
    RD: OutputPin<Error = PinErr>,
    WR: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
{
    fn drive(&mut self, line: Line, level: PinState) -> Result<(), PinErr> {
        match line {
            Line::Dc => self.dc.set_state(level),
            Line::Cs => self.cs.set_state(level),
            Line::Rd => self.rd.set_state(level),
            Line::Wr => self.wr.set_state(level),
            Line::Reset => self.rst.set_state(level),
            data => match data.data_bit() {
                Some(bit) => self.data[bit].set_state(level),
                None => Ok(()),
            },
        }
    }
}

impl<D, DC, CS, RD, WR, RST, PinErr> BusLines for ParallelBus<D, DC, CS, RD, WR, RST>
where
    D: OutputPin<Error = PinErr>,
    DC: OutputPin<Error = PinErr>,
    CS: OutputPin<Error = PinErr>,
    RD: OutputPin<Error = PinErr>,
    WR: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = PinErr;

    fn configure_outputs(&mut self) -> Result<(), Self::Error> {
        for pin in self.data.iter_mut() {
            pin.set_low()?;
        }
        for (line, level) in Line::CONTROL_IDLE {
            self.drive(line, level)?;
        }
        Ok(())
    }

    fn set_line(&mut self, line: Line, level: PinState) {
        let _ = self.drive(line, level);
    }

    fn write_parallel_byte(&mut self, byte: u8) {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            let _ = pin.set_state(PinState::from((byte >> bit) & 0x01 != 0));
        }
    }
}
