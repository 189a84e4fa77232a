//! BCM283x GPIO register bank backend
//!
//! Drives the bus by writing the Broadcom GPIO block directly, the way the
//! panel is wired on a Raspberry Pi Zero 2W. The caller maps the block
//! (`/dev/gpiomem`, `ioremap` or a bare-metal address) and hands over the
//! base pointer; nothing here knows where the block lives.
//!
//! | register | word | purpose                              |
//! |----------|------|--------------------------------------|
//! | GPFSELn  | 0-5  | function select, 10 pins × 3 bits    |
//! | GPSET0   | 7    | drive high every pin whose bit is 1  |
//! | GPCLR0   | 10   | drive low every pin whose bit is 1   |
//!
//! Only bank 0 (GPIO 0-31) is supported.

use core::fmt;

use embedded_hal::digital::PinState;

use crate::bus::{BusLines, Line};

/// Physical address of the GPIO block on the BCM2710 in a Pi Zero 2W
pub const GPIO_BASE_ZERO_2W: usize = 0xFE20_0000;

/// Size of the mapping needed to reach every register used here
pub const GPIO_BLOCK_SIZE: usize = 4 * 1024;

mod regs {
    pub const GPSET0: usize = 7;
    pub const GPCLR0: usize = 10;
}

/// Highest pin number reachable through the bank 0 set/clear registers
const MAX_PIN: u8 = 31;

/// Number of 32-bit words the backend may touch
pub const REGISTER_WORDS: usize = regs::GPCLR0 + 1;

const FSEL_MASK: u32 = 0b111;
const FSEL_OUTPUT: u32 = 0b001;

/// GPIO numbers for every bus line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinMap {
    /// GPIO numbers for D0-D7
    pub data: [u8; 8],
    pub dc: u8,
    pub cs: u8,
    pub rd: u8,
    pub wr: u8,
    pub reset: u8,
}

impl Default for PinMap {
    /// Wiring of the reference board: D0-D7 on GPIO4-11, control on GPIO20-24
    fn default() -> Self {
        Self {
            data: [4, 5, 6, 7, 8, 9, 10, 11],
            dc: 20,
            cs: 21,
            rd: 22,
            wr: 23,
            reset: 24,
        }
    }
}

impl PinMap {
    /// GPIO number wired to `line`
    pub fn pin(&self, line: Line) -> u8 {
        match line {
            Line::Dc => self.dc,
            Line::Cs => self.cs,
            Line::Rd => self.rd,
            Line::Wr => self.wr,
            Line::Reset => self.reset,
            data => self.data[data.data_bit().unwrap_or_default()],
        }
    }

    fn all(&self) -> impl Iterator<Item = (Line, u8)> + '_ {
        Line::DATA
            .into_iter()
            .chain(Line::CONTROL_IDLE.map(|(line, _)| line))
            .map(|line| (line, self.pin(line)))
    }

    /// Check that every pin is in bank 0 and no GPIO is used twice
    pub fn validate(&self) -> Result<(), PinMapError> {
        let mut seen = 0u32;
        for (line, pin) in self.all() {
            if pin > MAX_PIN {
                return Err(PinMapError::PinOutOfRange { line, pin });
            }
            if seen & (1 << pin) != 0 {
                return Err(PinMapError::DuplicatePin { pin });
            }
            seen |= 1 << pin;
        }
        Ok(())
    }

    fn data_mask(&self) -> u32 {
        self.data.iter().fold(0, |mask, pin| mask | (1 << pin))
    }
}

/// Errors from an unusable [`PinMap`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinMapError {
    /// Pin outside bank 0
    PinOutOfRange {
        /// Line that was mapped
        line: Line,
        /// GPIO number requested
        pin: u8,
    },
    /// The same GPIO is assigned to two lines
    DuplicatePin {
        /// GPIO number used twice
        pin: u8,
    },
}

impl fmt::Display for PinMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinMapError::PinOutOfRange { line, pin } => {
                write!(f, "GPIO{pin} for {line:?} is outside bank 0 (max GPIO{MAX_PIN})")
            }
            PinMapError::DuplicatePin { pin } => write!(f, "GPIO{pin} is mapped twice"),
        }
    }
}

impl core::error::Error for PinMapError {}

/// [`BusLines`] on a memory-mapped BCM283x GPIO block
pub struct RegisterBus {
    base: *mut u32,
    pins: PinMap,
    data_mask: u32,
}

// Moving the bus moves sole ownership of the mapped block.
unsafe impl Send for RegisterBus {}

impl RegisterBus {
    /// Create a backend on a mapped register block
    ///
    /// # Safety
    ///
    /// `base` must point to at least [`REGISTER_WORDS`] writable, 4-byte
    /// aligned words laid out as the BCM283x GPIO block, valid for as long
    /// as this value lives, and nothing else may drive the mapped pins.
    pub unsafe fn new(base: *mut u32, pins: PinMap) -> Result<Self, PinMapError> {
        pins.validate()?;
        Ok(Self {
            base,
            data_mask: pins.data_mask(),
            pins,
        })
    }

    /// Pin mapping in use
    pub fn pins(&self) -> &PinMap {
        &self.pins
    }

    fn read(&self, word: usize) -> u32 {
        // SAFETY: word < REGISTER_WORDS, guaranteed by the constructor contract
        unsafe { self.base.add(word).read_volatile() }
    }

    fn write(&mut self, word: usize, value: u32) {
        // SAFETY: word < REGISTER_WORDS, guaranteed by the constructor contract
        unsafe { self.base.add(word).write_volatile(value) }
    }

    fn set_output(&mut self, pin: u8) {
        let word = pin as usize / 10;
        let shift = (pin as u32 % 10) * 3;
        // must pass through input (000) before selecting output
        let fsel = self.read(word) & !(FSEL_MASK << shift);
        self.write(word, fsel);
        self.write(word, fsel | (FSEL_OUTPUT << shift));
    }
}

impl BusLines for RegisterBus {
    type Error = PinMapError;

    fn configure_outputs(&mut self) -> Result<(), Self::Error> {
        self.pins.validate()?;
        let pins = self.pins;
        for (_, pin) in pins.all() {
            self.set_output(pin);
        }
        self.write_parallel_byte(0x00);
        for (line, level) in Line::CONTROL_IDLE {
            self.set_line(line, level);
        }
        Ok(())
    }

    fn set_line(&mut self, line: Line, level: PinState) {
        let bit = 1 << self.pins.pin(line);
        match level {
            PinState::High => self.write(regs::GPSET0, bit),
            PinState::Low => self.write(regs::GPCLR0, bit),
        }
    }

    fn write_parallel_byte(&mut self, byte: u8) {
        let mut set = 0u32;
        for (bit, pin) in self.pins.data.iter().enumerate() {
            if (byte >> bit) & 0x01 != 0 {
                set |= 1 << pin;
            }
        }
        self.write(regs::GPSET0, set);
        self.write(regs::GPCLR0, self.data_mask & !set);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Register block in plain memory
    ///
    /// GPSET0/GPCLR0 are write-one strobes on hardware; here they just keep
    /// the last value written.
    struct FakeBlock {
        words: [u32; REGISTER_WORDS],
    }

    impl FakeBlock {
        fn new() -> Self {
            Self {
                words: [0; REGISTER_WORDS],
            }
        }

        fn bus(&mut self, pins: PinMap) -> RegisterBus {
            unsafe { RegisterBus::new(self.words.as_mut_ptr(), pins).unwrap() }
        }
    }

    #[test]
    fn test_default_pin_map_is_valid() {
        assert_eq!(PinMap::default().validate(), Ok(()));
        assert_eq!(PinMap::default().pin(Line::D3), 7);
        assert_eq!(PinMap::default().pin(Line::Reset), 24);
    }

    #[test]
    fn test_pin_map_rejects_bank_1() {
        let pins = PinMap {
            reset: 40,
            ..PinMap::default()
        };
        assert_eq!(
            pins.validate(),
            Err(PinMapError::PinOutOfRange {
                line: Line::Reset,
                pin: 40
            })
        );
    }

    #[test]
    fn test_pin_map_rejects_duplicates() {
        let pins = PinMap {
            wr: 4,
            ..PinMap::default()
        };
        assert_eq!(pins.validate(), Err(PinMapError::DuplicatePin { pin: 4 }));
    }

    #[test]
    fn test_configure_outputs_sets_function_select() {
        let mut block = FakeBlock::new();
        // garbage alt function on GPIO5 must be cleared
        block.words[0] = 0b111 << 15;
        let mut bus = block.bus(PinMap::default());
        bus.configure_outputs().unwrap();
        drop(bus);

        // GPIO4-9 in GPFSEL0, GPIO10-11 in GPFSEL1, GPIO20-24 in GPFSEL2
        let expected0 = (4..10).fold(0u32, |acc, pin| acc | (1 << ((pin % 10) * 3)));
        let expected1 = (10..12).fold(0u32, |acc, pin| acc | (1 << ((pin % 10) * 3)));
        let expected2 = (20..25).fold(0u32, |acc, pin| acc | (1 << ((pin % 10) * 3)));
        assert_eq!(block.words[0], expected0);
        assert_eq!(block.words[1], expected1);
        assert_eq!(block.words[2], expected2);
    }

    #[test]
    fn test_write_parallel_byte_uses_set_and_clear_masks() {
        let mut block = FakeBlock::new();
        let mut bus = block.bus(PinMap::default());
        bus.write_parallel_byte(0x81);
        drop(bus);

        // D0 -> GPIO4, D7 -> GPIO11
        assert_eq!(block.words[regs::GPSET0], (1 << 4) | (1 << 11));
        let data_mask = 0xFF << 4;
        assert_eq!(block.words[regs::GPCLR0], data_mask & !((1 << 4) | (1 << 11)));
    }

    #[test]
    fn test_set_line_writes_single_bit() {
        let mut block = FakeBlock::new();
        let mut bus = block.bus(PinMap::default());
        bus.set_line(Line::Dc, PinState::Low);
        bus.set_line(Line::Wr, PinState::High);
        drop(bus);

        assert_eq!(block.words[regs::GPCLR0], 1 << 20);
        assert_eq!(block.words[regs::GPSET0], 1 << 23);
    }
}
