// ST7793 command definitions

use core::ops::Deref;

// Initialization and reset
pub const SOFT_RESET: u8 = 0x01; // Software reset
pub const SLEEP_OUT: u8 = 0x11; // Sleep out
pub const INTERFACE_PIXEL_FORMAT: u8 = 0x3A; // Interface pixel format

// Display control
pub const DISPLAY_ON: u8 = 0x29; // Display on

// RAM addressing
pub const COLUMN_ADDRESS_SET: u8 = 0x2A; // Column address window
pub const ROW_ADDRESS_SET: u8 = 0x2B; // Row address window
pub const MEMORY_WRITE: u8 = 0x2C; // Memory write

/// `INTERFACE_PIXEL_FORMAT` argument for 16-bit 5-6-5 RGB
pub const PIXEL_FORMAT_RGB565: u8 = 0x55;

/// A controller command together with its arguments
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Software reset, panel needs 120ms before the next command
    SoftwareReset,
    /// Leave sleep mode, panel needs 120ms before the next command
    SleepOut,
    /// Select the interface pixel format
    SetPixelFormat(u8),
    /// Column address window, both bounds included
    SetColumnAddress(u16, u16),
    /// Row address window, both bounds included
    SetRowAddress(u16, u16),
    /// Start writing pixel data into the current window
    MemoryWrite,
    /// Enable the output path
    DisplayOn,
}

impl Command {
    /// Wire opcode of this command
    pub fn opcode(&self) -> u8 {
        match self {
            Command::SoftwareReset => SOFT_RESET,
            Command::SleepOut => SLEEP_OUT,
            Command::SetPixelFormat(_) => INTERFACE_PIXEL_FORMAT,
            Command::SetColumnAddress(..) => COLUMN_ADDRESS_SET,
            Command::SetRowAddress(..) => ROW_ADDRESS_SET,
            Command::MemoryWrite => MEMORY_WRITE,
            Command::DisplayOn => DISPLAY_ON,
        }
    }

    /// Encode the argument bytes that follow the opcode
    ///
    /// Address bounds go out big-endian: start high, start low, end high, end low.
    pub fn params(&self) -> Params {
        match *self {
            Command::SetPixelFormat(format) => Params::from_slice(&[format]),
            Command::SetColumnAddress(start, end) | Command::SetRowAddress(start, end) => {
                let [start_hi, start_lo] = start.to_be_bytes();
                let [end_hi, end_lo] = end.to_be_bytes();
                Params::from_slice(&[start_hi, start_lo, end_hi, end_lo])
            }
            Command::SoftwareReset
            | Command::SleepOut
            | Command::MemoryWrite
            | Command::DisplayOn => Params::default(),
        }
    }
}

/// Argument bytes of a [`Command`], at most four
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Params {
    bytes: [u8; 4],
    len: usize,
}

impl Params {
    fn from_slice(src: &[u8]) -> Self {
        let mut bytes = [0; 4];
        bytes[..src.len()].copy_from_slice(src);
        Self {
            bytes,
            len: src.len(),
        }
    }
}

impl Deref for Params {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcodes_match_command_set() {
        assert_eq!(Command::SoftwareReset.opcode(), 0x01);
        assert_eq!(Command::SleepOut.opcode(), 0x11);
        assert_eq!(Command::DisplayOn.opcode(), 0x29);
        assert_eq!(Command::SetColumnAddress(0, 0).opcode(), 0x2A);
        assert_eq!(Command::SetRowAddress(0, 0).opcode(), 0x2B);
        assert_eq!(Command::MemoryWrite.opcode(), 0x2C);
        assert_eq!(Command::SetPixelFormat(PIXEL_FORMAT_RGB565).opcode(), 0x3A);
    }

    #[test]
    fn test_address_params_are_big_endian() {
        let cmd = Command::SetColumnAddress(0x0102, 0x0190);
        assert_eq!(&*cmd.params(), &[0x01, 0x02, 0x01, 0x90]);

        let cmd = Command::SetRowAddress(7, 240);
        assert_eq!(&*cmd.params(), &[0x00, 0x07, 0x00, 0xF0]);
    }

    #[test]
    fn test_pixel_format_has_single_param() {
        assert_eq!(&*Command::SetPixelFormat(0x55).params(), &[0x55]);
    }

    #[test]
    fn test_plain_commands_have_no_params() {
        for cmd in [
            Command::SoftwareReset,
            Command::SleepOut,
            Command::MemoryWrite,
            Command::DisplayOn,
        ] {
            assert!(cmd.params().is_empty());
        }
    }
}
