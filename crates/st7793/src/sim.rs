//! Simulated panel for host-side testing
//!
//! [`SimBus`] implements [`BusLines`] and decodes the line activity the way
//! the controller would: on every rising edge of WR it latches the data
//! lines as a command (DC low) or a data byte (DC high). Reset, CS and RD
//! transitions are recorded as they happen. [`SimDelay`] advances a virtual
//! clock that stamps every recorded event, so timing requirements can be
//! checked without sleeping.
//!
//! ```rust,ignore
//! use st7793::sim::{BusEvent, SimBus, SimDelay};
//! use st7793::{Builder, Display, Interface};
//!
//! let bus = SimBus::new();
//! let probe = bus.probe();
//! let mut delay = SimDelay::new(&probe);
//! let mut display = Display::new(Interface::new(bus), Builder::new().build());
//! display.init(&mut delay).unwrap();
//! assert_eq!(probe.commands(), [0x01, 0x11, 0x3A, 0x29]);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;

use crate::bus::{BusLines, Line};

/// What the simulated panel saw
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusEvent {
    /// `configure_outputs` ran
    Configured,
    /// Byte latched with DC low
    Command(u8),
    /// Byte latched with DC high
    Data(u8),
    /// Level change on a line the decoder does not consume (CS, RD, RESET)
    Line(Line, PinState),
}

/// A [`BusEvent`] with the virtual time it happened at
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stamped {
    /// Virtual nanoseconds since the probe was created
    pub at_ns: u64,
    pub event: BusEvent,
}

#[derive(Debug, Default)]
struct Trace {
    events: Vec<Stamped>,
    transitions: usize,
}

#[derive(Debug)]
struct Shared {
    trace: Mutex<Trace>,
    clock_ns: AtomicU64,
}

/// Read side of a simulated panel
///
/// Cheap to clone; every clone sees the same trace and clock.
#[derive(Clone, Debug)]
pub struct SimProbe {
    shared: Arc<Shared>,
}

impl SimProbe {
    fn trace(&self) -> MutexGuard<'_, Trace> {
        // a panicking test thread must not hide the trace from the others
        self.shared
            .trace
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current virtual time
    pub fn now_ns(&self) -> u64 {
        self.shared.clock_ns.load(Ordering::SeqCst)
    }

    /// Every event recorded so far
    pub fn events(&self) -> Vec<Stamped> {
        self.trace().events.clone()
    }

    /// Recorded events without timestamps
    pub fn bus_events(&self) -> Vec<BusEvent> {
        self.trace().events.iter().map(|s| s.event).collect()
    }

    /// Command bytes in order
    pub fn commands(&self) -> Vec<u8> {
        self.trace()
            .events
            .iter()
            .filter_map(|s| match s.event {
                BusEvent::Command(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    /// Data bytes in order
    pub fn data(&self) -> Vec<u8> {
        self.trace()
            .events
            .iter()
            .filter_map(|s| match s.event {
                BusEvent::Data(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    /// Data bytes that followed the last occurrence of `command`
    pub fn data_after_last(&self, command: u8) -> Vec<u8> {
        let trace = self.trace();
        let start = trace
            .events
            .iter()
            .rposition(|s| s.event == BusEvent::Command(command));
        let Some(start) = start else {
            return Vec::new();
        };
        trace.events[start + 1..]
            .iter()
            .map_while(|s| match s.event {
                BusEvent::Data(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    /// Total number of individual line writes, decoded or not
    pub fn transitions(&self) -> usize {
        self.trace().transitions
    }

    /// Forget everything recorded so far; the clock keeps running
    pub fn clear(&self) {
        let mut trace = self.trace();
        trace.events.clear();
        trace.transitions = 0;
    }
}

/// Simulated ST7793 on the end of a parallel bus
#[derive(Debug)]
pub struct SimBus {
    probe: SimProbe,
    dc: PinState,
    wr: PinState,
    data: u8,
}

impl SimBus {
    /// Create a bus with an empty trace
    pub fn new() -> Self {
        Self {
            probe: SimProbe {
                shared: Arc::new(Shared {
                    trace: Mutex::new(Trace::default()),
                    clock_ns: AtomicU64::new(0),
                }),
            },
            dc: PinState::High,
            wr: PinState::High,
            data: 0,
        }
    }

    /// Handle for inspecting the trace after the bus has been moved into a driver
    pub fn probe(&self) -> SimProbe {
        self.probe.clone()
    }

    fn record(&self, event: BusEvent) {
        let at_ns = self.probe.now_ns();
        let mut trace = self.probe.trace();
        trace.transitions += 1;
        trace.events.push(Stamped { at_ns, event });
    }

    fn count(&self) {
        self.probe.trace().transitions += 1;
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl BusLines for SimBus {
    type Error = core::convert::Infallible;

    fn configure_outputs(&mut self) -> Result<(), Self::Error> {
        self.dc = PinState::High;
        self.wr = PinState::High;
        self.data = 0;
        self.record(BusEvent::Configured);
        Ok(())
    }

    fn set_line(&mut self, line: Line, level: PinState) {
        match line {
            Line::Dc => {
                self.dc = level;
                self.count();
            }
            Line::Wr => {
                let rising = self.wr == PinState::Low && level == PinState::High;
                self.wr = level;
                if rising {
                    self.record(match self.dc {
                        PinState::Low => BusEvent::Command(self.data),
                        PinState::High => BusEvent::Data(self.data),
                    });
                } else {
                    self.count();
                }
            }
            Line::Cs | Line::Rd | Line::Reset => self.record(BusEvent::Line(line, level)),
            data => {
                if let Some(bit) = data.data_bit() {
                    match level {
                        PinState::High => self.data |= 1 << bit,
                        PinState::Low => self.data &= !(1 << bit),
                    }
                }
                self.count();
            }
        }
    }

    fn write_parallel_byte(&mut self, byte: u8) {
        self.data = byte;
        self.count();
    }
}

/// [`DelayNs`] that advances the simulated panel's clock instead of sleeping
#[derive(Clone, Debug)]
pub struct SimDelay {
    probe: SimProbe,
}

impl SimDelay {
    /// Delay driving the clock shared with `probe`
    pub fn new(probe: &SimProbe) -> Self {
        Self {
            probe: probe.clone(),
        }
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.probe
            .shared
            .clock_ns
            .fetch_add(u64::from(ns), Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rising_edge_latches_by_dc_level() {
        let mut bus = SimBus::new();
        let probe = bus.probe();

        bus.set_line(Line::Dc, PinState::Low);
        bus.write_parallel_byte(0x2A);
        bus.set_line(Line::Wr, PinState::Low);
        bus.set_line(Line::Wr, PinState::High);

        bus.set_line(Line::Dc, PinState::High);
        bus.write_parallel_byte(0x7F);
        bus.set_line(Line::Wr, PinState::Low);
        bus.set_line(Line::Wr, PinState::High);

        assert_eq!(
            probe.bus_events(),
            [BusEvent::Command(0x2A), BusEvent::Data(0x7F)]
        );
        assert_eq!(probe.transitions(), 8);
    }

    #[test]
    fn test_no_latch_without_falling_edge() {
        let mut bus = SimBus::new();
        let probe = bus.probe();
        bus.write_parallel_byte(0x11);
        bus.set_line(Line::Wr, PinState::High);
        assert!(probe.bus_events().is_empty());
    }

    #[test]
    fn test_individual_data_lines_build_byte() {
        let mut bus = SimBus::new();
        let probe = bus.probe();
        bus.set_line(Line::D0, PinState::High);
        bus.set_line(Line::D7, PinState::High);
        bus.set_line(Line::Wr, PinState::Low);
        bus.set_line(Line::Wr, PinState::High);
        assert_eq!(probe.data(), [0x81]);
    }

    #[test]
    fn test_delay_stamps_later_events() {
        let mut bus = SimBus::new();
        let probe = bus.probe();
        let mut delay = SimDelay::new(&probe);

        bus.set_line(Line::Reset, PinState::Low);
        delay.delay_ms(5);
        bus.set_line(Line::Reset, PinState::High);

        let events = probe.events();
        assert_eq!(events[0].at_ns, 0);
        assert_eq!(events[1].at_ns, 5_000_000);
    }
}
