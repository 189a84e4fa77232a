//! Host delay provider

use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// [`DelayNs`] backed by `std::thread::sleep`
///
/// Sleeps at least as long as asked, which is all the init sequence needs.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
