//! Periodic refresh thread
//!
//! Wakes every `1 / rate` seconds and pushes a full frame if the surface is
//! dirty. The rate lives in an atomic so it can change without restarting
//! the thread; a signal on the channel makes the new interval apply at once.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use st7793::DisplayInterface;

use crate::config::{SurfaceConfig, effective_rate, refresh_interval};
use crate::error::SurfaceError;
use crate::surface::{Shared, lock};

enum Signal {
    Retime,
    Stop,
}

/// Handle to a running refresh thread
pub(crate) struct Refresher {
    tx: Sender<Signal>,
    rate: Arc<AtomicU32>,
    handle: JoinHandle<()>,
}

impl Refresher {
    pub(crate) fn spawn<I>(
        shared: Arc<Mutex<Shared<I>>>,
        config: &SurfaceConfig,
    ) -> Result<Self, SurfaceError>
    where
        I: DisplayInterface + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let rate = Arc::new(AtomicU32::new(effective_rate(config.refresh_rate)));
        let thread_rate = Arc::clone(&rate);

        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || run(&shared, &rx, &thread_rate))
            .map_err(SurfaceError::Spawn)?;

        Ok(Self {
            tx,
            rate,
            handle,
        })
    }

    pub(crate) fn rate(&self) -> u32 {
        self.rate.load(Ordering::Relaxed)
    }

    pub(crate) fn set_rate(&self, rate: u32) {
        let rate = effective_rate(rate);
        log::debug!("st7793-fb: refresh rate {rate} Hz");
        self.rate.store(rate, Ordering::Relaxed);
        let _ = self.tx.send(Signal::Retime);
    }

    /// Signal the thread and wait for it to exit
    pub(crate) fn stop(self) {
        let _ = self.tx.send(Signal::Stop);
        if self.handle.join().is_err() {
            log::warn!("st7793-fb: refresh thread panicked");
        }
    }
}

fn run<I>(shared: &Mutex<Shared<I>>, rx: &Receiver<Signal>, rate: &AtomicU32)
where
    I: DisplayInterface,
{
    loop {
        let interval = refresh_interval(rate.load(Ordering::Relaxed));
        match rx.recv_timeout(interval) {
            Ok(Signal::Retime) => continue,
            Ok(Signal::Stop) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                if let Err(err) = lock(shared).flush_pending() {
                    log::warn!("st7793-fb: refresh failed: {err}");
                }
            }
        }
    }
}
