//! Surface configuration

use std::time::Duration;

/// Refresh rate used when none (or zero) is configured
pub const DEFAULT_REFRESH_RATE: u32 = 25;

/// Fallback name for the refresh thread
pub const DEFAULT_THREAD_NAME: &str = "st7793-refresh";

/// Replace a zero rate with [`DEFAULT_REFRESH_RATE`]
pub fn effective_rate(rate: u32) -> u32 {
    if rate == 0 { DEFAULT_REFRESH_RATE } else { rate }
}

/// Time between refresh ticks at `rate` Hz
pub fn refresh_interval(rate: u32) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(effective_rate(rate)))
}

/// Surface configuration
///
/// Create using [`SurfaceConfig::builder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurfaceConfig {
    /// Refresh ticks per second
    pub refresh_rate: u32,
    /// Name given to the refresh thread
    pub thread_name: String,
}

impl SurfaceConfig {
    /// Start building a configuration
    pub fn builder() -> SurfaceConfigBuilder {
        SurfaceConfigBuilder::new()
    }

    /// Time between refresh ticks
    pub fn refresh_interval(&self) -> Duration {
        refresh_interval(self.refresh_rate)
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            refresh_rate: DEFAULT_REFRESH_RATE,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

/// Builder for [`SurfaceConfig`]
///
/// ## Example
///
/// ```
/// use st7793_fb::SurfaceConfig;
///
/// let config = SurfaceConfig::builder().refresh_rate(0).build();
/// assert_eq!(config.refresh_rate, 25);
/// ```
#[derive(Clone, Debug, Default)]
pub struct SurfaceConfigBuilder {
    config: SurfaceConfig,
}

impl SurfaceConfigBuilder {
    /// Create a builder with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the refresh rate in Hz (0 selects the default of 25)
    #[must_use]
    pub fn refresh_rate(mut self, rate: u32) -> Self {
        self.config.refresh_rate = effective_rate(rate);
        self
    }

    /// Set the refresh thread name
    #[must_use]
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.thread_name = name.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> SurfaceConfig {
        self.config
    }
}
