//! Engine configuration.
//!
//! Everything the scheduler needs to know is collected in one
//! immutable record, validated before the loop starts. Startup fails
//! fast on an invalid configuration; nothing is validated on the hot
//! path.

use embassy_time::Duration;
use thiserror::Error;

use crate::buffer::ChannelOrder;
use crate::effect::DEFAULT_DELTA_MAX;
use crate::gamma::DEFAULT_GAMMA;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("pixel count must be non-zero")]
    ZeroPixels,
    #[error("gamma must be finite and positive, got {0}")]
    InvalidGamma(f32),
    #[error("thresholds must be non-negative")]
    NegativeThreshold,
    #[error("alert threshold must not be below the active threshold")]
    AlertBelowActive,
}

/// Immutable engine configuration record.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Wire format of the pixel sink.
    pub channel_order: ChannelOrder,
    /// Global brightness, applied at present time.
    pub brightness: u8,
    /// Gamma exponent for the correction table (typ. 2.6).
    pub gamma: f32,
    /// Soft minimum frame period; zero disables pacing.
    pub frame_budget: Duration,
    /// Ceiling on the per-tick delta effects observe.
    pub tick_delta_max: Duration,
    /// Squared-accel (or mic RMS) threshold for IDLE → ACTIVE.
    pub active_threshold: f32,
    /// Higher threshold for ALERT.
    pub alert_threshold: f32,
    /// Minimum dwell in ACTIVE before returning to IDLE.
    pub active_hold: Duration,
    /// Time spent in ALERT before returning to IDLE.
    pub alert_duration: Duration,
    /// Button debounce stable time.
    pub debounce: Duration,
    /// Sensor staleness window.
    pub staleness_window: Duration,
    /// Button that advances the active sequence, if any.
    pub next_button: Option<u8>,
    /// Power button, if any.
    pub power_button: Option<u8>,
    /// Hold time on the power button that switches the engine off.
    pub power_long_press: Duration,
    /// Seed for effect RNGs, from whatever noise source the board has.
    pub rng_seed: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            channel_order: ChannelOrder::Grb,
            brightness: 255,
            gamma: DEFAULT_GAMMA,
            frame_budget: Duration::from_millis(1000 / 60),
            tick_delta_max: DEFAULT_DELTA_MAX,
            active_threshold: f32::MAX,
            alert_threshold: f32::MAX,
            active_hold: Duration::from_secs(2),
            alert_duration: Duration::from_secs(2),
            debounce: Duration::from_millis(10),
            staleness_window: Duration::from_millis(500),
            next_button: None,
            power_button: None,
            power_long_press: Duration::from_secs(1),
            rng_seed: 1,
        }
    }
}

impl EngineConfig {
    /// Check the record against a strip of `pixel_count` pixels.
    pub fn validate(&self, pixel_count: usize) -> Result<(), ConfigError> {
        if pixel_count == 0 {
            return Err(ConfigError::ZeroPixels);
        }
        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            return Err(ConfigError::InvalidGamma(self.gamma));
        }
        if self.active_threshold < 0.0 || self.alert_threshold < 0.0 {
            return Err(ConfigError::NegativeThreshold);
        }
        if self.alert_threshold < self.active_threshold {
            return Err(ConfigError::AlertBelowActive);
        }
        Ok(())
    }
}
