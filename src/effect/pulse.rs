//! Sine-shaped brightness swell.

use embassy_time::{Duration, Instant};

use super::{DeltaClock, Effect, Tick};
use crate::canvas::Canvas;
use crate::color::Rgb;
use crate::math8::scale8;

const TAU: f32 = core::f32::consts::TAU;

/// Pulse: brightness follows `(sin(2π·t/period) + 1) / 2` mapped into
/// `[min, max]`, applied as a scale on the base color.
#[derive(Debug, Clone)]
pub struct PulseEffect {
    color: Rgb,
    period: Duration,
    min_level: u8,
    max_level: u8,
    phase_secs: f32,
    clock: DeltaClock,
}

impl PulseEffect {
    /// `min` and `max` are brightness fractions in `[0, 1]`, clamped.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(color: Rgb, period: Duration, min: f32, max: f32) -> Self {
        let to_level = |f: f32| (f.clamp(0.0, 1.0) * 255.0) as u8;
        Self {
            color,
            period,
            min_level: to_level(min),
            max_level: to_level(max),
            phase_secs: 0.0,
            clock: DeltaClock::new(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn period_secs(&self) -> f32 {
        (self.period.as_micros().max(1) as f32) / 1_000_000.0
    }

    /// Brightness level (0-255) at the current phase.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn level(&self) -> u8 {
        let wave = (libm::sinf(TAU * self.phase_secs / self.period_secs()) + 1.0) / 2.0;
        let span = f32::from(self.max_level) - f32::from(self.min_level);
        (f32::from(self.min_level) + wave * span) as u8
    }
}

impl Effect for PulseEffect {
    fn tick(&mut self, now: Instant, canvas: &mut Canvas<'_>) -> Tick {
        self.phase_secs += self.clock.advance_secs(now);
        // The phase is periodic; keep the float small so per-frame
        // deltas never fall below one ulp on long uptimes.
        let period_s = self.period_secs();
        if self.phase_secs >= period_s {
            self.phase_secs %= period_s;
        }

        let level = self.level();
        let scaled = Rgb {
            r: scale8(self.color.r, level),
            g: scale8(self.color.g, level),
            b: scale8(self.color.b, level),
        };
        canvas.fill(scaled);
        Tick::Running
    }

    fn reset(&mut self) {
        self.phase_secs = 0.0;
        self.clock.reset();
    }

    fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    fn set_delta_max(&mut self, max: Duration) {
        self.clock.set_max(max);
    }
}
