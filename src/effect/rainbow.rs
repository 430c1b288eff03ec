//! Hue gradient across the strip, rotating over time.

use embassy_time::{Duration, Instant};

use super::{DeltaClock, Effect, Tick};
use crate::canvas::Canvas;
use crate::color::{Hsv, hsv_to_rgb};
use crate::math8::{fract16, fract16_to_u8};

/// Rainbow: pixel `i` carries hue `phase + i·step` (hue measured as a
/// fraction of the wheel), with the whole gradient rotating at `speed`
/// hue cycles per second.
#[derive(Debug, Clone)]
pub struct RainbowEffect {
    speed: f32,
    step: f32,
    saturation: u8,
    value: u8,
    phase: f32,
    clock: DeltaClock,
}

impl RainbowEffect {
    /// `step` is the hue difference between adjacent pixels as a
    /// fraction of the full wheel (e.g. `1.0 / N` spreads one whole
    /// rainbow across N pixels).
    pub const fn new(speed: f32, step: f32) -> Self {
        Self {
            speed,
            step,
            saturation: 255,
            value: 255,
            phase: 0.0,
            clock: DeltaClock::new(),
        }
    }

    #[must_use]
    pub const fn with_saturation(mut self, saturation: u8) -> Self {
        self.saturation = saturation;
        self
    }

    #[must_use]
    pub const fn with_value(mut self, value: u8) -> Self {
        self.value = value;
        self
    }
}

impl Effect for RainbowEffect {
    #[allow(clippy::cast_precision_loss)]
    fn tick(&mut self, now: Instant, canvas: &mut Canvas<'_>) -> Tick {
        self.phase += self.speed * self.clock.advance_secs(now);
        // The phase is a position on a circle; keep the float small.
        self.phase -= libm::floorf(self.phase);

        for i in 0..canvas.len() {
            let hue = fract16_to_u8(fract16(self.phase + i as f32 * self.step));
            canvas.set(i, hsv_to_rgb(Hsv::new(hue, self.saturation, self.value)));
        }

        Tick::Running
    }

    fn reset(&mut self) {
        self.phase = 0.0;
        self.clock.reset();
    }

    fn set_delta_max(&mut self, max: Duration) {
        self.clock.set_max(max);
    }
}
