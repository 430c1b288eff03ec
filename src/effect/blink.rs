//! On/off toggle at a fixed period.

use embassy_time::{Duration, Instant};

use super::{DeltaClock, Effect, Tick};
use crate::canvas::Canvas;
use crate::color::{BLACK, Rgb};

/// Blink: 50% duty cycle at the configured period.
#[derive(Debug, Clone)]
pub struct BlinkEffect {
    color: Rgb,
    period: Duration,
    phase: Duration,
    clock: DeltaClock,
}

impl BlinkEffect {
    pub const fn new(color: Rgb, period: Duration) -> Self {
        Self {
            color,
            period,
            phase: Duration::from_ticks(0),
            clock: DeltaClock::new(),
        }
    }
}

impl Effect for BlinkEffect {
    fn tick(&mut self, now: Instant, canvas: &mut Canvas<'_>) -> Tick {
        self.phase += self.clock.advance(now);

        let period_us = self.period.as_micros().max(1);
        let in_cycle = self.phase.as_micros() % period_us;
        let on = in_cycle * 2 < period_us;

        canvas.fill(if on { self.color } else { BLACK });
        Tick::Running
    }

    fn reset(&mut self) {
        self.phase = Duration::from_ticks(0);
        self.clock.reset();
    }

    fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    fn set_delta_max(&mut self, max: Duration) {
        self.clock.set_max(max);
    }
}
