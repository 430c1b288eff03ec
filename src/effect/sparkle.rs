//! Random pixels flashed for a single frame.

use embassy_time::{Duration, Instant};

use super::{DeltaClock, Effect, Tick};
use crate::canvas::Canvas;
use crate::color::{BLACK, Rgb};
use crate::math8::Rng;

/// Sparkle: at `rate` events per second, light `count` random pixels
/// for exactly one frame.
#[derive(Debug, Clone)]
pub struct SparkleEffect {
    color: Rgb,
    interval_secs: f32,
    count: usize,
    accumulated: f32,
    rng: Rng,
    seed: u32,
    clock: DeltaClock,
}

impl SparkleEffect {
    /// `rate` is events per second and must be positive; this is a
    /// construction-time precondition.
    pub fn new(color: Rgb, rate: f32, count: usize, seed: u32) -> Self {
        Self {
            color,
            interval_secs: 1.0 / rate.max(f32::MIN_POSITIVE),
            count,
            accumulated: 0.0,
            rng: Rng::new(seed),
            seed,
            clock: DeltaClock::new(),
        }
    }
}

impl Effect for SparkleEffect {
    #[allow(clippy::cast_possible_truncation)]
    fn tick(&mut self, now: Instant, canvas: &mut Canvas<'_>) -> Tick {
        self.accumulated += self.clock.advance_secs(now);

        canvas.fill(BLACK);

        if canvas.is_empty() {
            return Tick::Running;
        }

        if self.accumulated >= self.interval_secs {
            // Keep the residual so event spacing stays accurate, but
            // never fire more than once per frame.
            self.accumulated %= self.interval_secs;

            let len = canvas.len() as u32;
            for _ in 0..self.count {
                let i = self.rng.next_below(len) as usize;
                canvas.set(i, self.color);
            }
        }

        Tick::Running
    }

    fn reset(&mut self) {
        self.accumulated = 0.0;
        self.rng = Rng::new(self.seed);
        self.clock.reset();
    }

    fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    fn set_delta_max(&mut self, max: Duration) {
        self.clock.set_max(max);
    }
}
