//! Repeating lit/dark pattern in translation.

use embassy_time::{Duration, Instant};

use super::{DeltaClock, Effect, Tick};
use crate::canvas::Canvas;
use crate::color::{BLACK, Hsv, Rgb, hsv_to_rgb};

/// Coloring of the lit segments.
#[derive(Debug, Clone, Copy)]
pub enum ChaseColor {
    Fixed(Rgb),
    /// Each lit group gets its own hue, stepped around the wheel.
    Rainbow { wheel_step: u8 },
}

/// Chase: a repeating pattern of `size` lit and `spacing` dark pixels,
/// translated at `speed` pixels per second.
#[derive(Debug, Clone)]
pub struct ChaseEffect {
    color: ChaseColor,
    speed: f32,
    size: usize,
    spacing: usize,
    offset: f32,
    clock: DeltaClock,
}

impl ChaseEffect {
    /// `size` of zero renders nothing lit; `size + spacing` is the
    /// pattern repeat length and must be non-zero.
    pub const fn new(color: ChaseColor, speed: f32, size: usize, spacing: usize) -> Self {
        Self {
            color,
            speed,
            size,
            spacing,
            offset: 0.0,
            clock: DeltaClock::new(),
        }
    }

    const fn repeat(&self) -> usize {
        self.size + self.spacing
    }
}

impl Effect for ChaseEffect {
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_precision_loss)]
    fn tick(&mut self, now: Instant, canvas: &mut Canvas<'_>) -> Tick {
        self.offset += self.speed * self.clock.advance_secs(now);

        let repeat = self.repeat().max(1);
        // Keep the accumulator bounded; one repeat is a full period.
        if self.offset >= repeat as f32 {
            self.offset %= repeat as f32;
        }

        let repeat = repeat as isize;
        let shift = self.offset as isize;

        for i in 0..canvas.len() {
            let phase = (i as isize - shift).rem_euclid(repeat) as usize;
            if phase < self.size {
                let color = match self.color {
                    ChaseColor::Fixed(c) => c,
                    ChaseColor::Rainbow { wheel_step } => {
                        let group = (i as isize - shift).div_euclid(repeat);
                        let hue = (group.rem_euclid(256) as u8).wrapping_mul(wheel_step);
                        hsv_to_rgb(Hsv::new(hue, 255, 255))
                    }
                };
                canvas.set(i, color);
            } else {
                canvas.set(i, BLACK);
            }
        }

        Tick::Running
    }

    fn reset(&mut self) {
        self.offset = 0.0;
        self.clock.reset();
    }

    fn set_color(&mut self, color: Rgb) {
        if let ChaseColor::Fixed(ref mut c) = self.color {
            *c = color;
        }
    }

    fn set_delta_max(&mut self, max: Duration) {
        self.clock.set_max(max);
    }
}
