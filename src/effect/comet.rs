//! Moving head with an exponentially decaying tail.

use embassy_time::{Duration, Instant};

use super::{DeltaClock, Effect, Tick};
use crate::canvas::Canvas;
use crate::color::{BLACK, Hsv, Rgb, hsv_to_rgb};
use crate::math8::scale8;

/// Tail coloring of a comet.
#[derive(Debug, Clone, Copy)]
pub enum CometColor {
    Fixed(Rgb),
    /// Hue varies along the tail and drifts with the head position.
    Rainbow,
}

/// Comet: head moves at `speed` pixels per second, trailing an
/// exponentially decaying tail of `tail` pixels. With `bounce` the
/// head reverses at either end, otherwise it wraps. A run-once comet
/// reports `Done` after one full sweep of the strip, which makes it
/// usable as a startup effect.
#[derive(Debug, Clone)]
pub struct CometEffect {
    color: CometColor,
    speed: f32,
    tail: usize,
    bounce: bool,
    once: bool,
    decay: u8,
    position: f32,
    direction: f32,
    traveled: f32,
    clock: DeltaClock,
}

impl CometEffect {
    /// `speed` is pixels per second; `tail` of zero is treated as a
    /// bare head.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn new(color: CometColor, speed: f32, tail: usize, bounce: bool) -> Self {
        // Decay factor per tail pixel such that brightness falls to
        // roughly 5% over the configured tail length.
        let decay = if tail == 0 {
            0
        } else {
            (libm::expf(-3.0 / tail as f32) * 255.0) as u8
        };
        Self {
            color,
            speed,
            tail,
            bounce,
            once: false,
            decay,
            position: 0.0,
            direction: 1.0,
            traveled: 0.0,
            clock: DeltaClock::new(),
        }
    }

    /// Stop after one full sweep instead of looping.
    #[must_use]
    pub const fn run_once(mut self) -> Self {
        self.once = true;
        self
    }

    #[allow(clippy::cast_precision_loss)]
    fn advance(&mut self, delta_secs: f32, len: usize) {
        let len_f = len as f32;
        let step = self.speed * delta_secs;
        self.traveled += step;

        if self.bounce {
            self.position += step * self.direction;
            let span = len_f - 1.0;
            if span <= 0.0 {
                self.position = 0.0;
            } else {
                // A clamped delta can exceed one sweep; fold until the
                // position is back inside the strip.
                while self.position > span || self.position < 0.0 {
                    if self.position > span {
                        self.position = 2.0 * span - self.position;
                    } else {
                        self.position = -self.position;
                    }
                    self.direction = -self.direction;
                }
            }
        } else {
            self.position += step;
            if self.position >= len_f {
                self.position %= len_f;
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn sweep_len(&self, len: usize) -> f32 {
        if self.bounce {
            2.0 * (len as f32 - 1.0)
        } else {
            len as f32
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn draw(&self, canvas: &mut Canvas<'_>) {
        let len = canvas.len();
        let head = (self.position as usize).min(len - 1);
        let behind = if self.direction >= 0.0 { 1 } else { -1 };

        let base_hue = ((self.position / len as f32) * 255.0) as u8;
        let hue_step = (255 / (self.tail + 1).max(1)) as u8;

        let mut level = 255u8;
        for k in 0..=self.tail {
            let logical = head as isize - behind * k as isize;
            let logical = if self.bounce {
                if logical < 0 || logical >= len as isize {
                    level = scale8(level, self.decay);
                    continue;
                }
                logical as usize
            } else {
                logical.rem_euclid(len as isize) as usize
            };

            let color = match self.color {
                CometColor::Fixed(c) => Rgb {
                    r: scale8(c.r, level),
                    g: scale8(c.g, level),
                    b: scale8(c.b, level),
                },
                CometColor::Rainbow => {
                    let hue = base_hue.wrapping_add(hue_step.wrapping_mul(k as u8));
                    hsv_to_rgb(Hsv::new(hue, 255, level))
                }
            };
            canvas.set(logical, color);
            level = scale8(level, self.decay);
        }
    }
}

impl Effect for CometEffect {
    fn tick(&mut self, now: Instant, canvas: &mut Canvas<'_>) -> Tick {
        let delta = self.clock.advance_secs(now);

        if canvas.is_empty() {
            return Tick::Running;
        }

        self.advance(delta, canvas.len());

        canvas.fill(BLACK);
        self.draw(canvas);

        if self.once && self.traveled >= self.sweep_len(canvas.len()) {
            Tick::Done
        } else {
            Tick::Running
        }
    }

    fn reset(&mut self) {
        self.position = 0.0;
        self.direction = 1.0;
        self.traveled = 0.0;
        self.clock.reset();
    }

    fn set_color(&mut self, color: Rgb) {
        if let CometColor::Fixed(ref mut c) = self.color {
            *c = color;
        }
    }

    fn set_delta_max(&mut self, max: Duration) {
        self.clock.set_max(max);
    }
}
