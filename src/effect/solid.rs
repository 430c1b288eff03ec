//! Steady single-color fill.

use embassy_time::Instant;

use super::{Effect, Tick};
use crate::canvas::Canvas;
use crate::color::Rgb;

#[derive(Debug, Clone)]
pub struct SolidEffect {
    color: Rgb,
}

impl SolidEffect {
    pub const fn new(color: Rgb) -> Self {
        Self { color }
    }
}

impl Effect for SolidEffect {
    fn tick(&mut self, _now: Instant, canvas: &mut Canvas<'_>) -> Tick {
        canvas.fill(self.color);
        Tick::Running
    }

    fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }
}
