//! Effect system with compile-time known effect variants.
//!
//! All effects live in the [`EffectSlot`] enum so that compositions
//! hold a flat array of tagged values and the hot loop never touches
//! the heap. Each effect implements the [`Effect`] trait; new kinds
//! extend the tag set.
//!
//! Effects are time-parametric: they advance by the clamped delta
//! between ticks (see [`DeltaClock`]), never by a fixed per-frame
//! increment, so animation speed is independent of frame rate.

mod blink;
mod chase;
mod comet;
mod pulse;
mod rainbow;
mod solid;
mod sparkle;

use embassy_time::{Duration, Instant};

pub use blink::BlinkEffect;
pub use chase::{ChaseColor, ChaseEffect};
pub use comet::{CometColor, CometEffect};
pub use pulse::PulseEffect;
pub use rainbow::RainbowEffect;
pub use solid::SolidEffect;
pub use sparkle::SparkleEffect;

use crate::canvas::Canvas;
use crate::color::Rgb;
use crate::pixel_map::PixelMap;

/// Default ceiling on the per-tick time delta.
pub const DEFAULT_DELTA_MAX: Duration = Duration::from_millis(100);

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running,
    /// One-shot effects report completion; looping effects never do.
    Done,
}

/// Clamped monotonic delta source shared by all effects.
///
/// The first tick after construction or reset observes a zero delta;
/// afterwards deltas are capped at the configured ceiling so a long
/// stall (slow sensor read, radio poll) resumes the animation smoothly
/// instead of jumping.
#[derive(Debug, Clone)]
pub struct DeltaClock {
    last: Option<Instant>,
    max: Duration,
}

impl DeltaClock {
    pub const fn new() -> Self {
        Self {
            last: None,
            max: DEFAULT_DELTA_MAX,
        }
    }

    pub const fn set_max(&mut self, max: Duration) {
        self.max = max;
    }

    /// Clamped time since the previous call.
    pub fn advance(&mut self, now: Instant) -> Duration {
        let delta = match self.last {
            Some(last) if now > last => now.duration_since(last),
            _ => Duration::from_ticks(0),
        };
        self.last = Some(now);
        if delta > self.max { self.max } else { delta }
    }

    /// Clamped delta in seconds, for phase accumulation.
    #[allow(clippy::cast_precision_loss)]
    pub fn advance_secs(&mut self, now: Instant) -> f32 {
        self.advance(now).as_micros() as f32 / 1_000_000.0
    }

    pub const fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for DeltaClock {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Effect {
    /// Write one frame's worth of pixels through the bound canvas.
    fn tick(&mut self, now: Instant, canvas: &mut Canvas<'_>) -> Tick;

    /// Return internal state to construction-time defaults. Does not
    /// touch the pixel buffer.
    fn reset(&mut self) {}

    /// Re-parametrize the effect's base color, where one exists.
    fn set_color(&mut self, _color: Rgb) {}

    /// Adjust the delta ceiling, where the effect keeps a clock.
    fn set_delta_max(&mut self, _max: Duration) {}
}

/// Effect slot - enum containing all built-in effects.
#[derive(Debug, Clone)]
pub enum EffectSlot {
    /// Steady single-color fill
    Solid(SolidEffect),
    /// 50% duty on/off toggle
    Blink(BlinkEffect),
    /// Sine-shaped brightness swell
    Pulse(PulseEffect),
    /// Random pixels flashed for one frame
    Sparkle(SparkleEffect),
    /// Moving head with an exponentially decaying tail
    Comet(CometEffect),
    /// Comet with hue varying along the tail
    RainbowComet(CometEffect),
    /// Repeating lit/dark pattern in translation
    Chase(ChaseEffect),
    /// Chase with per-group hue cycling
    RainbowChase(ChaseEffect),
    /// Hue gradient across the strip, rotating over time
    Rainbow(RainbowEffect),
}

impl EffectSlot {
    pub fn tick(&mut self, now: Instant, canvas: &mut Canvas<'_>) -> Tick {
        match self {
            Self::Solid(effect) => effect.tick(now, canvas),
            Self::Blink(effect) => effect.tick(now, canvas),
            Self::Pulse(effect) => effect.tick(now, canvas),
            Self::Sparkle(effect) => effect.tick(now, canvas),
            Self::Comet(effect) | Self::RainbowComet(effect) => effect.tick(now, canvas),
            Self::Chase(effect) | Self::RainbowChase(effect) => effect.tick(now, canvas),
            Self::Rainbow(effect) => effect.tick(now, canvas),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::Solid(effect) => Effect::reset(effect),
            Self::Blink(effect) => Effect::reset(effect),
            Self::Pulse(effect) => Effect::reset(effect),
            Self::Sparkle(effect) => Effect::reset(effect),
            Self::Comet(effect) | Self::RainbowComet(effect) => Effect::reset(effect),
            Self::Chase(effect) | Self::RainbowChase(effect) => Effect::reset(effect),
            Self::Rainbow(effect) => Effect::reset(effect),
        }
    }

    pub fn set_color(&mut self, color: Rgb) {
        match self {
            Self::Solid(effect) => effect.set_color(color),
            Self::Blink(effect) => effect.set_color(color),
            Self::Pulse(effect) => effect.set_color(color),
            Self::Sparkle(effect) => effect.set_color(color),
            Self::Comet(effect) | Self::RainbowComet(effect) => effect.set_color(color),
            Self::Chase(effect) | Self::RainbowChase(effect) => effect.set_color(color),
            Self::Rainbow(effect) => effect.set_color(color),
        }
    }

    pub fn set_delta_max(&mut self, max: Duration) {
        match self {
            Self::Solid(effect) => effect.set_delta_max(max),
            Self::Blink(effect) => effect.set_delta_max(max),
            Self::Pulse(effect) => effect.set_delta_max(max),
            Self::Sparkle(effect) => effect.set_delta_max(max),
            Self::Comet(effect) | Self::RainbowComet(effect) => effect.set_delta_max(max),
            Self::Chase(effect) | Self::RainbowChase(effect) => effect.set_delta_max(max),
            Self::Rainbow(effect) => effect.set_delta_max(max),
        }
    }
}

/// An effect bound to the pixel map it draws through.
///
/// Binding happens at configuration time; `rebind` swaps the layout
/// without touching effect state.
#[derive(Debug, Clone)]
pub struct BoundEffect {
    slot: EffectSlot,
    map: PixelMap,
}

impl BoundEffect {
    pub const fn new(slot: EffectSlot, map: PixelMap) -> Self {
        Self { slot, map }
    }

    pub const fn rebind(&mut self, map: PixelMap) {
        self.map = map;
    }

    pub const fn map(&self) -> PixelMap {
        self.map
    }

    pub fn slot_mut(&mut self) -> &mut EffectSlot {
        &mut self.slot
    }

    pub fn tick(&mut self, now: Instant, frame: &mut [Rgb]) -> Tick {
        let mut canvas = Canvas::new(frame, self.map);
        self.slot.tick(now, &mut canvas)
    }

    pub fn reset(&mut self) {
        self.slot.reset();
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.slot.set_color(color);
    }

    pub fn set_delta_max(&mut self, max: Duration) {
        self.slot.set_delta_max(max);
    }
}
