#![no_std]

//! Time-multiplexed animation engine for addressable LED strips.
//!
//! Named effects draw through pixel maps into a frame buffer, are
//! combined as sequences and groups, advanced by a monotonic clock
//! and steered by fused sensor input through a small mode machine.
//! Everything is allocated before the loop starts; one scheduler tick
//! is one frame.

pub mod buffer;
pub mod canvas;
pub mod color;
pub mod composition;
pub mod config;
pub mod control;
pub mod effect;
pub mod gamma;
pub mod input;
pub mod math8;
pub mod mode;
pub mod pixel_map;
pub mod scheduler;

pub use buffer::{ChannelOrder, PixelBuffer, PixelSink, SinkError};
pub use canvas::Canvas;
pub use color::{Hsv, Palette, PaletteError, Rgb};
pub use composition::{Composition, Group, Sequence};
pub use config::{ConfigError, EngineConfig};
pub use control::{ControlChannel, ControlEvent, ControlQueueFull, ControlReceiver, ControlSender};
pub use effect::{
    BlinkEffect, BoundEffect, ChaseColor, ChaseEffect, CometColor, CometEffect, DEFAULT_DELTA_MAX,
    DeltaClock, Effect, EffectSlot, PulseEffect, RainbowEffect, SolidEffect, SparkleEffect, Tick,
};
pub use gamma::{DEFAULT_GAMMA, GammaTable};
pub use input::{FusionConfig, InputDevices, InputFusion, InputSample, NoInputs};
pub use mode::{AlertCause, ModeChange, ModeKind, ModeMachine, Predicate, Rule, Source};
pub use pixel_map::{MapError, PixelMap};
pub use scheduler::{FrameResult, FrameScheduler, ModeCompositions};

pub use embassy_time::{Duration, Instant};
