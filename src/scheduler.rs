//! The single cooperative loop.
//!
//! One `tick` is one frame: drain control events, sample inputs, step
//! the mode machine, tick the active composition into the buffer,
//! present. The scheduler does not sleep itself; it returns the next
//! deadline so the caller can wait in whatever way the platform
//! offers. Effects are time-parametric, so running faster than the
//! frame budget only smooths the animation.

use embassy_time::{Duration, Instant};
use log::{debug, warn};

use crate::buffer::{PixelBuffer, PixelSink};
use crate::color::BLACK;
use crate::composition::Composition;
use crate::config::{ConfigError, EngineConfig};
use crate::control::{ControlEvent, ControlReceiver};
use crate::effect::Tick;
use crate::gamma::GammaTable;
use crate::input::{FusionConfig, InputDevices, InputFusion};
use crate::mode::{ModeChange, ModeKind, ModeMachine};

/// Per-mode composition set. Idle is mandatory; missing active/alert
/// compositions fall back to idle, a missing startup skips straight
/// to idle.
pub struct ModeCompositions<'a> {
    pub startup: Option<Composition<'a>>,
    pub idle: Composition<'a>,
    pub active: Option<Composition<'a>>,
    pub alert: Option<Composition<'a>>,
}

impl<'a> ModeCompositions<'a> {
    pub fn idle_only(idle: Composition<'a>) -> Self {
        Self {
            startup: None,
            idle,
            active: None,
            alert: None,
        }
    }

    fn get_mut(&mut self, mode: ModeKind) -> Option<&mut Composition<'a>> {
        match mode {
            ModeKind::Off => None,
            ModeKind::Startup => self.startup.as_mut(),
            ModeKind::Idle => Some(&mut self.idle),
            ModeKind::Active => match self.active.as_mut() {
                Some(composition) => Some(composition),
                None => Some(&mut self.idle),
            },
            ModeKind::Alert => match self.alert.as_mut() {
                Some(composition) => Some(composition),
                None => Some(&mut self.idle),
            },
        }
    }

    fn for_each(&mut self, mut f: impl FnMut(&mut Composition<'a>)) {
        if let Some(composition) = self.startup.as_mut() {
            f(composition);
        }
        f(&mut self.idle);
        if let Some(composition) = self.active.as_mut() {
            f(composition);
        }
        if let Some(composition) = self.alert.as_mut() {
            f(composition);
        }
    }
}

/// Timing information for the caller's end-of-frame wait.
#[derive(Debug, Clone, Copy)]
pub struct FrameResult {
    pub next_deadline: Instant,
    /// Zero when the loop is behind schedule or pacing is disabled.
    pub sleep_duration: Duration,
}

pub struct FrameScheduler<'a, S, D, const N: usize, const CONTROL: usize>
where
    S: PixelSink,
    D: InputDevices,
{
    buffer: PixelBuffer<N>,
    sink: S,
    fusion: InputFusion<D>,
    machine: ModeMachine,
    compositions: ModeCompositions<'a>,
    control: Option<ControlReceiver<'a, CONTROL>>,
    frame_budget: Duration,
    next_button: Option<u8>,
    has_startup: bool,
    last_status: Tick,
    next_frame: Instant,
}

impl<'a, S, D, const N: usize, const CONTROL: usize> FrameScheduler<'a, S, D, N, CONTROL>
where
    S: PixelSink,
    D: InputDevices,
{
    /// Build the engine. Fails fast on an invalid configuration; no
    /// partial startup.
    pub fn new(
        config: &EngineConfig,
        mut compositions: ModeCompositions<'a>,
        sink: S,
        devices: D,
        control: Option<ControlReceiver<'a, CONTROL>>,
    ) -> Result<Self, ConfigError> {
        config.validate(N)?;

        compositions.for_each(|composition| composition.set_delta_max(config.tick_delta_max));

        let buffer = PixelBuffer::new(
            config.channel_order,
            GammaTable::new(config.gamma),
            config.brightness,
        );
        let fusion = InputFusion::new(
            devices,
            FusionConfig {
                debounce: config.debounce,
                staleness_window: config.staleness_window,
            },
        );

        Ok(Self {
            buffer,
            sink,
            fusion,
            machine: ModeMachine::canonical(config),
            has_startup: compositions.startup.is_some(),
            compositions,
            control,
            frame_budget: config.frame_budget,
            next_button: config.next_button,
            last_status: Tick::Running,
            next_frame: Instant::from_ticks(0),
        })
    }

    pub const fn mode(&self) -> ModeKind {
        self.machine.mode()
    }

    pub fn machine_mut(&mut self) -> &mut ModeMachine {
        &mut self.machine
    }

    pub fn buffer(&self) -> &PixelBuffer<N> {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut PixelBuffer<N> {
        &mut self.buffer
    }

    pub fn devices_mut(&mut self) -> &mut D {
        self.fusion.devices_mut()
    }

    /// Process one frame.
    ///
    /// Within the frame, sampling precedes mode evaluation, which
    /// precedes the composition tick, which precedes present. Errors
    /// never escape; a failing sink costs at most the current frame.
    pub fn tick(&mut self, now: Instant) -> FrameResult {
        self.drain_control(now);

        let sample = self.fusion.sample(now);

        if let Some(button) = self.next_button {
            if sample.is_pressed(button) && self.machine.mode() != ModeKind::Off {
                if let Some(composition) = self.compositions.get_mut(self.machine.mode()) {
                    composition.next();
                }
            }
        }

        let startup_done =
            self.machine.mode() == ModeKind::Startup && self.last_status == Tick::Done;
        if let Some(change) = self.machine.step(&sample, startup_done, now) {
            self.apply_change(change, now);
        }

        if let Some(composition) = self.compositions.get_mut(self.machine.mode()) {
            self.last_status = composition.tick(now, self.buffer.frame_mut());
        }

        self.present();

        self.pace(now)
    }

    fn drain_control(&mut self, now: Instant) {
        let Some(receiver) = self.control else {
            return;
        };
        while let Some(event) = receiver.try_receive() {
            debug!("control event: {:?}", event);
            match event {
                ControlEvent::NextAnimation => {
                    if let Some(composition) = self.compositions.get_mut(self.machine.mode()) {
                        composition.next();
                    }
                }
                ControlEvent::PreviousAnimation => {
                    if let Some(composition) = self.compositions.get_mut(self.machine.mode()) {
                        composition.previous();
                    }
                }
                ControlEvent::SetBrightness(brightness) => {
                    self.buffer.set_brightness(brightness);
                }
                ControlEvent::SetColor(color) => {
                    self.compositions
                        .for_each(|composition| composition.set_color(color));
                }
                ControlEvent::PowerOn => {
                    if self.machine.mode() == ModeKind::Off {
                        let target = if self.has_startup {
                            ModeKind::Startup
                        } else {
                            ModeKind::Idle
                        };
                        if let Some(change) = self.machine.force(target, now) {
                            self.apply_change(change, now);
                        }
                    }
                }
                ControlEvent::PowerOff => {
                    if let Some(change) = self.machine.force(ModeKind::Off, now) {
                        self.apply_change(change, now);
                    }
                }
            }
        }
    }

    /// Mode-entry actions: the new composition starts from a reset on
    /// a black frame.
    fn apply_change(&mut self, change: ModeChange, now: Instant) {
        debug!("mode {:?} -> {:?} (cause {:?})", change.from, change.to, change.cause);

        // A startup-less engine skips straight to idle.
        if change.to == ModeKind::Startup && !self.has_startup {
            if let Some(skipped) = self.machine.force(ModeKind::Idle, now) {
                self.apply_change(skipped, now);
            }
            return;
        }

        self.buffer.fill(BLACK);
        self.last_status = Tick::Running;
        if let Some(composition) = self.compositions.get_mut(change.to) {
            composition.reset();
        }
    }

    /// Present with one retry; a second failure drops the frame and
    /// the loop continues.
    fn present(&mut self) {
        if let Err(first) = self.buffer.present(&mut self.sink) {
            warn!("pixel push failed ({:?}), retrying", first);
            if let Err(second) = self.buffer.present(&mut self.sink) {
                warn!("pixel push failed twice ({:?}), dropping frame", second);
            }
        }
    }

    /// Frame pacing with drift correction: a loop that has fallen
    /// behind by more than two frames skips the backlog instead of
    /// replaying it.
    fn pace(&mut self, now: Instant) -> FrameResult {
        if self.frame_budget.as_ticks() == 0 {
            self.next_frame = now;
            return FrameResult {
                next_deadline: now,
                sleep_duration: Duration::from_ticks(0),
            };
        }

        let max_drift = self.frame_budget * 2;
        if now > self.next_frame + max_drift {
            self.next_frame = now;
        }

        self.next_frame += self.frame_budget;

        let sleep_duration = if self.next_frame > now {
            self.next_frame.duration_since(now)
        } else {
            Duration::from_ticks(0)
        };

        FrameResult {
            next_deadline: self.next_frame,
            sleep_duration,
        }
    }
}
