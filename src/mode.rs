//! High-level mode machine.
//!
//! Modes select which composition the scheduler plays. Transitions
//! are a declarative rule table evaluated once per frame after input
//! sampling; at most one rule fires, ties broken by declaration
//! order. Sensor predicates are suppressed while their sensor is
//! stale.

use embassy_time::{Duration, Instant};
use heapless::Vec;

use crate::config::EngineConfig;
use crate::input::InputSample;

pub const MAX_RULES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Off,
    Startup,
    Idle,
    Active,
    Alert,
}

/// What tripped the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCause {
    Accel,
    Mic,
}

/// Source mode of a rule; `Any` matches every mode except the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    In(ModeKind),
    Any,
}

/// Predicate over the current input sample and elapsed-in-mode time.
#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    /// Debounced press of the configured power button.
    PowerPressed,
    /// The startup composition reported `Done`.
    StartupDone,
    /// Squared accelerometer magnitude above the threshold (g²).
    AccelAbove(f32),
    /// Microphone RMS above the threshold.
    MicAbove(f32),
    /// No sensor trigger for `hold`, measured from mode entry or the
    /// last trigger, whichever is later.
    QuietFor(Duration),
    /// Dwelled in the current mode for at least this long.
    Elapsed(Duration),
    /// Power button held down continuously for this long.
    PowerLongPress(Duration),
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub from: Source,
    pub when: Predicate,
    pub to: ModeKind,
}

/// One fired transition, handed to the scheduler for entry actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub from: ModeKind,
    pub to: ModeKind,
    pub cause: Option<AlertCause>,
}

pub struct ModeMachine {
    rules: Vec<Rule, MAX_RULES>,
    mode: ModeKind,
    entered_at: Instant,
    alert_cause: Option<AlertCause>,
    last_trigger: Option<Instant>,
    power_button: Option<u8>,
    power_held_since: Option<Instant>,
}

impl ModeMachine {
    pub fn new(power_button: Option<u8>) -> Self {
        Self {
            rules: Vec::new(),
            mode: ModeKind::Off,
            entered_at: Instant::from_ticks(0),
            alert_cause: None,
            last_trigger: None,
            power_button,
            power_held_since: None,
        }
    }

    /// The canonical transition table driven by engine thresholds:
    ///
    /// - OFF → STARTUP on power press
    /// - STARTUP → IDLE when the startup composition completes
    /// - IDLE → ACTIVE on the activity threshold
    /// - ACTIVE → IDLE after the hold-off with no fresh trigger
    /// - any → ALERT on the alert threshold; ALERT → IDLE after its duration
    /// - any → OFF on power long-press
    pub fn canonical(config: &EngineConfig) -> Self {
        let mut machine = Self::new(config.power_button);

        let _ = machine.push_rule(Rule {
            from: Source::Any,
            when: Predicate::PowerLongPress(config.power_long_press),
            to: ModeKind::Off,
        });
        let _ = machine.push_rule(Rule {
            from: Source::In(ModeKind::Off),
            when: Predicate::PowerPressed,
            to: ModeKind::Startup,
        });
        let _ = machine.push_rule(Rule {
            from: Source::In(ModeKind::Startup),
            when: Predicate::StartupDone,
            to: ModeKind::Idle,
        });
        let _ = machine.push_rule(Rule {
            from: Source::Any,
            when: Predicate::AccelAbove(config.alert_threshold),
            to: ModeKind::Alert,
        });
        let _ = machine.push_rule(Rule {
            from: Source::In(ModeKind::Alert),
            when: Predicate::Elapsed(config.alert_duration),
            to: ModeKind::Idle,
        });
        let _ = machine.push_rule(Rule {
            from: Source::In(ModeKind::Idle),
            when: Predicate::AccelAbove(config.active_threshold),
            to: ModeKind::Active,
        });
        let _ = machine.push_rule(Rule {
            from: Source::In(ModeKind::Active),
            when: Predicate::QuietFor(config.active_hold),
            to: ModeKind::Idle,
        });

        machine
    }

    /// Append a rule; later rules lose ties to earlier ones.
    pub fn push_rule(&mut self, rule: Rule) -> Result<(), Rule> {
        self.rules.push(rule)
    }

    pub const fn mode(&self) -> ModeKind {
        self.mode
    }

    pub const fn alert_cause(&self) -> Option<AlertCause> {
        self.alert_cause
    }

    pub fn elapsed_in_mode(&self, now: Instant) -> Duration {
        now.duration_since(self.entered_at)
    }

    /// Force a mode, bypassing the rule table (power events from the
    /// control channel use this).
    pub fn force(&mut self, mode: ModeKind, now: Instant) -> Option<ModeChange> {
        if mode == self.mode {
            return None;
        }
        let change = ModeChange {
            from: self.mode,
            to: mode,
            cause: None,
        };
        self.enter(mode, None, now);
        Some(change)
    }

    /// Evaluate the table once. Returns the transition, if one fired.
    pub fn step(
        &mut self,
        sample: &InputSample,
        startup_done: bool,
        now: Instant,
    ) -> Option<ModeChange> {
        self.track_power_hold(sample, now);
        self.track_triggers(sample, now);

        // First matching rule wins; skip self-transitions so a
        // wildcard rule cannot re-enter the mode it is already in.
        let fired = self
            .rules
            .iter()
            .find(|rule| {
                rule.to != self.mode
                    && match rule.from {
                        Source::In(mode) => mode == self.mode,
                        Source::Any => true,
                    }
                    && self.eval(rule.when, sample, startup_done, now)
            })
            .copied()?;

        let cause = match fired.when {
            Predicate::AccelAbove(_) if fired.to == ModeKind::Alert => Some(AlertCause::Accel),
            Predicate::MicAbove(_) if fired.to == ModeKind::Alert => Some(AlertCause::Mic),
            _ => None,
        };

        let change = ModeChange {
            from: self.mode,
            to: fired.to,
            cause,
        };
        self.enter(fired.to, cause, now);
        Some(change)
    }

    fn enter(&mut self, mode: ModeKind, cause: Option<AlertCause>, now: Instant) {
        self.mode = mode;
        self.entered_at = now;
        self.alert_cause = cause;
        self.last_trigger = None;
    }

    fn eval(
        &self,
        predicate: Predicate,
        sample: &InputSample,
        startup_done: bool,
        now: Instant,
    ) -> bool {
        match predicate {
            Predicate::PowerPressed => self
                .power_button
                .is_some_and(|button| sample.is_pressed(button)),
            Predicate::StartupDone => startup_done,
            Predicate::AccelAbove(threshold) => {
                !sample.accel_stale && sample.accel_sq > threshold
            }
            Predicate::MicAbove(threshold) => {
                !sample.mic_stale && sample.mic_rms.is_some_and(|rms| rms > threshold)
            }
            Predicate::QuietFor(hold) => {
                let since = self.last_trigger.unwrap_or(self.entered_at);
                let since = since.max(self.entered_at);
                now.duration_since(since) >= hold
            }
            Predicate::Elapsed(dwell) => now.duration_since(self.entered_at) >= dwell,
            Predicate::PowerLongPress(hold) => self
                .power_held_since
                .is_some_and(|since| now.duration_since(since) >= hold),
        }
    }

    fn track_power_hold(&mut self, sample: &InputSample, now: Instant) {
        let Some(button) = self.power_button else {
            return;
        };
        if sample.is_held(button) {
            if self.power_held_since.is_none() {
                self.power_held_since = Some(now);
            }
        } else {
            self.power_held_since = None;
        }
    }

    /// Any sensor rule that evaluates true refreshes the trigger
    /// timestamp, so `QuietFor` measures true quiet regardless of
    /// which mode the rule belongs to.
    fn track_triggers(&mut self, sample: &InputSample, now: Instant) {
        let triggered = self.rules.iter().any(|rule| match rule.when {
            Predicate::AccelAbove(threshold) => {
                !sample.accel_stale && sample.accel_sq > threshold
            }
            Predicate::MicAbove(threshold) => {
                !sample.mic_stale && sample.mic_rms.is_some_and(|rms| rms > threshold)
            }
            _ => false,
        });
        if triggered {
            self.last_trigger = Some(now);
        }
    }
}
