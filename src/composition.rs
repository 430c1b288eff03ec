//! Compositions of effects.
//!
//! A composition is either a single bound effect, a sequence (one
//! child active at a time, advanced by events or on completion) or a
//! group (all children every frame, overwrite ordering). Sequences and
//! groups nest arbitrarily through borrowed child slices, so the whole
//! tree is allocated before the loop starts and the hot path only ever
//! walks references.

use embassy_time::{Duration, Instant};

use crate::color::{BLACK, Rgb};
use crate::effect::{BoundEffect, Tick};

/// A node in the composition tree.
pub enum Composition<'a> {
    Effect(BoundEffect),
    Sequence(Sequence<'a>),
    Group(Group<'a>),
}

/// One child active at a time.
pub struct Sequence<'a> {
    children: &'a mut [Composition<'a>],
    index: usize,
    auto_clear: bool,
    auto_reset: bool,
    advance_on_done: bool,
    looping: bool,
    pending_clear: bool,
    finished: bool,
}

impl<'a> Sequence<'a> {
    pub fn new(children: &'a mut [Composition<'a>]) -> Self {
        Self {
            children,
            index: 0,
            auto_clear: false,
            auto_reset: false,
            advance_on_done: false,
            looping: true,
            pending_clear: false,
            finished: false,
        }
    }

    /// Fill the buffer with black before each new child's first tick.
    #[must_use]
    pub const fn with_auto_clear(mut self) -> Self {
        self.auto_clear = true;
        self
    }

    /// Reset the outgoing child on every transition.
    #[must_use]
    pub const fn with_auto_reset(mut self) -> Self {
        self.auto_reset = true;
        self
    }

    /// Advance automatically when the active child reports `Done`.
    #[must_use]
    pub const fn with_advance_on_done(mut self) -> Self {
        self.advance_on_done = true;
        self
    }

    /// Report `Done` after the last child completes instead of
    /// wrapping around.
    #[must_use]
    pub const fn run_once(mut self) -> Self {
        self.looping = false;
        self
    }

    pub fn tick(&mut self, now: Instant, frame: &mut [Rgb]) -> Tick {
        if self.children.is_empty() || self.finished {
            return Tick::Done;
        }

        if self.pending_clear {
            frame.fill(BLACK);
            self.pending_clear = false;
        }

        let status = self.children[self.index].tick(now, frame);

        if status == Tick::Done && self.advance_on_done {
            if self.index + 1 < self.children.len() {
                self.transition_to(self.index + 1);
            } else if self.looping {
                self.transition_to(0);
            } else {
                self.finished = true;
            }
        }

        if self.finished { Tick::Done } else { Tick::Running }
    }

    /// Advance to the next child, wrapping at the end.
    pub fn next(&mut self) {
        if self.children.is_empty() {
            return;
        }
        self.transition_to((self.index + 1) % self.children.len());
    }

    /// Step back to the previous child, wrapping at the start.
    pub fn previous(&mut self) {
        if self.children.is_empty() {
            return;
        }
        let len = self.children.len();
        self.transition_to((self.index + len - 1) % len);
    }

    /// Jump to child `i`. Precondition: `i < len`.
    pub fn jump(&mut self, i: usize) {
        self.transition_to(i);
    }

    /// Index of the active child.
    pub const fn current(&self) -> usize {
        self.index
    }

    pub fn reset(&mut self) {
        for child in self.children.iter_mut() {
            child.reset();
        }
        self.index = 0;
        self.pending_clear = false;
        self.finished = false;
    }

    fn transition_to(&mut self, i: usize) {
        if self.auto_reset {
            self.children[self.index].reset();
        }
        self.index = i;
        self.pending_clear = self.auto_clear;
        self.finished = false;
    }

    fn set_color(&mut self, color: Rgb) {
        for child in self.children.iter_mut() {
            child.set_color(color);
        }
    }

    fn set_delta_max(&mut self, max: Duration) {
        for child in self.children.iter_mut() {
            child.set_delta_max(max);
        }
    }
}

/// All children every frame, in listed order.
///
/// There is no blending: two children writing the same physical pixel
/// resolve by write order, last write wins.
pub struct Group<'a> {
    children: &'a mut [Composition<'a>],
}

impl<'a> Group<'a> {
    pub fn new(children: &'a mut [Composition<'a>]) -> Self {
        Self { children }
    }

    pub fn tick(&mut self, now: Instant, frame: &mut [Rgb]) -> Tick {
        if self.children.is_empty() {
            return Tick::Running;
        }

        let mut all_done = true;
        for child in self.children.iter_mut() {
            if child.tick(now, frame) == Tick::Running {
                all_done = false;
            }
        }

        if all_done { Tick::Done } else { Tick::Running }
    }

    pub fn reset(&mut self) {
        for child in self.children.iter_mut() {
            child.reset();
        }
    }
}

impl Composition<'_> {
    pub fn tick(&mut self, now: Instant, frame: &mut [Rgb]) -> Tick {
        match self {
            Self::Effect(effect) => effect.tick(now, frame),
            Self::Sequence(sequence) => sequence.tick(now, frame),
            Self::Group(group) => group.tick(now, frame),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::Effect(effect) => effect.reset(),
            Self::Sequence(sequence) => sequence.reset(),
            Self::Group(group) => group.reset(),
        }
    }

    /// Advance nested sequences; groups forward to every child so
    /// grouped sequences stay in step.
    pub fn next(&mut self) {
        match self {
            Self::Effect(_) => {}
            Self::Sequence(sequence) => sequence.next(),
            Self::Group(group) => {
                for child in group.children.iter_mut() {
                    child.next();
                }
            }
        }
    }

    pub fn previous(&mut self) {
        match self {
            Self::Effect(_) => {}
            Self::Sequence(sequence) => sequence.previous(),
            Self::Group(group) => {
                for child in group.children.iter_mut() {
                    child.previous();
                }
            }
        }
    }

    /// Re-parametrize every color-carrying effect in the tree.
    pub fn set_color(&mut self, color: Rgb) {
        match self {
            Self::Effect(effect) => effect.set_color(color),
            Self::Sequence(sequence) => sequence.set_color(color),
            Self::Group(group) => {
                for child in group.children.iter_mut() {
                    child.set_color(color);
                }
            }
        }
    }

    /// Propagate the configured delta ceiling to every effect clock.
    pub fn set_delta_max(&mut self, max: Duration) {
        match self {
            Self::Effect(effect) => effect.set_delta_max(max),
            Self::Sequence(sequence) => sequence.set_delta_max(max),
            Self::Group(group) => {
                for child in group.children.iter_mut() {
                    child.set_delta_max(max);
                }
            }
        }
    }
}
