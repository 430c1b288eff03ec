//! Control events from outside the frame loop.
//!
//! Radios, UIs and other out-of-loop producers steer the engine
//! through a bounded channel built on `critical-section` and
//! `heapless::Deque`, so an interrupt handler or a second task can
//! enqueue events without touching the renderer state. The scheduler
//! drains the queue once per frame; a full queue drops the newest
//! event rather than blocking.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::color::Rgb;

/// A steering event for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Advance the active composition's sequence(s).
    NextAnimation,
    /// Step the active composition's sequence(s) back.
    PreviousAnimation,
    /// Set global brightness (applied at present time).
    SetBrightness(u8),
    /// Re-parametrize color-carrying effects in every composition.
    SetColor(Rgb),
    PowerOn,
    PowerOff,
}

/// Error returned when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlQueueFull(pub ControlEvent);

/// Bounded, interrupt-safe control event queue.
pub struct ControlChannel<const SIZE: usize> {
    inner: Mutex<RefCell<Deque<ControlEvent, SIZE>>>,
}

impl<const SIZE: usize> ControlChannel<SIZE> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    pub const fn sender(&self) -> ControlSender<'_, SIZE> {
        ControlSender { channel: self }
    }

    pub const fn receiver(&self) -> ControlReceiver<'_, SIZE> {
        ControlReceiver { channel: self }
    }

    fn try_send(&self, event: ControlEvent) -> Result<(), ControlQueueFull> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.push_back(event).map_err(ControlQueueFull)
        })
    }

    fn try_receive(&self) -> Option<ControlEvent> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.pop_front()
        })
    }
}

impl<const SIZE: usize> Default for ControlChannel<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable producer handle; safe to use from interrupt context.
#[derive(Clone, Copy)]
pub struct ControlSender<'a, const SIZE: usize> {
    channel: &'a ControlChannel<SIZE>,
}

impl<const SIZE: usize> ControlSender<'_, SIZE> {
    pub fn try_send(&self, event: ControlEvent) -> Result<(), ControlQueueFull> {
        self.channel.try_send(event)
    }
}

/// Consumer handle held by the scheduler.
#[derive(Clone, Copy)]
pub struct ControlReceiver<'a, const SIZE: usize> {
    channel: &'a ControlChannel<SIZE>,
}

impl<const SIZE: usize> ControlReceiver<'_, SIZE> {
    pub fn try_receive(&self) -> Option<ControlEvent> {
        self.channel.try_receive()
    }
}
