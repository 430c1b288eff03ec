//! Input fusion: one immutable snapshot of every input source per frame.
//!
//! Buttons are software-debounced with edge latching, encoder deltas
//! come from wrapping subtraction at the hardware counter width, the
//! accelerometer is reported as the squared magnitude (callers compare
//! against squared thresholds, no square roots on the hot path) and
//! the microphone as a rolling RMS over recent captures. A sensor that
//! misses its read budget keeps its last known value and raises a
//! `stale` flag.

use embassy_time::{Duration, Instant};
use heapless::HistoryBuffer;

pub const MAX_BUTTONS: usize = 8;
pub const MAX_ENCODERS: usize = 4;

/// Number of per-capture mean squares in the rolling RMS window.
const MIC_WINDOW: usize = 8;

/// Pollable input drivers.
///
/// Every method has an absent default, so a board wires up only what
/// it has. A driver that is not ready this frame returns `None`; the
/// fusion layer carries the last known value and tracks staleness.
pub trait InputDevices {
    /// Current button levels as a bitmask, logically active-high.
    fn poll_buttons(&mut self) -> Option<u8> {
        None
    }

    fn encoder_count(&self) -> usize {
        0
    }

    /// Raw hardware counter for encoder `id`; monotonic within u16.
    fn read_encoder(&mut self, id: usize) -> Option<u16> {
        let _ = id;
        None
    }

    /// Acceleration in g.
    fn read_accel(&mut self) -> Option<[f32; 3]> {
        None
    }

    /// Most recent PCM capture, signed 16-bit.
    fn mic_samples(&mut self) -> Option<&[i16]> {
        None
    }

    /// Direct RMS readout for boards that compute it in hardware.
    fn mic_rms(&mut self) -> Option<f32> {
        None
    }

    /// Argmax frequency bin of a short FFT, where the board provides one.
    fn mic_peak_bin(&mut self) -> Option<u16> {
        None
    }
}

/// Per-frame input snapshot. Immutable once produced.
#[derive(Debug, Clone, Default)]
pub struct InputSample {
    /// Buttons that went down this frame (one-frame latched).
    pub pressed: u8,
    /// Buttons that went up this frame (one-frame latched).
    pub released: u8,
    /// Buttons currently held.
    pub held: u8,
    pub encoder_delta: [i32; MAX_ENCODERS],
    pub accel: [f32; 3],
    /// x² + y² + z² in g².
    pub accel_sq: f32,
    pub accel_stale: bool,
    pub mic_rms: Option<f32>,
    pub mic_peak_bin: Option<u16>,
    pub mic_stale: bool,
}

impl InputSample {
    pub const fn is_pressed(&self, button: u8) -> bool {
        self.pressed & (1 << button) != 0
    }

    pub const fn is_released(&self, button: u8) -> bool {
        self.released & (1 << button) != 0
    }

    pub const fn is_held(&self, button: u8) -> bool {
        self.held & (1 << button) != 0
    }
}

#[derive(Debug, Clone, Copy)]
struct ButtonState {
    stable: bool,
    candidate: bool,
    candidate_since: Option<Instant>,
}

impl ButtonState {
    const fn new() -> Self {
        Self {
            stable: false,
            candidate: false,
            candidate_since: None,
        }
    }

    /// Feed the raw level; returns the debounced edge, if any.
    fn update(&mut self, raw: bool, now: Instant, debounce: Duration) -> Option<bool> {
        if raw != self.candidate {
            self.candidate = raw;
            self.candidate_since = Some(now);
        }

        if self.candidate != self.stable {
            let since = self.candidate_since.unwrap_or(now);
            if now.duration_since(since) >= debounce {
                self.stable = self.candidate;
                return Some(self.stable);
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FusionConfig {
    /// Minimum stable time before a button edge is accepted.
    pub debounce: Duration,
    /// Age after which a sensor reading is flagged stale.
    pub staleness_window: Duration,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(10),
            staleness_window: Duration::from_millis(500),
        }
    }
}

/// Samples all configured devices once per frame.
pub struct InputFusion<D: InputDevices> {
    devices: D,
    config: FusionConfig,
    buttons: [ButtonState; MAX_BUTTONS],
    encoder_prev: [Option<u16>; MAX_ENCODERS],
    accel_last: [f32; 3],
    accel_good_at: Option<Instant>,
    mic_window: HistoryBuffer<f32, MIC_WINDOW>,
    mic_last_rms: Option<f32>,
    mic_last_bin: Option<u16>,
    mic_good_at: Option<Instant>,
}

impl<D: InputDevices> InputFusion<D> {
    pub fn new(devices: D, config: FusionConfig) -> Self {
        Self {
            devices,
            config,
            buttons: [ButtonState::new(); MAX_BUTTONS],
            encoder_prev: [None; MAX_ENCODERS],
            accel_last: [0.0; 3],
            accel_good_at: None,
            mic_window: HistoryBuffer::new(),
            mic_last_rms: None,
            mic_last_bin: None,
            mic_good_at: None,
        }
    }

    pub fn devices_mut(&mut self) -> &mut D {
        &mut self.devices
    }

    /// Produce this frame's snapshot. Never blocks beyond the
    /// individual drivers' read budgets.
    pub fn sample(&mut self, now: Instant) -> InputSample {
        let mut sample = InputSample::default();

        self.sample_buttons(now, &mut sample);
        self.sample_encoders(&mut sample);
        self.sample_accel(now, &mut sample);
        self.sample_mic(now, &mut sample);

        sample
    }

    fn sample_buttons(&mut self, now: Instant, sample: &mut InputSample) {
        if let Some(raw) = self.devices.poll_buttons() {
            for (i, state) in self.buttons.iter_mut().enumerate() {
                let bit = 1u8 << i;
                match state.update(raw & bit != 0, now, self.config.debounce) {
                    Some(true) => sample.pressed |= bit,
                    Some(false) => sample.released |= bit,
                    None => {}
                }
            }
        }

        // A driver that misses this frame keeps the last debounced
        // levels, so an in-progress hold is not cut short.
        for (i, state) in self.buttons.iter().enumerate() {
            if state.stable {
                sample.held |= 1u8 << i;
            }
        }
    }

    fn sample_encoders(&mut self, sample: &mut InputSample) {
        let count = self.devices.encoder_count().min(MAX_ENCODERS);
        for id in 0..count {
            let Some(raw) = self.devices.read_encoder(id) else {
                continue;
            };
            if let Some(prev) = self.encoder_prev[id] {
                // Wrapping subtraction at counter width handles
                // over/underflow of the hardware counter.
                #[allow(clippy::cast_possible_wrap)]
                let delta = raw.wrapping_sub(prev) as i16;
                sample.encoder_delta[id] = i32::from(delta);
            }
            self.encoder_prev[id] = Some(raw);
        }
    }

    fn sample_accel(&mut self, now: Instant, sample: &mut InputSample) {
        if let Some(axes) = self.devices.read_accel() {
            self.accel_last = axes;
            self.accel_good_at = Some(now);
        }

        sample.accel = self.accel_last;
        sample.accel_sq = self
            .accel_last
            .iter()
            .map(|axis| axis * axis)
            .sum();
        sample.accel_stale = self.is_stale(self.accel_good_at, now);
    }

    #[allow(clippy::cast_precision_loss)]
    fn sample_mic(&mut self, now: Instant, sample: &mut InputSample) {
        let mut fresh = false;

        if let Some(rms) = self.devices.mic_rms() {
            self.mic_last_rms = Some(rms);
            fresh = true;
        } else if let Some(pcm) = self.devices.mic_samples() {
            if !pcm.is_empty() {
                let mean_sq = pcm
                    .iter()
                    .map(|&s| f32::from(s) * f32::from(s))
                    .sum::<f32>()
                    / pcm.len() as f32;
                self.mic_window.write(mean_sq);
                let window_mean = self.mic_window.as_slice().iter().sum::<f32>()
                    / self.mic_window.len() as f32;
                self.mic_last_rms = Some(libm::sqrtf(window_mean));
                fresh = true;
            }
        }

        if let Some(bin) = self.devices.mic_peak_bin() {
            self.mic_last_bin = Some(bin);
            fresh = true;
        }

        if fresh {
            self.mic_good_at = Some(now);
        }

        sample.mic_rms = self.mic_last_rms;
        sample.mic_peak_bin = self.mic_last_bin;
        sample.mic_stale = self.is_stale(self.mic_good_at, now);
    }

    /// A sensor is stale once it has produced a reading and then gone
    /// quiet for longer than the window. A sensor that never reported
    /// is absent, not stale.
    fn is_stale(&self, good_at: Option<Instant>, now: Instant) -> bool {
        match good_at {
            Some(at) => now.duration_since(at) > self.config.staleness_window,
            None => false,
        }
    }
}

/// A board with no inputs at all; the engine then just plays its idle
/// composition.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInputs;

impl InputDevices for NoInputs {}
