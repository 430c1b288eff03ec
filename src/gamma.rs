//! Gamma correction table.
//!
//! WS2812-class strips want a nonlinear brightness curve; the table is
//! built once at configuration time (`powf` never runs on the hot
//! path) and applied per channel at present time.

use crate::color::Rgb;

/// Typical gamma for WS2812-class strips.
pub const DEFAULT_GAMMA: f32 = 2.6;

/// Precomputed 256-entry gamma lookup.
#[derive(Debug, Clone)]
pub struct GammaTable {
    lut: [u8; 256],
}

impl GammaTable {
    /// Build a table for the given exponent.
    ///
    /// The caller validates the exponent (finite, > 0) before
    /// construction; see `EngineConfig::validate`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn new(gamma: f32) -> Self {
        let mut lut = [0u8; 256];
        for (i, entry) in lut.iter_mut().enumerate() {
            let normalized = i as f32 / 255.0;
            let corrected = libm::powf(normalized, gamma) * 255.0 + 0.5;
            *entry = if corrected >= 255.0 { 255 } else { corrected as u8 };
        }
        Self { lut }
    }

    /// Identity table (no correction).
    pub fn identity() -> Self {
        let mut lut = [0u8; 256];
        for (i, entry) in lut.iter_mut().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            {
                *entry = i as u8;
            }
        }
        Self { lut }
    }

    #[inline]
    pub fn correct_channel(&self, value: u8) -> u8 {
        self.lut[value as usize]
    }

    #[inline]
    pub fn correct(&self, c: Rgb) -> Rgb {
        Rgb {
            r: self.lut[c.r as usize],
            g: self.lut[c.g as usize],
            b: self.lut[c.b as usize],
        }
    }
}
