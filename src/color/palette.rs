//! Wraparound-indexable color palettes.
//!
//! A palette is an immutable array of colors sampled at any fractional
//! position of one full cycle. Integer positions return the stored
//! color; everything in between is a linear blend of the neighbours,
//! with the last entry wrapping back to the first.

use thiserror::Error;

use super::Rgb;
use crate::math8::{blend8, fract16};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteError {
    #[error("palette must contain at least one color")]
    Empty,
}

/// Immutable palette of `N` colors with wraparound lookup.
#[derive(Debug, Clone, Copy)]
pub struct Palette<const N: usize> {
    colors: [Rgb; N],
}

impl<const N: usize> Palette<N> {
    /// Create a palette. Fails for a zero-length color set.
    pub const fn new(colors: [Rgb; N]) -> Result<Self, PaletteError> {
        if N == 0 {
            return Err(PaletteError::Empty);
        }
        Ok(Self { colors })
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Sample at a 16-bit fraction of the full cycle (0..=65535 maps
    /// position [0, 1)).
    ///
    /// Entry `k` sits at position `k / N`; neighbours are blended
    /// linearly and the last entry wraps to the first.
    #[allow(clippy::cast_possible_truncation)]
    pub fn sample(&self, pos_fp: u16) -> Rgb {
        let scaled = u32::from(pos_fp) * N as u32; // 16.16 position in entries
        let k = (scaled >> 16) as usize;
        let local = ((scaled >> 8) & 0xFF) as u8;

        let a = self.colors[k];
        let b = self.colors[(k + 1) % N];

        Rgb {
            r: blend8(a.r, b.r, local),
            g: blend8(a.g, b.g, local),
            b: blend8(a.b, b.b, local),
        }
    }

    /// Sample at a float position; the position is taken mod 1, so
    /// `sample_f32(x)` equals `sample_f32(x + 1.0)`.
    pub fn sample_f32(&self, pos: f32) -> Rgb {
        self.sample(fract16(pos))
    }

    pub const fn colors(&self) -> &[Rgb; N] {
        &self.colors
    }
}
