//! 8-bit fixed-point helpers used on the per-pixel hot path.
//!
//! All of these are integer-only; float math is reserved for
//! configuration time and once-per-frame phase updates.

/// Scale an 8-bit value by a factor (0-255 = 0.0-1.0)
#[inline]
#[allow(clippy::cast_lossless)]
pub const fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * (1 + scale as u16)) >> 8) as u8
}

/// Blend two 8-bit values
///
/// `amount_of_b` = 0 yields `a`, 255 yields `b`.
#[inline]
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub const fn blend8(a: u8, b: u8, amount_of_b: u8) -> u8 {
    let delta = b as i16 - a as i16;

    let mut partial: u32 = (a as u32) << 16;
    partial = partial.wrapping_add(
        (delta as u32)
            .wrapping_mul(amount_of_b as u32)
            .wrapping_mul(257),
    );
    partial = partial.wrapping_add(0x8000); // rounding

    (partial >> 16) as u8
}

/// Convert a float position (taken mod 1) to a 16-bit fraction of a
/// full cycle.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[inline]
pub fn fract16(pos: f32) -> u16 {
    let wrapped = pos - libm::floorf(pos);
    // wrapped is in [0, 1); values at the top can only appear through rounding
    let scaled = wrapped * 65536.0;
    if scaled >= 65535.0 { 65535 } else { scaled as u16 }
}

/// Upper byte of a 16-bit fraction, i.e. the matching position on the
/// 0-255 hue circle.
#[inline]
pub const fn fract16_to_u8(pos_fp: u16) -> u8 {
    (pos_fp >> 8) as u8
}

/// Deterministic xorshift RNG for effects that need randomness.
///
/// Seeded once at startup from whatever noise source the board has;
/// never reseeded on the hot path.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u32,
}

impl Rng {
    pub const fn new(seed: u32) -> Self {
        // A zero state would lock the generator at zero.
        let state = if seed == 0 { 0x9e37_79b9 } else { seed };
        Self { state }
    }

    /// Next raw 32-bit value (xorshift32).
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform-ish value in `0..bound`. `bound` must be non-zero.
    #[allow(clippy::cast_possible_truncation)]
    pub fn next_below(&mut self, bound: u32) -> u32 {
        (u64::from(self.next_u32()) * u64::from(bound) >> 32) as u32
    }
}
