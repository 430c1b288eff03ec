//! Logical-to-physical pixel index maps.
//!
//! Effects address pixels through a map, so the same effect runs
//! unchanged on a reversed strip, a ring wired from the centre out, or
//! every k-th pixel of a longer strip. Maps are cheap copyable values;
//! every built-in is injective.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    #[error("every-k map requires a non-zero step")]
    ZeroStep,
    #[error("every-k offset {offset} is outside the strip of {len} pixels")]
    OffsetOutOfRange { offset: usize, len: usize },
}

/// Map from logical positions `[0, M)` to physical indices `[0, N)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelMap {
    /// Logical order equals physical order.
    Identity { len: usize },
    /// Logical 0 is the far physical end.
    Reverse { len: usize },
    /// Alternates between the two physical ends, walking inward.
    InterleaveEnds { len: usize },
    /// Walks outward from the physical centre, alternating sides.
    RadialFromCenter { len: usize },
    /// Every `step`-th physical pixel starting at `offset`.
    EveryK {
        len: usize,
        step: usize,
        offset: usize,
    },
}

impl PixelMap {
    pub const fn identity(len: usize) -> Self {
        Self::Identity { len }
    }

    pub const fn reverse(len: usize) -> Self {
        Self::Reverse { len }
    }

    pub const fn interleave_ends(len: usize) -> Self {
        Self::InterleaveEnds { len }
    }

    pub const fn radial_from_center(len: usize) -> Self {
        Self::RadialFromCenter { len }
    }

    pub const fn every_k(len: usize, step: usize, offset: usize) -> Result<Self, MapError> {
        if step == 0 {
            return Err(MapError::ZeroStep);
        }
        if offset >= len && len > 0 {
            return Err(MapError::OffsetOutOfRange { offset, len });
        }
        Ok(Self::EveryK { len, step, offset })
    }

    /// Logical length M.
    pub const fn len(&self) -> usize {
        match *self {
            Self::Identity { len }
            | Self::Reverse { len }
            | Self::InterleaveEnds { len }
            | Self::RadialFromCenter { len } => len,
            Self::EveryK { len, step, offset } => {
                if len <= offset {
                    0
                } else {
                    (len - offset).div_ceil(step)
                }
            }
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Physical index for logical position `i`.
    ///
    /// Precondition: `i < self.len()`.
    pub const fn physical(&self, i: usize) -> usize {
        match *self {
            Self::Identity { .. } => i,
            Self::Reverse { len } => len - 1 - i,
            Self::InterleaveEnds { len } => {
                if i % 2 == 0 {
                    i / 2
                } else {
                    len - 1 - i / 2
                }
            }
            Self::RadialFromCenter { len } => {
                let center = (len - 1) / 2;
                if i == 0 {
                    center
                } else {
                    let k = (i + 1) / 2;
                    if i % 2 == 1 { center + k } else { center - k }
                }
            }
            Self::EveryK { step, offset, .. } => offset + i * step,
        }
    }
}
