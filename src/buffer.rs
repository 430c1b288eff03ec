//! Frame buffer and hardware presentation.
//!
//! The buffer is the single owner of the stored frame. Effects write
//! into it freely during a frame; nothing reaches the strip until
//! [`PixelBuffer::present`], which gamma-corrects, applies global
//! brightness and encodes into the sink's channel order. Keeping
//! attenuation at present time avoids repeated quantization loss in
//! the stored colors.

use thiserror::Error;

use crate::color::{BLACK, Rgb};
use crate::gamma::GammaTable;
use crate::math8::scale8;

/// Channel order of the wire format consumed by the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    Rgb,
    #[default]
    Grb,
    /// GRB plus a white channel; the engine renders RGB and emits
    /// white as zero.
    Grbw,
}

impl ChannelOrder {
    /// Pack a color into a 24- or 32-bit wire word.
    pub const fn encode(self, c: Rgb) -> u32 {
        let (r, g, b) = (c.r as u32, c.g as u32, c.b as u32);
        match self {
            Self::Rgb => (r << 16) | (g << 8) | b,
            Self::Grb => (g << 16) | (r << 8) | b,
            Self::Grbw => (g << 24) | (r << 16) | (b << 8),
        }
    }

    /// Unpack a wire word back into a color.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn decode(self, word: u32) -> Rgb {
        match self {
            Self::Rgb => Rgb {
                r: (word >> 16) as u8,
                g: (word >> 8) as u8,
                b: word as u8,
            },
            Self::Grb => Rgb {
                r: (word >> 8) as u8,
                g: (word >> 16) as u8,
                b: word as u8,
            },
            Self::Grbw => Rgb {
                r: (word >> 16) as u8,
                g: (word >> 24) as u8,
                b: (word >> 8) as u8,
            },
        }
    }
}

/// Peripheral-level failure while pushing a frame.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    #[error("bus NAK")]
    Nak,
    #[error("bus timeout")]
    Timeout,
    #[error("pixel push underrun")]
    Underrun,
}

/// Abstract LED strip driver.
///
/// Implement this to support different hardware platforms. `push`
/// receives one frame of wire words in the order declared at engine
/// construction and is the only call allowed to block on the bus.
pub trait PixelSink {
    fn push(&mut self, frame: &[u32]) -> Result<(), SinkError>;
}

/// Exclusive owner of the stored frame of `N` pixels.
pub struct PixelBuffer<const N: usize> {
    frame: [Rgb; N],
    scratch: [u32; N],
    order: ChannelOrder,
    gamma: GammaTable,
    brightness: u8,
}

impl<const N: usize> PixelBuffer<N> {
    pub fn new(order: ChannelOrder, gamma: GammaTable, brightness: u8) -> Self {
        Self {
            frame: [BLACK; N],
            scratch: [0; N],
            order,
            gamma,
            brightness,
        }
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Write one pixel. Out-of-range `i` is a programmer error.
    #[inline]
    pub fn set(&mut self, i: usize, c: Rgb) {
        self.frame[i] = c;
    }

    #[inline]
    pub fn get(&self, i: usize) -> Rgb {
        self.frame[i]
    }

    pub fn fill(&mut self, c: Rgb) {
        self.frame = [c; N];
    }

    /// Global brightness, applied only at present time; the stored
    /// frame keeps full precision.
    pub fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    pub const fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn frame(&self) -> &[Rgb; N] {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut [Rgb; N] {
        &mut self.frame
    }

    /// Commit the stored frame to hardware.
    ///
    /// Gamma correction and brightness attenuation happen here, on an
    /// encode scratch, so the stored frame is untouched. Called at
    /// most once per frame by the scheduler.
    pub fn present<S: PixelSink>(&mut self, sink: &mut S) -> Result<(), SinkError> {
        let brightness = self.brightness;
        for (word, px) in self.scratch.iter_mut().zip(self.frame.iter()) {
            let corrected = self.gamma.correct(*px);
            let attenuated = Rgb {
                r: scale8(corrected.r, brightness),
                g: scale8(corrected.g, brightness),
                b: scale8(corrected.b, brightness),
            };
            *word = self.order.encode(attenuated);
        }
        sink.push(&self.scratch)
    }
}
