//! Write-only view an effect draws through.
//!
//! Binds a pixel map to the stored frame for the duration of one tick.
//! Effects only ever write; physical pixels outside the map's image
//! keep their previous color.

use crate::color::Rgb;
use crate::pixel_map::PixelMap;

pub struct Canvas<'a> {
    frame: &'a mut [Rgb],
    map: PixelMap,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [Rgb], map: PixelMap) -> Self {
        Self { frame, map }
    }

    /// Logical length of the bound map.
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Write the pixel at logical position `i`.
    #[inline]
    pub fn set(&mut self, i: usize, c: Rgb) {
        self.frame[self.map.physical(i)] = c;
    }

    /// Fill every mapped pixel.
    pub fn fill(&mut self, c: Rgb) {
        for i in 0..self.map.len() {
            self.frame[self.map.physical(i)] = c;
        }
    }
}
