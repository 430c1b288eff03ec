mod palette;
mod utils;

pub use palette::{Palette, PaletteError};
use smart_leds::RGB8;
pub use utils::{
    AMBER, BLACK, BLUE, CYAN, GREEN, MAGENTA, ORANGE, RED, WHITE, blend_colors, hsv_to_rgb,
    rgb_from_u32, rgb_to_hsv,
};

pub type Rgb = RGB8;

/// HSV color on the 8-bit circle.
///
/// Hue 0-255 maps H in [0, 1) with wraparound; saturation and value are
/// 0-255. Conversion to RGB uses the sector algorithm in
/// [`hsv_to_rgb`], which round-trips with [`rgb_to_hsv`] within one
/// 8-bit quantum per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hsv {
    pub hue: u8,
    pub sat: u8,
    pub val: u8,
}

impl Hsv {
    pub const fn new(hue: u8, sat: u8, val: u8) -> Self {
        Self { hue, sat, val }
    }
}
