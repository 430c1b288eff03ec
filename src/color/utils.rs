//! RGB/HSV conversion and color helpers.
//!
//! The conversion pair uses the integer sector algorithm (six 43-wide
//! hue regions) rather than a rainbow-weighted wheel, so that
//! `rgb_to_hsv(hsv_to_rgb(c))` recovers `c` within one quantum per
//! channel for any saturated, non-black input.

use super::{Hsv, Rgb};
use crate::math8::blend8;

pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
pub const WHITE: Rgb = Rgb {
    r: 255,
    g: 255,
    b: 255,
};
pub const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
pub const GREEN: Rgb = Rgb { r: 0, g: 255, b: 0 };
pub const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };
pub const CYAN: Rgb = Rgb {
    r: 0,
    g: 255,
    b: 255,
};
pub const MAGENTA: Rgb = Rgb {
    r: 255,
    g: 0,
    b: 255,
};
pub const ORANGE: Rgb = Rgb {
    r: 255,
    g: 40,
    b: 0,
};
pub const AMBER: Rgb = Rgb {
    r: 255,
    g: 100,
    b: 0,
};

/// Convert HSV to RGB using integer sector math.
#[allow(clippy::cast_possible_truncation, clippy::many_single_char_names)]
pub fn hsv_to_rgb(c: Hsv) -> Rgb {
    let v = u16::from(c.val);
    let s = u16::from(c.sat);

    if s == 0 {
        return Rgb {
            r: c.val,
            g: c.val,
            b: c.val,
        };
    }

    let region = (c.hue / 43).min(5);
    let remainder = u16::from(c.hue - region * 43) * 6;

    let p = ((v * (255 - s)) / 255) as u8;
    let q = ((v * (255 - (s * remainder) / 255)) / 255) as u8;
    let t = ((v * (255 - (s * (255 - remainder)) / 255)) / 255) as u8;
    let v = c.val;

    match region {
        0 => Rgb { r: v, g: t, b: p },
        1 => Rgb { r: q, g: v, b: p },
        2 => Rgb { r: p, g: v, b: t },
        3 => Rgb { r: p, g: q, b: v },
        4 => Rgb { r: t, g: p, b: v },
        _ => Rgb { r: v, g: p, b: q },
    }
}

/// Convert RGB back to HSV. Inverse of [`hsv_to_rgb`].
#[allow(clippy::cast_possible_truncation)]
pub fn rgb_to_hsv(c: Rgb) -> Hsv {
    let max = c.r.max(c.g).max(c.b);
    let min = c.r.min(c.g).min(c.b);
    let delta = u16::from(max - min);

    if max == 0 || delta == 0 {
        return Hsv {
            hue: 0,
            sat: 0,
            val: max,
        };
    }

    let sat = ((delta * 255) / u16::from(max)) as u8;

    // Fraction of the sector occupied by the middle channel, 0-255.
    let rise = |mid: u8| (u16::from(mid - min) * 255) / delta;

    let (region, remainder) = if c.r == max {
        if c.g >= c.b {
            (0u16, rise(c.g))
        } else {
            (5, 255 - rise(c.b))
        }
    } else if c.g == max {
        if c.r >= c.b {
            (1, 255 - rise(c.r))
        } else {
            (2, rise(c.b))
        }
    } else if c.g >= c.r {
        (3, 255 - rise(c.g))
    } else {
        (4, rise(c.r))
    };

    let hue = (region * 43 + remainder / 6) as u8;

    Hsv {
        hue,
        sat,
        val: max,
    }
}

/// Blend two RGB colors
///
/// `amount_of_b` = 0 yields `a`, 255 yields `b`.
#[inline]
pub fn blend_colors(a: Rgb, b: Rgb, amount_of_b: u8) -> Rgb {
    Rgb {
        r: blend8(a.r, b.r, amount_of_b),
        g: blend8(a.g, b.g, amount_of_b),
        b: blend8(a.b, b.b, amount_of_b),
    }
}

/// Create an RGB color from a u32 value (0xRRGGBB format)
pub const fn rgb_from_u32(color: u32) -> Rgb {
    Rgb {
        r: ((color >> 16) & 0xFF) as u8,
        g: ((color >> 8) & 0xFF) as u8,
        b: (color & 0xFF) as u8,
    }
}
