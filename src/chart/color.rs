use std::fmt;

use serde::{Serialize, Serializer};

/// ColorBrewer YlOrRd, the continuous scale used for per-capita emissions.
const YL_OR_RD: [(u8, u8, u8); 9] = [
    (0xff, 0xff, 0xcc),
    (0xff, 0xed, 0xa0),
    (0xfe, 0xd9, 0x76),
    (0xfe, 0xb2, 0x4c),
    (0xfd, 0x8d, 0x3c),
    (0xfc, 0x4e, 0x2a),
    (0xe3, 0x1a, 0x1c),
    (0xbd, 0x00, 0x26),
    (0x80, 0x00, 0x26),
];

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Samples the YlOrRd scale at `t` in `[0, 1]` (clamped), interpolating linearly
    /// between stops.
    pub fn yl_or_rd(t: f64) -> Self {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = t * (YL_OR_RD.len() - 1) as f64;
        let lower = scaled.floor() as usize;
        let upper = (lower + 1).min(YL_OR_RD.len() - 1);
        let frac = scaled - lower as f64;

        let (r0, g0, b0) = YL_OR_RD[lower];
        let (r1, g1, b1) = YL_OR_RD[upper];
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;

        Self::new(mix(r0, r1), mix(g0, g1), mix(b0, b1))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
