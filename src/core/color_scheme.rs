use serde::{Deserialize, Serialize};

use super::Color;

/// Named diverging color schemes (11-class ColorBrewer ramps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ColorScheme {
    #[default]
    #[serde(alias = "interpolateRdYlBu")]
    RdYlBu,
    #[serde(alias = "interpolateRdBu")]
    RdBu,
    #[serde(alias = "interpolateSpectral")]
    Spectral,
    #[serde(alias = "interpolateRdYlGn")]
    RdYlGn,
    #[serde(alias = "interpolateBrBG")]
    BrBG,
    #[serde(alias = "interpolatePiYG")]
    PiYG,
}

const RD_YL_BU: [u32; 11] = [
    0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee090, 0xffffbf, 0xe0f3f8, 0xabd9e9, 0x74add1,
    0x4575b4, 0x313695,
];
const RD_BU: [u32; 11] = [
    0x67001f, 0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xf7f7f7, 0xd1e5f0, 0x92c5de, 0x4393c3,
    0x2166ac, 0x053061,
];
const SPECTRAL: [u32; 11] = [
    0x9e0142, 0xd53e4f, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xe6f598, 0xabdda4, 0x66c2a5,
    0x3288bd, 0x5e4fa2,
];
const RD_YL_GN: [u32; 11] = [
    0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xd9ef8b, 0xa6d96a, 0x66bd63,
    0x1a9850, 0x006837,
];
const BR_BG: [u32; 11] = [
    0x543005, 0x8c510a, 0xbf812d, 0xdfc27d, 0xf6e8c3, 0xf5f5f5, 0xc7eae5, 0x80cdc1, 0x35978f,
    0x01665e, 0x003c30,
];
const PI_YG: [u32; 11] = [
    0x8e0152, 0xc51b7d, 0xde77ae, 0xf1b6da, 0xfde0ef, 0xf7f7f7, 0xe6f5d0, 0xb8e186, 0x7fbc41,
    0x4d9221, 0x276419,
];

impl ColorScheme {
    fn ramp(self) -> &'static [u32; 11] {
        match self {
            Self::RdYlBu => &RD_YL_BU,
            Self::RdBu => &RD_BU,
            Self::Spectral => &SPECTRAL,
            Self::RdYlGn => &RD_YL_GN,
            Self::BrBG => &BR_BG,
            Self::PiYG => &PI_YG,
        }
    }

    /// Samples the scheme at `t` in `[0, 1]` (clamped; NaN maps to the midpoint).
    ///
    /// Channels follow a uniform cubic B-spline through the ramp stops and are
    /// rounded to 8-bit precision.
    #[must_use]
    pub fn interpolate(self, t: f64) -> Color {
        let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
        let ramp = self.ramp();
        let channel = |shift: u32| -> f64 {
            let stops: [f64; 11] = std::array::from_fn(|i| f64::from((ramp[i] >> shift) & 0xff));
            basis_spline(&stops, t).clamp(0.0, 255.0).round() / 255.0
        };
        Color::rgb(channel(16), channel(8), channel(0))
    }
}

fn basis_spline(values: &[f64], t: f64) -> f64 {
    let n = values.len() - 1;
    let i = if t >= 1.0 {
        n - 1
    } else {
        ((t * n as f64).floor() as usize).min(n - 1)
    };
    let v1 = values[i];
    let v2 = values[i + 1];
    let v0 = if i > 0 { values[i - 1] } else { 2.0 * v1 - v2 };
    let v3 = if i + 2 <= n {
        values[i + 2]
    } else {
        2.0 * v2 - v1
    };
    let t1 = (t - i as f64 / n as f64) * n as f64;
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    ((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}
