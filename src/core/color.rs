use serde::{Deserialize, Serialize};

use crate::error::{DorlingError, DorlingResult};

/// RGBA color in normalized 0..=1 channel values.
///
/// Serialized as a CSS hex token (`#rrggbb`, or `#rrggbbaa` when not opaque).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    /// Sentinel used for values a scale cannot classify (`#cccccc`).
    pub const UNKNOWN: Self = Self::rgb(0.8, 0.8, 0.8);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    #[must_use]
    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self::rgb(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
        )
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(token: &str) -> DorlingResult<Self> {
        let hex = token.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DorlingError::InvalidData(format!(
                "color `{token}` is not a hex token"
            )));
        }

        if hex.len() == 3 {
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            return Self::from_hex(&expanded);
        }
        if hex.len() != 6 && hex.len() != 8 {
            return Err(DorlingError::InvalidData(format!(
                "color `{token}` must have 3, 6 or 8 hex digits"
            )));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map(|v| f64::from(v) / 255.0)
                .map_err(|_| DorlingError::InvalidData(format!("color `{token}` is not a hex token")))
        };
        let alpha = if hex.len() == 8 { channel(6..8)? } else { 1.0 };
        Ok(Self::rgba(channel(0..2)?, channel(2..4)?, channel(4..6)?, alpha))
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        if byte(self.alpha) == 255 {
            format!(
                "#{:02x}{:02x}{:02x}",
                byte(self.red),
                byte(self.green),
                byte(self.blue)
            )
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                byte(self.red),
                byte(self.green),
                byte(self.blue),
                byte(self.alpha)
            )
        }
    }

    /// Same color at 8-bit channel precision; used to compare scale outputs.
    #[must_use]
    pub fn quantized(self) -> Self {
        let q = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() / 255.0;
        Self::rgba(q(self.red), q(self.green), q(self.blue), q(self.alpha))
    }

    pub fn validate(self) -> DorlingResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(DorlingError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<String> for Color {
    type Error = DorlingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_hex()
    }
}
