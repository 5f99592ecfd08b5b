//! Hex color parsing for dark/light module colors.

use std::fmt;
use std::str::FromStr;

use image::Rgba;

use crate::render::EncodingError;

/// An RGBA color parsed from `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl HexColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }

    /// CSS notation for SVG attributes; alpha is only written when not opaque.
    pub fn to_css(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 0xff {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl FromStr for HexColor {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EncodingError::InvalidColor(s.to_string());

        let hex = s.strip_prefix('#').unwrap_or(s);
        if !hex.is_ascii() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        // Short forms double every digit: "f80" -> "ff8800".
        let expanded: String = match hex.len() {
            3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => hex.to_string(),
            _ => return Err(invalid()),
        };

        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid());
        let a = if expanded.len() == 8 { channel(6)? } else { 0xff };

        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a,
        })
    }
}
