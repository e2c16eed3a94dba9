use std::fmt;
use std::str::FromStr;

use egui::Color32;
use serde::{Deserialize, Serialize};

/// A brush color as unmultiplied RGBA.
///
/// Unlike `Color32` (premultiplied) this keeps the exact channel values it
/// was created with, so a color picked or parsed from a palette tag renders
/// with the same bits it came in with.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color tag {:?}: expected #RRGGBB or #AARRGGBB", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl Color {
    pub const BLACK: Color = Color::from_rgb(0, 0, 0);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Packed `0xAARRGGBB`, the layout color pickers usually hand back.
    pub const fn from_argb_u32(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    pub const fn to_argb_u32(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Parse a palette tag: `#RRGGBB` (opaque) or `#AARRGGBB`.
    pub fn from_hex(tag: &str) -> Result<Self, ParseColorError> {
        let err = || ParseColorError(tag.to_owned());
        let digits = tag.trim().strip_prefix('#').ok_or_else(err)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let value = u32::from_str_radix(digits, 16).map_err(|_| err())?;
        match digits.len() {
            6 => Ok(Self::from_argb_u32(0xFF00_0000 | value)),
            8 => Ok(Self::from_argb_u32(value)),
            _ => Err(err()),
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
        }
    }

    pub fn r(self) -> u8 {
        self.r
    }

    pub fn g(self) -> u8 {
        self.g
    }

    pub fn b(self) -> u8 {
        self.b
    }

    pub fn a(self) -> u8 {
        self.a
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    pub fn to_color32(self) -> Color32 {
        Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }

    /// Only exact for opaque colors, which is all the egui picker produces.
    pub fn from_color32(color: Color32) -> Self {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        Self { r, g, b, a }
    }

    pub fn to_rgba8(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({})", self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}
