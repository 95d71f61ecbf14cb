use cgmath::Vector4;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

macro_rules! palette {
    ($($name:ident = $r:literal, $g:literal, $b:literal;)*) => {
        $(
            pub const $name: Color = Color {
                r: $r as f32 / 255.,
                g: $g as f32 / 255.,
                b: $b as f32 / 255.,
                a: 1.,
            };
        )*
    };
}

// manim's default palette
palette! {
    WHITE = 0xFF, 0xFF, 0xFF;
    BLACK = 0x00, 0x00, 0x00;
    GRAY = 0x88, 0x88, 0x88;
    BLUE = 0x58, 0xC4, 0xDD;
    BLUE_E = 0x1C, 0x75, 0x8A;
    RED = 0xFC, 0x62, 0x55;
    GREEN = 0x83, 0xC1, 0x67;
    YELLOW = 0xFF, 0xFF, 0x00;
    ORANGE = 0xFF, 0x86, 0x2F;
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#rrggbb` or `#rrggbbaa`, the leading `#` being optional.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let invalid = || Error::InvalidColor(hex.to_string());
        let digits = hex.trim().trim_start_matches('#');
        let hex_digits = digits.bytes().all(|b| b.is_ascii_hexdigit());
        if !matches!(digits.len(), 6 | 8) || !hex_digits {
            return Err(invalid());
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map(|c| c as f32 / 255.)
                .map_err(|_| invalid())
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if digits.len() == 8 { channel(6)? } else { 1. },
        })
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Exact at both ends.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        (Vector4::from(self) * (1. - t) + Vector4::from(other) * t).into()
    }

    /// Converts the color channels from sRGB to linear space, for sRGB render targets.
    pub fn to_linear(self) -> Self {
        let f = |c: f32| {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        Self {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
            a: self.a,
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Color> for Vector4<f32> {
    fn from(c: Color) -> Self {
        Vector4::new(c.r, c.g, c.b, c.a)
    }
}

impl From<Vector4<f32>> for Color {
    fn from(v: Vector4<f32>) -> Self {
        Self::rgba(v.x, v.y, v.z, v.w)
    }
}

impl From<Color> for wgpu::Color {
    fn from(c: Color) -> Self {
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: c.a as f64,
        }
    }
}

impl std::str::FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_background_hex() {
        let c = Color::from_hex("#1e1e1e").unwrap();
        assert!((c.r - 30. / 255.).abs() < 1e-6);
        assert_eq!(c.r, c.g);
        assert_eq!(c.a, 1.);
    }

    #[test]
    fn parses_alpha_and_missing_hash() {
        let c = Color::from_hex("FC625580").unwrap();
        assert_eq!(c.with_alpha(1.), RED);
        assert!((c.a - 128. / 255.).abs() < 1e-6);
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#zzzzzz").is_err());
        assert!(Color::from_hex("").is_err());
        assert!(Color::from_hex("#+1+1+1").is_err());
        assert!(Color::from_hex("-1-1-1").is_err());
    }

    #[test]
    fn lerp_midpoint() {
        let c = BLACK.lerp(WHITE, 0.5);
        assert!((c.r - 0.5).abs() < 1e-6);
        assert_eq!(c.a, 1.);
    }

    #[test]
    fn linear_conversion_keeps_extremes() {
        assert!((WHITE.to_linear().r - 1.).abs() < 1e-5);
        assert_eq!(BLACK.to_linear(), BLACK);
        assert!(GRAY.to_linear().r < GRAY.r);
    }
}
