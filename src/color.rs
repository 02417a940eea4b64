//! RGB color triple and hex parsing.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Brand blue used for the default icon set (`#2563eb`).
    pub const BRAND_BLUE: Rgb = Rgb::new(37, 99, 235);

    /// Create a color from its channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels in PNG sample order.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Parse `#rrggbb`, `rrggbb`, `#rgb` or `rgb` (case-insensitive).
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidColor(s.to_string());
        let digits = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if !digits.is_ascii() {
            return Err(invalid());
        }

        let nibble = |c: u8| (c as char).to_digit(16).map(|d| d as u8);
        let bytes = digits.as_bytes();
        match bytes.len() {
            6 => {
                let mut out = [0u8; 3];
                for (i, pair) in bytes.chunks_exact(2).enumerate() {
                    let hi = nibble(pair[0]).ok_or_else(invalid)?;
                    let lo = nibble(pair[1]).ok_or_else(invalid)?;
                    out[i] = hi << 4 | lo;
                }
                Ok(Self::from(out))
            }
            3 => {
                let mut out = [0u8; 3];
                for (i, &c) in bytes.iter().enumerate() {
                    // #abc expands to #aabbcc
                    out[i] = nibble(c).ok_or_else(invalid)? * 0x11;
                }
                Ok(Self::from(out))
            }
            _ => Err(invalid()),
        }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        c.to_bytes()
    }
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_form() {
        assert_eq!("#2563eb".parse::<Rgb>().unwrap(), Rgb::BRAND_BLUE);
        assert_eq!("2563EB".parse::<Rgb>().unwrap(), Rgb::BRAND_BLUE);
        assert_eq!(Rgb::from_hex(" #ff0000 ").unwrap(), Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_parse_short_form() {
        assert_eq!(Rgb::from_hex("#fff").unwrap(), Rgb::new(255, 255, 255));
        assert_eq!(Rgb::from_hex("0a3").unwrap(), Rgb::new(0x00, 0xAA, 0x33));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "#", "#12345", "#1234567", "#gg0000", "zzz", "#ééé"] {
            assert!(
                matches!(Rgb::from_hex(bad), Err(Error::InvalidColor(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_roundtrip() {
        let c = Rgb::new(1, 0x20, 0xFF);
        assert_eq!(c.to_string(), "#0120ff");
        assert_eq!(c.to_string().parse::<Rgb>().unwrap(), c);
    }

    #[test]
    fn test_byte_order() {
        assert_eq!(Rgb::BRAND_BLUE.to_bytes(), [37, 99, 235]);
        assert_eq!(<[u8; 3]>::from(Rgb::from([9, 8, 7])), [9, 8, 7]);
    }
}
