//! # swatch
//!
//! Solid-color placeholder PNG generation with no image-library dependency.
//!
//! The PNG container, the zlib/DEFLATE compressor and the checksums are
//! all implemented here, which keeps the output byte-exact and small: a
//! 512x512 icon of one color compresses to a few hundred bytes.
//!
//! ## Example
//!
//! ```rust
//! use swatch::{png, Rgb};
//!
//! // 1x1 red pixel
//! let red = png::encode(1, 1, [255, 0, 0]).unwrap();
//! assert_eq!(&red[..8], b"\x89PNG\r\n\x1a\n");
//!
//! // 192x192 icon in #2563eb
//! let blue: Rgb = "#2563eb".parse().unwrap();
//! let icon = png::encode(192, 192, blue).unwrap();
//! assert!(icon.len() < 2048);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bits;
pub mod color;
pub mod compress;
pub mod error;
pub mod icons;
pub mod png;

pub use color::Rgb;
pub use error::{Error, Result};
pub use icons::{GeneratedIcon, IconSet, IconSpec};
pub use png::{PngOptions, SolidImage};
