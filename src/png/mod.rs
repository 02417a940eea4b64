//! Minimal solid-color PNG encoder.
//!
//! Produces truecolor (color type 2), 8-bit, non-interlaced images with
//! exactly three chunk kinds: IHDR, IDAT and IEND. Every scanline uses
//! filter type 0, so the raw data is simply the color repeated.

pub mod chunk;

use log::debug;

use crate::color::Rgb;
use crate::compress::deflate::deflate_zlib_with_stats;
use crate::error::{Error, Result};

/// PNG file signature (magic bytes).
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Maximum supported image dimension.
pub const MAX_DIMENSION: u32 = 1 << 24;

/// Maximum raw (filtered, uncompressed) data size in bytes.
///
/// LZ77 positions are 32-bit, and the raw buffer is held in memory at once.
pub const MAX_RAW_BYTES: usize = 1 << 30;

/// Bytes per pixel for 8-bit RGB.
const BYTES_PER_PIXEL: usize = 3;

/// PNG color type for truecolor without alpha.
const COLOR_TYPE_RGB: u8 = 2;

/// IDAT payloads are split at this size.
const IDAT_CHUNK_SIZE: usize = 256 * 1024;

/// PNG encoding options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngOptions {
    /// Compression level (1-9, default 9).
    pub compression_level: u8,
}

impl Default for PngOptions {
    fn default() -> Self {
        Self::max_compression()
    }
}

impl PngOptions {
    /// Fastest compression.
    pub fn fast() -> Self {
        Self {
            compression_level: 1,
        }
    }

    /// zlib's usual default level.
    pub fn balanced() -> Self {
        Self {
            compression_level: 6,
        }
    }

    /// Highest compression; the default.
    pub fn max_compression() -> Self {
        Self {
            compression_level: 9,
        }
    }
}

/// A width x height canvas filled with one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolidImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Fill color.
    pub color: Rgb,
}

impl SolidImage {
    /// Describe a solid image; dimensions are checked when encoding.
    pub fn new(width: u32, height: u32, color: impl Into<Rgb>) -> Self {
        Self {
            width,
            height,
            color: color.into(),
        }
    }

    /// Square image, as used for icons.
    pub fn square(size: u32, color: impl Into<Rgb>) -> Self {
        Self::new(size, size, color)
    }

    /// Encode with default options.
    pub fn encode(&self) -> Result<Vec<u8>> {
        self.encode_with_options(&PngOptions::default())
    }

    /// Encode with custom options.
    pub fn encode_with_options(&self, options: &PngOptions) -> Result<Vec<u8>> {
        encode_with_options(self.width, self.height, self.color, options)
    }
}

/// Encode a solid-color image as PNG.
///
/// # Arguments
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `color` - Fill color, e.g. `[37, 99, 235]` or an [`Rgb`]
///
/// # Returns
/// Complete PNG file as bytes.
pub fn encode(width: u32, height: u32, color: impl Into<Rgb>) -> Result<Vec<u8>> {
    encode_with_options(width, height, color, &PngOptions::default())
}

/// Encode a solid-color image as PNG with custom options.
pub fn encode_with_options(
    width: u32,
    height: u32,
    color: impl Into<Rgb>,
    options: &PngOptions,
) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    encode_into(&mut output, width, height, color, options)?;
    Ok(output)
}

/// Encode a solid-color image into a caller-provided buffer.
///
/// The `output` buffer is cleared before writing, so one allocation can be
/// reused across encodes.
pub fn encode_into(
    output: &mut Vec<u8>,
    width: u32,
    height: u32,
    color: impl Into<Rgb>,
    options: &PngOptions,
) -> Result<()> {
    let color = color.into();
    let raw_len = validate(width, height, options)?;

    let raw = try_raw_scanlines(width, height, color, raw_len)?;

    let (compressed, stats) = deflate_zlib_with_stats(&raw, options.compression_level);
    debug!(
        "encoded {width}x{height} {color}: {} raw -> {} zlib bytes ({:?}, {} matches, {} literals)",
        raw.len(),
        compressed.len(),
        stats.block_type,
        stats.match_count,
        stats.literal_count,
    );

    output.clear();
    output.reserve(PNG_SIGNATURE.len() + 3 * chunk::CHUNK_OVERHEAD + 13 + compressed.len());
    output.extend_from_slice(&PNG_SIGNATURE);
    write_ihdr(output, width, height);
    write_idat_chunks(output, &compressed);
    write_iend(output);
    Ok(())
}

/// Raw (unfiltered, uncompressed) image data: each row is a zero filter
/// byte followed by `width` copies of the color.
///
/// The result is `height * (1 + 3 * width)` bytes long.
///
/// Allocation failure aborts, as with any `Vec`. The encoder checks the
/// size against [`MAX_RAW_BYTES`] first and returns
/// [`Error::ImageTooLarge`] instead.
pub fn raw_scanlines(width: u32, height: u32, color: impl Into<Rgb>) -> Vec<u8> {
    let row = scanline(width, color.into());
    row.repeat(height as usize)
}

fn scanline(width: u32, color: Rgb) -> Vec<u8> {
    let pixel = color.to_bytes();
    let mut row = Vec::with_capacity(1 + BYTES_PER_PIXEL * width as usize);
    row.push(0); // filter type: None
    for _ in 0..width {
        row.extend_from_slice(&pixel);
    }
    row
}

/// Like [`raw_scanlines`], but a failed allocation is an error.
fn try_raw_scanlines(width: u32, height: u32, color: Rgb, raw_len: usize) -> Result<Vec<u8>> {
    let too_large = || Error::ImageTooLarge {
        width,
        height,
        max: MAX_DIMENSION,
    };
    let row = scanline(width, color);

    let mut raw = Vec::new();
    raw.try_reserve_exact(raw_len).map_err(|_| too_large())?;
    for _ in 0..height {
        raw.extend_from_slice(&row);
    }
    debug_assert_eq!(raw.len(), raw_len);
    Ok(raw)
}

/// Check dimensions and options; returns the raw data length.
fn validate(width: u32, height: u32, options: &PngOptions) -> Result<usize> {
    if !(1..=9).contains(&options.compression_level) {
        return Err(Error::InvalidCompressionLevel(options.compression_level));
    }

    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }

    let too_large = Error::ImageTooLarge {
        width,
        height,
        max: MAX_DIMENSION,
    };
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(too_large);
    }

    (width as usize)
        .checked_mul(BYTES_PER_PIXEL)
        .and_then(|row| row.checked_add(1))
        .and_then(|row| row.checked_mul(height as usize))
        .filter(|&len| len <= MAX_RAW_BYTES)
        .ok_or(too_large)
}

/// Write IHDR (image header) chunk.
fn write_ihdr(output: &mut Vec<u8>, width: u32, height: u32) {
    let mut ihdr = [0u8; 13];
    ihdr[0..4].copy_from_slice(&width.to_be_bytes());
    ihdr[4..8].copy_from_slice(&height.to_be_bytes());
    ihdr[8] = 8; // bit depth
    ihdr[9] = COLOR_TYPE_RGB;
    ihdr[10] = 0; // compression: deflate
    ihdr[11] = 0; // filter method: adaptive
    ihdr[12] = 0; // interlace: none
    chunk::write_chunk(output, b"IHDR", &ihdr);
}

/// Write IDAT (image data) chunks.
fn write_idat_chunks(output: &mut Vec<u8>, compressed: &[u8]) {
    for part in compressed.chunks(IDAT_CHUNK_SIZE) {
        chunk::write_chunk(output, b"IDAT", part);
    }
}

/// Write IEND (image end) chunk.
fn write_iend(output: &mut Vec<u8>) {
    chunk::write_chunk(output, b"IEND", &[]);
}

#[cfg(test)]
mod tests {
    use super::chunk::ChunkReader;
    use super::*;

    #[test]
    fn test_encode_1x1_red() {
        let png = encode(1, 1, [255, 0, 0]).unwrap();

        assert_eq!(&png[0..8], &PNG_SIGNATURE);
        // IHDR of a 1x1 RGB image is a well-known byte sequence.
        assert_eq!(
            &png[8..33],
            &[
                0, 0, 0, 13, b'I', b'H', b'D', b'R', 0, 0, 0, 1, 0, 0, 0, 1, 8, 2, 0, 0, 0, 0x90,
                0x77, 0x53, 0xDE
            ]
        );
        assert_eq!(
            &png[png.len() - 12..],
            &[0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]
        );
    }

    #[test]
    fn test_raw_scanlines_layout() {
        let raw = raw_scanlines(2, 2, Rgb::new(1, 2, 3));
        assert_eq!(raw, vec![0, 1, 2, 3, 1, 2, 3, 0, 1, 2, 3, 1, 2, 3]);
        assert_eq!(raw_scanlines(192, 5, Rgb::BRAND_BLUE).len(), 5 * (1 + 3 * 192));
    }

    #[test]
    fn test_chunk_order() {
        let png = encode(16, 8, Rgb::BRAND_BLUE).unwrap();
        let kinds: Vec<String> = ChunkReader::new(&png)
            .unwrap()
            .map(|c| c.unwrap().kind_str())
            .collect();
        assert_eq!(kinds, ["IHDR", "IDAT", "IEND"]);
    }

    #[test]
    fn test_encode_invalid_dimensions() {
        assert!(matches!(
            encode(0, 1, [0, 0, 0]),
            Err(Error::InvalidDimensions { width: 0, height: 1 })
        ));
        assert!(matches!(
            encode(3, 0, [0, 0, 0]),
            Err(Error::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_encode_too_large() {
        assert!(matches!(
            encode(MAX_DIMENSION + 1, 1, [0, 0, 0]),
            Err(Error::ImageTooLarge { .. })
        ));
    }

    #[test]
    fn test_encode_raw_size_limit() {
        // Both dimensions are in range but the raw data is ~800 TB.
        assert!(matches!(
            encode(MAX_DIMENSION, MAX_DIMENSION, [1, 2, 3]),
            Err(Error::ImageTooLarge { .. })
        ));
        // 1 + 3 * 20000 = 60001 bytes per row; 20000 rows is just over 1 GiB.
        assert!(matches!(
            encode(20_000, 20_000, [1, 2, 3]),
            Err(Error::ImageTooLarge { width: 20_000, height: 20_000, .. })
        ));
        assert_eq!(
            validate(MAX_DIMENSION, 1, &PngOptions::default()).unwrap(),
            1 + 3 * MAX_DIMENSION as usize
        );
    }

    #[test]
    fn test_idat_split() {
        let payload: Vec<u8> = (0..600 * 1024).map(|i| (i % 251) as u8).collect();
        let mut out = Vec::new();
        write_idat_chunks(&mut out, &payload);

        let mut pos = 0;
        let mut lengths = Vec::new();
        let mut joined = Vec::new();
        while pos < out.len() {
            let len = u32::from_be_bytes(out[pos..pos + 4].try_into().unwrap()) as usize;
            assert_eq!(&out[pos + 4..pos + 8], b"IDAT");
            let data = &out[pos + 8..pos + 8 + len];
            let crc = &out[pos + 8 + len..pos + 12 + len];
            let stored = u32::from_be_bytes(crc.try_into().unwrap());
            assert_eq!(stored, chunk::chunk_crc(b"IDAT", data));
            lengths.push(len);
            joined.extend_from_slice(data);
            pos += chunk::CHUNK_OVERHEAD + len;
        }

        assert_eq!(pos, out.len());
        assert_eq!(lengths, [IDAT_CHUNK_SIZE, IDAT_CHUNK_SIZE, 600 * 1024 - 2 * IDAT_CHUNK_SIZE]);
        assert_eq!(joined, payload);
    }

    #[test]
    fn test_invalid_compression_level() {
        for level in [0, 10, 255] {
            let opts = PngOptions {
                compression_level: level,
            };
            assert!(matches!(
                encode_with_options(1, 1, [0, 0, 0], &opts),
                Err(Error::InvalidCompressionLevel(l)) if l == level
            ));
        }
    }

    #[test]
    fn test_encode_into_reuses_buffer() {
        let mut output = Vec::with_capacity(64);
        encode_into(&mut output, 1, 1, [0, 0, 0], &PngOptions::default()).unwrap();
        let first = output.clone();

        encode_into(&mut output, 1, 1, [255, 0, 0], &PngOptions::default()).unwrap();
        assert_ne!(first, output, "buffer should have been rewritten");
        assert_eq!(&output[0..8], &PNG_SIGNATURE);
        assert_eq!(output, encode(1, 1, [255, 0, 0]).unwrap());
    }

    #[test]
    fn test_solid_image_matches_free_function() {
        let img = SolidImage::square(32, Rgb::BRAND_BLUE);
        assert_eq!(img.encode().unwrap(), encode(32, 32, [37, 99, 235]).unwrap());
        assert_eq!(
            img.encode_with_options(&PngOptions::fast()).unwrap(),
            encode_with_options(32, 32, Rgb::BRAND_BLUE, &PngOptions::fast()).unwrap()
        );
    }

    #[test]
    fn test_presets() {
        assert_eq!(PngOptions::default(), PngOptions::max_compression());
        assert_eq!(PngOptions::fast().compression_level, 1);
        assert_eq!(PngOptions::balanced().compression_level, 6);
    }
}
