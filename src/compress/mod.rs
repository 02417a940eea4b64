//! Compression and checksum primitives behind the PNG encoder.

pub mod adler32;
pub mod crc32;
pub mod deflate;
pub mod huffman;
pub mod lz77;

pub use adler32::adler32;
pub use crc32::{crc32, Crc32};
pub use deflate::{
    deflate, deflate_stored, deflate_zlib, deflate_zlib_with_stats, BlockType, DeflateStats,
};
