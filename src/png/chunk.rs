//! PNG chunk writing and CRC-checked chunk reading.

use crate::compress::crc32::Crc32;
use crate::error::{Error, Result};

use super::PNG_SIGNATURE;

/// Length, type and CRC fields around every payload.
pub const CHUNK_OVERHEAD: usize = 12;

/// Write a PNG chunk (length, type, data, CRC32) to the output buffer.
pub fn write_chunk(output: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    output.reserve(CHUNK_OVERHEAD + data.len());

    output.extend_from_slice(&(data.len() as u32).to_be_bytes());
    output.extend_from_slice(chunk_type);
    output.extend_from_slice(data);
    output.extend_from_slice(&chunk_crc(chunk_type, data).to_be_bytes());
}

/// CRC-32 over a chunk's type tag followed by its payload.
#[must_use]
pub fn chunk_crc(chunk_type: &[u8; 4], data: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(chunk_type);
    crc.update(data);
    crc.finalize()
}

/// A chunk borrowed from an encoded PNG stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Four-byte type tag, e.g. `IHDR`.
    pub kind: [u8; 4],
    /// Payload bytes.
    pub data: &'a [u8],
    /// CRC stored in the stream.
    pub crc: u32,
    /// Offset of the chunk's length field in the stream.
    pub offset: usize,
}

impl Chunk<'_> {
    /// Type tag as text (lossy for non-ASCII tags).
    pub fn kind_str(&self) -> String {
        String::from_utf8_lossy(&self.kind).into_owned()
    }

    /// Whether the stored CRC matches one recomputed over type and payload.
    pub fn crc_matches(&self) -> bool {
        chunk_crc(&self.kind, self.data) == self.crc
    }
}

/// Iterator over the chunks of a PNG byte stream.
///
/// Each item is CRC-checked; iteration stops after the first error.
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> ChunkReader<'a> {
    /// Start reading `bytes`, which must begin with the PNG signature.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        if !bytes.starts_with(&PNG_SIGNATURE) {
            return Err(Error::InvalidSignature);
        }
        Ok(Self {
            bytes,
            pos: PNG_SIGNATURE.len(),
            failed: false,
        })
    }

    fn read_chunk(&mut self) -> Result<Chunk<'a>> {
        let offset = self.pos;
        let rest = &self.bytes[offset..];
        if rest.len() < CHUNK_OVERHEAD {
            return Err(Error::Truncated { offset });
        }

        let len = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
        let Some(total) = len.checked_add(CHUNK_OVERHEAD).filter(|&t| t <= rest.len()) else {
            return Err(Error::Truncated { offset });
        };

        let kind = [rest[4], rest[5], rest[6], rest[7]];
        let data = &rest[8..8 + len];
        let crc_bytes = &rest[8 + len..total];
        let crc = u32::from_be_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);

        let chunk = Chunk {
            kind,
            data,
            crc,
            offset,
        };
        if !chunk.crc_matches() {
            return Err(Error::CrcMismatch {
                kind: chunk.kind_str(),
                stored: crc,
                computed: chunk_crc(&kind, data),
            });
        }

        self.pos += total;
        Ok(chunk)
    }
}

impl<'a> Iterator for ChunkReader<'a> {
    type Item = Result<Chunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.bytes.len() {
            return None;
        }
        let item = self.read_chunk();
        self.failed = item.is_err();
        Some(item)
    }
}
