//! Error types for the swatch library.

use std::path::PathBuf;

/// Result type alias for swatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding, inspecting or writing images.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid image dimensions (zero width or height).
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },
    /// Image exceeds the maximum dimension or the raw data size limit.
    #[error("Image {width}x{height} is too large (max dimension {max}, max raw data 1 GiB)")]
    ImageTooLarge {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
        /// Maximum supported dimension.
        max: u32,
    },
    /// Compression level outside 1-9.
    #[error("Invalid compression level {0}: must be 1-9")]
    InvalidCompressionLevel(u8),
    /// A color string that is not `#rgb` or `#rrggbb`.
    #[error("Invalid color {0:?}: expected #rrggbb or #rgb")]
    InvalidColor(String),
    /// Input does not start with the PNG signature.
    #[error("Missing PNG signature")]
    InvalidSignature,
    /// Input ended in the middle of a chunk.
    #[error("Truncated PNG stream at offset {offset}")]
    Truncated {
        /// Byte offset where the truncated chunk starts.
        offset: usize,
    },
    /// Stored chunk CRC does not match the recomputed one.
    #[error("CRC mismatch in {kind} chunk: stored {stored:#010x}, computed {computed:#010x}")]
    CrcMismatch {
        /// Chunk type tag, lossily decoded.
        kind: String,
        /// CRC found in the stream.
        stored: u32,
        /// CRC recomputed over type and payload.
        computed: u32,
    },
    /// Icon manifest could not be parsed.
    #[error("Invalid icon manifest: {0}")]
    Manifest(String),
    /// Filesystem failure while reading or writing `path`.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
