use enough::StopReason;

use crate::png::ColorType;

/// Errors from PNG decoding/encoding and pixel-buffer operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CodecError {
    #[error("not a PNG: bad signature")]
    BadSignature,

    #[error("crc mismatch in {chunk} chunk: stored {stored:#010x}, computed {computed:#010x}")]
    CrcMismatch {
        chunk: &'static str,
        stored: u32,
        computed: u32,
    },

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("unsupported bit depth {0} (only 8 is supported)")]
    UnsupportedBitDepth(u8),

    #[error("unsupported color type {0}")]
    UnsupportedColorType(u8),

    #[error("interlaced PNG is not supported")]
    Interlaced,

    #[error("missing {0} chunk")]
    MissingChunk(&'static str),

    #[error("invalid zlib stream: {0}")]
    InvalidZlib(String),

    #[error("inflate failed: {0}")]
    Inflate(String),

    #[error("adler-32 mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    AdlerMismatch { stored: u32, computed: u32 },

    #[error("invalid filter type {filter} on row {row}")]
    InvalidFilter { filter: u8, row: usize },

    #[error("pixel data truncated: need {needed} bytes, got {actual}")]
    TruncatedData { needed: usize, actual: usize },

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error(
        "pixel buffer length {actual} does not match {width}x{height} {layout:?} (expected {expected})"
    )]
    BufferMismatch {
        width: u32,
        height: u32,
        layout: ColorType,
        expected: usize,
        actual: usize,
    },

    #[error("invalid scale factor {0}: must be finite and positive")]
    InvalidScale(f64),

    #[error("scaling {width}x{height} by {scale} yields an empty image")]
    EmptyScaleOutput { width: u32, height: u32, scale: f64 },

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for CodecError {
    fn from(r: StopReason) -> Self {
        CodecError::Cancelled(r)
    }
}
