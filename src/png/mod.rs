//! From-scratch PNG codec: CRC-checked chunk framing, zlib container
//! handling, scanline filter reconstruction, RGBA expansion.
//!
//! The decoder accepts 8-bit grayscale, grayscale+alpha, RGB, and RGBA,
//! non-interlaced only, and fails fast on any signature, CRC, or stream
//! error — no partial recovery. The encoder emits RGBA8.

pub(crate) mod checksum;
pub(crate) mod chunk;
pub(crate) mod decode;
pub(crate) mod encode;
pub(crate) mod filter;
pub(crate) mod zlib;

pub use checksum::{adler32, crc32};

use enough::Stop;

use crate::limits::Limits;
use crate::pixel::RasterImage;
use crate::CodecError;

/// PNG color types this codec decodes. Everything widens to RGBA8 in
/// memory.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorType {
    /// Color type 0 — single channel.
    Gray,
    /// Color type 2 — three channels.
    Rgb,
    /// Color type 4 — gray + alpha.
    GrayAlpha,
    /// Color type 6 — four channels.
    Rgba,
}

impl ColorType {
    pub(crate) fn from_byte(byte: u8) -> Result<Self, CodecError> {
        match byte {
            0 => Ok(Self::Gray),
            2 => Ok(Self::Rgb),
            4 => Ok(Self::GrayAlpha),
            6 => Ok(Self::Rgba),
            other => Err(CodecError::UnsupportedColorType(other)),
        }
    }

    /// Channels per pixel (also bytes per pixel at bit depth 8).
    pub fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::GrayAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Scanline filter strategy for the encoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// No filtering. Fastest; deflate alone still compresses label
    /// imagery well.
    #[default]
    None,
    /// Paeth-filter every scanline for smaller output.
    Paeth,
}

/// Decode a PNG byte buffer.
///
/// ```no_run
/// use enough::Unstoppable;
/// use labelraster::{DecodeRequest, Limits};
///
/// let bytes: &[u8] = &[]; // your PNG bytes
/// let limits = Limits::bounded(25_000_000, 400_000_000);
/// let image = DecodeRequest::new(bytes)
///     .with_limits(&limits)
///     .decode(Unstoppable)?;
/// # Ok::<(), labelraster::CodecError>(())
/// ```
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    limits: Limits,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            limits: Limits::default(),
        }
    }

    pub fn with_limits(mut self, limits: &Limits) -> Self {
        self.limits = limits.clone();
        self
    }

    pub fn decode(self, stop: impl Stop) -> Result<RasterImage, CodecError> {
        decode::decode(self.data, &self.limits, &stop)
    }
}

/// Encode a [`RasterImage`] to PNG bytes.
pub struct EncodeRequest {
    filter: FilterMode,
    level: u8,
}

impl Default for EncodeRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodeRequest {
    pub fn new() -> Self {
        Self {
            filter: FilterMode::default(),
            level: 6,
        }
    }

    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }

    /// Deflate compression level, 0-10 (miniz_oxide scale).
    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level.min(10);
        self
    }

    pub fn encode(self, image: &RasterImage, stop: impl Stop) -> Result<Vec<u8>, CodecError> {
        encode::encode(image, self.filter, self.level, &stop)
    }
}
