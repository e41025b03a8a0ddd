use crate::CodecError;

/// Resource ceilings for decoding untrusted PNG input.
///
/// Checked after IHDR is parsed and before any output buffer is allocated,
/// so an oversized image is rejected without paying for its pixels. All
/// fields default to `None` (unlimited).
#[derive(Clone, Debug, Default)]
pub struct Limits {
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum bytes for any single decode-side allocation (the inflated
    /// scanline buffer and the RGBA output both count). This is the guard
    /// against deflate bombs: a tiny IDAT can inflate to gigabytes.
    pub max_alloc_bytes: Option<u64>,
}

impl Limits {
    /// Limits suitable for service-boundary input: `max_pixels` sized so a
    /// 4x upscale of the decoded image stays within `max_alloc_bytes`.
    pub fn bounded(max_pixels: u64, max_alloc_bytes: u64) -> Self {
        Self {
            max_pixels: Some(max_pixels),
            max_alloc_bytes: Some(max_alloc_bytes),
        }
    }

    pub(crate) fn check_pixels(&self, width: u32, height: u32) -> Result<(), CodecError> {
        let pixels = u64::from(width) * u64::from(height);
        match self.max_pixels {
            Some(max) if pixels > max => Err(CodecError::LimitExceeded(format!(
                "pixel count {pixels} exceeds limit {max}"
            ))),
            _ => Ok(()),
        }
    }

    pub(crate) fn check_alloc(&self, bytes: usize) -> Result<(), CodecError> {
        match self.max_alloc_bytes {
            Some(max) if bytes as u64 > max => Err(CodecError::LimitExceeded(format!(
                "allocation of {bytes} bytes exceeds limit {max}"
            ))),
            _ => Ok(()),
        }
    }
}
