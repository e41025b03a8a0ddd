use crate::CodecError;
use crate::png::ColorType;

/// A decoded image: owned RGBA8 pixel buffer plus dimensions.
///
/// Invariant: `pixels.len() == width * height * 4`, enforced at
/// construction. The buffer is never aliased — upscaling and decoding
/// always produce a fresh `RasterImage`.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RasterImage {
    /// Wrap an RGBA8 buffer, validating the length invariant.
    pub fn from_rgba(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self, CodecError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(4))
            .ok_or(CodecError::DimensionsTooLarge { width, height })?;
        if pixels.len() != expected {
            return Err(CodecError::BufferMismatch {
                width,
                height,
                layout: ColorType::Rgba,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Access the pixel data (row-major RGBA8).
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Take ownership of the pixel buffer.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// One RGBA pixel, for tests and spot checks. Panics out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height);
        let off = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[off],
            self.pixels[off + 1],
            self.pixels[off + 2],
            self.pixels[off + 3],
        ]
    }
}

impl core::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixels", &format_args!("[{} bytes]", self.pixels.len()))
            .finish()
    }
}
