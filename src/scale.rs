//! Nearest-neighbor resize.
//!
//! Every destination pixel copies source pixel `(floor(x/s), floor(y/s))`
//! verbatim — no interpolation. Barcodes and 1-bit-style ZPL glyphs keep
//! their hard edges, which smoothing resamplers destroy.

use crate::pixel::RasterImage;
use crate::CodecError;

/// Resize by a positive scale factor. Downscaling (`scale < 1`) uses the
/// same mapping. Always allocates a new image; the source is untouched.
pub fn resize_nearest(src: &RasterImage, scale: f64) -> Result<RasterImage, CodecError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(CodecError::InvalidScale(scale));
    }

    let dst_w = (src.width as f64 * scale).floor() as u32;
    let dst_h = (src.height as f64 * scale).floor() as u32;
    if dst_w == 0 || dst_h == 0 {
        return Err(CodecError::EmptyScaleOutput {
            width: src.width,
            height: src.height,
            scale,
        });
    }

    let src_w = src.width as usize;
    let out_len = (dst_w as usize)
        .checked_mul(dst_h as usize)
        .and_then(|px| px.checked_mul(4))
        .ok_or(CodecError::DimensionsTooLarge {
            width: dst_w,
            height: dst_h,
        })?;

    let pixels = src.pixels();
    let mut out = Vec::with_capacity(out_len);
    for y in 0..dst_h {
        // floor(y/s), clamped: float rounding must not run past the edge.
        let sy = ((y as f64 / scale) as usize).min(src.height as usize - 1);
        let src_row = &pixels[sy * src_w * 4..(sy + 1) * src_w * 4];
        for x in 0..dst_w {
            let sx = ((x as f64 / scale) as usize).min(src_w - 1);
            out.extend_from_slice(&src_row[sx * 4..sx * 4 + 4]);
        }
    }

    RasterImage::from_rgba(out, dst_w, dst_h)
}
