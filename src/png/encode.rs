//! PNG encoder: RGBA8 → chunk stream (IHDR, IDAT, IEND).
//!
//! Always emits color type 6 (RGBA), bit depth 8, non-interlaced. The
//! scanline filter defaults to None — deflate still shrinks label imagery
//! well, and None keeps the hot path a straight copy — with Paeth
//! available for callers that trade CPU for smaller output.

use enough::Stop;

use crate::pixel::RasterImage;
use crate::png::chunk::{SIGNATURE, write_chunk};
use crate::png::filter::{FilterType, filter_row};
use crate::png::{FilterMode, zlib};
use crate::CodecError;

const RGBA_CHANNELS: usize = 4;

pub(crate) fn encode(
    image: &RasterImage,
    filter: FilterMode,
    level: u8,
    stop: &dyn Stop,
) -> Result<Vec<u8>, CodecError> {
    let w = image.width as usize;
    let h = image.height as usize;
    let pixels = image.pixels();
    // RasterImage enforces its length invariant at construction; a
    // violation here is a programming error, not a decode failure.
    assert_eq!(pixels.len(), w * h * RGBA_CHANNELS);

    let row_bytes = w * RGBA_CHANNELS;
    let filter_type = match filter {
        FilterMode::None => FilterType::None,
        FilterMode::Paeth => FilterType::Paeth,
    };

    let mut raw = vec![0u8; h * (row_bytes + 1)];
    let mut prev = vec![0u8; row_bytes];
    for row in 0..h {
        if row % 16 == 0 {
            stop.check()?;
        }
        let line = &pixels[row * row_bytes..(row + 1) * row_bytes];
        let dst = &mut raw[row * (row_bytes + 1)..(row + 1) * (row_bytes + 1)];
        dst[0] = filter_type.as_byte();
        filter_row(filter_type, line, &prev, RGBA_CHANNELS, &mut dst[1..]);
        prev.copy_from_slice(line);
    }

    stop.check()?;
    let idat = zlib::compress(&raw, level);

    let mut ihdr = [0u8; 13];
    ihdr[0..4].copy_from_slice(&image.width.to_be_bytes());
    ihdr[4..8].copy_from_slice(&image.height.to_be_bytes());
    ihdr[8] = 8; // bit depth
    ihdr[9] = 6; // color type RGBA
    // compression 0, filter method 0, interlace 0 already zeroed.

    let mut out = Vec::with_capacity(SIGNATURE.len() + idat.len() + 12 * 3 + 13);
    out.extend_from_slice(&SIGNATURE);
    write_chunk(&mut out, b"IHDR", &ihdr);
    write_chunk(&mut out, b"IDAT", &idat);
    write_chunk(&mut out, b"IEND", &[]);
    Ok(out)
}
