//! PNG decoder: chunk walk, IDAT inflate, scanline reconstruction, RGBA
//! expansion.

use enough::Stop;

use crate::limits::Limits;
use crate::pixel::RasterImage;
use crate::png::chunk::ChunkReader;
use crate::png::filter::{FilterType, unfilter_row};
use crate::png::{ColorType, zlib};
use crate::CodecError;

/// Fields of IHDR this decoder consumes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PngHeader {
    pub width: u32,
    pub height: u32,
    pub color: ColorType,
}

pub(crate) fn parse_ihdr(data: &[u8]) -> Result<PngHeader, CodecError> {
    if data.len() != 13 {
        return Err(CodecError::InvalidHeader(format!(
            "IHDR payload is {} bytes, expected 13",
            data.len()
        )));
    }
    let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
    let bit_depth = data[8];
    let color_type = data[9];
    let compression = data[10];
    let filter_method = data[11];
    let interlace = data[12];

    if width == 0 || height == 0 {
        return Err(CodecError::InvalidHeader(format!(
            "zero dimension: {width}x{height}"
        )));
    }
    if bit_depth != 8 {
        return Err(CodecError::UnsupportedBitDepth(bit_depth));
    }
    let color = ColorType::from_byte(color_type)?;
    if compression != 0 {
        return Err(CodecError::InvalidHeader(format!(
            "unknown compression method {compression}"
        )));
    }
    if filter_method != 0 {
        return Err(CodecError::InvalidHeader(format!(
            "unknown filter method {filter_method}"
        )));
    }
    if interlace != 0 {
        return Err(CodecError::Interlaced);
    }

    Ok(PngHeader {
        width,
        height,
        color,
    })
}

/// Decode a complete PNG byte buffer into an RGBA image.
pub(crate) fn decode(
    data: &[u8],
    limits: &Limits,
    stop: &dyn Stop,
) -> Result<RasterImage, CodecError> {
    let mut reader = ChunkReader::new(data)?;

    let first = reader
        .next_chunk()?
        .ok_or(CodecError::MissingChunk("IHDR"))?;
    if &first.tag != b"IHDR" {
        return Err(CodecError::InvalidHeader(format!(
            "first chunk is {}, expected IHDR",
            first.tag_name()
        )));
    }
    let header = parse_ihdr(first.data)?;
    limits.check_pixels(header.width, header.height)?;

    let w = header.width as usize;
    let h = header.height as usize;
    let channels = header.color.channels();
    let row_bytes = w
        .checked_mul(channels)
        .ok_or(CodecError::DimensionsTooLarge {
            width: header.width,
            height: header.height,
        })?;
    // One leading filter byte per scanline.
    let raw_len = h
        .checked_mul(row_bytes + 1)
        .ok_or(CodecError::DimensionsTooLarge {
            width: header.width,
            height: header.height,
        })?;
    let rgba_len = w
        .checked_mul(h)
        .and_then(|px| px.checked_mul(4))
        .ok_or(CodecError::DimensionsTooLarge {
            width: header.width,
            height: header.height,
        })?;
    limits.check_alloc(raw_len)?;
    limits.check_alloc(rgba_len)?;

    // IDAT may be split across chunks arbitrarily; concatenate in file order.
    let mut idat = Vec::new();
    let mut seen_iend = false;
    while let Some(chunk) = reader.next_chunk()? {
        match &chunk.tag {
            b"IHDR" => {
                return Err(CodecError::InvalidHeader("duplicate IHDR".into()));
            }
            b"IDAT" => idat.extend_from_slice(chunk.data),
            b"IEND" => {
                seen_iend = true;
                break;
            }
            // Ancillary chunks (tEXt, pHYs, ...) carry nothing we consume.
            _ => {}
        }
    }
    if !seen_iend {
        return Err(CodecError::MissingChunk("IEND"));
    }
    if idat.is_empty() {
        return Err(CodecError::MissingChunk("IDAT"));
    }
    stop.check()?;

    let mut raw = zlib::decompress(&idat, raw_len)?;
    if raw.len() != raw_len {
        return Err(CodecError::TruncatedData {
            needed: raw_len,
            actual: raw.len(),
        });
    }

    let mut rgba = vec![0u8; rgba_len];
    let mut prev = vec![0u8; row_bytes];
    for row in 0..h {
        if row % 16 == 0 {
            stop.check()?;
        }
        let start = row * (row_bytes + 1);
        let filter = FilterType::from_byte(raw[start], row)?;
        let line = &mut raw[start + 1..start + 1 + row_bytes];
        unfilter_row(filter, line, &prev, channels);
        expand_row(header.color, line, &mut rgba[row * w * 4..(row + 1) * w * 4]);
        prev.copy_from_slice(line);
    }

    RasterImage::from_rgba(rgba, header.width, header.height)
}

/// Widen one reconstructed scanline into RGBA: grayscale replicates into
/// R,G,B; missing alpha becomes fully opaque.
fn expand_row(color: ColorType, line: &[u8], out: &mut [u8]) {
    match color {
        ColorType::Gray => {
            for (dst, &v) in out.chunks_exact_mut(4).zip(line.iter()) {
                dst[0] = v;
                dst[1] = v;
                dst[2] = v;
                dst[3] = 255;
            }
        }
        ColorType::GrayAlpha => {
            for (dst, src) in out.chunks_exact_mut(4).zip(line.chunks_exact(2)) {
                dst[0] = src[0];
                dst[1] = src[0];
                dst[2] = src[0];
                dst[3] = src[1];
            }
        }
        ColorType::Rgb => {
            for (dst, src) in out.chunks_exact_mut(4).zip(line.chunks_exact(3)) {
                dst[0] = src[0];
                dst[1] = src[1];
                dst[2] = src[2];
                dst[3] = 255;
            }
        }
        ColorType::Rgba => out.copy_from_slice(line),
    }
}
