//! zlib container framing around raw deflate.
//!
//! The 2-byte CMF/FLG header and the Adler-32 trailer are handled here;
//! the deflate payload itself goes through miniz_oxide, which inflates
//! stored, fixed-Huffman, and dynamic-Huffman blocks alike.

use crate::CodecError;
use crate::png::checksum::adler32;

/// CM=8 (deflate), CINFO=7 (32 KiB window).
const CMF: u8 = 0x78;
const FDICT_BIT: u8 = 0x20;

/// Compress `raw` into a complete zlib stream.
pub(crate) fn compress(raw: &[u8], level: u8) -> Vec<u8> {
    let deflated = miniz_oxide::deflate::compress_to_vec(raw, level);

    let mut out = Vec::with_capacity(deflated.len() + 6);
    // FLEVEL from the compression level, FCHECK makes CMF*256+FLG % 31 == 0.
    let flevel: u8 = match level {
        0..=1 => 0,
        2..=5 => 1,
        6 => 2,
        _ => 3,
    };
    let mut flg = flevel << 6;
    let rem = ((CMF as u16) * 256 + flg as u16) % 31;
    if rem != 0 {
        flg += (31 - rem) as u8;
    }
    out.push(CMF);
    out.push(flg);
    out.extend_from_slice(&deflated);
    out.extend_from_slice(&adler32(raw).to_be_bytes());
    out
}

/// Decompress a zlib stream, verifying header consistency and the
/// Adler-32 trailer. `max_output` bounds the inflated size (deflate-bomb
/// guard); exceeding it is reported as an inflate failure.
pub(crate) fn decompress(stream: &[u8], max_output: usize) -> Result<Vec<u8>, CodecError> {
    if stream.len() < 6 {
        return Err(CodecError::InvalidZlib("stream shorter than framing".into()));
    }
    let cmf = stream[0];
    let flg = stream[1];
    if cmf & 0x0F != 8 {
        return Err(CodecError::InvalidZlib(format!(
            "compression method {} is not deflate",
            cmf & 0x0F
        )));
    }
    if ((cmf as u16) * 256 + flg as u16) % 31 != 0 {
        return Err(CodecError::InvalidZlib("FCHECK failed".into()));
    }
    if flg & FDICT_BIT != 0 {
        // PNG forbids preset dictionaries.
        return Err(CodecError::InvalidZlib("unexpected preset dictionary".into()));
    }

    let deflated = &stream[2..stream.len() - 4];
    let raw = miniz_oxide::inflate::decompress_to_vec_with_limit(deflated, max_output)
        .map_err(|e| CodecError::Inflate(format!("{:?}", e.status)))?;

    let trailer = &stream[stream.len() - 4..];
    let stored = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let computed = adler32(&raw);
    if stored != computed {
        return Err(CodecError::AdlerMismatch { stored, computed });
    }
    Ok(raw)
}
