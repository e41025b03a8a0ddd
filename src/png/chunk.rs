//! PNG chunk framing: signature, CRC-verified chunk walking, chunk emission.

use crate::CodecError;
use crate::png::checksum::{CRC_INIT, crc32_finish, crc32_update};

/// The fixed 8-byte PNG signature.
pub(crate) const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// One parsed chunk, borrowing its payload from the input buffer.
#[derive(Debug)]
pub(crate) struct Chunk<'a> {
    pub tag: [u8; 4],
    pub data: &'a [u8],
}

impl Chunk<'_> {
    pub fn tag_name(&self) -> &'static str {
        match &self.tag {
            b"IHDR" => "IHDR",
            b"IDAT" => "IDAT",
            b"IEND" => "IEND",
            b"PLTE" => "PLTE",
            _ => "ancillary",
        }
    }
}

/// Sequential chunk reader over a full PNG byte buffer.
///
/// Validates the signature up front and the CRC of every chunk as it is
/// read. Any framing error is fatal; there is no partial recovery.
pub(crate) struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ChunkReader<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, CodecError> {
        if data.len() < SIGNATURE.len() || data[..SIGNATURE.len()] != SIGNATURE {
            return Err(CodecError::BadSignature);
        }
        Ok(Self {
            data,
            pos: SIGNATURE.len(),
        })
    }

    /// Read the next chunk, verifying its CRC over tag + payload.
    /// Returns `Ok(None)` at clean end of input.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk<'a>>, CodecError> {
        if self.pos == self.data.len() {
            return Ok(None);
        }
        let header = self
            .data
            .get(self.pos..self.pos + 8)
            .ok_or(CodecError::UnexpectedEof)?;
        let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let tag = [header[4], header[5], header[6], header[7]];

        let data_start = self.pos + 8;
        let data_end = data_start
            .checked_add(length)
            .ok_or(CodecError::UnexpectedEof)?;
        let data = self
            .data
            .get(data_start..data_end)
            .ok_or(CodecError::UnexpectedEof)?;
        let crc_bytes = self
            .data
            .get(data_end..data_end + 4)
            .ok_or(CodecError::UnexpectedEof)?;
        let stored = u32::from_be_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);

        let computed = crc32_finish(crc32_update(crc32_update(CRC_INIT, &tag), data));
        let chunk = Chunk { tag, data };
        if stored != computed {
            return Err(CodecError::CrcMismatch {
                chunk: chunk.tag_name(),
                stored,
                computed,
            });
        }

        self.pos = data_end + 4;
        Ok(Some(chunk))
    }
}

/// Append one chunk (length, tag, payload, CRC) to `out`.
pub(crate) fn write_chunk(out: &mut Vec<u8>, tag: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(tag);
    out.extend_from_slice(data);
    let crc = crc32_finish(crc32_update(crc32_update(CRC_INIT, tag), data));
    out.extend_from_slice(&crc.to_be_bytes());
}
