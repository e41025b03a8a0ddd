//! CRC-32 (PNG chunk integrity) and Adler-32 (zlib stream integrity).
//!
//! Both are pure functions over constant tables. The CRC table is computed
//! at compile time; there is no runtime initialization to race on.

/// IEEE 802.3 polynomial, reflected.
const CRC_POLY: u32 = 0xEDB8_8320;

const CRC_TABLE: [u32; 256] = build_crc_table();

const fn build_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { CRC_POLY ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

/// CRC-32 of `data` (the zlib/PNG variant: reflected, init and final xor
/// all-ones).
pub fn crc32(data: &[u8]) -> u32 {
    crc32_finish(crc32_update(CRC_INIT, data))
}

pub(crate) const CRC_INIT: u32 = 0xFFFF_FFFF;

/// Streaming form: feed successive slices, then [`crc32_finish`].
pub(crate) fn crc32_update(state: u32, data: &[u8]) -> u32 {
    let mut c = state;
    for &byte in data {
        c = CRC_TABLE[((c ^ byte as u32) & 0xFF) as usize] ^ (c >> 8);
    }
    c
}

pub(crate) fn crc32_finish(state: u32) -> u32 {
    state ^ 0xFFFF_FFFF
}

const ADLER_MOD: u32 = 65_521;

/// Adler-32 of `data`, as used by the zlib stream trailer.
pub fn adler32(data: &[u8]) -> u32 {
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    // 5552 is the largest run that cannot overflow u32 before a reduction.
    for block in data.chunks(5552) {
        for &byte in block {
            a += byte as u32;
            b += a;
        }
        a %= ADLER_MOD;
        b %= ADLER_MOD;
    }
    (b << 16) | a
}
