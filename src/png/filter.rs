//! PNG scanline filters: None, Sub, Up, Average, Paeth.
//!
//! Filtering is applied byte-wise with a pixel-width lag (`bpp`), per the
//! PNG specification. `prev` is the *reconstructed* previous row; callers
//! pass all zeros above row 0.

use crate::CodecError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FilterType {
    None,
    Sub,
    Up,
    Average,
    Paeth,
}

impl FilterType {
    pub fn from_byte(byte: u8, row: usize) -> Result<Self, CodecError> {
        match byte {
            0 => Ok(Self::None),
            1 => Ok(Self::Sub),
            2 => Ok(Self::Up),
            3 => Ok(Self::Average),
            4 => Ok(Self::Paeth),
            other => Err(CodecError::InvalidFilter { filter: other, row }),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Sub => 1,
            Self::Up => 2,
            Self::Average => 3,
            Self::Paeth => 4,
        }
    }
}

/// Paeth predictor: the neighbor (left, above, upper-left) closest to
/// `left + above - upper_left`, ties broken left, then above, then diagonal.
fn paeth(left: u8, above: u8, upper_left: u8) -> u8 {
    let p = left as i16 + above as i16 - upper_left as i16;
    let pa = (p - left as i16).abs();
    let pb = (p - above as i16).abs();
    let pc = (p - upper_left as i16).abs();
    if pa <= pb && pa <= pc {
        left
    } else if pb <= pc {
        above
    } else {
        upper_left
    }
}

/// Reverse `filter` over `row` in place. `row` holds filtered bytes on
/// entry and reconstructed bytes on exit.
pub(crate) fn unfilter_row(filter: FilterType, row: &mut [u8], prev: &[u8], bpp: usize) {
    debug_assert_eq!(row.len(), prev.len());
    match filter {
        FilterType::None => {}
        FilterType::Sub => {
            for i in bpp..row.len() {
                row[i] = row[i].wrapping_add(row[i - bpp]);
            }
        }
        FilterType::Up => {
            for i in 0..row.len() {
                row[i] = row[i].wrapping_add(prev[i]);
            }
        }
        FilterType::Average => {
            for i in 0..row.len() {
                let left = if i >= bpp { row[i - bpp] } else { 0 };
                let avg = ((left as u16 + prev[i] as u16) / 2) as u8;
                row[i] = row[i].wrapping_add(avg);
            }
        }
        FilterType::Paeth => {
            for i in 0..row.len() {
                let left = if i >= bpp { row[i - bpp] } else { 0 };
                let upper_left = if i >= bpp { prev[i - bpp] } else { 0 };
                row[i] = row[i].wrapping_add(paeth(left, prev[i], upper_left));
            }
        }
    }
}

/// Apply `filter` to `row` (reconstructed bytes), writing filtered bytes
/// into `out`. Used by the encoder; the inverse of [`unfilter_row`].
pub(crate) fn filter_row(filter: FilterType, row: &[u8], prev: &[u8], bpp: usize, out: &mut [u8]) {
    debug_assert_eq!(row.len(), out.len());
    match filter {
        FilterType::None => out.copy_from_slice(row),
        FilterType::Sub => {
            for i in 0..row.len() {
                let left = if i >= bpp { row[i - bpp] } else { 0 };
                out[i] = row[i].wrapping_sub(left);
            }
        }
        FilterType::Up => {
            for i in 0..row.len() {
                out[i] = row[i].wrapping_sub(prev[i]);
            }
        }
        FilterType::Average => {
            for i in 0..row.len() {
                let left = if i >= bpp { row[i - bpp] } else { 0 };
                let avg = ((left as u16 + prev[i] as u16) / 2) as u8;
                out[i] = row[i].wrapping_sub(avg);
            }
        }
        FilterType::Paeth => {
            for i in 0..row.len() {
                let left = if i >= bpp { row[i - bpp] } else { 0 };
                let upper_left = if i >= bpp { prev[i - bpp] } else { 0 };
                out[i] = row[i].wrapping_sub(paeth(left, prev[i], upper_left));
            }
        }
    }
}
