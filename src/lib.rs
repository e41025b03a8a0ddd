//! # labelraster
//!
//! ZPL label rasterization pipeline: a from-scratch PNG codec, a
//! nearest-neighbor upscaler, and a concurrency-bounded batch renderer
//! that fronts an external rasterization HTTP service.
//!
//! ## Pipeline
//!
//! ZPL text blocks → rasterization endpoint → PNG bytes → decode →
//! RGBA buffer → nearest-neighbor upscale → re-encode → PNG bytes out.
//! Batch fan-out is bounded by a counting semaphore; failures are retried
//! per label (exponential backoff on 429, linear otherwise) and then once
//! more in a sequential second pass after a cooldown.
//!
//! ## PNG support
//!
//! - Decode: bit depth 8; grayscale, grayscale+alpha, RGB, RGBA;
//!   non-interlaced; all five scanline filters; split IDAT; every chunk
//!   CRC verified, every zlib stream Adler-verified. Malformed input
//!   fails fast — no partial images.
//! - Encode: RGBA8, color type 6, filter None (default) or Paeth.
//!
//! ## Non-Goals
//!
//! - Interlaced PNG, palette color, bit depths other than 8
//! - PDF assembly (a downstream concern)
//! - General image processing beyond nearest-neighbor resize
//!
//! ## Usage
//!
//! ```no_run
//! use enough::Unstoppable;
//! use labelraster::{DecodeRequest, EncodeRequest, resize_nearest};
//!
//! let png: &[u8] = &[]; // rendered label bytes
//! let image = DecodeRequest::new(png).decode(Unstoppable)?;
//! let doubled = resize_nearest(&image, 2.0)?;
//! let out = EncodeRequest::new().encode(&doubled, Unstoppable)?;
//! # Ok::<(), labelraster::CodecError>(())
//! ```

#![forbid(unsafe_code)]

mod error;
mod limits;
mod pixel;

pub mod png;
pub mod raster;
pub mod scale;
pub mod service;

// Re-exports
pub use enough::{Stop, Unstoppable};
pub use error::CodecError;
pub use limits::Limits;
pub use pixel::RasterImage;
pub use png::{ColorType, DecodeRequest, EncodeRequest, FilterMode};
pub use scale::resize_nearest;
