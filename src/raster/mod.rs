//! Label rasterization: HTTP client for the rendering endpoint plus the
//! concurrency-bounded batch orchestrator.

mod batch;
mod client;
mod config;
mod error;

pub use batch::{BatchOutcome, rasterize_and_upscale, rasterize_batch};
pub use client::{HttpRasterizer, Rasterizer};
pub use config::{BatchConfig, ClientConfig, RetryConfig};
pub use error::{RasterizeError, Result};
