//! The exposed HTTP boundary: authenticated upscale and batch endpoints.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

use crate::limits::Limits;
use crate::raster::{BatchConfig, Rasterizer};
use crate::service::auth::TokenMap;

/// Decode-side ceilings for authenticated input. 2M pixels covers any
/// label sheet, and a 4x upscale of the largest accepted decode
/// (2M px × 16 × 4 bytes) lands exactly on `MAX_DECODE_ALLOC`.
const MAX_DECODED_PIXELS: u64 = 2_000_000;
const MAX_DECODE_ALLOC: u64 = 128 << 20;

/// Request-body cap: the 5 MiB decoded payload ceiling, inflated 4/3 by
/// base64, plus JSON framing. Without this layer the extractor's stock
/// limit would reject bodies the handlers are contracted to accept.
const MAX_REQUEST_BYTES: usize = 8 << 20;

/// Shared state behind every handler.
pub struct AppState<R> {
    pub tokens: Arc<TokenMap>,
    pub rasterizer: Arc<R>,
    pub batch: BatchConfig,
    pub limits: Limits,
}

// Manual impl: `R` itself need not be Clone behind the Arc.
impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            tokens: Arc::clone(&self.tokens),
            rasterizer: Arc::clone(&self.rasterizer),
            batch: self.batch.clone(),
            limits: self.limits.clone(),
        }
    }
}

impl<R> AppState<R> {
    pub fn new(tokens: TokenMap, rasterizer: R, batch: BatchConfig) -> Self {
        Self {
            tokens: Arc::new(tokens),
            rasterizer: Arc::new(rasterizer),
            batch,
            limits: Limits::bounded(MAX_DECODED_PIXELS, MAX_DECODE_ALLOC),
        }
    }
}

/// Build the service router.
pub fn router<R: Rasterizer + 'static>(state: AppState<R>) -> Router {
    Router::new()
        .route("/upscale", post(handlers::upscale::<R>))
        .route("/batch", post(handlers::batch::<R>))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(state)
}
