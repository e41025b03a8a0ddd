//! HTTP handlers: single-image upscale and batch rasterize-and-upscale.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use enough::Unstoppable;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::CodecError;
use crate::png::{DecodeRequest, EncodeRequest};
use crate::raster::Rasterizer;
use crate::scale::resize_nearest;
use crate::service::AppState;

/// Ceiling on the decoded (pre-base64) image payload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
/// Accepted scale factor range at the boundary. The resampler itself
/// handles any positive factor; the service is stricter.
pub const MIN_SCALE: f64 = 1.0;
pub const MAX_SCALE: f64 = 4.0;

type ApiError = (StatusCode, Json<ErrorBody>);

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

fn reject(status: StatusCode, error: impl Into<String>) -> ApiError {
    (status, Json(ErrorBody { error: error.into() }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpscaleRequest {
    pub image_base64: String,
    pub scale: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpscaleResponse {
    pub upscaled_image: String,
    pub original_size: Dimensions,
    pub upscaled_size: Dimensions,
    pub processing_time_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub labels: Vec<String>,
    /// Upscale factor applied after rasterization; 1.0 means pass the
    /// rendered PNGs through untouched.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub processing_time_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub images: Vec<Option<String>>,
    pub stats: BatchStats,
}

fn authenticate<R: Rasterizer>(state: &AppState<R>, headers: &HeaderMap) -> Result<(), ApiError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    match state.tokens.authenticate(authorization) {
        Ok(principal) => {
            debug!(principal, "request authenticated");
            Ok(())
        }
        Err(e) => {
            debug!(error = %e, "request rejected");
            Err(reject(StatusCode::UNAUTHORIZED, e.to_string()))
        }
    }
}

fn check_scale(scale: f64) -> Result<(), ApiError> {
    if !scale.is_finite() || !(MIN_SCALE..=MAX_SCALE).contains(&scale) {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            format!("scale must be between {MIN_SCALE} and {MAX_SCALE}"),
        ));
    }
    Ok(())
}

fn codec_status(e: &CodecError) -> StatusCode {
    // Decode-side failures mean the caller sent a bad or oversized image;
    // anything else out of the codec on validated input is on us.
    match e {
        CodecError::BufferMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

/// `POST /upscale` — decode a base64 PNG, nearest-neighbor upscale,
/// re-encode.
#[instrument(skip(state, headers, request))]
pub async fn upscale<R: Rasterizer>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    Json(request): Json<UpscaleRequest>,
) -> Result<Json<UpscaleResponse>, ApiError> {
    authenticate(&state, &headers)?;
    check_scale(request.scale)?;

    // 4/3 base64 inflation: bound the decoded size before decoding.
    if request.image_base64.len() / 4 * 3 > MAX_IMAGE_BYTES {
        return Err(reject(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("image exceeds {MAX_IMAGE_BYTES} byte limit"),
        ));
    }
    let png = BASE64
        .decode(request.image_base64.as_bytes())
        .map_err(|e| reject(StatusCode::BAD_REQUEST, format!("invalid base64: {e}")))?;

    let started = Instant::now();
    let image = DecodeRequest::new(&png)
        .with_limits(&state.limits)
        .decode(Unstoppable)
        .map_err(|e| reject(codec_status(&e), format!("PNG decode failed: {e}")))?;
    let original_size = Dimensions {
        width: image.width,
        height: image.height,
    };

    let scaled = resize_nearest(&image, request.scale)
        .map_err(|e| reject(codec_status(&e), format!("upscale failed: {e}")))?;
    let upscaled_size = Dimensions {
        width: scaled.width,
        height: scaled.height,
    };

    let encoded = EncodeRequest::new().encode(&scaled, Unstoppable).map_err(|e| {
        error!(error = %e, "encode failed on a decoded image");
        reject(StatusCode::INTERNAL_SERVER_ERROR, format!("PNG encode failed: {e}"))
    })?;

    Ok(Json(UpscaleResponse {
        upscaled_image: BASE64.encode(&encoded),
        original_size,
        upscaled_size,
        processing_time_ms: started.elapsed().as_millis() as u64,
    }))
}

/// `POST /batch` — rasterize a batch of ZPL labels and optionally upscale
/// each result. Output order matches input order; failed labels come back
/// as `null` with exact accounting in `stats`.
#[instrument(skip(state, headers, request), fields(labels = request.labels.len()))]
pub async fn batch<R: Rasterizer>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    authenticate(&state, &headers)?;
    check_scale(request.scale)?;
    if request.labels.is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "labels must not be empty"));
    }
    if request.labels.len() > state.batch.max_batch {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            format!("batch size exceeds limit of {}", state.batch.max_batch),
        ));
    }

    let started = Instant::now();
    let outcome = crate::raster::rasterize_and_upscale(
        state.rasterizer.as_ref(),
        &request.labels,
        request.scale,
        &state.limits,
        &state.batch,
        |completed, total| debug!(completed, total, "batch progress"),
    )
    .await;

    let stats = BatchStats {
        total: request.labels.len(),
        success: outcome.success_count(),
        failed: outcome.failed.len(),
        processing_time_ms: started.elapsed().as_millis() as u64,
    };
    let images = outcome
        .images
        .into_iter()
        .map(|slot| slot.map(|bytes| BASE64.encode(&bytes)))
        .collect();

    Ok(Json(BatchResponse { images, stats }))
}

/// `GET /health`.
pub async fn health() -> StatusCode {
    StatusCode::OK
}
