//! HTTP client for the label rendering endpoint.

use bytes::Bytes;
use reqwest::{Client, Response, StatusCode, header};
use tracing::{debug, warn};

use crate::raster::config::ClientConfig;
use crate::raster::error::{RasterizeError, Result};

/// The seam between the orchestrator and the network: anything that turns
/// one ZPL block into PNG bytes. Tests substitute scripted impls; the
/// orchestrator never cares which is behind the call.
pub trait Rasterizer: Send + Sync {
    /// Render one `^XA...^XZ` block. Retries are the implementor's
    /// business; a returned error is terminal for this call.
    fn rasterize(&self, zpl: &str) -> impl Future<Output = Result<Bytes>> + Send;
}

/// Rendering client with per-label retry.
///
/// POSTs raw ZPL to the configured endpoint and expects PNG bytes back.
/// Stateless between calls: job bookkeeping lives in the orchestrator.
pub struct HttpRasterizer {
    client: Client,
    config: ClientConfig,
}

impl HttpRasterizer {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| RasterizeError::Configuration(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// One attempt, no retry.
    async fn rasterize_once(&self, zpl: &str) -> Result<Bytes> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .header(header::ACCEPT, "image/png")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(zpl.to_owned())
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn handle_response(&self, response: Response) -> Result<Bytes> {
        let status = response.status();
        match status {
            StatusCode::OK => response.bytes().await.map_err(|e| e.into()),

            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_ms = response
                    .headers()
                    .get(header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(|secs| secs * 1000);
                Err(RasterizeError::RateLimited { retry_after_ms })
            }

            _ => Err(RasterizeError::Http {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

impl Rasterizer for HttpRasterizer {
    async fn rasterize(&self, zpl: &str) -> Result<Bytes> {
        let retry = &self.config.retry;
        let mut last = None;

        for attempt in 1..=retry.max_attempts {
            if attempt > 1 {
                // Last error decides the wait: server-dictated or
                // exponential for 429, linear for everything else.
                let delay = match &last {
                    Some(e @ RasterizeError::RateLimited { .. }) => e
                        .retry_after()
                        .unwrap_or_else(|| retry.rate_limit_delay(attempt - 1))
                        .min(retry.rate_limit_cap),
                    _ => retry.transient_delay(attempt - 1),
                };
                debug!(attempt, ?delay, "retrying rasterization");
                tokio::time::sleep(delay).await;
            }

            match self.rasterize_once(zpl).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if e.is_retryable() => {
                    warn!(attempt, error = %e, "rasterization attempt failed");
                    last = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(RasterizeError::RetriesExhausted {
            attempts: retry.max_attempts,
            last: last.map(|e| e.to_string()).unwrap_or_default(),
        })
    }
}
