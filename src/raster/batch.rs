//! Two-pass batch orchestrator.
//!
//! First pass: every label is issued concurrently, bounded by a counting
//! semaphore. Second pass: after a cooldown, leftover failures are retried
//! one at a time — a burst of concurrent retries right after a 429 storm
//! just reproduces the storm. Results keep input order no matter what
//! order the network finishes in.

use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use enough::Unstoppable;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::limits::Limits;
use crate::png::{DecodeRequest, EncodeRequest};
use crate::raster::client::Rasterizer;
use crate::raster::config::BatchConfig;
use crate::scale::resize_nearest;

/// What a batch produced: one slot per input label, in input order, with
/// `None` marking a permanent failure, and the failed indices listed
/// explicitly. A batch is never silently short.
#[derive(Debug)]
pub struct BatchOutcome {
    pub images: Vec<Option<Bytes>>,
    pub failed: Vec<usize>,
}

impl BatchOutcome {
    pub fn success_count(&self) -> usize {
        self.images.len() - self.failed.len()
    }
}

/// Rasterize `labels`, capping in-flight calls at `config.concurrency`.
///
/// `progress` is invoked once per completed first-pass job (success or
/// exhausted failure) with `(completed, total)`; counts are monotonically
/// non-decreasing even though completion order is not deterministic.
pub async fn rasterize_batch<R: Rasterizer>(
    rasterizer: &R,
    labels: &[String],
    config: &BatchConfig,
    progress: impl Fn(usize, usize) + Send + Sync,
) -> BatchOutcome {
    let total = labels.len();
    // Per-batch semaphore: no process-wide state survives the call.
    let semaphore = Semaphore::new(config.concurrency);
    let completed = AtomicUsize::new(0);

    let first_pass = labels.iter().enumerate().map(|(index, zpl)| {
        let semaphore = &semaphore;
        let completed = &completed;
        let progress = &progress;
        async move {
            // Holding the permit in a binding keeps it through the await;
            // dropping on any exit path releases it — no leak on error.
            let _permit = semaphore
                .acquire()
                .await
                .expect("batch semaphore is never closed");
            let result = rasterizer.rasterize(zpl).await;
            drop(_permit);

            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(done, total);
            (index, result)
        }
    });

    let mut images: Vec<Option<Bytes>> = vec![None; total];
    let mut retry_queue = Vec::new();
    for (index, result) in join_all(first_pass).await {
        match result {
            Ok(bytes) => images[index] = Some(bytes),
            Err(e) => {
                warn!(index, error = %e, "label failed first pass");
                retry_queue.push(index);
            }
        }
    }

    let mut failed = Vec::new();
    if !retry_queue.is_empty() {
        debug!(
            count = retry_queue.len(),
            cooldown_ms = config.cooldown.as_millis() as u64,
            "cooling down before sequential retry pass"
        );
        tokio::time::sleep(config.cooldown).await;

        for index in retry_queue {
            match rasterizer.rasterize(&labels[index]).await {
                Ok(bytes) => images[index] = Some(bytes),
                Err(e) => {
                    warn!(index, error = %e, "label failed permanently");
                    failed.push(index);
                }
            }
        }
    }

    BatchOutcome { images, failed }
}

/// The full pipeline: rasterize every label, then decode → upscale →
/// re-encode each rendered PNG. At scale 1.0 the rendered bytes pass
/// through untouched. A label whose PNG fails to decode becomes a failure
/// at its index; sibling labels are unaffected.
pub async fn rasterize_and_upscale<R: Rasterizer>(
    rasterizer: &R,
    labels: &[String],
    scale: f64,
    limits: &Limits,
    config: &BatchConfig,
    progress: impl Fn(usize, usize) + Send + Sync,
) -> BatchOutcome {
    let mut outcome = rasterize_batch(rasterizer, labels, config, progress).await;
    if scale == 1.0 {
        return outcome;
    }

    for (index, slot) in outcome.images.iter_mut().enumerate() {
        let Some(png) = slot.take() else { continue };
        let upscaled = DecodeRequest::new(&png)
            .with_limits(limits)
            .decode(Unstoppable)
            .and_then(|image| resize_nearest(&image, scale))
            .and_then(|scaled| EncodeRequest::new().encode(&scaled, Unstoppable));
        match upscaled {
            Ok(bytes) => *slot = Some(Bytes::from(bytes)),
            Err(e) => {
                warn!(index, error = %e, "rendered label failed post-processing");
                outcome.failed.push(index);
            }
        }
    }
    outcome.failed.sort_unstable();
    outcome
}
