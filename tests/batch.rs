use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use labelraster::raster::{
    BatchConfig, Rasterizer, RasterizeError, rasterize_batch,
};

/// What a scripted rasterizer does for one (label, attempt) pair.
enum Step {
    Succeed(Duration),
    Fail(Duration),
}

/// Deterministic stand-in for the rendering endpoint. Parses the label
/// index out of the ZPL text, consults the script, and tracks in-flight
/// concurrency (overall and for retry attempts separately).
struct ScriptedRasterizer {
    script: Box<dyn Fn(usize, u32) -> Step + Send + Sync>,
    attempts: Mutex<Vec<u32>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    retry_in_flight: AtomicUsize,
    retry_peak: AtomicUsize,
}

impl ScriptedRasterizer {
    fn new(labels: usize, script: impl Fn(usize, u32) -> Step + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            attempts: Mutex::new(vec![0; labels]),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            retry_in_flight: AtomicUsize::new(0),
            retry_peak: AtomicUsize::new(0),
        }
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn retry_peak(&self) -> usize {
        self.retry_peak.load(Ordering::SeqCst)
    }
}

fn label(i: usize) -> String {
    format!("^XA^FD{i}^XZ")
}

fn labels(n: usize) -> Vec<String> {
    (0..n).map(label).collect()
}

fn parse_index(zpl: &str) -> usize {
    zpl.strip_prefix("^XA^FD")
        .and_then(|s| s.strip_suffix("^XZ"))
        .and_then(|s| s.parse().ok())
        .expect("test label format")
}

impl Rasterizer for ScriptedRasterizer {
    async fn rasterize(&self, zpl: &str) -> labelraster::raster::Result<Bytes> {
        let index = parse_index(zpl);
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts[index] += 1;
            attempts[index]
        };

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);
        if attempt > 1 {
            let current = self.retry_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.retry_peak.fetch_max(current, Ordering::SeqCst);
        }

        let step = (self.script)(index, attempt);
        let (latency, result) = match step {
            Step::Succeed(latency) => (latency, Ok(Bytes::from(format!("png-{index}")))),
            Step::Fail(latency) => (
                latency,
                Err(RasterizeError::RetriesExhausted {
                    attempts: 4,
                    last: "HTTP error: 500".into(),
                }),
            ),
        };
        tokio::time::sleep(latency).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if attempt > 1 {
            self.retry_in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        result
    }
}

fn quick_config(concurrency: usize) -> BatchConfig {
    BatchConfig {
        concurrency,
        cooldown: Duration::from_millis(2500),
        max_batch: 20,
    }
}

#[tokio::test(start_paused = true)]
async fn output_order_matches_input_under_random_completion() {
    // Latency varies per label so completion order scrambles.
    let rasterizer = ScriptedRasterizer::new(10, |index, _| {
        Step::Succeed(Duration::from_millis(((index * 37) % 7) as u64 * 10))
    });
    let outcome = rasterize_batch(&rasterizer, &labels(10), &quick_config(3), |_, _| {}).await;

    assert!(outcome.failed.is_empty());
    for (i, slot) in outcome.images.iter().enumerate() {
        assert_eq!(
            slot.as_deref(),
            Some(format!("png-{i}").as_bytes()),
            "index {i} must hold label {i}'s bytes"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn partial_failure_is_accounted_exactly() {
    let rasterizer = ScriptedRasterizer::new(6, |index, _| {
        if index == 1 || index == 3 {
            Step::Fail(Duration::from_millis(10))
        } else {
            Step::Succeed(Duration::from_millis(10))
        }
    });
    let outcome = rasterize_batch(&rasterizer, &labels(6), &quick_config(2), |_, _| {}).await;

    assert_eq!(outcome.failed, vec![1, 3]);
    assert_eq!(outcome.success_count(), 4);
    for (i, slot) in outcome.images.iter().enumerate() {
        assert_eq!(slot.is_none(), i == 1 || i == 3, "index {i}");
    }
}

#[tokio::test(start_paused = true)]
async fn in_flight_never_exceeds_permit_count() {
    // Batch is 4x the permit count; every call dwells long enough that an
    // unbounded fan-out would show up in the peak.
    let rasterizer =
        ScriptedRasterizer::new(12, |_, _| Step::Succeed(Duration::from_millis(50)));
    let outcome = rasterize_batch(&rasterizer, &labels(12), &quick_config(3), |_, _| {}).await;

    assert!(outcome.failed.is_empty());
    assert_eq!(rasterizer.peak(), 3, "semaphore should saturate exactly");
}

#[tokio::test(start_paused = true)]
async fn rate_limit_storm_scenario() {
    // Five labels, limit 2; the first two fail their first attempt and
    // succeed on retry. Everything must come back, in order, with peak
    // concurrency equal to the cap.
    let rasterizer = ScriptedRasterizer::new(5, |index, attempt| {
        if index < 2 && attempt == 1 {
            Step::Fail(Duration::from_millis(20))
        } else {
            Step::Succeed(Duration::from_millis(20))
        }
    });
    let outcome = rasterize_batch(&rasterizer, &labels(5), &quick_config(2), |_, _| {}).await;

    assert!(outcome.failed.is_empty());
    assert_eq!(outcome.success_count(), 5);
    for (i, slot) in outcome.images.iter().enumerate() {
        assert_eq!(slot.as_deref(), Some(format!("png-{i}").as_bytes()));
    }
    assert_eq!(rasterizer.peak(), 2);
}

#[tokio::test(start_paused = true)]
async fn retry_pass_runs_sequentially() {
    let rasterizer = ScriptedRasterizer::new(6, |_, attempt| {
        if attempt == 1 {
            Step::Fail(Duration::from_millis(10))
        } else {
            Step::Succeed(Duration::from_millis(10))
        }
    });
    let outcome = rasterize_batch(&rasterizer, &labels(6), &quick_config(4), |_, _| {}).await;

    assert!(outcome.failed.is_empty());
    assert_eq!(rasterizer.retry_peak(), 1, "second pass must not overlap calls");
}

#[tokio::test(start_paused = true)]
async fn cooldown_separates_the_passes() {
    let rasterizer = ScriptedRasterizer::new(2, |index, attempt| {
        if index == 0 && attempt == 1 {
            Step::Fail(Duration::from_millis(5))
        } else {
            Step::Succeed(Duration::from_millis(5))
        }
    });
    let config = quick_config(2);
    let started = tokio::time::Instant::now();
    let outcome = rasterize_batch(&rasterizer, &labels(2), &config, |_, _| {}).await;

    assert!(outcome.failed.is_empty());
    assert!(started.elapsed() >= config.cooldown);
}

#[tokio::test(start_paused = true)]
async fn progress_is_monotonic_and_complete() {
    let rasterizer = ScriptedRasterizer::new(8, |index, _| {
        Step::Succeed(Duration::from_millis(((8 - index) * 10) as u64))
    });
    let seen = Mutex::new(Vec::new());
    let outcome = rasterize_batch(&rasterizer, &labels(8), &quick_config(3), |completed, total| {
        seen.lock().unwrap().push((completed, total));
    })
    .await;

    assert!(outcome.failed.is_empty());
    let seen = seen.into_inner().unwrap();
    assert_eq!(seen.len(), 8);
    for (i, &(completed, total)) in seen.iter().enumerate() {
        assert_eq!(completed, i + 1, "progress count must climb by one");
        assert_eq!(total, 8);
    }
}

#[tokio::test(start_paused = true)]
async fn empty_batch_is_empty_outcome() {
    let rasterizer = ScriptedRasterizer::new(0, |_, _| Step::Succeed(Duration::ZERO));
    let outcome = rasterize_batch(&rasterizer, &[], &quick_config(2), |_, _| {}).await;
    assert!(outcome.images.is_empty());
    assert!(outcome.failed.is_empty());
}
