use crate::compressor::{compress_image, CompressedImage, CompressionConfig};
use crate::error::{CompressionError, Result};
use crate::intake::SourceImage;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::utils::{calculate_compression_ratio, progress_percent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPhase {
    #[default]
    Idle,
    Previewing,
    Compressing,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub index: usize,
    pub name: String,
    pub reason: String,
}

/// Everything known about the current batch.
///
/// Counters only move forward during a run. A new accepted intake replaces
/// the whole value through [`BatchState::reset`].
#[derive(Debug, Default)]
pub struct BatchState {
    phase: BatchPhase,
    total: usize,
    processed: usize,
    compressed: Vec<CompressedImage>,
    failures: Vec<ItemFailure>,
}

impl BatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn compressed(&self) -> &[CompressedImage] {
        &self.compressed
    }

    pub fn failures(&self) -> &[ItemFailure] {
        &self.failures
    }

    pub fn progress_percent(&self) -> u8 {
        progress_percent(self.processed, self.total)
    }

    pub(crate) fn reset(&mut self, total: usize) {
        *self = Self {
            phase: BatchPhase::Previewing,
            total,
            ..Self::default()
        };
    }

    fn advance(&mut self) {
        if self.processed < self.total {
            self.processed += 1;
        }
    }

    fn record_success(&mut self, image: CompressedImage) {
        self.compressed.push(image);
        self.advance();
    }

    fn record_failure(&mut self, failure: ItemFailure) {
        self.failures.push(failure);
        self.advance();
    }
}

/// Shared flag checked between items. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<ItemFailure>,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn compression_ratio(&self) -> f64 {
        calculate_compression_ratio(self.input_bytes, self.output_bytes)
    }

    pub fn all_failed(&self) -> bool {
        self.total > 0 && self.succeeded == 0
    }
}

/// Compress `images` one at a time, in order, recording results in `state`.
///
/// Each item runs on a blocking worker bounded by `config.item_timeout`. A
/// failed or timed-out item is recorded and skipped. `cancel` is checked
/// before every item; once set, the run stops with
/// [`CompressionError::Cancelled`] and keeps what was already compressed.
pub async fn run_batch(
    images: Vec<SourceImage>,
    config: &CompressionConfig,
    state: &mut BatchState,
    cancel: &CancelToken,
    sink: &dyn ProgressSink,
) -> Result<BatchReport> {
    let start_time = Instant::now();
    let total = state.total();
    state.phase = BatchPhase::Compressing;

    info!(
        total,
        format = %config.format,
        quality = config.quality_percent(),
        "starting batch compression"
    );

    for (index, source) in images.into_iter().enumerate() {
        if cancel.is_cancelled() {
            warn!(processed = state.processed(), total, "batch cancelled");
            state.phase = BatchPhase::Idle;
            return Err(CompressionError::Cancelled);
        }

        let name = source.name.clone();
        sink.on_event(ProgressEvent::Started {
            index,
            total,
            name: name.clone(),
        });

        match compress_one(source, *config).await {
            Ok(image) => {
                state.record_success(image);
                sink.on_event(ProgressEvent::Completed {
                    name,
                    processed: state.processed(),
                    total,
                    percent: state.progress_percent(),
                });
            }
            Err(e) => {
                warn!(name = %name, error = %e, "skipping image");
                let reason = e.to_string();
                state.record_failure(ItemFailure {
                    index,
                    name: name.clone(),
                    reason: reason.clone(),
                });
                sink.on_event(ProgressEvent::Skipped {
                    name,
                    reason,
                    processed: state.processed(),
                    total,
                    percent: state.progress_percent(),
                });
            }
        }
    }

    state.phase = BatchPhase::Ready;

    let report = BatchReport {
        total,
        succeeded: state.compressed().len(),
        failures: state.failures().to_vec(),
        input_bytes: state.compressed().iter().map(|c| c.original_size).sum(),
        output_bytes: state.compressed().iter().map(CompressedImage::size).sum(),
        elapsed: start_time.elapsed(),
    };

    sink.on_event(ProgressEvent::Finished {
        succeeded: report.succeeded,
        failed: report.failures.len(),
    });
    info!(
        succeeded = report.succeeded,
        failed = report.failures.len(),
        elapsed = ?report.elapsed,
        "batch compression finished"
    );

    Ok(report)
}

async fn compress_one(source: SourceImage, config: CompressionConfig) -> Result<CompressedImage> {
    let name = source.name.clone();
    let task = tokio::task::spawn_blocking(move || compress_image(&source, &config));

    match timeout(config.item_timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(CompressionError::Encode(name, join_error.to_string())),
        Err(_) => Err(CompressionError::Timeout(name, config.item_timeout.as_secs())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::{intake, SelectedFile};
    use crate::progress::NoProgress;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::Mutex;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn noisy_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            let v = x.wrapping_mul(7919) ^ y.wrapping_mul(104_729) ^ (x * y);
            Rgb([v as u8, (v >> 8) as u8, (v >> 16) as u8])
        });
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn accepted(files: Vec<SelectedFile>, state: &mut BatchState) -> Vec<SourceImage> {
        intake(&files, state).unwrap()
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressSink for RecordingSink {
        fn on_event(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    struct CancelAfterFirst(CancelToken);

    impl ProgressSink for CancelAfterFirst {
        fn on_event(&self, event: ProgressEvent) {
            if let ProgressEvent::Completed { .. } = event {
                self.0.cancel();
            }
        }
    }

    #[tokio::test]
    async fn test_run_batch_preserves_order() {
        let mut state = BatchState::new();
        let images = accepted(
            vec![
                SelectedFile::from_bytes("c.png", png_bytes(4, 4)),
                SelectedFile::from_bytes("a.png", png_bytes(5, 3)),
                SelectedFile::from_bytes("b.png", png_bytes(2, 8)),
            ],
            &mut state,
        );
        let config = CompressionConfig::new(Some(80), Some("image/jpeg")).unwrap();

        let report = run_batch(images, &config, &mut state, &CancelToken::new(), &NoProgress)
            .await
            .unwrap();

        let names: Vec<_> = state.compressed().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["c.jpg", "a.jpg", "b.jpg"]);
        assert_eq!(report.succeeded, 3);
        assert_eq!(state.processed(), 3);
        assert_eq!(state.progress_percent(), 100);
        assert_eq!(state.phase(), BatchPhase::Ready);
    }

    #[tokio::test]
    async fn test_run_batch_skips_corrupt_and_continues() {
        let mut state = BatchState::new();
        let images = accepted(
            vec![
                SelectedFile::from_bytes("good1.png", png_bytes(3, 3)),
                SelectedFile::from_bytes("broken.png", b"garbage".to_vec()),
                SelectedFile::from_bytes("good2.png", png_bytes(3, 3)),
            ],
            &mut state,
        );
        let config = CompressionConfig::new(Some(50), Some("png")).unwrap();

        let report = run_batch(images, &config, &mut state, &CancelToken::new(), &NoProgress)
            .await
            .unwrap();

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[0].name, "broken.png");
        assert_eq!(state.processed(), 3);
        assert!(!report.all_failed());
    }

    #[tokio::test]
    async fn test_run_batch_progress_is_monotonic() {
        let mut state = BatchState::new();
        let files: Vec<_> = (0..7)
            .map(|i| SelectedFile::from_bytes(format!("img{}.png", i), png_bytes(2, 2)))
            .collect();
        let images = accepted(files, &mut state);
        let sink = RecordingSink::default();

        run_batch(images, &CompressionConfig::default(), &mut state, &CancelToken::new(), &sink)
            .await
            .unwrap();

        let percents: Vec<u8> = sink
            .events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Completed { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect();

        let expected: Vec<u8> = (1..=7).map(|k| progress_percent(k, 7)).collect();
        assert_eq!(percents, expected);
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(percents.last(), Some(&100));
    }

    #[tokio::test]
    async fn test_run_batch_cancellation_stops_between_items() {
        let mut state = BatchState::new();
        let files: Vec<_> = (0..3)
            .map(|i| SelectedFile::from_bytes(format!("img{}.png", i), png_bytes(2, 2)))
            .collect();
        let images = accepted(files, &mut state);
        let cancel = CancelToken::new();
        let sink = CancelAfterFirst(cancel.clone());

        let result = run_batch(images, &CompressionConfig::default(), &mut state, &cancel, &sink).await;

        assert!(matches!(result, Err(CompressionError::Cancelled)));
        assert_eq!(state.processed(), 1);
        assert_eq!(state.compressed().len(), 1);
        assert_eq!(state.phase(), BatchPhase::Idle);
    }

    #[tokio::test]
    async fn test_run_batch_records_timeout_and_continues() {
        let mut state = BatchState::new();
        let images = accepted(
            vec![
                SelectedFile::from_bytes("slow.png", noisy_png_bytes(256, 256)),
                SelectedFile::from_bytes("slower.png", noisy_png_bytes(256, 256)),
            ],
            &mut state,
        );
        let config = CompressionConfig::new(Some(100), Some("png"))
            .unwrap()
            .with_timeout(Duration::from_nanos(1));

        let report = run_batch(images, &config, &mut state, &CancelToken::new(), &NoProgress)
            .await
            .unwrap();

        assert_eq!(report.failures.len(), 2);
        assert!(report.all_failed());
        for failure in &report.failures {
            assert!(failure.reason.starts_with("Timed out"), "{}", failure.reason);
        }
        assert_eq!(report.failures[1].name, "slower.png");
        assert_eq!(state.processed(), state.total());
        assert_eq!(state.progress_percent(), 100);
        assert_eq!(state.phase(), BatchPhase::Ready);
    }

    #[tokio::test]
    async fn test_rerun_yields_same_entry_names() {
        let files = vec![
            SelectedFile::from_bytes("x.png", png_bytes(3, 2)),
            SelectedFile::from_bytes("y.jpg", png_bytes(2, 3)),
        ];
        let config = CompressionConfig::new(Some(40), Some("webp")).unwrap();

        let mut names = Vec::new();
        for _ in 0..2 {
            let mut state = BatchState::new();
            let images = accepted(files.clone(), &mut state);
            run_batch(images, &config, &mut state, &CancelToken::new(), &NoProgress)
                .await
                .unwrap();
            names.push(
                state
                    .compressed()
                    .iter()
                    .map(|c| c.name.clone())
                    .collect::<Vec<_>>(),
            );
        }

        assert_eq!(names[0], names[1]);
        assert_eq!(names[0], vec!["x.webp", "y.webp"]);
    }

    #[test]
    fn test_state_never_exceeds_total() {
        let mut state = BatchState::new();
        state.reset(1);
        state.record_failure(ItemFailure {
            index: 0,
            name: "a".to_string(),
            reason: "x".to_string(),
        });
        state.record_failure(ItemFailure {
            index: 1,
            name: "b".to_string(),
            reason: "y".to_string(),
        });
        assert_eq!(state.processed(), 1);
        assert_eq!(state.progress_percent(), 100);
    }

    #[test]
    fn test_reset_replaces_previous_batch() {
        let mut state = BatchState::new();
        state.reset(2);
        state.record_failure(ItemFailure {
            index: 0,
            name: "a".to_string(),
            reason: "x".to_string(),
        });
        state.phase = BatchPhase::Ready;

        state.reset(5);
        assert_eq!(state.total(), 5);
        assert_eq!(state.processed(), 0);
        assert!(state.failures().is_empty());
        assert_eq!(state.phase(), BatchPhase::Previewing);
    }
}
