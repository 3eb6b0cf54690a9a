use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::config::PipelineConfig;
use crate::errors::{ReticleError, ReticleResult};
use crate::geometry::Dimensions;
use crate::scan::analyzer::FrameAnalyzer;
use crate::scan::history::{ScanHistory, ScanRecord};
use crate::scan::traits::{FrameSource, OverlaySink};

/// Drives the scan loop: frames in, overlay batches out.
///
/// The viewport size is read from a watch channel on every frame, so layout
/// changes in the host UI take effect on the very next analysis.
pub struct ScanEngine {
    analyzer: FrameAnalyzer,
    viewport_rx: watch::Receiver<Dimensions>,
    config: PipelineConfig,
    stop_flag: Arc<AtomicBool>,
    history: Option<ScanHistory>,
}

impl ScanEngine {
    pub fn new(
        analyzer: FrameAnalyzer,
        viewport_rx: watch::Receiver<Dimensions>,
        config: PipelineConfig,
    ) -> Self {
        let history = config.record_sessions.then(ScanHistory::new);
        Self {
            analyzer,
            viewport_rx,
            config,
            stop_flag: Arc::new(AtomicBool::new(false)),
            history,
        }
    }

    /// Record non-empty results to a specific session log, regardless of the
    /// `record_sessions` setting.
    pub fn with_history(mut self, history: ScanHistory) -> Self {
        self.history = Some(history);
        self
    }

    /// Shared flag for cooperative shutdown from another task. Checked
    /// between frames; drop the frame source (or its handle) to interrupt a
    /// pending wait.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Run until the source ends, the stop flag is raised, or the
    /// consecutive-failure limit is hit.
    ///
    /// Source and detector failures are logged and the frame skipped. Frames
    /// arriving while the viewport has no usable size yet (pre-layout 0x0)
    /// are skipped without counting as failures.
    pub async fn run(
        &mut self,
        source: &mut dyn FrameSource,
        sink: &mut dyn OverlaySink,
    ) -> ReticleResult<()> {
        tracing::info!(
            max_failures = self.config.max_consecutive_failures,
            "scan loop started"
        );
        let mut consecutive_failures: u32 = 0;

        loop {
            if self.stop_flag.load(Ordering::Relaxed) {
                tracing::info!("stop flag raised");
                break;
            }

            let frame = match source.next_frame().await {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::info!("frame source finished");
                    break;
                }
                Err(e) => {
                    consecutive_failures += 1;
                    tracing::warn!(
                        error = %e,
                        failures = consecutive_failures,
                        "frame source failed — skipping"
                    );
                    if consecutive_failures >= self.config.max_consecutive_failures {
                        return Err(ReticleError::Pipeline(
                            "consecutive failure limit reached".into(),
                        ));
                    }
                    continue;
                }
            };

            let viewport = *self.viewport_rx.borrow();

            let overlays = match self.analyzer.analyze(&frame, viewport).await {
                Ok(overlays) => {
                    consecutive_failures = 0;
                    overlays
                }
                Err(ReticleError::InvalidDimensions { width, height }) => {
                    // Normal before the host's first layout pass reports a
                    // real viewport size.
                    tracing::debug!(width = %width, height = %height, "unusable frame or viewport size, skipping frame");
                    continue;
                }
                Err(e) => {
                    consecutive_failures += 1;
                    tracing::warn!(
                        error = %e,
                        failures = consecutive_failures,
                        "analysis failed — skipping frame"
                    );
                    if consecutive_failures >= self.config.max_consecutive_failures {
                        return Err(ReticleError::Pipeline(
                            "consecutive failure limit reached".into(),
                        ));
                    }
                    continue;
                }
            };

            if let Some(history) = self.history.as_mut() {
                for overlay in overlays.iter().filter(|o| !o.is_empty()) {
                    history.push(ScanRecord {
                        ts: chrono::Utc::now().timestamp_millis(),
                        payload: overlay.payload.clone(),
                        region: overlay.region,
                    });
                }
                if let Err(e) = history.flush() {
                    tracing::warn!(error = %e, "history flush failed");
                }
            }

            if let Err(e) = sink.publish(&overlays).await {
                tracing::warn!(error = %e, "overlay sink rejected batch");
            }
        }

        tracing::info!("scan loop stopped");
        Ok(())
    }
}
