use async_trait::async_trait;

use crate::errors::ReticleResult;
use crate::scan::types::{Detection, Frame, Overlay};

/// Upstream frame producer: camera adapter, file replay, test script.
#[async_trait]
pub trait FrameSource: Send {
    /// Next frame to analyze, or `None` once the stream has ended.
    async fn next_frame(&mut self) -> ReticleResult<Option<Frame>>;
}

/// Opaque barcode decoder. Implementations wrap whatever engine the host
/// links; the pipeline only sees payloads and frame-space boxes.
#[async_trait]
pub trait BarcodeDetector: Send + Sync {
    async fn detect(&mut self, frame: &Frame) -> ReticleResult<Vec<Detection>>;
}

/// Downstream overlay consumer: UI bridge, HUD renderer, recorder.
#[async_trait]
pub trait OverlaySink: Send {
    /// Receives one batch per analyzed frame, either the mapped detections or
    /// exactly one empty overlay.
    async fn publish(&mut self, overlays: &[Overlay]) -> ReticleResult<()>;
}
