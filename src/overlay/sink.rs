use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::errors::{ReticleError, ReticleResult};
use crate::geometry::Dimensions;
use crate::overlay::annotator::{render_hud, AnnotatedFrame};
use crate::scan::traits::OverlaySink;
use crate::scan::types::Overlay;

/// Forwards each overlay batch into an mpsc channel, for hosts that consume
/// the pipeline as an event stream.
pub struct ChannelSink {
    tx: mpsc::Sender<Vec<Overlay>>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Vec<Overlay>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl OverlaySink for ChannelSink {
    async fn publish(&mut self, overlays: &[Overlay]) -> ReticleResult<()> {
        self.tx
            .send(overlays.to_vec())
            .await
            .map_err(|_| ReticleError::Sink("overlay channel closed".into()))
    }
}

/// Re-renders the HUD layer on every publish and keeps the newest one.
///
/// Publishing the clear signal leaves a fully transparent layer behind, which
/// is how stale highlights disappear from screen.
pub struct AnnotatorSink {
    viewport_rx: watch::Receiver<Dimensions>,
    latest: Option<AnnotatedFrame>,
}

impl AnnotatorSink {
    pub fn new(viewport_rx: watch::Receiver<Dimensions>) -> Self {
        Self {
            viewport_rx,
            latest: None,
        }
    }

    /// The most recently rendered layer, if any frame has been published.
    pub fn latest(&self) -> Option<&AnnotatedFrame> {
        self.latest.as_ref()
    }
}

#[async_trait]
impl OverlaySink for AnnotatorSink {
    async fn publish(&mut self, overlays: &[Overlay]) -> ReticleResult<()> {
        let viewport = *self.viewport_rx.borrow();
        self.latest = Some(render_hud(viewport, overlays)?);
        Ok(())
    }
}
