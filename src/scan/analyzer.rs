use crate::config::ScannerConfig;
use crate::errors::ReticleResult;
use crate::geometry::{CoordinateMapper, Dimensions};
use crate::scan::traits::BarcodeDetector;
use crate::scan::types::{Frame, Overlay};

/// Per-frame stage: refreshes the coordinate transform from the current
/// frame/viewport pair, runs the detector, filters by configured formats and
/// maps surviving boxes into viewport space.
pub struct FrameAnalyzer {
    detector: Box<dyn BarcodeDetector>,
    mapper: CoordinateMapper,
    config: ScannerConfig,
}

impl FrameAnalyzer {
    pub fn new(detector: Box<dyn BarcodeDetector>, config: ScannerConfig) -> Self {
        Self {
            detector,
            mapper: CoordinateMapper::new(),
            config,
        }
    }

    /// Analyze one frame against the current viewport size.
    ///
    /// The returned batch is never empty: a frame without surviving
    /// detections yields exactly one [`Overlay::empty`].
    pub async fn analyze(
        &mut self,
        frame: &Frame,
        viewport: Dimensions,
    ) -> ReticleResult<Vec<Overlay>> {
        self.mapper.update_transform(frame.dimensions(), viewport)?;

        let detections = self.detector.detect(frame).await?;
        let total = detections.len();

        let overlays: Vec<Overlay> = detections
            .into_iter()
            .filter(|d| self.config.formats.contains(&d.format))
            .map(|d| Overlay {
                payload: d.payload,
                region: self.mapper.map_rect(d.bounding_box),
            })
            .collect();

        if overlays.len() < total {
            tracing::debug!(
                kept = overlays.len(),
                dropped = total - overlays.len(),
                "detections outside format allowlist dropped"
            );
        }

        if overlays.is_empty() {
            return Ok(vec![Overlay::empty()]);
        }
        tracing::debug!(count = overlays.len(), "frame analyzed");
        Ok(overlays)
    }

    /// The mapper in its current state, for diagnostics.
    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }
}
