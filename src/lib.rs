//! reticle — live-preview detection overlay engine.
//!
//! Maps detector hits from camera-frame pixel space onto the display
//! viewport so highlight boxes line up with what the camera sees, and ships
//! the minimal async pipeline around that transform:
//!
//! 1. **Geometry** – the centre-crop fill transform ([`CoordinateMapper`]):
//!    scale factor plus per-axis crop offsets, recomputed per frame.
//! 2. **Scan** – the loop: a [`scan::FrameSource`] feeds frames, an opaque
//!    [`scan::BarcodeDetector`] decodes them, boxes are mapped and published
//!    to a [`scan::OverlaySink`]. Detection-free frames emit an explicit
//!    empty overlay so renderers clear stale highlights.
//! 3. **Overlay** – reference rendering: HUD layers and annotated captures
//!    with payload labels.
//!
//! Camera drivers, decoding engines and UI composition stay outside; they
//! plug in at the trait seams.

pub mod config;
pub mod errors;
pub mod geometry;
pub mod overlay;
pub mod scan;

pub use config::{PipelineConfig, ReticleConfig, ScannerConfig};
pub use errors::{ReticleError, ReticleResult};
pub use geometry::{CoordinateMapper, Dimensions, Rect};
