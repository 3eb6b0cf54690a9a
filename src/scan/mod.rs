pub mod analyzer;
pub mod engine;
pub mod feed;
pub mod history;
pub mod traits;
pub mod types;

pub use analyzer::FrameAnalyzer;
pub use engine::ScanEngine;
pub use feed::{frame_feed, FrameFeed, FrameHandle};
pub use history::{ScanHistory, ScanRecord};
pub use traits::{BarcodeDetector, FrameSource, OverlaySink};
pub use types::{BarcodeFormat, Detection, Frame, Overlay};
