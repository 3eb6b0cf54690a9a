use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::{Dimensions, Rect};

/// Symbologies a detector can report. The analyzer filters against the
/// configured allowlist; `Unknown` covers engines that do not classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarcodeFormat {
    QrCode,
    Aztec,
    Codabar,
    Code39,
    Code93,
    Code128,
    DataMatrix,
    Ean8,
    Ean13,
    Itf,
    Pdf417,
    UpcA,
    UpcE,
    Unknown,
}

/// One analyzed camera frame. `data` is opaque to the pipeline; only the
/// detector interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Upstream rotation hint in degrees (0/90/180/270). Forwarded to the
    /// detector, never consumed by the geometry.
    pub rotation_degrees: i32,
    pub timestamp: DateTime<Utc>,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, rotation_degrees: i32) -> Self {
        Self {
            data,
            width,
            height,
            rotation_degrees,
            timestamp: Utc::now(),
        }
    }

    /// Pixel size as seen by the coordinate mapper.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::from((self.width, self.height))
    }
}

/// One decoded barcode in frame space, as handed over by a detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub payload: String,
    /// Bounding box in frame pixel coordinates.
    pub bounding_box: Rect,
    pub format: BarcodeFormat,
}

/// One emission to the renderer: a decoded payload and where to draw its
/// highlight, in viewport pixel coordinates.
///
/// A frame without (surviving) detections emits exactly one empty overlay so
/// renderers drop stale highlights instead of freezing the last box on
/// screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub payload: String,
    pub region: Rect,
}

impl Overlay {
    /// The clear signal for detection-free frames: empty payload, zero-area
    /// region.
    pub fn empty() -> Self {
        Self {
            payload: String::new(),
            region: Rect::ZERO,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty() && self.region == Rect::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_dimensions_match_pixels() {
        let frame = Frame::new(vec![0u8; 16], 640, 480, 90);
        let dims = frame.dimensions();
        assert_eq!(dims.width, 640.0);
        assert_eq!(dims.height, 480.0);
    }

    #[test]
    fn empty_overlay_is_recognizable() {
        assert!(Overlay::empty().is_empty());
        let real = Overlay {
            payload: "https://example.com".into(),
            region: Rect::new(1.0, 2.0, 3.0, 4.0),
        };
        assert!(!real.is_empty());
        // Payload-less detections still count as real overlays when they
        // carry a box.
        let anonymous = Overlay {
            payload: String::new(),
            region: Rect::new(1.0, 2.0, 3.0, 4.0),
        };
        assert!(!anonymous.is_empty());
    }

    #[test]
    fn barcode_format_serializes_snake_case() {
        let s = serde_json::to_string(&BarcodeFormat::DataMatrix).unwrap();
        assert_eq!(s, "\"data_matrix\"");
        let f: BarcodeFormat = serde_json::from_str("\"upc_a\"").unwrap();
        assert_eq!(f, BarcodeFormat::UpcA);
    }
}
