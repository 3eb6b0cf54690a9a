use crate::errors::{ReticleError, ReticleResult};
use crate::geometry::types::{Dimensions, Rect};

/// Scale factor and per-axis crop offsets derived from one frame/viewport
/// pair. Recomputed in full on every update; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MappingState {
    scale_factor: f32,
    width_offset: f32,
    height_offset: f32,
}

impl Default for MappingState {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            width_offset: 0.0,
            height_offset: 0.0,
        }
    }
}

/// Maps coordinates from analyzed-frame pixel space into viewport pixel
/// space under a centre-crop fill policy: the frame is scaled until it covers
/// the viewport completely and the overflow on the longer axis is cropped
/// half per side.
///
/// A fresh mapper is the identity until the first successful
/// [`update_transform`](CoordinateMapper::update_transform). Mapped
/// coordinates may fall outside the viewport when the source box lies in the
/// cropped margin; callers clip at draw time.
#[derive(Debug, Clone, Default)]
pub struct CoordinateMapper {
    state: MappingState,
}

impl CoordinateMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute scale and offsets for a frame/viewport pair.
    ///
    /// Both inputs need finite, strictly positive sides; otherwise this
    /// returns [`ReticleError::InvalidDimensions`] and the previous state is
    /// kept. Calling again with identical inputs reproduces the identical
    /// state.
    pub fn update_transform(
        &mut self,
        frame: Dimensions,
        viewport: Dimensions,
    ) -> ReticleResult<()> {
        if !frame.is_valid() {
            return Err(ReticleError::InvalidDimensions {
                width: frame.width,
                height: frame.height,
            });
        }
        if !viewport.is_valid() {
            return Err(ReticleError::InvalidDimensions {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let frame_aspect = frame.aspect();
        self.state = if viewport.aspect() > frame_aspect {
            // Viewport is the wider shape: widths match, top/bottom cropped.
            MappingState {
                scale_factor: viewport.width / frame.width,
                width_offset: 0.0,
                height_offset: (viewport.width / frame_aspect - viewport.height) / 2.0,
            }
        } else {
            // Viewport is the taller or equal shape: heights match,
            // left/right cropped.
            MappingState {
                scale_factor: viewport.height / frame.height,
                width_offset: (viewport.height * frame_aspect - viewport.width) / 2.0,
                height_offset: 0.0,
            }
        };
        Ok(())
    }

    pub fn scale_factor(&self) -> f32 {
        self.state.scale_factor
    }

    pub fn width_offset(&self) -> f32 {
        self.state.width_offset
    }

    pub fn height_offset(&self) -> f32 {
        self.state.height_offset
    }

    #[inline]
    fn map_x(&self, x: f32) -> f32 {
        x * self.state.scale_factor - self.state.width_offset
    }

    #[inline]
    fn map_y(&self, y: f32) -> f32 {
        y * self.state.scale_factor - self.state.height_offset
    }

    /// Map a single frame-space point into viewport space.
    #[inline]
    pub fn map_point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.map_x(x), self.map_y(y))
    }

    /// Map a frame-space rectangle into viewport space.
    ///
    /// Horizontal edges are re-ordered after mapping, since quarter-turn
    /// rotation handling upstream can hand in boxes with left and right
    /// swapped. Vertical edges pass through as-is, so `top <= bottom` holds
    /// on output only when it held on input.
    pub fn map_rect(&self, rect: Rect) -> Rect {
        let x1 = self.map_x(rect.left);
        let x2 = self.map_x(rect.right);
        Rect {
            left: x1.min(x2),
            top: self.map_y(rect.top),
            right: x1.max(x2),
            bottom: self.map_y(rect.bottom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(w: f32, h: f32) -> Dimensions {
        Dimensions::new(w, h)
    }

    #[test]
    fn identity_before_first_update() {
        let mapper = CoordinateMapper::new();
        assert_eq!(mapper.map_point(12.5, -3.0), (12.5, -3.0));
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(mapper.map_rect(r), r);
    }

    #[test]
    fn equal_aspect_scales_without_offsets() {
        let mut mapper = CoordinateMapper::new();
        mapper
            .update_transform(dims(100.0, 100.0), dims(200.0, 200.0))
            .unwrap();
        assert!((mapper.scale_factor() - 2.0).abs() < 1e-6);
        assert_eq!(mapper.width_offset(), 0.0);
        assert_eq!(mapper.height_offset(), 0.0);
        assert_eq!(mapper.map_point(10.0, 10.0), (20.0, 20.0));
    }

    #[test]
    fn equal_nonsquare_aspect_has_no_offsets() {
        let mut mapper = CoordinateMapper::new();
        mapper
            .update_transform(dims(200.0, 100.0), dims(400.0, 200.0))
            .unwrap();
        assert!((mapper.scale_factor() - 2.0).abs() < 1e-6);
        assert_eq!(mapper.width_offset(), 0.0);
        assert_eq!(mapper.height_offset(), 0.0);
    }

    #[test]
    fn wide_frame_crops_horizontally() {
        // Frame twice as wide as tall, square viewport: heights match and the
        // horizontal overflow is cropped 50 px per side.
        let mut mapper = CoordinateMapper::new();
        mapper
            .update_transform(dims(100.0, 50.0), dims(100.0, 100.0))
            .unwrap();
        assert!((mapper.scale_factor() - 2.0).abs() < 1e-6);
        assert!((mapper.width_offset() - 50.0).abs() < 1e-6);
        assert_eq!(mapper.height_offset(), 0.0);
        assert_eq!(mapper.map_point(0.0, 0.0), (-50.0, 0.0));
        // Frame centre lands on viewport centre.
        assert_eq!(mapper.map_point(50.0, 25.0), (50.0, 50.0));
    }

    #[test]
    fn tall_frame_crops_vertically() {
        let mut mapper = CoordinateMapper::new();
        mapper
            .update_transform(dims(50.0, 100.0), dims(100.0, 100.0))
            .unwrap();
        assert!((mapper.scale_factor() - 2.0).abs() < 1e-6);
        assert_eq!(mapper.width_offset(), 0.0);
        assert!((mapper.height_offset() - 50.0).abs() < 1e-6);
        assert_eq!(mapper.map_point(0.0, 0.0), (0.0, -50.0));
        assert_eq!(mapper.map_point(25.0, 50.0), (50.0, 50.0));
    }

    #[test]
    fn stale_offset_cleared_when_aspect_relation_flips() {
        let mut mapper = CoordinateMapper::new();
        mapper
            .update_transform(dims(100.0, 50.0), dims(100.0, 100.0))
            .unwrap();
        assert!(mapper.width_offset() > 0.0);
        mapper
            .update_transform(dims(50.0, 100.0), dims(100.0, 100.0))
            .unwrap();
        assert_eq!(mapper.width_offset(), 0.0);
        assert!(mapper.height_offset() > 0.0);
    }

    #[test]
    fn swapped_horizontal_edges_are_reordered() {
        let mut mapper = CoordinateMapper::new();
        mapper
            .update_transform(dims(100.0, 50.0), dims(100.0, 100.0))
            .unwrap();
        let mapped = mapper.map_rect(Rect::new(80.0, 10.0, 20.0, 30.0));
        assert!(mapped.left <= mapped.right);
        assert!((mapped.left - (20.0 * 2.0 - 50.0)).abs() < 1e-6);
        assert!((mapped.right - (80.0 * 2.0 - 50.0)).abs() < 1e-6);
    }

    #[test]
    fn vertical_edges_pass_through_unordered() {
        let mut mapper = CoordinateMapper::new();
        mapper
            .update_transform(dims(100.0, 100.0), dims(200.0, 200.0))
            .unwrap();
        let mapped = mapper.map_rect(Rect::new(10.0, 30.0, 20.0, 10.0));
        assert!((mapped.top - 60.0).abs() < 1e-6);
        assert!((mapped.bottom - 20.0).abs() < 1e-6);
        assert!(mapped.top > mapped.bottom);
    }

    #[test]
    fn mapped_rect_scales_extent() {
        let mut mapper = CoordinateMapper::new();
        mapper
            .update_transform(dims(100.0, 50.0), dims(100.0, 100.0))
            .unwrap();
        let mapped = mapper.map_rect(Rect::new(10.0, 10.0, 20.0, 20.0));
        assert!((mapped.width() - 20.0).abs() < 1e-6);
        assert!((mapped.height() - 20.0).abs() < 1e-6);
    }

    #[test]
    fn repeated_update_is_bit_identical() {
        let mut a = CoordinateMapper::new();
        a.update_transform(dims(1280.0, 720.0), dims(1080.0, 2340.0))
            .unwrap();
        let first = a.state;
        let probe = a.map_rect(Rect::new(100.0, 200.0, 300.0, 400.0));
        a.update_transform(dims(1280.0, 720.0), dims(1080.0, 2340.0))
            .unwrap();
        assert_eq!(a.state, first);
        assert_eq!(a.map_rect(Rect::new(100.0, 200.0, 300.0, 400.0)), probe);
    }

    #[test]
    fn reupdate_follows_viewport_change() {
        let mut mapper = CoordinateMapper::new();
        mapper
            .update_transform(dims(100.0, 100.0), dims(200.0, 200.0))
            .unwrap();
        let before = mapper.map_rect(Rect::new(10.0, 10.0, 20.0, 20.0));
        mapper
            .update_transform(dims(100.0, 100.0), dims(400.0, 400.0))
            .unwrap();
        let after = mapper.map_rect(Rect::new(10.0, 10.0, 20.0, 20.0));
        assert_ne!(before, after);
        assert_eq!(after.left, 40.0);
        assert_eq!(after.bottom, 80.0);
    }

    #[test]
    fn invalid_dimensions_keep_previous_state() {
        let mut mapper = CoordinateMapper::new();
        mapper
            .update_transform(dims(100.0, 50.0), dims(100.0, 100.0))
            .unwrap();
        let state = mapper.state;

        let err = mapper
            .update_transform(dims(0.0, 50.0), dims(100.0, 100.0))
            .unwrap_err();
        assert!(matches!(err, ReticleError::InvalidDimensions { .. }));
        assert_eq!(mapper.state, state);

        let err = mapper
            .update_transform(dims(100.0, 50.0), dims(100.0, f32::NAN))
            .unwrap_err();
        assert!(matches!(err, ReticleError::InvalidDimensions { .. }));
        assert_eq!(mapper.state, state);
    }
}
