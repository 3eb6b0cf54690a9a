/// Draw scan overlays onto an image: a highlight rectangle per result and
/// the decoded payload as a label above it.
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::errors::{ReticleError, ReticleResult};
use crate::geometry::Dimensions;
use crate::scan::types::Overlay;

/// Highlight colour for scan boxes (RGBA).
const HIGHLIGHT: [u8; 4] = [255, 68, 68, 220];

/// A rendered overlay layer: PNG bytes plus a base64 copy for hosts that
/// ship images over JSON bridges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedFrame {
    pub image_bytes: Vec<u8>,
    pub image_base64: String,
}

/// Annotate `src_bytes` (JPEG/PNG, viewport-sized) with the given overlays.
///
/// Empty overlays are skipped, so publishing the clear signal reproduces the
/// source image unchanged. On high-resolution images (width > 1600) labels
/// are drawn at 2x scale.
pub fn annotate_image(src_bytes: &[u8], overlays: &[Overlay]) -> ReticleResult<AnnotatedFrame> {
    let img = image::load_from_memory(src_bytes)
        .map_err(|e| ReticleError::Render(format!("annotate load: {e}")))?;
    let mut canvas = img.to_rgba8();
    draw_overlays(&mut canvas, overlays);
    encode(canvas)
}

/// Render the overlays onto a transparent canvas of viewport size, for hosts
/// that composite a HUD layer over the live preview.
///
/// The clear signal yields a fully transparent layer.
pub fn render_hud(viewport: Dimensions, overlays: &[Overlay]) -> ReticleResult<AnnotatedFrame> {
    if !viewport.is_valid() {
        return Err(ReticleError::InvalidDimensions {
            width: viewport.width,
            height: viewport.height,
        });
    }
    let mut canvas =
        image::RgbaImage::new(viewport.width.round() as u32, viewport.height.round() as u32);
    draw_overlays(&mut canvas, overlays);
    encode(canvas)
}

fn draw_overlays(canvas: &mut image::RgbaImage, overlays: &[Overlay]) {
    let (w, _) = canvas.dimensions();
    let label_scale: u32 = if w > 1600 { 2 } else { 1 };
    let box_thickness: i32 = if w > 1600 { 3 } else { 2 };

    for overlay in overlays {
        if overlay.is_empty() {
            continue;
        }
        let x1 = overlay.region.left.round() as i32;
        let y1 = overlay.region.top.round() as i32;
        let x2 = overlay.region.right.round() as i32;
        let y2 = overlay.region.bottom.round() as i32;

        draw_rect(canvas, x1, y1, x2, y2, HIGHLIGHT, box_thickness);

        if !overlay.payload.is_empty() {
            let label_h_px = (5 * label_scale + 4) as i32;
            draw_label_bg(
                canvas,
                x1,
                (y1 - label_h_px).max(0),
                &overlay.payload,
                HIGHLIGHT,
                label_scale,
            );
        }
    }
}

fn encode(canvas: image::RgbaImage) -> ReticleResult<AnnotatedFrame> {
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(canvas)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| ReticleError::Render(format!("PNG encode: {e}")))?;
    let image_base64 = base64::engine::general_purpose::STANDARD.encode(&out);
    Ok(AnnotatedFrame {
        image_bytes: out,
        image_base64,
    })
}

// ── Drawing primitives ──────────────────────────────────────────────────────

fn draw_rect(
    canvas: &mut image::RgbaImage,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    col: [u8; 4],
    thickness: i32,
) {
    let (w, h) = canvas.dimensions();
    let (iw, ih) = (w as i32, h as i32);

    // Top & bottom edges
    for t in 0..thickness {
        let ty = y1 + t;
        let by = y2 - t;
        for x in x1..=x2 {
            if x >= 0 && x < iw {
                if ty >= 0 && ty < ih {
                    set_pixel(canvas, x as u32, ty as u32, col);
                }
                if by >= 0 && by < ih {
                    set_pixel(canvas, x as u32, by as u32, col);
                }
            }
        }
    }
    // Left & right edges
    for t in 0..thickness {
        let lx = x1 + t;
        let rx = x2 - t;
        for y in y1..=y2 {
            if y >= 0 && y < ih {
                if lx >= 0 && lx < iw {
                    set_pixel(canvas, lx as u32, y as u32, col);
                }
                if rx >= 0 && rx < iw {
                    set_pixel(canvas, rx as u32, y as u32, col);
                }
            }
        }
    }
}

fn draw_label_bg(canvas: &mut image::RgbaImage, x: i32, y: i32, text: &str, col: [u8; 4], scale: u32) {
    let (w, h) = canvas.dimensions();
    let x = x.max(0);
    let y = y.max(0);
    let char_w = 5 * scale + 1; // glyph width + 1px gap
    let char_h = 5 * scale; // glyph height
    let pad = 2 * scale;
    let label_w = text.len() as u32 * char_w + pad * 2;
    let label_h = char_h + pad * 2;

    // Dark background
    for dy in 0..label_h {
        for dx in 0..label_w {
            let px = x as u32 + dx;
            let py = y as u32 + dy;
            if px < w && py < h {
                let p = canvas.get_pixel_mut(px, py);
                p[0] = (p[0] as f32 * 0.2) as u8;
                p[1] = (p[1] as f32 * 0.2) as u8;
                p[2] = (p[2] as f32 * 0.2) as u8;
                p[3] = 255;
            }
        }
    }

    let text_x = x as u32 + pad;
    let text_y = y as u32 + pad;
    let step = 5 * scale + 1;

    for (i, c) in text.to_uppercase().chars().enumerate() {
        let gx = text_x + i as u32 * step;
        if gx + 5 * scale >= w {
            break;
        }
        draw_mini_glyph(canvas, c, gx, text_y, col, scale);
    }
}

/// Minimal 5x5 font renderer. Glyphs outside the table (lowercase is folded
/// first) are left blank.
fn draw_mini_glyph(
    canvas: &mut image::RgbaImage,
    c: char,
    px: u32,
    py: u32,
    col: [u8; 4],
    scale: u32,
) {
    let glyph = match c {
        '0'..='9' => MINI_FONT[(c as u8 - b'0') as usize],
        'A'..='Z' => MINI_FONT[10 + (c as u8 - b'A') as usize],
        ':' => [0b00000, 0b00100, 0b00000, 0b00100, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00100],
        '/' => [0b00001, 0b00010, 0b00100, 0b01000, 0b10000],
        '-' => [0b00000, 0b00000, 0b01110, 0b00000, 0b00000],
        '_' => [0b00000, 0b00000, 0b00000, 0b00000, 0b11111],
        ' ' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        _ => return,
    };
    let (w, h) = canvas.dimensions();
    for (row, &bits) in glyph.iter().enumerate() {
        for bit in 0..5u32 {
            if (bits >> (4 - bit)) & 1 == 0 {
                continue;
            }
            for sy in 0..scale {
                for sx in 0..scale {
                    let x = px + bit * scale + sx;
                    let y = py + row as u32 * scale + sy;
                    if x < w && y < h {
                        set_pixel(canvas, x, y, col);
                    }
                }
            }
        }
    }
}

fn set_pixel(canvas: &mut image::RgbaImage, x: u32, y: u32, col: [u8; 4]) {
    let p = canvas.get_pixel_mut(x, y);
    let a = col[3] as f32 / 255.0;
    p[0] = (p[0] as f32 * (1.0 - a) + col[0] as f32 * a).round() as u8;
    p[1] = (p[1] as f32 * (1.0 - a) + col[1] as f32 * a).round() as u8;
    p[2] = (p[2] as f32 * (1.0 - a) + col[2] as f32 * a).round() as u8;
    p[3] = 255;
}

/// 5x5 bitmap font: digits 0-9, letters A-Z.
const MINI_FONT: [[u8; 5]; 36] = [
    [0b01110, 0b10001, 0b10001, 0b10001, 0b01110], // 0
    [0b00100, 0b01100, 0b00100, 0b00100, 0b01110], // 1
    [0b01110, 0b10001, 0b00110, 0b01000, 0b11111], // 2
    [0b11110, 0b00001, 0b00110, 0b00001, 0b11110], // 3
    [0b00110, 0b01010, 0b10010, 0b11111, 0b00010], // 4
    [0b11111, 0b10000, 0b11110, 0b00001, 0b11110], // 5
    [0b01110, 0b10000, 0b11110, 0b10001, 0b01110], // 6
    [0b11111, 0b00001, 0b00010, 0b00100, 0b00100], // 7
    [0b01110, 0b10001, 0b01110, 0b10001, 0b01110], // 8
    [0b01110, 0b10001, 0b01111, 0b00001, 0b01110], // 9
    [0b01110, 0b10001, 0b11111, 0b10001, 0b10001], // A
    [0b11110, 0b10001, 0b11110, 0b10001, 0b11110], // B
    [0b01110, 0b10000, 0b10000, 0b10000, 0b01110], // C
    [0b11100, 0b10010, 0b10001, 0b10010, 0b11100], // D
    [0b11111, 0b10000, 0b11110, 0b10000, 0b11111], // E
    [0b11111, 0b10000, 0b11110, 0b10000, 0b10000], // F
    [0b01110, 0b10000, 0b10011, 0b10001, 0b01110], // G
    [0b10001, 0b10001, 0b11111, 0b10001, 0b10001], // H
    [0b01110, 0b00100, 0b00100, 0b00100, 0b01110], // I
    [0b00111, 0b00010, 0b00010, 0b10010, 0b01100], // J
    [0b10001, 0b10010, 0b11100, 0b10010, 0b10001], // K
    [0b10000, 0b10000, 0b10000, 0b10000, 0b11111], // L
    [0b10001, 0b11011, 0b10101, 0b10001, 0b10001], // M
    [0b10001, 0b11001, 0b10101, 0b10011, 0b10001], // N
    [0b01110, 0b10001, 0b10001, 0b10001, 0b01110], // O
    [0b11110, 0b10001, 0b11110, 0b10000, 0b10000], // P
    [0b01110, 0b10001, 0b10101, 0b10010, 0b01101], // Q
    [0b11110, 0b10001, 0b11110, 0b10010, 0b10001], // R
    [0b01111, 0b10000, 0b01110, 0b00001, 0b11110], // S
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100], // T
    [0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // U
    [0b10001, 0b10001, 0b10001, 0b01010, 0b00100], // V
    [0b10001, 0b10001, 0b10101, 0b11011, 0b10001], // W
    [0b10001, 0b01010, 0b00100, 0b01010, 0b10001], // X
    [0b10001, 0b01010, 0b00100, 0b00100, 0b00100], // Y
    [0b11111, 0b00010, 0b00100, 0b01000, 0b11111], // Z
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn overlay(payload: &str, region: Rect) -> Overlay {
        Overlay {
            payload: payload.into(),
            region,
        }
    }

    fn decode(frame: &AnnotatedFrame) -> image::RgbaImage {
        image::load_from_memory(&frame.image_bytes)
            .unwrap()
            .to_rgba8()
    }

    #[test]
    fn clear_signal_renders_transparent_layer() {
        let frame = render_hud(Dimensions::new(64.0, 64.0), &[Overlay::empty()]).unwrap();
        let img = decode(&frame);
        assert!(img.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn highlight_lands_on_region_edges() {
        let frame = render_hud(
            Dimensions::new(100.0, 100.0),
            &[overlay("", Rect::new(10.0, 10.0, 30.0, 30.0))],
        )
        .unwrap();
        let img = decode(&frame);
        // On the stroke: strongly red, opaque.
        let on = img.get_pixel(10, 10);
        assert_eq!(on[3], 255);
        assert!(on[0] > 200);
        // Inside the box but off the stroke: untouched.
        let off = img.get_pixel(20, 20);
        assert_eq!(off[3], 0);
    }

    #[test]
    fn out_of_bounds_region_is_clipped() {
        let frame = render_hud(
            Dimensions::new(50.0, 50.0),
            &[overlay("wide", Rect::new(-40.0, -40.0, 400.0, 400.0))],
        )
        .unwrap();
        assert!(!frame.image_bytes.is_empty());
    }

    #[test]
    fn hud_requires_valid_viewport() {
        let err = render_hud(Dimensions::new(0.0, 100.0), &[]).unwrap_err();
        assert!(matches!(err, ReticleError::InvalidDimensions { .. }));
    }

    #[test]
    fn annotates_existing_capture() {
        let blank = image::RgbaImage::from_pixel(64, 64, image::Rgba([255, 255, 255, 255]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(blank)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let frame =
            annotate_image(&png, &[overlay("OK:1", Rect::new(8.0, 20.0, 40.0, 40.0))]).unwrap();
        let img = decode(&frame);
        let stroke = img.get_pixel(8, 20);
        assert!(stroke[0] > 200 && stroke[1] < 150);

        let roundtrip = base64::engine::general_purpose::STANDARD
            .decode(&frame.image_base64)
            .unwrap();
        assert_eq!(roundtrip, frame.image_bytes);
    }

    #[test]
    fn annotate_rejects_garbage_input() {
        let err = annotate_image(b"not an image", &[]).unwrap_err();
        assert!(matches!(err, ReticleError::Render(_)));
    }
}
