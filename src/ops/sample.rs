//! Dominant-colour sampling: histogram over a small fixed patch, used for
//! the "mixed colour" preview.

use std::collections::HashMap;

use image::{Rgba, RgbaImage};

use crate::color;

/// Side of the square sample patch, in pixels.
pub const SAMPLE_SIZE: u32 = 50;

/// Stride through the patch — every 4th pixel, for speed.
const SAMPLE_STEP: usize = 4;

/// Most frequent opaque colour in the patch centred on the canvas, as an
/// upper-case hex string. `None` when the patch holds no opaque pixel.
pub fn dominant_color(buffer: &RgbaImage) -> Option<String> {
    dominant_color_at(
        buffer,
        buffer.width() as f32 / 2.0,
        buffer.height() as f32 / 2.0,
    )
}

/// Most frequent opaque colour in the patch centred on `(cx, cy)`.
///
/// The patch is scanned in row-major order and ties resolve to the colour
/// whose count reached the maximum first, i.e. first-seen wins.
pub fn dominant_color_at(buffer: &RgbaImage, cx: f32, cy: f32) -> Option<String> {
    let (w, h) = (buffer.width(), buffer.height());
    if w == 0 || h == 0 {
        return None;
    }

    let half = (SAMPLE_SIZE / 2) as f32;
    let x0 = (cx - half).max(0.0) as u32;
    let y0 = (cy - half).max(0.0) as u32;
    let x1 = (x0 + SAMPLE_SIZE).min(w);
    let y1 = (y0 + SAMPLE_SIZE).min(h);
    let patch_w = x1.saturating_sub(x0) as usize;
    let patch_h = y1.saturating_sub(y0) as usize;
    if patch_w == 0 || patch_h == 0 {
        return None;
    }

    let mut counts: HashMap<[u8; 3], u32> = HashMap::new();
    let mut best: Option<[u8; 3]> = None;
    let mut best_count = 0u32;

    // Strict `>` below keeps the first colour that reached the max.
    for i in (0..patch_w * patch_h).step_by(SAMPLE_STEP) {
        let x = x0 + (i % patch_w) as u32;
        let y = y0 + (i / patch_w) as u32;
        let px = buffer.get_pixel(x, y);
        if px[3] == 0 {
            continue;
        }
        let key = [px[0], px[1], px[2]];
        let count = counts.entry(key).or_insert(0);
        *count += 1;
        if *count > best_count {
            best_count = *count;
            best = Some(key);
        }
    }

    best.map(|c| color::to_hex(Rgba([c[0], c[1], c[2], 255])))
}

// ============================================================================
// TESTS
// ============================================================================
