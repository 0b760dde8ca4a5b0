//! Instant-mix: a single whole-canvas blend pass.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::color::{self, INSTANT_MIX_FACTOR};

/// Blend `color` into every pixel of the buffer.
///
/// If the buffer has no painted content at all, the colour fills it opaquely.
/// Otherwise painted pixels are pulled halfway toward the colour (their
/// coverage is kept) and transparent pixels take it at full opacity.
///
/// This is the most expensive operation in the core — O(width × height) —
/// and it runs to completion before returning: callers never observe a
/// partially mixed buffer. The pass itself is parallelised per pixel row.
pub fn instant_mix(buffer: &mut RgbaImage, color: Rgba<u8>) {
    let opaque = Rgba([color[0], color[1], color[2], 255]);

    let has_content = buffer.as_raw().chunks_exact(4).any(|px| px[3] > 0);
    if !has_content {
        // Empty canvas: plain fill, no per-pixel blending needed.
        for px in buffer.pixels_mut() {
            *px = opaque;
        }
        return;
    }

    let raw: &mut [u8] = &mut *buffer;
    raw.par_chunks_exact_mut(4).for_each(|px| {
        if px[3] > 0 {
            let blended = color::blend(
                Rgba([px[0], px[1], px[2], px[3]]),
                color,
                INSTANT_MIX_FACTOR,
            );
            // Coverage of a painted pixel is left as-is; only colour moves.
            px[0] = blended[0];
            px[1] = blended[1];
            px[2] = blended[2];
        } else {
            px.copy_from_slice(&opaque.0);
        }
    });
}

// ============================================================================
// TESTS
// ============================================================================
