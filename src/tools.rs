//! Tool kinds, the live tool selection, and the per-gesture latched stroke
//! state that does the actual pixel stamping.

use image::{Rgba, RgbaImage};

use crate::color;

// ============================================================================
// TOOL KINDS
// ============================================================================

/// Drawing tool. Dispatch is a tagged union, not string matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Brush,
    Eraser,
    Enhanced(EnhancedTool),
}

/// Decorative brush variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnhancedTool {
    /// Cycles hue per stamp.
    Rainbow,
    /// Scattered translucent blobs.
    Watercolor,
    /// Additive bright core.
    Neon,
    /// Speckle spray.
    Pattern,
}

impl Tool {
    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::Brush => "Brush",
            Tool::Eraser => "Eraser",
            Tool::Enhanced(EnhancedTool::Rainbow) => "Rainbow",
            Tool::Enhanced(EnhancedTool::Watercolor) => "Watercolor",
            Tool::Enhanced(EnhancedTool::Neon) => "Neon",
            Tool::Enhanced(EnhancedTool::Pattern) => "Pattern",
        }
    }
}

// ============================================================================
// MIX MODE
// ============================================================================

/// How a pointer-down is interpreted: a progressive brush gesture, or a
/// single whole-canvas blend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MixMode {
    #[default]
    Draw,
    Instant,
}

// ============================================================================
// TOOL SELECTION — the externally mutated parameters
// ============================================================================

/// The current tool/colour selection. Mutating it affects the *next* stroke
/// only; an in-flight stroke works from its own latched copy.
#[derive(Clone, Debug)]
pub struct ToolSelection {
    pub tool: Tool,
    pub color: Rgba<u8>,
    /// Brush diameter in pixels.
    pub brush_size: f32,
    /// 0.0–1.0.
    pub brush_opacity: f32,
    pub mix_mode: MixMode,
}

impl Default for ToolSelection {
    fn default() -> Self {
        Self {
            tool: Tool::Brush,
            color: Rgba([0, 0, 0, 255]),
            brush_size: 10.0,
            brush_opacity: 1.0,
            mix_mode: MixMode::Draw,
        }
    }
}

// ============================================================================
// LATCHED STROKE STATE
// ============================================================================

/// Per-gesture stroke state, frozen at pointer-down.
///
/// Tool, colour, size and opacity are copied here and never re-read from the
/// live selection, so a selection change mid-stroke cannot affect the
/// gesture in flight.
#[derive(Clone, Debug)]
pub struct LatchedStroke {
    pub tool: Tool,
    pub color: Rgba<u8>,
    pub brush_size: f32,
    pub brush_opacity: f32,
    pub last_pos: (f32, f32),
    /// Rainbow tool hue phase, advanced per stamp.
    rainbow_hue: f32,
    /// Monotonic stamp counter; seeds the deterministic per-stamp jitter.
    stamp_counter: u32,
}

impl LatchedStroke {
    pub fn latch(selection: &ToolSelection, pos: (f32, f32)) -> Self {
        Self {
            tool: selection.tool,
            color: selection.color,
            brush_size: selection.brush_size.max(1.0),
            brush_opacity: selection.brush_opacity.clamp(0.0, 1.0),
            last_pos: pos,
            rainbow_hue: 0.0,
            stamp_counter: 0,
        }
    }

    /// Stamp one brush footprint at `pos`.
    ///
    /// `mix_factor` is the per-stamp pickup of the stroke colour over already
    /// painted pixels ([`color::DOT_MIX_FACTOR`] for a standalone dot,
    /// [`color::LINE_MIX_FACTOR`] for samples along a segment).
    pub fn stamp_at(&mut self, buffer: &mut RgbaImage, pos: (f32, f32), mix_factor: f32) {
        self.stamp_counter = self.stamp_counter.wrapping_add(1);
        let radius = self.brush_size / 2.0;
        match self.tool {
            Tool::Brush => {
                stamp_blend_dot(buffer, pos, radius, self.color, self.brush_opacity, mix_factor)
            }
            Tool::Eraser => stamp_erase_dot(buffer, pos, radius, self.brush_opacity),
            Tool::Enhanced(tool) => self.stamp_enhanced(buffer, pos, radius, tool),
        }
    }

    fn stamp_enhanced(
        &mut self,
        buffer: &mut RgbaImage,
        pos: (f32, f32),
        radius: f32,
        tool: EnhancedTool,
    ) {
        match tool {
            EnhancedTool::Rainbow => {
                self.rainbow_hue = (self.rainbow_hue + 5.0) % 360.0;
                let c = color::hsl_to_rgba(self.rainbow_hue, 1.0, 0.5);
                fill_circle_over(buffer, pos, radius, c, self.brush_opacity);
            }
            EnhancedTool::Watercolor => {
                // Five soft blobs scattered within the footprint, each very
                // translucent so repeated passes build up pigment.
                for i in 0..5u32 {
                    let (ox, oy) = self.jitter(pos, i, radius);
                    let h = stamp_hash(pos.0, pos.1, self.stamp_counter.wrapping_add(i * 777));
                    let blob_radius = radius * (0.5 + 0.5 * unit(h));
                    fill_circle_over(
                        buffer,
                        (pos.0 + ox, pos.1 + oy),
                        blob_radius,
                        self.color,
                        0.1 * self.brush_opacity,
                    );
                }
            }
            EnhancedTool::Neon => {
                // Small additive core; channel light accumulates where stamps
                // overlap instead of averaging out.
                fill_circle_additive(buffer, pos, radius * 0.3, self.color, self.brush_opacity);
            }
            EnhancedTool::Pattern => {
                // Five 2px speckles scattered within the footprint.
                for i in 0..5u32 {
                    let (ox, oy) = self.jitter(pos, i, radius);
                    fill_circle_over(
                        buffer,
                        (pos.0 + ox, pos.1 + oy),
                        2.0,
                        self.color,
                        self.brush_opacity,
                    );
                }
            }
        }
    }

    /// Deterministic scatter offset in ±radius per axis.
    fn jitter(&self, pos: (f32, f32), i: u32, radius: f32) -> (f32, f32) {
        let h1 = stamp_hash(pos.0, pos.1, self.stamp_counter.wrapping_add(i * 7919));
        let h2 = stamp_hash(pos.1, pos.0, self.stamp_counter.wrapping_add(i * 99991));
        (
            (unit(h1) - 0.5) * radius * 2.0,
            (unit(h2) - 0.5) * radius * 2.0,
        )
    }
}

// ============================================================================
// STAMP PRIMITIVES
// ============================================================================

/// Brush dot with colour pickup: pixels already painted blend toward the
/// stroke colour at `mix_factor`; unpainted pixels take it directly at the
/// stroke opacity.
fn stamp_blend_dot(
    buffer: &mut RgbaImage,
    pos: (f32, f32),
    radius: f32,
    color: Rgba<u8>,
    opacity: f32,
    mix_factor: f32,
) {
    let Some((min_x, max_x, min_y, max_y)) = footprint(buffer, pos, radius) else {
        return;
    };
    let r2 = radius * radius;
    let painted_alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 - pos.0;
            let dy = y as f32 - pos.1;
            if dx * dx + dy * dy > r2 {
                continue;
            }
            let existing = *buffer.get_pixel(x, y);
            let out = if existing[3] > 0 {
                color::blend(existing, color, mix_factor)
            } else {
                Rgba([color[0], color[1], color[2], painted_alpha])
            };
            buffer.put_pixel(x, y, out);
        }
    }
}

/// Eraser dot: destination-out. Alpha inside the footprint is scaled down by
/// the brush opacity. Deliberately a separate path — erasing is coverage
/// removal, not colour blending.
fn stamp_erase_dot(buffer: &mut RgbaImage, pos: (f32, f32), radius: f32, opacity: f32) {
    let Some((min_x, max_x, min_y, max_y)) = footprint(buffer, pos, radius) else {
        return;
    };
    let r2 = radius * radius;
    let keep = 1.0 - opacity.clamp(0.0, 1.0);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 - pos.0;
            let dy = y as f32 - pos.1;
            if dx * dx + dy * dy > r2 {
                continue;
            }
            let px = buffer.get_pixel_mut(x, y);
            px[3] = (px[3] as f32 * keep).round() as u8;
        }
    }
}

/// Plain source-over circle at the given alpha (enhanced tools).
fn fill_circle_over(
    buffer: &mut RgbaImage,
    pos: (f32, f32),
    radius: f32,
    color: Rgba<u8>,
    alpha: f32,
) {
    let sa = alpha.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let Some((min_x, max_x, min_y, max_y)) = footprint(buffer, pos, radius) else {
        return;
    };
    let r2 = radius * radius;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 - pos.0;
            let dy = y as f32 - pos.1;
            if dx * dx + dy * dy > r2 {
                continue;
            }
            let dst = *buffer.get_pixel(x, y);
            let da = dst[3] as f32 / 255.0;
            let out_a = sa + da * (1.0 - sa);
            if out_a <= 0.0 {
                continue;
            }
            let comp = |s: u8, d: u8| {
                ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a).round() as u8
            };
            buffer.put_pixel(
                x,
                y,
                Rgba([
                    comp(color[0], dst[0]),
                    comp(color[1], dst[1]),
                    comp(color[2], dst[2]),
                    (out_a * 255.0).round() as u8,
                ]),
            );
        }
    }
}

/// Additive circle (the `lighter` composite): channels saturate upward.
fn fill_circle_additive(
    buffer: &mut RgbaImage,
    pos: (f32, f32),
    radius: f32,
    color: Rgba<u8>,
    alpha: f32,
) {
    let sa = alpha.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let Some((min_x, max_x, min_y, max_y)) = footprint(buffer, pos, radius) else {
        return;
    };
    let r2 = radius * radius;
    let add = [
        (color[0] as f32 * sa).round() as u8,
        (color[1] as f32 * sa).round() as u8,
        (color[2] as f32 * sa).round() as u8,
    ];
    let src_a = (sa * 255.0).round() as u8;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 - pos.0;
            let dy = y as f32 - pos.1;
            if dx * dx + dy * dy > r2 {
                continue;
            }
            let px = buffer.get_pixel_mut(x, y);
            px[0] = px[0].saturating_add(add[0]);
            px[1] = px[1].saturating_add(add[1]);
            px[2] = px[2].saturating_add(add[2]);
            px[3] = px[3].max(src_a);
        }
    }
}

/// Pixel bounds of a circular footprint, clamped to the buffer. `None` when
/// the footprint lies entirely outside.
fn footprint(
    buffer: &RgbaImage,
    pos: (f32, f32),
    radius: f32,
) -> Option<(u32, u32, u32, u32)> {
    let (w, h) = (buffer.width(), buffer.height());
    if w == 0 || h == 0 || pos.0 + radius < 0.0 || pos.1 + radius < 0.0 {
        return None;
    }
    if pos.0 - radius >= w as f32 || pos.1 - radius >= h as f32 {
        return None;
    }
    let min_x = (pos.0 - radius).max(0.0) as u32;
    let max_x = ((pos.0 + radius) as u32).min(w - 1);
    let min_y = (pos.1 - radius).max(0.0) as u32;
    let max_y = ((pos.1 + radius) as u32).min(h - 1);
    Some((min_x, max_x, min_y, max_y))
}

/// Deterministic position/counter hash for per-stamp jitter. No RNG
/// dependency; the same gesture replays identically.
fn stamp_hash(x: f32, y: f32, counter: u32) -> u32 {
    let ix = (x * 100.0) as u32;
    let iy = (y * 100.0) as u32;
    let mut h = ix
        .wrapping_mul(374761393)
        .wrapping_add(iy.wrapping_mul(668265263))
        .wrapping_add(counter.wrapping_mul(1013904223));
    h ^= h >> 13;
    h = h.wrapping_mul(1274126177);
    h ^= h >> 16;
    h
}

/// Map a hash to 0.0–1.0.
fn unit(h: u32) -> f32 {
    h as f32 / u32::MAX as f32
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn stroke(tool: Tool) -> LatchedStroke {
        let selection = ToolSelection {
            tool,
            color: RED,
            brush_size: 10.0,
            brush_opacity: 1.0,
            mix_mode: MixMode::Draw,
        };
        LatchedStroke::latch(&selection, (16.0, 16.0))
    }

    #[test]
    fn brush_dot_replaces_unpainted_pixels() {
        let mut buf = RgbaImage::new(32, 32);
        stroke(Tool::Brush).stamp_at(&mut buf, (16.0, 16.0), color::DOT_MIX_FACTOR);
        assert_eq!(*buf.get_pixel(16, 16), RED);
        // Outside the 5px radius: untouched
        assert_eq!(*buf.get_pixel(16, 26), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn brush_dot_blends_painted_pixels() {
        let mut buf = RgbaImage::from_pixel(32, 32, BLUE);
        stroke(Tool::Brush).stamp_at(&mut buf, (16.0, 16.0), 0.5);
        assert_eq!(*buf.get_pixel(16, 16), Rgba([128, 0, 128, 255]));
    }

    #[test]
    fn brush_respects_opacity_on_unpainted_pixels() {
        let mut buf = RgbaImage::new(32, 32);
        let selection = ToolSelection {
            brush_opacity: 0.5,
            color: RED,
            ..ToolSelection::default()
        };
        let mut s = LatchedStroke::latch(&selection, (16.0, 16.0));
        s.stamp_at(&mut buf, (16.0, 16.0), color::DOT_MIX_FACTOR);
        assert_eq!(*buf.get_pixel(16, 16), Rgba([255, 0, 0, 128]));
    }

    #[test]
    fn eraser_removes_coverage_without_touching_colour() {
        let mut buf = RgbaImage::from_pixel(32, 32, BLUE);
        stroke(Tool::Eraser).stamp_at(&mut buf, (16.0, 16.0), color::DOT_MIX_FACTOR);
        let px = *buf.get_pixel(16, 16);
        assert_eq!(px[3], 0);
        // Colour channels are left alone — only coverage goes
        assert_eq!((px[0], px[1], px[2]), (0, 0, 255));
        // Outside the footprint the fill is intact
        assert_eq!(*buf.get_pixel(16, 26), BLUE);
    }

    #[test]
    fn half_opacity_eraser_halves_alpha() {
        let mut buf = RgbaImage::from_pixel(32, 32, BLUE);
        let selection = ToolSelection {
            tool: Tool::Eraser,
            brush_opacity: 0.5,
            ..ToolSelection::default()
        };
        let mut s = LatchedStroke::latch(&selection, (16.0, 16.0));
        s.stamp_at(&mut buf, (16.0, 16.0), color::DOT_MIX_FACTOR);
        assert_eq!(buf.get_pixel(16, 16)[3], 128);
    }

    #[test]
    fn off_canvas_stamp_is_a_no_op() {
        let mut buf = RgbaImage::new(32, 32);
        stroke(Tool::Brush).stamp_at(&mut buf, (-50.0, -50.0), color::DOT_MIX_FACTOR);
        stroke(Tool::Brush).stamp_at(&mut buf, (500.0, 500.0), color::DOT_MIX_FACTOR);
        assert!(buf.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn neon_core_is_additive() {
        let mut buf = RgbaImage::from_pixel(8, 8, Rgba([200, 0, 0, 255]));
        let mut s = stroke(Tool::Enhanced(EnhancedTool::Neon));
        s.stamp_at(&mut buf, (4.0, 4.0), color::DOT_MIX_FACTOR);
        // Red saturates at 255 rather than averaging down
        assert_eq!(buf.get_pixel(4, 4)[0], 255);
    }

    #[test]
    fn rainbow_hue_advances_per_stamp() {
        let mut buf = RgbaImage::new(64, 64);
        let mut s = stroke(Tool::Enhanced(EnhancedTool::Rainbow));
        s.stamp_at(&mut buf, (10.0, 10.0), color::DOT_MIX_FACTOR);
        let first = *buf.get_pixel(10, 10);
        s.stamp_at(&mut buf, (40.0, 40.0), color::DOT_MIX_FACTOR);
        let second = *buf.get_pixel(40, 40);
        assert_ne!(first, second);
    }

    #[test]
    fn jitter_is_deterministic() {
        let s = stroke(Tool::Enhanced(EnhancedTool::Pattern));
        assert_eq!(s.jitter((5.0, 5.0), 2, 8.0), s.jitter((5.0, 5.0), 2, 8.0));
    }
}
