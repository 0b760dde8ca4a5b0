//! Pure colour math: hex parsing/formatting, channel interpolation, and the
//! canonical mix factors used by the stamping and instant-mix paths.

use image::Rgba;

// ============================================================================
// MIX FACTORS
// ============================================================================

/// Pickup of the new colour for a standalone dot stamp.
pub const DOT_MIX_FACTOR: f32 = 0.3;

/// Pickup for each interpolated sample along a stroke segment. Slightly below
/// the dot factor so colour accumulates gradually along a fast stroke instead
/// of overwriting it.
pub const LINE_MIX_FACTOR: f32 = 0.25;

/// Pickup for the whole-canvas instant-mix pass.
pub const INSTANT_MIX_FACTOR: f32 = 0.5;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// Input was not a 6-digit hex colour (optional leading `#`).
    InvalidFormat(String),
}

impl std::fmt::Display for ColorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorError::InvalidFormat(s) => write!(f, "invalid hex colour: {:?}", s),
        }
    }
}

impl std::error::Error for ColorError {}

// ============================================================================
// HEX PARSING / FORMATTING
// ============================================================================

/// Parse a 6-digit hex colour, with or without a leading `#`,
/// case-insensitive. The result is fully opaque.
pub fn parse_hex(hex: &str) -> Result<Rgba<u8>, ColorError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidFormat(hex.to_string()));
    }
    let val = u32::from_str_radix(digits, 16)
        .map_err(|_| ColorError::InvalidFormat(hex.to_string()))?;
    Ok(Rgba([(val >> 16) as u8, (val >> 8) as u8, val as u8, 255]))
}

/// Legacy parser: malformed input yields opaque black instead of an error.
///
/// Retained for callers that assume colour parsing never fails (random
/// colour pickers, quest colour matching). New code should prefer
/// [`parse_hex`].
pub fn parse_hex_lossy(hex: &str) -> Rgba<u8> {
    parse_hex(hex).unwrap_or(Rgba([0, 0, 0, 255]))
}

/// Format as `#RRGGBB`, upper-case. Alpha is not part of the hex boundary.
pub fn to_hex(color: Rgba<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", color[0], color[1], color[2])
}

// ============================================================================
// BLENDING
// ============================================================================

/// Per-channel linear interpolation between two colours.
///
/// `factor` is clamped to [0,1] first: 0 returns `a`'s channels, 1 returns
/// `b`'s. The result's alpha is the max of the inputs — mixing onto an
/// existing painted pixel never makes it more transparent.
pub fn blend(a: Rgba<u8>, b: Rgba<u8>, factor: f32) -> Rgba<u8> {
    let f = factor.clamp(0.0, 1.0);
    let lerp = |x: u8, y: u8| (x as f32 * (1.0 - f) + y as f32 * f).round() as u8;
    Rgba([
        lerp(a[0], b[0]),
        lerp(a[1], b[1]),
        lerp(a[2], b[2]),
        a[3].max(b[3]),
    ])
}

/// HSL to fully-opaque RGBA. Hue in degrees (wraps), saturation and
/// lightness in 0–1. Used by the rainbow tool's cycling hue.
pub fn hsl_to_rgba(h: f32, s: f32, l: f32) -> Rgba<u8> {
    let h = h.rem_euclid(360.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Rgba([
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
        255,
    ])
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_accepts_both_prefix_forms_and_cases() {
        assert_eq!(parse_hex("#ff8800").unwrap(), Rgba([255, 136, 0, 255]));
        assert_eq!(parse_hex("FF8800").unwrap(), Rgba([255, 136, 0, 255]));
        assert_eq!(parse_hex("#AbCdEf").unwrap(), Rgba([171, 205, 239, 255]));
    }

    #[test]
    fn parse_hex_rejects_malformed_input() {
        assert!(parse_hex("").is_err());
        assert!(parse_hex("#fff").is_err());
        assert!(parse_hex("#ff88000").is_err());
        assert!(parse_hex("zzzzzz").is_err());
        assert!(parse_hex("#ff88g0").is_err());
    }

    #[test]
    fn parse_hex_lossy_falls_back_to_black() {
        assert_eq!(parse_hex_lossy("not a colour"), Rgba([0, 0, 0, 255]));
        assert_eq!(parse_hex_lossy("#112233"), Rgba([17, 34, 51, 255]));
    }

    #[test]
    fn hex_round_trip() {
        for &(r, g, b) in &[
            (0u8, 0u8, 0u8),
            (255, 255, 255),
            (255, 0, 0),
            (1, 2, 3),
            (128, 200, 17),
            (254, 1, 99),
        ] {
            let c = Rgba([r, g, b, 255]);
            assert_eq!(parse_hex(&to_hex(c)).unwrap(), c);
        }
    }

    #[test]
    fn to_hex_is_upper_case() {
        assert_eq!(to_hex(Rgba([255, 136, 0, 255])), "#FF8800");
        assert_eq!(to_hex(Rgba([10, 11, 12, 0])), "#0A0B0C");
    }

    #[test]
    fn blend_identity_at_boundaries() {
        let a = Rgba([10, 20, 30, 255]);
        let b = Rgba([200, 100, 50, 255]);
        assert_eq!(blend(a, b, 0.0), a);
        assert_eq!(blend(a, b, 1.0), b);
    }

    #[test]
    fn blend_clamps_factor_outside_unit_range() {
        let a = Rgba([10, 20, 30, 255]);
        let b = Rgba([200, 100, 50, 255]);
        assert_eq!(blend(a, b, -3.0), blend(a, b, 0.0));
        assert_eq!(blend(a, b, 42.0), blend(a, b, 1.0));
    }

    #[test]
    fn blend_halfway_rounds_per_channel() {
        let blue = Rgba([0, 0, 255, 255]);
        let red = Rgba([255, 0, 0, 255]);
        assert_eq!(blend(blue, red, 0.5), Rgba([128, 0, 128, 255]));
    }

    #[test]
    fn blend_alpha_never_decreases() {
        let painted = Rgba([50, 60, 70, 255]);
        let faint = Rgba([200, 10, 10, 40]);
        assert_eq!(blend(painted, faint, 0.5)[3], 255);
        assert_eq!(blend(faint, painted, 0.5)[3], 255);
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(hsl_to_rgba(0.0, 1.0, 0.5), Rgba([255, 0, 0, 255]));
        assert_eq!(hsl_to_rgba(120.0, 1.0, 0.5), Rgba([0, 255, 0, 255]));
        assert_eq!(hsl_to_rgba(240.0, 1.0, 0.5), Rgba([0, 0, 255, 255]));
        // Hue wraps
        assert_eq!(hsl_to_rgba(360.0, 1.0, 0.5), hsl_to_rgba(0.0, 1.0, 0.5));
    }
}
