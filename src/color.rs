//! Color utilities: hex validation and deterministic per-name colors.

/// Saturation used for generated colors, in percent.
pub const DEFAULT_SATURATION: f64 = 60.0;
/// Lightness used for generated colors, in percent.
pub const DEFAULT_LIGHTNESS: f64 = 50.0;

/// Validate if a string is a valid hex color (e.g., #RRGGBB).
pub fn is_valid_hex(s: &str) -> bool {
    s.starts_with('#') && s.len() == 7 && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// 32-bit rolling hash (`h * 31 + unit`) over the UTF-16 code units of `name`.
pub fn name_hash(name: &str) -> i32 {
    name.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Hue in degrees (0..360) derived from [`name_hash`].
pub fn hue_for_name(name: &str) -> u16 {
    // i64 so that |i32::MIN| does not overflow
    let hue = i64::from(name_hash(name)).abs() % 360;
    hue as u16
}

/// Converts HSL (hue in degrees, saturation and lightness in percent) to `#rrggbb`.
pub fn hsl_to_hex(hue: u16, saturation: f64, lightness: f64) -> String {
    let h = f64::from(hue % 360);
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let l = (lightness / 100.0).clamp(0.0, 1.0);

    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = chroma * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - chroma / 2.0;
    let (r, g, b) = match hue % 360 {
        0..60 => (chroma, x, 0.0),
        60..120 => (x, chroma, 0.0),
        120..180 => (0.0, chroma, x),
        180..240 => (0.0, x, chroma),
        240..300 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}

/// The generated color for `name`. Pure: depends only on the name.
pub fn color_for_name(name: &str) -> String {
    hsl_to_hex(hue_for_name(name), DEFAULT_SATURATION, DEFAULT_LIGHTNESS)
}
