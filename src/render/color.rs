use crate::foundation::core::Rgba8;
use crate::foundation::error::{FramecapError, FramecapResult};

/// Parse a CSS-style hex color: `#RRGGBB` or `#RRGGBBAA`, case-insensitive, `#` optional.
pub fn parse_hex_color(s: &str) -> FramecapResult<Rgba8> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> FramecapResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| FramecapError::validation(format!("invalid hex byte \"{pair}\"")))
    }

    if !s.is_ascii() {
        return Err(FramecapError::validation("hex color must be ascii"));
    }
    match s.len() {
        6 => Ok(Rgba8::new(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            255,
        )),
        8 => Ok(Rgba8::new(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        )),
        _ => Err(FramecapError::validation(
            "hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)",
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/color.rs"]
mod tests;
