use crate::foundation::error::{FramecapError, FramecapResult};

pub use kurbo::{Point, Vec2};

/// Pixel dimensions of a frame, layer, or output surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create validated, non-empty dimensions.
    pub fn new(width: u32, height: u32) -> FramecapResult<Self> {
        if width == 0 || height == 0 {
            return Err(FramecapError::validation(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Number of pixels. Fails when the product does not fit `usize`.
    pub fn pixel_count(self) -> FramecapResult<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .ok_or_else(|| FramecapError::validation("pixel count overflow"))
    }

    /// Expected byte length of a tightly packed RGBA8 buffer of this size.
    pub fn rgba8_len(self) -> FramecapResult<usize> {
        self.pixel_count()?
            .checked_mul(4)
            .ok_or_else(|| FramecapError::validation("rgba8 buffer size overflow"))
    }
}

/// Straight (non-premultiplied) RGBA8 color. Also the brush type of comment text layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Build a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Convert to premultiplied channel order `[r, g, b, a]`.
    pub fn to_premul_array(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
