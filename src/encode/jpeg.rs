use crate::foundation::core::Canvas;
use crate::foundation::error::{FramecapError, FramecapResult};

/// Compress a tightly packed RGB8 buffer as baseline JPEG.
pub(crate) fn encode_rgb8(canvas: Canvas, rgb: &[u8], quality: u8) -> FramecapResult<Vec<u8>> {
    let expected = canvas
        .pixel_count()
        .ok()
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| FramecapError::encode("rgb8 buffer size overflow"))?;
    if rgb.len() != expected {
        return Err(FramecapError::encode(format!(
            "jpeg encoder expects {expected} rgb8 bytes, got {}",
            rgb.len()
        )));
    }

    let mut out = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .encode(
            rgb,
            canvas.width,
            canvas.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| FramecapError::encode(format!("jpeg encode failed: {e}")))?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/jpeg.rs"]
mod tests;
