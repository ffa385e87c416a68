use crate::foundation::core::Canvas;
use crate::foundation::error::{FramecapError, FramecapResult};
use crate::foundation::math::{mul_div255_u8, opacity_to_u8};

pub type PremulRgba8 = [u8; 4];

/// Source-over for a single premultiplied pixel, with `src` scaled by `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = opacity_to_u8(opacity);
    if op == 0 || src[3] == 0 {
        return dst;
    }

    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Source-over of a premultiplied buffer onto another of the same length.
///
/// `opacity` is a single alpha applied to the whole source; `0.0` leaves `dst` untouched.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> FramecapResult<()> {
    check_lengths(dst, src, "over_in_place")?;
    if opacity_to_u8(opacity) == 0 {
        return Ok(());
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Axis-aligned pixel rectangle inside a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Source-over of a premultiplied `tile`-sized buffer onto the matching rectangle of `dst`.
pub fn over_tile_in_place(
    dst: &mut [u8],
    dst_canvas: Canvas,
    src: &[u8],
    tile: Tile,
    opacity: f32,
) -> FramecapResult<()> {
    let fits = |start: u32, len: u32, limit: u32| start.checked_add(len).is_some_and(|e| e <= limit);
    if !fits(tile.x, tile.width, dst_canvas.width) || !fits(tile.y, tile.height, dst_canvas.height)
    {
        return Err(FramecapError::precondition(format!(
            "tile {tile:?} exceeds {}x{} surface",
            dst_canvas.width, dst_canvas.height
        )));
    }
    if dst.len() != dst_canvas.rgba8_len()? {
        return Err(FramecapError::precondition(
            "over_tile_in_place destination does not match its canvas",
        ));
    }
    let row = tile.width as usize * 4;
    if src.len() != row * tile.height as usize {
        return Err(FramecapError::precondition(
            "over_tile_in_place source does not match the tile size",
        ));
    }
    if row == 0 || opacity_to_u8(opacity) == 0 {
        return Ok(());
    }

    let stride = dst_canvas.width as usize * 4;
    for (r, src_row) in src.chunks_exact(row).enumerate() {
        let start = (tile.y as usize + r) * stride + tile.x as usize * 4;
        over_in_place(&mut dst[start..start + row], src_row, opacity)?;
    }
    Ok(())
}

/// Source-over of a straight-alpha buffer, premultiplying each source pixel on the fly.
pub fn over_straight_in_place(dst: &mut [u8], src: &[u8]) -> FramecapResult<()> {
    check_lengths(dst, src, "over_straight_in_place")?;
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3];
        if a == 0 {
            continue;
        }
        let a16 = u16::from(a);
        let premul = [
            mul_div255(u16::from(s[0]), a16),
            mul_div255(u16::from(s[1]), a16),
            mul_div255(u16::from(s[2]), a16),
            a,
        ];
        let out = over([d[0], d[1], d[2], d[3]], premul, 1.0);
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn check_lengths(dst: &[u8], src: &[u8], what: &str) -> FramecapResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(FramecapError::precondition(format!(
            "{what} expects equal-length rgba8 buffers"
        )));
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
