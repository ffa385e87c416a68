//! Comment overlay rasterization.
//!
//! Comments are authored against a reference coordinate space (the player size at the time the
//! comments were laid out) and rescaled to the capture size. Font metrics follow the horizontal
//! ratio only; vertical positions use the vertical ratio.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Point, Rgba8, Vec2};
use crate::foundation::error::{FramecapError, FramecapResult};
use crate::render::blur::GaussianBlur;
use crate::render::color::parse_hex_color;
use crate::foundation::math::mul_div255_u8;
use crate::render::composite::{Tile, over_in_place, over_tile_in_place};
use crate::render::text::TextLayoutEngine;

/// Drop-shadow offset in reference pixels, applied on both axes.
pub const SHADOW_OFFSET_PX: f64 = 1.2;
/// Drop-shadow blur in reference pixels.
pub const SHADOW_BLUR_PX: f64 = 4.0;
/// Drop-shadow color: black at 90% opacity, before scaling by the fill alpha.
pub const SHADOW_COLOR: Rgba8 = Rgba8::new(0, 0, 0, 230);

/// Shadow paint for a comment drawn in `fill`. A translucent fill casts a proportionally
/// lighter shadow.
pub fn shadow_color(fill: Rgba8) -> Rgba8 {
    Rgba8 {
        a: mul_div255_u8(u16::from(SHADOW_COLOR.a), u16::from(fill.a)),
        ..SHADOW_COLOR
    }
}

/// One comment, positioned in the reference coordinate space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommentItem {
    /// Top edge of the text box.
    pub top: f64,
    /// Left edge of the text box.
    pub left: f64,
    /// Fill color as `#RRGGBB` or `#RRGGBBAA`.
    pub color: String,
    /// Font size in reference pixels.
    pub font_size: f64,
    /// Text to draw.
    pub text: String,
}

/// A comment overlay as authored by the player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommentLayerSpec {
    /// Width of the coordinate space the items were authored in.
    pub reference_width: f64,
    /// Height of the coordinate space the items were authored in.
    pub reference_height: f64,
    /// Global opacity applied once when merging the whole layer.
    pub opacity: f32,
    /// Items in paint order.
    pub items: Vec<CommentItem>,
}

impl CommentLayerSpec {
    /// Check reference size, opacity, and per-item sizes.
    pub fn validate(&self) -> FramecapResult<()> {
        for (name, v) in [
            ("reference_width", self.reference_width),
            ("reference_height", self.reference_height),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(FramecapError::validation(format!(
                    "comment layer {name} must be finite and > 0"
                )));
            }
        }
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(FramecapError::validation(
                "comment layer opacity must be within 0.0..=1.0",
            ));
        }
        for (i, item) in self.items.iter().enumerate() {
            if !item.font_size.is_finite() || item.font_size <= 0.0 {
                return Err(FramecapError::validation(format!(
                    "comment {i} font_size must be finite and > 0"
                )));
            }
            if !item.top.is_finite() || !item.left.is_finite() {
                return Err(FramecapError::validation(format!(
                    "comment {i} position must be finite"
                )));
            }
        }
        Ok(())
    }

    /// Whether merging this layer can change any pixel.
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0 && self.items.iter().any(|i| !i.text.is_empty())
    }
}

/// A comment item resolved into target pixel space.
#[derive(Clone, Debug, PartialEq)]
pub struct CommentPlacement {
    /// Top-left corner of the text box.
    pub origin: Point,
    /// Font size in target pixels.
    pub font_size: f32,
    /// Fill color.
    pub color: Rgba8,
    /// Shadow displacement relative to `origin`.
    pub shadow_offset: Vec2,
    /// Canvas-style shadow blur in target pixels.
    pub shadow_blur: f32,
    /// Text to draw.
    pub text: String,
}

/// Resolve every item of `spec` into the `target` pixel space, in input order.
pub fn place_comments(
    spec: &CommentLayerSpec,
    target: Canvas,
) -> FramecapResult<Vec<CommentPlacement>> {
    spec.validate()?;
    let width_ratio = f64::from(target.width) / spec.reference_width;
    let height_ratio = f64::from(target.height) / spec.reference_height;

    spec.items
        .iter()
        .map(|item| {
            Ok(CommentPlacement {
                origin: Point::new(item.left * width_ratio, item.top * height_ratio),
                font_size: (item.font_size * width_ratio) as f32,
                color: parse_hex_color(&item.color)?,
                shadow_offset: Vec2::new(
                    SHADOW_OFFSET_PX * width_ratio,
                    SHADOW_OFFSET_PX * width_ratio,
                ),
                shadow_blur: (SHADOW_BLUR_PX * width_ratio) as f32,
                text: item.text.clone(),
            })
        })
        .collect()
}

/// A rasterized comment overlay: premultiplied RGBA8 plus the opacity to merge it with.
#[derive(Clone, Debug)]
pub struct CommentLayer {
    /// Layer dimensions, equal to the target.
    pub canvas: Canvas,
    /// Premultiplied RGBA8 bytes.
    pub data: Vec<u8>,
    /// Global merge opacity.
    pub opacity: f32,
}

impl CommentLayer {
    /// Merge the whole layer onto a premultiplied destination with the layer opacity.
    pub fn merge_onto(&self, dst: &mut [u8]) -> FramecapResult<()> {
        over_in_place(dst, &self.data, self.opacity)
    }
}

/// CPU comment rasterizer bound to one font.
pub struct CommentRenderer {
    text: TextLayoutEngine,
    ctx: Option<vello_cpu::RenderContext>,
    scratch: Option<vello_cpu::Pixmap>,
    blur_tmp: Vec<u8>,
}

impl CommentRenderer {
    /// Create a renderer for the given TTF/OTF bytes.
    pub fn new(font_bytes: Arc<Vec<u8>>) -> FramecapResult<Self> {
        Ok(Self {
            text: TextLayoutEngine::with_font(font_bytes)?,
            ctx: None,
            scratch: None,
            blur_tmp: Vec::new(),
        })
    }

    /// Family name resolved from the font bytes.
    pub fn family_name(&self) -> &str {
        self.text.family_name()
    }

    /// Rasterize `spec` onto a transparent layer of `target_width` x `target_height`.
    ///
    /// Each item is drawn, blurred and merged inside its own tile (text box plus shadow offset
    /// and blur radius), so the cost follows the text area rather than the target size.
    #[tracing::instrument(skip(self, spec), fields(items = spec.items.len()))]
    pub fn render(
        &mut self,
        spec: &CommentLayerSpec,
        target_width: u32,
        target_height: u32,
    ) -> FramecapResult<CommentLayer> {
        let canvas = Canvas::new(target_width, target_height)?;
        let placements = place_comments(spec, canvas)?;
        surface_dims(canvas.width, canvas.height)?;

        let mut data = vec![0u8; canvas.rgba8_len()?];
        for p in placements.iter().filter(|p| !p.text.is_empty()) {
            let layout = self.text.layout_line(&p.text, p.font_size, p.color)?;
            let blur = GaussianBlur::from_shadow_blur(p.shadow_blur)?;
            let Some(tile) = item_tile(&layout, p, blur.radius(), canvas) else {
                tracing::trace!(text = %p.text, "comment entirely off surface");
                continue;
            };
            let (w, h) = surface_dims(tile.width, tile.height)?;
            let tile_origin = Vec2::new(f64::from(tile.x), f64::from(tile.y));

            let shadow_at = p.origin + p.shadow_offset - tile_origin;
            self.draw_layout(&layout, shadow_at, Some(shadow_color(p.color)), w, h)?;
            let shadow = self
                .scratch
                .as_mut()
                .ok_or_else(|| FramecapError::render_context("comment scratch surface missing"))?
                .data_as_u8_slice_mut();
            blur.apply(shadow, &mut self.blur_tmp, tile.width, tile.height);
            over_tile_in_place(&mut data, canvas, self.scratch_bytes()?, tile, 1.0)?;

            self.draw_layout(&layout, p.origin - tile_origin, None, w, h)?;
            over_tile_in_place(&mut data, canvas, self.scratch_bytes()?, tile, 1.0)?;
        }

        Ok(CommentLayer {
            canvas,
            data,
            opacity: spec.opacity,
        })
    }

    /// Draw `layout` with its top-left at `origin` into the scratch pixmap. `paint_override`
    /// replaces every run's own brush (used for the shadow pass).
    fn draw_layout(
        &mut self,
        layout: &parley::Layout<Rgba8>,
        origin: Point,
        paint_override: Option<Rgba8>,
        w: u16,
        h: u16,
    ) -> FramecapResult<()> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        let mut pixmap = match self.scratch.take() {
            Some(pm) if pm.width() == w && pm.height() == h => pm,
            _ => vello_cpu::Pixmap::new(w, h),
        };
        ctx.reset();
        pixmap.data_as_u8_slice_mut().fill(0);

        ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let c = paint_override.unwrap_or(run.style().brush);
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(self.text.font())
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        self.ctx = Some(ctx);
        self.scratch = Some(pixmap);
        Ok(())
    }

    fn scratch_bytes(&self) -> FramecapResult<&[u8]> {
        self.scratch
            .as_ref()
            .map(|pm| pm.data_as_u8_slice())
            .ok_or_else(|| FramecapError::render_context("comment scratch surface missing"))
    }
}

/// Rasterize a comment overlay for a `target_width` x `target_height` output.
pub fn render_comments(
    spec: &CommentLayerSpec,
    target_width: u32,
    target_height: u32,
    font_bytes: Arc<Vec<u8>>,
) -> FramecapResult<CommentLayer> {
    CommentRenderer::new(font_bytes)?.render(spec, target_width, target_height)
}

/// Pixel rectangle that can receive ink from `p`, fill and blurred shadow both, clamped to
/// `canvas`. `None` when the item lies entirely outside.
fn item_tile(
    layout: &parley::Layout<Rgba8>,
    p: &CommentPlacement,
    blur_radius: u32,
    canvas: Canvas,
) -> Option<Tile> {
    // Outlines may overhang the advance box; the blur spreads `blur_radius` further.
    let pad = f64::from(p.font_size) * 0.5 + f64::from(blur_radius) + 2.0;
    let (dx, dy) = (p.shadow_offset.x, p.shadow_offset.y);
    let x0 = p.origin.x + dx.min(0.0) - pad;
    let y0 = p.origin.y + dy.min(0.0) - pad;
    let x1 = p.origin.x + f64::from(layout.full_width()) + dx.max(0.0) + pad;
    let y1 = p.origin.y + f64::from(layout.height()) + dy.max(0.0) + pad;

    let clamp = |v: f64, max: u32| v.clamp(0.0, f64::from(max)) as u32;
    let (left, right) = (clamp(x0.floor(), canvas.width), clamp(x1.ceil(), canvas.width));
    let (top, bottom) = (clamp(y0.floor(), canvas.height), clamp(y1.ceil(), canvas.height));
    (right > left && bottom > top).then(|| Tile {
        x: left,
        y: top,
        width: right - left,
        height: bottom - top,
    })
}

fn surface_dims(width: u32, height: u32) -> FramecapResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FramecapError::render_context("comment surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FramecapError::render_context("comment surface height exceeds u16"))?;
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/comments.rs"]
mod tests;
