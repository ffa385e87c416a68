use crate::capture::job::{RasterLayer, VideoFrame};
use crate::foundation::core::Canvas;
use crate::foundation::error::{FramecapError, FramecapResult};
use crate::render::comments::CommentLayer;
use crate::render::composite::over_straight_in_place;

/// Opaque premultiplied RGBA8 output surface.
///
/// The base is always the video frame drawn at full alpha, so every pixel stays opaque and the
/// premultiplied and straight representations coincide.
pub(crate) struct Surface {
    canvas: Canvas,
    data: Vec<u8>,
}

impl Surface {
    /// Take ownership of the frame's pixel buffer without copying or converting it.
    pub(crate) fn from_frame(frame: VideoFrame) -> Self {
        let (canvas, data) = frame.into_parts();
        Self { canvas, data }
    }

    /// Allocate a surface sized to `frame` and draw the frame as the opaque base layer.
    pub(crate) fn with_base(frame: &VideoFrame) -> Self {
        let mut data = frame.data().to_vec();
        for px in data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        Self {
            canvas: frame.canvas(),
            data,
        }
    }

    /// Surface dimensions.
    pub(crate) fn canvas(&self) -> Canvas {
        self.canvas
    }

    #[cfg(test)]
    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    /// Draw a straight-alpha layer at full size and opacity.
    pub(crate) fn draw_layer(&mut self, layer: &RasterLayer) -> FramecapResult<()> {
        if layer.canvas() != self.canvas {
            return Err(FramecapError::precondition(format!(
                "layer is {}x{} but the surface is {}x{}",
                layer.canvas().width,
                layer.canvas().height,
                self.canvas.width,
                self.canvas.height
            )));
        }
        over_straight_in_place(&mut self.data, layer.data())
    }

    /// Merge a rasterized comment layer using its own global opacity.
    pub(crate) fn merge_comments(&mut self, layer: &CommentLayer) -> FramecapResult<()> {
        if layer.canvas != self.canvas {
            return Err(FramecapError::precondition(
                "comment layer does not match the surface size",
            ));
        }
        layer.merge_onto(&mut self.data)
    }

    /// Pack the color channels as RGB8, dropping alpha.
    pub(crate) fn to_rgb8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() / 4 * 3);
        for px in self.data.chunks_exact(4) {
            out.extend_from_slice(&px[..3]);
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
