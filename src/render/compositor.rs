use crate::capture::job::{RasterLayer, VideoFrame};
use crate::capture::metadata::CaptureMetadata;
use crate::config::CaptureOpts;
use crate::encode::exif::embed_metadata;
use crate::encode::jpeg::encode_rgb8;
use crate::foundation::core::Canvas;
use crate::foundation::error::{FramecapError, FramecapResult};
use crate::render::comments::{CommentLayer, CommentLayerSpec, CommentRenderer};
use crate::render::surface::Surface;

/// Which of the two outputs a composite run produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Production {
    /// Output without the subtitle layer.
    Normal,
    /// Output with the subtitle layer.
    Captioned,
}

impl Production {
    /// Short name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Captioned => "captioned",
        }
    }
}

/// Optional layers borrowed from a job.
#[derive(Clone, Copy, Debug, Default)]
pub struct Layers<'a> {
    /// Broadcaster graphics.
    pub overlay: Option<&'a RasterLayer>,
    /// Rendered subtitle track.
    pub subtitle: Option<&'a RasterLayer>,
    /// Comment overlay description.
    pub comments: Option<&'a CommentLayerSpec>,
    /// `comments` already rasterized for this frame size. When absent, a visible comment layer
    /// is rasterized by the production itself.
    pub comment_raster: Option<&'a CommentLayer>,
}

/// Rasterize a comment overlay for `canvas`, or `None` when it cannot change any pixel.
///
/// A visible overlay needs `opts.comment_font`; its absence is a render-context error.
pub fn rasterize_comments(
    spec: &CommentLayerSpec,
    canvas: Canvas,
    opts: &CaptureOpts,
) -> FramecapResult<Option<CommentLayer>> {
    if !spec.is_visible() {
        tracing::debug!("comment layer invisible, skipping rasterization");
        return Ok(None);
    }
    let font = opts.comment_font.clone().ok_or_else(|| {
        FramecapError::render_context("comment layer present but no comment font configured")
    })?;
    CommentRenderer::new(font)?
        .render(spec, canvas.width, canvas.height)
        .map(Some)
}

/// Encode `frame` as the normal output without blending. Consumes the frame.
///
/// Fails with a precondition error if an overlay or comment layer is present, since neither
/// could be honored without compositing.
#[tracing::instrument(skip_all, fields(w = frame.canvas().width, h = frame.canvas().height))]
pub fn direct_transfer(
    frame: VideoFrame,
    layers: Layers<'_>,
    metadata: &CaptureMetadata,
    opts: &CaptureOpts,
) -> FramecapResult<Vec<u8>> {
    if layers.overlay.is_some() {
        return Err(FramecapError::precondition(
            "direct transfer invoked with an overlay layer present",
        ));
    }
    if layers.comments.is_some() {
        return Err(FramecapError::precondition(
            "direct transfer invoked with a comment layer present",
        ));
    }

    let surface = Surface::from_frame(frame);
    finish(&surface, &metadata.for_output(false, false), opts)
}

/// Draw frame, overlay, subtitle (captioned only) and comments in that order, then encode.
#[tracing::instrument(skip_all, fields(production = production.as_str()))]
pub fn composite_full(
    frame: &VideoFrame,
    layers: Layers<'_>,
    production: Production,
    metadata: &CaptureMetadata,
    opts: &CaptureOpts,
) -> FramecapResult<Vec<u8>> {
    let mut surface = Surface::with_base(frame);

    if let Some(overlay) = layers.overlay {
        surface.draw_layer(overlay)?;
    }

    if production == Production::Captioned {
        let subtitle = layers.subtitle.ok_or_else(|| {
            FramecapError::precondition("captioned production requires a subtitle layer")
        })?;
        surface.draw_layer(subtitle)?;
    }

    if let Some(spec) = layers.comments {
        let owned;
        let raster = match layers.comment_raster {
            Some(shared) => Some(shared),
            None => {
                owned = rasterize_comments(spec, surface.canvas(), opts)?;
                owned.as_ref()
            }
        };
        if let Some(raster) = raster {
            surface.merge_comments(raster)?;
        }
    }

    let metadata = metadata.for_output(
        production == Production::Captioned,
        layers.comments.is_some(),
    );
    finish(&surface, &metadata, opts)
}

fn finish(
    surface: &Surface,
    metadata: &CaptureMetadata,
    opts: &CaptureOpts,
) -> FramecapResult<Vec<u8>> {
    let jpeg = encode_rgb8(surface.canvas(), &surface.to_rgb8(), opts.jpeg_quality)?;
    let out = embed_metadata(&jpeg, metadata, &opts.software)?;
    tracing::debug!(
        jpeg_len = jpeg.len(),
        out_len = out.len(),
        caption = metadata.caption_composited,
        comment = metadata.comment_composited,
        "encoded output"
    );
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
