use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capture::metadata::CaptureMetadata;
use crate::foundation::core::Canvas;
use crate::foundation::error::{FramecapError, FramecapResult};
use crate::render::comments::CommentLayerSpec;

/// Which outputs a capture request asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// Only the plain video still.
    VideoOnly,
    /// The still with subtitles burned in, falling back to the plain still without subtitles.
    CompositingCaption,
    /// Both stills.
    Both,
}

/// The raw captured video frame.
///
/// The frame is treated as opaque video: its alpha channel is ignored when drawn. It is not
/// `Clone`; the direct-transfer path consumes it by value, so a consumed frame cannot be
/// referenced by any other production.
pub struct VideoFrame {
    canvas: Canvas,
    data: Vec<u8>,
}

impl VideoFrame {
    /// Wrap a tightly packed, row-major RGBA8 buffer.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> FramecapResult<Self> {
        let canvas = Canvas::new(width, height)?;
        check_len(canvas, data.len(), "video frame")?;
        Ok(Self { canvas, data })
    }

    /// Frame dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Borrow the RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn into_parts(self) -> (Canvas, Vec<u8>) {
        (self.canvas, self.data)
    }
}

impl fmt::Debug for VideoFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoFrame")
            .field("width", &self.canvas.width)
            .field("height", &self.canvas.height)
            .finish_non_exhaustive()
    }
}

/// A straight-alpha RGBA8 layer drawn over the frame (subtitles or broadcaster graphics).
#[derive(Clone)]
pub struct RasterLayer {
    canvas: Canvas,
    data: Vec<u8>,
}

impl RasterLayer {
    /// Wrap a tightly packed, row-major, straight-alpha RGBA8 buffer.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> FramecapResult<Self> {
        let canvas = Canvas::new(width, height)?;
        check_len(canvas, data.len(), "raster layer")?;
        Ok(Self { canvas, data })
    }

    /// Layer dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Borrow the straight-alpha RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for RasterLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterLayer")
            .field("width", &self.canvas.width)
            .field("height", &self.canvas.height)
            .finish_non_exhaustive()
    }
}

fn check_len(canvas: Canvas, len: usize, what: &str) -> FramecapResult<()> {
    let expected = canvas.rgba8_len()?;
    if len != expected {
        return Err(FramecapError::validation(format!(
            "{what} expects {expected} rgba8 bytes for {}x{}, got {len}",
            canvas.width, canvas.height
        )));
    }
    Ok(())
}

/// One compositing request. Built once per capture, processed once, then discarded.
#[derive(Debug)]
pub struct CaptureJob {
    /// Requested outputs.
    pub mode: CaptureMode,
    /// The raw captured frame.
    pub frame: VideoFrame,
    /// Rendered subtitle track, same size as `frame`.
    pub subtitle_layer: Option<RasterLayer>,
    /// Broadcaster-inserted graphics, same size as `frame`.
    pub overlay_layer: Option<RasterLayer>,
    /// User comments to rasterize on top of everything else.
    pub comment_layer: Option<CommentLayerSpec>,
    /// Capture facts. The composited flags are written by the pipeline.
    pub metadata: CaptureMetadata,
}

impl CaptureJob {
    /// Check that every optional layer matches the frame and the comment spec is usable.
    pub fn validate(&self) -> FramecapResult<()> {
        let canvas = self.frame.canvas();
        for (name, layer) in [
            ("subtitle layer", &self.subtitle_layer),
            ("overlay layer", &self.overlay_layer),
        ] {
            if let Some(layer) = layer
                && layer.canvas() != canvas
            {
                return Err(FramecapError::precondition(format!(
                    "{name} is {}x{} but the frame is {}x{}",
                    layer.canvas().width,
                    layer.canvas().height,
                    canvas.width,
                    canvas.height
                )));
            }
        }
        if let Some(spec) = &self.comment_layer {
            spec.validate()?;
        }
        Ok(())
    }
}

/// Encoded outputs of one job. An output is `None` exactly when the mode/layer combination did
/// not call for it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompositeResult {
    /// JPEG without the subtitle layer.
    pub normal: Option<Vec<u8>>,
    /// JPEG with the subtitle layer.
    pub captioned: Option<Vec<u8>>,
}

impl CompositeResult {
    /// Presence pattern as `(normal, captioned)`.
    pub fn produced(&self) -> (bool, bool) {
        (self.normal.is_some(), self.captioned.is_some())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/job.rs"]
mod tests;
