//! Framecap turns a captured video frame and its optional overlay layers into finished JPEG
//! stills carrying an embedded capture-provenance record.
//!
//! One [`CaptureJob`] goes in, [`composite`] decides which of the two outputs (plain and
//! captioned) the job's [`CaptureMode`] and layers call for, draws each output in a fixed layer
//! order and returns a [`CompositeResult`]:
//!
//! - frame, then broadcaster overlay, then subtitles (captioned output only), then comments
//! - each output is JPEG-encoded and gets its own Exif block describing what was drawn into it
//! - [`read_metadata`] recovers the record from any produced image
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod capture;
pub(crate) mod config;
pub(crate) mod encode;
pub(crate) mod render;

pub use crate::foundation::core::{Canvas, Point, Rgba8, Vec2};
pub use crate::foundation::error::{FramecapError, FramecapResult};

pub use crate::capture::job::{
    CaptureJob, CaptureMode, CompositeResult, RasterLayer, VideoFrame,
};
pub use crate::capture::metadata::{CaptureMetadata, EXIF_DATETIME_FORMAT};
pub use crate::capture::orchestrator::{NormalPath, ProductionPlan, composite};
pub use crate::config::{CaptureOpts, ENV_COMMENT_FONT, ENV_JPEG_QUALITY, SoftwareInfo};
pub use crate::encode::exif::{
    ExifFields, build_exif_payload, embed_metadata, read_exif_fields, read_metadata,
};
pub use crate::render::color::parse_hex_color;
pub use crate::render::comments::{
    CommentItem, CommentLayer, CommentLayerSpec, CommentPlacement, CommentRenderer,
    SHADOW_BLUR_PX, SHADOW_COLOR, SHADOW_OFFSET_PX, place_comments, render_comments,
    shadow_color,
};
pub use crate::render::compositor::{
    Layers, Production, composite_full, direct_transfer, rasterize_comments,
};
