use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::foundation::error::FramecapResult;

/// Fixed-width date-time layout used by the primitive timestamp fields of the metadata block.
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Capture provenance embedded into every produced still.
///
/// The record is serialized as JSON into the image comment field, so field names are part of the
/// on-disk format. The two `*_composited` flags are owned by the pipeline: whatever the caller
/// puts there is overwritten per output before encoding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    /// Wall-clock time the frame was captured.
    pub captured_at: DateTime<FixedOffset>,
    /// Playback position of the captured frame, in seconds from the stream start.
    pub captured_playback_position: f64,
    /// Broadcast network identifier.
    pub network_id: u32,
    /// Broadcast service identifier.
    pub service_id: u32,
    /// Broadcast event (program) identifier.
    pub event_id: u32,
    /// Program title.
    pub title: String,
    /// Program description.
    pub description: String,
    /// Scheduled program start.
    pub start_time: DateTime<FixedOffset>,
    /// Scheduled program end.
    pub end_time: DateTime<FixedOffset>,
    /// Program duration in seconds.
    pub duration: f64,
    /// Caption text on screen at capture time, if any.
    pub caption_text: Option<String>,
    /// Whether the subtitle layer was drawn into this output.
    #[serde(rename = "is_caption_composited", default)]
    pub caption_composited: bool,
    /// Whether a comment overlay was drawn into this output.
    #[serde(rename = "is_comment_composited", default)]
    pub comment_composited: bool,
}

impl CaptureMetadata {
    /// Return a copy carrying the composited flags of one specific output.
    pub fn for_output(&self, caption_composited: bool, comment_composited: bool) -> Self {
        Self {
            caption_composited,
            comment_composited,
            ..self.clone()
        }
    }

    /// Capture time rendered as `YYYY:MM:DD HH:mm:ss` in the capture's own offset.
    pub fn exif_timestamp(&self) -> String {
        self.captured_at.format(EXIF_DATETIME_FORMAT).to_string()
    }

    /// Serialize the record as compact JSON.
    pub fn to_json(&self) -> FramecapResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a record previously produced by [`CaptureMetadata::to_json`].
    pub fn from_json(s: &str) -> FramecapResult<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/metadata.rs"]
mod tests;
