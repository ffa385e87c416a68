use super::*;
use chrono::DateTime;

fn metadata() -> CaptureMetadata {
    let t = DateTime::parse_from_rfc3339("2024-01-02T03:04:05+09:00").unwrap();
    CaptureMetadata {
        captured_at: t,
        captured_playback_position: 0.0,
        network_id: 1,
        service_id: 2,
        event_id: 3,
        title: String::new(),
        description: String::new(),
        start_time: t,
        end_time: t,
        duration: 0.0,
        caption_text: None,
        caption_composited: false,
        comment_composited: false,
    }
}

fn job(subtitle: Option<RasterLayer>) -> CaptureJob {
    CaptureJob {
        mode: CaptureMode::Both,
        frame: VideoFrame::from_rgba8(4, 2, vec![0; 4 * 2 * 4]).unwrap(),
        subtitle_layer: subtitle,
        overlay_layer: None,
        comment_layer: None,
        metadata: metadata(),
    }
}

#[test]
fn frame_rejects_wrong_buffer_len() {
    assert!(VideoFrame::from_rgba8(4, 2, vec![0; 31]).is_err());
    assert!(VideoFrame::from_rgba8(0, 2, vec![]).is_err());
    assert!(RasterLayer::from_rgba8(1, 1, vec![0; 3]).is_err());
}

#[test]
fn debug_does_not_dump_pixels() {
    let f = VideoFrame::from_rgba8(2, 1, vec![7; 8]).unwrap();
    let s = format!("{f:?}");
    assert!(s.contains("width: 2"));
    assert!(!s.contains('7'));
}

#[test]
fn validate_accepts_matching_layers() {
    let sub = RasterLayer::from_rgba8(4, 2, vec![0; 32]).unwrap();
    job(Some(sub)).validate().unwrap();
}

#[test]
fn validate_rejects_mismatched_layer_as_precondition() {
    let sub = RasterLayer::from_rgba8(2, 2, vec![0; 16]).unwrap();
    let err = job(Some(sub)).validate().unwrap_err();
    assert!(err.is_precondition());
}

#[test]
fn mode_serializes_snake_case() {
    let s = serde_json::to_string(&CaptureMode::CompositingCaption).unwrap();
    assert_eq!(s, "\"compositing_caption\"");
}

#[test]
fn result_reports_presence_pattern() {
    let r = CompositeResult {
        normal: Some(vec![1]),
        captioned: None,
    };
    assert_eq!(r.produced(), (true, false));
}
