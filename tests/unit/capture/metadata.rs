use super::*;

fn sample() -> CaptureMetadata {
    let at = DateTime::parse_from_rfc3339("2024-05-06T21:03:09+09:00").unwrap();
    CaptureMetadata {
        captured_at: at,
        captured_playback_position: 123.5,
        network_id: 32736,
        service_id: 1024,
        event_id: 4242,
        title: "ニュース7".to_owned(),
        description: "evening news".to_owned(),
        start_time: DateTime::parse_from_rfc3339("2024-05-06T21:00:00+09:00").unwrap(),
        end_time: DateTime::parse_from_rfc3339("2024-05-06T21:30:00+09:00").unwrap(),
        duration: 1800.0,
        caption_text: None,
        caption_composited: false,
        comment_composited: false,
    }
}

#[test]
fn exif_timestamp_uses_capture_offset() {
    assert_eq!(sample().exif_timestamp(), "2024:05:06 21:03:09");
}

#[test]
fn json_uses_stable_flag_names() {
    let json = sample().for_output(true, false).to_json().unwrap();
    assert!(json.contains("\"is_caption_composited\":true"));
    assert!(json.contains("\"is_comment_composited\":false"));
    assert!(json.contains("\"caption_text\":null"));
}

#[test]
fn json_round_trip_is_lossless() {
    let mut m = sample();
    m.caption_text = Some("字幕のテキスト".to_owned());
    let back = CaptureMetadata::from_json(&m.to_json().unwrap()).unwrap();
    assert_eq!(back, m);
}

#[test]
fn for_output_only_touches_flags() {
    let m = sample();
    let out = m.for_output(true, true);
    assert!(out.caption_composited);
    assert!(out.comment_composited);
    assert_eq!(out.title, m.title);
    assert_eq!(out.captured_at, m.captured_at);
}
