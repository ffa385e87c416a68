use super::*;

#[test]
fn encodes_a_decodable_jpeg() {
    let canvas = Canvas::new(16, 8).unwrap();
    let rgb = vec![200u8; canvas.pixel_count().unwrap() * 3];
    let jpeg = encode_rgb8(canvas, &rgb, 90).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    let img = image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg).unwrap();
    assert_eq!((img.width(), img.height()), (16, 8));
}

#[test]
fn rejects_wrong_buffer_len() {
    let canvas = Canvas::new(2, 2).unwrap();
    let err = encode_rgb8(canvas, &[0u8; 11], 90).unwrap_err();
    assert!(matches!(err, FramecapError::Encode(_)));
}

#[test]
fn oversized_canvas_is_an_encode_error() {
    let canvas = Canvas::new(u32::MAX, u32::MAX).unwrap();
    let err = encode_rgb8(canvas, &[0u8; 12], 90).unwrap_err();
    assert!(matches!(err, FramecapError::Encode(_)), "{err}");
}
