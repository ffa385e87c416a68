use super::*;

#[test]
fn zero_blur_is_identity() {
    let blur = GaussianBlur::from_shadow_blur(0.0).unwrap();
    assert_eq!(blur.radius(), 0);
    let mut buf = vec![10u8, 20, 30, 40, 50, 60, 70, 80];
    let before = buf.clone();
    blur.apply(&mut buf, &mut Vec::new(), 2, 1);
    assert_eq!(buf, before);
}

#[test]
fn kernel_weights_sum_to_one_q16() {
    let k = gaussian_kernel_q16(6, 2.0).unwrap();
    assert_eq!(k.len(), 13);
    assert_eq!(k.iter().map(|&w| u64::from(w)).sum::<u64>(), 65536);
}

#[test]
fn radius_tracks_three_sigma() {
    // blur 4 => sigma 2 => radius 6
    assert_eq!(GaussianBlur::from_shadow_blur(4.0).unwrap().radius(), 6);
}

#[test]
fn negative_blur_is_rejected() {
    assert!(GaussianBlur::from_shadow_blur(-1.0).is_err());
    assert!(GaussianBlur::from_shadow_blur(f32::NAN).is_err());
}

#[test]
fn blur_spreads_a_single_pixel() {
    let (w, h) = (9u32, 9u32);
    let mut buf = vec![0u8; (w * h * 4) as usize];
    let center = ((4 * w + 4) * 4) as usize;
    buf[center..center + 4].copy_from_slice(&[0, 0, 0, 255]);
    GaussianBlur::from_shadow_blur(2.0)
        .unwrap()
        .apply(&mut buf, &mut Vec::new(), w, h);
    assert!(buf[center + 3] < 255);
    let right = ((4 * w + 5) * 4) as usize;
    assert!(buf[right + 3] > 0);
}
