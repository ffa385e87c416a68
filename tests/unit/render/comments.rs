use super::*;

fn item(top: f64, left: f64, font_size: f64) -> CommentItem {
    CommentItem {
        top,
        left,
        color: "#FFFFFF".to_owned(),
        font_size,
        text: "www".to_owned(),
    }
}

fn spec(reference_width: f64, reference_height: f64, items: Vec<CommentItem>) -> CommentLayerSpec {
    CommentLayerSpec {
        reference_width,
        reference_height,
        opacity: 1.0,
        items,
    }
}

#[test]
fn origin_item_maps_to_pixel_origin() {
    let target = Canvas::new(1920, 1080).unwrap();
    let placed = place_comments(&spec(1920.0, 1080.0, vec![item(0.0, 0.0, 32.0)]), target).unwrap();
    assert_eq!(placed[0].origin, Point::new(0.0, 0.0));
    assert_eq!(placed[0].font_size, 32.0);
    assert_eq!(placed[0].color, Rgba8::WHITE);
}

#[test]
fn half_reference_space_doubles_size_and_position() {
    let target = Canvas::new(1920, 1080).unwrap();
    let placed =
        place_comments(&spec(960.0, 540.0, vec![item(100.0, 50.0, 24.0)]), target).unwrap();
    assert_eq!(placed[0].origin, Point::new(100.0, 200.0));
    assert_eq!(placed[0].font_size, 48.0);
    assert_eq!(placed[0].shadow_offset, Vec2::new(2.4, 2.4));
    assert_eq!(placed[0].shadow_blur, 8.0);
}

#[test]
fn font_size_follows_width_ratio_only() {
    // Width ratio 2, height ratio 4.
    let target = Canvas::new(200, 400).unwrap();
    let placed = place_comments(&spec(100.0, 100.0, vec![item(10.0, 10.0, 10.0)]), target).unwrap();
    assert_eq!(placed[0].font_size, 20.0);
    assert_eq!(placed[0].origin, Point::new(20.0, 40.0));
    assert_eq!(placed[0].shadow_offset.x, placed[0].shadow_offset.y);
}

#[test]
fn placements_keep_input_order() {
    let target = Canvas::new(100, 100).unwrap();
    let mut a = item(1.0, 1.0, 10.0);
    a.text = "a".to_owned();
    let mut b = item(2.0, 2.0, 10.0);
    b.text = "b".to_owned();
    let placed = place_comments(&spec(100.0, 100.0, vec![a, b]), target).unwrap();
    let texts: Vec<_> = placed.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, ["a", "b"]);
}

#[test]
fn invalid_specs_are_rejected() {
    let target = Canvas::new(100, 100).unwrap();
    assert!(place_comments(&spec(0.0, 100.0, vec![]), target).is_err());
    assert!(place_comments(&spec(100.0, f64::NAN, vec![]), target).is_err());
    assert!(place_comments(&spec(100.0, 100.0, vec![item(0.0, 0.0, 0.0)]), target).is_err());

    let mut s = spec(100.0, 100.0, vec![]);
    s.opacity = 1.5;
    assert!(s.validate().is_err());

    let mut bad_color = item(0.0, 0.0, 10.0);
    bad_color.color = "white".to_owned();
    assert!(place_comments(&spec(100.0, 100.0, vec![bad_color]), target).is_err());
}

#[test]
fn visibility_requires_opacity_and_text() {
    let mut s = spec(100.0, 100.0, vec![item(0.0, 0.0, 10.0)]);
    assert!(s.is_visible());
    s.opacity = 0.0;
    assert!(!s.is_visible());
    s.opacity = 1.0;
    s.items[0].text.clear();
    assert!(!s.is_visible());
}

#[test]
fn merge_with_zero_opacity_is_identity() {
    let layer = CommentLayer {
        canvas: Canvas::new(1, 1).unwrap(),
        data: vec![255, 255, 255, 255],
        opacity: 0.0,
    };
    let mut dst = vec![1u8, 2, 3, 255];
    layer.merge_onto(&mut dst).unwrap();
    assert_eq!(dst, vec![1, 2, 3, 255]);
}

#[test]
fn merge_with_full_opacity_replaces_covered_pixels() {
    let layer = CommentLayer {
        canvas: Canvas::new(2, 1).unwrap(),
        data: vec![255, 255, 255, 255, 0, 0, 0, 0],
        opacity: 1.0,
    };
    let mut dst = vec![1u8, 2, 3, 255, 4, 5, 6, 255];
    layer.merge_onto(&mut dst).unwrap();
    assert_eq!(dst, vec![255, 255, 255, 255, 4, 5, 6, 255]);
}

#[test]
fn garbage_font_bytes_fail_as_render_context() {
    let err = CommentRenderer::new(Arc::new(vec![0u8; 16])).err().unwrap();
    assert!(matches!(err, FramecapError::RenderContext(_)));
}

const FONT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/fonts/DejaVuSans.ttf");

fn fixture_font() -> Arc<Vec<u8>> {
    Arc::new(std::fs::read(FONT).unwrap())
}

fn red(top: f64, left: f64, font_size: f64) -> CommentItem {
    CommentItem {
        color: "#FF0000".to_owned(),
        ..item(top, left, font_size)
    }
}

fn render(s: &CommentLayerSpec, w: u32, h: u32) -> CommentLayer {
    render_comments(s, w, h, fixture_font()).unwrap()
}

fn pixels(layer: &CommentLayer) -> impl Iterator<Item = (u32, u32, &[u8])> {
    let w = layer.canvas.width;
    layer
        .data
        .chunks_exact(4)
        .enumerate()
        .map(move |(i, px)| (i as u32 % w, i as u32 / w, px))
}

/// Inclusive bounding box of pixels carrying fill ink. The shadow is black, so in the
/// premultiplied result a nonzero red channel can only come from a red fill.
fn fill_bbox(layer: &CommentLayer) -> Option<(u32, u32, u32, u32)> {
    pixels(layer)
        .filter(|(_, _, px)| px[0] > 0)
        .fold(None, |acc, (x, y, _)| match acc {
            None => Some((x, y, x, y)),
            Some((x0, y0, x1, y1)) => Some((x0.min(x), y0.min(y), x1.max(x), y1.max(y))),
        })
}

#[test]
fn fill_ink_matches_between_equivalent_reference_spaces() {
    let native = render(&spec(200.0, 100.0, vec![red(0.0, 0.0, 40.0)]), 200, 100);
    let half = render(&spec(100.0, 50.0, vec![red(0.0, 0.0, 20.0)]), 200, 100);
    let bbox = fill_bbox(&native).unwrap();
    assert_eq!(fill_bbox(&half), Some(bbox));
    // Top-anchored: ink starts within the first line box, not above the origin.
    assert!(bbox.1 < 20, "{bbox:?}");
}

#[test]
fn reference_offsets_move_ink_by_scaled_pixels() {
    let at_origin = render(&spec(100.0, 50.0, vec![red(0.0, 0.0, 20.0)]), 200, 100);
    let moved = render(&spec(100.0, 50.0, vec![red(10.0, 10.0, 20.0)]), 200, 100);
    let (x0, y0, x1, y1) = fill_bbox(&at_origin).unwrap();
    assert_eq!(fill_bbox(&moved), Some((x0 + 20, y0 + 20, x1 + 20, y1 + 20)));
}

#[test]
fn fill_and_shadow_both_reach_the_layer() {
    let layer = render(&spec(200.0, 100.0, vec![red(0.0, 0.0, 40.0)]), 200, 100);
    assert!(pixels(&layer).any(|(_, _, px)| px == [255, 0, 0, 255]));
    assert!(pixels(&layer).any(|(_, _, px)| px[3] > 0 && px[0] == 0));
    assert_eq!(layer.opacity, 1.0);
}

#[test]
fn ink_stays_within_the_item_neighbourhood() {
    // Fill at (500, 500) with font 20; blur radius is 6, so ink stays well inside 460..640.
    let layer = render(&spec(1000.0, 1000.0, vec![red(500.0, 500.0, 20.0)]), 1000, 1000);
    for (x, y, px) in pixels(&layer) {
        if px[3] > 0 {
            assert!((460..640).contains(&x) && (460..560).contains(&y), "ink at {x},{y}");
        }
    }
    assert!(fill_bbox(&layer).is_some());
}

#[test]
fn layer_content_does_not_depend_on_surface_size() {
    let small = render(&spec(200.0, 100.0, vec![red(10.0, 10.0, 20.0)]), 200, 100);
    let large = render(&spec(400.0, 200.0, vec![red(10.0, 10.0, 20.0)]), 400, 200);
    for (x, y, px) in pixels(&small) {
        let i = ((y * 400 + x) * 4) as usize;
        assert_eq!(px, &large.data[i..i + 4], "pixel {x},{y}");
    }
}

#[test]
fn offscreen_item_leaves_layer_transparent() {
    let layer = render(&spec(200.0, 100.0, vec![red(-1000.0, -1000.0, 20.0)]), 200, 100);
    assert!(layer.data.iter().all(|&b| b == 0));
}

#[test]
fn shadow_alpha_scales_with_fill_alpha() {
    assert_eq!(shadow_color(Rgba8::WHITE), SHADOW_COLOR);
    assert_eq!(shadow_color(Rgba8::new(255, 0, 0, 128)).a, 115);
    assert_eq!(shadow_color(Rgba8::new(255, 0, 0, 0)).a, 0);
}

#[test]
fn fully_transparent_fill_casts_no_shadow() {
    let mut clear = red(0.0, 0.0, 40.0);
    clear.color = "#FF000000".to_owned();
    let layer = render(&spec(200.0, 100.0, vec![clear]), 200, 100);
    assert!(layer.data.iter().all(|&b| b == 0));
}
