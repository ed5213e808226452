use std::path::PathBuf;

use super::*;

fn solid_source(width: u32, height: u32, rgba: [u8; 4]) -> SourceImage {
    let mut px = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..(width * height) {
        px.extend_from_slice(&rgba);
    }
    SourceImage::from_rgba8(width, height, px).unwrap()
}

/// A font that the rasterizing tests can use, or `None` when the machine has none installed.
fn test_font() -> Option<FontSource> {
    if let Some(path) = std::env::var_os("WATERMARK_TEST_FONT") {
        return Some(FontSource::File(PathBuf::from(path)));
    }
    let src = FontSource::default();
    src.load().ok().map(|_| src)
}

fn missing_font() -> FontSource {
    FontSource::File(PathBuf::from("/nonexistent/watermark-font.ttf"))
}

fn config(text: &str) -> WatermarkConfig {
    WatermarkConfig {
        text: text.to_string(),
        top: 50.0,
        left: 50.0,
        opacity: 1.0,
        font_size: 40.0,
        rotated: false,
    }
}

#[test]
fn anchor_is_percent_of_native_dimensions() {
    let canvas = Canvas {
        width: 1000,
        height: 800,
    };
    let cfg = WatermarkConfig {
        top: 10.0,
        left: 50.0,
        ..WatermarkConfig::default()
    };
    assert_eq!(anchor_point(canvas, &cfg.draw_params()), Point::new(500.0, 80.0));
}

#[test]
fn rotation_pivots_about_the_anchor() {
    let anchor = Point::new(120.0, 40.0);
    let plain = watermark_transform(anchor, false);
    let rotated = watermark_transform(anchor, true);

    assert_eq!(plain * Point::ORIGIN, anchor);
    let pivot = rotated * Point::ORIGIN;
    assert!((pivot.x - anchor.x).abs() < 1e-9);
    assert!((pivot.y - anchor.y).abs() < 1e-9);

    // +x in text space points up-right on screen (counter-clockwise in y-down space).
    let dir = rotated * Point::new(1.0, 0.0) - anchor;
    let h = std::f64::consts::FRAC_1_SQRT_2;
    assert!((dir.x - h).abs() < 1e-9);
    assert!((dir.y + h).abs() < 1e-9);
}

#[test]
fn render_without_source_is_a_noop() {
    let mut comp = Compositor::new(CompositorOpts::default().with_font(missing_font()));
    let out = comp.render(None, &config("hello")).unwrap();
    assert!(out.is_none());
}

#[test]
fn output_matches_source_dimensions() {
    let src = solid_source(33, 17, [10, 20, 30, 255]);
    let mut comp = Compositor::new(CompositorOpts::default().with_font(missing_font()));
    let out = comp
        .render(Some(&src), &WatermarkConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!((out.width(), out.height()), (33, 17));
}

#[test]
fn empty_text_reproduces_source_exactly() {
    let src = solid_source(40, 30, [90, 60, 30, 255]);
    let mut comp = Compositor::new(CompositorOpts::default().with_font(missing_font()));
    let out = comp.render(Some(&src), &config("")).unwrap().unwrap();
    assert_eq!(out.rgba8(), src.rgba8());
}

#[test]
fn zero_opacity_reproduces_source_exactly() {
    let src = solid_source(40, 30, [90, 60, 30, 255]);
    let mut comp = Compositor::new(CompositorOpts::default().with_font(missing_font()));
    let cfg = WatermarkConfig {
        opacity: 0.0,
        ..config("hidden")
    };
    let out = comp.render(Some(&src), &cfg).unwrap().unwrap();
    assert_eq!(out.rgba8(), src.rgba8());

    let cfg = WatermarkConfig {
        opacity: -4.0,
        ..config("hidden")
    };
    let out = comp.render(Some(&src), &cfg).unwrap().unwrap();
    assert_eq!(out.rgba8(), src.rgba8());
}

#[test]
fn invisible_renders_keep_translucent_pixels_exact() {
    let mut px = Vec::new();
    for a in [3u8, 0, 128, 254] {
        px.extend_from_slice(&[200, 100, 50, a]);
    }
    let src = SourceImage::from_rgba8(2, 2, px.clone()).unwrap();
    let mut comp = Compositor::new(CompositorOpts::default().with_font(missing_font()));

    let out = comp.render(Some(&src), &config("")).unwrap().unwrap();
    assert_eq!(out.rgba8(), px.as_slice());

    let cfg = WatermarkConfig {
        opacity: 0.0,
        ..config("hidden")
    };
    let out = comp.render(Some(&src), &cfg).unwrap().unwrap();
    assert_eq!(out.rgba8(), px.as_slice());
}

#[test]
fn missing_font_is_reported_and_remembered() {
    let src = solid_source(20, 20, [0, 0, 0, 255]);
    let mut comp = Compositor::new(CompositorOpts::default().with_font(missing_font()));

    let err = comp.render(Some(&src), &config("x")).unwrap_err();
    assert!(matches!(err, WatermarkError::Font(_)));
    let err = comp.render(Some(&src), &config("x")).unwrap_err();
    assert!(matches!(err, WatermarkError::Font(ref m) if !m.starts_with("font error")));
    assert!(comp.font_description().is_none());

    // Invisible renders never need the font.
    assert!(comp.render(Some(&src), &config("")).unwrap().is_some());
}

#[test]
fn oversized_source_is_a_render_error() {
    let src = solid_source(70_000, 1, [0, 0, 0, 255]);
    let mut comp = Compositor::new(CompositorOpts::default().with_font(missing_font()));
    let err = comp.render(Some(&src), &config("x")).unwrap_err();
    assert!(matches!(err, WatermarkError::Render(_)));
}

#[test]
fn render_is_deterministic() {
    let Some(font) = test_font() else {
        eprintln!("skipping render_is_deterministic: no font available");
        return;
    };
    let src = solid_source(160, 120, [20, 40, 80, 255]);
    let mut comp = Compositor::new(CompositorOpts::default().with_font(font));
    let cfg = WatermarkConfig {
        opacity: 0.6,
        rotated: true,
        ..config("Sample")
    };

    let a = comp.render(Some(&src), &cfg).unwrap().unwrap();
    let b = comp.render(Some(&src), &cfg).unwrap().unwrap();
    assert_eq!(a, b);
    assert_ne!(a.rgba8(), src.rgba8());
}

#[test]
fn full_opacity_draws_white_glyphs_near_the_anchor() {
    let Some(font) = test_font() else {
        eprintln!("skipping full_opacity_draws_white_glyphs_near_the_anchor: no font available");
        return;
    };
    let src = solid_source(200, 100, [0, 0, 0, 255]);
    let mut comp = Compositor::new(CompositorOpts::default().with_font(font));
    let out = comp
        .render(Some(&src), &config("HHHH"))
        .unwrap()
        .unwrap();

    let mut white = 0usize;
    for y in 0..100 {
        for x in 0..200 {
            let px = out.pixel(x, y).unwrap();
            if px != [0, 0, 0, 255] {
                // Every touched pixel sits in a box around the (100, 50) anchor.
                assert!((100i64 - i64::from(x)).abs() <= 90, "stray pixel at ({x}, {y})");
                assert!((50i64 - i64::from(y)).abs() <= 40, "stray pixel at ({x}, {y})");
                // White on black stays gray.
                assert!(px[0] == px[1] && px[1] == px[2]);
            }
            if px == [255, 255, 255, 255] {
                white += 1;
            }
        }
    }
    assert!(white > 0, "expected full-intensity white glyph pixels");
    assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 255]));
    assert_eq!(out.pixel(199, 99), Some([0, 0, 0, 255]));
}

#[test]
fn rotation_changes_glyph_pixels_but_not_dimensions() {
    let Some(font) = test_font() else {
        eprintln!("skipping rotation_changes_glyph_pixels_but_not_dimensions: no font available");
        return;
    };
    let src = solid_source(160, 160, [0, 0, 0, 255]);
    let mut comp = Compositor::new(CompositorOpts::default().with_font(font));
    let flat = comp.render(Some(&src), &config("ROTATE")).unwrap().unwrap();
    let tilted = comp
        .render(
            Some(&src),
            &WatermarkConfig {
                rotated: true,
                ..config("ROTATE")
            },
        )
        .unwrap()
        .unwrap();

    assert_eq!(flat.canvas(), tilted.canvas());
    assert_ne!(flat, tilted);
}

#[test]
fn anchor_pixel_is_the_same_with_and_without_rotation() {
    let Some(font) = test_font() else {
        eprintln!("skipping anchor_pixel_is_the_same_with_and_without_rotation: no font available");
        return;
    };
    let src = solid_source(400, 400, [0, 0, 0, 255]);
    let mut comp = Compositor::new(CompositorOpts::default().with_font(font));
    // A single tall stem is centered on the anchor, so its ink covers the anchor pixel.
    let flat_cfg = WatermarkConfig {
        font_size: 200.0,
        ..config("I")
    };
    let tilted_cfg = WatermarkConfig {
        rotated: true,
        ..flat_cfg.clone()
    };
    let anchor = anchor_point(src.canvas(), &flat_cfg.draw_params());
    let (ax, ay) = (anchor.x as u32, anchor.y as u32);
    assert_eq!((ax, ay), (200, 200));

    let flat = comp.render(Some(&src), &flat_cfg).unwrap().unwrap();
    let tilted = comp.render(Some(&src), &tilted_cfg).unwrap().unwrap();
    assert_ne!(flat, tilted);
    assert_eq!(flat.pixel(ax, ay), Some([255, 255, 255, 255]));
    assert_eq!(flat.pixel(ax, ay), tilted.pixel(ax, ay));
}

#[test]
fn out_of_range_numbers_still_render() {
    let Some(font) = test_font() else {
        eprintln!("skipping out_of_range_numbers_still_render: no font available");
        return;
    };
    let src = solid_source(64, 64, [0, 0, 0, 255]);
    let mut comp = Compositor::new(CompositorOpts::default().with_font(font));
    let cfg = WatermarkConfig {
        top: f64::NAN,
        left: 500.0,
        opacity: 7.0,
        font_size: -12.0,
        ..config("x")
    };
    let out = comp.render(Some(&src), &cfg).unwrap().unwrap();
    assert_eq!(out.canvas(), src.canvas());
    assert!(comp.font_description().is_some());
}
