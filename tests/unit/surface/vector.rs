use super::*;

fn assert_near(px: Option<[u8; 4]>, want: [u8; 4]) {
    let px = px.expect("pixel in bounds");
    for i in 0..4 {
        assert!(px[i].abs_diff(want[i]) <= 2, "{px:?} != {want:?}");
    }
}

fn canvas() -> Canvas {
    Canvas {
        width: 20,
        height: 10,
    }
}

fn line(y: f64, color: Rgba8) -> Stroke {
    Stroke::new(
        vec![Point::new(2.0, y), Point::new(18.0, y)],
        4.0,
        color,
    )
    .unwrap()
}

#[test]
fn serialize_deserialize_restores_strokes() {
    let mut a = VectorSurface::new(canvas());
    a.push_stroke(line(5.0, Rgba8::BLACK)).unwrap();
    a.push_stroke(
        Stroke::new(vec![Point::new(3.0, 3.0)], 2.0, Rgba8::new(255, 0, 0, 255)).unwrap(),
    )
    .unwrap();

    let blob = a.serialize();
    let mut b = VectorSurface::new(canvas());
    b.deserialize(&blob).unwrap();
    assert_eq!(a.strokes(), b.strokes());
    assert_eq!(b.serialize(), blob);
}

#[test]
fn push_stroke_reports_completed_gesture() {
    let mut s = VectorSurface::new(canvas());
    assert_eq!(
        s.push_stroke(line(5.0, Rgba8::BLACK)).unwrap(),
        SurfaceEvent::StrokeGestureCompleted
    );
}

#[test]
fn invalid_strokes_are_rejected() {
    assert!(Stroke::new(vec![], 1.0, Rgba8::BLACK).is_err());
    assert!(Stroke::new(vec![Point::new(0.0, 0.0)], 0.0, Rgba8::BLACK).is_err());
    assert!(Stroke::new(vec![Point::new(f64::NAN, 0.0)], 1.0, Rgba8::BLACK).is_err());
}

#[test]
fn malformed_blob_is_decode_error_and_keeps_strokes() {
    let mut s = VectorSurface::new(canvas());
    s.push_stroke(line(5.0, Rgba8::BLACK)).unwrap();
    let err = s.deserialize(b"{not json").unwrap_err();
    assert!(matches!(err, SketchError::Decode(_)));
    assert_eq!(s.strokes().len(), 1);

    let err = s
        .deserialize(br#"{"version":99,"strokes":[]}"#)
        .unwrap_err();
    assert!(matches!(err, SketchError::Decode(_)));
}

#[test]
fn reset_clears_strokes() {
    let mut s = VectorSurface::new(canvas());
    s.push_stroke(line(5.0, Rgba8::BLACK)).unwrap();
    s.reset();
    assert!(s.strokes().is_empty());
}

#[test]
fn rasterize_draws_stroke_on_transparency() {
    let mut s = VectorSurface::new(canvas());
    s.set_background(Rgba8::TRANSPARENT);
    s.push_stroke(line(5.0, Rgba8::BLACK)).unwrap();

    let img = s.rasterize(s.content_rect(), 1.0).unwrap();
    assert_eq!((img.width(), img.height()), (20, 10));
    assert_near(img.pixel(10, 5), [0, 0, 0, 255]);
    assert_eq!(img.pixel(10, 0), Some([0, 0, 0, 0]));
}

#[test]
fn rasterize_clears_to_background_color() {
    let mut s = VectorSurface::new(canvas());
    s.set_background(Rgba8::new(0, 0, 255, 255));
    s.push_stroke(line(5.0, Rgba8::new(255, 0, 0, 255))).unwrap();

    let img = s.rasterize(s.content_rect(), 1.0).unwrap();
    assert_near(img.pixel(0, 0), [0, 0, 255, 255]);
    assert_near(img.pixel(10, 5), [255, 0, 0, 255]);
}

#[test]
fn rasterize_honors_scale() {
    let s = VectorSurface::new(canvas());
    let img = s.rasterize(s.content_rect(), 2.0).unwrap();
    assert_eq!((img.width(), img.height()), (40, 20));
}

#[test]
fn renderer_rejects_bad_requests() {
    let s = VectorSurface::new(canvas());
    let blob = s.serialize();
    let r = VectorRenderer;
    let bad_scale = RasterRequest {
        rect: s.content_rect(),
        scale: 0.0,
        clear: None,
    };
    assert!(matches!(
        r.rasterize(&blob, &bad_scale),
        Err(SketchError::Rasterize(_))
    ));
    let empty = RasterRequest {
        rect: Rect::new(0.0, 0.0, 0.0, 0.0),
        scale: 1.0,
        clear: None,
    };
    assert!(r.rasterize(&blob, &empty).is_err());
    assert!(matches!(
        r.rasterize(b"garbage", &bad_scale),
        Err(SketchError::Decode(_))
    ));
}
