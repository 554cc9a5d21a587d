use super::*;

#[test]
fn defaults_match_autosave_contract() {
    let opts = SessionOpts::default();
    assert_eq!(opts.jpeg_quality, 70);
    assert_eq!(opts.raster_scale, 1.0);
    assert_eq!(opts.background_fit, BackgroundFit::Stretch);
    assert!(opts.editing_enabled);
    assert!(opts.validate().is_ok());
}

#[test]
fn validate_rejects_bad_values() {
    let bad_quality = SessionOpts {
        jpeg_quality: 0,
        ..SessionOpts::default()
    };
    assert!(bad_quality.validate().is_err());

    let bad_scale = SessionOpts {
        raster_scale: f64::NAN,
        ..SessionOpts::default()
    };
    assert!(bad_scale.validate().is_err());
}

#[test]
fn partial_json_fills_defaults() {
    let opts: SessionOpts =
        serde_json::from_str(r#"{"jpeg_quality": 85, "background_fit": "aspect_fill"}"#).unwrap();
    assert_eq!(opts.jpeg_quality, 85);
    assert_eq!(opts.background_fit, BackgroundFit::AspectFill);
    assert_eq!(opts.raster_scale, 1.0);
    assert_eq!(opts.jpeg_matte, Rgba8::WHITE);
}
