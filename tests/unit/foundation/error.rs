use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SketchError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(SketchError::decode("x").to_string().contains("decode error:"));
    assert!(
        SketchError::rasterize("x")
            .to_string()
            .contains("rasterize error:")
    );
    assert!(SketchError::encode("x").to_string().contains("encode error:"));
    assert!(SketchError::export("x").to_string().contains("export error:"));
    assert_eq!(SketchError::SessionClosed.to_string(), "session is closed");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SketchError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
