use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        WatermarkError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert!(WatermarkError::font("x").to_string().contains("font error:"));
    assert!(
        WatermarkError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        WatermarkError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert!(
        WatermarkError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(WatermarkError::EmptySurface.to_string().contains("empty"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = WatermarkError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
