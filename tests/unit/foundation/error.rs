use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        YuvcompError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        YuvcompError::invariant("x")
            .to_string()
            .contains("invariant violation:")
    );
    assert!(
        YuvcompError::resource("x")
            .to_string()
            .contains("resource error:")
    );
    assert!(
        YuvcompError::graphics("x")
            .to_string()
            .contains("graphics error:")
    );
    assert!(
        YuvcompError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = YuvcompError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
