use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FramecapError::precondition("x")
            .to_string()
            .contains("precondition violation:")
    );
    assert!(
        FramecapError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(FramecapError::encode("x").to_string().contains("encode error:"));
    assert!(
        FramecapError::metadata("x")
            .to_string()
            .contains("metadata error:")
    );
    assert!(
        FramecapError::render_context("x")
            .to_string()
            .contains("render context error:")
    );
    assert!(
        FramecapError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FramecapError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_precondition_reports_as_precondition() {
    assert!(FramecapError::precondition("x").is_precondition());
    assert!(!FramecapError::validation("x").is_precondition());
}

#[test]
fn json_errors_map_to_serde() {
    let err: FramecapError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, FramecapError::Serde(_)));
}
