use domsvg_lib::error::ErrorCategory;
use domsvg_lib::CaptureError;

#[test]
fn config_error_display_includes_message() {
    let err = CaptureError::Config("missing viewport".to_string());

    assert_eq!(format!("{}", err), "Configuration error: missing viewport");
}

#[test]
fn io_error_display_wraps_source() {
    let io_err = std::io::Error::other("disk full");
    let err: CaptureError = io_err.into();
    let rendered = format!("{}", err);

    assert!(rendered.starts_with("IO error: "));
    assert!(rendered.contains("disk full"));
}

#[test]
fn icon_fetch_helper_includes_status_and_message() {
    let err = CaptureError::icon_fetch(Some(reqwest::StatusCode::NOT_FOUND), "gone");

    assert_eq!(
        format!("{}", err),
        "Icon fetch failed (status: Some(404)): gone"
    );
}

#[test]
fn icon_fetch_helper_handles_missing_status() {
    let err = CaptureError::icon_fetch(None, "offline");

    assert_eq!(
        format!("{}", err),
        "Icon fetch failed (status: None): offline"
    );
}

#[test]
fn measurement_helper_uses_message() {
    let err = CaptureError::measurement("root detached");

    assert_eq!(format!("{}", err), "Measurement error: root detached");
    assert_eq!(err.to_payload().category, ErrorCategory::Capture);
}

#[test]
fn invariant_violations_are_capture_errors() {
    let err = CaptureError::invariant("two dark candidates for icon:0-1");
    let payload = err.to_payload();

    assert_eq!(
        format!("{}", err),
        "Invariant violation: two dark candidates for icon:0-1"
    );
    assert_eq!(payload.category, ErrorCategory::Capture);
    assert!(payload.remediation.is_some());
}

#[test]
fn selector_failures_point_at_the_selector_flag() {
    let err = CaptureError::Surface("no element matches selector #missing".to_string());
    let payload = err.to_payload();

    assert_eq!(payload.category, ErrorCategory::Surface);
    assert!(payload
        .remediation
        .as_deref()
        .unwrap_or_default()
        .contains("--selector"));
}
