use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Icon fetch failed (status: {status:?}): {message}")]
    IconFetch {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Embedded markup error: {0}")]
    Markup(String),

    /// Geometry cannot be trusted; the whole capture is abandoned.
    #[error("Measurement error: {0}")]
    Measurement(String),

    /// Matching produced an ambiguous pairing that would corrupt the output.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Capture surface error: {0}")]
    Surface(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl CaptureError {
    pub fn icon_fetch(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        CaptureError::IconFetch {
            status,
            message: message.into(),
        }
    }

    pub fn measurement(message: impl Into<String>) -> Self {
        CaptureError::Measurement(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        CaptureError::InvariantViolation(message.into())
    }

    /// Tree-level failures abort the whole capture; everything else is contained
    /// to the element that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CaptureError::Measurement(_) | CaptureError::InvariantViolation(_)
        )
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            CaptureError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            CaptureError::Network(e) => ErrorPayload::new(
                ErrorCategory::Network,
                e.to_string(),
                "Check connectivity/proxy/VPN and retry.",
            ),
            CaptureError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Verify URL/format (e.g., https://example.com).",
            ),
            CaptureError::IconFetch { status, message } => ErrorPayload::new(
                ErrorCategory::Network,
                format!("Icon fetch failed (status {:?}): {}", status, message),
                "Check that icon URLs are reachable from this machine.",
            ),
            CaptureError::Image(e) => ErrorPayload::new(
                ErrorCategory::Image,
                e.to_string(),
                "Verify canvas/image data in the snapshot is valid.",
            ),
            CaptureError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check snapshot JSON inputs; run with --verbose for details.",
            ),
            CaptureError::Markup(msg) => ErrorPayload::new(
                ErrorCategory::Capture,
                msg.to_string(),
                "Inspect the inline SVG or mask-image markup of the failing element.",
            ),
            CaptureError::Measurement(msg) => ErrorPayload::new(
                ErrorCategory::Capture,
                msg.to_string(),
                "Make sure the root element is attached and laid out before capturing.",
            ),
            CaptureError::InvariantViolation(msg) => ErrorPayload::new(
                ErrorCategory::Capture,
                msg.to_string(),
                "Light and dark renders diverged structurally; capture again once the page is idle.",
            ),
            CaptureError::Surface(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("playwright npm package is missing") {
                    ErrorPayload::new(
                        ErrorCategory::Surface,
                        msg.to_string(),
                        "Install Playwright (e.g., `npm install playwright` and `npx playwright install chromium`).",
                    )
                } else if lower.contains("spawn playwright helper")
                    || lower.contains("node command")
                    || lower.contains("not found on path")
                {
                    ErrorPayload::new(
                        ErrorCategory::Surface,
                        msg.to_string(),
                        "Install Node.js and ensure the node binary is on PATH; rerun after installing Playwright if needed.",
                    )
                } else if lower.contains("selector") {
                    ErrorPayload::new(
                        ErrorCategory::Surface,
                        msg.to_string(),
                        "Check that --selector matches exactly one element on the page.",
                    )
                } else if lower.contains("timeout") || lower.contains("timed out") {
                    ErrorPayload::new(
                        ErrorCategory::Surface,
                        msg.to_string(),
                        "Try increasing --nav-timeout/--process-timeout or ensure the page loads without blocking.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Surface,
                        msg.to_string(),
                        "Re-run with --verbose to see the surface output.",
                    )
                }
            }
            CaptureError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("file not found") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Verify the snapshot file exists; use an absolute path or run from the working directory.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check flags/paths (e.g., --viewport WIDTHxHEIGHT, --settle-delay 1s) and the config file.",
                    )
                }
            }
            CaptureError::Unknown(msg) => ErrorPayload::new(
                ErrorCategory::Unknown,
                msg.to_string(),
                "Re-run with --verbose; file an issue if persistent.",
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, CaptureError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Network,
    Image,
    Capture,
    Surface,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
