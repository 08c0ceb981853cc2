use crate::error::ErrorPayload;
use crate::theme::ThemeSetting;
use crate::types::Viewport;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Schema version for output payloads.
pub const DOMSVG_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum DomsvgOutput {
    Capture(CaptureOutput),
    Convert(ConvertOutput),
    Snapshot(SnapshotOutput),
    Error(ErrorOutput),
}

/// Files written for one capture and what the reconciler did.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub light_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_path: Option<PathBuf>,
    pub variables: usize,
    pub unmatched: usize,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub toggled_bitmaps: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmatched_nodes: Vec<String>,
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOutput {
    pub version: String,
    pub url: String,
    pub selector: String,
    pub viewport: Viewport,
    pub documents: DocumentSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOutput {
    pub version: String,
    pub light_snapshot: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_snapshot: Option<PathBuf>,
    pub documents: DocumentSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotOutput {
    pub version: String,
    pub url: String,
    pub selector: String,
    pub theme: ThemeSetting,
    pub viewport: Viewport,
    pub output_path: PathBuf,
    /// Elements in the recorded subtree, root included.
    pub elements: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: ErrorPayload,
}
