//! The theme-aware capture pipeline.
//!
//! [`capture`] records the root subtree under the light and then the dark theme while
//! holding a [`ThemeLease`], runs the surface's reopen hooks, and hands both snapshots to
//! [`convert_snapshots`]: emission and text layout per theme, node matching, then
//! reconciliation into one document switched by `prefers-color-scheme`.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, TextSettings, ThemeSettings};
use crate::emit::{emit_document, to_svg_string};
use crate::error::Result;
use crate::icons::IconFetcher;
use crate::matcher::match_documents;
use crate::reconcile::{reconcile, ThemeVariableTable};
use crate::surface::{CaptureSurface, RootSelector};
use crate::text::{wrap_all_text, CalibratedMeasurer};
use crate::theme::{ThemeLease, ThemeSetting};
use crate::types::{SourceSnapshot, VectorDocument};

#[derive(Clone)]
pub struct CaptureOptions {
    /// Wait after every theme write before the snapshot.
    pub settle_delay: Duration,
    /// Wait before the working document is detached.
    pub detach_delay: Duration,
    /// Produce the light document only.
    pub light_only: bool,
    pub text: TextSettings,
    pub theme: ThemeSettings,
    pub progress: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl CaptureOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            settle_delay: config.capture.settle_delay,
            detach_delay: config.capture.detach_delay,
            light_only: config.capture.debug_light_only,
            text: config.text,
            theme: config.theme,
            progress: None,
        }
    }

    fn log_progress(&self, message: &str) {
        if let Some(cb) = &self.progress {
            cb(message);
        }
    }
}

/// Result of one capture.
#[derive(Debug, Clone)]
pub struct ThemeCapture {
    /// Theme-aware document, or the plain light document in light-only mode.
    pub light: String,
    /// Plain dark document.
    pub dark: Option<String>,
    pub variables: ThemeVariableTable,
    /// Fingerprints of light nodes that kept their light values.
    pub unmatched: Vec<String>,
    pub toggled_bitmaps: usize,
}

/// Records both themes, then converts them.
pub async fn capture(
    surface: &mut dyn CaptureSurface,
    root: &RootSelector,
    icons: &dyn IconFetcher,
    options: &CaptureOptions,
) -> Result<ThemeCapture> {
    let recorded = record_snapshots(surface, root, options).await;
    let reopened = surface.reopen_hooks().await;
    let (light, dark) = recorded?;
    reopened?;
    convert_snapshots(&light, dark.as_ref(), icons, options).await
}

/// Snapshots `root` under the light theme and, unless light-only, the dark theme.
pub async fn record_snapshots(
    surface: &mut dyn CaptureSurface,
    root: &RootSelector,
    options: &CaptureOptions,
) -> Result<(SourceSnapshot, Option<SourceSnapshot>)> {
    let mut lease = ThemeLease::acquire(surface);
    let mut doc = lease.working_document()?;

    options.log_progress(&format!("Capturing {root} (light)…"));
    let light = doc
        .capture_under(ThemeSetting::Light, options.settle_delay, root)
        .await?;
    let dark = if options.light_only {
        None
    } else {
        options.log_progress(&format!("Capturing {root} (dark)…"));
        Some(
            doc.capture_under(ThemeSetting::Dark, options.settle_delay, root)
                .await?,
        )
    };

    if !options.detach_delay.is_zero() {
        tokio::time::sleep(options.detach_delay).await;
    }
    Ok((light, dark))
}

/// Emits one snapshot and lays out its text.
pub async fn render_snapshot(
    snapshot: &SourceSnapshot,
    icons: &dyn IconFetcher,
    text: &TextSettings,
) -> Result<VectorDocument> {
    let mut doc = emit_document(snapshot, icons).await?;
    wrap_all_text(&mut doc, &CalibratedMeasurer::new(), text);
    Ok(doc)
}

/// Converts recorded snapshots; with a dark snapshot the light output is theme-aware.
pub async fn convert_snapshots(
    light: &SourceSnapshot,
    dark: Option<&SourceSnapshot>,
    icons: &dyn IconFetcher,
    options: &CaptureOptions,
) -> Result<ThemeCapture> {
    let light_doc = render_snapshot(light, icons, &options.text).await?;
    let Some(dark) = dark else {
        return Ok(ThemeCapture {
            light: to_svg_string(&light_doc),
            dark: None,
            variables: ThemeVariableTable::default(),
            unmatched: Vec::new(),
            toggled_bitmaps: 0,
        });
    };

    let dark_doc = render_snapshot(dark, icons, &options.text).await?;
    options.log_progress("Matching light and dark documents…");
    let report = match_documents(&light_doc.root, &dark_doc.root)?;
    let merged = reconcile(light_doc, &dark_doc, &report, &options.theme);
    options.log_progress(&format!(
        "Reconciled {} theme variables ({} unmatched nodes)",
        merged.table.len(),
        report.unmatched.len()
    ));

    Ok(ThemeCapture {
        light: to_svg_string(&merged.document),
        dark: Some(to_svg_string(&dark_doc)),
        variables: merged.table,
        unmatched: report.unmatched,
        toggled_bitmaps: merged.toggled_bitmaps,
    })
}
