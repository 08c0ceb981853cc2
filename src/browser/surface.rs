//! Capture surface backed by a headless Chromium driven through Node + Playwright.
//!
//! Every snapshot runs in its own browser process with the theme emulated as
//! `prefers-color-scheme`, so the settle delay is applied inside the page after navigation.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

use super::playwright::{
    ensure_node_available, ensure_playwright_available, map_playwright_status_error,
    run_node_script,
};
use super::script::SNAPSHOT_SCRIPT;
use crate::config::Config;
use crate::error::{CaptureError, Result};
use crate::surface::{CaptureSurface, RootSelector};
use crate::theme::ThemeSetting;
use crate::types::{SourceSnapshot, Viewport};

/// Default timeout for page navigation.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for the entire Playwright process.
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct PlaywrightOptions {
    /// The Node.js command to use (default: "node").
    pub node_command: String,
    pub viewport: Viewport,
    pub headless: bool,
    pub navigation_timeout: Duration,
    /// Timeout for one whole Playwright process.
    pub process_timeout: Duration,
    /// Optional progress callback for logging.
    pub progress: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

impl Default for PlaywrightOptions {
    fn default() -> Self {
        Self {
            node_command: "node".to_string(),
            viewport: Viewport::default(),
            headless: true,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            process_timeout: DEFAULT_PROCESS_TIMEOUT,
            progress: None,
        }
    }
}

impl PlaywrightOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            node_command: config
                .browser
                .node_command
                .clone()
                .unwrap_or_else(|| "node".to_string()),
            viewport: config.viewport,
            headless: true,
            navigation_timeout: config.browser.navigation_timeout,
            process_timeout: config.browser.process_timeout,
            progress: None,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct SnapshotOutput {
    status: String,
    message: Option<String>,
    snapshot: Option<SourceSnapshot>,
}

pub struct PlaywrightSurface {
    url: String,
    options: PlaywrightOptions,
    theme: ThemeSetting,
    settle_delay: Duration,
    attached: bool,
    checked: bool,
}

impl PlaywrightSurface {
    pub fn new(url: impl Into<String>, options: PlaywrightOptions) -> Self {
        Self {
            url: url.into(),
            options,
            theme: ThemeSetting::Unset,
            settle_delay: Duration::ZERO,
            attached: false,
            checked: false,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn log_progress(&self, message: &str) {
        if let Some(cb) = &self.options.progress {
            cb(message);
        }
    }

    /// `colorScheme` value for the browser context.
    fn color_scheme(&self) -> &'static str {
        match self.theme {
            ThemeSetting::Light => "light",
            ThemeSetting::Dark => "dark",
            ThemeSetting::Unset => "no-preference",
        }
    }

    fn script_args(&self, root: &RootSelector) -> Vec<String> {
        vec![
            self.url.clone(),
            self.options.viewport.width.to_string(),
            self.options.viewport.height.to_string(),
            self.options.navigation_timeout.as_millis().to_string(),
            self.settle_delay.as_millis().to_string(),
            self.color_scheme().to_string(),
            root.selector.clone(),
            if self.options.headless { "1" } else { "0" }.to_string(),
        ]
    }

    async fn record(&mut self, root: &RootSelector) -> Result<SourceSnapshot> {
        if !self.checked {
            ensure_node_available(&self.options.node_command).await?;
            ensure_playwright_available(&self.options.node_command).await?;
            self.checked = true;
        }

        self.log_progress(&format!(
            "Recording {} under {} color scheme ({}, settle {}ms)…",
            self.url,
            self.color_scheme(),
            self.options.viewport,
            self.settle_delay.as_millis()
        ));
        let stdout = run_node_script(
            &self.options.node_command,
            SNAPSHOT_SCRIPT,
            &self.script_args(root),
            self.options.process_timeout,
        )
        .await?;

        let output: SnapshotOutput = serde_json::from_str(&stdout).map_err(|e| {
            CaptureError::Surface(format!(
                "Failed to parse Playwright output: {} - raw: {}",
                e,
                stdout.trim()
            ))
        })?;
        if output.status != "ok" {
            return Err(map_playwright_status_error(
                &output.status,
                output.message.unwrap_or_default(),
            ));
        }
        let mut snapshot = output.snapshot.ok_or_else(|| {
            CaptureError::Surface("Playwright returned ok status but no snapshot".to_string())
        })?;
        snapshot.connected &= self.attached;
        Ok(snapshot)
    }
}

impl CaptureSurface for PlaywrightSurface {
    fn current_theme(&self) -> ThemeSetting {
        self.theme
    }

    fn set_theme(&mut self, theme: ThemeSetting) {
        self.theme = theme;
    }

    fn attach_working_document(&mut self) -> Result<()> {
        if self.attached {
            return Err(CaptureError::Surface(
                "working document is already attached".to_string(),
            ));
        }
        self.attached = true;
        Ok(())
    }

    fn detach_working_document(&mut self) {
        self.attached = false;
    }

    fn settle(&mut self, delay: Duration) -> BoxFuture<'_, Result<()>> {
        self.settle_delay = delay;
        futures::future::ready(Ok(())).boxed()
    }

    fn snapshot<'a>(&'a mut self, root: &'a RootSelector) -> BoxFuture<'a, Result<SourceSnapshot>> {
        self.record(root).boxed()
    }

    fn reopen_hooks(&mut self) -> BoxFuture<'_, Result<()>> {
        // the browser process is gone once the snapshot returns
        futures::future::ready(Ok(())).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_follow_config() {
        let mut config = Config::default();
        config.browser.node_command = Some("custom-node".to_string());
        config.browser.process_timeout = Duration::from_secs(90);
        let opts = PlaywrightOptions::from_config(&config);
        assert_eq!(opts.node_command, "custom-node");
        assert_eq!(opts.process_timeout, Duration::from_secs(90));
        assert_eq!(opts.viewport, config.viewport);
        assert!(opts.progress.is_none());
    }

    #[test]
    fn theme_maps_to_color_scheme_argument() {
        let mut surface = PlaywrightSurface::new("https://example.com", PlaywrightOptions::default());
        assert_eq!(surface.color_scheme(), "no-preference");
        surface.set_theme(ThemeSetting::Dark);
        let args = surface.script_args(&RootSelector::new("#card"));
        assert_eq!(args[0], "https://example.com");
        assert_eq!(args[5], "dark");
        assert_eq!(args[6], "#card");
        assert_eq!(args[7], "1");
    }

    #[tokio::test]
    async fn missing_node_fails_the_snapshot() {
        let mut surface = PlaywrightSurface::new(
            "https://example.com",
            PlaywrightOptions {
                node_command: "definitely-not-a-binary".to_string(),
                ..PlaywrightOptions::default()
            },
        );
        let root = RootSelector::new("body");
        let err = surface.snapshot(&root).await.unwrap_err();
        assert!(matches!(err, CaptureError::Surface(_)));
    }
}
