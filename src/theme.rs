//! The host theme setting and the guards that hold it during a capture.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CaptureError, Result};
use crate::surface::{CaptureSurface, RootSelector};
use crate::types::SourceSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeSetting {
    Light,
    Dark,
    /// Follow the host preference.
    #[default]
    Unset,
}

impl ThemeSetting {
    /// The theme actually rendered; an unset preference renders light.
    pub fn resolved(self) -> Self {
        match self {
            ThemeSetting::Unset => ThemeSetting::Light,
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeSetting::Light => "light",
            ThemeSetting::Dark => "dark",
            ThemeSetting::Unset => "unset",
        }
    }
}

impl fmt::Display for ThemeSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeSetting {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeSetting::Light),
            "dark" => Ok(ThemeSetting::Dark),
            "unset" | "system" => Ok(ThemeSetting::Unset),
            other => Err(CaptureError::Config(format!(
                "unknown theme '{other}' (expected light, dark or unset)"
            ))),
        }
    }
}

/// Exclusive hold on a surface's theme setting.
///
/// Dropping the lease restores the setting found at acquisition, including when the capture
/// future is abandoned midway.
pub struct ThemeLease<'a> {
    surface: &'a mut dyn CaptureSurface,
    previous: ThemeSetting,
}

impl<'a> ThemeLease<'a> {
    pub fn acquire(surface: &'a mut dyn CaptureSurface) -> Self {
        let previous = surface.current_theme();
        log::debug!("theme lease acquired (was {previous})");
        Self { surface, previous }
    }

    pub fn previous(&self) -> ThemeSetting {
        self.previous
    }

    /// Attaches the working document for the lifetime of the returned guard.
    pub fn working_document(&mut self) -> Result<WorkingDocumentGuard<'_>> {
        self.surface.attach_working_document()?;
        Ok(WorkingDocumentGuard {
            surface: &mut *self.surface,
        })
    }
}

impl Drop for ThemeLease<'_> {
    fn drop(&mut self) {
        if self.surface.current_theme() != self.previous {
            self.surface.set_theme(self.previous);
        }
        log::debug!("theme lease released (restored {})", self.previous);
    }
}

/// The attached working document; detached again on drop.
pub struct WorkingDocumentGuard<'s> {
    surface: &'s mut dyn CaptureSurface,
}

impl WorkingDocumentGuard<'_> {
    pub fn set_theme(&mut self, theme: ThemeSetting) {
        self.surface.set_theme(theme);
    }

    pub async fn settle(&mut self, delay: Duration) -> Result<()> {
        self.surface.settle(delay).await
    }

    pub async fn snapshot(&mut self, root: &RootSelector) -> Result<SourceSnapshot> {
        self.surface.snapshot(root).await
    }

    /// Sets `theme`, waits for the host to apply it and snapshots `root`.
    pub async fn capture_under(
        &mut self,
        theme: ThemeSetting,
        settle_delay: Duration,
        root: &RootSelector,
    ) -> Result<SourceSnapshot> {
        self.set_theme(theme);
        self.settle(settle_delay).await?;
        self.snapshot(root).await
    }
}

impl Drop for WorkingDocumentGuard<'_> {
    fn drop(&mut self) {
        self.surface.detach_working_document();
    }
}
