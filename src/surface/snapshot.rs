use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use super::{CaptureSurface, RootSelector};
use crate::error::{CaptureError, Result};
use crate::theme::ThemeSetting;
use crate::types::SourceSnapshot;

/// Calls observed by a [`SnapshotSurface`], in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    SetTheme(ThemeSetting),
    Attach,
    Detach,
    Settle(Duration),
    Snapshot(ThemeSetting),
    ReopenHooks,
}

/// Surface serving snapshots recorded earlier, one per theme.
///
/// An unset theme resolves to the light snapshot. Snapshots taken while the working document
/// is detached are reported as disconnected.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSurface {
    snapshots: HashMap<ThemeSetting, SourceSnapshot>,
    theme: ThemeSetting,
    attached: bool,
    events: Vec<SurfaceEvent>,
}

impl SnapshotSurface {
    pub fn new(light: SourceSnapshot) -> Self {
        Self::default().with_snapshot(ThemeSetting::Light, light)
    }

    pub fn with_snapshot(mut self, theme: ThemeSetting, snapshot: SourceSnapshot) -> Self {
        self.snapshots.insert(theme, snapshot);
        self
    }

    pub fn with_dark(self, dark: SourceSnapshot) -> Self {
        self.with_snapshot(ThemeSetting::Dark, dark)
    }

    /// Loads recorded snapshot files.
    pub fn from_files(light: &Path, dark: Option<&Path>) -> Result<Self> {
        let mut surface = Self::new(read_snapshot(light)?);
        if let Some(dark) = dark {
            surface = surface.with_dark(read_snapshot(dark)?);
        }
        Ok(surface)
    }

    pub fn has_theme(&self, theme: ThemeSetting) -> bool {
        self.snapshots.contains_key(&theme.resolved())
    }

    pub fn events(&self) -> &[SurfaceEvent] {
        &self.events
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

pub(crate) fn read_snapshot(path: &Path) -> Result<SourceSnapshot> {
    let raw = std::fs::read_to_string(path)?;
    let snapshot = serde_json::from_str(&raw)?;
    Ok(snapshot)
}

impl CaptureSurface for SnapshotSurface {
    fn current_theme(&self) -> ThemeSetting {
        self.theme
    }

    fn set_theme(&mut self, theme: ThemeSetting) {
        self.theme = theme;
        self.events.push(SurfaceEvent::SetTheme(theme));
    }

    fn attach_working_document(&mut self) -> Result<()> {
        if self.attached {
            return Err(CaptureError::Surface(
                "working document is already attached".to_string(),
            ));
        }
        self.attached = true;
        self.events.push(SurfaceEvent::Attach);
        Ok(())
    }

    fn detach_working_document(&mut self) {
        if self.attached {
            self.attached = false;
            self.events.push(SurfaceEvent::Detach);
        }
    }

    fn settle(&mut self, delay: Duration) -> BoxFuture<'_, Result<()>> {
        self.events.push(SurfaceEvent::Settle(delay));
        async move {
            tokio::time::sleep(delay).await;
            Ok(())
        }
        .boxed()
    }

    fn snapshot<'a>(&'a mut self, root: &'a RootSelector) -> BoxFuture<'a, Result<SourceSnapshot>> {
        let theme = self.theme.resolved();
        self.events.push(SurfaceEvent::Snapshot(theme));
        let result = match self.snapshots.get(&theme) {
            Some(snapshot) => {
                let mut snapshot = snapshot.clone();
                snapshot.connected &= self.attached;
                log::debug!("serving recorded {theme} snapshot for {root}");
                Ok(snapshot)
            }
            None => Err(CaptureError::Surface(format!(
                "no {theme} snapshot recorded for {root}"
            ))),
        };
        futures::future::ready(result).boxed()
    }

    fn reopen_hooks(&mut self) -> BoxFuture<'_, Result<()>> {
        self.events.push(SurfaceEvent::ReopenHooks);
        futures::future::ready(Ok(())).boxed()
    }
}
