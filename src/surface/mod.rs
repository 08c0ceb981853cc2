//! Capture surfaces: hosts that own the live document and its theme setting.
//!
//! - [`snapshot`] - in-memory surface replaying recorded snapshots
//! - [`crate::browser`] - the Playwright-backed surface

mod snapshot;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::Result;
use crate::theme::ThemeSetting;
use crate::types::SourceSnapshot;

pub use snapshot::{SnapshotSurface, SurfaceEvent};

/// Locates the subtree to convert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootSelector {
    pub selector: String,
}

impl RootSelector {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }
}

impl fmt::Display for RootSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.selector)
    }
}

/// A host for the live document.
///
/// Theme and attachment changes are synchronous so they can be undone from a drop guard;
/// everything that waits on the host returns a boxed future.
pub trait CaptureSurface: Send {
    fn current_theme(&self) -> ThemeSetting;

    fn set_theme(&mut self, theme: ThemeSetting);

    /// Attaches the temporary document the subtree is measured in.
    fn attach_working_document(&mut self) -> Result<()>;

    fn detach_working_document(&mut self);

    /// Waits for the host to apply the current theme.
    fn settle(&mut self, delay: Duration) -> BoxFuture<'_, Result<()>>;

    fn snapshot<'a>(&'a mut self, root: &'a RootSelector) -> BoxFuture<'a, Result<SourceSnapshot>>;

    /// Reopens whatever the host closed to take the capture.
    fn reopen_hooks(&mut self) -> BoxFuture<'_, Result<()>>;
}
