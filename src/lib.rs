//! domsvg library
//!
//! Converts a rendered element subtree into a standalone SVG document, and a pair of light and
//! dark renders into one theme-aware document whose colors switch through CSS variables under
//! `prefers-color-scheme`.
//!
//! # Module Overview
//!
//! - [`probe`] - visibility and layout probing of source elements
//! - [`classify`] - computed style to render decision
//! - [`text`] - text runs, measurement and wrapping
//! - [`emit`] - tree walker and SVG emitter
//! - [`matcher`] - light/dark node correspondence
//! - [`reconcile`] - theme variable table and merged document
//! - [`surface`] / [`browser`] - capture surfaces (recorded snapshots, Playwright)
//! - [`capture`] - the end-to-end theme-aware pipeline
//! - [`config`] - configuration file support
//! - [`output`] - JSON output schemas
//!
//! # Example
//!
//! ```no_run
//! use domsvg_lib::{capture, CaptureOptions, NoopIconFetcher, RootSelector, SnapshotSurface};
//! use std::path::Path;
//!
//! # async fn example() -> domsvg_lib::Result<()> {
//! let mut surface =
//!     SnapshotSurface::from_files(Path::new("light.json"), Some(Path::new("dark.json")))?;
//! let result = capture(
//!     &mut surface,
//!     &RootSelector::new("#card"),
//!     &NoopIconFetcher,
//!     &CaptureOptions::default(),
//! )
//! .await?;
//! std::fs::write("card.svg", &result.light)?;
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod capture;
pub mod classify;
pub mod config;
pub mod css;
pub mod emit;
pub mod error;
pub mod icons;
pub mod matcher;
pub mod output;
pub mod probe;
pub mod reconcile;
pub mod surface;
pub mod text;
pub mod theme;
pub mod types;

pub use browser::{PlaywrightOptions, PlaywrightSurface};
pub use capture::{
    capture, convert_snapshots, record_snapshots, render_snapshot, CaptureOptions, ThemeCapture,
};
pub use config::Config;
pub use emit::{emit_document, to_svg_string};
pub use error::{CaptureError, Result};
pub use icons::{HttpIconFetcher, IconFetcher, NoopIconFetcher, StaticIconFetcher};
pub use matcher::{match_documents, MatchReport};
pub use output::{
    CaptureOutput, ConvertOutput, DocumentSummary, DomsvgOutput, ErrorOutput, SnapshotOutput,
    DOMSVG_OUTPUT_VERSION,
};
pub use reconcile::{reconcile, ThemeVariable, ThemeVariableTable, VarCategory};
pub use surface::{CaptureSurface, RootSelector, SnapshotSurface};
pub use theme::{ThemeLease, ThemeSetting};
pub use types::{SourceSnapshot, VectorDocument, Viewport};
