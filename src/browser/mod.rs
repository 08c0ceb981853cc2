//! Headless browser capture surface.
//!
//! Snapshots are recorded from live pages using Playwright via Node.js.
//!
//! # Module Structure
//!
//! - [`surface`] - the [`PlaywrightSurface`] and its options
//! - [`playwright`] - process spawning, availability checks and error mapping
//! - [`script`] - the inline snapshot script
//!
//! # Example
//!
//! ```no_run
//! use domsvg_lib::{PlaywrightOptions, PlaywrightSurface, RootSelector, ThemeSetting};
//! use domsvg_lib::surface::CaptureSurface;
//!
//! # async fn example() -> domsvg_lib::Result<()> {
//! let mut surface = PlaywrightSurface::new("https://example.com", PlaywrightOptions::default());
//! surface.set_theme(ThemeSetting::Dark);
//! surface.attach_working_document()?;
//! let snapshot = surface.snapshot(&RootSelector::new("main")).await?;
//! println!("{} children", snapshot.root.children.len());
//! # Ok(())
//! # }
//! ```

mod playwright;
mod script;
mod surface;

pub use surface::{
    PlaywrightOptions, PlaywrightSurface, DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_PROCESS_TIMEOUT,
};
