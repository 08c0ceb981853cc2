use std::sync::Arc;

pub type ProgressCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Stderr progress lines in verbose mode, nothing otherwise.
pub fn progress_logger(verbose: bool) -> Option<ProgressCallback> {
    if verbose {
        Some(Arc::new(|msg: &str| eprintln!("{msg}")))
    } else {
        None
    }
}
