mod capture;
mod convert;
mod snapshot;

use std::path::Path;

use domsvg_lib::{
    CaptureError, Config, DocumentSummary, HttpIconFetcher, IconFetcher, NoopIconFetcher,
    ThemeCapture,
};

pub use capture::run_capture;
pub use convert::run_convert;
pub use snapshot::run_snapshot;

/// Icon source for a run; `--offline` skips every external icon.
fn icon_fetcher(config: &Config, offline: bool) -> Result<Box<dyn IconFetcher>, CaptureError> {
    if offline {
        return Ok(Box::new(NoopIconFetcher));
    }
    Ok(Box::new(HttpIconFetcher::new(config.icons.fetch_timeout)?))
}

/// Writes `<name>.svg` (and `<name>.dark.svg`) into `out_dir`.
fn write_documents(
    out_dir: &Path,
    name: &str,
    capture: ThemeCapture,
) -> Result<DocumentSummary, CaptureError> {
    std::fs::create_dir_all(out_dir)?;
    let light_path = out_dir.join(format!("{name}.svg"));
    std::fs::write(&light_path, &capture.light)?;

    let dark_path = match &capture.dark {
        Some(dark) => {
            let path = out_dir.join(format!("{name}.dark.svg"));
            std::fs::write(&path, dark)?;
            Some(path)
        }
        None => None,
    };

    Ok(DocumentSummary {
        light_path,
        dark_path,
        variables: capture.variables.len(),
        unmatched: capture.unmatched.len(),
        toggled_bitmaps: capture.toggled_bitmaps,
        unmatched_nodes: capture.unmatched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use domsvg_lib::ThemeVariableTable;

    #[test]
    fn write_documents_writes_both_themes() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("nested");
        let capture = ThemeCapture {
            light: "<svg/>".to_string(),
            dark: Some("<svg></svg>".to_string()),
            variables: ThemeVariableTable::default(),
            unmatched: vec!["div/span".to_string()],
            toggled_bitmaps: 0,
        };

        let summary = write_documents(&out_dir, "card", capture).unwrap();
        assert_eq!(summary.light_path, out_dir.join("card.svg"));
        assert_eq!(summary.dark_path, Some(out_dir.join("card.dark.svg")));
        assert_eq!(summary.unmatched, 1);
        assert_eq!(std::fs::read_to_string(out_dir.join("card.svg")).unwrap(), "<svg/>");
        assert!(out_dir.join("card.dark.svg").is_file());
    }

    #[test]
    fn offline_runs_use_the_noop_fetcher() {
        let fetcher = icon_fetcher(&Config::default(), true).unwrap();
        let markup = futures::executor::block_on(fetcher.fetch("https://example.com/a.svg"));
        assert!(markup.is_none());
    }
}
