use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use domsvg_lib::output::DOMSVG_OUTPUT_VERSION;
use domsvg_lib::{
    capture, CaptureError, CaptureOptions, ConvertOutput, DomsvgOutput, RootSelector,
    SnapshotSurface,
};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::progress::progress_logger;
use crate::settings::load_config;

use super::{icon_fetcher, write_documents};

/// Run the convert command: recorded snapshots in, SVG documents out.
#[allow(clippy::too_many_arguments)]
pub async fn run_convert(
    config_path: Option<PathBuf>,
    verbose: bool,
    light: PathBuf,
    dark: Option<PathBuf>,
    offline: bool,
    out_dir: PathBuf,
    name: String,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output.clone()),
    };
    if verbose {
        eprintln!("Loading snapshots from {}\u{2026}", light.display());
    }
    let mut surface = match SnapshotSurface::from_files(&light, dark.as_deref()) {
        Ok(surface) => surface,
        Err(err) => {
            return render_error(
                CaptureError::Config(format!(
                    "Failed to load snapshot {}: {}",
                    light.display(),
                    err
                )),
                format,
                output.clone(),
            )
        }
    };
    let icons = match icon_fetcher(&config, offline) {
        Ok(icons) => icons,
        Err(err) => return render_error(err, format, output.clone()),
    };

    // Recorded snapshots need no settling.
    let mut options = CaptureOptions::from_config(&config);
    options.settle_delay = Duration::ZERO;
    options.detach_delay = Duration::ZERO;
    options.light_only |= dark.is_none();
    options.progress = progress_logger(verbose);

    let root = RootSelector::new(light.display().to_string());
    let result = match capture(&mut surface, &root, icons.as_ref(), &options).await {
        Ok(result) => result,
        Err(err) => return render_error(err, format, output.clone()),
    };
    let documents = match write_documents(&out_dir, &name, result) {
        Ok(summary) => summary,
        Err(err) => return render_error(err, format, output.clone()),
    };

    let body = DomsvgOutput::Convert(ConvertOutput {
        version: DOMSVG_OUTPUT_VERSION.to_string(),
        light_snapshot: light,
        dark_snapshot: dark,
        documents,
    });
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(CaptureError::Unknown(err.to_string()), format, output);
    }
    ExitCode::SUCCESS
}
