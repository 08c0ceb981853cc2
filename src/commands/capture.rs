use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use domsvg_lib::output::DOMSVG_OUTPUT_VERSION;
use domsvg_lib::{
    capture, CaptureError, CaptureOptions, CaptureOutput, DomsvgOutput, PlaywrightOptions,
    PlaywrightSurface, RootSelector, Viewport,
};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::progress::progress_logger;
use crate::settings::{
    format_effective_config, load_config, resolve_capture_settings, CaptureFlagSources,
};

use super::{icon_fetcher, write_documents};

/// Run the capture command.
#[allow(clippy::too_many_arguments)]
pub async fn run_capture(
    raw_args: &[String],
    config_path: Option<PathBuf>,
    verbose: bool,
    url: String,
    selector: String,
    viewport: Viewport,
    settle_delay: Option<Duration>,
    light_only: bool,
    offline: bool,
    out_dir: PathBuf,
    name: String,
    nav_timeout: u64,
    process_timeout: u64,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output.clone()),
    };
    let flags = CaptureFlagSources::from_args(raw_args);
    let settings = resolve_capture_settings(
        viewport,
        settle_delay,
        light_only,
        nav_timeout,
        process_timeout,
        &config,
        &flags,
    );
    if verbose {
        eprintln!(
            "{}",
            format_effective_config(&settings, &config, config_path.as_deref())
        );
    }
    if let Err(err) = url::Url::parse(&url) {
        return render_error(CaptureError::InvalidUrl(err), format, output.clone());
    }

    let icons = match icon_fetcher(&config, offline) {
        Ok(icons) => icons,
        Err(err) => return render_error(err, format, output.clone()),
    };
    let progress = progress_logger(verbose);

    let mut surface_options = PlaywrightOptions::from_config(&config);
    surface_options.viewport = settings.viewport;
    surface_options.navigation_timeout = Duration::from_secs(settings.nav_timeout);
    surface_options.process_timeout = Duration::from_secs(settings.process_timeout);
    surface_options.progress = progress.clone();
    let mut surface = PlaywrightSurface::new(url.clone(), surface_options);

    let mut options = CaptureOptions::from_config(&config);
    options.settle_delay = settings.settle_delay;
    options.light_only = settings.light_only;
    options.progress = progress;

    let root = RootSelector::new(selector.clone());
    let result = match capture(&mut surface, &root, icons.as_ref(), &options).await {
        Ok(result) => result,
        Err(err) => return render_error(err, format, output.clone()),
    };

    let documents = match write_documents(&out_dir, &name, result) {
        Ok(summary) => summary,
        Err(err) => return render_error(err, format, output.clone()),
    };
    if verbose {
        eprintln!("Wrote {}", documents.light_path.display());
    }

    let body = DomsvgOutput::Capture(CaptureOutput {
        version: DOMSVG_OUTPUT_VERSION.to_string(),
        url,
        selector,
        viewport: settings.viewport,
        documents,
    });
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(CaptureError::Unknown(err.to_string()), format, output);
    }
    ExitCode::SUCCESS
}
