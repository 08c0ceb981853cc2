use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use domsvg_lib::output::DOMSVG_OUTPUT_VERSION;
use domsvg_lib::surface::CaptureSurface;
use domsvg_lib::{
    CaptureError, DomsvgOutput, PlaywrightOptions, PlaywrightSurface, RootSelector,
    SnapshotOutput, SourceSnapshot, ThemeLease, ThemeSetting, Viewport,
};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::progress::progress_logger;
use crate::settings::{
    format_effective_config, load_config, resolve_capture_settings, CaptureFlagSources,
};

/// Run the snapshot command.
#[allow(clippy::too_many_arguments)]
pub async fn run_snapshot(
    raw_args: &[String],
    config_path: Option<PathBuf>,
    verbose: bool,
    url: String,
    selector: String,
    theme: ThemeSetting,
    out: PathBuf,
    viewport: Viewport,
    settle_delay: Option<Duration>,
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
        false,
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

    let mut surface_options = PlaywrightOptions::from_config(&config);
    surface_options.viewport = settings.viewport;
    surface_options.navigation_timeout = Duration::from_secs(settings.nav_timeout);
    surface_options.process_timeout = Duration::from_secs(settings.process_timeout);
    surface_options.progress = progress_logger(verbose);
    let mut surface = PlaywrightSurface::new(url.clone(), surface_options);

    let root = RootSelector::new(selector.clone());
    let recorded = record_one(&mut surface, theme, settings.settle_delay, &root).await;
    let reopened = surface.reopen_hooks().await;
    let snapshot = match recorded.and_then(|snapshot| reopened.map(|_| snapshot)) {
        Ok(snapshot) => snapshot,
        Err(err) => return render_error(err, format, output.clone()),
    };

    let elements = snapshot.root.descendants().len();
    if let Err(err) = write_snapshot(&out, &snapshot) {
        return render_error(err, format, output.clone());
    }
    if verbose {
        eprintln!("Wrote {} ({} elements)", out.display(), elements);
    }

    let body = DomsvgOutput::Snapshot(SnapshotOutput {
        version: DOMSVG_OUTPUT_VERSION.to_string(),
        url,
        selector,
        theme,
        viewport: settings.viewport,
        output_path: out,
        elements,
    });
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(CaptureError::Unknown(err.to_string()), format, output);
    }
    ExitCode::SUCCESS
}

async fn record_one(
    surface: &mut dyn CaptureSurface,
    theme: ThemeSetting,
    settle_delay: Duration,
    root: &RootSelector,
) -> Result<SourceSnapshot, CaptureError> {
    let mut lease = ThemeLease::acquire(surface);
    let mut doc = lease.working_document()?;
    let snapshot = doc.capture_under(theme, settle_delay, root).await?;
    Ok(snapshot)
}

fn write_snapshot(path: &std::path::Path, snapshot: &SourceSnapshot) -> Result<(), CaptureError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, content)?;
    Ok(())
}
