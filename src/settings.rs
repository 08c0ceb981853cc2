use std::path::Path;
use std::time::Duration;

use domsvg_lib::types::Viewport;
use domsvg_lib::{CaptureError, Config};

/// Which capture flags were given explicitly.
#[derive(Debug, Default)]
pub struct CaptureFlagSources {
    pub viewport: bool,
    pub nav_timeout: bool,
    pub process_timeout: bool,
}

impl CaptureFlagSources {
    pub fn from_args(args: &[String]) -> Self {
        Self {
            viewport: flag_present(args, "--viewport"),
            nav_timeout: flag_present(args, "--nav-timeout"),
            process_timeout: flag_present(args, "--process-timeout"),
        }
    }
}

/// True when `flag` appears in `args`, bare or as `flag=value`.
pub fn flag_present(args: &[String], flag: &str) -> bool {
    args.iter()
        .any(|arg| arg == flag || arg.starts_with(&format!("{flag}=")))
}

/// Capture settings after merging flags and config.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedCaptureSettings {
    pub viewport: Viewport,
    pub settle_delay: Duration,
    pub light_only: bool,
    pub nav_timeout: u64,
    pub process_timeout: u64,
}

/// Merges capture flags over the config file; explicit flags win.
pub fn resolve_capture_settings(
    cli_viewport: Viewport,
    cli_settle_delay: Option<Duration>,
    cli_light_only: bool,
    cli_nav_timeout: u64,
    cli_process_timeout: u64,
    config: &Config,
    flags: &CaptureFlagSources,
) -> ResolvedCaptureSettings {
    ResolvedCaptureSettings {
        viewport: if flags.viewport {
            cli_viewport
        } else {
            config.viewport
        },
        settle_delay: cli_settle_delay.unwrap_or(config.capture.settle_delay),
        light_only: cli_light_only || config.capture.debug_light_only,
        nav_timeout: if flags.nav_timeout {
            cli_nav_timeout
        } else {
            config.browser.navigation_timeout.as_secs()
        },
        process_timeout: if flags.process_timeout {
            cli_process_timeout
        } else {
            config.browser.process_timeout.as_secs()
        },
    }
}

/// Loads and validates the config from `path`, the central location, or defaults.
/// Priority: explicit path > ~/.config/domsvg/config.toml > defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, CaptureError> {
    let cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        CaptureError::Config(format!("Failed to read config {}: {}", loc, e))
    })?;

    cfg.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        CaptureError::Config(prefix)
    })?;
    Ok(cfg)
}

/// One-line summary of the settings a capture will run with.
pub fn format_effective_config(
    settings: &ResolvedCaptureSettings,
    config: &Config,
    config_source: Option<&Path>,
) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    format!(
        "Effective config [{source}]: viewport={}x{}, settle={}ms, detach={}ms, light_only={}, timeouts: nav={}s, process={}s, text: tolerance={:.1}px, line-height={:.2}, theme: font-min={}, name-max={}",
        settings.viewport.width,
        settings.viewport.height,
        settings.settle_delay.as_millis(),
        config.capture.detach_delay.as_millis(),
        settings.light_only,
        settings.nav_timeout,
        settings.process_timeout,
        config.text.tolerance_px,
        config.text.default_line_height_factor,
        config.theme.font_family_min_len,
        config.theme.max_variable_name_len,
    )
}
