use clap::{Parser, Subcommand, ValueEnum};
use domsvg_lib::{ThemeSetting, Viewport};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "domsvg")]
#[command(
    version,
    about = "domsvg - Capture rendered DOM subtrees as standalone, theme-aware SVG",
    long_about = "domsvg\n\nModes:\n- capture: record a page subtree under light and dark color schemes and write one theme-aware SVG.\n- convert: build the SVGs offline from snapshots recorded earlier.\n- snapshot: record one subtree snapshot (JSON) under a single color scheme.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) to set defaults for viewport/delays/timeouts; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture a page subtree as a theme-aware SVG
    Capture {
        #[arg(long, help = "Page URL to capture")]
        url: String,

        #[arg(long, help = "CSS selector of the root element")]
        selector: String,

        #[arg(
            long,
            default_value = "1440x900",
            help = "Viewport dimensions (WIDTHxHEIGHT)"
        )]
        viewport: Viewport,

        #[arg(
            long,
            value_name = "DURATION",
            value_parser = parse_delay,
            help = "Delay after each theme switch before sampling geometry (e.g. 1s, 250ms)"
        )]
        settle_delay: Option<Duration>,

        #[arg(long, help = "Only produce the light document (skips the dark pass)")]
        light_only: bool,

        #[arg(long, help = "Do not fetch external SVG icons")]
        offline: bool,

        #[arg(long, default_value = ".", value_name = "DIR", help = "Directory for the SVG files")]
        out_dir: PathBuf,

        #[arg(long, default_value = "capture", help = "File stem for the SVG files")]
        name: String,

        #[arg(
            long,
            default_value = "30",
            help = "Navigation timeout (seconds) for page loading"
        )]
        nav_timeout: u64,

        #[arg(
            long,
            default_value = "60",
            help = "Process timeout (seconds) for each Playwright invocation"
        )]
        process_timeout: u64,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Report file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
    /// Convert recorded snapshots into SVG
    Convert {
        #[arg(long, value_name = "PATH", help = "Snapshot recorded under the light theme")]
        light: PathBuf,

        #[arg(long, value_name = "PATH", help = "Snapshot recorded under the dark theme")]
        dark: Option<PathBuf>,

        #[arg(long, help = "Do not fetch external SVG icons")]
        offline: bool,

        #[arg(long, default_value = ".", value_name = "DIR", help = "Directory for the SVG files")]
        out_dir: PathBuf,

        #[arg(long, default_value = "capture", help = "File stem for the SVG files")]
        name: String,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Report file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
    /// Record a subtree snapshot under one color scheme
    Snapshot {
        #[arg(long, help = "Page URL to record")]
        url: String,

        #[arg(long, help = "CSS selector of the root element")]
        selector: String,

        #[arg(long, value_enum, default_value = "light", help = "Color scheme to emulate")]
        theme: ThemeArg,

        #[arg(long, value_name = "PATH", help = "Snapshot file to write")]
        out: PathBuf,

        #[arg(
            long,
            default_value = "1440x900",
            help = "Viewport dimensions (WIDTHxHEIGHT)"
        )]
        viewport: Viewport,

        #[arg(
            long,
            value_name = "DURATION",
            value_parser = parse_delay,
            help = "Delay after page load before sampling geometry (e.g. 1s, 250ms)"
        )]
        settle_delay: Option<Duration>,

        #[arg(
            long,
            default_value = "30",
            help = "Navigation timeout (seconds) for page loading"
        )]
        nav_timeout: u64,

        #[arg(
            long,
            default_value = "60",
            help = "Process timeout (seconds) for the Playwright invocation"
        )]
        process_timeout: u64,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Report file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
    Unset,
}

impl From<ThemeArg> for ThemeSetting {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => ThemeSetting::Light,
            ThemeArg::Dark => ThemeSetting::Dark,
            ThemeArg::Unset => ThemeSetting::Unset,
        }
    }
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
}

fn parse_delay(raw: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(raw).map_err(|e| e.to_string())
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, OutputFormat, ThemeArg};
    use clap::Parser;
    use domsvg_lib::ThemeSetting;
    use std::path::Path;
    use std::time::Duration;

    #[test]
    fn capture_command_uses_defaults() {
        let cli = Cli::parse_from([
            "domsvg",
            "capture",
            "--url",
            "https://example.com",
            "--selector",
            "#card",
        ]);

        assert!(!cli.verbose);
        assert!(cli.config.is_none());

        match cli.command {
            Commands::Capture {
                url,
                selector,
                viewport,
                settle_delay,
                light_only,
                offline,
                out_dir,
                name,
                nav_timeout,
                process_timeout,
                format,
                output,
            } => {
                assert_eq!(url, "https://example.com");
                assert_eq!(selector, "#card");
                assert_eq!(viewport.width, 1440);
                assert_eq!(viewport.height, 900);
                assert!(settle_delay.is_none());
                assert!(!light_only);
                assert!(!offline);
                assert_eq!(out_dir, Path::new("."));
                assert_eq!(name, "capture");
                assert_eq!(nav_timeout, 30);
                assert_eq!(process_timeout, 60);
                assert!(matches!(format, OutputFormat::Json));
                assert!(output.is_none());
            }
            _ => panic!("expected capture command"),
        }
    }

    #[test]
    fn capture_command_respects_overrides() {
        let cli = Cli::parse_from([
            "domsvg",
            "--verbose",
            "capture",
            "--url",
            "https://example.com",
            "--selector",
            "main",
            "--viewport",
            "800x600",
            "--settle-delay",
            "250ms",
            "--light-only",
            "--offline",
            "--out-dir",
            "out",
            "--name",
            "hero",
            "--format",
            "pretty",
            "--config",
            "domsvg.toml",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some(Path::new("domsvg.toml")));
        match cli.command {
            Commands::Capture {
                viewport,
                settle_delay,
                light_only,
                offline,
                out_dir,
                name,
                format,
                ..
            } => {
                assert_eq!(viewport.width, 800);
                assert_eq!(settle_delay, Some(Duration::from_millis(250)));
                assert!(light_only);
                assert!(offline);
                assert_eq!(out_dir, Path::new("out"));
                assert_eq!(name, "hero");
                assert!(matches!(format, OutputFormat::Pretty));
            }
            _ => panic!("expected capture command with overrides"),
        }
    }

    #[test]
    fn convert_command_accepts_optional_dark_snapshot() {
        let cli = Cli::parse_from(["domsvg", "convert", "--light", "light.json"]);
        match cli.command {
            Commands::Convert { light, dark, .. } => {
                assert_eq!(light, Path::new("light.json"));
                assert!(dark.is_none());
            }
            _ => panic!("expected convert command"),
        }
    }

    #[test]
    fn snapshot_command_parses_theme() {
        let cli = Cli::parse_from([
            "domsvg",
            "snapshot",
            "--url",
            "https://example.com",
            "--selector",
            "main",
            "--theme",
            "dark",
            "--out",
            "dark.json",
        ]);
        match cli.command {
            Commands::Snapshot { theme, out, .. } => {
                assert!(matches!(theme, ThemeArg::Dark));
                assert_eq!(ThemeSetting::from(theme), ThemeSetting::Dark);
                assert_eq!(out, Path::new("dark.json"));
            }
            _ => panic!("expected snapshot command"),
        }
    }

    #[test]
    fn invalid_delays_are_rejected() {
        let parsed = Cli::try_parse_from([
            "domsvg",
            "capture",
            "--url",
            "https://example.com",
            "--selector",
            "main",
            "--settle-delay",
            "soon",
        ]);
        assert!(parsed.is_err());
    }
}
