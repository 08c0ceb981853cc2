use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use domsvg_lib::output::DOMSVG_OUTPUT_VERSION;
use domsvg_lib::{CaptureError, DocumentSummary, DomsvgOutput, ErrorOutput};

use crate::cli::OutputFormat;

/// Write output in the requested format.
pub fn write_output(
    body: &DomsvgOutput,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => write_json_output(body, output.as_deref())?,
        OutputFormat::Pretty => write_pretty_output(body, output.as_deref())?,
    };
    Ok(())
}

/// Render an error and return the fatal exit code.
pub fn render_error(err: CaptureError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    log::debug!("command failed: {err:?}");
    let error_payload = err.to_payload();
    let payload = DomsvgOutput::Error(ErrorOutput {
        version: DOMSVG_OUTPUT_VERSION.to_string(),
        message: Some(error_payload.message.clone()),
        error: error_payload,
    });

    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"mode\":\"error\"}".into());
            if let Some(path) = output {
                if let Err(write_err) = std::fs::write(&path, &content) {
                    eprintln!("Failed to write error output: {}", write_err);
                    println!("{content}");
                }
            } else {
                println!("{content}");
            }
        }
        OutputFormat::Pretty => {
            if let Err(write_err) = write_pretty_output(&payload, output.as_deref()) {
                eprintln!("Failed to write error output: {}", write_err);
            }
        }
    };

    ExitCode::from(2)
}

fn write_json_output(
    body: &DomsvgOutput,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string(body)?;
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

fn write_pretty_output(body: &DomsvgOutput, output: Option<&Path>) -> io::Result<()> {
    let stdout_is_tty = std::io::stdout().is_terminal();
    let use_human = output.is_none() && stdout_is_tty;

    if use_human {
        let content = format_pretty(body, true);
        println!("{content}");
        return Ok(());
    }

    // Non-tty or file output: keep JSON shape for pipelines/files.
    let content =
        serde_json::to_string_pretty(body).unwrap_or_else(|_| "{\"mode\":\"error\"}".to_string());
    if let Some(path) = output {
        std::fs::write(path, &content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &DomsvgOutput, colorize: bool) -> String {
    match body {
        DomsvgOutput::Capture(out) => {
            let mut buf = String::new();
            let header = color("[CAPTURE]", "36", colorize);
            writeln!(buf, "{} {} ({})", header, out.url, out.selector).ok();
            writeln!(
                buf,
                "Viewport: {}x{}",
                out.viewport.width, out.viewport.height
            )
            .ok();
            write_documents(&mut buf, &out.documents, colorize);
            buf
        }
        DomsvgOutput::Convert(out) => {
            let mut buf = String::new();
            let header = color("[CONVERT]", "36", colorize);
            writeln!(buf, "{} {}", header, out.light_snapshot.display()).ok();
            if let Some(dark) = &out.dark_snapshot {
                writeln!(buf, "Dark snapshot: {}", dark.display()).ok();
            }
            write_documents(&mut buf, &out.documents, colorize);
            buf
        }
        DomsvgOutput::Snapshot(out) => {
            let mut buf = String::new();
            let header = color("[SNAPSHOT]", "34", colorize);
            writeln!(
                buf,
                "{} {} ({}, {})",
                header, out.url, out.selector, out.theme
            )
            .ok();
            writeln!(
                buf,
                "Recorded {} elements at {}x{} to {}",
                out.elements,
                out.viewport.width,
                out.viewport.height,
                out.output_path.display()
            )
            .ok();
            buf
        }
        DomsvgOutput::Error(out) => {
            let mut buf = String::new();
            let header = color("[ERROR]", "31", colorize);
            let message = out
                .message
                .as_deref()
                .unwrap_or_else(|| out.error.message.as_str());
            writeln!(buf, "{} {}", header, message).ok();
            if let Some(remediation) = &out.error.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
            buf
        }
    }
}

fn write_documents(buf: &mut String, docs: &DocumentSummary, colorize: bool) {
    writeln!(buf, "Documents:").ok();
    writeln!(buf, "- {:8} {}", "light", docs.light_path.display()).ok();
    if let Some(dark) = &docs.dark_path {
        writeln!(buf, "- {:8} {}", "dark", dark.display()).ok();
    }
    writeln!(buf, "Theme variables: {}", docs.variables).ok();
    if docs.toggled_bitmaps > 0 {
        writeln!(buf, "Toggled bitmaps: {}", docs.toggled_bitmaps).ok();
    }
    if docs.unmatched > 0 {
        let label = color(&format!("{} unmatched", docs.unmatched), "33", colorize);
        writeln!(buf, "Unmatched nodes: {label} (kept light values)").ok();
        for fingerprint in docs.unmatched_nodes.iter().take(5) {
            writeln!(buf, "- {fingerprint}").ok();
        }
    }
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domsvg_lib::error::{ErrorCategory, ErrorPayload};
    use domsvg_lib::{CaptureOutput, SnapshotOutput, ThemeSetting, Viewport};

    fn documents(unmatched: usize) -> DocumentSummary {
        DocumentSummary {
            light_path: PathBuf::from("out/card.svg"),
            dark_path: Some(PathBuf::from("out/card.dark.svg")),
            variables: 4,
            unmatched,
            toggled_bitmaps: 1,
            unmatched_nodes: (0..unmatched).map(|i| format!("div/{i}")).collect(),
        }
    }

    #[test]
    fn render_error_always_returns_fatal_exit_code() {
        let code = render_error(
            CaptureError::Config("boom".to_string()),
            OutputFormat::Json,
            None,
        );
        assert_eq!(code, ExitCode::from(2));
    }

    #[test]
    fn render_error_writes_json_payload_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error.json");
        render_error(
            CaptureError::Surface("Node.js not found".to_string()),
            OutputFormat::Json,
            Some(path.clone()),
        );
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"mode\":\"error\""));
        assert!(written.contains("\"category\":\"surface\""));
    }

    #[test]
    fn format_pretty_lists_documents_and_variables() {
        let output = DomsvgOutput::Capture(CaptureOutput {
            version: DOMSVG_OUTPUT_VERSION.to_string(),
            url: "https://example.com".to_string(),
            selector: "#card".to_string(),
            viewport: Viewport {
                width: 800,
                height: 600,
            },
            documents: documents(0),
        });

        let pretty = format_pretty(&output, false);
        assert!(pretty.contains("[CAPTURE] https://example.com (#card)"));
        assert!(pretty.contains("Viewport: 800x600"));
        assert!(pretty.contains("out/card.svg"));
        assert!(pretty.contains("out/card.dark.svg"));
        assert!(pretty.contains("Theme variables: 4"));
        assert!(pretty.contains("Toggled bitmaps: 1"));
        assert!(!pretty.contains("Unmatched"));
    }

    #[test]
    fn format_pretty_caps_unmatched_listing() {
        let output = DomsvgOutput::Capture(CaptureOutput {
            version: DOMSVG_OUTPUT_VERSION.to_string(),
            url: "https://example.com".to_string(),
            selector: "main".to_string(),
            viewport: Viewport::default(),
            documents: documents(8),
        });
        let pretty = format_pretty(&output, false);
        assert!(pretty.contains("Unmatched nodes: 8 unmatched"));
        assert!(pretty.contains("- div/4"));
        assert!(!pretty.contains("- div/5"));
    }

    #[test]
    fn format_pretty_describes_snapshots() {
        let output = DomsvgOutput::Snapshot(SnapshotOutput {
            version: DOMSVG_OUTPUT_VERSION.to_string(),
            url: "https://example.com".to_string(),
            selector: "main".to_string(),
            theme: ThemeSetting::Dark,
            viewport: Viewport::default(),
            output_path: PathBuf::from("dark.json"),
            elements: 7,
        });
        let pretty = format_pretty(&output, false);
        assert!(pretty.contains("[SNAPSHOT] https://example.com (main, dark)"));
        assert!(pretty.contains("Recorded 7 elements at 1440x900 to dark.json"));
    }

    #[test]
    fn format_pretty_handles_errors() {
        let output = DomsvgOutput::Error(ErrorOutput {
            version: DOMSVG_OUTPUT_VERSION.to_string(),
            message: Some("bad input".to_string()),
            error: ErrorPayload {
                category: ErrorCategory::Config,
                message: "bad input".to_string(),
                remediation: Some("check flags".to_string()),
            },
        });

        let pretty = format_pretty(&output, false);
        assert!(pretty.contains("[ERROR] bad input"));
        assert!(pretty.contains("Hint: check flags"));
    }
}
