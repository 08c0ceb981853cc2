//! Node process plumbing: availability checks, script execution and error mapping.

use crate::error::{CaptureError, Result};
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;

/// Timeout for checking node/playwright availability.
pub(crate) const NODE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

const PLAYWRIGHT_CHECK_SCRIPT: &str = "require('playwright'); process.stdout.write('ok');";

/// Error object printed by the snapshot script.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ScriptError {
    pub status: String,
    pub message: String,
}

pub(crate) fn map_spawn_error(err: io::Error, command: &str) -> CaptureError {
    if err.kind() == io::ErrorKind::NotFound {
        CaptureError::Surface(format!(
            "Unable to spawn Playwright helper; '{}' was not found on PATH",
            command
        ))
    } else {
        CaptureError::Io(err)
    }
}

/// Maps Playwright stderr output to a surface error with a remediation hint.
pub(crate) fn map_playwright_error(status_text: impl Into<String>, stderr: &str) -> CaptureError {
    if let Ok(error) = serde_json::from_str::<ScriptError>(stderr) {
        return map_playwright_status_error(&error.status, error.message);
    }

    let lower = stderr.to_ascii_lowercase();
    if lower.contains("cannot find module 'playwright'") {
        return CaptureError::Surface(
            "Playwright npm package is missing; install with `npm install playwright`.".to_string(),
        );
    }
    if lower.contains("timeout") {
        return CaptureError::Surface(
            "Playwright timed out; try increasing --nav-timeout or --process-timeout, and ensure the page finishes loading."
                .to_string(),
        );
    }

    CaptureError::Surface(format!(
        "Playwright exited with status {}: {}",
        status_text.into(),
        stderr.trim()
    ))
}

pub(crate) fn map_playwright_status_error(status: &str, message: String) -> CaptureError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("cannot find module 'playwright'") {
        CaptureError::Surface(
            "Playwright npm package is missing; install with `npm install playwright`.".to_string(),
        )
    } else if lower.contains("no element matches") {
        CaptureError::Surface(format!(
            "Playwright error (status {}): {}. Hint: check the --selector value against the page.",
            status, message
        ))
    } else if lower.contains("timeout") {
        CaptureError::Surface(format!(
            "Playwright error (status {}): {}. Hint: increase --nav-timeout or --process-timeout, and ensure the page finishes loading.",
            status, message
        ))
    } else {
        CaptureError::Surface(format!("Playwright error (status {}): {}", status, message))
    }
}

pub(crate) async fn ensure_node_available(node_command: &str) -> Result<()> {
    let mut cmd = Command::new(node_command);
    cmd.arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let status = timeout(NODE_CHECK_TIMEOUT, cmd.status())
        .await
        .map_err(|_| {
            CaptureError::Surface(format!(
                "Timed out checking node availability after {:?}",
                NODE_CHECK_TIMEOUT
            ))
        })?
        .map_err(|err| map_spawn_error(err, node_command))?;

    if !status.success() {
        return Err(CaptureError::Surface(format!(
            "Node command {:?} is not available (exit {})",
            node_command, status
        )));
    }
    Ok(())
}

pub(crate) async fn ensure_playwright_available(node_command: &str) -> Result<()> {
    let mut cmd = Command::new(node_command);
    cmd.arg("-e")
        .arg(PLAYWRIGHT_CHECK_SCRIPT)
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let output = timeout(NODE_CHECK_TIMEOUT, cmd.output())
        .await
        .map_err(|_| {
            CaptureError::Surface(format!(
                "Timed out checking Playwright availability after {:?}",
                NODE_CHECK_TIMEOUT
            ))
        })?
        .map_err(|err| map_spawn_error(err, node_command))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(map_playwright_error(format!("{:?}", output.status), &stderr));
    }
    Ok(())
}

/// Runs `node -e <script> <args...>`, killing it after `process_timeout`. Returns stdout.
pub(crate) async fn run_node_script(
    node_command: &str,
    script: &str,
    args: &[String],
    process_timeout: Duration,
) -> Result<String> {
    let mut cmd = Command::new(node_command);
    cmd.arg("-e")
        .arg(script)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd
        .spawn()
        .map_err(|err| map_spawn_error(err, node_command))?;

    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout_pipe {
            let _ = out.read_to_end(&mut buf).await;
        }
        buf
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr_pipe {
            let _ = err.read_to_end(&mut buf).await;
        }
        buf
    });

    let status = match timeout(process_timeout, child.wait()).await {
        Ok(Ok(status)) => status,
        Ok(Err(err)) => return Err(CaptureError::Io(err)),
        Err(_) => {
            let _ = child.kill().await;
            let _ = child.wait().await;
            return Err(CaptureError::Surface(format!(
                "Playwright timed out after {:?}",
                process_timeout
            )));
        }
    };

    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();

    if !status.success() {
        let stderr = String::from_utf8_lossy(&stderr);
        return Err(map_playwright_error(status.to_string(), &stderr));
    }
    Ok(String::from_utf8_lossy(&stdout).into_owned())
}
