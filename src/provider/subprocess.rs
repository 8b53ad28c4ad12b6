//! Provider CLI spawning.

use std::env;
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::ProviderError;

use super::registry::{OutputFormat, ProviderSpec};

/// Default timeout for provider subprocess execution (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Environment variable to override the default timeout.
pub const TIMEOUT_ENV_VAR: &str = "COMMITGEN_PROVIDER_TIMEOUT";

/// Get the configured timeout duration.
///
/// Reads from COMMITGEN_PROVIDER_TIMEOUT if set, otherwise uses the default
/// of 300 seconds. Invalid values are logged and ignored.
pub fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// Check that the provider executable is on PATH.
pub fn check_installed(spec: &ProviderSpec) -> Result<(), ProviderError> {
    which::which(spec.program).map_err(|_| ProviderError::NotInstalled {
        program: spec.program.to_string(),
    })?;
    Ok(())
}

/// A resolved command line for a provider.
#[derive(Debug, Clone)]
pub struct ProviderCommand {
    pub program: String,
    pub args: Vec<String>,
    pub output: OutputFormat,
    pub timeout: Duration,
}

impl ProviderCommand {
    /// Command for a registry entry, with the timeout from the environment.
    pub fn from_spec(spec: &ProviderSpec) -> Self {
        Self {
            program: spec.program.to_string(),
            args: spec.args.iter().map(|a| a.to_string()).collect(),
            output: spec.output,
            timeout: get_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Run a provider with the prompt on stdin and return its response text.
///
/// The child is killed if the timeout elapses. The response is trimmed.
pub async fn run_provider(
    command: &ProviderCommand,
    prompt: &str,
) -> Result<String, ProviderError> {
    let timeout_secs = command.timeout.as_secs();

    debug!(
        "Running provider '{}' ({} prompt bytes)",
        command.program,
        prompt.len()
    );

    let mut child = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(ProviderError::SpawnFailed)?;

    // Feed stdin concurrently so a chatty child cannot fill its stdout pipe
    // while we are still writing.
    let writer = child.stdin.take().map(|mut stdin| {
        let prompt = prompt.to_string();
        tokio::spawn(async move {
            stdin.write_all(prompt.as_bytes()).await?;
            stdin.shutdown().await
        })
    });

    let output = timeout(command.timeout, child.wait_with_output())
        .await
        .map_err(|_| ProviderError::Timeout(timeout_secs))?
        .map_err(ProviderError::SpawnFailed)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);
        return Err(ProviderError::NonZeroExit { code, stderr });
    }

    if let Some(writer) = writer {
        match writer.await {
            Ok(Ok(())) => {}
            // The provider exited successfully without reading all of stdin.
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                debug!("Provider closed stdin early: {}", e);
            }
            Ok(Err(e)) => return Err(ProviderError::StdinFailed(e)),
            Err(e) => return Err(ProviderError::ExecutionFailed(e.to_string())),
        }
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_output(&stdout, command.output)
}

/// Claude CLI JSON envelope when using --output-format json.
#[derive(Deserialize)]
struct ClaudeCliResponse {
    result: String,
    #[serde(default)]
    is_error: bool,
}

/// Extract the response text from provider stdout.
pub fn parse_output(stdout: &str, format: OutputFormat) -> Result<String, ProviderError> {
    let text = match format {
        OutputFormat::PlainText => stdout.to_string(),
        OutputFormat::ClaudeJson => match serde_json::from_str::<ClaudeCliResponse>(stdout) {
            Ok(envelope) if envelope.is_error => {
                return Err(ProviderError::ExecutionFailed(envelope.result));
            }
            Ok(envelope) => envelope.result,
            Err(e) => {
                debug!("Provider output is not a JSON envelope ({}), using raw text", e);
                stdout.to_string()
            }
        },
    };

    Ok(text.trim().to_string())
}
