//! Shell-invoked fetch transport.
//!
//! Runs `curl` as a subprocess so the outbound TLS/HTTP fingerprint
//! matches a command-line client. The command is built as an argument
//! vector and executed without a shell, so header values and body
//! content cannot terminate or inject into the command line. Header
//! values containing CR/LF are rejected outright.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::error::TransportError;
use crate::transport::{HttpMethod, Transport, TransportKind, TransportRequest, TransportResponse};

/// curl's exit code for an operation timeout.
const CURL_EXIT_TIMEOUT: i32 = 28;

/// Marker separating the body from the status trailer in curl output.
const STATUS_TRAILER: &str = "\n%{http_code}";

/// Extra slack granted to the subprocess beyond the request timeout, so
/// curl's own `--max-time` fires first and reports cleanly.
const PROCESS_TIMEOUT_SLACK: Duration = Duration::from_millis(500);

/// Transport that fetches through a locally spawned `curl`.
#[derive(Debug, Clone, Default)]
pub struct ShellTransport;

impl ShellTransport {
    /// Creates a new shell transport.
    pub fn new() -> Self {
        Self
    }

    /// Builds the curl argument vector for a request.
    ///
    /// Every header and the body each occupy exactly one argv slot; no
    /// quoting or escaping is involved because no shell ever parses them.
    fn build_args(req: &TransportRequest) -> Result<Vec<String>, TransportError> {
        let mut args = vec![
            "-sS".to_string(),
            "-X".to_string(),
            req.method.as_str().to_string(),
            "--max-time".to_string(),
            format!("{:.3}", req.timeout.as_secs_f64()),
            "-w".to_string(),
            STATUS_TRAILER.to_string(),
        ];

        for (name, value) in &req.headers {
            if name.contains(['\r', '\n']) || value.contains(['\r', '\n']) {
                return Err(TransportError::InvalidHeader(format!(
                    "Header {name} contains line breaks"
                )));
            }
            args.push("-H".to_string());
            args.push(format!("{name}: {value}"));
        }

        if let Some(body) = &req.body {
            if req.method == HttpMethod::Post {
                args.push("--data-raw".to_string());
                args.push(body.clone());
            }
        }

        args.push(req.url.clone());
        Ok(args)
    }

    /// Splits curl output into body and status trailer.
    fn split_status(stdout: &str) -> (String, u16) {
        match stdout.rsplit_once('\n') {
            Some((body, trailer)) => match trailer.trim().parse::<u16>() {
                Ok(status) => (body.to_string(), status),
                Err(_) => (stdout.to_string(), 0),
            },
            None => (stdout.to_string(), 0),
        }
    }
}

#[async_trait]
impl Transport for ShellTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Shell
    }

    async fn is_available(&self) -> bool {
        which::which("curl").is_ok()
    }

    #[instrument(skip(self, req), fields(url = %req.url))]
    async fn send(&self, req: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let curl = which::which("curl")
            .map_err(|_| TransportError::CommandNotFound("curl".to_string()))?;

        let args = Self::build_args(req)?;
        debug!(args = args.len(), "Spawning curl");

        let mut command = Command::new(curl);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let process_budget = req.timeout + PROCESS_TIMEOUT_SLACK;
        let output = match tokio::time::timeout(process_budget, command.output()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(timeout = ?req.timeout, "curl exceeded its budget");
                return Err(TransportError::Timeout(req.timeout));
            }
        };

        let code = output.status.code().unwrap_or(-1);
        if code == CURL_EXIT_TIMEOUT {
            return Err(TransportError::Timeout(req.timeout));
        }
        if code != 0 {
            return Err(TransportError::CommandFailed {
                code,
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let (body, status) = Self::split_status(&stdout);
        debug!(status, body_len = body.len(), "curl completed");

        Ok(TransportResponse { status, body })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_header(value: &str) -> TransportRequest {
        TransportRequest::get("https://example.com/offers")
            .with_header("x-session-id", value)
    }

    #[test]
    fn test_header_occupies_single_argv_slot() {
        // A hostile value full of shell metacharacters stays one argument.
        let hostile = r#"abc"; rm -rf / #'$(reboot)"#;
        let args = ShellTransport::build_args(&request_with_header(hostile)).unwrap();

        let slot = args
            .iter()
            .find(|a| a.starts_with("x-session-id: "))
            .expect("header argument present");
        assert_eq!(slot, &format!("x-session-id: {hostile}"));
        // The URL is always the final argument.
        assert_eq!(args.last().unwrap(), "https://example.com/offers");
    }

    #[test]
    fn test_crlf_header_rejected() {
        let result = ShellTransport::build_args(&request_with_header("ok\r\nhost: evil"));
        assert!(matches!(result, Err(TransportError::InvalidHeader(_))));
    }

    #[test]
    fn test_body_passed_raw() {
        let req = TransportRequest::post("https://example.com", r#"{"a":"b c"}"#);
        let args = ShellTransport::build_args(&req).unwrap();

        let idx = args.iter().position(|a| a == "--data-raw").unwrap();
        assert_eq!(args[idx + 1], r#"{"a":"b c"}"#);
    }

    #[test]
    fn test_max_time_from_timeout() {
        let req = TransportRequest::get("https://example.com")
            .with_timeout(Duration::from_millis(2500));
        let args = ShellTransport::build_args(&req).unwrap();

        let idx = args.iter().position(|a| a == "--max-time").unwrap();
        assert_eq!(args[idx + 1], "2.500");
    }

    #[test]
    fn test_split_status() {
        let (body, status) = ShellTransport::split_status("{\"ok\":true}\n200");
        assert_eq!(body, "{\"ok\":true}");
        assert_eq!(status, 200);

        let (body, status) = ShellTransport::split_status("no trailer here");
        assert_eq!(body, "no trailer here");
        assert_eq!(status, 0);
    }

    #[tokio::test]
    async fn test_kind_and_availability_check_runs() {
        let transport = ShellTransport::new();
        assert_eq!(transport.kind(), TransportKind::Shell);
        // Availability depends on the host; just exercise the check.
        let _ = transport.is_available().await;
    }
}
