//! HTTP and TLS checks through `curl`

use crate::process::{command, secs_arg};
use async_trait::async_trait;
use std::time::Duration;
use zst_core::{HttpProber, ProbeError, Protocol};

/// Runs `curl -I` against a host, pinned to one protocol
#[derive(Debug, Clone)]
pub struct CurlProber {
    program: String,
}

impl Default for CurlProber {
    fn default() -> Self {
        Self::new("curl")
    }
}

impl CurlProber {
    /// Use a specific curl binary
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

/// Arguments for one HEAD check
pub fn curl_args(host: &str, protocol: Protocol, timeout: Duration) -> Vec<String> {
    let secs = secs_arg(timeout);
    let mut args: Vec<String> = [
        "-I",
        "-s",
        "-o",
        "/dev/null",
        "-w",
        "%{http_code}",
        "-m",
        &secs,
        "--connect-timeout",
        &secs,
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect();

    match protocol {
        Protocol::Http => args.push(format!("http://{host}")),
        Protocol::Tls12 => {
            args.push("--tlsv1.2".into());
            args.push(format!("https://{host}"));
        }
        Protocol::Tls13 => {
            args.push("--tlsv1.3".into());
            args.push(format!("https://{host}"));
        }
    }
    args
}

/// Parse the `%{http_code}` write-out; `000` means no response
pub fn parse_status(output: &str) -> Option<u16> {
    let trimmed = output.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok().filter(|code| *code != 0)
}

#[async_trait]
impl HttpProber for CurlProber {
    async fn head(&self, host: &str, protocol: Protocol, timeout: Duration) -> Result<u16, ProbeError> {
        let args = curl_args(host, protocol, timeout);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let out = command(&self.program, &args)
            .output()
            .await
            .map_err(ProbeError::Spawn)?;

        if !out.status.success() {
            return Err(ProbeError::Exit(out.status.code()));
        }

        let stdout = String::from_utf8_lossy(&out.stdout);
        parse_status(&stdout).ok_or_else(|| ProbeError::BadOutput(stdout.trim().to_string()))
    }
}
