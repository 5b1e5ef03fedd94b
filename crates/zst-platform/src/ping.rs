//! ICMP reachability through the system `ping`

use crate::process::{command, secs_arg};
use async_trait::async_trait;
use std::time::Duration;
use zst_core::{Pinger, ProbeError};

/// Runs `ping -c 1 -W <secs> -- <host>`
#[derive(Debug, Clone)]
pub struct SystemPinger {
    program: String,
}

impl Default for SystemPinger {
    fn default() -> Self {
        Self::new("ping")
    }
}

impl SystemPinger {
    /// Use a specific ping binary
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Pinger for SystemPinger {
    async fn ping(&self, host: &str, timeout: Duration) -> Result<f64, ProbeError> {
        let args = ping_args(host, timeout);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let out = command(&self.program, &args)
            .output()
            .await
            .map_err(ProbeError::Spawn)?;

        if !out.status.success() {
            return Err(ProbeError::Exit(out.status.code()));
        }

        let stdout = String::from_utf8_lossy(&out.stdout);
        parse_rtt(&stdout).ok_or_else(|| ProbeError::BadOutput(stdout.trim().to_string()))
    }
}

/// Arguments for one echo request; the host always follows `--`
pub fn ping_args(host: &str, timeout: Duration) -> Vec<String> {
    vec![
        "-c".into(),
        "1".into(),
        "-W".into(),
        secs_arg(timeout),
        "--".into(),
        host.into(),
    ]
}

/// Extract the `time=<ms>` value of the first echo reply
pub fn parse_rtt(output: &str) -> Option<f64> {
    let start = output.find("time=")? + "time=".len();
    let value: String = output[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = "PING example.com (93.184.216.34) 56(84) bytes of data.\n\
        64 bytes from 93.184.216.34: icmp_seq=1 ttl=56 time=23.4 ms\n\n\
        --- example.com ping statistics ---\n\
        1 packets transmitted, 1 received, 0% packet loss, time 0ms\n\
        rtt min/avg/max/mdev = 23.400/23.400/23.400/0.000 ms\n";

    #[test]
    fn test_args_end_with_host() {
        let args = ping_args("example.com", Duration::from_millis(1500));
        assert_eq!(args, ["-c", "1", "-W", "1.5", "--", "example.com"]);

        // A target that looks like a flag stays an operand
        let args = ping_args("-f", Duration::from_secs(2));
        assert_eq!(&args[args.len() - 2..], ["--", "-f"]);
    }

    #[test]
    fn test_parse_reply() {
        assert_eq!(parse_rtt(REPLY), Some(23.4));
    }

    #[test]
    fn test_parse_integer_time() {
        assert_eq!(parse_rtt("64 bytes from 1.1.1.1: icmp_seq=1 ttl=58 time=7 ms"), Some(7.0));
    }

    #[test]
    fn test_parse_without_reply() {
        let lost = "1 packets transmitted, 0 received, 100% packet loss, time 0ms";
        assert_eq!(parse_rtt(lost), None);
        assert_eq!(parse_rtt("time=ms"), None);
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let pinger = SystemPinger::new("/nonexistent/ping");
        let err = pinger
            .ping("127.0.0.1", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Spawn(_)));
    }

    #[tokio::test]
    async fn test_nonzero_exit() {
        let pinger = SystemPinger::new("false");
        let err = pinger
            .ping("127.0.0.1", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Exit(Some(1))));
    }
}
