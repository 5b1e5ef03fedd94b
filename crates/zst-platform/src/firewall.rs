//! Firewall backend detection

use crate::process::output;
use tracing::{debug, info};
use zst_core::config::FirewallSetting;
use zst_core::FirewallBackend;

/// Detect the backend from `iptables --version`
///
/// Any failure to run iptables falls back to nftables.
pub async fn detect_firewall() -> FirewallBackend {
    detect_with("iptables").await
}

/// Use the forced backend, or detect one
pub async fn resolve_firewall(setting: FirewallSetting) -> FirewallBackend {
    match setting.forced() {
        Some(backend) => backend,
        None => detect_firewall().await,
    }
}

async fn detect_with(program: &str) -> FirewallBackend {
    let version = match output(program, &["--version"]).await {
        Ok(out) => String::from_utf8_lossy(&out.stdout).into_owned(),
        Err(e) => {
            debug!(error = %e, "iptables not usable");
            String::new()
        }
    };
    let backend = FirewallBackend::from_version_output(&version);
    info!(%backend, "Detected firewall backend");
    backend
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_iptables_means_nftables() {
        assert_eq!(detect_with("/nonexistent/iptables").await, FirewallBackend::Nftables);
    }

    #[tokio::test]
    async fn test_forced_backend_skips_detection() {
        assert_eq!(
            resolve_firewall(FirewallSetting::Iptables).await,
            FirewallBackend::Iptables
        );
        assert_eq!(
            resolve_firewall(FirewallSetting::Nftables).await,
            FirewallBackend::Nftables
        );
    }
}
