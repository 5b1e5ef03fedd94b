//! zapret strategy tester platform layer
//!
//! Process-backed implementations of the `zst-core` collaborator traits for
//! Linux hosts running zapret under systemd.
//!
//! ## Components
//!
//! - [`SystemPinger`] - `ping -c 1`
//! - [`CurlProber`] - `curl -I` pinned to HTTP, TLS 1.2 or TLS 1.3
//! - [`SystemdService`] - `systemctl is-active|restart|stop`
//! - [`detect_firewall`] - `iptables --version`
//!
//! Every child process is spawned with `kill_on_drop`, so dropping a probe
//! future (timeout, early abort, interrupt) also kills the process.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
pub use error::{PlatformError, Result};

mod process;

pub mod curl;
pub mod firewall;
pub mod ping;
pub mod privileges;
pub mod systemd;

pub use curl::CurlProber;
pub use firewall::{detect_firewall, resolve_firewall};
pub use ping::SystemPinger;
pub use privileges::{ensure_root, is_root};
pub use systemd::SystemdService;
