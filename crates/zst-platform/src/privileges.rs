//! Privilege checks

use crate::error::{PlatformError, Result};

/// Whether the process runs as root
pub fn is_root() -> bool {
    is_root::is_root()
}

/// Fail unless running as root
pub fn ensure_root() -> Result<()> {
    if is_root() {
        Ok(())
    } else {
        Err(PlatformError::PermissionDenied(
            "root privileges are required to modify zapret".to_string(),
        ))
    }
}
