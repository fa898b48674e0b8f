//! Machine policy bootstrap detection.
//!
//! The policy agent caches machine policy under `<policies_dir>/<hostname>`
//! once it has applied it. When that marker is missing (e.g. the boot-time
//! update ran while offline), machine policy must be applied before the
//! user's.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, ErrorKind};

/// Source of the local host name.
pub trait HostIdentity {
    /// Returns the local host name.
    ///
    /// # Errors
    ///
    /// Returns a [`ErrorKind::HostIdentityUnavailable`] error when the name
    /// cannot be determined.
    fn hostname(&self) -> Result<String, Error>;
}

/// Host name as reported by the running kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHostname;

impl SystemHostname {
    const SOURCES: [&'static str; 2] = ["/proc/sys/kernel/hostname", "/etc/hostname"];
}

impl HostIdentity for SystemHostname {
    fn hostname(&self) -> Result<String, Error> {
        Self::SOURCES
            .iter()
            .filter_map(|source| fs::read_to_string(source).ok())
            .map(|name| name.trim().to_string())
            .find(|name| !name.is_empty())
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::HostIdentityUnavailable,
                    "failed to get hostname",
                )
            })
    }
}

/// A fixed host name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticHostname(pub String);

impl HostIdentity for StaticHostname {
    fn hostname(&self) -> Result<String, Error> {
        if self.0.is_empty() {
            return Err(Error::new(
                ErrorKind::HostIdentityUnavailable,
                "empty hostname",
            ));
        }
        Ok(self.0.clone())
    }
}

/// Decides whether machine policy must be applied before user policy.
///
/// # Examples
///
/// ```
/// use adsys_session_trigger::BootstrapGate;
///
/// let dir = std::env::temp_dir().join("adsys-doc-bootstrap-gate");
/// let gate = BootstrapGate::new(&dir);
///
/// assert_eq!(gate.marker_path("host1"), dir.join("host1"));
/// ```
#[derive(Debug, Clone)]
pub struct BootstrapGate {
    policies_dir: PathBuf,
}

impl BootstrapGate {
    /// Creates a gate rooted at the policy cache directory.
    pub fn new(policies_dir: impl Into<PathBuf>) -> Self {
        Self {
            policies_dir: policies_dir.into(),
        }
    }

    /// Returns the policy cache directory.
    pub fn policies_dir(&self) -> &Path {
        &self.policies_dir
    }

    /// Returns the marker path for `host`.
    pub fn marker_path(&self, host: &str) -> PathBuf {
        self.policies_dir.join(host)
    }

    /// Returns true iff the machine policy marker for `host` does not exist.
    pub fn needs_machine_bootstrap(&self, host: &str) -> bool {
        !self.marker_path(host).exists()
    }

    /// Resolves the host name and checks its marker.
    ///
    /// # Errors
    ///
    /// Propagates the host identity failure; a missing host name is never
    /// treated as "no bootstrap needed".
    pub fn check(&self, identity: &dyn HostIdentity) -> Result<bool, Error> {
        let host = identity.hostname()?;
        Ok(self.needs_machine_bootstrap(&host))
    }
}
