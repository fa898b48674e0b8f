//! Trigger configuration and hook option parsing.

use std::path::PathBuf;

/// Where the policy agent is installed.
pub const DEFAULT_AGENT_PATH: &str = "/sbin/adsysctl";
/// Machine policy cache; the bootstrap marker is `<dir>/<hostname>`.
pub const DEFAULT_POLICIES_DIR: &str = "/var/cache/adsys/policies";
/// SSSD configuration holding the default domain suffix.
pub const DEFAULT_SSSD_CONF_PATH: &str = "/etc/sssd/sssd.conf";
/// Local display-manager account.
pub const DEFAULT_DISPLAY_MANAGER_USER: &str = "gdm";
/// Credential cache hint set by SSSD for remote users.
pub const CCACHE_ENV: &str = "KRB5CCNAME";
/// Variable selecting the dconf profile.
pub const PROFILE_ENV: &str = "DCONF_PROFILE";

/// Whether the display-manager account gets a dconf profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfilePublication {
    /// Publish the profile for every handled principal, display manager included.
    #[default]
    BeforeDisplayManagerCheck,
    /// Short-circuit the display manager before any profile is published.
    SkipForDisplayManager,
}

/// Settings for one trigger run.
///
/// # Examples
///
/// ```
/// use adsys_session_trigger::TriggerConfig;
///
/// let config = TriggerConfig::from_args(&["DEBUG", "agent=/usr/sbin/adsysctl"]);
/// assert!(config.debug);
/// assert_eq!(config.agent_path, "/usr/sbin/adsysctl");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerConfig {
    /// Policy agent binary.
    pub agent_path: String,
    /// Machine policy cache directory.
    pub policies_dir: PathBuf,
    /// SSSD configuration file.
    pub sssd_conf_path: PathBuf,
    /// Local display-manager account.
    pub display_manager_user: String,
    /// Environment variable carrying the credential cache hint.
    pub ccache_env: String,
    /// Environment variable receiving the profile name.
    pub profile_env: String,
    /// Append the verbosity flag to agent invocations.
    pub debug: bool,
    /// Profile publication for the display-manager account.
    pub profile_publication: ProfilePublication,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            agent_path: DEFAULT_AGENT_PATH.to_string(),
            policies_dir: PathBuf::from(DEFAULT_POLICIES_DIR),
            sssd_conf_path: PathBuf::from(DEFAULT_SSSD_CONF_PATH),
            display_manager_user: DEFAULT_DISPLAY_MANAGER_USER.to_string(),
            ccache_env: CCACHE_ENV.to_string(),
            profile_env: PROFILE_ENV.to_string(),
            debug: false,
            profile_publication: ProfilePublication::default(),
        }
    }
}

impl TriggerConfig {
    /// Parses hook module arguments.
    ///
    /// Options are read left to right and the first unknown one stops
    /// parsing; it and everything after it are ignored. Recognized options:
    ///
    /// - `debug` (any case)
    /// - `agent=<path>`
    /// - `policies_dir=<path>`
    /// - `sssd_conf=<path>`
    /// - `skip_gdm_profile`
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        let mut config = Self::default();

        for arg in args {
            let arg = arg.as_ref();
            if arg.eq_ignore_ascii_case("debug") {
                config.debug = true;
                continue;
            }
            if arg == "skip_gdm_profile" {
                config.profile_publication = ProfilePublication::SkipForDisplayManager;
                continue;
            }
            match arg.split_once('=') {
                Some(("agent", path)) if !path.is_empty() => config.agent_path = path.to_string(),
                Some(("policies_dir", path)) if !path.is_empty() => {
                    config.policies_dir = PathBuf::from(path)
                }
                Some(("sssd_conf", path)) if !path.is_empty() => {
                    config.sssd_conf_path = PathBuf::from(path)
                }
                _ => {
                    tracing::debug!(option = arg, "unknown option, ignoring remaining arguments");
                    break;
                }
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_installed_layout() {
        let config = TriggerConfig::from_args::<&str>(&[]);

        assert_eq!(config, TriggerConfig::default());
        assert_eq!(config.agent_path, "/sbin/adsysctl");
        assert_eq!(config.policies_dir, PathBuf::from("/var/cache/adsys/policies"));
        assert_eq!(config.sssd_conf_path, PathBuf::from("/etc/sssd/sssd.conf"));
        assert!(!config.debug);
        assert_eq!(
            config.profile_publication,
            ProfilePublication::BeforeDisplayManagerCheck
        );
    }

    #[test]
    fn debug_is_case_insensitive() {
        assert!(TriggerConfig::from_args(&["Debug"]).debug);
    }

    #[test]
    fn unknown_option_stops_parsing() {
        let config = TriggerConfig::from_args(&["verbose", "debug"]);
        assert!(!config.debug);
    }

    #[test]
    fn paths_are_overridable() {
        let config = TriggerConfig::from_args(&[
            "policies_dir=/tmp/policies",
            "sssd_conf=/tmp/sssd.conf",
            "skip_gdm_profile",
            "debug",
        ]);

        assert_eq!(config.policies_dir, PathBuf::from("/tmp/policies"));
        assert_eq!(config.sssd_conf_path, PathBuf::from("/tmp/sssd.conf"));
        assert_eq!(
            config.profile_publication,
            ProfilePublication::SkipForDisplayManager
        );
        assert!(config.debug);
    }

    #[test]
    fn empty_path_is_unknown() {
        let config = TriggerConfig::from_args(&["agent=", "debug"]);
        assert_eq!(config.agent_path, DEFAULT_AGENT_PATH);
        assert!(!config.debug);
    }
}
