use std::fmt;

/// Result codes returned to the authentication stack.
///
/// Raw values follow Linux-PAM's `_pam_types.h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// The session proceeds; policy was applied.
    Success,
    /// The hook does not apply to this session.
    Ignore,
    /// The policy agent ran and failed; the credential is flagged as failed.
    CredentialError,
    /// The hook itself is broken (agent not launchable, no host name, ...).
    SystemError,
    /// A value could not be built for the session environment or agent.
    OutOfResources,
}

impl ResultCode {
    /// Returns the numeric code understood by the authentication framework.
    pub fn as_raw(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::SystemError => 4,
            Self::OutOfResources => 5,
            Self::CredentialError => 17,
            Self::Ignore => 25,
        }
    }

    /// Returns true if the session is allowed to continue.
    pub fn allows_session(self) -> bool {
        matches!(self, Self::Success | Self::Ignore)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Ignore => write!(f, "ignore"),
            Self::CredentialError => write!(f, "credential-error"),
            Self::SystemError => write!(f, "system-error"),
            Self::OutOfResources => write!(f, "out-of-resources"),
        }
    }
}
