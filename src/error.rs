use std::fmt;

use crate::ResultCode;

/// Errors raised while processing a login session.
///
/// Every error carries a [`ErrorKind`] that decides how it is surfaced to the
/// authentication stack (see [`Error::result_code`]) and a human-readable
/// message used for the diagnostic log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

impl Error {
    /// Creates a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Maps the error onto the result code handed back to the authentication stack.
    ///
    /// # Examples
    ///
    /// ```
    /// use adsys_session_trigger::{Error, ErrorKind, ResultCode};
    ///
    /// let err = Error::new(ErrorKind::HostIdentityUnavailable, "no hostname");
    /// assert_eq!(err.result_code(), ResultCode::SystemError);
    /// ```
    pub fn result_code(&self) -> ResultCode {
        match self.kind {
            ErrorKind::ConfigUnavailable => ResultCode::Ignore,
            ErrorKind::ResourceExhausted => ResultCode::OutOfResources,
            ErrorKind::SpawnFailure => ResultCode::SystemError,
            ErrorKind::ChildPolicyFailure => ResultCode::CredentialError,
            ErrorKind::HostIdentityUnavailable => ResultCode::SystemError,
            ErrorKind::SessionUnavailable => ResultCode::SystemError,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Error {}

/// The kind of failure that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The domain-suffix configuration could not be read or had no usable value.
    ///
    /// Never fatal: callers degrade to "no suffix".
    ConfigUnavailable,
    /// A session environment entry or argument vector could not be built.
    ResourceExhausted,
    /// The policy agent could not be launched or waited for.
    SpawnFailure,
    /// The policy agent ran and reported a failure.
    ChildPolicyFailure,
    /// The local host name could not be determined.
    HostIdentityUnavailable,
    /// The authentication framework handle refused an operation.
    SessionUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigUnavailable => write!(f, "configuration unavailable"),
            Self::ResourceExhausted => write!(f, "resource exhausted"),
            Self::SpawnFailure => write!(f, "spawn failure"),
            Self::ChildPolicyFailure => write!(f, "policy agent failure"),
            Self::HostIdentityUnavailable => write!(f, "host identity unavailable"),
            Self::SessionUnavailable => write!(f, "session unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = Error::new(ErrorKind::SpawnFailure, "/sbin/adsysctl: not found");
        assert_eq!(
            err.to_string(),
            "spawn failure: /sbin/adsysctl: not found"
        );
    }

    #[test]
    fn fatal_kinds_never_map_to_success_or_ignore() {
        for kind in [
            ErrorKind::ResourceExhausted,
            ErrorKind::SpawnFailure,
            ErrorKind::ChildPolicyFailure,
            ErrorKind::HostIdentityUnavailable,
            ErrorKind::SessionUnavailable,
        ] {
            let code = Error::new(kind, "x").result_code();
            assert_ne!(code, ResultCode::Success);
            assert_ne!(code, ResultCode::Ignore);
        }
    }

    #[test]
    fn child_failure_is_a_credential_error() {
        let err = Error::new(ErrorKind::ChildPolicyFailure, "exit code 1");
        assert_eq!(err.result_code(), ResultCode::CredentialError);
    }
}
