//! Policy agent invocation.
//!
//! A [`CommandInvocation`] is built fresh for every call and handed to an
//! [`Invoker`], which runs it to completion and reports an [`Outcome`].

use std::fmt;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{Command, ExitStatus};

use crate::error::{Error, ErrorKind};
use crate::ResultCode;

/// Verbosity flag appended to the agent command line in debug mode.
pub const VERBOSE_FLAG: &str = "-vv";

/// The argument vector for one agent run.
///
/// # Examples
///
/// ```
/// use adsys_session_trigger::CommandInvocation;
///
/// let inv =
///     CommandInvocation::user_update("/sbin/adsysctl", "alice@example", "/tmp/krb5cc_0", true)
///         .unwrap();
/// assert_eq!(
///     inv.argv(),
///     ["/sbin/adsysctl", "update", "alice@example", "/tmp/krb5cc_0", "-vv"]
/// );
/// assert_eq!(inv.to_string(), "adsysctl update alice@example /tmp/krb5cc_0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    program: String,
    args: Vec<String>,
    debug: bool,
}

impl CommandInvocation {
    /// Creates an invocation of `program` with `args`, adding [`VERBOSE_FLAG`]
    /// last when `debug` is set.
    pub fn new<I, S>(program: impl Into<String>, args: I, debug: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            debug,
        }
    }

    /// `<agent> update -m [-vv]`
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ResourceExhausted`] if the agent path cannot be
    /// passed to the operating system.
    pub fn machine_update(agent: &str, debug: bool) -> Result<Self, Error> {
        Self::new(agent, ["update", "-m"], debug).checked()
    }

    /// `<agent> update <user> <ccache> [-vv]`
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ResourceExhausted`] if an argument cannot be
    /// passed to the operating system.
    pub fn user_update(agent: &str, user: &str, ccache: &str, debug: bool) -> Result<Self, Error> {
        Self::new(agent, ["update", user, ccache], debug).checked()
    }

    fn checked(self) -> Result<Self, Error> {
        let offending = self
            .argv()
            .into_iter()
            .find(|arg| arg.contains('\0'))
            .map(str::to_string);
        match offending {
            Some(arg) => Err(Error::new(
                ErrorKind::ResourceExhausted,
                format!("cannot build argument vector: {arg:?} contains a NUL byte"),
            )),
            None => Ok(self),
        }
    }

    /// Returns the program path.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the arguments following the program, verbosity flag included.
    pub fn args(&self) -> Vec<&str> {
        let mut args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        if self.debug {
            args.push(VERBOSE_FLAG);
        }
        args
    }

    /// Returns the full argument vector, program first.
    pub fn argv(&self) -> Vec<&str> {
        let mut argv = vec![self.program.as_str()];
        argv.extend(self.args());
        argv
    }

    /// Returns true if the verbosity flag is appended.
    pub fn is_debug(&self) -> bool {
        self.debug
    }
}

/// Short command line used in diagnostics: program file name and arguments,
/// without the verbosity flag.
impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = Path::new(&self.program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.program);
        write!(f, "{name}")?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How a child that ran reported failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildFailure {
    /// Exited with a non-zero code.
    Exited(i32),
    /// Terminated by a signal.
    Signaled {
        /// Signal number.
        signal: i32,
        /// Whether a core dump was produced.
        core_dumped: bool,
    },
    /// Any other wait status, kept raw.
    Unknown(i32),
}

impl fmt::Display for ChildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exit code {code}"),
            Self::Signaled {
                signal,
                core_dumped,
            } => {
                write!(f, "caught signal {signal}")?;
                if *core_dumped {
                    write!(f, " (core dumped)")?;
                }
                Ok(())
            }
            Self::Unknown(status) => write!(f, "unknown status {status:#x}"),
        }
    }
}

/// Result of running the policy agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The agent exited with code 0.
    Success,
    /// The agent ran and reported a problem.
    PolicyFailure(ChildFailure),
    /// The agent could not be launched or waited for.
    SystemFailure(String),
}

impl Outcome {
    /// Maps the outcome from a terminated child's wait status.
    pub fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            return Self::Success;
        }
        let failure = if let Some(code) = status.code() {
            ChildFailure::Exited(code)
        } else if let Some(signal) = status.signal() {
            ChildFailure::Signaled {
                signal,
                core_dumped: status.core_dumped(),
            }
        } else {
            ChildFailure::Unknown(status.into_raw())
        };
        Self::PolicyFailure(failure)
    }

    /// Returns true for [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Maps the outcome onto the authentication stack's result codes.
    pub fn result_code(&self) -> ResultCode {
        match self {
            Self::Success => ResultCode::Success,
            Self::PolicyFailure(_) => ResultCode::CredentialError,
            Self::SystemFailure(_) => ResultCode::SystemError,
        }
    }

    /// Converts a failed outcome into the matching [`Error`].
    ///
    /// # Errors
    ///
    /// [`ErrorKind::ChildPolicyFailure`] or [`ErrorKind::SpawnFailure`],
    /// with `invocation` named in the message.
    pub fn into_result(self, invocation: &CommandInvocation) -> Result<(), Error> {
        match self {
            Self::Success => Ok(()),
            Self::PolicyFailure(failure) => Err(Error::new(
                ErrorKind::ChildPolicyFailure,
                format!("{invocation} failed: {failure}"),
            )),
            Self::SystemFailure(reason) => Err(Error::new(
                ErrorKind::SpawnFailure,
                format!("{invocation} failed: {reason}"),
            )),
        }
    }
}

/// Runs policy agent invocations.
pub trait Invoker {
    /// Runs `invocation` to completion.
    fn run(&self, invocation: &CommandInvocation) -> Outcome;
}

/// Spawns the agent as a child process and blocks until it terminates.
///
/// The child inherits standard output and error. There is no timeout: the
/// login waits until the agent is done.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessInvoker;

impl Invoker for ProcessInvoker {
    fn run(&self, invocation: &CommandInvocation) -> Outcome {
        if invocation.is_debug() {
            tracing::debug!(
                program = %invocation.program(),
                "Calling {} ...",
                invocation.program()
            );
        }

        let mut child = match Command::new(invocation.program())
            .args(invocation.args())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                return Outcome::SystemFailure(format!(
                    "failed to execute {}: {e}",
                    invocation.program()
                ))
            }
        };

        loop {
            match child.wait() {
                Ok(status) => return Outcome::from_status(status),
                // std already retries EINTR inside wait; kept so the retry is explicit here.
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Outcome::SystemFailure(format!("waiting for child failed: {e}")),
            }
        }
    }
}

/// Runs `program` with `args` as a child process.
///
/// # Examples
///
/// ```no_run
/// use adsys_session_trigger::{invocation, Outcome};
///
/// assert_eq!(invocation::run("/bin/true", &[], false), Outcome::Success);
/// ```
pub fn run(program: &str, args: &[&str], debug: bool) -> Outcome {
    ProcessInvoker.run(&CommandInvocation::new(program, args.iter().copied(), debug))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Outcome {
        run("/bin/sh", &["-c", script], false)
    }

    #[test]
    fn machine_update_shape() {
        let inv = CommandInvocation::machine_update("/sbin/adsysctl", false).unwrap();
        assert_eq!(inv.argv(), ["/sbin/adsysctl", "update", "-m"]);

        let inv = CommandInvocation::machine_update("/sbin/adsysctl", true).unwrap();
        assert_eq!(inv.argv(), ["/sbin/adsysctl", "update", "-m", "-vv"]);
    }

    #[test]
    fn user_update_shape() {
        let inv =
            CommandInvocation::user_update("/sbin/adsysctl", "bob@example.com", "/tmp/cc", false)
                .unwrap();
        assert_eq!(
            inv.argv(),
            ["/sbin/adsysctl", "update", "bob@example.com", "/tmp/cc"]
        );
    }

    #[test]
    fn nul_byte_is_rejected_as_resource_exhaustion() {
        let err = CommandInvocation::user_update("/sbin/adsysctl", "bob\0", "/tmp/cc", false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceExhausted);
    }

    #[test]
    fn display_omits_directory_and_verbosity() {
        let inv = CommandInvocation::machine_update("/sbin/adsysctl", true).unwrap();
        assert_eq!(inv.to_string(), "adsysctl update -m");
    }

    #[test]
    fn exit_zero_is_success() {
        let outcome = sh("exit 0");
        assert_eq!(outcome, Outcome::Success);
        assert!(outcome.is_success());
        assert!(!sh("exit 1").is_success());
    }

    #[test]
    fn non_zero_exit_is_policy_failure() {
        assert_eq!(sh("exit 7"), Outcome::PolicyFailure(ChildFailure::Exited(7)));
    }

    #[test]
    fn signal_is_policy_failure() {
        match sh("kill -9 $$") {
            Outcome::PolicyFailure(ChildFailure::Signaled { signal, core_dumped }) => {
                assert_eq!(signal, 9);
                assert!(!core_dumped);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn missing_program_is_system_failure() {
        let outcome = run("/nonexistent/adsysctl", &["update", "-m"], false);
        assert!(matches!(outcome, Outcome::SystemFailure(_)));
        assert_eq!(outcome.result_code(), ResultCode::SystemError);
    }

    #[test]
    fn verbosity_flag_reaches_the_child() {
        // "$0" is the first argument after the script for sh -c.
        let outcome = run("/bin/sh", &["-c", r#"[ "$0" = "-vv" ]"#], true);
        assert_eq!(outcome, Outcome::Success);
    }

    #[test]
    fn failure_messages() {
        assert_eq!(ChildFailure::Exited(3).to_string(), "exit code 3");
        assert_eq!(
            ChildFailure::Signaled {
                signal: 11,
                core_dumped: true
            }
            .to_string(),
            "caught signal 11 (core dumped)"
        );
        assert_eq!(ChildFailure::Unknown(0x137f).to_string(), "unknown status 0x137f");
    }

    #[test]
    fn into_result_names_the_command() {
        let inv = CommandInvocation::machine_update("/sbin/adsysctl", false).unwrap();
        let err = Outcome::PolicyFailure(ChildFailure::Exited(2))
            .into_result(&inv)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ChildPolicyFailure);
        assert_eq!(err.message(), "adsysctl update -m failed: exit code 2");
    }
}
