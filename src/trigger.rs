//! Session open orchestration.
//!
//! ```text
//! start -> resolve profile -> publish profile -> display manager? -> bootstrap?
//!       -> [machine update] -> user update -> result code
//! ```
//!
//! Any failure aborts the remaining steps. A published profile stays set.

use crate::bootstrap::{BootstrapGate, HostIdentity, SystemHostname};
use crate::config::{ProfilePublication, TriggerConfig};
use crate::error::{Error, ErrorKind};
use crate::invocation::{CommandInvocation, Invoker, ProcessInvoker};
use crate::logging::SessionLog;
use crate::profile::resolve_profile;
use crate::session::SessionContext;
use crate::sssd;
use crate::ResultCode;

/// Prefix of file-based credential cache names.
pub const FILE_CCACHE_PREFIX: &str = "FILE:";

/// Strips a leading `FILE:` from a credential cache name.
///
/// # Examples
///
/// ```
/// use adsys_session_trigger::trigger::strip_file_prefix;
///
/// assert_eq!(strip_file_prefix("FILE:/tmp/krb5cc_0"), "/tmp/krb5cc_0");
/// assert_eq!(strip_file_prefix("/tmp/krb5cc_0"), "/tmp/krb5cc_0");
/// ```
pub fn strip_file_prefix(ccache: &str) -> &str {
    ccache.strip_prefix(FILE_CCACHE_PREFIX).unwrap_or(ccache)
}

/// Links a login session to the group policy agent.
///
/// Generic over how the agent is run and how the host name is found, so the
/// whole flow can be driven without spawning anything.
///
/// # Examples
///
/// ```no_run
/// use adsys_session_trigger::{MemorySession, ResultCode, SessionTrigger, TriggerConfig};
///
/// let trigger = SessionTrigger::new(TriggerConfig::from_args(&["debug"]));
/// let mut session = MemorySession::new(r"EXAMPLE\alice")
///     .with_env("KRB5CCNAME", "FILE:/tmp/krb5cc_1000");
///
/// let code = trigger.open_session(&mut session);
/// assert!(code == ResultCode::Success || !code.allows_session());
/// ```
#[derive(Debug, Clone)]
pub struct SessionTrigger<I = ProcessInvoker, H = SystemHostname> {
    config: TriggerConfig,
    gate: BootstrapGate,
    invoker: I,
    host: H,
}

impl SessionTrigger {
    /// Creates a trigger spawning the real agent for the running host.
    pub fn new(config: TriggerConfig) -> Self {
        let gate = BootstrapGate::new(config.policies_dir.clone());
        Self {
            config,
            gate,
            invoker: ProcessInvoker,
            host: SystemHostname,
        }
    }
}

impl<I: Invoker, H: HostIdentity> SessionTrigger<I, H> {
    /// Replaces the agent runner.
    pub fn with_invoker<J: Invoker>(self, invoker: J) -> SessionTrigger<J, H> {
        SessionTrigger {
            config: self.config,
            gate: self.gate,
            invoker,
            host: self.host,
        }
    }

    /// Replaces the host name source.
    pub fn with_host_identity<K: HostIdentity>(self, host: K) -> SessionTrigger<I, K> {
        SessionTrigger {
            config: self.config,
            gate: self.gate,
            invoker: self.invoker,
            host,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Returns the agent runner.
    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    /// Authentication is left to other modules.
    pub fn authenticate(&self) -> ResultCode {
        ResultCode::Ignore
    }

    /// Credentials are left to other modules.
    pub fn set_credentials(&self) -> ResultCode {
        ResultCode::Ignore
    }

    /// Nothing to undo when the session closes.
    pub fn close_session(&self) -> ResultCode {
        ResultCode::Success
    }

    /// Publishes the dconf profile and applies group policy for the session.
    ///
    /// Blocks until every agent run has finished.
    pub fn open_session(&self, session: &mut dyn SessionContext) -> ResultCode {
        let user = match session.user() {
            Ok(user) => user,
            Err(err) => {
                tracing::error!(error = %err, "failed to get session user");
                return err.result_code();
            }
        };
        let log = SessionLog::new(&user);

        match self.apply(session, &user, &log) {
            Ok(code) => code,
            Err(err) => {
                log.error(format_args!("{err}"));
                err.result_code()
            }
        }
    }

    fn apply(
        &self,
        session: &mut dyn SessionContext,
        user: &str,
        log: &SessionLog<'_>,
    ) -> Result<ResultCode, Error> {
        let ccache = session.get_env(&self.config.ccache_env);
        let is_display_manager = user == self.config.display_manager_user;

        // Remote users always get a credential cache hint from SSSD.
        if ccache.is_none() && !is_display_manager {
            log.debug(format_args!(
                "{} not set, not a remote session",
                self.config.ccache_env
            ));
            return Ok(ResultCode::Ignore);
        }
        if is_display_manager
            && self.config.profile_publication == ProfilePublication::SkipForDisplayManager
        {
            return Ok(ResultCode::Ignore);
        }

        let profile = self.resolve(user, log);
        self.publish_profile(session, &profile, log)?;

        // Machine policy for the display manager is applied at boot.
        if is_display_manager {
            return Ok(ResultCode::Ignore);
        }
        let Some(ccache) = ccache else {
            return Ok(ResultCode::Ignore);
        };

        if self.gate.check(&self.host)? {
            log.info(format_args!("no machine policy cache, updating machine policy first"));
            session.info("Applying machine settings")?;
            let invocation =
                CommandInvocation::machine_update(&self.config.agent_path, self.config.debug)?;
            self.invoker.run(&invocation).into_result(&invocation)?;
        }

        session.info("Applying user settings")?;
        let invocation = CommandInvocation::user_update(
            &self.config.agent_path,
            &profile,
            strip_file_prefix(&ccache),
            self.config.debug,
        )?;
        self.invoker.run(&invocation).into_result(&invocation)?;

        Ok(ResultCode::Success)
    }

    fn resolve(&self, user: &str, log: &SessionLog<'_>) -> String {
        let profile = resolve_profile(user, || {
            match sssd::default_domain_suffix(&self.config.sssd_conf_path) {
                Ok(suffix) => Some(suffix),
                Err(err) => {
                    log.warn(format_args!("no default domain suffix: {err}"));
                    None
                }
            }
        });
        log.debug(format_args!("resolved profile {profile}"));
        profile
    }

    fn publish_profile(
        &self,
        session: &mut dyn SessionContext,
        profile: &str,
        log: &SessionLog<'_>,
    ) -> Result<(), Error> {
        if profile.contains('\0') {
            return Err(Error::new(
                ErrorKind::ResourceExhausted,
                format!(
                    "cannot build {} entry: profile contains a NUL byte",
                    self.config.profile_env
                ),
            ));
        }
        session.put_env(&self.config.profile_env, profile)?;
        log.debug(format_args!("{}={profile}", self.config.profile_env));
        Ok(())
    }
}
