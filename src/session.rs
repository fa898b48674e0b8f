//! The authentication framework handle seen by the trigger.

use std::collections::BTreeMap;

use crate::error::{Error, ErrorKind};

/// Operations the trigger needs from the authentication framework.
///
/// One context exists per login; it is never shared across sessions.
pub trait SessionContext {
    /// Returns the authenticated principal.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::SessionUnavailable`] if the framework has no user item.
    fn user(&self) -> Result<String, Error>;

    /// Reads a variable from the session environment.
    fn get_env(&self, name: &str) -> Option<String>;

    /// Sets a variable in the session environment.
    ///
    /// # Errors
    ///
    /// Whatever the framework reports when it refuses the entry.
    fn put_env(&mut self, name: &str, value: &str) -> Result<(), Error>;

    /// Shows an informational message to the user.
    ///
    /// # Errors
    ///
    /// Whatever the framework's conversation reports.
    fn info(&mut self, message: &str) -> Result<(), Error>;
}

/// An in-memory session, recording everything the trigger does to it.
///
/// # Examples
///
/// ```
/// use adsys_session_trigger::{MemorySession, SessionContext};
///
/// let mut session = MemorySession::new("alice").with_env("KRB5CCNAME", "FILE:/tmp/krb5cc_0");
/// session.put_env("DCONF_PROFILE", "alice@example").unwrap();
///
/// assert_eq!(session.get_env("DCONF_PROFILE").as_deref(), Some("alice@example"));
/// assert_eq!(session.user().unwrap(), "alice");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    user: Option<String>,
    env: BTreeMap<String, String>,
    messages: Vec<String>,
    reject_env: bool,
    reject_info: bool,
}

impl MemorySession {
    /// Creates a session for `user` with an empty environment.
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            ..Self::default()
        }
    }

    /// Creates a session whose framework has no user item.
    pub fn without_user() -> Self {
        Self::default()
    }

    /// Adds a variable to the initial environment.
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    /// Makes every later `put_env` fail.
    pub fn rejecting_env(mut self) -> Self {
        self.reject_env = true;
        self
    }

    /// Makes every later `info` fail.
    pub fn rejecting_info(mut self) -> Self {
        self.reject_info = true;
        self
    }

    /// Returns the session environment.
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Returns the informational messages shown so far.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl SessionContext for MemorySession {
    fn user(&self) -> Result<String, Error> {
        self.user
            .clone()
            .ok_or_else(|| Error::new(ErrorKind::SessionUnavailable, "no user item in session"))
    }

    fn get_env(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned()
    }

    fn put_env(&mut self, name: &str, value: &str) -> Result<(), Error> {
        if self.reject_env {
            return Err(Error::new(
                ErrorKind::SessionUnavailable,
                format!("environment rejected {name}"),
            ));
        }
        self.env.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn info(&mut self, message: &str) -> Result<(), Error> {
        if self.reject_info {
            return Err(Error::new(ErrorKind::SessionUnavailable, "conversation failed"));
        }
        self.messages.push(message.to_string());
        Ok(())
    }
}
