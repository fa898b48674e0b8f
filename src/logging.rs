use std::fmt;

/// Session-scoped logging.
///
/// All messages carry the principal being processed so the diagnostic lines of
/// one login can be told apart from another's.
#[derive(Debug, Clone, Copy)]
pub struct SessionLog<'a> {
    user: &'a str,
}

impl<'a> SessionLog<'a> {
    /// Creates a logger for `user`.
    pub fn new(user: &'a str) -> Self {
        Self { user }
    }

    /// Returns the principal attached to every message.
    pub fn user(&self) -> &str {
        self.user
    }

    /// Logs an info-level message.
    ///
    /// ```no_run
    /// # use adsys_session_trigger::SessionLog;
    /// let log = SessionLog::new("alice@example");
    /// log.info(format_args!("Applying {} settings", "user"));
    /// ```
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(user = %self.user, "{}", args);
    }

    /// Logs a warning-level message.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(user = %self.user, "{}", args);
    }

    /// Logs an error-level message.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(user = %self.user, "{}", args);
    }

    /// Logs a debug-level message.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(user = %self.user, "{}", args);
    }
}
