//! Login session hook linking the authentication stack to the adsys group policy agent.
//!
//! On every session opened for a remote (SSSD-managed) user, the hook:
//! - resolves a normalized `user@domain` profile name and publishes it as
//!   `DCONF_PROFILE` in the session environment
//! - applies machine policy first if the host has never cached any
//! - applies the user's policy, turning the agent's exit status into a
//!   result code for the authentication stack
//!
//! # Core Types
//!
//! - [`SessionTrigger`]: The session open flow
//! - [`SessionContext`]: What the trigger needs from the authentication framework
//! - [`BootstrapGate`]: Machine policy cache check
//! - [`CommandInvocation`] / [`Invoker`] / [`Outcome`]: Running the policy agent
//! - [`ResultCode`]: Codes handed back to the authentication stack
//!
//! # Examples
//!
//! ```
//! use adsys_session_trigger::{MemorySession, ResultCode, SessionTrigger, TriggerConfig};
//!
//! // Local users without a credential cache hint are left alone.
//! let trigger = SessionTrigger::new(TriggerConfig::default());
//! let mut session = MemorySession::new("localadmin");
//!
//! assert_eq!(trigger.open_session(&mut session), ResultCode::Ignore);
//! assert!(session.env().is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bootstrap;
pub mod config;
mod error;
pub mod invocation;
mod logging;
pub mod profile;
mod result_code;
mod session;
pub mod sssd;
pub mod trigger;

pub use bootstrap::{BootstrapGate, HostIdentity, StaticHostname, SystemHostname};
pub use config::{ProfilePublication, TriggerConfig};
pub use error::{Error, ErrorKind};
pub use invocation::{ChildFailure, CommandInvocation, Invoker, Outcome, ProcessInvoker};
pub use logging::SessionLog;
pub use profile::resolve_profile;
pub use result_code::ResultCode;
pub use session::{MemorySession, SessionContext};
pub use trigger::SessionTrigger;
