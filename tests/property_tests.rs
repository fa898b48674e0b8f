//! Integration property tests for the session trigger.
//!
//! These tests drive the full open-session flow with generated principals and
//! configuration files, checking the invariants that hold across modules.

use std::cell::Cell;
use std::fs;

use adsys_session_trigger::sssd::parse_default_domain_suffix;
use adsys_session_trigger::{
    CommandInvocation, Invoker, MemorySession, Outcome, ResultCode, SessionTrigger,
    StaticHostname, TriggerConfig,
};
use proptest::prelude::*;

#[derive(Default)]
struct CountingInvoker {
    runs: Cell<usize>,
}

impl Invoker for CountingInvoker {
    fn run(&self, _invocation: &CommandInvocation) -> Outcome {
        self.runs.set(self.runs.get() + 1);
        Outcome::Success
    }
}

// Strategy: login names without any domain separator
fn arb_user() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z][A-Za-z0-9._-]{0,12}").unwrap()
}

// Strategy: domain names in any case
fn arb_domain() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9]{1,8}(\\.[A-Za-z]{2,5}){0,2}").unwrap()
}

// Strategy: principal in one of the three accepted shapes
fn arb_principal() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_user(),
        (arb_user(), arb_domain()).prop_map(|(u, d)| format!("{u}@{d}")),
        (arb_user(), arb_domain()).prop_map(|(u, d)| format!("{d}\\{u}")),
    ]
}

fn trigger_in(dir: &tempfile::TempDir) -> SessionTrigger<CountingInvoker, StaticHostname> {
    let config = TriggerConfig {
        policies_dir: dir.path().join("policies"),
        sssd_conf_path: dir.path().join("sssd.conf"),
        ..TriggerConfig::default()
    };
    SessionTrigger::new(config)
        .with_invoker(CountingInvoker::default())
        .with_host_identity(StaticHostname("host".to_string()))
}

proptest! {
    /// Property: every published profile is lower-case and carries a domain
    /// whenever one was available.
    #[test]
    fn proptest_published_profile_is_normalized(
        principal in arb_principal(),
        suffix in prop::option::of(arb_domain()),
    ) {
        prop_assume!(principal != "gdm");
        let dir = tempfile::tempdir().unwrap();
        if let Some(suffix) = &suffix {
            fs::write(
                dir.path().join("sssd.conf"),
                format!("[sssd]\ndefault_domain_suffix = {suffix}\n"),
            )
            .unwrap();
        }
        let trigger = trigger_in(&dir);
        let mut session = MemorySession::new(principal.clone()).with_env("KRB5CCNAME", "/tmp/cc");

        prop_assert_eq!(trigger.open_session(&mut session), ResultCode::Success);

        let profile = session.env().get("DCONF_PROFILE").cloned().unwrap_or_default();
        prop_assert_eq!(&profile, &profile.to_ascii_lowercase());
        if principal.contains('@') || principal.contains('\\') || suffix.is_some() {
            prop_assert!(profile.contains('@'), "profile {} should carry a domain", profile);
        } else {
            prop_assert_eq!(profile, principal.to_ascii_lowercase());
        }
        prop_assert_eq!(trigger.invoker().runs.get(), 2);
    }

    /// Property: sessions without a credential cache hint are never touched
    /// unless they belong to the display manager.
    #[test]
    fn proptest_local_sessions_are_ignored(principal in arb_principal()) {
        prop_assume!(principal != "gdm");
        let dir = tempfile::tempdir().unwrap();
        let trigger = trigger_in(&dir);
        let mut session = MemorySession::new(principal);

        prop_assert_eq!(trigger.open_session(&mut session), ResultCode::Ignore);
        prop_assert!(session.env().is_empty());
        prop_assert_eq!(trigger.invoker().runs.get(), 0);
    }

    /// Property: the suffix lookup returns exactly the trimmed value of the
    /// first matching key, whatever indentation and padding surround it.
    #[test]
    fn proptest_suffix_lookup_trims(
        indent in "[ \\t]{0,4}",
        pad_before in "[ \\t]{0,4}",
        pad_after in "[ \\t]{0,4}",
        domain in arb_domain(),
        later in arb_domain(),
    ) {
        let conf = format!(
            "[sssd]\n{indent}default_domain_suffix{pad_before}={pad_before}{domain}{pad_after}\n\
             default_domain_suffix = {later}\n"
        );

        let suffix = parse_default_domain_suffix(conf.as_bytes());
        prop_assert_eq!(suffix.ok(), Some(domain));
    }
}
