//! Profile name resolution.
//!
//! The profile name selects the per-user dconf configuration namespace. It is
//! always a lower-cased `user@domain` string, or the lower-cased input when no
//! domain can be determined.

/// Rewrites a legacy `DOMAIN\user` principal as `user@DOMAIN`.
///
/// Only the first backslash separates the domain from the user; any other
/// principal is returned unchanged.
///
/// # Examples
///
/// ```
/// use adsys_session_trigger::profile::slash_to_at;
///
/// assert_eq!(slash_to_at(r"EXAMPLE\alice"), "alice@EXAMPLE");
/// assert_eq!(slash_to_at("bob@example.com"), "bob@example.com");
/// ```
pub fn slash_to_at(principal: &str) -> String {
    match principal.split_once('\\') {
        Some((domain, user)) => format!("{user}@{domain}"),
        None => principal.to_string(),
    }
}

/// Resolves the normalized profile name for a principal.
///
/// `lookup_domain_suffix` is consulted only when the principal carries no
/// domain at all (neither `DOMAIN\user` nor `user@domain`). An unavailable or
/// empty suffix leaves the principal as is, so this function never fails.
///
/// Case folding is ASCII-only; other bytes pass through unchanged.
///
/// # Examples
///
/// ```
/// use adsys_session_trigger::profile::resolve_profile;
///
/// assert_eq!(resolve_profile(r"EXAMPLE\Alice", || None), "alice@example");
/// assert_eq!(
///     resolve_profile("carol", || Some("Example.COM".to_string())),
///     "carol@example.com"
/// );
/// assert_eq!(resolve_profile("gdm", || None), "gdm");
/// ```
pub fn resolve_profile<F>(principal: &str, lookup_domain_suffix: F) -> String
where
    F: FnOnce() -> Option<String>,
{
    let mut profile = slash_to_at(principal);

    if !profile.contains('@') {
        let suffix = lookup_domain_suffix();
        if let Some(suffix) = suffix.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            profile.push('@');
            profile.push_str(suffix);
        }
    }

    profile.make_ascii_lowercase();
    profile
}
