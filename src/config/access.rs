//! Email allow-list for the advisory sign-in gate.
//!
//! A comma-separated list of permitted user emails is supplied via the
//! `ALLOWED_EMAILS` environment variable. This is a UX gate consumed by the
//! frontend, not a security boundary: nothing in the HTTP surface is actually
//! protected by it.

/// Parses a comma-separated allow-list into normalized (trimmed, lowercased)
/// email addresses. Empty segments are dropped.
#[must_use]
pub fn parse_allow_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Gets the configured allow-list from the `ALLOWED_EMAILS` environment
/// variable. An unset variable yields an empty list, which permits nobody.
#[must_use]
pub fn allowed_emails() -> Vec<String> {
    std::env::var("ALLOWED_EMAILS")
        .map(|raw| parse_allow_list(&raw))
        .unwrap_or_default()
}

/// Checks whether an email is on the allow-list, ignoring case and
/// surrounding whitespace.
#[must_use]
pub fn is_allowed(email: &str) -> bool {
    let needle = email.trim().to_lowercase();
    !needle.is_empty() && allowed_emails().contains(&needle)
}
