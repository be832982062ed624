//! Email address normalization.

/// Normalize an email address for storage and lookup.
///
/// Leading/trailing whitespace is stripped and the domain part (after
/// the last `@`) is lowercased. The local part is preserved as-is —
/// mailbox names are case-sensitive per the mail RFCs, domains are not.
///
/// An input without an `@` is returned trimmed but otherwise unchanged;
/// presence validation is the caller's job.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}
