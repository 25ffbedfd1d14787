use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Email addresses anywhere in a string.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b").unwrap()
});

/// Compact JWS: three base64url segments joined by dots.
static JWT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\b[A-Za-z0-9_-]{8,}\.[A-Za-z0-9_-]{8,}\.[A-Za-z0-9_-]{8,}\b").unwrap()
});

/// Mask credentials before they reach a log line.
///
/// - Bearer tokens become `[REDACTED_TOKEN]`
/// - Emails keep the first character of the local part and the full domain
///
/// Tokens go first so their segments are never mistaken for emails.
pub fn redact(input: &str) -> String {
    let without_tokens = JWT_REGEX.replace_all(input, "[REDACTED_TOKEN]");

    EMAIL_REGEX
        .replace_all(&without_tokens, |caps: &regex::Captures| {
            let full = &caps[0];
            match full.split_once('@') {
                Some((local, domain)) => match local.chars().next() {
                    Some(first) => format!("{first}***@{domain}"),
                    None => format!("@{domain}"),
                },
                None => full.to_string(),
            }
        })
        .into_owned()
}

/// Display wrapper that redacts its contents.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}
