//! Email address extraction from free-text affiliations.

use regex::Regex;
use std::sync::OnceLock;

/// `local-part@domain.tld`, where the domain has at least one dotted label.
const EMAIL_PATTERN: &str = r"[\w.+-]+@[\w-]+(?:\.[\w-]+)+";

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Extract the first email-looking token from `text`.
///
/// The match is returned verbatim. Empty input yields `None`.
pub fn extract_email(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    email_regex().find(text).map(|m| m.as_str().to_string())
}
