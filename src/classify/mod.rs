//! Affiliation classification engine.
//!
//! Everything in this module is pure and synchronous: no I/O, no shared mutable
//! state. It is safe to call from any number of tasks at once.
//!
//! - [`extract_email`]: first email address in a piece of free text
//! - [`classify`]: academic vs. industry decision plus a candidate company name
//! - [`is_corresponding`]: detects the corresponding-author marker phrase

mod affiliation;
mod email;

pub use affiliation::{classify, Classification, ACADEMIC_INDICATORS, COMPANY_INDICATORS};
pub use email::extract_email;

/// Marker phrase identifying the corresponding author inside an affiliation.
pub const CORRESPONDING_MARKER: &str = "corresponding author";

/// Whether the affiliation text flags its author as the corresponding author.
pub fn is_corresponding(affiliation: &str) -> bool {
    affiliation.to_lowercase().contains(CORRESPONDING_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_corresponding() {
        assert!(is_corresponding("Corresponding Author: Acme Biotech, Boston"));
        assert!(is_corresponding("... (CORRESPONDING AUTHOR)"));
        assert!(!is_corresponding("Acme Biotech, Boston"));
        assert!(!is_corresponding(""));
    }
}
