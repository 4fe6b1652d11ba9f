//! Academic vs. industry classification of author affiliations.
//!
//! Classification is a two-stage keyword scan. Any academic indicator vetoes the
//! affiliation outright; otherwise the first company indicator (in list order) marks
//! it as non-academic and anchors a small text window from which a company name is
//! pulled.

use regex::Regex;
use std::sync::OnceLock;

/// Phrases marking an academic, clinical or governmental affiliation, in priority order.
pub const ACADEMIC_INDICATORS: &[&str] = &[
    "University",
    "College",
    "Institute",
    "School",
    "Academia",
    "Faculty",
    "Department",
    "Hospital",
    "Clinic",
    "Medical Center",
    "Center for",
    "Laboratory of",
    "National",
    "Federal",
    "State",
    "Ministry",
    "Government",
    "Public Health",
    "Institution",
];

/// Phrases marking a company affiliation, in priority order.
pub const COMPANY_INDICATORS: &[&str] = &[
    "Pharma",
    "Pharmaceutical",
    "Biotech",
    "Therapeutics",
    "Inc",
    "LLC",
    "Ltd",
    "GmbH",
    "Corp",
    "Corporation",
    "Company",
    "Technologies",
    "Biosciences",
    "Biopharma",
    "Labs",
    "Drug",
    "Research",
    "Medicines",
    "Medical",
    "Health",
    "Sciences",
    "BioMed",
    "Laboratories",
];

/// Characters kept on each side of a company indicator when looking for a name.
const WINDOW_RADIUS: usize = 30;

/// Up to six capitalized tokens separated by single spaces.
const COMPANY_NAME_PATTERN: &str = r"[A-Z][A-Za-z0-9&-]+(?: [A-Z][A-Za-z0-9&-]+){0,5}";

static COMPANY_NAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn company_name_regex() -> &'static Regex {
    COMPANY_NAME_REGEX
        .get_or_init(|| Regex::new(COMPANY_NAME_PATTERN).expect("company name pattern is valid"))
}

/// Outcome of classifying one affiliation string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Whether the affiliation looks like an industry organization
    pub is_non_academic: bool,

    /// Best-effort company name; only set for non-academic affiliations
    pub company_name: Option<String>,
}

impl Classification {
    /// An academic (or unclassifiable) affiliation.
    pub fn academic() -> Self {
        Self::default()
    }

    fn company(name: impl Into<String>) -> Self {
        Self {
            is_non_academic: true,
            company_name: Some(name.into()),
        }
    }
}

/// Classify a single affiliation string.
///
/// Returns [`Classification::academic`] for empty text, for any text containing an
/// academic indicator, and for text matching no indicator at all. When a company
/// indicator is found, the company name is the first capitalized-word run in a
/// window around it, falling back to the trimmed window itself.
pub fn classify(affiliation: &str) -> Classification {
    if affiliation.is_empty() {
        return Classification::academic();
    }

    // Indicators are ASCII, so ASCII lowercasing keeps byte offsets aligned with
    // the original text.
    let lowered = affiliation.to_ascii_lowercase();

    if let Some(indicator) = first_indicator(&lowered, ACADEMIC_INDICATORS) {
        tracing::trace!(indicator, "academic affiliation");
        return Classification::academic();
    }

    let Some(indicator) = first_indicator(&lowered, COMPANY_INDICATORS) else {
        return Classification::academic();
    };

    let needle = indicator.to_ascii_lowercase();
    let Some(byte_idx) = lowered.find(&needle) else {
        return Classification::academic();
    };

    let window = window_around(affiliation, byte_idx, indicator.len());
    let name = match company_name_regex().find(window) {
        Some(m) => m.as_str(),
        None => window.trim(),
    };

    tracing::trace!(indicator, company = name, "non-academic affiliation");
    Classification::company(name)
}

/// First indicator (in list order) occurring anywhere in already-lowercased text.
fn first_indicator(lowered: &str, indicators: &[&'static str]) -> Option<&'static str> {
    indicators
        .iter()
        .copied()
        .find(|indicator| lowered.contains(&indicator.to_ascii_lowercase()))
}

/// Slice of `text` spanning `WINDOW_RADIUS` characters before the match at
/// `byte_idx` to `WINDOW_RADIUS` characters past its end, clipped to the text.
fn window_around(text: &str, byte_idx: usize, match_chars: usize) -> &str {
    let char_idx = text[..byte_idx].chars().count();
    let start = char_idx.saturating_sub(WINDOW_RADIUS);
    let end = char_idx + match_chars + WINDOW_RADIUS;

    let byte_at = |n: usize| {
        text.char_indices()
            .nth(n)
            .map_or(text.len(), |(offset, _)| offset)
    };

    &text[byte_at(start)..byte_at(end)]
}
