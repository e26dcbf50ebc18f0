//! Reduced keyword heuristic. Produces the verdict when the layered analysis
//! cannot run, and scores free text carried by usage events.

use serde::Serialize;

use crate::analyze::lexicons::{NormalizedText, FAKE_IDENTITY_MARKERS, FALLBACK_TERMS};
use crate::analyze::verdict::{Analysis, Verdict, CONFIDENCE_FALLBACK, SPAM_THRESHOLD};
use crate::submission::Submission;

pub const KEYWORD_POINTS: u32 = 5;
pub const FAKE_IDENTITY_POINTS: u32 = 8;

/// Keyword-only result for a piece of free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordScore {
    pub score: u32,
    pub is_spam: bool,
    pub flags: Vec<String>,
}

pub fn keyword_score(text: &str) -> KeywordScore {
    let norm = NormalizedText::new(text);
    let mut out = KeywordScore::default();
    for term in norm.matches(FALLBACK_TERMS) {
        out.score += KEYWORD_POINTS;
        out.flags.push(format!("Keyword: \"{term}\""));
    }
    out.is_spam = out.score >= SPAM_THRESHOLD;
    out
}

/// Verdict built without any capability; `error` explains why.
pub fn verdict(submission: &Submission, error: impl Into<String>) -> Verdict {
    let KeywordScore {
        mut score,
        mut flags,
        ..
    } = keyword_score(&submission.all_fields());

    let identity = format!("{} {}", submission.name, submission.email).to_lowercase();
    if let Some(marker) = FAKE_IDENTITY_MARKERS.iter().find(|m| identity.contains(*m)) {
        score += FAKE_IDENTITY_POINTS;
        flags.push(format!("Fake identity marker (\"{marker}\")"));
    }

    Verdict::new(
        score,
        flags,
        Analysis::Fallback {
            error: error.into(),
        },
        CONFIDENCE_FALLBACK,
    )
}
