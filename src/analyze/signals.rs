//! Positive signals: deductions applied after the four layers are summed.

use crate::analyze::lexicons::{
    email_domain, professional_keywords, INSTITUTIONAL_SUFFIXES, TRUSTED_EMAIL_PROVIDERS,
};
use crate::submission::Submission;

pub const TRUSTED_PROVIDER_DEDUCTION: u32 = 1;
pub const INSTITUTIONAL_DEDUCTION: u32 = 4;
pub const PER_KEYWORD_DEDUCTION: u32 = 2;
pub const KEYWORD_DEDUCTION_CAP: u32 = 5;
pub const STRUCTURE_DEDUCTION: u32 = 3;

const STRUCTURE_MIN_SENTENCES: usize = 3;
const STRUCTURE_SENTENCE_CHARS: usize = 15;
const STRUCTURE_MESSAGE_CHARS: usize = 150;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositiveSignals {
    pub deduction: u32,
    pub annotations: Vec<String>,
}

impl PositiveSignals {
    fn deduct(&mut self, points: u32, note: String) {
        self.deduction += points;
        self.annotations.push(note);
    }
}

pub fn evaluate(submission: &Submission) -> PositiveSignals {
    let mut out = PositiveSignals::default();
    let domain = email_domain(&submission.email);

    if TRUSTED_EMAIL_PROVIDERS.contains(&domain.as_str()) {
        out.deduct(
            TRUSTED_PROVIDER_DEDUCTION,
            format!("Trusted email provider ({domain}) -{TRUSTED_PROVIDER_DEDUCTION}"),
        );
    }
    if INSTITUTIONAL_SUFFIXES.iter().any(|s| domain.ends_with(s)) {
        out.deduct(
            INSTITUTIONAL_DEDUCTION,
            format!("Educational/government domain ({domain}) -{INSTITUTIONAL_DEDUCTION}"),
        );
    }

    let keywords = professional_keywords(&submission.all_fields());
    if !keywords.is_empty() {
        let points = (keywords.len() as u32 * PER_KEYWORD_DEDUCTION).min(KEYWORD_DEDUCTION_CAP);
        out.deduct(
            points,
            format!("Professional keywords ({}) -{points}", keywords.join(", ")),
        );
    }

    if is_well_structured(&submission.message) {
        out.deduct(
            STRUCTURE_DEDUCTION,
            format!("Well-structured message -{STRUCTURE_DEDUCTION}"),
        );
    }

    out
}

/// At least three sentences longer than 15 chars in a message over 150 chars.
pub fn is_well_structured(message: &str) -> bool {
    let message = message.trim();
    if message.chars().count() <= STRUCTURE_MESSAGE_CHARS {
        return false;
    }
    let long_sentences = message
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.chars().count() > STRUCTURE_SENTENCE_CHARS)
        .count();
    long_sentences >= STRUCTURE_MIN_SENTENCES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_deduction_is_capped() {
        let s = Submission::new(
            "Jo",
            "jo@corp.io",
            "Internship",
            "student project portfolio research career",
        );
        let p = evaluate(&s);
        assert_eq!(p.deduction, KEYWORD_DEDUCTION_CAP);
    }

    #[test]
    fn institutional_and_trusted_domains() {
        let edu = evaluate(&Submission::new("Jo", "jo@cs.stanford.edu", "Hi", "Hello there"));
        assert_eq!(edu.deduction, INSTITUTIONAL_DEDUCTION);
        let gmail = evaluate(&Submission::new("Jo", "jo@Gmail.com", "Hi", "Hello there"));
        assert_eq!(gmail.deduction, TRUSTED_PROVIDER_DEDUCTION);
    }

    #[test]
    fn structure_needs_three_long_sentences() {
        let two = "This is the first sentence of mine. This is the second sentence of mine and it is long enough to pass the overall character limit by itself alone.";
        assert!(!is_well_structured(two));
        let three = format!("{two} And here is a third sentence.");
        assert!(is_well_structured(&three));
    }
}
