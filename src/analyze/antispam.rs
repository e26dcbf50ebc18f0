//! Instant-reject filter.
//!
//! Cheap checks that run before scoring; a hit skips the scoring engine and
//! the notification entirely. Rules are checked in order, first match wins:
//! 1. name + subject + message contains an unambiguous spam phrase, matched
//!    on whole tokens after punctuation and spacing are folded
//! 2. the email domain ends with a high-abuse top-level domain

use serde::Serialize;

use crate::analyze::lexicons::{
    email_domain, NormalizedText, HIGH_ABUSE_TLDS, INSTANT_SPAM_PHRASES,
};
use crate::submission::Submission;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantCheck {
    pub is_spam: bool,
    pub reason: Option<String>,
}

impl InstantCheck {
    fn pass() -> Self {
        Self::default()
    }

    fn reject(reason: String) -> Self {
        Self {
            is_spam: true,
            reason: Some(reason),
        }
    }
}

pub fn check_instant_spam(submission: &Submission) -> InstantCheck {
    let text = NormalizedText::new(&format!(
        "{} {} {}",
        submission.name, submission.subject, submission.message
    ));

    if let Some(phrase) = INSTANT_SPAM_PHRASES.iter().find(|p| text.contains_term(p)) {
        return InstantCheck::reject(format!("Blocked phrase: \"{phrase}\""));
    }

    let domain = email_domain(&submission.email);
    if let Some(tld) = HIGH_ABUSE_TLDS.iter().find(|t| domain.ends_with(*t)) {
        return InstantCheck::reject(format!("Blocked email domain ({tld})"));
    }

    InstantCheck::pass()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrase_wins_before_domain() {
        let s = Submission::new("Bob", "bob@mail.ru", "Offer", "Great CRYPTO investment for you");
        let r = check_instant_spam(&s);
        assert!(r.is_spam);
        assert_eq!(r.reason.as_deref(), Some("Blocked phrase: \"crypto investment\""));
    }

    #[test]
    fn phrase_survives_punctuation_and_spacing() {
        for message in ["Crypto-investment, act now!", "a crypto   investment\nplan"] {
            let s = Submission::new("Bob", "bob@gmail.com", "Offer", message);
            let r = check_instant_spam(&s);
            assert!(r.is_spam, "{message:?} should be rejected");
            assert_eq!(r.reason.as_deref(), Some("Blocked phrase: \"crypto investment\""));
        }
    }

    #[test]
    fn phrase_split_across_fields_is_caught() {
        let s = Submission::new("Bob", "bob@gmail.com", "Cheap", "Viagra here");
        assert!(check_instant_spam(&s).is_spam);
    }

    #[test]
    fn phrase_inside_longer_words_passes() {
        let s = Submission::new("Ana", "ana@gmail.com", "Hi", "The cryptocurrency investments chapter");
        assert!(!check_instant_spam(&s).is_spam);
    }

    #[test]
    fn abusive_tld_is_rejected() {
        let s = Submission::new("Bob", "bob@promo.xyz", "Hello", "Just saying hello to you");
        let r = check_instant_spam(&s);
        assert!(r.is_spam);
        assert!(r.reason.unwrap().contains(".xyz"));
    }

    #[test]
    fn email_text_is_not_scanned_for_phrases() {
        let s = Submission::new("Bob", "seo services@x.com", "Hello", "Just saying hello");
        assert!(!check_instant_spam(&s).is_spam);
    }

    #[test]
    fn ordinary_submission_passes() {
        let s = Submission::new("Ana", "ana@gmail.com", "Hi", "Loved the drone project!");
        assert_eq!(check_instant_spam(&s), InstantCheck::default());
    }
}
