//! Text-moderation capabilities consumed by the scoring layers.
//!
//! Each capability is an async trait so a remote classifier can be dropped in;
//! the local implementations below are lexicon-backed and never fail.

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::analyze::lexicons::NormalizedText;
use crate::sentiment::{SentimentAnalyzer, SentimentReport};

static PROFANITY: Lazy<Vec<String>> = Lazy::new(|| {
    let raw = include_str!("../../profanity_lexicon.json");
    serde_json::from_str::<Vec<String>>(raw).expect("valid profanity lexicon")
});

/// Given text, return the profane phrases it contains.
#[async_trait]
pub trait LexiconMatcher: Send + Sync {
    async fn find_profanity(&self, text: &str) -> Result<Vec<String>>;
}

/// Given text, return comparative polarity and negative-affect words.
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    async fn score(&self, text: &str) -> Result<SentimentReport>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToxicityReport {
    pub is_profane: bool,
    /// Input with offending content masked.
    pub cleaned: String,
}

/// Given text, return a profanity verdict, a cleaned variant and (via a
/// separate call) the classifier's own sentiment.
#[async_trait]
pub trait ToxicityClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ToxicityReport>;
    async fn sentiment(&self, text: &str) -> Result<f32>;
}

/// Embedded profanity word list.
#[derive(Debug, Clone, Default)]
pub struct ProfanityLexicon;

impl ProfanityLexicon {
    pub fn new() -> Self {
        Self
    }

    pub fn matches(&self, text: &str) -> Vec<String> {
        let norm = NormalizedText::new(text);
        PROFANITY
            .iter()
            .filter(|p| norm.contains_term(p))
            .cloned()
            .collect()
    }

    /// Replace every matched phrase with asterisks of the same length.
    pub fn mask(&self, text: &str) -> String {
        let mut out = text.to_string();
        for phrase in self.matches(text) {
            let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
            let pattern = format!(r"(?i)\b{}\b", words.join(r"\W+"));
            let Ok(re) = Regex::new(&pattern) else {
                continue;
            };
            out = re
                .replace_all(&out, |caps: &regex::Captures<'_>| {
                    "*".repeat(caps[0].chars().count())
                })
                .into_owned();
        }
        out
    }
}

#[async_trait]
impl LexiconMatcher for ProfanityLexicon {
    async fn find_profanity(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.matches(text))
    }
}

#[async_trait]
impl SentimentScorer for SentimentAnalyzer {
    async fn score(&self, text: &str) -> Result<SentimentReport> {
        Ok(self.analyze(text))
    }
}

/// Toxicity classifier built from the profanity list and the sentiment lexicon.
#[derive(Debug, Clone, Default)]
pub struct LexiconToxicity {
    lexicon: ProfanityLexicon,
    sentiment: SentimentAnalyzer,
}

impl LexiconToxicity {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ToxicityClassifier for LexiconToxicity {
    async fn classify(&self, text: &str) -> Result<ToxicityReport> {
        let cleaned = self.lexicon.mask(text);
        Ok(ToxicityReport {
            is_profane: !self.lexicon.matches(text).is_empty(),
            cleaned,
        })
    }

    async fn sentiment(&self, text: &str) -> Result<f32> {
        Ok(self.sentiment.analyze(text).comparative)
    }
}
