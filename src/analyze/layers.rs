//! The four scoring passes. Each one turns a submission into a `LayerResult`;
//! the engine sums them and owns the error boundaries.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::analyze::capabilities::{LexiconMatcher, SentimentScorer, ToxicityClassifier};
use crate::analyze::lexicons::{
    self, NormalizedText, FAKE_EMAILS, GAMING_TERMS, HARASSMENT_TERMS, SLANG_TERMS,
    TROLL_NAME_MARKERS,
};
use crate::analyze::verdict::{LayerKind, LayerResult};
use crate::submission::Submission;

pub const PROFANITY_POINTS: u32 = 4;

pub const STRONG_NEGATIVE_COMPARATIVE: f32 = -0.5;
pub const MILD_NEGATIVE_COMPARATIVE: f32 = -0.2;
pub const STRONG_NEGATIVE_POINTS: u32 = 6;
pub const MILD_NEGATIVE_POINTS: u32 = 3;
pub const MANY_NEGATIVE_WORDS_POINTS: u32 = 4;
pub const FEW_NEGATIVE_WORDS_POINTS: u32 = 2;

pub const TOXIC_PROFANITY_POINTS: u32 = 5;
pub const TOXIC_FILTERED_POINTS: u32 = 3;
pub const TOXIC_SENTIMENT_CUTOFF: f32 = -0.4;
pub const TOXIC_SENTIMENT_POINTS: u32 = 4;

pub const GAMING_POINTS: u32 = 3;
pub const HARASSMENT_POINTS: u32 = 8;
pub const MANY_SLANG_POINTS: u32 = 4;
pub const FEW_SLANG_POINTS: u32 = 2;
pub const TROLL_NAME_POINTS: u32 = 6;
pub const FAKE_EMAIL_POINTS: u32 = 6;
pub const SHORT_MESSAGE_POINTS: u32 = 3;
pub const SHORT_MESSAGE_CHARS: usize = 30;

#[async_trait]
pub trait Layer: Send + Sync {
    fn kind(&self) -> LayerKind;

    /// True when the layer calls out to a moderation capability that may fail.
    fn is_capability_backed(&self) -> bool {
        true
    }

    async fn score(&self, submission: &Submission) -> Result<LayerResult>;
}

pub struct ProfanityLayer {
    matcher: Arc<dyn LexiconMatcher>,
}

impl ProfanityLayer {
    pub fn new(matcher: Arc<dyn LexiconMatcher>) -> Self {
        Self { matcher }
    }
}

#[async_trait]
impl Layer for ProfanityLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Profanity
    }

    /// The combined text is scanned as its own field, so a hit in the message
    /// also counts once more through "all fields".
    async fn score(&self, submission: &Submission) -> Result<LayerResult> {
        let all = submission.all_fields();
        let fields = [
            ("name", submission.name.as_str()),
            ("subject", submission.subject.as_str()),
            ("message", submission.message.as_str()),
            ("all fields", all.as_str()),
        ];

        let mut out = LayerResult::default();
        for (field, text) in fields {
            for phrase in self.matcher.find_profanity(text).await? {
                out.add(PROFANITY_POINTS, format!("Profanity in {field}: \"{phrase}\""));
            }
        }
        Ok(out)
    }
}

pub struct SentimentLayer {
    scorer: Arc<dyn SentimentScorer>,
}

impl SentimentLayer {
    pub fn new(scorer: Arc<dyn SentimentScorer>) -> Self {
        Self { scorer }
    }
}

#[async_trait]
impl Layer for SentimentLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Sentiment
    }

    async fn score(&self, submission: &Submission) -> Result<LayerResult> {
        let report = self.scorer.score(&submission.all_fields()).await?;
        let mut out = LayerResult::default();

        let c = report.comparative;
        if c <= STRONG_NEGATIVE_COMPARATIVE {
            out.add(
                STRONG_NEGATIVE_POINTS,
                format!("Very negative sentiment ({c:.2})"),
            );
        } else if c <= MILD_NEGATIVE_COMPARATIVE {
            out.add(MILD_NEGATIVE_POINTS, format!("Negative sentiment ({c:.2})"));
        }

        let words = report.negative.len();
        if words >= 3 {
            out.add(
                MANY_NEGATIVE_WORDS_POINTS,
                format!("Hostile words: {}", report.negative.join(", ")),
            );
        } else if words >= 1 {
            out.add(
                FEW_NEGATIVE_WORDS_POINTS,
                format!("Negative words: {}", report.negative.join(", ")),
            );
        }
        Ok(out)
    }
}

pub struct ToxicityLayer {
    classifier: Arc<dyn ToxicityClassifier>,
}

impl ToxicityLayer {
    pub fn new(classifier: Arc<dyn ToxicityClassifier>) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl Layer for ToxicityLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Toxicity
    }

    async fn score(&self, submission: &Submission) -> Result<LayerResult> {
        let all = submission.all_fields();
        let report = self.classifier.classify(&all).await?;
        let mut out = LayerResult::default();

        if report.is_profane {
            out.add(TOXIC_PROFANITY_POINTS, "Classifier flagged profanity");
        }
        if report.cleaned != all {
            out.add(TOXIC_FILTERED_POINTS, "Classifier would filter content");
        }

        // The sub-score is optional: its failure costs only its own points.
        match self.classifier.sentiment(&all).await {
            Ok(s) if s <= TOXIC_SENTIMENT_CUTOFF => {
                out.add(
                    TOXIC_SENTIMENT_POINTS,
                    format!("Classifier sentiment hostile ({s:.2})"),
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(target: "scoring", error = %e, "toxicity sentiment sub-score unavailable");
            }
        }
        Ok(out)
    }
}

/// Keyword and shape heuristics over fixed tables; no external calls.
#[derive(Debug, Clone, Default)]
pub struct CustomPatternLayer;

impl CustomPatternLayer {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, submission: &Submission) -> LayerResult {
        let text = NormalizedText::new(&submission.all_fields());
        let mut out = LayerResult::default();

        for term in text.matches(GAMING_TERMS) {
            out.add(GAMING_POINTS, format!("Gaming/troll term: \"{term}\""));
        }
        for term in text.matches(HARASSMENT_TERMS) {
            out.add(HARASSMENT_POINTS, format!("Harassment: \"{term}\""));
        }

        let slang = text.matches(SLANG_TERMS);
        match slang.len() {
            0 => {}
            1 | 2 => out.add(FEW_SLANG_POINTS, format!("Slang: {}", slang.join(", "))),
            _ => out.add(MANY_SLANG_POINTS, format!("Heavy slang: {}", slang.join(", "))),
        }

        let name = submission.name.to_lowercase();
        if let Some(marker) = TROLL_NAME_MARKERS.iter().find(|m| name.contains(*m)) {
            out.add(TROLL_NAME_POINTS, format!("Troll-style name (\"{marker}\")"));
        }

        let email = submission.email.trim().to_lowercase();
        if FAKE_EMAILS.contains(&email.as_str()) {
            out.add(FAKE_EMAIL_POINTS, format!("Known fake email: {email}"));
        }

        let message = submission.message.trim();
        if message.chars().count() < SHORT_MESSAGE_CHARS
            && !lexicons::has_professional_keyword(message)
        {
            out.add(
                SHORT_MESSAGE_POINTS,
                "Short message without professional context",
            );
        }

        out
    }
}

#[async_trait]
impl Layer for CustomPatternLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::CustomPattern
    }

    fn is_capability_backed(&self) -> bool {
        false
    }

    async fn score(&self, submission: &Submission) -> Result<LayerResult> {
        Ok(self.evaluate(submission))
    }
}
