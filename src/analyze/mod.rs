// src/analyze/mod.rs
//! Scoring engine: runs the layers over a submission, applies the positive
//! signals and classifies the total.
//!
//! Error boundaries:
//! - a failing layer contributes zero and is noted in the flags;
//! - if every capability-backed layer fails, the whole run is replaced by the
//!   keyword-only fallback verdict.
//!
//! `score` never returns an error.

pub mod antispam;
pub mod capabilities;
pub mod fallback;
pub mod layers;
pub mod lexicons;
pub mod signals;
pub mod verdict;

use metrics::counter;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::submission::Submission;

pub use crate::analyze::antispam::{check_instant_spam, InstantCheck};
pub use crate::analyze::capabilities::{
    LexiconMatcher, LexiconToxicity, ProfanityLexicon, SentimentScorer, ToxicityClassifier,
    ToxicityReport,
};
pub use crate::analyze::fallback::{keyword_score, KeywordScore};
pub use crate::analyze::layers::{
    CustomPatternLayer, Layer, ProfanityLayer, SentimentLayer, ToxicityLayer,
};
pub use crate::analyze::verdict::{
    Analysis, Channel, LayerKind, LayerResult, RiskLevel, Verdict, CONFIDENCE_HIGH,
    SPAM_THRESHOLD,
};

pub struct ScoringEngine {
    layers: Vec<Box<dyn Layer>>,
}

impl ScoringEngine {
    /// Standard four-layer pipeline over the given capabilities.
    pub fn new(
        matcher: Arc<dyn LexiconMatcher>,
        scorer: Arc<dyn SentimentScorer>,
        classifier: Arc<dyn ToxicityClassifier>,
    ) -> Self {
        Self::from_layers(vec![
            Box::new(ProfanityLayer::new(matcher)),
            Box::new(SentimentLayer::new(scorer)),
            Box::new(ToxicityLayer::new(classifier)),
            Box::new(CustomPatternLayer::new()),
        ])
    }

    /// Pipeline backed by the embedded lexicons.
    pub fn local() -> Self {
        Self::new(
            Arc::new(ProfanityLexicon::new()),
            Arc::new(crate::sentiment::SentimentAnalyzer::new()),
            Arc::new(LexiconToxicity::new()),
        )
    }

    pub fn from_layers(layers: Vec<Box<dyn Layer>>) -> Self {
        Self { layers }
    }

    pub async fn score(&self, submission: &Submission) -> Verdict {
        let mut per_layer: BTreeMap<LayerKind, LayerResult> = BTreeMap::new();
        let mut flags = Vec::new();
        let mut failures = Vec::new();
        let mut raw_total: u32 = 0;
        let mut backed = 0usize;
        let mut backed_failed = 0usize;

        // Sequential on purpose: latency is the sum of the capability calls.
        for layer in &self.layers {
            let kind = layer.kind();
            if layer.is_capability_backed() {
                backed += 1;
            }
            let result = match layer.score(submission).await {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(target: "scoring", layer = %kind, error = %e, "layer failed; counted as zero");
                    if layer.is_capability_backed() {
                        backed_failed += 1;
                    }
                    failures.push(format!("{kind}: {e:#}"));
                    LayerResult::unavailable(kind, &e)
                }
            };
            raw_total += result.score;
            flags.extend(result.flags.iter().cloned());
            per_layer.insert(kind, result);
        }

        if backed > 0 && backed_failed == backed {
            counter!("contact_fallback_verdicts_total").increment(1);
            tracing::error!(target: "scoring", failures = ?failures, "all moderation capabilities failed; using fallback heuristic");
            return fallback::verdict(submission, failures.join("; "));
        }

        let positives = signals::evaluate(submission);
        flags.extend(positives.annotations);
        let total = raw_total.saturating_sub(positives.deduction);

        let confidence = if failures.is_empty() {
            CONFIDENCE_HIGH.to_string()
        } else {
            format!(
                "partial ({}/{} layers)",
                self.layers.len() - failures.len(),
                self.layers.len()
            )
        };

        let verdict = Verdict::new(
            total,
            flags,
            Analysis::Layered { layers: per_layer },
            confidence,
        );
        tracing::debug!(
            target: "scoring",
            raw = raw_total,
            deduction = positives.deduction,
            total = verdict.total_score,
            risk = %verdict.risk_level,
            "submission scored"
        );
        verdict
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::local()
    }
}
