//! Verdict shape shared by the scoring engine, the notification router and the
//! usage aggregator.
//!
//! Risk buckets and the spam threshold are independent constants:
//! `LOW` starts at 3 while `is_spam` starts at 5, so a LOW verdict can be
//! either spam or clean.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// `total_score >= SPAM_THRESHOLD` marks a submission as spam.
pub const SPAM_THRESHOLD: u32 = 5;

/// Inclusive lower bounds of the risk buckets.
pub const CRITICAL_FROM: u32 = 15;
pub const HIGH_FROM: u32 = 10;
pub const MEDIUM_FROM: u32 = 7;
pub const LOW_FROM: u32 = 3;

pub const CONFIDENCE_HIGH: &str = "high";
pub const CONFIDENCE_FALLBACK: &str = "low (fallback heuristic)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Clean,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Step function over the total score.
    pub fn from_score(total: u32) -> Self {
        match total {
            t if t >= CRITICAL_FROM => RiskLevel::Critical,
            t if t >= HIGH_FROM => RiskLevel::High,
            t if t >= MEDIUM_FROM => RiskLevel::Medium,
            t if t >= LOW_FROM => RiskLevel::Low,
            _ => RiskLevel::Clean,
        }
    }

    /// Embed colour ramp, green (CLEAN) to red (CRITICAL).
    pub fn color(self) -> u32 {
        match self {
            RiskLevel::Clean => 0x2ECC71,
            RiskLevel::Low => 0xF1C40F,
            RiskLevel::Medium => 0xE67E22,
            RiskLevel::High => 0xE74C3C,
            RiskLevel::Critical => 0x992D22,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Clean => "CLEAN",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical notification destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    Main,
    Spam,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Main => f.write_str("MAIN"),
            Channel::Spam => f.write_str("SPAM"),
        }
    }
}

/// Identifies one of the four scoring passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerKind {
    Profanity,
    Sentiment,
    Toxicity,
    CustomPattern,
}

impl LayerKind {
    pub fn label(self) -> &'static str {
        match self {
            LayerKind::Profanity => "Profanity",
            LayerKind::Sentiment => "Sentiment",
            LayerKind::Toxicity => "Toxicity",
            LayerKind::CustomPattern => "Custom patterns",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output of one layer: additive points plus human-readable flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerResult {
    pub score: u32,
    pub flags: Vec<String>,
}

impl LayerResult {
    pub fn add(&mut self, points: u32, flag: impl Into<String>) {
        self.score += points;
        self.flags.push(flag.into());
    }

    /// Zero contribution recorded for a layer whose capability failed.
    pub fn unavailable(kind: LayerKind, err: &anyhow::Error) -> Self {
        Self {
            score: 0,
            flags: vec![format!("{kind} layer unavailable: {err}")],
        }
    }
}

/// How the verdict was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Analysis {
    /// All four layers ran (some may have degraded to zero).
    Layered {
        layers: BTreeMap<LayerKind, LayerResult>,
    },
    /// Every capability failed and the reduced keyword heuristic ran instead.
    Fallback { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub total_score: u32,
    pub is_spam: bool,
    pub risk_level: RiskLevel,
    pub flags: Vec<String>,
    pub analysis: Analysis,
    pub recommendation: Channel,
    pub confidence: String,
}

impl Verdict {
    /// Derive the classification fields from `total_score` so the invariants
    /// hold by construction.
    pub fn new(
        total_score: u32,
        flags: Vec<String>,
        analysis: Analysis,
        confidence: impl Into<String>,
    ) -> Self {
        let is_spam = total_score >= SPAM_THRESHOLD;
        Self {
            total_score,
            is_spam,
            risk_level: RiskLevel::from_score(total_score),
            flags,
            analysis,
            recommendation: if is_spam { Channel::Spam } else { Channel::Main },
            confidence: confidence.into(),
        }
    }

    pub fn layers(&self) -> Option<&BTreeMap<LayerKind, LayerResult>> {
        match &self.analysis {
            Analysis::Layered { layers } => Some(layers),
            Analysis::Fallback { .. } => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.analysis, Analysis::Fallback { .. })
    }
}
