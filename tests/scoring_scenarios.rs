// tests/scoring_scenarios.rs
//
// End-to-end scoring through the public ScoringEngine:
// - reference submissions (professional inquiry, troll)
// - harassment weight, idempotence, monotonicity, zero floor
// - risk thresholds

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use portfolio_backend::analyze::{
    Channel, LayerKind, LexiconMatcher, RiskLevel, ScoringEngine, SentimentScorer,
    ToxicityClassifier, ToxicityReport,
};
use portfolio_backend::sentiment::SentimentReport;
use portfolio_backend::Submission;

/// Capabilities that never find anything, so only the custom layer scores.
struct Quiet;

#[async_trait]
impl LexiconMatcher for Quiet {
    async fn find_profanity(&self, _text: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl SentimentScorer for Quiet {
    async fn score(&self, _text: &str) -> Result<SentimentReport> {
        Ok(SentimentReport::default())
    }
}

#[async_trait]
impl ToxicityClassifier for Quiet {
    async fn classify(&self, text: &str) -> Result<ToxicityReport> {
        Ok(ToxicityReport {
            is_profane: false,
            cleaned: text.to_string(),
        })
    }
    async fn sentiment(&self, _text: &str) -> Result<f32> {
        Ok(0.0)
    }
}

fn quiet_engine() -> ScoringEngine {
    ScoringEngine::new(Arc::new(Quiet), Arc::new(Quiet), Arc::new(Quiet))
}

#[tokio::test]
async fn professional_inquiry_is_clean() {
    let s = Submission::new(
        "John Smith",
        "john@university.edu",
        "Internship inquiry",
        "I am a mechanical engineering student interested in your portfolio and potential internship opportunities. I reviewed your projects and found them impressive. Could we discuss collaboration?",
    );
    let v = ScoringEngine::local().score(&s).await;
    assert_eq!(v.risk_level, RiskLevel::Clean);
    assert!(!v.is_spam);
    assert_eq!(v.recommendation, Channel::Main);
    assert_eq!(v.confidence, "high");
}

#[tokio::test]
async fn troll_submission_is_critical() {
    let s = Submission::new(
        "xX_Gamer_Xx",
        "fake@fake.com",
        "sup",
        "yo bro lets play fortnite lol",
    );
    let v = ScoringEngine::local().score(&s).await;
    assert!(v.total_score >= 15, "got {}", v.total_score);
    assert_eq!(v.risk_level, RiskLevel::Critical);
    assert!(v.is_spam);
    assert_eq!(v.recommendation, Channel::Spam);
}

#[tokio::test]
async fn harassment_alone_crosses_the_threshold() {
    let s = Submission::new(
        "Pat Doe",
        "pat@example.org",
        "Hello",
        "Honestly you should just kill yourself after that last post",
    );
    let v = quiet_engine().score(&s).await;
    let custom = &v.layers().unwrap()[&LayerKind::CustomPattern];
    assert!(custom.flags.iter().any(|f| f.contains("kill yourself")));
    assert_eq!(v.total_score, 8);
    assert!(v.is_spam);
}

#[tokio::test]
async fn scoring_is_idempotent() {
    let engine = ScoringEngine::local();
    let s = Submission::new("Sam", "sam@gmail.com", "Question", "why is this site so bad lol");
    let a = engine.score(&s).await;
    let b = engine.score(&s).await;
    assert_eq!(a.total_score, b.total_score);
    assert_eq!(a.risk_level, b.risk_level);
}

#[tokio::test]
async fn one_more_harassment_term_adds_exactly_its_weight() {
    let engine = quiet_engine();
    let base = "Hello there, I wanted to reach out about something that happened on the website today";
    let a = engine
        .score(&Submission::new("Pat Doe", "pat@example.org", "Hello", base))
        .await;
    let b = engine
        .score(&Submission::new(
            "Pat Doe",
            "pat@example.org",
            "Hello",
            &format!("{base} watch your back"),
        ))
        .await;
    assert_eq!(b.total_score, a.total_score + 8);
}

#[tokio::test]
async fn deductions_never_push_below_zero() {
    let s = Submission::new(
        "Dana Lee",
        "dana@agency.gov",
        "Job opportunity for your portfolio",
        "We are hiring for a research position and saw your portfolio. Your projects match our internship program well. We would love to discuss a collaboration with you soon.",
    );
    let v = ScoringEngine::local().score(&s).await;
    assert_eq!(v.total_score, 0);
    assert_eq!(v.risk_level, RiskLevel::Clean);
    assert!(v.flags.iter().any(|f| f.contains("Educational/government domain")));
}

#[test]
fn risk_thresholds_are_inclusive() {
    assert_eq!(RiskLevel::from_score(15), RiskLevel::Critical);
    assert_eq!(RiskLevel::from_score(14), RiskLevel::High);
    assert_eq!(RiskLevel::from_score(10), RiskLevel::High);
    assert_eq!(RiskLevel::from_score(7), RiskLevel::Medium);
    assert_eq!(RiskLevel::from_score(3), RiskLevel::Low);
    assert_eq!(RiskLevel::from_score(2), RiskLevel::Clean);
}
