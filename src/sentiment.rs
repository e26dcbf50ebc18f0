use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Lexicon scoring of one text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SentimentReport {
    /// Sum of word scores after negation.
    pub score: i32,
    /// `score / tokens`, 0.0 for empty input.
    pub comparative: f32,
    pub tokens: usize,
    /// Words that contributed a negative score, in order of appearance.
    pub negative: Vec<String>,
    pub positive: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Negation: if one of the previous 1..=3 tokens is a negator, the sign of
    /// the word's lexicon score is inverted.
    pub fn analyze(&self, text: &str) -> SentimentReport {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut report = SentimentReport {
            tokens: tokens.len(),
            ..Default::default()
        };

        for i in 0..tokens.len() {
            let w = tokens[i].as_str();
            let base = self.word_score(w);
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            let adj = if negated { -base } else { base };
            report.score += adj;
            if adj < 0 {
                report.negative.push(w.to_string());
            } else {
                report.positive.push(w.to_string());
            }
        }

        if report.tokens > 0 {
            report.comparative = report.score as f32 / report.tokens as f32;
        }
        report
    }
}

/// Lower-cased alphanumeric tokens; inner apostrophes are kept so that
/// "don't" stays one token.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "don't"
            | "doesn't"
            | "didn't"
            | "without"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostile_text_is_negative_with_words_listed() {
        let r = SentimentAnalyzer::new().analyze("you are a stupid idiot and I hate you");
        assert!(r.comparative < -0.2, "comparative = {}", r.comparative);
        assert!(r.negative.contains(&"hate".to_string()));
        assert!(r.negative.len() >= 3);
    }

    #[test]
    fn negation_flips_sign() {
        let a = SentimentAnalyzer::new();
        assert!(a.analyze("this is good").score > 0);
        assert!(a.analyze("this is not good").score < 0);
        assert!(a.analyze("I don't hate it").score > 0);
    }

    #[test]
    fn empty_text_is_neutral() {
        let r = SentimentAnalyzer::new().analyze("  ...  ");
        assert_eq!(r.tokens, 0);
        assert_eq!(r.comparative, 0.0);
    }
}
