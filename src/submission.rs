//! Contact-form submission and its basic field validation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

const MIN_NAME_CHARS: usize = 2;
const MIN_SUBJECT_CHARS: usize = 3;
const MIN_MESSAGE_CHARS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    /// Hidden `website` form field. Humans never fill it in.
    #[serde(default, rename = "website")]
    pub honeypot: String,
}

impl Submission {
    pub fn new(name: &str, email: &str, subject: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
            honeypot: String::new(),
        }
    }

    pub fn is_honeypot_tripped(&self) -> bool {
        !self.honeypot.is_empty()
    }

    /// Name, email, subject and message joined by spaces.
    pub fn all_fields(&self) -> String {
        format!(
            "{} {} {} {}",
            self.name, self.email, self.subject, self.message
        )
    }

    /// Every failed check is reported, in field order.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.name.trim().chars().count() < MIN_NAME_CHARS {
            errors.push(format!("Name must be at least {MIN_NAME_CHARS} characters"));
        }
        if !EMAIL_SHAPE.is_match(self.email.trim()) {
            errors.push("Please provide a valid email address".to_string());
        }
        if self.subject.trim().chars().count() < MIN_SUBJECT_CHARS {
            errors.push(format!(
                "Subject must be at least {MIN_SUBJECT_CHARS} characters"
            ));
        }
        if self.message.trim().chars().count() < MIN_MESSAGE_CHARS {
            errors.push(format!(
                "Message must be at least {MIN_MESSAGE_CHARS} characters"
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
