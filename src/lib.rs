// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod hashing;
pub mod metrics;
pub mod sentiment;
pub mod sessions;
pub mod submission;

// Scoring engine, layers and the instant-reject filter
pub mod analyze;

// Notification router and transports
pub mod notify;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{check_instant_spam, ScoringEngine, Verdict};
pub use crate::api::{router, AppState};
pub use crate::config::AppConfig;
pub use crate::error::ApiError;
pub use crate::notify::{Envelope, NotificationRouter, Transport};
pub use crate::sessions::SessionStore;
pub use crate::submission::Submission;
