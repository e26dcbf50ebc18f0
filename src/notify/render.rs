//! Envelope builders for contact verdicts and usage-session reports.

use crate::analyze::{Analysis, Channel, RiskLevel, Verdict};
use crate::sessions::{SessionEvent, SessionReport};
use crate::submission::Submission;

use super::Envelope;

pub const ELLIPSIS: &str = "...";
pub const MESSAGE_PREVIEW_CHARS: usize = 800;
pub const FLAG_LIST_CHARS: usize = 1000;
pub const LAYER_FLAGS_CHARS: usize = 300;
pub const TOP_FLAGS_PER_LAYER: usize = 3;
const EVENT_LINE_CHARS: usize = 160;
/// Per-field budget for event lines, under Discord's 1024-char field cap.
pub const EVENT_FIELD_CHARS: usize = 1000;
/// Event fields per report; keeps the embed under Discord's 6000-char total.
pub const EVENT_FIELDS: usize = 4;

/// First `max` chars of `text`, followed by `...` when anything was cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push_str(ELLIPSIS);
    out
}

fn or_dash(s: &str) -> String {
    if s.trim().is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

pub fn contact_envelope(sub: &Submission, verdict: &Verdict, channel: Channel) -> Envelope {
    let title = match channel {
        Channel::Main => format!("New contact message: {}", truncate(sub.subject.trim(), 200)),
        Channel::Spam => format!(
            "Flagged contact message ({}, score {})",
            verdict.risk_level, verdict.total_score
        ),
    };

    let mut env = Envelope {
        title,
        description: None,
        color: verdict.risk_level.color(),
        fields: Vec::new(),
        footer: Some(format!("Routed to {channel} | confidence: {}", verdict.confidence)),
        reply_to: Some(sub.email.trim().to_string()).filter(|e| !e.is_empty()),
    }
    .inline_field("Name", or_dash(&sub.name))
    .inline_field("Email", or_dash(&sub.email))
    .field("Subject", or_dash(&sub.subject))
    .field("Message", truncate(sub.message.trim(), MESSAGE_PREVIEW_CHARS))
    .inline_field(
        "Spam score",
        format!("{} ({})", verdict.total_score, verdict.risk_level),
    )
    .inline_field("Verdict", if verdict.is_spam { "SPAM" } else { "CLEAN" });

    match &verdict.analysis {
        Analysis::Layered { layers } => {
            for (kind, result) in layers {
                let top: Vec<&str> = result
                    .flags
                    .iter()
                    .take(TOP_FLAGS_PER_LAYER)
                    .map(String::as_str)
                    .collect();
                let value = if top.is_empty() {
                    "No flags".to_string()
                } else {
                    truncate(&top.join("\n"), LAYER_FLAGS_CHARS)
                };
                env = env.inline_field(format!("{kind}: {}", result.score), value);
            }
        }
        Analysis::Fallback { error } => {
            env = env.field(
                "Fallback analysis",
                truncate(&format!("Layered analysis unavailable: {error}"), LAYER_FLAGS_CHARS),
            );
        }
    }

    let flags = if verdict.flags.is_empty() {
        "None".to_string()
    } else {
        truncate(&verdict.flags.join("\n"), FLAG_LIST_CHARS)
    };
    env.field("All flags", flags)
}

/// One report's worth of a session: the envelope and how many events, counted
/// from the `from` offset, it lists.
#[derive(Debug, Clone)]
pub struct SessionBatch {
    pub envelope: Envelope,
    pub reported: usize,
}

fn event_line(e: &SessionEvent) -> String {
    let details = if e.details.is_empty() {
        String::new()
    } else {
        format!(" {}", serde_json::Value::Object(e.details.clone()))
    };
    let flag = match &e.analysis {
        Some(a) if a.is_spam => format!(" [SPAM {}]", a.score),
        _ => String::new(),
    };
    truncate(
        &format!("{} {}{}{}", e.timestamp.format("%H:%M:%S"), e.name, details, flag),
        EVENT_LINE_CHARS,
    )
}

/// Greedily packs whole event lines into at most `EVENT_FIELDS` fields of
/// `EVENT_FIELD_CHARS` each. Events that do not fit are left for the next
/// batch; at least one event is always reported.
fn pack_events(events: &[SessionEvent]) -> (Vec<String>, usize) {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut packed = 0;

    for e in events {
        let line = event_line(e);
        let needed = if current.is_empty() {
            line.chars().count()
        } else {
            current.chars().count() + 1 + line.chars().count()
        };
        if needed > EVENT_FIELD_CHARS && !current.is_empty() {
            if chunks.len() + 1 == EVENT_FIELDS {
                break;
            }
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(&line);
        packed += 1;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    (chunks, packed)
}

/// Report for `report.events[from..]`. The title states the range when the
/// batch does not cover every pending event.
pub fn session_batch(report: &SessionReport, from: usize) -> SessionBatch {
    let total = report.events.len();
    let pending = report.events.get(from..).unwrap_or_default();
    let (chunks, reported) = pack_events(pending);
    let listed = &pending[..reported];

    let spam_events = listed
        .iter()
        .filter(|e| e.analysis.as_ref().is_some_and(|a| a.is_spam))
        .count();
    let color = if spam_events > 0 {
        RiskLevel::High.color()
    } else {
        RiskLevel::Clean.color()
    };

    let h = &report.heuristics;
    let fetch = format!(
        "site={} mode={} dest={}",
        h.fetch_site.as_deref().unwrap_or("-"),
        h.fetch_mode.as_deref().unwrap_or("-"),
        h.fetch_dest.as_deref().unwrap_or("-"),
    );
    let active = format!(
        "{} -> {} ({}s)",
        report.first_activity.format("%H:%M:%S"),
        report.last_activity.format("%H:%M:%S"),
        (report.last_activity - report.first_activity).num_seconds()
    );

    let title = if from == 0 && reported == total {
        format!("Usage session {}: {} events", report.short_id(), total)
    } else {
        format!(
            "Usage session {}: events {}-{} of {}",
            report.short_id(),
            from + 1,
            from + reported,
            total
        )
    };

    let mut envelope = Envelope {
        title,
        description: None,
        color,
        fields: Vec::new(),
        footer: Some(format!("{spam_events} event(s) flagged")),
        reply_to: None,
    }
    .inline_field("IP", h.ip.clone())
    .inline_field("Language", h.language.clone().unwrap_or_else(|| "-".into()))
    .field("User agent", truncate(&h.user_agent, 200))
    .field("Referer", truncate(h.referer.as_deref().unwrap_or("-"), 200))
    .inline_field("Fetch metadata", fetch)
    .inline_field("Active", active);

    for (i, chunk) in chunks.into_iter().enumerate() {
        let name = if i == 0 {
            "Events".to_string()
        } else {
            format!("Events ({})", i + 1)
        };
        envelope = envelope.field(name, chunk);
    }

    SessionBatch { envelope, reported }
}
