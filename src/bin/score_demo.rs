//! Demo that scores a few canned submissions with the local engine and prints
//! the verdicts as JSON. Nothing is sent anywhere.

use portfolio_backend::{check_instant_spam, ScoringEngine, Submission};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let engine = ScoringEngine::local();

    let samples = [
        Submission::new(
            "John Smith",
            "john.smith@stanford.edu",
            "Research collaboration opportunity",
            "Hello, I am a professor working on distributed systems and I read your \
             portfolio with interest. I would like to discuss a possible research \
             collaboration. Please let me know a good time to talk.",
        ),
        Submission::new("xX_Gamer_Xx", "noob@fake.com", "yo", "u suck noob kys fortnite trash"),
        Submission::new("Ana", "ana@mail.ru", "Offer", "Hi, check my offer please"),
    ];

    for s in &samples {
        let instant = check_instant_spam(s);
        if instant.is_spam {
            println!("{}: instant reject ({})", s.name, instant.reason.unwrap_or_default());
            continue;
        }
        let verdict = engine.score(s).await;
        println!("{}: {}", s.name, serde_json::to_string_pretty(&verdict)?);
    }

    println!("score-demo done");
    Ok(())
}
