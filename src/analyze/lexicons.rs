//! Fixed rule tables, one per category, plus the matching helpers used by the
//! custom-pattern layer, the positive signals and the fallback heuristic.
//!
//! Terms are matched on normalized text (lower-case, every non-alphanumeric
//! character folded to a space). Single-word terms must equal a whole token;
//! multi-word terms must appear as a contiguous token run.

use once_cell::sync::Lazy;
use regex::Regex;

/// Gaming / troll-culture vocabulary (+3 per distinct match).
pub const GAMING_TERMS: &[&str] = &[
    "fortnite",
    "minecraft",
    "roblox",
    "valorant",
    "gamer",
    "gaming",
    "noob",
    "n00b",
    "pwned",
    "rekt",
    "gg",
    "ez",
    "headshot",
    "respawn",
    "no scope",
    "1v1",
    "tryhard",
    "among us",
    "sus",
    "skibidi",
    "rizz",
    "griefing",
];

/// Harassment and violent threats (+8 per distinct match).
pub const HARASSMENT_TERMS: &[&str] = &[
    "kill yourself",
    "kys",
    "kill you",
    "go die",
    "hope you die",
    "neck yourself",
    "end your life",
    "shoot you",
    "hurt you",
    "i know where you live",
    "watch your back",
    "i will find you",
    "you are worthless",
    "youre worthless",
    "nobody likes you",
];

/// Informal slang; scored on the number of distinct hits (1-2 → +2, ≥3 → +4).
pub const SLANG_TERMS: &[&str] = &[
    "lol", "lmao", "rofl", "bruh", "bro", "yo", "sup", "wassup", "ur", "u", "omg", "wtf", "tho",
    "fam", "lit", "dude", "nah", "ya", "gonna", "wanna", "idk", "smh", "ngl", "fr", "af", "yeet",
];

/// Substrings of the lower-cased name field that identify troll handles.
pub const TROLL_NAME_MARKERS: &[&str] = &[
    "xx", "gamer", "troll", "noob", "n00b", "420", "69", "lmao", "deez", "ligma", "sugma", "yeet",
    "1337", "asdf", "qwerty", "anonymous", "hacker",
];

/// Throwaway addresses compared for exact equality against the lower-cased email.
pub const FAKE_EMAILS: &[&str] = &[
    "fake@fake.com",
    "test@test.com",
    "asdf@asdf.com",
    "a@a.com",
    "abc@abc.com",
    "example@example.com",
    "email@email.com",
    "no@no.com",
    "spam@spam.com",
    "troll@troll.com",
    "123@123.com",
    "noreply@noreply.com",
];

/// Word patterns that indicate a professional or academic enquiry.
pub const PROFESSIONAL_PATTERNS: &[&str] = &[
    r"\bintern(ship)?s?\b",
    r"\bjobs?\b",
    r"\bpositions?\b",
    r"\bopportunit(y|ies)\b",
    r"\bcollaborat(e|ion|ing)\b",
    r"\bprojects?\b",
    r"\bportfolio\b",
    r"\bresume\b",
    r"\bcv\b",
    r"\bhiring\b",
    r"\brecruit(er|ing|ment)?\b",
    r"\bengineer(s|ing)?\b",
    r"\bstudents?\b",
    r"\buniversit(y|ies)\b",
    r"\bresearch\b",
    r"\bprofessor\b",
    r"\bcareers?\b",
    r"\binterview\b",
    r"\bexperience\b",
    r"\bdevelop(er|ment)\b",
    r"\bsoftware\b",
    r"\bfreelance\b",
    r"\bconsult(ing|ation)?\b",
    r"\bproposal\b",
    r"\bpartnership\b",
    r"\bmentor(ship)?\b",
    r"\bdegree\b",
    r"\bacademic\b",
    r"\bconference\b",
    r"\binquiry\b",
];

/// Mainstream mail providers (−1).
pub const TRUSTED_EMAIL_PROVIDERS: &[&str] = &[
    "gmail.com",
    "googlemail.com",
    "outlook.com",
    "hotmail.com",
    "live.com",
    "yahoo.com",
    "icloud.com",
    "me.com",
    "protonmail.com",
    "proton.me",
    "aol.com",
];

/// Educational / government domain suffixes (−4).
pub const INSTITUTIONAL_SUFFIXES: &[&str] = &[
    ".edu", ".gov", ".mil", ".ac.uk", ".gov.uk", ".edu.au", ".gov.au", ".ac.jp", ".edu.in",
    ".ac.in", ".edu.cn", ".ac.nz",
];

/// Unambiguous spam phrases; any hit rejects before scoring.
pub const INSTANT_SPAM_PHRASES: &[&str] = &[
    "crypto investment",
    "bitcoin investment",
    "guaranteed profit",
    "make money fast",
    "double your money",
    "forex signals",
    "binary options",
    "seo services",
    "rank your website",
    "first page of google",
    "buy followers",
    "cheap viagra",
    "casino bonus",
    "click here to claim",
    "you have won",
    "nigerian prince",
    "wire transfer fee",
];

/// Top-level domains with a high abuse rate; any hit rejects before scoring.
pub const HIGH_ABUSE_TLDS: &[&str] = &[
    ".ru", ".tk", ".ml", ".ga", ".cf", ".gq", ".xyz", ".top", ".click", ".loan", ".work", ".buzz",
];

/// Reduced keyword list used when the layered analysis is unavailable
/// (+5 per match).
pub const FALLBACK_TERMS: &[&str] = &[
    "kill yourself",
    "kys",
    "go die",
    "hope you die",
    "troll",
    "trolling",
    "noob",
    "gamer",
    "fortnite",
    "roblox",
    "minecraft",
    "rekt",
    "bruh",
];

/// Obvious fake-identity markers in the name or email (+8 once).
pub const FAKE_IDENTITY_MARKERS: &[&str] =
    &["fake", "troll", "asdf", "qwerty", "xx_", "_xx", "noob", "test123", "anonymous"];

static PROFESSIONAL_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    PROFESSIONAL_PATTERNS
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("professional keyword regex"))
        .collect()
});

/// Lower-cased, punctuation-folded view of a text.
#[derive(Debug, Clone)]
pub struct NormalizedText {
    /// Tokens joined by single spaces, padded with one space on each side.
    padded: String,
}

impl NormalizedText {
    pub fn new(text: &str) -> Self {
        let joined = normalize(text);
        Self {
            padded: format!(" {joined} "),
        }
    }

    pub fn as_str(&self) -> &str {
        self.padded.trim()
    }

    /// Whole-token (or token-run) match of `term`.
    pub fn contains_term(&self, term: &str) -> bool {
        let t = normalize(term);
        if t.is_empty() {
            return false;
        }
        self.padded.contains(&format!(" {t} "))
    }

    /// Distinct terms from `terms` present in the text, in table order.
    pub fn matches<'a>(&self, terms: &[&'a str]) -> Vec<&'a str> {
        terms
            .iter()
            .copied()
            .filter(|t| self.contains_term(t))
            .collect()
    }
}

fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else if ch == '\'' || ch == '\u{2019}' {
            // keep "you're" as "youre"
        } else {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Distinct professional patterns matched in `text`, reported by pattern.
pub fn professional_keywords(text: &str) -> Vec<String> {
    PROFESSIONAL_REGEXES
        .iter()
        .filter_map(|re| re.find(text).map(|m| m.as_str().to_ascii_lowercase()))
        .collect()
}

pub fn has_professional_keyword(text: &str) -> bool {
    PROFESSIONAL_REGEXES.iter().any(|re| re.is_match(text))
}

/// Domain part of an email address, lower-cased. Empty when there is no `@`.
pub fn email_domain(email: &str) -> String {
    email
        .trim()
        .rsplit_once('@')
        .map(|(_, d)| d.to_ascii_lowercase())
        .unwrap_or_default()
}
