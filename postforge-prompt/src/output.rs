//! Strict-format extraction of a [`GenerationResult`] from raw model text.
//!
//! Parsing never fails. When the `POST:` marker is missing, or the block it
//! introduces is empty, the whole trimmed response becomes the post and the
//! rationale list is empty.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

pub const POST_MARKER: &str = "POST:";
pub const WHY_MARKER: &str = "WHY THIS BUILDS AUTHORITY:";
pub const MAX_WHY_BULLETS: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    pub post: String,
    pub why: Vec<String>,
    /// Unmodified provider text, kept only for degraded results.
    #[serde(skip)]
    pub raw: Option<String>,
}

impl GenerationResult {
    pub fn is_degraded(&self) -> bool {
        self.raw.is_some()
    }
}

fn post_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^[ \t]*POST:[ \t]*").expect("post marker pattern"))
}

fn why_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^[ \t]*WHY THIS BUILDS AUTHORITY:[ \t]*").expect("why marker pattern")
    })
}

pub fn parse_generation(raw: &str) -> GenerationResult {
    let Some(post_match) = post_marker().find(raw) else {
        return degraded(raw);
    };

    let body_start = post_match.end();
    let why_match = why_marker().find_at(raw, body_start);

    let post_end = why_match.map_or(raw.len(), |m| m.start());
    let post = raw[body_start..post_end].trim();
    if post.is_empty() {
        return degraded(raw);
    }

    let why = why_match
        .map(|m| parse_bullets(&raw[m.end()..]))
        .unwrap_or_default();

    GenerationResult {
        post: post.to_string(),
        why,
        raw: None,
    }
}

fn parse_bullets(section: &str) -> Vec<String> {
    section
        .lines()
        .map(|line| {
            let line = line.trim();
            match line.strip_prefix('-') {
                Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
                    rest.trim()
                }
                _ => line,
            }
        })
        .filter(|line| !line.is_empty())
        .take(MAX_WHY_BULLETS)
        .map(str::to_string)
        .collect()
}

fn degraded(raw: &str) -> GenerationResult {
    GenerationResult {
        post: raw.trim().to_string(),
        why: Vec::new(),
        raw: Some(raw.to_string()),
    }
}
