//! URL slugs
//!
//! `generate_slug` is pure. Uniqueness against stored games is resolved in
//! `db::games`, which walks [`SlugCandidates`] and relies on the `UNIQUE`
//! index on `games.slug` to reject a candidate claimed concurrently.

use once_cell::sync::Lazy;
use regex::Regex;

static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_\s-]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

/// Base slug used when a title normalizes to nothing
pub const FALLBACK_SLUG: &str = "game";

/// Lowercase, keep word characters, whitespace and hyphens, then hyphenate.
/// `"Elmo's ABC's!"` becomes `"elmos-abcs"`.
pub fn generate_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = DISALLOWED.replace_all(lowered.trim(), "");
    let hyphenated = WHITESPACE.replace_all(&stripped, "-");
    let collapsed = HYPHEN_RUNS.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

/// `base`, `base-2`, `base-3`, ...
#[derive(Debug, Clone)]
pub struct SlugCandidates {
    base: String,
    counter: u32,
}

impl SlugCandidates {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.to_string(),
            counter: 1,
        }
    }

    /// Continue after an already-tried candidate
    pub fn starting_after(base: &str, tried: &str) -> Self {
        let counter = tried
            .strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('-'))
            .and_then(|n| n.parse::<u32>().ok())
            .unwrap_or(1);
        Self {
            base: base.to_string(),
            counter: counter + 1,
        }
    }
}

impl Iterator for SlugCandidates {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let candidate = match self.counter {
            1 => self.base.clone(),
            n => format!("{}-{}", self.base, n),
        };
        self.counter = self.counter.checked_add(1)?;
        Some(candidate)
    }
}
