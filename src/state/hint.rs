//! Progressive title reveal sold to the player during a round.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::normalize::clean_title;

/// Glyph drawn in place of a hidden letter or digit.
pub const MASK_GLYPH: char = '_';

static CREDIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[(\[]\s*(feat\.?|ft\.|with|starring)\s+([^)\]]+)[)\]]")
        .expect("credit pattern is valid")
});

static REMIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bremix\b").expect("remix pattern is valid"));

/// How much of the target title is revealed. Levels only move forward within a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HintLevel {
    /// Nothing revealed.
    #[default]
    None,
    /// Title shape revealed with every letter and digit masked.
    Masked,
    /// First word (or first two characters of a single-word title) revealed.
    FirstWord,
}

impl HintLevel {
    /// Next level, or `None` once the reveal is complete.
    pub fn next(self) -> Option<Self> {
        match self {
            HintLevel::None => Some(HintLevel::Masked),
            HintLevel::Masked => Some(HintLevel::FirstWord),
            HintLevel::FirstWord => None,
        }
    }
}

fn mask(c: char) -> char {
    if c.is_alphanumeric() { MASK_GLYPH } else { c }
}

/// Render the title as shown at `level`, or `None` when no hint was bought.
pub fn render_hint(title: &str, level: HintLevel) -> Option<String> {
    let cleaned = clean_title(title);
    match level {
        HintLevel::None => None,
        HintLevel::Masked => Some(cleaned.chars().map(mask).collect()),
        HintLevel::FirstWord => {
            let revealed = if cleaned.contains(char::is_whitespace) {
                cleaned
                    .find(char::is_whitespace)
                    .map(|end| cleaned[..end].chars().count())
                    .unwrap_or_default()
            } else {
                2
            };

            Some(
                cleaned
                    .chars()
                    .enumerate()
                    .map(|(index, c)| if index < revealed { c } else { mask(c) })
                    .collect(),
            )
        }
    }
}

/// Featured-artist or remix information hidden in the full title, if any.
pub fn credit_hint(title: &str) -> Option<String> {
    if let Some(captures) = CREDIT_PATTERN.captures(title) {
        let marker = captures[1].to_lowercase();
        let who = captures[2].trim();
        let label = match marker.as_str() {
            "with" => "with",
            "starring" => "starring",
            _ => "feat.",
        };
        return Some(format!("{label} {who}"));
    }

    REMIX_PATTERN
        .is_match(title)
        .then(|| "remix".to_string())
}
