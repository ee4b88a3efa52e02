//! URL-safe slug generation for section labels and page slugs

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static RAW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static DEFAULT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\p{M}\p{L}\p{Nd}]+").unwrap());
static PRETTY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{M}\p{L}\p{Nd}._~!$&'()+,;=@]+").unwrap());
static ASCII: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

/// Character set kept when slugifying
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlugMode {
    /// Only whitespace is replaced
    Raw,
    /// Letters, marks and digits are kept (Unicode aware)
    #[default]
    Default,
    /// Like `Default` but also keeps URL-safe punctuation
    Pretty,
    /// Only ASCII letters and digits are kept
    Ascii,
}

impl SlugMode {
    fn pattern(self) -> &'static Regex {
        match self {
            Self::Raw => &RAW,
            Self::Default => &DEFAULT,
            Self::Pretty => &PRETTY,
            Self::Ascii => &ASCII,
        }
    }
}

/// Turn arbitrary text into a lowercase, hyphen-separated slug
///
/// # Parameters
/// * `raw` - Text to slugify (e.g., a CMS `slug` or `title` field)
/// * `mode` - Which characters survive
///
/// # Returns
/// * `String` - The slug; empty if nothing survives
pub fn slugify(raw: &str, mode: SlugMode) -> String {
    let replaced = mode.pattern().replace_all(raw, "-");
    replaced.trim_matches('-').to_lowercase()
}
