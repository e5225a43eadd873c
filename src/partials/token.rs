//! Placeholder tokens embedded in rendered content.
//!
//! | Token                     | Key           | Resolved by                 |
//! |---------------------------|---------------|-----------------------------|
//! | `[partial:<id>]`          | minted id     | per-document join           |
//! | `[simple_partial:<name>]` | partial name  | post-render sweep (cache)   |
//!
//! Matching is global and non-overlapping; keys never contain `]`.
//! Bracket text that does not match either form is left alone.

use regex::{Captures, Regex};
use std::{borrow::Cow, fmt, str::FromStr, sync::LazyLock};

static PARAMETERIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[partial:([^\]]+)\]").unwrap());

static SIMPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[simple_partial:([^\]]+)\]").unwrap());

/// Identifier of one parameterized render job. Unique within a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub u64);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TokenId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(TokenId)
    }
}

/// `[partial:<id>]`
pub fn parameterized_token(id: TokenId) -> String {
    format!("[partial:{id}]")
}

/// `[simple_partial:<name>]`
pub fn simple_token(name: &str) -> String {
    format!("[simple_partial:{name}]")
}

/// Raw ids of every `[partial:...]` token.
pub fn parameterized_keys(content: &str) -> Vec<&str> {
    keys(&PARAMETERIZED, content)
}

/// Names of every `[simple_partial:...]` token.
pub fn simple_keys(content: &str) -> Vec<&str> {
    keys(&SIMPLE, content)
}

/// Replace every `[partial:...]` token with `replacement(raw_id)`.
pub fn replace_parameterized<'a>(
    content: &'a str,
    replacement: impl FnMut(&str) -> String,
) -> Cow<'a, str> {
    replace(&PARAMETERIZED, content, replacement)
}

/// Replace every `[simple_partial:...]` token with `replacement(name)`.
pub fn replace_simple<'a>(
    content: &'a str,
    replacement: impl FnMut(&str) -> String,
) -> Cow<'a, str> {
    replace(&SIMPLE, content, replacement)
}

fn keys<'a>(re: &Regex, content: &'a str) -> Vec<&'a str> {
    re.captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|key| key.as_str())
        .collect()
}

fn replace<'a>(
    re: &Regex,
    content: &'a str,
    mut replacement: impl FnMut(&str) -> String,
) -> Cow<'a, str> {
    re.replace_all(content, |caps: &Captures| replacement(&caps[1]))
}
