//! Word diff between ground truth and a model response
//!
//! Positional, not an edit-distance alignment: both texts are split into
//! alternating word and whitespace tokens and compared index by index.
//! Concatenating the `Equal` and `Removed` parts reproduces the ground truth;
//! `Equal` and `Added` reproduce the response.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum DiffPart {
    Equal(String),
    Removed(String),
    Added(String),
}

impl DiffPart {
    pub fn text(&self) -> &str {
        match self {
            DiffPart::Equal(text) | DiffPart::Removed(text) | DiffPart::Added(text) => text,
        }
    }
}

/// Split into words with the whitespace runs between them kept as tokens
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for run in WHITESPACE.find_iter(text) {
        tokens.push(&text[last..run.start()]);
        tokens.push(run.as_str());
        last = run.end();
    }
    tokens.push(&text[last..]);
    tokens
}

pub fn generate_diff(ground_truth: &str, response: &str) -> Vec<DiffPart> {
    let expected = tokenize(ground_truth);
    let actual = tokenize(response);
    let mut parts = Vec::with_capacity(expected.len().max(actual.len()));

    for i in 0..expected.len().max(actual.len()) {
        match (expected.get(i), actual.get(i)) {
            (Some(e), Some(a)) if e == a => parts.push(DiffPart::Equal(e.to_string())),
            (Some(e), Some(a)) => {
                parts.push(DiffPart::Removed(e.to_string()));
                parts.push(DiffPart::Added(a.to_string()));
            }
            (Some(e), None) => parts.push(DiffPart::Removed(e.to_string())),
            (None, Some(a)) => parts.push(DiffPart::Added(a.to_string())),
            (None, None) => {}
        }
    }

    parts
}

/// Plain-text rendering: `[-removed-]` and `{+added+}`
pub fn render_inline(parts: &[DiffPart]) -> String {
    parts
        .iter()
        .map(|part| match part {
            DiffPart::Equal(text) => text.clone(),
            DiffPart::Removed(text) => format!("[-{text}-]"),
            DiffPart::Added(text) => format!("{{+{text}+}}"),
        })
        .collect()
}
