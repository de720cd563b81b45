//! crates/sungura_core/src/diagram.rs
//!
//! Finds the fenced Mermaid blocks the client renders as diagrams.

use regex::Regex;
use std::sync::OnceLock;

/// A single Mermaid definition found in a model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    pub source: String,
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```mermaid[ \t]*\r?\n(.*?)```").expect("mermaid fence pattern is valid")
    })
}

pub fn extract_diagrams(text: &str) -> Vec<Diagram> {
    fence_regex()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|source| !source.is_empty())
        .map(|source| Diagram {
            source: source.to_string(),
        })
        .collect()
}

pub fn contains_diagram(text: &str) -> bool {
    !extract_diagrams(text).is_empty()
}
