//! Text Normalization
//!
//! Cleans typed and recognized text before command matching. Case is kept so
//! that names ("my name is Alex") survive; the router lower-cases for matching.

use regex::{NoExpand, Regex};
use std::collections::HashMap;
use tracing::warn;

/// Leading words people put in front of a command
const FILLERS: &[&str] = &["please", "jarvis", "okay", "ok", "um", "uh", "so"];

pub struct TextNormalizer {
    /// Configured misrecognition fixes, longest first
    corrections: Vec<(Regex, String)>,
}

impl TextNormalizer {
    pub fn new(corrections: &HashMap<String, String>) -> Self {
        let mut pairs: Vec<(&String, &String)> = corrections.iter().collect();
        pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));

        let corrections = pairs
            .into_iter()
            .filter(|(from, _)| !from.trim().is_empty())
            .filter_map(|(from, to)| {
                match Regex::new(&format!("(?i){}", regex::escape(from.trim()))) {
                    Ok(re) => Some((re, to.clone())),
                    Err(e) => {
                        warn!("Skipping voice correction '{}': {}", from, e);
                        None
                    }
                }
            })
            .collect();

        Self { corrections }
    }

    /// Apply corrections, drop filler prefixes and trailing punctuation,
    /// collapse whitespace
    pub fn normalize(&self, text: &str) -> String {
        let mut result = text.trim().to_string();

        for (from, to) in &self.corrections {
            result = from.replace_all(&result, NoExpand(to)).into_owned();
        }

        let mut rest = result.as_str();
        while let Some(stripped) = strip_filler(rest) {
            rest = stripped;
        }

        let rest = rest.trim_end_matches(['.', '!', '?', ',', ';']);
        rest.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// One leading filler word removed, if there is one and something follows it
fn strip_filler(text: &str) -> Option<&str> {
    let lower = text.to_lowercase();
    FILLERS.iter().find_map(|filler| {
        let after = lower.strip_prefix(filler)?;
        if !after.starts_with(|c: char| c == ',' || c.is_whitespace()) {
            return None;
        }
        // Fillers are ASCII, so the byte offset is valid in the original
        let rest = text
            .get(filler.len()..)?
            .trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        (!rest.is_empty()).then_some(rest)
    })
}

/// Text after the wake word, or None if it was not said
pub fn after_wake_word<'a>(text: &'a str, wake_word: &str) -> Option<&'a str> {
    let wake = wake_word.trim().to_lowercase();
    if wake.is_empty() {
        return Some(text);
    }
    let lower = text.to_lowercase();
    // Offsets only carry over when lower-casing kept the byte length
    if lower.len() != text.len() {
        return lower.find(&wake).map(|_| text);
    }
    lower.find(&wake).map(|pos| {
        text[pos + wake.len()..].trim_start_matches(|c: char| c == ',' || c.is_whitespace())
    })
}
