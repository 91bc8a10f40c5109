//! Fuzzy matching utilities
//!
//! Used to suggest the closest registered application when a spoken app name
//! is slightly off ("calculater", "file explore").

use strsim::normalized_levenshtein;

/// Result of a fuzzy match with the matched value and score
#[derive(Debug, Clone)]
pub struct FuzzyMatch {
    pub value: String,
    pub score: f64,
}

/// Strip common articles for better matching
pub fn strip_articles(text: &str) -> String {
    let lower = text.to_lowercase();
    let articles = ["the ", "a ", "an ", "my "];

    for article in articles {
        if lower.starts_with(article) {
            return text[article.len()..].to_string();
        }
    }
    text.to_string()
}

/// Find up to `n` candidates scoring at or above `cutoff`, best first
pub fn find_matches(
    search_term: &str,
    candidates: &[String],
    n: usize,
    cutoff: f64,
) -> Vec<FuzzyMatch> {
    let search_lower = strip_articles(search_term.trim()).to_lowercase();

    let mut matches: Vec<FuzzyMatch> = candidates
        .iter()
        .filter_map(|candidate| {
            let score = normalized_levenshtein(&search_lower, &candidate.to_lowercase());
            (score >= cutoff).then(|| FuzzyMatch {
                value: candidate.clone(),
                score,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(n);
    matches
}

/// Find the best match above a minimum score
pub fn find_best_match(
    search_term: &str,
    candidates: &[String],
    cutoff: f64,
) -> Option<FuzzyMatch> {
    find_matches(search_term, candidates, 1, cutoff)
        .into_iter()
        .next()
}
