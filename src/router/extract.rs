//! Argument extraction for free-form commands
//!
//! Every parser returns `None` on a wrong number of parts so the caller can
//! answer with a clarification instead of guessing.

/// Drop one leading "my " / "the "
pub fn strip_possessive(text: &str) -> &str {
    let text = text.trim();
    ["my ", "the "]
        .iter()
        .find_map(|p| text.strip_prefix(p))
        .unwrap_or(text)
        .trim()
}

/// "<key> is <value>", exactly one " is "
pub fn split_fact(text: &str) -> Option<(&str, &str)> {
    let mut parts = text.split(" is ");
    let key = parts.next()?.trim();
    let value = parts.next()?.trim();
    if parts.next().is_some() || key.is_empty() || value.is_empty() {
        return None;
    }
    Some((strip_possessive(key), value))
}

/// "<item> to <list>"; the last " to " separates, so items may contain it
pub fn split_list_item(text: &str) -> Option<(&str, &str)> {
    let (item, list) = text.rsplit_once(" to ")?;
    let (item, list) = (item.trim(), strip_possessive(list));
    (!item.is_empty() && !list.is_empty()).then_some((item, list))
}

/// "<key> is <value> to <dictionary>"
pub fn split_dict_entry(text: &str) -> Option<(&str, &str, &str)> {
    let (entry, dict) = text.rsplit_once(" to ")?;
    let (key, value) = entry.split_once(" is ")?;
    let (key, value, dict) = (key.trim(), value.trim(), strip_possessive(dict));
    (!key.is_empty() && !value.is_empty() && !dict.is_empty()).then_some((key, value, dict))
}

/// "<text> to <language>" or "<text> in <language>"
pub fn split_translation(text: &str) -> Option<(&str, &str)> {
    let (phrase, language) = text
        .rsplit_once(" to ")
        .or_else(|| text.rsplit_once(" in "))?;
    let (phrase, language) = (phrase.trim(), language.trim());
    (!phrase.is_empty() && !language.is_empty()).then_some((phrase, language))
}

/// Signed hour offset in "3 hours ago", "in two hours", "an hour from now".
/// Past offsets are negative.
pub fn relative_hours(text: &str) -> Option<i64> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let at = words
        .iter()
        .position(|w| matches!(*w, "hour" | "hours"))?;
    let count = number(words.get(at.checked_sub(1)?)?)?;
    let rest = words[at + 1..].join(" ");
    if rest.starts_with("ago") {
        Some(-count)
    } else if rest.starts_with("from now") || words[..at - 1].last() == Some(&"in") {
        Some(count)
    } else {
        None
    }
}

fn number(word: &str) -> Option<i64> {
    const WORDS: &[&str] = &[
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
        "eleven", "twelve",
    ];
    match word {
        "a" | "an" => Some(1),
        _ => word
            .parse()
            .ok()
            .or_else(|| WORDS.iter().position(|w| *w == word).map(|n| n as i64)),
    }
}

/// Name as the user should be addressed. Capitalization the user typed is
/// kept; an all-lowercase name (typical of recognizers) is title-cased.
pub fn display_name(raw: &str) -> String {
    let raw = raw.trim();
    if raw.chars().any(char::is_uppercase) {
        return raw.to_string();
    }
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
