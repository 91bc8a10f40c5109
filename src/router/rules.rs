//! Command rule table
//!
//! Rules are tried in table order; the table is sorted by category so the
//! category precedence and the in-category order are the same thing.

use regex::Regex;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleCategory {
    Termination,
    Memory,
    Feature,
    AppLaunch,
    Social,
    Builtin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Terminate,
    // Memory
    SetName,
    RememberFact,
    RecallFact,
    CreateList,
    AppendList,
    ShowList,
    CreateDict,
    PutDictEntry,
    ShowDict,
    // Features
    Wikipedia,
    WebSearch,
    VideoSearch,
    Translate,
    ListApps,
    Diagnostics,
    Weather,
    SystemInfo,
    CpuUsage,
    MemoryUsage,
    IpAddress,
    NetworkStats,
    RelativeTime,
    RelativeDate,
    Time,
    Date,
    LaunchApp,
    // Social
    Greeting,
    Gratitude,
    Apology,
    // Built-ins
    Help,
    Status,
    Joke,
    ToggleTheme,
    ToggleVoice,
    ClearTranscript,
    ReconnectAi,
}

#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Any of the words, on word boundaries
    Words(&'static [&'static str]),
    /// Substring anywhere; argument is what follows it
    Phrase(&'static [&'static str]),
    /// Input starts with it; argument is the rest
    Prefix(&'static [&'static str]),
    /// Starts with one prefix and ends with the suffix; argument is between
    Framed {
        prefixes: &'static [&'static str],
        suffix: &'static str,
    },
    /// Whole input equals one of them; no argument
    Exact(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub category: RuleCategory,
    pub matcher: Matcher,
    pub action: Action,
}

const fn rule(category: RuleCategory, matcher: Matcher, action: Action) -> Rule {
    Rule {
        category,
        matcher,
        action,
    }
}

use Action::*;
use Matcher::*;
use RuleCategory as C;

/// Built-in rules in precedence order
pub const DEFAULT_RULES: &[Rule] = &[
    rule(C::Termination, Words(&["exit", "quit", "shutdown", "goodbye"]), Terminate),
    // Memory
    rule(C::Memory, Phrase(&["my name is "]), SetName),
    rule(C::Memory, Phrase(&["remember that "]), RememberFact),
    rule(C::Memory, Phrase(&["what is my ", "what's my "]), RecallFact),
    rule(C::Memory, Phrase(&["create a list called "]), CreateList),
    rule(C::Memory, Framed { prefixes: &["add "], suffix: " list" }, AppendList),
    rule(
        C::Memory,
        Framed {
            prefixes: &["show me the ", "show me my ", "show my ", "show the "],
            suffix: " list",
        },
        ShowList,
    ),
    rule(C::Memory, Phrase(&["create a dictionary called "]), CreateDict),
    rule(C::Memory, Framed { prefixes: &["add "], suffix: " dictionary" }, PutDictEntry),
    rule(
        C::Memory,
        Framed {
            prefixes: &["show me the ", "show me my ", "show my ", "show the "],
            suffix: " dictionary",
        },
        ShowDict,
    ),
    // Features
    rule(C::Feature, Prefix(&["search wikipedia for ", "wikipedia "]), Wikipedia),
    rule(C::Feature, Prefix(&["search youtube for ", "youtube ", "play "]), VideoSearch),
    rule(
        C::Feature,
        Prefix(&["search google for ", "search for ", "google ", "look up ", "search "]),
        WebSearch,
    ),
    rule(C::Feature, Prefix(&["translate ", "how do you say "]), Translate),
    rule(
        C::Feature,
        Phrase(&[
            "list apps",
            "list applications",
            "what apps can you open",
            "available applications",
        ]),
        ListApps,
    ),
    rule(C::Feature, Phrase(&["diagnostic", "system check"]), Diagnostics),
    rule(C::Feature, Phrase(&["weather in ", "weather for "]), Weather),
    rule(C::Feature, Prefix(&["weather "]), Weather),
    rule(C::Feature, Exact(&["weather", "what's the weather", "what is the weather"]), Weather),
    rule(C::Feature, Phrase(&["system info", "system information"]), SystemInfo),
    rule(C::Feature, Words(&["cpu"]), CpuUsage),
    rule(C::Feature, Phrase(&["memory usage", "ram usage"]), MemoryUsage),
    rule(C::Feature, Phrase(&["ip address"]), IpAddress),
    rule(C::Feature, Words(&["network"]), NetworkStats),
    rule(
        C::Feature,
        Words(&["hours ago", "hour ago", "hours from now", "hour from now"]),
        RelativeTime,
    ),
    rule(C::Feature, Words(&["yesterday", "tomorrow"]), RelativeDate),
    rule(C::Feature, Words(&["time"]), Time),
    rule(C::Feature, Words(&["date"]), Date),
    // Launch
    rule(C::AppLaunch, Prefix(&["open ", "launch ", "start "]), LaunchApp),
    // Social
    rule(C::Social, Words(&["hello", "hi", "hey", "greetings"]), Greeting),
    rule(C::Social, Words(&["thank", "thanks"]), Gratitude),
    rule(C::Social, Words(&["sorry", "apologize", "apologise"]), Apology),
    // Built-ins
    rule(C::Builtin, Exact(&["help", "commands", "what can you do"]), Help),
    rule(C::Builtin, Exact(&["status", "system status"]), Status),
    rule(C::Builtin, Words(&["joke"]), Joke),
    rule(C::Builtin, Phrase(&["toggle theme", "switch theme", "change theme"]), ToggleTheme),
    rule(C::Builtin, Exact(&["theme"]), ToggleTheme),
    rule(C::Builtin, Phrase(&["voice control", "toggle voice"]), ToggleVoice),
    rule(C::Builtin, Exact(&["voice"]), ToggleVoice),
    rule(
        C::Builtin,
        Exact(&["clear", "clear chat", "clear screen", "clear transcript"]),
        ClearTranscript,
    ),
    rule(C::Builtin, Phrase(&["reconnect ai", "reconnect to ai"]), ReconnectAi),
    rule(C::Builtin, Exact(&["reconnect"]), ReconnectAi),
];

/// Rules with their word regexes compiled
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<(Rule, Option<Regex>)>,
}

impl RuleSet {
    pub fn new(rules: &[Rule]) -> Result<Self, regex::Error> {
        let mut sorted = rules.to_vec();
        // Stable: keeps table order inside a category
        sorted.sort_by_key(|r| r.category);

        let rules = sorted
            .into_iter()
            .map(|rule| {
                let words = match rule.matcher {
                    Words(words) => Some(words_regex(words)?),
                    _ => None,
                };
                Ok::<_, regex::Error>((rule, words))
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule that fires on `text` (already lower-cased), with the byte
    /// range of its argument
    pub fn first_match(&self, text: &str) -> Option<(&Rule, Range<usize>)> {
        self.rules.iter().find_map(|(rule, words)| {
            find(&rule.matcher, words.as_ref(), text).map(|range| (rule, range))
        })
    }
}

fn words_regex(words: &[&str]) -> Result<Regex, regex::Error> {
    let alternatives: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|")))
}

fn find(matcher: &Matcher, words: Option<&Regex>, text: &str) -> Option<Range<usize>> {
    match matcher {
        Words(_) => words.filter(|re| re.is_match(text)).map(|_| 0..text.len()),
        Phrase(phrases) => phrases
            .iter()
            .find_map(|p| text.find(p).map(|pos| pos + p.len()..text.len())),
        Prefix(prefixes) => prefixes
            .iter()
            .find(|p| text.starts_with(*p))
            .map(|p| p.len()..text.len()),
        Framed { prefixes, suffix } => {
            if !text.ends_with(suffix) {
                return None;
            }
            prefixes
                .iter()
                .find(|p| text.starts_with(*p) && text.len() >= p.len() + suffix.len())
                .map(|p| p.len()..text.len() - suffix.len())
        }
        // No argument
        Exact(options) => options
            .iter()
            .any(|o| *o == text)
            .then_some(text.len()..text.len()),
    }
}
