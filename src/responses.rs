//! Canned responses
//!
//! Fixed phrase sets the assistant picks from uniformly at random. Templates
//! use named `{placeholders}`.

use chrono::Timelike;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSet {
    Greeting,
    Farewell,
    Gratitude,
    Apology,
    Time,
    Date,
    Diagnostics,
    AppSuccess,
    AppFail,
    Memory,
    Translation,
    AppList,
    Search,
    Joke,
}

impl ResponseSet {
    pub fn templates(self) -> &'static [&'static str] {
        match self {
            ResponseSet::Greeting => &[
                "Systems online. Good {time_of_day} {user}. How may I assist you today?",
                "All systems operational. Good {time_of_day} {user}. Ready for your commands.",
                "Initialization complete. Good {time_of_day} {user}. How can I be of service?",
            ],
            ResponseSet::Farewell => &[
                "Shutting down systems. Goodbye {user}.",
                "Powering off. Until next time {user}.",
                "Terminating session. It's been a pleasure serving you.",
            ],
            ResponseSet::Gratitude => &[
                "You're most welcome {user}. Always at your service.",
                "My pleasure, as always {user}.",
                "Gratitude acknowledged. Happy to assist.",
            ],
            ResponseSet::Apology => &[
                "No need to apologize {user}. How may I assist you?",
                "All is forgiven {user}. What can I do for you?",
                "No offense taken {user}. How may I be of service?",
            ],
            ResponseSet::Time => &[
                "The current time is {time}.",
                "My internal clock shows {time}.",
                "It is currently {time}.",
            ],
            ResponseSet::Date => &[
                "Today's date is {date}.",
                "According to my calendar, it's {date}.",
                "The date is {date}.",
            ],
            ResponseSet::Diagnostics => &[
                "Running comprehensive diagnostic scan...",
                "Initiating system self-check protocols...",
                "Commencing full diagnostic sequence...",
            ],
            ResponseSet::AppSuccess => &[
                "Initializing requested application, {app}.",
                "Launching {app} as requested.",
                "Opening {app} for you.",
            ],
            ResponseSet::AppFail => &[
                "Failed to launch {app}. It may not be installed.",
                "Unable to access {app}. Please check system permissions.",
                "Application {app} not responding.",
            ],
            ResponseSet::Memory => &[
                "I've stored that information for you.",
                "Consider it remembered.",
                "Added to my memory banks.",
            ],
            ResponseSet::Translation => &[
                "The translation is: {text}",
                "In the requested language: {text}",
                "Translated: {text}",
            ],
            ResponseSet::AppList => &[
                "Here are the applications I can launch: {apps}",
                "Registered applications: {apps}",
                "Available apps: {apps}",
            ],
            ResponseSet::Search => &[
                "Searching for '{query}'...",
                "Looking up '{query}'...",
                "Querying '{query}'...",
            ],
            ResponseSet::Joke => &[
                "Why don't scientists trust atoms? They make up everything!",
                "I'm reading a book about anti-gravity... it's impossible to put down!",
                "Why did the Rust developer get arrested? Too many unsafe operations!",
            ],
        }
    }
}

/// Fill `{name}` placeholders
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{}}}", name), value)
    })
}

/// "morning" 05-11, "afternoon" 12-16, "evening" otherwise
pub fn time_of_day(hour: u32) -> &'static str {
    match hour {
        5..=11 => "morning",
        12..=16 => "afternoon",
        _ => "evening",
    }
}

pub fn current_time_of_day() -> &'static str {
    time_of_day(chrono::Local::now().hour())
}

pub const HELP_TEXT: &str = "\
Available commands:
- time / date: Current time or date
- yesterday / tomorrow, <n> hours ago / <n> hours from now: Relative date and time
- weather [in] <location>: Current weather
- wikipedia <topic>: Short encyclopedia summary
- search <query> / google <query> / look up <query>: Web search
- youtube <query> / play <query>: Video search
- translate <text> to <language>: Translation
- system info: Operating system and hardware
- cpu / memory usage / ip address / network: Quick system readings
- diagnostics / system check: Health report
- status: AI, voice and load status
- list apps: Applications I can launch
- open / launch / start <app>: Launch an application
- my name is <name>: Set how I address you
- remember that <key> is <value> / what is my <key>: Personal facts
- create a list called <name> / add <item> to <name> list / show me the <name> list
- create a dictionary called <name> / add <key> is <value> to <name> dictionary / show me the <name> dictionary
- joke: Light entertainment
- theme: Toggle dark/light theme
- voice: Toggle voice control
- clear: Clear the transcript
- reconnect ai: Retry the AI connection
- help: Show this message
- exit / quit / goodbye: Shut down";

/// Random picker over the response sets
#[derive(Debug)]
pub struct ResponseBank {
    rng: StdRng,
}

impl Default for ResponseBank {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseBank {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic picks
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn pick(&mut self, set: ResponseSet, values: &[(&str, &str)]) -> String {
        let template = set.templates().choose(&mut self.rng).copied().unwrap_or("");
        fill(template, values)
    }

    pub fn greeting(&mut self, user: &str) -> String {
        self.pick(
            ResponseSet::Greeting,
            &[("time_of_day", current_time_of_day()), ("user", user)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ResponseSet; 14] = [
        ResponseSet::Greeting,
        ResponseSet::Farewell,
        ResponseSet::Gratitude,
        ResponseSet::Apology,
        ResponseSet::Time,
        ResponseSet::Date,
        ResponseSet::Diagnostics,
        ResponseSet::AppSuccess,
        ResponseSet::AppFail,
        ResponseSet::Memory,
        ResponseSet::Translation,
        ResponseSet::AppList,
        ResponseSet::Search,
        ResponseSet::Joke,
    ];

    #[test]
    fn test_sets_not_empty() {
        for set in ALL {
            assert!(!set.templates().is_empty(), "{:?} is empty", set);
        }
    }

    #[test]
    fn test_pick_fills_placeholders() {
        let mut bank = ResponseBank::seeded(7);
        for _ in 0..20 {
            let text = bank.pick(ResponseSet::AppSuccess, &[("app", "calculator")]);
            assert!(text.contains("calculator"));
            assert!(!text.contains('{'));
        }
    }

    #[test]
    fn test_pick_is_from_set() {
        let mut bank = ResponseBank::seeded(1);
        let text = bank.pick(ResponseSet::Memory, &[]);
        assert!(ResponseSet::Memory.templates().contains(&text.as_str()));
    }

    #[test]
    fn test_time_of_day() {
        assert_eq!(time_of_day(5), "morning");
        assert_eq!(time_of_day(12), "afternoon");
        assert_eq!(time_of_day(17), "evening");
        assert_eq!(time_of_day(2), "evening");
    }

    #[test]
    fn test_greeting_names_user() {
        let mut bank = ResponseBank::seeded(3);
        let text = bank.greeting("Alex");
        assert!(text.contains("Good "));
        assert!(text.contains("Alex"));
    }
}
