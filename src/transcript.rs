//! Transcript output
//!
//! Everything the assistant shows goes through a `Transcript`. The console
//! implementation prints timestamped lines to stdout; logs stay on stderr.

use crate::session::Theme;
use chrono::Local;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
    System,
    Warning,
    Help,
}

impl Speaker {
    pub fn label(self) -> &'static str {
        match self {
            Speaker::User => "YOU",
            Speaker::Assistant => "JARVIS",
            Speaker::System => "SYSTEM",
            Speaker::Warning => "SYSTEM",
            Speaker::Help => "HELP",
        }
    }
}

pub trait Transcript: Send + Sync {
    fn post(&self, speaker: Speaker, text: &str);

    fn clear(&self);

    fn set_theme(&self, _theme: Theme) {}
}

/// ANSI colours per theme
fn colour(theme: Theme, speaker: Speaker) -> &'static str {
    match (theme, speaker) {
        (_, Speaker::Warning) => "\x1b[33m",
        (Theme::Dark, Speaker::User) => "\x1b[32m",
        (Theme::Dark, Speaker::Assistant) => "\x1b[38;5;208m",
        (Theme::Dark, _) => "\x1b[37m",
        (Theme::Light, Speaker::User) => "\x1b[34m",
        (Theme::Light, Speaker::Assistant) => "\x1b[35m",
        (Theme::Light, _) => "\x1b[30m",
    }
}

const RESET: &str = "\x1b[0m";

/// `[HH:MM:SS] SPEAKER: text` on stdout
#[derive(Debug)]
pub struct ConsoleTranscript {
    theme: Mutex<Theme>,
    colour: bool,
    assistant_name: String,
}

impl ConsoleTranscript {
    pub fn new(assistant_name: impl Into<String>, theme: Theme, colour: bool) -> Self {
        Self {
            theme: Mutex::new(theme),
            colour,
            assistant_name: assistant_name.into().to_uppercase(),
        }
    }

    pub fn format_line(&self, speaker: Speaker, text: &str) -> String {
        let label = match speaker {
            Speaker::Assistant => self.assistant_name.as_str(),
            other => other.label(),
        };
        format!("[{}] {}: {}", Local::now().format("%H:%M:%S"), label, text)
    }
}

impl Transcript for ConsoleTranscript {
    fn post(&self, speaker: Speaker, text: &str) {
        let line = self.format_line(speaker, text);
        let mut out = std::io::stdout().lock();
        let _ = if self.colour {
            let theme = *self.theme.lock().unwrap_or_else(PoisonError::into_inner);
            writeln!(out, "{}{}{}\n", colour(theme, speaker), line, RESET)
        } else {
            writeln!(out, "{}\n", line)
        };
        let _ = out.flush();
    }

    fn clear(&self) {
        if self.colour {
            print!("\x1b[2J\x1b[H");
            let _ = std::io::stdout().flush();
        }
    }

    fn set_theme(&self, theme: Theme) {
        *self.theme.lock().unwrap_or_else(PoisonError::into_inner) = theme;
    }
}
