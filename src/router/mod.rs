//! Command Router
//!
//! Classifies an utterance against the ordered rule table and runs the
//! matching handler. Anything unmatched goes to the AI with the persona
//! prefix. Handlers never fail: every outcome is a `Response`.

mod extract;
mod handlers;
pub mod rules;

pub use extract::display_name;
pub use rules::{Action, Matcher, Rule, RuleCategory, DEFAULT_RULES};

use crate::config::Config;
use crate::error::{JarvisError, JarvisResult};
use crate::core::{AiFallback, TextNormalizer};
use crate::launcher::{LaunchCommand, Launcher};
use crate::lookup::InfoLookup;
use crate::memory::MemoryStore;
use crate::monitor::SystemMonitor;
use crate::responses::ResponseBank;
use crate::session::{SessionState, Utterance};
use rules::RuleSet;
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

/// Something the coordinator must do besides showing and speaking the text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    Terminate,
    LaunchApp {
        command: LaunchCommand,
        /// Spoken instead of the success text if the spawn fails
        failure: String,
    },
    OpenUrl(String),
    /// Memory store changed and was persisted
    Remembered,
    RenameUser(String),
    ToggleVoice,
    ToggleTheme,
    ClearTranscript,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Displayed and spoken
    pub text: String,
    /// Displayed only, before the text
    pub detail: Option<String>,
    pub effect: Option<SideEffect>,
}

impl Response {
    pub fn say(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            detail: None,
            effect: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_effect(mut self, effect: SideEffect) -> Self {
        self.effect = Some(effect);
        self
    }
}

/// The matched rule and its argument, in both spellings
#[derive(Debug, Clone, Copy)]
pub(crate) struct Matched<'a> {
    pub action: Action,
    /// Argument as matched (lower-cased)
    pub arg: &'a str,
    /// Same span with the user's capitalization, when recoverable
    pub raw_arg: &'a str,
}

pub struct Router {
    rules: RuleSet,
    normalizer: TextNormalizer,
    memory: MemoryStore,
    launcher: Arc<dyn Launcher>,
    ai: AiFallback,
    lookup: Arc<dyn InfoLookup>,
    monitor: Arc<SystemMonitor>,
    responses: ResponseBank,
    default_location: String,
    diagnostics_probe: String,
    speech_output: bool,
}

impl Router {
    pub fn new(
        config: &Config,
        memory: MemoryStore,
        launcher: Arc<dyn Launcher>,
        ai: AiFallback,
        lookup: Arc<dyn InfoLookup>,
        monitor: Arc<SystemMonitor>,
    ) -> JarvisResult<Self> {
        let rules = RuleSet::new(DEFAULT_RULES)
            .map_err(|e| JarvisError::Config(format!("invalid command rule: {}", e)))?;
        Ok(Self {
            rules,
            normalizer: TextNormalizer::new(&config.voice_corrections),
            memory,
            launcher,
            ai,
            lookup,
            monitor,
            responses: ResponseBank::new(),
            default_location: config.default_location.trim().to_string(),
            diagnostics_probe: config.diagnostics_probe.clone(),
            speech_output: false,
        })
    }

    /// Replace the response picker (fixed seed in tests)
    pub fn with_responses(mut self, responses: ResponseBank) -> Self {
        self.responses = responses;
        self
    }

    pub fn set_speech_output(&mut self, active: bool) {
        self.speech_output = active;
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai.is_online()
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn responses(&mut self) -> &mut ResponseBank {
        &mut self.responses
    }

    pub fn normalize(&self, text: &str) -> String {
        self.normalizer.normalize(text)
    }

    /// Which built-in would handle `text`; None means the AI
    pub fn classify(&self, text: &str) -> Option<Action> {
        let cleaned = self.normalize(text);
        let lower = cleaned.to_lowercase();
        self.rules.first_match(&lower).map(|(rule, _)| rule.action)
    }

    pub async fn dispatch(&mut self, utterance: &Utterance, state: &SessionState) -> Response {
        let cleaned = self.normalize(utterance.text());
        if cleaned.is_empty() {
            return Response::say("I didn't catch that.");
        }
        let lower = cleaned.to_lowercase();

        let Some((action, range)) = self
            .rules
            .first_match(&lower)
            .map(|(rule, range)| (rule.action, range))
        else {
            debug!("🧠 No rule matched, forwarding to AI: {}", cleaned);
            let text = self.ai.ask(&state.user_name, &cleaned).await;
            return Response::say(text);
        };

        debug!("🎯 {:?} matched '{}'", action, lower);
        let matched = Matched {
            action,
            arg: lower[range.clone()].trim(),
            raw_arg: raw_span(&cleaned, &lower, range),
        };
        self.handle(matched, state).await
    }
}

/// The span in the original spelling; falls back to the lower-cased text
/// when lower-casing moved byte offsets
fn raw_span<'a>(raw: &'a str, lower: &'a str, range: Range<usize>) -> &'a str {
    let span = if raw.len() == lower.len() {
        raw.get(range.clone())
    } else {
        None
    };
    span.unwrap_or(&lower[range]).trim()
}
