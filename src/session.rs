//! Session State
//!
//! The single mutable state of a running assistant, plus the utterance type
//! that flows through the coordinator queue. The voice state machine lives
//! here as plain transitions so it can be tested without any adapters.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Where an utterance came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Typed,
    Spoken,
}

/// One unit of user input
#[derive(Debug, Clone)]
pub struct Utterance {
    text: String,
    source: InputSource,
    received_at: DateTime<Local>,
}

impl Utterance {
    pub fn new(text: impl Into<String>, source: InputSource) -> Self {
        Self {
            text: text.into(),
            source,
            received_at: Local::now(),
        }
    }

    pub fn typed(text: impl Into<String>) -> Self {
        Self::new(text, InputSource::Typed)
    }

    pub fn spoken(text: impl Into<String>) -> Self {
        Self::new(text, InputSource::Spoken)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> InputSource {
        self.source
    }

    pub fn received_at(&self) -> DateTime<Local> {
        self.received_at
    }
}

/// Transcript colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

/// Voice capture phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoicePhase {
    /// Voice control off
    #[default]
    Idle,
    /// Listener is capturing
    Listening,
    /// Voice control on, capture suspended while the assistant speaks
    Muted,
    /// No device, or the recognizer failed; off for the rest of the session
    Unavailable,
}

/// Outcome of a voice toggle request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceToggle {
    Activated,
    Deactivated,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub ai_enabled: bool,
    pub speaking: bool,
    pub user_name: String,
    pub theme: Theme,
    pub voice: VoicePhase,
}

impl SessionState {
    pub fn new(user_name: impl Into<String>, theme: Theme, voice_available: bool) -> Self {
        Self {
            ai_enabled: false,
            speaking: false,
            user_name: user_name.into(),
            theme,
            voice: if voice_available {
                VoicePhase::Idle
            } else {
                VoicePhase::Unavailable
            },
        }
    }

    /// True only while the listener is allowed to capture
    pub fn listening(&self) -> bool {
        self.voice == VoicePhase::Listening
    }

    /// Voice control switched on (capturing or muted)
    pub fn voice_active(&self) -> bool {
        matches!(self.voice, VoicePhase::Listening | VoicePhase::Muted)
    }

    pub fn voice_label(&self) -> &'static str {
        match self.voice {
            VoicePhase::Listening => "On",
            VoicePhase::Muted => "On (muted)",
            VoicePhase::Idle => "Off",
            VoicePhase::Unavailable => "Unavailable",
        }
    }

    pub(crate) fn begin_speaking(&mut self) {
        self.speaking = true;
        if self.voice == VoicePhase::Listening {
            self.voice = VoicePhase::Muted;
        }
    }

    /// Returns true when a resume is pending
    pub(crate) fn finish_speaking(&mut self) -> bool {
        self.speaking = false;
        self.voice == VoicePhase::Muted
    }

    /// Muted -> Listening; anything else (toggle off won) is left alone
    pub(crate) fn resume_listening(&mut self) -> bool {
        if self.voice == VoicePhase::Muted && !self.speaking {
            self.voice = VoicePhase::Listening;
            true
        } else {
            false
        }
    }

    pub(crate) fn voice_on(&mut self) -> VoiceToggle {
        match self.voice {
            VoicePhase::Unavailable => VoiceToggle::Unavailable,
            VoicePhase::Listening | VoicePhase::Muted => VoiceToggle::Activated,
            VoicePhase::Idle => {
                self.voice = if self.speaking {
                    VoicePhase::Muted
                } else {
                    VoicePhase::Listening
                };
                VoiceToggle::Activated
            }
        }
    }

    pub(crate) fn voice_off(&mut self) -> VoiceToggle {
        match self.voice {
            VoicePhase::Unavailable => VoiceToggle::Unavailable,
            _ => {
                self.voice = VoicePhase::Idle;
                VoiceToggle::Deactivated
            }
        }
    }

    pub(crate) fn toggle_voice(&mut self) -> VoiceToggle {
        if self.voice_active() {
            self.voice_off()
        } else {
            self.voice_on()
        }
    }

    /// Returns false if voice was already disabled
    pub(crate) fn disable_voice(&mut self) -> bool {
        let changed = self.voice != VoicePhase::Unavailable;
        self.voice = VoicePhase::Unavailable;
        changed
    }
}
