//! Session Coordinator
//!
//! Owns the input queue and the session state. Utterances from stdin and
//! from the voice listener are handled strictly one at a time; replies go to
//! the transcript and then to the TTS engine.
//!
//! The listener never reads session state directly. It watches a
//! `ListenGate` published after every state change and only captures while
//! the gate is open for its own epoch, so a toggle-off (which bumps the
//! epoch) retires it even when a resume after speech is already pending.
//! Each speech bumps a pause counter, and a capture that overlapped any
//! speech is dropped even if listening resumed before it returned.

use crate::asr::{ListenOutcome, ListenWindow, SpeechListener};
use crate::config::Config;
use crate::core::text_normalizer::after_wake_word;
use crate::error::SpeechError;
use crate::launcher::{Launcher, Platform};
use crate::router::{display_name, Response, Router, SideEffect};
use crate::session::{SessionState, Utterance, VoicePhase, VoiceToggle};
use crate::transcript::{Speaker, Transcript};
use crate::tts::TtsEngine;
use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

const AI_OFFLINE_WARNING: &str = "Warning: AI systems offline. Running in limited capacity.";

/// What the voice listener may do right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenGate {
    Closed,
    Open(u64),
    /// Voice on, but the assistant is speaking
    Paused(u64),
}

#[derive(Debug)]
pub enum Event {
    Utterance(Utterance),
    /// Said by the assistant (shown and spoken)
    Notice(String),
    System(String),
    Warning(String),
    VoiceFailure { epoch: u64, error: SpeechError },
    Shutdown,
}

struct Voice {
    session: SessionState,
    /// Bumped whenever voice control turns on or off
    epoch: u64,
    /// Bumped whenever the assistant starts speaking
    pauses: u64,
}

impl Voice {
    fn gate(&self) -> ListenGate {
        match self.session.voice {
            VoicePhase::Listening => ListenGate::Open(self.epoch),
            VoicePhase::Muted => ListenGate::Paused(self.epoch),
            VoicePhase::Idle | VoicePhase::Unavailable => ListenGate::Closed,
        }
    }
}

struct Shared {
    voice: Mutex<Voice>,
    gate: watch::Sender<ListenGate>,
    tx: mpsc::UnboundedSender<Event>,
    listener: Option<Arc<dyn SpeechListener>>,
    window: ListenWindow,
    wake_word: Option<String>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Voice> {
        self.voice.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate under the lock and publish the resulting gate
    fn update<R>(&self, f: impl FnOnce(&mut Voice) -> R) -> R {
        let mut voice = self.lock();
        let result = f(&mut voice);
        self.gate.send_replace(voice.gate());
        result
    }
}

/// Cloneable access for input producers and the voice toggle
#[derive(Clone)]
pub struct CoordinatorHandle {
    shared: Arc<Shared>,
}

impl CoordinatorHandle {
    /// Enqueue; false once the coordinator has stopped
    pub fn submit(&self, utterance: Utterance) -> bool {
        self.shared.tx.send(Event::Utterance(utterance)).is_ok()
    }

    pub fn submit_text(&self, text: impl Into<String>) -> bool {
        self.submit(Utterance::typed(text))
    }

    pub fn notify(&self, text: impl Into<String>) -> bool {
        self.shared.tx.send(Event::Notice(text.into())).is_ok()
    }

    pub fn post_system(&self, text: impl Into<String>) -> bool {
        self.shared.tx.send(Event::System(text.into())).is_ok()
    }

    pub fn post_warning(&self, text: impl Into<String>) -> bool {
        self.shared.tx.send(Event::Warning(text.into())).is_ok()
    }

    pub fn shutdown(&self) {
        let _ = self.shared.tx.send(Event::Shutdown);
    }

    /// Snapshot of the session state
    pub fn state(&self) -> SessionState {
        self.shared.lock().session.clone()
    }

    pub fn gate(&self) -> ListenGate {
        *self.shared.gate.borrow()
    }

    pub fn toggle_voice(&self) -> VoiceToggle {
        self.switch_voice(SessionState::toggle_voice)
    }

    pub fn enable_voice(&self) -> VoiceToggle {
        self.switch_voice(SessionState::voice_on)
    }

    pub fn disable_voice(&self) -> VoiceToggle {
        self.switch_voice(SessionState::voice_off)
    }

    fn switch_voice(&self, f: impl FnOnce(&mut SessionState) -> VoiceToggle) -> VoiceToggle {
        let (outcome, start) = self.shared.update(|v| {
            let was_active = v.session.voice_active();
            let outcome = f(&mut v.session);
            let now_active = v.session.voice_active();
            if was_active != now_active {
                v.epoch += 1;
            }
            (outcome, (!was_active && now_active).then_some(v.epoch))
        });

        if let (Some(epoch), Some(listener)) = (start, self.shared.listener.clone()) {
            info!("🎤 Voice listener started (epoch {})", epoch);
            tokio::spawn(listen_loop(self.shared.clone(), listener, epoch));
        }
        outcome
    }
}

/// Capture loop for one voice-on period
async fn listen_loop(shared: Arc<Shared>, listener: Arc<dyn SpeechListener>, epoch: u64) {
    let mut gate = shared.gate.subscribe();
    loop {
        // Wait until the gate is open for this epoch
        loop {
            let current = *gate.borrow_and_update();
            match current {
                ListenGate::Open(e) if e == epoch => break,
                ListenGate::Paused(e) if e == epoch => {
                    if gate.changed().await.is_err() {
                        return;
                    }
                }
                _ => {
                    debug!("🎤 Listener for epoch {} retired", epoch);
                    return;
                }
            }
        }

        // Gate and counter read under one lock so speech can't slip between
        let pauses = {
            let voice = shared.lock();
            if voice.gate() != ListenGate::Open(epoch) {
                continue;
            }
            voice.pauses
        };
        let outcome = listener.listen(shared.window).await;
        // A capture that overlapped speech may hold our own voice, even if
        // listening resumed before it returned
        let still_open = {
            let voice = shared.lock();
            voice.gate() == ListenGate::Open(epoch) && voice.pauses == pauses
        };

        match outcome {
            Ok(ListenOutcome::Recognized(text)) => {
                if !still_open {
                    debug!("🎤 Discarding capture that overlapped speech: {}", text);
                    continue;
                }
                let routed = match &shared.wake_word {
                    Some(wake) => match after_wake_word(&text, wake) {
                        Some(rest) => rest.to_string(),
                        None => {
                            debug!("🎤 No wake word in '{}'", text);
                            continue;
                        }
                    },
                    None => text,
                };
                if routed.trim().is_empty() {
                    continue;
                }
                info!("🗣️ Heard: {}", routed);
                if shared.tx.send(Event::Utterance(Utterance::spoken(routed))).is_err() {
                    return;
                }
            }
            Ok(ListenOutcome::NoSpeechDetected) => continue,
            Err(error) => {
                warn!("⚠️ Voice listener failed: {}", error);
                let _ = shared.tx.send(Event::VoiceFailure { epoch, error });
                return;
            }
        }
    }
}

pub struct Coordinator {
    shared: Arc<Shared>,
    rx: mpsc::UnboundedReceiver<Event>,
    router: Router,
    tts: Option<Arc<dyn TtsEngine>>,
    transcript: Arc<dyn Transcript>,
    launcher: Arc<dyn Launcher>,
    resume_grace: Duration,
    assistant_name: String,
    boot_sequence: bool,
}

impl Coordinator {
    pub fn new(
        config: &Config,
        mut router: Router,
        tts: Option<Arc<dyn TtsEngine>>,
        listener: Option<Arc<dyn SpeechListener>>,
        transcript: Arc<dyn Transcript>,
        launcher: Arc<dyn Launcher>,
    ) -> Self {
        router.set_speech_output(tts.is_some());

        let user_name = router
            .memory()
            .get_fact("name")
            .map(display_name)
            .unwrap_or_else(|| config.user_name.clone());
        let mut session = SessionState::new(user_name, config.theme, listener.is_some());
        session.ai_enabled = router.ai_enabled();

        let voice = Voice {
            session,
            epoch: 0,
            pauses: 0,
        };
        let (gate, _) = watch::channel(voice.gate());
        let (tx, rx) = mpsc::unbounded_channel();
        transcript.set_theme(config.theme);

        let shared = Arc::new(Shared {
            voice: Mutex::new(voice),
            gate,
            tx,
            listener,
            window: ListenWindow::from_config(config),
            wake_word: config
                .wake_word
                .clone()
                .filter(|w| !w.trim().is_empty()),
        });

        Self {
            shared,
            rx,
            router,
            tts,
            transcript,
            launcher,
            resume_grace: Duration::from_millis(config.resume_grace_ms),
            assistant_name: config.assistant_name.clone(),
            boot_sequence: true,
        }
    }

    /// Skip the startup banner and greeting
    pub fn without_boot_sequence(mut self) -> Self {
        self.boot_sequence = false;
        self
    }

    pub fn handle(&self) -> CoordinatorHandle {
        CoordinatorHandle {
            shared: self.shared.clone(),
        }
    }

    /// Process events until a terminate command or shutdown request
    pub async fn run(mut self) -> Result<()> {
        if self.boot_sequence {
            self.boot().await;
        }

        while let Some(event) = self.rx.recv().await {
            match event {
                Event::Utterance(utterance) => {
                    if self.process(utterance).await {
                        break;
                    }
                }
                Event::Notice(text) => self.say(&text).await,
                Event::System(text) => self.transcript.post(Speaker::System, &text),
                Event::Warning(text) => self.transcript.post(Speaker::Warning, &text),
                Event::VoiceFailure { epoch, error } => self.voice_failed(epoch, error).await,
                Event::Shutdown => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        // Retire any listener still running
        self.handle().disable_voice();
        info!("👋 Coordinator stopped");
        Ok(())
    }

    async fn boot(&mut self) {
        let name = self.assistant_name.to_uppercase();
        let banner = [
            format!("Initializing {} protocols...", name),
            format!(
                "Detected OS: {} ({})",
                Platform::current().name(),
                std::env::consts::ARCH
            ),
            format!("Systems nominal. {} online.", name),
        ];
        for line in banner {
            self.transcript.post(Speaker::System, &line);
        }

        let user = self.shared.lock().session.user_name.clone();
        let greeting = self.router.responses().greeting(&user);
        self.say(&greeting).await;
        if !self.router.ai_enabled() {
            self.say(AI_OFFLINE_WARNING).await;
        }
    }

    /// Returns true when the session should end
    async fn process(&mut self, utterance: Utterance) -> bool {
        let text = utterance.text().trim();
        if text.is_empty() {
            return false;
        }
        self.transcript.post(Speaker::User, text);

        let snapshot = self.shared.lock().session.clone();
        let response = self.router.dispatch(&utterance, &snapshot).await;

        let ai_enabled = self.router.ai_enabled();
        self.shared.update(|v| v.session.ai_enabled = ai_enabled);

        self.emit(response).await
    }

    async fn emit(&mut self, response: Response) -> bool {
        let Response {
            mut text,
            detail,
            effect,
        } = response;
        let mut terminate = false;

        match effect {
            Some(SideEffect::Terminate) => terminate = true,
            Some(SideEffect::LaunchApp { command, failure }) => {
                if let Err(e) = self.launcher.spawn(&command) {
                    error!("❌ App launch error: {}", e);
                    text = failure;
                }
            }
            Some(SideEffect::OpenUrl(url)) => {
                if let Err(e) = self.launcher.open_url(&url) {
                    error!("❌ Failed to open {}: {}", url, e);
                    text = "Unable to open the browser.".to_string();
                }
            }
            Some(SideEffect::Remembered) => debug!("💾 Memory updated"),
            Some(SideEffect::RenameUser(name)) => {
                info!("👤 Now addressing user as {}", name);
                self.shared.update(|v| v.session.user_name = name);
            }
            Some(SideEffect::ToggleVoice) => {
                text = match self.handle().toggle_voice() {
                    VoiceToggle::Activated => "Voice control activated. Listening...",
                    VoiceToggle::Deactivated => "Voice control deactivated.",
                    VoiceToggle::Unavailable => "Microphone not available",
                }
                .to_string();
            }
            Some(SideEffect::ToggleTheme) => {
                let theme = self.shared.update(|v| {
                    v.session.theme = v.session.theme.toggled();
                    v.session.theme
                });
                self.transcript.set_theme(theme);
            }
            Some(SideEffect::ClearTranscript) => self.transcript.clear(),
            None => {}
        }

        if let Some(detail) = detail {
            self.transcript.post(Speaker::System, &detail);
        }
        if !text.is_empty() {
            self.say(&text).await;
        }
        terminate
    }

    async fn voice_failed(&mut self, epoch: u64, error: SpeechError) {
        let report = self.shared.update(|v| {
            if v.epoch != epoch {
                return false;
            }
            v.epoch += 1;
            v.session.disable_voice()
        });
        if !report {
            debug!("Ignoring voice failure from retired epoch {}", epoch);
            return;
        }
        let text = match error {
            SpeechError::DeviceUnavailable(_) => "Microphone not available",
            SpeechError::ServiceError(_) => "Voice recognition error. Switching to manual mode.",
        };
        self.say(text).await;
    }

    /// Show, then speak
    async fn say(&self, text: &str) {
        self.transcript.post(Speaker::Assistant, text);
        self.speak(text).await;
    }

    /// The only path to the TTS engine. Capture is paused for the duration
    /// and resumes one grace interval later unless voice was switched off.
    async fn speak(&self, text: &str) {
        let Some(tts) = &self.tts else {
            return;
        };

        self.shared.update(|v| {
            v.pauses += 1;
            v.session.begin_speaking()
        });
        if let Err(e) = tts.speak(text).await {
            error!("❌ Speech synthesis error: {}", e);
            self.transcript
                .post(Speaker::Warning, &format!("Voice error: {}", e));
        }
        let resume_pending = self.shared.update(|v| v.session.finish_speaking());

        if resume_pending {
            tokio::time::sleep(self.resume_grace).await;
            if self.shared.update(|v| v.session.resume_listening()) {
                debug!("🎤 Listening resumed");
            }
        }
    }
}
