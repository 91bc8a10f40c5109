//! Test doubles for the assistant's adapter seams
//!
//! Every mock records what it was asked to do so tests can assert on it.

#![allow(dead_code)]

use async_trait::async_trait;
use jarvis::asr::{ListenOutcome, ListenWindow, SpeechListener};
use jarvis::config::Config;
use jarvis::core::{AiAdapter, AiFallback};
use jarvis::error::{AiError, LaunchError, LookupError, SpeechError};
use jarvis::launcher::{LaunchCommand, Launcher, Resolution};
use jarvis::lookup::{InfoLookup, WeatherReport};
use jarvis::memory::MemoryStore;
use jarvis::monitor::SystemMonitor;
use jarvis::responses::ResponseBank;
use jarvis::router::Router;
use jarvis::session::Theme;
use jarvis::transcript::{Speaker, Transcript};
use jarvis::tts::TtsEngine;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// AI backend answering from a script; an exhausted script repeats the
/// fallback answer
#[derive(Debug)]
pub struct MockAi {
    script: Mutex<VecDeque<Result<String, AiError>>>,
    pub prompts: Mutex<Vec<String>>,
    pub healthy: AtomicBool,
}

impl MockAi {
    pub fn new(script: Vec<Result<String, AiError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
            healthy: AtomicBool::new(true),
        }
    }

    pub fn answering(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiAdapter for MockAi {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut script = self.script.lock().unwrap();
        match script.pop_front() {
            Some(next) => next,
            None => Ok("Certainly.".to_string()),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Records spoken text and whether speech is in progress
#[derive(Debug)]
pub struct MockTts {
    pub spoken: Mutex<Vec<String>>,
    pub speaking: Arc<AtomicBool>,
    pub finished_at: Mutex<Vec<Instant>>,
    pub delay: Duration,
    pub should_fail: AtomicBool,
}

impl MockTts {
    pub fn new(delay: Duration) -> Self {
        Self {
            spoken: Mutex::new(Vec::new()),
            speaking: Arc::new(AtomicBool::new(false)),
            finished_at: Mutex::new(Vec::new()),
            delay,
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn get_spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn was_spoken(&self, text: &str) -> bool {
        self.spoken.lock().unwrap().iter().any(|s| s.contains(text))
    }
}

#[async_trait]
impl TtsEngine for MockTts {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SpeechError::ServiceError("Mock TTS failure".to_string()));
        }
        self.speaking.store(true, Ordering::SeqCst);
        self.spoken.lock().unwrap().push(text.to_string());
        tokio::time::sleep(self.delay).await;
        self.speaking.store(false, Ordering::SeqCst);
        self.finished_at.lock().unwrap().push(Instant::now());
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Listener returning scripted outcomes, then silence. Counts captures that
/// start while `speaking` is set.
#[derive(Debug)]
pub struct MockListener {
    script: Mutex<VecDeque<Result<ListenOutcome, SpeechError>>>,
    speaking: Arc<AtomicBool>,
    pub capture: Duration,
    pub started_at: Mutex<Vec<Instant>>,
    pub overlaps: AtomicUsize,
}

impl MockListener {
    pub fn new(script: Vec<Result<ListenOutcome, SpeechError>>, speaking: Arc<AtomicBool>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            speaking,
            capture: Duration::from_millis(10),
            started_at: Mutex::new(Vec::new()),
            overlaps: AtomicUsize::new(0),
        }
    }

    pub fn phrases(phrases: &[&str], speaking: Arc<AtomicBool>) -> Self {
        let script = phrases
            .iter()
            .map(|p| Ok(ListenOutcome::Recognized(p.to_string())))
            .collect();
        Self::new(script, speaking)
    }

    pub fn captures(&self) -> usize {
        self.started_at.lock().unwrap().len()
    }
}

#[async_trait]
impl SpeechListener for MockListener {
    async fn listen(&self, _window: ListenWindow) -> Result<ListenOutcome, SpeechError> {
        if self.speaking.load(Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.started_at.lock().unwrap().push(Instant::now());
        tokio::time::sleep(self.capture).await;
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or(Ok(ListenOutcome::NoSpeechDetected))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[derive(Debug, Default)]
pub struct RecordingTranscript {
    pub lines: Mutex<Vec<(Speaker, String)>>,
    pub clears: AtomicUsize,
    pub theme: Mutex<Option<Theme>>,
}

impl RecordingTranscript {
    pub fn lines(&self) -> Vec<(Speaker, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn said(&self, speaker: Speaker) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(s, _)| *s == speaker)
            .map(|(_, text)| text)
            .collect()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.lines().iter().any(|(_, line)| line.contains(text))
    }
}

impl Transcript for RecordingTranscript {
    fn post(&self, speaker: Speaker, text: &str) {
        self.lines.lock().unwrap().push((speaker, text.to_string()));
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.lines.lock().unwrap().clear();
    }

    fn set_theme(&self, theme: Theme) {
        *self.theme.lock().unwrap() = Some(theme);
    }
}

/// Launcher over a fixed table; `None` marks a known app with no invocation
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    pub table: BTreeMap<String, Option<String>>,
    pub spawned: Mutex<Vec<LaunchCommand>>,
    pub opened: Mutex<Vec<String>>,
    pub fail_spawn: AtomicBool,
}

impl RecordingLauncher {
    pub fn with_apps(apps: &[(&str, Option<&str>)]) -> Self {
        Self {
            table: apps
                .iter()
                .map(|(name, inv)| (name.to_string(), inv.map(str::to_string)))
                .collect(),
            ..Self::default()
        }
    }

    pub fn spawned(&self) -> Vec<LaunchCommand> {
        self.spawned.lock().unwrap().clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn resolve(&self, app: &str) -> Resolution {
        let name = app.trim().to_lowercase();
        match self.table.get(&name) {
            Some(Some(invocation)) => Resolution::Resolved(LaunchCommand {
                app: name,
                invocation: invocation.clone(),
            }),
            Some(None) => Resolution::Unsupported,
            None => Resolution::Unknown { suggestion: None },
        }
    }

    fn apps(&self) -> Vec<String> {
        self.table.keys().cloned().collect()
    }

    fn spawn(&self, command: &LaunchCommand) -> Result<(), LaunchError> {
        if self.fail_spawn.load(Ordering::SeqCst) {
            return Err(LaunchError::Spawn {
                program: command.invocation.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "mock"),
            });
        }
        self.spawned.lock().unwrap().push(command.clone());
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<(), LaunchError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Lookup with canned answers and no network
#[derive(Debug, Default)]
pub struct StubLookup;

#[async_trait]
impl InfoLookup for StubLookup {
    async fn weather(&self, location: &str) -> Result<WeatherReport, LookupError> {
        if location.eq_ignore_ascii_case("atlantis") {
            return Err(LookupError::NotFound(location.to_string()));
        }
        Ok(WeatherReport {
            location: location.to_string(),
            description: "clear sky".to_string(),
            temperature_c: 21.5,
            humidity: 40,
            pressure_hpa: 1012,
        })
    }

    async fn summary(&self, topic: &str) -> Result<String, LookupError> {
        Ok(format!("{} is a topic.", topic))
    }
}

pub fn test_config() -> Config {
    Config {
        resume_grace_ms: 30,
        diagnostics_probe: "127.0.0.1:9".to_string(),
        default_location: "London".to_string(),
        ..Config::default()
    }
}

pub struct Fixture {
    pub config: Config,
    pub launcher: Arc<RecordingLauncher>,
    pub ai: Arc<MockAi>,
}

impl Fixture {
    pub fn new(ai: MockAi) -> Self {
        Self {
            config: test_config(),
            launcher: Arc::new(RecordingLauncher::with_apps(&[
                ("calculator", None),
                ("notepad", Some("gedit")),
            ])),
            ai: Arc::new(ai),
        }
    }

    pub fn router(&self, memory: MemoryStore) -> Router {
        let ai = AiFallback::new(
            Some(self.ai.clone() as Arc<dyn AiAdapter>),
            self.config.ai_failure_threshold,
        );
        self.router_with(memory, ai)
    }

    pub fn offline_router(&self) -> Router {
        self.router_with(MemoryStore::in_memory(), AiFallback::offline())
    }

    fn router_with(&self, memory: MemoryStore, ai: AiFallback) -> Router {
        Router::new(
            &self.config,
            memory,
            self.launcher.clone(),
            ai,
            Arc::new(StubLookup),
            Arc::new(SystemMonitor::new()),
        )
        .expect("router")
        .with_responses(ResponseBank::seeded(7))
    }
}
