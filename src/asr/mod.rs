//! ASR (Automatic Speech Recognition) Module
//!
//! The voice listener only needs one operation: capture a phrase within a
//! bounded window and report what was said, or that nothing was.

pub mod speechd;

use crate::config::Config;
use crate::error::SpeechError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Result of one capture cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenOutcome {
    Recognized(String),
    /// Silence, timeout or unintelligible audio; retried silently
    NoSpeechDetected,
}

/// Bounds for one capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenWindow {
    /// Wait this long for speech to start
    pub timeout: Duration,
    /// Longest phrase accepted once speech started
    pub phrase_limit: Duration,
}

impl ListenWindow {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: Duration::from_secs(config.listen_timeout_secs),
            phrase_limit: Duration::from_secs(config.phrase_limit_secs),
        }
    }

    /// Upper bound on a single capture call
    pub fn total(&self) -> Duration {
        self.timeout + self.phrase_limit
    }
}

impl Default for ListenWindow {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            phrase_limit: Duration::from_secs(8),
        }
    }
}

/// Trait for speech listeners
#[async_trait]
pub trait SpeechListener: Send + Sync + std::fmt::Debug {
    async fn listen(&self, window: ListenWindow) -> Result<ListenOutcome, SpeechError>;

    fn name(&self) -> &str;
}

/// Factory for the configured listener. `None` means no listening device.
pub async fn create_listener(config: &Config) -> Option<Arc<dyn SpeechListener>> {
    match config.asr_engine.as_str() {
        "none" | "" => {
            info!("🎤 Voice input disabled");
            None
        }
        "speechd" | "speechd_ng" => match speechd::SpeechdListener::connect().await {
            Ok(listener) => {
                info!("🎤 Voice input via speechd-ng");
                Some(Arc::new(listener))
            }
            Err(e) => {
                warn!("⚠️ Microphone not available: {}", e);
                None
            }
        },
        other => {
            warn!("⚠️ Unknown ASR engine '{}', voice input unavailable", other);
            None
        }
    }
}
