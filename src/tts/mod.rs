//! TTS (Text-to-Speech) Module
//!
//! Provides a unified interface for the speech synthesis backends. `speak`
//! resolves only once the text has been spoken, which is what lets the
//! coordinator keep the microphone closed for exactly that long.

use crate::config::Config;
use crate::error::SpeechError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

pub mod speechd;
pub mod system;

/// Trait for TTS engines
#[async_trait]
pub trait TtsEngine: Send + Sync + std::fmt::Debug {
    /// Speak the given text, returning when playback has finished
    async fn speak(&self, text: &str) -> Result<(), SpeechError>;

    /// Get the engine name
    fn name(&self) -> &str;
}

/// Factory to create the configured TTS engine. `None` means text only.
pub async fn create_engine(config: &Config) -> Option<Arc<dyn TtsEngine>> {
    info!("🛠️ Creating TTS engine: {}", config.tts_engine);
    let engine: Arc<dyn TtsEngine> = match config.tts_engine.as_str() {
        "none" | "" => {
            info!("  - Speech output disabled");
            return None;
        }
        "speechd_ng" | "speechd" => match speechd::SpeechdEngine::connect().await {
            Ok(engine) => Arc::new(engine),
            Err(e) => {
                warn!("  - Speechd unavailable ({}), falling back to System", e);
                Arc::new(system::SystemEngine::detect()?)
            }
        },
        "system" => {
            info!("  - Using System TTS");
            Arc::new(system::SystemEngine::detect()?)
        }
        _ => {
            warn!(
                "  - Unknown engine '{}', falling back to System",
                config.tts_engine
            );
            Arc::new(system::SystemEngine::detect()?)
        }
    };
    info!("✅ TTS engine '{}' initialized", engine.name());
    Some(engine)
}
