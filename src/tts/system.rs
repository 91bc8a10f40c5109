//! System fallback TTS engine
//!
//! Shells out to whichever speech command the OS has and waits for it.

use super::TtsEngine;
use crate::error::SpeechError;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

/// Candidate commands and the flag that makes them block until done
const CANDIDATES: &[(&str, Option<&str>)] = &[
    ("spd-say", Some("--wait")),
    ("espeak-ng", None),
    ("espeak", None),
    ("say", None),
];

#[derive(Debug, Clone)]
pub struct SystemEngine {
    program: String,
    args: Vec<String>,
}

impl SystemEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// First speech command found on PATH
    pub fn detect() -> Option<Self> {
        let found = CANDIDATES
            .iter()
            .find(|(program, _)| which::which(program).is_ok())
            .map(|(program, flag)| {
                Self::new(*program, flag.iter().map(|a| a.to_string()).collect())
            });
        if found.is_none() {
            warn!("⚠️ No system TTS command found (tried spd-say, espeak-ng, espeak, say)");
        }
        found
    }
}

#[async_trait]
impl TtsEngine for SystemEngine {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        debug!("System speaking: {}", text);

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .status()
            .await
            .map_err(|e| SpeechError::ServiceError(format!("{}: {}", self.program, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::ServiceError(format!(
                "{} exited with {}",
                self.program, status
            )))
        }
    }

    fn name(&self) -> &str {
        &self.program
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_is_service_error() {
        let engine = SystemEngine::new("definitely-not-a-tts-binary", vec![]);
        assert!(matches!(
            engine.speak("hello").await,
            Err(SpeechError::ServiceError(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_waits_for_command() {
        // `true` ignores its arguments and exits 0
        let engine = SystemEngine::new("true", vec![]);
        assert!(engine.speak("hello").await.is_ok());

        let engine = SystemEngine::new("false", vec![]);
        assert!(engine.speak("hello").await.is_err());
    }
}
