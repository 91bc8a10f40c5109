//! Speechd-ng TTS backend using D-Bus

use crate::error::SpeechError;
use crate::speechd::SpeechdClient;
use crate::tts::TtsEngine;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct SpeechdEngine {
    client: SpeechdClient,
}

impl SpeechdEngine {
    pub async fn connect() -> Result<Self, SpeechError> {
        Ok(Self {
            client: SpeechdClient::connect().await?,
        })
    }
}

#[async_trait]
impl TtsEngine for SpeechdEngine {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        self.client.speak(text).await
    }

    fn name(&self) -> &str {
        "speechd_ng"
    }
}
