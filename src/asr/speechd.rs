//! Speechd-ng listener (VAD capture over D-Bus)

use super::{ListenOutcome, ListenWindow, SpeechListener};
use crate::error::SpeechError;
use crate::speechd::SpeechdClient;
use async_trait::async_trait;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SpeechdListener {
    client: SpeechdClient,
}

impl SpeechdListener {
    pub async fn connect() -> Result<Self, SpeechError> {
        Ok(Self {
            client: SpeechdClient::connect().await?,
        })
    }
}

#[async_trait]
impl SpeechListener for SpeechdListener {
    async fn listen(&self, window: ListenWindow) -> Result<ListenOutcome, SpeechError> {
        match tokio::time::timeout(window.total(), self.client.listen()).await {
            Err(_) => {
                debug!("Listen window elapsed without a phrase");
                Ok(ListenOutcome::NoSpeechDetected)
            }
            Ok(Err(e)) => {
                if self.client.is_available().await {
                    Err(e)
                } else {
                    Err(SpeechError::DeviceUnavailable(e.to_string()))
                }
            }
            Ok(Ok(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    Ok(ListenOutcome::NoSpeechDetected)
                } else {
                    Ok(ListenOutcome::Recognized(text.to_string()))
                }
            }
        }
    }

    fn name(&self) -> &str {
        "speechd_ng"
    }
}
