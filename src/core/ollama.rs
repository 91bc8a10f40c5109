//! Ollama backend
//!
//! Local LLM via the Ollama HTTP API (`/api/generate`, non-streaming).

use super::ai::AiAdapter;
use crate::config::Config;
use crate::error::AiError;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Ollama API response
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Debug, Clone)]
pub struct OllamaAdapter {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaAdapter {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.ai_timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            url: config.ollama_url.trim_end_matches('/').to_string(),
            model: config.ollama_model.clone(),
        })
    }
}

#[async_trait]
impl AiAdapter for OllamaAdapter {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.url))
            .json(&serde_json::json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
                "options": {
                    "temperature": 0.7,
                    "num_predict": 200
                }
            }))
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            warn!("❌ Ollama API Error ({}): {}", status, body_text);
            return Err(AiError::ServiceError(format!("HTTP {}", status)));
        }

        debug!("🧠 Ollama raw body: {}", body_text);

        let parsed: OllamaResponse = serde_json::from_str(&body_text).map_err(|e| {
            warn!("❌ Failed to deserialize Ollama response: {}", e);
            AiError::ServiceError(format!("malformed response: {}", e))
        })?;
        Ok(parsed.response)
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/api/tags", self.url))
            .timeout(Duration::from_secs(2))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
