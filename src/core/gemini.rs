//! Gemini backend (Generative Language REST API)

use super::ai::AiAdapter;
use crate::config::Config;
use crate::error::AiError;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Clone)]
pub struct GeminiAdapter {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

// Keep the key out of debug output
impl std::fmt::Debug for GeminiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAdapter")
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiAdapter {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.ai_timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            api_key: config.gemini_api_key.trim().to_string(),
            model: config.gemini_model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", API_BASE, self.model)
    }
}

#[async_trait]
impl AiAdapter for GeminiAdapter {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        if self.api_key.is_empty() {
            return Err(AiError::Unavailable("no API key".to_string()));
        }

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AiError::Unavailable(format!("rejected credentials ({})", status)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("❌ Gemini API Error ({}): {}", status, body);
            return Err(AiError::ServiceError(format!("HTTP {}", status)));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AiError::ServiceError(format!("malformed response: {}", e)))?;
        debug!("🧠 Gemini returned {} candidates", body.candidates.len());
        body.text()
            .ok_or_else(|| AiError::ServiceError("empty completion".to_string()))
    }

    async fn health_check(&self) -> bool {
        match self.complete("Test connection").await {
            Ok(_) => true,
            Err(e) => {
                warn!("⚠️ Gemini health check failed: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
