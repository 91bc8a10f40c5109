//! AI Adapter
//!
//! One trait over the text completion backends plus `AiFallback`, which owns
//! the persona prompt, the canned offline/error replies and the failure
//! breaker that takes a flaky backend offline for the rest of the session.

use super::{gemini::GeminiAdapter, ollama::OllamaAdapter};
use crate::config::Config;
use crate::error::AiError;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const OFFLINE_MESSAGE: &str = "AI systems offline. Running in limited capacity.";
pub const ERROR_MESSAGE: &str =
    "I'm experiencing technical difficulties. Please try again later.";

/// Text completion backend
#[async_trait]
pub trait AiAdapter: Send + Sync + std::fmt::Debug {
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;

    /// Cheap reachability probe
    async fn health_check(&self) -> bool;

    fn name(&self) -> &str;
}

/// Factory for the configured backend. `Ok(None)` means no AI this session.
pub fn create_adapter(config: &Config) -> Result<Option<Arc<dyn AiAdapter>>> {
    info!("🛠️ Creating AI adapter: {}", config.ai_provider);
    let adapter: Arc<dyn AiAdapter> = match config.ai_provider.to_lowercase().as_str() {
        "gemini" => {
            if config.gemini_api_key.trim().is_empty() {
                warn!("⚠️ No Gemini API key configured (set GEMINI_API_KEY)");
                return Ok(None);
            }
            Arc::new(GeminiAdapter::new(config)?)
        }
        "ollama" => Arc::new(OllamaAdapter::new(config)?),
        "none" | "" => return Ok(None),
        other => {
            warn!("  - Unknown AI provider '{}', running without AI", other);
            return Ok(None);
        }
    };
    info!("✅ AI adapter '{}' initialized", adapter.name());
    Ok(Some(adapter))
}

/// Wraps the adapter with the session's AI availability policy
#[derive(Debug)]
pub struct AiFallback {
    adapter: Option<Arc<dyn AiAdapter>>,
    online: bool,
    consecutive_failures: u32,
    /// 0 = never go offline
    failure_threshold: u32,
}

impl AiFallback {
    pub fn new(adapter: Option<Arc<dyn AiAdapter>>, failure_threshold: u32) -> Self {
        Self {
            online: adapter.is_some(),
            adapter,
            consecutive_failures: 0,
            failure_threshold,
        }
    }

    pub fn offline() -> Self {
        Self::new(None, 0)
    }

    pub fn is_online(&self) -> bool {
        self.online && self.adapter.is_some()
    }

    pub fn provider(&self) -> Option<&str> {
        self.adapter.as_deref().map(|a| a.name())
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Startup probe; a backend that does not answer starts offline
    pub async fn probe(&mut self) -> bool {
        let Some(adapter) = &self.adapter else {
            self.online = false;
            return false;
        };
        self.online = adapter.health_check().await;
        if self.online {
            info!("🧠 AI backend '{}' is reachable", adapter.name());
        } else {
            warn!("⚠️ AI backend '{}' did not answer the health check", adapter.name());
        }
        self.online
    }

    /// Re-probe and clear the failure count
    pub async fn reconnect(&mut self) -> bool {
        self.consecutive_failures = 0;
        self.probe().await
    }

    async fn call(&mut self, prompt: &str) -> Result<String, AiError> {
        let adapter = match (&self.adapter, self.online) {
            (Some(adapter), true) => adapter.clone(),
            _ => return Err(AiError::Unavailable("AI offline".to_string())),
        };

        debug!("🧠 Prompting {}: {}", adapter.name(), prompt);
        match adapter.complete(prompt).await {
            Ok(text) => {
                self.consecutive_failures = 0;
                Ok(text.trim().to_string())
            }
            Err(e) => {
                self.consecutive_failures += 1;
                error!(
                    "❌ AI call failed ({}/{}): {}",
                    self.consecutive_failures, self.failure_threshold, e
                );
                if self.failure_threshold > 0 && self.consecutive_failures >= self.failure_threshold
                {
                    warn!("⚠️ AI taken offline after {} consecutive failures", self.consecutive_failures);
                    self.online = false;
                }
                Err(e)
            }
        }
    }

    /// Free-form question with the persona prefix. Always yields speakable text.
    pub async fn ask(&mut self, user_name: &str, question: &str) -> String {
        if !self.is_online() {
            return OFFLINE_MESSAGE.to_string();
        }
        let prompt = format!(
            "Respond as JARVIS from Iron Man to {}. Be concise (1-2 sentences), technical, and slightly witty. Question: {}",
            user_name, question
        );
        match self.call(&prompt).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => ERROR_MESSAGE.to_string(),
            Err(AiError::Unavailable(_)) => OFFLINE_MESSAGE.to_string(),
            Err(_) => ERROR_MESSAGE.to_string(),
        }
    }

    /// None when offline or on failure; the caller falls back to the phrase table
    pub async fn translate(&mut self, text: &str, language: &str) -> Option<String> {
        if !self.is_online() {
            return None;
        }
        let prompt = format!(
            "Translate '{}' to {}. Return only the translation.",
            text, language
        );
        self.call(&prompt)
            .await
            .ok()
            .filter(|t| !t.is_empty())
    }
}
