use crate::launcher::{default_applications, AppEntry};
use crate::session::Theme;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Identity
    pub assistant_name: String,
    pub user_name: String,
    pub theme: Theme,

    // AI
    pub ai_provider: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub ai_timeout_secs: u64,
    /// Consecutive failures before the AI is taken offline (0 = never)
    pub ai_failure_threshold: u32,

    // Speech
    pub tts_engine: String,
    pub asr_engine: String,
    pub listen_timeout_secs: u64,
    pub phrase_limit_secs: u64,
    pub resume_grace_ms: u64,
    pub wake_word: Option<String>,
    pub voice_corrections: HashMap<String, String>,

    // Lookups
    pub weather_api_key: String,
    pub default_location: String,

    // Monitor
    pub monitor_interval_secs: u64,
    pub load_warning_percent: f32,
    pub diagnostics_probe: String,

    // Data
    pub memory_path: String,
    pub applications: BTreeMap<String, AppEntry>,

    // Meta
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assistant_name: "JARVIS".to_string(),
            user_name: "Sir".to_string(),
            theme: Theme::Dark,
            ai_provider: "gemini".to_string(),
            gemini_api_key: "".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3".to_string(),
            ai_timeout_secs: 15,
            ai_failure_threshold: 3,
            tts_engine: "system".to_string(),
            asr_engine: "speechd".to_string(),
            listen_timeout_secs: 5,
            phrase_limit_secs: 8,
            resume_grace_ms: 500,
            wake_word: None,
            voice_corrections: HashMap::from([
                ("jarvis's".to_string(), "jarvis".to_string()),
                ("what's my".to_string(), "what is my".to_string()),
            ]),
            weather_api_key: "".to_string(),
            default_location: "".to_string(),
            monitor_interval_secs: 10,
            load_warning_percent: 90.0,
            diagnostics_probe: "8.8.8.8:53".to_string(),
            memory_path: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("jarvis/memory.json")
                .to_string_lossy()
                .to_string(),
            applications: default_applications(),
            log_level: "INFO".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location, or create defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load config from an explicit path, then apply environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    // Graceful degradation: log warning and use defaults
                    tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                    // Backup corrupt file for debugging
                    let backup_path = path.with_extension("json.corrupt");
                    let _ = std::fs::rename(path, &backup_path);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Credentials come from the environment and win over the file
    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("GEMINI_API_KEY").filter(|v| !v.is_empty()) {
            self.gemini_api_key = v;
        }
        if let Some(v) = lookup("WEATHER_API_KEY").filter(|v| !v.is_empty()) {
            self.weather_api_key = v;
        }
        if let Some(v) = lookup("OLLAMA_URL").filter(|v| !v.is_empty()) {
            self.ollama_url = v;
        }
    }

    pub fn memory_path(&self) -> PathBuf {
        PathBuf::from(&self.memory_path)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jarvis")
        .join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.user_name, "Sir");
        assert_eq!(config.ai_provider, "gemini");
        assert_eq!(config.listen_timeout_secs, 5);
        assert_eq!(config.phrase_limit_secs, 8);
        assert_eq!(config.ai_failure_threshold, 3);
        assert!(config.wake_word.is_none());
        assert!(config.applications.contains_key("calculator"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).expect("Failed to serialize");
        let restored: Config = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(config.user_name, restored.user_name);
        assert_eq!(config.theme, restored.theme);
        assert_eq!(config.applications.len(), restored.applications.len());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let restored: Config =
            serde_json::from_str(r#"{"user_name": "Tony", "theme": "light"}"#).unwrap();
        assert_eq!(restored.user_name, "Tony");
        assert_eq!(restored.theme, Theme::Light);
        assert_eq!(restored.resume_grace_ms, 500);
    }

    #[test]
    fn test_env_overrides_credentials() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            "GEMINI_API_KEY" => Some("abc".to_string()),
            "WEATHER_API_KEY" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.gemini_api_key, "abc");
        assert!(config.weather_api_key.is_empty());
    }

    #[test]
    fn test_config_corrupt_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not valid json").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.assistant_name, "JARVIS");
        assert!(path.with_extension("json.corrupt").exists());
    }
}
