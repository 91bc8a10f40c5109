//! Weather and encyclopedia lookups
//!
//! OpenWeatherMap current conditions and the Wikipedia REST page summary.

use crate::error::LookupError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const WIKIPEDIA_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";
const SUMMARY_SENTENCES: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub location: String,
    pub description: String,
    pub temperature_c: f64,
    pub humidity: u32,
    pub pressure_hpa: u32,
}

impl std::fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Weather in {}: {}. Temperature: {:.1}°C, Humidity: {}%, Pressure: {}hPa",
            self.location, self.description, self.temperature_c, self.humidity, self.pressure_hpa
        )
    }
}

#[async_trait]
pub trait InfoLookup: Send + Sync {
    async fn weather(&self, location: &str) -> Result<WeatherReport, LookupError>;

    /// Short encyclopedia summary of a topic
    async fn summary(&self, topic: &str) -> Result<String, LookupError>;
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    name: Option<String>,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: u32,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct WikiSummary {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    extract: String,
}

/// HTTP-backed lookups
#[derive(Clone)]
pub struct WebLookup {
    client: reqwest::Client,
    weather_api_key: String,
}

impl std::fmt::Debug for WebLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebLookup")
            .field("weather_configured", &!self.weather_api_key.is_empty())
            .finish()
    }
}

impl WebLookup {
    pub fn new(weather_api_key: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("jarvis/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            weather_api_key: weather_api_key.into().trim().to_string(),
        })
    }
}

#[async_trait]
impl InfoLookup for WebLookup {
    async fn weather(&self, location: &str) -> Result<WeatherReport, LookupError> {
        if self.weather_api_key.is_empty() {
            return Err(LookupError::NotConfigured("Weather API key"));
        }

        let response = self
            .client
            .get(WEATHER_URL)
            .query(&[
                ("q", location),
                ("appid", self.weather_api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        match response.status() {
            reqwest::StatusCode::NOT_FOUND => {
                return Err(LookupError::NotFound(location.to_string()))
            }
            reqwest::StatusCode::UNAUTHORIZED => {
                return Err(LookupError::Service("weather API key rejected".to_string()))
            }
            status if !status.is_success() => {
                warn!("❌ Weather API Error ({})", status);
                return Err(LookupError::Service(format!("HTTP {}", status)));
            }
            _ => {}
        }

        let body: OwmResponse = response.json().await?;
        debug!("🌦️ Weather for {}: {:?}", location, body);
        Ok(WeatherReport {
            location: body
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| location.to_string()),
            description: body
                .weather
                .first()
                .map(|w| w.description.clone())
                .unwrap_or_else(|| "conditions unknown".to_string()),
            temperature_c: body.main.temp,
            humidity: body.main.humidity,
            pressure_hpa: body.main.pressure,
        })
    }

    async fn summary(&self, topic: &str) -> Result<String, LookupError> {
        let title = topic.trim().replace(' ', "_");
        let url = format!("{}/{}", WIKIPEDIA_URL, urlencoding::encode(&title));
        let response = self.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(topic.to_string()));
        }
        if !response.status().is_success() {
            return Err(LookupError::Service(format!("HTTP {}", response.status())));
        }

        let page: WikiSummary = response.json().await?;
        if page.kind == "disambiguation" {
            return Err(LookupError::Ambiguous(if page.title.is_empty() {
                topic.to_string()
            } else {
                page.title
            }));
        }
        let text = first_sentences(&page.extract, SUMMARY_SENTENCES);
        if text.is_empty() {
            return Err(LookupError::NotFound(topic.to_string()));
        }
        Ok(text)
    }
}

/// Leading `n` sentences of `text`
pub fn first_sentences(text: &str, n: usize) -> String {
    let text = text.trim();
    let mut count = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_boundary {
                count += 1;
                if count == n {
                    return text[..i + c.len_utf8()].to_string();
                }
            }
        }
    }
    text.to_string()
}
