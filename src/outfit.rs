//! Outfit recommendation client
//!
//! This module builds a stylist prompt from the current conditions, sends it to
//! an OpenAI-compatible chat-completion endpoint and parses the free-text reply
//! into men's and women's outfit lists. Failures never reach the forecast
//! pipeline: callers get an `OutfitState::Unavailable` instead.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::data::CurrentSnapshot;

/// Default chat-completion endpoint
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default completion length
pub const DEFAULT_MAX_TOKENS: u32 = 600;

/// Message shown in place of outfits when the request fails
pub const UNAVAILABLE_MESSAGE: &str = "Outfit ideas unavailable right now. Try again later.";

const MEN_HEADER: &str = "Men's Outfits";
const WOMEN_HEADER: &str = "Women's Outfits";

/// Errors that can occur when fetching outfit recommendations
#[derive(Debug, Error)]
pub enum OutfitError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Endpoint answered with a non-success status
    #[error("Outfit service returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// No API key in the environment
    #[error("Missing API key: environment variable {0} is not set")]
    MissingApiKey(String),

    /// Response carried no message content
    #[error("Response contained no outfit text")]
    EmptyContent,
}

/// Unit system the provider values are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Parse a unit system from a string (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Units> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Some(Units::Metric),
            "imperial" => Some(Units::Imperial),
            _ => None,
        }
    }

    /// Temperature unit letter
    pub fn temp_unit(&self) -> &'static str {
        match self {
            Units::Metric => "C",
            Units::Imperial => "F",
        }
    }

    /// Wind speed unit
    pub fn wind_unit(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }
}

/// One suggested outfit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outfit {
    /// Outfit name, e.g. "Casual Chic"
    pub title: String,
    /// Garments making up the outfit
    pub items: Vec<String>,
}

/// Outcome of an outfit request, ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutfitState {
    Ready { men: Vec<Outfit>, women: Vec<Outfit> },
    Unavailable { message: String },
}

impl OutfitState {
    /// State shown after any failure
    pub fn unavailable() -> Self {
        OutfitState::Unavailable {
            message: UNAVAILABLE_MESSAGE.to_string(),
        }
    }

    /// Builds a ready state from the model's free text.
    pub fn from_text(text: &str) -> Self {
        let sections = split_sections(text);
        OutfitState::Ready {
            men: parse_outfits(&sections.men),
            women: parse_outfits(&sections.women),
        }
    }
}

/// The two halves of a recommendation reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutfitSections {
    pub men: String,
    pub women: String,
}

/// Chat-completion request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Builds the stylist prompt for the current conditions.
///
/// Temperatures and wind speed are rounded; values are taken as already
/// expressed in `units`.
pub fn build_prompt(snapshot: &CurrentSnapshot, units: Units) -> String {
    let sample = &snapshot.sample;
    let temp = sample.temp_c.round() as i64;
    let feels_like = sample.feels_like_c.round() as i64;
    let wind = sample.wind_speed_ms.round() as i64;
    let city = snapshot.city.as_deref().unwrap_or("your area");
    let unit = units.temp_unit();

    format!(
        "You are a professional fashion stylist. Current weather in {city}:\n\
         - Temperature: {temp}°{unit} (feels like {feels_like}°{unit})\n\
         - Weather: {condition} ({description})\n\
         - Humidity: {humidity}%\n\
         - Wind: {wind} {wind_unit}\n\
         \n\
         Suggest **3 outfit ideas for men** and **3 for women**. Each outfit should be practical, \
         seasonal, and stylish, with layered options if needed for the weather. Format exactly \
         like this, ensuring each outfit has a title and a list of components:\n\
         \n\
         ### {MEN_HEADER}\n\
         - **Casual Chic**:\n  - Lightweight hoodie\n  - Slim-fit jeans\n  - White sneakers\n\
         - **Smart Layered**:\n  - Oxford shirt\n  - Wool sweater\n  - Chinos\n\
         - **Sporty Comfort**:\n  - Moisture-wicking tee\n  - Joggers\n  - Running shoes\n\
         \n\
         ### {WOMEN_HEADER}\n\
         - **Effortless Elegance**:\n  - Oversized blouse\n  - High-waist jeans\n  - Trench coat\n\
         - **Cozy & Cute**:\n  - Knit sweater\n  - Pleated skirt\n  - Loafers\n\
         - **Athleisure Glow**:\n  - Cropped hoodie\n  - Leggings\n  - Chunky sneakers\n",
        condition = sample.weather_main.label(),
        description = sample.description,
        humidity = sample.humidity_pct,
        wind_unit = units.wind_unit(),
    )
}

/// Position of a section header in a reply
struct HeaderMark {
    name: &'static str,
    start: usize,
    content_start: usize,
}

fn header_marks(text: &str) -> Vec<HeaderMark> {
    let mut marks = Vec::new();
    let mut offset = 0;
    while let Some(pos) = text[offset..].find("###") {
        let start = offset + pos;
        let after_hashes = start + 3;
        let rest = &text[after_hashes..];
        let name_start = after_hashes + (rest.len() - rest.trim_start().len());
        let name = [MEN_HEADER, WOMEN_HEADER]
            .into_iter()
            .find(|name| text[name_start..].starts_with(name));
        if let Some(name) = name {
            marks.push(HeaderMark {
                name,
                start,
                content_start: name_start + name.len(),
            });
        }
        offset = after_hashes;
    }
    marks
}

/// Splits a reply on the `### Men's Outfits` / `### Women's Outfits` headers.
///
/// Each half runs from its first header to the next header (or the end of the
/// text). A missing header yields an empty half.
pub fn split_sections(text: &str) -> OutfitSections {
    let marks = header_marks(text);
    let section = |name: &str| -> String {
        marks
            .iter()
            .position(|mark| mark.name == name)
            .map(|i| {
                let end = marks.get(i + 1).map_or(text.len(), |next| next.start);
                text[marks[i].content_start..end].trim().to_string()
            })
            .unwrap_or_default()
    };

    OutfitSections {
        men: section(MEN_HEADER),
        women: section(WOMEN_HEADER),
    }
}

fn strip_bullet(line: &str) -> Option<&str> {
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .map(str::trim)
}

/// Parses one section into outfits.
///
/// A bullet with a bold title (`- **Title**: ...`) starts an outfit; plain
/// bullets that follow are its items. Text after the title's colon counts as
/// an item too. Lines before the first title are ignored.
pub fn parse_outfits(section: &str) -> Vec<Outfit> {
    let mut outfits: Vec<Outfit> = Vec::new();

    for line in section.lines() {
        let Some(bullet) = strip_bullet(line.trim()) else {
            continue;
        };

        if bullet.starts_with("**") {
            let cleaned = bullet.replace("**", "");
            let (title, rest) = match cleaned.split_once(':') {
                Some((title, rest)) => (title.trim(), rest.trim()),
                None => (cleaned.trim(), ""),
            };
            let mut items = Vec::new();
            if !rest.is_empty() {
                items.push(rest.to_string());
            }
            outfits.push(Outfit {
                title: title.to_string(),
                items,
            });
        } else if let Some(outfit) = outfits.last_mut() {
            if !bullet.is_empty() {
                outfit.items.push(bullet.to_string());
            }
        }
    }

    outfits
}

/// Client for the chat-completion endpoint
#[derive(Debug, Clone)]
pub struct OutfitClient {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    api_key: String,
}

impl OutfitClient {
    /// Create a new OutfitClient with default endpoint and model
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_key)
    }

    /// Create a new OutfitClient with a custom HTTP client
    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            api_key: api_key.into(),
        }
    }

    /// Create a client whose key is read from an environment variable
    ///
    /// # Arguments
    /// * `var` - Name of the variable holding the bearer token
    /// * `timeout` - Request timeout
    pub fn from_env(var: &str, timeout: Duration) -> Result<Self, OutfitError> {
        let api_key = std::env::var(var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| OutfitError::MissingApiKey(var.to_string()))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_key))
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Request body for a prompt
    pub fn request_for(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Send a prompt and return the reply text
    ///
    /// # Returns
    /// * `Ok(String)` - Content of the first choice
    /// * `Err(OutfitError)` - If the request, status or response body is bad
    pub async fn fetch_text(&self, prompt: &str) -> Result<String, OutfitError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_for(prompt))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(OutfitError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(OutfitError::EmptyContent)
    }

    /// Fetch and parse outfits for the current conditions
    ///
    /// Any failure is logged and mapped to `OutfitState::Unavailable`; there
    /// is no retry.
    pub async fn recommend(&self, snapshot: &CurrentSnapshot, units: Units) -> OutfitState {
        let prompt = build_prompt(snapshot, units);
        match self.fetch_text(&prompt).await {
            Ok(text) => {
                debug!(chars = text.len(), "received outfit recommendation");
                OutfitState::from_text(&text)
            }
            Err(e) => {
                warn!(error = %e, "outfit request failed");
                OutfitState::unavailable()
            }
        }
    }
}
