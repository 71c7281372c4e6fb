use crate::models::{Article, City, Intent, Place};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the LLM API
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Empty completion")]
    EmptyCompletion,
}

/// Structured result of parsing a natural-language query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub city: City,
    pub vibe_slug: String,
    pub intent: Intent,
}

/// Client for the OpenAI-compatible chat completions API.
///
/// Treated as unreliable by contract: every public method has a
/// deterministic fallback, so a dead or misbehaving LLM can slow a
/// request down but never change whether it succeeds.
pub struct LlmClient {
    base_url: String,
    api_key: String,
    model: String,
    default_city: City,
    client: Client,
}

impl LlmClient {
    pub fn new(base_url: String, api_key: String, model: String, default_city: City) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            model,
            default_city,
            client,
        }
    }

    /// Extract `{city, vibe, intent}` from free text.
    ///
    /// Falls back to `{default city, lowercased text, spot}` whenever the
    /// API errors or returns something unparsable.
    pub async fn parse_query(&self, text: &str) -> ParsedQuery {
        match self.try_parse(text).await {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Query parse failed ({}), using deterministic fallback", e);
                self.fallback_parse(text)
            }
        }
    }

    fn fallback_parse(&self, text: &str) -> ParsedQuery {
        ParsedQuery {
            city: self.default_city,
            vibe_slug: text.trim().to_lowercase(),
            intent: Intent::Spot,
        }
    }

    async fn try_parse(&self, text: &str) -> Result<ParsedQuery, LlmError> {
        let content = self
            .chat(
                "Extract the city and vibe from the user's text. Return JSON with 'city', \
                 'vibe' and 'intent' (spot|route) fields. Default city is 'monterrey'.",
                text,
                0.1,
                100,
            )
            .await?;

        let parsed: Value =
            serde_json::from_str(content.trim()).map_err(|_| LlmError::EmptyCompletion)?;

        let fallback = self.fallback_parse(text);

        let city = parsed
            .get("city")
            .and_then(|c| c.as_str())
            .and_then(City::parse)
            .unwrap_or(fallback.city);

        let vibe_slug = parsed
            .get("vibe")
            .and_then(|v| v.as_str())
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .unwrap_or(fallback.vibe_slug);

        let intent = match parsed.get("intent").and_then(|i| i.as_str()) {
            Some("route") => Intent::Route,
            _ => Intent::Spot,
        };

        Ok(ParsedQuery {
            city,
            vibe_slug,
            intent,
        })
    }

    /// Short tagline for a place; template fallback on any failure
    pub async fn generate_tagline(&self, place: &Place, vibe_slug: &str) -> String {
        let prompt = format!(
            "Genera un tagline corto (3-12 palabras) para un lugar llamado {} con el vibe de {}.",
            place.name, vibe_slug
        );

        match self
            .chat(
                "Eres un experto en marketing digital y creas copys atractivos.",
                &prompt,
                0.7,
                150,
            )
            .await
        {
            Ok(content) if !content.trim().is_empty() => content.trim().to_string(),
            Ok(_) | Err(_) => format!("{} está padrísimo", place.name),
        }
    }

    /// Short article for a route; template fallback on any failure
    pub async fn generate_article(&self, places: &[Place], vibe_slug: &str) -> Article {
        let place_names = places
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let prompt = format!(
            "Genera un artículo corto (200-300 palabras) sobre una ruta de viaje con los \
             siguientes lugares: {}. El vibe general de la ruta es {}. Incluye un título \
             atractivo (10-80 caracteres).",
            place_names, vibe_slug
        );

        match self
            .chat("Eres un redactor de articulos de viajes.", &prompt, 0.7, 450)
            .await
        {
            Ok(content) => {
                // First line is the title, possibly with a markdown heading
                let mut lines = content.lines();
                let title = lines
                    .next()
                    .unwrap_or_default()
                    .trim_start_matches('#')
                    .trim()
                    .to_string();
                let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();

                if title.is_empty() || body.is_empty() {
                    fallback_article(places, vibe_slug)
                } else {
                    Article {
                        title,
                        content: body,
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Article generation failed ({}), using template", e);
                fallback_article(places, vibe_slug)
            }
        }
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LlmError::ApiError(format!(
                "chat completion returned {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        json.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or(LlmError::EmptyCompletion)
    }
}

fn fallback_article(places: &[Place], vibe_slug: &str) -> Article {
    let stops = places
        .iter()
        .map(|p| format!("- {}: {}", p.name, p.description))
        .collect::<Vec<_>>()
        .join("\n");

    Article {
        title: format!("Ruta {} imperdible", vibe_slug),
        content: format!("Una ruta con vibe {} por estos lugares:\n{}", vibe_slug, stops),
    }
}
