//! Gemini transport: non-streaming `generateContent` via Google AI API.
//!
//! Key differences from a plain chat call:
//! - API key in the `x-goog-api-key` header, never in the URL
//! - `responseMimeType: "application/json"` + `responseSchema` constrain output
//! - Images go in as `inlineData` parts ahead of the instruction text
//! - Grounded requests add the `googleSearch` tool
//! - Token usage in `usageMetadata`

use async_trait::async_trait;
use std::time::Duration;

use super::prompts::PromptRequest;
use super::provider;
use super::transport::Transport;
use crate::config::Settings;
use crate::error::GatewayError;

/// Gemini Flash pricing, used for the cost estimate in logs only.
/// Input:  $0.10 per 1M tokens
/// Output: $0.40 per 1M tokens
const INPUT_COST_PER_MILLION: f64 = 0.10;
const OUTPUT_COST_PER_MILLION: f64 = 0.40;

pub struct GeminiTransport {
    client: reqwest::Client,
    settings: Settings,
    api_key: Option<String>,
}

impl GeminiTransport {
    /// Build a transport using the resolved credential.
    pub fn new(settings: Settings) -> Result<Self, GatewayError> {
        let api_key = provider::resolve_api_key();
        Self::with_api_key(settings, api_key)
    }

    pub fn with_api_key(settings: Settings, api_key: Option<String>) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            settings,
            api_key,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            model
        )
    }
}

/// Build the `generateContent` request body.
pub fn request_body(request: &PromptRequest, temperature: Option<f32>) -> serde_json::Value {
    let mut parts = Vec::new();
    if let Some(image) = &request.image {
        parts.push(serde_json::json!({
            "inlineData": {
                "mimeType": image.mime_type,
                "data": image.to_base64(),
            }
        }));
    }
    parts.push(serde_json::json!({ "text": request.instruction }));

    let mut generation_config = serde_json::json!({
        "responseMimeType": "application/json",
        "responseSchema": request.schema.to_gemini(),
    });
    if let Some(t) = temperature {
        generation_config["temperature"] = serde_json::json!(t);
    }

    let mut body = serde_json::json!({
        "contents": [
            {
                "role": "user",
                "parts": parts,
            }
        ],
        "generationConfig": generation_config,
    });
    if request.grounding {
        body["tools"] = serde_json::json!([{ "googleSearch": {} }]);
    }
    body
}

#[async_trait]
impl Transport for GeminiTransport {
    async fn generate(&self, request: &PromptRequest) -> Result<String, GatewayError> {
        let api_key = match &self.api_key {
            Some(key) if !key.is_empty() => key,
            _ => {
                log::warn!("[LLM] No GEMINI_API_KEY set");
                return Err(GatewayError::Transport(
                    "No Gemini API key configured".to_string(),
                ));
            }
        };

        let model = self.settings.model_for(request.tier);
        log::info!("[LLM] Task: {}", request.kind);
        log::info!("[LLM] Model: {}", model);
        if request.grounding {
            log::info!("[LLM] Grounding: googleSearch");
        }

        let start = std::time::Instant::now();

        let response = self
            .client
            .post(self.endpoint(model))
            .header("content-type", "application/json")
            .header("x-goog-api-key", api_key)
            .json(&request_body(request, self.settings.temperature))
            .send()
            .await
            .map_err(|e| {
                let err = GatewayError::from(e);
                log::error!("[LLM] HTTP request failed: {}", err);
                err
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            log::error!(
                "[LLM] Gemini API returned {}: {}",
                status,
                super::preview(&body, 200)
            );
            return Err(GatewayError::Transport(format!(
                "Gemini API error ({})",
                status
            )));
        }

        log::info!("[LLM] API latency: {}ms", start.elapsed().as_millis());

        let parsed: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| GatewayError::Malformed(format!("invalid API envelope: {}", e)))?;

        if let Some(usage) = parsed.get("usageMetadata") {
            let input_tokens = usage["promptTokenCount"].as_u64().unwrap_or(0);
            let output_tokens = usage["candidatesTokenCount"].as_u64().unwrap_or(0);
            log::info!("[LLM] Input tokens: {}", input_tokens);
            log::info!("[LLM] Output tokens: {}", output_tokens);
            let cost = (input_tokens as f64 * INPUT_COST_PER_MILLION
                + output_tokens as f64 * OUTPUT_COST_PER_MILLION)
                / 1_000_000.0;
            log::info!("[LLM] Estimated cost: ${:.6}", cost);
        }

        Ok(extract_gemini_text(&parsed).unwrap_or_default())
    }
}

/// Extract the text content from a Gemini response.
///
/// Gemini format: candidates[0].content.parts[*].text. Grounded answers can
/// be split over several parts, so all text parts are concatenated.
pub fn extract_gemini_text(json: &serde_json::Value) -> Option<String> {
    let parts = json
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    Some(text)
}
