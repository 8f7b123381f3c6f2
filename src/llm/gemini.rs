//! Gemini API backend
//!
//! One generateContent round trip per call, with optional search grounding
//! and JSON-forced replies. Uses a long-lived reqwest::Client for connection
//! pooling.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

use crate::error::AdvisorError;
use crate::llm::{Citation, GenerativeModel, ModelReply, ModelRequest, TurnRole};

const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Model is taken from GEMINI_MODEL when set, otherwise the default.
    pub fn new(api_key: String) -> Self {
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::with_model(api_key, &model)
    }

    pub fn with_model(api_key: String, model: &str) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url: format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                model
            ),
        }
    }
}

#[async_trait::async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: ModelRequest) -> crate::Result<ModelReply> {
        if self.api_key.is_empty() {
            return Err(AdvisorError::ApiError(
                "GEMINI_API_KEY not configured".to_string(),
            ));
        }

        let url = format!("{}?key={}", self.base_url, self.api_key);
        let body = build_wire_request(&request);

        info!(
            grounding = request.grounding,
            force_json = request.force_json,
            "Calling Gemini API"
        );

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            error!("Gemini API request failed: {}", e);
            AdvisorError::ApiError(format!("Gemini API error: {}", e))
        })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error response: {}", error_text);
            return Err(AdvisorError::ApiError(format!(
                "Gemini API error: {}",
                error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            AdvisorError::ApiError(format!("Gemini parse error: {}", e))
        })?;

        let candidate = gemini_response.candidates.into_iter().next().ok_or_else(|| {
            AdvisorError::ApiError("No response from Gemini API".to_string())
        })?;

        let text = candidate
            .content
            .parts
            .into_iter()
            .next()
            .map(|part| part.text)
            .ok_or_else(|| AdvisorError::ApiError("Empty response from Gemini".to_string()))?;

        let citations = candidate
            .grounding_metadata
            .map(|metadata| {
                metadata
                    .grounding_chunks
                    .into_iter()
                    .map(|chunk| {
                        let web = chunk.web.unwrap_or_default();
                        Citation {
                            title: web.title,
                            uri: web.uri,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(ModelReply { text, citations })
    }
}

fn build_wire_request(request: &ModelRequest) -> GeminiRequest {
    let contents = request
        .turns
        .iter()
        .map(|turn| Content {
            role: Some(
                match turn.role {
                    TurnRole::User => "user",
                    TurnRole::Model => "model",
                }
                .to_string(),
            ),
            parts: vec![Part {
                text: turn.text.clone(),
            }],
        })
        .collect();

    GeminiRequest {
        contents,
        system_instruction: request.system_instruction.as_ref().map(|text| {
            SystemInstruction {
                parts: vec![Part { text: text.clone() }],
            }
        }),
        tools: request.grounding.then(|| {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        }),
        generation_config: request.force_json.then(|| GenerationConfig {
            response_mime_type: "application/json".to_string(),
        }),
    }
}

//
// ================= Wire Types =================
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize, Default)]
struct WebSource {
    title: Option<String>,
    uri: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Turn;

    #[test]
    fn test_request_serialization() {
        let request = ModelRequest {
            system_instruction: Some("You are a financial advisor".to_string()),
            turns: vec![Turn::user("What is RSI?")],
            force_json: true,
            grounding: true,
        };

        let json = serde_json::to_string(&build_wire_request(&request)).unwrap();
        assert!(json.contains("What is RSI?"));
        assert!(json.contains("\"systemInstruction\""));
        assert!(json.contains("\"googleSearch\":{}"));
        assert!(json.contains("\"responseMimeType\":\"application/json\""));
    }

    #[test]
    fn plain_requests_omit_tools_and_config() {
        let request = ModelRequest {
            system_instruction: None,
            turns: vec![Turn::user("hi")],
            force_json: false,
            grounding: false,
        };

        let json = serde_json::to_string(&build_wire_request(&request)).unwrap();
        assert!(!json.contains("tools"));
        assert!(!json.contains("generationConfig"));
        assert!(!json.contains("systemInstruction"));
    }

    #[test]
    fn response_decodes_grounding_chunks() {
        let raw = r#"{
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "{}" }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "title": "NSE India", "uri": "https://nseindia.com" } },
                        { "web": { "uri": "https://moneycontrol.com" } },
                        { "web": null }
                    ]
                }
            }]
        }"#;

        let response: GeminiResponse = serde_json::from_str(raw).unwrap();
        let candidate = &response.candidates[0];
        let metadata = candidate.grounding_metadata.as_ref().unwrap();
        assert_eq!(metadata.grounding_chunks.len(), 3);
        assert_eq!(
            metadata.grounding_chunks[0].web.as_ref().unwrap().title.as_deref(),
            Some("NSE India")
        );
        assert!(metadata.grounding_chunks[1].web.as_ref().unwrap().title.is_none());
    }

    #[test]
    fn response_without_metadata_decodes() {
        let raw = r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "hello" }] }
            }]
        }"#;

        let response: GeminiResponse = serde_json::from_str(raw).unwrap();
        assert!(response.candidates[0].grounding_metadata.is_none());
    }
}
