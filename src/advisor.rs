//! Advisory client
//!
//! Builds the profile-analysis prompt, runs one grounded, JSON-forced model
//! round trip, and decodes the reply into an AnalysisResult. Calling twice
//! with the same profile does the work twice; the model is non-deterministic
//! and nothing is cached.

use serde::Deserialize;
use tracing::info;

use crate::error::AdvisorError;
use crate::llm::{json::extract_json, Citation, GeminiClient, GenerativeModel, ModelRequest, Turn};
use crate::models::{AnalysisResult, GroundingSource, StockRecommendation, UserProfile};
use crate::Result;

/// Title applied to citations the backend reports without one.
pub const FALLBACK_SOURCE_TITLE: &str = "Market Source";

pub struct AdvisoryClient {
    model: Box<dyn GenerativeModel>,
}

impl AdvisoryClient {
    pub fn new(model: Box<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    pub fn gemini(api_key: String) -> Self {
        Self::new(Box::new(GeminiClient::new(api_key)))
    }

    /// One grounded round trip: profile in, decoded analysis out.
    ///
    /// The citation-derived `sources` list is applied after the decoded
    /// payload, so a `sources` key the model might emit in its own JSON
    /// never survives.
    pub async fn analyze(&self, profile: &UserProfile) -> Result<AnalysisResult> {
        let prompt = build_analysis_prompt(profile);

        info!(name = %profile.name, risk = %profile.risk_tolerance, "Requesting profile analysis");

        let reply = self
            .model
            .generate(ModelRequest {
                system_instruction: None,
                turns: vec![Turn::user(prompt)],
                force_json: true,
                grounding: true,
            })
            .await?;

        let payload = decode_analysis(&reply.text)?;
        let sources = normalize_sources(&reply.citations);

        info!(
            recommendations = payload.recommendations.len(),
            sources = sources.len(),
            "Analysis decoded"
        );

        Ok(AnalysisResult {
            risk_profile: payload.risk_profile,
            market_summary: payload.market_summary,
            recommendations: payload.recommendations,
            sources,
        })
    }
}

/// The model's own JSON document. `sources` is deliberately absent here:
/// the final value is always derived from citation metadata.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisPayload {
    risk_profile: String,
    market_summary: String,
    recommendations: Vec<StockRecommendation>,
}

fn decode_analysis(text: &str) -> Result<AnalysisPayload> {
    let document = extract_json(text).unwrap_or_else(|| text.trim().to_string());

    serde_json::from_str(&document).map_err(|e| {
        AdvisorError::DecodeError(format!(
            "Analysis reply is not valid JSON for the expected schema: {} | raw={}",
            e, text
        ))
    })
}

/// Citation → GroundingSource: empty or missing uris are dropped, missing
/// titles get the fallback literal. Order is preserved.
pub fn normalize_sources(citations: &[Citation]) -> Vec<GroundingSource> {
    citations
        .iter()
        .filter_map(|citation| {
            let uri = citation.uri.clone().unwrap_or_default();
            if uri.is_empty() {
                return None;
            }
            let title = match citation.title.as_deref() {
                Some(title) if !title.is_empty() => title.to_string(),
                _ => FALLBACK_SOURCE_TITLE.to_string(),
            };
            Some(GroundingSource { title, uri })
        })
        .collect()
}

fn build_analysis_prompt(profile: &UserProfile) -> String {
    format!(
        r#"Act as an expert Indian SEBI-registered financial advisor.
Analyze the following user profile:
Name: {name}
Age: {age}
Occupation: {occupation}
Monthly Income: ₹{income}
Risk Tolerance: {risk}

Based on current Indian market conditions (Sensex, Nifty 50), provide:
1. A short summary of their risk profile and investment strategy.
2. A list of exactly 5 top Indian stocks (NSE/BSE) that suit them right now.

For each stock, include a target price, 2-3 recent news highlights, and 2-3 key financial metrics (like P/E ratio, Market Cap, or YoY Growth).

Format your response as a JSON object strictly following this structure:
{{
  "riskProfile": "string explaining their profile",
  "marketSummary": "Current Indian market outlook for this user",
  "recommendations": [
    {{
      "symbol": "NSE/BSE Symbol",
      "companyName": "Full Name",
      "reason": "Detailed reasoning based on profile and market",
      "sector": "Sector Name",
      "confidence": 1-100,
      "targetPrice": "Estimated price with currency",
      "newsHighlights": ["Recent headline 1", "Recent headline 2"],
      "keyMetrics": ["Metric 1: Value", "Metric 2: Value"]
    }}
  ]
}}"#,
        name = profile.name,
        age = profile.age,
        occupation = profile.occupation,
        income = profile.monthly_income,
        risk = profile.risk_tolerance,
    )
}
