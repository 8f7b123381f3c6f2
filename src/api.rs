//! REST API server for the stock advisor
//!
//! Exposes analysis and chat via HTTP endpoints for a web frontend.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::advisor::AdvisoryClient;
use crate::chat::{ChatClient, FALLBACK_REPLY};
use crate::intake::validate_profile;
use crate::models::{ChatMessage, RiskTolerance, UserProfile};

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub name: String,
    pub age: u8,
    pub occupation: String,
    pub monthly_income: u64,
    /// Parsed leniently; unknown values fall back to Medium.
    pub risk_tolerance: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    pub profile: ProfileRequest,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub advisor: Arc<AdvisoryClient>,
    pub chat: Arc<ChatClient>,
}

/// =============================
/// Helpers
/// =============================

fn profile_from_request(req: &ProfileRequest) -> crate::Result<UserProfile> {
    let profile = UserProfile {
        name: req.name.trim().to_string(),
        age: req.age,
        occupation: req.occupation.trim().to_string(),
        monthly_income: req.monthly_income,
        risk_tolerance: RiskTolerance::parse(&req.risk_tolerance).unwrap_or_default(),
    };
    validate_profile(&profile)?;
    Ok(profile)
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Analysis Endpoint
/// =============================

async fn analyze_handler(
    State(state): State<ApiState>,
    Json(req): Json<ProfileRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let profile = match profile_from_request(&req) {
        Ok(profile) => profile,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(e.to_string())),
            )
        }
    };

    info!("Received analysis request for {}", profile.name);

    match state.advisor.analyze(&profile).await {
        Ok(analysis) => (StatusCode::OK, Json(ApiResponse::success(analysis))),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::error(format!("Analysis failed: {}", e))),
        ),
    }
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat_handler(
    State(state): State<ApiState>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let message = req.message.trim();
    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Message must not be empty".to_string())),
        );
    }

    let profile = match profile_from_request(&req.profile) {
        Ok(profile) => profile,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(e.to_string())),
            )
        }
    };

    // A failed send answers with the fallback reply rather than an error
    // status, so the frontend appends it to the transcript as a model turn.
    let answer = match state.chat.send(message, &req.history, &profile).await {
        Ok(answer) => answer,
        Err(e) => {
            warn!("Chat send failed, substituting fallback reply: {}", e);
            FALLBACK_REPLY.to_string()
        }
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({ "answer": answer }))),
    )
}

/// =============================
/// Router
/// =============================

pub fn create_router(advisor: Arc<AdvisoryClient>, chat: Arc<ChatClient>) -> Router {
    let state = ApiState { advisor, chat };

    Router::new()
        .route("/health", axum::routing::get(health))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/chat", post(chat_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    advisor: Arc<AdvisoryClient>,
    chat: Arc<ChatClient>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(advisor, chat);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(risk: &str) -> ProfileRequest {
        ProfileRequest {
            name: "Asha".to_string(),
            age: 31,
            occupation: "Engineer".to_string(),
            monthly_income: 150_000,
            risk_tolerance: risk.to_string(),
        }
    }

    #[test]
    fn profile_parses_with_lenient_risk() {
        let profile = profile_from_request(&request("moderate")).unwrap();
        assert_eq!(profile.risk_tolerance, RiskTolerance::Medium);

        let profile = profile_from_request(&request("HIGH")).unwrap();
        assert_eq!(profile.risk_tolerance, RiskTolerance::High);

        // Unknown risk strings fall back to Medium rather than failing.
        let profile = profile_from_request(&request("yolo")).unwrap();
        assert_eq!(profile.risk_tolerance, RiskTolerance::Medium);
    }

    #[test]
    fn invalid_profiles_are_rejected() {
        let mut req = request("low");
        req.age = 12;
        assert!(profile_from_request(&req).is_err());

        let mut req = request("low");
        req.name = "   ".to_string();
        assert!(profile_from_request(&req).is_err());
    }

    #[test]
    fn chat_request_history_defaults_to_empty() {
        let json = r#"{
            "message": "What about TCS?",
            "profile": {
                "name": "Asha",
                "age": 31,
                "occupation": "Engineer",
                "monthlyIncome": 150000,
                "riskTolerance": "High"
            }
        }"#;

        let req: ChatRequest = serde_json::from_str(json).unwrap();
        assert!(req.history.is_empty());
        assert_eq!(req.message, "What about TCS?");
    }
}
