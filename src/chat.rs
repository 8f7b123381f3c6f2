//! Follow-up chat client
//!
//! Stateless per call: the conversation context (persona instruction, prior
//! turns, grounding flag) is rebuilt from plain values on every send, so no
//! session object outlives a request.

use tracing::info;

use crate::llm::{GeminiClient, GenerativeModel, ModelRequest, Turn, TurnRole};
use crate::models::{ChatMessage, ChatRole, UserProfile};
use crate::Result;

/// Reply the caller substitutes into the transcript when a send fails.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

pub struct ChatClient {
    model: Box<dyn GenerativeModel>,
}

impl ChatClient {
    pub fn new(model: Box<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    pub fn gemini(api_key: String) -> Self {
        Self::new(Box::new(GeminiClient::new(api_key)))
    }

    /// Send one message against the accumulated transcript.
    ///
    /// The message must be non-empty after trimming; the caller enforces
    /// that (and the one-send-at-a-time rule) before calling. On error the
    /// caller appends FALLBACK_REPLY instead of propagating.
    pub async fn send(
        &self,
        message: &str,
        history: &[ChatMessage],
        profile: &UserProfile,
    ) -> Result<String> {
        let mut turns: Vec<Turn> = history
            .iter()
            .map(|msg| Turn {
                role: match msg.role {
                    ChatRole::User => TurnRole::User,
                    ChatRole::Model => TurnRole::Model,
                },
                text: msg.text.clone(),
            })
            .collect();
        turns.push(Turn::user(message));

        info!(history_len = history.len(), "Sending chat message");

        let reply = self
            .model
            .generate(ModelRequest {
                system_instruction: Some(system_instruction(profile)),
                turns,
                force_json: false,
                grounding: true,
            })
            .await?;

        Ok(reply.text)
    }
}

/// ArthaAI persona, personalized with the profile. Scoped to Indian markets
/// and required to carry a financial disclaimer.
pub fn system_instruction(profile: &UserProfile) -> String {
    format!(
        "You are ArthaAI, a specialized Indian Stock Market expert. \
         User: {}, Age: {}, Occupation: {}. \
         Always focus on the Indian market (NSE, BSE). \
         Be helpful, accurate, but include a financial disclaimer. \
         Use Google Search for real-time data.",
        profile.name, profile.age, profile.occupation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdvisorError;
    use crate::llm::{MockModel, ModelReply};
    use crate::models::RiskTolerance;
    use std::sync::Arc;

    fn test_profile() -> UserProfile {
        UserProfile {
            name: "Ravi".to_string(),
            age: 45,
            occupation: "Teacher".to_string(),
            monthly_income: 60_000,
            risk_tolerance: RiskTolerance::Low,
        }
    }

    #[tokio::test]
    async fn send_seeds_history_and_persona() {
        let mock = Arc::new(MockModel::replying(ModelReply::text_only(
            "TCS looks stable.",
        )));
        let client = ChatClient::new(Box::new(Arc::clone(&mock)));

        let history = vec![
            ChatMessage::user("Is IT a good sector?"),
            ChatMessage::model("Broadly yes, with caveats."),
        ];

        let reply = client
            .send("What about TCS?", &history, &test_profile())
            .await
            .unwrap();
        assert_eq!(reply, "TCS looks stable.");

        let request = mock.last_request().unwrap();
        assert_eq!(request.turns.len(), 3);
        assert_eq!(request.turns[2].text, "What about TCS?");
        assert!(request.grounding);
        assert!(!request.force_json);

        let instruction = request.system_instruction.unwrap();
        assert!(instruction.contains("ArthaAI"));
        assert!(instruction.contains("Ravi"));
        assert!(instruction.contains("disclaimer"));
        assert!(instruction.contains("NSE, BSE"));
    }

    #[tokio::test]
    async fn send_propagates_backend_failure() {
        let client = ChatClient::new(Box::new(MockModel::failing("offline")));
        let err = client
            .send("hello", &[], &test_profile())
            .await
            .unwrap_err();
        assert!(matches!(err, AdvisorError::ApiError(_)));
    }

    #[test]
    fn fallback_reply_is_the_exact_literal() {
        assert_eq!(FALLBACK_REPLY, "Sorry, I encountered an error. Please try again.");
    }
}
