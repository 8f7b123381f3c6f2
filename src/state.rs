//! Application shell state
//!
//! All session state lives in one AppState value and every transition goes
//! through `reduce`, so the loading and chat-busy invariants are enforced in
//! one place. Reducing returns the effects the caller must run (network
//! calls stay outside the reducer).

use crate::models::{AnalysisResult, ChatMessage, UserProfile};

/// Session state. Replaced or transitioned, never mutated ad hoc.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub profile: Option<UserProfile>,
    /// True from profile submission until the analysis resolves, either way.
    pub loading: bool,
    /// At most one live analysis; replaced wholesale on re-analysis.
    pub analysis: Option<AnalysisResult>,
    /// Append-only transcript, scoped to the current profile session.
    pub transcript: Vec<ChatMessage>,
    /// Serializes chat sends: a new send is not issued while one is
    /// outstanding.
    pub chat_busy: bool,
}

#[derive(Debug, Clone)]
pub enum Action {
    SubmitProfile(UserProfile),
    AnalysisReady(AnalysisResult),
    AnalysisFailed,
    UserMessage(String),
    ModelReply(String),
    Reset,
}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    RequestAnalysis(UserProfile),
    SendChat(String),
}

pub fn reduce(state: &mut AppState, action: Action) -> Vec<Effect> {
    match action {
        Action::SubmitProfile(profile) => {
            *state = AppState {
                profile: Some(profile.clone()),
                loading: true,
                ..AppState::default()
            };
            vec![Effect::RequestAnalysis(profile)]
        }
        Action::AnalysisReady(analysis) => {
            state.analysis = Some(analysis);
            state.loading = false;
            Vec::new()
        }
        Action::AnalysisFailed => {
            state.loading = false;
            Vec::new()
        }
        Action::UserMessage(text) => {
            let text = text.trim();
            if text.is_empty() || state.chat_busy {
                return Vec::new();
            }
            state.transcript.push(ChatMessage::user(text));
            state.chat_busy = true;
            vec![Effect::SendChat(text.to_string())]
        }
        Action::ModelReply(text) => {
            state.transcript.push(ChatMessage::model(text));
            state.chat_busy = false;
            Vec::new()
        }
        Action::Reset => {
            *state = AppState::default();
            Vec::new()
        }
    }
}
