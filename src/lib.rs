//! ArthaAI Advisor
//!
//! A stock-advisory engine that:
//! - Collects a user's financial profile
//! - Requests grounded stock recommendations from Google's Gemini API
//! - Decodes the JSON reply into a typed analysis with cited sources
//! - Hosts a follow-up chat personalized with the same profile
//!
//! SESSION FLOW:
//! INTAKE → ANALYZE → DASHBOARD → CHAT

pub mod advisor;
pub mod api;
pub mod chat;
pub mod dashboard;
pub mod error;
pub mod intake;
pub mod llm;
pub mod models;
pub mod state;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use state::{reduce, Action, AppState, Effect};
