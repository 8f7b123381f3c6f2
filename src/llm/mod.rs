//! Model backend seam
//!
//! The advisory and chat clients talk to the external model through the
//! `GenerativeModel` trait, so the Gemini transport can be swapped for a
//! scripted backend in tests.

pub mod gemini;
pub mod json;

pub use gemini::GeminiClient;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::AdvisorError;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

/// One conversation turn, oldest first.
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }
}

/// Everything one model call needs, passed as plain data. There is no
/// session object; callers rebuild this per request.
#[derive(Debug, Clone, Default)]
pub struct ModelRequest {
    pub system_instruction: Option<String>,
    pub turns: Vec<Turn>,
    /// Force the reply body to be a JSON document.
    pub force_json: bool,
    /// Enable search grounding; citations come back in the reply.
    pub grounding: bool,
}

/// Raw citation as reported by the backend, before normalization.
#[derive(Debug, Clone, Default)]
pub struct Citation {
    pub title: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ModelReply {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl ModelReply {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
pub trait GenerativeModel: Send + Sync {
    /// One request, one reply. No retry, no caching.
    async fn generate(&self, request: ModelRequest) -> Result<ModelReply>;
}

#[async_trait::async_trait]
impl<T: GenerativeModel + ?Sized> GenerativeModel for Arc<T> {
    async fn generate(&self, request: ModelRequest) -> Result<ModelReply> {
        (**self).generate(request).await
    }
}

/// Scripted backend: returns a fixed reply (or a fixed failure) and records
/// what it was asked. Used by the client tests.
pub struct MockModel {
    reply: std::result::Result<ModelReply, String>,
    calls: Arc<AtomicUsize>,
    last_request: Mutex<Option<ModelRequest>>,
}

impl MockModel {
    pub fn replying(reply: ModelReply) -> Self {
        Self {
            reply: Ok(reply),
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ModelRequest> {
        self.last_request.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait::async_trait]
impl GenerativeModel for MockModel {
    async fn generate(&self, request: ModelRequest) -> Result<ModelReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().expect("mock lock poisoned") = Some(request);

        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(message) => Err(AdvisorError::ApiError(message.clone())),
        }
    }
}
