//! crates/sungura_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::{ChatMessage, ContentPart, TokenUsage};
use crate::profile::UserProfile;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
    #[error("Provider request timed out: {0}")]
    Timeout(String),
}

impl PortError {
    /// A short type name forwarded to clients for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            PortError::NotFound(_) => "NotFound",
            PortError::Unexpected(_) => "UnexpectedError",
            PortError::Unauthorized => "Unauthorized",
            PortError::Provider(_) => "ProviderError",
            PortError::MalformedResponse(_) => "MalformedResponse",
            PortError::Timeout(_) => "TimeoutError",
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Completion Request / Result
//=========================================================================================

/// Everything the provider needs for one chat turn.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub parts: Vec<ContentPart>,
    pub temperature: f32,
}

/// The first choice returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends a single chat completion request and returns the first choice.
    async fn complete(&self, request: &CompletionRequest) -> PortResult<Completion>;
}

#[async_trait]
pub trait ChatLogService: Send + Sync {
    /// Appends one message to the persistent chat log.
    async fn save_chat_message(&self, message: ChatMessage) -> PortResult<()>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn load(&self, user_id: Uuid) -> PortResult<Option<UserProfile>>;
    async fn save(&self, profile: &UserProfile) -> PortResult<()>;
    async fn clear(&self, user_id: Uuid) -> PortResult<()>;
}

/// A `ProfileStore` kept in process memory, for local development and tests.
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: Mutex<HashMap<Uuid, UserProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PortResult<std::sync::MutexGuard<'_, HashMap<Uuid, UserProfile>>> {
        self.profiles
            .lock()
            .map_err(|e| PortError::Unexpected(format!("profile store poisoned: {}", e)))
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn load(&self, user_id: Uuid) -> PortResult<Option<UserProfile>> {
        Ok(self.lock()?.get(&user_id).cloned())
    }

    async fn save(&self, profile: &UserProfile) -> PortResult<()> {
        self.lock()?.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn clear(&self, user_id: Uuid) -> PortResult<()> {
        self.lock()?.remove(&user_id);
        Ok(())
    }
}
