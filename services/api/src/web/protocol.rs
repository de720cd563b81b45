//! services/api/src/web/protocol.rs
//!
//! Defines the JSON contract between the mobile client and the gateway.

use serde::{Deserialize, Serialize};
use sungura_core::domain::TokenUsage;
use sungura_core::ports::PortError;
use utoipa::ToSchema;

pub const MISSING_INPUT_MESSAGE: &str = "Message or image is required";
pub const PROVIDER_FAILURE_MESSAGE: &str = "Failed to get response from AI";

//=========================================================================================
// Sent FROM the Client TO the Server
//=========================================================================================

/// One chat turn. At least one of `message` or `image` must be non-empty.
#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatRequestBody {
    pub message: Option<String>,
    /// Base64-encoded JPEG, without the `data:` prefix.
    pub image: Option<String>,
    pub course_context: Option<String>,
    /// One of `Visual`, `Auditory`, `Reading/Writing`, `Kinesthetic`, `Standard`.
    pub learning_style: Option<String>,
    pub user_id: Option<String>,
}

//=========================================================================================
// Sent FROM the Server TO the Client
//=========================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct UsageBody {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl From<TokenUsage> for UsageBody {
    fn from(usage: TokenUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ChatResponseBody {
    /// Markdown text, possibly with fenced ```mermaid blocks.
    pub response: String,
    pub usage: Option<UsageBody>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl ErrorBody {
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            error_type: None,
        }
    }

    pub fn provider_failure(err: &PortError) -> Self {
        Self {
            error: PROVIDER_FAILURE_MESSAGE.to_string(),
            details: Some(err.to_string()),
            error_type: Some(err.kind().to_string()),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub api_key_set: bool,
    pub url: String,
}
