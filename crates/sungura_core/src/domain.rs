//! crates/sungura_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// The fixed set of learning styles a student can be profiled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LearningStyle {
    Visual,
    Auditory,
    ReadingWriting,
    Kinesthetic,
    Standard,
}

impl LearningStyle {
    /// The four styles the onboarding quiz can produce. On a tie the later one wins.
    pub const QUIZ_STYLES: [LearningStyle; 4] = [
        LearningStyle::Visual,
        LearningStyle::Auditory,
        LearningStyle::ReadingWriting,
        LearningStyle::Kinesthetic,
    ];

    /// Parses the label sent by the client. Anything unrecognized is `Standard`.
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "Visual" => LearningStyle::Visual,
            "Auditory" => LearningStyle::Auditory,
            "Reading/Writing" => LearningStyle::ReadingWriting,
            "Kinesthetic" => LearningStyle::Kinesthetic,
            _ => LearningStyle::Standard,
        }
    }

    /// The wire label of this style.
    pub fn label(&self) -> &'static str {
        match self {
            LearningStyle::Visual => "Visual",
            LearningStyle::Auditory => "Auditory",
            LearningStyle::ReadingWriting => "Reading/Writing",
            LearningStyle::Kinesthetic => "Kinesthetic",
            LearningStyle::Standard => "Standard",
        }
    }
}

impl Default for LearningStyle {
    fn default() -> Self {
        LearningStyle::Standard
    }
}

impl fmt::Display for LearningStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One part of a multi-part user message sent to the completion provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    /// A `data:` URI wrapping the inline image.
    ImageUrl(String),
}

impl ContentPart {
    pub fn is_image(&self) -> bool {
        matches!(self, ContentPart::ImageUrl(_))
    }
}

/// Token accounting returned by the provider for one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Who authored a logged chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// A single row of the chat log, written once and never read back by the gateway.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: Uuid,
    pub user_id: String,
    pub role: ChatRole,
    pub content: String,
    pub course_context: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(
        user_id: impl Into<String>,
        role: ChatRole,
        content: impl Into<String>,
        course_context: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            role,
            content: content.into(),
            course_context,
            created_at: Utc::now(),
        }
    }
}
