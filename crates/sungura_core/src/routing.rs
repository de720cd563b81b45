//! crates/sungura_core/src/routing.rs
//!
//! Picks the downstream model for a chat turn.

use crate::domain::ContentPart;

pub const DEFAULT_TEXT_MODEL: &str = "google/gemini-2.0-flash-exp:free";
pub const DEFAULT_MULTIMODAL_MODEL: &str = "anthropic/claude-3-sonnet";

/// Which class of model a turn needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRoute {
    Text,
    Multimodal,
}

impl ModelRoute {
    pub fn for_input(has_image: bool) -> Self {
        if has_image {
            ModelRoute::Multimodal
        } else {
            ModelRoute::Text
        }
    }

    pub fn for_parts(parts: &[ContentPart]) -> Self {
        Self::for_input(parts.iter().any(ContentPart::is_image))
    }
}

/// The concrete model identifiers behind each route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    pub text_model: String,
    pub multimodal_model: String,
}

impl ModelCatalog {
    pub fn new(text_model: impl Into<String>, multimodal_model: impl Into<String>) -> Self {
        Self {
            text_model: text_model.into(),
            multimodal_model: multimodal_model.into(),
        }
    }

    pub fn model_for(&self, route: ModelRoute) -> &str {
        match route {
            ModelRoute::Text => &self.text_model,
            ModelRoute::Multimodal => &self.multimodal_model,
        }
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_TEXT_MODEL, DEFAULT_MULTIMODAL_MODEL)
    }
}
