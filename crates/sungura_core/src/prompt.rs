//! crates/sungura_core/src/prompt.rs
//!
//! Builds the system prompt and the multi-part user message for a chat turn.

use crate::domain::{ContentPart, LearningStyle};

const SYSTEM_TEMPLATE: &str = r#"You are Sungura AI, a personalized study buddy for East African students.

## Personality
- Encouraging, patient, and culturally aware
- Use occasional Swahili greetings (Habari, Karibu, Hongera) when appropriate

## Current Context
- Course: {course}
- Learning Style: {style}
{style_instruction}

## Response Format Guidelines
- Use clear headings (## or ###) to organize your response
- Use bullet points for lists
- Use **bold** for key terms
- Keep paragraphs short (2-3 sentences max)
- Add blank lines between sections for readability
- If explaining a concept, structure it as: Definition → Explanation → Example

## OCR & Document Parsing Instructions
- If an image is provided, your priority is to **extract and summarize** the academic content.
- For handwritten notes: Be patient with handwriting, transcribe clearly, and identify key terms.
- For textbooks/diagrams: Explain the relationships shown in the images (e.g., "The diagram shows the nitrogen cycle...").
- Format the extracted text into a structured study guide.

## Important
- Be concise but thorough
- Focus on academic excellence
- If an image is provided, describe and explain its content in detail, then offer to quiz the user on it."#;

const DEFAULT_COURSE: &str = "General Study";

impl LearningStyle {
    /// The extra guidance appended to the system prompt for this style.
    pub fn instruction(&self) -> Option<&'static str> {
        match self {
            LearningStyle::Visual => Some(
                "- Use Mermaid syntax for flowcharts (e.g., ```mermaid ... ```).\n- Use Markdown tables to explain concepts visually.",
            ),
            LearningStyle::Auditory => Some(
                "- Use a conversational, rhythmic tone. Use metaphors and explain things in a way that sounds good when read aloud.",
            ),
            LearningStyle::ReadingWriting => Some(
                "- Use detailed written explanations with bullet points and numbered lists.",
            ),
            LearningStyle::Kinesthetic => Some(
                "- Give practical, hands-on examples. Suggest activities or exercises to try.",
            ),
            LearningStyle::Standard => None,
        }
    }
}

/// Composes the system prompt for a course and the style label sent by the client.
///
/// The label is shown verbatim so the model sees what the student picked, while
/// the style instruction only comes from a recognized `LearningStyle`.
pub fn build_system_prompt(course_context: Option<&str>, style_label: Option<&str>) -> String {
    let course = non_blank(course_context).unwrap_or(DEFAULT_COURSE);
    let label = non_blank(style_label).unwrap_or(LearningStyle::Standard.label());
    let style = LearningStyle::parse(label);

    SYSTEM_TEMPLATE
        .replace("{course}", course)
        .replace("{style}", label)
        .replace("{style_instruction}", style.instruction().unwrap_or_default())
}

/// Builds the user message parts: text first, then the inline image. Only an
/// empty string counts as missing; whitespace is passed through as typed.
pub fn build_user_parts(message: Option<&str>, image_base64: Option<&str>) -> Vec<ContentPart> {
    let mut parts = Vec::with_capacity(2);
    if let Some(text) = message.filter(|m| !m.is_empty()) {
        parts.push(ContentPart::Text(text.to_string()));
    }
    if let Some(image) = image_base64.filter(|i| !i.is_empty()) {
        parts.push(ContentPart::ImageUrl(image_data_uri(image)));
    }
    parts
}

/// Wraps a base64 payload as a JPEG data URI.
pub fn image_data_uri(image_base64: &str) -> String {
    format!("data:image/jpeg;base64,{}", image_base64)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
