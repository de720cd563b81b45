//! services/api/src/web/chat.rs
//!
//! The `POST /chat` pipeline: validate, log the user turn, build the prompt,
//! call the provider, log the answer, relay it.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use sungura_core::{
    diagram::extract_diagrams,
    domain::{ChatMessage, ChatRole},
    ports::CompletionRequest,
    prompt::{build_system_prompt, build_user_parts},
    routing::ModelRoute,
};
use tracing::{error, info, warn};

use crate::web::{
    protocol::{ChatRequestBody, ChatResponseBody, ErrorBody, MISSING_INPUT_MESSAGE},
    state::AppState,
};

pub const CHAT_TEMPERATURE: f32 = 0.7;

/// Logged in place of the text of an image-only turn.
pub const IMAGE_PLACEHOLDER: &str = "[Image Attachment]";

type ChatError = (StatusCode, Json<ErrorBody>);

/// Send one chat turn to the study buddy.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequestBody,
    responses(
        (status = 200, description = "The model's answer", body = ChatResponseBody),
        (status = 400, description = "Neither message nor image was supplied", body = ErrorBody),
        (status = 500, description = "The provider call failed", body = ErrorBody)
    )
)]
pub async fn chat_handler(
    State(app_state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ChatResponseBody>, ChatError> {
    let request = parse_body(&body)?;

    let message = non_empty(request.message.as_deref());
    let image = non_empty(request.image.as_deref());
    if message.is_none() && image.is_none() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::message(MISSING_INPUT_MESSAGE)),
        ));
    }

    let user_id = non_empty(request.user_id.as_deref());
    let course_context = non_empty(request.course_context.as_deref());

    if let Some(user_id) = user_id {
        save_turn(
            &app_state,
            user_id,
            ChatRole::User,
            message.unwrap_or(IMAGE_PLACEHOLDER),
            course_context,
        )
        .await;
    }

    let parts = build_user_parts(message, image);
    let route = ModelRoute::for_parts(&parts);
    let completion_request = CompletionRequest {
        model: app_state.config.models.model_for(route).to_string(),
        system_prompt: build_system_prompt(course_context, request.learning_style.as_deref()),
        parts,
        temperature: CHAT_TEMPERATURE,
    };

    info!(
        "[POST /chat] Calling model: {} with message length: {}",
        completion_request.model,
        message.map(str::len).unwrap_or(0)
    );

    let completion = match app_state.completion.complete(&completion_request).await {
        Ok(completion) => completion,
        Err(e) => {
            error!(
                "Chat completion failed ({}): {} [course: {:?}, style: {:?}, image: {}, user: {:?}]",
                e.kind(),
                e,
                course_context,
                request.learning_style,
                image.is_some(),
                user_id
            );
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::provider_failure(&e)),
            ));
        }
    };

    let diagrams = extract_diagrams(&completion.text);
    if !diagrams.is_empty() {
        info!("Response carries {} mermaid diagram(s)", diagrams.len());
    }

    if let Some(user_id) = user_id {
        save_turn(
            &app_state,
            user_id,
            ChatRole::Assistant,
            &completion.text,
            course_context,
        )
        .await;
    }

    Ok(Json(ChatResponseBody {
        response: completion.text,
        usage: completion.usage.map(Into::into),
    }))
}

/// An empty body is treated as `{}` so it fails validation rather than parsing.
fn parse_body(body: &[u8]) -> Result<ChatRequestBody, ChatError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ChatRequestBody::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        warn!("Rejected malformed chat request: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: "Invalid JSON body".to_string(),
                details: Some(e.to_string()),
                error_type: None,
            }),
        )
    })
}

/// Best-effort write to the chat log. Failures are logged and swallowed.
async fn save_turn(
    app_state: &AppState,
    user_id: &str,
    role: ChatRole,
    content: &str,
    course_context: Option<&str>,
) {
    let Some(chat_log) = &app_state.chat_log else {
        return;
    };
    let message = ChatMessage::new(user_id, role, content, course_context.map(str::to_string));
    if let Err(e) = chat_log.save_chat_message(message).await {
        error!("Failed to save {} message for user {}: {:?}", role.as_str(), user_id, e);
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
