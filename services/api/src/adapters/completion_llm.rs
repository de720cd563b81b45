//! services/api/src/adapters/completion_llm.rs
//!
//! This module contains the adapter for the chat completion provider.
//! It implements the `CompletionService` port from the `core` crate against any
//! OpenAI-compatible endpoint (OpenRouter by default).

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, ImageUrlArgs,
    },
    Client,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use std::future::Future;
use sungura_core::domain::{ContentPart, TokenUsage};
use sungura_core::ports::{
    Completion, CompletionRequest, CompletionService, PortError, PortResult,
};
use tokio_retry::{strategy::FixedInterval, RetryIf};
use tracing::{info, warn};

use crate::config::Config;

const REFERER: &str = "https://sunguraai.netlify.app";
const APP_TITLE: &str = "Sungura AI Study Buddy";
const RETRY_DELAY_MS: u64 = 500;

/// Builds the provider client: base URL and key from the config, plus an HTTP
/// client carrying the request timeout and the attribution headers OpenRouter expects.
pub fn build_provider_client(config: &Config) -> Result<Client<OpenAIConfig>, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert("HTTP-Referer", HeaderValue::from_static(REFERER));
    headers.insert("X-Title", HeaderValue::from_static(APP_TITLE));

    let http_client = reqwest::Client::builder()
        .timeout(config.provider_timeout)
        .default_headers(headers)
        .build()?;

    // A missing key is not fatal at startup; the provider rejects the call instead.
    let openai_config = OpenAIConfig::new()
        .with_api_base(&config.provider_base_url)
        .with_api_key(config.provider_api_key.as_deref().unwrap_or_default());

    Ok(Client::with_config(openai_config).with_http_client(http_client))
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCompletionAdapter {
    client: Client<OpenAIConfig>,
    max_retries: usize,
}

impl OpenAiCompletionAdapter {
    /// Creates a new `OpenAiCompletionAdapter`.
    pub fn new(client: Client<OpenAIConfig>, max_retries: usize) -> Self {
        Self { client, max_retries }
    }

    fn build_request(request: &CompletionRequest) -> PortResult<CreateChatCompletionRequest> {
        let mut parts: Vec<ChatCompletionRequestUserMessageContentPart> =
            Vec::with_capacity(request.parts.len());
        for part in &request.parts {
            let part = match part {
                ContentPart::Text(text) => ChatCompletionRequestMessageContentPartTextArgs::default()
                    .text(text.as_str())
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
                    .into(),
                ContentPart::ImageUrl(url) => ChatCompletionRequestMessageContentPartImageArgs::default()
                    .image_url(
                        ImageUrlArgs::default()
                            .url(url.as_str())
                            .build()
                            .map_err(|e| PortError::Unexpected(e.to_string()))?,
                    )
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
                    .into(),
            };
            parts.push(part);
        }

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.system_prompt.as_str())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(ChatCompletionRequestUserMessageContent::Array(parts))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .messages(messages)
            .temperature(request.temperature)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

/// Only transport-level failures are worth another attempt.
fn is_transport_error(err: &OpenAIError) -> bool {
    matches!(err, OpenAIError::Reqwest(_))
}

/// Runs `call` once, then again up to `max_retries` times while it keeps failing
/// with a transport error. Any other error is returned straight away.
async fn with_transport_retries<T, F, Fut>(
    max_retries: usize,
    delay_ms: u64,
    call: F,
) -> Result<T, OpenAIError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, OpenAIError>>,
{
    let strategy = FixedInterval::from_millis(delay_ms).take(max_retries);
    RetryIf::spawn(strategy, call, |e: &OpenAIError| {
        let retry = is_transport_error(e);
        if retry {
            warn!("Transport error calling provider, retrying: {}", e);
        }
        retry
    })
    .await
}

fn to_port_error(err: OpenAIError) -> PortError {
    match &err {
        OpenAIError::Reqwest(e) if e.is_timeout() => PortError::Timeout(err.to_string()),
        OpenAIError::ApiError(api) => PortError::Provider(api.message.clone()),
        OpenAIError::JSONDeserialize(..) => PortError::MalformedResponse(err.to_string()),
        _ => PortError::Provider(err.to_string()),
    }
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for OpenAiCompletionAdapter {
    async fn complete(&self, request: &CompletionRequest) -> PortResult<Completion> {
        let chat_request = Self::build_request(request)?;
        let chat_request = &chat_request;
        let client = &self.client;

        let response = with_transport_retries(self.max_retries, RETRY_DELAY_MS, move || async move {
            client.chat().create(chat_request.clone()).await
        })
        .await
        .map_err(to_port_error)?;

        let usage = response.usage.as_ref().map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            PortError::MalformedResponse("Completion returned no choices.".to_string())
        })?;
        let text = choice.message.content.ok_or_else(|| {
            PortError::MalformedResponse("Completion choice contained no text content.".to_string())
        })?;

        info!(
            "Model {} answered with {} chars (tokens: {:?})",
            request.model,
            text.len(),
            usage.map(|u| u.total_tokens)
        );

        Ok(Completion { text, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// A real `reqwest` failure that never reaches the network.
    async fn transport_error() -> OpenAIError {
        let err = reqwest::Client::new().get("not a url").send().await.unwrap_err();
        OpenAIError::Reqwest(err)
    }

    fn api_error(message: &str) -> OpenAIError {
        let api = serde_json::from_value(serde_json::json!({ "message": message })).unwrap();
        OpenAIError::ApiError(api)
    }

    fn request(parts: Vec<ContentPart>) -> CompletionRequest {
        CompletionRequest {
            model: "vision-model".to_string(),
            system_prompt: "You are Sungura AI".to_string(),
            parts,
            temperature: 0.7,
        }
    }

    #[test]
    fn builds_system_and_multipart_user_message() {
        let built = OpenAiCompletionAdapter::build_request(&request(vec![
            ContentPart::Text("Explain this".to_string()),
            ContentPart::ImageUrl("data:image/jpeg;base64,AA==".to_string()),
        ]))
        .unwrap();

        let json = serde_json::to_value(&built).unwrap();
        assert_eq!(json["model"], "vision-model");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "You are Sungura AI");

        let content = &json["messages"][1]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "Explain this");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/jpeg;base64,AA==");
    }

    #[test]
    fn api_errors_map_to_provider_errors() {
        let err = OpenAIError::InvalidArgument("bad model".to_string());
        let mapped = to_port_error(err);
        assert_eq!(mapped.kind(), "ProviderError");
        assert!(!is_transport_error(&OpenAIError::InvalidArgument(String::new())));

        let mapped = to_port_error(api_error("Rate limit exceeded"));
        assert_eq!(mapped.kind(), "ProviderError");
        assert!(mapped.to_string().contains("Rate limit exceeded"));
    }

    #[test]
    fn undecodable_responses_map_to_malformed_response() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let mapped = to_port_error(OpenAIError::JSONDeserialize(json_err, "{oops".to_string()));
        assert_eq!(mapped.kind(), "MalformedResponse");
    }

    #[tokio::test]
    async fn transport_errors_are_retried_up_to_the_limit() {
        let attempts = AtomicUsize::new(0);
        let result: Result<(), _> = with_transport_retries(2, 0, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(transport_error().await) }
        })
        .await;

        assert!(matches!(result, Err(OpenAIError::Reqwest(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1 + 2);
    }

    #[tokio::test]
    async fn api_errors_are_not_retried() {
        let attempts = AtomicUsize::new(0);
        let result: Result<(), _> = with_transport_retries(2, 0, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(api_error("invalid model")) }
        })
        .await;

        assert_eq!(to_port_error(result.unwrap_err()).kind(), "ProviderError");
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn a_retry_that_succeeds_returns_the_answer() {
        let attempts = AtomicUsize::new(0);
        let result = with_transport_retries(2, 0, || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(transport_error().await)
                } else {
                    Ok("answer")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "answer");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn request_timeouts_map_to_timeout_errors() {
        // Connections land in the backlog but no response is ever written.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();

        let err = client.get(url).send().await.unwrap_err();
        assert!(err.is_timeout());

        let mapped = to_port_error(OpenAIError::Reqwest(err));
        assert_eq!(mapped.kind(), "TimeoutError");
    }
}
