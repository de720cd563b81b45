//! End-to-end tests of the gateway router with fake provider and chat log ports.

use api_lib::{
    config::Config,
    web::{router, state::AppState},
};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use sungura_core::{
    domain::{ChatMessage, ChatRole, ContentPart, TokenUsage},
    ports::{ChatLogService, Completion, CompletionRequest, CompletionService, PortError, PortResult},
    routing::{DEFAULT_MULTIMODAL_MODEL, DEFAULT_TEXT_MODEL},
};
use tower::ServiceExt;

//=========================================================================================
// Fakes
//=========================================================================================

struct FakeCompletion {
    reply: Option<String>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl FakeCompletion {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for FakeCompletion {
    async fn complete(&self, request: &CompletionRequest) -> PortResult<Completion> {
        self.calls.lock().unwrap().push(request.clone());
        match &self.reply {
            Some(text) => Ok(Completion {
                text: text.clone(),
                usage: Some(TokenUsage {
                    prompt_tokens: 120,
                    completion_tokens: 80,
                    total_tokens: 200,
                }),
            }),
            None => Err(PortError::Provider("rate limit exceeded".to_string())),
        }
    }
}

#[derive(Default)]
struct FakeChatLog {
    fail: bool,
    attempts: Mutex<Vec<ChatMessage>>,
}

impl FakeChatLog {
    fn attempts(&self) -> Vec<ChatMessage> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatLogService for FakeChatLog {
    async fn save_chat_message(&self, message: ChatMessage) -> PortResult<()> {
        self.attempts.lock().unwrap().push(message);
        if self.fail {
            Err(PortError::Unexpected("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

fn test_config(api_key: Option<&str>) -> Config {
    let api_key = api_key.map(str::to_string);
    Config::from_lookup(|key| match key {
        "OPENROUTER_API_KEY" => api_key.clone(),
        _ => None,
    })
    .unwrap()
}

fn app(completion: Arc<FakeCompletion>, chat_log: Option<Arc<FakeChatLog>>) -> Router {
    let chat_log = chat_log.map(|log| log as Arc<dyn ChatLogService>);
    router(Arc::new(AppState {
        config: Arc::new(test_config(Some("sk-or-test"))),
        completion,
        chat_log,
    }))
}

async fn post_chat(app: Router, path: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: Router, path: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .uri(path)
        .header("authorization", "Bearer secret-token")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

//=========================================================================================
// POST /chat
//=========================================================================================

#[tokio::test]
async fn empty_request_is_rejected_without_side_effects() {
    let completion = FakeCompletion::replying("unused");
    let chat_log = Arc::new(FakeChatLog::default());

    for body in ["{}", "", r#"{"message": "", "image": "", "userId": "u-1"}"#] {
        let (status, json) =
            post_chat(app(completion.clone(), Some(chat_log.clone())), "/chat", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({ "error": "Message or image is required" }));
    }

    assert!(completion.calls().is_empty());
    assert!(chat_log.attempts().is_empty());
}

#[tokio::test]
async fn whitespace_message_is_still_forwarded() {
    let completion = FakeCompletion::replying("Ask me anything!");

    let (status, json) = post_chat(app(completion.clone(), None), "/chat", r#"{"message": "  "}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["response"], "Ask me anything!");
    let calls = completion.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, DEFAULT_TEXT_MODEL);
    assert_eq!(calls[0].parts, vec![ContentPart::Text("  ".to_string())]);
}

#[tokio::test]
async fn visual_text_request_uses_text_model_and_diagram_guidance() {
    let answer = "## Nitrogen Cycle\n\n```mermaid\ngraph TD\n  A[N2] --> B[NH3]\n```";
    let completion = FakeCompletion::replying(answer);

    let (status, json) = post_chat(
        app(completion.clone(), None),
        "/chat",
        r#"{"message": "Explain the nitrogen cycle", "learningStyle": "Visual", "courseContext": "Environmental Science"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["response"].as_str().unwrap().contains("```mermaid"));
    assert_eq!(json["usage"]["total_tokens"], 200);

    let calls = completion.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, DEFAULT_TEXT_MODEL);
    assert_eq!(calls[0].temperature, 0.7);
    assert!(calls[0].system_prompt.contains("Use Mermaid syntax for flowcharts"));
    assert!(calls[0].system_prompt.contains("- Course: Environmental Science"));
    assert_eq!(
        calls[0].parts,
        vec![ContentPart::Text("Explain the nitrogen cycle".to_string())]
    );
}

#[tokio::test]
async fn any_image_routes_to_multimodal_model() {
    let completion = FakeCompletion::replying("This is a mitochondrion.");

    post_chat(app(completion.clone(), None), "/chat", r#"{"image": "AAAA"}"#).await;
    post_chat(
        app(completion.clone(), None),
        "/chat",
        r#"{"message": "What is this?", "image": "AAAA"}"#,
    )
    .await;

    let calls = completion.calls();
    assert_eq!(calls.len(), 2);
    for call in &calls {
        assert_eq!(call.model, DEFAULT_MULTIMODAL_MODEL);
        assert!(call
            .parts
            .contains(&ContentPart::ImageUrl("data:image/jpeg;base64,AAAA".to_string())));
    }
    assert_eq!(calls[1].parts[0], ContentPart::Text("What is this?".to_string()));
}

#[tokio::test]
async fn exchange_is_logged_when_user_id_is_present() {
    let completion = FakeCompletion::replying("Photosynthesis turns light into sugar.");
    let chat_log = Arc::new(FakeChatLog::default());

    let (status, _) = post_chat(
        app(completion, Some(chat_log.clone())),
        "/api/chat",
        r#"{"image": "AAAA", "courseContext": "Biology", "userId": "user-42"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let saved = chat_log.attempts();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].role, ChatRole::User);
    assert_eq!(saved[0].content, "[Image Attachment]");
    assert_eq!(saved[1].role, ChatRole::Assistant);
    assert_eq!(saved[1].content, "Photosynthesis turns light into sugar.");
    for row in &saved {
        assert_eq!(row.user_id, "user-42");
        assert_eq!(row.course_context.as_deref(), Some("Biology"));
    }
}

#[tokio::test]
async fn nothing_is_logged_without_user_id() {
    let chat_log = Arc::new(FakeChatLog::default());

    let (status, _) = post_chat(
        app(FakeCompletion::replying("Hi!"), Some(chat_log.clone())),
        "/chat",
        r#"{"message": "Habari"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(chat_log.attempts().is_empty());
}

#[tokio::test]
async fn chat_log_failures_do_not_fail_the_request() {
    let chat_log = Arc::new(FakeChatLog {
        fail: true,
        ..FakeChatLog::default()
    });

    let (status, json) = post_chat(
        app(FakeCompletion::replying("Karibu!"), Some(chat_log.clone())),
        "/chat",
        r#"{"message": "Hello", "userId": "user-1"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["response"], "Karibu!");
    assert_eq!(chat_log.attempts().len(), 2);
}

#[tokio::test]
async fn provider_failure_returns_500_without_response() {
    let chat_log = Arc::new(FakeChatLog::default());

    let (status, json) = post_chat(
        app(FakeCompletion::failing(), Some(chat_log.clone())),
        "/chat",
        r#"{"message": "Hello", "userId": "user-1"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to get response from AI");
    assert_eq!(json["errorType"], "ProviderError");
    assert!(json["details"].as_str().unwrap().contains("rate limit exceeded"));
    assert!(json.get("response").is_none());

    // Only the user turn was logged; no assistant row for a failed call.
    let saved = chat_log.attempts();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].role, ChatRole::User);
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let completion = FakeCompletion::replying("unused");
    let (status, json) = post_chat(app(completion.clone(), None), "/chat", "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid JSON body");
    assert!(completion.calls().is_empty());
}

//=========================================================================================
// Other routes
//=========================================================================================

#[tokio::test]
async fn routes_are_mounted_under_every_prefix() {
    for prefix in ["", "/api", "/.netlify/functions/api"] {
        let (status, body) = get(app(FakeCompletion::replying(""), None), &format!("{}/health", prefix)).await;
        assert_eq!(status, StatusCode::OK, "prefix {:?}", prefix);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "OK");
        assert_eq!(json["apiKeySet"], true);
        assert_eq!(json["url"], "/health");
        assert!(json["timestamp"].as_str().is_some());
    }

    let (status, body) = get(app(FakeCompletion::replying(""), None), "/api").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Sungura API is running 🐰");
}

#[tokio::test]
async fn health_reports_missing_api_key() {
    let app = router(Arc::new(AppState {
        config: Arc::new(test_config(None)),
        completion: FakeCompletion::replying(""),
        chat_log: None,
    }));

    let (_, body) = get(app, "/health").await;
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["apiKeySet"], false);
}

#[tokio::test]
async fn debug_echoes_request_but_redacts_credentials() {
    let (status, body) = get(app(FakeCompletion::replying(""), None), "/api/debug").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["method"], "GET");
    assert_eq!(json["url"], "/debug");
    assert_eq!(json["originalUrl"], "/api/debug");
    assert_eq!(json["persistenceEnabled"], false);
    assert_eq!(json["headers"]["authorization"], "[redacted]");
    assert!(!body.contains("secret-token"));
}

#[tokio::test]
async fn playground_page_is_served_on_get_chat() {
    let (status, body) = get(app(FakeCompletion::replying(""), None), "/chat").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Sungura AI Playground"));
    assert!(body.contains("window.location.pathname"));
}
