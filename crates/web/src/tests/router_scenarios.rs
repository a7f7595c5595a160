//! Router behavior against a stubbed knowledge base.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use kbquery_core::{AppError, AppResult, ProviderErrorKind};
use kbquery_provider::{RetrievalClient, RetrievalRequest, RetrievalResponse};
use kbquery_query::{Interaction, QueryService, Session};
use kbquery_render::Renderer;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{router, AppState};

struct StubClient {
    outcome: Result<RetrievalResponse, ProviderErrorKind>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StubClient {
    fn answering(response: Value) -> Self {
        Self {
            outcome: Ok(serde_json::from_value(response).unwrap()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(kind: ProviderErrorKind) -> Self {
        Self {
            outcome: Err(kind),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn hanging(delay: Duration) -> Self {
        Self {
            outcome: Ok(RetrievalResponse::default()),
            delay,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl RetrievalClient for StubClient {
    fn provider_name(&self) -> &str {
        "stub"
    }

    fn knowledge_base_name(&self) -> &str {
        "contoso-multi-index-kb"
    }

    fn endpoint(&self) -> &str {
        "https://contoso.search.windows.net"
    }

    async fn retrieve(&self, _request: &RetrievalRequest) -> AppResult<RetrievalResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        match &self.outcome {
            Ok(response) => Ok(response.clone()),
            Err(kind) => Err(AppError::provider(*kind, "stubbed provider failure")),
        }
    }
}

fn contoso_response() -> Value {
    json!({
        "messages": [
            { "role": "assistant", "content": [{ "type": "text", "text": "Contoso offers auto & home insurance." }] }
        ],
        "references": [
            {
                "type": "searchIndex",
                "id": "0",
                "rerankerScore": 2.0,
                "docKey": "insurance-faq-3",
                "sourceData": { "title": "Insurance FAQ", "content": "Auto and home policies." }
            }
        ]
    })
}

fn app(client: Arc<StubClient>, timeout: Duration) -> Router {
    let service = QueryService::new(
        client,
        vec![
            "contoso-insurance-faq-index".to_string(),
            "contoso-retail-index".to_string(),
        ],
        timeout,
    );
    router(AppState::new(service, Renderer::new().unwrap()))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Url-encode form fields, escaping every byte outside the unreserved set.
fn form_body(fields: &[(&str, &str)]) -> String {
    fn encode(value: &str) -> String {
        value
            .bytes()
            .map(|b| match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    (b as char).to_string()
                }
                _ => format!("%{:02X}", b),
            })
            .collect()
    }

    fields
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Session history holding one earlier answered question.
async fn earlier_history(client: Arc<StubClient>) -> String {
    let (_, body) = send(
        app(client, Duration::from_secs(5)),
        post_json("/api/query", json!({ "question": "older question" })),
    )
    .await;
    let interaction: Interaction = serde_json::from_str(&body).unwrap();

    let mut session = Session::new();
    session.record(interaction);
    serde_json::to_string(&session).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_query_returns_interaction() {
    let client = Arc::new(StubClient::answering(contoso_response()));
    let (status, body) = send(
        app(client.clone(), Duration::from_secs(5)),
        post_json(
            "/api/query",
            json!({ "question": "What types of insurance policies does Contoso offer?" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["answers"][0], "Contoso offers auto & home insurance.");
    assert_eq!(json["citations"][0]["id"], 1);
    assert_eq!(json["citations"][0]["type"], "searchIndex");
    assert_eq!(json["citations"][0]["relevanceScore"], 0.5);
    assert!(json["timing"]["total"].is_number());
    assert_eq!(
        json["metadata"]["requestOverrides"]["knowledgeRetrievalOutputMode"],
        "knowledge base default"
    );
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_question_is_client_error() {
    let client = Arc::new(StubClient::answering(contoso_response()));
    let (status, body) = send(
        app(client.clone(), Duration::from_secs(5)),
        post_json("/api/query", json!({ "question": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "VALIDATION_ERROR");
    assert!(json["detail"].as_str().unwrap().contains("Question text is required."));
    assert!(json["timing"]["requestPreparation"].is_number());
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_override_key_is_rejected() {
    let client = Arc::new(StubClient::answering(contoso_response()));
    let (status, body) = send(
        app(client.clone(), Duration::from_secs(5)),
        post_json("/api/query", json!({ "question": "q", "topK": 5 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "BAD_REQUEST");
    assert!(json.get("timing").is_none());
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_out_of_enum_override_is_rejected() {
    let client = Arc::new(StubClient::answering(contoso_response()));
    let (status, _) = send(
        app(client.clone(), Duration::from_secs(5)),
        post_json(
            "/api/query",
            json!({ "question": "q", "retrievalReasoningEffort": "high" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let client = Arc::new(StubClient::answering(contoso_response()));
    let request = Request::builder()
        .method("POST")
        .uri("/api/query")
        .header("content-type", "application/json")
        .body(Body::from("{\"question\":"))
        .unwrap();
    let (status, body) = send(app(client, Duration::from_secs(5)), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("BAD_REQUEST"));
}

#[tokio::test]
async fn test_provider_failure_is_bad_gateway() {
    let client = Arc::new(StubClient::failing(ProviderErrorKind::Authentication));
    let (status, body) = send(
        app(client, Duration::from_secs(5)),
        post_json("/api/query", json!({ "question": "q" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "PROVIDER_AUTHENTICATION");
    assert!(json["detail"].as_str().unwrap().contains("stubbed provider failure"));
    assert!(json.get("answers").is_none());
}

#[tokio::test]
async fn test_provider_timeout_is_gateway_timeout() {
    let client = Arc::new(StubClient::hanging(Duration::from_secs(10)));
    let (status, body) = send(
        app(client, Duration::from_millis(50)),
        post_json("/api/query", json!({ "question": "q" })),
    )
    .await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "PROVIDER_TIMEOUT");
    assert!(json["timing"]["kbRetrieval"].as_f64().unwrap() >= 0.05);
}

#[tokio::test]
async fn test_config_and_health() {
    let client = Arc::new(StubClient::answering(contoso_response()));

    let (status, body) = send(app(client.clone(), Duration::from_secs(5)), get("/api/config")).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["knowledgeBaseName"], "contoso-multi-index-kb");
    assert_eq!(json["searchEndpoint"], "https://contoso.search.windows.net");
    assert_eq!(json["indexes"].as_array().unwrap().len(), 2);

    let (status, body) = send(app(client, Duration::from_secs(5)), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_index_page() {
    let client = Arc::new(StubClient::answering(contoso_response()));
    let (status, body) = send(app(client, Duration::from_secs(5)), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>contoso-multi-index-kb</h1>"));
    assert!(body.contains("contoso-retail-index"));
    assert!(body.contains("action=\"/ask\""));
}

#[tokio::test]
async fn test_form_ask_renders_citation_cards() {
    let client = Arc::new(StubClient::answering(contoso_response()));
    let (status, body) = send(
        app(client, Duration::from_secs(5)),
        post_form(
            "/ask",
            "question=What+does+Contoso+offer%3F&retrievalReasoningEffort=low&knowledgeRetrievalOutputMode=",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("What does Contoso offer?"));
    assert!(body.contains("Contoso offers auto &amp; home insurance."));
    assert!(body.contains("citation-searchIndex"));
    assert!(body.contains("Insurance FAQ"));
    assert!(body.contains(r#"<option value="low" selected>"#));
}

#[tokio::test]
async fn test_form_ask_renders_failure_state() {
    let client = Arc::new(StubClient::failing(ProviderErrorKind::Network));
    let (status, body) = send(
        app(client, Duration::from_secs(5)),
        post_form("/ask", "question=q"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("role=\"alert\""));
    assert!(body.contains("stubbed provider failure"));
    assert!(!body.contains("class=\"session\""));
}

#[tokio::test]
async fn test_form_ask_carries_session_history() {
    let client = Arc::new(StubClient::answering(contoso_response()));
    let history = earlier_history(client.clone()).await;

    let (status, body) = send(
        app(client, Duration::from_secs(5)),
        post_form(
            "/ask",
            &form_body(&[("question", "newer question"), ("history", &history)]),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"name="history""#));
    let results = &body[body.find("class=\"session\"").unwrap()..];
    let newer = results.find("newer question").unwrap();
    let older = results.find("older question").unwrap();
    assert!(newer < older);
    assert_eq!(results.matches("class=\"interaction\"").count(), 2);
}

#[tokio::test]
async fn test_form_failure_keeps_earlier_history() {
    let history = earlier_history(Arc::new(StubClient::answering(contoso_response()))).await;
    let client = Arc::new(StubClient::failing(ProviderErrorKind::Network));

    let (status, body) = send(
        app(client, Duration::from_secs(5)),
        post_form("/ask", &form_body(&[("question", "q"), ("history", &history)])),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("role=\"alert\""));
    assert!(body.contains("older question"));
    assert!(body.contains("class=\"session\""));
}

#[tokio::test]
async fn test_form_rejects_unreadable_history() {
    let client = Arc::new(StubClient::answering(contoso_response()));
    let (status, body) = send(
        app(client.clone(), Duration::from_secs(5)),
        post_form("/ask", &form_body(&[("question", "q"), ("history", "not json")])),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("BAD_REQUEST"));
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}
