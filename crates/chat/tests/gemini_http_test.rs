//! End-to-end tests for the chat session against a local stand-in for the
//! Gemini `generateContent` endpoint.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use serde_json::Value;

use quibly_chat::{ChatSession, SendOutcome};
use quibly_core::Role;
use quibly_ingest::{DocumentUpload, ExtractionError, PdfBackend, PdfPages, PDF_MIME};
use quibly_llm::{GeminiProvider, ERROR_FALLBACK, NO_ANSWER_FALLBACK};

const MODEL: &str = "gemini-test";
const API_KEY: &str = "test-key";

// ── Mock server ──────────────────────────────────────────────────────

#[derive(Clone)]
struct MockGemini {
    status: StatusCode,
    body: &'static str,
    seen: Arc<Mutex<Vec<(String, Value)>>>,
}

async fn handle(State(mock): State<MockGemini>, uri: Uri, body: String) -> impl IntoResponse {
    let json: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    mock.seen.lock().unwrap().push((uri.to_string(), json));
    (
        mock.status,
        [(header::CONTENT_TYPE, "application/json")],
        mock.body,
    )
}

/// Serve `body` with `status` on an ephemeral port; returns the base URL and
/// the log of received (uri, json body) pairs.
async fn spawn_mock(status: StatusCode, body: &'static str) -> (String, Arc<Mutex<Vec<(String, Value)>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mock = MockGemini {
        status,
        body,
        seen: seen.clone(),
    };
    let app = Router::new().fallback(handle).with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), seen)
}

fn session_for(base_url: &str) -> ChatSession {
    let provider = GeminiProvider::new(API_KEY.into(), MODEL.into(), base_url.to_string());
    ChatSession::new(Box::new(provider)).with_backend(Box::new(TwoPageBackend))
}

struct TwoPageBackend;

struct TwoPages;

impl PdfBackend for TwoPageBackend {
    fn open(&self, _bytes: &[u8]) -> Result<Box<dyn PdfPages>, ExtractionError> {
        Ok(Box::new(TwoPages))
    }
}

impl PdfPages for TwoPages {
    fn page_count(&self) -> u32 {
        2
    }

    fn text_items(&self, page_number: u32) -> Result<Vec<String>, ExtractionError> {
        Ok(match page_number {
            1 => vec!["Hello".to_string()],
            _ => vec!["World".to_string()],
        })
    }
}

const ANSWER: &str = r#"{"candidates":[{"content":{"parts":[{"text":"Hello from the model"}],"role":"model"}}]}"#;

// ── Tests ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_successful_reply_appended() {
    let (base_url, seen) = spawn_mock(StatusCode::OK, ANSWER).await;
    let mut chat = session_for(&base_url);

    let outcome = chat.send_message("Hi").await;
    match outcome {
        SendOutcome::Replied(message) => {
            assert_eq!(message.role(), Role::Assistant);
            assert_eq!(message.content(), "Hello from the model");
        }
        other => panic!("expected a reply, got {other:?}"),
    }
    assert_eq!(chat.messages().len(), 2);
    assert!(!chat.is_loading());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (uri, body) = &seen[0];
    assert_eq!(
        uri,
        &format!("/v1beta/models/{MODEL}:generateContent?key={API_KEY}")
    );
    assert_eq!(
        body,
        &serde_json::json!({ "contents": [{ "role": "user", "parts": [{ "text": "Hi" }] }] })
    );
}

#[tokio::test]
async fn test_document_context_on_wire() {
    let (base_url, seen) = spawn_mock(StatusCode::OK, ANSWER).await;
    let mut chat = session_for(&base_url);

    let upload = DocumentUpload::new("hello.pdf", PDF_MIME, b"%PDF-1.5".to_vec());
    chat.upload_document(&upload).await.unwrap();

    chat.send_message("Summarize").await;
    chat.send_message("Again").await;

    let seen = seen.lock().unwrap();
    let contents = seen[1].1["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 3);
    assert_eq!(contents[0]["parts"][0]["text"], "Summarize");
    assert_eq!(contents[1]["role"], "model");
    assert_eq!(
        contents[2]["parts"][0]["text"],
        "Again\n\n[PDF Content]:\nPage 1: Hello\nPage 2: World\n"
    );
}

#[tokio::test]
async fn test_empty_candidates_fallback() {
    let (base_url, _) = spawn_mock(StatusCode::OK, r#"{"candidates":[]}"#).await;
    let mut chat = session_for(&base_url);

    chat.send_message("Anything?").await;
    let last = chat.messages().last().unwrap();
    assert_eq!(last.role(), Role::Assistant);
    assert_eq!(last.content(), "Sorry, I couldn't understand that.");
    assert_eq!(last.content(), NO_ANSWER_FALLBACK);
}

#[tokio::test]
async fn test_server_error_fallback() {
    let (base_url, seen) = spawn_mock(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"error":{"code":500,"message":"internal"}}"#,
    )
    .await;
    let mut chat = session_for(&base_url);

    chat.send_message("Hello?").await;
    assert_eq!(chat.messages().len(), 2);
    assert_eq!(chat.messages()[1].content(), ERROR_FALLBACK);
    // No retry
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_json_fallback() {
    let (base_url, _) = spawn_mock(StatusCode::OK, "this is not json").await;
    let mut chat = session_for(&base_url);

    chat.send_message("Hello?").await;
    assert_eq!(
        chat.messages()[1].content(),
        "Something went wrong. Please try again later."
    );
}

#[tokio::test]
async fn test_connection_refused_fallback() {
    // Grab a free port, then close it so nothing is listening there.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut chat = session_for(&format!("http://127.0.0.1:{port}"));

    chat.send_message("Anyone there?").await;
    assert_eq!(chat.messages().len(), 2);
    assert_eq!(chat.messages()[1].content(), ERROR_FALLBACK);
    assert!(!chat.is_loading());

    // The conversation carries on after a failure.
    chat.send_message("Still there?").await;
    assert_eq!(chat.messages().len(), 4);
    assert_eq!(chat.messages()[3].role(), Role::Assistant);
}
