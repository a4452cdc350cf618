//! Integration tests for the text and video AI clients.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no real
//! network traffic is made. Poll-loop tests run with a zero interval.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chanpulse_ai::{AiError, PollPolicy, TextClient, VideoClient};

fn text_client(server: &MockServer) -> TextClient {
    TextClient::with_base_url("test-key", 5, &server.uri())
        .expect("failed to build test TextClient")
}

fn video_client(server: &MockServer) -> VideoClient {
    VideoClient::with_base_url("test-key", "pegasus1.2", 5, &server.uri())
        .expect("failed to build test VideoClient")
}

fn fast_poll() -> PollPolicy {
    PollPolicy::new(0, 5)
}

// ---------------------------------------------------------------------------
// Text client
// ---------------------------------------------------------------------------

#[tokio::test]
async fn complete_returns_first_choice_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "temperature": 0.4
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "choices": [{"message": {"role": "assistant", "content": "ответ модели"}}]
        })))
        .mount(&server)
        .await;

    let client = text_client(&server);
    let content = client
        .complete("gpt-4o", "роль", "запрос", 0.4)
        .await
        .unwrap();
    assert_eq!(content, "ответ модели");
}

#[tokio::test]
async fn complete_with_no_choices_is_empty_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"choices": []})))
        .mount(&server)
        .await;

    let client = text_client(&server);
    let result = client.complete("gpt-4o", "роль", "запрос", 0.4).await;
    assert!(matches!(result, Err(AiError::EmptyCompletion)));
}

#[tokio::test]
async fn quota_auth_and_permission_statuses_map_to_typed_errors() {
    for (status, check) in [
        (
            429u16,
            &(|e: &AiError| matches!(e, AiError::QuotaExceeded(_))) as &dyn Fn(&AiError) -> bool,
        ),
        (401, &|e: &AiError| matches!(e, AiError::AuthFailed(_))),
        (403, &|e: &AiError| matches!(e, AiError::PermissionDenied(_))),
    ] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_json(&json!({
                "error": {"message": "denied"}
            })))
            .mount(&server)
            .await;

        let client = text_client(&server);
        let err = client
            .complete("gpt-4o", "роль", "запрос", 0.4)
            .await
            .unwrap_err();
        assert!(check(&err), "status {status} mapped wrong: {err:?}");
    }
}

#[tokio::test]
async fn other_non_2xx_is_generic_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = text_client(&server);
    let result = client.complete("gpt-4o", "роль", "запрос", 0.4).await;
    assert!(
        matches!(result, Err(AiError::ApiError { status: 500, .. })),
        "expected ApiError(500), got: {result:?}"
    );
}

// ---------------------------------------------------------------------------
// Video client
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_or_create_index_reuses_existing_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "data": [{"_id": "idx-1", "index_name": "video-index-clip.mp4-abc123"}]
        })))
        .mount(&server)
        .await;
    // No POST mock: creating would 404 and fail the test.

    let client = video_client(&server);
    let id = client
        .get_or_create_index("video-index-clip.mp4-abc123")
        .await
        .unwrap();
    assert_eq!(id, "idx-1");
}

#[tokio::test]
async fn get_or_create_index_creates_when_absent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"data": []})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/indexes"))
        .and(body_partial_json(json!({
            "index_name": "video-index-new.mp4-beef00",
            "models": [{"model_name": "pegasus1.2"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"_id": "idx-9"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = video_client(&server);
    let id = client
        .get_or_create_index("video-index-new.mp4-beef00")
        .await
        .unwrap();
    assert_eq!(id, "idx-9");
}

#[tokio::test]
async fn wait_for_ready_polls_through_processing_to_ready() {
    let server = MockServer::start().await;

    // First poll: still processing. Subsequent polls: ready.
    Mock::given(method("GET"))
        .and(path("/tasks/t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "status": "processing", "video_id": ""
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "status": "ready", "video_id": "vid-7"
        })))
        .mount(&server)
        .await;

    let client = video_client(&server);
    let video_id = client.wait_for_ready("t-1", fast_poll()).await.unwrap();
    assert_eq!(video_id, "vid-7");
}

#[tokio::test]
async fn wait_for_ready_surfaces_failed_state() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks/t-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "status": "failed", "video_id": ""
        })))
        .mount(&server)
        .await;

    let client = video_client(&server);
    let result = client.wait_for_ready("t-2", fast_poll()).await;
    assert!(matches!(result, Err(AiError::IndexingFailed(_))));
}

#[tokio::test]
async fn wait_for_ready_times_out_after_max_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks/t-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "status": "processing", "video_id": ""
        })))
        .expect(3)
        .mount(&server)
        .await;

    let client = video_client(&server);
    let result = client.wait_for_ready("t-3", PollPolicy::new(0, 3)).await;
    assert!(
        matches!(result, Err(AiError::PollTimeout { attempts: 3 })),
        "expected PollTimeout, got: {result:?}"
    );
}

#[tokio::test]
async fn summarize_url_runs_the_full_flow() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"data": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"_id": "idx-1"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(body_partial_json(json!({
            "index_id": "idx-1",
            "video_url": "https://cdn.example/clip.mp4"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&json!({"_id": "t-1", "video_id": ""})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "status": "ready", "video_id": "vid-1"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .and(body_partial_json(json!({"video_id": "vid-1", "type": "summary"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "summary": "a farm tour with equipment closeups"
        })))
        .mount(&server)
        .await;

    let client = video_client(&server);
    let summary = client
        .summarize_url("https://cdn.example/clip.mp4", "describe it", fast_poll())
        .await
        .unwrap();
    assert_eq!(summary, "a farm tour with equipment closeups");
}

#[tokio::test]
async fn video_quota_exhaustion_is_quota_exceeded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(429).set_body_json(&json!({
            "error": {"message": "usage limit reached"}
        })))
        .mount(&server)
        .await;

    let client = video_client(&server);
    let result = client.get_or_create_index("video-index-x-000000").await;
    assert!(matches!(result, Err(AiError::QuotaExceeded(_))));
}
