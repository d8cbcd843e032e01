//! Clip API client tests against a mock HTTP server.

use std::sync::Arc;

use futures_util::StreamExt;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use enklipse_client::{ClientConfig, ClientError, ClipApiClient, ClipQueryService, StaticCredentials};
use enklipse_models::{ClipId, ClipStatus, CreateClipRequest, PageRequest, PublishRequest};

fn client_for(server: &MockServer, token: Option<&str>) -> ClipApiClient {
    let config = ClientConfig::default().with_base_url(server.uri());
    let credentials = Arc::new(StaticCredentials::new(token.map(str::to_string)));
    ClipApiClient::new(config, credentials).unwrap()
}

fn script(words: usize) -> String {
    vec!["lorem"; words].join(" ")
}

#[tokio::test]
async fn test_fetch_clip_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clips/clip-1"))
        .and(header("authorization", "Bearer tok_123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "clipId": "clip-1",
            "title": "Volcanoes",
            "script": "Lava flows",
            "status": "I"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("tok_123"));
    let clip = client.fetch_clip(&ClipId::from("clip-1")).await.unwrap();

    assert_eq!(clip.title, "Volcanoes");
    assert_eq!(clip.status, ClipStatus::Processing);
}

#[tokio::test]
async fn test_fetch_clip_surfaces_server_message_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clips/missing"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(serde_json::json!({"message": "Render cluster offline"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("tok"));
    let err = client.fetch_clip(&ClipId::from("missing")).await.unwrap_err();

    assert_eq!(err.server_message(), Some("Render cluster offline"));
    assert!(matches!(err, ClientError::Api { .. }));
}

#[tokio::test]
async fn test_create_clip_validates_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/clip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("tok"));
    let err = client
        .create_clip(&CreateClipRequest::new("Hi", script(20)))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn test_create_clip_returns_clip_id() {
    let server = MockServer::start().await;
    let request = CreateClipRequest::new("Space trivia", script(120)).with_narrator("onyx");

    Mock::given(method("POST"))
        .and(path("/clip"))
        .and(body_json(&request))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"clipId": "new-clip"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("tok"));
    let created = client.create_clip(&request).await.unwrap();
    assert_eq!(created.clip_id.as_str(), "new-clip");
}

#[tokio::test]
async fn test_list_clips_passes_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clips"))
        .and(query_param("pageNumber", "2"))
        .and(query_param("pageSize", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "clips": [{"clipId": "a", "title": "A", "status": "S", "clipUrl": "https://cdn/a.mp4"}],
            "totalPages": 3
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("tok"));
    let page = client.list_clips(PageRequest::new(2, Some(5))).await.unwrap();

    assert_eq!(page.total_pages, 3);
    assert_eq!(page.clips[0].playable_url(), Some("https://cdn/a.mp4"));
}

#[tokio::test]
async fn test_publish_requires_credentials() {
    let server = MockServer::start().await;
    let client = client_for(&server, None);

    let err = client.publish(&PublishRequest::youtube("clip-1")).await.unwrap_err();
    assert!(matches!(err, ClientError::AuthenticationMissing));
}

#[tokio::test]
async fn test_publish_posts_connection_types() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connections/publish"))
        .and(body_json(serde_json::json!({"connectionTypes": ["Y"], "clipId": "clip-1"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("tok"));
    client.publish(&PublishRequest::youtube("clip-1")).await.unwrap();
}

#[tokio::test]
async fn test_status_stream_decodes_events() {
    let server = MockServer::start().await;
    let body = concat!(
        ": connected\n\n",
        "event: clip-status\n",
        "data: {\"percentage\": 40, \"message\": \"Rendering\"}\n\n",
        "event: clip-status\n",
        "data: {\"percentage\": 100, \"message\": \"Done\", \"status\": \"Succeeded\", \"mediaUrl\": \"https://x/y.mp4\"}\n\n",
    );

    Mock::given(method("GET"))
        .and(path("/clip-status/clip-1"))
        .and(query_param("token", "sealed"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let stream = client
        .open_status_stream(&ClipId::from("clip-1"), "sealed", None)
        .await
        .unwrap();
    let events: Vec<_> = stream.collect().await;

    assert_eq!(events.len(), 2);
    let last = events[1].as_ref().unwrap();
    assert!(last.is_success());
    assert_eq!(last.media_url.as_deref(), Some("https://x/y.mp4"));
}

#[tokio::test]
async fn test_status_stream_resumes_with_last_event_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clip-status/clip-1"))
        .and(header("last-event-id", "41"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string("id: 42\nevent: clip-status\ndata: {\"percentage\": 90, \"message\": \"Mixing\"}\n\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let stream = client
        .open_status_stream(&ClipId::from("clip-1"), "sealed", Some("41"))
        .await
        .unwrap();
    let events: Vec<_> = stream.collect().await;

    assert_eq!(events.len(), 1);
    let event = events[0].as_ref().unwrap();
    assert_eq!(event.percentage, 90);
    assert_eq!(event.event_id.as_deref(), Some("42"));
}
