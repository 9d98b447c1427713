use std::time::Duration;

use pretty_assertions::assert_eq;
use roadmap_core::{Roadmap, Step};
use roadmap_engine::{ClientSettings, FailureKind, ReqwestRoadmapClient, RoadmapClient};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, settings: ClientSettings) -> ReqwestRoadmapClient {
    let settings = ClientSettings {
        endpoint: format!("{}/generate-roadmap", server.uri()),
        ..settings
    };
    ReqwestRoadmapClient::new(settings).expect("client builds")
}

async fn serve(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/generate-roadmap"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn posts_question_and_parses_steps() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-roadmap"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "question": "Learn X" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Learn X",
            "steps": [
                { "id": "1", "label": "Install", "description": "Get it" },
                { "id": "2", "label": "Basics", "description": "Syntax",
                  "key_points": ["Types", "Control flow"] },
                { "id": "3", "label": "Projects", "description": "Build" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, ClientSettings::default());
    let roadmap = client.fetch_roadmap("Learn X").await.expect("fetch ok");

    assert_eq!(
        roadmap,
        Roadmap::new(
            "Learn X",
            vec![
                Step::new("1", "Install", "Get it"),
                Step::new("2", "Basics", "Syntax").with_key_points(["Types", "Control flow"]),
                Step::new("3", "Projects", "Build"),
            ]
        )
    );
}

#[tokio::test]
async fn inline_error_payload_is_a_successful_result() {
    let server = MockServer::start().await;
    serve(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!({ "title": "Error", "message": "Model unavailable" })),
    )
    .await;

    let client = client_for(&server, ClientSettings::default());
    let roadmap = client.fetch_roadmap("anything").await.expect("fetch ok");
    assert_eq!(roadmap, Roadmap::error("Model unavailable"));
}

#[tokio::test]
async fn no_context_payload_is_a_successful_result() {
    let server = MockServer::start().await;
    serve(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "error": "No information found." })),
    )
    .await;

    let client = client_for(&server, ClientSettings::default());
    let roadmap = client.fetch_roadmap("anything").await.expect("fetch ok");
    assert!(roadmap.is_error());
}

#[tokio::test]
async fn server_error_carries_detail() {
    let server = MockServer::start().await;
    serve(
        &server,
        ResponseTemplate::new(500).set_body_json(json!({ "detail": "quota exceeded" })),
    )
    .await;

    let client = client_for(&server, ClientSettings::default());
    let err = client.fetch_roadmap("q").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::ServerError { status: 500 });
    assert_eq!(err.message, "quota exceeded");
}

#[tokio::test]
async fn server_error_without_detail_uses_status() {
    let server = MockServer::start().await;
    serve(&server, ResponseTemplate::new(502).set_body_string("bad gateway")).await;

    let client = client_for(&server, ClientSettings::default());
    let err = client.fetch_roadmap("q").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::ServerError { status: 502 });
    assert!(err.message.contains("502"));
}

#[tokio::test]
async fn body_without_steps_is_malformed() {
    let server = MockServer::start().await;
    serve(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "title": "Plan" })),
    )
    .await;

    let client = client_for(&server, ClientSettings::default());
    let err = client.fetch_roadmap("q").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::MalformedResponse);
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;
    serve(
        &server,
        ResponseTemplate::new(200).set_body_raw("<html>oops</html>", "text/html"),
    )
    .await;

    let client = client_for(&server, ClientSettings::default());
    let err = client.fetch_roadmap("q").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::MalformedResponse);
}

#[tokio::test]
async fn rejects_too_large_response() {
    let server = MockServer::start().await;
    serve(
        &server,
        ResponseTemplate::new(200)
            .insert_header("Content-Type", "application/json")
            .set_body_string(r#"{"title":"t","steps":[]}"#),
    )
    .await;

    let settings = ClientSettings {
        max_bytes: 10,
        ..ClientSettings::default()
    };
    let client = client_for(&server, settings);
    let err = client.fetch_roadmap("q").await.unwrap_err();
    assert!(matches!(
        err.kind,
        FailureKind::TooLarge { max_bytes: 10, .. }
    ));
}

#[tokio::test]
async fn times_out_when_configured() {
    let server = MockServer::start().await;
    serve(
        &server,
        ResponseTemplate::new(200)
            .set_delay(Duration::from_millis(250))
            .set_body_json(json!({ "title": "t", "steps": [] })),
    )
    .await;

    let settings = ClientSettings {
        request_timeout: Some(Duration::from_millis(50)),
        ..ClientSettings::default()
    };
    let client = client_for(&server, settings);
    let err = client.fetch_roadmap("q").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn invalid_endpoint_is_reported() {
    let client = ReqwestRoadmapClient::new(ClientSettings {
        endpoint: "not a url".to_string(),
        ..ClientSettings::default()
    })
    .expect("client builds");

    let err = client.fetch_roadmap("q").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidEndpoint);
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    // Bind and release a port so nothing listens on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    let endpoint = format!("http://127.0.0.1:{port}/generate-roadmap");

    let client = ReqwestRoadmapClient::new(ClientSettings {
        endpoint,
        ..ClientSettings::default()
    })
    .expect("client builds");

    let err = client.fetch_roadmap("q").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Transport);
}
