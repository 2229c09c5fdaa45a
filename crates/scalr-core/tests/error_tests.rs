//! Error mapping, deadlines and cancellation with canned wiremock responses

use scalr_core::{ClientConfig, Context, ScalrClient, ScalrError, WorkspaceUpdateOptions};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MEDIA_TYPE: &str = "application/vnd.api+json";

fn client(server: &MockServer) -> ScalrClient {
    ScalrClient::new(
        ClientConfig::default()
            .with_address(server.uri())
            .with_token("test-token")
            .with_header("Prefer", "profile=preview"),
    )
    .unwrap()
}

fn jsonapi(status: u16, body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(serde_json::to_vec(&body).unwrap(), MEDIA_TYPE)
}

#[tokio::test]
async fn sends_auth_accept_and_static_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/iacp/v3/workspaces/ws-1"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("accept", MEDIA_TYPE))
        .and(header("prefer", "profile=preview"))
        .respond_with(jsonapi(
            200,
            serde_json::json!({"data": {"type": "workspaces", "id": "ws-1", "attributes": {"name": "app"}}}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let workspace = client(&server)
        .workspaces()
        .read(&Context::background(), "ws-1")
        .await
        .unwrap();
    assert_eq!(workspace.name, "app");
}

#[tokio::test]
async fn not_found_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/iacp/v3/teams/team-404"))
        .respond_with(jsonapi(
            404,
            serde_json::json!({"errors": [{"status": "404", "title": "Not Found", "detail": "Team not found"}]}),
        ))
        .mount(&server)
        .await;

    let err = client(&server)
        .teams()
        .read(&Context::background(), "team-404")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("Team not found"));
}

#[tokio::test]
async fn validation_keeps_every_detail() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/iacp/v3/workspaces/ws-1"))
        .respond_with(jsonapi(
            422,
            serde_json::json!({"errors": [
                {"status": "422", "title": "Invalid Attribute", "detail": "Terraform version is not supported"},
                {"status": "422", "title": "Invalid Attribute", "detail": "Working directory is invalid"}
            ]}),
        ))
        .mount(&server)
        .await;

    let update = WorkspaceUpdateOptions::new()
        .with_terraform_version("0.0.1")
        .with_working_directory("../..");
    let err = client(&server)
        .workspaces()
        .update(&Context::background(), "ws-1", &update)
        .await
        .unwrap_err();

    match err {
        ScalrError::Validation {
            status,
            message,
            details,
        } => {
            assert_eq!(status, 422);
            assert!(message.contains("Terraform version"));
            assert_eq!(details.len(), 2);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_keeps_status() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client(&server)
        .environments()
        .delete(&Context::background(), "env-1")
        .await
        .unwrap_err();
    assert!(err.is_server_error());
    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().contains("upstream unavailable"));
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .users()
        .read(&Context::background(), "user-1")
        .await
        .unwrap_err();
    assert!(matches!(err, ScalrError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn invalid_id_never_reaches_the_service() {
    let server = MockServer::start().await;
    let workspaces = client(&server).workspaces();
    let ctx = Context::background();

    for id in ["", "ws/1", "..", "ws-1?include=secrets"] {
        let err = workspaces.read(&ctx, id).await.unwrap_err();
        assert!(matches!(err, ScalrError::InvalidId { .. }), "{id:?}: {err:?}");
    }
    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[tokio::test]
async fn deadline_bounds_the_whole_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            jsonapi(200, serde_json::json!({"data": []})).set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let ctx = Context::background().with_timeout(Duration::from_millis(100));
    let err = client(&server)
        .users()
        .list(&ctx, &scalr_core::UserListOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_timeout(), "got {err:?}");
}

#[tokio::test]
async fn cancelled_context_fails_fast() {
    let server = MockServer::start().await;
    let ctx = Context::background();
    ctx.cancel();

    let err = client(&server)
        .teams()
        .list(&ctx, &scalr_core::TeamListOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ScalrError::Cancelled));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn cancellation_interrupts_in_flight_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            jsonapi(200, serde_json::json!({"data": []})).set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let ctx = Context::background();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let err = client(&server)
        .environments()
        .list(&ctx, &scalr_core::EnvironmentListOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ScalrError::Cancelled), "got {err:?}");
}

#[tokio::test]
async fn connection_refused_is_request_error() {
    // Nothing listens on port 1
    let uri = "http://127.0.0.1:1";
    let client = ScalrClient::new(
        ClientConfig::default()
            .with_address(uri)
            .with_token("test-token"),
    )
    .unwrap();

    let err = client
        .users()
        .read(&Context::background(), "user-1")
        .await
        .unwrap_err();
    assert!(err.is_request_failure(), "got {err:?}");
    assert!(matches!(err, ScalrError::Request { .. }));
}
