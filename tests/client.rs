use httpmock::prelude::*;
use mandrill_client::{Client, Error, Message, RecipientType, RequestOptions, SendStatus};

const SEND_RESPONSE: &str = r#"[{"status":"sent","email":"test@test.com","reject_reason": "hard-bounce","_id": "abc123abc123abc123abc123abc123"}]"#;

fn client(server: &MockServer) -> Client {
    Client::builder("test-key")
        .base_url(server.base_url())
        .build()
        .unwrap()
}

fn test_message() -> Message {
    Message::new()
        .html("<p> Test HTML </p>")
        .text("Test Text")
        .subject("Test Subject")
        .from_email("test@email.com")
        .from_name("Test Name")
        .add_recipient("userTest@email.com", "test user")
}

#[tokio::test]
async fn send_parses_results() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/messages/send")
                .header("content-type", "application/json")
                .json_body_partial(
                    r#"{"key":"test-key","async":false,"message":{"subject":"Test Subject","to":[{"email":"userTest@email.com","name":"test user","type":"to"}]}}"#,
                );
            then.status(200)
                .header("content-type", "application/json")
                .body(SEND_RESPONSE);
        })
        .await;

    let res = client(&server).send(&test_message(), false).await.unwrap();

    mock.assert_async().await;
    assert_eq!(res.len(), 1);
    assert_eq!(res[0].status, SendStatus::Sent);
    assert_eq!(res[0].email, "test@test.com");
    assert_eq!(res[0].rejection_reason.as_deref(), Some("hard-bounce"));
    assert_eq!(res[0].id, "abc123abc123abc123abc123abc123");
}

#[tokio::test]
async fn send_template_includes_template_fields() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/messages/send-template")
                .json_body_partial(
                    r#"{"template_name":"test template","template_content":[{"name":"contentKey","content":"Test Content"}]}"#,
                );
            then.status(200).body(SEND_RESPONSE);
        })
        .await;

    let res = client(&server)
        .send_template(
            &test_message(),
            "test template",
            [("contentKey", "Test Content")],
            false,
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(res[0].status, SendStatus::Sent);
    assert_eq!(res[0].email, "test@test.com");
    assert_eq!(res[0].rejection_reason.as_deref(), Some("hard-bounce"));
    assert_eq!(res[0].id, "abc123abc123abc123abc123abc123");
}

#[tokio::test]
async fn send_async_flag_and_rejected_recipient() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/messages/send")
                .json_body_partial(r#"{"async":true}"#);
            then.status(200).body(
                r#"[{"status":"queued","email":"a@test.com","_id":"1"},
                    {"status":"rejected","email":"b@test.com","reject_reason":"spam","_id":"2"}]"#,
            );
        })
        .await;

    let msg = Message::with_recipient("a@test.com", "")
        .add_recipient_with_type("b@test.com", "", RecipientType::Cc);
    let res = client(&server).send(&msg, true).await.unwrap();

    assert_eq!(res.len(), 2);
    assert_eq!(res[0].status, SendStatus::Queued);
    assert_eq!(res[1].status, SendStatus::Rejected);
    assert_eq!(res[1].rejection_reason.as_deref(), Some("spam"));
}

#[tokio::test]
async fn send_with_empty_body_returns_no_results() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/messages/send");
            then.status(200);
        })
        .await;

    let res = client(&server).send(&test_message(), false).await.unwrap();
    assert!(res.is_empty());
}

#[tokio::test]
async fn ping_ok() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/users/ping")
                .json_body(serde_json::json!({"key": "test-key"}));
            then.status(200);
        })
        .await;

    client(&server).ping().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn ping_reports_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/users/ping");
            then.status(500)
                .body(r#"{"status":"error","code":10,"name":"Invalid_Key","message":"bad"}"#);
        })
        .await;

    let err = client(&server).ping().await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Invalid_Key"));
    assert!(message.contains("bad"));

    let api = err.api_error().unwrap();
    assert_eq!(api.code, 10);
    assert_eq!(api.status, "error");
}

#[tokio::test]
async fn unparseable_error_body_is_unknown_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/messages/send");
            then.status(502).body("<html>Bad Gateway</html>");
        })
        .await;

    let err = client(&server).send(&test_message(), false).await.unwrap_err();
    match err {
        Error::UnknownResponse { status, body } => {
            assert_eq!(status.as_u16(), 502);
            assert!(body.contains("Bad Gateway"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_success_body_is_json_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/messages/send");
            then.status(200).body(r#"{"not":"an array"}"#);
        })
        .await;

    let err = client(&server).send(&test_message(), false).await.unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[tokio::test]
async fn transport_failure_is_request_error() {
    let client = Client::builder("test-key")
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap();

    let err = client.ping().await.unwrap_err();
    assert!(matches!(err, Error::Request(_)));
}

#[tokio::test]
async fn per_call_base_url_overrides_client() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/1.0/users/ping");
            then.status(200);
        })
        .await;

    let client = Client::builder("test-key")
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap();
    let options = RequestOptions::new().base_url(server.url("/api/1.0/"));

    client.ping_with(&options).await.unwrap();
    mock.assert_async().await;
}
