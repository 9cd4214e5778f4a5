//! Dispatcher 集成测试：用 wiremock 模拟外部 Agent

use std::collections::BTreeMap;
use std::time::Duration;

use courier::core::synthesize;
use courier::tools::{Dispatcher, StatusClass, ToolSpec};
use reqwest::Url;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tool(server: &MockServer, name: &str, params: &[&str]) -> ToolSpec {
    let url = Url::parse(&format!("{}/api/{}", server.uri(), name)).unwrap();
    ToolSpec::new(name, params.iter().copied(), url)
}

fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_200_is_success_for_every_tool() {
    let server = MockServer::start().await;
    let tools = [
        tool(&server, "email", &["recipient", "assignment"]),
        tool(&server, "search", &["subject"]),
        tool(&server, "twitter", &["text"]),
    ];
    for t in &tools {
        Mock::given(method("POST"))
            .and(path(format!("/api/{}", t.name)))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"result": format!("{} done", t.name), "status": "success"}),
            ))
            .expect(1)
            .mount(&server)
            .await;
    }

    let dispatcher = Dispatcher::new(10).unwrap();
    for t in &tools {
        let outcome = dispatcher.dispatch(t, &BTreeMap::new()).await;
        assert_eq!(outcome.status_class, StatusClass::Success);
        assert_eq!(outcome.status_code, Some(200));
        assert!(synthesize(&t.name, &outcome).contains(&format!("{} done", t.name)));
    }
}

#[tokio::test]
async fn test_request_body_carries_declared_fields_only() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/email"))
        .and(body_json(json!({"recipient": "a@b.com", "assignment": ""})))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"message": "queued"})))
        .expect(1)
        .mount(&server)
        .await;

    let email = tool(&server, "email", &["recipient", "assignment"]);
    let outcome = Dispatcher::new(10).unwrap()
        .dispatch(&email, &params(&[("recipient", "a@b.com")]))
        .await;
    assert_eq!(outcome.status_class, StatusClass::Accepted);
}

#[tokio::test]
async fn test_202_acknowledgment_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_json(json!({"message": "X is being processed", "status": "processing"})),
        )
        .mount(&server)
        .await;

    let search = tool(&server, "search", &["subject"]);
    let outcome = Dispatcher::new(10).unwrap()
        .dispatch(&search, &params(&[("subject", "X")]))
        .await;
    assert_eq!(outcome.status_class, StatusClass::Accepted);
    let msg = synthesize("Web search", &outcome);
    assert!(msg.contains(courier::core::ACCEPTED_MARKER));
    assert!(msg.contains("X is being processed"));
}

#[tokio::test]
async fn test_500_reports_code_and_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "boom", "status": "failed"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let email = tool(&server, "email", &["recipient", "assignment"]);
    let outcome = Dispatcher::new(10).unwrap().dispatch(&email, &BTreeMap::new()).await;
    assert_eq!(outcome.status_class, StatusClass::ServerError);
    let msg = synthesize("Email", &outcome);
    assert!(msg.contains("500"));
    assert!(msg.contains("boom"));
}

#[tokio::test]
async fn test_4xx_is_client_error_with_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"detail": "recipient is not a valid email"})),
        )
        .mount(&server)
        .await;

    let email = tool(&server, "email", &["recipient", "assignment"]);
    let outcome = Dispatcher::new(10).unwrap().dispatch(&email, &BTreeMap::new()).await;
    assert_eq!(outcome.status_class, StatusClass::ClientError);
    assert_eq!(outcome.status_code, Some(422));
    assert!(synthesize("Email", &outcome).contains("recipient is not a valid email"));
}

#[tokio::test]
async fn test_non_json_error_body_kept_as_raw_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let search = tool(&server, "search", &["subject"]);
    let outcome = Dispatcher::new(10).unwrap().dispatch(&search, &BTreeMap::new()).await;
    assert_eq!(outcome.status_class, StatusClass::ServerError);
    assert_eq!(outcome.body_str("raw_response"), Some("Bad Gateway"));
    assert!(synthesize("Web search", &outcome).contains("Bad Gateway"));
}

#[tokio::test]
async fn test_connection_refused_is_connection_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let url = Url::parse(&format!("http://127.0.0.1:{}/api/email", port)).unwrap();
    let email = ToolSpec::new("email", ["recipient", "assignment"], url);
    let outcome = Dispatcher::new(10).unwrap().dispatch(&email, &BTreeMap::new()).await;

    assert_eq!(outcome.status_class, StatusClass::ConnectionFailure);
    assert_eq!(outcome.status_code, None);
    let detail = outcome.error_detail.clone().unwrap();
    let msg = synthesize("Email", &outcome);
    assert!(msg.contains(&detail));
    assert!(msg.contains("Status: none"));
    assert!(!msg.contains("Status: 0"));
}

#[tokio::test]
async fn test_slow_agent_times_out_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"result": "late"}))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let search = tool(&server, "search", &["subject"]).with_timeout(Duration::from_millis(100));
    let outcome = Dispatcher::new(10).unwrap().dispatch(&search, &BTreeMap::new()).await;
    assert_eq!(outcome.status_class, StatusClass::ConnectionFailure);
    assert!(outcome.error_detail.unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(307).insert_header("Location", "/elsewhere"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "followed"})))
        .expect(0)
        .mount(&server)
        .await;

    let search = tool(&server, "search", &["subject"]);
    let outcome = Dispatcher::new(10)
        .unwrap()
        .dispatch(&search, &params(&[("subject", "rust")]))
        .await;

    assert_eq!(outcome.status_class, StatusClass::ServerError);
    assert_eq!(outcome.status_code, Some(307));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert!(!synthesize("Web search", &outcome).contains("followed"));
}
