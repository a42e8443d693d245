//! Blocking client tests
//!
//! The mock server is driven from a separate runtime; the blocking client
//! runs its own and is called from plain synchronous test code.

#![cfg(feature = "blocking")]

use std::time::Duration;

use serde_json::json;
use tokio::runtime::Runtime;
use versatrak::{blocking::SessionClient, ClientConfig, HistoryQuery};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn start_server(rt: &Runtime) -> MockServer {
    let server = rt.block_on(MockServer::start());
    rt.block_on(async {
        Mock::given(method("GET"))
            .and(path("/api/usersession/action/instanceList"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "abc"}, {"id": "def"}])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/usersession/action/logon"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"jwt": "blocking-jwt", "refreshToken": "blocking-refresh"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/usersession/action/isloggedon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"isLoggedOn": true})))
            .mount(&server)
            .await;
    });
    server
}

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(format!("{}/api", server.uri()))
        .with_credentials("operator", "secret")
        .with_retry_backoff(Duration::ZERO)
}

#[test]
fn test_blocking_connect_and_logoff() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt);
    rt.block_on(
        Mock::given(method("POST"))
            .and(path("/api/usersession/action/logoff"))
            .and(header("Authorization", "Bearer blocking-jwt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("bye"))
            .expect(1)
            .mount(&server),
    );

    let client = SessionClient::connect(config_for(&server)).unwrap();
    assert_eq!(client.instance_id(), "abc");
    assert!(client.is_logged_on_cached());
    assert_eq!(
        client.authorization_header().as_deref(),
        Some("Bearer blocking-jwt")
    );
    assert!(client.is_logged_on().unwrap());

    assert_eq!(client.logoff().unwrap(), "bye");
    assert!(client.tokens().is_none());
    assert!(client.authorization_header().is_none());
}

#[test]
fn test_blocking_guarded_history_call() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt);
    rt.block_on(
        Mock::given(method("POST"))
            .and(path("/api/monitoredObject/action/gethistorydata/7"))
            .and(header("Authorization", "Bearer blocking-jwt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&server),
    );

    let client = SessionClient::new(config_for(&server).with_instance("abc")).unwrap();
    assert!(!client.is_logged_on_cached());

    let body = client.get_history_data("7", &HistoryQuery::new()).unwrap();
    assert_eq!(body, "[]");
    assert!(client.is_logged_on_cached());
}
