//! Tests for the HTTP session module

use super::*;
use crate::config::InstanceConfig;
use crate::error::Error;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> InstanceConfig {
    InstanceConfig::builder("test")
        .credentials("user", "pass")
        .base_url(server.uri())
        .build()
}

#[test]
fn test_session_rejects_malformed_credentials() {
    let config = InstanceConfig::new("acme", "", "pw");
    let err = SoapSession::new(&config).unwrap_err();
    assert!(matches!(err, Error::AuthConfig { .. }));
}

#[test]
fn test_session_rejects_bad_user_agent() {
    let config = InstanceConfig::builder("acme")
        .credentials("user", "pw")
        .user_agent("bad\nagent")
        .build();
    assert!(matches!(
        SoapSession::new(&config),
        Err(Error::Config { .. })
    ));
}

#[test]
fn test_session_username() {
    let session = SoapSession::new(&InstanceConfig::new("acme", "reader", "pw")).unwrap();
    assert_eq!(session.username(), "reader");
}

#[tokio::test]
async fn test_get_sends_basic_auth() {
    let mock_server = MockServer::start().await;

    // "user:pass"
    Mock::given(method("GET"))
        .and(path("/incident.do"))
        .and(header("Authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<ok/>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = SoapSession::new(&config_for(&mock_server)).unwrap();
    let reply = session
        .get(&format!("{}/incident.do?WSDL", mock_server.uri()))
        .await
        .unwrap();

    assert!(reply.is_success());
    assert_eq!(reply.body, "<ok/>");
}

#[tokio::test]
async fn test_post_soap_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/incident.do"))
        .and(header("SOAPAction", "\"urn:incident/getKeys\""))
        .and(header("Content-Type", "text/xml; charset=utf-8"))
        .and(header_exists("Authorization"))
        .and(body_string_contains("<tns:getKeys>"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<Envelope/>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = SoapSession::new(&config_for(&mock_server)).unwrap();
    let reply = session
        .post_soap(
            &format!("{}/incident.do?SOAP", mock_server.uri()),
            "urn:incident/getKeys",
            "<tns:getKeys></tns:getKeys>".to_string(),
        )
        .await
        .unwrap();

    assert_eq!(reply.status, 200);
}

#[tokio::test]
async fn test_non_success_status_is_returned() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
        .mount(&mock_server)
        .await;

    let session = SoapSession::new(&config_for(&mock_server)).unwrap();
    let reply = session.get(&mock_server.uri()).await.unwrap();

    assert_eq!(reply.status, 401);
    assert!(!reply.is_success());
    assert_eq!(reply.body, "denied");
}

#[tokio::test]
async fn test_timeout_surfaces_as_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let config = InstanceConfig::builder("test")
        .credentials("user", "pass")
        .base_url(mock_server.uri())
        .timeout(Duration::from_secs(1))
        .build();
    let session = SoapSession::new(&config).unwrap();

    let err = session.get(&mock_server.uri()).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}
