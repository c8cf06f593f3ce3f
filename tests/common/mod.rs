//! Mock ServiceNow instance for integration tests

#![allow(dead_code)]

use snsoap::{InstanceConfig, SnSoap};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const TABLE: &str = "incident";

pub fn action(operation: &str) -> String {
    format!("\"http://www.service-now.com/{TABLE}/{operation}\"")
}

pub fn wsdl(uri: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
    xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
    xmlns:tns="http://www.service-now.com/{TABLE}"
    targetNamespace="http://www.service-now.com/{TABLE}">
  <wsdl:portType name="ServiceNowSoap">
    <wsdl:operation name="getKeys"/>
    <wsdl:operation name="getRecords"/>
  </wsdl:portType>
  <wsdl:binding name="ServiceNowSoap" type="tns:ServiceNowSoap">
    <soap:binding style="document" transport="http://schemas.xmlsoap.org/soap/http"/>
    <wsdl:operation name="getKeys">
      <soap:operation soapAction="http://www.service-now.com/{TABLE}/getKeys" style="document"/>
    </wsdl:operation>
    <wsdl:operation name="getRecords">
      <soap:operation soapAction="http://www.service-now.com/{TABLE}/getRecords" style="document"/>
    </wsdl:operation>
  </wsdl:binding>
  <wsdl:service name="ServiceNow">
    <wsdl:port binding="tns:ServiceNowSoap" name="ServiceNowSoap">
      <soap:address location="{uri}/{TABLE}.do?SOAP"/>
    </wsdl:port>
  </wsdl:service>
</wsdl:definitions>"#
    )
}

pub fn envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"><SOAP-ENV:Body>{body}</SOAP-ENV:Body></SOAP-ENV:Envelope>"#
    )
}

pub fn keys_response(count: usize, sys_ids: &str) -> String {
    envelope(&format!(
        r#"<getKeysResponse xmlns="http://www.service-now.com/{TABLE}"><sys_id>{sys_ids}</sys_id><count>{count}</count></getKeysResponse>"#
    ))
}

pub fn fault_response(message: &str) -> String {
    envelope(&format!(
        "<SOAP-ENV:Fault><faultcode>SOAP-ENV:Server</faultcode><faultstring>{message}</faultstring></SOAP-ENV:Fault>"
    ))
}

/// Text of the `__encoded_query` element of a request body
pub fn encoded_query(body: &str) -> Option<String> {
    let start = body.find("<__encoded_query>")? + "<__encoded_query>".len();
    let end = body[start..].find("</__encoded_query>")? + start;
    Some(body[start..end].to_string())
}

/// Answers `getRecords` with one record per requested sys_id
pub struct EchoRecords;

impl Respond for EchoRecords {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body = String::from_utf8_lossy(&request.body);
        let ids = encoded_query(&body)
            .and_then(|q| q.strip_prefix("sys_idIN").map(str::to_string))
            .unwrap_or_default();

        let results: String = ids
            .split(',')
            .filter(|id| !id.is_empty())
            .map(|id| {
                format!(
                    "<getRecordsResult><number>INC-{id}</number><sys_id>{id}</sys_id><active>true</active></getRecordsResult>"
                )
            })
            .collect();
        ResponseTemplate::new(200).set_body_string(envelope(&format!(
            "<getRecordsResponse>{results}</getRecordsResponse>"
        )))
    }
}

pub async fn start() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{TABLE}.do")))
        .respond_with(ResponseTemplate::new(200).set_body_string(wsdl(&server.uri())))
        .named("wsdl")
        .mount(&server)
        .await;
    server
}

pub async fn mount_keys(server: &MockServer, count: usize, sys_ids: &str) {
    Mock::given(method("POST"))
        .and(header("SOAPAction", action("getKeys").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(keys_response(count, sys_ids)))
        .named("getKeys")
        .mount(server)
        .await;
}

pub async fn mount_records(server: &MockServer) {
    Mock::given(method("POST"))
        .and(header("SOAPAction", action("getRecords").as_str()))
        .respond_with(EchoRecords)
        .named("getRecords")
        .mount(server)
        .await;
}

pub fn config(server: &MockServer) -> InstanceConfig {
    InstanceConfig::builder("test")
        .credentials("soap.reader", "secret")
        .base_url(server.uri())
        .build()
}

pub fn pager(server: &MockServer) -> SnSoap {
    SnSoap::from_config(config(server)).unwrap()
}

/// Number of SOAP calls received for `operation`
pub async fn calls(server: &MockServer, operation: &str) -> usize {
    let expected = action(operation);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| {
            r.headers
                .get("SOAPAction")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == expected)
        })
        .count()
}

/// Encoded queries of every `getRecords` call, in arrival order
pub async fn record_queries(server: &MockServer) -> Vec<String> {
    let expected = action("getRecords");
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| {
            r.headers
                .get("SOAPAction")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == expected)
        })
        .filter_map(|r| encoded_query(&String::from_utf8_lossy(&r.body)))
        .collect()
}
