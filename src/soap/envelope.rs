//! SOAP 1.1 envelopes
//!
//! Requests are document/literal: the body holds one element named after the
//! operation, in the table's namespace, with one unqualified child per
//! parameter. Responses are either the operation's response element or a
//! `Fault`.

use super::xml::{is_xml_name, parse_document, XmlElement};
use crate::error::{Error, Result};
use quick_xml::escape::escape;
use std::fmt;

/// SOAP 1.1 envelope namespace
pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// A SOAP fault returned by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    /// `faultcode`, e.g. `SOAP-ENV:Server`
    pub code: String,
    /// `faultstring`
    pub message: String,
    /// `detail` text, if any
    pub detail: Option<String>,
}

impl fmt::Display for SoapFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SOAP fault {}: {}", self.code, self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

/// Classified content of a response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoapBody {
    /// The operation's response element
    Response(XmlElement),
    /// Service-side fault
    Fault(SoapFault),
}

/// Build a request envelope for `operation` in `namespace`
pub fn build_request<'a, I>(namespace: &str, operation: &str, params: I) -> Result<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    if !is_xml_name(operation) {
        return Err(Error::invalid_argument(
            "operation",
            format!("'{operation}' is not a valid element name"),
        ));
    }

    let mut body = String::new();
    for (name, value) in params {
        if !is_xml_name(name) {
            return Err(Error::invalid_argument(
                "filter",
                format!("'{name}' is not a valid parameter name"),
            ));
        }
        body.push_str(&format!("<{name}>{}</{name}>", escape(value)));
    }

    Ok(format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<soapenv:Envelope xmlns:soapenv="{env}" xmlns:tns="{ns}">"#,
            "<soapenv:Header/>",
            "<soapenv:Body><tns:{op}>{body}</tns:{op}></soapenv:Body>",
            "</soapenv:Envelope>"
        ),
        env = SOAP_ENV_NS,
        ns = escape(namespace),
        op = operation,
        body = body,
    ))
}

/// Parse a response envelope into its body content
pub fn parse_response(xml: &str) -> Result<SoapBody> {
    let root = parse_document(xml)?;
    if root.name != "Envelope" {
        return Err(Error::xml(format!(
            "expected SOAP Envelope, found <{}>",
            root.name
        )));
    }
    let body = root
        .child("Body")
        .ok_or_else(|| Error::xml("SOAP Envelope has no Body"))?;
    let content = body
        .children
        .first()
        .ok_or_else(|| Error::xml("SOAP Body is empty"))?;

    if content.name == "Fault" {
        let detail = content
            .child("detail")
            .map(|d| collect_text(d).trim().to_string())
            .filter(|d| !d.is_empty());
        return Ok(SoapBody::Fault(SoapFault {
            code: content.child_text("faultcode").unwrap_or_default().trim().to_string(),
            message: content
                .child_text("faultstring")
                .unwrap_or_default()
                .trim()
                .to_string(),
            detail,
        }));
    }

    Ok(SoapBody::Response(content.clone()))
}

fn collect_text(element: &XmlElement) -> String {
    let mut text = element.text.clone();
    for child in &element.children {
        text.push_str(&collect_text(child));
    }
    text
}
