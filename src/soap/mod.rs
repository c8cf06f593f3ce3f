//! SOAP module
//!
//! Just enough SOAP 1.1 for the direct web services API:
//!
//! - **Documents**: a small element tree parsed with quick-xml
//! - **Envelopes**: request builder and response/fault classification
//! - **WSDL**: target namespace, service address and operations of a table
//!
//! Namespace prefixes are ignored when matching element names.

mod envelope;
mod wsdl;
mod xml;

pub use envelope::{build_request, parse_response, SoapBody, SoapFault, SOAP_ENV_NS};
pub use wsdl::WsdlDescriptor;
pub use xml::{is_xml_name, parse_document, XmlElement};
