//! WSDL descriptor
//!
//! Only the parts needed to call a table's service are kept: the target
//! namespace, the first SOAP service address, and the operations with their
//! `soapAction` values.

use super::xml::parse_document;
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// What a table's WSDL says about how to call it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsdlDescriptor {
    /// `targetNamespace` of the definitions
    pub namespace: String,
    /// Service endpoint from `soap:address`
    pub address: String,
    /// Operation name to `soapAction`
    pub operations: BTreeMap<String, String>,
}

impl WsdlDescriptor {
    /// Parse a WSDL 1.1 document
    pub fn parse(xml: &str) -> Result<Self> {
        let root = parse_document(xml)?;
        if root.name != "definitions" {
            return Err(Error::xml(format!(
                "expected WSDL definitions, found <{}>",
                root.name
            )));
        }

        let namespace = root
            .attr("targetNamespace")
            .filter(|ns| !ns.is_empty())
            .ok_or_else(|| Error::xml("WSDL has no targetNamespace"))?
            .to_string();

        let address = root
            .descendants("address")
            .into_iter()
            .find_map(|a| a.attr("location"))
            .ok_or_else(|| Error::xml("WSDL has no service address"))?
            .to_string();

        // Binding operations carry the soapAction; portType only names them.
        let mut operations = BTreeMap::new();
        for binding in root.children_named("binding") {
            for op in binding.children_named("operation") {
                let Some(name) = op.attr("name") else { continue };
                let action = op
                    .child("operation")
                    .and_then(|soap_op| soap_op.attr("soapAction"))
                    .filter(|a| !a.is_empty())
                    .map_or_else(|| format!("{namespace}/{name}"), str::to_string);
                operations.entry(name.to_string()).or_insert(action);
            }
        }
        for port_type in root.children_named("portType") {
            for op in port_type.children_named("operation") {
                if let Some(name) = op.attr("name") {
                    operations
                        .entry(name.to_string())
                        .or_insert_with(|| format!("{namespace}/{name}"));
                }
            }
        }

        Ok(Self {
            namespace,
            address,
            operations,
        })
    }

    /// Whether the service offers `operation`
    pub fn has_operation(&self, operation: &str) -> bool {
        self.operations.contains_key(operation)
    }

    /// `soapAction` for `operation`
    pub fn soap_action(&self, operation: &str) -> Option<&str> {
        self.operations.get(operation).map(String::as_str)
    }
}
