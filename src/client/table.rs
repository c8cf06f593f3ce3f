//! Per-table SOAP client

use crate::config::InstanceConfig;
use crate::error::{Error, Result};
use crate::http::SoapSession;
use crate::query::{KeysResult, Page, QueryParams, Record};
use crate::soap::{build_request, parse_response, SoapBody, WsdlDescriptor, XmlElement};
use std::sync::Arc;
use tracing::{debug, info};

/// Key lookup operation
pub const GET_KEYS: &str = "getKeys";

/// Records fetch operation
pub const GET_RECORDS: &str = "getRecords";

/// Client bound to one table's SOAP endpoint
#[derive(Debug, Clone)]
pub struct TableClient {
    table: String,
    descriptor: Arc<WsdlDescriptor>,
    session: SoapSession,
}

impl TableClient {
    /// Bind a client to an already resolved descriptor
    pub fn new(table: impl Into<String>, descriptor: Arc<WsdlDescriptor>, session: SoapSession) -> Self {
        Self {
            table: table.into(),
            descriptor,
            session,
        }
    }

    /// Fetch and parse the table's WSDL, then bind a client to it
    pub async fn resolve(session: &SoapSession, config: &InstanceConfig, table: &str) -> Result<Self> {
        if !is_table_name(table) {
            return Err(Error::endpoint(table, "invalid table name"));
        }

        let url = config.wsdl_url(table);
        debug!(table, url, "resolving WSDL");
        let reply = session
            .get(&url)
            .await
            .map_err(|e| Error::endpoint(table, e.to_string()))?;
        if !reply.is_success() {
            return Err(Error::endpoint(
                table,
                format!("HTTP {} fetching {url}", reply.status),
            ));
        }

        let descriptor =
            WsdlDescriptor::parse(&reply.body).map_err(|e| Error::endpoint(table, e.to_string()))?;
        for operation in [GET_KEYS, GET_RECORDS] {
            if !descriptor.has_operation(operation) {
                return Err(Error::endpoint(
                    table,
                    format!("WSDL does not offer '{operation}'"),
                ));
            }
        }

        info!(table, address = %descriptor.address, "resolved table endpoint");
        Ok(Self::new(table, Arc::new(descriptor), session.clone()))
    }

    /// Table this client is bound to
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The resolved WSDL descriptor
    pub fn descriptor(&self) -> &Arc<WsdlDescriptor> {
        &self.descriptor
    }

    /// Look up the identifiers of records matching `filter`
    pub async fn get_keys(&self, filter: &QueryParams) -> Result<KeysResult> {
        let response = self.call(GET_KEYS, filter).await?;

        let count_text = response
            .child_text("count")
            .ok_or_else(|| self.remote(GET_KEYS, "response has no count"))?;
        let count: usize = count_text
            .trim()
            .parse()
            .map_err(|_| self.remote(GET_KEYS, format!("invalid count '{}'", count_text.trim())))?;
        if count == 0 {
            return Ok(KeysResult::default());
        }

        let mut sys_ids = Vec::with_capacity(count);
        for element in response.children_named("sys_id") {
            sys_ids.extend(
                element
                    .text
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string),
            );
        }
        if sys_ids.is_empty() {
            return Err(self.remote(GET_KEYS, format!("count is {count} but no sys_id returned")));
        }
        if sys_ids.len() > count {
            return Err(self.remote(
                GET_KEYS,
                format!("{} sys_ids returned for a count of {count}", sys_ids.len()),
            ));
        }

        debug!(table = %self.table, count, "key lookup");
        Ok(KeysResult { count, sys_ids })
    }

    /// Fetch the records selected by `filter`
    pub async fn get_records(&self, filter: &QueryParams) -> Result<Page> {
        let response = self.call(GET_RECORDS, filter).await?;
        let records = response
            .children_named("getRecordsResult")
            .map(|result| {
                Record::new(
                    result
                        .children
                        .iter()
                        .map(|field| (field.name.clone(), field.text.clone()))
                        .collect(),
                )
            })
            .collect();
        Ok(Page::new(records))
    }

    async fn call(&self, operation: &str, params: &QueryParams) -> Result<XmlElement> {
        let action = self
            .descriptor
            .soap_action(operation)
            .ok_or_else(|| self.remote(operation, "operation not offered by endpoint"))?;
        let envelope = build_request(&self.descriptor.namespace, operation, params.iter())?;

        let reply = self
            .session
            .post_soap(&self.descriptor.address, action, envelope)
            .await
            .map_err(|e| self.remote(operation, e.to_string()))?;

        // Faults usually arrive with a 500, so classify the body first.
        match parse_response(&reply.body) {
            Ok(SoapBody::Fault(fault)) => Err(self.remote(operation, fault.to_string())),
            Ok(SoapBody::Response(_)) if !reply.is_success() => {
                Err(self.remote(operation, format!("HTTP {}", reply.status)))
            }
            Ok(SoapBody::Response(element)) => {
                let expected = format!("{operation}Response");
                if element.name == expected {
                    Ok(element)
                } else {
                    Err(self.remote(
                        operation,
                        format!("expected <{expected}>, found <{}>", element.name),
                    ))
                }
            }
            Err(_) if !reply.is_success() => {
                Err(self.remote(operation, format!("HTTP {}", reply.status)))
            }
            Err(e) => Err(self.remote(operation, e.to_string())),
        }
    }

    fn remote(&self, operation: &str, message: impl Into<String>) -> Error {
        Error::remote_query(&self.table, operation, message)
    }
}

/// Table names are lowercase identifiers such as `incident` or `u_asset_tag`
fn is_table_name(table: &str) -> bool {
    !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}
