//! Query types
//!
//! Filters going out, and records and pages coming back.

use crate::error::{Error, Result};
use crate::soap::is_xml_name;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::Index;

/// Reserved parameter carrying a pre-encoded query expression
pub const ENCODED_QUERY: &str = "__encoded_query";

/// Unique record identifier field
pub const SYS_ID: &str = "sys_id";

// ============================================================================
// Filters
// ============================================================================

/// Named arguments for a key lookup or records call
///
/// Each entry becomes one child element of the request, in insertion order.
/// Values are strings or numbers; `__encoded_query` passes a raw
/// expression through, e.g. `active=false^state=7`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: Vec<(String, String)>,
}

impl QueryParams {
    /// Empty filter (matches every record)
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter made of a single encoded query
    pub fn encoded(query: impl Into<String>) -> Self {
        Self::new().param(ENCODED_QUERY, query.into())
    }

    /// Add or replace a named criterion
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.set(name, value);
        self
    }

    /// Add or replace a named criterion in place
    pub fn set(&mut self, name: impl Into<String>, value: impl ToString) {
        let name = name.into();
        let value = value.to_string();
        match self.params.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.params.push((name, value)),
        }
    }

    /// Value of a criterion
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The encoded query, if one is set
    pub fn encoded_query(&self) -> Option<&str> {
        self.get(ENCODED_QUERY)
    }

    /// Iterate over `(name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of criteria
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether no criteria are set
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Check every name can be sent as a request element
    pub fn validate(&self) -> Result<()> {
        match self.params.iter().find(|(k, _)| !is_xml_name(k)) {
            Some((name, _)) => Err(Error::invalid_argument(
                "filter",
                format!("'{name}' is not a valid parameter name"),
            )),
            None => Ok(()),
        }
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

/// Encoded query selecting records whose `field` is one of `values`
///
/// Values are joined verbatim: an identifier containing `,` or `^` breaks
/// the expression.
pub fn in_query(field: &str, values: &[String]) -> String {
    format!("{field}IN{}", values.join(","))
}

// ============================================================================
// Key lookups
// ============================================================================

/// Result of a key lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeysResult {
    /// Number of matching records reported by the service
    pub count: usize,
    /// Identifiers of the matching records
    pub sys_ids: Vec<String>,
}

// ============================================================================
// Records
// ============================================================================

/// One record from a records call: its fields in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Build a record from `(field, value)` pairs
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Value of a field
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v.as_str())
    }

    /// The record's `sys_id`
    pub fn sys_id(&self) -> Option<&str> {
        self.get(SYS_ID)
    }

    /// Iterate over `(field, value)` pairs
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Plain JSON object of the fields, in document order
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Value::Object(map)
    }

    /// Take the `(field, value)` pairs
    pub fn into_fields(self) -> Vec<(String, String)> {
        self.fields
    }
}

impl<'a> Index<&'a str> for Record {
    type Output = str;

    fn index(&self, field: &'a str) -> &str {
        self.get(field)
            .unwrap_or_else(|| panic!("record has no field '{field}'"))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ============================================================================
// Pages
// ============================================================================

/// Up to `page_size` records from a single records call
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct Page {
    records: Vec<Record>,
}

impl Page {
    /// Build a page from records
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Records in response order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Iterate over records
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the page has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `sys_id` of every record that has one
    pub fn sys_ids(&self) -> Vec<&str> {
        self.records.iter().filter_map(Record::sys_id).collect()
    }

    /// Take the records
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl Index<usize> for Page {
    type Output = Record;

    fn index(&self, index: usize) -> &Record {
        &self.records[index]
    }
}

impl IntoIterator for Page {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Page {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page of {} records", self.records.len())
    }
}
