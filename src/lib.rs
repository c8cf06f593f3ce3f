//! # snsoap
//!
//! Paged queries over ServiceNow's SOAP "direct web services".
//!
//! Large `getRecords` responses are slow and can be cut off by the instance,
//! so queries run in two steps: a `getKeys` call resolves the matching
//! `sys_id`s, then `getRecords` is called for up to 250 of them at a time.
//! Pages are produced lazily, one request per page pulled.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use snsoap::{QueryParams, SnSoap};
//!
//! #[tokio::main]
//! async fn main() -> snsoap::Result<()> {
//!     let sn = SnSoap::new("dev12345", "soap.reader", "secret")?;
//!
//!     let filter = QueryParams::encoded("active=false^state=7");
//!     let mut pages = sn.run_query("incident", filter, 250)?;
//!     while let Some(page) = pages.next_page().await? {
//!         for record in &page {
//!             println!("{} {}", record["number"], record["short_description"]);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │ SnSoap::run_query(table, filter | sys_ids, page_size) │
//! │        → RecordPages (lazy, one call per page)        │
//! └───────────────────────────────────────────────────────┘
//!                            │
//! ┌──────────────┬───────────┴──────────┬─────────────────┐
//! │ TableClient  │ SOAP                 │ HTTP session    │
//! ├──────────────┼──────────────────────┼─────────────────┤
//! │ getKeys      │ WSDL descriptor      │ Basic auth      │
//! │ getRecords   │ Envelopes / faults   │ Timeout, UA     │
//! └──────────────┴──────────────────────┴─────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Instance configuration
pub mod config;

/// Basic auth credentials
pub mod auth;

/// Authenticated HTTP session
pub mod http;

/// SOAP envelopes and WSDL
pub mod soap;

/// Per-table SOAP client
pub mod client;

/// Paged queries
pub mod query;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::TableClient;
pub use config::{InstanceConfig, MAX_PAGE_SIZE};
pub use error::{Error, Result};
pub use query::{KeysResult, Page, QueryParams, Record, RecordPages, Selection, SnSoap};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
