//! Query module
//!
//! The paging helper and the types it exchanges with callers.
//!
//! # Overview
//!
//! A query resolves a set of `sys_id`s, either with one key lookup or from a
//! caller-supplied list, then fetches the records `page_size` identifiers at
//! a time. Pages are produced lazily: nothing is sent until the caller asks
//! for the next page, and stopping early sends nothing more.
//!
//! ```rust,ignore
//! let sn = SnSoap::new("dev12345", "soap.reader", "secret")?;
//! let filter = QueryParams::new().param("active", "false").param("state", 7);
//! let mut pages = sn.run_query("incident", filter, 250)?;
//! while let Some(page) = pages.next_page().await? {
//!     for record in &page {
//!         println!("{}", record["number"]);
//!     }
//! }
//! ```

mod pager;
mod types;

pub use pager::{dedup_sys_ids, RecordPages, Selection, SnSoap};
pub use types::{in_query, KeysResult, Page, QueryParams, Record, ENCODED_QUERY, SYS_ID};
