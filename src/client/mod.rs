//! Table client module
//!
//! A [`TableClient`] is bound to one table's service endpoint, resolved from
//! the table's WSDL. It issues the two calls paging needs:
//!
//! - `getKeys`: named filter arguments → `{count, sys_id}`
//! - `getRecords`: an encoded query → the matching records

mod table;

pub use table::{TableClient, GET_KEYS, GET_RECORDS};
