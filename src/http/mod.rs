//! HTTP session module
//!
//! One authenticated reqwest client per [`crate::SnSoap`], shared by every
//! table client it hands out. No retries and no rate limiting happen here:
//! a failed request is returned to the caller as-is.

mod client;

pub use client::{HttpReply, SoapSession};

#[cfg(test)]
mod tests;
