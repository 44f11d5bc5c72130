//! Visit analytics helpers
//!
//! Resolves the requester address recorded with every redirect.

pub mod ip_extractor;

pub use ip_extractor::{extract_client_ip, resolve_client_address};
