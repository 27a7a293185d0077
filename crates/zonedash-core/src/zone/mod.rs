//! BIND9 zone-file interchange
//!
//! - [`parse`]: zone-file text to an ordered list of records
//! - [`serialize`]: records to zone-file text
//!
//! Only the subset that the dashboard imports and exports is handled: one
//! record per line, `;` comments and the `$ORIGIN` directive. `$TTL`,
//! `$INCLUDE` and parenthesized multi-line records are not supported.
//!
//! ## Example
//!
//! ```rust
//! use zonedash_core::zone;
//!
//! let text = "$ORIGIN example.com.\nwww 300 IN A 1.2.3.4\n";
//! let records = zone::parse("example.com", text);
//! assert_eq!(records.len(), 1);
//!
//! let exported = zone::serialize("example.com", &records);
//! assert!(exported.contains("www\t300\tIN\tA\t1.2.3.4"));
//! ```

pub mod parser;
pub mod serializer;

pub use parser::{ZoneParser, parse};
pub use serializer::{serialize, serialize_at};

use crate::record::DnsRecord;

/// Result of parsing a zone file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneDocument {
    /// Origin in effect after the last `$ORIGIN` directive
    pub origin: String,
    /// Records in source order, SOA excluded
    pub records: Vec<DnsRecord>,
}
