//! Core traits for zonedash
//!
//! This module defines the seams between the core logic and its collaborators.
//!
//! - [`IpFetcher`]: Query a public-IP discovery endpoint
//! - [`SnapshotStore`]: Persist the last confirmed public IPs
//! - [`RecordClient`]: Talk to a DNS provider account

pub mod ip_fetcher;
pub mod record_client;
pub mod snapshot_store;

pub use ip_fetcher::IpFetcher;
pub use record_client::{RecordClient, RecordClientFactory};
pub use snapshot_store::{IpSnapshot, SnapshotStore};
