// # Record Client Trait
//
// Defines the interface to a DNS provider account: zone listing, record
// CRUD and zone refresh.
//
// The concrete client (authentication, request signing, transport) lives
// outside this crate. Bulk operations, zone import and zone export are built
// on top of this trait in `ZoneService`.
//
// ## Usage
//
// ```rust,ignore
// use zonedash_core::RecordClient;
//
// async fn show(client: &dyn RecordClient) -> zonedash_core::Result<()> {
//     for record in client.list_records("example.com").await? {
//         println!("{} {} {}", record.owner, record.record_type(), record.target());
//     }
//     Ok(())
// }
// ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ProviderAccount;
use crate::record::{DnsRecord, RecordPatch};

/// Trait for DNS provider clients
///
/// Every method is a single remote call. Clients must not retry, batch or
/// refresh on their own; `ZoneService` decides when a zone refresh follows a
/// change.
#[async_trait]
pub trait RecordClient: Send + Sync {
    /// List the zones managed by this account
    async fn list_zones(&self) -> Result<Vec<String>, crate::Error>;

    /// List every record of a zone
    async fn list_records(&self, zone: &str) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create a record
    ///
    /// # Returns
    ///
    /// - `Ok(DnsRecord)`: The created record, with its provider id
    /// - `Err(Error)`: If the provider rejected the record
    async fn create_record(
        &self,
        zone: &str,
        record: &DnsRecord,
    ) -> Result<DnsRecord, crate::Error>;

    /// Apply a partial update to an existing record
    async fn update_record(
        &self,
        zone: &str,
        record_id: &str,
        patch: &RecordPatch,
    ) -> Result<DnsRecord, crate::Error>;

    /// Delete a record
    async fn delete_record(&self, zone: &str, record_id: &str) -> Result<(), crate::Error>;

    /// Ask the provider to publish pending changes of a zone
    async fn refresh_zone(&self, zone: &str) -> Result<(), crate::Error>;

    /// Get the client name (for logging/debugging)
    fn client_name(&self) -> &str;
}

/// Helper trait for constructing record clients from account configuration
pub trait RecordClientFactory: Send + Sync {
    /// Create a client for one provider account
    ///
    /// # Returns
    ///
    /// - `Ok(Arc<dyn RecordClient>)`: The client
    /// - `Err(Error)`: If the account is incomplete (e.g. missing credentials)
    fn create(&self, account: &ProviderAccount)
    -> Result<Arc<dyn RecordClient>, crate::Error>;
}
