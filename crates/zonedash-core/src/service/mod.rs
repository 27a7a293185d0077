//! Zone service
//!
//! High-level record operations on top of a [`ClientRegistry`]:
//!
//! - Single-record create, update and delete, each followed by a zone refresh
//! - Bulk update and bulk delete through the [`BatchExecutor`]
//! - Zone-file import (optionally replacing existing records) and export
//! - Domain listing across all accounts
//!
//! Every change is routed to the client responsible for the zone. Bulk and
//! import operations report per-item outcomes; only a missing client or a
//! failed record listing aborts them.

use serde::Serialize;
use tracing::{info, warn};

use crate::batch::{BatchExecutor, BatchResult, BatchSummary};
use crate::error::{Error, Result};
use crate::record::{DnsRecord, RecordPatch, RecordType};
use crate::registry::ClientRegistry;
use crate::traits::RecordClient;
use crate::zone;

/// A zone and the account that serves it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEntry {
    /// Zone name
    pub domain: String,
    /// Account id
    pub account_id: String,
    /// Account display name
    pub account_name: String,
}

/// Result of [`ZoneService::import_zone`]
#[derive(Debug, Serialize)]
pub struct ZoneImport {
    /// Records parsed from the zone file
    pub parsed: usize,
    /// Outcome of removing existing records (replace mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<BatchSummary>,
    /// Per-record outcome of creating the parsed records
    pub created: BatchResult<DnsRecord, Error>,
}

/// Record operations across all configured accounts
#[derive(Clone)]
pub struct ZoneService {
    registry: ClientRegistry,
}

impl ZoneService {
    /// Create a service over `registry`
    pub fn new(registry: ClientRegistry) -> Self {
        Self { registry }
    }

    /// The underlying registry
    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// Every zone of every account
    ///
    /// An account whose zone listing fails is logged and skipped.
    pub async fn all_domains(&self) -> Vec<DomainEntry> {
        let mut domains = Vec::new();

        for entry in self.registry.entries() {
            match entry.client.list_zones().await {
                Ok(zones) => domains.extend(zones.into_iter().map(|domain| DomainEntry {
                    domain,
                    account_id: entry.account_id.clone(),
                    account_name: entry.account_name.clone(),
                })),
                Err(e) => warn!("Failed to list zones for account {}: {}", entry.account_id, e),
            }
        }

        domains
    }

    /// All records of a zone
    pub async fn records(&self, zone: &str) -> Result<Vec<DnsRecord>> {
        self.registry.client_for_domain(zone)?.list_records(zone).await
    }

    /// Create a record and refresh the zone
    pub async fn create_record(&self, zone: &str, record: &DnsRecord) -> Result<DnsRecord> {
        let client = self.registry.client_for_domain(zone)?;
        create_and_refresh(client.as_ref(), zone, record).await
    }

    /// Update a record and refresh the zone
    pub async fn update_record(
        &self,
        zone: &str,
        record_id: &str,
        patch: &RecordPatch,
    ) -> Result<DnsRecord> {
        let client = self.registry.client_for_domain(zone)?;
        update_and_refresh(client.as_ref(), zone, record_id, patch).await
    }

    /// Delete a record and refresh the zone
    pub async fn delete_record(&self, zone: &str, record_id: &str) -> Result<()> {
        let client = self.registry.client_for_domain(zone)?;
        delete_and_refresh(client.as_ref(), zone, record_id).await
    }

    /// Apply the same patch to several records, one after another
    pub async fn bulk_update(
        &self,
        zone: &str,
        record_ids: Vec<String>,
        patch: &RecordPatch,
    ) -> Result<BatchResult<DnsRecord, Error>> {
        let client = self.registry.client_for_domain(zone)?;
        let client = client.as_ref();

        Ok(BatchExecutor::new(format!("bulk-update {}", zone))
            .run(record_ids, |id| async move {
                update_and_refresh(client, zone, &id, patch).await
            })
            .await)
    }

    /// Delete several records, one after another
    pub async fn bulk_delete(
        &self,
        zone: &str,
        record_ids: Vec<String>,
    ) -> Result<BatchResult<(), Error>> {
        let client = self.registry.client_for_domain(zone)?;
        let client = client.as_ref();

        Ok(BatchExecutor::new(format!("bulk-delete {}", zone))
            .run(record_ids, |id| async move {
                delete_and_refresh(client, zone, &id).await
            })
            .await)
    }

    /// Import a BIND9 zone file
    ///
    /// With `replace_all`, every existing record except SOA and apex NS is
    /// deleted first; failed deletions are logged and do not stop the import.
    /// Each parsed record is then created in file order.
    pub async fn import_zone(
        &self,
        zone: &str,
        text: &str,
        replace_all: bool,
    ) -> Result<ZoneImport> {
        let client = self.registry.client_for_domain(zone)?;
        let client = client.as_ref();

        let records = zone::parse(zone, text);
        info!("Importing {} records into {}", records.len(), zone);

        let removed = if replace_all {
            let doomed: Vec<String> = client
                .list_records(zone)
                .await?
                .into_iter()
                .filter(|record| !is_protected(record))
                .filter_map(|record| record.id)
                .collect();

            let result = BatchExecutor::new(format!("import-clear {}", zone))
                .run(doomed, |id| async move {
                    delete_and_refresh(client, zone, &id).await
                })
                .await;
            Some(result.summary())
        } else {
            None
        };

        let parsed = records.len();
        let created = BatchExecutor::new(format!("import {}", zone))
            .run(records.into_iter().map(Labeled).collect(), |Labeled(record)| async move {
                create_and_refresh(client, zone, &record).await
            })
            .await;

        Ok(ZoneImport {
            parsed,
            removed,
            created,
        })
    }

    /// Export a zone as BIND9 zone-file text
    pub async fn export_zone(&self, zone: &str) -> Result<String> {
        let records = self.records(zone).await?;
        Ok(zone::serialize(zone, &records))
    }
}

/// SOA and apex NS records survive a replacing import
fn is_protected(record: &DnsRecord) -> bool {
    match record.record_type() {
        RecordType::Soa => true,
        RecordType::Ns => record.is_apex(),
        _ => false,
    }
}

/// Batch item label for a record that has no id yet
struct Labeled(DnsRecord);

impl std::fmt::Display for Labeled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let owner = if self.0.owner.is_empty() {
            "@"
        } else {
            &self.0.owner
        };
        write!(f, "{} {} {}", owner, self.0.record_type(), self.0.target())
    }
}

async fn create_and_refresh(
    client: &dyn RecordClient,
    zone: &str,
    record: &DnsRecord,
) -> Result<DnsRecord> {
    let created = client.create_record(zone, record).await?;
    client.refresh_zone(zone).await?;
    Ok(created)
}

async fn update_and_refresh(
    client: &dyn RecordClient,
    zone: &str,
    record_id: &str,
    patch: &RecordPatch,
) -> Result<DnsRecord> {
    let updated = client.update_record(zone, record_id, patch).await?;
    client.refresh_zone(zone).await?;
    Ok(updated)
}

async fn delete_and_refresh(client: &dyn RecordClient, zone: &str, record_id: &str) -> Result<()> {
    client.delete_record(zone, record_id).await?;
    client.refresh_zone(zone).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordData;

    #[test]
    fn test_protected_records() {
        let soa = DnsRecord::new(
            "",
            RecordData::Soa {
                target: "ns1.example.com. admin.example.com. 1 2 3 4 5".into(),
            },
        );
        let apex_ns = DnsRecord::new(
            "",
            RecordData::Ns {
                target: "ns1.example.com".into(),
            },
        );
        let delegated_ns = DnsRecord::new(
            "sub",
            RecordData::Ns {
                target: "ns1.other.net".into(),
            },
        );
        let a = DnsRecord::new(
            "",
            RecordData::A {
                target: "1.2.3.4".into(),
            },
        );

        assert!(is_protected(&soa));
        assert!(is_protected(&apex_ns));
        assert!(!is_protected(&delegated_ns));
        assert!(!is_protected(&a));
    }

    #[test]
    fn test_import_label() {
        let record = DnsRecord::new(
            "",
            RecordData::Txt {
                target: "v=spf1 -all".into(),
            },
        );
        assert_eq!(Labeled(record).to_string(), "@ TXT v=spf1 -all");
    }
}
