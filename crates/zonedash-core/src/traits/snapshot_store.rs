// # Snapshot Store Trait
//
// Defines the interface for persisting the last confirmed public IPs.
//
// ## Purpose
//
// The IP monitor compares every discovery against the stored snapshot to
// decide whether the public addresses changed. The store follows a plain
// read-modify-write pattern with last-write-wins semantics; there is no
// locking across a load/save pair.
//
// ## Implementations
//
// - In-memory: `MemorySnapshotStore`
// - Config file: `ConfigFileStore` (the `currentIPs` key of `config.json`)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last confirmed public addresses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpSnapshot {
    /// Last known IPv4 address
    #[serde(default)]
    pub ipv4: Option<String>,
    /// Last known IPv6 address
    #[serde(default)]
    pub ipv6: Option<String>,
    /// When a discovery last produced an address
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
}

impl IpSnapshot {
    /// Create a snapshot without a timestamp
    pub fn new(ipv4: Option<String>, ipv6: Option<String>) -> Self {
        Self {
            ipv4,
            ipv6,
            last_update: None,
        }
    }

    /// Merge freshly resolved addresses into this snapshot
    ///
    /// Only the families that resolved are overwritten; `last_update` is
    /// stamped with `now`.
    pub fn merged(
        &self,
        ipv4: Option<&str>,
        ipv6: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            ipv4: ipv4.map(str::to_string).or_else(|| self.ipv4.clone()),
            ipv6: ipv6.map(str::to_string).or_else(|| self.ipv6.clone()),
            last_update: Some(now),
        }
    }
}

/// Trait for snapshot store implementations
///
/// # Thread Safety
///
/// All methods must be safe to call from multiple tasks. Concurrent writers
/// may lose updates; callers accept last-write-wins.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the stored snapshot
    ///
    /// # Returns
    ///
    /// - `Ok(IpSnapshot)`: The stored snapshot (empty if nothing stored yet)
    /// - `Err(Error)`: Storage error
    async fn load(&self) -> Result<IpSnapshot, crate::Error>;

    /// Replace the stored snapshot
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Successfully persisted
    /// - `Err(Error)`: Storage error
    async fn save(&self, snapshot: &IpSnapshot) -> Result<(), crate::Error>;
}
