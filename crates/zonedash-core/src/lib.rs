// # zonedash-core
//
// Core library for the multi-account DNS dashboard.
//
// ## Architecture Overview
//
// - **zone**: BIND9 zone-file parser and serializer (pure, synchronous)
// - **IpMonitor**: Public IP discovery over an ordered provider fallback
//   chain, with change detection against a stored snapshot
// - **BatchExecutor**: Sequential per-item execution that reports partial
//   failure instead of aborting
// - **ZoneService**: Record operations, bulk edits, zone import and export
//   over a **ClientRegistry** of provider accounts
//
// Collaborators are injected through traits:
// - **IpFetcher**: Fetch the body of an IP discovery endpoint
// - **SnapshotStore**: Persist the last confirmed public IPs
// - **RecordClient**: Talk to a DNS provider account
//
// ## Design Principles
//
// 1. **Keep going, report everything**: one bad zone line, provider or batch
//    item never aborts the surrounding operation
// 2. **Library-First**: The CLI is a thin composition root
// 3. **Pure construction**: Registries are rebuilt from configuration, never
//    mutated in place

pub mod batch;
pub mod config;
pub mod error;
pub mod monitor;
pub mod record;
pub mod registry;
pub mod service;
pub mod state;
pub mod traits;
pub mod zone;

// Re-export core types for convenience
pub use batch::{BatchExecutor, BatchOutcome, BatchResult, BatchSummary};
pub use config::{AutoUpdateConfig, DashboardConfig, IpProvider, ProviderAccount};
pub use error::{Error, Result};
pub use monitor::{DiscoveredIps, IpChangeReport, IpMonitor};
pub use record::{DnsRecord, RecordData, RecordPatch, RecordType};
pub use registry::ClientRegistry;
pub use service::ZoneService;
pub use state::{ConfigFileStore, MemorySnapshotStore};
pub use traits::{IpFetcher, IpSnapshot, RecordClient, RecordClientFactory, SnapshotStore};
