//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that record how the core calls
//! its collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use zonedash_core::config::{IpProvider, ProviderAccount};
use zonedash_core::error::{Error, Result};
use zonedash_core::record::{DnsRecord, RecordPatch};
use zonedash_core::traits::{
    IpFetcher, IpSnapshot, RecordClient, RecordClientFactory, SnapshotStore,
};

/// An IpFetcher answering from a fixed url -> response table
///
/// Unknown URLs fail like an unreachable host.
pub struct ScriptedFetcher {
    responses: HashMap<String, std::result::Result<String, String>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer `url` with `body`
    pub fn respond(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    /// Fail requests to `url`
    pub fn fail(mut self, url: &str, message: &str) -> Self {
        self.responses
            .insert(url.to_string(), Err(message.to_string()));
        self
    }

    /// URLs fetched so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Create a new fetcher with the same script that shares the call log
    pub fn sharing_calls_with(other: &Self) -> Self {
        Self {
            responses: other.responses.clone(),
            calls: Arc::clone(&other.calls),
        }
    }
}

#[async_trait]
impl IpFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());

        match self.responses.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(message)) => Err(Error::external(url, message.clone())),
            None => Err(Error::external(url, "connection refused")),
        }
    }

    fn fetcher_name(&self) -> &'static str {
        "scripted"
    }
}

/// A SnapshotStore whose writes always fail
pub struct ReadOnlySnapshotStore {
    snapshot: IpSnapshot,
    save_call_count: Arc<AtomicUsize>,
}

impl ReadOnlySnapshotStore {
    pub fn new(snapshot: IpSnapshot) -> Self {
        Self {
            snapshot,
            save_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn save_call_count(&self) -> usize {
        self.save_call_count.load(Ordering::SeqCst)
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            snapshot: other.snapshot.clone(),
            save_call_count: Arc::clone(&other.save_call_count),
        }
    }
}

#[async_trait]
impl SnapshotStore for ReadOnlySnapshotStore {
    async fn load(&self) -> Result<IpSnapshot> {
        Ok(self.snapshot.clone())
    }

    async fn save(&self, _snapshot: &IpSnapshot) -> Result<()> {
        self.save_call_count.fetch_add(1, Ordering::SeqCst);
        Err(Error::state_store("read-only store"))
    }
}

/// Provider with both URLs under `https://{name}.test/`
pub fn provider(name: &str) -> IpProvider {
    IpProvider::new(name, v4_url(name), v6_url(name))
}

pub fn v4_url(name: &str) -> String {
    format!("https://{}.test/v4", name)
}

pub fn v6_url(name: &str) -> String {
    format!("https://{}.test/v6", name)
}

/// Shared state behind MockRecordClient
#[derive(Default)]
struct ZoneState {
    zones: HashMap<String, Vec<DnsRecord>>,
    next_id: u64,
    failing_ids: HashSet<String>,
    fail_list_zones: bool,
    operations: Vec<String>,
}

/// An in-memory RecordClient that tracks calls
///
/// Created records get sequential ids. Operations on ids registered with
/// [`MockRecordClient::fail_on`] return a provider error.
#[derive(Clone)]
pub struct MockRecordClient {
    name: String,
    state: Arc<Mutex<ZoneState>>,
    refresh_call_count: Arc<AtomicUsize>,
}

impl MockRecordClient {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: Arc::new(Mutex::new(ZoneState {
                next_id: 1,
                ..ZoneState::default()
            })),
            refresh_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Seed a zone with records (ids assigned when missing)
    pub fn with_zone(self, zone: &str, records: Vec<DnsRecord>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let mut seeded = Vec::with_capacity(records.len());
            for mut record in records {
                if record.id.is_none() {
                    record.id = Some(state.next_id.to_string());
                    state.next_id += 1;
                }
                seeded.push(record);
            }
            state.zones.insert(zone.to_string(), seeded);
        }
        self
    }

    /// Make every operation on `id` fail
    pub fn fail_on(self, id: &str) -> Self {
        self.state.lock().unwrap().failing_ids.insert(id.to_string());
        self
    }

    /// Make zone listing fail
    pub fn failing_zone_list(self) -> Self {
        self.state.lock().unwrap().fail_list_zones = true;
        self
    }

    pub fn records(&self, zone: &str) -> Vec<DnsRecord> {
        self.state
            .lock()
            .unwrap()
            .zones
            .get(zone)
            .cloned()
            .unwrap_or_default()
    }

    /// Operations performed, e.g. `delete example.com 3`
    pub fn operations(&self) -> Vec<String> {
        self.state.lock().unwrap().operations.clone()
    }

    pub fn refresh_call_count(&self) -> usize {
        self.refresh_call_count.load(Ordering::SeqCst)
    }

    fn check(&self, state: &ZoneState, id: &str) -> Result<()> {
        if state.failing_ids.contains(id) {
            return Err(Error::provider(&self.name, format!("record {} rejected", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordClient for MockRecordClient {
    async fn list_zones(&self) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        if state.fail_list_zones {
            return Err(Error::provider(&self.name, "unauthorized"));
        }
        let mut zones: Vec<String> = state.zones.keys().cloned().collect();
        zones.sort();
        Ok(zones)
    }

    async fn list_records(&self, zone: &str) -> Result<Vec<DnsRecord>> {
        Ok(self.records(zone))
    }

    async fn create_record(&self, zone: &str, record: &DnsRecord) -> Result<DnsRecord> {
        let mut state = self.state.lock().unwrap();
        if record.target().contains("reject") {
            return Err(Error::provider(&self.name, "invalid target"));
        }

        let id = state.next_id.to_string();
        state.next_id += 1;
        let created = record.clone().with_id(id.clone());
        state
            .zones
            .entry(zone.to_string())
            .or_default()
            .push(created.clone());
        state.operations.push(format!("create {} {}", zone, id));
        Ok(created)
    }

    async fn update_record(
        &self,
        zone: &str,
        record_id: &str,
        patch: &RecordPatch,
    ) -> Result<DnsRecord> {
        let mut state = self.state.lock().unwrap();
        self.check(&state, record_id)?;
        state
            .operations
            .push(format!("update {} {}", zone, record_id));

        let record = state
            .zones
            .get_mut(zone)
            .and_then(|records| {
                records
                    .iter_mut()
                    .find(|r| r.id.as_deref() == Some(record_id))
            })
            .ok_or_else(|| Error::not_found(record_id))?;

        if let Some(ttl) = patch.ttl {
            record.ttl = ttl;
        }
        Ok(record.clone())
    }

    async fn delete_record(&self, zone: &str, record_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        self.check(&state, record_id)?;
        state
            .operations
            .push(format!("delete {} {}", zone, record_id));

        if let Some(records) = state.zones.get_mut(zone) {
            records.retain(|r| r.id.as_deref() != Some(record_id));
        }
        Ok(())
    }

    async fn refresh_zone(&self, _zone: &str) -> Result<()> {
        self.refresh_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn client_name(&self) -> &str {
        &self.name
    }
}

/// Hands out pre-built clients by account id
pub struct MockClientFactory {
    clients: HashMap<String, MockRecordClient>,
}

impl MockClientFactory {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    pub fn with_client(mut self, account_id: &str, client: MockRecordClient) -> Self {
        self.clients.insert(account_id.to_string(), client);
        self
    }
}

impl RecordClientFactory for MockClientFactory {
    fn create(&self, account: &ProviderAccount) -> Result<Arc<dyn RecordClient>> {
        let client = self
            .clients
            .get(&account.id)
            .cloned()
            .ok_or_else(|| Error::config(format!("no credentials for {}", account.id)))?;
        Ok(Arc::new(client))
    }
}
