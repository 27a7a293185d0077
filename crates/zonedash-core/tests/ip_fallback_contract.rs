//! Contract Test: IP Discovery Fallback Chain
//!
//! This test verifies that public IP discovery walks providers in order,
//! survives individual provider failures and reports changes against the
//! stored snapshot.
//!
//! Constraints verified:
//! - Providers are queried in list order, one attempt per family
//! - The first valid value wins per family, independently
//! - Iteration stops once both families are resolved
//! - Discovery fails only when no provider is enabled
//! - Resolved families are merged into the stored snapshot
//! - Change detection compares against the snapshot stored before the run

mod common;

use common::*;
use zonedash_core::config::IpProvider;
use zonedash_core::error::Error;
use zonedash_core::monitor::IpMonitor;
use zonedash_core::state::MemorySnapshotStore;
use zonedash_core::traits::{IpSnapshot, SnapshotStore};

fn monitor(
    fetcher: &ScriptedFetcher,
    store: &MemorySnapshotStore,
    providers: Vec<IpProvider>,
) -> IpMonitor {
    IpMonitor::new(
        Box::new(ScriptedFetcher::sharing_calls_with(fetcher)),
        Box::new(store.clone()),
        providers,
    )
}

#[tokio::test]
async fn failing_provider_falls_back_to_next() {
    let fetcher = ScriptedFetcher::new()
        .fail(&v4_url("p1"), "timeout")
        .respond(&v4_url("p2"), "8.8.8.8\n");
    let store = MemorySnapshotStore::new();

    let found = monitor(&fetcher, &store, vec![provider("p1"), provider("p2")])
        .discover()
        .await
        .unwrap();

    assert_eq!(found.ipv4.as_deref(), Some("8.8.8.8"));
    assert_eq!(found.ipv6, None);

    let calls = fetcher.calls();
    let p1 = calls.iter().position(|u| *u == v4_url("p1")).unwrap();
    let p2 = calls.iter().position(|u| *u == v4_url("p2")).unwrap();
    assert!(p1 < p2, "P1 must be attempted before P2: {:?}", calls);
}

#[tokio::test]
async fn invalid_body_counts_as_failure() {
    let fetcher = ScriptedFetcher::new()
        .respond(&v4_url("p1"), "<html>rate limited</html>")
        .respond(&v4_url("p2"), "1.2.3.4");
    let store = MemorySnapshotStore::new();

    let found = monitor(&fetcher, &store, vec![provider("p1"), provider("p2")])
        .discover()
        .await
        .unwrap();

    assert_eq!(found.ipv4.as_deref(), Some("1.2.3.4"));
}

#[tokio::test]
async fn families_resolve_independently() {
    let fetcher = ScriptedFetcher::new()
        .respond(&v4_url("p1"), "1.1.1.1")
        .fail(&v6_url("p1"), "no route to host")
        .respond(&v4_url("p2"), "2.2.2.2")
        .respond(&v6_url("p2"), "2001:db8::2");
    let store = MemorySnapshotStore::new();

    let found = monitor(&fetcher, &store, vec![provider("p1"), provider("p2")])
        .discover()
        .await
        .unwrap();

    assert_eq!(found.ipv4.as_deref(), Some("1.1.1.1"));
    assert_eq!(found.ipv6.as_deref(), Some("2001:db8::2"));
    assert!(
        !fetcher.calls().contains(&v4_url("p2")),
        "Resolved IPv4 must not be fetched again"
    );
}

#[tokio::test]
async fn stops_once_both_families_resolved() {
    let fetcher = ScriptedFetcher::new()
        .respond(&v4_url("p1"), "1.1.1.1")
        .respond(&v6_url("p1"), "2001:db8::1");
    let store = MemorySnapshotStore::new();

    monitor(&fetcher, &store, vec![provider("p1"), provider("p2"), provider("p3")])
        .discover()
        .await
        .unwrap();

    assert_eq!(fetcher.calls(), vec![v4_url("p1"), v6_url("p1")]);
}

#[tokio::test]
async fn disabled_and_urlless_providers_are_not_fetched() {
    let fetcher = ScriptedFetcher::new().respond(&v4_url("p3"), "3.3.3.3");
    let store = MemorySnapshotStore::new();

    let providers = vec![
        provider("p1").with_enabled(false),
        IpProvider::new("p2", "", ""),
        IpProvider::new("p3", v4_url("p3"), ""),
    ];

    let found = monitor(&fetcher, &store, providers).discover().await.unwrap();

    assert_eq!(found.ipv4.as_deref(), Some("3.3.3.3"));
    assert_eq!(fetcher.calls(), vec![v4_url("p3")]);
}

#[tokio::test]
async fn no_enabled_provider_is_an_error() {
    let fetcher = ScriptedFetcher::new();
    let store = MemorySnapshotStore::new();

    let err = monitor(&fetcher, &store, vec![provider("p1").with_enabled(false)])
        .discover()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoProviders));

    let err = monitor(&fetcher, &store, Vec::new())
        .discover()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoProviders));
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn nothing_resolved_is_not_an_error_and_not_persisted() {
    let fetcher = ScriptedFetcher::new();
    let stored = IpSnapshot::new(Some("9.9.9.9".into()), None);
    let store = MemorySnapshotStore::with_snapshot(stored.clone());

    let found = monitor(&fetcher, &store, vec![provider("p1")])
        .discover()
        .await
        .unwrap();

    assert!(found.is_empty());
    assert_eq!(store.load().await.unwrap(), stored);
}

#[tokio::test]
async fn discovery_merges_into_snapshot() {
    let fetcher = ScriptedFetcher::new().respond(&v4_url("p1"), "1.1.1.2");
    let store = MemorySnapshotStore::with_snapshot(IpSnapshot::new(
        Some("1.1.1.1".into()),
        Some("2001:db8::1".into()),
    ));

    monitor(&fetcher, &store, vec![provider("p1")])
        .discover()
        .await
        .unwrap();

    let snapshot = store.load().await.unwrap();
    assert_eq!(snapshot.ipv4.as_deref(), Some("1.1.1.2"));
    assert_eq!(snapshot.ipv6.as_deref(), Some("2001:db8::1"));
    assert!(snapshot.last_update.is_some());
}

#[tokio::test]
async fn discover_from_overrides_configured_providers() {
    let fetcher = ScriptedFetcher::new().respond(&v4_url("other"), "4.4.4.4");
    let store = MemorySnapshotStore::new();

    let found = monitor(&fetcher, &store, vec![provider("configured")])
        .discover_from(&[provider("other")])
        .await
        .unwrap();

    assert_eq!(found.ipv4.as_deref(), Some("4.4.4.4"));
    assert!(!fetcher.calls().contains(&v4_url("configured")));
}

#[tokio::test]
async fn change_detection_reports_per_family() {
    let fetcher = ScriptedFetcher::new().respond(&v4_url("p1"), "1.1.1.2");
    let store = MemorySnapshotStore::with_snapshot(IpSnapshot::new(Some("1.1.1.1".into()), None));

    let report = monitor(&fetcher, &store, vec![provider("p1")])
        .check_for_change()
        .await
        .unwrap();

    assert!(report.changed);
    assert!(report.per_field_changed.ipv4);
    assert!(!report.per_field_changed.ipv6);
    assert_eq!(report.old_ips.ipv4.as_deref(), Some("1.1.1.1"));
    assert_eq!(report.new_ips.ipv4.as_deref(), Some("1.1.1.2"));
}

#[tokio::test]
async fn second_check_with_same_ip_reports_no_change() {
    let fetcher = ScriptedFetcher::new().respond(&v4_url("p1"), "1.1.1.2");
    let store = MemorySnapshotStore::with_snapshot(IpSnapshot::new(Some("1.1.1.1".into()), None));
    let monitor = monitor(&fetcher, &store, vec![provider("p1")]);

    assert!(monitor.check_for_change().await.unwrap().changed);

    let report = monitor.check_for_change().await.unwrap();
    assert!(!report.changed);
    assert_eq!(report.old_ips.ipv4.as_deref(), Some("1.1.1.2"));
    assert_eq!(monitor.stored_ips().await.unwrap().ipv4.as_deref(), Some("1.1.1.2"));
}

#[tokio::test]
async fn persistence_failure_does_not_fail_discovery() {
    let fetcher = ScriptedFetcher::new().respond(&v4_url("p1"), "1.1.1.1");
    let store = ReadOnlySnapshotStore::new(IpSnapshot::default());

    let monitor = IpMonitor::new(
        Box::new(ScriptedFetcher::sharing_calls_with(&fetcher)),
        Box::new(ReadOnlySnapshotStore::sharing_counters_with(&store)),
        vec![provider("p1")],
    );

    let found = monitor.discover().await.unwrap();
    assert_eq!(found.ipv4.as_deref(), Some("1.1.1.1"));
    assert_eq!(store.save_call_count(), 1);
}
