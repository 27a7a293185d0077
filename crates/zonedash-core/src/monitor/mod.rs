//! Public IP monitor
//!
//! The [`IpMonitor`] resolves the current public IPv4 and IPv6 addresses by
//! walking an ordered list of [`IpProvider`]s, and compares the result with
//! the last confirmed addresses held by a [`SnapshotStore`].
//!
//! ## Fallback Chain
//!
//! ```text
//! providers (enabled, in order)
//!     │
//!     ├── P1 ── ipv4? ──▶ fetch ─▶ trim ─▶ validate ──┐
//!     │         ipv6? ──▶ fetch ─▶ trim ─▶ validate ──┤ first valid value wins
//!     ├── P2 ── (only families still unresolved) ─────┤ per family
//!     └── ...   stop once both families resolved ─────┘
//! ```
//!
//! A failing or malformed provider is logged and skipped. Discovery only
//! fails when no provider is enabled at all.
//!
//! ## Change Detection
//!
//! [`IpMonitor::check_for_change`] reports which families moved away from the
//! stored snapshot. It never touches DNS records; callers decide what to push.

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use crate::config::IpProvider;
use crate::error::{Error, Result};
use crate::traits::{IpFetcher, IpSnapshot, SnapshotStore};

static IPV4_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,3}\.){3}[0-9]{1,3}$").expect("IPv4 pattern is valid")
});

static IPV6_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9a-fA-F]{0,4}:){2,7}[0-9a-fA-F]{0,4}$").expect("IPv6 pattern is valid")
});

/// IP address family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpFamily {
    /// IPv4
    V4,
    /// IPv6
    V6,
}

impl IpFamily {
    /// The provider URL serving this family
    pub fn url<'a>(&self, provider: &'a IpProvider) -> &'a str {
        match self {
            IpFamily::V4 => &provider.ipv4_url,
            IpFamily::V6 => &provider.ipv6_url,
        }
    }

    /// Trim `raw` and check it against the family's address pattern
    ///
    /// The checks are syntactic only: `999.1.1.1` passes as IPv4.
    pub fn validate(&self, raw: &str) -> Result<String> {
        let candidate = raw.trim();
        let pattern = match self {
            IpFamily::V4 => &*IPV4_PATTERN,
            IpFamily::V6 => &*IPV6_PATTERN,
        };

        if pattern.is_match(candidate) {
            Ok(candidate.to_string())
        } else {
            Err(Error::validation(format!(
                "Invalid {} address: {:?}",
                self, candidate
            )))
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpFamily::V4 => write!(f, "IPv4"),
            IpFamily::V6 => write!(f, "IPv6"),
        }
    }
}

/// Addresses resolved by one discovery run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredIps {
    /// Resolved IPv4 address, if any provider yielded one
    pub ipv4: Option<String>,
    /// Resolved IPv6 address, if any provider yielded one
    pub ipv6: Option<String>,
}

impl DiscoveredIps {
    /// Whether neither family resolved
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_none() && self.ipv6.is_none()
    }

    /// Whether both families resolved
    pub fn is_complete(&self) -> bool {
        self.ipv4.is_some() && self.ipv6.is_some()
    }

    fn get(&self, family: IpFamily) -> Option<&String> {
        match family {
            IpFamily::V4 => self.ipv4.as_ref(),
            IpFamily::V6 => self.ipv6.as_ref(),
        }
    }

    fn set(&mut self, family: IpFamily, value: String) {
        match family {
            IpFamily::V4 => self.ipv4 = Some(value),
            IpFamily::V6 => self.ipv6 = Some(value),
        }
    }
}

/// Per-family change flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChanges {
    /// IPv4 resolved to a new value
    pub ipv4: bool,
    /// IPv6 resolved to a new value
    pub ipv6: bool,
}

impl FieldChanges {
    /// Compare a discovery with the previously stored snapshot
    ///
    /// A family that did not resolve never counts as changed.
    pub fn between(new: &DiscoveredIps, old: &IpSnapshot) -> Self {
        Self {
            ipv4: new.ipv4.is_some() && new.ipv4 != old.ipv4,
            ipv6: new.ipv6.is_some() && new.ipv6 != old.ipv6,
        }
    }

    /// Whether any family changed
    pub fn any(&self) -> bool {
        self.ipv4 || self.ipv6
    }
}

/// Result of [`IpMonitor::check_for_change`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpChangeReport {
    /// Whether any family changed
    pub changed: bool,
    /// Addresses resolved by this check
    #[serde(rename = "newIPs")]
    pub new_ips: DiscoveredIps,
    /// Snapshot stored before this check
    #[serde(rename = "oldIPs")]
    pub old_ips: IpSnapshot,
    /// Which families changed
    #[serde(rename = "perFieldChanged")]
    pub per_field_changed: FieldChanges,
}

/// Public IP monitor
///
/// Holds an injected fetcher and snapshot store; all provider calls are made
/// sequentially from the calling task.
pub struct IpMonitor {
    fetcher: Box<dyn IpFetcher>,
    store: Box<dyn SnapshotStore>,
    providers: Vec<IpProvider>,
}

impl IpMonitor {
    /// Create a new monitor
    ///
    /// # Parameters
    ///
    /// - `fetcher`: Fetches the raw body of a provider URL
    /// - `store`: Persists the last confirmed addresses
    /// - `providers`: Provider list in fallback order (disabled entries are ignored)
    pub fn new(
        fetcher: Box<dyn IpFetcher>,
        store: Box<dyn SnapshotStore>,
        providers: Vec<IpProvider>,
    ) -> Self {
        Self {
            fetcher,
            store,
            providers,
        }
    }

    /// Configured providers, including disabled ones
    pub fn providers(&self) -> &[IpProvider] {
        &self.providers
    }

    /// Resolve the current public addresses with the configured providers
    pub async fn discover(&self) -> Result<DiscoveredIps> {
        self.discover_from(&self.providers).await
    }

    /// Resolve the current public addresses with `providers`
    ///
    /// # Returns
    ///
    /// - `Ok(DiscoveredIps)`: Each family possibly `None` when no provider yielded it
    /// - `Err(Error::NoProviders)`: No provider in `providers` is enabled
    pub async fn discover_from(&self, providers: &[IpProvider]) -> Result<DiscoveredIps> {
        let enabled: Vec<&IpProvider> = providers.iter().filter(|p| p.enabled).collect();
        if enabled.is_empty() {
            return Err(Error::NoProviders);
        }

        let mut found = DiscoveredIps::default();

        for provider in enabled {
            if found.is_complete() {
                break;
            }

            for family in [IpFamily::V4, IpFamily::V6] {
                if found.get(family).is_some() {
                    continue;
                }

                match self.query(provider, family).await {
                    Ok(Some(ip)) => {
                        debug!("{} {} resolved via {}", family, ip, provider.name);
                        found.set(family, ip);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("{} lookup via {} failed: {}", family, provider.name, e);
                    }
                }
            }
        }

        if !found.is_empty() {
            self.persist(&found).await;
        }

        Ok(found)
    }

    /// The last confirmed addresses
    pub async fn stored_ips(&self) -> Result<IpSnapshot> {
        self.store.load().await
    }

    /// Run discovery and compare against the stored snapshot
    ///
    /// The snapshot is read before discovery persists its own result, so the
    /// report compares against the addresses confirmed by the previous run.
    pub async fn check_for_change(&self) -> Result<IpChangeReport> {
        let old_ips = self.store.load().await?;
        let new_ips = self.discover().await?;

        let per_field_changed = FieldChanges::between(&new_ips, &old_ips);
        let changed = per_field_changed.any();

        if changed {
            info!(
                "Public IP changed: ipv4 {:?} -> {:?}, ipv6 {:?} -> {:?}",
                old_ips.ipv4, new_ips.ipv4, old_ips.ipv6, new_ips.ipv6
            );
        } else {
            debug!("Public IP unchanged");
        }

        Ok(IpChangeReport {
            changed,
            new_ips,
            old_ips,
            per_field_changed,
        })
    }

    /// One attempt for one provider and family
    ///
    /// `Ok(None)` means the provider has no URL for this family.
    async fn query(&self, provider: &IpProvider, family: IpFamily) -> Result<Option<String>> {
        let url = family.url(provider);
        if url.is_empty() {
            return Ok(None);
        }

        debug!(
            "Querying {} for {} ({}) via {}",
            provider.name,
            family,
            url,
            self.fetcher.fetcher_name()
        );

        let body = self.fetcher.fetch(url).await?;
        family.validate(&body).map(Some)
    }

    /// Merge resolved families into the stored snapshot
    async fn persist(&self, found: &DiscoveredIps) {
        let stored = match self.store.load().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Failed to load IP snapshot, not persisting discovery: {}", e);
                return;
            }
        };

        let merged = stored.merged(found.ipv4.as_deref(), found.ipv6.as_deref(), Utc::now());
        match self.store.save(&merged).await {
            Ok(()) => debug!("IP snapshot saved"),
            Err(e) => warn!("Failed to save IP snapshot: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_validation() {
        assert_eq!(IpFamily::V4.validate(" 8.8.8.8\n").unwrap(), "8.8.8.8");
        assert!(IpFamily::V4.validate("999.1.1.1").is_ok());
        assert!(IpFamily::V4.validate("1.2.3").is_err());
        assert!(IpFamily::V4.validate("<html>1.2.3.4</html>").is_err());
        assert!(IpFamily::V4.validate("").is_err());
    }

    #[test]
    fn test_ipv6_validation() {
        assert!(IpFamily::V6.validate("2001:db8::1").is_ok());
        assert!(IpFamily::V6.validate("::1").is_ok());
        assert!(IpFamily::V6.validate("fe80:0:0:0:0:0:0:1\n").is_ok());
        assert!(IpFamily::V6.validate("1.2.3.4").is_err());
        assert!(IpFamily::V6.validate("2001:db8:zz::1").is_err());
    }

    #[test]
    fn test_validation_error_kind() {
        let err = IpFamily::V4.validate("nope").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_field_changes() {
        let old = IpSnapshot::new(Some("1.1.1.1".into()), Some("::1".into()));

        let same = DiscoveredIps {
            ipv4: Some("1.1.1.1".into()),
            ipv6: None,
        };
        assert!(!FieldChanges::between(&same, &old).any());

        let moved = DiscoveredIps {
            ipv4: Some("1.1.1.2".into()),
            ipv6: Some("::1".into()),
        };
        let changes = FieldChanges::between(&moved, &old);
        assert!(changes.ipv4);
        assert!(!changes.ipv6);
    }

    #[test]
    fn test_report_json_shape() {
        let report = IpChangeReport {
            changed: true,
            new_ips: DiscoveredIps {
                ipv4: Some("1.1.1.2".into()),
                ipv6: None,
            },
            old_ips: IpSnapshot::new(Some("1.1.1.1".into()), None),
            per_field_changed: FieldChanges {
                ipv4: true,
                ipv6: false,
            },
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["changed"], true);
        assert_eq!(json["newIPs"]["ipv4"], "1.1.1.2");
        assert_eq!(json["oldIPs"]["ipv4"], "1.1.1.1");
        assert_eq!(json["perFieldChanged"]["ipv6"], false);
    }
}
