//! Configuration types for zonedash
//!
//! The dashboard persists a single JSON document (`config.json`):
//!
//! ```json
//! {
//!   "accounts": [{ "id": "main", "name": "Main", "domains": ["example.com"], "appKey": "..." }],
//!   "ipProviders": [{ "name": "ipify", "ipv4Url": "https://api.ipify.org", "ipv6Url": "https://api6.ipify.org", "enabled": true }],
//!   "autoUpdate": { "enabled": false, "checkInterval": 300, "targetDomains": [] },
//!   "currentIPs": { "ipv4": null, "ipv6": null, "lastUpdate": null }
//! }
//! ```
//!
//! Keys this crate does not know about are kept and written back unchanged.
//! The settings UI writes `null` for cleared fields (a cleared number input
//! becomes `NaN`, which JSON stores as `null`); such fields load as their
//! defaults.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::traits::IpSnapshot;

/// Smallest accepted auto-update interval, in seconds
pub const MIN_CHECK_INTERVAL_SECS: u64 = 60;

/// Main dashboard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfig {
    /// DNS provider accounts
    #[serde(default, alias = "ovhAccounts", deserialize_with = "null_as_default")]
    pub accounts: Vec<ProviderAccount>,

    /// IP discovery providers, in fallback order
    #[serde(default, deserialize_with = "null_as_default")]
    pub ip_providers: Vec<IpProvider>,

    /// Periodic IP check settings
    #[serde(default, deserialize_with = "null_as_default")]
    pub auto_update: AutoUpdateConfig,

    /// Last confirmed public IPs
    #[serde(default, rename = "currentIPs", deserialize_with = "null_as_default")]
    pub current_ips: IpSnapshot,

    /// Keys owned by other parts of the dashboard
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DashboardConfig {
    /// Create a configuration with the default IP providers and no accounts
    pub fn new() -> Self {
        Self {
            accounts: Vec::new(),
            ip_providers: IpProvider::defaults(),
            auto_update: AutoUpdateConfig::default(),
            current_ips: IpSnapshot::default(),
            extra: Map::new(),
        }
    }

    /// IP providers that take part in discovery, in order
    pub fn enabled_providers(&self) -> Vec<IpProvider> {
        self.ip_providers
            .iter()
            .filter(|provider| provider.enabled)
            .cloned()
            .collect()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        let mut seen = HashSet::new();
        for account in &self.accounts {
            account.validate()?;
            if !seen.insert(account.id.as_str()) {
                return Err(crate::Error::config(format!(
                    "Duplicate account id: {}",
                    account.id
                )));
            }
        }

        for provider in &self.ip_providers {
            provider.validate()?;
        }

        self.auto_update.validate()?;

        Ok(())
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A DNS provider account
///
/// Credentials and endpoint-specific settings are kept as free-form keys and
/// interpreted by the record client factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderAccount {
    /// Unique account id
    pub id: String,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Provider API endpoint (e.g. "ovh-eu")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Zones this account manages
    #[serde(default, deserialize_with = "null_as_default")]
    pub domains: Vec<String>,

    /// Credentials and other client settings
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl ProviderAccount {
    /// Create an account with no domains or settings
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            endpoint: None,
            domains: Vec::new(),
            settings: Map::new(),
        }
    }

    /// Add a managed domain
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domains.push(domain.into());
        self
    }

    /// Set a client setting
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), Value::String(value.into()));
        self
    }

    /// Display name, falling back to the id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Whether this account lists `domain` among its zones
    pub fn manages(&self, domain: &str) -> bool {
        self.domains.iter().any(|d| d == domain)
    }

    /// A non-empty string setting
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Validate the account entry
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.id.trim().is_empty() {
            return Err(crate::Error::config("Account id cannot be empty"));
        }
        Ok(())
    }
}

/// A public-IP discovery provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpProvider {
    /// Optional id used by the settings UI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Provider name (for logging)
    pub name: String,

    /// Endpoint returning the IPv4 address as plain text
    #[serde(default, deserialize_with = "null_as_default")]
    pub ipv4_url: String,

    /// Endpoint returning the IPv6 address as plain text
    #[serde(default, deserialize_with = "null_as_default")]
    pub ipv6_url: String,

    /// Whether this provider takes part in discovery
    #[serde(default = "default_enabled", deserialize_with = "null_as_enabled")]
    pub enabled: bool,
}

impl IpProvider {
    /// Create an enabled provider
    pub fn new(
        name: impl Into<String>,
        ipv4_url: impl Into<String>,
        ipv6_url: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            ipv4_url: ipv4_url.into(),
            ipv6_url: ipv6_url.into(),
            enabled: true,
        }
    }

    /// Enable or disable the provider
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Well-known plain-text IP services
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("ipify", "https://api.ipify.org", "https://api6.ipify.org"),
            Self::new(
                "icanhazip",
                "https://ipv4.icanhazip.com",
                "https://ipv6.icanhazip.com",
            ),
            Self::new("ifconfig.co", "https://ipv4.ifconfig.co", "https://ipv6.ifconfig.co")
                .with_enabled(false),
        ]
    }

    /// Validate the provider entry
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.name.trim().is_empty() {
            return Err(crate::Error::config("IP provider name cannot be empty"));
        }

        for url in [&self.ipv4_url, &self.ipv6_url] {
            if !url.is_empty() && !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(crate::Error::config(format!(
                    "IP provider {} URL must use HTTP or HTTPS scheme. Got: {}",
                    self.name, url
                )));
            }
        }

        Ok(())
    }
}

/// Periodic IP check settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoUpdateConfig {
    /// Whether periodic checks run
    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,

    /// Seconds between checks
    #[serde(
        default = "default_check_interval",
        deserialize_with = "null_as_check_interval"
    )]
    pub check_interval: u64,

    /// Zones whose address records follow the public IPs
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_domains: Vec<String>,
}

impl AutoUpdateConfig {
    /// Validate the auto-update settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.enabled && self.check_interval < MIN_CHECK_INTERVAL_SECS {
            return Err(crate::Error::config(format!(
                "Auto-update checkInterval must be at least {} seconds. Got: {}",
                MIN_CHECK_INTERVAL_SECS, self.check_interval
            )));
        }
        Ok(())
    }
}

impl Default for AutoUpdateConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            check_interval: default_check_interval(),
            target_domains: Vec::new(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_check_interval() -> u64 {
    300
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_enabled<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_else(default_enabled))
}

fn null_as_check_interval<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or_else(default_check_interval))
}
