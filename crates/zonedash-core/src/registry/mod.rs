//! Record client registry
//!
//! Maps provider accounts to their [`RecordClient`]s and routes a domain to
//! the client that manages it.
//!
//! The registry is a pure function of the account list: a configuration
//! change builds a new registry instead of mutating the current one.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zonedash_core::registry::ClientRegistry;
//!
//! let registry = ClientRegistry::build(&config.accounts, &OvhClientFactory);
//! let client = registry.client_for_domain("example.com")?;
//! let records = client.list_records("example.com").await?;
//! ```

use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ProviderAccount;
use crate::error::{Error, Result};
use crate::traits::{RecordClient, RecordClientFactory};

/// A client together with the account it was built from
#[derive(Clone)]
pub struct RegisteredClient {
    /// Account id
    pub account_id: String,
    /// Account display name (the id when unnamed)
    pub account_name: String,
    /// Zones the account lists in its configuration
    pub domains: Vec<String>,
    /// The client
    pub client: Arc<dyn RecordClient>,
}

/// Domains of one configured account, kept even when its client was rejected
#[derive(Debug, Clone)]
struct AccountRoute {
    account_id: String,
    domains: Vec<String>,
}

/// Account-ordered set of record clients
#[derive(Clone, Default)]
pub struct ClientRegistry {
    entries: Vec<RegisteredClient>,
    routes: Vec<AccountRoute>,
}

impl ClientRegistry {
    /// Build a registry from account configuration
    ///
    /// Accounts the factory rejects (e.g. missing credentials) are skipped
    /// with a warning; the remaining accounts keep their configured order.
    pub fn build(accounts: &[ProviderAccount], factory: &dyn RecordClientFactory) -> Self {
        let mut entries = Vec::with_capacity(accounts.len());
        let mut routes = Vec::with_capacity(accounts.len());

        for account in accounts {
            routes.push(AccountRoute {
                account_id: account.id.clone(),
                domains: account.domains.clone(),
            });

            match factory.create(account) {
                Ok(client) => {
                    debug!(
                        "Registered {} client for account {}",
                        client.client_name(),
                        account.display_name()
                    );
                    entries.push(RegisteredClient {
                        account_id: account.id.clone(),
                        account_name: account.display_name().to_string(),
                        domains: account.domains.clone(),
                        client,
                    });
                }
                Err(e) => {
                    warn!("Skipping account {}: {}", account.display_name(), e);
                }
            }
        }

        Self { entries, routes }
    }

    /// Number of registered clients
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no client is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered clients in account order
    pub fn entries(&self) -> &[RegisteredClient] {
        &self.entries
    }

    /// The client of one account
    pub fn client(&self, account_id: &str) -> Option<Arc<dyn RecordClient>> {
        self.entries
            .iter()
            .find(|entry| entry.account_id == account_id)
            .map(|entry| Arc::clone(&entry.client))
    }

    /// The client responsible for `domain`
    ///
    /// # Returns
    ///
    /// - The client of the first configured account listing `domain`
    /// - `Err(Error::NoClient)` when that account's client was rejected
    /// - The first registered client when no account lists `domain`
    /// - `Err(Error::NoClient)` when the registry is empty
    pub fn client_for_domain(&self, domain: &str) -> Result<Arc<dyn RecordClient>> {
        let owner = self
            .routes
            .iter()
            .find(|route| route.domains.iter().any(|d| d == domain));

        let client = match owner {
            Some(route) => self.client(&route.account_id),
            None => self.entries.first().map(|entry| Arc::clone(&entry.client)),
        };

        client.ok_or_else(|| Error::NoClient(domain.to_string()))
    }
}
