// # Config File Store
//
// File-based store for the dashboard configuration, with crash recovery.
//
// ## Purpose
//
// The dashboard keeps accounts, IP providers, auto-update settings and the
// last confirmed public IPs in one JSON document. This store owns that
// document: it loads it once, hands out copies, and writes every change back
// to disk immediately.
//
// ## Crash Recovery
//
// - Atomic writes: Uses write-then-rename for atomicity
// - Corruption detection: Validates JSON on load
// - Automatic backup: Keeps .backup of last known good document
// - Recovery: Falls back to backup if corruption detected
// - No silent reset: an unreadable document with no usable backup is an
//   error, never replaced by defaults
//
// ## Snapshot Storage
//
// `ConfigFileStore` implements `SnapshotStore` on the `currentIPs` key. A save
// rewrites the whole document with only that key replaced.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::DashboardConfig;
use crate::traits::{IpSnapshot, SnapshotStore};

/// File-backed dashboard configuration
///
/// # Example
///
/// ```rust,no_run
/// use zonedash_core::state::ConfigFileStore;
/// use zonedash_core::traits::{IpSnapshot, SnapshotStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = ConfigFileStore::new("config.json").await?;
///
///     // Replace currentIPs (atomically written to disk)
///     store.save(&IpSnapshot::new(Some("1.2.3.4".into()), None)).await?;
///
///     let snapshot = store.load().await?;
///     assert_eq!(snapshot.ipv4.as_deref(), Some("1.2.3.4"));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ConfigFileStore {
    path: PathBuf,
    config: Arc<RwLock<DashboardConfig>>,
}

impl ConfigFileStore {
    /// Create or load a config file store
    ///
    /// This will:
    /// 1. Try to load the existing document
    /// 2. If corruption detected, try to load from backup
    /// 3. If both fail, return [`Error::Config`] and leave both files alone
    /// 4. Create parent directories if needed
    ///
    /// A missing file means the default configuration; it is not created
    /// until the first write.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::config(format!(
                        "Failed to create config directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let config = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            config: Arc::new(RwLock::new(config)),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A copy of the current configuration
    pub async fn config(&self) -> DashboardConfig {
        self.config.read().await.clone()
    }

    /// Apply `change` to the configuration and write it to disk
    ///
    /// The in-memory copy is only replaced once the write succeeded.
    pub async fn update<F>(&self, change: F) -> Result<(), Error>
    where
        F: FnOnce(&mut DashboardConfig),
    {
        let mut guard = self.config.write().await;
        let mut next = guard.clone();
        change(&mut next);
        self.write_config(&next).await?;
        *guard = next;
        Ok(())
    }

    /// Replace the whole configuration
    pub async fn replace(&self, config: DashboardConfig) -> Result<(), Error> {
        self.update(|current| *current = config).await
    }

    async fn load_with_recovery(path: &Path) -> Result<DashboardConfig, Error> {
        let err = match Self::load_config(path).await {
            Ok(config) => {
                tracing::debug!(
                    "Loaded config from file: {} accounts, {} IP providers",
                    config.accounts.len(),
                    config.ip_providers.len()
                );
                return Ok(config);
            }
            Err(err @ Error::Json(_)) => err,
            Err(err) => return Err(err),
        };

        tracing::warn!(
            "Config file appears corrupted: {}. Attempting recovery from backup.",
            err
        );

        let backup_path = Self::backup_path(path);
        if !backup_path.exists() {
            return Err(Error::config(format!(
                "{} cannot be parsed and no backup exists ({}). Fix or remove the file.",
                path.display(),
                err
            )));
        }

        match Self::load_config(&backup_path).await {
            Ok(config) => {
                tracing::info!("Recovered config from backup");
                if let Err(restore_err) = Self::restore_from_backup(path, &backup_path).await {
                    tracing::error!(
                        "Failed to restore config file from backup: {}",
                        restore_err
                    );
                }
                Ok(config)
            }
            Err(backup_err) => Err(Error::config(format!(
                "{} cannot be parsed ({}) and its backup is unusable ({}). Fix or remove the file.",
                path.display(),
                err,
                backup_err
            ))),
        }
    }

    async fn load_config(path: &Path) -> Result<DashboardConfig, Error> {
        if !path.exists() {
            tracing::debug!("Config file does not exist: {}", path.display());
            return Ok(DashboardConfig::default());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(serde_json::from_str(&content)?)
    }

    /// Write the document atomically
    async fn write_config(&self, config: &DashboardConfig) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|e| Error::state_store(format!("Failed to serialize config: {}", e)))?;

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Config written to file: {}", self.path.display());
        Ok(())
    }

    async fn restore_from_backup(path: &Path, backup_path: &Path) -> Result<(), Error> {
        fs::copy(backup_path, path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to restore from backup {} to {}: {}",
                backup_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::info!("Restored config file from backup");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl SnapshotStore for ConfigFileStore {
    async fn load(&self) -> Result<IpSnapshot, Error> {
        Ok(self.config.read().await.current_ips.clone())
    }

    async fn save(&self, snapshot: &IpSnapshot) -> Result<(), Error> {
        let snapshot = snapshot.clone();
        self.update(|config| config.current_ips = snapshot).await
    }
}
