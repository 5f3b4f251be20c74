//! Key-value storage tiers.
//!
//! Three levels, tried from the preferred one downwards:
//!
//! - `Durable`: files under the OS data directory; survives restarts.
//! - `Session`: files under a per-session directory in the temp dir.
//! - `Memory`: a map that lives as long as the process.
//!
//! A tier counts as available only if a probe write and remove succeed.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::config::StorageConfig;
use crate::error::StorageError;

const PROBE_KEY: &str = "__storage_test__";
const RECORD_EXT: &str = "json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageTier {
    Durable,
    Session,
    Memory,
}

impl StorageTier {
    /// This tier followed by every lower one.
    pub fn fallback_chain(self) -> &'static [StorageTier] {
        match self {
            StorageTier::Durable => &[
                StorageTier::Durable,
                StorageTier::Session,
                StorageTier::Memory,
            ],
            StorageTier::Session => &[StorageTier::Session, StorageTier::Memory],
            StorageTier::Memory => &[StorageTier::Memory],
        }
    }

    /// Whether data written here survives the process.
    pub fn is_persistent(self) -> bool {
        !matches!(self, StorageTier::Memory)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageTier::Durable => "durable",
            StorageTier::Session => "session",
            StorageTier::Memory => "memory",
        }
    }
}

impl core::fmt::Display for StorageTier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for StorageTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "durable" | "local" => Ok(StorageTier::Durable),
            "session" => Ok(StorageTier::Session),
            "memory" => Ok(StorageTier::Memory),
            other => Err(format!("unknown storage tier: {other}")),
        }
    }
}

/// String key-value store holding serialized records.
pub trait KeyValueStore: Send + Sync + core::fmt::Debug {
    fn tier(&self) -> StorageTier;

    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Remove every record in this store.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Write and remove a probe record.
pub fn probe(store: &dyn KeyValueStore) -> Result<(), StorageError> {
    store.set(PROBE_KEY, PROBE_KEY)?;
    store.remove(PROBE_KEY)
}

/// Open the best available store, starting at `config.preferred`.
///
/// Never fails: the memory tier is always available.
pub fn open_store(config: &StorageConfig) -> Arc<dyn KeyValueStore> {
    for &tier in config.preferred.fallback_chain() {
        match open_tier(tier, config) {
            Ok(store) => {
                if !tier.is_persistent() {
                    tracing::warn!(
                        "cart storage is in-memory only; the cart will not survive a reload"
                    );
                }
                tracing::info!(tier = %tier, "cart storage selected");
                return store;
            }
            Err(err) => {
                tracing::warn!(
                    tier = %tier,
                    error = %err,
                    "cart storage tier unavailable, falling back"
                );
            }
        }
    }

    Arc::new(MemoryStore::new())
}

fn open_tier(
    tier: StorageTier,
    config: &StorageConfig,
) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    let store: Arc<dyn KeyValueStore> = match tier {
        StorageTier::Durable => {
            let dir = match &config.durable_dir {
                Some(dir) => dir.clone(),
                None => durable_data_dir()
                    .map_err(|err| StorageError::Unavailable(tier, format!("{err:#}")))?,
            };
            Arc::new(FileStore::open(tier, dir)?)
        }
        StorageTier::Session => Arc::new(FileStore::open(tier, session_dir(&config.session_id))?),
        StorageTier::Memory => Arc::new(MemoryStore::new()),
    };

    probe(store.as_ref())?;
    Ok(store)
}

fn durable_data_dir() -> anyhow::Result<PathBuf> {
    let mut dir = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context(
            "failed to resolve app data directory - tried data_dir() and home_dir()/.local/share",
        )?;

    dir.push("storefront");
    Ok(dir)
}

fn session_dir(session_id: &str) -> PathBuf {
    std::env::temp_dir().join(format!("storefront-session-{}", sanitize(session_id)))
}

/// Keys become file names; anything outside `[A-Za-z0-9._-]` is replaced.
fn sanitize(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// One file per key in a directory.
#[derive(Debug)]
pub struct FileStore {
    tier: StorageTier,
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) `dir` as a store for `tier`.
    pub fn open(tier: StorageTier, dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| {
            StorageError::Unavailable(tier, format!("cannot create {}: {err}", dir.display()))
        })?;
        Ok(Self { tier, dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{RECORD_EXT}", sanitize(key)))
    }
}

impl KeyValueStore for FileStore {
    fn tier(&self) -> StorageTier {
        self.tier
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Write-then-rename so a reader never sees a half-written record.
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == RECORD_EXT) {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

/// Process-lifetime store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn tier(&self) -> StorageTier {
        StorageTier::Memory
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.records().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.records().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.records().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.records().clear();
        Ok(())
    }
}
