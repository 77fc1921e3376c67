//! Per-wallet record of deposits the user has closed
//!
//! Once a deposit is withdrawn or renewed the contract may stop enumerating
//! it for the owner. Remembering the ids here keeps the history view filled.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::snapshot::normalize_wallet;

const STORE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("closed-deposit store I/O on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("closed-deposit store is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    wallets: BTreeMap<String, BTreeSet<u64>>,
}

/// Wallet (lowercased) -> closed deposit ids
#[derive(Debug, Default)]
pub struct ClosedDeposits {
    wallets: BTreeMap<String, BTreeSet<u64>>,
    path: Option<PathBuf>,
    dirty: bool,
}

impl ClosedDeposits {
    /// In-memory store that is never persisted
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`; a missing file is an empty store bound to `path`
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let wallets = match std::fs::read_to_string(path) {
            Ok(text) => {
                let file: StoreFile = serde_json::from_str(&text)?;
                if file.version != STORE_VERSION {
                    log::warn!(
                        "Closed-deposit store {} has version {}, expected {}",
                        path.display(),
                        file.version,
                        STORE_VERSION
                    );
                }
                file.wallets
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No closed-deposit store at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        Ok(Self {
            wallets,
            path: Some(path.to_path_buf()),
            dirty: false,
        })
    }

    /// Write back to the bound path if anything changed
    pub fn save(&mut self) -> Result<(), StoreError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }

        let io_err = |source| StoreError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let file = StoreFile {
            version: STORE_VERSION,
            wallets: self.wallets.clone(),
        };
        let text = serde_json::to_string_pretty(&file)?;
        std::fs::write(path, text).map_err(io_err)?;

        log::debug!("Saved closed-deposit store to {}", path.display());
        self.dirty = false;
        Ok(())
    }

    /// Returns true if the id was not already recorded
    pub fn remember(&mut self, wallet: &str, deposit_id: u64) -> bool {
        let added = self
            .wallets
            .entry(normalize_wallet(wallet))
            .or_default()
            .insert(deposit_id);
        self.dirty |= added;
        added
    }

    pub fn contains(&self, wallet: &str, deposit_id: u64) -> bool {
        self.wallets
            .get(&normalize_wallet(wallet))
            .is_some_and(|ids| ids.contains(&deposit_id))
    }

    /// Closed ids for `wallet`, ascending
    pub fn ids(&self, wallet: &str) -> Vec<u64> {
        self.wallets
            .get(&normalize_wallet(wallet))
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn forget_wallet(&mut self, wallet: &str) -> bool {
        let removed = self.wallets.remove(&normalize_wallet(wallet)).is_some();
        self.dirty |= removed;
        removed
    }

    pub fn wallet_count(&self) -> usize {
        self.wallets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: &str = "0xAbC0000000000000000000000000000000000001";

    #[test]
    fn test_remember_is_idempotent() {
        let mut store = ClosedDeposits::new();
        assert!(store.remember(WALLET, 4));
        assert!(!store.remember(WALLET, 4));
        assert!(store.remember(WALLET, 2));
        assert_eq!(store.ids(WALLET), vec![2, 4]);
    }

    #[test]
    fn test_wallet_keys_are_case_insensitive() {
        let mut store = ClosedDeposits::new();
        store.remember(WALLET, 4);
        assert!(store.contains(&WALLET.to_ascii_lowercase(), 4));
        assert!(store.contains(&WALLET.to_ascii_uppercase(), 4));
        assert!(store.ids("0xother").is_empty());
    }

    #[test]
    fn test_forget_wallet() {
        let mut store = ClosedDeposits::new();
        store.remember(WALLET, 1);
        assert!(store.forget_wallet(WALLET));
        assert!(!store.forget_wallet(WALLET));
        assert_eq!(store.wallet_count(), 0);
    }

    #[test]
    fn test_persist_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("closed.json");

        let mut store = ClosedDeposits::load(&path).unwrap();
        assert_eq!(store.wallet_count(), 0);
        store.remember(WALLET, 7);
        store.remember(WALLET, 3);
        store.save().unwrap();

        let reloaded = ClosedDeposits::load(&path).unwrap();
        assert_eq!(reloaded.ids(WALLET), vec![3, 7]);
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("closed.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(ClosedDeposits::load(&path), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_in_memory_save_is_noop() {
        let mut store = ClosedDeposits::new();
        store.remember(WALLET, 1);
        store.save().unwrap();
    }
}
