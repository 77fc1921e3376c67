//! SaveVault client configuration

use anyhow::{Context, Result};
use savevault_model::Bps;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Plan preset used by the calculator when no snapshot is loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPreset {
    pub name: String,
    pub duration_days: u32,
    pub apr_bps: Bps,
    pub penalty_bps: Bps,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Chain the savings contracts live on
    pub chain_id: u64,

    /// Savings bank contract address
    pub savings_bank_address: String,

    /// Deposit token (6 decimals) address
    pub token_address: String,

    /// JSON snapshot of decoded contract reads
    pub snapshot_path: String,

    /// Closed-deposit bookkeeping file (tilde expanded)
    pub closed_store_path: String,

    /// Watch loop interval in seconds
    pub poll_interval_secs: u64,

    /// APR used by the calculator when no plan matches the duration
    pub default_apr_bps: Bps,

    /// Known plans, for calculator defaults
    pub plans: Vec<PlanPreset>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SAVEVAULT_CONFIG")
            .unwrap_or_else(|_| "savevault.toml".to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .context(format!("Failed to read config file: {}", config_path))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse config TOML")?;

        Ok(config)
    }

    /// Sepolia deployment with the four launch plans
    pub fn default_sepolia() -> Self {
        Self {
            chain_id: 11_155_111,
            savings_bank_address: "0xB95742736EDeE68c9cb3F9a44D3F04D96F40d7d4".to_string(),
            token_address: "0xC62464eaD63c27aE68B296522837e923f856fe05".to_string(),
            snapshot_path: "savevault-snapshot.json".to_string(),
            closed_store_path: "~/.savevault/closed-deposits.json".to_string(),
            poll_interval_secs: 15,
            default_apr_bps: 600, // 6%
            plans: vec![
                preset("7-Day Express", 7, 500, 200),
                preset("30-Day Standard", 30, 800, 300),
                preset("90-Day Growth", 90, 1200, 500),
                preset("180-Day Premium", 180, 1500, 800),
            ],
        }
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_sepolia();
        let toml_str = toml::to_string_pretty(&config)
            .context("Failed to serialize config")?;

        std::fs::write(path, toml_str)
            .context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }

    pub fn closed_store_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.closed_store_path).as_ref())
    }

    pub fn snapshot_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.snapshot_path).as_ref())
    }

    /// Preset whose duration matches `days` exactly
    pub fn preset_for_days(&self, days: u32) -> Option<&PlanPreset> {
        self.plans.iter().find(|p| p.duration_days == days)
    }
}

fn preset(name: &str, duration_days: u32, apr_bps: Bps, penalty_bps: Bps) -> PlanPreset {
    PlanPreset {
        name: name.to_string(),
        duration_days,
        apr_bps,
        penalty_bps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default_sepolia();
        assert_eq!(config.chain_id, 11_155_111);
        assert_eq!(config.default_apr_bps, 600);
        assert_eq!(config.plans.len(), 4);
    }

    #[test]
    fn test_preset_lookup() {
        let config = Config::default_sepolia();
        assert_eq!(config.preset_for_days(90).map(|p| p.apr_bps), Some(1200));
        assert!(config.preset_for_days(365).is_none());
    }

    #[test]
    fn test_write_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("savevault.toml");
        let path = path.to_str().unwrap();

        Config::write_default(path).unwrap();
        let loaded = Config::load_from(path).unwrap();
        assert_eq!(loaded.plans, Config::default_sepolia().plans);
        assert_eq!(loaded.poll_interval_secs, 15);
    }

    #[test]
    fn test_store_path_keeps_file_name() {
        let config = Config::default_sepolia();
        let path = config.closed_store_path();
        assert_eq!(path.file_name().unwrap(), "closed-deposits.json");
    }
}
