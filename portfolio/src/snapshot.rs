//! Decoding boundary for contract reads
//!
//! The read layer dumps plans, deposits and per-wallet deposit ids as JSON.
//! This module turns that document into typed `Plan` and `Deposit` records;
//! nothing past this point sees wire values.

use savevault_model::{Amount, Deposit, DepositStatus, Plan, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

/// uint256 max, which the savings bank stores for "no maximum"
pub const MAX_UINT256: &str =
    "115792089237316195423570985008687907853269984665640564039457584007913129639935";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid amount {value:?} in {field}")]
    InvalidAmount { field: &'static str, value: String },

    #[error("deposit {deposit_id} has unknown status code {code}")]
    UnknownStatus { deposit_id: u64, code: u8 },

    #[error("plan {0} appears more than once")]
    DuplicatePlan(u64),

    #[error("deposit {0} appears more than once")]
    DuplicateDeposit(u64),
}

/// Amounts arrive as decimal strings (bigint toString) or plain integers
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WireAmount {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlan {
    plan_id: u64,
    #[serde(default)]
    name: String,
    duration_days: u32,
    apr_bps: u32,
    min_deposit: WireAmount,
    max_deposit: WireAmount,
    early_withdraw_penalty_bps: u32,
    #[serde(alias = "isActive")]
    enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDeposit {
    #[serde(alias = "tokenId")]
    deposit_id: u64,
    plan_id: u64,
    principal: WireAmount,
    start_time: Timestamp,
    maturity_time: Timestamp,
    locked_apr_bps: u32,
    #[serde(default, alias = "isAutoRenewEnabled")]
    auto_renew: bool,
    status: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVaults {
    #[serde(alias = "totalPrincipal")]
    principal_balance: WireAmount,
    #[serde(alias = "totalInterest")]
    interest_balance: WireAmount,
    available_interest: WireAmount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    chain_id: u64,
    #[serde(default)]
    fetched_at: Option<Timestamp>,
    #[serde(default)]
    plans: Vec<RawPlan>,
    #[serde(default)]
    deposits: Vec<RawDeposit>,
    #[serde(default)]
    user_deposits: HashMap<String, Vec<u64>>,
    #[serde(default)]
    vaults: Option<RawVaults>,
}

/// Token balances held by the principal and interest vaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VaultBalances {
    /// TokenVault balance (deposited principal)
    pub principal_balance: Amount,
    /// InterestVault balance, reserved and unreserved
    pub interest_balance: Amount,
    /// InterestVault balance not yet reserved for open deposits
    pub available_interest: Amount,
}

impl VaultBalances {
    /// Interest already set aside for open deposits
    pub fn reserved_interest(&self) -> Amount {
        self.interest_balance.saturating_sub(self.available_interest)
    }
}

/// Typed view of one round of contract reads
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub chain_id: u64,
    pub fetched_at: Option<Timestamp>,
    /// Absent when the read layer did not query the vaults
    pub vaults: Option<VaultBalances>,
    plans: BTreeMap<u64, Plan>,
    deposits: BTreeMap<u64, Deposit>,
    /// Lowercased wallet -> ids returned by getUserDeposits
    user_deposits: HashMap<String, Vec<u64>>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let text = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let raw: RawSnapshot = serde_json::from_str(text)?;
        Self::decode(raw)
    }

    fn decode(raw: RawSnapshot) -> Result<Self, SnapshotError> {
        let mut snapshot = Snapshot {
            chain_id: raw.chain_id,
            fetched_at: raw.fetched_at,
            vaults: raw.vaults.map(decode_vaults).transpose()?,
            ..Default::default()
        };

        for p in raw.plans {
            let plan = decode_plan(p)?;
            let id = plan.plan_id;
            if snapshot.plans.insert(id, plan).is_some() {
                return Err(SnapshotError::DuplicatePlan(id));
            }
        }

        for d in raw.deposits {
            let deposit = decode_deposit(d)?;
            if deposit.maturity_time < deposit.start_time {
                log::warn!(
                    "Deposit {} matures before it starts ({} < {})",
                    deposit.deposit_id,
                    deposit.maturity_time,
                    deposit.start_time
                );
            }
            let id = deposit.deposit_id;
            if snapshot.deposits.insert(id, deposit).is_some() {
                return Err(SnapshotError::DuplicateDeposit(id));
            }
        }

        for (wallet, ids) in raw.user_deposits {
            snapshot
                .user_deposits
                .entry(normalize_wallet(&wallet))
                .or_default()
                .extend(ids);
        }

        log::debug!(
            "Decoded snapshot: chain {}, {} plans, {} deposits, {} wallets",
            snapshot.chain_id,
            snapshot.plans.len(),
            snapshot.deposits.len(),
            snapshot.user_deposits.len()
        );

        Ok(snapshot)
    }

    pub fn plan(&self, plan_id: u64) -> Option<&Plan> {
        self.plans.get(&plan_id)
    }

    pub fn plans(&self) -> impl Iterator<Item = &Plan> {
        self.plans.values()
    }

    pub fn deposit(&self, deposit_id: u64) -> Option<&Deposit> {
        self.deposits.get(&deposit_id)
    }

    pub fn deposits(&self) -> impl Iterator<Item = &Deposit> {
        self.deposits.values()
    }

    /// Ids the contract currently enumerates for `wallet`
    pub fn user_deposit_ids(&self, wallet: &str) -> &[u64] {
        self.user_deposits
            .get(&normalize_wallet(wallet))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Wallet addresses compare case-insensitively
pub fn normalize_wallet(wallet: &str) -> String {
    wallet.trim().to_ascii_lowercase()
}

fn decode_plan(p: RawPlan) -> Result<Plan, SnapshotError> {
    let max_deposit = match &p.max_deposit {
        WireAmount::Text(s) if s.trim() == MAX_UINT256 => 0,
        other => decode_amount("maxDeposit", other)?,
    };
    Ok(Plan {
        plan_id: p.plan_id,
        name: p.name,
        duration_days: p.duration_days,
        apr_bps: p.apr_bps,
        min_deposit: decode_amount("minDeposit", &p.min_deposit)?,
        max_deposit,
        early_withdraw_penalty_bps: p.early_withdraw_penalty_bps,
        enabled: p.enabled,
    })
}

fn decode_deposit(d: RawDeposit) -> Result<Deposit, SnapshotError> {
    let status = DepositStatus::from_code(d.status).ok_or(SnapshotError::UnknownStatus {
        deposit_id: d.deposit_id,
        code: d.status,
    })?;
    Ok(Deposit {
        deposit_id: d.deposit_id,
        plan_id: d.plan_id,
        principal: decode_amount("principal", &d.principal)?,
        start_time: d.start_time,
        maturity_time: d.maturity_time,
        locked_apr_bps: d.locked_apr_bps,
        auto_renew: d.auto_renew,
        status,
    })
}

fn decode_vaults(v: RawVaults) -> Result<VaultBalances, SnapshotError> {
    let balances = VaultBalances {
        principal_balance: decode_amount("principalBalance", &v.principal_balance)?,
        interest_balance: decode_amount("interestBalance", &v.interest_balance)?,
        available_interest: decode_amount("availableInterest", &v.available_interest)?,
    };
    if balances.available_interest > balances.interest_balance {
        log::warn!(
            "Interest vault reports {} available of a {} balance",
            balances.available_interest,
            balances.interest_balance
        );
    }
    Ok(balances)
}

fn decode_amount(field: &'static str, wire: &WireAmount) -> Result<Amount, SnapshotError> {
    match wire {
        WireAmount::Number(n) => Ok(*n as Amount),
        WireAmount::Text(s) => s.trim().parse::<Amount>().map_err(|_| SnapshotError::InvalidAmount {
            field,
            value: s.clone(),
        }),
    }
}
