//! Deposit and plan records as decoded from the savings contracts

use serde::{Deserialize, Serialize};

/// Scaled stablecoin amount (10^6 units per token)
pub type Amount = u128;

/// Basis points (10_000 = 100%)
pub type Bps = u32;

/// Unix timestamp in seconds
pub type Timestamp = i64;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Number of seconds in a year (365 days, no leap-year adjustment)
pub const SECONDS_PER_YEAR: u128 = 365 * 86_400;

/// Basis points denominator (100% = 10000 basis points)
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Decimals of the deposit token
pub const AMOUNT_DECIMALS: u32 = 6;

/// Amount scale (1e6)
pub const AMOUNT_SCALE: u128 = 1_000_000;

/// Window after maturity during which the contract holds a matured deposit
/// before auto-renewing it (3 days)
pub const GRACE_PERIOD_SECS: i64 = 3 * SECONDS_PER_DAY;

/// Saving plan as configured on the savings bank contract
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub plan_id: u64,
    pub name: String,
    pub duration_days: u32,
    pub apr_bps: Bps,
    pub min_deposit: Amount,
    /// 0 means unlimited
    pub max_deposit: Amount,
    pub early_withdraw_penalty_bps: Bps,
    pub enabled: bool,
}

/// Lifecycle status code stored by the contract
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepositStatus {
    Active = 0,
    Withdrawn = 1,
    EarlyWithdrawn = 2,
    Renewed = 3,
}

impl DepositStatus {
    pub const ALL: [DepositStatus; 4] = [
        DepositStatus::Active,
        DepositStatus::Withdrawn,
        DepositStatus::EarlyWithdrawn,
        DepositStatus::Renewed,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(DepositStatus::Active),
            1 => Some(DepositStatus::Withdrawn),
            2 => Some(DepositStatus::EarlyWithdrawn),
            3 => Some(DepositStatus::Renewed),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            DepositStatus::Active => "Active",
            DepositStatus::Withdrawn => "Withdrawn",
            DepositStatus::EarlyWithdrawn => "Early Withdrawn",
            DepositStatus::Renewed => "Renewed",
        }
    }

    /// Withdrawn, EarlyWithdrawn and Renewed admit no further transition
    pub fn is_terminal(self) -> bool {
        !matches!(self, DepositStatus::Active)
    }
}

/// A single term deposit. Everything except `status` is fixed at open time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub deposit_id: u64,
    pub plan_id: u64,
    pub principal: Amount,
    pub start_time: Timestamp,
    pub maturity_time: Timestamp,
    /// APR fixed when the deposit was opened
    pub locked_apr_bps: Bps,
    pub auto_renew: bool,
    pub status: DepositStatus,
}

impl Deposit {
    /// Term length in whole days, 0 for a degenerate record
    pub fn term_days(&self) -> u32 {
        crate::interest::term_days_between(self.start_time, self.maturity_time)
    }

    pub fn is_degenerate(&self) -> bool {
        self.maturity_time <= self.start_time
    }
}
