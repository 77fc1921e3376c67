//! Plan eligibility, quotes and renewal projection

use serde::Serialize;
use thiserror::Error;

use crate::interest::*;
use crate::state::*;

/// Why the contract would refuse to open a deposit on a plan
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanRejection {
    #[error("plan {0} is not active")]
    PlanDisabled(u64),

    #[error("deposit amount must be greater than zero")]
    ZeroAmount,

    #[error("below minDeposit: {amount} < {min}")]
    BelowMinimum { amount: Amount, min: Amount },

    #[error("above maxDeposit: {amount} > {max}")]
    AboveMaximum { amount: Amount, max: Amount },
}

/// Outcome of a deposit held on a plan, by exit path
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub principal: Amount,
    pub interest: Amount,
    pub maturity_amount: Amount,
    pub penalty: Amount,
    pub early_payout: Amount,
}

/// Which APR a renewed deposit locks in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenewalRate {
    /// The plan's APR at renewal time
    Current,
    /// The APR the expiring deposit was opened at
    Locked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RenewalProjection {
    pub new_principal: Amount,
    pub apr_bps: Bps,
    pub term_days: u32,
    pub projected_interest: Amount,
}

/// Calculator breakdown, all values floored integers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RateBreakdown {
    /// APR / 12, in thousandths of a percent
    pub monthly_rate_milli_pct: u64,
    /// APR / 365, in ten-thousandths of a percent
    pub daily_rate_pct_e4: u64,
    /// Term in tenths of a 30-day month
    pub term_months_tenths: u64,
    /// Interest over principal, in basis points
    pub return_bps: u128,
    /// Interest per day of term, scaled amount
    pub daily_interest: Amount,
}

pub fn rate_breakdown(apr_bps: Bps, term_days: u32, quote: &Quote) -> RateBreakdown {
    RateBreakdown {
        monthly_rate_milli_pct: apr_bps as u64 * 10 / 12,
        daily_rate_pct_e4: apr_bps as u64 * 100 / 365,
        term_months_tenths: term_days as u64 * 10 / 30,
        return_bps: return_bps(quote.interest, quote.principal),
        daily_interest: daily_interest(quote.interest, term_days),
    }
}

impl Plan {
    pub fn is_unlimited(&self) -> bool {
        self.max_deposit == 0
    }

    /// Same checks the savings bank applies in openDeposit
    pub fn check_deposit(&self, amount: Amount) -> Result<(), PlanRejection> {
        if !self.enabled {
            return Err(PlanRejection::PlanDisabled(self.plan_id));
        }
        if amount == 0 {
            return Err(PlanRejection::ZeroAmount);
        }
        if amount < self.min_deposit {
            return Err(PlanRejection::BelowMinimum {
                amount,
                min: self.min_deposit,
            });
        }
        if !self.is_unlimited() && amount > self.max_deposit {
            return Err(PlanRejection::AboveMaximum {
                amount,
                max: self.max_deposit,
            });
        }
        Ok(())
    }

    /// Quote at the plan's current APR and penalty
    pub fn quote(&self, principal: Amount) -> Quote {
        let interest = interest_accrued(principal, self.apr_bps, self.duration_days);
        Quote {
            principal,
            interest,
            maturity_amount: maturity_amount(principal, self.apr_bps, self.duration_days),
            penalty: penalty_amount(principal, self.early_withdraw_penalty_bps),
            early_payout: early_withdrawal_payout(principal, self.early_withdraw_penalty_bps),
        }
    }
}

/// Principal and rate of the deposit a renewal would open
///
/// The rolled-over principal is the expiring deposit's maturity amount at
/// its locked APR; the new term is the target plan's duration.
pub fn project_renewal(deposit: &Deposit, plan: &Plan, rate: RenewalRate) -> RenewalProjection {
    let new_principal = maturity_amount(
        deposit.principal,
        deposit.locked_apr_bps,
        deposit.term_days(),
    );
    let apr_bps = match rate {
        RenewalRate::Current => plan.apr_bps,
        RenewalRate::Locked => deposit.locked_apr_bps,
    };
    RenewalProjection {
        new_principal,
        apr_bps,
        term_days: plan.duration_days,
        projected_interest: interest_accrued(new_principal, apr_bps, plan.duration_days),
    }
}
