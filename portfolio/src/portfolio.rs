//! Deposit views and portfolio aggregation
//!
//! Reconciles the wallet's enumerated deposits with locally remembered
//! closed ids, derives every display quantity from the calculator, and
//! groups deposits by bucket. Nothing here is cached between builds.

use savevault_model::math::mul_div_floor;
use savevault_model::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::closed_store::ClosedDeposits;
use crate::snapshot::{normalize_wallet, Snapshot, VaultBalances};

/// What an early withdrawal would pay right now
///
/// Uses the plan's current penalty, not one locked at open time, so the
/// figure moves if the plan is reconfigured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EarlyWithdrawalEstimate {
    pub penalty_bps: Bps,
    pub penalty: Amount,
    pub payout: Amount,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepositView {
    pub deposit: Deposit,
    pub plan_name: Option<String>,
    pub bucket: Bucket,
    pub term_days: u32,
    pub total_interest: Amount,
    pub maturity_amount: Amount,
    pub accrued_interest: Amount,
    pub progress_percent: u8,
    pub countdown: Countdown,
    pub days_remaining: u64,
    pub in_grace_period: bool,
    /// Only for deposits still inside their term with a known plan
    pub early_withdrawal: Option<EarlyWithdrawalEstimate>,
    /// Matured auto-renew deposits: what the rollover would open
    pub renewal: Option<RenewalProjection>,
}

impl DepositView {
    pub fn derive(deposit: &Deposit, plan: Option<&Plan>, now: Timestamp) -> Self {
        let bucket = deposit.bucket(now);
        let term_days = deposit.term_days();
        let apr = deposit.locked_apr_bps;

        let early_withdrawal = match (bucket, plan) {
            (Bucket::Active, Some(plan)) => {
                let bps = plan.early_withdraw_penalty_bps;
                Some(EarlyWithdrawalEstimate {
                    penalty_bps: bps,
                    penalty: penalty_amount(deposit.principal, bps),
                    payout: early_withdrawal_payout(deposit.principal, bps),
                })
            }
            _ => None,
        };

        let renewal = match (bucket, plan) {
            (Bucket::Matured, Some(plan)) if deposit.auto_renew => {
                Some(project_renewal(deposit, plan, RenewalRate::Current))
            }
            _ => None,
        };

        Self {
            deposit: deposit.clone(),
            plan_name: plan.map(|p| p.name.clone()),
            bucket,
            term_days,
            total_interest: interest_accrued(deposit.principal, apr, term_days),
            maturity_amount: maturity_amount(deposit.principal, apr, term_days),
            accrued_interest: accrued_interest_estimate(
                deposit.principal,
                apr,
                deposit.start_time,
                deposit.maturity_time,
                now,
            ),
            progress_percent: progress_fraction(deposit.start_time, deposit.maturity_time, now),
            countdown: remaining_time_label(deposit.maturity_time, now),
            days_remaining: days_remaining(deposit.maturity_time, now),
            in_grace_period: deposit.status == DepositStatus::Active
                && in_grace_period(deposit.maturity_time, now),
            early_withdrawal,
            renewal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortfolioTotals {
    /// Principal still held (active and matured-not-withdrawn)
    pub active_principal: Amount,
    /// Full-term interest on held deposits
    pub expected_interest: Amount,
    /// Interest accrued so far on held deposits
    pub accrued_interest: Amount,
    pub matured_count: usize,
    pub closed_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Portfolio {
    pub wallet: String,
    pub now: Timestamp,
    pub active: Vec<DepositView>,
    pub matured: Vec<DepositView>,
    pub withdrawn: Vec<DepositView>,
    pub renewed: Vec<DepositView>,
    pub totals: PortfolioTotals,
    /// Ids known for the wallet with no record in the snapshot
    pub missing: Vec<u64>,
}

impl Portfolio {
    pub fn bucket(&self, bucket: Bucket) -> &[DepositView] {
        match bucket {
            Bucket::Active => &self.active,
            Bucket::Matured => &self.matured,
            Bucket::ClosedWithdrawn => &self.withdrawn,
            Bucket::ClosedRenewed => &self.renewed,
        }
    }

    pub fn views(&self) -> impl Iterator<Item = &DepositView> {
        self.active
            .iter()
            .chain(&self.matured)
            .chain(&self.withdrawn)
            .chain(&self.renewed)
    }

    pub fn is_empty(&self) -> bool {
        self.views().next().is_none()
    }
}

/// Build the wallet's portfolio as of `now`
///
/// Terminal deposits are recorded in `closed` so they stay visible after the
/// contract stops enumerating them.
pub fn build_portfolio(
    snapshot: &Snapshot,
    wallet: &str,
    now: Timestamp,
    closed: &mut ClosedDeposits,
) -> Portfolio {
    let ids: BTreeSet<u64> = snapshot
        .user_deposit_ids(wallet)
        .iter()
        .copied()
        .chain(closed.ids(wallet))
        .collect();

    let mut portfolio = Portfolio {
        wallet: normalize_wallet(wallet),
        now,
        active: Vec::new(),
        matured: Vec::new(),
        withdrawn: Vec::new(),
        renewed: Vec::new(),
        totals: PortfolioTotals::default(),
        missing: Vec::new(),
    };

    // Newest first within each bucket
    for id in ids.into_iter().rev() {
        let Some(deposit) = snapshot.deposit(id) else {
            log::debug!("Deposit {} not present in snapshot", id);
            portfolio.missing.push(id);
            continue;
        };

        if deposit.status.is_terminal() && closed.remember(wallet, id) {
            log::info!("Recorded deposit {} as closed ({})", id, deposit.status.label());
        }

        let view = DepositView::derive(deposit, snapshot.plan(deposit.plan_id), now);
        let totals = &mut portfolio.totals;
        match view.bucket {
            Bucket::Active | Bucket::Matured => {
                totals.active_principal = totals.active_principal.saturating_add(deposit.principal);
                totals.expected_interest = totals.expected_interest.saturating_add(view.total_interest);
                totals.accrued_interest = totals.accrued_interest.saturating_add(view.accrued_interest);
            }
            Bucket::ClosedWithdrawn | Bucket::ClosedRenewed => totals.closed_count += 1,
        }

        match view.bucket {
            Bucket::Active => portfolio.active.push(view),
            Bucket::Matured => {
                portfolio.totals.matured_count += 1;
                portfolio.matured.push(view)
            }
            Bucket::ClosedWithdrawn => portfolio.withdrawn.push(view),
            Bucket::ClosedRenewed => portfolio.renewed.push(view),
        }
    }

    log::info!(
        "Portfolio for {}: {} active, {} matured, {} withdrawn, {} renewed",
        portfolio.wallet,
        portfolio.active.len(),
        portfolio.matured.len(),
        portfolio.withdrawn.len(),
        portfolio.renewed.len()
    );

    portfolio
}

/// Unreserved interest against what open deposits will be owed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterestCoverage {
    pub available: Amount,
    pub liability: Amount,
    /// Liability not covered by available interest, 0 when covered
    pub shortfall: Amount,
    /// available / liability in basis points, `None` with no liability
    pub coverage_bps: Option<u128>,
}

impl InterestCoverage {
    pub fn new(available: Amount, liability: Amount) -> Self {
        Self {
            available,
            liability,
            shortfall: liability.saturating_sub(available),
            coverage_bps: (liability > 0).then(|| mul_div_floor(available, BPS_DENOMINATOR, liability)),
        }
    }

    pub fn is_covered(&self) -> bool {
        self.shortfall == 0
    }
}

/// Vault-wide figures for the admin surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaultOverview {
    /// Principal of every deposit still Active on chain
    pub total_value_locked: Amount,
    /// Full-term interest owed on those deposits
    pub interest_liability: Amount,
    pub deposit_count: usize,
    pub by_bucket: BTreeMap<&'static str, usize>,
    pub enabled_plans: usize,
    pub total_plans: usize,
    /// Vault balances as read, when the snapshot carries them
    pub vaults: Option<VaultBalances>,
    pub reserved_interest: Option<Amount>,
    pub interest_coverage: Option<InterestCoverage>,
}

pub fn vault_overview(snapshot: &Snapshot, now: Timestamp) -> VaultOverview {
    let mut overview = VaultOverview {
        total_value_locked: 0,
        interest_liability: 0,
        deposit_count: 0,
        by_bucket: Bucket::ALL.iter().map(|b| (b.as_str(), 0)).collect(),
        enabled_plans: snapshot.plans().filter(|p| p.enabled).count(),
        total_plans: snapshot.plans().count(),
        vaults: snapshot.vaults,
        reserved_interest: None,
        interest_coverage: None,
    };

    for deposit in snapshot.deposits() {
        overview.deposit_count += 1;
        *overview.by_bucket.entry(deposit.bucket(now).as_str()).or_default() += 1;

        if deposit.status == DepositStatus::Active {
            overview.total_value_locked = overview.total_value_locked.saturating_add(deposit.principal);
            overview.interest_liability = overview.interest_liability.saturating_add(
                interest_accrued(deposit.principal, deposit.locked_apr_bps, deposit.term_days()),
            );
        }
    }

    if let Some(vaults) = snapshot.vaults {
        overview.reserved_interest = Some(vaults.reserved_interest());
        let coverage = InterestCoverage::new(vaults.available_interest, overview.interest_liability);
        if !coverage.is_covered() {
            log::warn!(
                "Interest vault short by {} against outstanding interest {}",
                coverage.shortfall,
                coverage.liability
            );
        }
        overview.interest_coverage = Some(coverage);
    }

    overview
}
