//! Invariant checking helpers

use crate::classify::*;
use crate::interest::*;
use crate::state::*;

/// Maturity amount is principal plus interest, exactly
pub fn maturity_additive(principal: Amount, apr_bps: Bps, term_days: u32) -> bool {
    principal.checked_add(interest_accrued(principal, apr_bps, term_days))
        == Some(maturity_amount(principal, apr_bps, term_days))
}

/// Early payout never exceeds principal and penalty plus payout covers it
pub fn payout_within_principal(principal: Amount, penalty_bps: Bps) -> bool {
    let payout = early_withdrawal_payout(principal, penalty_bps);
    let penalty = penalty_amount(principal, penalty_bps);
    payout <= principal && payout.saturating_add(penalty) >= principal
}

/// Accrual estimate never decreases from `t0` to `t1 >= t0`
pub fn accrual_monotone(
    principal: Amount,
    apr_bps: Bps,
    start_time: Timestamp,
    maturity_time: Timestamp,
    t0: Timestamp,
    t1: Timestamp,
) -> bool {
    let (lo, hi) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
    accrued_interest_estimate(principal, apr_bps, start_time, maturity_time, lo)
        <= accrued_interest_estimate(principal, apr_bps, start_time, maturity_time, hi)
}

/// Accrual estimate stays within the full-term interest
pub fn accrual_bounded(
    principal: Amount,
    apr_bps: Bps,
    start_time: Timestamp,
    maturity_time: Timestamp,
    now: Timestamp,
) -> bool {
    let total = interest_accrued(
        principal,
        apr_bps,
        term_days_between(start_time, maturity_time),
    );
    accrued_interest_estimate(principal, apr_bps, start_time, maturity_time, now) <= total
}

/// Terminal statuses never land in an open bucket, Active never in a closed one
pub fn bucket_matches_status(status: DepositStatus, maturity_time: Timestamp, now: Timestamp) -> bool {
    let bucket = classify(status, maturity_time, now);
    bucket.is_closed() == status.is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_hold_on_concrete_values() {
        assert!(maturity_additive(10_000_000_000, 1200, 90));
        assert!(payout_within_principal(100_000_000, 12_000));
        assert!(accrual_monotone(1_000_000, 500, 0, 86_400, 10, 5));
        assert!(accrual_bounded(1_000_000, 500, 0, 86_400, 1_000_000));
        for status in DepositStatus::ALL {
            assert!(bucket_matches_status(status, 1000, 999));
            assert!(bucket_matches_status(status, 1000, 1000));
        }
    }
}
