//! Simple-interest, penalty and maturity math
//!
//! Mirrors the settlement arithmetic of the savings bank contract: annual
//! simple interest prorated per second over a fixed 365-day year, all values
//! floor-truncated. Intermediate products never overflow for any u128
//! principal whose result is representable.

use crate::math::*;
use crate::state::*;

/// interest = floor(principal * apr_bps * term_days * 86400 / (31536000 * 10000))
pub fn interest_accrued(principal: Amount, apr_bps: Bps, term_days: u32) -> Amount {
    if term_days == 0 || apr_bps == 0 {
        return 0;
    }
    // apr_bps * term seconds < 2^81
    let rate_seconds = (apr_bps as u128) * (term_days as u128) * (SECONDS_PER_DAY as u128);
    mul_div_floor(principal, rate_seconds, SECONDS_PER_YEAR * BPS_DENOMINATOR)
}

/// penalty = floor(principal * penalty_bps / 10000)
///
/// Out-of-range `penalty_bps` is computed as given; the plan owns that range.
pub fn penalty_amount(principal: Amount, penalty_bps: Bps) -> Amount {
    mul_div_floor(principal, penalty_bps as u128, BPS_DENOMINATOR)
}

/// Principal plus interest paid out at maturity
pub fn maturity_amount(principal: Amount, apr_bps: Bps, term_days: u32) -> Amount {
    add_u128(principal, interest_accrued(principal, apr_bps, term_days))
}

/// Principal minus the early-withdrawal penalty, never below 0
pub fn early_withdrawal_payout(principal: Amount, penalty_bps: Bps) -> Amount {
    sub_u128(principal, penalty_amount(principal, penalty_bps))
}

/// Whole days between start and maturity (0 if maturity <= start)
pub fn term_days_between(start_time: Timestamp, maturity_time: Timestamp) -> u32 {
    let days = span_u128(start_time, maturity_time) / SECONDS_PER_DAY as u128;
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Projected interest earned so far, for display only
///
/// Linear share of the full-term interest by elapsed seconds. Equals the
/// full-term interest once `now >= maturity_time` and 0 while
/// `now <= start_time` or when the term is degenerate.
pub fn accrued_interest_estimate(
    principal: Amount,
    apr_bps: Bps,
    start_time: Timestamp,
    maturity_time: Timestamp,
    now: Timestamp,
) -> Amount {
    let duration = span_u128(start_time, maturity_time);
    if duration == 0 {
        return 0;
    }
    let total = interest_accrued(
        principal,
        apr_bps,
        term_days_between(start_time, maturity_time),
    );
    let elapsed = span_u128(start_time, now).min(duration);
    mul_div_floor(total, elapsed, duration)
}

/// Elapsed share of the term as an integer percent in [0, 100]
pub fn progress_fraction(start_time: Timestamp, maturity_time: Timestamp, now: Timestamp) -> u8 {
    let duration = span_u128(start_time, maturity_time);
    if duration == 0 {
        return 0;
    }
    let elapsed = span_u128(start_time, now).min(duration);
    // elapsed <= duration keeps this within 0..=100
    mul_div_floor(elapsed, 100, duration) as u8
}

/// Average interest per day of term, floored; 0 for a zero-day term
pub fn daily_interest(interest: Amount, term_days: u32) -> Amount {
    if term_days == 0 {
        return 0;
    }
    interest / term_days as u128
}

/// Interest as a share of principal in basis points, floored
pub fn return_bps(interest: Amount, principal: Amount) -> u128 {
    mul_div_floor(interest, BPS_DENOMINATOR, principal)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: Amount = AMOUNT_SCALE;

    #[test]
    fn test_interest_90_days_at_12_percent() {
        // 10,000 tokens, 12% APR, 90 days
        let interest = interest_accrued(10_000 * UNIT, 1200, 90);
        // floor(10^10 * 1200 * 7_776_000 / 315_360_000_000)
        assert_eq!(interest, 295_890_410);
    }

    #[test]
    fn test_interest_full_year() {
        // Exactly one 365-day year pays the APR on the nose
        assert_eq!(interest_accrued(1_000 * UNIT, 500, 365), 50 * UNIT);
    }

    #[test]
    fn test_interest_zero_term_and_rate() {
        assert_eq!(interest_accrued(1_000 * UNIT, 1200, 0), 0);
        assert_eq!(interest_accrued(1_000 * UNIT, 0, 90), 0);
        assert_eq!(interest_accrued(0, 1200, 90), 0);
    }

    #[test]
    fn test_interest_truncates() {
        // 1 unit at 1% for 1 day is far below one scaled unit
        assert_eq!(interest_accrued(1, 100, 1), 0);
    }

    #[test]
    fn test_interest_large_principal_no_overflow() {
        let principal: Amount = 1_000_000_000_000_000; // 1e15 scaled units
        let interest = interest_accrued(principal, 10_000, 36_500);
        // 100% APR for 100 years
        assert_eq!(interest, principal * 100);
    }

    #[test]
    fn test_penalty_and_payout() {
        assert_eq!(penalty_amount(UNIT, 500), 50_000);
        assert_eq!(early_withdrawal_payout(UNIT, 500), 950_000);
    }

    #[test]
    fn test_payout_clamps_misconfigured_penalty() {
        // 120% penalty on 100 tokens
        assert_eq!(penalty_amount(100 * UNIT, 12_000), 120 * UNIT);
        assert_eq!(early_withdrawal_payout(100 * UNIT, 12_000), 0);
    }

    #[test]
    fn test_maturity_amount() {
        let principal = 10_000 * UNIT;
        assert_eq!(
            maturity_amount(principal, 1200, 90),
            principal + interest_accrued(principal, 1200, 90)
        );
    }

    #[test]
    fn test_term_days_between() {
        assert_eq!(term_days_between(0, 90 * SECONDS_PER_DAY), 90);
        assert_eq!(term_days_between(0, 90 * SECONDS_PER_DAY - 1), 89);
        assert_eq!(term_days_between(1000, 1000), 0);
        assert_eq!(term_days_between(2000, 1000), 0);
    }

    #[test]
    fn test_progress_midpoint() {
        assert_eq!(progress_fraction(1000, 2000, 1500), 50);
    }

    #[test]
    fn test_progress_bounds() {
        assert_eq!(progress_fraction(1000, 2000, 0), 0);
        assert_eq!(progress_fraction(1000, 2000, 1000), 0);
        assert_eq!(progress_fraction(1000, 2000, 2000), 100);
        assert_eq!(progress_fraction(1000, 2000, 9_999_999), 100);
        assert_eq!(progress_fraction(1000, 2000, 1999), 99);
    }

    #[test]
    fn test_degenerate_term() {
        for now in [0, 999, 1000, 1001, i64::MAX] {
            assert_eq!(progress_fraction(1000, 1000, now), 0);
            assert_eq!(accrued_interest_estimate(UNIT, 1200, 1000, 1000, now), 0);
            assert_eq!(progress_fraction(2000, 1000, now), 0);
            assert_eq!(accrued_interest_estimate(UNIT, 1200, 2000, 1000, now), 0);
        }
    }

    #[test]
    fn test_accrued_estimate_boundaries() {
        let start = 1_700_000_000;
        let maturity = start + 90 * SECONDS_PER_DAY;
        let principal = 10_000 * UNIT;
        let total = interest_accrued(principal, 1200, 90);

        assert_eq!(accrued_interest_estimate(principal, 1200, start, maturity, start - 1), 0);
        assert_eq!(accrued_interest_estimate(principal, 1200, start, maturity, start), 0);
        assert_eq!(accrued_interest_estimate(principal, 1200, start, maturity, maturity), total);
        assert_eq!(
            accrued_interest_estimate(principal, 1200, start, maturity, maturity + 1_000),
            total
        );

        let half = accrued_interest_estimate(principal, 1200, start, maturity, start + 45 * SECONDS_PER_DAY);
        assert_eq!(half, total / 2);
    }

    #[test]
    fn test_daily_interest_and_return() {
        let interest = interest_accrued(10_000 * UNIT, 1200, 90);
        assert_eq!(daily_interest(interest, 90), 3_287_671);
        assert_eq!(daily_interest(interest, 0), 0);
        // 2.9589% of principal
        assert_eq!(return_bps(interest, 10_000 * UNIT), 295);
        assert_eq!(return_bps(interest, 0), 0);
    }

    #[test]
    fn test_extreme_timestamps() {
        assert_eq!(progress_fraction(i64::MIN, i64::MAX, 0), 50);
        assert_eq!(
            accrued_interest_estimate(UNIT, 1200, i64::MIN, i64::MAX, i64::MAX),
            interest_accrued(UNIT, 1200, u32::MAX)
        );
    }
}
