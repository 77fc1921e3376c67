//! Plain-text rendering for the CLI

use savevault_model::*;
use serde::Serialize;
use std::fmt::Write;

use crate::maturity_queue::MaturityQueue;
use crate::portfolio::{DepositView, Portfolio, VaultOverview};

const TOKEN: &str = "USDC";

fn money(amount: Amount) -> String {
    format!("{} {}", format_amount(amount), TOKEN)
}

/// Calculator page
pub fn render_quote(quote: &Quote, apr_bps: Bps, term_days: u32, penalty_bps: Bps) -> String {
    let breakdown = rate_breakdown(apr_bps, term_days, quote);
    let mut out = String::new();
    let _ = writeln!(out, "Deposit        {}", money(quote.principal));
    let _ = writeln!(out, "Term           {} days at {} APR", term_days, format_bps(apr_bps));
    let _ = writeln!(out, "Interest       {}", money(quote.interest));
    let _ = writeln!(out, "At maturity    {}", money(quote.maturity_amount));
    let _ = writeln!(
        out,
        "Early exit     {} (penalty {} = {})",
        money(quote.early_payout),
        format_bps(penalty_bps),
        money(quote.penalty)
    );
    let _ = writeln!(
        out,
        "Monthly rate   {}% over {} months",
        format_fixed(breakdown.monthly_rate_milli_pct as u128, 3),
        format_fixed(breakdown.term_months_tenths as u128, 1)
    );
    let _ = writeln!(
        out,
        "Daily rate     {}%",
        format_fixed(breakdown.daily_rate_pct_e4 as u128, 4)
    );
    let _ = writeln!(
        out,
        "Return         {}%, {} {}/day",
        format_fixed(breakdown.return_bps, 2),
        format_amount_exact(breakdown.daily_interest),
        TOKEN
    );
    out
}

/// One plan with the outcome of depositing `principal` on it
#[derive(Debug, Clone, Serialize)]
pub struct PlanOffer<'a> {
    pub plan: &'a Plan,
    pub principal: Amount,
    /// Why the deposit would be refused, if it would
    pub rejection: Option<String>,
    /// Present only for eligible deposits
    pub quote: Option<Quote>,
}

impl PlanOffer<'_> {
    pub fn is_eligible(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Quote `amount` (or each plan's minimum) on every plan
pub fn plan_offers<'a>(
    plans: impl IntoIterator<Item = &'a Plan>,
    amount: Option<Amount>,
) -> Vec<PlanOffer<'a>> {
    plans
        .into_iter()
        .map(|plan| {
            let principal = amount.unwrap_or(plan.min_deposit);
            let (rejection, quote) = match plan.check_deposit(principal) {
                Ok(()) => (None, Some(plan.quote(principal))),
                Err(rejection) => (Some(rejection.to_string()), None),
            };
            PlanOffer {
                plan,
                principal,
                rejection,
                quote,
            }
        })
        .collect()
}

/// Plan browser
pub fn render_plans(offers: &[PlanOffer<'_>]) -> String {
    let mut out = String::new();
    for offer in offers {
        let plan = offer.plan;
        let state = if plan.enabled { "" } else { " [disabled]" };
        let max = if plan.is_unlimited() {
            "no max".to_string()
        } else {
            format!("max {}", money(plan.max_deposit))
        };
        let _ = writeln!(
            out,
            "#{} {}{}: {} days, {} APR, penalty {}, min {}, {}",
            plan.plan_id,
            plan.name,
            state,
            plan.duration_days,
            format_bps(plan.apr_bps),
            format_bps(plan.early_withdraw_penalty_bps),
            money(plan.min_deposit),
            max
        );

        match (&offer.quote, &offer.rejection) {
            (Some(quote), _) => {
                let _ = writeln!(
                    out,
                    "    {} -> {} at maturity (+{})",
                    money(offer.principal),
                    money(quote.maturity_amount),
                    money(quote.interest)
                );
            }
            (None, Some(rejection)) => {
                let _ = writeln!(out, "    {}: {}", money(offer.principal), rejection);
            }
            (None, None) => {}
        }
    }
    out
}

fn render_view(out: &mut String, view: &DepositView) {
    let d = &view.deposit;
    let plan = view.plan_name.as_deref().unwrap_or("unknown plan");
    let _ = writeln!(
        out,
        "  #{} {} ({}), {} at {} for {} days",
        d.deposit_id,
        plan,
        d.status.label(),
        money(d.principal),
        format_bps(d.locked_apr_bps),
        view.term_days
    );

    match view.bucket {
        Bucket::Active => {
            let _ = writeln!(
                out,
                "      {}% elapsed, {} left, accrued {} of {}",
                view.progress_percent,
                view.countdown,
                money(view.accrued_interest),
                money(view.total_interest)
            );
            if let Some(early) = view.early_withdrawal {
                let _ = writeln!(
                    out,
                    "      early exit now pays {} (penalty {})",
                    money(early.payout),
                    money(early.penalty)
                );
            }
        }
        Bucket::Matured => {
            let grace = if view.in_grace_period { ", in grace period" } else { "" };
            let _ = writeln!(
                out,
                "      Matured{}, withdraw {}{}",
                grace,
                money(view.maturity_amount),
                if d.auto_renew { " or auto-renew" } else { "" }
            );
            if let Some(renewal) = view.renewal {
                let _ = writeln!(
                    out,
                    "      renewal opens {} at {} for {} days (+{})",
                    money(renewal.new_principal),
                    format_bps(renewal.apr_bps),
                    renewal.term_days,
                    money(renewal.projected_interest)
                );
            }
        }
        Bucket::ClosedWithdrawn | Bucket::ClosedRenewed => {}
    }
}

/// Deposits page, grouped by bucket
pub fn render_portfolio(portfolio: &Portfolio) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Wallet {}", portfolio.wallet);

    if portfolio.is_empty() {
        let _ = writeln!(out, "No deposits");
        return out;
    }

    for (title, bucket) in [
        ("Active", Bucket::Active),
        ("Matured", Bucket::Matured),
        ("Withdrawn", Bucket::ClosedWithdrawn),
        ("Renewed", Bucket::ClosedRenewed),
    ] {
        let views = portfolio.bucket(bucket);
        if views.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{} ({})", title, views.len());
        for view in views {
            render_view(&mut out, view);
        }
    }

    let queue = MaturityQueue::from_views(&portfolio.active);
    if let Some(next) = queue.peek() {
        let _ = writeln!(
            out,
            "Next maturity: #{} in {} ({})",
            next.deposit_id,
            remaining_time_label(next.maturity_time, portfolio.now),
            money(next.maturity_amount)
        );
    }

    let t = &portfolio.totals;
    let _ = writeln!(
        out,
        "Held {}, expected interest {}, accrued {}",
        money(t.active_principal),
        money(t.expected_interest),
        money(t.accrued_interest)
    );
    if !portfolio.missing.is_empty() {
        let _ = writeln!(out, "Missing from snapshot: {:?}", portfolio.missing);
    }
    out
}

/// Admin totals
pub fn render_overview(overview: &VaultOverview) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total value locked  {}", money(overview.total_value_locked));
    let _ = writeln!(out, "Interest liability  {}", money(overview.interest_liability));
    let _ = writeln!(
        out,
        "Plans               {} enabled of {}",
        overview.enabled_plans, overview.total_plans
    );
    let _ = writeln!(out, "Deposits            {}", overview.deposit_count);
    for (bucket, count) in &overview.by_bucket {
        let _ = writeln!(out, "  {:<18}{}", bucket, count);
    }

    if let Some(vaults) = overview.vaults {
        let _ = writeln!(out, "Principal vault     {}", money(vaults.principal_balance));
        let _ = writeln!(out, "Interest vault      {}", money(vaults.interest_balance));
        let _ = writeln!(out, "  available         {}", money(vaults.available_interest));
        let _ = writeln!(out, "  reserved          {}", money(vaults.reserved_interest()));
    }
    if let Some(coverage) = overview.interest_coverage {
        let ratio = coverage
            .coverage_bps
            .map(|bps| format!("{}%", format_fixed(bps, 2)))
            .unwrap_or_else(|| "n/a".to_string());
        if coverage.is_covered() {
            let _ = writeln!(out, "Interest coverage   {} (covered)", ratio);
        } else {
            let _ = writeln!(
                out,
                "Interest coverage   {} (short {})",
                ratio,
                money(coverage.shortfall)
            );
        }
    }
    out
}
