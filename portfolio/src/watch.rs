//! Change detection between successive portfolio builds

use savevault_model::{Amount, Bucket};
use std::collections::{HashMap, HashSet};

use crate::maturity_queue::MaturityQueue;
use crate::portfolio::{DepositView, Portfolio};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Reached maturity since the last build and still awaits withdrawal
    Matured { deposit_id: u64, maturity_amount: Amount },
    /// Any other bucket change
    Moved { deposit_id: u64, from: Bucket, to: Bucket },
    /// Not seen in any earlier build
    Appeared { deposit_id: u64, bucket: Bucket },
}

/// Remembers the last bucket of each deposit and the pending maturities
#[derive(Default)]
pub struct Watcher {
    last: HashMap<u64, Bucket>,
    queue: MaturityQueue,
    primed: bool,
}

impl Watcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare a freshly built portfolio against the previous one
    ///
    /// The first call only records state. Queued maturities are confirmed
    /// against the fresh bucket, so a deposit closed between builds is
    /// reported as moved, never as matured.
    pub fn observe(&mut self, portfolio: &Portfolio) -> Vec<WatchEvent> {
        let fresh: HashMap<u64, &DepositView> = portfolio
            .views()
            .map(|v| (v.deposit.deposit_id, v))
            .collect();

        let mut events = Vec::new();
        let mut matured = HashSet::new();
        for upcoming in self.queue.due(portfolio.now) {
            match fresh.get(&upcoming.deposit_id) {
                Some(view) if view.bucket == Bucket::Matured => {
                    matured.insert(upcoming.deposit_id);
                    events.push(WatchEvent::Matured {
                        deposit_id: upcoming.deposit_id,
                        maturity_amount: view.maturity_amount,
                    });
                }
                _ => {}
            }
        }

        for view in portfolio.views() {
            let id = view.deposit.deposit_id;
            let bucket = view.bucket;
            match self.last.insert(id, bucket) {
                Some(prev) if prev != bucket && !matured.contains(&id) => {
                    events.push(WatchEvent::Moved {
                        deposit_id: id,
                        from: prev,
                        to: bucket,
                    });
                }
                None if self.primed => events.push(WatchEvent::Appeared {
                    deposit_id: id,
                    bucket,
                }),
                _ => {}
            }
        }

        self.queue = MaturityQueue::from_views(&portfolio.active);
        self.primed = true;
        events
    }

    /// Active deposits from the latest build, earliest maturity first
    pub fn queue(&self) -> &MaturityQueue {
        &self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::closed_store::ClosedDeposits;
    use crate::portfolio::build_portfolio;
    use crate::snapshot::Snapshot;
    use savevault_model::{maturity_amount, Timestamp, SECONDS_PER_DAY};

    const WALLET: &str = "0xabc0000000000000000000000000000000000001";
    const MATURITY: Timestamp = 90 * SECONDS_PER_DAY;

    fn portfolio(status: Option<u8>, now: Timestamp) -> Portfolio {
        let json = match status {
            Some(status) => format!(
                r#"{{"chainId": 1,
                "deposits": [{{"depositId": 1, "planId": 1, "principal": "1000000000",
                    "startTime": 0, "maturityTime": {MATURITY}, "lockedAprBps": 1200, "status": {status}}}],
                "userDeposits": {{"{WALLET}": [1]}}}}"#
            ),
            None => r#"{"chainId": 1}"#.to_string(),
        };
        let snapshot = Snapshot::from_json(&json).unwrap();
        build_portfolio(&snapshot, WALLET, now, &mut ClosedDeposits::new())
    }

    #[test]
    fn test_first_build_reports_nothing() {
        let mut watcher = Watcher::new();
        assert!(watcher.observe(&portfolio(Some(0), MATURITY - 5)).is_empty());
        assert_eq!(watcher.queue().len(), 1);
    }

    #[test]
    fn test_maturity_reported_once() {
        let mut watcher = Watcher::new();
        watcher.observe(&portfolio(Some(0), MATURITY - 5));

        let events = watcher.observe(&portfolio(Some(0), MATURITY + 10));
        assert_eq!(
            events,
            vec![WatchEvent::Matured {
                deposit_id: 1,
                maturity_amount: maturity_amount(1_000_000_000, 1200, 90),
            }]
        );
        assert!(watcher.queue().is_empty());
        assert!(watcher.observe(&portfolio(Some(0), MATURITY + 20)).is_empty());
    }

    #[test]
    fn test_withdrawn_between_builds_is_not_matured() {
        let mut watcher = Watcher::new();
        watcher.observe(&portfolio(Some(0), MATURITY - 5));

        let events = watcher.observe(&portfolio(Some(1), MATURITY + 10));
        assert_eq!(
            events,
            vec![WatchEvent::Moved {
                deposit_id: 1,
                from: Bucket::Active,
                to: Bucket::ClosedWithdrawn,
            }]
        );
    }

    #[test]
    fn test_renewed_between_builds_is_not_matured() {
        let mut watcher = Watcher::new();
        watcher.observe(&portfolio(Some(0), MATURITY - 5));

        let events = watcher.observe(&portfolio(Some(3), MATURITY + 10));
        assert!(!events.iter().any(|e| matches!(e, WatchEvent::Matured { .. })));
    }

    #[test]
    fn test_first_deposit_after_empty_start() {
        let mut watcher = Watcher::new();
        assert!(watcher.observe(&portfolio(None, 100)).is_empty());
        assert!(watcher.observe(&portfolio(None, 200)).is_empty());

        let events = watcher.observe(&portfolio(Some(0), 300));
        assert_eq!(
            events,
            vec![WatchEvent::Appeared {
                deposit_id: 1,
                bucket: Bucket::Active,
            }]
        );
    }
}
