//! Display buckets for deposits - pure, no transition authority
//!
//! Buckets are derived from freshly read status on every call. Only the
//! contract moves a deposit between statuses.

use serde::Serialize;

use crate::state::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Bucket {
    /// Active and still inside its term
    Active,
    /// Active past maturity - waiting on withdraw or renew
    Matured,
    /// Withdrawn on time or early
    ClosedWithdrawn,
    /// Rolled into a new deposit
    ClosedRenewed,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [
        Bucket::Active,
        Bucket::Matured,
        Bucket::ClosedWithdrawn,
        Bucket::ClosedRenewed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Active => "active",
            Bucket::Matured => "matured",
            Bucket::ClosedWithdrawn => "closed:withdrawn",
            Bucket::ClosedRenewed => "closed:renewed",
        }
    }

    pub fn is_closed(self) -> bool {
        matches!(self, Bucket::ClosedWithdrawn | Bucket::ClosedRenewed)
    }

    pub fn needs_action(self) -> bool {
        self == Bucket::Matured
    }
}

pub fn classify(status: DepositStatus, maturity_time: Timestamp, now: Timestamp) -> Bucket {
    match status {
        DepositStatus::Active if now < maturity_time => Bucket::Active,
        DepositStatus::Active => Bucket::Matured,
        DepositStatus::Withdrawn | DepositStatus::EarlyWithdrawn => Bucket::ClosedWithdrawn,
        DepositStatus::Renewed => Bucket::ClosedRenewed,
    }
}

impl Deposit {
    pub fn bucket(&self, now: Timestamp) -> Bucket {
        classify(self.status, self.maturity_time, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_before_maturity() {
        assert_eq!(classify(DepositStatus::Active, 2000, 1999), Bucket::Active);
    }

    #[test]
    fn test_matured_at_maturity() {
        assert_eq!(classify(DepositStatus::Active, 2000, 2000), Bucket::Matured);
        assert_eq!(classify(DepositStatus::Active, 2000, 50_000), Bucket::Matured);
        assert!(Bucket::Matured.needs_action());
    }

    #[test]
    fn test_early_withdrawn_before_maturity_is_closed() {
        let bucket = classify(DepositStatus::EarlyWithdrawn, 10_000, 100);
        assert_eq!(bucket, Bucket::ClosedWithdrawn);
        assert_eq!(bucket.as_str(), "closed:withdrawn");
    }

    #[test]
    fn test_withdrawn_never_matured() {
        for now in [0, 1999, 2000, 2001, i64::MAX] {
            assert_eq!(classify(DepositStatus::Withdrawn, 2000, now), Bucket::ClosedWithdrawn);
        }
    }

    #[test]
    fn test_renewed() {
        let bucket = classify(DepositStatus::Renewed, 2000, 0);
        assert_eq!(bucket, Bucket::ClosedRenewed);
        assert_eq!(bucket.as_str(), "closed:renewed");
        assert!(bucket.is_closed());
    }

    #[test]
    fn test_bucket_names() {
        let names: Vec<_> = Bucket::ALL.iter().map(|b| b.as_str()).collect();
        assert_eq!(names, ["active", "matured", "closed:withdrawn", "closed:renewed"]);
    }
}
