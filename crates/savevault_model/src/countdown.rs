//! Time-to-maturity display helpers

use std::fmt;

use serde::Serialize;

use crate::math::*;
use crate::state::*;

const SECONDS_PER_HOUR: u128 = 3_600;
const SECONDS_PER_MINUTE: u128 = 60;

/// Remaining time until maturity, or the matured sentinel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Countdown {
    Matured,
    Remaining { days: u64, hours: u8, minutes: u8 },
}

/// Display unit selected by the countdown precedence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownParts {
    Matured,
    DaysHours(u64, u8),
    HoursMinutes(u8, u8),
    Minutes(u8),
}

impl Countdown {
    /// Days+hours if any day remains, else hours+minutes if any hour
    /// remains, else minutes only
    pub fn parts(&self) -> CountdownParts {
        match *self {
            Countdown::Matured => CountdownParts::Matured,
            Countdown::Remaining { days, hours, .. } if days > 0 => {
                CountdownParts::DaysHours(days, hours)
            }
            Countdown::Remaining { hours, minutes, .. } if hours > 0 => {
                CountdownParts::HoursMinutes(hours, minutes)
            }
            Countdown::Remaining { minutes, .. } => CountdownParts::Minutes(minutes),
        }
    }

    pub fn is_matured(&self) -> bool {
        matches!(self, Countdown::Matured)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parts() {
            CountdownParts::Matured => write!(f, "Matured"),
            CountdownParts::DaysHours(d, h) => write!(f, "{}d {}h", d, h),
            CountdownParts::HoursMinutes(h, m) => write!(f, "{}h {}m", h, m),
            CountdownParts::Minutes(m) => write!(f, "{}m", m),
        }
    }
}

/// Decompose `maturity_time - now` into days, hours and minutes
pub fn remaining_time_label(maturity_time: Timestamp, now: Timestamp) -> Countdown {
    if now >= maturity_time {
        return Countdown::Matured;
    }
    let secs = span_u128(now, maturity_time);
    let days = secs / SECONDS_PER_DAY as u128;
    let rem = secs % SECONDS_PER_DAY as u128;

    Countdown::Remaining {
        // span of two i64 fits in u64
        days: days as u64,
        hours: (rem / SECONDS_PER_HOUR) as u8,
        minutes: ((rem % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE) as u8,
    }
}

/// Whole days left, rounded up; 0 once matured
pub fn days_remaining(maturity_time: Timestamp, now: Timestamp) -> u64 {
    let secs = span_u128(now, maturity_time);
    let day = SECONDS_PER_DAY as u128;
    (secs.div_ceil(day)) as u64
}

/// End of the post-maturity grace window
pub fn grace_deadline(maturity_time: Timestamp) -> Timestamp {
    maturity_time.saturating_add(GRACE_PERIOD_SECS)
}

/// True from maturity until the grace window closes
pub fn in_grace_period(maturity_time: Timestamp, now: Timestamp) -> bool {
    now >= maturity_time && now < grace_deadline(maturity_time)
}
