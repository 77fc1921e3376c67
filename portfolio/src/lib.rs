//! SaveVault portfolio client
//!
//! Decodes contract reads, reconciles them with the local closed-deposit
//! record and derives everything the deposits, calculator and admin pages
//! display. Arithmetic lives in `savevault_model`.

pub mod closed_store;
pub mod config;
pub mod maturity_queue;
pub mod portfolio;
pub mod report;
pub mod snapshot;
pub mod watch;

pub use closed_store::{ClosedDeposits, StoreError};
pub use config::Config;
pub use maturity_queue::{MaturityQueue, Upcoming};
pub use portfolio::{
    build_portfolio, vault_overview, DepositView, InterestCoverage, Portfolio, VaultOverview,
};
pub use snapshot::{Snapshot, SnapshotError, VaultBalances};
pub use watch::{WatchEvent, Watcher};
