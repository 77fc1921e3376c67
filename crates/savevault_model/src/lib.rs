//! Pure Rust model of SaveVault fixed-term deposits
//! No I/O, no clock reads, no floating point; every calculator function is total

pub mod state;
pub mod math;
pub mod interest;
pub mod countdown;
pub mod classify;
pub mod amount;
pub mod plan;
pub mod helpers;

// Re-export commonly used types
pub use state::*;
pub use interest::*;
pub use countdown::*;
pub use classify::*;
pub use amount::*;
pub use plan::*;
