//! Verbosity-gated diagnostics for the scheduler and leveler.
//!
//! Output goes to stderr and costs nothing when the configured level is
//! `Silent`. Levels:
//! - `Silent`: nothing
//! - `Changes`: task placements, leveling moves, unresolved overallocations
//! - `Checks`: why a task waited or why a leveling probe was rejected
//! - `Debug`: pass-level internals (topological order, timings)

use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    #[default]
    Silent = 0,
    Changes = 1,
    Checks = 2,
    Debug = 3,
}

impl Verbosity {
    /// Map a numeric level onto a verbosity, saturating above `Debug`.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Self::Silent,
            1 => Self::Changes,
            2 => Self::Checks,
            _ => Self::Debug,
        }
    }
}

#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::Verbosity::Changes {
            eprintln!("[pertnet] {}", format_args!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::Verbosity::Checks {
            eprintln!("[pertnet] {}", format_args!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::Verbosity::Debug {
            eprintln!("[pertnet] {}", format_args!($($arg)*));
        }
    };
}
