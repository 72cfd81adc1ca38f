//! Calendar scheduling of the task network.
//!
//! Three placements are offered: resource-aware ASAP from an anchor date,
//! dependency-only ASAP from earliest-start offsets, and deadline-driven
//! ALAP from latest-start offsets.

mod core;
mod resource_schedule;

use chrono::{Days, NaiveDate};

use crate::error::{EngineError, EngineResult};

pub use self::core::{Interval, ResourceScheduler};
pub use resource_schedule::{ResourceSchedule, ResourceTable};

/// Shift a date by a signed number of days.
pub(crate) fn shift_date(date: NaiveDate, days: i64) -> EngineResult<NaiveDate> {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.ok_or_else(|| EngineError::DateOutOfRange(format!("{} shifted by {} days", date, days)))
}
