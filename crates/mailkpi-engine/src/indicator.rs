//! Business-Day Indicator
//!
//! Elapsed business days between filing and receipt, and the on-time/late
//! term derived from them.
//!
//! The indicator for one record is the count of weekdays (Mon–Fri) in the
//! inclusive range [filed, received] that are not public holidays, minus
//! one (the filing day itself is not elapsed time), floored at zero. It is
//! absent when either date is absent or the range is inverted; absent is a
//! distinct unknown state, not zero and not an error.

use chrono::{Datelike, NaiveDate, Weekday};
use mailkpi_core::{record_years, HolidayCalendar, Record, RecordSet, Term, ON_TIME_LIMIT_DAYS};
use std::collections::BTreeSet;

/// Count business days in the inclusive range [start, end].
///
/// Returns 0 for an inverted range.
pub fn business_days_in_range(
    start: NaiveDate,
    end: NaiveDate,
    holidays: &BTreeSet<NaiveDate>,
) -> u32 {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| is_business_day(*day, holidays))
        .count() as u32
}

fn is_business_day(day: NaiveDate, holidays: &BTreeSet<NaiveDate>) -> bool {
    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) && !holidays.contains(&day)
}

/// Per-record indicator computation against one resolved holiday set.
///
/// The holiday set is resolved once per run, covering the union of years
/// present in the record set, so per-record evaluation stays a pure
/// date-range walk.
#[derive(Clone, Debug)]
pub struct IndicatorEngine {
    holidays: BTreeSet<NaiveDate>,
    on_time_limit: u32,
}

impl IndicatorEngine {
    /// Engine over a precomputed holiday set
    pub fn new(holidays: BTreeSet<NaiveDate>) -> Self {
        Self { holidays, on_time_limit: ON_TIME_LIMIT_DAYS }
    }

    /// Engine for a record set, querying the calendar for every year
    /// appearing in the filing/received columns.
    pub fn for_records(calendar: &dyn HolidayCalendar, records: &[Record]) -> Self {
        Self::new(calendar.holidays(&record_years(records)))
    }

    /// Override the on-time limit (policy)
    pub fn on_time_limit(mut self, limit: u32) -> Self {
        self.on_time_limit = limit;
        self
    }

    /// The indicator for one record; `None` when a date is absent or the
    /// range is inverted.
    pub fn indicator(&self, record: &Record) -> Option<u32> {
        let (start, end) = (record.filed?, record.received?);
        if start > end {
            return None;
        }
        Some(business_days_in_range(start, end, &self.holidays).saturating_sub(1))
    }

    /// Fill `indicator` and `term` on every record. The term is total:
    /// an absent indicator classifies as late.
    pub fn apply(&self, mut table: RecordSet) -> RecordSet {
        for record in &mut table.records {
            record.indicator = self.indicator(record);
            record.term = Some(Term::from_indicator(record.indicator, self.on_time_limit));
        }
        table
    }
}
