//! Colombian Business Calendar
//!
//! Public-holiday computation for the deployed jurisdiction.
//!
//! References:
//!   - Ley 51 de 1983 ("Ley Emiliani"): seven civil/religious holidays are
//!     observed on the following Monday unless they already fall on one
//!   - Anonymous Gregorian computus (Butcher's algorithm) for Easter Sunday
//!
//! # Rules
//!
//! 1. Fixed: Jan 1, May 1, Jul 20, Aug 7, Dec 8, Dec 25
//! 2. Easter-anchored, not shifted: Maundy Thursday (−3), Good Friday (−2)
//! 3. Monday-shifted: Jan 6, Mar 19, Jun 29, Aug 15, Oct 12, Nov 1, Nov 11
//! 4. Easter-anchored, Monday-shifted: Ascension (+39), Corpus Christi
//!    (+60), Sacred Heart (+68)

use chrono::{Datelike, NaiveDate, Weekday};
use mailkpi_core::HolidayCalendar;
use std::collections::BTreeSet;

/// Holidays observed on their statutory date
const FIXED: [(u32, u32); 6] = [(1, 1), (5, 1), (7, 20), (8, 7), (12, 8), (12, 25)];

/// Holidays moved to the following Monday under Ley Emiliani
const MONDAY_SHIFTED: [(u32, u32); 7] =
    [(1, 6), (3, 19), (6, 29), (8, 15), (10, 12), (11, 1), (11, 11)];

/// Offsets from Easter Sunday observed as-is
const EASTER_FIXED: [i64; 2] = [-3, -2];

/// Offsets from Easter Sunday moved to the following Monday
const EASTER_SHIFTED: [i64; 3] = [39, 60, 68];

/// The Colombian public-holiday calendar.
///
/// Pure function of the year set; no state.
#[derive(Clone, Copy, Debug, Default)]
pub struct ColombiaCalendar;

impl HolidayCalendar for ColombiaCalendar {
    fn holidays(&self, years: &BTreeSet<i32>) -> BTreeSet<NaiveDate> {
        years.iter().flat_map(|&year| holidays_for_year(year)).collect()
    }
}

/// All Colombian public holidays of one year
pub fn holidays_for_year(year: i32) -> BTreeSet<NaiveDate> {
    let mut dates = BTreeSet::new();

    for (month, day) in FIXED {
        dates.extend(NaiveDate::from_ymd_opt(year, month, day));
    }
    for (month, day) in MONDAY_SHIFTED {
        dates.extend(NaiveDate::from_ymd_opt(year, month, day).map(next_monday));
    }
    if let Some(easter) = easter_sunday(year) {
        for offset in EASTER_FIXED {
            dates.extend(easter.checked_add_signed(chrono::Duration::days(offset)));
        }
        for offset in EASTER_SHIFTED {
            dates.extend(
                easter
                    .checked_add_signed(chrono::Duration::days(offset))
                    .map(next_monday),
            );
        }
    }

    dates
}

/// Easter Sunday for a Gregorian year (Butcher's algorithm)
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Ley Emiliani observance: unchanged on a Monday, otherwise the
/// following Monday.
fn next_monday(date: NaiveDate) -> NaiveDate {
    let ahead = (7 - i64::from(date.weekday().num_days_from_monday())) % 7;
    date + chrono::Duration::days(ahead)
}

/// A fixed holiday set, for tests and non-statutory jurisdictions.
///
/// `holidays` filters the stored dates down to the requested years, so
/// the same instance serves record sets spanning different year ranges.
#[derive(Clone, Debug, Default)]
pub struct StaticCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl StaticCalendar {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self { dates: dates.into_iter().collect() }
    }
}

impl HolidayCalendar for StaticCalendar {
    fn holidays(&self, years: &BTreeSet<i32>) -> BTreeSet<NaiveDate> {
        self.dates
            .iter()
            .filter(|d| years.contains(&d.year()))
            .copied()
            .collect()
    }
}
