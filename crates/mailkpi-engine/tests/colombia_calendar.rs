//! Statutory calendar regression
//!
//! Verifies the deployed jurisdiction against published holiday tables,
//! including the 2025 coincidence: Sacred Heart (Easter + 68, shifted) and
//! Saints Peter & Paul (Jun 29, shifted) both observe on Jun 30, so the
//! year has 17 distinct dates instead of the usual 18.

use chrono::NaiveDate;
use mailkpi_core::{HolidayCalendar, Record};
use mailkpi_engine::calendar::holidays_for_year;
use mailkpi_engine::{ColombiaCalendar, IndicatorEngine};
use std::collections::BTreeSet;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn published_2025_calendar() {
    let expected: BTreeSet<NaiveDate> = [
        date(2025, 1, 1),
        date(2025, 1, 6),   // Reyes Magos, already a Monday
        date(2025, 3, 24),  // San José (Mar 19 -> Monday)
        date(2025, 4, 17),  // Jueves Santo
        date(2025, 4, 18),  // Viernes Santo
        date(2025, 5, 1),
        date(2025, 6, 2),   // Ascensión
        date(2025, 6, 23),  // Corpus Christi
        date(2025, 6, 30),  // Sagrado Corazón y San Pedro, coinciding
        date(2025, 7, 20),
        date(2025, 8, 7),
        date(2025, 8, 18),  // Asunción (Aug 15 -> Monday)
        date(2025, 10, 13), // Día de la Raza (Oct 12 -> Monday)
        date(2025, 11, 3),  // Todos los Santos (Nov 1 -> Monday)
        date(2025, 11, 17), // Independencia de Cartagena (Nov 11 -> Monday)
        date(2025, 12, 8),
        date(2025, 12, 25),
    ]
    .into_iter()
    .collect();

    assert_eq!(holidays_for_year(2025), expected);
}

#[test]
fn every_year_has_17_or_18_observed_dates() {
    for year in 2020..=2030 {
        let count = holidays_for_year(year).len();
        assert!((17..=18).contains(&count), "{year}: {count}");
    }
}

#[test]
fn year_union_spans_a_new_year_boundary() {
    let years: BTreeSet<i32> = [2023, 2024].into_iter().collect();
    let holidays = ColombiaCalendar.holidays(&years);
    assert!(holidays.contains(&date(2023, 12, 25)));
    assert!(holidays.contains(&date(2024, 1, 1)));
    assert!(!holidays.contains(&date(2025, 1, 1)));
}

#[test]
fn new_year_holiday_drops_out_of_the_indicator() {
    // Fri 2023-12-29 -> Tue 2024-01-02. Weekdays in range: Fri, Mon, Tue;
    // Mon Jan 1 is a holiday, leaving 2, minus the filing day = 1.
    let record = Record::new()
        .filed(date(2023, 12, 29))
        .received(date(2024, 1, 2));
    let engine = IndicatorEngine::for_records(&ColombiaCalendar, std::slice::from_ref(&record));
    assert_eq!(engine.indicator(&record), Some(1));
}

#[test]
fn holy_week_shrinks_the_count() {
    // Mon 2024-03-25 -> Mon 2024-04-01. Weekdays: Mar 25..29 + Apr 1 = 6;
    // Mar 25 (San José observed), Mar 28, Mar 29 are holidays, leaving 3,
    // minus the filing day = 2.
    let record = Record::new()
        .filed(date(2024, 3, 25))
        .received(date(2024, 4, 1));
    let engine = IndicatorEngine::for_records(&ColombiaCalendar, std::slice::from_ref(&record));
    assert_eq!(engine.indicator(&record), Some(2));
}
