//! Pipeline Orchestration
//!
//! The linear run over a loaded record set: date filling → indicator →
//! classification → aggregation. Loading happens upstream of this module
//! and report assembly downstream of it; each stage here consumes and
//! returns the full record set.
//!
//! The run is infallible by design: per-field conditions were already
//! recovered as absent values at load time, and empty partitions produce
//! empty aggregates rather than errors.

use crate::{Aggregator, Classifier, IndicatorEngine};
use chrono::NaiveDate;
use mailkpi_core::{HolidayCalendar, ProviderMap, RecordSet, ReportData, ReportPolicy};

/// Date Filler: absent received dates become the run date.
///
/// The run date is captured once per pipeline run, so every fill within
/// one run shares the same value. Present dates are untouched.
pub fn fill_received_dates(mut table: RecordSet, run_date: NaiveDate) -> RecordSet {
    for record in &mut table.records {
        if record.received.is_none() {
            record.received = Some(run_date);
        }
    }
    table
}

/// The full processing run, from loaded records to report inputs
#[derive(Clone, Debug)]
pub struct Pipeline {
    policy: ReportPolicy,
    provider_map: ProviderMap,
    run_date: NaiveDate,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Pipeline with default policy and mapping, run date = today
    pub fn new() -> Self {
        Self {
            policy: ReportPolicy::default(),
            provider_map: ProviderMap::default(),
            run_date: chrono::Local::now().date_naive(),
        }
    }

    /// Fix the run date (drives the date filler and the alert cutoff)
    pub fn run_date(mut self, run_date: NaiveDate) -> Self {
        self.run_date = run_date;
        self
    }

    /// Replace the report policy
    pub fn policy(mut self, policy: ReportPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the provider mapping table
    pub fn provider_map(mut self, map: ProviderMap) -> Self {
        self.provider_map = map;
        self
    }

    /// Run every stage over the record set.
    ///
    /// The calendar is queried once, for the union of years present after
    /// date filling.
    pub fn run(&self, table: RecordSet, calendar: &dyn HolidayCalendar) -> ReportData {
        let table = fill_received_dates(table, self.run_date);

        let engine = IndicatorEngine::for_records(calendar, &table.records)
            .on_time_limit(self.policy.on_time_limit);
        let table = engine.apply(table);

        let table = Classifier::new(self.provider_map.clone()).apply(table);

        let aggregator = Aggregator::new(self.policy.clone());
        ReportData {
            summaries: aggregator.monthly_summaries(&table.records),
            cross_tab: aggregator.channel_cross_tab(&table.records),
            alerts: aggregator.alerts(&table.records, self.run_date),
            daily_volume: aggregator.daily_courier_volume(&table.records),
            run_date: self.run_date,
            table,
        }
    }
}
