//! Multi-Dimensional Aggregation
//!
//! Three independent derivations over the classified record set, plus the
//! chart series. None of them mutates records, so they may run in any
//! order:
//!
//! 1. Monthly summary per allow-listed provider (courier partition)
//! 2. Provider × channel cross-tab (full record set)
//! 3. Yesterday's alert roll-up (courier partition)
//!
//! Provider rows outside the fixed allow-list order appear in
//! first-appearance order, which keeps every output deterministic for a
//! given input.

use chrono::{Datelike, NaiveDate};
use mailkpi_core::{
    month_name, AlertRow, AlertSummary, ChannelCrossTab, CrossTabRow, DailyVolumeDay,
    DailyVolumeSeries, MonthlySummaryRow, ProviderMonthlySummary, Record, ReportPolicy, Term,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Sort rank for month keys: calendar months rank by number, fallback
/// labels rank after them in first-appearance order.
const FALLBACK_MONTH_RANK: u32 = 13;

/// Aggregation over classified records, configured by an immutable policy
#[derive(Clone, Debug, Default)]
pub struct Aggregator {
    policy: ReportPolicy,
}

impl Aggregator {
    pub fn new(policy: ReportPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ReportPolicy {
        &self.policy
    }

    /// Records whose channel is the distinguished courier category
    pub fn courier_partition<'r>(&self, records: &'r [Record]) -> Vec<&'r Record> {
        records
            .iter()
            .filter(|r| r.is_courier(&self.policy.courier_channel))
            .collect()
    }

    /// Distinct providers of the courier partition, first-appearance order
    pub fn courier_providers(&self, records: &[Record]) -> Vec<String> {
        let mut providers: Vec<String> = Vec::new();
        for record in self.courier_partition(records) {
            if !providers.iter().any(|p| p == &record.provider) {
                providers.push(record.provider.clone());
            }
        }
        providers
    }

    // ========================================================================
    // Monthly Summary
    // ========================================================================

    /// Monthly summary blocks for the allow-listed providers, in the
    /// allow-list's fixed order.
    ///
    /// The allow-list is always iterated in full for deterministic
    /// coverage; a provider whose courier group is empty is omitted, never
    /// emitted as a zero row.
    pub fn monthly_summaries(&self, records: &[Record]) -> Vec<ProviderMonthlySummary> {
        let courier = self.courier_partition(records);

        let mut summaries = Vec::new();
        for provider in &self.policy.summary_providers {
            let group: Vec<&Record> = courier
                .iter()
                .filter(|r| &r.provider == provider)
                .copied()
                .collect();
            if group.is_empty() {
                continue;
            }
            summaries.push(ProviderMonthlySummary {
                provider: provider.clone(),
                rows: self.monthly_rows(&group),
            });
        }
        summaries
    }

    fn monthly_rows(&self, group: &[&Record]) -> Vec<MonthlySummaryRow> {
        // Group keys in encounter order, then a stable sort by rank:
        // calendar months come out chronological, fallback labels keep
        // their first appearance.
        let mut groups: Vec<(u32, String, Vec<&Record>)> = Vec::new();
        for record in group {
            let Some((rank, label)) = month_key(record) else {
                continue; // no filing date and no month label
            };
            match groups.iter_mut().find(|(r, l, _)| *r == rank && *l == label) {
                Some((_, _, members)) => members.push(record),
                None => groups.push((rank, label, vec![record])),
            }
        }
        groups.sort_by_key(|(rank, _, _)| *rank);

        groups
            .into_iter()
            .map(|(_, month, members)| self.summary_row(month, &members))
            .collect()
    }

    fn summary_row(&self, month: String, members: &[&Record]) -> MonthlySummaryRow {
        let universe = members.len() as u32;
        let late = members
            .iter()
            .filter(|r| r.term == Some(Term::Late))
            .count() as u32;
        let on_time = members
            .iter()
            .filter(|r| r.term == Some(Term::OnTime))
            .count() as u32;
        let exclusions = members
            .iter()
            .filter(|r| r.is_excluded(&self.policy.exclusion_marker))
            .count() as u32;

        MonthlySummaryRow {
            month,
            universe,
            late,
            exclusions,
            on_time,
            on_time_pct: format_percentage(on_time, universe),
        }
    }

    // ========================================================================
    // Channel Cross-tab
    // ========================================================================

    /// Provider × channel counts over the full record set, providers in
    /// first-appearance order. Every record lands in exactly one cell, so
    /// the grand total equals the record count.
    pub fn channel_cross_tab(&self, records: &[Record]) -> ChannelCrossTab {
        let mut rows: Vec<CrossTabRow> = Vec::new();
        for record in records {
            let slot = match rows.iter().position(|r| r.provider == record.provider) {
                Some(slot) => slot,
                None => {
                    rows.push(CrossTabRow {
                        provider: record.provider.clone(),
                        courier: 0,
                        consolidated: 0,
                    });
                    rows.len() - 1
                }
            };
            if record.is_courier(&self.policy.courier_channel) {
                rows[slot].courier += 1;
            } else {
                rows[slot].consolidated += 1;
            }
        }
        ChannelCrossTab { rows }
    }

    // ========================================================================
    // Alert Roll-up
    // ========================================================================

    /// Courier records filed exactly one calendar day before the run date,
    /// grouped by provider. Recomputed fresh on every run.
    pub fn alerts(&self, records: &[Record], run_date: NaiveDate) -> AlertSummary {
        let cutoff = run_date - chrono::Duration::days(1);

        let mut rows: Vec<AlertRow> = Vec::new();
        for record in self.courier_partition(records) {
            if record.filed != Some(cutoff) {
                continue;
            }
            match rows.iter_mut().find(|r| r.provider == record.provider) {
                Some(row) => row.count += 1,
                None => rows.push(AlertRow { provider: record.provider.clone(), count: 1 }),
            }
        }
        AlertSummary { cutoff, rows }
    }

    // ========================================================================
    // Daily Courier Volume
    // ========================================================================

    /// Courier volume per (filing date, provider); the stacked-bar series.
    /// Days ascend; providers keep first-appearance order. Records without
    /// a filing date cannot be plotted and are skipped.
    pub fn daily_courier_volume(&self, records: &[Record]) -> DailyVolumeSeries {
        let dated: Vec<&Record> = self
            .courier_partition(records)
            .into_iter()
            .filter(|r| r.filed.is_some())
            .collect();

        let mut providers: Vec<String> = Vec::new();
        for record in &dated {
            if !providers.iter().any(|p| p == &record.provider) {
                providers.push(record.provider.clone());
            }
        }

        let mut by_day: BTreeMap<NaiveDate, Vec<u32>> = BTreeMap::new();
        for record in &dated {
            let Some(filed) = record.filed else { continue };
            let Some(slot) = providers.iter().position(|p| p == &record.provider) else {
                continue;
            };
            by_day.entry(filed).or_insert_with(|| vec![0; providers.len()])[slot] += 1;
        }

        DailyVolumeSeries {
            providers,
            days: by_day
                .into_iter()
                .map(|(date, counts)| DailyVolumeDay { date, counts })
                .collect(),
        }
    }
}

/// Month grouping key: filing-date month when present, otherwise the raw
/// `MES` label; `None` when neither exists.
fn month_key(record: &Record) -> Option<(u32, String)> {
    if let Some(filed) = record.filed {
        let number = filed.month();
        return month_name(number).map(|name| (number, name.to_string()));
    }
    let label = record.month.trim();
    if label.is_empty() {
        return None;
    }
    Some((FALLBACK_MONTH_RANK, label.to_uppercase()))
}

/// On-time percentage with exact two-decimal rounding, e.g. `66.67%`
fn format_percentage(on_time: u32, universe: u32) -> String {
    if universe == 0 {
        return "0.00%".to_string();
    }
    let pct = Decimal::from(u64::from(on_time) * 100) / Decimal::from(universe);
    format!("{:.2}%", pct.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn record(provider: &str, channel: &str, filed: Option<NaiveDate>, term: Term) -> Record {
        let mut record = Record::new().channel(channel);
        record.provider = provider.to_string();
        record.filed = filed;
        record.term = Some(term);
        record
    }

    fn aggregator() -> Aggregator {
        Aggregator::new(ReportPolicy::default())
    }

    #[test]
    fn summary_blocks_follow_allow_list_order() {
        let records = vec![
            record("BELISARIO", "Courier", Some(date(2024, 1, 2)), Term::OnTime),
            record("UTMDL", "Courier", Some(date(2024, 1, 3)), Term::Late),
            record("GESTAR INNOVACION", "Courier", Some(date(2024, 2, 1)), Term::OnTime),
        ];
        let summaries = aggregator().monthly_summaries(&records);
        let providers: Vec<&str> = summaries.iter().map(|s| s.provider.as_str()).collect();
        // BELISARIO397 has no records: omitted, not a zero row
        assert_eq!(providers, vec!["UTMDL", "GESTAR INNOVACION", "BELISARIO"]);
    }

    #[test]
    fn unlisted_providers_never_reach_the_summary() {
        let records = vec![
            record("DESCONOCIDO", "Courier", Some(date(2024, 1, 2)), Term::OnTime),
            record("GER.MED.EXCELENCIA", "Courier", Some(date(2024, 1, 2)), Term::OnTime),
        ];
        assert!(aggregator().monthly_summaries(&records).is_empty());
    }

    #[test]
    fn summary_ignores_non_courier_records() {
        let records = vec![
            record("UTMDL", "Consolidado", Some(date(2024, 1, 2)), Term::OnTime),
            record("UTMDL", "Courier", Some(date(2024, 1, 3)), Term::Late),
        ];
        let summaries = aggregator().monthly_summaries(&records);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].rows[0].universe, 1);
    }

    #[test]
    fn summary_counts_partition_the_universe() {
        let mut records = vec![
            record("UTMDL", "Courier", Some(date(2024, 1, 2)), Term::OnTime),
            record("UTMDL", "Courier", Some(date(2024, 1, 3)), Term::OnTime),
            record("UTMDL", "Courier", Some(date(2024, 1, 4)), Term::Late),
        ];
        records[2].observation = "EXCLUIR - reenvio".to_string();

        let summaries = aggregator().monthly_summaries(&records);
        let row = &summaries[0].rows[0];
        assert_eq!(row.month, "ENERO");
        assert_eq!(row.universe, 3);
        assert_eq!(row.late, 1);
        assert_eq!(row.on_time, 2);
        assert_eq!(row.exclusions, 1);
        assert_eq!(row.on_time_pct, "66.67%");
        assert!(row.is_consistent());
    }

    #[test]
    fn months_come_out_chronological_with_fallbacks_last() {
        let mut no_date = record("UTMDL", "Courier", None, Term::Late);
        no_date.month = "sin radicar".to_string();
        let records = vec![
            record("UTMDL", "Courier", Some(date(2024, 3, 5)), Term::OnTime),
            no_date,
            record("UTMDL", "Courier", Some(date(2024, 1, 9)), Term::OnTime),
            record("UTMDL", "Courier", Some(date(2023, 1, 12)), Term::Late),
        ];
        let summaries = aggregator().monthly_summaries(&records);
        let months: Vec<&str> = summaries[0].rows.iter().map(|r| r.month.as_str()).collect();
        // Two ENERO records (2023 and 2024) pool under one label
        assert_eq!(months, vec!["ENERO", "MARZO", "SIN RADICAR"]);
        assert_eq!(summaries[0].rows[0].universe, 2);
    }

    #[test]
    fn record_without_any_month_key_is_skipped_by_the_summary_only() {
        let records = vec![
            record("UTMDL", "Courier", None, Term::Late),
            record("UTMDL", "Courier", Some(date(2024, 5, 2)), Term::OnTime),
        ];
        let summaries = aggregator().monthly_summaries(&records);
        assert_eq!(summaries[0].rows.len(), 1);
        assert_eq!(summaries[0].rows[0].universe, 1);
        // but the cross-tab still sees both
        assert_eq!(aggregator().channel_cross_tab(&records).grand_total(), 2);
    }

    #[test]
    fn percentage_rounding_is_exact() {
        assert_eq!(format_percentage(2, 3), "66.67%");
        assert_eq!(format_percentage(1, 2), "50.00%");
        assert_eq!(format_percentage(0, 4), "0.00%");
        assert_eq!(format_percentage(4, 4), "100.00%");
        assert_eq!(format_percentage(1, 3), "33.33%");
    }

    #[test]
    fn cross_tab_covers_every_record_once() {
        let records = vec![
            record("UTMDL", "Courier", None, Term::Late),
            record("UTMDL", "Consolidado", None, Term::Late),
            record("BELISARIO", "Courier", None, Term::OnTime),
            record("DESCONOCIDO", "Mensajeria interna", None, Term::Late),
        ];
        let tab = aggregator().channel_cross_tab(&records);

        let providers: Vec<&str> = tab.rows.iter().map(|r| r.provider.as_str()).collect();
        assert_eq!(providers, vec!["UTMDL", "BELISARIO", "DESCONOCIDO"]);
        assert_eq!(tab.courier_total(), 2);
        assert_eq!(tab.consolidated_total(), 2);
        assert_eq!(tab.grand_total(), records.len() as u32);
        assert_eq!(tab.courier_total() + tab.consolidated_total(), tab.grand_total());
    }

    #[test]
    fn alerts_keep_only_yesterdays_courier_filings() {
        let run_date = date(2024, 5, 7);
        let records = vec![
            record("UTMDL", "Courier", Some(date(2024, 5, 6)), Term::Late),
            record("UTMDL", "Courier", Some(date(2024, 5, 6)), Term::OnTime),
            record("BELISARIO", "Courier", Some(date(2024, 5, 5)), Term::OnTime),
            record("BELISARIO", "Consolidado", Some(date(2024, 5, 6)), Term::OnTime),
            record("GESTAR INNOVACION", "Courier", None, Term::Late),
        ];
        let alerts = aggregator().alerts(&records, run_date);
        assert_eq!(alerts.cutoff, date(2024, 5, 6));
        assert_eq!(alerts.rows.len(), 1);
        assert_eq!(alerts.rows[0].provider, "UTMDL");
        assert_eq!(alerts.rows[0].count, 2);
        assert_eq!(alerts.total(), 2);
    }

    #[test]
    fn daily_volume_matrix_is_dense_and_sorted() {
        let records = vec![
            record("UTMDL", "Courier", Some(date(2024, 5, 3)), Term::OnTime),
            record("BELISARIO", "Courier", Some(date(2024, 5, 2)), Term::OnTime),
            record("UTMDL", "Courier", Some(date(2024, 5, 2)), Term::Late),
            record("UTMDL", "Courier", None, Term::Late),
            record("UTMDL", "Consolidado", Some(date(2024, 5, 2)), Term::Late),
        ];
        let series = aggregator().daily_courier_volume(&records);
        assert_eq!(series.providers, vec!["UTMDL", "BELISARIO"]);
        assert_eq!(series.days.len(), 2);
        assert_eq!(series.days[0].date, date(2024, 5, 2));
        assert_eq!(series.days[0].counts, vec![1, 1]);
        assert_eq!(series.days[1].date, date(2024, 5, 3));
        assert_eq!(series.days[1].counts, vec![1, 0]);
        assert_eq!(series.max_day_total(), 2);
    }

    #[test]
    fn empty_courier_partition_degrades_to_empty_aggregates() {
        let records = vec![
            record("UTMDL", "Consolidado", Some(date(2024, 5, 2)), Term::OnTime),
        ];
        let agg = aggregator();
        assert!(agg.monthly_summaries(&records).is_empty());
        assert!(agg.alerts(&records, date(2024, 5, 3)).rows.is_empty());
        assert!(agg.daily_courier_volume(&records).is_empty());
        assert_eq!(agg.channel_cross_tab(&records).grand_total(), 1);
    }
}
