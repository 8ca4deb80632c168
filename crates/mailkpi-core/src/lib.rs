//! # mailkpi-core
//!
//! Core domain model and traits for the mailkpi correspondence pipeline.
//!
//! This crate provides:
//! - Domain types: `Record`, `Term`, `ProviderMap`, `ReportPolicy`
//! - Aggregate types: `ProviderMonthlySummary`, `ChannelCrossTab`, `AlertSummary`
//! - Capability traits: `HolidayCalendar`, `ChartRenderer`
//! - Error types shared by the report pipeline
//!
//! ## Example
//!
//! ```rust
//! use mailkpi_core::{ProviderMap, Record};
//!
//! let record = Record::new()
//!     .channel("Courier")
//!     .department("4 GRUPO CENTRO DE EXCELENCIA")
//!     .observation("entrega normal");
//!
//! let map = ProviderMap::default();
//! assert_eq!(map.resolve(&record.department), "UTMDL");
//! ```

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

// ============================================================================
// Input Columns
// ============================================================================

/// Filing-date column header
pub const COL_FILED: &str = "FECHA RADICACION";

/// Received-date column header
pub const COL_RECEIVED: &str = "FECHA RECIBIDO CORRESPONDENCIA";

/// Shipment-channel column header
pub const COL_CHANNEL: &str = "MEDIO DE ENVIO";

/// Sending-department column header
pub const COL_DEPARTMENT: &str = "DEPENDENCIA QUE ENVIA";

/// Pre-derived month-label column header
pub const COL_MONTH: &str = "MES";

/// Free-text observation column header
pub const COL_OBSERVATION: &str = "OBSERVACIÓN";

/// Columns every input file must carry. A file missing any of these is
/// rejected outright rather than partially loaded.
pub const EXPECTED_COLUMNS: [&str; 6] = [
    COL_FILED,
    COL_RECEIVED,
    COL_CHANNEL,
    COL_DEPARTMENT,
    COL_MONTH,
    COL_OBSERVATION,
];

/// Derived-column headers used in the written sheets
pub const COL_INDICATOR: &str = "INDICADOR";
pub const COL_TERM: &str = "TERMINO";
pub const COL_PROVIDER: &str = "Proveedor";

/// Annotation columns appended empty to the data sheets for manual
/// post-processing. An input column with the same header is blanked
/// rather than duplicated.
pub const ANNOTATION_COLUMNS: [&str; 3] = ["OPORTUNIDAD FINAL", "OBSERVACIÓN", "DEFINICION"];

// ============================================================================
// Policy Constants
// ============================================================================

/// A record is on-time when its indicator is strictly below this many
/// business days. Policy, not mechanism: overridable per run through
/// [`ReportPolicy::on_time_limit`].
pub const ON_TIME_LIMIT_DAYS: u32 = 2;

/// Substring of the observation field that marks a record as excluded
/// in the monthly summary.
pub const EXCLUSION_MARKER: &str = "EXCLUIR";

/// Sentinel provider for departments absent from the mapping table
pub const UNKNOWN_PROVIDER: &str = "DESCONOCIDO";

/// The distinguished shipment-channel value for the courier partition
pub const COURIER_CHANNEL: &str = "Courier";

/// Pooled label for every non-courier shipment channel
pub const CONSOLIDATED_LABEL: &str = "CONSOLIDADO";

/// Spanish month names, January first
pub const MONTH_NAMES: [&str; 12] = [
    "ENERO",
    "FEBRERO",
    "MARZO",
    "ABRIL",
    "MAYO",
    "JUNIO",
    "JULIO",
    "AGOSTO",
    "SEPTIEMBRE",
    "OCTUBRE",
    "NOVIEMBRE",
    "DICIEMBRE",
];

/// Month label for a 1-based month number
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

// ============================================================================
// Term
// ============================================================================

/// On-time/late classification of a record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Term {
    /// Delivered within the business-day limit
    OnTime,
    /// Over the limit, or not measurable (absent indicator)
    Late,
}

impl Term {
    /// Classify an indicator against the on-time limit.
    ///
    /// Total: an absent indicator is late, never unclassified.
    pub fn from_indicator(indicator: Option<u32>, limit: u32) -> Self {
        match indicator {
            Some(days) if days < limit => Self::OnTime,
            _ => Self::Late,
        }
    }

    /// Report label (`EN TERMINO` / `FUERA DE TERMINO`)
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnTime => "EN TERMINO",
            Self::Late => "FUERA DE TERMINO",
        }
    }

    pub const fn is_on_time(self) -> bool {
        matches!(self, Self::OnTime)
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Record
// ============================================================================

/// One row of the correspondence export.
///
/// The first six fields mirror the expected input columns; `extra` carries
/// any further columns verbatim in header order. The derived fields start
/// absent and are populated strictly left-to-right through the pipeline:
/// the date filler completes `received`, the indicator engine fills
/// `indicator` and `term`, the classifier fills `provider`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Filing date (`FECHA RADICACION`), absent when unparseable
    pub filed: Option<NaiveDate>,
    /// Received date (`FECHA RECIBIDO CORRESPONDENCIA`), absent until filled
    pub received: Option<NaiveDate>,
    /// Shipment channel (`MEDIO DE ENVIO`), free text
    pub channel: String,
    /// Sending department (`DEPENDENCIA QUE ENVIA`)
    pub department: String,
    /// Pre-derived month label (`MES`), grouping fallback
    pub month: String,
    /// Observation text (`OBSERVACIÓN`), drives the exclusion count
    pub observation: String,
    /// Pass-through cells for columns beyond the expected set
    pub extra: Vec<String>,
    /// Business-day indicator; absent when inputs are missing or inverted
    pub indicator: Option<u32>,
    /// On-time/late classification, total after the indicator engine
    pub term: Option<Term>,
    /// Resolved provider label; empty until classified, never empty after
    pub provider: String,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filing date
    pub fn filed(mut self, date: NaiveDate) -> Self {
        self.filed = Some(date);
        self
    }

    /// Set the received date
    pub fn received(mut self, date: NaiveDate) -> Self {
        self.received = Some(date);
        self
    }

    /// Set the shipment channel
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Set the sending department
    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    /// Set the pre-derived month label
    pub fn month(mut self, month: impl Into<String>) -> Self {
        self.month = month.into();
        self
    }

    /// Set the observation text
    pub fn observation(mut self, observation: impl Into<String>) -> Self {
        self.observation = observation.into();
        self
    }

    /// Whether this record belongs to the courier partition
    pub fn is_courier(&self, courier_channel: &str) -> bool {
        self.channel == courier_channel
    }

    /// Whether the observation carries the exclusion marker
    pub fn is_excluded(&self, marker: &str) -> bool {
        !marker.is_empty() && self.observation.contains(marker)
    }
}

/// An ordered record collection plus the pass-through column headers.
///
/// Insertion order is input row order and is preserved through the
/// pipeline; `extra_columns` names the cells in [`Record::extra`], in the
/// same order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    pub records: Vec<Record>,
    pub extra_columns: Vec<String>,
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records, extra_columns: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Union of calendar years over the filing and received dates of a record
/// set, ignoring absent values. Drives the holiday-calendar query.
pub fn record_years(records: &[Record]) -> BTreeSet<i32> {
    records
        .iter()
        .flat_map(|r| [r.filed, r.received])
        .flatten()
        .map(|d| d.year())
        .collect()
}

// ============================================================================
// Provider Mapping
// ============================================================================

/// Static, closed department → provider table.
///
/// Resolution is total: a department absent from the table maps to the
/// `unknown` sentinel, never to an absent value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderMap {
    entries: Vec<(String, String)>,
    unknown: String,
}

impl Default for ProviderMap {
    fn default() -> Self {
        let entries = [
            ("3 GRUPO JUNTAS DE CALIFICACIÓN", "BELISARIO"),
            ("3 GRUPO CENTRO DE EXCELENCIA", "BELISARIO"),
            ("4 GRUPO JUNTAS DE CALIFICACIÓN", "UTMDL"),
            ("4 GRUPO CENTRO DE EXCELENCIA", "UTMDL"),
            ("5 GRUPO CENTRO DE EXCELENCIA", "BELISARIO397"),
            ("5 GRUPO JUNTAS DE CALIFICACIÓN", "BELISARIO397"),
            ("6 GRUPO CENTRO DE EXCELENCIA", "GESTAR INNOVACION"),
            ("6 GRUPO JUNTAS DE CALIFICACIÓN", "GESTAR INNOVACION"),
            ("GERENCIA MEDICA EXCELENCIA", "GER.MED.EXCELENCIA"),
            (
                "GERENCIA MEDICA JUNTAS DE CALIFICACIÓN",
                "GER.MED.JUNTAS DE CALIFICACIÓN",
            ),
        ]
        .into_iter()
        .map(|(d, p)| (d.to_string(), p.to_string()))
        .collect();

        Self {
            entries,
            unknown: UNKNOWN_PROVIDER.to_string(),
        }
    }
}

impl ProviderMap {
    /// Empty table with the given sentinel
    pub fn with_unknown(unknown: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            unknown: unknown.into(),
        }
    }

    /// Add a department → provider entry
    pub fn entry(mut self, department: impl Into<String>, provider: impl Into<String>) -> Self {
        self.entries.push((department.into(), provider.into()));
        self
    }

    /// Resolve a department to its provider label
    pub fn resolve(&self, department: &str) -> &str {
        self.entries
            .iter()
            .find(|(d, _)| d == department)
            .map_or(self.unknown.as_str(), |(_, p)| p.as_str())
    }

    /// The mapped (department, provider) pairs, in table order
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// The sentinel label for unmapped departments
    pub fn unknown_label(&self) -> &str {
        &self.unknown
    }
}

// ============================================================================
// Report Policy
// ============================================================================

/// Immutable per-run configuration: allow-list, channel literals, markers
/// and the on-time limit. Injected into the classifier/aggregator at
/// construction; never global mutable state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportPolicy {
    /// Providers reported in the monthly summary, in emission order
    pub summary_providers: Vec<String>,
    /// Shipment-channel value distinguishing the courier partition
    pub courier_channel: String,
    /// Pooled label for non-courier channels
    pub consolidated_label: String,
    /// Observation substring marking an exclusion
    pub exclusion_marker: String,
    /// Business-day limit for the on-time classification
    pub on_time_limit: u32,
    /// Annotation columns appended empty to the data sheets
    pub annotation_columns: Vec<String>,
}

impl Default for ReportPolicy {
    fn default() -> Self {
        Self {
            summary_providers: ["UTMDL", "GESTAR INNOVACION", "BELISARIO397", "BELISARIO"]
                .map(String::from)
                .to_vec(),
            courier_channel: COURIER_CHANNEL.to_string(),
            consolidated_label: CONSOLIDATED_LABEL.to_string(),
            exclusion_marker: EXCLUSION_MARKER.to_string(),
            on_time_limit: ON_TIME_LIMIT_DAYS,
            annotation_columns: ANNOTATION_COLUMNS.map(String::from).to_vec(),
        }
    }
}

impl ReportPolicy {
    /// Replace the summary allow-list (order is emission order)
    pub fn summary_providers(mut self, providers: Vec<String>) -> Self {
        self.summary_providers = providers;
        self
    }

    /// Override the on-time limit
    pub fn on_time_limit(mut self, limit: u32) -> Self {
        self.on_time_limit = limit;
        self
    }

    /// Override the courier channel literal
    pub fn courier_channel(mut self, channel: impl Into<String>) -> Self {
        self.courier_channel = channel.into();
        self
    }
}

// ============================================================================
// Aggregates
// ============================================================================

/// One monthly summary row for a provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummaryRow {
    /// Month label (`ENERO` … `DICIEMBRE`, or the raw fallback label)
    pub month: String,
    /// Total record count for the group
    pub universe: u32,
    /// Late count
    pub late: u32,
    /// Records whose observation carries the exclusion marker
    pub exclusions: u32,
    /// On-time count
    pub on_time: u32,
    /// On-time percentage, two decimals, e.g. `66.67%`
    pub on_time_pct: String,
}

impl MonthlySummaryRow {
    /// Every record is on-time or late, so the two counts partition the
    /// universe.
    pub fn is_consistent(&self) -> bool {
        self.late + self.on_time == self.universe
    }
}

/// Monthly summary block for one allow-listed provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMonthlySummary {
    pub provider: String,
    pub rows: Vec<MonthlySummaryRow>,
}

/// One cross-tab row: record counts for a provider by channel category
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossTabRow {
    pub provider: String,
    pub courier: u32,
    pub consolidated: u32,
}

impl CrossTabRow {
    pub const fn total(&self) -> u32 {
        self.courier + self.consolidated
    }
}

/// Provider × channel cross-tab over the full record set
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCrossTab {
    /// One row per distinct provider, first-appearance order
    pub rows: Vec<CrossTabRow>,
}

impl ChannelCrossTab {
    pub fn courier_total(&self) -> u32 {
        self.rows.iter().map(|r| r.courier).sum()
    }

    pub fn consolidated_total(&self) -> u32 {
        self.rows.iter().map(|r| r.consolidated).sum()
    }

    pub fn grand_total(&self) -> u32 {
        self.rows.iter().map(CrossTabRow::total).sum()
    }
}

/// One alert row: yesterday's courier count for a provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRow {
    pub provider: String,
    pub count: u32,
}

/// Yesterday's courier filings, grouped by provider.
///
/// Computed fresh on every run against `cutoff` = run date − 1 day;
/// never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub cutoff: NaiveDate,
    pub rows: Vec<AlertRow>,
}

impl AlertSummary {
    pub fn total(&self) -> u32 {
        self.rows.iter().map(|r| r.count).sum()
    }
}

/// Daily courier volume by provider, the stacked-bar chart series.
///
/// `days[i].counts[j]` is the volume on `days[i].date` for `providers[j]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyVolumeSeries {
    /// Stack segment order, first-appearance order in the courier partition
    pub providers: Vec<String>,
    /// Ascending by date
    pub days: Vec<DailyVolumeDay>,
}

/// One day of the daily volume series
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyVolumeDay {
    pub date: NaiveDate,
    pub counts: Vec<u32>,
}

impl DailyVolumeDay {
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

impl DailyVolumeSeries {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Largest single-day total, the y-axis extent of the stacked bars
    pub fn max_day_total(&self) -> u32 {
        self.days.iter().map(DailyVolumeDay::total).max().unwrap_or(0)
    }
}

/// Everything the report builder consumes: the processed record set plus
/// the three aggregate views and the chart series, bound to the run date
/// that produced them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub table: RecordSet,
    pub summaries: Vec<ProviderMonthlySummary>,
    pub cross_tab: ChannelCrossTab,
    pub alerts: AlertSummary,
    pub daily_volume: DailyVolumeSeries,
    pub run_date: NaiveDate,
}

// ============================================================================
// Capabilities
// ============================================================================

/// Business-calendar capability: the public-holiday dates covering a set
/// of years for one fixed jurisdiction.
///
/// Implementations must be pure functions of the year set, with no hidden
/// state across calls.
pub trait HolidayCalendar {
    fn holidays(&self, years: &BTreeSet<i32>) -> BTreeSet<NaiveDate>;
}

/// One slice of a proportion chart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub label: String,
    pub count: u32,
}

/// An encoded chart image ready for embedding
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartImage {
    /// PNG-encoded pixels
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Chart capability: aggregated series in, encoded image out.
///
/// Renderers must accept empty input (zero slices, zero days) and produce
/// a blank canvas; the report builder additionally skips the embed
/// entirely when a partition is empty.
pub trait ChartRenderer {
    /// Proportion (pie) chart of record counts per category
    fn proportion_chart(&self, slices: &[ChartSlice]) -> Result<ChartImage, ReportError>;

    /// Stacked-bar chart of daily volume by provider
    fn stacked_bars(&self, series: &DailyVolumeSeries) -> Result<ChartImage, ReportError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Report-assembly error
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Chart error: {0}")]
    Chart(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn record_builder() {
        let record = Record::new()
            .filed(date(2024, 1, 1))
            .channel("Courier")
            .department("GERENCIA MEDICA EXCELENCIA")
            .month("ENERO")
            .observation("EXCLUIR duplicado");

        assert_eq!(record.filed, Some(date(2024, 1, 1)));
        assert_eq!(record.received, None);
        assert!(record.is_courier(COURIER_CHANNEL));
        assert!(record.is_excluded(EXCLUSION_MARKER));
        assert_eq!(record.indicator, None);
        assert_eq!(record.term, None);
        assert_eq!(record.provider, "");
    }

    #[test]
    fn term_classification_is_total() {
        assert_eq!(Term::from_indicator(Some(0), ON_TIME_LIMIT_DAYS), Term::OnTime);
        assert_eq!(Term::from_indicator(Some(1), ON_TIME_LIMIT_DAYS), Term::OnTime);
        assert_eq!(Term::from_indicator(Some(2), ON_TIME_LIMIT_DAYS), Term::Late);
        assert_eq!(Term::from_indicator(None, ON_TIME_LIMIT_DAYS), Term::Late);
    }

    #[test]
    fn term_labels() {
        assert_eq!(Term::OnTime.to_string(), "EN TERMINO");
        assert_eq!(Term::Late.to_string(), "FUERA DE TERMINO");
    }

    #[test]
    fn provider_map_resolves_every_documented_department() {
        let map = ProviderMap::default();
        for (department, provider) in map.entries() {
            assert_eq!(map.resolve(department), provider);
        }
        assert_eq!(map.resolve("UNKNOWN DEPT"), UNKNOWN_PROVIDER);
        assert_eq!(map.resolve(""), UNKNOWN_PROVIDER);
    }

    #[test]
    fn provider_map_belisario_group() {
        let map = ProviderMap::default();
        assert_eq!(map.resolve("3 GRUPO JUNTAS DE CALIFICACIÓN"), "BELISARIO");
        assert_eq!(map.resolve("3 GRUPO CENTRO DE EXCELENCIA"), "BELISARIO");
        assert_eq!(map.resolve("5 GRUPO JUNTAS DE CALIFICACIÓN"), "BELISARIO397");
    }

    #[test]
    fn policy_defaults() {
        let policy = ReportPolicy::default();
        assert_eq!(
            policy.summary_providers,
            vec!["UTMDL", "GESTAR INNOVACION", "BELISARIO397", "BELISARIO"]
        );
        assert_eq!(policy.on_time_limit, 2);
        assert_eq!(policy.courier_channel, "Courier");
        assert_eq!(policy.annotation_columns.len(), 3);
    }

    #[test]
    fn record_years_unions_both_date_columns() {
        let records = vec![
            Record::new().filed(date(2023, 12, 29)).received(date(2024, 1, 2)),
            Record::new().filed(date(2024, 3, 1)),
            Record::new(),
        ];
        let years: Vec<i32> = record_years(&records).into_iter().collect();
        assert_eq!(years, vec![2023, 2024]);
    }

    #[test]
    fn month_names_cover_the_year() {
        assert_eq!(month_name(1), Some("ENERO"));
        assert_eq!(month_name(12), Some("DICIEMBRE"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn cross_tab_totals_agree() {
        let tab = ChannelCrossTab {
            rows: vec![
                CrossTabRow { provider: "UTMDL".into(), courier: 3, consolidated: 1 },
                CrossTabRow { provider: "BELISARIO".into(), courier: 2, consolidated: 4 },
            ],
        };
        assert_eq!(tab.courier_total(), 5);
        assert_eq!(tab.consolidated_total(), 5);
        assert_eq!(tab.grand_total(), 10);
        assert_eq!(tab.courier_total() + tab.consolidated_total(), tab.grand_total());
    }

    #[test]
    fn summary_row_consistency() {
        let row = MonthlySummaryRow {
            month: "ENERO".into(),
            universe: 10,
            late: 4,
            exclusions: 1,
            on_time: 6,
            on_time_pct: "60.00%".into(),
        };
        assert!(row.is_consistent());
    }

    #[test]
    fn alert_summary_total() {
        let summary = AlertSummary {
            cutoff: date(2024, 5, 6),
            rows: vec![
                AlertRow { provider: "UTMDL".into(), count: 2 },
                AlertRow { provider: "BELISARIO".into(), count: 3 },
            ],
        };
        assert_eq!(summary.total(), 5);
    }

    #[test]
    fn daily_series_extent() {
        let series = DailyVolumeSeries {
            providers: vec!["UTMDL".into(), "BELISARIO".into()],
            days: vec![
                DailyVolumeDay { date: date(2024, 5, 1), counts: vec![1, 2] },
                DailyVolumeDay { date: date(2024, 5, 2), counts: vec![4, 0] },
            ],
        };
        assert_eq!(series.max_day_total(), 4);
        assert!(!series.is_empty());
        assert_eq!(DailyVolumeSeries::default().max_day_total(), 0);
    }
}
