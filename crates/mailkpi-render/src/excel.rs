//! Excel Workbook Rendering
//!
//! Builds the six-part delivery report as a single `.xlsx` workbook:
//!
//! | Sheet            | Content                                              |
//! |------------------|------------------------------------------------------|
//! | `BASE`           | Every record with the derived columns                |
//! | `COURIER`        | The courier partition (omitted when empty)           |
//! | *one per provider* | Courier records of each provider                   |
//! | `MEDIO DE ENVIO` | Provider × channel cross-tab with proportion chart   |
//! | `ALERTAS`        | Yesterday's courier filings with daily volume chart  |
//! | `IND COURIER`    | Monthly indicator blocks per allow-listed provider   |
//!
//! Data sheets repeat one column layout: the expected input columns, the
//! derived indicator/term/provider columns, the pass-through extras, and
//! the annotation columns written empty for manual follow-up. Worksheet
//! names are derived from provider labels, truncated to Excel's 31-char
//! limit and disambiguated with a `~2`, `~3`, … suffix on collision.
//!
//! Totals are written as live `SUM` formulas by default so the workbook
//! keeps adding up while analysts edit it; `use_formulas(false)` switches
//! to plain values.

use crate::charts::{BitmapChartRenderer, ChartStyle};
use mailkpi_core::{
    ChartImage, ChartRenderer, ChartSlice, Record, ReportData, ReportError, ReportPolicy,
    COL_CHANNEL, COL_DEPARTMENT, COL_FILED, COL_INDICATOR, COL_MONTH, COL_OBSERVATION,
    COL_PROVIDER, COL_RECEIVED, COL_TERM,
};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Image, Workbook, Worksheet};
use std::io::Write;

/// Excel's hard limit on worksheet name length, in characters
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Date cell rendering, ISO calendar date
const ISO_DATE: &str = "%Y-%m-%d";

/// Column headers of one monthly indicator block
const SUMMARY_HEADERS: [&str; 6] = [
    "MES",
    "UNIVERSO",
    "FUERA DE TERMINO",
    "EXCLUSIONES",
    "TERMINOS",
    "PORCENTAJE INDICADO",
];

/// Workbook builder for the delivery report.
///
/// Sheet names, formula/chart toggles and the report policy are plain
/// fields with builder-style setters; `render` produces the finished
/// workbook as bytes.
#[derive(Clone, Debug)]
pub struct ReportBuilder {
    /// Name of the full-data sheet
    pub base_sheet: String,
    /// Name of the courier-partition sheet
    pub courier_sheet: String,
    /// Name of the channel cross-tab sheet
    pub cross_tab_sheet: String,
    /// Name of the alert sheet
    pub alert_sheet: String,
    /// Name of the monthly indicator sheet
    pub summary_sheet: String,
    /// Write totals as live `SUM` formulas instead of plain values
    pub use_formulas: bool,
    /// Embed the proportion and daily-volume charts
    pub include_charts: bool,
    /// Labels, markers and the allow-list driving the sheet content
    pub policy: ReportPolicy,
    /// Geometry and palette for embedded charts and legend swatches
    pub chart_style: ChartStyle,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self {
            base_sheet: "BASE".to_string(),
            courier_sheet: "COURIER".to_string(),
            cross_tab_sheet: "MEDIO DE ENVIO".to_string(),
            alert_sheet: "ALERTAS".to_string(),
            summary_sheet: "IND COURIER".to_string(),
            use_formulas: true,
            include_charts: true,
            policy: ReportPolicy::default(),
            chart_style: ChartStyle::default(),
        }
    }
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle live `SUM` formulas in total cells
    pub fn use_formulas(mut self, use_formulas: bool) -> Self {
        self.use_formulas = use_formulas;
        self
    }

    /// Toggle chart embedding
    pub fn include_charts(mut self, include_charts: bool) -> Self {
        self.include_charts = include_charts;
        self
    }

    /// Replace the report policy
    pub fn policy(mut self, policy: ReportPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the chart style
    pub fn chart_style(mut self, style: ChartStyle) -> Self {
        self.chart_style = style;
        self
    }

    /// Render the workbook with the default bitmap chart renderer
    pub fn render(&self, data: &ReportData) -> Result<Vec<u8>, ReportError> {
        let charts = BitmapChartRenderer::new(self.chart_style.clone());
        self.render_with_charts(data, &charts)
    }

    /// Render the workbook with a caller-supplied chart renderer.
    ///
    /// Legend swatches follow `chart_style`, so a custom renderer should
    /// share its palette.
    pub fn render_with_charts(
        &self,
        data: &ReportData,
        charts: &dyn ChartRenderer,
    ) -> Result<Vec<u8>, ReportError> {
        let mut workbook = Workbook::new();
        let formats = self.create_formats();

        let all: Vec<&Record> = data.table.records.iter().collect();
        let courier: Vec<&Record> = data
            .table
            .records
            .iter()
            .filter(|r| r.is_courier(&self.policy.courier_channel))
            .collect();

        self.add_record_sheet(
            &mut workbook,
            &self.base_sheet,
            &all,
            &data.table.extra_columns,
            &formats,
        )?;
        if !courier.is_empty() {
            self.add_record_sheet(
                &mut workbook,
                &self.courier_sheet,
                &courier,
                &data.table.extra_columns,
                &formats,
            )?;
        }
        self.add_provider_sheets(&mut workbook, &courier, &data.table.extra_columns, &formats)?;
        self.add_cross_tab_sheet(&mut workbook, data, charts, &formats)?;
        self.add_alert_sheet(&mut workbook, data, charts, &formats)?;
        self.add_summary_sheet(&mut workbook, data, &formats)?;

        workbook
            .save_to_buffer()
            .map_err(|e| ReportError::Format(format!("Failed to create workbook: {e}")))
    }

    // ========================================================================
    // Data sheets
    // ========================================================================

    /// One record sheet: header row, one row per record, autofilter and
    /// frozen header.
    fn add_record_sheet(
        &self,
        workbook: &mut Workbook,
        name: &str,
        records: &[&Record],
        extra_columns: &[String],
        formats: &ExcelFormats,
    ) -> Result<(), ReportError> {
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(name)
            .map_err(|e| ReportError::Format(e.to_string()))?;

        let columns = self.record_columns(extra_columns);

        for (col, (header, _)) in columns.iter().enumerate() {
            let col = col as u16;
            sheet
                .write_with_format(0, col, header.as_str(), &formats.header)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            sheet.set_column_width(col, column_width(header)).ok();
        }

        for (row, record) in records.iter().enumerate() {
            let row = row as u32 + 1;
            for (col, (_, source)) in columns.iter().enumerate() {
                let col = col as u16;
                if *source == ColumnSource::Indicator {
                    // Numeric when measured, blank when not.
                    match record.indicator {
                        Some(days) => sheet
                            .write_with_format(row, col, days, &formats.integer)
                            .map_err(|e| ReportError::Format(e.to_string()))?,
                        None => sheet
                            .write_with_format(row, col, "", &formats.text)
                            .map_err(|e| ReportError::Format(e.to_string()))?,
                    };
                } else {
                    let value = record_cell(record, *source);
                    sheet
                        .write_with_format(row, col, value.as_str(), &formats.text)
                        .map_err(|e| ReportError::Format(e.to_string()))?;
                }
            }
        }

        sheet.set_freeze_panes(1, 0).ok();
        if !records.is_empty() {
            sheet
                .autofilter(0, 0, records.len() as u32, columns.len() as u16 - 1)
                .ok();
        }

        Ok(())
    }

    /// One sheet per provider present in the courier partition, in
    /// first-appearance order.
    fn add_provider_sheets(
        &self,
        workbook: &mut Workbook,
        courier: &[&Record],
        extra_columns: &[String],
        formats: &ExcelFormats,
    ) -> Result<(), ReportError> {
        let mut providers: Vec<&str> = Vec::new();
        for record in courier {
            if !providers.contains(&record.provider.as_str()) {
                providers.push(&record.provider);
            }
        }

        let reserved = [
            self.base_sheet.as_str(),
            self.courier_sheet.as_str(),
            self.cross_tab_sheet.as_str(),
            self.alert_sheet.as_str(),
            self.summary_sheet.as_str(),
        ];
        let names = sheet_names(&providers, &reserved);

        for (provider, name) in providers.iter().zip(&names) {
            let rows: Vec<&Record> = courier
                .iter()
                .copied()
                .filter(|r| r.provider == *provider)
                .collect();
            self.add_record_sheet(workbook, name, &rows, extra_columns, formats)?;
        }

        Ok(())
    }

    /// The output column layout: expected columns, derived columns, extras,
    /// then annotation columns. An annotation sharing a header with an input
    /// column blanks that column instead of duplicating it.
    fn record_columns(&self, extra_columns: &[String]) -> Vec<(String, ColumnSource)> {
        let annotations = &self.policy.annotation_columns;
        let shadowed = |header: &str| annotations.iter().any(|a| a == header);

        let observation = if shadowed(COL_OBSERVATION) {
            ColumnSource::Blank
        } else {
            ColumnSource::Observation
        };

        let mut columns = vec![
            (COL_FILED.to_string(), ColumnSource::Filed),
            (COL_RECEIVED.to_string(), ColumnSource::Received),
            (COL_CHANNEL.to_string(), ColumnSource::Channel),
            (COL_DEPARTMENT.to_string(), ColumnSource::Department),
            (COL_MONTH.to_string(), ColumnSource::Month),
            (COL_OBSERVATION.to_string(), observation),
            (COL_INDICATOR.to_string(), ColumnSource::Indicator),
            (COL_TERM.to_string(), ColumnSource::Term),
            (COL_PROVIDER.to_string(), ColumnSource::Provider),
        ];

        for (index, name) in extra_columns.iter().enumerate() {
            let source = if shadowed(name) {
                ColumnSource::Blank
            } else {
                ColumnSource::Extra(index)
            };
            columns.push((name.clone(), source));
        }

        for annotation in annotations {
            if !columns.iter().any(|(header, _)| header == annotation) {
                columns.push((annotation.clone(), ColumnSource::Blank));
            }
        }

        columns
    }

    // ========================================================================
    // Aggregate sheets
    // ========================================================================

    /// Provider × channel cross-tab with row and column totals and the
    /// channel proportion chart.
    fn add_cross_tab_sheet(
        &self,
        workbook: &mut Workbook,
        data: &ReportData,
        charts: &dyn ChartRenderer,
        formats: &ExcelFormats,
    ) -> Result<(), ReportError> {
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(&self.cross_tab_sheet)
            .map_err(|e| ReportError::Format(e.to_string()))?;

        let cross = &data.cross_tab;
        let headers = [
            COL_PROVIDER,
            self.policy.courier_channel.as_str(),
            self.policy.consolidated_label.as_str(),
            "Total",
        ];
        for (col, header) in headers.iter().enumerate() {
            sheet
                .write_with_format(0, col as u16, *header, &formats.header)
                .map_err(|e| ReportError::Format(e.to_string()))?;
        }
        sheet.set_column_width(0, 26.0).ok();
        sheet.set_column_width(1, 12.0).ok();
        sheet.set_column_width(2, 15.0).ok();
        sheet.set_column_width(3, 10.0).ok();

        for (index, row) in cross.rows.iter().enumerate() {
            let r = index as u32 + 1;
            sheet
                .write_with_format(r, 0, row.provider.as_str(), &formats.text)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            sheet
                .write_with_format(r, 1, row.courier, &formats.integer)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            sheet
                .write_with_format(r, 2, row.consolidated, &formats.integer)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            if self.use_formulas {
                let formula = format!("=SUM(B{excel}:C{excel})", excel = r + 1);
                sheet
                    .write_formula_with_format(r, 3, formula.as_str(), &formats.integer)
                    .map_err(|e| ReportError::Format(e.to_string()))?;
            } else {
                sheet
                    .write_with_format(r, 3, row.total(), &formats.integer)
                    .map_err(|e| ReportError::Format(e.to_string()))?;
            }
        }

        let total_row = cross.rows.len() as u32 + 1;
        sheet
            .write_with_format(total_row, 0, "Total", &formats.total_label)
            .map_err(|e| ReportError::Format(e.to_string()))?;
        if self.use_formulas && !cross.rows.is_empty() {
            for (col, letter) in [(1u16, 'B'), (2, 'C'), (3, 'D')] {
                // 0-based total_row equals the last data row in Excel terms.
                let formula = format!("=SUM({letter}2:{letter}{total_row})");
                sheet
                    .write_formula_with_format(total_row, col, formula.as_str(), &formats.total_integer)
                    .map_err(|e| ReportError::Format(e.to_string()))?;
            }
        } else {
            let totals = [
                cross.courier_total(),
                cross.consolidated_total(),
                cross.grand_total(),
            ];
            for (col, value) in (1u16..).zip(totals) {
                sheet
                    .write_with_format(total_row, col, value, &formats.total_integer)
                    .map_err(|e| ReportError::Format(e.to_string()))?;
            }
        }

        if self.include_charts && cross.grand_total() > 0 {
            let slices = [
                ChartSlice {
                    label: self.policy.courier_channel.clone(),
                    count: cross.courier_total(),
                },
                ChartSlice {
                    label: self.policy.consolidated_label.clone(),
                    count: cross.consolidated_total(),
                },
            ];
            let image = charts.proportion_chart(&slices)?;
            embed_chart(sheet, 1, 5, &image)?;
            let labels = [
                self.policy.courier_channel.clone(),
                self.policy.consolidated_label.clone(),
            ];
            self.write_legend(sheet, 2 + rows_for_image(image.height), 5, &labels)?;
        }

        Ok(())
    }

    /// Yesterday's courier filings per provider, under a dated title, with
    /// the daily-volume chart beside them.
    fn add_alert_sheet(
        &self,
        workbook: &mut Workbook,
        data: &ReportData,
        charts: &dyn ChartRenderer,
        formats: &ExcelFormats,
    ) -> Result<(), ReportError> {
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(&self.alert_sheet)
            .map_err(|e| ReportError::Format(e.to_string()))?;

        let alerts = &data.alerts;
        let title = format!(
            "ALERTAS {} DEL {}",
            self.policy.courier_channel.to_uppercase(),
            alerts.cutoff.format(ISO_DATE)
        );
        sheet.merge_range(0, 0, 0, 1, &title, &formats.title).ok();

        for (col, header) in ["Proveedor", "CANTIDAD"].iter().enumerate() {
            sheet
                .write_with_format(1, col as u16, *header, &formats.header)
                .map_err(|e| ReportError::Format(e.to_string()))?;
        }
        sheet.set_column_width(0, 26.0).ok();
        sheet.set_column_width(1, 12.0).ok();

        for (index, row) in alerts.rows.iter().enumerate() {
            let r = index as u32 + 2;
            sheet
                .write_with_format(r, 0, row.provider.as_str(), &formats.text)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            sheet
                .write_with_format(r, 1, row.count, &formats.integer)
                .map_err(|e| ReportError::Format(e.to_string()))?;
        }

        let total_row = alerts.rows.len() as u32 + 2;
        sheet
            .write_with_format(total_row, 0, "Total", &formats.total_label)
            .map_err(|e| ReportError::Format(e.to_string()))?;
        if self.use_formulas && !alerts.rows.is_empty() {
            let formula = format!("=SUM(B3:B{total_row})");
            sheet
                .write_formula_with_format(total_row, 1, formula.as_str(), &formats.total_integer)
                .map_err(|e| ReportError::Format(e.to_string()))?;
        } else {
            sheet
                .write_with_format(total_row, 1, alerts.total(), &formats.total_integer)
                .map_err(|e| ReportError::Format(e.to_string()))?;
        }

        if self.include_charts && !data.daily_volume.is_empty() {
            let image = charts.stacked_bars(&data.daily_volume)?;
            embed_chart(sheet, 1, 4, &image)?;
            self.write_legend(
                sheet,
                2 + rows_for_image(image.height),
                4,
                &data.daily_volume.providers,
            )?;
        }

        Ok(())
    }

    /// Monthly indicator blocks, one per allow-listed provider, separated
    /// by a blank row.
    fn add_summary_sheet(
        &self,
        workbook: &mut Workbook,
        data: &ReportData,
        formats: &ExcelFormats,
    ) -> Result<(), ReportError> {
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(&self.summary_sheet)
            .map_err(|e| ReportError::Format(e.to_string()))?;

        let widths = [14.0, 12.0, 18.0, 14.0, 12.0, 21.0];
        for (col, width) in widths.iter().enumerate() {
            sheet.set_column_width(col as u16, *width).ok();
        }

        let mut start_row: u32 = 0;
        for block in &data.summaries {
            let title = format!("{} {}", COL_INDICATOR, block.provider);
            sheet
                .merge_range(
                    start_row,
                    0,
                    start_row,
                    SUMMARY_HEADERS.len() as u16 - 1,
                    &title,
                    &formats.title,
                )
                .ok();

            for (col, header) in SUMMARY_HEADERS.iter().enumerate() {
                sheet
                    .write_with_format(start_row + 1, col as u16, *header, &formats.header)
                    .map_err(|e| ReportError::Format(e.to_string()))?;
            }

            for (index, row) in block.rows.iter().enumerate() {
                let r = start_row + 2 + index as u32;
                sheet
                    .write_with_format(r, 0, row.month.as_str(), &formats.text)
                    .map_err(|e| ReportError::Format(e.to_string()))?;
                sheet
                    .write_with_format(r, 1, row.universe, &formats.integer)
                    .map_err(|e| ReportError::Format(e.to_string()))?;
                sheet
                    .write_with_format(r, 2, row.late, &formats.integer)
                    .map_err(|e| ReportError::Format(e.to_string()))?;
                sheet
                    .write_with_format(r, 3, row.exclusions, &formats.integer)
                    .map_err(|e| ReportError::Format(e.to_string()))?;
                if self.use_formulas {
                    // On-time is the remainder of the universe.
                    let formula = format!("=B{excel}-C{excel}", excel = r + 1);
                    sheet
                        .write_formula_with_format(r, 4, formula.as_str(), &formats.integer)
                        .map_err(|e| ReportError::Format(e.to_string()))?;
                } else {
                    sheet
                        .write_with_format(r, 4, row.on_time, &formats.integer)
                        .map_err(|e| ReportError::Format(e.to_string()))?;
                }
                sheet
                    .write_with_format(r, 5, row.on_time_pct.as_str(), &formats.percent)
                    .map_err(|e| ReportError::Format(e.to_string()))?;
            }

            sheet
                .autofilter(
                    start_row + 1,
                    0,
                    start_row + 1 + block.rows.len() as u32,
                    SUMMARY_HEADERS.len() as u16 - 1,
                )
                .ok();

            start_row += block.rows.len() as u32 + 3;
        }

        Ok(())
    }

    /// Legend swatches below a chart, one palette-coloured cell per label
    fn write_legend(
        &self,
        sheet: &mut Worksheet,
        start_row: u32,
        col: u16,
        labels: &[String],
    ) -> Result<(), ReportError> {
        for (index, label) in labels.iter().enumerate() {
            let swatch = Format::new()
                .set_background_color(rgb(self.chart_style.series_color(index)))
                .set_border(FormatBorder::Thin);
            let row = start_row + index as u32;
            sheet
                .write_with_format(row, col, "", &swatch)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            sheet
                .write(row, col + 1, label.as_str())
                .map_err(|e| ReportError::Format(e.to_string()))?;
        }
        Ok(())
    }

    fn create_formats(&self) -> ExcelFormats {
        ExcelFormats {
            header: Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_background_color(0x4472C4)
                .set_font_color(0xFFFFFF)
                .set_border(FormatBorder::Thin),
            title: Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_background_color(0xF5F8C9)
                .set_border(FormatBorder::Thin),
            text: Format::new().set_border(FormatBorder::Thin),
            integer: Format::new()
                .set_num_format("#,##0")
                .set_border(FormatBorder::Thin),
            percent: Format::new()
                .set_align(FormatAlign::Right)
                .set_border(FormatBorder::Thin),
            total_label: Format::new()
                .set_bold()
                .set_background_color(0xE2EFDA)
                .set_border(FormatBorder::Thin),
            total_integer: Format::new()
                .set_bold()
                .set_num_format("#,##0")
                .set_background_color(0xE2EFDA)
                .set_border(FormatBorder::Thin),
        }
    }
}

/// Shared cell formats of the workbook
struct ExcelFormats {
    header: Format,
    title: Format,
    text: Format,
    integer: Format,
    percent: Format,
    total_label: Format,
    total_integer: Format,
}

/// Where a data-sheet cell comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ColumnSource {
    Filed,
    Received,
    Channel,
    Department,
    Month,
    Observation,
    Indicator,
    Term,
    Provider,
    Extra(usize),
    /// Written empty: annotation columns, and input columns shadowed by an
    /// annotation of the same name
    Blank,
}

fn record_cell(record: &Record, source: ColumnSource) -> String {
    match source {
        ColumnSource::Filed => record
            .filed
            .map(|d| d.format(ISO_DATE).to_string())
            .unwrap_or_default(),
        ColumnSource::Received => record
            .received
            .map(|d| d.format(ISO_DATE).to_string())
            .unwrap_or_default(),
        ColumnSource::Channel => record.channel.clone(),
        ColumnSource::Department => record.department.clone(),
        ColumnSource::Month => record.month.clone(),
        ColumnSource::Observation => record.observation.clone(),
        ColumnSource::Indicator => record
            .indicator
            .map(|days| days.to_string())
            .unwrap_or_default(),
        ColumnSource::Term => record.term.map(|t| t.as_str().to_string()).unwrap_or_default(),
        ColumnSource::Provider => record.provider.clone(),
        ColumnSource::Extra(index) => record.extra.get(index).cloned().unwrap_or_default(),
        ColumnSource::Blank => String::new(),
    }
}

fn column_width(header: &str) -> f64 {
    match header {
        COL_FILED | COL_RECEIVED => 16.0,
        COL_CHANNEL => 16.0,
        COL_DEPARTMENT => 34.0,
        COL_MONTH => 10.0,
        COL_OBSERVATION => 28.0,
        COL_INDICATOR => 11.0,
        COL_TERM => 19.0,
        COL_PROVIDER => 24.0,
        _ => 18.0,
    }
}

/// Worksheet names for provider labels: truncated to the Excel limit and
/// disambiguated against each other and the `reserved` fixed-sheet names.
/// Comparison is case-insensitive, matching Excel's own rule.
fn sheet_names(labels: &[&str], reserved: &[&str]) -> Vec<String> {
    let mut taken: Vec<String> = reserved.iter().map(|r| (*r).to_string()).collect();
    let mut names = Vec::with_capacity(labels.len());

    for label in labels {
        let base = truncate_chars(label, MAX_SHEET_NAME_LEN);
        let mut candidate = base.clone();
        let mut n = 2u32;
        while taken.iter().any(|t| t.eq_ignore_ascii_case(&candidate)) {
            let suffix = format!("~{n}");
            candidate = format!(
                "{}{suffix}",
                truncate_chars(&base, MAX_SHEET_NAME_LEN - suffix.len())
            );
            n += 1;
        }
        taken.push(candidate.clone());
        names.push(candidate);
    }

    names
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Rows an embedded image spans at the default 20px row height
fn rows_for_image(height: u32) -> u32 {
    height / 20 + 1
}

const fn rgb([r, g, b]: [u8; 3]) -> u32 {
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Write the PNG to a scoped temp file and embed it. The file is removed
/// when the handle drops, on success and error paths alike.
fn embed_chart(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    image: &ChartImage,
) -> Result<(), ReportError> {
    let mut file = tempfile::Builder::new()
        .prefix("mailkpi-chart-")
        .suffix(".png")
        .tempfile()?;
    file.write_all(&image.bytes)?;
    file.flush()?;

    let embedded = Image::new(file.path()).map_err(|e| ReportError::Format(e.to_string()))?;
    sheet
        .insert_image(row, col, &embedded)
        .map_err(|e| ReportError::Format(e.to_string()))?;
    Ok(())
}
