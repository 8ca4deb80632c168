//! Command implementations for the mailkpi CLI
//!
//! ## Exit Code Contract
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success |
//! | 1 | Failure: unreadable input, missing expected columns, bad format flag, or unwritable output |
//!
//! Every failure path returns an `anyhow` error with file context; the
//! error chain is printed to stderr by `main`. A parseable export never
//! fails downstream: the pipeline itself is total and an empty courier
//! partition degrades to empty report sections.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use mailkpi_core::{record_years, ReportData};
use mailkpi_engine::{ColombiaCalendar, Pipeline};
use mailkpi_render::ReportBuilder;
use std::path::Path;
use tracing::info;

/// Parse and validate an export without producing output
pub fn check(file: &Path) -> Result<()> {
    let table = load(file)?;
    let years = record_years(&table.records);

    println!("{}: OK", file.display());
    println!("  records:       {}", table.len());
    println!("  extra columns: {}", table.extra_columns.len());
    if let (Some(first), Some(last)) = (years.first(), years.last()) {
        println!("  years:         {first}..={last}");
    }
    Ok(())
}

/// Run the full pipeline and write the workbook
pub fn report(
    file: &Path,
    output: &Path,
    run_date: Option<NaiveDate>,
    use_formulas: bool,
    include_charts: bool,
) -> Result<()> {
    let run_date = resolve_run_date(run_date);
    let data = run_pipeline(file, run_date)?;

    let builder = ReportBuilder::new()
        .use_formulas(use_formulas)
        .include_charts(include_charts);
    let bytes = builder
        .render(&data)
        .context("failed to render the workbook")?;
    std::fs::write(output, &bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "Wrote {}: {} records, {} courier providers",
        output.display(),
        data.table.len(),
        data.daily_volume.providers.len()
    );
    Ok(())
}

/// Print the monthly indicator summary as text or JSON
pub fn summary(file: &Path, format: &str, run_date: Option<NaiveDate>) -> Result<()> {
    let run_date = resolve_run_date(run_date);
    let data = run_pipeline(file, run_date)?;

    match format {
        "text" => print_text_summary(&data),
        "json" => {
            let json = serde_json::to_string_pretty(&data.summaries)
                .context("failed to serialize the summary")?;
            println!("{json}");
        }
        other => bail!("unknown format: {other} (expected text or json)"),
    }
    Ok(())
}

fn load(file: &Path) -> Result<mailkpi_core::RecordSet> {
    let table = mailkpi_parser::load_file(file)
        .with_context(|| format!("failed to load {}", file.display()))?;
    info!(records = table.len(), "loaded export");
    Ok(table)
}

fn run_pipeline(file: &Path, run_date: NaiveDate) -> Result<ReportData> {
    let table = load(file)?;
    let data = Pipeline::new()
        .run_date(run_date)
        .run(table, &ColombiaCalendar);
    info!(
        records = data.table.len(),
        run_date = %run_date,
        "pipeline complete"
    );
    Ok(data)
}

/// An explicit run date wins over today
fn resolve_run_date(run_date: Option<NaiveDate>) -> NaiveDate {
    run_date.unwrap_or_else(|| chrono::Local::now().date_naive())
}

fn print_text_summary(data: &ReportData) {
    if data.summaries.is_empty() {
        println!("no courier records for the configured providers");
        return;
    }

    for block in &data.summaries {
        println!("INDICADOR {}", block.provider);
        println!(
            "  {:<14} {:>8} {:>16} {:>11} {:>8} {:>10}",
            "MES", "UNIVERSO", "FUERA DE TERM.", "EXCLUSIONES", "TERMINOS", "PORCENTAJE"
        );
        for row in &block.rows {
            println!(
                "  {:<14} {:>8} {:>16} {:>11} {:>8} {:>10}",
                row.month, row.universe, row.late, row.exclusions, row.on_time, row.on_time_pct
            );
        }
        println!();
    }
}
