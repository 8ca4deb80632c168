//! # mailkpi-render
//!
//! Report rendering for the mailkpi pipeline: the multi-sheet Excel
//! workbook and the bitmap charts embedded in it.
//!
//! [`ReportBuilder`] turns a [`ReportData`](mailkpi_core::ReportData)
//! bundle into `.xlsx` bytes. [`BitmapChartRenderer`] rasterizes the
//! channel proportion and daily-volume charts as PNG; it is the default
//! chart renderer and can be swapped through
//! [`ReportBuilder::render_with_charts`].
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use mailkpi_core::{AlertSummary, ChannelCrossTab, DailyVolumeSeries, RecordSet, ReportData};
//! use mailkpi_render::ReportBuilder;
//!
//! let run_date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
//! let data = ReportData {
//!     table: RecordSet::default(),
//!     summaries: Vec::new(),
//!     cross_tab: ChannelCrossTab::default(),
//!     alerts: AlertSummary { cutoff: run_date.pred_opt().unwrap(), rows: Vec::new() },
//!     daily_volume: DailyVolumeSeries::default(),
//!     run_date,
//! };
//!
//! let bytes = ReportBuilder::new().render(&data)?;
//! assert_eq!(&bytes[0..2], b"PK");
//! # Ok::<(), mailkpi_core::ReportError>(())
//! ```

pub mod charts;
pub mod excel;

pub use charts::{BitmapChartRenderer, ChartStyle};
pub use excel::{ReportBuilder, MAX_SHEET_NAME_LEN};
