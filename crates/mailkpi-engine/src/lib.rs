//! # mailkpi-engine
//!
//! Indicator, classification and aggregation engine for the mailkpi
//! correspondence pipeline.
//!
//! This crate provides:
//! - `ColombiaCalendar`: the deployed business-calendar jurisdiction
//! - `IndicatorEngine`: business-day elapsed time and on-time/late terms
//! - `Classifier`: department → provider resolution
//! - `Aggregator`: monthly summaries, channel cross-tab, alert roll-up
//! - `Pipeline`: the linear run from loaded records to report inputs
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use mailkpi_core::Record;
//! use mailkpi_engine::{ColombiaCalendar, Pipeline};
//!
//! let records = vec![Record::new()
//!     .filed(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
//!     .channel("Courier")
//!     .department("4 GRUPO CENTRO DE EXCELENCIA")];
//!
//! let pipeline = Pipeline::new().run_date(NaiveDate::from_ymd_opt(2024, 5, 7).unwrap());
//! let output = pipeline.run(records.into(), &ColombiaCalendar);
//! assert_eq!(output.table.records[0].provider, "UTMDL");
//! ```

pub mod aggregate;
pub mod calendar;
pub mod classify;
pub mod indicator;
pub mod pipeline;

pub use aggregate::Aggregator;
pub use calendar::{ColombiaCalendar, StaticCalendar};
pub use classify::Classifier;
pub use indicator::{business_days_in_range, IndicatorEngine};
pub use mailkpi_core::ReportData;
pub use pipeline::{fill_received_dates, Pipeline};
