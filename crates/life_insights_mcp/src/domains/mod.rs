//! Insights computation, kept free of I/O.
//!
//! # Modules
//!
//! - [`daily`]: merge raw rows into one record per date
//! - [`demo`]: synthetic fallback series
//! - [`correlation`]: Pearson coefficients and mood-impact ranking
//! - [`balance`]: six-axis normalised radar projection
//! - [`experiment`]: sleep-threshold mood comparison
//! - [`report`]: everything above combined for one window
//! - [`resources`]: MCP resource descriptor

pub mod balance;
pub mod correlation;
pub mod daily;
pub mod demo;
pub mod experiment;
pub mod report;
pub mod resources;

pub use daily::{DayMetrics, SourceRows, aggregate_days};
pub use report::{DateWindow, InsightsReport, build_report};
