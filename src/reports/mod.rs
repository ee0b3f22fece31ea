// src/reports/mod.rs
//! Report aggregation engine
//!
//! Fetched collections are reduced to grouped counts and rankings, turned
//! into chart series, and rendered as tabular documents for export.

pub mod aggregation;
pub mod chart;
pub mod dashboard;
pub mod document;
pub mod export;
pub mod personal;

pub use aggregation::{group_by_field, top_n, GroupedCounts, RankedEquipment};
pub use chart::{build_chart_series, ChartSegment, ChartSeries};
pub use dashboard::{Dashboard, DashboardReport, DashboardSnapshot};
pub use document::{render_tabular_document, Column, Section, TabularDocument};
pub use export::{export_document, DocumentFormat, DocumentSink, FileSink};
pub use personal::{PersonalLabReport, PersonalLoanReport};
