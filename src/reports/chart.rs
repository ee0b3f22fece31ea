// src/reports/chart.rs
//! Chart-ready series built from grouped counts

use serde::Serialize;

use super::aggregation::GroupedCounts;
use crate::models::LoanActivityReport;

pub const USER_PALETTE: &[&str] = &["#1e90ff", "#28a745", "#ff8c00", "#ff4444"];
pub const LAB_PALETTE: &[&str] = &["#32cd32", "#FFD700", "#dc143c", "#87ceeb"];
pub const LOAN_PALETTE: &[&str] = &["#1e90ff", "#28a745", "#ff4444"];
pub const RESERVATION_PALETTE: &[&str] = &["#ff8c00", "#32cd32", "#dc143c"];
pub const EQUIPMENT_PALETTE: &[&str] = &["#1e90ff", "#32cd32", "#ff8c00", "#dc143c", "#87ceeb", "#FFD700"];

/// Color of the trailing segment for values outside the known categories.
pub const UNKNOWN_COLOR: &str = "#808080";
pub const LEGEND_FONT_COLOR: &str = "#fff";
pub const LEGEND_FONT_SIZE: u32 = 14;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSegment {
    pub name: String,
    pub count: usize,
    pub color: String,
    pub legend_font_color: String,
    pub legend_font_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<usize>,
    pub segments: Vec<ChartSegment>,
}

impl ChartSeries {
    pub fn total(&self) -> usize {
        self.values.iter().sum()
    }
}

/// Uppercases the first character; the rest is kept as is.
pub fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One segment per known bucket, colored by position in `palette` (cycled).
///
/// The unknown bucket is appended as a final gray segment, and only when it
/// holds something.
pub fn build_chart_series(counts: &GroupedCounts, palette: &[&str]) -> ChartSeries {
    let palette = if palette.is_empty() { EQUIPMENT_PALETTE } else { palette };
    let mut series = ChartSeries::default();

    let mut push = |name: String, count: usize, color: &str| {
        series.labels.push(name.clone());
        series.values.push(count);
        series.segments.push(ChartSegment {
            name,
            count,
            color: color.to_string(),
            legend_font_color: LEGEND_FONT_COLOR.to_string(),
            legend_font_size: LEGEND_FONT_SIZE,
        });
    };

    for (index, bucket) in counts.buckets().iter().enumerate() {
        push(capitalize(&bucket.label), bucket.count, palette[index % palette.len()]);
    }
    if counts.unknown() > 0 {
        push("Unknown".to_string(), counts.unknown(), UNKNOWN_COLOR);
    }

    series
}

// ==================== BAR CHARTS ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarDataset {
    pub label: String,
    pub color: String,
    pub values: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BarSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<BarDataset>,
}

/// Loans and returns per date as two aligned datasets.
///
/// Ragged payloads are padded with zeros up to the number of dates.
pub fn loan_activity_series(report: &LoanActivityReport) -> BarSeries {
    let len = report.dates.len();
    let aligned = |values: &[i64]| -> Vec<i64> {
        let mut out: Vec<i64> = values.iter().copied().take(len).collect();
        out.resize(len, 0);
        out
    };

    BarSeries {
        labels: report.dates.clone(),
        datasets: vec![
            BarDataset {
                label: "Loans".to_string(),
                color: LOAN_PALETTE[0].to_string(),
                values: aligned(&report.loans),
            },
            BarDataset {
                label: "Returns".to_string(),
                color: LOAN_PALETTE[1].to_string(),
                values: aligned(&report.returns),
            },
        ],
    }
}
