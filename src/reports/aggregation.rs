// src/reports/aggregation.rs
//! Grouped counts and rankings over fetched collections

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Equipment, EquipmentCategory, Loan, Record};

/// Label of the bucket that collects values outside the known categories.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Name shown for a ranked equipment id that is missing from the inventory.
pub const UNKNOWN_EQUIPMENT_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
}

/// Counts per known category, in the order the categories were given.
///
/// Every known category is present even with a zero count. Values that are
/// absent or not in the known set go to a separate unknown counter instead of
/// being dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupedCounts {
    buckets: Vec<Bucket>,
    unknown: usize,
}

impl GroupedCounts {
    pub fn with_categories<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut buckets: Vec<Bucket> = Vec::new();
        for label in categories {
            let label = label.into();
            if !buckets.iter().any(|b| b.label == label) {
                buckets.push(Bucket { label, count: 0 });
            }
        }
        Self { buckets, unknown: 0 }
    }

    /// Counts one value. Returns false when it landed in the unknown bucket.
    pub fn record(&mut self, value: Option<&str>) -> bool {
        match value.and_then(|v| self.buckets.iter_mut().find(|b| b.label == v)) {
            Some(bucket) => {
                bucket.count += 1;
                true
            }
            None => {
                self.unknown += 1;
                false
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.buckets.iter().find(|b| b.label == label).map(|b| b.count)
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn unknown(&self) -> usize {
        self.unknown
    }

    pub fn known_total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }

    pub fn total(&self) -> usize {
        self.known_total() + self.unknown
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Groups `values` over `known` and logs what fell outside it.
pub fn group_values<I>(values: I, known: &[&str], field: &str) -> GroupedCounts
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut counts = GroupedCounts::with_categories(known.iter().copied());
    let mut unrecognized: BTreeSet<String> = BTreeSet::new();

    for value in values {
        if !counts.record(value.as_deref()) {
            unrecognized.insert(value.unwrap_or_else(|| "<missing>".to_string()));
        }
    }

    if counts.unknown() > 0 {
        tracing::warn!(
            field,
            count = counts.unknown(),
            values = ?unrecognized,
            "values outside the known categories counted as {}",
            UNKNOWN_LABEL
        );
    }

    counts
}

/// Counts `records` by the value of `field` over a closed set of categories.
pub fn group_by_field<R: Record>(records: &[R], field: &str, known: &[&str]) -> GroupedCounts {
    group_values(records.iter().map(|r| r.field(field)), known, field)
}

/// Equipment per category name; the known set is the fetched category list.
pub fn equipment_by_category(equipment: &[Equipment], categories: &[EquipmentCategory]) -> GroupedCounts {
    let names: BTreeMap<i64, &str> = categories.iter().map(|c| (c.id, c.name.as_str())).collect();
    let known: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();

    let values = equipment
        .iter()
        .map(|eq| eq.category_id.and_then(|id| names.get(&id)).map(|n| n.to_string()));
    group_values(values, &known, "categoria_id")
}

// ==================== RANKINGS ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEquipment {
    pub id: i64,
    pub name: String,
    pub count: usize,
}

/// Equipment ranked by loan count, descending; ties go to the lower id.
pub fn top_n(loans: &[Loan], equipment: &[Equipment], n: usize) -> Vec<RankedEquipment> {
    let mut loan_counts: BTreeMap<i64, usize> = BTreeMap::new();
    for id in loans.iter().filter_map(|l| l.equipment_id) {
        *loan_counts.entry(id).or_insert(0) += 1;
    }

    let mut ranked: Vec<(i64, usize)> = loan_counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .take(n)
        .map(|(id, count)| RankedEquipment {
            id,
            name: equipment
                .iter()
                .find(|e| e.id == id)
                .map(|e| e.name.clone())
                .unwrap_or_else(|| UNKNOWN_EQUIPMENT_NAME.to_string()),
            count,
        })
        .collect()
}
