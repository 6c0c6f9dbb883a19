//! Reduction of a transaction feed into chart-ready analytics.
//!
//! [`aggregate`] is pure: the same records always produce the same
//! [`Analytics`], and nothing here touches the network or the clock.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::transaction::{Category, TransactionRecord};

/// Summed amount and derived figures for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub amount: f64,
    pub count: u64,
    /// Share of the grand total, 0-100 with one decimal. `0.0` when the grand total is zero.
    pub percentage: f64,
    /// Mean amount with two decimals. `None` when the category is empty.
    pub avg_amount: Option<f64>,
}

impl CategoryTotal {
    fn empty() -> Self {
        Self {
            amount: 0.0,
            count: 0,
            percentage: 0.0,
            avg_amount: None,
        }
    }
}

/// Amounts for one calendar date. Cashback is not tracked per day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeriesPoint {
    pub date: NaiveDate,
    pub received: f64,
    pub transferred: f64,
    pub recharge: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct DailyBucket {
    received: f64,
    transferred: f64,
    recharge: f64,
}

impl DailyBucket {
    fn add(&mut self, category: Category, amount: f64) {
        match category {
            Category::Received => self.received += amount,
            Category::Transferred => self.transferred += amount,
            Category::Recharge => self.recharge += amount,
            Category::Cashback => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analytics {
    /// Always holds all four categories.
    pub category_counts: BTreeMap<Category, u64>,
    /// Always holds all four categories.
    pub category_totals: BTreeMap<Category, CategoryTotal>,
    /// Ascending by date.
    pub daily_series: Vec<DailySeriesPoint>,
    pub grand_total: f64,
    pub record_count: usize,
}

impl Analytics {
    pub fn total(&self, category: Category) -> &CategoryTotal {
        &self.category_totals[&category]
    }

    pub fn count(&self, category: Category) -> u64 {
        self.category_counts[&category]
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

pub fn aggregate(records: &[TransactionRecord]) -> Analytics {
    let mut totals: [CategoryTotal; 4] = std::array::from_fn(|_| CategoryTotal::empty());
    let mut days: BTreeMap<NaiveDate, DailyBucket> = BTreeMap::new();
    let mut grand_total = 0.0;

    for record in records {
        let category = record.category();
        let entry = &mut totals[category.index()];
        entry.count += 1;
        entry.amount += record.amount;
        grand_total += record.amount;

        if category != Category::Cashback {
            days.entry(record.date())
                .or_default()
                .add(category, record.amount);
        }
    }

    for entry in totals.iter_mut() {
        entry.percentage = if grand_total == 0.0 {
            0.0
        } else {
            round_to(entry.amount / grand_total * 100.0, 1)
        };
        entry.avg_amount = if entry.count == 0 {
            None
        } else {
            Some(round_to(entry.amount / entry.count as f64, 2))
        };
    }

    let category_totals: BTreeMap<Category, CategoryTotal> =
        Category::ALL.into_iter().zip(totals).collect();
    let category_counts = category_totals.iter().map(|(c, t)| (*c, t.count)).collect();
    let daily_series = days
        .into_iter()
        .map(|(date, bucket)| DailySeriesPoint {
            date,
            received: bucket.received,
            transferred: bucket.transferred,
            recharge: bucket.recharge,
        })
        .collect();

    Analytics {
        category_counts,
        category_totals,
        daily_series,
        grand_total,
        record_count: records.len(),
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
