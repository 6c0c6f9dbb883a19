use serde::Serialize;

use crate::analytics::Analytics;
use crate::transaction::Category;

/// Pie palette, indexed by [`Category::index`].
pub const PIE_COLORS: [&str; 4] = ["#4CAF50", "#FF5252", "#4ECDC4", "#45B7D1"];

pub const EMPTY_MESSAGE: &str = "No data available";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCard {
    pub category: Category,
    pub name: &'static str,
    pub amount: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: &'static str,
    pub value: u64,
    /// Percentage of all records, one decimal.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountBar {
    pub name: &'static str,
    pub amount: f64,
    pub percentage: f64,
    pub count: u64,
    pub avg_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// `YYYY-MM-DD`
    pub date: String,
    pub received: f64,
    pub transferred: f64,
    pub recharge: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineColors {
    pub received: &'static str,
    pub transferred: &'static str,
    pub recharge: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartColors {
    pub pie: [&'static str; 4],
    pub line: LineColors,
}

/// Everything the analytics page draws, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsView {
    pub empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub total_amount: f64,
    pub summary: Vec<SummaryCard>,
    pub pie: Vec<PieSlice>,
    pub bar: Vec<AmountBar>,
    pub trend: Vec<TrendPoint>,
    pub colors: ChartColors,
}

pub fn render(analytics: &Analytics) -> AnalyticsView {
    let summary = Category::ALL
        .iter()
        .map(|c| SummaryCard {
            category: *c,
            name: c.display_name(),
            amount: analytics.total(*c).amount,
            color: PIE_COLORS[c.index()],
        })
        .collect();

    let mut pie: Vec<PieSlice> = Category::ALL
        .iter()
        .map(|c| PieSlice {
            name: c.display_name(),
            value: analytics.count(*c),
            share: 0.0,
        })
        .collect();
    let record_count: u64 = pie.iter().map(|s| s.value).sum();
    for slice in &mut pie {
        slice.share = share_of(slice.value, record_count);
    }

    let bar = Category::ALL
        .iter()
        .map(|c| {
            let total = analytics.total(*c);
            AmountBar {
                name: c.display_name(),
                amount: total.amount,
                percentage: total.percentage,
                count: total.count,
                avg_amount: total.avg_amount,
            }
        })
        .collect();

    let trend = analytics
        .daily_series
        .iter()
        .map(|p| TrendPoint {
            date: p.date.format("%Y-%m-%d").to_string(),
            received: p.received,
            transferred: p.transferred,
            recharge: p.recharge,
        })
        .collect();

    let empty = analytics.is_empty();
    AnalyticsView {
        empty,
        message: empty.then_some(EMPTY_MESSAGE),
        total_amount: analytics.grand_total,
        summary,
        pie,
        bar,
        trend,
        colors: ChartColors {
            pie: PIE_COLORS,
            line: LineColors {
                received: PIE_COLORS[Category::Received.index()],
                transferred: PIE_COLORS[Category::Transferred.index()],
                recharge: PIE_COLORS[Category::Recharge.index()],
            },
        },
    }
}

/// Percentage with one decimal. `0.0` for an empty pie.
fn share_of(value: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (value as f64 / total as f64 * 1000.0).round() / 10.0
}
