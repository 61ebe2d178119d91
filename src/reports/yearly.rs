use chrono::Datelike;
use std::collections::HashMap;

use crate::dataset::OrderDataset;

/// One (year, category) group of the yearly sales summary
#[derive(Debug, Clone, PartialEq)]
pub struct YearCategorySummary {
    pub year: i32,
    pub category: String,
    /// Number of order items sold in this category that year
    pub total_sales: u64,
    /// Sum of `price` over those items
    pub total_revenue: f64,
}

/// Top-selling product categories per calendar year
///
/// Groups order items by (purchase year, category), counts sales and sums
/// revenue per group, then keeps the `per_year` best-selling categories of
/// each year. Rows come back ordered by year ascending, `total_sales`
/// descending; ties on `total_sales` break by category name ascending. A year
/// with fewer than `per_year` categories yields all of them.
pub fn top_categories_per_year(
    dataset: &OrderDataset,
    per_year: usize,
) -> Vec<YearCategorySummary> {
    let timestamps = dataset.purchase_timestamps();
    let prices = dataset.prices();

    let mut groups: HashMap<(i32, String), (u64, f64)> = HashMap::new();
    for (row, category) in dataset.categories().enumerate() {
        let year = timestamps[row].year();
        let entry = groups.entry((year, category.to_string())).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += prices[row];
    }

    let mut summary: Vec<YearCategorySummary> = groups
        .into_iter()
        .map(
            |((year, category), (total_sales, total_revenue))| YearCategorySummary {
                year,
                category,
                total_sales,
                total_revenue,
            },
        )
        .collect();

    summary.sort_by(|a, b| {
        a.year
            .cmp(&b.year)
            .then(b.total_sales.cmp(&a.total_sales))
            .then_with(|| a.category.cmp(&b.category))
    });

    // head(per_year) within each year
    let mut out = Vec::with_capacity(summary.len());
    let mut current_year = None;
    let mut kept = 0;
    for row in summary {
        if current_year != Some(row.year) {
            current_year = Some(row.year);
            kept = 0;
        }
        if kept < per_year {
            out.push(row);
            kept += 1;
        }
    }
    out
}
