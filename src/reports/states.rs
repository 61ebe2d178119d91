use std::collections::HashMap;

use crate::dataset::{DatasetError, OrderDataset};

/// Per-state order and revenue totals
#[derive(Debug, Clone, PartialEq)]
pub struct StateSummary {
    pub state: String,
    pub total_orders: u64,
    pub total_price: f64,
    pub total_freight: f64,
    /// `total_price + total_freight`
    pub total_revenue: f64,
}

/// States with the most and least orders
#[derive(Debug, Clone, PartialEq)]
pub struct StateRankings {
    /// First `take` states, ordered by `total_orders` descending
    pub top: Vec<StateSummary>,
    /// Last `take` states of the same ordering; overlaps `top` when fewer
    /// than `2 * take` distinct states exist
    pub bottom: Vec<StateSummary>,
}

/// Ranks states by order count
///
/// Groups rows by `customer_state`, counts orders and sums price and freight
/// per state, then sorts by `total_orders` descending (ties break by state
/// name ascending) and slices the head and tail of that ordering.
///
/// # Errors
/// [`DatasetError::MissingColumn`] if the dataset has no `customer_state`
/// column; no summary is computed in that case.
pub fn state_rankings(dataset: &OrderDataset, take: usize) -> Result<StateRankings, DatasetError> {
    let states = dataset.customer_states()?;
    let prices = dataset.prices();
    let freights = dataset.freight_values();

    let mut groups: HashMap<String, (u64, f64, f64)> = HashMap::new();
    for (row, state) in states.enumerate() {
        let entry = groups.entry(state.to_string()).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += prices[row];
        entry.2 += freights[row];
    }

    let mut ranked: Vec<StateSummary> = groups
        .into_iter()
        .map(|(state, (total_orders, total_price, total_freight))| StateSummary {
            state,
            total_orders,
            total_price,
            total_freight,
            total_revenue: total_price + total_freight,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.total_orders
            .cmp(&a.total_orders)
            .then_with(|| a.state.cmp(&b.state))
    });

    let top = ranked.iter().take(take).cloned().collect();
    let bottom = ranked
        .iter()
        .skip(ranked.len().saturating_sub(take))
        .cloned()
        .collect();

    Ok(StateRankings { top, bottom })
}
