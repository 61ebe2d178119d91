//! # order-reports
//!
//! `order-reports` is a columnar reporting tool over a pre-aggregated
//! e-commerce order dataset. It supports:
//!
//! - Memory-mapped CSV loading (zero-copy string columns)
//! - Parallel chunked parsing with Rayon
//! - Yearly top-category rankings (sales count and revenue per category)
//! - Per-state order and revenue rankings (most and least orders)
//! - Bar chart rendering with `plotters`
//!
//! # Example
//!
//! ```no_run
//! use order_reports::dataset::OrderDataset;
//! use order_reports::reports::{self, TOP_N};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dataset = OrderDataset::load("main_data.csv".as_ref())?;
//!
//!     let top = reports::top_categories_per_year(&dataset, TOP_N);
//!     for row in &top {
//!         println!("{} {}: {} sales", row.year, row.category, row.total_sales);
//!     }
//!
//!     let rankings = reports::state_rankings(&dataset, TOP_N)?;
//!     for row in &rankings.top {
//!         println!("{}: {} orders", row.state, row.total_orders);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod chart;
pub mod dataset;
pub mod reports;
