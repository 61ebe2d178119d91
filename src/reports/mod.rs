use clap::ValueEnum;

pub mod states;
pub mod yearly;

pub use states::{state_rankings, StateRankings, StateSummary};
pub use yearly::{top_categories_per_year, YearCategorySummary};

/// How many rows each ranking keeps per group
pub const TOP_N: usize = 5;

/// The two report pages the dashboard can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportPage {
    /// Top product categories sold each year
    YearlyTopCategories,
    /// States with the most and least orders
    StateRankings,
}

impl ReportPage {
    pub fn title(&self) -> &'static str {
        match self {
            ReportPage::YearlyTopCategories => "Top Products Sold Each Year",
            ReportPage::StateRankings => "States with the Most and Least Orders",
        }
    }
}
