use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use order_reports::chart;
use order_reports::dataset::{DatasetError, OrderDataset};
use order_reports::reports::{self, ReportPage, StateSummary, YearCategorySummary, TOP_N};

/// Order reporting dashboard: pick a page, get a summary table and a bar chart
#[derive(Debug, Parser)]
#[command(name = "order-reports", version, about)]
struct Cli {
    /// CSV file with the pre-aggregated order data
    #[arg(long, default_value = "main_data.csv")]
    data: PathBuf,

    /// Which report page to render
    #[arg(long, value_enum, default_value = "yearly-top-categories")]
    page: ReportPage,

    /// Directory for the rendered chart images
    #[arg(long, default_value = "charts")]
    out_dir: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let dataset = OrderDataset::load(&cli.data)
        .with_context(|| format!("loading order data from {}", cli.data.display()))?;
    info!(rows = dataset.row_count(), "order data loaded");

    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating output directory {}", cli.out_dir.display()))?;

    println!("{}\n", cli.page.title());

    match cli.page {
        ReportPage::YearlyTopCategories => {
            let rows = reports::top_categories_per_year(&dataset, TOP_N);
            print_yearly_table(&rows);

            let out = cli.out_dir.join("top_products_per_year.png");
            chart::yearly_sales_chart(&rows, &out).context("rendering yearly sales chart")?;
            info!(chart = %out.display(), "chart written");
        }
        ReportPage::StateRankings => match reports::state_rankings(&dataset, TOP_N) {
            Ok(rankings) => {
                print_state_table("Top 5 States with the Most Orders", &rankings.top);
                print_state_table("Top 5 States with the Least Orders", &rankings.bottom);

                let most = cli.out_dir.join("states_most_orders.png");
                chart::state_orders_chart(
                    &rankings.top,
                    "Top 5 States with the Most Orders",
                    &most,
                )
                .context("rendering most-orders chart")?;

                let least = cli.out_dir.join("states_least_orders.png");
                chart::state_orders_chart(
                    &rankings.bottom,
                    "Top 5 States with the Least Orders",
                    &least,
                )
                .context("rendering least-orders chart")?;

                info!(
                    most = %most.display(),
                    least = %least.display(),
                    "charts written"
                );
            }
            Err(DatasetError::MissingColumn(column)) => {
                // Same behaviour as the dashboard: tell the user, skip the page
                println!("Column '{column}' not found.");
                warn!(%column, "state rankings skipped");
            }
            Err(err) => return Err(err.into()),
        },
    }

    Ok(())
}

fn print_yearly_table(rows: &[YearCategorySummary]) {
    println!(
        "{:<6} {:<34} {:>12} {:>14}",
        "Year", "Category", "Total Sales", "Total Revenue"
    );
    println!("{}", "-".repeat(70));
    for row in rows {
        println!(
            "{:<6} {:<34} {:>12} {:>14.2}",
            row.year, row.category, row.total_sales, row.total_revenue
        );
    }
}

fn print_state_table(heading: &str, rows: &[StateSummary]) {
    println!("\n{heading}");
    println!(
        "{:<8} {:>10} {:>14} {:>14} {:>14}",
        "State", "Orders", "Price", "Freight", "Revenue"
    );
    println!("{}", "-".repeat(64));
    for row in rows {
        println!(
            "{:<8} {:>10} {:>14.2} {:>14.2} {:>14.2}",
            row.state, row.total_orders, row.total_price, row.total_freight, row.total_revenue
        );
    }
}
