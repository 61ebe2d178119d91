use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

use crate::reports::{StateSummary, YearCategorySummary};

const CHART_SIZE: (u32, u32) = (1280, 640);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("drawing failed: {0}")]
    Draw(String),

    #[error("nothing to plot")]
    EmptyTable,
}

/// Bar chart of top-selling categories, one bar per (year, category) row
pub fn yearly_sales_chart(
    rows: &[YearCategorySummary],
    path: &Path,
) -> Result<(), RenderError> {
    if rows.is_empty() {
        return Err(RenderError::EmptyTable);
    }
    let labels: Vec<String> = rows
        .iter()
        .map(|r| format!("{} {}", r.year, r.category))
        .collect();
    let values: Vec<u64> = rows.iter().map(|r| r.total_sales).collect();
    draw_bars(
        path,
        "Top Products Sold Each Year",
        "Year / Category",
        "Total Sales",
        &labels,
        &values,
    )
}

/// Bar chart of order counts per state; `title` distinguishes the
/// most-orders and least-orders variants
pub fn state_orders_chart(
    rows: &[StateSummary],
    title: &str,
    path: &Path,
) -> Result<(), RenderError> {
    if rows.is_empty() {
        return Err(RenderError::EmptyTable);
    }
    let labels: Vec<String> = rows.iter().map(|r| r.state.clone()).collect();
    let values: Vec<u64> = rows.iter().map(|r| r.total_orders).collect();
    draw_bars(path, title, "State", "Number of Orders", &labels, &values)
}

fn draw_bars(
    path: &Path,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    labels: &[String],
    values: &[u64],
) -> Result<(), RenderError> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let max = values.iter().copied().max().unwrap_or(1).max(1);
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(12)
        .x_label_area_size(96)
        .y_label_area_size(64)
        .build_cartesian_2d((0..labels.len()).into_segmented(), 0u64..max + max / 10 + 1)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len().min(40))
        .x_label_formatter(&|pos| match pos {
            SegmentValue::CenterOf(i) if *i < labels.len() => labels[*i].clone(),
            _ => String::new(),
        })
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(values.iter().enumerate().map(|(i, &v)| {
            let style = Palette99::pick(i).filled();
            Rectangle::new(
                [(SegmentValue::Exact(i), 0), (SegmentValue::Exact(i + 1), v)],
                style,
            )
        }))
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}

fn draw_err<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Draw(err.to_string())
}
