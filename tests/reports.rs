use order_reports::dataset::{DatasetError, OrderDataset};
use order_reports::reports::{state_rankings, top_categories_per_year, TOP_N};

fn dataset_from_csv(csv: &str) -> OrderDataset {
    use std::io::Write;
    use tempfile::NamedTempFile;

    let mut tmp = NamedTempFile::new().unwrap();
    write!(tmp, "{}", csv).unwrap();
    OrderDataset::load(tmp.path()).unwrap()
}

const HEADER: &str = "order_id,order_item_id,order_purchase_timestamp,product_category_name_english,price,customer_state,freight_value\n";

fn order_row(i: usize, year: i32, category: &str, state: &str) -> String {
    format!("o{i},1,{year}-06-15 12:00:00,{category},10.0,{state},2.0\n")
}

#[test]
fn test_top_categories_scenario_two_years() {
    // 2017: A=10, B=7, C=3; 2018: A=5
    let mut csv = String::from(HEADER);
    let mut i = 0;
    for (year, category, n) in [(2017, "A", 10), (2017, "B", 7), (2017, "C", 3), (2018, "A", 5)] {
        for _ in 0..n {
            csv.push_str(&order_row(i, year, category, "SP"));
            i += 1;
        }
    }
    let dataset = dataset_from_csv(&csv);

    let rows = top_categories_per_year(&dataset, TOP_N);
    let keys: Vec<(i32, &str, u64)> = rows
        .iter()
        .map(|r| (r.year, r.category.as_str(), r.total_sales))
        .collect();

    // 2017 has fewer than 5 categories so all come back, best sellers first
    assert_eq!(
        keys,
        vec![
            (2017, "A", 10),
            (2017, "B", 7),
            (2017, "C", 3),
            (2018, "A", 5),
        ]
    );
}

#[test]
fn test_yearly_aggregates_match_input() {
    let mut csv = String::from(HEADER);
    for i in 0..4 {
        csv.push_str(&order_row(i, 2017, "toys", "SP"));
    }
    let dataset = dataset_from_csv(&csv);

    let rows = top_categories_per_year(&dataset, TOP_N);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total_sales, 4);
    assert_eq!(rows[0].total_revenue, 40.0);
}

#[test]
fn test_sixth_category_is_dropped() {
    let mut csv = String::from(HEADER);
    let mut i = 0;
    for (category, n) in [("a", 7), ("b", 6), ("c", 5), ("d", 4), ("e", 3), ("f", 2)] {
        for _ in 0..n {
            csv.push_str(&order_row(i, 2017, category, "SP"));
            i += 1;
        }
    }
    let dataset = dataset_from_csv(&csv);

    let rows = top_categories_per_year(&dataset, TOP_N);
    assert_eq!(rows.len(), 5);
    let dropped_sales = 2;
    assert!(rows.iter().all(|r| r.category != "f"));
    assert!(rows.iter().all(|r| r.total_sales >= dropped_sales));
}

#[test]
fn test_state_scenario_three_states() {
    let mut csv = String::from(HEADER);
    let mut i = 0;
    for (state, n) in [("SP", 4), ("RJ", 2), ("MG", 1)] {
        for _ in 0..n {
            csv.push_str(&order_row(i, 2017, "toys", state));
            i += 1;
        }
    }
    let dataset = dataset_from_csv(&csv);

    let rankings = state_rankings(&dataset, TOP_N).unwrap();
    let top: Vec<&str> = rankings.top.iter().map(|s| s.state.as_str()).collect();
    let bottom: Vec<&str> = rankings.bottom.iter().map(|s| s.state.as_str()).collect();

    // With only 3 distinct states, both slices cover all of them
    assert_eq!(top, vec!["SP", "RJ", "MG"]);
    assert_eq!(bottom, top);

    // Top is non-increasing; bottom read in reverse is non-decreasing
    let top_orders: Vec<u64> = rankings.top.iter().map(|s| s.total_orders).collect();
    assert!(top_orders.windows(2).all(|w| w[0] >= w[1]));
    let reversed: Vec<u64> = rankings.bottom.iter().rev().map(|s| s.total_orders).collect();
    assert!(reversed.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_state_revenue_identity() {
    let mut csv = String::from(HEADER);
    csv.push_str("o0,1,2017-06-15 12:00:00,toys,10.5,SP,2.25\n");
    csv.push_str("o1,1,2017-06-15 12:00:00,toys,20.25,SP,1.5\n");
    csv.push_str("o2,1,2017-06-15 12:00:00,toys,7.0,RJ,0.5\n");
    let dataset = dataset_from_csv(&csv);

    let rankings = state_rankings(&dataset, TOP_N).unwrap();
    for state in &rankings.top {
        assert_eq!(state.total_revenue, state.total_price + state.total_freight);
    }

    let sp = rankings.top.iter().find(|s| s.state == "SP").unwrap();
    assert_eq!(sp.total_orders, 2);
    assert_eq!(sp.total_price, 30.75);
    assert_eq!(sp.total_freight, 3.75);
    assert_eq!(sp.total_revenue, 34.5);
}

#[test]
fn test_missing_state_column_reported_not_computed() {
    let csv = "order_id,order_item_id,order_purchase_timestamp,product_category_name_english,price,freight_value\n\
               o0,1,2017-06-15 12:00:00,toys,10.0,2.0\n";
    let dataset = dataset_from_csv(csv);

    // The yearly report still works on the same dataset
    let rows = top_categories_per_year(&dataset, TOP_N);
    assert_eq!(rows.len(), 1);

    let err = state_rankings(&dataset, TOP_N).unwrap_err();
    assert!(matches!(err, DatasetError::MissingColumn(col) if col == "customer_state"));
}
