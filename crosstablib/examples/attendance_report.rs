//! Pivot an attendance file and print both views of it.

use crosstablib::{load_records, Dimension, DimensionSelector, DimensionSet, Reducer};
use std::env;

fn main() {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "attendance.json".to_string());

    let records = load_records(&path).expect("Failed to load records");

    let dimensions = DimensionSet::new([
        Dimension::new("area", "Area"),
        Dimension::new("status", "Status"),
        Dimension::new("date", "Date"),
    ])
    .expect("Duplicate dimension");
    let mut selector =
        DimensionSelector::new(dimensions, "area", "status").expect("Invalid default axes");

    let table = selector.table(&records, &Reducer::Count);
    println!("{}", table.title.as_deref().unwrap_or_default());
    println!("{}", table.to_csv());
    println!();

    selector.swap();
    let tab = selector.crosstab(&records);
    println!("{} rows x {} columns after swapping", tab.row_values.len(), tab.col_values.len());
    println!("Grand total: {}", tab.grand_total);
}
