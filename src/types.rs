use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use tabled::Tabled;

/// Column names the pipeline reads from the input header.
pub const COL_ORDER_DATE: &str = "Order Date";
pub const COL_SHIP_DATE: &str = "Ship Date";
pub const COL_REGION: &str = "Region";
pub const COL_CATEGORY: &str = "Category";
pub const COL_SUB_CATEGORY: &str = "Sub-Category";
pub const COL_SALES: &str = "Sales";
pub const COL_PROFIT: &str = "Profit";

/// Year + month bucket. Field order makes the derived `Ord` chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Self {
        Month { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Month {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A row that survived cleaning, typed.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub order_date: NaiveDate,
    pub ship_date: NaiveDate,
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub sales: f64,
    pub profit: f64,
    pub month: Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub retained_rows: usize,
    pub dropped_rows: usize,
}

/// Ordered `(key, value)` pairs produced by a single groupby.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateView<K> {
    pub entries: Vec<(K, f64)>,
}

impl<K> AggregateView<K> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, v)| *v)
    }

    pub fn first(&self) -> Option<&(K, f64)> {
        self.entries.first()
    }
}

impl<K: PartialEq> AggregateView<K> {
    pub fn get(&self, key: &K) -> Option<f64> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }
}

/// Sparse region x category table of summed sales.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PivotTable {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub cells: BTreeMap<(String, String), f64>,
}

impl PivotTable {
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        self.cells
            .get(&(row.to_string(), column.to_string()))
            .copied()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.cells.values().copied().reduce(f64::max)
    }

    pub fn min_value(&self) -> Option<f64> {
        self.cells.values().copied().reduce(f64::min)
    }
}

impl Serialize for PivotTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // row -> { column -> value }, absent combinations omitted
        let mut nested: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
        for ((row, column), value) in &self.cells {
            nested
                .entry(row.as_str())
                .or_default()
                .insert(column.as_str(), *value);
        }
        nested.serialize(serializer)
    }
}

/// Every view the report needs, all computed from one cleaned table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub category_sales: AggregateView<String>,
    pub region_profit: AggregateView<String>,
    pub monthly_sales: AggregateView<Month>,
    pub subcategory_profit: AggregateView<String>,
    pub region_category_sales: PivotTable,
}

#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub load: LoadReport,
    pub analysis: &'a Analysis,
}

/// Console preview row shared by every one-dimensional view.
#[derive(Debug, Clone, Tabled)]
pub struct PreviewRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Total")]
    pub total: String,
}
