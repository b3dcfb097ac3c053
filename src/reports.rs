use crate::types::{AggregateView, Analysis, Month, PivotTable, Record};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Group `data` by `key`, summing `value` per group in input order.
/// Groups come out in key order, as a sorted groupby would produce them.
fn group_sum<K, FK, FV>(data: &[Record], key: FK, value: FV) -> Vec<(K, f64)>
where
    K: Ord,
    FK: Fn(&Record) -> K,
    FV: Fn(&Record) -> f64,
{
    let mut map: BTreeMap<K, f64> = BTreeMap::new();
    for r in data {
        *map.entry(key(r)).or_insert(0.0) += value(r);
    }
    map.into_iter().collect()
}

/// Stable sort by value; ties keep key order.
fn sort_by_value<K>(mut entries: Vec<(K, f64)>, order: SortOrder) -> Vec<(K, f64)> {
    entries.sort_by(|a, b| {
        let cmp = a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal);
        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
    entries
}

pub fn category_sales(data: &[Record]) -> AggregateView<String> {
    let grouped = group_sum(data, |r| r.category.clone(), |r| r.sales);
    AggregateView {
        entries: sort_by_value(grouped, SortOrder::Descending),
    }
}

pub fn region_profit(data: &[Record]) -> AggregateView<String> {
    let grouped = group_sum(data, |r| r.region.clone(), |r| r.profit);
    AggregateView {
        entries: sort_by_value(grouped, SortOrder::Descending),
    }
}

/// Chronological; `Month` orders by (year, month).
pub fn monthly_sales(data: &[Record]) -> AggregateView<Month> {
    AggregateView {
        entries: group_sum(data, |r| r.month, |r| r.sales),
    }
}

pub fn subcategory_profit(data: &[Record]) -> AggregateView<String> {
    let grouped = group_sum(data, |r| r.sub_category.clone(), |r| r.profit);
    AggregateView {
        entries: sort_by_value(grouped, SortOrder::Ascending),
    }
}

/// Sales summed by (region, category). Combinations with no rows are absent.
pub fn region_category_pivot(data: &[Record]) -> PivotTable {
    let cells: BTreeMap<(String, String), f64> = group_sum(
        data,
        |r| (r.region.clone(), r.category.clone()),
        |r| r.sales,
    )
    .into_iter()
    .collect();

    let mut rows: Vec<String> = cells.keys().map(|(row, _)| row.clone()).collect();
    rows.dedup();
    let mut columns: Vec<String> = cells.keys().map(|(_, col)| col.clone()).collect();
    columns.sort();
    columns.dedup();

    PivotTable {
        rows,
        columns,
        cells,
    }
}

pub fn analyze(data: &[Record]) -> Analysis {
    let analysis = Analysis {
        category_sales: category_sales(data),
        region_profit: region_profit(data),
        monthly_sales: monthly_sales(data),
        subcategory_profit: subcategory_profit(data),
        region_category_sales: region_category_pivot(data),
    };
    log::debug!(
        "aggregated {} categories, {} regions, {} months, {} sub-categories",
        analysis.category_sales.len(),
        analysis.region_profit.len(),
        analysis.monthly_sales.len(),
        analysis.subcategory_profit.len()
    );
    analysis
}
