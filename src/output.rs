use crate::error::{ReportError, Result};
use crate::types::{AggregateView, PreviewRow};
use crate::util::format_number;
use serde::Serialize;
use std::fmt::Display;
use std::path::Path;
use tabled::{settings::Style, Table};

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))?;
    }
    std::fs::write(path, s).map_err(|e| ReportError::io(path, e))?;
    Ok(())
}

pub fn preview_rows<K: Display>(view: &AggregateView<K>, max_rows: usize) -> Vec<PreviewRow> {
    view.entries
        .iter()
        .take(max_rows)
        .map(|(k, v)| PreviewRow {
            key: k.to_string(),
            total: format_number(*v, 2),
        })
        .collect()
}

/// Print the first `max_rows` entries of a view as a markdown table.
pub fn preview_view<K: Display>(title: &str, view: &AggregateView<K>, max_rows: usize) {
    println!("{}", title);
    let rows = preview_rows(view, max_rows);
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(rows).with(Style::markdown()).to_string();
    println!("{}", table_str);
    if view.len() > max_rows {
        println!("({} more)", view.len() - max_rows);
    }
    println!();
}
