use crate::error::{ReportError, Result};
use crate::types::{
    LoadReport, Month, Record, COL_CATEGORY, COL_ORDER_DATE, COL_PROFIT, COL_REGION, COL_SALES,
    COL_SHIP_DATE, COL_SUB_CATEGORY,
};
use crate::util::{is_missing, parse_date, parse_f64};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use encoding_rs::Encoding;
use std::path::Path;

/// Header positions of the columns the pipeline reads.
struct ColumnIndex {
    order_date: usize,
    ship_date: usize,
    region: usize,
    category: usize,
    sub_category: usize,
    sales: usize,
    profit: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| ReportError::MissingColumn(name.to_string()))
        };
        Ok(ColumnIndex {
            order_date: find(COL_ORDER_DATE)?,
            ship_date: find(COL_SHIP_DATE)?,
            region: find(COL_REGION)?,
            category: find(COL_CATEGORY)?,
            sub_category: find(COL_SUB_CATEGORY)?,
            sales: find(COL_SALES)?,
            profit: find(COL_PROFIT)?,
        })
    }
}

/// Read `path`, decode it with the encoding named by `encoding_label`
/// and return the cleaned records.
pub fn load_and_clean(path: &Path, encoding_label: &str) -> Result<(Vec<Record>, LoadReport)> {
    let encoding = Encoding::for_label(encoding_label.trim().as_bytes())
        .ok_or_else(|| ReportError::UnknownEncoding(encoding_label.to_string()))?;
    let bytes = std::fs::read(path).map_err(|e| ReportError::io(path, e))?;
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes);
    if had_errors {
        log::warn!(
            "{} contains byte sequences invalid in {}; replaced",
            path.display(),
            encoding.name()
        );
    }
    log::debug!("decoded {} bytes from {} as {}", bytes.len(), path.display(), encoding.name());
    parse_and_clean(&text)
}

/// Parse decoded CSV text. Date and number columns are checked on every row
/// where the field is present; rows with any missing field in any column are
/// then dropped.
pub fn parse_and_clean(text: &str) -> Result<(Vec<Record>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = rdr.headers()?.clone();
    let columns = ColumnIndex::from_headers(&headers)?;
    let width = headers.len();

    let mut total_rows = 0usize;
    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        total_rows += 1;
        if row.len() > width {
            return Err(ReportError::FieldCount {
                row: total_rows,
                expected: width,
                found: row.len(),
            });
        }
        check_present_values(&row, &columns, total_rows)?;
        if (0..width).any(|i| is_missing(row.get(i))) {
            continue;
        }
        records.push(to_record(&row, &columns, total_rows)?);
    }

    let retained_rows = records.len();
    let report = LoadReport {
        total_rows,
        retained_rows,
        dropped_rows: total_rows - retained_rows,
    };
    log::info!(
        "loaded {} rows, dropped {} with missing values",
        total_rows,
        report.dropped_rows
    );
    Ok((records, report))
}

/// Types every present date and number field, so a mistyped value fails the
/// load even when the row is later dropped for a gap elsewhere.
fn check_present_values(row: &StringRecord, columns: &ColumnIndex, row_no: usize) -> Result<()> {
    let present = |i: usize| row.get(i).filter(|v| !is_missing(Some(*v)));
    for (i, column) in [
        (columns.order_date, COL_ORDER_DATE),
        (columns.ship_date, COL_SHIP_DATE),
    ] {
        if let Some(value) = present(i) {
            date_field(value, column, row_no)?;
        }
    }
    for (i, column) in [(columns.sales, COL_SALES), (columns.profit, COL_PROFIT)] {
        if let Some(value) = present(i) {
            number_field(value, column, row_no)?;
        }
    }
    Ok(())
}

fn to_record(row: &StringRecord, columns: &ColumnIndex, row_no: usize) -> Result<Record> {
    let field = |i: usize| row.get(i).unwrap_or_default();
    let order_date = date_field(field(columns.order_date), COL_ORDER_DATE, row_no)?;
    let ship_date = date_field(field(columns.ship_date), COL_SHIP_DATE, row_no)?;
    Ok(Record {
        order_date,
        ship_date,
        region: field(columns.region).to_string(),
        category: field(columns.category).to_string(),
        sub_category: field(columns.sub_category).to_string(),
        sales: number_field(field(columns.sales), COL_SALES, row_no)?,
        profit: number_field(field(columns.profit), COL_PROFIT, row_no)?,
        month: Month::of(order_date),
    })
}

fn date_field(value: &str, column: &'static str, row: usize) -> Result<NaiveDate> {
    parse_date(value).ok_or_else(|| ReportError::InvalidDate {
        column,
        row,
        value: value.to_string(),
    })
}

fn number_field(value: &str, column: &'static str, row: usize) -> Result<f64> {
    parse_f64(value).ok_or_else(|| ReportError::InvalidNumber {
        column,
        row,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "Row ID,Order Date,Ship Date,Region,Category,Sub-Category,Sales,Profit";

    #[test]
    fn drops_rows_with_any_missing_field() {
        let text = format!(
            "{HEADER}\n\
             1,2021-11-01,2021-11-03,West,Technology,Phones,100,20\n\
             ,2021-01-01,2021-01-04,East,Furniture,Tables,50,-5\n\
             3,2021-02-01,2021-02-02,East,Furniture,Chairs,70,NaN\n"
        );
        let (records, report) = parse_and_clean(&text).unwrap();
        assert_eq!(
            report,
            LoadReport {
                total_rows: 3,
                retained_rows: 1,
                dropped_rows: 2
            }
        );
        assert_eq!(records[0].region, "West");
        assert_eq!(records[0].month, Month::new(2021, 11));
    }

    #[test]
    fn short_rows_count_as_missing() {
        let text = format!("{HEADER}\n1,2021-11-01,2021-11-03,West,Technology,Phones,100\n");
        let (records, report) = parse_and_clean(&text).unwrap();
        assert!(records.is_empty());
        assert_eq!(report.dropped_rows, 1);
    }

    #[test]
    fn absent_column_is_an_error() {
        let text = "Order Date,Ship Date,Region,Category,Sales,Profit\n";
        match parse_and_clean(text) {
            Err(ReportError::MissingColumn(name)) => assert_eq!(name, "Sub-Category"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn mistyped_values_are_errors() {
        let bad_date = format!("{HEADER}\n1,someday,2021-11-03,West,Technology,Phones,100,20\n");
        assert!(matches!(
            parse_and_clean(&bad_date),
            Err(ReportError::InvalidDate { column: "Order Date", row: 1, .. })
        ));

        let bad_number = format!("{HEADER}\n1,2021-11-01,2021-11-03,West,Technology,Phones,lots,20\n");
        assert!(matches!(
            parse_and_clean(&bad_number),
            Err(ReportError::InvalidNumber { column: "Sales", row: 1, .. })
        ));
    }

    #[test]
    fn mistyped_value_in_dropped_row_is_still_an_error() {
        let text = format!(
            "{HEADER}\n\
             1,2021-11-01,2021-11-03,West,Technology,Phones,100,20\n\
             2,someday,2021-01-04,East,Furniture,Tables,50,\n"
        );
        assert!(matches!(
            parse_and_clean(&text),
            Err(ReportError::InvalidDate { column: "Order Date", row: 2, .. })
        ));

        let text = format!("{HEADER}\n1,2021-11-01,,West,Technology,Phones,lots,20\n");
        assert!(matches!(
            parse_and_clean(&text),
            Err(ReportError::InvalidNumber { column: "Sales", row: 1, .. })
        ));
    }

    #[test]
    fn rows_wider_than_header_are_rejected() {
        let text = format!("{HEADER}\n1,2021-11-01,2021-11-03,West,Technology,Phones,100,20,extra\n");
        assert!(matches!(
            parse_and_clean(&text),
            Err(ReportError::FieldCount { row: 1, expected: 8, found: 9 })
        ));
    }

    #[test]
    fn decodes_latin1_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.csv");
        let mut bytes = format!("{HEADER}\n1,2021-11-01,2021-11-03,").into_bytes();
        bytes.extend_from_slice(b"Qu\xe9bec,Technology,Phones,100,20\n");
        std::fs::write(&path, bytes).unwrap();

        let (records, _) = load_and_clean(&path, "ISO-8859-1").unwrap();
        assert_eq!(records[0].region, "Québec");
    }

    #[test]
    fn unknown_encoding_and_missing_file_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        assert!(matches!(
            load_and_clean(&path, "klingon"),
            Err(ReportError::UnknownEncoding(_))
        ));
        assert!(matches!(
            load_and_clean(&path, "latin1"),
            Err(ReportError::Io { .. })
        ));
    }
}
