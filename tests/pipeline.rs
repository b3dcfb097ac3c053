use std::path::Path;

use pretty_assertions::assert_eq;
use superstore_report::types::Month;
use superstore_report::{fonts, loader, reports, run, ReportConfig, ReportError};

const HEADER: &str =
    "Row ID,Order ID,Order Date,Ship Date,Customer Name,Region,Category,Sub-Category,Sales,Profit";

fn two_row_csv() -> String {
    format!(
        "{HEADER}\n\
         1,CA-1,2021-11-01,2021-11-04,Ann,West,Technology,Phones,100,20\n\
         2,CA-2,2021-01-01,2021-01-05,Bob,East,Furniture,Tables,50,-5\n"
    )
}

fn write_input(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("superstore.csv");
    std::fs::write(&path, body).unwrap();
    path
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn two_row_scenario_aggregates() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), &two_row_csv());

    let (records, load) = loader::load_and_clean(&input, "ISO-8859-1").unwrap();
    assert_eq!(load.total_rows, 2);
    assert_eq!(load.retained_rows, 2);
    let analysis = reports::analyze(&records);

    assert_eq!(
        analysis.category_sales.entries,
        vec![("Technology".to_string(), 100.0), ("Furniture".to_string(), 50.0)]
    );
    assert_eq!(
        analysis.region_profit.entries,
        vec![("West".to_string(), 20.0), ("East".to_string(), -5.0)]
    );
    assert_eq!(
        analysis.monthly_sales.entries,
        vec![(Month::new(2021, 1), 50.0), (Month::new(2021, 11), 100.0)]
    );
    assert_eq!(analysis.region_category_sales.get("West", "Technology"), Some(100.0));
    assert_eq!(analysis.region_category_sales.get("West", "Furniture"), None);
}

#[test]
fn missing_profit_excludes_row_from_every_view() {
    let dir = tempfile::tempdir().unwrap();
    let body = format!(
        "{}3,CA-3,2021-11-09,2021-11-12,Cy,South,Office Supplies,Binders,999,\n",
        two_row_csv()
    );
    let input = write_input(dir.path(), &body);

    let (records, load) = loader::load_and_clean(&input, "ISO-8859-1").unwrap();
    assert_eq!(load.dropped_rows, 1);
    let analysis = reports::analyze(&records);

    assert_eq!(analysis.category_sales.get(&"Office Supplies".to_string()), None);
    assert_eq!(analysis.category_sales.values().sum::<f64>(), 150.0);
    assert_eq!(analysis.region_profit.get(&"South".to_string()), None);
    assert_eq!(analysis.monthly_sales.get(&Month::new(2021, 11)), Some(100.0));
    assert_eq!(analysis.subcategory_profit.len(), 2);
    assert_eq!(analysis.region_category_sales.rows, vec!["East", "West"]);
}

#[test]
fn missing_input_fails_before_writing_anything() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let config = ReportConfig::new(dir.path().join("nope.csv"), &out);

    assert!(matches!(run(&config), Err(ReportError::Io { .. })));
    assert!(!out.exists());
}

#[test]
fn full_run_writes_five_charts_and_one_pdf() {
    if !fonts::fonts_available() {
        eprintln!("skipping: no Liberation Sans or DejaVu Sans family installed");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), &two_row_csv());
    let out = dir.path().join("output");
    let config = ReportConfig::new(&input, &out);

    let outcome = run(&config).unwrap();
    assert_eq!(outcome.report_path, out.join("superstore_sales_report.pdf"));
    assert_eq!(
        listing(&out),
        vec![
            "heatmap_region_category.png",
            "monthly_sales_trend.png",
            "profit_by_region.png",
            "profit_by_subcategory.png",
            "sales_by_category.png",
            "superstore_sales_report.pdf",
        ]
    );
    let pdf = std::fs::read(&outcome.report_path).unwrap();
    assert!(pdf.starts_with(b"%PDF"));

    // second run over the same directory overwrites in place
    let again = run(&config).unwrap();
    assert_eq!(again.analysis, outcome.analysis);
    assert_eq!(listing(&out).len(), 6);
}

#[test]
fn summary_is_written_only_when_requested() {
    if !fonts::fonts_available() {
        eprintln!("skipping: no Liberation Sans or DejaVu Sans family installed");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), &two_row_csv());
    let mut config = ReportConfig::new(&input, dir.path().join("output"));
    let summary_path = dir.path().join("summary.json");
    config.summary = Some(summary_path.clone());

    run(&config).unwrap();
    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(summary["load"]["retained_rows"], 2);
    assert_eq!(summary["analysis"]["monthly_sales"]["entries"][0][0], "2021-01");
    assert_eq!(
        summary["analysis"]["region_category_sales"]["West"]["Technology"],
        100.0
    );
}
