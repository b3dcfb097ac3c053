// The report narrative is fixed text. `check` compares it against the
// computed views so a stale narrative at least shows up in the log.
use crate::types::Analysis;

pub const LEAD_LINE: &str = "- Technology category has the highest total sales.";

pub const INSIGHTS: [&str; 5] = [
    "- Technology category has the highest total sales.",
    "- The West region earns the most profit.",
    "- Sales peak during November and December.",
    "- Bookcases and Tables are the least profitable sub-categories.",
    "- Heatmap shows high sales concentration in Technology in the West region.",
];

/// Returns one message per insight the data does not support.
pub fn check(analysis: &Analysis) -> Vec<String> {
    let mut problems = Vec::new();

    match analysis.category_sales.first() {
        Some((top, _)) if top == "Technology" => {}
        other => problems.push(format!(
            "top category by sales is {:?}, not Technology",
            other.map(|(k, _)| k.as_str())
        )),
    }

    match analysis.region_profit.first() {
        Some((top, _)) if top == "West" => {}
        other => problems.push(format!(
            "top region by profit is {:?}, not West",
            other.map(|(k, _)| k.as_str())
        )),
    }

    let peak = analysis
        .monthly_sales
        .entries
        .iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(m, _)| *m);
    if !matches!(peak, Some(m) if m.month >= 11) {
        problems.push(format!(
            "peak sales month is {}, not November or December",
            peak.map(|m| m.to_string()).unwrap_or_else(|| "none".into())
        ));
    }

    let mut least: Vec<&str> = analysis
        .subcategory_profit
        .keys()
        .take(2)
        .map(String::as_str)
        .collect();
    least.sort_unstable();
    if least != ["Bookcases", "Tables"] {
        problems.push(format!(
            "least profitable sub-categories are {:?}, not Bookcases and Tables",
            least
        ));
    }

    let hottest = analysis
        .region_category_sales
        .cells
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|((region, category), _)| (region.as_str(), category.as_str()));
    if hottest != Some(("West", "Technology")) {
        problems.push(format!(
            "largest region/category cell is {:?}, not West/Technology",
            hottest
        ));
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::analyze;
    use crate::types::{Month, Record};
    use chrono::NaiveDate;

    fn rec(region: &str, category: &str, sub: &str, sales: f64, profit: f64, month: u32) -> Record {
        let date = NaiveDate::from_ymd_opt(2021, month, 1).unwrap();
        Record {
            order_date: date,
            ship_date: date,
            region: region.into(),
            category: category.into(),
            sub_category: sub.into(),
            sales,
            profit,
            month: Month::of(date),
        }
    }

    #[test]
    fn narrative_matching_data_passes() {
        let data = vec![
            rec("West", "Technology", "Phones", 500.0, 90.0, 11),
            rec("East", "Furniture", "Tables", 100.0, -30.0, 3),
            rec("East", "Furniture", "Bookcases", 80.0, -20.0, 4),
        ];
        assert!(check(&analyze(&data)).is_empty());
    }

    #[test]
    fn stale_narrative_is_reported() {
        let data = vec![
            rec("East", "Furniture", "Chairs", 500.0, 90.0, 3),
            rec("West", "Technology", "Phones", 100.0, -30.0, 11),
        ];
        let problems = check(&analyze(&data));
        assert_eq!(problems.len(), 5, "{problems:?}");
    }
}
