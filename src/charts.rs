//! PNG rendering of the aggregate views with `plotters`.
//!
//! Categorical axes are plain `f64` axes where item `i` sits at `x = i`; the
//! label formatter maps integer ticks back to the item's key.

use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;

use crate::error::{ReportError, Result};
use crate::types::Analysis;
use crate::util::format_number;

type DrawResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

const CHART_SIZE: (u32, u32) = (1000, 600);
const HEATMAP_SIZE: (u32, u32) = (1000, 750);
const FONT: &str = "sans-serif";

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const SALMON: RGBColor = RGBColor(250, 128, 114);
const TREND_GREEN: RGBColor = RGBColor(0, 128, 0);
const MEDIUM_PURPLE: RGBColor = RGBColor(147, 112, 219);

/// YlGnBu, light to dark.
const YLGNBU: [(u8, u8, u8); 9] = [
    (255, 255, 217),
    (237, 248, 177),
    (199, 233, 180),
    (127, 205, 187),
    (65, 182, 196),
    (29, 145, 192),
    (34, 94, 168),
    (37, 52, 148),
    (8, 29, 88),
];

/// The five charts, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    SalesByCategory,
    ProfitByRegion,
    MonthlySalesTrend,
    RegionCategoryHeatmap,
    ProfitBySubCategory,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::SalesByCategory,
        ChartKind::ProfitByRegion,
        ChartKind::MonthlySalesTrend,
        ChartKind::RegionCategoryHeatmap,
        ChartKind::ProfitBySubCategory,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::SalesByCategory => "sales_by_category.png",
            ChartKind::ProfitByRegion => "profit_by_region.png",
            ChartKind::MonthlySalesTrend => "monthly_sales_trend.png",
            ChartKind::RegionCategoryHeatmap => "heatmap_region_category.png",
            ChartKind::ProfitBySubCategory => "profit_by_subcategory.png",
        }
    }

    /// Caption used above the image in the PDF.
    pub fn caption(self) -> &'static str {
        match self {
            ChartKind::SalesByCategory => "Sales by Category",
            ChartKind::ProfitByRegion => "Profit by Region",
            ChartKind::MonthlySalesTrend => "Monthly Sales Trend",
            ChartKind::RegionCategoryHeatmap => "Region vs Category Heatmap",
            ChartKind::ProfitBySubCategory => "Profit by Sub-Category",
        }
    }

    /// Title drawn inside the image.
    fn title(self) -> &'static str {
        match self {
            ChartKind::RegionCategoryHeatmap => "Sales Heatmap: Region vs Category",
            other => other.caption(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedChart {
    pub kind: ChartKind,
    pub path: PathBuf,
}

/// Draws every chart into `out_dir`, overwriting existing files.
pub fn render_all(analysis: &Analysis, out_dir: &Path) -> Result<Vec<RenderedChart>> {
    std::fs::create_dir_all(out_dir).map_err(|e| ReportError::io(out_dir, e))?;
    ChartKind::ALL
        .iter()
        .map(|&kind| {
            let path = out_dir.join(kind.file_name());
            render(kind, analysis, &path).map_err(|source| ReportError::Chart {
                path: path.clone(),
                source,
            })?;
            log::info!("wrote {}", path.display());
            Ok(RenderedChart { kind, path })
        })
        .collect()
}

fn render(kind: ChartKind, analysis: &Analysis, path: &Path) -> DrawResult<()> {
    match kind {
        ChartKind::SalesByCategory => {
            draw_bar_chart(path, kind.title(), "Sales", &analysis.category_sales.entries, SKY_BLUE)
        }
        ChartKind::ProfitByRegion => {
            draw_bar_chart(path, kind.title(), "Profit", &analysis.region_profit.entries, SALMON)
        }
        ChartKind::MonthlySalesTrend => {
            let points: Vec<(String, f64)> = analysis
                .monthly_sales
                .entries
                .iter()
                .map(|(month, v)| (month.to_string(), *v))
                .collect();
            draw_line_chart(path, kind.title(), &points)
        }
        ChartKind::RegionCategoryHeatmap => draw_heatmap(path, kind.title(), analysis),
        ChartKind::ProfitBySubCategory => draw_horizontal_bar_chart(
            path,
            kind.title(),
            "Profit",
            &analysis.subcategory_profit.entries,
            MEDIUM_PURPLE,
        ),
    }
}

/// Value-axis bounds that always include zero, padded by 5%.
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = hi - lo;
    if span <= 0.0 {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = span * 0.05;
    (if lo < 0.0 { lo - pad } else { lo }, if hi > 0.0 { hi + pad } else { hi })
}

/// Axis bounds for `n` categorical slots centred on `0..n`.
fn slot_range(n: usize) -> std::ops::Range<f64> {
    -0.5..(n.max(1) as f64 - 0.5)
}

fn slot_label(labels: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}

fn axis_label(v: f64) -> String {
    if v.fract().abs() < 1e-9 {
        format_number(v, 0)
    } else {
        format_number(v, 1)
    }
}

fn keys(entries: &[(String, f64)]) -> Vec<String> {
    entries.iter().map(|(k, _)| k.clone()).collect()
}

fn draw_bar_chart(
    path: &Path,
    title: &str,
    y_desc: &str,
    entries: &[(String, f64)],
    color: RGBColor,
) -> DrawResult<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let labels = keys(entries);
    let (lo, hi) = value_range(entries.iter().map(|(_, v)| *v));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 28))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(slot_range(entries.len()), lo..hi)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len().max(1))
        .x_label_formatter(&|x| slot_label(&labels, *x))
        .y_label_formatter(&|y| axis_label(*y))
        .y_desc(y_desc)
        .label_style((FONT, 15))
        .draw()?;

    chart.draw_series(entries.iter().enumerate().map(|(i, (_, v))| {
        let x = i as f64;
        Rectangle::new(
            [(x - 0.4, v.max(0.0)), (x + 0.4, v.min(0.0))],
            color.filled(),
        )
    }))?;
    root.present()?;
    Ok(())
}

fn draw_horizontal_bar_chart(
    path: &Path,
    title: &str,
    x_desc: &str,
    entries: &[(String, f64)],
    color: RGBColor,
) -> DrawResult<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let labels = keys(entries);
    let (lo, hi) = value_range(entries.iter().map(|(_, v)| *v));

    // item 0 lands at the bottom
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 28))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(130)
        .build_cartesian_2d(lo..hi, slot_range(entries.len()))?;
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(labels.len().max(1))
        .y_label_formatter(&|y| slot_label(&labels, *y))
        .x_label_formatter(&|x| axis_label(*x))
        .x_desc(x_desc)
        .label_style((FONT, 14))
        .draw()?;

    chart.draw_series(entries.iter().enumerate().map(|(i, (_, v))| {
        let y = i as f64;
        Rectangle::new(
            [(v.min(0.0), y + 0.4), (v.max(0.0), y - 0.4)],
            color.filled(),
        )
    }))?;
    root.present()?;
    Ok(())
}

// Rotated month labels are drawn by hand, starting below the tick marks.
const TICK_MARK_PX: i32 = 5;
const MONTH_LABEL_GAP_PX: i32 = 12;
const MONTH_LABEL_SIZE: i32 = 13;

/// Anchor for a clockwise-rotated label under the tick at `tick`: the text
/// runs downward from below the tick and is centred on it horizontally.
fn rotated_label_anchor(tick: (i32, i32)) -> (i32, i32) {
    (tick.0 + MONTH_LABEL_SIZE / 2, tick.1 + MONTH_LABEL_GAP_PX)
}

fn draw_line_chart(path: &Path, title: &str, points: &[(String, f64)]) -> DrawResult<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let labels = keys(points);
    let (lo, hi) = value_range(points.iter().map(|(_, v)| *v));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 28))
        .margin(15)
        .x_label_area_size(120)
        .y_label_area_size(90)
        .build_cartesian_2d(slot_range(points.len()), lo..hi)?;
    chart
        .configure_mesh()
        .x_labels(labels.len().max(1))
        .x_label_formatter(&|_| String::new())
        .set_tick_mark_size(LabelAreaPosition::Bottom, TICK_MARK_PX)
        .y_label_formatter(&|y| axis_label(*y))
        .x_desc("Month")
        .y_desc("Sales")
        .draw()?;

    let label_font = (FONT, MONTH_LABEL_SIZE)
        .into_font()
        .transform(FontTransform::Rotate90);
    for (i, label) in labels.iter().enumerate() {
        let tick = chart.backend_coord(&(i as f64, lo));
        root.draw(&Text::new(
            label.as_str(),
            rotated_label_anchor(tick),
            label_font.clone(),
        ))?;
    }

    let series: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, (_, v))| (i as f64, *v))
        .collect();
    chart.draw_series(LineSeries::new(series.iter().copied(), TREND_GREEN.stroke_width(2)))?;
    chart.draw_series(
        series
            .iter()
            .map(|&point| Circle::new(point, 5, TREND_GREEN.filled())),
    )?;
    root.present()?;
    Ok(())
}

/// Maps `t` in `[0, 1]` onto the YlGnBu ramp.
fn ylgnbu(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (YLGNBU.len() - 1) as f64;
    let idx = (scaled.floor() as usize).min(YLGNBU.len() - 2);
    let frac = scaled - idx as f64;
    let (a, b) = (YLGNBU[idx], YLGNBU[idx + 1]);
    let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

fn normalize(v: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        (v - lo) / (hi - lo)
    } else {
        0.5
    }
}

fn draw_heatmap(path: &Path, title: &str, analysis: &Analysis) -> DrawResult<()> {
    let pivot = &analysis.region_category_sales;
    let root = BitMapBackend::new(path, HEATMAP_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(title, (FONT, 28))?;
    let (grid_area, bar_area) = root.split_horizontally(HEATMAP_SIZE.0 as i32 - 150);

    let lo = pivot.min_value().unwrap_or(0.0);
    let hi = pivot.max_value().unwrap_or(1.0);
    let (ncols, nrows) = (pivot.columns.len(), pivot.rows.len());
    // rows are drawn top to bottom
    let row_labels: Vec<String> = pivot.rows.iter().rev().cloned().collect();

    let mut chart = ChartBuilder::on(&grid_area)
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(110)
        .build_cartesian_2d(slot_range(ncols), slot_range(nrows))?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(ncols.max(1))
        .y_labels(nrows.max(1))
        .x_label_formatter(&|x| slot_label(&pivot.columns, *x))
        .y_label_formatter(&|y| slot_label(&row_labels, *y))
        .x_desc("Category")
        .y_desc("Region")
        .label_style((FONT, 15))
        .draw()?;

    for (r, region) in pivot.rows.iter().enumerate() {
        let y = (nrows - 1 - r) as f64;
        for (c, category) in pivot.columns.iter().enumerate() {
            let Some(value) = pivot.get(region, category) else {
                continue;
            };
            let x = c as f64;
            let t = normalize(value, lo, hi);
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x - 0.5, y + 0.5), (x + 0.5, y - 0.5)],
                ylgnbu(t).filled(),
            )))?;
            let ink = if t > 0.5 { WHITE } else { BLACK };
            let style = (FONT, 18)
                .into_font()
                .color(&ink)
                .pos(Pos::new(HPos::Center, VPos::Center));
            chart.draw_series(std::iter::once(Text::new(
                format!("{:.0}", value),
                (x, y),
                style,
            )))?;
        }
    }

    draw_color_bar(&bar_area, lo, hi)?;
    root.present()?;
    Ok(())
}

fn draw_color_bar(area: &DrawingArea<BitMapBackend<'_>, Shift>, lo: f64, hi: f64) -> DrawResult<()> {
    let hi = if hi > lo { hi } else { lo + 1.0 };
    let mut bar = ChartBuilder::on(area)
        .margin_top(15)
        .margin_bottom(65)
        .margin_left(10)
        .right_y_label_area_size(80)
        .build_cartesian_2d(0f64..1f64, lo..hi)?;
    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_label_formatter(&|y| axis_label(y.round()))
        .label_style((FONT, 13))
        .draw()?;

    const STEPS: usize = 100;
    let step = (hi - lo) / STEPS as f64;
    bar.draw_series((0..STEPS).map(|i| {
        let y0 = lo + step * i as f64;
        Rectangle::new(
            [(0.0, y0 + step), (1.0, y0)],
            ylgnbu(i as f64 / (STEPS - 1) as f64).filled(),
        )
    }))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_range_always_contains_zero() {
        assert_eq!(value_range([10.0, 20.0].into_iter()), (0.0, 21.0));
        let (lo, hi) = value_range([-10.0, 30.0].into_iter());
        assert!(lo < -10.0 && hi > 30.0);
        assert_eq!(value_range(std::iter::empty()), (-1.0, 1.0));
    }

    #[test]
    fn slot_labels_only_at_integer_ticks() {
        let labels = vec!["East".to_string(), "West".to_string()];
        assert_eq!(slot_label(&labels, 0.0), "East");
        assert_eq!(slot_label(&labels, 1.0), "West");
        assert_eq!(slot_label(&labels, 0.5), "");
        assert_eq!(slot_label(&labels, 2.0), "");
        assert_eq!(slot_label(&labels, -1.0), "");
    }

    #[test]
    fn colour_ramp_spans_light_to_dark() {
        assert_eq!(ylgnbu(0.0), RGBColor(255, 255, 217));
        assert_eq!(ylgnbu(1.0), RGBColor(8, 29, 88));
        assert_eq!(ylgnbu(f64::NAN), ylgnbu(0.0));
    }

    #[test]
    fn rotated_labels_start_below_tick_marks() {
        let (x, y) = rotated_label_anchor((100, 400));
        assert!(y - 400 > TICK_MARK_PX);
        assert!(x >= 100 && x - 100 <= MONTH_LABEL_SIZE);
    }

    #[test]
    fn renders_four_years_of_months() {
        let Ok(fonts) = crate::fonts::discover(None) else {
            eprintln!("skipping: no Liberation Sans or DejaVu Sans family installed");
            return;
        };
        crate::fonts::register_chart_font(&fonts).unwrap();
        let points: Vec<(String, f64)> = (0..48)
            .map(|i| (format!("{}-{:02}", 2014 + i / 12, i % 12 + 1), 1000.0 + 37.0 * i as f64))
            .collect();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monthly_sales_trend.png");

        draw_line_chart(&path, "Monthly Sales Trend", &points).unwrap();
        assert_eq!(image::image_dimensions(&path).unwrap(), CHART_SIZE);
    }

    #[test]
    fn chart_files_are_fixed() {
        let names: Vec<&str> = ChartKind::ALL.iter().map(|k| k.file_name()).collect();
        assert_eq!(
            names,
            vec![
                "sales_by_category.png",
                "profit_by_region.png",
                "monthly_sales_trend.png",
                "heatmap_region_category.png",
                "profit_by_subcategory.png",
            ]
        );
    }
}
