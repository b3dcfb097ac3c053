//! Report composition with `genpdf`.

use std::path::{Path, PathBuf};

use genpdf::elements::{Break, Image, Paragraph};
use genpdf::error::Context as _;
use genpdf::style::Style;
use genpdf::{Element as _, Scale, SimplePageDecorator};
use image::GenericImageView;

use crate::charts::RenderedChart;
use crate::error::Result;
use crate::fonts::FontSet;
use crate::insights::{INSIGHTS, LEAD_LINE};

pub const REPORT_FILE_NAME: &str = "superstore_sales_report.pdf";
pub const REPORT_TITLE: &str = "Superstore Sales Analysis Report";

const MARGIN_MM: i32 = 15;
const IMAGE_WIDTH_MM: f64 = 170.0;
const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
/// One 11 pt line, about 5 mm.
const GAP_LINES: f64 = 1.0;

fn heading(text: &str, size: u8) -> impl genpdf::Element {
    Paragraph::new(text).styled(Style::new().bold().with_font_size(size))
}

/// Loads a chart PNG and scales it to `IMAGE_WIDTH_MM`, keeping the aspect
/// ratio. `genpdf` places images at 300 dpi and cannot embed alpha.
fn chart_image(path: &Path) -> Result<Image> {
    let decoded = image::open(path)
        .with_context(|| format!("Failed to decode chart image {}", path.display()))?;
    let (px_width, _) = decoded.dimensions();
    let natural_width_mm = MM_PER_INCH * px_width as f64 / DEFAULT_IMAGE_DPI;
    let factor = IMAGE_WIDTH_MM / natural_width_mm;
    let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());
    Ok(Image::from_dynamic_image(rgb)?.with_scale(Scale::new(factor, factor)))
}

/// Writes the report next to the charts and returns its path.
pub fn compose(out_dir: &Path, charts: &[RenderedChart], fonts: &FontSet) -> Result<PathBuf> {
    let mut doc = genpdf::Document::new(fonts.pdf_family()?);
    doc.set_title(REPORT_TITLE);
    doc.set_paper_size(genpdf::PaperSize::A4);
    doc.set_font_size(11);
    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(MARGIN_MM);
    doc.set_page_decorator(decorator);

    doc.push(heading(LEAD_LINE, 16));
    doc.push(heading(REPORT_TITLE, 16));
    doc.push(heading("Key Insights:", 12));
    for insight in INSIGHTS {
        doc.push(Paragraph::new(insight));
    }

    doc.push(Break::new(GAP_LINES));
    doc.push(heading("Visual Analysis:", 12));
    for chart in charts {
        doc.push(heading(chart.kind.caption(), 11));
        doc.push(chart_image(&chart.path)?);
        doc.push(Break::new(GAP_LINES));
    }

    let path = out_dir.join(REPORT_FILE_NAME);
    doc.render_to_file(&path)?;
    log::info!("wrote {}", path.display());
    Ok(path)
}
