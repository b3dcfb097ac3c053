//! Font discovery shared by the chart renderer and the PDF composer.
//!
//! Neither `plotters` (with the `ab_glyph` text backend) nor `genpdf` ship
//! glyph data, so a TrueType family has to be found on disk. The search order
//! is: an explicitly configured directory, the crate's `assets/fonts`, then a
//! handful of well-known system locations.

use std::path::{Path, PathBuf};

use genpdf::fonts::{FontData, FontFamily};
use once_cell::sync::OnceCell;
use plotters::style::FontStyle;

use crate::error::{ReportError, Result};

/// File names of one family's faces. Italic faces fall back to the upright
/// ones when a family ships without them.
#[derive(Debug, Clone, Copy)]
struct FaceNames {
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

const LIBERATION_SANS: FaceNames = FaceNames {
    regular: "LiberationSans-Regular.ttf",
    bold: "LiberationSans-Bold.ttf",
    italic: "LiberationSans-Italic.ttf",
    bold_italic: "LiberationSans-BoldItalic.ttf",
};

const DEJAVU_SANS: FaceNames = FaceNames {
    regular: "DejaVuSans.ttf",
    bold: "DejaVuSans-Bold.ttf",
    italic: "DejaVuSans-Oblique.ttf",
    bold_italic: "DejaVuSans-BoldOblique.ttf",
};

const SYSTEM_DIRECTORIES: &[&str] = &[
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/liberation2",
    "/usr/share/fonts/liberation-sans",
    "/usr/share/fonts/liberation",
    "/usr/share/fonts/TTF",
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/dejavu",
    "/usr/share/fonts/dejavu-sans-fonts",
    "/usr/local/share/fonts",
];

/// A resolved font family: the four face files of one family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSet {
    pub regular: PathBuf,
    pub bold: PathBuf,
    pub italic: PathBuf,
    pub bold_italic: PathBuf,
}

impl FontSet {
    fn in_directory(dir: &Path, names: FaceNames) -> Option<Self> {
        let regular = dir.join(names.regular);
        let bold = dir.join(names.bold);
        if !regular.is_file() || !bold.is_file() {
            return None;
        }
        let italic = Some(dir.join(names.italic))
            .filter(|p| p.is_file())
            .unwrap_or_else(|| regular.clone());
        let bold_italic = Some(dir.join(names.bold_italic))
            .filter(|p| p.is_file())
            .unwrap_or_else(|| bold.clone());
        Some(FontSet {
            regular,
            bold,
            italic,
            bold_italic,
        })
    }

    /// Loads the faces as a `genpdf` font family.
    pub fn pdf_family(&self) -> Result<FontFamily<FontData>> {
        Ok(FontFamily {
            regular: load_pdf_face(&self.regular)?,
            bold: load_pdf_face(&self.bold)?,
            italic: load_pdf_face(&self.italic)?,
            bold_italic: load_pdf_face(&self.bold_italic)?,
        })
    }
}

fn load_pdf_face(path: &Path) -> Result<FontData> {
    FontData::load(path, None).map_err(|err| ReportError::Font {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn bundled_font_directory() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn candidate_directories(configured: Option<&Path>) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(dir) = configured {
        dirs.push(dir.to_path_buf());
    }
    dirs.push(bundled_font_directory());
    dirs.extend(SYSTEM_DIRECTORIES.iter().map(PathBuf::from));
    dirs
}

/// Finds the first directory holding a complete supported family.
pub fn discover(configured: Option<&Path>) -> Result<FontSet> {
    let dirs = candidate_directories(configured);
    for dir in &dirs {
        for names in [LIBERATION_SANS, DEJAVU_SANS] {
            if let Some(set) = FontSet::in_directory(dir, names) {
                log::debug!("using fonts from {}", dir.display());
                return Ok(set);
            }
        }
    }
    Err(ReportError::FontNotFound {
        searched: dirs
            .iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Indicates whether [`discover`] would succeed without an explicit directory.
pub fn fonts_available() -> bool {
    discover(None).is_ok()
}

static CHART_FONT: OnceCell<PathBuf> = OnceCell::new();

/// Registers the regular face as the plotters `sans-serif` family. Plotters
/// keeps registered fonts for the life of the process, so this only happens
/// once; later calls are no-ops.
pub fn register_chart_font(fonts: &FontSet) -> Result<()> {
    CHART_FONT
        .get_or_try_init(|| {
            let path = fonts.regular.clone();
            let bytes = std::fs::read(&path).map_err(|e| ReportError::io(&path, e))?;
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            plotters::style::register_font("sans-serif", FontStyle::Normal, bytes).map_err(
                |_| ReportError::Font {
                    path: path.clone(),
                    message: "not a valid TrueType font".to_string(),
                },
            )?;
            log::debug!("registered chart font {}", path.display());
            Ok(path)
        })
        .map(|_| ())
}
