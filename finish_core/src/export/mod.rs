//! # Report Export
//!
//! Writes calculation results to a PDF document or an XLSX spreadsheet.
//!
//! Both reports carry the same data: for each result the material name, unit
//! type, area, reserve, units needed and cost, plus batch totals when more
//! than one result is exported.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use finish_core::calculations::MaterialCalculator;
//! use finish_core::export::{export_results, ExportFormat};
//! use finish_core::materials::{Material, Wallpaper};
//!
//! let mut calc = MaterialCalculator::new();
//! let wallpaper = Arc::new(Material::from(Wallpaper::new("Vinyl", 1200.0).unwrap()));
//! calc.calculate(&wallpaper, 25.0).unwrap();
//!
//! let path = export_results(ExportFormat::Xlsx, &calc.history(), calc.currency(), None)?;
//! println!("saved {}", path.display());
//! # Ok::<(), finish_core::errors::CalcError>(())
//! ```

pub mod pdf;
pub mod xlsx;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::calculations::CalculationResult;
use crate::errors::{CalcError, CalcResult};
use crate::file_io::write_atomic;

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Xlsx,
}

impl ExportFormat {
    /// File extension written by default
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    /// Extensions accepted in a caller-supplied file name
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            ExportFormat::Pdf => &["pdf"],
            ExportFormat::Xlsx => &["xlsx"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.extension()
    }

    /// `calculation_report_YYYYMMDD_HHMMSS.<ext>` for the given moment.
    pub fn generate_filename(&self, at: DateTime<Local>) -> String {
        format!(
            "calculation_report_{}.{}",
            at.format("%Y%m%d_%H%M%S"),
            self.extension()
        )
    }

    /// Check that `path` ends in one of [`allowed_extensions`](Self::allowed_extensions).
    pub fn validate_path(&self, path: &Path) -> CalcResult<()> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if self.allowed_extensions().contains(&ext.as_str()) {
            Ok(())
        } else {
            Err(CalcError::invalid_argument(
                "filename",
                format!(
                    "Extension '{}' is not allowed. Allowed extensions: {}",
                    ext,
                    self.allowed_extensions().join(", ")
                ),
            ))
        }
    }

    /// Render `results` into the bytes of a report file.
    pub fn render(&self, results: &[CalculationResult], currency: &str) -> CalcResult<Vec<u8>> {
        let report = Report::new(results, currency)?;
        match self {
            ExportFormat::Pdf => pdf::render_report_pdf(&report),
            ExportFormat::Xlsx => xlsx::render_report_xlsx(&report),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "xlsx" => Ok(ExportFormat::Xlsx),
            other => Err(CalcError::invalid_argument(
                "format",
                format!("Unknown export format '{other}', expected 'pdf' or 'xlsx'"),
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Pdf => write!(f, "PDF"),
            ExportFormat::Xlsx => write!(f, "XLSX"),
        }
    }
}

/// Totals over an exported batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReportSummary {
    pub count: usize,
    pub total_area: f64,
    pub total_cost: f64,
}

impl ReportSummary {
    pub fn from_results(results: &[CalculationResult]) -> Self {
        ReportSummary {
            count: results.len(),
            total_area: results.iter().map(CalculationResult::area).sum(),
            total_cost: results.iter().map(CalculationResult::total_cost).sum(),
        }
    }
}

/// Everything a renderer needs, fixed at one moment in time.
pub(crate) struct Report<'a> {
    pub results: &'a [CalculationResult],
    pub summary: ReportSummary,
    pub currency: &'a str,
    pub generated_at: DateTime<Local>,
}

impl<'a> Report<'a> {
    fn new(results: &'a [CalculationResult], currency: &'a str) -> CalcResult<Self> {
        if results.is_empty() {
            return Err(CalcError::invalid_argument("results", "Nothing to export"));
        }
        Ok(Report {
            results,
            summary: ReportSummary::from_results(results),
            currency,
            generated_at: Local::now(),
        })
    }

    /// Totals are shown only for batches
    pub fn has_summary(&self) -> bool {
        self.results.len() > 1
    }
}

/// Render `results` and write them to `path`, or to a generated file name in
/// the working directory when `path` is `None`. Returns the written path.
///
/// # Errors
///
/// - `InvalidArgument` if `results` is empty or `path` has the wrong extension
/// - `Export` if rendering fails
/// - `FileError` if the file can't be written
pub fn export_results(
    format: ExportFormat,
    results: &[CalculationResult],
    currency: &str,
    path: Option<&Path>,
) -> CalcResult<PathBuf> {
    let path = match path {
        Some(path) => {
            format.validate_path(path)?;
            path.to_path_buf()
        }
        None => PathBuf::from(format.generate_filename(Local::now())),
    };

    let bytes = format.render(results, currency)?;
    write_atomic(&path, &bytes)?;

    info!(path = %path.display(), format = format.as_str(), count = results.len(), "exported report");
    Ok(path)
}
