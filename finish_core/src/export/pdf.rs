//! # PDF Report
//!
//! Generates the calculation report as PDF using Typst.
//!
//! ## Architecture
//!
//! - The Typst template is embedded as a string constant
//! - Data is injected via `{{PLACEHOLDER}}` replacement before compilation
//! - User text enters the document only as Typst string literals
//! - Output is raw PDF bytes (`Vec<u8>`)

use chrono::Utc;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use super::Report;
use crate::errors::{CalcError, CalcResult};

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world for compiling documents without external files.
struct PdfWorld {
    /// The main source document
    main: Source,
    /// Font book
    book: LazyHash<FontBook>,
    /// Available fonts
    fonts: Vec<Font>,
    /// Library (standard functions)
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts = Self::load_fonts();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }

    /// Fonts bundled with typst-assets
    fn load_fonts() -> Vec<Font> {
        typst_assets::fonts()
            .flat_map(|font_bytes| Font::iter(Bytes::new(font_bytes.to_vec())))
            .collect()
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(
            now.format("%Y").to_string().parse().ok()?,
            now.format("%m").to_string().parse().ok()?,
            now.format("%d").to_string().parse().ok()?,
        )
    }
}

// ============================================================================
// PDF Templates
// ============================================================================

const REPORT_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 2cm, bottom: 2cm, left: 2cm, right: 2cm),
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr),
      align(left)[#text(size: 9pt)[Finishing materials report]],
      align(right)[#text(size: 9pt)[Page #counter(page).display()]],
    )
  ]
)

#set text(font: "Libertinus Serif", size: 11pt)

#align(center)[
  #text(size: 18pt, weight: "bold")[Finishing Materials Calculation Report]
]

#align(right)[#emph[Date: {{DATE}}]]

#v(12pt)

{{RESULTS}}
{{SUMMARY}}
"##;

const RESULT_TEMPLATE: &str = r##"
== Calculation {{INDEX}}: #{{NAME}}

#table(
  columns: (1fr, 1fr),
  stroke: 0.5pt + gray,
  inset: 6pt,
  [Material], {{NAME}},
  [Unit], {{UNIT}},
  [Coverage area], [{{AREA}} m²],
  [Reserve], [{{RESERVE}}%],
  [Units needed], [{{UNITS}}],
  [*Total cost*], [*{{COST}}* #{{CURRENCY}}],
)

#v(8pt)
"##;

const SUMMARY_TEMPLATE: &str = r##"
#pagebreak()

= Summary

#table(
  columns: (1fr, 1fr),
  stroke: 0.5pt + gray,
  inset: 6pt,
  [Calculations], [{{COUNT}}],
  [Total area], [{{TOTAL_AREA}} m²],
  [*Total cost*], [*{{TOTAL_COST}}* #{{CURRENCY}}],
)
"##;

/// Render a report to PDF bytes.
pub(crate) fn render_report_pdf(report: &Report<'_>) -> CalcResult<Vec<u8>> {
    let currency = typst_string(report.currency);

    let results: String = report
        .results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            RESULT_TEMPLATE
                .replace("{{INDEX}}", &(i + 1).to_string())
                .replace("{{UNIT}}", &typst_string(result.unit_label()))
                .replace("{{AREA}}", &format!("{:.2}", result.area()))
                .replace("{{RESERVE}}", &result.reserve_percent().to_string())
                .replace("{{UNITS}}", &result.units_needed().to_string())
                .replace("{{COST}}", &format!("{:.2}", result.total_cost()))
                .replace("{{CURRENCY}}", &currency)
                .replace("{{NAME}}", &typst_string(result.material().name()))
        })
        .collect();

    let summary = if report.has_summary() {
        SUMMARY_TEMPLATE
            .replace("{{COUNT}}", &report.summary.count.to_string())
            .replace("{{TOTAL_AREA}}", &format!("{:.2}", report.summary.total_area))
            .replace("{{TOTAL_COST}}", &format!("{:.2}", report.summary.total_cost))
            .replace("{{CURRENCY}}", &currency)
    } else {
        String::new()
    };

    let source = REPORT_TEMPLATE
        .replace("{{DATE}}", &report.generated_at.format("%d.%m.%Y %H:%M").to_string())
        .replace("{{SUMMARY}}", &summary)
        .replace("{{RESULTS}}", &results);

    compile_pdf(source)
}

fn compile_pdf(source: String) -> CalcResult<Vec<u8>> {
    // Compile the Typst document
    let world = PdfWorld::new(source);
    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::export("pdf", format!("Typst compilation failed: {}", error_msgs.join("; ")))
    })?;

    // Render to PDF
    typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::export("pdf", format!("PDF rendering failed: {}", error_msgs.join("; ")))
    })
}

/// Quote user text as a Typst string literal
fn typst_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // keeps `{{` placeholders out of user text
            '{' => out.push_str("\\u{7b}"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::CalculationResult;
    use crate::export::tests::sample_results;
    use crate::materials::{Material, Wallpaper};
    use std::sync::Arc;

    #[test]
    fn test_typst_string_escapes() {
        assert_eq!(typst_string("Oak"), "\"Oak\"");
        assert_eq!(typst_string("a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(typst_string("#[*]"), "\"#[*]\"");
        assert_eq!(typst_string("{{A}}"), "\"\\u{7b}\\u{7b}A}}\"");
    }

    #[test]
    fn test_pdf_generation() {
        let results = sample_results();
        let report = Report::new(&results, "₽").unwrap();
        let pdf = render_report_pdf(&report);

        // Should succeed
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());

        let pdf_bytes = pdf.unwrap();
        assert!(pdf_bytes.starts_with(b"%PDF"), "Output is not a valid PDF");
        assert!(pdf_bytes.len() > 1000, "PDF seems too small");
    }

    #[test]
    fn test_markup_in_names_is_inert() {
        let material: Arc<Material> =
            Arc::new(Wallpaper::new("#panic(\"x\") *bold* [Обои] \\", 990.0).unwrap().into());
        let results = vec![CalculationResult::new(material, 12.0, 3, 2970.0, 10.0).unwrap()];
        let report = Report::new(&results, "$").unwrap();

        let pdf = render_report_pdf(&report).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }
}
