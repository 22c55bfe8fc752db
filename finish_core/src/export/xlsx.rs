//! XLSX spreadsheet report.
//!
//! Layout: title (row 1), date (row 2), header (row 4), one row per result,
//! and a totals row after a blank line when more than one result is exported.

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use super::Report;
use crate::errors::{CalcError, CalcResult};

const SHEET_NAME: &str = "Material calculation";
const HEADERS: [&str; 7] = ["№", "Material", "Unit", "Area (m²)", "Reserve (%)", "Quantity", "Cost"];
const COLUMN_WIDTHS: [f64; 7] = [6.0, 30.0, 10.0, 12.0, 12.0, 12.0, 16.0];

const HEADER_ROW: u32 = 3;
const FIRST_DATA_ROW: u32 = 4;

/// Render a report to XLSX bytes.
pub(crate) fn render_report_xlsx(report: &Report<'_>) -> CalcResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    write_report_sheet(sheet, report).map_err(xlsx_error)?;

    workbook.save_to_buffer().map_err(xlsx_error)
}

fn write_report_sheet(sheet: &mut Worksheet, report: &Report<'_>) -> Result<(), XlsxError> {
    sheet.set_name(SHEET_NAME)?;

    let title_format = Format::new()
        .set_bold()
        .set_font_size(14)
        .set_align(FormatAlign::Center);
    let date_format = Format::new().set_align(FormatAlign::Right);
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x4472C4))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);
    let cell_format = Format::new().set_border(FormatBorder::Thin);
    let area_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_num_format("0.00");
    let money_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_num_format(money_num_format(report.currency));
    let total_label_format = Format::new().set_bold();
    let total_area_format = Format::new().set_bold().set_num_format("0.00");
    let total_money_format = Format::new()
        .set_bold()
        .set_num_format(money_num_format(report.currency));

    let last_col = (HEADERS.len() - 1) as u16;
    sheet.merge_range(
        0,
        0,
        0,
        last_col,
        "FINISHING MATERIALS CALCULATION REPORT",
        &title_format,
    )?;
    sheet.merge_range(
        1,
        0,
        1,
        last_col,
        &format!("Date: {}", report.generated_at.format("%d.%m.%Y %H:%M")),
        &date_format,
    )?;

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(HEADER_ROW, col as u16, *header, &header_format)?;
    }

    let mut row = FIRST_DATA_ROW;
    for (idx, result) in report.results.iter().enumerate() {
        sheet.write_number_with_format(row, 0, (idx + 1) as f64, &cell_format)?;
        sheet.write_string_with_format(row, 1, result.material().name(), &cell_format)?;
        sheet.write_string_with_format(row, 2, result.unit_label(), &cell_format)?;
        sheet.write_number_with_format(row, 3, result.area(), &area_format)?;
        sheet.write_number_with_format(row, 4, result.reserve_percent(), &cell_format)?;
        sheet.write_number_with_format(row, 5, result.units_needed() as f64, &cell_format)?;
        sheet.write_number_with_format(row, 6, result.total_cost(), &money_format)?;
        row += 1;
    }

    if report.has_summary() {
        row += 1;
        sheet.write_string_with_format(row, 0, "TOTAL:", &total_label_format)?;
        sheet.write_number_with_format(row, 3, report.summary.total_area, &total_area_format)?;
        sheet.write_number_with_format(row, 6, report.summary.total_cost, &total_money_format)?;
    }

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }

    Ok(())
}

/// `#,##0.00 "₽"`; quotes inside the symbol are doubled.
fn money_num_format(currency: &str) -> String {
    format!("#,##0.00 \"{}\"", currency.replace('"', "\"\""))
}

fn xlsx_error(e: XlsxError) -> CalcError {
    CalcError::export("xlsx", e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_results;

    #[test]
    fn test_xlsx_generation() {
        let results = sample_results();
        let report = Report::new(&results, "₽").unwrap();

        let bytes = render_report_xlsx(&report).unwrap();
        // XLSX is a zip container
        assert!(bytes.starts_with(b"PK"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn test_single_result() {
        let results = sample_results();
        let report = Report::new(&results[..1], "€").unwrap();
        assert!(!report.has_summary());
        assert!(render_report_xlsx(&report).unwrap().starts_with(b"PK"));
    }

    #[test]
    fn test_money_format() {
        assert_eq!(money_num_format("₽"), "#,##0.00 \"₽\"");
        assert_eq!(money_num_format("a\"b"), "#,##0.00 \"a\"\"b\"");
    }
}
