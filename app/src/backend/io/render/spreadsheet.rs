use std::borrow::Cow;

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::backend::domain::models::export::ExportError;
use shared::{ReportCell, ReportTable, NO_RECORDS};

fn xlsx_err(e: XlsxError) -> ExportError {
    ExportError::Spreadsheet(e.to_string())
}

/// Rows written under the header; an empty report gets the marker row
fn sheet_rows(table: &ReportTable) -> Cow<'_, [Vec<ReportCell>]> {
    if table.is_empty() {
        Cow::Owned(vec![vec![ReportCell::Text(NO_RECORDS.to_string())]])
    } else {
        Cow::Borrowed(&table.rows)
    }
}

/// Encode a report as a one-sheet workbook with a bold header row
pub fn report_to_xlsx(table: &ReportTable) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let money = Format::new().set_num_format("#,##0");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(table.kind.label()).map_err(xlsx_err)?;

    for (col, name) in table.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, name, &header)
            .map_err(xlsx_err)?;
        worksheet
            .set_column_width(col as u16, (name.len() as f64 + 4.0).max(12.0))
            .map_err(xlsx_err)?;
    }

    for (i, row) in sheet_rows(table).iter().enumerate() {
        let r = (i + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let c = c as u16;
            match cell {
                ReportCell::Text(s) => {
                    worksheet.write_string(r, c, s).map_err(xlsx_err)?;
                }
                ReportCell::Integer(n) => {
                    worksheet.write_number(r, c, *n as f64).map_err(xlsx_err)?;
                }
                ReportCell::Money(v) => {
                    worksheet
                        .write_number_with_format(r, c, *v, &money)
                        .map_err(xlsx_err)?;
                }
                ReportCell::Empty => {}
            }
        }
    }

    workbook.save_to_buffer().map_err(xlsx_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ReportKind;

    #[test]
    fn test_workbook_is_a_zip_container() {
        let table = ReportTable::new(
            ReportKind::Animals,
            vec![vec![
                ReportCell::Integer(1),
                ReportCell::Text("Luna".to_string()),
                ReportCell::Text("Dog".to_string()),
                ReportCell::Empty,
                ReportCell::Integer(14),
                ReportCell::Text("2024-01-02".to_string()),
            ]],
        );

        let bytes = report_to_xlsx(&table).expect("xlsx");
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_empty_report_writes_marker_row() {
        let table = ReportTable::new(ReportKind::AnimalTypes, Vec::new());
        assert_eq!(
            sheet_rows(&table).as_ref(),
            &[vec![ReportCell::Text(NO_RECORDS.to_string())]]
        );

        let bytes = report_to_xlsx(&table).expect("xlsx");
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_filled_report_writes_rows_unchanged() {
        let rows = vec![vec![ReportCell::Integer(4), ReportCell::Text("Cat".to_string())]];
        let table = ReportTable::new(ReportKind::AnimalTypes, rows.clone());
        assert_eq!(sheet_rows(&table).as_ref(), rows.as_slice());
    }
}
