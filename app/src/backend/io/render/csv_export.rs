use csv::WriterBuilder;

use crate::backend::domain::models::export::ExportError;
use shared::{ReportCell, ReportTable, NO_RECORDS};

/// UTF-8 byte-order mark so spreadsheet apps pick the right encoding
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn cell_text(cell: &ReportCell) -> String {
    match cell {
        // Plain number, no thousands separators
        ReportCell::Money(v) => v.to_string(),
        other => other.to_string(),
    }
}

/// Encode a report as BOM-prefixed CSV, columns in schema order
pub fn report_to_csv(table: &ReportTable) -> Result<Vec<u8>, ExportError> {
    // Flexible so the single-cell marker row is accepted after the header
    let mut csv_writer = WriterBuilder::new()
        .flexible(true)
        .from_writer(UTF8_BOM.to_vec());

    csv_writer
        .write_record(&table.columns)
        .map_err(|e| ExportError::Csv(e.to_string()))?;

    if table.is_empty() {
        csv_writer
            .write_record([NO_RECORDS])
            .map_err(|e| ExportError::Csv(e.to_string()))?;
    }
    for row in &table.rows {
        csv_writer
            .write_record(row.iter().map(cell_text))
            .map_err(|e| ExportError::Csv(e.to_string()))?;
    }

    csv_writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.error().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ReportKind;

    #[test]
    fn test_csv_starts_with_bom_and_keeps_column_order() {
        let table = ReportTable::new(
            ReportKind::Donations,
            vec![vec![
                ReportCell::Integer(7),
                ReportCell::Text("2024-06-01".to_string()),
                ReportCell::Text("Peña, Ana".to_string()),
                ReportCell::Empty,
                ReportCell::Money(1500.0),
                ReportCell::Text("Cash".to_string()),
            ]],
        );

        let bytes = report_to_csv(&table).expect("csv");
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID,Date,Sponsor,Animal,Amount,Method");
        assert_eq!(lines[1], "7,2024-06-01,\"Peña, Ana\",,1500,Cash");
    }

    #[test]
    fn test_empty_report_writes_marker() {
        let table = ReportTable::new(ReportKind::AnimalTypes, Vec::new());
        let bytes = report_to_csv(&table).expect("csv");
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).expect("utf8");

        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["ID,Name", NO_RECORDS]);
    }
}
