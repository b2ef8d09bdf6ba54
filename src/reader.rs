//! Document readers: CSV through `csv`, workbooks through `calamine`

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::debug;

use crate::document::{Document, OutputType, Sheet};
use crate::error::{PortationError, PortationResult};
use crate::types::Value;
use crate::writer::delimiter_byte;

/// Load a file into a [`Document`] holding its first sheet.
///
/// `delimiter` only applies to CSV; an empty string means comma.
pub fn read_document(path: &Path, input_type: OutputType, delimiter: &str) -> PortationResult<Document> {
    match input_type {
        OutputType::Csv => read_csv(path, delimiter),
        OutputType::Excel5 | OutputType::Excel2007 | OutputType::OpenDocument => read_workbook(path),
        OutputType::Html | OutputType::Xml | OutputType::Pdf => Err(PortationError::Unsupported(
            format!("No reader available for the {} format", input_type),
        )),
    }
}

fn read_csv(path: &Path, delimiter: &str) -> PortationResult<Document> {
    let delimiter = if delimiter.is_empty() {
        b','
    } else {
        delimiter_byte(delimiter)?
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)?;

    let mut sheet = Sheet::new(
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        for (col, field) in record.iter().enumerate() {
            if !field.is_empty() {
                sheet.set(row as u32, col as u32, Value::Text(field.to_string()));
            }
        }
    }

    debug!(path = %path.display(), rows = sheet.row_count(), "Read CSV file");
    Ok(Document::from_sheet(sheet))
}

fn read_workbook(path: &Path) -> PortationResult<Document> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| PortationError::Spreadsheet(format!("{} contains no sheets", path.display())))?;

    let range = workbook.worksheet_range(&sheet_name)?;
    let (row_offset, col_offset) = range.start().unwrap_or((0, 0));

    let mut sheet = Sheet::new(&sheet_name);
    for (row, col, cell) in range.cells() {
        let value = cell_value(cell);
        if value != Value::Null {
            sheet.set(row as u32 + row_offset, col as u32 + col_offset, value);
        }
    }

    debug!(
        path = %path.display(),
        sheet = %sheet_name,
        rows = sheet.row_count(),
        "Read workbook"
    );
    Ok(Document::from_sheet(sheet))
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::Text(s.clone()),
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Bool(*b),
        other => Value::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_csv_with_delimiter() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.csv");
        fs::write(&path, "Nom;Âge\nDoe;54\nSmith\n").unwrap();

        let document = read_document(&path, OutputType::Csv, ";").unwrap();
        let sheet = document.active_sheet();
        assert_eq!(sheet.title(), "people");
        assert_eq!(sheet.cell("B2").unwrap(), &Value::from("54"));
        assert_eq!(sheet.cell("B3").unwrap(), &Value::Null);
        assert_eq!(sheet.highest_data_row(), 3);
    }

    #[test]
    fn test_unsupported_input() {
        let err = read_document(Path::new("out.pdf"), OutputType::Pdf, "").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Unsupported);
    }

    #[test]
    fn test_calamine_cells() {
        assert_eq!(cell_value(&Data::Empty), Value::Null);
        assert_eq!(cell_value(&Data::Float(1.5)), Value::Float(1.5));
        assert_eq!(cell_value(&Data::String("x".into())), Value::from("x"));
    }
}
