use rust_xlsxwriter::{DocProperties, Workbook, Worksheet};

use super::DocumentWriter;
use crate::document::{Document, DocumentProperties, Sheet};
use crate::error::{PortationError, PortationResult};
use crate::types::Value;

/// Office Open XML workbook writer (`.xlsx`)
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxWriter;

impl DocumentWriter for XlsxWriter {
    fn write(&self, document: &Document) -> PortationResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        workbook.set_properties(&doc_properties(document.properties()));

        for (idx, sheet) in document.sheets().iter().enumerate() {
            let worksheet = workbook.add_worksheet();
            let name = if sheet.title().is_empty() {
                format!("Sheet{}", idx + 1)
            } else {
                sheet.title().to_string()
            };
            worksheet.set_name(&name)?;
            write_sheet(worksheet, sheet)?;
        }

        Ok(workbook.save_to_buffer()?)
    }
}

fn doc_properties(properties: &DocumentProperties) -> DocProperties {
    DocProperties::new()
        .set_author(&properties.creator)
        .set_title(&properties.title)
        .set_subject(&properties.subject)
        .set_comment(&properties.description)
        .set_keywords(&properties.keywords)
        .set_category(&properties.category)
        .set_company(&properties.company)
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> PortationResult<()> {
    for (row_idx, row) in sheet.rows().iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (row, col): (u32, u16) = (cell_index(row_idx, "row")?, cell_index(col_idx, "column")?);
            match value {
                Value::Null => {}
                Value::Bool(b) => {
                    worksheet.write_boolean(row, col, *b)?;
                }
                Value::Int(i) => {
                    worksheet.write_number(row, col, *i as f64)?;
                }
                Value::Float(f) => {
                    worksheet.write_number(row, col, *f)?;
                }
                other => {
                    worksheet.write_string(row, col, other.to_string())?;
                }
            }
        }
    }
    Ok(())
}

fn cell_index<T: TryFrom<usize>>(idx: usize, axis: &str) -> PortationResult<T> {
    T::try_from(idx).map_err(|_| {
        PortationError::OutOfBounds(format!("The {} index {} does not fit in a workbook", axis, idx))
    })
}
