use csv::{Terminator, WriterBuilder};

use super::DocumentWriter;
use crate::document::Document;
use crate::error::{PortationError, PortationResult};

/// Writes the active sheet as delimiter-separated text
#[derive(Debug, Clone, Copy)]
pub struct CsvWriter {
    delimiter: u8,
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The delimiter must be a single ASCII character
    pub fn with_delimiter(mut self, delimiter: &str) -> PortationResult<Self> {
        self.delimiter = delimiter_byte(delimiter)?;
        Ok(self)
    }

    pub fn delimiter(&self) -> char {
        self.delimiter as char
    }
}

impl DocumentWriter for CsvWriter {
    fn write(&self, document: &Document) -> PortationResult<Vec<u8>> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(Vec::new());

        for row in document.active_sheet().rows() {
            writer.write_record(row.iter().map(|value| value.to_string()))?;
        }

        writer
            .into_inner()
            .map_err(|e| PortationError::Io(e.into_error()))
    }
}

pub(crate) fn delimiter_byte(delimiter: &str) -> PortationResult<u8> {
    match delimiter.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(PortationError::invalid(format!(
            "CSV delimiter must be a single ASCII character, got '{}'",
            delimiter
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Sheet;

    fn sample() -> Document {
        let mut sheet = Sheet::new("People");
        sheet.set_cell_value("A1", "Nom").unwrap();
        sheet.set_cell_value("B1", "Ville").unwrap();
        sheet.set_cell_value("A2", "Doe").unwrap();
        sheet.set_cell_value("B2", "Paris; France").unwrap();
        Document::from_sheet(sheet)
    }

    #[test]
    fn test_default_comma() {
        let bytes = CsvWriter::new().write(&sample()).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "Nom,Ville\nDoe,Paris; France\n");
    }

    #[test]
    fn test_delimiter_override_quotes_fields() {
        let writer = CsvWriter::new().with_delimiter(";").unwrap();
        let bytes = writer.write(&sample()).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Nom;Ville\nDoe;\"Paris; France\"\n"
        );
    }

    #[test]
    fn test_delimiter_validation() {
        assert!(delimiter_byte("\t").is_ok());
        assert!(delimiter_byte("").is_err());
        assert!(delimiter_byte("§").is_err());
    }
}
