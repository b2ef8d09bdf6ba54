//! Document writers, one per output type

mod delimited;
mod markup;
mod xlsx;

pub use delimited::CsvWriter;
pub(crate) use delimited::delimiter_byte;
pub use markup::{HtmlWriter, XmlWriter};
pub use xlsx::XlsxWriter;

use std::fs;
use std::path::Path;

use crate::document::{Document, OutputType};
use crate::error::{PortationError, PortationResult};

/// Serializes a [`Document`] into the bytes of one file format
pub trait DocumentWriter {
    fn write(&self, document: &Document) -> PortationResult<Vec<u8>>;

    /// Serialize and save to `path`
    fn save(&self, document: &Document, path: &Path) -> PortationResult<()> {
        let bytes = self.write(document)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

/// Writer for an output type. `delimiter` only applies to CSV; an empty
/// string keeps the default comma.
pub fn writer_for(output_type: OutputType, delimiter: &str) -> PortationResult<Box<dyn DocumentWriter>> {
    match output_type {
        OutputType::Csv => {
            let mut writer = CsvWriter::new();
            if !delimiter.is_empty() {
                writer = writer.with_delimiter(delimiter)?;
            }
            Ok(Box::new(writer))
        }
        OutputType::Excel2007 => Ok(Box::new(XlsxWriter)),
        OutputType::Html => Ok(Box::new(HtmlWriter)),
        OutputType::Xml => Ok(Box::new(XmlWriter)),
        OutputType::Excel5 | OutputType::OpenDocument | OutputType::Pdf => {
            Err(PortationError::Unsupported(format!(
                "No writer available for the {} format",
                output_type
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_writer_availability() {
        for output_type in [
            OutputType::Csv,
            OutputType::Excel2007,
            OutputType::Html,
            OutputType::Xml,
        ] {
            assert!(writer_for(output_type, "").is_ok(), "{}", output_type);
        }
        for output_type in [OutputType::Excel5, OutputType::OpenDocument, OutputType::Pdf] {
            let err = writer_for(output_type, "").err().unwrap();
            assert_eq!(err.kind(), ErrorKind::Unsupported);
        }
    }

    #[test]
    fn test_invalid_csv_delimiter() {
        let err = writer_for(OutputType::Csv, ";;").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
