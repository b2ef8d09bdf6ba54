use std::fmt;
use std::str::FromStr;

use crate::error::PortationError;

/// Spreadsheet file formats, named after the writer types they select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputType {
    Csv,
    Excel5,
    Excel2007,
    Xml,
    Html,
    OpenDocument,
    Pdf,
}

impl OutputType {
    pub const ALL: [OutputType; 7] = [
        OutputType::Csv,
        OutputType::Excel5,
        OutputType::Excel2007,
        OutputType::Xml,
        OutputType::Html,
        OutputType::OpenDocument,
        OutputType::Pdf,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OutputType::Csv => "CSV",
            OutputType::Excel5 => "Excel5",
            OutputType::Excel2007 => "Excel2007",
            OutputType::Xml => "XML",
            OutputType::Html => "HTML",
            OutputType::OpenDocument => "OpenDocument",
            OutputType::Pdf => "PDF",
        }
    }

    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputType::Csv => "csv",
            OutputType::Excel5 => "xls",
            OutputType::Excel2007 => "xlsx",
            OutputType::Xml => "xml",
            OutputType::Html => "html",
            OutputType::OpenDocument => "ods",
            OutputType::Pdf => "pdf",
        }
    }

    /// Format for an extension, case-insensitive, with or without the dot
    pub fn from_extension(extension: &str) -> Option<OutputType> {
        let extension = extension.trim_start_matches('.');
        Self::ALL
            .into_iter()
            .find(|t| t.extension().eq_ignore_ascii_case(extension))
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputType {
    type Err = PortationError;

    /// Accepts a type name (`Excel2007`) or an extension (`xlsx`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .or_else(|| Self::from_extension(s))
            .ok_or_else(|| PortationError::invalid(format!("This output type is not valid: '{}'", s)))
    }
}
