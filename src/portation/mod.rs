//! Export and import engines
//!
//! Both engines follow the same setup: the class metadata found on the
//! entity class (or its nearest ancestor) provides the sheet title, the
//! fallback value and the CSV delimiter, and switches the column extraction
//! to annotated members only.

mod exporter;
mod importer;

pub use exporter::Exporter;
pub use importer::{Importer, NotFoundCell};

use regex::Regex;
use std::path::Path;

use crate::document::OutputType;
use crate::error::{PortationError, PortationResult};
use crate::registry::EntityPortation;

const EXTENSION_PATTERN: &str = r"\.[A-Za-z]+$";

/// Run settings shared by the exporter and the importer
#[derive(Debug, Clone, Default)]
pub(crate) struct Settings {
    pub sheet_title: String,
    pub fallback_value: String,
    pub csv_delimiter: String,
    pub annotate: bool,
    /// User choice that wins over the metadata-driven `annotate`
    pub annotate_override: Option<bool>,
}

impl Settings {
    /// Take every non-empty metadata field; annotate mode follows the
    /// presence of metadata
    pub fn apply(&mut self, metadata: Option<&EntityPortation>) {
        if let Some(meta) = metadata {
            if !meta.sheet_title.is_empty() {
                self.sheet_title = meta.sheet_title.clone();
            }
            if !meta.fallback_value.is_empty() {
                self.fallback_value = meta.fallback_value.clone();
            }
            if !meta.csv_delimiter.is_empty() {
                self.csv_delimiter = meta.csv_delimiter.clone();
            }
        }
        self.annotate = metadata.is_some();
    }

    pub fn annotate_only(&self) -> bool {
        self.annotate_override.unwrap_or(self.annotate)
    }
}

/// Whether a file name already ends with an extension (`.csv`, `.xlsx`)
pub(crate) fn has_extension(name: &str) -> PortationResult<bool> {
    let pattern = Regex::new(EXTENSION_PATTERN).map_err(|e| PortationError::invalid(e.to_string()))?;
    Ok(pattern.is_match(name))
}

/// Append the extension of `output_type` when `name` has none
pub(crate) fn with_extension(name: &str, output_type: OutputType) -> PortationResult<String> {
    if has_extension(name)? {
        Ok(name.to_string())
    } else {
        Ok(format!("{}.{}", name, output_type.extension()))
    }
}

/// File type guessed from the extension of a path
pub(crate) fn file_type(path: &Path) -> PortationResult<OutputType> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    OutputType::from_extension(&extension).ok_or_else(|| {
        PortationError::invalid(format!(
            "Couldn't guess the file type from the extension '{}'",
            extension
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_inference() {
        assert_eq!(with_extension("out/report", OutputType::Csv).unwrap(), "out/report.csv");
        assert_eq!(with_extension("report.xlsx", OutputType::Csv).unwrap(), "report.xlsx");
        assert_eq!(
            with_extension("report.2024", OutputType::Excel2007).unwrap(),
            "report.2024.xlsx"
        );
    }

    #[test]
    fn test_file_type_from_path() {
        assert_eq!(file_type(Path::new("a/people.ODS")).unwrap(), OutputType::OpenDocument);
        assert!(file_type(Path::new("people.txt")).is_err());
        assert!(file_type(Path::new("people")).is_err());
    }

    #[test]
    fn test_metadata_settings() {
        let mut settings = Settings {
            sheet_title: "Default".to_string(),
            ..Default::default()
        };
        settings.apply(Some(&EntityPortation::new().fallback_value("N/A")));
        assert_eq!(settings.sheet_title, "Default");
        assert_eq!(settings.fallback_value, "N/A");
        assert!(settings.annotate_only());

        settings.annotate_override = Some(false);
        assert!(!settings.annotate_only());

        settings.apply(None);
        assert!(!settings.annotate);
    }
}
