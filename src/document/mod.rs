//! In-memory tabular document
//!
//! A [`Document`] is what the exporter fills and the importer reads: document
//! properties plus sheets of cells addressed by column letters and 1-based
//! rows (`"B3"`). File formats are handled by the `writer` and `reader`
//! modules.

mod output_type;

pub use output_type::OutputType;

use std::collections::BTreeMap;

use crate::error::{PortationError, PortationResult};
use crate::types::Value;

/// Descriptive properties carried by a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentProperties {
    pub creator: String,
    pub last_modified_by: String,
    pub title: String,
    pub subject: String,
    pub description: String,
    pub keywords: String,
    pub category: String,
    pub company: String,
}

impl DocumentProperties {
    pub fn set_creator(&mut self, creator: impl Into<String>) -> &mut Self {
        self.creator = creator.into();
        self
    }

    pub fn set_last_modified_by(&mut self, user: impl Into<String>) -> &mut Self {
        self.last_modified_by = user.into();
        self
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = title.into();
        self
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) -> &mut Self {
        self.subject = subject.into();
        self
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    pub fn set_keywords(&mut self, keywords: impl Into<String>) -> &mut Self {
        self.keywords = keywords.into();
        self
    }

    pub fn set_category(&mut self, category: impl Into<String>) -> &mut Self {
        self.category = category.into();
        self
    }

    pub fn set_company(&mut self, company: impl Into<String>) -> &mut Self {
        self.company = company.into();
        self
    }
}

/// One sheet of cells. Rows and columns are zero-based internally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    title: String,
    cells: BTreeMap<(u32, u32), Value>,
}

impl Sheet {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            cells: BTreeMap::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Set a cell by coordinate (`"A1"`)
    pub fn set_cell_value(&mut self, coordinate: &str, value: impl Into<Value>) -> PortationResult<()> {
        let (row, col) = parse_coordinate(coordinate)?;
        self.set(row, col, value.into());
        Ok(())
    }

    /// Cell by coordinate; missing cells read as `Value::Null`
    pub fn cell(&self, coordinate: &str) -> PortationResult<&Value> {
        let (row, col) = parse_coordinate(coordinate)?;
        Ok(self.get(row, col))
    }

    pub fn set(&mut self, row: u32, col: u32, value: Value) {
        if value == Value::Null {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), value);
        }
    }

    pub fn get(&self, row: u32, col: u32) -> &Value {
        static NULL: Value = Value::Null;
        self.cells.get(&(row, col)).unwrap_or(&NULL)
    }

    /// Number of rows up to the last one holding data
    pub fn row_count(&self) -> u32 {
        self.cells.keys().map(|(row, _)| row.saturating_add(1)).max().unwrap_or(0)
    }

    /// Number of columns up to the last one holding data
    pub fn column_count(&self) -> u32 {
        self.cells.keys().map(|(_, col)| col.saturating_add(1)).max().unwrap_or(0)
    }

    /// 1-based number of the last row holding data (0 for an empty sheet)
    pub fn highest_data_row(&self) -> u32 {
        self.row_count()
    }

    /// Letter of the last column holding data
    pub fn highest_data_column(&self) -> Option<String> {
        match self.column_count() {
            0 => None,
            n => Some(column_letter(n - 1)),
        }
    }

    /// Rectangular copy of the data, padded with `Value::Null`
    pub fn rows(&self) -> Vec<Vec<Value>> {
        let width = self.column_count();
        (0..self.row_count())
            .map(|row| (0..width).map(|col| self.get(row, col).clone()).collect())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A set of sheets; the first one is the active sheet
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    properties: DocumentProperties,
    sheets: Vec<Sheet>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// New document with one empty sheet
    pub fn new() -> Self {
        Self {
            properties: DocumentProperties::default(),
            sheets: vec![Sheet::new("Worksheet")],
        }
    }

    pub fn from_sheet(sheet: Sheet) -> Self {
        Self {
            properties: DocumentProperties::default(),
            sheets: vec![sheet],
        }
    }

    pub fn properties(&self) -> &DocumentProperties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut DocumentProperties {
        &mut self.properties
    }

    pub fn set_properties(&mut self, properties: DocumentProperties) {
        self.properties = properties;
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn active_sheet(&self) -> &Sheet {
        &self.sheets[0]
    }

    pub fn active_sheet_mut(&mut self) -> &mut Sheet {
        &mut self.sheets[0]
    }
}

/// Convert a zero-based column index to letters (0 → A, 25 → Z, 26 → AA)
pub fn column_letter(index: u32) -> String {
    let mut result = String::new();
    let mut idx = index;

    loop {
        let remainder = idx % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }

    result
}

/// Convert column letters to a zero-based index (A → 0, AA → 26)
pub fn column_index(letters: &str) -> PortationResult<u32> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(PortationError::invalid(format!(
            "Invalid column letters '{}'",
            letters
        )));
    }
    let mut index: u32 = 0;
    for c in letters.chars() {
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        index = index
            .checked_mul(26)
            .and_then(|i| i.checked_add(digit))
            .ok_or_else(|| PortationError::out_of_bounds(format!("Column '{}' is too far", letters)))?;
    }
    Ok(index - 1)
}

/// Parse `"B3"` into zero-based `(row, col)`
pub fn parse_coordinate(coordinate: &str) -> PortationResult<(u32, u32)> {
    let split = coordinate
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| PortationError::invalid(format!("Invalid cell coordinate '{}'", coordinate)))?;
    let (letters, digits) = coordinate.split_at(split);
    let col = column_index(letters)?;
    let row: u32 = digits
        .parse()
        .map_err(|_| PortationError::invalid(format!("Invalid cell coordinate '{}'", coordinate)))?;
    if row == 0 {
        return Err(PortationError::invalid(format!(
            "Invalid cell coordinate '{}': rows start at 1",
            coordinate
        )));
    }
    Ok((row - 1, col))
}
