use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{file_type, Settings};
use crate::convert::ValueConverter;
use crate::document::{column_letter, Document};
use crate::entity::Entity;
use crate::error::PortationResult;
use crate::naming::Conventions;
use crate::options::ColumnOptions;
use crate::reader::read_document;
use crate::registry::ClassRegistry;
use crate::schema::{extract_columns, Schema};
use crate::translate::Translator;
use crate::types::{Portation, Value};

/// A cell that could not be assigned to any member of its entity
#[derive(Debug, Clone, PartialEq)]
pub struct NotFoundCell {
    /// Column letter (`"A"`)
    pub column: String,
    /// 1-based sheet row
    pub row: u32,
    pub value: Value,
}

/// Builds entities from the rows of a spreadsheet.
///
/// Import is lenient: cells that cannot be mapped do not fail the run but
/// are collected in [`Importer::not_found_values`].
pub struct Importer {
    registry: Arc<ClassRegistry>,
    conventions: Conventions,
    converter: ValueConverter,
    settings: Settings,
    class: String,
    columns: Schema,
    not_found: Vec<NotFoundCell>,
}

impl Importer {
    pub fn new(registry: Arc<ClassRegistry>) -> Self {
        Self {
            registry,
            conventions: Conventions::DEFAULT,
            converter: ValueConverter::default(),
            settings: Settings::default(),
            class: String::new(),
            columns: Schema::new(),
            not_found: Vec::new(),
        }
    }

    pub fn with_conventions(mut self, conventions: Conventions) -> Self {
        self.conventions = conventions;
        self.converter = self.converter.with_conventions(conventions);
        self
    }

    pub fn set_translator(&mut self, translator: Arc<dyn Translator>) -> &mut Self {
        self.converter.set_translator(translator);
        self
    }

    /// Value treated as "no data" in cells; class metadata overrides it
    pub fn set_fallback_value(&mut self, value: impl Into<String>) -> &mut Self {
        self.settings.fallback_value = value.into();
        self
    }

    pub fn fallback_value(&self) -> &str {
        &self.settings.fallback_value
    }

    pub fn set_csv_delimiter(&mut self, delimiter: impl Into<String>) -> &mut Self {
        self.settings.csv_delimiter = delimiter.into();
        self
    }

    pub fn csv_delimiter(&self) -> &str {
        &self.settings.csv_delimiter
    }

    pub fn set_annotate(&mut self, annotate: Option<bool>) -> &mut Self {
        self.settings.annotate_override = annotate;
        self
    }

    /// Columns of the last run
    pub fn columns(&self) -> &Schema {
        &self.columns
    }

    pub fn column_options(&self, key: &str) -> PortationResult<&ColumnOptions> {
        self.columns.column_options(key)
    }

    /// Cells of the last run that could not be mapped
    pub fn not_found_values(&self) -> &[NotFoundCell] {
        &self.not_found
    }

    /// Read `path` and build one entity per data row with `make_entity`.
    ///
    /// The file type comes from the extension. Without a header row, columns
    /// are matched by the position layout an export of `class` would use.
    pub fn import_file<E, F>(
        &mut self,
        path: impl AsRef<Path>,
        class: &str,
        first_row_is_header: bool,
        replace_if_exists: bool,
        make_entity: F,
    ) -> PortationResult<Vec<E>>
    where
        E: Entity,
        F: FnMut() -> E,
    {
        let path = path.as_ref();
        let input_type = file_type(path)?;
        self.prepare(class, replace_if_exists)?;

        let document = read_document(path, input_type, &self.settings.csv_delimiter)?;
        let entities = self.entities_from(&document, first_row_is_header, make_entity)?;

        info!(
            path = %path.display(),
            class,
            entities = entities.len(),
            not_found = self.not_found.len(),
            "Import finished"
        );
        Ok(entities)
    }

    /// [`Importer::import_file`] for types that know their class, with a
    /// header row and the default replace policy
    pub fn import<T: Entity + Default>(&mut self, path: impl AsRef<Path>) -> PortationResult<Vec<T>> {
        let class = T::default().class_name().to_string();
        self.import_file(path, &class, true, true, T::default)
    }

    /// Build entities from an already loaded document
    pub fn import_document<E, F>(
        &mut self,
        document: &Document,
        class: &str,
        first_row_is_header: bool,
        replace_if_exists: bool,
        make_entity: F,
    ) -> PortationResult<Vec<E>>
    where
        E: Entity,
        F: FnMut() -> E,
    {
        self.prepare(class, replace_if_exists)?;
        self.entities_from(document, first_row_is_header, make_entity)
    }

    fn prepare(&mut self, class: &str, replace_if_exists: bool) -> PortationResult<()> {
        self.registry.class(class)?;
        self.class = class.to_string();
        self.not_found.clear();

        let metadata = self.registry.entity_metadata(class)?.cloned();
        self.settings.apply(metadata.as_ref());

        self.columns = extract_columns(
            &self.registry,
            class,
            Portation::Import,
            &self.conventions,
            replace_if_exists,
            self.settings.annotate_only(),
        )?;
        Ok(())
    }

    fn entities_from<E, F>(
        &mut self,
        document: &Document,
        first_row_is_header: bool,
        mut make_entity: F,
    ) -> PortationResult<Vec<E>>
    where
        E: Entity,
        F: FnMut() -> E,
    {
        let sheet = document.active_sheet();
        let width = sheet.column_count();

        let keys: Vec<Option<String>> = if first_row_is_header {
            (0..width)
                .map(|col| {
                    let header = sheet.get(0, col);
                    if header.is_blank() {
                        return None;
                    }
                    let label = header.to_string();
                    self.columns
                        .key_for_label(&label, |text| self.converter.translate(text))
                        .map(str::to_string)
                })
                .collect()
        } else {
            let layout = self.columns.layout()?;
            (0..width)
                .map(|col| {
                    layout
                        .iter()
                        .find(|(_, placed)| *placed == col)
                        .map(|(key, _)| key.to_string())
                })
                .collect()
        };
        debug!(class = %self.class, ?keys, "Column keys resolved");

        let first_row = u32::from(first_row_is_header);
        let mut entities = Vec::new();
        for row in first_row..sheet.row_count() {
            let mut entity = make_entity();
            for (col, key) in keys.iter().enumerate() {
                let value = sheet.get(row, col as u32);
                if value.is_blank() || self.is_fallback(value) {
                    continue;
                }

                let assigned = match key {
                    Some(key) => self.assign(&mut entity, key, value.clone()),
                    None => false,
                };
                if !assigned {
                    self.not_found.push(NotFoundCell {
                        column: column_letter(col as u32),
                        row: row + 1,
                        value: value.clone(),
                    });
                }
            }
            entities.push(entity);
        }

        if !self.not_found.is_empty() {
            warn!(count = self.not_found.len(), "Some cells could not be imported");
        }
        Ok(entities)
    }

    fn is_fallback(&self, value: &Value) -> bool {
        let fallback = &self.settings.fallback_value;
        if fallback.is_empty() {
            return false;
        }
        let text = value.to_string();
        text == *fallback || text == self.converter.translate(fallback)
    }

    /// Declared setter, then public property, then probed setter
    fn assign(&self, entity: &mut dyn Entity, key: &str, value: Value) -> bool {
        let class = entity.class_name().to_string();
        let Some(options) = self.columns.get(key) else {
            return false;
        };

        if !options.setter.is_empty() {
            if let Some(setter) = self
                .registry
                .public_method(&class, &options.setter)
                .filter(|m| m.is_setter())
            {
                return setter.write(entity, value);
            }
        }

        if let Some(property) = self
            .registry
            .public_property(&class, key)
            .filter(|p| p.is_writable())
        {
            return property.write(entity, value);
        }

        let probed = self
            .conventions
            .setter_candidates(key)
            .iter()
            .find_map(|candidate| self.registry.public_method(&class, candidate))
            .filter(|m| m.is_setter());
        match probed {
            Some(setter) => setter.write(entity, value),
            None => false,
        }
    }
}
