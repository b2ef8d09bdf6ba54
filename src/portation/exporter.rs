use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::{with_extension, Settings};
use crate::convert::ValueConverter;
use crate::document::{Document, DocumentProperties, OutputType, Sheet};
use crate::entity::Entity;
use crate::error::{PortationError, PortationResult};
use crate::http::DownloadResponse;
use crate::naming::Conventions;
use crate::options::ColumnOptions;
use crate::registry::ClassRegistry;
use crate::schema::{extract_columns, Schema};
use crate::translate::Translator;
use crate::types::Portation;
use crate::writer::writer_for;

/// Converts a list of entities into a spreadsheet document.
///
/// ```
/// use std::sync::Arc;
/// use entity_portation::entity::entity_refs;
/// use entity_portation::{impl_entity, ClassBuilder, ClassRegistry, Exporter};
///
/// #[derive(Default)]
/// struct Person { name: String }
/// impl_entity!(Person, "Person");
///
/// let registry = ClassRegistry::new().with(
///     ClassBuilder::<Person>::new("Person")
///         .property("name", |p| p.name.clone(), |p, v| p.name = v.to_string())
///         .build(),
/// );
/// let people = [Person { name: "Doe".into() }];
///
/// let mut exporter = Exporter::new(Arc::new(registry));
/// exporter.set_entities(entity_refs(&people), None, true).unwrap();
/// let document = exporter.to_document().unwrap();
/// assert_eq!(document.active_sheet().cell("A2").unwrap().to_string(), "Doe");
/// ```
pub struct Exporter<'a> {
    registry: Arc<ClassRegistry>,
    conventions: Conventions,
    converter: ValueConverter,
    settings: Settings,
    properties: DocumentProperties,
    entities: Vec<&'a dyn Entity>,
    same_class: Option<bool>,
    replace_if_exists: bool,
    columns: Schema,
}

impl<'a> Exporter<'a> {
    pub fn new(registry: Arc<ClassRegistry>) -> Self {
        Self {
            registry,
            conventions: Conventions::DEFAULT,
            converter: ValueConverter::default(),
            settings: Settings::default(),
            properties: DocumentProperties::default(),
            entities: Vec::new(),
            same_class: None,
            replace_if_exists: true,
            columns: Schema::new(),
        }
    }

    pub fn with_conventions(mut self, conventions: Conventions) -> Self {
        self.conventions = conventions;
        self.converter = self.converter.with_conventions(conventions);
        self
    }

    /// Register the entities to export and detect their columns.
    ///
    /// `same_class` skips the pairwise class comparison when known.
    /// `replace_if_exists` decides whether a column declared again (by a
    /// subclass, or by a later class of a mixed list) overrides the first
    /// declaration.
    pub fn set_entities(
        &mut self,
        entities: Vec<&'a dyn Entity>,
        same_class: Option<bool>,
        replace_if_exists: bool,
    ) -> PortationResult<()> {
        let Some(first) = entities.first() else {
            return Err(PortationError::invalid("The entity array must not be empty."));
        };
        if !self.has_common_parent(&entities)? {
            return Err(PortationError::invalid("Entities must have a common parent."));
        }

        let metadata = self.registry.entity_metadata(first.class_name())?.cloned();
        self.settings.apply(metadata.as_ref());

        self.entities = entities;
        self.same_class = same_class;
        self.replace_if_exists = replace_if_exists;
        self.columns = self.detect_columns()?;

        if self.columns.is_empty() {
            return Err(PortationError::invalid("Entities have no accessible parameters."));
        }

        debug!(
            entities = self.entities.len(),
            columns = self.columns.len(),
            annotate = self.settings.annotate_only(),
            "Entities registered for export"
        );
        Ok(())
    }

    pub fn entities(&self) -> &[&'a dyn Entity] {
        &self.entities
    }

    pub fn columns(&self) -> &Schema {
        &self.columns
    }

    /// Column options can be changed between `set_entities` and the output
    pub fn columns_mut(&mut self) -> &mut Schema {
        &mut self.columns
    }

    pub fn column_options(&self, key: &str) -> PortationResult<&ColumnOptions> {
        self.columns.column_options(key)
    }

    pub fn sheet_title(&self) -> &str {
        &self.settings.sheet_title
    }

    pub fn set_sheet_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.settings.sheet_title = title.into();
        self
    }

    pub fn fallback_value(&self) -> &str {
        &self.settings.fallback_value
    }

    /// Text written for cells without a value (before translation)
    pub fn set_fallback_value(&mut self, value: impl Into<String>) -> &mut Self {
        self.settings.fallback_value = value.into();
        self
    }

    pub fn csv_delimiter(&self) -> &str {
        &self.settings.csv_delimiter
    }

    pub fn set_csv_delimiter(&mut self, delimiter: impl Into<String>) -> &mut Self {
        self.settings.csv_delimiter = delimiter.into();
        self
    }

    /// Labels for boolean columns, `false` first
    pub fn set_boolean_labels<S: AsRef<str>>(&mut self, labels: &[S]) -> PortationResult<&mut Self> {
        self.converter.set_boolean_labels(labels)?;
        Ok(self)
    }

    pub fn set_translator(&mut self, translator: Arc<dyn Translator>) -> &mut Self {
        self.converter.set_translator(translator);
        self
    }

    /// Force (or, with `None`, stop forcing) annotated-members-only
    /// extraction. Takes effect on the next `set_entities`.
    pub fn set_annotate(&mut self, annotate: Option<bool>) -> &mut Self {
        self.settings.annotate_override = annotate;
        self
    }

    pub fn properties(&self) -> &DocumentProperties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut DocumentProperties {
        &mut self.properties
    }

    pub fn set_properties(&mut self, properties: DocumentProperties) -> &mut Self {
        self.properties = properties;
        self
    }

    /// Build the document: one header row of visible labels, then one row
    /// per entity in input order
    pub fn to_document(&self) -> PortationResult<Document> {
        if self.entities.is_empty() {
            return Err(PortationError::invalid("No entities were set for the export."));
        }

        let layout = self.columns.layout()?;

        let mut sheet = Sheet::new(self.resolve_sheet_title());
        for (key, col) in &layout {
            let options = self.columns.column_options(key)?;
            let label = self.converter.translate(options.effective_label(key));
            sheet.set(0, *col, label.into());
        }

        for (idx, entity) in self.entities.iter().enumerate() {
            let row = idx as u32 + 1;
            for (key, col) in &layout {
                let options = self.columns.column_options(key)?;
                let value = self.cell_value(*entity, key, options)?;
                sheet.set(row, *col, value.into());
            }
        }

        let mut document = Document::from_sheet(sheet);
        document.set_properties(self.properties.clone());
        Ok(document)
    }

    /// Write the document to `output`, adding the type's extension when the
    /// name has none. Returns the path actually written.
    pub fn save_as_file(&self, output_type: OutputType, output: impl AsRef<Path>) -> PortationResult<PathBuf> {
        let output = output.as_ref().to_string_lossy();
        let path = PathBuf::from(with_extension(&output, output_type)?);

        let document = self.to_document()?;
        writer_for(output_type, &self.settings.csv_delimiter)?.save(&document, &path)?;

        info!(path = %path.display(), format = %output_type, rows = self.entities.len(), "Export saved");
        Ok(path)
    }

    /// Serialize the document as a file attachment
    pub fn response(&self, output_type: OutputType, filename: &str) -> PortationResult<DownloadResponse> {
        let filename = with_extension(filename, output_type)?;
        let document = self.to_document()?;
        let body = writer_for(output_type, &self.settings.csv_delimiter)?.write(&document)?;

        info!(filename = %filename, format = %output_type, bytes = body.len(), "Export response ready");
        Ok(DownloadResponse::new(filename, body))
    }

    fn resolve_sheet_title(&self) -> String {
        if !self.settings.sheet_title.is_empty() {
            self.settings.sheet_title.clone()
        } else if !self.properties.title.is_empty() {
            self.properties.title.clone()
        } else {
            "Worksheet".to_string()
        }
    }

    fn has_common_parent(&self, entities: &[&dyn Entity]) -> PortationResult<bool> {
        let root = self.registry.root_of(entities[0].class_name())?;
        for entity in &entities[1..] {
            if self.registry.root_of(entity.class_name())? != root {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn entities_have_same_class(&self) -> bool {
        if let Some(same) = self.same_class {
            return same;
        }
        let class = self.entities[0].class_name();
        self.entities[1..].iter().all(|e| e.class_name() == class)
    }

    fn detect_columns(&self) -> PortationResult<Schema> {
        let annotate = self.settings.annotate_only();
        let extract = |class: &str| {
            extract_columns(
                &self.registry,
                class,
                Portation::Export,
                &self.conventions,
                self.replace_if_exists,
                annotate,
            )
        };

        if self.entities_have_same_class() {
            return extract(self.entities[0].class_name());
        }

        let mut columns = Schema::new();
        let mut seen = HashSet::new();
        for entity in &self.entities {
            let class = entity.class_name();
            if seen.insert(class) {
                columns.merge(extract(class)?, self.replace_if_exists);
            }
        }
        Ok(columns)
    }

    /// Cell text for one entity: declared getter, then public property,
    /// then probed getter, then the fallback value
    fn cell_value(&self, entity: &dyn Entity, key: &str, options: &ColumnOptions) -> PortationResult<String> {
        let class = entity.class_name();

        if !options.getter.is_empty() {
            if let Some(value) = self
                .registry
                .public_method(class, &options.getter)
                .and_then(|getter| getter.read(entity))
            {
                return self.converter.convert(&value, Some(options));
            }
        }

        if let Some(value) = self
            .registry
            .public_property(class, key)
            .and_then(|property| property.read(entity))
            .filter(|value| !value.is_blank())
        {
            return self.converter.convert(&value, Some(options));
        }

        let probed = self
            .conventions
            .getter_candidates(key)
            .iter()
            .find_map(|candidate| self.registry.public_method(class, candidate))
            .filter(|method| method.is_getter())
            .and_then(|getter| getter.read(entity))
            .filter(|value| !value.is_blank());
        if let Some(value) = probed {
            return self.converter.convert(&value, Some(options));
        }

        Ok(self.converter.translate(&self.settings.fallback_value))
    }
}
