//! YAML schema files declaring record classes

use serde::Deserialize;
use serde_yaml::Mapping;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::{ClassBuilder, ClassRegistry, EntityPortation};
use crate::entity::Record;
use crate::error::PortationResult;
use crate::naming::ucfirst;
use crate::options::Annotation;

/// Root of a schema file
///
/// ```yaml
/// classes:
///   - name: Person
///     portation: { sheet_title: People, fallback_value: "N/A" }
///     fields:
///       - name: id
///         annotation: { label: Identifiant, position: 0 }
///       - name: firstname
///         public: false
/// boolean_labels: ["no", "yes"]
/// translations:
///   "yes": "oui"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub classes: Vec<ClassConfig>,
    #[serde(default, alias = "booleanLabels")]
    pub boolean_labels: Option<Vec<String>>,
    #[serde(default)]
    pub translations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassConfig {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub portation: Option<PortationConfig>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortationConfig {
    #[serde(default, alias = "sheetTitle")]
    pub sheet_title: String,
    #[serde(default, alias = "fallBackValue", alias = "fallbackValue")]
    pub fallback_value: String,
    #[serde(default, alias = "csvDelimiter")]
    pub csv_delimiter: String,
}

/// A record field. Public fields are plain properties; non-public fields
/// are only reachable through generated `get<Name>`/`set<Name>` methods.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(default = "default_public")]
    pub public: bool,
    #[serde(default)]
    pub annotation: Option<Mapping>,
}

fn default_public() -> bool {
    true
}

impl SchemaConfig {
    pub fn from_file(path: &Path) -> PortationResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(yaml: &str) -> PortationResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Build a registry of [`Record`] classes
    pub fn to_registry(&self) -> PortationResult<ClassRegistry> {
        let mut registry = ClassRegistry::new();
        for class in &self.classes {
            let mut builder = ClassBuilder::<Record>::new(&class.name);
            if let Some(parent) = &class.parent {
                builder = builder.extends(parent);
            }
            if let Some(portation) = &class.portation {
                builder = builder.portation(
                    EntityPortation::new()
                        .sheet_title(&portation.sheet_title)
                        .fallback_value(&portation.fallback_value)
                        .csv_delimiter(&portation.csv_delimiter),
                );
            }

            for field in &class.fields {
                builder = Self::declare_field(builder, field)?;
            }

            registry.register(builder.build());
        }
        Ok(registry)
    }

    fn declare_field(
        builder: ClassBuilder<Record>,
        field: &FieldConfig,
    ) -> PortationResult<ClassBuilder<Record>> {
        let annotation = field
            .annotation
            .as_ref()
            .map(Annotation::from_mapping)
            .transpose()?;

        let read_name = field.name.clone();
        let write_name = field.name.clone();

        let builder = if field.public {
            builder.property(
                &field.name,
                move |r: &Record| r.get(&read_name),
                move |r: &mut Record, v| r.set(write_name.clone(), v),
            )
        } else {
            builder.private_property(&field.name)
        };
        let builder = match annotation {
            Some(annotation) => builder.annotate(annotation),
            None => builder,
        };
        if field.public {
            return Ok(builder);
        }

        let read_name = field.name.clone();
        let write_name = field.name.clone();
        Ok(builder
            .getter(format!("get{}", ucfirst(&field.name)), move |r: &Record| {
                r.get(&read_name)
            })
            .setter(
                format!("set{}", ucfirst(&field.name)),
                move |r: &mut Record, v| r.set(write_name.clone(), v),
            ))
    }
}
