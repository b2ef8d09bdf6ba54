//! Column descriptors and the option merger

use serde_yaml::{Mapping, Value as YamlValue};
use std::str::FromStr;

use crate::error::{PortationError, PortationResult};
use crate::types::{Portation, Position, ValueType};

/// Date pattern used when a date column declares none
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Merged metadata for one column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnOptions {
    pub label: String,
    pub visible: bool,
    pub position: Position,
    pub getter: String,
    pub setter: String,
    pub value_type: ValueType,
    pub date_format: String,
    pub object_property: String,
}

impl Default for ColumnOptions {
    fn default() -> Self {
        Self {
            label: String::new(),
            visible: true,
            position: Position::Auto,
            getter: String::new(),
            setter: String::new(),
            value_type: ValueType::Unset,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            object_property: String::new(),
        }
    }
}

impl ColumnOptions {
    /// Header text: the label, or the key when no label was declared
    pub fn effective_label<'a>(&'a self, key: &'a str) -> &'a str {
        if self.label.is_empty() {
            key
        } else {
            &self.label
        }
    }

    /// Overwrite every field the annotation declares
    pub fn merge(&mut self, annotation: &Annotation) {
        if let Some(label) = &annotation.label {
            self.label = label.clone();
        }
        if let Some(visible) = annotation.visible {
            self.visible = visible;
        }
        if let Some(position) = annotation.position {
            self.position = position;
        }
        if let Some(getter) = &annotation.getter {
            self.getter = getter.clone();
        }
        if let Some(setter) = &annotation.setter {
            self.setter = setter.clone();
        }
        if let Some(value_type) = annotation.value_type {
            self.value_type = value_type;
        }
        if let Some(date_format) = &annotation.date_format {
            self.date_format = date_format.clone();
        }
        if let Some(object_property) = &annotation.object_property {
            self.object_property = object_property.clone();
        }
    }

    /// Set a single option by its name
    pub fn set(&mut self, option: ColumnOption, value: &YamlValue) -> PortationResult<()> {
        let name = option.name();
        match option {
            ColumnOption::Label => self.label = yaml_string(name, value)?,
            ColumnOption::Visible => self.visible = yaml_bool(name, value)?,
            ColumnOption::Position => self.position = yaml_position(value)?,
            ColumnOption::Getter => self.getter = yaml_string(name, value)?,
            ColumnOption::Setter => self.setter = yaml_string(name, value)?,
            ColumnOption::ValueType => self.value_type = yaml_string(name, value)?.parse()?,
            ColumnOption::DateFormat => self.date_format = yaml_string(name, value)?,
            ColumnOption::ObjectProperty => self.object_property = yaml_string(name, value)?,
        }
        Ok(())
    }
}

/// Recognized option keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOption {
    Label,
    Visible,
    Position,
    Getter,
    Setter,
    ValueType,
    DateFormat,
    ObjectProperty,
}

impl ColumnOption {
    pub const ALL: [ColumnOption; 8] = [
        ColumnOption::Label,
        ColumnOption::Visible,
        ColumnOption::Position,
        ColumnOption::Getter,
        ColumnOption::Setter,
        ColumnOption::ValueType,
        ColumnOption::DateFormat,
        ColumnOption::ObjectProperty,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ColumnOption::Label => "label",
            ColumnOption::Visible => "visible",
            ColumnOption::Position => "position",
            ColumnOption::Getter => "getter",
            ColumnOption::Setter => "setter",
            ColumnOption::ValueType => "valueType",
            ColumnOption::DateFormat => "dateFormat",
            ColumnOption::ObjectProperty => "objectProperty",
        }
    }

    /// Option key lookup accepting camelCase and snake_case spellings
    pub fn lookup(key: &str) -> Option<ColumnOption> {
        let normalized: String = key.chars().filter(|c| *c != '_').collect();
        Self::ALL
            .into_iter()
            .find(|opt| opt.name().eq_ignore_ascii_case(&normalized))
    }
}

impl FromStr for ColumnOption {
    type Err = PortationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s)
            .ok_or_else(|| PortationError::out_of_bounds(format!("This option does not exist: '{}'", s)))
    }
}

/// Normalize a loose option mapping against the defaults.
///
/// Unknown keys are discarded; recognized keys with a value of the wrong
/// shape are rejected.
pub fn format_options(raw: &Mapping) -> PortationResult<ColumnOptions> {
    let mut options = ColumnOptions::default();
    for (key, value) in raw {
        let Some(key) = key.as_str() else { continue };
        if let Some(option) = ColumnOption::lookup(key) {
            options.set(option, value)?;
        }
    }
    Ok(options)
}

/// Member-level declaration; every unset field keeps the current value
/// when merged into a [`ColumnOptions`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    pub label: Option<String>,
    pub visible: Option<bool>,
    pub position: Option<Position>,
    pub getter: Option<String>,
    pub setter: Option<String>,
    pub value_type: Option<ValueType>,
    pub date_format: Option<String>,
    pub object_property: Option<String>,
    pub portations: Portation,
}

impl Annotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn position(mut self, index: u32) -> Self {
        self.position = Some(Position::Index(index));
        self
    }

    pub fn auto_position(mut self) -> Self {
        self.position = Some(Position::Auto);
        self
    }

    pub fn getter(mut self, getter: impl Into<String>) -> Self {
        self.getter = Some(getter.into());
        self
    }

    pub fn setter(mut self, setter: impl Into<String>) -> Self {
        self.setter = Some(setter.into());
        self
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    pub fn object_property(mut self, property: impl Into<String>) -> Self {
        self.object_property = Some(property.into());
        self
    }

    pub fn portations(mut self, portations: Portation) -> Self {
        self.portations = portations;
        self
    }

    /// Build an annotation from a YAML mapping, as found in schema files
    pub fn from_mapping(raw: &Mapping) -> PortationResult<Self> {
        let mut annotation = Annotation::new();
        for (key, value) in raw {
            let Some(key) = key.as_str() else { continue };
            if key.eq_ignore_ascii_case("portations") {
                annotation.portations = yaml_string(key, value)?.parse()?;
                continue;
            }
            let Some(option) = ColumnOption::lookup(key) else {
                continue;
            };
            let name = option.name();
            match option {
                ColumnOption::Label => annotation.label = Some(yaml_string(name, value)?),
                ColumnOption::Visible => annotation.visible = Some(yaml_bool(name, value)?),
                ColumnOption::Position => annotation.position = Some(yaml_position(value)?),
                ColumnOption::Getter => annotation.getter = Some(yaml_string(name, value)?),
                ColumnOption::Setter => annotation.setter = Some(yaml_string(name, value)?),
                ColumnOption::ValueType => {
                    annotation.value_type = Some(yaml_string(name, value)?.parse()?)
                }
                ColumnOption::DateFormat => annotation.date_format = Some(yaml_string(name, value)?),
                ColumnOption::ObjectProperty => {
                    annotation.object_property = Some(yaml_string(name, value)?)
                }
            }
        }
        Ok(annotation)
    }
}

fn yaml_string(name: &str, value: &YamlValue) -> PortationResult<String> {
    match value {
        YamlValue::String(s) => Ok(s.clone()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Null => Ok(String::new()),
        _ => Err(PortationError::invalid(format!(
            "Option '{}' expects a string",
            name
        ))),
    }
}

fn yaml_bool(name: &str, value: &YamlValue) -> PortationResult<bool> {
    match value {
        YamlValue::Bool(b) => Ok(*b),
        YamlValue::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            _ => Err(PortationError::invalid(format!(
                "Option '{}' expects a boolean, got '{}'",
                name, s
            ))),
        },
        YamlValue::Number(n) => Ok(n.as_i64().map(|i| i != 0).unwrap_or(false)),
        _ => Err(PortationError::invalid(format!(
            "Option '{}' expects a boolean",
            name
        ))),
    }
}

fn yaml_position(value: &YamlValue) -> PortationResult<Position> {
    match value {
        YamlValue::Number(n) => match n.as_u64() {
            Some(i) => Position::index(u32::try_from(i).unwrap_or(u32::MAX)),
            None => Err(PortationError::invalid(format!("Invalid column position '{}'", n))),
        },
        YamlValue::String(s) => s.parse(),
        YamlValue::Null => Ok(Position::Auto),
        _ => Err(PortationError::invalid(
            "Option 'position' expects \"auto\" or an index",
        )),
    }
}
