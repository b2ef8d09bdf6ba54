//! Recursive conversion of member values to cell text

use chrono::format::{Item, StrftimeItems};
use std::sync::Arc;
use tracing::warn;

use crate::error::{PortationError, PortationResult};
use crate::naming::Conventions;
use crate::options::ColumnOptions;
use crate::translate::{NoopTranslator, Translator};
use crate::types::{ObjectValue, Value, ValueType};

/// Converts entity values to the strings written into cells.
///
/// - objects are unwrapped through the column's `object_property`, their
///   display string, or their field values
/// - lists are converted element-wise and joined with `", "`
/// - boolean columns map truthiness to the configured labels
/// - date columns are formatted with the column's date format
/// - any other text goes through the translator
#[derive(Clone)]
pub struct ValueConverter {
    translator: Arc<dyn Translator>,
    boolean_labels: [String; 2],
    conventions: Conventions,
}

impl Default for ValueConverter {
    fn default() -> Self {
        Self::new(Arc::new(NoopTranslator))
    }
}

impl ValueConverter {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self {
            translator,
            boolean_labels: ["false".to_string(), "true".to_string()],
            conventions: Conventions::DEFAULT,
        }
    }

    pub fn with_conventions(mut self, conventions: Conventions) -> Self {
        self.conventions = conventions;
        self
    }

    pub fn set_translator(&mut self, translator: Arc<dyn Translator>) {
        self.translator = translator;
    }

    /// Labels for `false` and `true`, in that order
    pub fn set_boolean_labels<S: AsRef<str>>(&mut self, labels: &[S]) -> PortationResult<()> {
        match labels {
            [no, yes] => {
                self.boolean_labels = [no.as_ref().to_string(), yes.as_ref().to_string()];
                Ok(())
            }
            _ => Err(PortationError::invalid(format!(
                "Boolean labels need exactly two values (false, true), got {}",
                labels.len()
            ))),
        }
    }

    pub fn boolean_labels(&self) -> (&str, &str) {
        (&self.boolean_labels[0], &self.boolean_labels[1])
    }

    pub fn translate(&self, text: &str) -> String {
        self.translator.translate(text)
    }

    pub fn convert(&self, value: &Value, options: Option<&ColumnOptions>) -> PortationResult<String> {
        let object_property = options
            .map(|o| o.object_property.as_str())
            .filter(|p| !p.is_empty());

        let value = match self.unwrap_object(value.clone(), object_property)? {
            Value::List(items) => {
                let parts = items
                    .iter()
                    .map(|item| self.convert(item, None))
                    .collect::<PortationResult<Vec<_>>>()?;
                Value::Text(parts.join(", "))
            }
            other => other,
        };

        if let Some(options) = options {
            match options.value_type {
                ValueType::Boolean => {
                    let label = if value.is_truthy() {
                        &self.boolean_labels[1]
                    } else {
                        &self.boolean_labels[0]
                    };
                    return Ok(self.translate(label));
                }
                ValueType::Date => return self.format_date(&value, &options.date_format),
                _ => {}
            }
        }

        Ok(match value {
            Value::Text(text) => self.translate(&text),
            other => other.to_string(),
        })
    }

    fn unwrap_object(&self, value: Value, object_property: Option<&str>) -> PortationResult<Value> {
        let mut current = value;
        loop {
            match current {
                Value::Object(obj) => {
                    current = match object_property {
                        Some(property) => self.extract_property(&obj, property)?,
                        None => match obj.display {
                            Some(display) => Value::Text(display),
                            None => Value::List(obj.field_values()),
                        },
                    };
                }
                other => return Ok(other),
            }
        }
    }

    fn extract_property(&self, obj: &ObjectValue, property: &str) -> PortationResult<Value> {
        if let Some(value) = obj.public_field(property) {
            return Ok(value.clone());
        }
        let candidates = self.conventions.getter_candidates(property);
        for candidate in &candidates {
            if let Some(value) = obj.call(candidate) {
                return Ok(value.clone());
            }
        }
        Err(PortationError::NotFound(format!(
            "No getter ({}) was found in the class '{}' for the property '{}'",
            candidates.join(", "),
            obj.class,
            property
        )))
    }

    fn format_date(&self, value: &Value, format: &str) -> PortationResult<String> {
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(PortationError::invalid(format!(
                "Invalid date format '{}'",
                format
            )));
        }
        match value.to_date() {
            Some(date) => Ok(date.format(format).to_string()),
            None if value.is_blank() => Ok(String::new()),
            None => {
                warn!(value = %value, "Value of a date column is not a date, written as is");
                Ok(value.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::Catalog;
    use chrono::NaiveDate;

    fn typed(value_type: ValueType) -> ColumnOptions {
        ColumnOptions {
            value_type,
            ..Default::default()
        }
    }

    #[test]
    fn test_boolean_labels_are_translated() {
        let mut converter = ValueConverter::new(Arc::new(Catalog::new().with("yes", "oui")));
        converter.set_boolean_labels(&["no", "yes"]).unwrap();
        let opts = typed(ValueType::Boolean);

        assert_eq!(converter.convert(&Value::Bool(true), Some(&opts)).unwrap(), "oui");
        assert_eq!(converter.convert(&Value::Bool(false), Some(&opts)).unwrap(), "no");
    }

    #[test]
    fn test_malformed_boolean_labels() {
        let mut converter = ValueConverter::default();
        let err = converter.set_boolean_labels(&["only one"]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
        assert_eq!(converter.boolean_labels(), ("false", "true"));
    }

    #[test]
    fn test_nested_list_is_flattened() {
        let converter = ValueConverter::default();
        let value = Value::from(vec![Value::Int(1), Value::from(vec![2, 3])]);
        assert_eq!(converter.convert(&value, None).unwrap(), "1, 2, 3");
    }

    #[test]
    fn test_date_formatting() {
        let converter = ValueConverter::default();
        let opts = ColumnOptions {
            value_type: ValueType::Date,
            date_format: "%d/%m/%Y".to_string(),
            ..Default::default()
        };
        let date = NaiveDate::from_ymd_opt(1990, 5, 17).unwrap();
        assert_eq!(converter.convert(&Value::from(date), Some(&opts)).unwrap(), "17/05/1990");
        assert_eq!(converter.convert(&Value::from("1990-05-17"), Some(&opts)).unwrap(), "17/05/1990");
        assert_eq!(converter.convert(&Value::from("someday"), Some(&opts)).unwrap(), "someday");
    }

    #[test]
    fn test_invalid_date_format() {
        let converter = ValueConverter::default();
        let opts = ColumnOptions {
            value_type: ValueType::Date,
            date_format: "%Q".to_string(),
            ..Default::default()
        };
        assert!(converter.convert(&Value::from("1990-05-17"), Some(&opts)).is_err());
    }

    #[test]
    fn test_object_property_through_accessor() {
        let converter = ValueConverter::default();
        let object = ObjectValue::new("IncludedObject")
            .private_field("id", 1)
            .private_field("nom", "Dupont")
            .accessor("getNom", "Dupont");
        let opts = ColumnOptions {
            value_type: ValueType::Object,
            object_property: "nom".to_string(),
            ..Default::default()
        };
        assert_eq!(converter.convert(&Value::from(object), Some(&opts)).unwrap(), "Dupont");
    }

    #[test]
    fn test_missing_object_property_names_getter() {
        let converter = ValueConverter::default();
        let object = ObjectValue::new("IncludedObject").private_field("nom", "Dupont");
        let opts = ColumnOptions {
            object_property: "surname".to_string(),
            ..Default::default()
        };
        let err = converter.convert(&Value::from(object), Some(&opts)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
        assert!(err.to_string().contains("getSurname"));
        assert!(err.to_string().contains("IncludedObject"));
    }

    #[test]
    fn test_object_display_and_field_bag() {
        let converter = ValueConverter::default();
        let shown = ObjectValue::new("Money").with_display("12.50 EUR");
        assert_eq!(converter.convert(&Value::from(shown), None).unwrap(), "12.50 EUR");

        let bag = ObjectValue::new("Point").field("x", 1).field("y", 2);
        assert_eq!(converter.convert(&Value::from(bag), None).unwrap(), "1, 2");
    }

    #[test]
    fn test_text_is_translated() {
        let converter = ValueConverter::new(Arc::new(Catalog::new().with("Doe", "Dupont")));
        assert_eq!(converter.convert(&Value::from("Doe"), None).unwrap(), "Dupont");
        assert_eq!(converter.convert(&Value::Int(54), None).unwrap(), "54");
    }
}
