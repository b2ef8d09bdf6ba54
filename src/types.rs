use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

use crate::error::PortationError;

//==============================================================================
// Cell / Member Values
//==============================================================================

/// Datetime layouts accepted when text has to be read as a date
const DATE_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
];

const DAY_INPUT_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// A dynamically typed value read from an entity member or a sheet cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDateTime),
    List(Vec<Value>),
    Object(ObjectValue),
}

impl Value {
    /// Null, empty/whitespace text and empty lists carry no data
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            Value::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Loose truthiness used by boolean-typed columns
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Text(s) => !(s.is_empty() || s == "0"),
            Value::Date(_) | Value::Object(_) => true,
            Value::List(items) => !items.is_empty(),
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of the value; text is parsed, whole floats are accepted
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.fract() == 0.0)
                        .map(|f| f as i64)
                })
            }
            _ => None,
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(i) => Some(*i != 0),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "y" | "on" => Some(true),
                "false" | "0" | "no" | "n" | "off" | "" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Date view of the value; integers are unix timestamps
    pub fn to_date(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => Some(*d),
            Value::Int(ts) => DateTime::from_timestamp(*ts, 0).map(|d| d.naive_utc()),
            Value::Text(s) => parse_datetime(s.trim()),
            _ => None,
        }
    }

    /// Owned text view: `None` for null and structured values
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null | Value::List(_) | Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Convert to JSON for reports and record files
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d %H:%M:%S").to_string()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(obj) => {
                let map = obj
                    .fields
                    .iter()
                    .map(|f| (f.name.clone(), f.value.to_json()))
                    .collect();
                serde_json::Value::Object(map)
            }
        }
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.naive_utc());
    }
    for fmt in DATE_INPUT_FORMATS {
        if let Ok(d) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DAY_INPUT_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            Value::List(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Object(obj) => match &obj.display {
                Some(display) => f.write_str(display),
                None => f.write_str(&obj.class),
            },
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                let mut obj = ObjectValue::new("object");
                for (name, value) in map {
                    obj = obj.field(name, Value::from(value));
                }
                Value::Object(obj)
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        d.and_hms_opt(0, 0, 0).map(Value::Date).unwrap_or_default()
    }
}

impl From<ObjectValue> for Value {
    fn from(obj: ObjectValue) -> Self {
        Value::Object(obj)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or_default()
    }
}

//==============================================================================
// Nested Objects
//==============================================================================

/// A named field of an [`ObjectValue`]
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    pub name: String,
    pub value: Value,
    pub public: bool,
}

/// Snapshot of a nested object held by an entity member.
///
/// Carries the object's fields, the results of its accessor methods and,
/// when the type has a textual representation, its display string.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    pub class: String,
    pub display: Option<String>,
    pub fields: Vec<ObjectField>,
    pub accessors: Vec<(String, Value)>,
}

impl ObjectValue {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            display: None,
            fields: Vec::new(),
            accessors: Vec::new(),
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Add a public field
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push(ObjectField {
            name: name.into(),
            value: value.into(),
            public: true,
        });
        self
    }

    pub fn private_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push(ObjectField {
            name: name.into(),
            value: value.into(),
            public: false,
        });
        self
    }

    /// Record the result of a public accessor method (e.g. `getNom`)
    pub fn accessor(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.accessors.push((name.into(), value.into()));
        self
    }

    pub fn public_field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| f.public && f.name == name)
            .map(|f| &f.value)
    }

    /// Accessor lookup; method names match case-insensitively
    pub fn call(&self, method: &str) -> Option<&Value> {
        self.accessors
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(method))
            .map(|(_, value)| value)
    }

    /// All field values in declaration order
    pub fn field_values(&self) -> Vec<Value> {
        self.fields.iter().map(|f| f.value.clone()).collect()
    }
}

//==============================================================================
// Column Option Types
//==============================================================================

/// Declared value type of a column, selecting the conversion rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueType {
    #[default]
    Unset,
    String,
    Number,
    Array,
    Object,
    Boolean,
    Date,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Unset => "",
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Array => "array",
            ValueType::Object => "object",
            ValueType::Boolean => "boolean",
            ValueType::Date => "date",
        }
    }
}

impl FromStr for ValueType {
    type Err = PortationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(ValueType::Unset),
            "string" | "text" => Ok(ValueType::String),
            "number" | "int" | "integer" | "float" => Ok(ValueType::Number),
            "array" | "list" => Ok(ValueType::Array),
            "object" => Ok(ValueType::Object),
            "boolean" | "bool" => Ok(ValueType::Boolean),
            "date" | "datetime" => Ok(ValueType::Date),
            other => Err(PortationError::invalid(format!(
                "Unknown value type '{}'",
                other
            ))),
        }
    }
}

/// Highest zero-based column index a sheet may use (`XFD` in Excel 2007+)
pub const MAX_COLUMN_INDEX: u32 = 16_383;

/// Target column of a descriptor: placed automatically or at a fixed index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Auto,
    Index(u32),
}

impl FromStr for Position {
    type Err = PortationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") || s.is_empty() {
            return Ok(Position::Auto);
        }
        let idx = s
            .parse::<u32>()
            .map_err(|_| PortationError::invalid(format!("Invalid column position '{}'", s)))?;
        Position::index(idx)
    }
}

impl Position {
    /// Fixed position, rejecting indices past [`MAX_COLUMN_INDEX`]
    pub fn index(idx: u32) -> Result<Self, PortationError> {
        if idx > MAX_COLUMN_INDEX {
            return Err(PortationError::OutOfBounds(format!(
                "Column position {} is past the last sheet column ({})",
                idx, MAX_COLUMN_INDEX
            )));
        }
        Ok(Position::Index(idx))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Auto => f.write_str("auto"),
            Position::Index(idx) => write!(f, "{}", idx),
        }
    }
}

/// Which portation direction a declaration applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Portation {
    Export,
    Import,
    #[default]
    Both,
}

impl Portation {
    pub fn covers(&self, mode: Portation) -> bool {
        *self == Portation::Both || mode == Portation::Both || *self == mode
    }
}

impl FromStr for Portation {
    type Err = PortationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EXPORT" => Ok(Portation::Export),
            "IMPORT" => Ok(Portation::Import),
            "BOTH" | "" => Ok(Portation::Both),
            other => Err(PortationError::invalid(format!(
                "Unknown portation '{}'",
                other
            ))),
        }
    }
}

/// Accessor shape of a registered method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodType {
    Getter,
    Setter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("  ").is_blank());
        assert!(Value::List(vec![]).is_blank());
        assert!(!Value::Int(0).is_blank());
        assert!(!Value::from("0").is_blank());
    }

    #[test]
    fn test_integer_views() {
        assert_eq!(Value::from("54").to_i64(), Some(54));
        assert_eq!(Value::from("54.0").to_i64(), Some(54));
        assert_eq!(Value::Float(3.0).to_i64(), Some(3));
        assert_eq!(Value::from("abc").to_i64(), None);
    }

    #[test]
    fn test_bool_views() {
        assert_eq!(Value::from("Yes").to_bool(), Some(true));
        assert_eq!(Value::from("0").to_bool(), Some(false));
        assert_eq!(Value::from("maybe").to_bool(), None);
    }

    #[test]
    fn test_date_views() {
        let date = Value::from("1990-05-17").to_date().unwrap();
        assert_eq!(date.format("%d/%m/%Y").to_string(), "17/05/1990");

        let stamp = Value::Int(0).to_date().unwrap();
        assert_eq!(stamp.format("%Y").to_string(), "1970");

        assert!(Value::from("not a date").to_date().is_none());
    }

    #[test]
    fn test_display_nested_list() {
        let v = Value::from(vec![Value::Int(1), Value::from(vec![2, 3])]);
        assert_eq!(v.to_string(), "1, 2, 3");
    }

    #[test]
    fn test_position_parsing() {
        assert_eq!("auto".parse::<Position>().unwrap(), Position::Auto);
        assert_eq!("3".parse::<Position>().unwrap(), Position::Index(3));
        assert!("left".parse::<Position>().is_err());
        assert_eq!("16383".parse::<Position>().unwrap(), Position::Index(MAX_COLUMN_INDEX));
        assert!(matches!(
            "4294967295".parse::<Position>(),
            Err(PortationError::OutOfBounds(_))
        ));
    }

    #[test]
    fn test_object_accessor_case_insensitive() {
        let obj = ObjectValue::new("IncludedObject")
            .private_field("nom", "Dupont")
            .accessor("getNom", "Dupont");
        assert_eq!(obj.call("getnom"), Some(&Value::from("Dupont")));
        assert!(obj.public_field("nom").is_none());
    }

    #[test]
    fn test_portation_covers() {
        assert!(Portation::Both.covers(Portation::Import));
        assert!(Portation::Export.covers(Portation::Export));
        assert!(!Portation::Export.covers(Portation::Import));
    }
}
