//! Column schema extraction and layout
//!
//! A [`Schema`] is the ordered list of columns of one export or import run.
//! It is built from the [`ClassRegistry`] by [`extract_columns`]: properties
//! first, then methods, each walked from the root class down to the class
//! itself so that subclass declarations come last and can override.

use serde_yaml::{Mapping, Value as YamlValue};
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::{PortationError, PortationResult};
use crate::naming::{column_name, Conventions};
use crate::options::{format_options, Annotation, ColumnOption, ColumnOptions};
use crate::registry::{ClassRegistry, Member, MemberKind};
use crate::types::{MethodType, Portation, Position, MAX_COLUMN_INDEX};

/// Ordered column key → descriptor map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    columns: Vec<(String, ColumnOptions)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&ColumnOptions> {
        self.columns.iter().find(|(k, _)| k == key).map(|(_, o)| o)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ColumnOptions> {
        self.columns
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, o)| o)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnOptions)> {
        self.columns.iter().map(|(k, o)| (k.as_str(), o))
    }

    /// Insert a column, replacing the descriptor of an existing key in place
    pub fn insert(&mut self, key: impl Into<String>, options: ColumnOptions) {
        let key = key.into();
        match self.get_mut(&key) {
            Some(existing) => *existing = options,
            None => self.columns.push((key, options)),
        }
    }

    /// Add the columns of `other`. Keys already present are overwritten
    /// only when `replace_if_exists` is set.
    pub fn merge(&mut self, other: Schema, replace_if_exists: bool) {
        for (key, options) in other.columns {
            if !self.contains(&key) || replace_if_exists {
                self.insert(key, options);
            }
        }
    }

    /// Key of the first column whose label or translated label matches.
    /// Keys are only compared when no label does.
    pub fn key_for_label(&self, label: &str, translate: impl Fn(&str) -> String) -> Option<&str> {
        self.iter()
            .find(|(key, options)| {
                let effective = options.effective_label(key);
                effective == label || translate(effective) == label
            })
            .or_else(|| self.iter().find(|(key, _)| *key == label))
            .map(|(key, _)| key)
    }

    pub fn column_options(&self, key: &str) -> PortationResult<&ColumnOptions> {
        self.get(key).ok_or_else(|| unknown_column(key))
    }

    /// Replace a column's options with a normalized copy of `raw`
    pub fn set_column_options(&mut self, key: &str, raw: &Mapping) -> PortationResult<()> {
        let options = format_options(raw)?;
        *self.get_mut(key).ok_or_else(|| unknown_column(key))? = options;
        Ok(())
    }

    pub fn set_column_option(&mut self, key: &str, option: &str, value: &YamlValue) -> PortationResult<()> {
        let options = self.get_mut(key).ok_or_else(|| unknown_column(key))?;
        let option: ColumnOption = option.parse()?;
        options.set(option, value)
    }

    pub fn reset_column_default_options(&mut self, key: &str) -> PortationResult<()> {
        *self.get_mut(key).ok_or_else(|| unknown_column(key))? = ColumnOptions::default();
        Ok(())
    }

    pub fn set_all_visible(&mut self, visible: bool) {
        for (_, options) in &mut self.columns {
            options.visible = visible;
        }
    }

    pub fn set_all_position_auto(&mut self) {
        for (_, options) in &mut self.columns {
            options.position = Position::Auto;
        }
    }

    /// Zero-based sheet column of every visible column, in schema order.
    ///
    /// Explicit positions are placed first; two visible columns asking for
    /// the same index is an OUT_OF_BOUNDS error. Auto columns then take the
    /// free indices left to right.
    pub fn layout(&self) -> PortationResult<Vec<(&str, u32)>> {
        let mut taken = BTreeSet::new();
        let mut placed: Vec<Option<u32>> = vec![None; self.columns.len()];

        for (slot, (_, options)) in placed.iter_mut().zip(&self.columns) {
            if let (true, Position::Index(idx)) = (options.visible, options.position) {
                Position::index(idx)?;
                if !taken.insert(idx) {
                    return Err(PortationError::out_of_bounds(
                        "There is a position conflict, two columns asked for the same index.",
                    ));
                }
                *slot = Some(idx);
            }
        }

        let mut cursor = 0u32;
        for (slot, (_, options)) in placed.iter_mut().zip(&self.columns) {
            if options.visible && options.position == Position::Auto {
                while taken.contains(&cursor) {
                    cursor += 1;
                }
                if cursor > MAX_COLUMN_INDEX {
                    return Err(PortationError::out_of_bounds("Too many columns for one sheet"));
                }
                taken.insert(cursor);
                *slot = Some(cursor);
            }
        }

        Ok(self
            .columns
            .iter()
            .zip(placed)
            .filter_map(|((key, _), col)| col.map(|c| (key.as_str(), c)))
            .collect())
    }
}

fn unknown_column(key: &str) -> PortationError {
    PortationError::out_of_bounds(format!("This column does not exist: '{}'", key))
}

/// Build the schema of `class` for one portation direction.
///
/// With `annotate_only`, only annotated members count; otherwise every
/// public member does, plus annotated private ones. Export only considers
/// getter methods and import only setter methods. A key discovered twice is
/// merged into the first descriptor when `replace_if_exists` is set and
/// ignored otherwise.
pub fn extract_columns(
    registry: &ClassRegistry,
    class: &str,
    mode: Portation,
    conventions: &Conventions,
    replace_if_exists: bool,
    annotate_only: bool,
) -> PortationResult<Schema> {
    let mut lineage = registry.lineage(class)?;
    lineage.reverse();

    let properties = lineage.iter().flat_map(|c| c.properties.iter());
    let methods = lineage.iter().flat_map(|c| c.methods.iter());

    let mut schema = Schema::new();
    for member in properties.chain(methods) {
        if member.name.starts_with("__") || !accessor_matches(member, mode) {
            continue;
        }

        let key = match member.kind {
            MemberKind::Property => column_name(&member.name, &[]),
            MemberKind::Method(_) => conventions.column_name(&member.name),
        };
        if key.is_empty() {
            continue;
        }
        let exists = schema.contains(&key);
        if exists && !replace_if_exists {
            continue;
        }

        let Some(declared) = declaration(member, mode, annotate_only) else {
            continue;
        };

        if exists {
            if let Some(options) = schema.get_mut(&key) {
                options.merge(&declared);
            }
        } else {
            let mut options = ColumnOptions::default();
            options.merge(&declared);
            schema.insert(key, options);
        }
    }

    debug!(
        class,
        ?mode,
        annotate_only,
        columns = schema.len(),
        "Extracted columns"
    );
    Ok(schema)
}

fn accessor_matches(member: &Member, mode: Portation) -> bool {
    match (member.kind, mode) {
        (MemberKind::Property, _) => true,
        (MemberKind::Method(MethodType::Getter), Portation::Export) => true,
        (MemberKind::Method(MethodType::Setter), Portation::Import) => true,
        (MemberKind::Method(_), Portation::Both) => true,
        _ => false,
    }
}

/// The partial options a member contributes, or `None` when it does not
/// take part in this run
fn declaration(member: &Member, mode: Portation, annotate_only: bool) -> Option<Annotation> {
    let mut declared = match &member.annotation {
        Some(annotation) if annotation.portations.covers(mode) => annotation.clone(),
        Some(_) => return None,
        None if annotate_only || !member.is_public() => return None,
        None => Annotation::new(),
    };

    if let MemberKind::Method(method_type) = member.kind {
        let slot = match method_type {
            MethodType::Getter => &mut declared.getter,
            MethodType::Setter => &mut declared.setter,
        };
        if slot.as_deref().map_or(true, str::is_empty) {
            *slot = Some(member.name.clone());
        }
    }
    Some(declared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Record;
    use crate::error::ErrorKind;
    use crate::registry::ClassBuilder;

    fn options_at(position: Position) -> ColumnOptions {
        ColumnOptions {
            position,
            ..Default::default()
        }
    }

    #[test]
    fn test_layout_fills_gaps() {
        let mut schema = Schema::new();
        schema.insert("a", options_at(Position::Auto));
        schema.insert("b", options_at(Position::Index(0)));
        schema.insert("c", options_at(Position::Index(2)));
        schema.insert("d", options_at(Position::Auto));
        schema.insert("e", options_at(Position::Auto));

        assert_eq!(
            schema.layout().unwrap(),
            vec![("a", 1), ("b", 0), ("c", 2), ("d", 3), ("e", 4)]
        );
    }

    #[test]
    fn test_layout_conflict() {
        let mut schema = Schema::new();
        schema.insert("a", options_at(Position::Index(1)));
        schema.insert("b", options_at(Position::Index(1)));
        let err = schema.layout().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
        assert!(err.to_string().contains("position conflict"));
    }

    #[test]
    fn test_header_matches_labels_before_keys() {
        let mut schema = Schema::new();
        schema.insert("nom", ColumnOptions::default());
        schema.insert(
            "lastname",
            ColumnOptions {
                label: "Nom".into(),
                ..Default::default()
            },
        );
        schema.insert(
            "firstname",
            ColumnOptions {
                label: "Prénom".into(),
                ..Default::default()
            },
        );

        let upper = |s: &str| s.to_uppercase();
        assert_eq!(schema.key_for_label("Nom", upper), Some("lastname"));
        assert_eq!(schema.key_for_label("PRÉNOM", upper), Some("firstname"));
        assert_eq!(schema.key_for_label("firstname", upper), Some("firstname"));
        assert_eq!(schema.key_for_label("Couleur", upper), None);
    }

    #[test]
    fn test_layout_rejects_positions_past_last_column() {
        let mut schema = Schema::new();
        schema.insert("a", options_at(Position::Index(u32::MAX)));
        assert_eq!(schema.layout().unwrap_err().kind(), ErrorKind::OutOfBounds);

        schema.insert("a", options_at(Position::Index(MAX_COLUMN_INDEX)));
        assert_eq!(schema.layout().unwrap(), vec![("a", MAX_COLUMN_INDEX)]);
    }

    #[test]
    fn test_hidden_columns_are_not_placed() {
        let mut schema = Schema::new();
        schema.insert("a", options_at(Position::Index(0)));
        let mut hidden = options_at(Position::Index(0));
        hidden.visible = false;
        schema.insert("b", hidden);
        schema.insert("c", options_at(Position::Auto));

        assert_eq!(schema.layout().unwrap(), vec![("a", 0), ("c", 1)]);
    }

    #[test]
    fn test_column_management() {
        let mut schema = Schema::new();
        schema.insert("age", ColumnOptions::default());

        schema
            .set_column_option("age", "label", &YamlValue::from("Âge"))
            .unwrap();
        assert_eq!(schema.column_options("age").unwrap().label, "Âge");

        let err = schema
            .set_column_option("age", "color", &YamlValue::from("red"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
        assert_eq!(
            schema.column_options("name").unwrap_err().kind(),
            ErrorKind::OutOfBounds
        );

        let raw: Mapping = serde_yaml::from_str("label: Years\nposition: 4\ncolour: red").unwrap();
        schema.set_column_options("age", &raw).unwrap();
        let options = schema.column_options("age").unwrap();
        assert_eq!(options.label, "Years");
        assert_eq!(options.position, Position::Index(4));
        assert!(schema.set_column_options("name", &raw).is_err());

        schema.set_all_visible(false);
        assert!(!schema.column_options("age").unwrap().visible);

        schema.reset_column_default_options("age").unwrap();
        assert_eq!(schema.column_options("age").unwrap(), &ColumnOptions::default());
    }

    #[test]
    fn test_methods_and_unannotated_members() {
        let registry = ClassRegistry::new().with(
            ClassBuilder::<Record>::new("Item")
                .property("label", |r| r.get("label"), |r, v| r.set("label", v))
                .private_property("secret")
                .getter("getPrice", |r| r.get("price"))
                .setter("setPrice", |r, v| r.set("price", v))
                .getter("__toString", |r| r.get("label"))
                .build(),
        );

        let export = extract_columns(&registry, "Item", Portation::Export, &Conventions::DEFAULT, true, false)
            .unwrap();
        assert_eq!(export.keys().collect::<Vec<_>>(), vec!["label", "price"]);
        assert_eq!(export.get("price").unwrap().getter, "getPrice");

        let import = extract_columns(&registry, "Item", Portation::Import, &Conventions::DEFAULT, true, false)
            .unwrap();
        assert_eq!(import.get("price").unwrap().setter, "setPrice");
        assert_eq!(import.get("price").unwrap().getter, "");

        let annotated = extract_columns(&registry, "Item", Portation::Export, &Conventions::DEFAULT, true, true)
            .unwrap();
        assert!(annotated.is_empty());
    }

    #[test]
    fn test_unknown_class() {
        let err = extract_columns(
            &ClassRegistry::new(),
            "Missing",
            Portation::Export,
            &Conventions::DEFAULT,
            true,
            false,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
