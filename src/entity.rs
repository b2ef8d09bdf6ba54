//! Entities and the dynamic record type
//!
//! An [`Entity`] is any value whose members are described in a
//! [`ClassRegistry`](crate::registry::ClassRegistry). Class inheritance is
//! expressed by composition: a child entity embeds its parent and exposes it
//! through [`Entity::parent`], so accessors registered on the parent class
//! keep working on child instances.

use std::any::Any;
use std::collections::BTreeMap;

use crate::types::Value;

pub trait Entity: Any {
    /// Name of the registered class of this instance
    fn class_name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// The embedded parent-class part of this entity, if any
    fn parent(&self) -> Option<&dyn Entity> {
        None
    }

    fn parent_mut(&mut self) -> Option<&mut dyn Entity> {
        None
    }
}

/// Find the `T` part of an entity, walking up through embedded parents
pub fn view<T: Entity>(entity: &dyn Entity) -> Option<&T> {
    if let Some(found) = entity.as_any().downcast_ref::<T>() {
        return Some(found);
    }
    entity.parent().and_then(view::<T>)
}

/// Mutable counterpart of [`view`]
pub fn view_mut<T: Entity>(entity: &mut dyn Entity) -> Option<&mut T> {
    if entity.as_any().is::<T>() {
        return entity.as_any_mut().downcast_mut::<T>();
    }
    entity.parent_mut().and_then(view_mut::<T>)
}

/// Borrow a homogeneous slice as a list of entities
pub fn entity_refs<E: Entity>(items: &[E]) -> Vec<&dyn Entity> {
    items.iter().map(|item| item as &dyn Entity).collect()
}

/// Implement [`Entity`] for a struct.
///
/// ```
/// use entity_portation::impl_entity;
///
/// #[derive(Default)]
/// struct Person { id: i64 }
///
/// #[derive(Default)]
/// struct Customer { person: Person, phone: String }
///
/// impl_entity!(Person, "Person");
/// impl_entity!(Customer, "Customer", parent: person);
/// ```
#[macro_export]
macro_rules! impl_entity {
    ($ty:ty, $name:expr) => {
        impl $crate::entity::Entity for $ty {
            fn class_name(&self) -> &str {
                $name
            }
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        }
    };
    ($ty:ty, $name:expr, parent: $field:ident) => {
        impl $crate::entity::Entity for $ty {
            fn class_name(&self) -> &str {
                $name
            }
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
            fn parent(&self) -> Option<&dyn $crate::entity::Entity> {
                Some(&self.$field)
            }
            fn parent_mut(&mut self) -> Option<&mut dyn $crate::entity::Entity> {
                Some(&mut self.$field)
            }
        }
    };
}

/// Schema-less entity whose class is only known at runtime.
///
/// Used for classes declared in schema files: every declared field is a
/// public property stored in `fields`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub class: String,
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Value {
        self.fields.get(field).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl Entity for Record {
    fn class_name(&self) -> &str {
        &self.class
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Person {
        id: i64,
    }

    #[derive(Debug, Default)]
    struct Customer {
        person: Person,
        phone: String,
    }

    impl_entity!(Person, "Person");
    impl_entity!(Customer, "Customer", parent: person);

    #[test]
    fn test_view_walks_to_parent() {
        let customer = Customer {
            person: Person { id: 7 },
            phone: "0101".to_string(),
        };
        let entity: &dyn Entity = &customer;
        assert_eq!(view::<Person>(entity).map(|p| p.id), Some(7));
        assert_eq!(view::<Customer>(entity).map(|c| c.phone.as_str()), Some("0101"));
        assert!(view::<Record>(entity).is_none());
    }

    #[test]
    fn test_view_mut_reaches_parent() {
        let mut customer = Customer::default();
        if let Some(person) = view_mut::<Person>(&mut customer) {
            person.id = 42;
        }
        assert_eq!(customer.person.id, 42);
    }

    #[test]
    fn test_record_fields() {
        let mut record = Record::new("Person").with("id", 1);
        record.set("age", Value::Int(54));
        assert_eq!(record.get("id"), Value::Int(1));
        assert_eq!(record.get("missing"), Value::Null);
        assert_eq!(record.class_name(), "Person");
    }
}
