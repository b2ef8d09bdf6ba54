//! Class registry: statically declared member tables
//!
//! Every exportable/importable type is described once by a [`ClassDef`]:
//! its parent class (as a name, not a language-level relationship), its
//! class-level [`EntityPortation`] metadata and its members with their
//! accessor closures. Schema extraction and cell resolution only ever look
//! members up in this table.

mod config;

pub use config::{ClassConfig, FieldConfig, PortationConfig, SchemaConfig};

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::entity::{view, view_mut, Entity};
use crate::error::{PortationError, PortationResult};
use crate::options::Annotation;
use crate::types::{MethodType, Value};

/// Type-erased read accessor; `None` when the entity has no such part
pub type GetterFn = Arc<dyn Fn(&dyn Entity) -> Option<Value> + Send + Sync>;

/// Type-erased write accessor; `false` when the entity has no such part
pub type SetterFn = Arc<dyn Fn(&mut dyn Entity, Value) -> bool + Send + Sync>;

/// Class-level portation metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityPortation {
    pub sheet_title: String,
    pub fallback_value: String,
    pub csv_delimiter: String,
}

impl EntityPortation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet_title(mut self, title: impl Into<String>) -> Self {
        self.sheet_title = title.into();
        self
    }

    pub fn fallback_value(mut self, value: impl Into<String>) -> Self {
        self.fallback_value = value.into();
        self
    }

    pub fn csv_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.csv_delimiter = delimiter.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Property,
    Method(MethodType),
}

/// A property or method of a registered class
#[derive(Clone)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    pub visibility: Visibility,
    pub annotation: Option<Annotation>,
    getter: Option<GetterFn>,
    setter: Option<SetterFn>,
}

impl std::fmt::Debug for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("visibility", &self.visibility)
            .field("annotation", &self.annotation)
            .finish()
    }
}

impl Member {
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_getter(&self) -> bool {
        self.kind == MemberKind::Method(MethodType::Getter)
    }

    pub fn is_setter(&self) -> bool {
        self.kind == MemberKind::Method(MethodType::Setter)
    }

    /// Read the property or invoke the getter method
    pub fn read(&self, entity: &dyn Entity) -> Option<Value> {
        self.getter.as_ref().and_then(|get| get(entity))
    }

    /// Assign the property or invoke the setter method
    pub fn write(&self, entity: &mut dyn Entity, value: Value) -> bool {
        match &self.setter {
            Some(set) => set(entity, value),
            None => false,
        }
    }

    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }
}

/// Description of one class
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: String,
    pub parent: Option<String>,
    pub metadata: Option<EntityPortation>,
    pub properties: Vec<Member>,
    pub methods: Vec<Member>,
}

impl ClassDef {
    fn property(&self, name: &str) -> Option<&Member> {
        self.properties
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    fn method(&self, name: &str) -> Option<&Member> {
        self.methods
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }
}

/// All classes known to an exporter or importer
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassDef>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class, replacing any previous definition with that name
    pub fn register(&mut self, class: ClassDef) -> &mut Self {
        self.classes.insert(class.name.clone(), class);
        self
    }

    pub fn with(mut self, class: ClassDef) -> Self {
        self.register(class);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort();
        names
    }

    pub fn class(&self, name: &str) -> PortationResult<&ClassDef> {
        self.classes
            .get(name)
            .ok_or_else(|| PortationError::invalid(format!("Couldn't find the class {}", name)))
    }

    /// The class followed by its ancestors, nearest first
    pub fn lineage(&self, name: &str) -> PortationResult<Vec<&ClassDef>> {
        let mut chain: Vec<&ClassDef> = Vec::new();
        let mut current = Some(name);
        while let Some(class_name) = current {
            if chain.iter().any(|c| c.name == class_name) {
                return Err(PortationError::invalid(format!(
                    "Class hierarchy of {} is cyclic",
                    name
                )));
            }
            let class = self.class(class_name)?;
            chain.push(class);
            current = class.parent.as_deref();
        }
        Ok(chain)
    }

    /// Topmost ancestor of a class
    pub fn root_of(&self, name: &str) -> PortationResult<&str> {
        let lineage = self.lineage(name)?;
        Ok(lineage
            .last()
            .map(|c| c.name.as_str())
            .unwrap_or_default())
    }

    /// Nearest class-level metadata, looked up from the class upwards
    pub fn entity_metadata(&self, name: &str) -> PortationResult<Option<&EntityPortation>> {
        Ok(self
            .lineage(name)?
            .into_iter()
            .find_map(|c| c.metadata.as_ref()))
    }

    /// Public method of the class or its ancestors (nearest declaration wins)
    pub fn public_method(&self, class: &str, method: &str) -> Option<&Member> {
        self.lineage(class)
            .ok()?
            .into_iter()
            .find_map(|c| c.method(method))
            .filter(|m| m.is_public())
    }

    /// Public property of the class or its ancestors
    pub fn public_property(&self, class: &str, property: &str) -> Option<&Member> {
        self.lineage(class)
            .ok()?
            .into_iter()
            .find_map(|c| c.property(property))
            .filter(|m| m.is_public())
    }
}

/// Typed builder producing a [`ClassDef`] for entity type `T`.
///
/// Member declarations are chained; [`ClassBuilder::annotate`] and
/// [`ClassBuilder::private`] apply to the member declared just before.
///
/// ```
/// use entity_portation::impl_entity;
/// use entity_portation::options::Annotation;
/// use entity_portation::registry::ClassBuilder;
///
/// #[derive(Default)]
/// struct Person { id: i64, age: Option<i64> }
/// impl_entity!(Person, "Person");
///
/// let class = ClassBuilder::<Person>::new("Person")
///     .private_property("id")
///     .annotate(Annotation::new().label("Identifiant").position(0))
///     .property("age", |p| p.age, |p, v| p.age = v.to_i64())
///     .getter("getId", |p| p.id)
///     .setter("setId", |p, v| p.id = v.to_i64().unwrap_or_default())
///     .build();
/// assert_eq!(class.properties.len(), 2);
/// ```
pub struct ClassBuilder<T: Entity> {
    def: ClassDef,
    last: Option<LastMember>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> ClassBuilder<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            def: ClassDef {
                name: name.into(),
                parent: None,
                metadata: None,
                properties: Vec::new(),
                methods: Vec::new(),
            },
            last: None,
            _entity: PhantomData,
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.def.parent = Some(parent.into());
        self
    }

    pub fn portation(mut self, metadata: EntityPortation) -> Self {
        self.def.metadata = Some(metadata);
        self
    }

    /// Public property with direct read and write access
    pub fn property<V, G, S>(mut self, name: impl Into<String>, get: G, set: S) -> Self
    where
        V: Into<Value>,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, Value) + Send + Sync + 'static,
    {
        self.def.properties.push(Member {
            name: name.into(),
            kind: MemberKind::Property,
            visibility: Visibility::Public,
            annotation: None,
            getter: Some(erase_getter(get)),
            setter: Some(erase_setter(set)),
        });
        self.last = Some(LastMember::Property);
        self
    }

    /// Property only reachable through accessor methods
    pub fn private_property(mut self, name: impl Into<String>) -> Self {
        self.def.properties.push(Member {
            name: name.into(),
            kind: MemberKind::Property,
            visibility: Visibility::Private,
            annotation: None,
            getter: None,
            setter: None,
        });
        self.last = Some(LastMember::Property);
        self
    }

    pub fn getter<V, G>(mut self, name: impl Into<String>, get: G) -> Self
    where
        V: Into<Value>,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.def.methods.push(Member {
            name: name.into(),
            kind: MemberKind::Method(MethodType::Getter),
            visibility: Visibility::Public,
            annotation: None,
            getter: Some(erase_getter(get)),
            setter: None,
        });
        self.last = Some(LastMember::Method);
        self
    }

    pub fn setter<S>(mut self, name: impl Into<String>, set: S) -> Self
    where
        S: Fn(&mut T, Value) + Send + Sync + 'static,
    {
        self.def.methods.push(Member {
            name: name.into(),
            kind: MemberKind::Method(MethodType::Setter),
            visibility: Visibility::Public,
            annotation: None,
            getter: None,
            setter: Some(erase_setter(set)),
        });
        self.last = Some(LastMember::Method);
        self
    }

    /// Attach an annotation to the last declared member
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        if let Some(member) = self.last_member() {
            member.annotation = Some(annotation);
        }
        self
    }

    /// Mark the last declared member as non-public
    pub fn private(mut self) -> Self {
        if let Some(member) = self.last_member() {
            member.visibility = Visibility::Private;
        }
        self
    }

    pub fn build(self) -> ClassDef {
        self.def
    }

    fn last_member(&mut self) -> Option<&mut Member> {
        match self.last {
            Some(LastMember::Property) => self.def.properties.last_mut(),
            Some(LastMember::Method) => self.def.methods.last_mut(),
            None => None,
        }
    }
}

#[derive(Clone, Copy)]
enum LastMember {
    Property,
    Method,
}

fn erase_getter<T, V, G>(get: G) -> GetterFn
where
    T: Entity,
    V: Into<Value>,
    G: Fn(&T) -> V + Send + Sync + 'static,
{
    Arc::new(move |entity: &dyn Entity| view::<T>(entity).map(|part| get(part).into()))
}

fn erase_setter<T, S>(set: S) -> SetterFn
where
    T: Entity,
    S: Fn(&mut T, Value) + Send + Sync + 'static,
{
    Arc::new(move |entity: &mut dyn Entity, value: Value| match view_mut::<T>(entity) {
        Some(part) => {
            set(part, value);
            true
        }
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impl_entity;

    #[derive(Debug, Default)]
    struct Parent {
        id: i64,
        age: Option<i64>,
    }

    #[derive(Debug, Default)]
    struct Child {
        parent: Parent,
        phone: String,
    }

    impl_entity!(Parent, "Parent");
    impl_entity!(Child, "Child", parent: parent);

    fn registry() -> ClassRegistry {
        ClassRegistry::new()
            .with(
                ClassBuilder::<Parent>::new("Parent")
                    .portation(EntityPortation::new().fallback_value("N/A"))
                    .private_property("id")
                    .annotate(Annotation::new().label("Identifiant"))
                    .property("age", |p| p.age, |p, v| p.age = v.to_i64())
                    .getter("getId", |p| p.id)
                    .setter("setId", |p, v| p.id = v.to_i64().unwrap_or_default())
                    .build(),
            )
            .with(
                ClassBuilder::<Child>::new("Child")
                    .extends("Parent")
                    .private_property("phone")
                    .getter("getPhone", |c| c.phone.clone())
                    .getter("computeHash", |c| c.phone.len() as i64)
                    .private()
                    .build(),
            )
    }

    #[test]
    fn test_lineage_and_root() {
        let reg = registry();
        let names: Vec<&str> = reg
            .lineage("Child")
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Child", "Parent"]);
        assert_eq!(reg.root_of("Child").unwrap(), "Parent");
        assert!(reg.lineage("Unknown").is_err());
    }

    #[test]
    fn test_cyclic_hierarchy_is_rejected() {
        let reg = ClassRegistry::new()
            .with(ClassBuilder::<Parent>::new("A").extends("B").build())
            .with(ClassBuilder::<Parent>::new("B").extends("A").build());
        assert!(reg.lineage("A").is_err());
    }

    #[test]
    fn test_metadata_is_inherited() {
        let reg = registry();
        let meta = reg.entity_metadata("Child").unwrap().unwrap();
        assert_eq!(meta.fallback_value, "N/A");
    }

    #[test]
    fn test_inherited_accessors_work_on_child() {
        let reg = registry();
        let mut child = Child {
            parent: Parent { id: 3, age: None },
            phone: "0101".into(),
        };

        let get_id = reg.public_method("Child", "getid").unwrap();
        assert_eq!(get_id.read(&child), Some(Value::Int(3)));

        let set_id = reg.public_method("Child", "setId").unwrap();
        assert!(set_id.write(&mut child, Value::from("9")));
        assert_eq!(child.parent.id, 9);
    }

    #[test]
    fn test_private_members_are_hidden() {
        let reg = registry();
        assert!(reg.public_method("Child", "computeHash").is_none());
        assert!(reg.public_property("Child", "id").is_none());
        assert!(reg.public_property("Child", "age").is_some());
    }

    #[test]
    fn test_annotate_targets_last_member() {
        let reg = registry();
        let parent = reg.class("Parent").unwrap();
        assert!(parent.properties[0].annotation.is_some());
        assert!(parent.properties[1].annotation.is_none());
    }
}
