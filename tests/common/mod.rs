//! Shared entity fixtures for the integration tests
//!
//! `Parent` carries the class metadata (sheet title, "N/A" fallback, ";"
//! delimiter); `ChildA` and `ChildB` extend it and `Other` is unrelated.

#![allow(dead_code)]

use chrono::NaiveDate;
use entity_portation::options::Annotation;
use entity_portation::{
    impl_entity, ClassBuilder, ClassRegistry, EntityPortation, ObjectValue, ValueType,
};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parent {
    id: i64,
    firstname: String,
    lastname: String,
    pub age: i64,
}

impl Parent {
    pub fn new(id: i64, firstname: &str, lastname: &str, age: i64) -> Self {
        Self {
            id,
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
            age,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn firstname(&self) -> &str {
        &self.firstname
    }

    pub fn lastname(&self) -> &str {
        &self.lastname
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncludedObject {
    pub id: i64,
    pub nom: String,
}

impl IncludedObject {
    pub fn to_object(&self) -> ObjectValue {
        ObjectValue::new("IncludedObject")
            .private_field("id", self.id)
            .private_field("nom", self.nom.as_str())
            .accessor("getId", self.id)
            .accessor("getNom", self.nom.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildA {
    pub parent: Parent,
    pub activated: bool,
    adress: String,
    object: Option<IncludedObject>,
}

impl ChildA {
    pub fn new(parent: Parent, activated: bool, adress: &str) -> Self {
        Self {
            parent,
            activated,
            adress: adress.to_string(),
            object: None,
        }
    }

    pub fn with_object(mut self, object: IncludedObject) -> Self {
        self.object = Some(object);
        self
    }

    pub fn object(&self) -> Option<&IncludedObject> {
        self.object.as_ref()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildB {
    pub parent: Parent,
    phone_number: String,
    date_naissance: Option<NaiveDate>,
}

impl ChildB {
    pub fn new(parent: Parent, phone_number: &str) -> Self {
        Self {
            parent,
            phone_number: phone_number.to_string(),
            date_naissance: None,
        }
    }

    pub fn born(mut self, date: NaiveDate) -> Self {
        self.date_naissance = Some(date);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Other {
    unknown_var: String,
}

impl Other {
    pub fn new(unknown_var: &str) -> Self {
        Self {
            unknown_var: unknown_var.to_string(),
        }
    }
}

impl_entity!(Parent, "Parent");
impl_entity!(ChildA, "ChildA", parent: parent);
impl_entity!(ChildB, "ChildB", parent: parent);
impl_entity!(Other, "Other");

pub fn parent_class() -> ClassBuilder<Parent> {
    ClassBuilder::<Parent>::new("Parent")
        .portation(
            EntityPortation::new()
                .sheet_title("MySheetTitle")
                .fallback_value("N/A")
                .csv_delimiter(";"),
        )
        .private_property("id")
        .annotate(Annotation::new().label("Identifiant").position(0))
        .private_property("firstname")
        .annotate(Annotation::new().label("Prénom").position(1))
        .private_property("lastname")
        .annotate(Annotation::new().label("Nom").position(2))
        .property("age", |p: &Parent| p.age, |p: &mut Parent, v| {
            p.age = v.to_i64().unwrap_or_default()
        })
        .annotate(Annotation::new().label("Âge").position(3))
        .getter("getId", |p: &Parent| p.id)
        .getter("getFirstname", |p: &Parent| p.firstname.clone())
        .getter("getLastname", |p: &Parent| p.lastname.clone())
        .setter("setId", |p: &mut Parent, v| p.id = v.to_i64().unwrap_or_default())
        .setter("setFirstname", |p: &mut Parent, v| p.firstname = v.to_string())
        .setter("setLastname", |p: &mut Parent, v| p.lastname = v.to_string())
        .setter("setAge", |p: &mut Parent, v| p.age = v.to_i64().unwrap_or_default())
}

pub fn registry() -> Arc<ClassRegistry> {
    let child_a = ClassBuilder::<ChildA>::new("ChildA")
        .extends("Parent")
        .property(
            "activated",
            |c: &ChildA| c.activated,
            |c: &mut ChildA, v| c.activated = v.to_bool().unwrap_or_default(),
        )
        .annotate(Annotation::new().label("Activé").value_type(ValueType::Boolean))
        .private_property("adress")
        .annotate(Annotation::new().label("Adresse"))
        .private_property("object")
        .annotate(
            Annotation::new()
                .label("Objet")
                .value_type(ValueType::Object)
                .object_property("nom"),
        )
        .getter("getActivated", |c: &ChildA| c.activated)
        .getter("getAdress", |c: &ChildA| c.adress.clone())
        .getter("getObject", |c: &ChildA| {
            c.object.as_ref().map(IncludedObject::to_object)
        })
        .setter("setObject", |c: &mut ChildA, v| {
            c.object = Some(IncludedObject {
                id: 0,
                nom: v.to_string(),
            })
        })
        .build();

    let child_b = ClassBuilder::<ChildB>::new("ChildB")
        .extends("Parent")
        .private_property("phoneNumber")
        .annotate(Annotation::new().label("Téléphone"))
        .private_property("dateNaissance")
        .annotate(
            Annotation::new()
                .label("Naissance")
                .value_type(ValueType::Date)
                .date_format("%d/%m/%Y"),
        )
        .getter("getPhoneNumber", |c: &ChildB| c.phone_number.clone())
        .getter("getDateNaissance", |c: &ChildB| c.date_naissance)
        .build();

    let other = ClassBuilder::<Other>::new("Other")
        .private_property("unknownVar")
        .getter("getUnknownVar", |o: &Other| o.unknown_var.clone())
        .build();

    Arc::new(
        ClassRegistry::new()
            .with(parent_class().build())
            .with(child_a)
            .with(child_b)
            .with(other),
    )
}

pub fn people() -> Vec<Parent> {
    vec![
        Parent::new(1, "James", "Doe", 54),
        Parent::new(2, "John", "Doe", 25),
        Parent::new(3, "Jane", "Doe", 33),
    ]
}
