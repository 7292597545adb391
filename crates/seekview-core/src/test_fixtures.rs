//! Hand-registered fixture types for unit tests.
//!
//! These go through the explicit `TypeShape` registration API rather than
//! the derive, so core tests exercise exactly what a manual provider sees.

use crate::{
    model::{Accessor, MemberDecl, TypeRef, TypeShape},
    traits::{AccessError, FieldValue, Instance, Mapped, Member, MemberMut},
    value::Value,
};

///
/// opaque_instance
///
/// Test-only helper for shape-only types whose instances are never read.
///
macro_rules! opaque_instance {
    ($($name:ident),* $(,)?) => {
        $(
            pub struct $name;

            impl $crate::traits::Instance for $name {
                fn member(
                    &self,
                    _: &$crate::model::Accessor,
                ) -> Option<$crate::traits::Member<'_>> {
                    None
                }

                fn member_mut(
                    &mut self,
                    _: &$crate::model::Accessor,
                ) -> Option<$crate::traits::MemberMut<'_>> {
                    None
                }

                fn set_member(
                    &mut self,
                    accessor: &$crate::model::Accessor,
                    _: $crate::value::Value,
                ) -> Result<(), $crate::traits::AccessError> {
                    Err($crate::traits::AccessError::unknown(accessor.name()))
                }
            }
        )*
    };
}

pub(crate) use opaque_instance;

///
/// Address
///

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub city: Option<String>,
}

impl Address {
    pub fn new(street: &str, city: Option<&str>) -> Self {
        Self {
            street: street.to_string(),
            city: city.map(str::to_string),
        }
    }
}

impl Mapped for Address {
    fn shape() -> TypeShape {
        TypeShape::embeddable::<Self>()
            .field(MemberDecl::of::<String>("street"))
            .field(MemberDecl::of::<Option<String>>("city"))
    }
}

impl Instance for Address {
    fn member(&self, accessor: &Accessor) -> Option<Member<'_>> {
        Some(match accessor.name() {
            "street" => Member::Value(self.street.to_value()),
            "city" => Member::Value(self.city.to_value()),
            _ => return None,
        })
    }

    fn member_mut(&mut self, accessor: &Accessor) -> Option<MemberMut<'_>> {
        match accessor.name() {
            "street" | "city" => Some(MemberMut::Value),
            _ => None,
        }
    }

    fn set_member(&mut self, accessor: &Accessor, value: Value) -> Result<(), AccessError> {
        let name = accessor.name();
        match name {
            "street" => self.street = FieldValue::from_member(name, &value)?,
            "city" => self.city = FieldValue::from_member(name, &value)?,
            _ => return Err(AccessError::unknown(name)),
        }

        Ok(())
    }
}

///
/// Dept
///

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dept {
    pub id: u64,
    pub name: String,
}

impl Mapped for Dept {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>()
            .field(MemberDecl::of::<u64>("id").id())
            .field(MemberDecl::of::<String>("name"))
    }
}

impl Instance for Dept {
    fn member(&self, accessor: &Accessor) -> Option<Member<'_>> {
        Some(match accessor.name() {
            "id" => Member::Value(self.id.to_value()),
            "name" => Member::Value(self.name.to_value()),
            _ => return None,
        })
    }

    fn member_mut(&mut self, accessor: &Accessor) -> Option<MemberMut<'_>> {
        match accessor.name() {
            "id" | "name" => Some(MemberMut::Value),
            _ => None,
        }
    }

    fn set_member(&mut self, accessor: &Accessor, value: Value) -> Result<(), AccessError> {
        let name = accessor.name();
        match name {
            "id" => self.id = FieldValue::from_member(name, &value)?,
            "name" => self.name = FieldValue::from_member(name, &value)?,
            _ => return Err(AccessError::unknown(name)),
        }

        Ok(())
    }
}

///
/// Person
///
/// Field access; covers every property kind plus a transient getter.
///

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Person {
    pub id: u64,
    pub name: Option<String>,
    pub age: i64,
    pub address: Option<Address>,
    pub dept: Option<Box<Dept>>,
    pub tags: Vec<String>,
    pub version: u64,
}

impl Person {
    pub fn new(id: u64, name: Option<&str>, age: i64) -> Self {
        Self {
            id,
            name: name.map(str::to_string),
            age,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    #[must_use]
    pub fn with_dept(mut self, id: u64, name: &str) -> Self {
        self.dept = Some(Box::new(Dept {
            id,
            name: name.to_string(),
        }));
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(ToString::to_string).collect();
        self
    }

    pub fn display_name(&self) -> String {
        format!("#{} {}", self.id, self.name.as_deref().unwrap_or("?"))
    }
}

impl Mapped for Person {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>()
            .field(MemberDecl::of::<u64>("id").id())
            .field(MemberDecl::of::<Option<String>>("name"))
            .field(MemberDecl::of::<i64>("age"))
            .field(MemberDecl::mapped::<Address>("address").embedded())
            .field(MemberDecl::mapped::<Dept>("dept").reference())
            .field(MemberDecl::of::<Vec<String>>("tags").collection())
            .field(MemberDecl::of::<u64>("version").version())
            .accessor(MemberDecl::getter::<String>("display_name"))
    }
}

impl Instance for Person {
    fn member(&self, accessor: &Accessor) -> Option<Member<'_>> {
        Some(match accessor.name() {
            "id" => Member::Value(self.id.to_value()),
            "name" => Member::Value(self.name.to_value()),
            "age" => Member::Value(self.age.to_value()),
            "address" => Member::Object(self.address.as_ref().map(|a| a as &dyn Instance)),
            "dept" => Member::Object(self.dept.as_deref().map(|d| d as &dyn Instance)),
            "tags" => Member::Value(self.tags.to_value()),
            "version" => Member::Value(self.version.to_value()),
            "display_name" => Member::Value(Value::text(self.display_name())),
            _ => return None,
        })
    }

    fn member_mut(&mut self, accessor: &Accessor) -> Option<MemberMut<'_>> {
        Some(match accessor.name() {
            "address" => {
                MemberMut::Object(self.address.as_mut().map(|a| a as &mut dyn Instance))
            }
            "dept" => MemberMut::Object(self.dept.as_deref_mut().map(|d| d as &mut dyn Instance)),
            "id" | "name" | "age" | "tags" | "version" => MemberMut::Value,
            _ => return None,
        })
    }

    fn set_member(&mut self, accessor: &Accessor, value: Value) -> Result<(), AccessError> {
        let name = accessor.name();
        match name {
            "id" => self.id = FieldValue::from_member(name, &value)?,
            "name" => self.name = FieldValue::from_member(name, &value)?,
            "age" => self.age = FieldValue::from_member(name, &value)?,
            "tags" => self.tags = FieldValue::from_member(name, &value)?,
            "version" => self.version = FieldValue::from_member(name, &value)?,
            "address" if value.is_null() => self.address = None,
            "dept" if value.is_null() => self.dept = None,
            "address" | "dept" => {
                return Err(AccessError::ObjectMember {
                    name: name.to_string(),
                });
            }
            _ => return Err(AccessError::unknown(name)),
        }

        Ok(())
    }
}

///
/// LineKey / Line
/// Composite identifier through an embedded key.
///

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineKey {
    pub region: String,
    pub serial: u64,
}

impl Mapped for LineKey {
    fn shape() -> TypeShape {
        TypeShape::embeddable::<Self>()
            .field(MemberDecl::of::<String>("region"))
            .field(MemberDecl::of::<u64>("serial"))
    }
}

impl Instance for LineKey {
    fn member(&self, accessor: &Accessor) -> Option<Member<'_>> {
        Some(match accessor.name() {
            "region" => Member::Value(self.region.to_value()),
            "serial" => Member::Value(self.serial.to_value()),
            _ => return None,
        })
    }

    fn member_mut(&mut self, accessor: &Accessor) -> Option<MemberMut<'_>> {
        match accessor.name() {
            "region" | "serial" => Some(MemberMut::Value),
            _ => None,
        }
    }

    fn set_member(&mut self, accessor: &Accessor, value: Value) -> Result<(), AccessError> {
        let name = accessor.name();
        match name {
            "region" => self.region = FieldValue::from_member(name, &value)?,
            "serial" => self.serial = FieldValue::from_member(name, &value)?,
            _ => return Err(AccessError::unknown(name)),
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub key: LineKey,
    pub amount: i64,
}

impl Line {
    pub fn new(region: &str, serial: u64, amount: i64) -> Self {
        Self {
            key: LineKey {
                region: region.to_string(),
                serial,
            },
            amount,
        }
    }
}

impl Mapped for Line {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>()
            .field(MemberDecl::mapped::<LineKey>("key").embedded_id())
            .field(MemberDecl::of::<i64>("amount"))
    }
}

impl Instance for Line {
    fn member(&self, accessor: &Accessor) -> Option<Member<'_>> {
        Some(match accessor.name() {
            "key" => Member::Object(Some(&self.key)),
            "amount" => Member::Value(self.amount.to_value()),
            _ => return None,
        })
    }

    fn member_mut(&mut self, accessor: &Accessor) -> Option<MemberMut<'_>> {
        Some(match accessor.name() {
            "key" => MemberMut::Object(Some(&mut self.key)),
            "amount" => MemberMut::Value,
            _ => return None,
        })
    }

    fn set_member(&mut self, accessor: &Accessor, value: Value) -> Result<(), AccessError> {
        let name = accessor.name();
        match name {
            "amount" => self.amount = FieldValue::from_member(name, &value)?,
            "key" => {
                return Err(AccessError::ObjectMember {
                    name: name.to_string(),
                });
            }
            _ => return Err(AccessError::unknown(name)),
        }

        Ok(())
    }
}

///
/// Node
/// Self-referencing entity.
///

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub id: u64,
    pub label: String,
    pub parent: Option<Box<Node>>,
}

impl Mapped for Node {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>()
            .field(MemberDecl::of::<u64>("id").id())
            .field(MemberDecl::of::<String>("label"))
            .field(MemberDecl::new("parent", TypeRef::of::<Option<Box<Self>>>())
                .reference()
                .target(TypeRef::mapped::<Self>()))
    }
}

impl Instance for Node {
    fn member(&self, accessor: &Accessor) -> Option<Member<'_>> {
        Some(match accessor.name() {
            "id" => Member::Value(self.id.to_value()),
            "label" => Member::Value(self.label.to_value()),
            "parent" => Member::Object(self.parent.as_deref().map(|n| n as &dyn Instance)),
            _ => return None,
        })
    }

    fn member_mut(&mut self, accessor: &Accessor) -> Option<MemberMut<'_>> {
        Some(match accessor.name() {
            "id" | "label" => MemberMut::Value,
            "parent" => {
                MemberMut::Object(self.parent.as_deref_mut().map(|n| n as &mut dyn Instance))
            }
            _ => return None,
        })
    }

    fn set_member(&mut self, accessor: &Accessor, value: Value) -> Result<(), AccessError> {
        let name = accessor.name();
        match name {
            "id" => self.id = FieldValue::from_member(name, &value)?,
            "label" => self.label = FieldValue::from_member(name, &value)?,
            "parent" if value.is_null() => self.parent = None,
            _ => return Err(AccessError::unknown(name)),
        }

        Ok(())
    }
}

///
/// Account
///
/// Accessor access: the identifier marker sits on a getter. `label` has no
/// setter and `summary` is an explicitly transient getter.
///

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    id: u64,
    balance: i64,
    label: String,
}

impl Account {
    pub fn new(id: u64, balance: i64, label: &str) -> Self {
        Self {
            id,
            balance,
            label: label.to_string(),
        }
    }
}

impl Mapped for Account {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>()
            .accessor(MemberDecl::of::<u64>("id").id())
            .accessor(MemberDecl::of::<i64>("balance"))
            .accessor(MemberDecl::getter::<String>("label"))
            .accessor(MemberDecl::getter::<String>("summary").transient())
    }
}

impl Instance for Account {
    fn member(&self, accessor: &Accessor) -> Option<Member<'_>> {
        Some(match accessor.name() {
            "id" => Member::Value(self.id.to_value()),
            "balance" => Member::Value(self.balance.to_value()),
            "label" => Member::Value(self.label.to_value()),
            "summary" => Member::Value(Value::text(format!("{}={}", self.label, self.balance))),
            _ => return None,
        })
    }

    fn member_mut(&mut self, accessor: &Accessor) -> Option<MemberMut<'_>> {
        match accessor.name() {
            "id" | "balance" | "label" | "summary" => Some(MemberMut::Value),
            _ => None,
        }
    }

    fn set_member(&mut self, accessor: &Accessor, value: Value) -> Result<(), AccessError> {
        let Accessor::Method {
            getter,
            setter: Some(_),
        } = accessor
        else {
            return Err(AccessError::ReadOnly {
                name: accessor.name().to_string(),
            });
        };

        match getter.as_str() {
            "id" => self.id = FieldValue::from_member(getter, &value)?,
            "balance" => self.balance = FieldValue::from_member(getter, &value)?,
            _ => return Err(AccessError::unknown(getter)),
        }

        Ok(())
    }
}

///
/// Audited / Invoice
/// Mapped ancestor contributing the identifier; `note` is redeclared.
///

opaque_instance!(Audited);

impl Mapped for Audited {
    fn shape() -> TypeShape {
        TypeShape::ancestor::<Self>()
            .field(MemberDecl::of::<u64>("id").id())
            .field(MemberDecl::of::<i64>("created"))
            .field(MemberDecl::of::<String>("note"))
    }
}

opaque_instance!(Invoice);

impl Mapped for Invoice {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>()
            .extends::<Audited>()
            .field(MemberDecl::of::<i64>("total"))
            .field(MemberDecl::of::<Option<String>>("note"))
    }
}
