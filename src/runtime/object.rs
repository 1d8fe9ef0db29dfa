//! Prototype objects: the nominal carriers behind [`Type::Basic`].
//!
//! Objects are immutable once constructed and shared by handle. The tree
//! never frees an object through a type; ownership sits with the scope that
//! declared it (and with any types still holding a handle).

use std::collections::HashMap;
use std::rc::Rc;

use crate::types::Type;

/// Shared, immutable handle to a prototype object.
pub type ObjectHandle = Rc<Object>;

/// A named object with a declared type and a fixed member table.
#[derive(Debug)]
pub struct Object {
    name: String,
    ty: Type,
    members: HashMap<String, ObjectHandle>,
}

impl Object {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            members: HashMap::new(),
        }
    }

    /// Builder-style member registration, for seeding prototypes.
    pub fn with_member(mut self, name: impl Into<String>, member: ObjectHandle) -> Self {
        self.members.insert(name.into(), member);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The object's declared type. Callers duplicate it (`clone`) when they
    /// need an owned instance.
    pub fn get_type(&self) -> &Type {
        &self.ty
    }

    /// Member lookup: own members first, then the ancestor chain through the
    /// declared type.
    pub fn get_member(&self, name: &str) -> Option<ObjectHandle> {
        if let Some(member) = self.members.get(name) {
            return Some(member.clone());
        }
        // A failing ancestor query (e.g. a disjunction ancestor) is treated
        // as an absent member, not an error.
        self.ty.get_member(name).ok().flatten()
    }

    pub fn into_handle(self) -> ObjectHandle {
        Rc::new(self)
    }
}
