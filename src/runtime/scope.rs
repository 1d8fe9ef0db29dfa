//! Scope engine: a slab arena of lexically chained binding tables.
//!
//! Each [`Scope`] implements the transactional [`ObjectStore`] contract over
//! its own binding table; chained (lexical) resolution is layered on top by
//! [`Scopes`]. Scope slots are addressed by [`ScopeId`]; slot 0 is the global
//! scope, seeded with the builtin prototypes `object`, `int`, and `string`.

use im::HashMap;

use crate::errors::EvalError;
use crate::runtime::object::{Object, ObjectHandle};
use crate::runtime::ObjectStore;
use crate::types::Type;

/// Stable handle to a scope slot. Back-references from tree nodes carry no
/// ownership; only the arena frees slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub(crate) usize);

impl ScopeId {
    pub const GLOBAL: ScopeId = ScopeId(0);
}

/// One name bound in a scope, provisional until committed.
#[derive(Debug, Clone)]
pub struct Binding {
    pub object: ObjectHandle,
    pub committed: bool,
}

/// A single binding table with an optional lexical parent.
#[derive(Debug, Clone)]
pub struct Scope {
    parent: Option<ScopeId>,
    bindings: HashMap<String, Binding>,
}

impl Scope {
    pub fn new(parent: Option<ScopeId>) -> Self {
        Self {
            parent,
            bindings: HashMap::new(),
        }
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Any local binding, committed or provisional. Used by the duplicate
    /// check and by teardown; ordinary lookups go through `get_object`.
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }
}

impl ObjectStore for Scope {
    fn get_object(&self, name: &str) -> Option<ObjectHandle> {
        self.bindings
            .get(name)
            .filter(|b| b.committed)
            .map(|b| b.object.clone())
    }

    fn new_object(&mut self, name: &str, object: ObjectHandle) -> Result<(), EvalError> {
        if self.bindings.contains_key(name) {
            return Err(EvalError::scope(format!(
                "variable '{}' already exists",
                name
            )));
        }
        self.bindings.insert(
            name.to_string(),
            Binding {
                object,
                committed: false,
            },
        );
        Ok(())
    }

    fn commit(&mut self, name: &str) -> Result<(), EvalError> {
        match self.bindings.get_mut(name) {
            Some(binding) if !binding.committed => {
                binding.committed = true;
                Ok(())
            }
            Some(_) => Err(EvalError::scope(format!(
                "binding '{}' is already committed",
                name
            ))),
            None => Err(EvalError::scope(format!(
                "cannot commit unknown binding '{}'",
                name
            ))),
        }
    }

    fn revert(&mut self, name: &str) -> Result<(), EvalError> {
        match self.bindings.get(name) {
            Some(binding) if !binding.committed => {
                self.bindings.remove(name);
                Ok(())
            }
            Some(_) => Err(EvalError::scope(format!(
                "cannot revert committed binding '{}'",
                name
            ))),
            None => Err(EvalError::scope(format!(
                "cannot revert unknown binding '{}'",
                name
            ))),
        }
    }
}

/// Arena of scopes with free-list reuse.
#[derive(Debug)]
pub struct Scopes {
    slots: Vec<Option<Scope>>,
    free: Vec<usize>,
}

impl Scopes {
    /// Creates the arena with a seeded global scope: the root prototype
    /// `object` (type null, the ancestor-walk terminator) plus the literal
    /// prototypes `int` and `string`, both descending from `object`.
    pub fn new() -> Self {
        let mut global = Scope::new(None);
        let object = Object::new("object", Type::Null).into_handle();
        let int = Object::new("int", Type::Basic(object.clone())).into_handle();
        let string = Object::new("string", Type::Basic(object.clone())).into_handle();
        for (name, proto) in [("object", object), ("int", int), ("string", string)] {
            // Builtins are committed directly; they predate any transaction.
            global
                .new_object(name, proto)
                .and_then(|_| global.commit(name))
                .ok();
        }
        Self {
            slots: vec![Some(global)],
            free: Vec::new(),
        }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId::GLOBAL
    }

    pub fn push(&mut self, scope: Scope) -> ScopeId {
        if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(scope);
            ScopeId(slot)
        } else {
            self.slots.push(Some(scope));
            ScopeId(self.slots.len() - 1)
        }
    }

    /// Frees a scope slot. Provisional bindings disappear with it; committed
    /// objects stay alive through any handles still held elsewhere.
    pub fn release(&mut self, id: ScopeId) {
        if id == ScopeId::GLOBAL {
            return;
        }
        if self.slots[id.0].take().is_some() {
            self.free.push(id.0);
        }
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        self.slots[id.0].as_ref().expect("scope slot is freed")
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        self.slots[id.0].as_mut().expect("scope slot is freed")
    }

    /// Lexical resolution: committed bindings only, walking the parent chain.
    pub fn get_object(&self, id: ScopeId, name: &str) -> Option<ObjectHandle> {
        let mut current = Some(id);
        while let Some(scope_id) = current {
            let scope = self.scope(scope_id);
            if let Some(object) = scope.get_object(name) {
                return Some(object);
            }
            current = scope.parent();
        }
        None
    }

    pub fn new_object(
        &mut self,
        id: ScopeId,
        name: &str,
        object: ObjectHandle,
    ) -> Result<(), EvalError> {
        self.scope_mut(id).new_object(name, object)
    }

    pub fn commit(&mut self, id: ScopeId, name: &str) -> Result<(), EvalError> {
        self.scope_mut(id).commit(name)
    }

    pub fn revert(&mut self, id: ScopeId, name: &str) -> Result<(), EvalError> {
        self.scope_mut(id).revert(name)
    }

    /// Teardown helper: reverts `name` if (and only if) it is still
    /// provisional, ignoring a scope that is already gone.
    pub fn revert_if_provisional(&mut self, id: ScopeId, name: &str) {
        let Some(scope) = self.slots.get_mut(id.0).and_then(|s| s.as_mut()) else {
            return;
        };
        if matches!(scope.binding(name), Some(b) if !b.committed) {
            scope.revert(name).ok();
        }
    }
}

impl Default for Scopes {
    fn default() -> Self {
        Self::new()
    }
}
