//! Runtime collaborators of the tree: prototype objects and the scope engine.
//!
//! The tree itself only depends on the narrow transactional contract in
//! [`ObjectStore`]; the types here are the in-crate reference implementation
//! of that contract. A different storage engine can stand in as long as it
//! honors the same provisional/commit/revert semantics.

pub mod object;
pub mod scope;

pub use object::{Object, ObjectHandle};
pub use scope::{Binding, Scope, ScopeId, Scopes};

use crate::errors::EvalError;

/// The transactional binding contract a declaration node relies on.
///
/// A declaration first inserts a *provisional* binding (`new_object`), then
/// either finalizes it (`commit`) at evaluation time or withdraws it
/// (`revert`) if the declaration is destroyed before evaluating. Lookups
/// through `get_object` see committed bindings only.
pub trait ObjectStore {
    /// Committed binding for `name` in this store, if any.
    fn get_object(&self, name: &str) -> Option<ObjectHandle>;

    /// Inserts a provisional binding. Fails if `name` is already bound here,
    /// provisionally or otherwise.
    fn new_object(&mut self, name: &str, object: ObjectHandle) -> Result<(), EvalError>;

    /// Finalizes a provisional binding, making it visible to lookups and no
    /// longer revertible.
    fn commit(&mut self, name: &str) -> Result<(), EvalError>;

    /// Removes a provisional (not yet committed) binding.
    fn revert(&mut self, name: &str) -> Result<(), EvalError>;
}
