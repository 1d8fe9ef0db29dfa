//! Arbor is the structural core of a tree-walking command language: it turns
//! a stream of lexed tokens into an abstract syntax tree, one token at a
//! time, and runs each statement through a fixed lifecycle the moment it is
//! structurally complete.
//!
//! The pieces:
//!
//! - **Incremental construction** ([`Ast::insert`]): tokens attach at a
//!   cursor that descends into opening braces and ascends at closing ones.
//!   Grouping braces (`(...)`, and the `[...]` wrappers a command-line front
//!   end emits around each line) are eliminated from the finished tree by
//!   promoting their first child; `{...}` blocks are kept and own a nested
//!   scope.
//! - **Lifecycle** (`ast` module): scope-init at insertion, then setup,
//!   static analysis, and evaluation per node, with monotonic per-node flags.
//! - **Error recovery** (`ast::recovery`): a malformed statement is deleted
//!   wholesale and the session continues at the nearest enclosing block.
//! - **Type algebra** ([`types`]): null, basic (prototype-backed), and
//!   and/or compound types, with member lookup and directional compatibility.
//! - **Scope transactions** ([`runtime`]): declarations insert provisional
//!   bindings at analysis and commit them at evaluation, so a discarded
//!   statement can revert cleanly.
//!
//! ```
//! use arbor::{Ast, Token};
//!
//! let mut ast = Ast::new();
//! for token in [
//!     Token::bare("["),
//!     Token::new("new", ""),
//!     Token::new("ID", "x"),
//!     Token::new(":", ""),
//!     Token::new("INT", "5"),
//!     Token::bare("]"),
//! ] {
//!     ast.insert(&token).unwrap();
//! }
//! assert!(ast.evaluate().unwrap());
//! assert!(ast.global_object("x").is_some());
//! ```

pub mod ast;
pub mod errors;
pub mod runtime;
pub mod token;
pub mod types;

pub use ast::{Ast, AstOptions, Inserted};
pub use errors::{ErrorKind, EvalError};
pub use runtime::object::{Object, ObjectHandle};
pub use runtime::scope::{Scope, ScopeId, Scopes};
pub use runtime::ObjectStore;
pub use token::Token;
pub use types::{or_union, Type};
