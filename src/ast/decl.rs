//! The `new` declaration statement and its two-step scope transaction.
//!
//! Three statement forms, validated at setup against child count 1-3:
//!
//! ```text
//! new x            type and value default to the root prototype `object`
//! new x : y        type inferred from the initializer expression y
//! new x : y = z    explicit type-spec y, initializer z
//! ```
//!
//! The transaction: `prepare` (the analysis step, kicked off right after
//! setup) creates the object and inserts it into the enclosing scope as a
//! provisional binding; `evaluate` commits it. If the node is destroyed while
//! still provisional (its statement was discarded by error recovery), the
//! teardown hook in `Ast::delete_subtree` reverts the binding so the scope
//! never holds a dangling provisional entry.

use crate::ast::expr::ExprState;
use crate::ast::{Ast, NodeId, NodeKind, Sep, TypeSpecState};
use crate::errors::EvalError;
use crate::runtime::object::{Object, ObjectHandle};
use crate::types::Type;

/// Where the declaration collector is in its token run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeclPhase {
    /// Waiting for the variable name.
    #[default]
    WantName,
    /// Name seen; a `:` or `=` may open the first clause.
    HaveName,
    /// Collecting the first clause (initializer, or type-spec in hindsight).
    Clause1,
    /// Collecting the second clause (initializer after an explicit type).
    Clause2,
}

/// Collector and transaction state of a declaration node.
#[derive(Debug, Default)]
pub struct DeclState {
    pub phase: DeclPhase,
    /// The clause expression currently consuming delegated tokens.
    pub clause: Option<NodeId>,
    /// Variable name, recorded at setup.
    pub name: Option<String>,
    /// The new variable's type; owned here between setup and prepare, then
    /// transferred to the created object.
    pub ty: Option<Type>,
    /// The created object; kept so evaluation can assign the initial value
    /// without another lookup. The scope owns it, not this node.
    pub object: Option<ObjectHandle>,
    pub prepared: bool,
}

impl Ast {
    /// Consumes one delegated token node for a declaration mid-construction.
    /// Transient separator nodes are released here; anything attached gets
    /// its scope resolved immediately.
    pub(crate) fn decl_accept(&mut self, decl: NodeId, id: NodeId) -> Result<(), EvalError> {
        let phase = match &self.node(decl).kind {
            NodeKind::NewInit(state) => state.phase,
            _ => unreachable!("decl_accept on a non-declaration node"),
        };
        match phase {
            DeclPhase::WantName => match self.node(id).kind {
                NodeKind::Identifier => {
                    self.attach(decl, id);
                    self.init_scope(id, decl)?;
                    self.decl_state_mut(decl).phase = DeclPhase::HaveName;
                    Ok(())
                }
                _ => Err(EvalError::structural(format!(
                    "declaration expects a variable name, found '{}'",
                    self.label(id)
                ))),
            },
            DeclPhase::HaveName => match self.node(id).kind {
                NodeKind::Separator(Sep::Clause) => {
                    self.release(id);
                    let clause = self.open_clause(decl)?;
                    let state = self.decl_state_mut(decl);
                    state.phase = DeclPhase::Clause1;
                    state.clause = Some(clause);
                    Ok(())
                }
                _ => Err(EvalError::structural(format!(
                    "declaration expects ':' or '=' after the name, found '{}'",
                    self.label(id)
                ))),
            },
            DeclPhase::Clause1 | DeclPhase::Clause2 => {
                let clause = self
                    .decl_state(decl)
                    .clause
                    .ok_or_else(|| EvalError::internal("declaration clause is missing"))?;
                if matches!(self.node(id).kind, NodeKind::Separator(Sep::Clause)) {
                    if phase == DeclPhase::Clause2 {
                        self.release(id);
                        return Err(EvalError::structural(
                            "declaration has too many clauses; expected 'new x : type = value'",
                        ));
                    }
                    self.release(id);
                    // The first clause turns out to be an explicit type-spec;
                    // reduce it now and reinterpret the node.
                    self.expr_reduce(clause)?;
                    self.node_mut(clause).kind = NodeKind::TypeSpec(TypeSpecState::default());
                    let next = self.open_clause(decl)?;
                    let state = self.decl_state_mut(decl);
                    state.phase = DeclPhase::Clause2;
                    state.clause = Some(next);
                    Ok(())
                } else {
                    self.expr_accept(clause, id)
                }
            }
        }
    }

    fn open_clause(&mut self, decl: NodeId) -> Result<NodeId, EvalError> {
        let clause = self.alloc(NodeKind::Expression(ExprState::default()), String::new());
        self.attach(decl, clause);
        self.init_scope(clause, decl)?;
        Ok(clause)
    }

    /// Setup: validate the children against the three statement forms and
    /// determine the new variable's type.
    pub(crate) fn setup_new_init(&mut self, id: NodeId) -> Result<(), EvalError> {
        let scope = self
            .node(id)
            .scope
            .ok_or_else(|| EvalError::scope("cannot set up a declaration with no parent scope"))?;
        let children = self.node(id).children.clone();
        if children.is_empty() || children.len() > 3 {
            return Err(EvalError::structural(
                "declaration must have 1, 2, or 3 children",
            ));
        }
        if !matches!(self.node(children[0]).kind, NodeKind::Identifier) {
            return Err(EvalError::structural(
                "declaration's first child must be a variable name",
            ));
        }
        let name = self.node(children[0]).value.clone();
        tracing::debug!("declaration name is {}", name);

        let ty = match children.len() {
            // new x
            1 => {
                let object = self.scopes.get_object(scope, "object").ok_or_else(|| {
                    EvalError::scope("cannot find the root prototype 'object'")
                })?;
                Type::Basic(object)
            }
            // new x : y
            2 => match &self.node(children[1]).kind {
                NodeKind::Expression(state) => state.ty.clone().ok_or_else(|| {
                    EvalError::internal("initializer expression has no inferred type")
                })?,
                _ => {
                    return Err(EvalError::structural(
                        "declaration's second child should have been an expression",
                    ))
                }
            },
            // new x : y = z
            3 => {
                let spec_ty = match &self.node(children[1]).kind {
                    NodeKind::TypeSpec(state) => state.ty.clone().ok_or_else(|| {
                        EvalError::internal("type-spec has no interpreted type")
                    })?,
                    _ => {
                        return Err(EvalError::structural(
                            "declaration's second child should have been a type-spec",
                        ))
                    }
                };
                let init_ty = match &self.node(children[2]).kind {
                    NodeKind::Expression(state) => state.ty.clone().ok_or_else(|| {
                        EvalError::internal("initializer expression has no inferred type")
                    })?,
                    _ => {
                        return Err(EvalError::structural(
                            "declaration's third child should have been an expression",
                        ))
                    }
                };
                // Deferred pending conformance-suite semantics; off by default.
                if self.options.validate_initializer_types
                    && !spec_ty.is_compatible(&init_ty)?
                {
                    return Err(EvalError::type_error(format!(
                        "initial value of type {} does not match declared type {} of variable {}",
                        init_ty, spec_ty, name
                    )));
                }
                spec_ty
            }
            _ => unreachable!(),
        };

        let state = self.decl_state_mut(id);
        state.name = Some(name);
        state.ty = Some(ty);
        Ok(())
    }

    /// Analysis: create the object and insert it into the enclosing scope as
    /// a provisional binding. The object takes ownership of the type.
    pub(crate) fn prepare_new_init(&mut self, id: NodeId) -> Result<(), EvalError> {
        let scope = self
            .node(id)
            .scope
            .ok_or_else(|| EvalError::scope("cannot prepare a declaration with no parent scope"))?;
        let (name, ty) = {
            let state = self.decl_state_mut(id);
            let name = state
                .name
                .clone()
                .ok_or_else(|| EvalError::internal("declaration prepared before setup"))?;
            let ty = state.ty.take().ok_or_else(|| {
                EvalError::scope("cannot prepare a declaration whose type is undetermined")
            })?;
            (name, ty)
        };
        if self.scopes.get_object(scope, &name).is_some() {
            // Put the type back so a retried setup stays coherent.
            self.decl_state_mut(id).ty = Some(ty);
            return Err(EvalError::scope(format!(
                "variable '{}' already exists",
                name
            )));
        }
        let object = Object::new(name.clone(), ty).into_handle();
        self.scopes.new_object(scope, &name, object.clone())?;
        let state = self.decl_state_mut(id);
        state.object = Some(object);
        state.prepared = true;
        Ok(())
    }

    /// Evaluation: commit the provisional binding. Initial-value assignment
    /// is runtime-value territory, outside this core.
    pub(crate) fn evaluate_new_init(&mut self, id: NodeId) -> Result<(), EvalError> {
        let scope = self
            .node(id)
            .scope
            .ok_or_else(|| EvalError::scope("cannot evaluate a declaration with no parent scope"))?;
        let state = self.decl_state(id);
        if !state.prepared {
            return Err(EvalError::scope(
                "cannot evaluate a declaration before it is prepared",
            ));
        }
        let name = state
            .name
            .clone()
            .ok_or_else(|| EvalError::internal("declaration evaluated before setup"))?;
        self.scopes.commit(scope, &name)?;
        self.decl_state_mut(id).prepared = false;
        tracing::debug!("committed declaration of {}", name);
        Ok(())
    }

    pub(crate) fn decl_state(&self, id: NodeId) -> &DeclState {
        match &self.node(id).kind {
            NodeKind::NewInit(state) => state,
            _ => unreachable!("declaration state on a non-declaration node"),
        }
    }

    pub(crate) fn decl_state_mut(&mut self, id: NodeId) -> &mut DeclState {
        match &mut self.node_mut(id).kind {
            NodeKind::NewInit(state) => state,
            _ => unreachable!("declaration state on a non-declaration node"),
        }
    }
}
