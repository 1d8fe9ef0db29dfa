//! Operator-precedence collection for expressions and type-specs.
//!
//! An expression node consumes an arbitrary run of operand and operator
//! tokens before its subtree is finalized. The state is a shunting-yard pair
//! of *detached* pending node stacks, owned by the collecting expression and
//! scoped to one bracketed region, so nested expression regions cannot share
//! state. Reduction folds the stacks into an
//! operator tree and attaches the single result as the expression's child.

use crate::ast::{Ast, NodeId, NodeKind};
use crate::errors::EvalError;
use crate::types::Type;

/// Pending parse state of one expression region.
#[derive(Debug, Default)]
pub struct ExprState {
    /// Detached operand nodes (and folded operator subtrees).
    pub operands: Vec<NodeId>,
    /// Detached operator nodes awaiting reduction, lowest precedence first.
    pub ops: Vec<NodeId>,
    /// True once the stacks have been folded into the child subtree.
    pub reduced: bool,
    /// Inferred type, available after setup.
    pub ty: Option<Type>,
}

impl Ast {
    /// Consumes one delegated token node for an expression mid-construction.
    pub(crate) fn expr_accept(&mut self, expr: NodeId, id: NodeId) -> Result<(), EvalError> {
        match self.node(id).kind {
            NodeKind::Identifier | NodeKind::IntLiteral | NodeKind::StrLiteral => {
                self.init_scope(id, expr)?;
                self.expr_state_mut(expr).operands.push(id);
                Ok(())
            }
            NodeKind::Operator(op) => {
                self.init_scope(id, expr)?;
                // Fold everything of equal or higher precedence first; left
                // associativity follows from the `>=`.
                loop {
                    let top = self.expr_state(expr).ops.last().copied();
                    let Some(top) = top else { break };
                    let top_op = match self.node(top).kind {
                        NodeKind::Operator(o) => o,
                        _ => return Err(EvalError::internal("non-operator on operator stack")),
                    };
                    if top_op.precedence() < op.precedence() {
                        break;
                    }
                    self.reduce_top(expr)?;
                }
                self.expr_state_mut(expr).ops.push(id);
                Ok(())
            }
            _ => Err(EvalError::structural(format!(
                "'{}' cannot appear in an expression",
                self.label(id)
            ))),
        }
    }

    /// Records an opening grouping brace as a pending operand; the builder
    /// descends into it as usual and swaps in the promoted node on close.
    pub(crate) fn expr_accept_brace(&mut self, expr: NodeId, brace: NodeId) -> Result<(), EvalError> {
        self.init_scope(brace, expr)?;
        self.expr_state_mut(expr).operands.push(brace);
        Ok(())
    }

    /// Swaps an eliminated grouping brace for its promoted replacement in the
    /// pending operand stack.
    pub(crate) fn expr_replace_operand(&mut self, expr: NodeId, old: NodeId, new: NodeId) {
        for slot in &mut self.expr_state_mut(expr).operands {
            if *slot == old {
                *slot = new;
                return;
            }
        }
    }

    /// Folds the pending stacks into a single subtree and attaches it as the
    /// expression's only child. Idempotent once reduced.
    pub(crate) fn expr_reduce(&mut self, expr: NodeId) -> Result<(), EvalError> {
        if self.expr_state(expr).reduced {
            return Ok(());
        }
        while !self.expr_state(expr).ops.is_empty() {
            self.reduce_top(expr)?;
        }
        let mut operands = std::mem::take(&mut self.expr_state_mut(expr).operands);
        match operands.len() {
            0 => Err(EvalError::structural("empty expression")),
            1 => {
                let child = operands.pop().expect("one operand");
                self.attach(expr, child);
                self.expr_state_mut(expr).reduced = true;
                Ok(())
            }
            n => {
                // Roll the stack back so teardown can free the orphans.
                self.expr_state_mut(expr).operands = operands;
                Err(EvalError::structural(format!(
                    "expression left {} dangling operands",
                    n
                )))
            }
        }
    }

    /// Pops the top operator and its two operands, folding them into one
    /// pending operand subtree.
    fn reduce_top(&mut self, expr: NodeId) -> Result<(), EvalError> {
        let state = self.expr_state_mut(expr);
        let op = state
            .ops
            .pop()
            .ok_or_else(|| EvalError::internal("operator stack underflow"))?;
        if state.operands.len() < 2 {
            state.ops.push(op);
            return Err(EvalError::structural(
                "operator is missing an operand",
            ));
        }
        let right = state.operands.pop().expect("checked above");
        let left = state.operands.pop().expect("checked above");
        self.attach(op, left);
        self.attach(op, right);
        self.expr_state_mut(expr).operands.push(op);
        Ok(())
    }

    /// Setup hook: finalize collection, set up the folded subtree (children
    /// first), and infer the expression's type.
    pub(crate) fn setup_expression(&mut self, id: NodeId) -> Result<(), EvalError> {
        self.expr_reduce(id)?;
        let child = self.node(id).children[0];
        self.setup_as_parent(child).map_err(|f| f.error)?;
        let ty = self.infer_type(child)?;
        self.expr_state_mut(id).ty = Some(ty);
        Ok(())
    }

    pub(crate) fn expr_state(&self, id: NodeId) -> &ExprState {
        match &self.node(id).kind {
            NodeKind::Expression(state) => state,
            _ => unreachable!("expression state on a non-expression node"),
        }
    }

    pub(crate) fn expr_state_mut(&mut self, id: NodeId) -> &mut ExprState {
        match &mut self.node_mut(id).kind {
            NodeKind::Expression(state) => state,
            _ => unreachable!("expression state on a non-expression node"),
        }
    }
}
