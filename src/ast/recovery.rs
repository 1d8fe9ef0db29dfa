//! Error recovery: discarding a malformed statement without losing the
//! session.
//!
//! When setup or analysis of a finalized region fails, the failing subtree
//! and everything inserted after it in the same block are deleted, and the
//! builder's cursor is rewound to the nearest enclosing block (or the root).
//! Deletion runs the usual teardown hooks, so a declaration that had already
//! prepared its binding reverts it on the way out.

use crate::ast::{Ast, Inserted, NodeId, NodeKind, RegionState, SetupFailure};
use crate::errors::EvalError;

impl Ast {
    /// Unwinds from a setup/analysis failure. Returns `Inserted::Recovered`
    /// carrying the original error once the tree is consistent again; a
    /// failure during the unwind itself is fatal.
    pub(crate) fn recover(&mut self, failure: SetupFailure) -> Result<Inserted, EvalError> {
        let SetupFailure { node, error } = failure;
        tracing::debug!("recovering from error: {}", error);
        let mut child = node;
        loop {
            let Some(parent) = self.node(child).parent else {
                return Err(EvalError::internal(format!(
                    "recovery found a detached node while unwinding from: {}",
                    error
                )));
            };
            if matches!(self.node(parent).kind, NodeKind::Block(_) | NodeKind::Root) {
                self.discard_from(parent, child)?;
                tracing::debug!(
                    "resuming at {} (depth {})",
                    self.label(parent),
                    self.node_depth(parent)
                );
                self.resume_at(parent);
                return Ok(Inserted::Recovered(error));
            }
            child = parent;
        }
    }

    /// Deletes `child` and every later sibling from `block`. Later siblings
    /// go too: they were inserted after the malformed statement began and
    /// belong to it.
    fn discard_from(&mut self, block: NodeId, child: NodeId) -> Result<(), EvalError> {
        let pos = self
            .node(block)
            .children
            .iter()
            .position(|c| *c == child)
            .ok_or_else(|| {
                EvalError::internal("failing subtree is not a child of its recovery block")
            })?;
        let doomed: Vec<NodeId> = self.node_mut(block).children.drain(pos..).collect();
        for id in doomed {
            self.delete_subtree(id);
        }
        Ok(())
    }

    /// Rebuilds the region stack along the ancestor path down to `cursor`,
    /// with no collector mid-construction anywhere on it.
    fn resume_at(&mut self, cursor: NodeId) {
        let mut path = vec![cursor];
        let mut current = cursor;
        while let Some(parent) = self.node(current).parent {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        self.regions = path.into_iter().map(RegionState::new).collect();
    }
}
