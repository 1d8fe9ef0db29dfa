//! Incremental tree construction from the token stream.
//!
//! The builder holds a cursor (the currently open region) and consumes one
//! token at a time. Non-brace tokens attach at the cursor (or are delegated
//! to the statement collector mid-construction there); an opening brace
//! descends; a closing brace finalizes the region, eliminating bare grouping
//! braces by promoting their first child into the parent slot.
//!
//! Failures raised while finalizing a region are converted into a
//! [`Inserted::Recovered`] outcome by error recovery (`recovery` module);
//! everything else is returned as a fatal error.

use crate::ast::decl::DeclState;
use crate::ast::{Ast, BlockState, BraceStyle, NodeId, NodeKind, RegionState, Sep};
use crate::errors::EvalError;
use crate::runtime::object::ObjectHandle;
use crate::runtime::scope::Scopes;
use crate::token::Token;

/// Tunable behavior of the tree.
#[derive(Debug, Clone, Default)]
pub struct AstOptions {
    /// Check an explicit type-spec against the initializer's inferred type.
    /// Deferred pending conformance-suite semantics; off by default.
    pub validate_initializer_types: bool,
}

/// Outcome of inserting one token.
///
/// `Recovered` means the statement under construction was malformed: its
/// subtree has been discarded, the cursor sits at the nearest enclosing block
/// (or the root), and the session may keep feeding tokens.
#[derive(Debug)]
pub enum Inserted {
    Ok,
    Recovered(EvalError),
}

impl Ast {
    pub fn new() -> Self {
        Self::with_options(AstOptions::default())
    }

    pub fn with_options(options: AstOptions) -> Self {
        let mut ast = Ast {
            nodes: Vec::new(),
            free: Vec::new(),
            scopes: Scopes::new(),
            root: NodeId(0),
            regions: Vec::new(),
            options,
        };
        let root = ast.alloc(NodeKind::Root, String::new());
        ast.root = root;
        ast.regions.push(RegionState::new(root));
        ast
    }

    /// True when every opened brace has been closed again.
    pub fn at_root(&self) -> bool {
        self.regions.len() == 1
    }

    /// How many braces are currently open.
    pub fn depth(&self) -> usize {
        self.regions.len() - 1
    }

    fn cursor(&self) -> NodeId {
        self.regions
            .last()
            .expect("region stack is never empty")
            .cursor
    }

    /// Committed global binding, for callers inspecting session state.
    pub fn global_object(&self, name: &str) -> Option<ObjectHandle> {
        self.scopes.get_object(self.scopes.global(), name)
    }

    /// Consumes one token, growing the tree by one step.
    pub fn insert(&mut self, token: &Token) -> Result<Inserted, EvalError> {
        let id = self.make_node(token)?;
        let outcome = match self.node(id).kind {
            NodeKind::CloseBrace(style) => {
                // The closing token carries no tree-level meaning.
                self.release(id);
                self.close_region(style)
            }
            NodeKind::Separator(Sep::Semi) => {
                self.release(id);
                self.end_statement()
            }
            _ => self.insert_node(id),
        };
        if outcome.is_ok() {
            tracing::debug!("ast: {}", self.print());
        }
        outcome
    }

    /// Pure factory: maps a token's kind tag to a fresh, unattached node.
    pub(crate) fn make_node(&mut self, token: &Token) -> Result<NodeId, EvalError> {
        use crate::ast::Op;
        let kind = match token.kind.as_str() {
            "ID" => NodeKind::Identifier,
            "INT" => NodeKind::IntLiteral,
            "STR" => NodeKind::StrLiteral,
            "new" => NodeKind::NewInit(DeclState::default()),
            "cmd" => NodeKind::Command,
            "PLUS" => NodeKind::Operator(Op::Add),
            "MINUS" => NodeKind::Operator(Op::Sub),
            "MULT" => NodeKind::Operator(Op::Mul),
            "DIV" => NodeKind::Operator(Op::Div),
            "AMP" => NodeKind::Operator(Op::Conj),
            "PIPE" => NodeKind::Operator(Op::Disj),
            ":" | "=" => NodeKind::Separator(Sep::Clause),
            ";" => NodeKind::Separator(Sep::Semi),
            "(" => NodeKind::Brace(BraceStyle::Paren),
            "[" => NodeKind::Brace(BraceStyle::Bracket),
            "{" => NodeKind::Block(BlockState::default()),
            ")" => NodeKind::CloseBrace(BraceStyle::Paren),
            "]" => NodeKind::CloseBrace(BraceStyle::Bracket),
            "}" => NodeKind::CloseBrace(BraceStyle::Curly),
            _ => {
                return Err(EvalError::structural(format!(
                    "unsupported token {}",
                    token
                )))
            }
        };
        Ok(self.alloc(kind, token.value.clone()))
    }

    /// Attaches a freshly made node at the cursor, delegating to the open
    /// statement collector when one is mid-construction.
    fn insert_node(&mut self, id: NodeId) -> Result<Inserted, EvalError> {
        let cursor = self.cursor();
        match self.node(id).kind {
            NodeKind::Brace(style) => {
                if let Some(expr) = self.open_clause_expr() {
                    if style != BraceStyle::Paren {
                        self.release(id);
                        return Err(EvalError::structural(
                            "only parentheses may group inside an expression",
                        ));
                    }
                    // Pending operand: the promoted node will replace the
                    // brace in the operand stack when the region closes.
                    self.expr_accept_brace(expr, id)?;
                    self.regions.push(RegionState {
                        cursor: id,
                        collector: None,
                        operand_of: Some(expr),
                    });
                } else {
                    self.attach(cursor, id);
                    self.init_scope(id, cursor)?;
                    self.regions.push(RegionState::new(id));
                }
                Ok(Inserted::Ok)
            }
            NodeKind::Block(_) => {
                if self.region_collector().is_some() {
                    self.release(id);
                    return Err(EvalError::structural(
                        "a block cannot appear inside a statement",
                    ));
                }
                self.attach(cursor, id);
                self.init_scope(id, cursor)?;
                self.regions.push(RegionState::new(id));
                Ok(Inserted::Ok)
            }
            _ => {
                if let Some(collector) = self.region_collector() {
                    self.delegate(collector, id)?;
                    return Ok(Inserted::Ok);
                }
                if matches!(self.node(id).kind, NodeKind::Separator(_)) {
                    self.release(id);
                    return Err(EvalError::structural(
                        "separator outside of a statement",
                    ));
                }
                self.attach(cursor, id);
                self.init_scope(id, cursor)?;
                if self.node(id).kind.is_collector() {
                    self.regions
                        .last_mut()
                        .expect("region stack is never empty")
                        .collector = Some(id);
                }
                Ok(Inserted::Ok)
            }
        }
    }

    fn region_collector(&self) -> Option<NodeId> {
        self.regions.last().and_then(|r| r.collector)
    }

    /// The expression clause currently open for delegated tokens, if the
    /// region's collector has one.
    fn open_clause_expr(&self) -> Option<NodeId> {
        let collector = self.region_collector()?;
        match &self.node(collector).kind {
            NodeKind::NewInit(state) => state.clause.filter(|clause| {
                matches!(self.node(*clause).kind, NodeKind::Expression(_))
            }),
            _ => None,
        }
    }

    fn delegate(&mut self, collector: NodeId, id: NodeId) -> Result<(), EvalError> {
        match self.node(collector).kind {
            NodeKind::NewInit(_) => self.decl_accept(collector, id),
            NodeKind::Command => self.command_accept(collector, id),
            _ => Err(EvalError::internal("region collector is not a statement")),
        }
    }

    fn command_accept(&mut self, cmd: NodeId, id: NodeId) -> Result<(), EvalError> {
        match self.node(id).kind {
            NodeKind::Identifier | NodeKind::IntLiteral | NodeKind::StrLiteral => {
                self.attach(cmd, id);
                self.init_scope(id, cmd)
            }
            _ => {
                let label = self.label(id);
                self.release(id);
                Err(EvalError::structural(format!(
                    "'{}' cannot appear in a command",
                    label
                )))
            }
        }
    }

    /// Handles a closing brace: match the open brace, eliminate or keep it,
    /// finalize the region, ascend one level.
    fn close_region(&mut self, style: BraceStyle) -> Result<Inserted, EvalError> {
        if self.regions.len() == 1 {
            return Err(EvalError::structural("cannot ascend above the root"));
        }
        let open = self.cursor();
        let open_style = match &self.node(open).kind {
            NodeKind::Brace(s) => *s,
            NodeKind::Block(_) => BraceStyle::Curly,
            _ => return Err(EvalError::internal("region cursor is not a brace")),
        };
        if open_style != style {
            return Err(EvalError::structural(format!(
                "brace mismatch: {:?} region closed by {:?} token",
                open_style, style
            )));
        }

        if matches!(self.node(open).kind, NodeKind::Block(_)) {
            // Relevant brace: the block stays, and is now structurally
            // complete, so its whole region is set up and analyzed.
            self.regions.pop();
            if let Err(failure) = self.setup_as_parent(open) {
                return self.recover(failure);
            }
            return Ok(Inserted::Ok);
        }

        // Irrelevant grouping brace: eliminate it. The first child is
        // promoted into the brace's place; the remaining children become the
        // promoted node's children.
        let children = self.node(open).children.clone();
        if children.is_empty() {
            return Err(EvalError::structural("empty grouping braces"));
        }
        let promoted = children[0];
        for extra in &children[1..] {
            self.node_mut(promoted).children.push(*extra);
            self.node_mut(*extra).parent = Some(promoted);
        }
        self.node_mut(open).children.clear();

        let operand_of = self
            .regions
            .last()
            .expect("region stack is never empty")
            .operand_of;
        if let Some(expr) = operand_of {
            // The brace was a pending operand of an expression one region
            // up; the promoted subtree stays detached until that clause is
            // reduced, which also defers its setup to clause finalization.
            self.node_mut(promoted).parent = None;
            self.regions.pop();
            self.expr_replace_operand(expr, open, promoted);
            self.release(open);
            return Ok(Inserted::Ok);
        }

        let parent = self
            .node(open)
            .parent
            .ok_or_else(|| EvalError::internal("open brace has no parent"))?;
        let pos = self
            .node(parent)
            .children
            .iter()
            .position(|c| *c == open)
            .ok_or_else(|| EvalError::internal("open brace is not among its parent's children"))?;
        self.node_mut(parent).children[pos] = promoted;
        self.node_mut(promoted).parent = Some(parent);
        self.release(open);
        self.regions.pop();
        if let Err(failure) = self.setup_as_parent(promoted) {
            return self.recover(failure);
        }
        Ok(Inserted::Ok)
    }

    /// `;`: finalizes the statement under construction, if any.
    fn end_statement(&mut self) -> Result<Inserted, EvalError> {
        let collector = self
            .regions
            .last_mut()
            .expect("region stack is never empty")
            .collector
            .take();
        if let Some(statement) = collector {
            if let Err(failure) = self.setup_as_parent(statement) {
                return self.recover(failure);
            }
        }
        Ok(Inserted::Ok)
    }

    /// Runs the program accumulated at the root, then discards the spent
    /// statements. Reports `Ok(false)` while the tree is still
    /// mid-construction (some brace is open).
    pub fn evaluate(&mut self) -> Result<bool, EvalError> {
        if !self.at_root() {
            tracing::debug!("not at root; not ready to run");
            return Ok(false);
        }
        for child in self.node(self.root).children.clone() {
            self.evaluate_node(child)?;
        }
        // Spent statements are discarded; the global scope persists. The
        // region stack is rebuilt too, since the root region may still hold
        // a collector for a statement that never finished (now deleted).
        let children = std::mem::take(&mut self.node_mut(self.root).children);
        for child in children {
            self.delete_subtree(child);
        }
        self.regions = vec![RegionState::new(self.root)];
        Ok(true)
    }

    /// Discards the whole tree and returns the cursor to the root. The
    /// global scope survives a reset.
    pub fn reset(&mut self) {
        tracing::info!("resetting ast {}", self.print());
        let children = std::mem::take(&mut self.node_mut(self.root).children);
        for child in children {
            self.delete_subtree(child);
        }
        self.regions = vec![RegionState::new(self.root)];
    }
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}
