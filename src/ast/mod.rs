//! The abstract syntax tree: node arena, node variants, and the four-phase
//! lifecycle state machine.
//!
//! Nodes live in a slab arena addressed by [`NodeId`]. Child edges own their
//! subtree (deleting a node recursively deletes its descendants, exactly
//! once); the `parent` and `scope` back-references are plain handles used for
//! navigation only. The tree has exactly one root, which has no parent, is
//! never scope-initialized, and provides the global scope to its children.
//!
//! Lifecycle flags are monotonic and advance in a fixed order:
//! scope-init, setup, static analysis, evaluation. Re-entering a completed
//! phase is a no-op, except evaluation, which fails if repeated.

pub mod builder;
pub mod decl;
pub mod expr;
pub mod recovery;

pub use builder::{AstOptions, Inserted};

use crate::errors::EvalError;
use crate::runtime::scope::{Scope, ScopeId, Scopes};
use crate::types::{or_union, Type};

use self::decl::DeclState;
use self::expr::ExprState;

/// Stable handle to a node slot in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Which pair of bracket characters a brace belongs to. Closing braces only
/// match an open brace of the same style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BraceStyle {
    /// `(` `)`: bare grouping, eliminated on close.
    Paren,
    /// `[` `]`: the statement wrapper emitted by the command-line front end,
    /// also eliminated on close.
    Bracket,
    /// `{` `}`: a block, kept as a permanent tree node.
    Curly,
}

/// Binary operators collected by the expression/type-spec machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    /// Type conjunction (`&`), valid in type-specs only.
    Conj,
    /// Type disjunction (`|`), valid in type-specs only.
    Disj,
}

impl Op {
    pub fn precedence(self) -> u8 {
        match self {
            Op::Disj => 1,
            Op::Conj => 2,
            Op::Add | Op::Sub => 10,
            Op::Mul | Op::Div => 20,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Conj => "&",
            Op::Disj => "|",
        }
    }
}

/// Separator tokens. They steer the collectors but never become tree nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sep {
    /// `:` or `=`: opens the next declaration clause.
    Clause,
    /// `;`: finalizes the statement under construction.
    Semi,
}

/// A block is undecided between "sequence of statements" and "single
/// expression" until setup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockForm {
    Code,
    Expr,
}

/// State owned by a block node: its nested scope and, after setup, which
/// form it turned out to be.
#[derive(Debug, Default)]
pub struct BlockState {
    pub scope: Option<ScopeId>,
    pub form: Option<BlockForm>,
}

/// State owned by a type-spec node after setup.
#[derive(Debug, Default)]
pub struct TypeSpecState {
    pub ty: Option<Type>,
}

/// The closed set of node variants. Every dispatch site matches exhaustively,
/// so adding a variant forces each of them to be reconsidered.
#[derive(Debug)]
pub enum NodeKind {
    Root,
    Identifier,
    IntLiteral,
    StrLiteral,
    Operator(Op),
    /// An open grouping brace (paren or statement bracket). Irrelevant: it is
    /// eliminated when its closing brace arrives.
    Brace(BraceStyle),
    /// Transient: a closing brace token, discarded after matching.
    CloseBrace(BraceStyle),
    /// Transient: a separator token, consumed by the collectors.
    Separator(Sep),
    Block(BlockState),
    /// A `new` declaration statement.
    NewInit(DeclState),
    TypeSpec(TypeSpecState),
    Expression(ExprState),
    /// A procedure call; execution itself is an external collaborator.
    Command,
}

impl NodeKind {
    /// Statement-like variants get an analysis hook; everything else is a
    /// no-op at the analyze phase.
    pub fn is_statement(&self) -> bool {
        matches!(self, NodeKind::NewInit(_) | NodeKind::Command)
    }

    /// Variants that keep consuming delegated tokens after being attached.
    pub fn is_collector(&self) -> bool {
        matches!(self, NodeKind::NewInit(_) | NodeKind::Command)
    }
}

/// Monotonic lifecycle flags; transitions are false to true only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flags {
    pub initialized: bool,
    pub setup: bool,
    pub analyzed: bool,
    pub evaluated: bool,
}

/// A polymorphic tree element.
#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    /// Literal payload from the originating token (name, digits, command
    /// text); empty for punctuation-born nodes.
    pub value: String,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Lexically enclosing scope; navigation only, never freed through.
    pub scope: Option<ScopeId>,
    pub flags: Flags,
}

impl Node {
    fn new(kind: NodeKind, value: String) -> Self {
        Self {
            kind,
            value,
            children: Vec::new(),
            parent: None,
            scope: None,
            flags: Flags::default(),
        }
    }
}

/// A setup/analysis failure tagged with the node it arose on, so recovery can
/// unwind from the right place.
#[derive(Debug)]
pub(crate) struct SetupFailure {
    pub node: NodeId,
    pub error: EvalError,
}

impl SetupFailure {
    fn new(node: NodeId, error: EvalError) -> Self {
        Self { node, error }
    }
}

/// One entry of the builder's region stack: the open brace (or root) acting
/// as cursor, the statement collector currently consuming tokens, and, for a
/// grouping brace opened inside an expression, the expression whose operand
/// stack is waiting for the promoted result.
#[derive(Debug)]
pub(crate) struct RegionState {
    pub cursor: NodeId,
    pub collector: Option<NodeId>,
    pub operand_of: Option<NodeId>,
}

impl RegionState {
    pub fn new(cursor: NodeId) -> Self {
        Self {
            cursor,
            collector: None,
            operand_of: None,
        }
    }
}

/// The tree, its arenas, and the builder's cursor state.
pub struct Ast {
    pub(crate) nodes: Vec<Option<Node>>,
    pub(crate) free: Vec<usize>,
    pub(crate) scopes: Scopes,
    pub(crate) root: NodeId,
    pub(crate) regions: Vec<RegionState>,
    pub(crate) options: AstOptions,
}

// ---------------------------------------------------------------------------
// Arena plumbing
// ---------------------------------------------------------------------------

impl Ast {
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.0].as_ref().expect("node slot is freed")
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.0].as_mut().expect("node slot is freed")
    }

    pub(crate) fn alloc(&mut self, kind: NodeKind, value: String) -> NodeId {
        let node = Node::new(kind, value);
        if let Some(slot) = self.free.pop() {
            self.nodes[slot] = Some(node);
            NodeId(slot)
        } else {
            self.nodes.push(Some(node));
            NodeId(self.nodes.len() - 1)
        }
    }

    /// Frees a single childless node (transient tokens, eliminated brace
    /// shells). Subtrees go through [`Ast::delete_subtree`].
    pub(crate) fn release(&mut self, id: NodeId) {
        if let Some(node) = self.nodes[id.0].take() {
            debug_assert!(node.children.is_empty(), "released node still has children");
            self.free.push(id.0);
        }
    }

    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Deletes a node and all of its descendants, running teardown hooks:
    /// a prepared declaration reverts its provisional binding, an expression
    /// frees its detached pending nodes, a block frees its scope slot.
    pub(crate) fn delete_subtree(&mut self, id: NodeId) {
        let Some(node) = self.nodes[id.0].take() else {
            return;
        };
        tracing::debug!("destroying node {}", node.value);
        for child in node.children {
            self.delete_subtree(child);
        }
        match node.kind {
            NodeKind::NewInit(state) => {
                if state.prepared {
                    if let (Some(scope), Some(name)) = (node.scope, state.name) {
                        self.scopes.revert_if_provisional(scope, &name);
                    }
                }
            }
            NodeKind::Expression(state) => {
                for pending in state.operands.into_iter().chain(state.ops) {
                    self.delete_subtree(pending);
                }
            }
            NodeKind::Block(state) => {
                if let Some(scope) = state.scope {
                    self.scopes.release(scope);
                }
            }
            _ => {}
        }
        self.free.push(id.0);
    }

    pub(crate) fn node_depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            depth += 1;
            current = parent;
        }
        depth
    }
}

// ---------------------------------------------------------------------------
// Lifecycle state machine
// ---------------------------------------------------------------------------

impl Ast {
    /// The scope a node makes available to its children: the global scope for
    /// the root, the nested scope for a block, nothing for anyone else.
    fn defined_scope(&self, id: NodeId) -> Option<ScopeId> {
        match &self.node(id).kind {
            NodeKind::Root => Some(self.scopes.global()),
            NodeKind::Block(state) => state.scope,
            _ => None,
        }
    }

    /// Resolves and records the enclosing scope of `id` from `ancestor`: the
    /// ancestor's own scope if it defines one, else the ancestor's inherited
    /// enclosing scope. A block additionally creates its nested scope here.
    pub(crate) fn init_scope(&mut self, id: NodeId, ancestor: NodeId) -> Result<(), EvalError> {
        if id == self.root {
            return Err(EvalError::scope("the root cannot be scope-initialized"));
        }
        let resolved = self
            .defined_scope(ancestor)
            .or(self.node(ancestor).scope)
            .ok_or_else(|| EvalError::scope("ancestor provides no enclosing scope"))?;
        let nested = match &self.node(id).kind {
            NodeKind::Block(_) => Some(self.scopes.push(Scope::new(Some(resolved)))),
            _ => None,
        };
        let node = self.node_mut(id);
        node.scope = Some(resolved);
        node.flags.initialized = true;
        if let (Some(nested), NodeKind::Block(state)) = (nested, &mut node.kind) {
            state.scope = Some(nested);
        }
        Ok(())
    }

    /// Idempotent setup entry point: runs the variant-specific setup hook,
    /// then immediately advances into static analysis.
    pub(crate) fn setup_node(&mut self, id: NodeId) -> Result<(), SetupFailure> {
        if self.node(id).flags.setup {
            return Ok(());
        }
        let node = self.node(id);
        if !node.flags.initialized {
            return Err(SetupFailure::new(
                id,
                EvalError::internal("cannot set up a node before scope initialization"),
            ));
        }
        if node.parent.is_none() {
            return Err(SetupFailure::new(
                id,
                EvalError::internal("cannot set up a node with no parent"),
            ));
        }
        self.setup_hook(id)
            .map_err(|error| SetupFailure::new(id, error))?;
        self.node_mut(id).flags.setup = true;
        self.analyze_node(id)
    }

    /// Idempotent analysis step; only statement-like variants carry a hook.
    pub(crate) fn analyze_node(&mut self, id: NodeId) -> Result<(), SetupFailure> {
        let flags = self.node(id).flags;
        if flags.analyzed {
            return Ok(());
        }
        if !flags.initialized || !flags.setup {
            return Err(SetupFailure::new(
                id,
                EvalError::internal("cannot analyze a node before setup"),
            ));
        }
        if self.node(id).kind.is_statement() {
            self.analyze_hook(id)
                .map_err(|error| SetupFailure::new(id, error))?;
        }
        self.node_mut(id).flags.analyzed = true;
        Ok(())
    }

    /// Sets up a structural parent: every descendant first, children before
    /// parents, then the node itself.
    pub(crate) fn setup_as_parent(&mut self, id: NodeId) -> Result<(), SetupFailure> {
        for child in self.node(id).children.clone() {
            self.setup_as_parent(child)?;
        }
        self.setup_node(id)
    }

    /// Evaluates children depth-first, left-to-right, then the node's own
    /// hook. Not idempotent: a second evaluation fails. A direct child of the
    /// root that never reached setup (its statement was discarded by error
    /// recovery) is silently skipped.
    pub(crate) fn evaluate_node(&mut self, id: NodeId) -> Result<(), EvalError> {
        let node = self.node(id);
        if node.flags.evaluated {
            return Err(EvalError::internal("node has already been evaluated"));
        }
        if !node.flags.setup {
            if node.parent == Some(self.root) {
                tracing::debug!("skipping unfinished top-level node {}", node.value);
                return Ok(());
            }
            return Err(EvalError::internal(
                "evaluating a node that was never set up",
            ));
        }
        if !node.flags.analyzed {
            return Err(EvalError::internal(
                "evaluating a node that was never analyzed",
            ));
        }
        for child in self.node(id).children.clone() {
            self.evaluate_node(child)?;
        }
        self.evaluate_hook(id)?;
        self.node_mut(id).flags.evaluated = true;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Variant hooks
// ---------------------------------------------------------------------------

impl Ast {
    fn setup_hook(&mut self, id: NodeId) -> Result<(), EvalError> {
        match &self.node(id).kind {
            NodeKind::Root => Ok(()),
            NodeKind::Identifier | NodeKind::StrLiteral => self.require_leaf(id),
            NodeKind::IntLiteral => {
                self.require_leaf(id)?;
                let value = &self.node(id).value;
                value.parse::<i64>().map_err(|_| {
                    EvalError::structural(format!("invalid integer literal '{}'", value))
                })?;
                Ok(())
            }
            NodeKind::Operator(op) => {
                let op = *op;
                self.setup_operator(id, op)
            }
            NodeKind::Brace(_) => Err(EvalError::internal(
                "grouping brace survived to setup; it should have been eliminated",
            )),
            NodeKind::CloseBrace(_) | NodeKind::Separator(_) => {
                Err(EvalError::internal("transient token node in the tree"))
            }
            NodeKind::Block(_) => self.setup_block(id),
            NodeKind::NewInit(_) => self.setup_new_init(id),
            NodeKind::TypeSpec(_) => self.setup_type_spec(id),
            NodeKind::Expression(_) => self.setup_expression(id),
            NodeKind::Command => self.setup_command(id),
        }
    }

    fn analyze_hook(&mut self, id: NodeId) -> Result<(), EvalError> {
        match &self.node(id).kind {
            NodeKind::NewInit(_) => self.prepare_new_init(id),
            NodeKind::Command => Ok(()),
            _ => Ok(()),
        }
    }

    fn evaluate_hook(&mut self, id: NodeId) -> Result<(), EvalError> {
        match &self.node(id).kind {
            NodeKind::NewInit(_) => self.evaluate_new_init(id),
            NodeKind::Command => {
                // Actual process execution belongs to the front end; the
                // tree's responsibility ends at producing the command text.
                let text = self.cmd_text(id)?;
                tracing::info!(target: "arbor::cmd", "{}", text);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn require_leaf(&self, id: NodeId) -> Result<(), EvalError> {
        if self.node(id).children.is_empty() {
            Ok(())
        } else {
            Err(EvalError::structural(format!(
                "node '{}' cannot have children",
                self.label(id)
            )))
        }
    }

    fn setup_operator(&mut self, id: NodeId, op: Op) -> Result<(), EvalError> {
        let children = self.node(id).children.clone();
        let arity_ok = match op {
            // Minus doubles as prefix negation.
            Op::Sub => (1..=2).contains(&children.len()),
            _ => children.len() == 2,
        };
        if !arity_ok {
            return Err(EvalError::structural(format!(
                "operator '{}' has {} operand(s)",
                op.symbol(),
                children.len()
            )));
        }
        for child in children {
            match self.node(child).kind {
                NodeKind::Identifier
                | NodeKind::IntLiteral
                | NodeKind::StrLiteral
                | NodeKind::Operator(_) => {}
                _ => {
                    return Err(EvalError::structural(format!(
                        "operator '{}' has a non-operand child '{}'",
                        op.symbol(),
                        self.label(child)
                    )))
                }
            }
        }
        Ok(())
    }

    fn setup_block(&mut self, id: NodeId) -> Result<(), EvalError> {
        let children = self.node(id).children.clone();
        let form = if children.len() == 1
            && matches!(self.node(children[0]).kind, NodeKind::Expression(_))
        {
            BlockForm::Expr
        } else {
            for child in &children {
                match self.node(*child).kind {
                    NodeKind::NewInit(_) | NodeKind::Command | NodeKind::Block(_) => {}
                    _ => {
                        return Err(EvalError::structural(format!(
                            "block statement must be a declaration, command, or block, not '{}'",
                            self.label(*child)
                        )))
                    }
                }
            }
            BlockForm::Code
        };
        match &mut self.node_mut(id).kind {
            NodeKind::Block(state) => {
                if state.scope.is_none() {
                    return Err(EvalError::internal("block has no nested scope at setup"));
                }
                state.form = Some(form);
                Ok(())
            }
            _ => unreachable!("setup_block on a non-block node"),
        }
    }

    fn setup_type_spec(&mut self, id: NodeId) -> Result<(), EvalError> {
        let children = self.node(id).children.clone();
        if children.len() != 1 {
            return Err(EvalError::structural(
                "type-spec must contain exactly one type expression",
            ));
        }
        let ty = self.type_from_spec(children[0])?;
        match &mut self.node_mut(id).kind {
            NodeKind::TypeSpec(state) => {
                state.ty = Some(ty);
                Ok(())
            }
            _ => unreachable!("setup_type_spec on a non-type-spec node"),
        }
    }

    fn setup_command(&mut self, id: NodeId) -> Result<(), EvalError> {
        for child in self.node(id).children.clone() {
            match self.node(child).kind {
                NodeKind::Identifier | NodeKind::IntLiteral | NodeKind::StrLiteral => {}
                _ => {
                    return Err(EvalError::structural(format!(
                        "command argument must be a word or literal, not '{}'",
                        self.label(child)
                    )))
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Type interpretation
// ---------------------------------------------------------------------------

impl Ast {
    /// Infers the type of a value-position subtree.
    pub(crate) fn infer_type(&self, id: NodeId) -> Result<Type, EvalError> {
        let node = self.node(id);
        let scope = node
            .scope
            .ok_or_else(|| EvalError::scope("expression node has no enclosing scope"))?;
        match &node.kind {
            NodeKind::IntLiteral => self.prototype(scope, "int"),
            NodeKind::StrLiteral => self.prototype(scope, "string"),
            NodeKind::Identifier => {
                let object = self.scopes.get_object(scope, &node.value).ok_or_else(|| {
                    EvalError::scope(format!("unknown variable '{}'", node.value))
                })?;
                Ok(object.get_type().clone())
            }
            NodeKind::Operator(op @ (Op::Conj | Op::Disj)) => Err(EvalError::type_error(format!(
                "type operator '{}' in a value expression",
                op.symbol()
            ))),
            NodeKind::Operator(_) => {
                let children = &node.children;
                if children.len() == 1 {
                    // Prefix negation keeps its operand's type.
                    return self.infer_type(children[0]);
                }
                let left = self.infer_type(children[0])?;
                let right = self.infer_type(children[1])?;
                or_union(&left, &right)
            }
            _ => Err(EvalError::structural(format!(
                "'{}' is not a value expression",
                self.label(id)
            ))),
        }
    }

    /// Interprets a type-position subtree: identifiers name prototypes, `&`
    /// builds conjunctions, `|` builds simplified disjunctions.
    pub(crate) fn type_from_spec(&self, id: NodeId) -> Result<Type, EvalError> {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Identifier => {
                let scope = node
                    .scope
                    .ok_or_else(|| EvalError::scope("type-spec node has no enclosing scope"))?;
                let object = self.scopes.get_object(scope, &node.value).ok_or_else(|| {
                    EvalError::scope(format!("unknown type name '{}'", node.value))
                })?;
                Ok(Type::Basic(object))
            }
            NodeKind::Operator(op @ (Op::Conj | Op::Disj)) => {
                let children = &node.children;
                if children.len() != 2 {
                    return Err(EvalError::structural(format!(
                        "type operator '{}' needs two operands",
                        op.symbol()
                    )));
                }
                let left = self.type_from_spec(children[0])?;
                let right = self.type_from_spec(children[1])?;
                match op {
                    Op::Conj => Ok(Type::and(left, right)),
                    Op::Disj => or_union(&left, &right),
                    _ => unreachable!(),
                }
            }
            _ => Err(EvalError::structural(format!(
                "'{}' is not a type expression",
                self.label(id)
            ))),
        }
    }

    fn prototype(&self, scope: ScopeId, name: &str) -> Result<Type, EvalError> {
        let object = self
            .scopes
            .get_object(scope, name)
            .ok_or_else(|| EvalError::scope(format!("missing builtin prototype '{}'", name)))?;
        Ok(Type::Basic(object))
    }
}

// ---------------------------------------------------------------------------
// Debug printing
// ---------------------------------------------------------------------------

impl Ast {
    /// Debug rendering of the whole tree, nested parens per node.
    pub fn print(&self) -> String {
        format!("<{}>", self.print_node(self.root))
    }

    pub(crate) fn print_node(&self, id: NodeId) -> String {
        let node = self.node(id);
        let label = self.label(id);
        if node.children.is_empty() {
            label
        } else {
            let children = node
                .children
                .iter()
                .map(|c| self.print_node(*c))
                .collect::<Vec<_>>()
                .join(" ");
            format!("({} {})", label, children)
        }
    }

    pub(crate) fn label(&self, id: NodeId) -> String {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Root => "root".to_string(),
            NodeKind::Identifier => format!("id:{}", node.value),
            NodeKind::IntLiteral => format!("int:{}", node.value),
            NodeKind::StrLiteral => format!("str:{}", node.value),
            NodeKind::Operator(op) => format!("op:{}", op.symbol()),
            NodeKind::Brace(BraceStyle::Paren) => "paren".to_string(),
            NodeKind::Brace(BraceStyle::Bracket) => "bracket".to_string(),
            NodeKind::Brace(BraceStyle::Curly) => "curly".to_string(),
            NodeKind::CloseBrace(_) => "close".to_string(),
            NodeKind::Separator(_) => "sep".to_string(),
            NodeKind::Block(_) => "block".to_string(),
            NodeKind::NewInit(_) => "new".to_string(),
            NodeKind::TypeSpec(_) => "typespec".to_string(),
            NodeKind::Expression(_) => "exp".to_string(),
            NodeKind::Command => format!("cmd:{}", node.value),
        }
    }

    /// The command-line text of a procedure call. Every other variant
    /// refuses: only commands cross the execution boundary.
    pub fn cmd_text(&self, id: NodeId) -> Result<String, EvalError> {
        let node = self.node(id);
        match node.kind {
            NodeKind::Command => {
                let mut text = node.value.clone();
                for child in &node.children {
                    text.push(' ');
                    text.push_str(&self.node(*child).value);
                }
                Ok(text)
            }
            _ => Err(EvalError::structural(format!(
                "node '{}' has no command-line text",
                self.label(id)
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::token::Token;

    fn declared(name: &str) -> (Ast, NodeId) {
        let mut ast = Ast::new();
        for token in [
            Token::bare("["),
            Token::bare("new"),
            Token::new("ID", name),
            Token::bare("]"),
        ] {
            ast.insert(&token).unwrap();
        }
        let statement = ast.node(ast.root).children[0];
        (ast, statement)
    }

    #[test]
    fn setup_is_idempotent() {
        let (mut ast, statement) = declared("x");
        assert!(ast.node(statement).flags.setup);
        assert!(ast.node(statement).flags.analyzed);
        // A second pass must not re-run the hooks; re-preparing the same
        // declaration would collide with its own provisional binding.
        ast.setup_as_parent(statement).unwrap();
        ast.evaluate().unwrap();
    }

    #[test]
    fn evaluation_refuses_a_second_pass() {
        let (mut ast, statement) = declared("x");
        ast.evaluate_node(statement).unwrap();
        let err = ast.evaluate_node(statement).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn deleting_a_prepared_declaration_reverts_its_binding() {
        let (mut ast, statement) = declared("x");
        let global = ast.scopes.global();
        assert!(ast.scopes.scope(global).binding("x").is_some());
        ast.node_mut(ast.root).children.clear();
        ast.delete_subtree(statement);
        assert!(ast.scopes.scope(global).binding("x").is_none());
    }

    #[test]
    fn committed_bindings_survive_subtree_deletion() {
        let (mut ast, statement) = declared("x");
        ast.evaluate_node(statement).unwrap();
        ast.node_mut(ast.root).children.clear();
        ast.delete_subtree(statement);
        assert!(ast.scopes.get_object(ast.scopes.global(), "x").is_some());
    }

    #[test]
    fn node_depth_counts_parent_edges() {
        let (ast, statement) = declared("x");
        assert_eq!(ast.node_depth(ast.root), 0);
        assert_eq!(ast.node_depth(statement), 1);
        let name = ast.node(statement).children[0];
        assert_eq!(ast.node_depth(name), 2);
    }
}
