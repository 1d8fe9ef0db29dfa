//! Incremental construction: cursor movement, brace elimination, promotion,
//! and the structural failure modes of the token stream.

use pretty_assertions::assert_eq;

use arbor::{Ast, ErrorKind, EvalError, Inserted, Token};

fn feed(ast: &mut Ast, tokens: &[Token]) {
    for token in tokens {
        match ast.insert(token) {
            Ok(Inserted::Ok) => {}
            Ok(Inserted::Recovered(err)) => panic!("unexpected recovery on {}: {}", token, err),
            Err(err) => panic!("unexpected fatal error on {}: {}", token, err),
        }
    }
}

fn fatal_kind(result: Result<Inserted, EvalError>) -> ErrorKind {
    match result {
        Err(err) => err.kind(),
        other => panic!("expected a fatal error, got {:?}", other),
    }
}

#[test]
fn bracketed_statement_sheds_its_wrapper() {
    let mut ast = Ast::new();
    feed(
        &mut ast,
        &[
            Token::bare("["),
            Token::bare("new"),
            Token::new("ID", "x"),
            Token::bare("]"),
        ],
    );
    assert_eq!(ast.print(), "<(root (new id:x))>");
    assert!(ast.at_root());
}

#[test]
fn cursor_depth_tracks_open_braces() {
    let mut ast = Ast::new();
    assert_eq!(ast.depth(), 0);
    feed(&mut ast, &[Token::bare("[")]);
    assert_eq!(ast.depth(), 1);
    feed(&mut ast, &[Token::bare("{")]);
    assert_eq!(ast.depth(), 2);
    feed(&mut ast, &[Token::bare("}")]);
    assert_eq!(ast.depth(), 1);
    assert!(!ast.at_root());
}

#[test]
fn evaluate_is_a_no_op_while_a_brace_is_open() {
    let mut ast = Ast::new();
    feed(&mut ast, &[Token::bare("[")]);
    assert!(!ast.evaluate().unwrap());
    assert_eq!(ast.depth(), 1);
}

#[test]
fn operator_precedence_shapes_the_initializer() {
    let mut ast = Ast::new();
    feed(
        &mut ast,
        &[
            Token::bare("["),
            Token::bare("new"),
            Token::new("ID", "x"),
            Token::bare(":"),
            Token::new("INT", "1"),
            Token::bare("PLUS"),
            Token::new("INT", "2"),
            Token::bare("MULT"),
            Token::new("INT", "3"),
            Token::bare("]"),
        ],
    );
    assert_eq!(
        ast.print(),
        "<(root (new id:x (exp (op:+ int:1 (op:* int:2 int:3)))))>"
    );
}

#[test]
fn equal_precedence_folds_left_to_right() {
    let mut ast = Ast::new();
    feed(
        &mut ast,
        &[
            Token::bare("["),
            Token::bare("new"),
            Token::new("ID", "x"),
            Token::bare(":"),
            Token::new("INT", "1"),
            Token::bare("MINUS"),
            Token::new("INT", "2"),
            Token::bare("PLUS"),
            Token::new("INT", "3"),
            Token::bare("]"),
        ],
    );
    assert_eq!(
        ast.print(),
        "<(root (new id:x (exp (op:+ (op:- int:1 int:2) int:3))))>"
    );
}

#[test]
fn paren_in_expression_promotes_prefix_minus() {
    let mut ast = Ast::new();
    feed(
        &mut ast,
        &[
            Token::bare("["),
            Token::bare("new"),
            Token::new("ID", "x"),
            Token::bare(":"),
            Token::bare("("),
            Token::bare("MINUS"),
            Token::new("INT", "5"),
            Token::bare(")"),
            Token::bare("]"),
        ],
    );
    assert_eq!(ast.print(), "<(root (new id:x (exp (op:- int:5))))>");
}

#[test]
fn paren_promotion_hands_spare_children_to_the_promoted_node() {
    let mut ast = Ast::new();
    feed(
        &mut ast,
        &[
            Token::bare("["),
            Token::new("cmd", "echo"),
            Token::new("ID", "a"),
            Token::bare("]"),
        ],
    );
    assert_eq!(ast.print(), "<(root (cmd:echo id:a))>");
}

#[test]
fn brace_mismatch_is_fatal() {
    let mut ast = Ast::new();
    feed(&mut ast, &[Token::bare("["), Token::bare("new")]);
    let kind = fatal_kind(ast.insert(&Token::bare(")")));
    assert_eq!(kind, ErrorKind::Structural);
}

#[test]
fn closing_at_the_root_is_fatal() {
    let mut ast = Ast::new();
    let kind = fatal_kind(ast.insert(&Token::bare("]")));
    assert_eq!(kind, ErrorKind::Structural);
}

#[test]
fn empty_grouping_braces_are_fatal() {
    let mut ast = Ast::new();
    feed(&mut ast, &[Token::bare("["), Token::bare("(")]);
    let kind = fatal_kind(ast.insert(&Token::bare(")")));
    assert_eq!(kind, ErrorKind::Structural);
}

#[test]
fn unknown_token_kind_is_fatal() {
    let mut ast = Ast::new();
    let kind = fatal_kind(ast.insert(&Token::new("WAT", "?")));
    assert_eq!(kind, ErrorKind::Structural);
}

#[test]
fn clause_separator_outside_a_statement_is_fatal() {
    let mut ast = Ast::new();
    feed(&mut ast, &[Token::bare("[")]);
    let kind = fatal_kind(ast.insert(&Token::bare(":")));
    assert_eq!(kind, ErrorKind::Structural);
}

#[test]
fn stray_semicolon_is_a_no_op() {
    let mut ast = Ast::new();
    assert!(matches!(
        ast.insert(&Token::bare(";")),
        Ok(Inserted::Ok)
    ));
    assert_eq!(ast.print(), "<root>");
}

#[test]
fn block_collects_statements_and_owns_a_scope() {
    let mut ast = Ast::new();
    feed(
        &mut ast,
        &[
            Token::bare("{"),
            Token::bare("new"),
            Token::new("ID", "x"),
            Token::bare(";"),
            Token::new("cmd", "echo"),
            Token::bare("}"),
        ],
    );
    assert_eq!(ast.print(), "<(root (block (new id:x) cmd:echo))>");
    assert!(ast.evaluate().unwrap());
    // The block's scope died with the block; nothing leaked to the session.
    assert!(ast.global_object("x").is_none());
}

#[test]
fn block_rejects_non_statement_children() {
    let mut ast = Ast::new();
    feed(&mut ast, &[Token::bare("{"), Token::new("ID", "a")]);
    match ast.insert(&Token::bare("}")) {
        Ok(Inserted::Recovered(err)) => assert_eq!(err.kind(), ErrorKind::Structural),
        other => panic!("expected recovery, got {:?}", other),
    }
    assert_eq!(ast.print(), "<root>");
    assert!(ast.at_root());
}

#[test]
fn recovery_inside_a_block_keeps_the_block_open() {
    let mut ast = Ast::new();
    feed(
        &mut ast,
        &[
            Token::bare("{"),
            Token::bare("new"),
            Token::new("ID", "x"),
            Token::bare(":"),
        ],
    );
    // Empty initializer clause: the statement is discarded at the semicolon,
    // but the enclosing block stays open for more statements.
    match ast.insert(&Token::bare(";")) {
        Ok(Inserted::Recovered(err)) => assert_eq!(err.kind(), ErrorKind::Structural),
        other => panic!("expected recovery, got {:?}", other),
    }
    assert_eq!(ast.depth(), 1);
    feed(
        &mut ast,
        &[
            Token::bare("new"),
            Token::new("ID", "y"),
            Token::bare(":"),
            Token::new("INT", "5"),
            Token::bare(";"),
            Token::bare("}"),
        ],
    );
    assert_eq!(ast.print(), "<(root (block (new id:y (exp int:5))))>");
    assert!(ast.evaluate().unwrap());
}

#[test]
fn curly_brace_cannot_open_inside_an_expression() {
    let mut ast = Ast::new();
    feed(
        &mut ast,
        &[
            Token::bare("["),
            Token::bare("new"),
            Token::new("ID", "x"),
            Token::bare(":"),
        ],
    );
    let kind = fatal_kind(ast.insert(&Token::bare("{")));
    assert_eq!(kind, ErrorKind::Structural);
}

#[test]
fn evaluate_discards_spent_statements() {
    let mut ast = Ast::new();
    feed(
        &mut ast,
        &[
            Token::bare("["),
            Token::bare("new"),
            Token::new("ID", "x"),
            Token::bare("]"),
        ],
    );
    assert!(ast.evaluate().unwrap());
    assert_eq!(ast.print(), "<root>");
    // The committed binding outlives its statement.
    assert!(ast.global_object("x").is_some());
}

#[test]
fn evaluate_clears_a_stale_root_collector() {
    let mut ast = Ast::new();
    // A statement left mid-construction at root depth is skipped and
    // discarded by evaluation; it must not keep collecting afterwards.
    feed(&mut ast, &[Token::bare("new")]);
    assert!(ast.evaluate().unwrap());
    assert_eq!(ast.print(), "<root>");
    feed(
        &mut ast,
        &[Token::bare("new"), Token::new("ID", "x"), Token::bare(";")],
    );
    assert!(ast.evaluate().unwrap());
    assert!(ast.global_object("x").is_some());
}

#[test]
fn reset_discards_the_tree_but_not_the_session() {
    let mut ast = Ast::new();
    feed(
        &mut ast,
        &[
            Token::bare("["),
            Token::bare("new"),
            Token::new("ID", "x"),
            Token::bare("]"),
        ],
    );
    assert!(ast.evaluate().unwrap());
    feed(&mut ast, &[Token::bare("{"), Token::bare("new")]);
    ast.reset();
    assert_eq!(ast.print(), "<root>");
    assert!(ast.at_root());
    assert!(ast.global_object("x").is_some());
}
