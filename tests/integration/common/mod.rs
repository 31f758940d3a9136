#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

use lv6::parser::ast::*;
use lv6::span::Spanned;
use lv6::{Diagnostic, DiagnosticKind, ParseResult};

pub fn lv6() -> Command {
    Command::new(env!("CARGO_BIN_EXE_lv6"))
}

/// Run the CLI inside `dir` so config discovery never escapes the temp directory.
pub fn run_in(dir: &Path, args: &[&str]) -> Output {
    lv6().current_dir(dir).args(args).output().unwrap()
}

/// Parse and expect no diagnostics at all.
pub fn parse_ok(source: &str) -> SourceFile {
    let result = lv6::parse(source);
    assert!(
        result.diagnostics.is_empty(),
        "unexpected diagnostics for:\n{}\n{:#?}",
        source,
        result.diagnostics
    );
    result.ast
}

/// Parse and expect at least one diagnostic.
pub fn parse_err(source: &str) -> ParseResult {
    let result = lv6::parse(source);
    assert!(!result.diagnostics.is_empty(), "expected diagnostics for:\n{}", source);
    result
}

pub fn parse_fails_with(source: &str, needle: &str) -> Vec<Diagnostic> {
    let result = parse_err(source);
    assert!(
        result.diagnostics.iter().any(|d| d.message.contains(needle)),
        "no diagnostic mentions {:?}: {:#?}",
        needle,
        result.diagnostics
    );
    result.diagnostics
}

pub fn kinds(diagnostics: &[Diagnostic]) -> Vec<DiagnosticKind> {
    diagnostics.iter().map(|d| d.kind).collect()
}

/// The single node declared by `source`.
pub fn only_node(source: &str) -> NodeDecl {
    let file = parse_ok(source);
    let nodes = file.nodes();
    assert_eq!(nodes.len(), 1, "expected one node in:\n{}", source);
    nodes[0].clone()
}

pub fn equations(node: &NodeDecl) -> &[Spanned<Equation>] {
    &node.definition().expect("node has no body").equations
}

/// Right-hand side of the only equation of a one-equation node.
pub fn only_rhs(node: &NodeDecl) -> &Expr {
    let eqs = equations(node);
    assert_eq!(eqs.len(), 1);
    match &eqs[0].node {
        Equation::Define { rhs, .. } => &rhs.node,
        Equation::Assert(e) => &e.node,
        Equation::Error => panic!("equation failed to parse"),
    }
}

pub fn expr_ok(source: &str) -> Expr {
    let (expr, diagnostics) = lv6::parse_expression(source);
    assert!(diagnostics.is_empty(), "diagnostics for {:?}: {:#?}", source, diagnostics);
    expr.unwrap().node
}

pub fn expr_fails(source: &str) -> Vec<Diagnostic> {
    let (expr, diagnostics) = lv6::parse_expression(source);
    assert!(expr.is_none(), "{:?} should not parse", source);
    assert!(!diagnostics.is_empty());
    diagnostics
}

/// Fully parenthesised rendering of an expression.
pub fn dump(source: &str) -> String {
    lv6::pretty::parenthesize(&expr_ok(source))
}

pub fn ident_name(expr: &Expr) -> &str {
    match expr {
        Expr::Ident(r) => &r.member,
        other => panic!("expected identifier, got {:?}", other),
    }
}

/// Static arguments of `node n = f<<args>>;`.
pub fn alias_args(args: &str) -> Vec<StaticArg> {
    let source = format!("node n = f<<{args}>>;");
    let node = only_node(&source);
    let target = node.alias().expect("node should be an alias");
    target
        .node
        .static_args
        .clone()
        .expect("alias has no static arguments")
        .into_iter()
        .map(|a| a.node)
        .collect()
}
