// Property-based tests for parser invariants
//
// 1. No panics on arbitrary input or token soups
// 2. Error cap and determinism
// 3. Associativity and non-associativity
// 4. Pretty-print idempotence on generated expressions and nodes

use lv6::pretty::{parenthesize, pretty_print, print_expr};
use lv6::{DiagnosticKind, ParseOptions, parse, parse_expression, parse_with_options};
use proptest::prelude::*;

const IDENTS: &[&str] = &["a", "b", "c", "x", "y", "t"];

const LEXEMES: &[&str] = &[
    "node", "function", "unsafe", "extern", "returns", "let", "tel", "var", "const", "type",
    "package", "model", "needs", "provides", "uses", "body", "end", "is", "include", "enum",
    "struct", "when", "merge", "if", "then", "else", "pre", "fby", "current", "not", "and",
    "or", "xor", "mod", "div", "nor", "step", "with", "assert", "int", "real", "bool", "true",
    "false", "<<", ">>", "<", "<=", "=", ">=", ">", "<>", "->", "=>", "+", "-", "*", "**",
    "/", "^", "|", "#", "(", ")", "[", "]", "{", "}", ",", ";", "::", ":", "..", ".", "x",
    "f", "pkg", "1", "2.5", "\"lib.lus\"",
];

fn arb_soup() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(LEXEMES), 0..120).prop_map(|words| words.join(" "))
}

fn ident() -> impl Strategy<Value = String> {
    prop::sample::select(IDENTS).prop_map(String::from)
}

/// Expressions with every compound form wrapped in parentheses, so any operator mix is valid.
fn arb_expr() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        ident(),
        (0u32..1000).prop_map(|n| n.to_string()),
        (0u32..100, 0u32..100).prop_map(|(a, b)| format!("{a}.{b}")),
        Just("true".to_string()),
        Just("pkg::k".to_string()),
    ];
    let binops = vec![
        "+", "-", "*", "/", "mod", "div", "**", "^", "and", "or", "xor", "=>", "->", "fby", "|",
        "<", "<=", "=", ">=", ">", "<>",
    ];
    let unops = vec!["pre", "current", "not", "-", "int", "real"];
    leaf.prop_recursive(4, 48, 3, move |inner| {
        prop_oneof![
            (inner.clone(), prop::sample::select(binops.clone()), inner.clone())
                .prop_map(|(l, op, r)| format!("({l} {op} {r})")),
            (prop::sample::select(unops.clone()), inner.clone()).prop_map(|(op, e)| format!("({op} {e})")),
            (inner.clone(), inner.clone(), inner.clone())
                .prop_map(|(c, t, e)| format!("(if {c} then {t} else {e})")),
            prop::collection::vec(inner.clone(), 0..3).prop_map(|args| format!("f({})", args.join(", "))),
            prop::collection::vec(inner.clone(), 1..3).prop_map(|items| format!("[{}]", items.join(", "))),
            inner.clone().prop_map(|e| format!("t[{e}]")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("t[{a} .. {b}]")),
            inner.clone().prop_map(|e| format!("({e} when c)")),
            (inner.clone(), inner).prop_map(|(a, b)| format!("merge c (true -> {a}) (false -> {b})")),
        ]
    })
}

// =============================================================================
// SECTION 1: NO PANICS
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn parse_never_panics_on_soups(source in arb_soup()) {
        let _ = parse(&source);
    }

    #[test]
    fn parse_never_panics_on_text(source in "\\PC{0,300}") {
        let _ = parse(&source);
        let _ = parse_expression(&source);
    }

    #[test]
    fn parse_is_deterministic(source in arb_soup()) {
        let first = parse(&source);
        let second = parse(&source);
        prop_assert_eq!(first.diagnostics, second.diagnostics);
        prop_assert_eq!(first.ast, second.ast);
    }

    #[test]
    fn error_cap_bounds_diagnostics(source in arb_soup(), cap in 1usize..8) {
        let options = ParseOptions { max_errors: cap, ..ParseOptions::default() };
        let result = parse_with_options(&source, &options);
        prop_assert!(result.diagnostics.len() <= cap + 1, "{} > {}", result.diagnostics.len(), cap + 1);
    }

    #[test]
    fn diagnostic_spans_stay_in_source(source in arb_soup()) {
        let result = parse(&source);
        for diag in &result.diagnostics {
            prop_assert!(diag.span.start <= diag.span.end);
            prop_assert!(diag.span.end <= source.len());
        }
    }
}

// =============================================================================
// SECTION 2: ASSOCIATIVITY
// =============================================================================

proptest! {
    #[test]
    fn arrow_chains_associate_left(n in 2usize..8) {
        let names: Vec<String> = (0..n).map(|i| format!("x{i}")).collect();
        let source = names.join(" -> ");
        let expected = names[1..]
            .iter()
            .fold(names[0].clone(), |acc, name| format!("({acc} -> {name})"));
        let (expr, diags) = parse_expression(&source);
        prop_assert!(diags.is_empty());
        prop_assert_eq!(parenthesize(&expr.unwrap().node), expected);
    }

    #[test]
    fn fby_chains_associate_right(n in 2usize..8) {
        let names: Vec<String> = (0..n).map(|i| format!("x{i}")).collect();
        let source = names.join(" fby ");
        let expected = names[..n - 1]
            .iter()
            .rev()
            .fold(names[n - 1].clone(), |acc, name| format!("({name} fby {acc})"));
        let (expr, _) = parse_expression(&source);
        prop_assert_eq!(parenthesize(&expr.unwrap().node), expected);
    }

    #[test]
    fn chained_comparisons_fail(
        first in prop::sample::select(vec!["<", "<=", "=", ">=", ">", "<>"]),
        second in prop::sample::select(vec!["<", "<=", "=", ">=", ">", "<>"]),
    ) {
        let source = format!("a {first} b {second} c");
        let (expr, diags) = parse_expression(&source);
        prop_assert!(expr.is_none());
        prop_assert_eq!(diags[0].kind, DiagnosticKind::Syntax);
        prop_assert!(diags[0].message.contains("non-associative"));
    }
}

// =============================================================================
// SECTION 3: PRETTY-PRINT IDEMPOTENCE
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn generated_expressions_parse(source in arb_expr()) {
        let (expr, diags) = parse_expression(&source);
        prop_assert!(diags.is_empty(), "{}: {:?}", source, diags);
        prop_assert!(expr.is_some());
    }

    #[test]
    fn expression_printing_is_idempotent(source in arb_expr()) {
        let (expr, _) = parse_expression(&source);
        let first = print_expr(&expr.unwrap().node);
        let (reparsed, diags) = parse_expression(&first);
        prop_assert!(diags.is_empty(), "printed form does not parse: {}\n{:?}", first, diags);
        let second = print_expr(&reparsed.unwrap().node);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn node_printing_is_idempotent(rhs in arb_expr(), check in arb_expr()) {
        let source = format!(
            "node f(x, y: int; c: bool) returns (o: int);\nvar v: int;\nlet v = {rhs}; o = v; assert {check}; tel"
        );
        let result = parse(&source);
        prop_assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let first = pretty_print(&result.ast);
        let reparsed = parse(&first);
        prop_assert!(reparsed.diagnostics.is_empty(), "{}\n{:?}", first, reparsed.diagnostics);
        prop_assert_eq!(pretty_print(&reparsed.ast), first);
    }

    #[test]
    fn node_has_body_xor_alias(alias in any::<bool>(), name in "[a-z]{1,6}x") {
        let source = if alias {
            format!("node {name} = g<<3>>;")
        } else {
            format!("node {name}(a: int) returns (b: int); let b = a; tel")
        };
        let file = parse(&source).ast;
        let nodes = file.nodes();
        prop_assert_eq!(nodes.len(), 1);
        prop_assert_ne!(nodes[0].alias().is_some(), nodes[0].definition().is_some());
        prop_assert_eq!(nodes[0].alias().is_some(), alias);
    }
}
