// Operator precedence and associativity.
//
// Each case is checked through the fully parenthesised dump, so a failure shows the tree the parser built.

mod common;
use common::*;

use lv6::DiagnosticKind;

fn assert_dump(source: &str, expected: &str) {
    assert_eq!(dump(source), expected, "for source: {source}");
}

// ============================================================
// Associativity
// ============================================================

#[test]
fn arrow_associates_left() {
    assert_dump("a -> b -> c", "((a -> b) -> c)");
    assert_dump("a -> b -> c -> d", "(((a -> b) -> c) -> d)");
}

#[test]
fn bar_associates_left() {
    assert_dump("a | b | c", "((a | b) | c)");
}

#[test]
fn implication_associates_right() {
    assert_dump("a => b => c", "(a => (b => c))");
}

#[test]
fn fby_associates_right() {
    assert_dump("a fby b fby c", "(a fby (b fby c))");
}

#[test]
fn or_and_xor_share_a_level() {
    assert_dump("a or b xor c", "((a or b) xor c)");
    assert_dump("a xor b or c", "((a xor b) or c)");
}

#[test]
fn arithmetic_associates_left() {
    assert_dump("a - b - c", "((a - b) - c)");
    assert_dump("a / b * c", "((a / b) * c)");
    assert_dump("a ** b ** c", "((a ** b) ** c)");
    assert_dump("a ^ 2 ^ 3", "((a ^ 2) ^ 3)");
}

// ============================================================
// Levels
// ============================================================

#[test]
fn and_binds_tighter_than_or() {
    assert_dump("a or b and c", "(a or (b and c))");
    assert_dump("a and b or c", "((a and b) or c)");
}

#[test]
fn logic_binds_tighter_than_arrow() {
    assert_dump("a -> b or c", "(a -> (b or c))");
    assert_dump("a or b -> c", "((a or b) -> c)");
    assert_dump("a | b -> c", "(a | (b -> c))");
    assert_dump("a -> b => c", "(a -> (b => c))");
}

#[test]
fn comparison_binds_tighter_than_logic() {
    assert_dump("a = b and c", "((a = b) and c)");
    assert_dump("a and b <> c", "(a and (b <> c))");
    assert_dump("a -> b < c", "(a -> (b < c))");
}

#[test]
fn arithmetic_binds_tighter_than_comparison() {
    assert_dump("a < b + 1", "(a < (b + 1))");
    assert_dump("a * 2 >= b - c", "((a * 2) >= (b - c))");
}

#[test]
fn product_over_sum_and_power_over_product() {
    assert_dump("a + b * c", "(a + (b * c))");
    assert_dump("a * b ** c", "(a * (b ** c))");
    assert_dump("a + b mod c div d", "(a + ((b mod c) div d))");
}

#[test]
fn fby_binds_tightest() {
    assert_dump("a fby b + c", "((a fby b) + c)");
    assert_dump("a + b fby c", "(a + (b fby c))");
    assert_dump("a ^ b fby c", "(a ^ (b fby c))");
}

// ============================================================
// Prefix operators
// ============================================================

#[test]
fn not_sits_below_arithmetic() {
    assert_dump("not a and b", "((not a) and b)");
    assert_dump("not a = b", "((not a) = b)");
    assert_dump("not a + b", "(not (a + b))");
}

#[test]
fn unary_minus_and_temporal_prefixes() {
    assert_dump("-a * b", "((-a) * b)");
    assert_dump("-a ** b", "((-a) ** b)");
    assert_dump("- a ^ 2", "(-(a ^ 2))");
    assert_dump("pre x + 1", "((pre x) + 1)");
    assert_dump("current x -> 0", "((current x) -> 0)");
}

#[test]
fn casts() {
    assert_dump("int x + 1", "((int x) + 1)");
    assert_dump("real a * b", "((real a) * b)");
}

#[test]
fn postfix_binds_tighter_than_prefix() {
    assert_dump("pre x.f[0]", "(pre x.f[0])");
    assert_dump("-f(x)", "(-f(x))");
    assert_dump("f(x) + g(y)[0]", "(f(x) + g(y)[0])");
}

// ============================================================
// Sampling and conditionals
// ============================================================

#[test]
fn when_binds_tighter_than_arithmetic() {
    assert_dump("x when c + 1", "((x when c) + 1)");
    assert_dump("a + x when c", "(a + (x when c))");
    assert_dump("a * x when c", "(a * (x when c))");
}

#[test]
fn hat_binds_tighter_than_when() {
    assert_dump("a ^ x when c", "((a ^ x) when c)");
}

#[test]
fn else_branch_extends_right() {
    assert_dump("if c then a else b + 1", "(if c then a else (b + 1))");
    assert_dump("if c then a else b -> d", "(if c then a else (b -> d))");
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(lv6::pretty::print_expr(&expr_ok("(a + b) * c")), "(a + b) * c");
    assert_eq!(lv6::pretty::print_expr(&expr_ok("a * (b + c)")), "a * (b + c)");
}

// ============================================================
// Non-associative comparisons
// ============================================================

#[test]
fn chained_comparisons_are_rejected() {
    for source in ["a < b < c", "a = b = c", "a <= b > c", "a < b <> c", "x + 1 >= y = z"] {
        let diags = expr_fails(source);
        assert_eq!(diags[0].kind, DiagnosticKind::Syntax, "{source}");
        assert!(diags[0].message.contains("non-associative"), "{source}: {}", diags[0].message);
    }
}

#[test]
fn chained_comparison_error_points_at_second_operator() {
    let diags = expr_fails("a < b <= c");
    assert_eq!(diags[0].span.slice("a < b <= c"), "<=");
}

#[test]
fn separated_comparisons_are_accepted() {
    expr_ok("(a < b) < c");
    expr_ok("a < (b < c)");
    assert_dump("a < b and b < c", "((a < b) and (b < c))");
}
