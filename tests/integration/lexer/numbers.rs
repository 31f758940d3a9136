// Category 2: Numeric literals
//
// Literal text is kept as written; the parser never evaluates it.

use super::*;

// ===== Integers =====

#[test]
fn integer_zero() {
    assert_tokens("0", &[Token::IntLit]);
}

#[test]
fn integer_negative_is_two_tokens() {
    assert_tokens("-42", &[Token::Minus, Token::IntLit]);
}

#[test]
fn integer_leading_zeros_kept() {
    assert_eq!(lexemes("007"), ["007"]);
}

#[test]
fn integer_beyond_any_machine_width() {
    // No overflow: the lexeme is stored as text.
    assert_eq!(lexemes("123456789012345678901234567890"), ["123456789012345678901234567890"]);
}

// ===== Reals =====

#[test]
fn real_with_fraction() {
    assert_tokens("1.3", &[Token::RealLit]);
    assert_tokens("0.0", &[Token::RealLit]);
}

#[test]
fn real_with_trailing_dot() {
    assert_tokens("1.", &[Token::RealLit]);
}

#[test]
fn real_with_leading_dot() {
    assert_tokens(".5", &[Token::RealLit]);
}

#[test]
fn real_with_exponent() {
    for src in ["2e10", "2E10", "2e+10", "2e-10", "2.5e3", "2.E-3", ".5e2"] {
        assert_tokens(src, &[Token::RealLit]);
        assert_eq!(lexemes(src), [src], "lexeme of {src}");
    }
}

// ===== Ranges =====

#[test]
fn range_splits_into_int_and_dotdot() {
    assert_tokens("1..3", &[Token::IntLit, Token::DotDot, Token::IntLit]);
    assert_eq!(lexemes("1..3"), ["1", "..", "3"]);
}

#[test]
fn range_inside_brackets() {
    assert_tokens(
        "t[0..n]",
        &[Token::Ident, Token::LBracket, Token::IntLit, Token::DotDot, Token::Ident, Token::RBracket],
    );
}

#[test]
fn range_with_blanks() {
    assert_tokens("1 .. 3", &[Token::IntLit, Token::DotDot, Token::IntLit]);
}

#[test]
fn range_never_yields_reals() {
    let tokens = lex_ok("10..20");
    assert!(tokens.iter().all(|(t, _)| *t != Token::RealLit));
    assert_eq!(tokens[0].1, Span::new(0, 2));
    assert_eq!(tokens[1].1, Span::new(2, 4));
    assert_eq!(tokens[2].1, Span::new(4, 6));
}

#[test]
fn range_between_names() {
    assert_tokens("a..b", &[Token::Ident, Token::DotDot, Token::Ident]);
}

#[test]
fn real_in_index_is_not_a_range() {
    assert_tokens("t[1.3]", &[Token::Ident, Token::LBracket, Token::RealLit, Token::RBracket]);
}

// ===== Neighbours =====

#[test]
fn number_then_identifier() {
    assert_tokens("3 x", &[Token::IntLit, Token::Ident]);
}

#[test]
fn field_access_on_name() {
    assert_tokens("p.x", &[Token::Ident, Token::Dot, Token::Ident]);
}

#[test]
fn table_type_length() {
    assert_tokens("int^4", &[Token::Int, Token::Caret, Token::IntLit]);
}
