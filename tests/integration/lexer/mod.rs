// Lexer test suite
//
// Categories:
// - whitespace: token boundaries, line breaks, tabs
// - numbers: integer and real literals, the `..` split
// - strings: include paths and pragmas
// - identifiers: keywords, primes, qualified names
// - comments: line and block comments, the trivia channel
// - operators: multi-character operators and static brackets
// - errors: unknown characters and truncation
// - spans: position tracking
// - stress: large inputs
// - real_world: complete Lustre programs

use lv6::lexer::{Lexed, Token, Trivia, lex};
use lv6::span::Span;

/// Lex source and expect no diagnostics
pub fn lex_ok(source: &str) -> Vec<(Token, Span)> {
    let lexed = lex(source);
    assert!(
        lexed.diagnostics.is_empty(),
        "lexing should succeed for: {}\n{:?}",
        source,
        lexed.diagnostics
    );
    assert!(!lexed.truncated);
    lexed.tokens.into_iter().map(|t| (t.node, t.span)).collect()
}

/// Lex source and expect at least one diagnostic
pub fn lex_fails(source: &str) -> Lexed {
    let lexed = lex(source);
    assert!(!lexed.diagnostics.is_empty(), "lexing should fail for: {}", source);
    lexed
}

/// Assert tokens match expected kinds (ignoring spans)
pub fn assert_tokens(source: &str, expected: &[Token]) {
    let actual: Vec<Token> = lex_ok(source).into_iter().map(|(t, _)| t).collect();
    assert_eq!(
        actual, expected,
        "Token mismatch for source: {}\nExpected: {:?}\nActual: {:?}",
        source, expected, actual
    );
}

/// Assert specific token at index has expected span
pub fn assert_span(source: &str, token_idx: usize, start: usize, end: usize) {
    let tokens = lex_ok(source);
    assert!(
        token_idx < tokens.len(),
        "Token index {} out of bounds (len={})",
        token_idx,
        tokens.len()
    );
    let (_, span) = &tokens[token_idx];
    assert_eq!(
        *span,
        Span::new(start, end),
        "Span mismatch for token {} in source: {}",
        token_idx,
        source
    );
}

/// Lexemes of every token, in order
pub fn lexemes(source: &str) -> Vec<&str> {
    lex_ok(source).into_iter().map(|(_, span)| span.slice(source)).collect()
}

pub fn token_count(source: &str) -> usize {
    lex_ok(source).len()
}

/// Trivia kinds in front of token `index`
pub fn leading_trivia(source: &str, index: usize) -> Vec<Trivia> {
    lex(source).leading[index].iter().map(|t| t.node).collect()
}

mod whitespace;
mod numbers;
mod errors;
mod real_world;
