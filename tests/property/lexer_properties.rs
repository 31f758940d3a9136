// Property-based tests for the lexer
//
// Invariants that must hold on any input:
// 1. Safety and determinism
// 2. Span structure (ordered, in bounds, covering the source with trivia)
// 3. Token soups: space-separated lexemes lex one token each

use lv6::lexer::{Token, lex};
use proptest::prelude::*;

// =============================================================================
// SECTION 1: SAFETY & DETERMINISM
// =============================================================================

/// The lexer never panics, whatever the input.
#[test]
fn prop_lexer_never_panics() {
    proptest!(|(source in "\\PC{0,1000}")| {
        let _ = lex(&source);
    });
}

/// Same input, same tokens, same diagnostics.
#[test]
fn prop_lexing_is_deterministic() {
    proptest!(|(source in "\\PC{0,500}")| {
        let first = lex(&source);
        let second = lex(&source);
        prop_assert_eq!(first.tokens, second.tokens);
        prop_assert_eq!(first.diagnostics, second.diagnostics);
        prop_assert_eq!(first.truncated, second.truncated);
    });
}

#[test]
fn prop_empty_input_is_valid() {
    let lexed = lex("");
    assert!(lexed.tokens.is_empty());
    assert!(lexed.diagnostics.is_empty());
}

// =============================================================================
// SECTION 2: SPAN STRUCTURE
// =============================================================================

/// Token spans are non-empty, in bounds and strictly ordered.
#[test]
fn prop_spans_ordered_and_in_bounds() {
    proptest!(|(source in "[ -~\\n\\t]{0,400}")| {
        let lexed = lex(&source);
        for tok in &lexed.tokens {
            prop_assert!(tok.span.start < tok.span.end);
            prop_assert!(tok.span.end <= source.len());
        }
        for pair in lexed.tokens.windows(2) {
            prop_assert!(pair[0].span.end <= pair[1].span.start);
        }
    });
}

/// Tokens plus trivia rebuild printable ASCII input exactly, or a prefix of it when a
/// string or comment was left open.
#[test]
fn prop_reconstruct_ascii() {
    proptest!(|(source in "[ -~\\n\\t\\r]{0,400}")| {
        let lexed = lex(&source);
        let rebuilt = lexed.reconstruct(&source);
        if lexed.truncated {
            prop_assert!(source.starts_with(&rebuilt));
        } else {
            prop_assert_eq!(rebuilt, source);
        }
    });
}

/// Trivia and internal token kinds never reach the token stream.
#[test]
fn prop_no_internal_kinds_in_stream() {
    proptest!(|(source in "[ -~\\n]{0,400}")| {
        let lexed = lex(&source);
        for tok in &lexed.tokens {
            prop_assert!(!tok.node.is_trivia());
            prop_assert!(!matches!(
                tok.node,
                Token::IntRange | Token::UnterminatedString
            ));
        }
        prop_assert_eq!(lexed.leading.len(), lexed.tokens.len());
    });
}

/// Every diagnostic is a lex error inside the source.
#[test]
fn prop_diagnostic_spans_in_bounds() {
    proptest!(|(source in "\\PC{0,300}")| {
        let lexed = lex(&source);
        for diag in &lexed.diagnostics {
            prop_assert_eq!(diag.kind, lv6::DiagnosticKind::Lex);
            prop_assert!(diag.span.end <= source.len());
        }
        prop_assert!(lexed.diagnostics.iter().filter(|d| d.message.starts_with("unterminated")).count() <= 1);
    });
}

// =============================================================================
// SECTION 3: TOKEN SOUPS
// =============================================================================

const FIXED_LEXEMES: &[&str] = &[
    "node", "function", "returns", "let", "tel", "var", "const", "type", "package", "model",
    "body", "end", "when", "merge", "if", "then", "else", "pre", "fby", "current", "not",
    "and", "or", "xor", "mod", "div", "int", "real", "bool", "true", "false", "<<", ">>",
    "<", "<=", "=", ">=", ">", "<>", "->", "=>", "+", "-", "*", "**", "/", "^", "|", "#",
    "(", ")", "[", "]", "{", "}", ",", ";", "::", ":", "..", ".",
];

/// One lexeme that lexes to exactly one token on its own.
fn arb_lexeme() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(FIXED_LEXEMES).prop_map(String::from),
        "[a-z_][a-z0-9_']{0,6}",
        "[0-9]{1,6}",
        "[0-9]{1,3}\\.[0-9]{1,3}",
        "\"[a-z./]{0,8}\"",
        "%[a-z]{1,4}:[a-z]{1,4}%",
    ]
}

/// Space-separated lexemes lex one token each, with no diagnostics.
#[test]
fn prop_token_soup_count() {
    proptest!(|(lexemes in prop::collection::vec(arb_lexeme(), 0..80))| {
        let source = lexemes.join(" ");
        let lexed = lex(&source);
        prop_assert!(lexed.diagnostics.is_empty(), "{:?}", lexed.diagnostics);
        prop_assert_eq!(lexed.tokens.len(), lexemes.len());
        for (tok, lexeme) in lexed.tokens.iter().zip(&lexemes) {
            prop_assert_eq!(tok.span.slice(&source), lexeme.as_str());
        }
    });
}

/// Swapping the blanks between lexemes for comments leaves the token stream unchanged.
#[test]
fn prop_comments_are_transparent() {
    proptest!(|(lexemes in prop::collection::vec(arb_lexeme(), 1..40))| {
        let spaced = lexemes.join(" ");
        let commented = lexemes.join(" (* c *) ");
        let a: Vec<Token> = lex(&spaced).tokens.into_iter().map(|t| t.node).collect();
        let b: Vec<Token> = lex(&commented).tokens.into_iter().map(|t| t.node).collect();
        prop_assert_eq!(a, b);
    });
}
