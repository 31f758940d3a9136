// Category 7: Lexical errors
//
// An unknown character is reported and skipped; lexing goes on. An unterminated string
// or comment ends the stream, since everything after it would be swallowed.

use super::*;

// ===== Unknown characters =====

#[test]
fn unknown_ascii_characters() {
    for src in ["@", "$", "`", "\\", "!", "?", "~", "&"] {
        let lexed = lex_fails(src);
        assert!(lexed.tokens.is_empty(), "{src}");
        assert_eq!(lexed.diagnostics.len(), 1, "{src}");
        assert_eq!(lexed.diagnostics[0].message, format!("unexpected character '{src}'"));
        assert!(!lexed.truncated);
    }
}

#[test]
fn unknown_character_becomes_trivia() {
    let src = "a @ b";
    let lexed = lex_fails(src);
    assert_eq!(lexed.tokens.len(), 2);
    let kinds: Vec<Trivia> = lexed.leading[1].iter().map(|t| t.node).collect();
    assert_eq!(kinds, vec![Trivia::Whitespace, Trivia::Unknown, Trivia::Whitespace]);
    assert_eq!(lexed.reconstruct(src), src);
}

#[test]
fn each_unknown_character_is_reported() {
    let lexed = lex_fails("a @ b $ c");
    assert_eq!(lexed.tokens.len(), 3);
    assert_eq!(lexed.diagnostics.len(), 2);
    assert_eq!(lexed.diagnostics[0].span, Span::new(2, 3));
    assert_eq!(lexed.diagnostics[1].span, Span::new(6, 7));
}

#[test]
fn non_ascii_input_is_reported_not_fatal() {
    let lexed = lex_fails("x = \u{e9}t\u{e9};");
    assert!(!lexed.truncated);
    assert_eq!(lexed.tokens.first().map(|t| t.node), Some(Token::Ident));
    assert_eq!(lexed.tokens.last().map(|t| t.node), Some(Token::Semi));
}

#[test]
fn lone_quote_is_unterminated_string() {
    let lexed = lex_fails("x \"");
    assert!(lexed.truncated);
    assert_eq!(lexed.tokens.len(), 1);
}

// ===== Truncation =====

#[test]
fn truncation_keeps_earlier_tokens() {
    let lexed = lex_fails("node f (* oops");
    assert!(lexed.truncated);
    assert_eq!(lexed.tokens.iter().map(|t| t.node).collect::<Vec<_>>(), vec![Token::Node, Token::Ident]);
}

#[test]
fn diagnostics_before_truncation_are_kept() {
    let lexed = lex_fails("@ x \"open");
    assert!(lexed.truncated);
    assert_eq!(lexed.diagnostics.len(), 2);
    assert!(lexed.diagnostics[0].message.contains("unexpected character"));
    assert_eq!(lexed.diagnostics[1].message, "unterminated string literal");
}

#[test]
fn truncated_reconstruct_is_a_prefix() {
    let src = "const a = 1; (* never closed";
    let lexed = lex_fails(src);
    let rebuilt = lexed.reconstruct(src);
    assert!(src.starts_with(&rebuilt));
    assert_eq!(rebuilt, "const a = 1; ");
}

#[test]
fn all_diagnostics_are_lex_errors() {
    let lexed = lex_fails("@ ! (*");
    assert!(lexed.diagnostics.iter().all(|d| d.kind == lv6::DiagnosticKind::Lex));
}
