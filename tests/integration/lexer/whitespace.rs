// Category 1: Whitespace and token boundaries
//
// Blanks separate tokens but never reach the token stream. Line breaks are ordinary
// whitespace: Lustre has no significant newlines.

use super::*;

#[test]
fn empty_source() {
    assert_tokens("", &[]);
}

#[test]
fn only_whitespace() {
    let lexed = lex(" \t\n\r\n  ");
    assert!(lexed.tokens.is_empty());
    assert!(lexed.diagnostics.is_empty());
    assert_eq!(lexed.trailing.len(), 1);
    assert_eq!(lexed.trailing[0].node, Trivia::Whitespace);
}

#[test]
fn no_whitespace_between_tokens() {
    assert_tokens("y=x+1;", &[Token::Ident, Token::Eq, Token::Ident, Token::Plus, Token::IntLit, Token::Semi]);
}

#[test]
fn newlines_are_plain_separators() {
    assert_tokens("a\nb\n\n\nc", &[Token::Ident, Token::Ident, Token::Ident]);
}

#[test]
fn windows_line_endings() {
    assert_tokens("let\r\n  y = x;\r\ntel\r\n", &[Token::Let, Token::Ident, Token::Eq, Token::Ident, Token::Semi, Token::Tel]);
}

#[test]
fn tabs_and_vertical_tab() {
    assert_tokens("a\tb\x0Bc", &[Token::Ident, Token::Ident, Token::Ident]);
}

#[test]
fn whitespace_run_is_one_trivia_item() {
    assert_eq!(leading_trivia("a \t \n  b", 1), vec![Trivia::Whitespace]);
}

#[test]
fn keyword_needs_a_boundary() {
    // `nodef` is one identifier, `node f` is a keyword and an identifier.
    assert_tokens("nodef", &[Token::Ident]);
    assert_tokens("node f", &[Token::Node, Token::Ident]);
}

#[test]
fn trailing_whitespace_is_kept() {
    let src = "x  \n";
    let lexed = lex(src);
    assert_eq!(lexed.tokens.len(), 1);
    assert_eq!(lexed.trailing[0].span, Span::new(1, 4));
    assert_eq!(lexed.reconstruct(src), src);
}
