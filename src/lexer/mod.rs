pub mod token;
pub use token::{Token, is_keyword};

use logos::Logos;
use serde::Serialize;
use tracing::trace;

use crate::diagnostics::Diagnostic;
use crate::span::{Span, Spanned};

/// Non-semantic source text kept beside the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trivia {
    Whitespace,
    LineComment,
    BlockComment,
    /// A character no token starts with; reported as a lex error and skipped.
    Unknown,
}

/// Output of [`lex`]: semantic tokens plus the trivia channel.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Lexed {
    pub tokens: Vec<Spanned<Token>>,
    /// `leading[i]` is the trivia between token `i - 1` and token `i`.
    pub leading: Vec<Vec<Spanned<Trivia>>>,
    /// Trivia after the last token.
    pub trailing: Vec<Spanned<Trivia>>,
    pub diagnostics: Vec<Diagnostic>,
    /// Set when an unterminated string or comment ended the token stream early.
    pub truncated: bool,
}

impl Lexed {
    /// Rebuild the source from trivia and token lexemes.
    pub fn reconstruct(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len());
        for (tok, trivia) in self.tokens.iter().zip(&self.leading) {
            for t in trivia {
                out.push_str(t.span.slice(source));
            }
            out.push_str(tok.span.slice(source));
        }
        for t in &self.trailing {
            out.push_str(t.span.slice(source));
        }
        out
    }

    /// Comments attached in front of token `index`.
    pub fn comments_before(&self, index: usize) -> impl Iterator<Item = &Spanned<Trivia>> {
        self.leading
            .get(index)
            .into_iter()
            .flatten()
            .filter(|t| matches!(t.node, Trivia::LineComment | Trivia::BlockComment))
    }
}

pub fn lex(source: &str) -> Lexed {
    let mut out = Lexed::default();
    let mut pending: Vec<Spanned<Trivia>> = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::new(range.start, range.end);
        match result {
            Ok(Token::Whitespace) => pending.push(Spanned::new(Trivia::Whitespace, span)),
            Ok(Token::LineComment) => pending.push(Spanned::new(Trivia::LineComment, span)),
            Ok(Token::BlockComment) => {
                // Comments do not nest: the first matching closer ends them.
                let closer = if span.slice(source) == "(*" { "*)" } else { "*/" };
                let Some(at) = lexer.remainder().find(closer) else {
                    out.diagnostics.push(Diagnostic::lex("unterminated block comment", span));
                    out.truncated = true;
                    break;
                };
                lexer.bump(at + closer.len());
                pending.push(Spanned::new(Trivia::BlockComment, Span::new(span.start, lexer.span().end)));
            }
            Ok(Token::Percent) => match pragma_len(lexer.remainder()) {
                Some(len) => {
                    lexer.bump(len);
                    let pragma = Spanned::new(Token::Pragma, Span::new(span.start, lexer.span().end));
                    push_token(&mut out, &mut pending, pragma);
                }
                None => push_token(&mut out, &mut pending, Spanned::new(Token::Percent, span)),
            },
            Ok(Token::IntRange) => {
                // `1..3` is an integer followed by the range token, never `1.` `.3`.
                let dots = span.end - 2;
                push_token(&mut out, &mut pending, Spanned::new(Token::IntLit, Span::new(span.start, dots)));
                push_token(&mut out, &mut pending, Spanned::new(Token::DotDot, Span::new(dots, span.end)));
            }
            Ok(Token::UnterminatedString) => {
                out.diagnostics.push(Diagnostic::lex("unterminated string literal", Span::new(span.start, span.start + 1)));
                out.truncated = true;
                break;
            }
            Ok(tok) => push_token(&mut out, &mut pending, Spanned::new(tok, span)),
            Err(()) => {
                out.diagnostics.push(Diagnostic::lex(
                    format!("unexpected character '{}'", span.slice(source)),
                    span,
                ));
                pending.push(Spanned::new(Trivia::Unknown, span));
            }
        }
    }

    out.trailing = pending;
    trace!(tokens = out.tokens.len(), truncated = out.truncated, "lexed source");
    out
}

/// Length of the `key:value%` part of a pragma whose `%` was just read.
fn pragma_len(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let i = skip_ident(bytes, skip_blanks(bytes, 0))?;
    let i = skip_blanks(bytes, i);
    if bytes.get(i) != Some(&b':') {
        return None;
    }
    let i = skip_blanks(bytes, skip_ident(bytes, skip_blanks(bytes, i + 1))?);
    (bytes.get(i) == Some(&b'%')).then_some(i + 1)
}

fn skip_blanks(bytes: &[u8], mut i: usize) -> usize {
    while matches!(bytes.get(i), Some(b' ' | b'\t')) {
        i += 1;
    }
    i
}

fn skip_ident(bytes: &[u8], i: usize) -> Option<usize> {
    if !matches!(bytes.get(i), Some(b) if b.is_ascii_alphabetic() || *b == b'_') {
        return None;
    }
    let mut end = i + 1;
    while matches!(bytes.get(end), Some(b) if b.is_ascii_alphanumeric() || *b == b'_' || *b == b'\'') {
        end += 1;
    }
    Some(end)
}

fn push_token(out: &mut Lexed, pending: &mut Vec<Spanned<Trivia>>, tok: Spanned<Token>) {
    out.leading.push(std::mem::take(pending));
    out.tokens.push(tok);
}
