pub mod span;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod pretty;
pub mod config;
pub mod driver;

use serde::Serialize;
use tracing::debug;

pub use config::{Config, ParseOptions};
pub use diagnostics::{Diagnostic, DiagnosticKind};
use lexer::Lexed;
use parser::ast::{Expr, SourceFile};
use span::Spanned;

/// Everything a parse produces. The AST is always present, even when diagnostics were recorded.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    pub ast: SourceFile,
    /// Lexer diagnostics first, then parser diagnostics, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
    pub tokens: Lexed,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Parse a Lustre source file with default options.
pub fn parse(source: &str) -> ParseResult {
    parse_with_options(source, &ParseOptions::default())
}

pub fn parse_with_options(source: &str, options: &ParseOptions) -> ParseResult {
    let mut tokens = lexer::lex(source);
    let lex_diagnostics = std::mem::take(&mut tokens.diagnostics);
    debug!(bytes = source.len(), tokens = tokens.tokens.len(), lex_errors = lex_diagnostics.len(), "lexed");

    let mut parser = parser::Parser::new(&tokens.tokens, source)
        .with_max_errors(options.max_errors)
        .truncated(tokens.truncated)
        .with_diagnostics(lex_diagnostics);
    let ast = parser.parse_source_file();
    let diagnostics = parser.into_diagnostics();

    if !options.keep_trivia {
        tokens.leading.iter_mut().for_each(Vec::clear);
        tokens.trailing.clear();
    }
    ParseResult { ast, diagnostics, tokens }
}

/// Parse a single expression that must make up the whole input.
pub fn parse_expression(source: &str) -> (Option<Spanned<Expr>>, Vec<Diagnostic>) {
    let tokens = lexer::lex(source);
    let mut parser = parser::Parser::new(&tokens.tokens, source)
        .truncated(tokens.truncated)
        .with_diagnostics(tokens.diagnostics.clone());
    let expr = parser.parse_standalone_expr();
    let diagnostics = parser.into_diagnostics();
    let expr = if diagnostics.is_empty() { expr } else { None };
    (expr, diagnostics)
}
