pub mod ast;
pub mod precedence;

mod decls;
mod exprs;

use tracing::{debug, trace};

use crate::diagnostics::{Diagnostic, DiagnosticKind, ParseError};
use crate::lexer::Token;
use crate::span::{Span, Spanned};
use ast::*;

pub type PResult<T> = Result<T, ParseError>;

/// Tokens a declaration can start with; top-level recovery stops at these.
const DECL_START: &[Token] = &[
    Token::Node,
    Token::Function,
    Token::Unsafe,
    Token::Extern,
    Token::Type,
    Token::Const,
    Token::Package,
    Token::Model,
    Token::Include,
];

/// Recovery stops inside a node: keywords that cannot occur between a node header and its `tel`.
const NODE_STOP: &[Token] = &[
    Token::Node,
    Token::Function,
    Token::Unsafe,
    Token::Extern,
    Token::Type,
    Token::Package,
    Token::Model,
    Token::Include,
];

pub const DEFAULT_MAX_ERRORS: usize = 200;

/// Nesting limit for expressions and static argument lists, kept well inside a 2 MiB thread stack.
pub const MAX_NESTING: usize = 64;

pub struct Parser<'a> {
    tokens: &'a [Spanned<Token>],
    source: &'a str,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    max_errors: usize,
    /// The lexer stopped before the end of the source.
    truncated: bool,
    /// Parsing stopped: error cap reached or input ran out after truncation.
    halted: bool,
    in_package: bool,
    depth: usize,
}

/// Saved cursor state for speculative parses.
#[derive(Clone, Copy)]
struct Checkpoint {
    pos: usize,
    diagnostics: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Spanned<Token>], source: &'a str) -> Self {
        Self {
            tokens,
            source,
            pos: 0,
            diagnostics: Vec::new(),
            max_errors: DEFAULT_MAX_ERRORS,
            truncated: false,
            halted: false,
            in_package: false,
            depth: 0,
        }
    }

    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors.max(1);
        self
    }

    /// Marks the token stream as cut short by an unterminated literal or comment.
    pub fn truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    /// Seeds the diagnostic list (lexer errors come first and count towards the cap).
    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    // ── Cursor ───────────────────────────────────────────────────────

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|t| t.node)
    }

    fn peek_at(&self, offset: usize) -> Option<Token> {
        self.tokens.get(self.pos + offset).map(|t| t.node)
    }

    fn at(&self, tok: Token) -> bool {
        self.peek() == Some(tok)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn advance(&mut self) -> Option<&'a Spanned<Token>> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    /// Consumes `tok` if it is next.
    fn eat(&mut self, tok: Token) -> Option<Span> {
        if self.at(tok) { self.advance().map(|t| t.span) } else { None }
    }

    fn expect(&mut self, tok: Token) -> PResult<Span> {
        match self.eat(tok) {
            Some(span) => Ok(span),
            None => Err(self.unexpected(&[tok.to_string()])),
        }
    }

    /// Span of the next token, or a point at end of input.
    fn peek_span(&self) -> Span {
        self.tokens.get(self.pos).map(|t| t.span).unwrap_or_else(|| self.eof_span())
    }

    fn eof_span(&self) -> Span {
        Span::point(self.source.len())
    }

    /// End offset of the last consumed token.
    fn prev_end(&self) -> usize {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].span.end
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end().max(start))
    }

    fn text(&self, span: Span) -> &'a str {
        span.slice(self.source)
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint { pos: self.pos, diagnostics: self.diagnostics.len() }
    }

    fn restore(&mut self, cp: Checkpoint) {
        self.pos = cp.pos;
        self.diagnostics.truncate(cp.diagnostics);
    }

    /// Runs `f` one nesting level deeper, failing once [`MAX_NESTING`] is reached.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(Diagnostic::syntax("expression nested too deeply", self.peek_span()).into());
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ── Errors and recovery ──────────────────────────────────────────

    /// Syntax error at the next token listing what would have been accepted.
    fn unexpected(&self, expected: &[String]) -> ParseError {
        let (found, span) = match self.tokens.get(self.pos) {
            Some(tok) => (format!("`{}`", self.describe(tok)), tok.span),
            None => ("end of input".to_string(), self.eof_span()),
        };
        let message = match expected {
            [] => format!("unexpected {found}"),
            [one] => format!("expected `{one}`, found {found}"),
            many => format!(
                "expected one of {}, found {found}",
                many.iter().map(|e| format!("`{e}`")).collect::<Vec<_>>().join(", ")
            ),
        };
        Diagnostic::syntax(message, span).with_expected(expected.iter()).into()
    }

    /// Like [`Parser::unexpected`] but with a description instead of a token list.
    fn expected_what(&self, what: &str) -> ParseError {
        let (found, span) = match self.tokens.get(self.pos) {
            Some(tok) => (format!("`{}`", self.describe(tok)), tok.span),
            None => ("end of input".to_string(), self.eof_span()),
        };
        Diagnostic::syntax(format!("expected {what}, found {found}"), span).into()
    }

    fn describe(&self, tok: &Spanned<Token>) -> String {
        match tok.node {
            Token::Ident | Token::IntLit | Token::RealLit | Token::StringLit | Token::Pragma => {
                self.text(tok.span).to_string()
            }
            other => other.to_string(),
        }
    }

    /// Records a diagnostic, enforcing the error cap and end-of-input policy.
    fn report(&mut self, err: ParseError) {
        if self.halted {
            return;
        }
        let mut diag = err.into_diagnostic();
        if self.truncated && self.is_at_end() {
            diag.kind = DiagnosticKind::EndOfInput;
            diag.message = format!("{} (input ends inside an unterminated token)", diag.message);
            self.halted = true;
        }
        trace!(kind = %diag.kind, message = %diag.message, "recording diagnostic");
        self.diagnostics.push(diag);
        if !self.halted && self.diagnostics.len() >= self.max_errors {
            self.diagnostics.push(Diagnostic::syntax("too many errors; stopping", self.peek_span()));
            self.halted = true;
            debug!(max_errors = self.max_errors, "error cap reached");
        }
    }

    /// Skips tokens until one of `stop` (or end of input).
    fn synchronize(&mut self, stop: &[Token]) {
        while let Some(tok) = self.peek() {
            if stop.contains(&tok) || (self.in_package && tok == Token::End) {
                break;
            }
            self.pos += 1;
        }
    }

    /// Declaration-level recovery; always makes progress past `start`.
    fn recover_decl(&mut self, start: usize) {
        if self.pos == start {
            self.advance();
        }
        self.synchronize(DECL_START);
        trace!(pos = self.pos, "resynchronized at declaration boundary");
    }

    /// Recovery inside a node declaration: skip to and past the closing `tel`.
    fn recover_node(&mut self) {
        let mut stop = NODE_STOP.to_vec();
        stop.push(Token::Tel);
        self.synchronize(&stop);
        if self.eat(Token::Tel).is_some() && self.eat(Token::Semi).is_none() {
            self.eat(Token::Dot);
        }
        trace!(pos = self.pos, "resynchronized after node");
    }

    /// Recovery after a broken static parameter list or profile. A `const` there is
    /// taken as the next declaration; a body that follows is skipped up to its `tel`.
    fn recover_header(&mut self) {
        let mut stop = DECL_START.to_vec();
        stop.extend([Token::Let, Token::Tel]);
        self.synchronize(&stop);
        if self.at(Token::Let) {
            self.recover_node();
        } else if self.eat(Token::Tel).is_some() && self.eat(Token::Semi).is_none() {
            self.eat(Token::Dot);
        }
        trace!(pos = self.pos, "resynchronized after node header");
    }

    /// Equation-level recovery: skip past the next `;`, stopping early at `tel`.
    fn recover_statement(&mut self, start: usize) {
        if self.pos == start && !self.at(Token::Tel) {
            self.advance();
        }
        let mut stop = NODE_STOP.to_vec();
        stop.extend([Token::Tel, Token::Semi]);
        self.synchronize(&stop);
        self.eat(Token::Semi);
    }

    // ── Identifiers ──────────────────────────────────────────────────

    /// Binding identifier followed by any number of pragmas.
    fn parse_ident(&mut self) -> PResult<Ident> {
        let span = match self.eat(Token::Ident) {
            Some(span) => span,
            None => return Err(self.expected_what("identifier")),
        };
        let pragmas = self.parse_pragmas();
        Ok(Ident { name: self.text(span).to_string(), span, pragmas })
    }

    fn parse_pragmas(&mut self) -> Vec<Pragma> {
        let mut pragmas = Vec::new();
        while let Some(span) = self.eat(Token::Pragma) {
            let inner = self.text(span).trim_matches('%');
            let (key, value) = inner.split_once(':').unwrap_or((inner, ""));
            pragmas.push(Pragma { key: key.trim().to_string(), value: value.trim().to_string(), span });
        }
        pragmas
    }

    /// Number of tokens an identifier reference starting here would use (1 or 3), or 0.
    fn ident_ref_len(&self) -> usize {
        if !self.at(Token::Ident) {
            return 0;
        }
        if self.peek_at(1) == Some(Token::ColonColon) && self.peek_at(2) == Some(Token::Ident) {
            3
        } else {
            1
        }
    }

    /// `member` or `package::member`, written without blanks around `::`.
    fn parse_ident_ref(&mut self) -> PResult<IdentRef> {
        let first = match self.eat(Token::Ident) {
            Some(span) => span,
            None => return Err(self.expected_what("identifier")),
        };
        if !self.at(Token::ColonColon) {
            return Ok(IdentRef { package: None, member: self.text(first).to_string(), span: first });
        }
        let sep = self.peek_span();
        self.advance();
        let member = match self.eat(Token::Ident) {
            Some(span) => span,
            None => return Err(self.expected_what("identifier after `::`")),
        };
        if first.end != sep.start || sep.end != member.start {
            return Err(Diagnostic::syntax(
                "qualified names must be written without blanks around `::`",
                first.to(member),
            )
            .into());
        }
        Ok(IdentRef {
            package: Some(self.text(first).to_string()),
            member: self.text(member).to_string(),
            span: first.to(member),
        })
    }

    // ── Entry points ─────────────────────────────────────────────────

    pub fn parse_source_file(&mut self) -> SourceFile {
        debug!(tokens = self.tokens.len(), "parsing source file");
        let mut file = SourceFile::default();

        while self.at(Token::Include) && !self.halted {
            let start = self.pos;
            match self.parse_include() {
                Ok(include) => file.includes.push(include),
                Err(e) => {
                    self.report(e);
                    self.recover_decl(start);
                }
            }
        }

        while !self.halted {
            let Some(tok) = self.peek() else { break };
            let start = self.pos;
            let start_offset = self.peek_span().start;
            let result = match tok {
                Token::Package => self.parse_package_decl().map(Item::Package),
                Token::Model => self.parse_model_decl().map(Item::Model),
                Token::Include => Err(Diagnostic::syntax(
                    "`include` directives must come before all declarations",
                    self.peek_span(),
                )
                .into()),
                _ if is_decl_start(tok) => self.parse_declaration().map(Item::Decl),
                _ => Err(self.expected_what("a declaration")),
            };
            match result {
                Ok(item) => file.items.push(Spanned::new(item, self.span_from(start_offset))),
                Err(e) => {
                    self.report(e);
                    self.recover_decl(start);
                    file.items.push(Spanned::new(Item::Error, self.span_from(start_offset)));
                }
            }
        }

        debug!(items = file.items.len(), diagnostics = self.diagnostics.len(), "parsed source file");
        file
    }

    /// Parses a single expression that must span the whole input.
    pub fn parse_standalone_expr(&mut self) -> Option<Spanned<Expr>> {
        let result = self.parse_expr().and_then(|e| {
            if self.is_at_end() { Ok(e) } else { Err(self.expected_what("end of expression")) }
        });
        match result {
            Ok(e) => Some(e),
            Err(err) => {
                self.report(err);
                None
            }
        }
    }
}

fn is_decl_start(tok: Token) -> bool {
    matches!(
        tok,
        Token::Node | Token::Function | Token::Unsafe | Token::Extern | Token::Type | Token::Const
    )
}
