use super::ast::*;
use super::precedence::{Prec, TopOp, inner_operator, right_min, top_operator};
use super::{NODE_STOP, PResult, Parser};
use crate::diagnostics::Diagnostic;
use crate::lexer::Token;
use crate::span::{Span, Spanned};

impl<'a> Parser<'a> {
    // ── Equations ────────────────────────────────────────────────────

    /// Equations up to and including `tel`. Equations parsed before a failure stay in `out`.
    pub(super) fn parse_equations(&mut self, out: &mut Vec<Spanned<Equation>>) -> PResult<()> {
        loop {
            if self.halted {
                return Ok(());
            }
            match self.peek() {
                Some(Token::Tel) => {
                    self.advance();
                    return Ok(());
                }
                Some(tok) if NODE_STOP.contains(&tok) => return Err(self.unexpected(&["tel".into()])),
                None => return Err(self.unexpected(&["tel".into()])),
                Some(_) => {}
            }
            let start = self.pos;
            let start_offset = self.peek_span().start;
            match self.parse_equation() {
                Ok(eq) => out.push(eq),
                Err(e) => {
                    self.report(e);
                    self.recover_statement(start);
                    out.push(Spanned::new(Equation::Error, self.span_from(start_offset)));
                }
            }
        }
    }

    fn parse_equation(&mut self) -> PResult<Spanned<Equation>> {
        let start = self.peek_span().start;
        let eq = if self.eat(Token::Assert).is_some() {
            Equation::Assert(self.parse_expr()?)
        } else {
            let lhs = self.parse_left_list()?;
            self.expect(Token::Eq)?;
            let rhs = self.parse_expr()?;
            Equation::Define { lhs, rhs }
        };
        let span = self.span_from(start);
        self.expect(Token::Semi)?;
        Ok(Spanned::new(eq, span))
    }

    fn parse_left_list(&mut self) -> PResult<LeftList> {
        if self.eat(Token::LParen).is_some() {
            let mut items = Vec::new();
            if !self.at(Token::RParen) {
                items.push(self.parse_left_expr()?);
                while self.eat(Token::Comma).is_some() {
                    items.push(self.parse_left_expr()?);
                }
            }
            self.expect(Token::RParen)?;
            return Ok(LeftList { items, parenthesized: true });
        }
        let mut items = vec![self.parse_left_expr()?];
        while self.eat(Token::Comma).is_some() {
            items.push(self.parse_left_expr()?);
        }
        Ok(LeftList { items, parenthesized: false })
    }

    fn parse_left_expr(&mut self) -> PResult<Spanned<LeftExpr>> {
        let name = self.parse_ident()?;
        let mut left = Spanned::new(LeftExpr::Ident(name.clone()), name.span);
        loop {
            if self.eat(Token::Dot).is_some() {
                let field = self.parse_ident()?;
                let span = left.span.to(field.span);
                left = Spanned::new(LeftExpr::Field { value: Box::new(left), field }, span);
            } else if self.eat(Token::LBracket).is_some() {
                let index = self.parse_index()?;
                let end = self.expect(Token::RBracket)?;
                let span = left.span.to(end);
                left = Spanned::new(LeftExpr::Index { value: Box::new(left), index }, span);
            } else {
                break;
            }
        }
        Ok(left)
    }

    /// Contents of `[...]`: a single index or `from .. to [step s]`.
    fn parse_index(&mut self) -> PResult<Index> {
        let from = self.parse_expr()?;
        if self.eat(Token::DotDot).is_none() {
            return Ok(Index::Single(Box::new(from)));
        }
        let to = self.parse_expr()?;
        let step = if self.eat(Token::Step).is_some() { Some(Box::new(self.parse_expr()?)) } else { None };
        Ok(Index::Select(Select { from: Box::new(from), to: Box::new(to), step }))
    }

    // ── Expressions ──────────────────────────────────────────────────

    pub(super) fn parse_expr(&mut self) -> PResult<Spanned<Expr>> {
        self.nested(|p| p.parse_top(0))
    }

    /// Length of a table type: binds tighter than `^` so `int^2^3` nests left.
    pub(super) fn parse_table_length(&mut self) -> PResult<Spanned<Expr>> {
        self.parse_inner(Prec::Hat.level() + 1)
    }

    /// Top tier: `| -> => or xor and` over comparison-level operands.
    fn parse_top(&mut self, min: u8) -> PResult<Spanned<Expr>> {
        let mut lhs = self.parse_comparison()?;
        while let Some(tok) = self.peek() {
            let Some((TopOp::Binary(op), prec, assoc)) = top_operator(tok) else { break };
            if prec.level() < min {
                break;
            }
            self.advance();
            let rhs = self.nested(|p| p.parse_top(right_min(prec, assoc)))?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    /// At most one comparison between two tier-1 operands.
    fn parse_comparison(&mut self) -> PResult<Spanned<Expr>> {
        let lhs = self.parse_inner(0)?;
        let Some(op) = self.peek().and_then(comparison) else { return Ok(lhs) };
        self.advance();
        let rhs = self.parse_inner(0)?;
        if let Some(next) = self.peek().and_then(comparison) {
            return Err(Diagnostic::syntax(
                format!(
                    "comparison operators are non-associative: `{}` cannot follow `{}` without parentheses",
                    next.as_str(),
                    op.as_str()
                ),
                self.peek_span(),
            )
            .into());
        }
        let span = lhs.span.to(rhs.span);
        Ok(Spanned::new(Expr::Comparison { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, span))
    }

    /// Tier 1: arithmetic, `^`, `fby`, `when` and the prefix operators.
    fn parse_inner(&mut self, min: u8) -> PResult<Spanned<Expr>> {
        let mut lhs = self.parse_prefix()?;
        while let Some(tok) = self.peek() {
            if tok == Token::When {
                if Prec::When.level() < min {
                    break;
                }
                self.advance();
                let clock = self.parse_clock_expr()?;
                let span = lhs.span.to(clock.span);
                lhs = Spanned::new(Expr::When { value: Box::new(lhs), clock }, span);
                continue;
            }
            let Some((op, prec, assoc)) = inner_operator(tok) else { break };
            if prec.level() < min {
                break;
            }
            self.advance();
            let rhs = self.nested(|p| p.parse_inner(right_min(prec, assoc)))?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> PResult<Spanned<Expr>> {
        let (op, prec) = match self.peek() {
            Some(Token::Not) => (UnaryOp::Not, Prec::Not),
            Some(Token::Int) => (UnaryOp::IntCast, Prec::Cast),
            Some(Token::Real) => (UnaryOp::RealCast, Prec::Cast),
            Some(Token::Minus) => (UnaryOp::Neg, Prec::Uminus),
            Some(Token::Pre) => (UnaryOp::Pre, Prec::Uminus),
            Some(Token::Current) => (UnaryOp::Current, Prec::Uminus),
            _ => return self.parse_postfix(),
        };
        let start = self.peek_span().start;
        self.advance();
        let operand = self.nested(|p| p.parse_inner(prec.level() + 1))?;
        let span = Span::new(start, operand.span.end);
        Ok(Spanned::new(Expr::Unary { op, operand: Box::new(operand) }, span))
    }

    /// Primary followed by any chain of `.field`, `[index]` and `(args)`.
    fn parse_postfix(&mut self) -> PResult<Spanned<Expr>> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.advance();
                    let field = self.parse_ident()?;
                    let span = expr.span.to(field.span);
                    expr = Spanned::new(Expr::Field { value: Box::new(expr), field }, span);
                }
                Some(Token::LBracket) => {
                    self.advance();
                    let index = self.parse_index()?;
                    let end = self.expect(Token::RBracket)?;
                    let span = expr.span.to(end);
                    expr = Spanned::new(Expr::Index { value: Box::new(expr), index }, span);
                }
                Some(Token::LParen) => {
                    self.advance();
                    let args = self.parse_expr_list(Token::RParen)?;
                    let end = self.expect(Token::RParen)?;
                    let span = expr.span.to(end);
                    expr = Spanned::new(Expr::Call { callee: Box::new(expr), args }, span);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Comma-separated expressions up to (not including) `close`.
    fn parse_expr_list(&mut self, close: Token) -> PResult<Vec<Spanned<Expr>>> {
        let mut items = Vec::new();
        if self.at(close) {
            return Ok(items);
        }
        items.push(self.parse_expr()?);
        while self.eat(Token::Comma).is_some() {
            items.push(self.parse_expr()?);
        }
        Ok(items)
    }

    fn parse_primary(&mut self) -> PResult<Spanned<Expr>> {
        let start = self.peek_span().start;
        let expr = match self.peek() {
            Some(Token::IntLit) => {
                let span = self.peek_span();
                self.advance();
                Expr::Literal(Literal::Int(self.text(span).to_string()))
            }
            Some(Token::RealLit) => {
                let span = self.peek_span();
                self.advance();
                Expr::Literal(Literal::Real(self.text(span).to_string()))
            }
            Some(tok @ (Token::True | Token::False)) => {
                self.advance();
                Expr::Literal(Literal::Bool(tok == Token::True))
            }
            Some(Token::Ident) => return self.parse_name_expr(),
            Some(Token::LParen) => {
                self.advance();
                let items = self.parse_expr_list(Token::RParen)?;
                self.expect(Token::RParen)?;
                Expr::Tuple(items)
            }
            Some(Token::LBracket) => {
                self.advance();
                let items = self.parse_expr_list(Token::RBracket)?;
                self.expect(Token::RBracket)?;
                Expr::Array(items)
            }
            Some(tok @ (Token::If | Token::When)) => {
                self.advance();
                let keyword = if tok == Token::If { CondKeyword::If } else { CondKeyword::When };
                let condition = self.parse_expr()?;
                self.expect(Token::Then)?;
                let then_branch = self.parse_expr()?;
                self.expect(Token::Else)?;
                let else_branch = self.parse_expr()?;
                Expr::If {
                    keyword,
                    condition: Box::new(condition),
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                }
            }
            Some(Token::Merge) => self.parse_merge()?,
            Some(tok @ (Token::Hash | Token::Nor)) => {
                self.advance();
                let op = if tok == Token::Hash { NaryOp::Diese } else { NaryOp::Nor };
                self.expect(Token::LParen)?;
                let operands = self.parse_expr_list(Token::RParen)?;
                self.expect(Token::RParen)?;
                Expr::Nary { op, operands }
            }
            _ => return Err(self.expected_what("an expression")),
        };
        Ok(Spanned::new(expr, self.span_from(start)))
    }

    /// `name`, `name<<args>>(...)` or `Name { ... }`.
    fn parse_name_expr(&mut self) -> PResult<Spanned<Expr>> {
        let start = self.peek_span().start;
        let name = self.parse_ident_ref()?;
        let expr = match self.peek() {
            Some(Token::LtLt) => {
                let static_args = Some(self.parse_static_args()?);
                if !self.at(Token::LParen) {
                    return Err(Diagnostic::syntax(
                        format!("instance `{name}<<...>>` must be applied to arguments"),
                        self.span_from(start),
                    )
                    .with_expected(["("])
                    .into());
                }
                Expr::Instance(EffectiveNode { name, static_args })
            }
            Some(Token::LBrace) => self.parse_struct_expr(name)?,
            _ => Expr::Ident(name),
        };
        Ok(Spanned::new(expr, self.span_from(start)))
    }

    /// `Name { [base with] f = e {(,|;) f = e} }`
    fn parse_struct_expr(&mut self, name: IdentRef) -> PResult<Expr> {
        self.expect(Token::LBrace)?;
        let len = self.ident_ref_len();
        let base = if len > 0 && self.peek_at(len) == Some(Token::With) {
            let base = self.parse_ident_ref()?;
            self.advance();
            Some(base)
        } else {
            None
        };
        let mut fields = Vec::new();
        while !self.at(Token::RBrace) {
            let start = self.peek_span().start;
            let field = self.parse_ident()?;
            self.expect(Token::Eq)?;
            let value = self.parse_expr()?;
            fields.push(Spanned::new(FieldInit { field, value }, self.span_from(start)));
            if self.eat(Token::Comma).is_none() && self.eat(Token::Semi).is_none() {
                break;
            }
        }
        self.expect(Token::RBrace)?;
        Ok(Expr::Struct { name, base, fields })
    }

    /// `merge c (P -> e) ...` with at least one arm.
    fn parse_merge(&mut self) -> PResult<Expr> {
        self.expect(Token::Merge)?;
        let clock = self.parse_ident()?;
        let mut arms = Vec::new();
        while self.at(Token::LParen) {
            let start = self.peek_span().start;
            self.advance();
            let pattern = match self.peek() {
                Some(Token::True) => {
                    self.advance();
                    MergePattern::Bool(true)
                }
                Some(Token::False) => {
                    self.advance();
                    MergePattern::Bool(false)
                }
                Some(Token::Ident) => MergePattern::Ident(self.parse_ident_ref()?),
                _ => return Err(self.expected_what("a merge pattern")),
            };
            self.expect(Token::Arrow)?;
            let value = self.parse_expr()?;
            self.expect(Token::RParen)?;
            arms.push(Spanned::new(MergeArm { pattern, value }, self.span_from(start)));
        }
        if arms.is_empty() {
            return Err(self.expected_what("a merge arm `(pattern -> expr)`"));
        }
        Ok(Expr::Merge { clock, arms })
    }

    // ── Clocks ───────────────────────────────────────────────────────

    /// `c`, `not c`, `not (c)`, `C(c)`
    pub(super) fn parse_clock_expr(&mut self) -> PResult<Spanned<ClockExpr>> {
        let start = self.peek_span().start;
        let clock = if self.eat(Token::Not).is_some() {
            if self.eat(Token::LParen).is_some() {
                let clock = self.parse_ident()?;
                self.expect(Token::RParen)?;
                ClockExpr::Not { clock, parenthesized: true }
            } else {
                ClockExpr::Not { clock: self.parse_ident()?, parenthesized: false }
            }
        } else if self.ident_ref_len() > 0 && self.peek_at(self.ident_ref_len()) == Some(Token::LParen) {
            let constructor = self.parse_ident_ref()?;
            self.advance();
            let clock = self.parse_ident()?;
            self.expect(Token::RParen)?;
            ClockExpr::Enum { constructor, clock }
        } else {
            ClockExpr::On(self.parse_ident()?)
        };
        Ok(Spanned::new(clock, self.span_from(start)))
    }
}

fn comparison(tok: Token) -> Option<CmpOp> {
    match top_operator(tok) {
        Some((TopOp::Compare(op), _, _)) => Some(op),
        _ => None,
    }
}

fn binary(op: BinOp, lhs: Spanned<Expr>, rhs: Spanned<Expr>) -> Spanned<Expr> {
    let span = lhs.span.to(rhs.span);
    Spanned::new(Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, span)
}
