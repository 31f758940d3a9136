//! Operator precedence table.
//!
//! Levels follow the LV6 reference yacc grammar, from `fby` (tightest) down to `else`.
//! The expression parser climbs this table; nothing else decides binding strength.

use crate::lexer::Token;
use crate::parser::ast::{BinOp, CmpOp, UnaryOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Prec {
    Else = 0,
    Bar = 1,
    Arrow = 2,
    Step = 3,
    Cdots = 4,
    Impl = 5,
    Or = 6,
    And = 7,
    Eq = 8,
    Not = 9,
    Additive = 10,
    Multiplicative = 11,
    Power = 12,
    When = 13,
    Cast = 14,
    Uminus = 15,
    Hat = 16,
    Bracket = 17,
    Comma = 18,
    Fby = 19,
}

impl Prec {
    pub fn level(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
    /// Operands must bind strictly tighter; a second operator at the same level is an error.
    None,
}

/// Binary operators of the top tier (below comparison level, plus comparison itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopOp {
    Binary(BinOp),
    Compare(CmpOp),
}

/// Operators that combine full expressions: `| -> => or xor and` and the comparisons.
pub fn top_operator(tok: Token) -> Option<(TopOp, Prec, Assoc)> {
    let entry = match tok {
        Token::Pipe => (TopOp::Binary(BinOp::Bar), Prec::Bar, Assoc::Left),
        Token::Arrow => (TopOp::Binary(BinOp::Arrow), Prec::Arrow, Assoc::Left),
        Token::FatArrow => (TopOp::Binary(BinOp::Implies), Prec::Impl, Assoc::Right),
        Token::Or => (TopOp::Binary(BinOp::Or), Prec::Or, Assoc::Left),
        Token::Xor => (TopOp::Binary(BinOp::Xor), Prec::Or, Assoc::Left),
        Token::And => (TopOp::Binary(BinOp::And), Prec::And, Assoc::Left),
        Token::Lt => (TopOp::Compare(CmpOp::Lt), Prec::Eq, Assoc::None),
        Token::LtEq => (TopOp::Compare(CmpOp::Le), Prec::Eq, Assoc::None),
        Token::Eq => (TopOp::Compare(CmpOp::Eq), Prec::Eq, Assoc::None),
        Token::GtEq => (TopOp::Compare(CmpOp::Ge), Prec::Eq, Assoc::None),
        Token::Gt => (TopOp::Compare(CmpOp::Gt), Prec::Eq, Assoc::None),
        Token::Neq => (TopOp::Compare(CmpOp::Neq), Prec::Eq, Assoc::None),
        _ => return None,
    };
    Some(entry)
}

/// Binary operators whose operands are tier-1 expressions.
pub fn inner_operator(tok: Token) -> Option<(BinOp, Prec, Assoc)> {
    let entry = match tok {
        Token::Plus => (BinOp::Add, Prec::Additive, Assoc::Left),
        Token::Minus => (BinOp::Sub, Prec::Additive, Assoc::Left),
        Token::Star => (BinOp::Mul, Prec::Multiplicative, Assoc::Left),
        Token::Slash => (BinOp::Slash, Prec::Multiplicative, Assoc::Left),
        Token::Percent => (BinOp::Percent, Prec::Multiplicative, Assoc::Left),
        Token::Mod => (BinOp::Mod, Prec::Multiplicative, Assoc::Left),
        Token::Div => (BinOp::Div, Prec::Multiplicative, Assoc::Left),
        Token::StarStar => (BinOp::Power, Prec::Power, Assoc::Left),
        Token::Caret => (BinOp::Hat, Prec::Hat, Assoc::Left),
        Token::Fby => (BinOp::Fby, Prec::Fby, Assoc::Right),
        _ => return None,
    };
    Some(entry)
}

/// Level and associativity of a binary operator, for printing.
pub fn binop_prec(op: BinOp) -> (Prec, Assoc) {
    match op {
        BinOp::Bar => (Prec::Bar, Assoc::Left),
        BinOp::Arrow => (Prec::Arrow, Assoc::Left),
        BinOp::Implies => (Prec::Impl, Assoc::Right),
        BinOp::Or | BinOp::Xor => (Prec::Or, Assoc::Left),
        BinOp::And => (Prec::And, Assoc::Left),
        BinOp::Add | BinOp::Sub => (Prec::Additive, Assoc::Left),
        BinOp::Mul | BinOp::Slash | BinOp::Percent | BinOp::Mod | BinOp::Div => (Prec::Multiplicative, Assoc::Left),
        BinOp::Power => (Prec::Power, Assoc::Left),
        BinOp::Hat => (Prec::Hat, Assoc::Left),
        BinOp::Fby => (Prec::Fby, Assoc::Right),
    }
}

pub fn unary_prec(op: UnaryOp) -> Prec {
    match op {
        UnaryOp::Not => Prec::Not,
        UnaryOp::IntCast | UnaryOp::RealCast => Prec::Cast,
        UnaryOp::Neg | UnaryOp::Pre | UnaryOp::Current => Prec::Uminus,
    }
}

/// Minimum level the right operand must reach.
pub fn right_min(prec: Prec, assoc: Assoc) -> u8 {
    match assoc {
        Assoc::Right => prec.level(),
        Assoc::Left | Assoc::None => prec.level() + 1,
    }
}
