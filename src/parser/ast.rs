use serde::Serialize;

use crate::span::{Span, Spanned};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SourceFile {
    pub includes: Vec<Spanned<Include>>,
    pub items: Vec<Spanned<Item>>,
}

impl SourceFile {
    /// Top-level declarations, excluding packages and models.
    pub fn declarations(&self) -> impl Iterator<Item = &Spanned<Declaration>> {
        self.items.iter().filter_map(|item| match &item.node {
            Item::Decl(d) => Some(d),
            _ => None,
        })
    }

    pub fn packages(&self) -> impl Iterator<Item = &PackageDecl> {
        self.items.iter().filter_map(|item| match &item.node {
            Item::Package(p) => Some(p),
            _ => None,
        })
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelDecl> {
        self.items.iter().filter_map(|item| match &item.node {
            Item::Model(m) => Some(m),
            _ => None,
        })
    }

    /// Every node/function declaration, including those nested in package and model bodies.
    pub fn nodes(&self) -> Vec<&NodeDecl> {
        let mut decls: Vec<&Spanned<Declaration>> = Vec::new();
        for item in &self.items {
            match &item.node {
                Item::Decl(d) => decls.push(d),
                Item::Package(p) => {
                    if let PackageBody::Definition { decls: body, .. } = &p.body {
                        decls.extend(body);
                    }
                }
                Item::Model(m) => decls.extend(&m.decls),
                Item::Error => {}
            }
        }
        decls
            .into_iter()
            .filter_map(|d| match &d.node {
                Declaration::Node(n) => Some(n),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Include {
    /// Path as written, without the quotes.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Item {
    Decl(Spanned<Declaration>),
    Package(PackageDecl),
    Model(ModelDecl),
    /// Placeholder for a top-level fragment that could not be parsed.
    Error,
}

// ── Identifiers ──────────────────────────────────────────────────────

/// Binding identifier: unqualified, may carry pragmas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
    pub pragmas: Vec<Pragma>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pragma {
    pub key: String,
    pub value: String,
    pub span: Span,
}

/// Reference identifier: `member` or `package::member`, never carries pragmas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentRef {
    pub package: Option<String>,
    pub member: String,
    pub span: Span,
}

impl IdentRef {
    pub fn is_qualified(&self) -> bool {
        self.package.is_some()
    }
}

impl std::fmt::Display for IdentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.package {
            Some(pkg) => write!(f, "{pkg}::{}", self.member),
            None => f.write_str(&self.member),
        }
    }
}

// ── Declarations ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Declaration {
    Node(NodeDecl),
    Type(Vec<Spanned<TypeDef>>),
    Const(Vec<Spanned<ConstDef>>),
    Extern(ExternNodeDecl),
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Node,
    Function,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDecl {
    pub is_unsafe: bool,
    pub kind: NodeKind,
    pub name: Ident,
    /// `None` when there is no `<<...>>` at all.
    pub static_params: Option<Vec<Spanned<StaticParam>>>,
    pub profile: Option<NodeProfile>,
    pub body: NodeBody,
}

impl NodeDecl {
    pub fn alias(&self) -> Option<&Spanned<EffectiveNode>> {
        match &self.body {
            NodeBody::Alias(target) => Some(target),
            _ => None,
        }
    }

    pub fn definition(&self) -> Option<&NodeDefinition> {
        match &self.body {
            NodeBody::Definition(def) => Some(def),
            _ => None,
        }
    }
}

/// A node has either a body or an alias target, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeBody {
    Definition(NodeDefinition),
    Alias(Spanned<EffectiveNode>),
    /// The declaration broke off after its header.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDefinition {
    pub locals: Vec<Spanned<LocalBlock>>,
    pub equations: Vec<Spanned<Equation>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeProfile {
    pub inputs: Vec<Spanned<VarDecl>>,
    pub outputs: Vec<Spanned<VarDecl>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LocalBlock {
    Vars(Vec<Spanned<VarDecl>>),
    Consts(Vec<Spanned<ConstDef>>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedIds {
    pub names: Vec<Ident>,
    pub ty: Spanned<Type>,
}

/// `x, y: int`, `x: int when c` or `(x: int; y: bool) when c`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDecl {
    pub groups: Vec<TypedIds>,
    pub clock: Option<Spanned<ClockExpr>>,
    pub parenthesized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConstDef {
    /// `a, b: int`: imported or abstract constants.
    Typed { names: Vec<Ident>, ty: Spanned<Type> },
    /// `a: int = e`
    TypedValued { name: Ident, ty: Spanned<Type>, value: Spanned<Expr> },
    /// `a = e`
    Valued { name: Ident, value: Spanned<Expr> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDef {
    pub name: Ident,
    pub value: Option<Spanned<TypeDefValue>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeDefValue {
    Alias(Type),
    Enum(Vec<Ident>),
    Struct { keyword: bool, fields: Vec<Spanned<FieldDecl>> },
}

/// Struct field group. `value` is only present when `names` has exactly one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDecl {
    pub names: Vec<Ident>,
    pub ty: Spanned<Type>,
    pub value: Option<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Type {
    Bool,
    Int,
    Real,
    Named(IdentRef),
    Table { element: Box<Spanned<Type>>, length: Box<Spanned<Expr>> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternNodeDecl {
    pub is_unsafe: bool,
    pub kind: NodeKind,
    pub name: Ident,
    pub profile: NodeProfile,
}

// ── Packages and models ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageDecl {
    pub name: Ident,
    pub body: PackageBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AliasKeyword {
    Eq,
    Is,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArgDelimiter {
    /// `m(t = int)`
    Paren,
    /// `m<<t = int>>`
    Angle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PackageBody {
    Definition {
        uses: Vec<Ident>,
        provides: Option<Vec<Spanned<Provide>>>,
        decls: Vec<Spanned<Declaration>>,
    },
    Alias {
        keyword: AliasKeyword,
        model: Ident,
        delimiter: ArgDelimiter,
        args: Vec<Spanned<NamedStaticArg>>,
    },
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDecl {
    pub name: Ident,
    pub uses: Vec<Ident>,
    pub needs: Vec<Spanned<StaticParam>>,
    pub provides: Option<Vec<Spanned<Provide>>>,
    pub decls: Vec<Spanned<Declaration>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Provide {
    Const { name: Ident, ty: Spanned<Type>, value: Option<Spanned<Expr>> },
    Node {
        is_unsafe: bool,
        kind: NodeKind,
        name: Ident,
        static_params: Option<Vec<Spanned<StaticParam>>>,
        profile: NodeProfile,
    },
    Type(TypeDef),
}

// ── Static parameters and arguments ──────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StaticParam {
    Type(Ident),
    Const { name: Ident, ty: Spanned<Type> },
    Node { is_unsafe: bool, kind: NodeKind, name: Ident, profile: NodeProfile },
}

/// A node reference with optional static arguments: `f`, `pkg::f`, `map<<+, 3>>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveNode {
    pub name: IdentRef,
    pub static_args: Option<Vec<Spanned<StaticArg>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StaticArg {
    /// A bare name: could denote a type, a constant or a node.
    Ident(IdentRef),
    Type { ty: Spanned<Type>, explicit: bool },
    Const { value: Spanned<Expr>, explicit: bool },
    /// `keyword` is set when written `node n` / `function n`.
    Node { node: Spanned<EffectiveNode>, keyword: Option<NodeKind> },
    Op(PredefOp),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedStaticArg {
    /// `None` for a positional argument.
    pub name: Option<Ident>,
    pub arg: Spanned<StaticArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PredefOp {
    Not,
    Fby,
    Pre,
    Current,
    Arrow,
    And,
    Or,
    Xor,
    Implies,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    Div,
    Mod,
    Minus,
    Plus,
    Slash,
    Star,
    If,
}

impl PredefOp {
    pub fn as_str(self) -> &'static str {
        match self {
            PredefOp::Not => "not",
            PredefOp::Fby => "fby",
            PredefOp::Pre => "pre",
            PredefOp::Current => "current",
            PredefOp::Arrow => "->",
            PredefOp::And => "and",
            PredefOp::Or => "or",
            PredefOp::Xor => "xor",
            PredefOp::Implies => "=>",
            PredefOp::Eq => "=",
            PredefOp::Neq => "<>",
            PredefOp::Lt => "<",
            PredefOp::Le => "<=",
            PredefOp::Gt => ">",
            PredefOp::Ge => ">=",
            PredefOp::Div => "div",
            PredefOp::Mod => "mod",
            PredefOp::Minus => "-",
            PredefOp::Plus => "+",
            PredefOp::Slash => "/",
            PredefOp::Star => "*",
            PredefOp::If => "if",
        }
    }
}

// ── Equations ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Equation {
    Assert(Spanned<Expr>),
    Define { lhs: LeftList, rhs: Spanned<Expr> },
    /// An equation skipped by error recovery.
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeftList {
    pub items: Vec<Spanned<LeftExpr>>,
    pub parenthesized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LeftExpr {
    Ident(Ident),
    Field { value: Box<Spanned<LeftExpr>>, field: Ident },
    Index { value: Box<Spanned<LeftExpr>>, index: Index },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Index {
    Single(Box<Spanned<Expr>>),
    Select(Select),
}

/// `from .. to [step s]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Select {
    pub from: Box<Spanned<Expr>>,
    pub to: Box<Spanned<Expr>>,
    pub step: Option<Box<Spanned<Expr>>>,
}

// ── Expressions ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Bool(bool),
    /// Digits as written.
    Int(String),
    /// Real literal as written.
    Real(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(Literal),
    Ident(IdentRef),
    /// `f<<args>>` in callee position.
    Instance(EffectiveNode),
    /// `(a, b)`. A single element is a parenthesised expression.
    Tuple(Vec<Spanned<Expr>>),
    Array(Vec<Spanned<Expr>>),
    Struct { name: IdentRef, base: Option<IdentRef>, fields: Vec<Spanned<FieldInit>> },
    Field { value: Box<Spanned<Expr>>, field: Ident },
    Index { value: Box<Spanned<Expr>>, index: Index },
    Call { callee: Box<Spanned<Expr>>, args: Vec<Spanned<Expr>> },
    If {
        keyword: CondKeyword,
        condition: Box<Spanned<Expr>>,
        then_branch: Box<Spanned<Expr>>,
        else_branch: Box<Spanned<Expr>>,
    },
    Merge { clock: Ident, arms: Vec<Spanned<MergeArm>> },
    When { value: Box<Spanned<Expr>>, clock: Spanned<ClockExpr> },
    Unary { op: UnaryOp, operand: Box<Spanned<Expr>> },
    Binary { op: BinOp, lhs: Box<Spanned<Expr>>, rhs: Box<Spanned<Expr>> },
    Nary { op: NaryOp, operands: Vec<Spanned<Expr>> },
    /// Non-associative: both operands are below comparison level.
    Comparison { op: CmpOp, lhs: Box<Spanned<Expr>>, rhs: Box<Spanned<Expr>> },
    /// Placeholder for an expression that could not be parsed.
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldInit {
    pub field: Ident,
    pub value: Spanned<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CondKeyword {
    If,
    When,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeArm {
    pub pattern: MergePattern,
    pub value: Spanned<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MergePattern {
    Ident(IdentRef),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ClockExpr {
    On(Ident),
    Not { clock: Ident, parenthesized: bool },
    /// `C(c)`: `c` sampled on the enum constructor `C`.
    Enum { constructor: IdentRef, clock: Ident },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Not,
    IntCast,
    RealCast,
    Neg,
    Pre,
    Current,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinOp {
    Bar,
    Arrow,
    Implies,
    Or,
    Xor,
    And,
    Add,
    Sub,
    Mul,
    Slash,
    Percent,
    Mod,
    Div,
    Power,
    Hat,
    Fby,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CmpOp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Neq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NaryOp {
    /// `#(...)`: at most one operand is true.
    Diese,
    Nor,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::IntCast => "int",
            UnaryOp::RealCast => "real",
            UnaryOp::Neg => "-",
            UnaryOp::Pre => "pre",
            UnaryOp::Current => "current",
        }
    }
}

impl BinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Bar => "|",
            BinOp::Arrow => "->",
            BinOp::Implies => "=>",
            BinOp::Or => "or",
            BinOp::Xor => "xor",
            BinOp::And => "and",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Slash => "/",
            BinOp::Percent => "%",
            BinOp::Mod => "mod",
            BinOp::Div => "div",
            BinOp::Power => "**",
            BinOp::Hat => "^",
            BinOp::Fby => "fby",
        }
    }
}

impl CmpOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Eq => "=",
            CmpOp::Ge => ">=",
            CmpOp::Gt => ">",
            CmpOp::Neq => "<>",
        }
    }
}

impl NaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            NaryOp::Diese => "#",
            NaryOp::Nor => "nor",
        }
    }
}
