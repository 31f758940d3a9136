use logos::Logos;
use serde::Serialize;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Token {
    // Keywords
    #[token("include")]
    Include,
    #[token("package")]
    Package,
    #[token("is")]
    Is,
    #[token("body")]
    Body,
    #[token("end")]
    End,
    #[token("uses")]
    Uses,
    #[token("provides")]
    Provides,
    #[token("model")]
    Model,
    #[token("needs")]
    Needs,
    #[token("const")]
    Const,
    #[token("node")]
    Node,
    #[token("function")]
    Function,
    #[token("unsafe")]
    Unsafe,
    #[token("extern")]
    Extern,
    #[token("returns")]
    Returns,
    #[token("var")]
    Var,
    #[token("let")]
    Let,
    #[token("tel")]
    Tel,
    #[token("type")]
    Type,
    #[token("enum")]
    Enum,
    #[token("struct")]
    Struct,
    #[token("bool")]
    Bool,
    #[token("int")]
    Int,
    #[token("real")]
    Real,
    #[token("when")]
    When,
    #[token("assert")]
    Assert,
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("merge")]
    Merge,
    #[token("not")]
    Not,
    #[token("pre")]
    Pre,
    #[token("current")]
    Current,
    #[token("fby")]
    Fby,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("xor")]
    Xor,
    #[token("mod")]
    Mod,
    #[token("div")]
    Div,
    #[token("nor")]
    Nor,
    #[token("step")]
    Step,
    #[token("with")]
    With,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Literals
    #[regex(r"[0-9]+")]
    IntLit,

    #[regex(r"[0-9]+[eE][+\-]?[0-9]+")]
    #[regex(r"[0-9]+\.[eE][+\-]?[0-9]+")]
    #[regex(r"[0-9]+\.[0-9]+([eE][+\-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][+\-]?[0-9]+)?")]
    #[regex(r"[0-9]+\.")]
    RealLit,

    /// Digits directly followed by `..`; split by the lexer into `IntLit` + `DotDot`.
    #[regex(r"[0-9]+\.\.")]
    IntRange,

    #[regex(r#""[^"]*""#)]
    StringLit,

    #[regex(r#""[^"]*"#)]
    UnterminatedString,

    // Identifiers
    #[regex(r"[_a-zA-Z][_'a-zA-Z0-9]*")]
    Ident,

    /// `%key:value%`; produced by `lex` from a `%` that opens one.
    Pragma,

    // Operators
    #[token("<<")]
    LtLt,
    #[token(">>")]
    GtGt,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token("=")]
    Eq,
    #[token(">=")]
    GtEq,
    #[token(">")]
    Gt,
    #[token("<>")]
    Neq,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    StarStar,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("|")]
    Pipe,
    #[token("#")]
    Hash,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token("::")]
    ColonColon,
    #[token(":")]
    Colon,
    #[token("..")]
    DotDot,
    #[token(".")]
    Dot,

    // Trivia (moved to the trivia channel by `lex`)
    #[regex(r"[ \t\n\r\x0B]+")]
    Whitespace,

    #[regex(r"--[^\n]*")]
    LineComment,

    /// Only the opener is matched here; `lex` extends it to the first closer.
    #[token("(*")]
    #[token("/*")]
    BlockComment,
}

impl Token {
    pub fn is_trivia(self) -> bool {
        matches!(self, Token::Whitespace | Token::LineComment | Token::BlockComment)
    }
}

/// Returns true if the given string is a reserved Lustre keyword.
pub fn is_keyword(s: &str) -> bool {
    matches!(
        s,
        "include" | "package" | "is" | "body" | "end" | "uses" | "provides" | "model" | "needs"
            | "const" | "node" | "function" | "unsafe" | "extern" | "returns" | "var" | "let"
            | "tel" | "type" | "enum" | "struct" | "bool" | "int" | "real" | "when" | "assert"
            | "if" | "then" | "else" | "merge" | "not" | "pre" | "current" | "fby" | "and"
            | "or" | "xor" | "mod" | "div" | "nor" | "step" | "with" | "true" | "false"
    )
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Token::Include => "include",
            Token::Package => "package",
            Token::Is => "is",
            Token::Body => "body",
            Token::End => "end",
            Token::Uses => "uses",
            Token::Provides => "provides",
            Token::Model => "model",
            Token::Needs => "needs",
            Token::Const => "const",
            Token::Node => "node",
            Token::Function => "function",
            Token::Unsafe => "unsafe",
            Token::Extern => "extern",
            Token::Returns => "returns",
            Token::Var => "var",
            Token::Let => "let",
            Token::Tel => "tel",
            Token::Type => "type",
            Token::Enum => "enum",
            Token::Struct => "struct",
            Token::Bool => "bool",
            Token::Int => "int",
            Token::Real => "real",
            Token::When => "when",
            Token::Assert => "assert",
            Token::If => "if",
            Token::Then => "then",
            Token::Else => "else",
            Token::Merge => "merge",
            Token::Not => "not",
            Token::Pre => "pre",
            Token::Current => "current",
            Token::Fby => "fby",
            Token::And => "and",
            Token::Or => "or",
            Token::Xor => "xor",
            Token::Mod => "mod",
            Token::Div => "div",
            Token::Nor => "nor",
            Token::Step => "step",
            Token::With => "with",
            Token::True => "true",
            Token::False => "false",
            Token::IntLit => "integer literal",
            Token::RealLit => "real literal",
            Token::IntRange => "integer range",
            Token::StringLit => "string literal",
            Token::UnterminatedString => "unterminated string",
            Token::Ident => "identifier",
            Token::Pragma => "pragma",
            Token::LtLt => "<<",
            Token::GtGt => ">>",
            Token::Lt => "<",
            Token::LtEq => "<=",
            Token::Eq => "=",
            Token::GtEq => ">=",
            Token::Gt => ">",
            Token::Neq => "<>",
            Token::Arrow => "->",
            Token::FatArrow => "=>",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::StarStar => "**",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Caret => "^",
            Token::Pipe => "|",
            Token::Hash => "#",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::Comma => ",",
            Token::Semi => ";",
            Token::ColonColon => "::",
            Token::Colon => ":",
            Token::DotDot => "..",
            Token::Dot => ".",
            Token::Whitespace => "whitespace",
            Token::LineComment => "line comment",
            Token::BlockComment => "block comment",
        };
        f.write_str(s)
    }
}
