#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

/// Lexemes the parser has to deal with; arbitrary sequences of them reach deep into the grammar.
#[derive(Arbitrary, Debug)]
enum FuzzToken {
    Ident,
    QualifiedIdent,
    IntLit,
    RealLit,
    StringLit,
    Pragma,
    Node,
    Function,
    Returns,
    Var,
    Let,
    Tel,
    Const,
    Type,
    Package,
    Model,
    Body,
    End,
    Include,
    If,
    Then,
    Else,
    Merge,
    When,
    Pre,
    Fby,
    Arrow,
    Plus,
    Minus,
    Lt,
    Eq,
    LtLt,
    GtGt,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Colon,
    DotDot,
    Dot,
    Caret,
}

impl FuzzToken {
    fn lexeme(&self) -> &'static str {
        match self {
            FuzzToken::Ident => "x",
            FuzzToken::QualifiedIdent => "p::x",
            FuzzToken::IntLit => "3",
            FuzzToken::RealLit => "2.5",
            FuzzToken::StringLit => "\"a.lus\"",
            FuzzToken::Pragma => "%k:v%",
            FuzzToken::Node => "node",
            FuzzToken::Function => "function",
            FuzzToken::Returns => "returns",
            FuzzToken::Var => "var",
            FuzzToken::Let => "let",
            FuzzToken::Tel => "tel",
            FuzzToken::Const => "const",
            FuzzToken::Type => "type",
            FuzzToken::Package => "package",
            FuzzToken::Model => "model",
            FuzzToken::Body => "body",
            FuzzToken::End => "end",
            FuzzToken::Include => "include",
            FuzzToken::If => "if",
            FuzzToken::Then => "then",
            FuzzToken::Else => "else",
            FuzzToken::Merge => "merge",
            FuzzToken::When => "when",
            FuzzToken::Pre => "pre",
            FuzzToken::Fby => "fby",
            FuzzToken::Arrow => "->",
            FuzzToken::Plus => "+",
            FuzzToken::Minus => "-",
            FuzzToken::Lt => "<",
            FuzzToken::Eq => "=",
            FuzzToken::LtLt => "<<",
            FuzzToken::GtGt => ">>",
            FuzzToken::LParen => "(",
            FuzzToken::RParen => ")",
            FuzzToken::LBracket => "[",
            FuzzToken::RBracket => "]",
            FuzzToken::LBrace => "{",
            FuzzToken::RBrace => "}",
            FuzzToken::Comma => ",",
            FuzzToken::Semi => ";",
            FuzzToken::Colon => ":",
            FuzzToken::DotDot => "..",
            FuzzToken::Dot => ".",
            FuzzToken::Caret => "^",
        }
    }
}

#[derive(Arbitrary, Debug)]
struct FuzzTokens {
    tokens: Vec<FuzzToken>,
    max_errors: u8,
}

fuzz_target!(|input: FuzzTokens| {
    let source = input.tokens.iter().map(FuzzToken::lexeme).collect::<Vec<_>>().join(" ");
    let options = lv6::ParseOptions { max_errors: usize::from(input.max_errors).max(1), ..Default::default() };
    let result = lv6::parse_with_options(&source, &options);
    assert!(result.diagnostics.len() <= options.max_errors + 1);
    let _ = lv6::pretty::pretty_print(&result.ast);
});
