// Category 10: Complete programs

use super::*;

#[test]
fn counter_node() {
    let src = r#"
-- A resettable counter.
node counter(reset: bool) returns (n: int);
let
  n = 0 -> if reset then 0 else pre n + 1;
tel
"#;
    let tokens = lex_ok(src);
    assert_eq!(tokens[0].0, Token::Node);
    assert_eq!(tokens.last().unwrap().0, Token::Tel);
    assert_eq!(lex(src).comments_before(0).count(), 1);
}

#[test]
fn package_with_generic_node() {
    let src = r#"
include "std.lus"

package adders
  provides node sum<<const n: int>>(t: int^n) returns (s: int);
body
  node sum<<const n: int>>(t: int^n) returns (s: int);
  let
    s = red<<+, n>>(0, t);
  tel
end
"#;
    let tokens = lex_ok(src);
    assert!(tokens.iter().any(|(t, _)| *t == Token::StringLit));
    assert_eq!(tokens.iter().filter(|(t, _)| *t == Token::LtLt).count(), 3);
    assert_eq!(tokens.iter().filter(|(t, _)| *t == Token::GtGt).count(), 3);
}

#[test]
fn clocks_and_merge() {
    let src = "node m(c: bool; x: int when c) returns (y: int);\n\
               let y = merge c (true -> x) (false -> 0 when not c); tel";
    let tokens = lex_ok(src);
    assert_eq!(tokens.iter().filter(|(t, _)| *t == Token::When).count(), 2);
    assert_eq!(tokens.iter().filter(|(t, _)| *t == Token::Arrow).count(), 2);
}

#[test]
fn types_and_constants() {
    let src = "type color = enum { Red, Green };\n\
               type pt = struct { x: real; y: real = 0.0 };\n\
               const origin: pt = pt { x = 0.0, y = 0.0 };\n\
               const slice = [1, 2, 3, 4][1..2];";
    let tokens = lex_ok(src);
    assert_eq!(tokens.iter().filter(|(t, _)| *t == Token::RealLit).count(), 3);
    assert!(tokens.iter().any(|(t, _)| *t == Token::DotDot));
}

#[test]
fn reconstruct_whole_program() {
    let src = "(* header *)\nfunction f(a, b: int) returns (c: int);\nlet\n\tc = a*b; -- product\ntel.\n";
    assert_eq!(lex(src).reconstruct(src), src);
}
