use super::ast::*;
use super::{DECL_START, PResult, Parser, is_decl_start};
use crate::diagnostics::Diagnostic;
use crate::lexer::Token;
use crate::span::Spanned;

impl<'a> Parser<'a> {
    // ── Includes and blocks ──────────────────────────────────────────

    pub(super) fn parse_include(&mut self) -> PResult<Spanned<Include>> {
        let start = self.expect(Token::Include)?.start;
        let span = match self.eat(Token::StringLit) {
            Some(span) => span,
            None => return Err(self.expected_what("a quoted file name")),
        };
        let path = self.text(span).trim_matches('"').to_string();
        self.eat(Token::Semi);
        Ok(Spanned::new(Include { path }, self.span_from(start)))
    }

    pub(super) fn parse_declaration(&mut self) -> PResult<Spanned<Declaration>> {
        let start = self.peek_span().start;
        let decl = match self.peek() {
            Some(Token::Unsafe) if self.peek_at(1) == Some(Token::Extern) => {
                Declaration::Extern(self.parse_extern_decl()?)
            }
            Some(Token::Extern) => Declaration::Extern(self.parse_extern_decl()?),
            Some(Token::Unsafe | Token::Node | Token::Function) => Declaration::Node(self.parse_node_decl()?),
            Some(Token::Type) => {
                self.advance();
                Declaration::Type(self.parse_type_defs()?)
            }
            Some(Token::Const) => {
                self.advance();
                Declaration::Const(self.parse_const_defs()?)
            }
            _ => return Err(self.expected_what("a declaration")),
        };
        Ok(Spanned::new(decl, self.span_from(start)))
    }

    fn parse_node_kind(&mut self) -> PResult<NodeKind> {
        if self.eat(Token::Node).is_some() {
            Ok(NodeKind::Node)
        } else if self.eat(Token::Function).is_some() {
            Ok(NodeKind::Function)
        } else {
            Err(self.unexpected(&["node".into(), "function".into()]))
        }
    }

    // ── Nodes ────────────────────────────────────────────────────────

    /// A failure after the node name keeps the declaration with whatever was parsed.
    fn parse_node_decl(&mut self) -> PResult<NodeDecl> {
        let is_unsafe = self.eat(Token::Unsafe).is_some();
        let kind = self.parse_node_kind()?;
        let name = self.parse_ident()?;
        let mut decl = NodeDecl { is_unsafe, kind, name, static_params: None, profile: None, body: NodeBody::Missing };
        if let Err(e) = self.parse_node_header(&mut decl) {
            self.report(e);
            self.recover_header();
        } else if let Err(e) = self.parse_node_tail(&mut decl) {
            self.report(e);
            self.recover_node();
        }
        Ok(decl)
    }

    fn parse_node_header(&mut self, decl: &mut NodeDecl) -> PResult<()> {
        if self.at(Token::LtLt) {
            decl.static_params = Some(self.parse_static_params()?);
        }
        if self.at(Token::LParen) {
            decl.profile = Some(self.parse_profile()?);
        }
        if self.eat(Token::Eq).is_some() {
            decl.body = NodeBody::Alias(self.parse_effective_node()?);
            self.eat(Token::Semi);
        }
        Ok(())
    }

    fn parse_node_tail(&mut self, decl: &mut NodeDecl) -> PResult<()> {
        if matches!(decl.body, NodeBody::Alias(_)) {
            if matches!(self.peek(), Some(Token::Var | Token::Let)) {
                return Err(Diagnostic::structural(
                    format!("node `{}` is an alias and cannot also have a body", decl.name.name),
                    self.peek_span(),
                )
                .into());
            }
            return Ok(());
        }

        if decl.profile.is_none() {
            if matches!(self.peek(), Some(Token::Var | Token::Const | Token::Let)) {
                return Err(Diagnostic::structural(
                    format!("node `{}` has a body but no profile", decl.name.name),
                    decl.name.span,
                )
                .into());
            }
            return Err(self.unexpected(&["(".into(), "=".into()]));
        }

        self.eat(Token::Semi);
        let locals = self.parse_local_blocks()?;
        self.expect(Token::Let)?;
        let mut def = NodeDefinition { locals, equations: Vec::new() };
        let result = self.parse_equations(&mut def.equations);
        decl.body = NodeBody::Definition(def);
        result?;
        if self.eat(Token::Semi).is_none() {
            self.eat(Token::Dot);
        }
        Ok(())
    }

    fn parse_local_blocks(&mut self) -> PResult<Vec<Spanned<LocalBlock>>> {
        let mut blocks = Vec::new();
        loop {
            let start = self.peek_span().start;
            let block = match self.peek() {
                Some(Token::Var) => {
                    self.advance();
                    let mut vars = Vec::new();
                    loop {
                        vars.push(self.parse_var_decl()?);
                        self.expect(Token::Semi)?;
                        if !matches!(self.peek(), Some(Token::Ident | Token::LParen)) {
                            break;
                        }
                    }
                    LocalBlock::Vars(vars)
                }
                Some(Token::Const) => {
                    self.advance();
                    LocalBlock::Consts(self.parse_const_defs()?)
                }
                _ => break,
            };
            blocks.push(Spanned::new(block, self.span_from(start)));
        }
        Ok(blocks)
    }

    /// `( params ) returns ( params )`
    pub(super) fn parse_profile(&mut self) -> PResult<NodeProfile> {
        let inputs = self.parse_params()?;
        self.expect(Token::Returns)?;
        let outputs = self.parse_params()?;
        Ok(NodeProfile { inputs, outputs })
    }

    fn parse_params(&mut self) -> PResult<Vec<Spanned<VarDecl>>> {
        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        while !self.at(Token::RParen) {
            params.push(self.parse_var_decl()?);
            if self.eat(Token::Semi).is_none() {
                break;
            }
        }
        self.expect(Token::RParen)?;
        Ok(params)
    }

    fn parse_var_decl(&mut self) -> PResult<Spanned<VarDecl>> {
        let start = self.peek_span().start;
        if self.eat(Token::LParen).is_some() {
            let mut groups = vec![self.parse_typed_ids()?];
            while self.eat(Token::Semi).is_some() {
                if self.at(Token::RParen) {
                    break;
                }
                groups.push(self.parse_typed_ids()?);
            }
            self.expect(Token::RParen)?;
            self.expect(Token::When)?;
            let clock = self.parse_clock_expr()?;
            let decl = VarDecl { groups, clock: Some(clock), parenthesized: true };
            return Ok(Spanned::new(decl, self.span_from(start)));
        }
        let groups = vec![self.parse_typed_ids()?];
        let clock = if self.eat(Token::When).is_some() { Some(self.parse_clock_expr()?) } else { None };
        Ok(Spanned::new(VarDecl { groups, clock, parenthesized: false }, self.span_from(start)))
    }

    fn parse_typed_ids(&mut self) -> PResult<TypedIds> {
        let names = self.parse_ident_list()?;
        self.expect(Token::Colon)?;
        let ty = self.parse_type()?;
        Ok(TypedIds { names, ty })
    }

    fn parse_ident_list(&mut self) -> PResult<Vec<Ident>> {
        let mut names = vec![self.parse_ident()?];
        while self.eat(Token::Comma).is_some() {
            names.push(self.parse_ident()?);
        }
        Ok(names)
    }

    fn parse_extern_decl(&mut self) -> PResult<ExternNodeDecl> {
        let is_unsafe = self.eat(Token::Unsafe).is_some();
        self.expect(Token::Extern)?;
        let kind = self.parse_node_kind()?;
        let name = self.parse_ident()?;
        let profile = self.parse_profile()?;
        self.eat(Token::Semi);
        Ok(ExternNodeDecl { is_unsafe, kind, name, profile })
    }

    // ── Types and constants ──────────────────────────────────────────

    /// `bool | int | real | name | type ^ length`
    pub(super) fn parse_type(&mut self) -> PResult<Spanned<Type>> {
        let start = self.peek_span().start;
        let base = match self.peek() {
            Some(Token::Bool) => {
                self.advance();
                Type::Bool
            }
            Some(Token::Int) => {
                self.advance();
                Type::Int
            }
            Some(Token::Real) => {
                self.advance();
                Type::Real
            }
            Some(Token::Ident) => Type::Named(self.parse_ident_ref()?),
            _ => return Err(self.expected_what("a type")),
        };
        let mut ty = Spanned::new(base, self.span_from(start));
        while self.eat(Token::Caret).is_some() {
            let length = self.parse_table_length()?;
            let span = ty.span.to(length.span);
            ty = Spanned::new(Type::Table { element: Box::new(ty), length: Box::new(length) }, span);
        }
        Ok(ty)
    }

    /// Type blocks: `(name [= value] ;)+`. A broken entry is skipped up to its `;`.
    fn parse_type_defs(&mut self) -> PResult<Vec<Spanned<TypeDef>>> {
        let mut defs = Vec::new();
        loop {
            let start = self.pos;
            match self.parse_type_def() {
                Ok(def) => defs.push(def),
                Err(e) if start == self.pos && defs.is_empty() => return Err(e),
                Err(e) => {
                    self.report(e);
                    self.skip_entry(start);
                }
            }
            if self.halted || !self.block_continues(&[Token::Eq, Token::Semi, Token::Pragma]) {
                break;
            }
        }
        Ok(defs)
    }

    /// An identifier followed by a token that can open another entry of the same block.
    fn block_continues(&self, follow: &[Token]) -> bool {
        self.at(Token::Ident) && self.peek_at(1).is_some_and(|t| follow.contains(&t))
    }

    fn parse_type_def(&mut self) -> PResult<Spanned<TypeDef>> {
        let def = self.parse_one_type_def()?;
        self.expect(Token::Semi)?;
        Ok(def)
    }

    fn parse_one_type_def(&mut self) -> PResult<Spanned<TypeDef>> {
        let start = self.peek_span().start;
        let name = self.parse_ident()?;
        let value = if self.eat(Token::Eq).is_some() { Some(self.parse_type_def_value()?) } else { None };
        Ok(Spanned::new(TypeDef { name, value }, self.span_from(start)))
    }

    fn parse_type_def_value(&mut self) -> PResult<Spanned<TypeDefValue>> {
        let start = self.peek_span().start;
        let value = match self.peek() {
            Some(Token::Enum) => {
                self.advance();
                self.expect(Token::LBrace)?;
                let names = self.parse_ident_list()?;
                self.expect(Token::RBrace)?;
                TypeDefValue::Enum(names)
            }
            Some(Token::Struct) => {
                self.advance();
                TypeDefValue::Struct { keyword: true, fields: self.parse_struct_fields()? }
            }
            Some(Token::LBrace) => TypeDefValue::Struct { keyword: false, fields: self.parse_struct_fields()? },
            _ => TypeDefValue::Alias(self.parse_type()?.node),
        };
        Ok(Spanned::new(value, self.span_from(start)))
    }

    fn parse_struct_fields(&mut self) -> PResult<Vec<Spanned<FieldDecl>>> {
        self.expect(Token::LBrace)?;
        let mut fields = Vec::new();
        while !self.at(Token::RBrace) {
            let start = self.peek_span().start;
            let names = self.parse_ident_list()?;
            self.expect(Token::Colon)?;
            let ty = self.parse_type()?;
            let value = if self.at(Token::Eq) {
                if names.len() > 1 {
                    return Err(Diagnostic::syntax(
                        "a default value can only be given to a single field",
                        self.peek_span(),
                    )
                    .into());
                }
                self.advance();
                Some(self.parse_expr()?)
            } else {
                None
            };
            fields.push(Spanned::new(FieldDecl { names, ty, value }, self.span_from(start)));
            if self.eat(Token::Semi).is_none() {
                break;
            }
        }
        self.expect(Token::RBrace)?;
        Ok(fields)
    }

    /// Constant blocks: `(ids : type | id : type = e | id = e ;)+`.
    fn parse_const_defs(&mut self) -> PResult<Vec<Spanned<ConstDef>>> {
        let mut defs = Vec::new();
        loop {
            let start = self.pos;
            match self.parse_const_def() {
                Ok(def) => defs.push(def),
                Err(e) if start == self.pos && defs.is_empty() => return Err(e),
                Err(e) => {
                    self.report(e);
                    self.skip_entry(start);
                }
            }
            if self.halted || !self.block_continues(&[Token::Comma, Token::Colon, Token::Eq, Token::Pragma]) {
                break;
            }
        }
        Ok(defs)
    }

    fn parse_const_def(&mut self) -> PResult<Spanned<ConstDef>> {
        let start = self.peek_span().start;
        let name = self.parse_ident()?;
        let def = match self.peek() {
            Some(Token::Comma) => {
                let mut names = vec![name];
                while self.eat(Token::Comma).is_some() {
                    names.push(self.parse_ident()?);
                }
                self.expect(Token::Colon)?;
                ConstDef::Typed { names, ty: self.parse_type()? }
            }
            Some(Token::Colon) => {
                self.advance();
                let ty = self.parse_type()?;
                if self.eat(Token::Eq).is_some() {
                    ConstDef::TypedValued { name, ty, value: self.parse_expr()? }
                } else {
                    ConstDef::Typed { names: vec![name], ty }
                }
            }
            Some(Token::Eq) => {
                self.advance();
                ConstDef::Valued { name, value: self.parse_expr()? }
            }
            _ => return Err(self.unexpected(&[",".into(), ":".into(), "=".into()])),
        };
        let span = self.span_from(start);
        self.expect(Token::Semi)?;
        Ok(Spanned::new(def, span))
    }

    /// Skips a broken block entry up to and including its `;`.
    fn skip_entry(&mut self, start: usize) {
        if self.pos == start {
            self.advance();
        }
        let mut stop = DECL_START.to_vec();
        stop.extend([Token::Semi, Token::Var, Token::Let, Token::Tel]);
        self.synchronize(&stop);
        self.eat(Token::Semi);
    }

    // ── Packages and models ──────────────────────────────────────────

    pub(super) fn parse_package_decl(&mut self) -> PResult<PackageDecl> {
        self.expect(Token::Package)?;
        let name = self.parse_ident()?;
        let mut package = PackageDecl { name, body: PackageBody::Missing };

        let keyword = if self.eat(Token::Eq).is_some() {
            Some(AliasKeyword::Eq)
        } else if self.eat(Token::Is).is_some() {
            Some(AliasKeyword::Is)
        } else {
            None
        };

        match keyword {
            Some(keyword) => {
                let model = self.parse_ident()?;
                let (delimiter, args) = self.parse_package_args()?;
                self.expect(Token::Semi)?;
                package.body = PackageBody::Alias { keyword, model, delimiter, args };
                if self.at(Token::Body) {
                    self.report(
                        Diagnostic::structural(
                            format!("package `{}` is an instance and cannot also have a body", package.name.name),
                            self.peek_span(),
                        )
                        .into(),
                    );
                    self.synchronize(&[Token::End]);
                    self.eat(Token::End);
                }
            }
            None => {
                let uses = self.parse_uses()?;
                let provides = self.parse_provides_opt()?;
                let mut decls = Vec::new();
                let result = self.parse_package_body(&mut decls);
                package.body = PackageBody::Definition { uses, provides, decls };
                if let Err(e) = result {
                    self.report(e);
                }
            }
        }
        Ok(package)
    }

    fn parse_package_args(&mut self) -> PResult<(ArgDelimiter, Vec<Spanned<NamedStaticArg>>)> {
        let (delimiter, close) = if self.eat(Token::LParen).is_some() {
            (ArgDelimiter::Paren, Token::RParen)
        } else if self.eat(Token::LtLt).is_some() {
            (ArgDelimiter::Angle, Token::GtGt)
        } else {
            return Err(self.unexpected(&["(".into(), "<<".into()]));
        };
        let mut args = Vec::new();
        while !self.at(close) {
            args.push(self.parse_named_static_arg(close)?);
            if self.eat(Token::Comma).is_none() && self.eat(Token::Semi).is_none() {
                break;
            }
        }
        self.expect(close)?;
        Ok((delimiter, args))
    }

    pub(super) fn parse_model_decl(&mut self) -> PResult<ModelDecl> {
        self.expect(Token::Model)?;
        let name = self.parse_ident()?;
        let mut model = ModelDecl { name, uses: Vec::new(), needs: Vec::new(), provides: None, decls: Vec::new() };
        if let Err(e) = self.parse_model_tail(&mut model) {
            self.report(e);
            self.synchronize(DECL_START);
        }
        Ok(model)
    }

    fn parse_model_tail(&mut self, model: &mut ModelDecl) -> PResult<()> {
        model.uses = self.parse_uses()?;
        if self.eat(Token::Needs).is_some() {
            loop {
                model.needs.push(self.parse_static_param()?);
                self.expect(Token::Semi)?;
                if !matches!(
                    self.peek(),
                    Some(Token::Type | Token::Const | Token::Node | Token::Function | Token::Unsafe)
                ) {
                    break;
                }
            }
        } else {
            self.report(
                Diagnostic::structural(
                    format!("model `{}` is missing its `needs` clause", model.name.name),
                    model.name.span,
                )
                .into(),
            );
        }
        model.provides = self.parse_provides_opt()?;
        self.parse_package_body(&mut model.decls)
    }

    fn parse_uses(&mut self) -> PResult<Vec<Ident>> {
        if self.eat(Token::Uses).is_none() {
            return Ok(Vec::new());
        }
        let names = self.parse_ident_list()?;
        self.expect(Token::Semi)?;
        Ok(names)
    }

    fn parse_provides_opt(&mut self) -> PResult<Option<Vec<Spanned<Provide>>>> {
        if self.eat(Token::Provides).is_none() {
            return Ok(None);
        }
        let mut provides = Vec::new();
        loop {
            provides.push(self.parse_provide()?);
            self.expect(Token::Semi)?;
            if !matches!(
                self.peek(),
                Some(Token::Const | Token::Type | Token::Node | Token::Function | Token::Unsafe)
            ) {
                break;
            }
        }
        Ok(Some(provides))
    }

    fn parse_provide(&mut self) -> PResult<Spanned<Provide>> {
        let start = self.peek_span().start;
        let provide = match self.peek() {
            Some(Token::Const) => {
                self.advance();
                let name = self.parse_ident()?;
                self.expect(Token::Colon)?;
                let ty = self.parse_type()?;
                let value = if self.eat(Token::Eq).is_some() { Some(self.parse_expr()?) } else { None };
                Provide::Const { name, ty, value }
            }
            Some(Token::Type) => {
                self.advance();
                Provide::Type(self.parse_one_type_def()?.node)
            }
            Some(Token::Unsafe | Token::Node | Token::Function) => {
                let is_unsafe = self.eat(Token::Unsafe).is_some();
                let kind = self.parse_node_kind()?;
                let name = self.parse_ident()?;
                let static_params = if self.at(Token::LtLt) { Some(self.parse_static_params()?) } else { None };
                let profile = self.parse_profile()?;
                Provide::Node { is_unsafe, kind, name, static_params, profile }
            }
            _ => return Err(self.unexpected(&["const".into(), "type".into(), "node".into(), "function".into()])),
        };
        Ok(Spanned::new(provide, self.span_from(start)))
    }

    /// `body decl* end`. Declarations parsed before a failure stay in `out`.
    fn parse_package_body(&mut self, out: &mut Vec<Spanned<Declaration>>) -> PResult<()> {
        self.expect(Token::Body)?;
        let outer = std::mem::replace(&mut self.in_package, true);
        let result = self.parse_package_decls(out);
        self.in_package = outer;
        result
    }

    fn parse_package_decls(&mut self, out: &mut Vec<Spanned<Declaration>>) -> PResult<()> {
        loop {
            if self.halted {
                return Ok(());
            }
            let tok = match self.peek() {
                Some(Token::End) => {
                    self.advance();
                    return Ok(());
                }
                Some(tok) => tok,
                None => return Err(self.unexpected(&["end".into()])),
            };
            let start = self.pos;
            let start_offset = self.peek_span().start;
            let result = if is_decl_start(tok) {
                self.parse_declaration()
            } else if matches!(tok, Token::Package | Token::Model) {
                return Err(Diagnostic::syntax(
                    "packages and models cannot be nested; missing `end`?",
                    self.peek_span(),
                )
                .into());
            } else {
                Err(self.expected_what("a declaration or `end`"))
            };
            match result {
                Ok(decl) => out.push(decl),
                Err(e) => {
                    self.report(e);
                    self.recover_decl(start);
                    out.push(Spanned::new(Declaration::Error, self.span_from(start_offset)));
                }
            }
        }
    }

    // ── Static parameters and arguments ──────────────────────────────

    pub(super) fn parse_static_params(&mut self) -> PResult<Vec<Spanned<StaticParam>>> {
        self.expect(Token::LtLt)?;
        let mut params = Vec::new();
        while !self.at(Token::GtGt) {
            params.push(self.parse_static_param()?);
            if self.eat(Token::Semi).is_none() {
                break;
            }
        }
        self.expect(Token::GtGt)?;
        Ok(params)
    }

    fn parse_static_param(&mut self) -> PResult<Spanned<StaticParam>> {
        let start = self.peek_span().start;
        let param = match self.peek() {
            Some(Token::Type) => {
                self.advance();
                StaticParam::Type(self.parse_ident()?)
            }
            Some(Token::Const) => {
                self.advance();
                let name = self.parse_ident()?;
                self.expect(Token::Colon)?;
                StaticParam::Const { name, ty: self.parse_type()? }
            }
            Some(Token::Unsafe | Token::Node | Token::Function) => {
                let is_unsafe = self.eat(Token::Unsafe).is_some();
                let kind = self.parse_node_kind()?;
                let name = self.parse_ident()?;
                let profile = self.parse_profile()?;
                StaticParam::Node { is_unsafe, kind, name, profile }
            }
            _ => return Err(self.unexpected(&["type".into(), "const".into(), "node".into(), "function".into()])),
        };
        Ok(Spanned::new(param, self.span_from(start)))
    }

    /// `name [<<args>>]`
    pub(super) fn parse_effective_node(&mut self) -> PResult<Spanned<EffectiveNode>> {
        let start = self.peek_span().start;
        let name = self.parse_ident_ref()?;
        let static_args = if self.at(Token::LtLt) { Some(self.parse_static_args()?) } else { None };
        Ok(Spanned::new(EffectiveNode { name, static_args }, self.span_from(start)))
    }

    pub(super) fn parse_static_args(&mut self) -> PResult<Vec<Spanned<StaticArg>>> {
        self.nested(Self::parse_static_arg_list)
    }

    fn parse_static_arg_list(&mut self) -> PResult<Vec<Spanned<StaticArg>>> {
        self.expect(Token::LtLt)?;
        let mut args = Vec::new();
        while !self.at(Token::GtGt) {
            args.push(self.parse_static_arg(Token::GtGt)?);
            if self.eat(Token::Comma).is_none() && self.eat(Token::Semi).is_none() {
                break;
            }
        }
        self.expect(Token::GtGt)?;
        Ok(args)
    }

    /// True when the token `offset` ahead ends a static argument.
    fn ends_static_arg(&self, offset: usize, close: Token) -> bool {
        match self.peek_at(offset) {
            Some(tok) => tok == Token::Comma || tok == Token::Semi || tok == close,
            None => false,
        }
    }

    fn parse_static_arg(&mut self, close: Token) -> PResult<Spanned<StaticArg>> {
        let start = self.peek_span().start;
        if let Some(op) = self.peek().and_then(predef_op).filter(|_| self.ends_static_arg(1, close)) {
            self.advance();
            return Ok(Spanned::new(StaticArg::Op(op), self.span_from(start)));
        }
        let arg = match self.peek() {
            Some(Token::Type) => {
                self.advance();
                StaticArg::Type { ty: self.parse_type()?, explicit: true }
            }
            Some(Token::Const) => {
                self.advance();
                StaticArg::Const { value: self.parse_expr()?, explicit: true }
            }
            Some(tok @ (Token::Node | Token::Function)) => {
                self.advance();
                let keyword = if tok == Token::Node { NodeKind::Node } else { NodeKind::Function };
                StaticArg::Node { node: self.parse_effective_node()?, keyword: Some(keyword) }
            }
            Some(Token::Bool | Token::Int | Token::Real)
                if self.ends_static_arg(1, close) || self.peek_at(1) == Some(Token::Caret) =>
            {
                StaticArg::Type { ty: self.parse_type()?, explicit: false }
            }
            Some(Token::Ident) => self.parse_ident_static_arg(close)?,
            _ => StaticArg::Const { value: self.parse_expr()?, explicit: false },
        };
        Ok(Spanned::new(arg, self.span_from(start)))
    }

    /// Static argument starting with a name: identifier, node instance, or constant expression.
    fn parse_ident_static_arg(&mut self, close: Token) -> PResult<StaticArg> {
        let len = self.ident_ref_len();
        if self.ends_static_arg(len, close) {
            return Ok(StaticArg::Ident(self.parse_ident_ref()?));
        }
        if self.peek_at(len) == Some(Token::LtLt) {
            let cp = self.checkpoint();
            let node = self.parse_effective_node()?;
            if !self.at(Token::LParen) {
                return Ok(StaticArg::Node { node, keyword: None });
            }
            // `f<<..>>(x)` is a call: reparse as an expression.
            self.restore(cp);
        }
        let value = self.parse_expr()?;
        if let Expr::Ident(name) = &value.node {
            if self.ends_static_arg(0, close) {
                return Err(Diagnostic::ambiguity(
                    format!("static argument `{name}` was classified as an expression"),
                    value.span,
                )
                .into());
            }
        }
        Ok(StaticArg::Const { value, explicit: false })
    }

    /// An argument name at `offset`: an identifier followed by `=` or its pragmas.
    fn names_arg_at(&self, offset: usize) -> bool {
        self.peek_at(offset) == Some(Token::Ident) && matches!(self.peek_at(offset + 1), Some(Token::Eq | Token::Pragma))
    }

    /// `name = arg`, one of `type name = T`, `const name = e`, `node name = n`, or a
    /// positional static argument.
    fn parse_named_static_arg(&mut self, close: Token) -> PResult<Spanned<NamedStaticArg>> {
        let start = self.peek_span().start;
        let named = match self.peek() {
            Some(Token::Type | Token::Const | Token::Node | Token::Function) if !self.names_arg_at(1) => {
                NamedStaticArg { name: None, arg: self.parse_static_arg(close)? }
            }
            Some(Token::Ident) if self.names_arg_at(0) => {
                let name = Some(self.parse_ident()?);
                self.expect(Token::Eq)?;
                NamedStaticArg { name, arg: self.parse_static_arg(close)? }
            }
            Some(Token::Type) => {
                self.advance();
                let name = self.parse_ident()?;
                self.expect(Token::Eq)?;
                let arg_start = self.peek_span().start;
                let ty = self.parse_type()?;
                let arg = Spanned::new(StaticArg::Type { ty, explicit: true }, self.span_from(arg_start));
                NamedStaticArg { name: Some(name), arg }
            }
            Some(Token::Const) => {
                self.advance();
                let name = self.parse_ident()?;
                self.expect(Token::Eq)?;
                let arg_start = self.peek_span().start;
                let value = self.parse_expr()?;
                let arg = Spanned::new(StaticArg::Const { value, explicit: true }, self.span_from(arg_start));
                NamedStaticArg { name: Some(name), arg }
            }
            Some(tok @ (Token::Node | Token::Function)) => {
                self.advance();
                let keyword = if tok == Token::Node { NodeKind::Node } else { NodeKind::Function };
                let name = self.parse_ident()?;
                self.expect(Token::Eq)?;
                let arg_start = self.peek_span().start;
                let node = self.parse_effective_node()?;
                let arg = Spanned::new(StaticArg::Node { node, keyword: Some(keyword) }, self.span_from(arg_start));
                NamedStaticArg { name: Some(name), arg }
            }
            _ => NamedStaticArg { name: None, arg: self.parse_static_arg(close)? },
        };
        Ok(Spanned::new(named, self.span_from(start)))
    }
}

/// Predefined operators that can be passed as static arguments.
fn predef_op(tok: Token) -> Option<PredefOp> {
    let op = match tok {
        Token::Not => PredefOp::Not,
        Token::Fby => PredefOp::Fby,
        Token::Pre => PredefOp::Pre,
        Token::Current => PredefOp::Current,
        Token::Arrow => PredefOp::Arrow,
        Token::And => PredefOp::And,
        Token::Or => PredefOp::Or,
        Token::Xor => PredefOp::Xor,
        Token::FatArrow => PredefOp::Implies,
        Token::Eq => PredefOp::Eq,
        Token::Neq => PredefOp::Neq,
        Token::Lt => PredefOp::Lt,
        Token::LtEq => PredefOp::Le,
        Token::Gt => PredefOp::Gt,
        Token::GtEq => PredefOp::Ge,
        Token::Div => PredefOp::Div,
        Token::Mod => PredefOp::Mod,
        Token::Minus => PredefOp::Minus,
        Token::Plus => PredefOp::Plus,
        Token::Slash => PredefOp::Slash,
        Token::Star => PredefOp::Star,
        Token::If => PredefOp::If,
        _ => return None,
    };
    Some(op)
}
