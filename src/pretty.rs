use crate::parser::ast::*;
use crate::parser::precedence::{Assoc, Prec, binop_prec, unary_prec};
use crate::span::Spanned;

/// Level of names, literals and postfix forms: never parenthesised.
const ATOM: u8 = 20;

/// Pretty-print a `SourceFile` back into Lustre source text.
pub fn pretty_print(file: &SourceFile) -> String {
    let mut pp = PrettyPrinter::new();
    pp.emit_source_file(file);
    pp.buf
}

/// Print one expression, adding parentheses only where the grammar needs them.
pub fn print_expr(expr: &Expr) -> String {
    let mut pp = PrettyPrinter::new();
    pp.emit_expr(expr, 0);
    pp.buf
}

/// Dump an expression with every operator application wrapped in parentheses.
pub fn parenthesize(expr: &Expr) -> String {
    let mut pp = PrettyPrinter::new();
    pp.full_parens = true;
    pp.emit_expr(expr, 0);
    pp.buf
}

struct PrettyPrinter {
    buf: String,
    indent: usize,
    full_parens: bool,
}

impl PrettyPrinter {
    fn new() -> Self {
        Self { buf: String::new(), indent: 0, full_parens: false }
    }

    fn write(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn newline(&mut self) {
        self.buf.push('\n');
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.buf.push_str("    ");
        }
    }

    fn indent(&mut self) {
        self.indent += 1;
    }

    fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    fn comma_sep<T>(&mut self, items: &[T], mut f: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            f(self, item);
        }
    }

    // ── Source file ──────────────────────────────────────────────────

    fn emit_source_file(&mut self, file: &SourceFile) {
        for include in &file.includes {
            self.write("include \"");
            self.write(&include.node.path);
            self.write("\"");
            self.newline();
        }
        let mut has_output = !file.includes.is_empty();
        for item in &file.items {
            if matches!(item.node, Item::Error) {
                continue;
            }
            if has_output {
                self.newline();
            }
            has_output = true;
            match &item.node {
                Item::Decl(decl) => self.emit_declaration(&decl.node),
                Item::Package(pkg) => self.emit_package(pkg),
                Item::Model(model) => self.emit_model(model),
                Item::Error => {}
            }
        }
    }

    fn emit_declarations(&mut self, decls: &[Spanned<Declaration>]) {
        for (i, decl) in decls.iter().enumerate() {
            if matches!(decl.node, Declaration::Error) {
                continue;
            }
            if i > 0 {
                self.newline();
            }
            self.emit_declaration(&decl.node);
        }
    }

    fn emit_declaration(&mut self, decl: &Declaration) {
        match decl {
            Declaration::Node(node) => self.emit_node(node),
            Declaration::Type(defs) => {
                self.emit_block("type", defs, |pp, def| {
                    pp.emit_type_def(&def.node);
                    pp.write(";");
                });
            }
            Declaration::Const(defs) => {
                self.emit_block("const", defs, |pp, def| {
                    pp.emit_const_def(&def.node);
                    pp.write(";");
                });
            }
            Declaration::Extern(ext) => {
                self.write_indent();
                if ext.is_unsafe {
                    self.write("unsafe ");
                }
                self.write("extern ");
                self.emit_node_kind(ext.kind);
                self.write(" ");
                self.emit_ident(&ext.name);
                self.emit_profile(&ext.profile);
                self.write(";");
                self.newline();
            }
            Declaration::Error => {}
        }
    }

    /// `keyword item;` on one line, or `keyword` followed by one indented item per line.
    fn emit_block<T>(&mut self, keyword: &str, items: &[T], mut f: impl FnMut(&mut Self, &T)) {
        self.write_indent();
        self.write(keyword);
        if let [only] = items {
            self.write(" ");
            f(self, only);
            self.newline();
            return;
        }
        self.newline();
        self.indent();
        for item in items {
            self.write_indent();
            f(self, item);
            self.newline();
        }
        self.dedent();
    }

    fn emit_node_kind(&mut self, kind: NodeKind) {
        self.write(match kind {
            NodeKind::Node => "node",
            NodeKind::Function => "function",
        });
    }

    fn emit_ident(&mut self, ident: &Ident) {
        self.write(&ident.name);
        for pragma in &ident.pragmas {
            self.write(" %");
            self.write(&pragma.key);
            self.write(":");
            self.write(&pragma.value);
            self.write("%");
        }
    }

    fn emit_ident_ref(&mut self, r: &IdentRef) {
        self.write(&r.to_string());
    }

    // ── Nodes ────────────────────────────────────────────────────────

    fn emit_node(&mut self, node: &NodeDecl) {
        self.write_indent();
        if node.is_unsafe {
            self.write("unsafe ");
        }
        self.emit_node_kind(node.kind);
        self.write(" ");
        self.emit_ident(&node.name);
        if let Some(params) = &node.static_params {
            self.emit_static_params(params);
        }
        if let Some(profile) = &node.profile {
            self.emit_profile(profile);
        }
        match &node.body {
            NodeBody::Alias(target) => {
                self.write(" = ");
                self.emit_effective_node(&target.node);
                self.write(";");
                self.newline();
            }
            NodeBody::Definition(def) => {
                self.write(";");
                self.newline();
                self.emit_node_definition(def);
            }
            NodeBody::Missing => {
                self.write(";");
                self.newline();
            }
        }
    }

    fn emit_node_definition(&mut self, def: &NodeDefinition) {
        for block in &def.locals {
            match &block.node {
                LocalBlock::Vars(vars) => {
                    self.write_indent();
                    self.write("var");
                    self.newline();
                    self.indent();
                    for var in vars {
                        self.write_indent();
                        self.emit_var_decl(&var.node);
                        self.write(";");
                        self.newline();
                    }
                    self.dedent();
                }
                LocalBlock::Consts(defs) => {
                    self.write_indent();
                    self.write("const");
                    self.newline();
                    self.indent();
                    for def in defs {
                        self.write_indent();
                        self.emit_const_def(&def.node);
                        self.write(";");
                        self.newline();
                    }
                    self.dedent();
                }
            }
        }
        self.write_indent();
        self.write("let");
        self.newline();
        self.indent();
        for eq in &def.equations {
            if matches!(eq.node, Equation::Error) {
                continue;
            }
            self.write_indent();
            self.emit_equation(&eq.node);
            self.newline();
        }
        self.dedent();
        self.write_indent();
        self.write("tel");
        self.newline();
    }

    fn emit_profile(&mut self, profile: &NodeProfile) {
        self.emit_params(&profile.inputs);
        self.write(" returns ");
        self.emit_params(&profile.outputs);
    }

    fn emit_params(&mut self, params: &[Spanned<VarDecl>]) {
        self.write("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write("; ");
            }
            self.emit_var_decl(&param.node);
        }
        self.write(")");
    }

    fn emit_var_decl(&mut self, decl: &VarDecl) {
        if decl.parenthesized {
            self.write("(");
        }
        for (i, group) in decl.groups.iter().enumerate() {
            if i > 0 {
                self.write("; ");
            }
            self.emit_typed_ids(group);
        }
        if decl.parenthesized {
            self.write(")");
        }
        if let Some(clock) = &decl.clock {
            self.write(" when ");
            self.emit_clock(&clock.node);
        }
    }

    fn emit_typed_ids(&mut self, ids: &TypedIds) {
        self.comma_sep(&ids.names, |pp, name| pp.emit_ident(name));
        self.write(": ");
        self.emit_type(&ids.ty.node);
    }

    fn emit_equation(&mut self, eq: &Equation) {
        match eq {
            Equation::Assert(e) => {
                self.write("assert ");
                self.emit_expr(&e.node, 0);
            }
            Equation::Define { lhs, rhs } => {
                if lhs.parenthesized {
                    self.write("(");
                }
                self.comma_sep(&lhs.items, |pp, item| pp.emit_left(&item.node));
                if lhs.parenthesized {
                    self.write(")");
                }
                self.write(" = ");
                self.emit_expr(&rhs.node, 0);
            }
            Equation::Error => {}
        }
        self.write(";");
    }

    fn emit_left(&mut self, left: &LeftExpr) {
        match left {
            LeftExpr::Ident(name) => self.emit_ident(name),
            LeftExpr::Field { value, field } => {
                self.emit_left(&value.node);
                self.write(".");
                self.emit_ident(field);
            }
            LeftExpr::Index { value, index } => {
                self.emit_left(&value.node);
                self.emit_index(index);
            }
        }
    }

    // ── Types and constants ──────────────────────────────────────────

    fn emit_type(&mut self, ty: &Type) {
        match ty {
            Type::Bool => self.write("bool"),
            Type::Int => self.write("int"),
            Type::Real => self.write("real"),
            Type::Named(name) => self.emit_ident_ref(name),
            Type::Table { element, length } => {
                self.emit_type(&element.node);
                self.write("^");
                self.emit_expr(&length.node, Prec::Hat.level() + 1);
            }
        }
    }

    fn emit_type_def(&mut self, def: &TypeDef) {
        self.emit_ident(&def.name);
        let Some(value) = &def.value else { return };
        self.write(" = ");
        match &value.node {
            TypeDefValue::Alias(ty) => self.emit_type(ty),
            TypeDefValue::Enum(names) => {
                self.write("enum { ");
                self.comma_sep(names, |pp, name| pp.emit_ident(name));
                self.write(" }");
            }
            TypeDefValue::Struct { keyword, fields } => {
                if *keyword {
                    self.write("struct ");
                }
                self.write("{ ");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        self.write("; ");
                    }
                    self.comma_sep(&field.node.names, |pp, name| pp.emit_ident(name));
                    self.write(": ");
                    self.emit_type(&field.node.ty.node);
                    if let Some(value) = &field.node.value {
                        self.write(" = ");
                        self.emit_expr(&value.node, 0);
                    }
                }
                self.write(" }");
            }
        }
    }

    fn emit_const_def(&mut self, def: &ConstDef) {
        match def {
            ConstDef::Typed { names, ty } => {
                self.comma_sep(names, |pp, name| pp.emit_ident(name));
                self.write(": ");
                self.emit_type(&ty.node);
            }
            ConstDef::TypedValued { name, ty, value } => {
                self.emit_ident(name);
                self.write(": ");
                self.emit_type(&ty.node);
                self.write(" = ");
                self.emit_expr(&value.node, 0);
            }
            ConstDef::Valued { name, value } => {
                self.emit_ident(name);
                self.write(" = ");
                self.emit_expr(&value.node, 0);
            }
        }
    }

    // ── Packages and models ──────────────────────────────────────────

    fn emit_package(&mut self, pkg: &PackageDecl) {
        self.write("package ");
        self.emit_ident(&pkg.name);
        match &pkg.body {
            PackageBody::Alias { keyword, model, delimiter, args } => {
                self.write(match keyword {
                    AliasKeyword::Eq => " = ",
                    AliasKeyword::Is => " is ",
                });
                self.emit_ident(model);
                let (open, close) = match delimiter {
                    ArgDelimiter::Paren => ("(", ")"),
                    ArgDelimiter::Angle => ("<<", ">>"),
                };
                let last_op = matches!(args.last().map(|a| &a.node.arg.node), Some(StaticArg::Op(_)));
                self.write(open);
                self.comma_sep(args, |pp, arg| pp.emit_named_arg(&arg.node));
                if last_op && *delimiter == ArgDelimiter::Angle {
                    self.write(" ");
                }
                self.write(close);
                self.write(";");
                self.newline();
            }
            PackageBody::Definition { uses, provides, decls } => {
                self.newline();
                self.emit_uses(uses);
                if let Some(provides) = provides {
                    self.emit_provides(provides);
                }
                self.write("body");
                self.newline();
                self.emit_declarations(decls);
                self.write("end");
                self.newline();
            }
            PackageBody::Missing => {
                self.newline();
                self.write("body");
                self.newline();
                self.write("end");
                self.newline();
            }
        }
    }

    fn emit_model(&mut self, model: &ModelDecl) {
        self.write("model ");
        self.emit_ident(&model.name);
        self.newline();
        self.emit_uses(&model.uses);
        if !model.needs.is_empty() {
            self.write("needs");
            self.newline();
            self.indent();
            for param in &model.needs {
                self.write_indent();
                self.emit_static_param(&param.node);
                self.write(";");
                self.newline();
            }
            self.dedent();
        }
        if let Some(provides) = &model.provides {
            self.emit_provides(provides);
        }
        self.write("body");
        self.newline();
        self.emit_declarations(&model.decls);
        self.write("end");
        self.newline();
    }

    fn emit_uses(&mut self, uses: &[Ident]) {
        if uses.is_empty() {
            return;
        }
        self.write("uses ");
        self.comma_sep(uses, |pp, name| pp.emit_ident(name));
        self.write(";");
        self.newline();
    }

    fn emit_provides(&mut self, provides: &[Spanned<Provide>]) {
        self.write("provides");
        self.newline();
        self.indent();
        for provide in provides {
            self.write_indent();
            match &provide.node {
                Provide::Const { name, ty, value } => {
                    self.write("const ");
                    self.emit_ident(name);
                    self.write(": ");
                    self.emit_type(&ty.node);
                    if let Some(value) = value {
                        self.write(" = ");
                        self.emit_expr(&value.node, 0);
                    }
                }
                Provide::Type(def) => {
                    self.write("type ");
                    self.emit_type_def(def);
                }
                Provide::Node { is_unsafe, kind, name, static_params, profile } => {
                    if *is_unsafe {
                        self.write("unsafe ");
                    }
                    self.emit_node_kind(*kind);
                    self.write(" ");
                    self.emit_ident(name);
                    if let Some(params) = static_params {
                        self.emit_static_params(params);
                    }
                    self.emit_profile(profile);
                }
            }
            self.write(";");
            self.newline();
        }
        self.dedent();
    }

    // ── Static parameters and arguments ──────────────────────────────

    fn emit_static_params(&mut self, params: &[Spanned<StaticParam>]) {
        self.write("<<");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write("; ");
            }
            self.emit_static_param(&param.node);
        }
        self.write(">>");
    }

    fn emit_static_param(&mut self, param: &StaticParam) {
        match param {
            StaticParam::Type(name) => {
                self.write("type ");
                self.emit_ident(name);
            }
            StaticParam::Const { name, ty } => {
                self.write("const ");
                self.emit_ident(name);
                self.write(": ");
                self.emit_type(&ty.node);
            }
            StaticParam::Node { is_unsafe, kind, name, profile } => {
                if *is_unsafe {
                    self.write("unsafe ");
                }
                self.emit_node_kind(*kind);
                self.write(" ");
                self.emit_ident(name);
                self.emit_profile(profile);
            }
        }
    }

    fn emit_effective_node(&mut self, node: &EffectiveNode) {
        self.emit_ident_ref(&node.name);
        if let Some(args) = &node.static_args {
            self.emit_static_args(args);
        }
    }

    fn emit_static_args(&mut self, args: &[Spanned<StaticArg>]) {
        // A trailing operator gets a blank so `<<->>` cannot lex as `->` `>`.
        let last_op = matches!(args.last().map(|a| &a.node), Some(StaticArg::Op(_)));
        self.write("<<");
        self.comma_sep(args, |pp, arg| pp.emit_static_arg(&arg.node));
        self.write(if last_op { " >>" } else { ">>" });
    }

    fn emit_static_arg(&mut self, arg: &StaticArg) {
        match arg {
            StaticArg::Ident(name) => self.emit_ident_ref(name),
            StaticArg::Type { ty, explicit } => {
                if *explicit {
                    self.write("type ");
                }
                self.emit_type(&ty.node);
            }
            StaticArg::Const { value, explicit } => {
                if *explicit {
                    self.write("const ");
                }
                self.emit_expr(&value.node, 0);
            }
            StaticArg::Node { node, keyword } => {
                if let Some(kind) = keyword {
                    self.emit_node_kind(*kind);
                    self.write(" ");
                }
                self.emit_effective_node(&node.node);
            }
            StaticArg::Op(op) => self.write(op.as_str()),
        }
    }

    fn emit_named_arg(&mut self, arg: &NamedStaticArg) {
        let Some(name) = &arg.name else {
            self.emit_static_arg(&arg.arg.node);
            return;
        };
        match &arg.arg.node {
            StaticArg::Type { ty, explicit: true } => {
                self.write("type ");
                self.emit_ident(name);
                self.write(" = ");
                self.emit_type(&ty.node);
            }
            StaticArg::Const { value, explicit: true } => {
                self.write("const ");
                self.emit_ident(name);
                self.write(" = ");
                self.emit_expr(&value.node, 0);
            }
            StaticArg::Node { node, keyword: Some(kind) } => {
                self.emit_node_kind(*kind);
                self.write(" ");
                self.emit_ident(name);
                self.write(" = ");
                self.emit_effective_node(&node.node);
            }
            other => {
                self.emit_ident(name);
                self.write(" = ");
                self.emit_static_arg(other);
            }
        }
    }

    // ── Expressions ──────────────────────────────────────────────────

    fn emit_expr(&mut self, expr: &Expr, parent_prec: u8) {
        let prec = expr_prec(expr);
        let parens = prec < ATOM && (self.full_parens || prec < parent_prec);
        if parens {
            self.write("(");
        }
        match expr {
            Expr::Literal(lit) => match lit {
                Literal::Bool(b) => self.write(if *b { "true" } else { "false" }),
                Literal::Int(s) | Literal::Real(s) => self.write(s),
            },
            Expr::Ident(name) => self.emit_ident_ref(name),
            Expr::Instance(node) => self.emit_effective_node(node),
            Expr::Tuple(items) => {
                self.write("(");
                self.comma_sep(items, |pp, e| pp.emit_expr(&e.node, 0));
                self.write(")");
            }
            Expr::Array(items) => {
                self.write("[");
                self.comma_sep(items, |pp, e| pp.emit_expr(&e.node, 0));
                self.write("]");
            }
            Expr::Struct { name, base, fields } => {
                self.emit_ident_ref(name);
                self.write(" {");
                if let Some(base) = base {
                    self.write(" ");
                    self.emit_ident_ref(base);
                    self.write(" with");
                }
                for (i, field) in fields.iter().enumerate() {
                    self.write(if i > 0 { "; " } else { " " });
                    self.emit_ident(&field.node.field);
                    self.write(" = ");
                    self.emit_expr(&field.node.value.node, 0);
                }
                self.write(" }");
            }
            Expr::Field { value, field } => {
                self.emit_expr(&value.node, ATOM);
                self.write(".");
                self.emit_ident(field);
            }
            Expr::Index { value, index } => {
                self.emit_expr(&value.node, ATOM);
                self.emit_index(index);
            }
            Expr::Call { callee, args } => {
                self.emit_expr(&callee.node, ATOM);
                self.write("(");
                self.comma_sep(args, |pp, e| pp.emit_expr(&e.node, 0));
                self.write(")");
            }
            Expr::If { keyword, condition, then_branch, else_branch } => {
                self.write(match keyword {
                    CondKeyword::If => "if ",
                    CondKeyword::When => "when ",
                });
                self.emit_expr(&condition.node, 0);
                self.write(" then ");
                self.emit_expr(&then_branch.node, 0);
                self.write(" else ");
                self.emit_expr(&else_branch.node, 0);
            }
            Expr::Merge { clock, arms } => {
                self.write("merge ");
                self.emit_ident(clock);
                for arm in arms {
                    self.write(" (");
                    match &arm.node.pattern {
                        MergePattern::Ident(name) => self.emit_ident_ref(name),
                        MergePattern::Bool(b) => self.write(if *b { "true" } else { "false" }),
                    }
                    self.write(" -> ");
                    self.emit_expr(&arm.node.value.node, 0);
                    self.write(")");
                }
            }
            Expr::When { value, clock } => {
                self.emit_expr(&value.node, Prec::When.level());
                self.write(" when ");
                self.emit_clock(&clock.node);
            }
            Expr::Unary { op, operand } => {
                self.write(op.as_str());
                let nested_neg = matches!(operand.node, Expr::Unary { op: UnaryOp::Neg, .. });
                if *op != UnaryOp::Neg || nested_neg {
                    self.write(" ");
                }
                self.emit_expr(&operand.node, prec + 1);
            }
            Expr::Binary { op, lhs, rhs } => {
                let (_, assoc) = binop_prec(*op);
                let (lhs_min, rhs_min) = match assoc {
                    Assoc::Right => (prec + 1, prec),
                    Assoc::Left | Assoc::None => (prec, prec + 1),
                };
                self.emit_expr(&lhs.node, lhs_min);
                self.write(" ");
                self.write(op.as_str());
                self.write(" ");
                self.emit_expr(&rhs.node, rhs_min);
            }
            Expr::Nary { op, operands } => {
                self.write(op.as_str());
                self.write("(");
                self.comma_sep(operands, |pp, e| pp.emit_expr(&e.node, 0));
                self.write(")");
            }
            Expr::Comparison { op, lhs, rhs } => {
                self.emit_expr(&lhs.node, prec + 1);
                self.write(" ");
                self.write(op.as_str());
                self.write(" ");
                self.emit_expr(&rhs.node, prec + 1);
            }
            Expr::Error => self.write("(* error *)"),
        }
        if parens {
            self.write(")");
        }
    }

    fn emit_index(&mut self, index: &Index) {
        self.write("[");
        match index {
            Index::Single(e) => self.emit_expr(&e.node, 0),
            Index::Select(sel) => {
                self.emit_expr(&sel.from.node, 0);
                self.write(" .. ");
                self.emit_expr(&sel.to.node, 0);
                if let Some(step) = &sel.step {
                    self.write(" step ");
                    self.emit_expr(&step.node, 0);
                }
            }
        }
        self.write("]");
    }

    fn emit_clock(&mut self, clock: &ClockExpr) {
        match clock {
            ClockExpr::On(name) => self.emit_ident(name),
            ClockExpr::Not { clock, parenthesized } => {
                self.write("not ");
                if *parenthesized {
                    self.write("(");
                    self.emit_ident(clock);
                    self.write(")");
                } else {
                    self.emit_ident(clock);
                }
            }
            ClockExpr::Enum { constructor, clock } => {
                self.emit_ident_ref(constructor);
                self.write("(");
                self.emit_ident(clock);
                self.write(")");
            }
        }
    }
}

fn expr_prec(expr: &Expr) -> u8 {
    match expr {
        Expr::If { .. } => Prec::Else.level(),
        Expr::Binary { op, .. } => binop_prec(*op).0.level(),
        Expr::Comparison { .. } => Prec::Eq.level(),
        Expr::Unary { op, .. } => unary_prec(*op).level(),
        Expr::When { .. } => Prec::When.level(),
        _ => ATOM,
    }
}
