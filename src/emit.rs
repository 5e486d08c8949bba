//! C code generation.
//!
//! Expressions lower bottom-up into [`Emit`] pairs — a C fragment plus the
//! fragment's static type — and statements/definitions into plain fragments.
//! The pass is deliberately permissive: a shape it cannot place becomes an
//! empty or as-is fragment and the resulting C is allowed to fail in the C
//! compiler instead. Only the parser rejects programs.
//!
//! Type-driven choices made here:
//! - `+` chains fold left to right; any `char*` operand selects the
//!   `asprintf` statement-expression form, otherwise plain `(a + b)`.
//! - `==` between two `char*` operands becomes `strcmp(…) == 0`.
//! - `recv.m(args)` mangles to `Class_m(recv, args…)` when the receiver's
//!   type is a collected class; otherwise it degrades to `m(recv, args…)`.
//! - String literals with `{…}` interpolation become `asprintf` statement
//!   expressions; the allocation is never freed (accepted trade-off).

use crate::ast::{
    ClassDef, Expr, FuncDef, Import, ImportPath, Item, Mode, Program, Stmt, StmtKind,
};
use crate::collect::ClassTable;
use crate::scope::ScopeStack;
use crate::types::{CType, builtin_return_type, returns_int};

// ── Runtime prelude ──────────────────────────────────────────────────────────

/// Fixed header prepended to every emission: libc + libcurl includes and the
/// runtime value structs with their Array helpers.
const PRELUDE: &str = r#"#define _GNU_SOURCE
#include <stdio.h>
#include <stdlib.h>
#include <string.h>
#include <stdbool.h>
#include <unistd.h>
#include <curl/curl.h>
typedef struct { char** data; int len; } Array;
bool array_contains(Array a, char* s) { for (int i = 0; i < a.len; i++) if (strcmp(a.data[i], s) == 0) return true; return false; }
Array array_slice(Array a, int start) { return (Array){a.data + start, a.len - start}; }
char* array_last(Array a) { return a.data[a.len - 1]; }
typedef struct { int status; char* body; } Response;
typedef struct { Array items; } Json;
typedef struct { struct { Array c; Array virus; } dependencies; } Hcl;
"#;

/// Added to the prelude under the `--- manual ---` directive.
const DEFER_MACRO: &str = "#define defer(stmt) for (int _i = 1; _i--; (stmt))\n";

/// Adapts argv into the runtime Array when the source defines `main`.
const MAIN_WRAPPER: &str =
    "\nint main(int argc, char** argv) { Array args = {argv + 1, argc - 1}; return hs_main(args); }\n";

// ── Emission result ──────────────────────────────────────────────────────────

/// One emitted expression: the C fragment and its static type.
#[derive(Debug, Clone)]
pub struct Emit<'src> {
    pub code: String,
    pub ty: CType<'src>,
}

impl<'src> Emit<'src> {
    fn new(code: impl Into<String>, ty: CType<'src>) -> Self {
        Emit {
            code: code.into(),
            ty,
        }
    }
}

// ── Public entry point ───────────────────────────────────────────────────────

/// Lower a parsed program to a complete C translation unit.
pub fn emit_program<'src>(program: &Program<'src>, classes: &ClassTable<'src>) -> String {
    Emitter::new(classes).program(program)
}

// ── Emitter ──────────────────────────────────────────────────────────────────

pub struct Emitter<'a, 'src> {
    classes: &'a ClassTable<'src>,
    scopes: ScopeStack<'src>,
    current_class: Option<&'src str>,
    has_main: bool,
}

impl<'a, 'src> Emitter<'a, 'src> {
    pub fn new(classes: &'a ClassTable<'src>) -> Self {
        Emitter {
            classes,
            scopes: ScopeStack::new(),
            current_class: None,
            has_main: false,
        }
    }

    // ── Program ───────────────────────────────────────────────────────────────

    pub fn program(&mut self, program: &Program<'src>) -> String {
        let imports: String = program.imports.iter().map(import_line).collect();
        let defs: String = program
            .items
            .iter()
            .map(|item| match item {
                Item::Class(class) => self.class_def(class),
                Item::Func(func) => self.func_def(func),
            })
            .collect();

        let mut out = String::from(PRELUDE);
        if program.mode == Some(Mode::Manual) {
            out.push_str(DEFER_MACRO);
        }
        out.push_str(&imports);
        out.push_str(&defs);
        if self.has_main {
            out.push_str(MAIN_WRAPPER);
        }
        out
    }

    // ── Definitions ───────────────────────────────────────────────────────────

    fn class_def(&mut self, class: &ClassDef<'src>) -> String {
        let prev = self.current_class.replace(class.name);
        let funcs: String = class.funcs.iter().map(|f| self.func_def(f)).collect();
        self.current_class = prev;

        let mut fields = String::new();
        for (name, ty) in self.classes.fields_of(class.name) {
            fields.push_str(&format!("{} {};\n", ty.concrete(), name));
        }
        if fields.is_empty() {
            fields.push_str("char dummy;\n");
        }
        format!("struct {} {{ {}}};\n{}", class.name, fields, funcs)
    }

    fn func_def(&mut self, func: &FuncDef<'src>) -> String {
        let src_name = func.name;
        let mut name = if src_name == "main" {
            self.has_main = true;
            "hs_main".to_string()
        } else {
            src_name.to_string()
        };
        if let Some(class) = self.current_class {
            name = format!("{class}_{name}");
        }

        let (params_c, locals, body) = self.with_frame(|em| {
            // The injected receiver participates in lookup so `self.field`
            // and `self.method()` type and mangle like any other receiver.
            if let Some(class) = em.current_class {
                em.scopes.bind("self", CType::Struct(class));
            }
            for &param in &func.params {
                let ty = if param == "args" {
                    CType::Array
                } else {
                    CType::Str
                };
                em.scopes.bind(param, ty);
            }

            let body: String = func.body.iter().map(|s| em.stmt(s)).collect();

            // Names bound during body emission that are not parameters become
            // top-of-body declarations.
            let mut locals = String::new();
            for (local, ty) in em.scopes.innermost_entries() {
                if local == "self" || func.params.contains(&local) {
                    continue;
                }
                locals.push_str(&format!("{} {};\n", ty.concrete(), local));
            }

            let mut params_c: Vec<String> = Vec::new();
            if let Some(class) = em.current_class {
                params_c.push(format!("struct {class}* self"));
            }
            for &param in &func.params {
                let ty = em.scopes.lookup(param).unwrap_or(CType::Str);
                params_c.push(format!("{ty} {param}"));
            }
            (params_c.join(", "), locals, body)
        });

        let ret = if returns_int(src_name) { "int" } else { "void" };
        format!("{ret} {name}({params_c}) {{ {locals}{body} }}\n")
    }

    /// Run `f` inside a fresh scope frame; the frame is popped on every exit
    /// path out of the closure.
    fn with_frame<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scopes.push_frame();
        let result = f(self);
        self.scopes.pop_frame();
        result
    }

    // ── Statements ────────────────────────────────────────────────────────────

    fn stmt(&mut self, stmt: &Stmt<'src>) -> String {
        match &stmt.kind {
            StmtKind::Assign { target, value } => {
                let lhs = self.expr(target);
                let rhs = self.expr(value);
                // A bare, unbound identifier on the left introduces a local
                // with the RHS type (Unknown widens to char*).
                if let Some(name) = bare_var(target)
                    && self.scopes.lookup(name).is_none()
                {
                    let ty = if rhs.ty.is_unknown() {
                        CType::Str
                    } else {
                        rhs.ty
                    };
                    self.scopes.bind(name, ty);
                }
                format!("{} = {};\n", lhs.code, rhs.code)
            }
            StmtKind::Log(raw) => {
                format!("printf(\"%s\\n\", {});\n", lower_interpolation(raw))
            }
            StmtKind::Call(expr) => format!("{};\n", self.expr(expr).code),
            StmtKind::Return(None) => "return;\n".to_string(),
            StmtKind::Return(Some(expr)) => format!("return {};\n", self.expr(expr).code),
            StmtKind::If {
                cond,
                body,
                elifs,
                orelse,
            } => {
                let cond = self.expr(cond);
                let body: String = body.iter().map(|s| self.stmt(s)).collect();
                let mut tail = String::new();
                for elif in elifs {
                    let c = self.expr(&elif.cond);
                    let b: String = elif.body.iter().map(|s| self.stmt(s)).collect();
                    tail.push_str(&format!(" else if ({}) {{ {} }}", c.code, b));
                }
                if let Some(orelse) = orelse {
                    let b: String = orelse.iter().map(|s| self.stmt(s)).collect();
                    tail.push_str(&format!(" else {{ {b} }}"));
                }
                format!("if ({}) {{ {} }}{}\n", cond.code, body, tail)
            }
            StmtKind::For { var, iter, body } => {
                let var = *var;
                let coll = self.expr(iter);
                // The loop variable is visible to the body only; the binding
                // is undone afterwards so it does not become a function-level
                // declaration.
                let prev = self.scopes.bind_shadow(var, CType::Str);
                let body: String = body.iter().map(|s| self.stmt(s)).collect();
                self.scopes.restore(var, prev);
                format!(
                    "for (int _{var}_i = 0; _{var}_i < {coll}.len; _{var}_i++) {{ char* {var} = {coll}.data[_{var}_i]; {body} }}\n",
                    var = var,
                    coll = coll.code,
                    body = body
                )
            }
        }
    }

    // ── Expressions ───────────────────────────────────────────────────────────

    fn expr(&mut self, expr: &Expr<'src>) -> Emit<'src> {
        match expr {
            Expr::Int(lexeme) => Emit::new(*lexeme, CType::Int),
            Expr::Str(raw) => Emit::new(lower_interpolation(raw), CType::Str),
            Expr::Null => Emit::new("NULL", CType::VoidPtr),
            Expr::Var(name) => {
                let ty = self.scopes.lookup(name).unwrap_or(CType::Unknown);
                Emit::new(*name, ty)
            }
            Expr::ArrayLit(items) => {
                let codes: Vec<String> = items.iter().map(|e| self.expr(e).code).collect();
                Emit::new(
                    format!(
                        "(Array){{.data = (char**)(char*[]){{ {} }}, .len = {} }}",
                        codes.join(", "),
                        codes.len()
                    ),
                    CType::Array,
                )
            }
            Expr::New(name) => {
                let name = *name;
                Emit::new(
                    format!("(struct {name}*)malloc(sizeof(struct {name}))"),
                    CType::Struct(name),
                )
            }
            Expr::Paren(inner) => self.expr(inner),
            Expr::Dot { recv, field } => self.dot_access(recv, *field),
            Expr::Call { callee, args } => self.call(callee, args),
            Expr::Index { recv, index } => self.array_access(recv, index),
            Expr::Add(operands) => self.add_chain(operands),
            Expr::Compare { first, rest } => self.compare_chain(first, rest),
            Expr::Not(inner) => {
                let inner = self.expr(inner);
                Emit::new(format!("!({})", inner.code), CType::Bool)
            }
            Expr::And(operands) => {
                let mut acc = self.expr(&operands[0]);
                for operand in &operands[1..] {
                    let rhs = self.expr(operand);
                    acc = Emit::new(format!("({} && {})", acc.code, rhs.code), CType::Bool);
                }
                acc
            }
        }
    }

    fn dot_access(&mut self, recv: &Expr<'src>, field: &'src str) -> Emit<'src> {
        let left = self.expr(recv);
        match left.ty {
            CType::Struct(class) => {
                let ty = self
                    .classes
                    .field_type(class, field)
                    .unwrap_or(CType::Str);
                Emit::new(format!("{}->{}", left.code, field), ty)
            }
            CType::Array => {
                if field == "length" {
                    Emit::new(format!("{}.len", left.code), CType::Int)
                } else {
                    Emit::new(format!("{}.{}", left.code, field), CType::Unknown)
                }
            }
            CType::Response => {
                let ty = if field == "status" {
                    CType::Int
                } else {
                    CType::Str
                };
                Emit::new(format!("{}->{}", left.code, field), ty)
            }
            _ => Emit::new(format!("{}->{}", left.code, field), CType::Unknown),
        }
    }

    fn call(&mut self, callee: &Expr<'src>, args: &[Expr<'src>]) -> Emit<'src> {
        let codes: Vec<String> = args.iter().map(|a| self.expr(a).code).collect();
        let args_c = codes.join(", ");

        // Method call: the receiver's static type alone chooses between the
        // mangled form and a free function taking the receiver first.
        if let Expr::Dot { recv, field } = callee {
            let recv = self.expr(recv);
            let joined = if args_c.is_empty() {
                recv.code.clone()
            } else {
                format!("{}, {}", recv.code, args_c)
            };
            let code = match recv.ty.struct_name() {
                Some(class) if self.classes.contains(class) => {
                    format!("{class}_{field}({joined})")
                }
                _ => format!("{field}({joined})"),
            };
            return Emit::new(code, builtin_return_type(field));
        }

        let callee_emit = self.expr(callee);
        if callee_emit.ty.is_unknown() && is_plain_ident(&callee_emit.code) {
            let name = callee_emit.code.as_str();
            return match name {
                "allocate" => Emit::new(format!("malloc({args_c})"), CType::VoidPtr),
                "deallocate" => Emit::new(format!("free({args_c})"), CType::Void),
                "version_compare" => Emit::new(format!("strcmp({args_c})"), CType::Int),
                _ => Emit::new(format!("{name}({args_c})"), builtin_return_type(name)),
            };
        }

        // Typed or structured callee: emit as-is and let the C compiler judge.
        let ty = match callee {
            Expr::Var(name) => builtin_return_type(name),
            _ => CType::Unknown,
        };
        Emit::new(format!("{}({})", callee_emit.code, args_c), ty)
    }

    fn array_access(&mut self, recv: &Expr<'src>, index: &Expr<'src>) -> Emit<'src> {
        let left = self.expr(recv);
        let idx = self.expr(index);
        match left.ty {
            CType::Array => Emit::new(format!("{}.data[{}]", left.code, idx.code), CType::Str),
            CType::Json => Emit::new(
                format!("{}->items.data[{}]", left.code, idx.code),
                CType::Str,
            ),
            _ => Emit::new(format!("{}[{}]", left.code, idx.code), CType::Unknown),
        }
    }

    fn add_chain(&mut self, operands: &[Expr<'src>]) -> Emit<'src> {
        let mut acc = self.expr(&operands[0]);
        for operand in &operands[1..] {
            let rhs = self.expr(operand);
            if acc.ty == CType::Str || rhs.ty == CType::Str {
                acc = Emit::new(
                    format!(
                        "(char*)({{ char *res = NULL; asprintf(&res, \"%s%s\", {}, {}); res; }})",
                        acc.code, rhs.code
                    ),
                    CType::Str,
                );
            } else {
                acc = Emit::new(format!("({} + {})", acc.code, rhs.code), CType::Int);
            }
        }
        acc
    }

    fn compare_chain(
        &mut self,
        first: &Expr<'src>,
        rest: &[(crate::ast::CmpOp, Expr<'src>)],
    ) -> Emit<'src> {
        use crate::ast::CmpOp;
        let mut acc = self.expr(first);
        for (op, operand) in rest {
            let rhs = self.expr(operand);
            let code = match op {
                CmpOp::Eq if acc.ty == CType::Str && rhs.ty == CType::Str => {
                    format!("(strcmp({}, {}) == 0)", acc.code, rhs.code)
                }
                CmpOp::Eq => format!("({} == {})", acc.code, rhs.code),
                CmpOp::Lt => format!("({} < {})", acc.code, rhs.code),
                CmpOp::Gt => format!("({} > {})", acc.code, rhs.code),
            };
            acc = Emit::new(code, CType::Bool);
        }
        acc
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn import_line(import: &Import<'_>) -> String {
    let include = match &import.path {
        ImportPath::Name(name) => (*name).to_string(),
        ImportPath::Nested(module, member) => format!("{module}/{member}"),
    };
    match import.category {
        "c" => format!("#include <{include}.h>\n"),
        "virus" => format!("#include \"{include}.h\"\n"),
        _ => String::new(),
    }
}

/// The identifier behind an assignment target, seeing through parentheses.
fn bare_var<'src>(expr: &Expr<'src>) -> Option<&'src str> {
    match expr {
        Expr::Var(name) => Some(*name),
        Expr::Paren(inner) => bare_var(inner),
        _ => None,
    }
}

fn is_plain_ident(code: &str) -> bool {
    let mut chars = code.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Lower a raw string literal (quotes included) to its C form.
///
/// Without `{` the literal passes through unchanged, quotes and escapes and
/// all. With interpolation, each `{expr}` becomes `%s` in the format string
/// and the expression text (balanced braces, trimmed) becomes an `asprintf`
/// argument verbatim.
pub fn lower_interpolation(raw: &str) -> String {
    let body = raw.strip_prefix('"').unwrap_or(raw);
    let body = body.strip_suffix('"').unwrap_or(body);

    if !body.contains('{') {
        return format!("\"{body}\"");
    }

    let bytes = body.as_bytes();
    let mut fmt = String::new();
    let mut args: Vec<&str> = Vec::new();
    let mut lit_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            fmt.push_str(&body[lit_start..i]);
            let mut depth = 1;
            let mut j = i + 1;
            while j < bytes.len() && depth > 0 {
                match bytes[j] {
                    b'{' => depth += 1,
                    b'}' => depth -= 1,
                    _ => {}
                }
                j += 1;
            }
            // An unterminated `{…` runs to the end of the literal.
            let expr_end = if depth == 0 { j - 1 } else { j };
            args.push(body[i + 1..expr_end].trim());
            fmt.push_str("%s");
            i = j;
            lit_start = i;
        } else {
            i += 1;
        }
    }
    fmt.push_str(&body[lit_start..]);

    format!(
        "(char*)({{ char *str = NULL; asprintf(&str, \"{fmt}\", {}); str; }})",
        args.join(", ")
    )
}

// ── Tests ────────────────────────────────────────────────────────────────────
