//! Zero-copy parse tree for HCS source.
//!
//! Design goals:
//! - Zero-copy: identifiers and literals borrow `&'src str` slices from the
//!   source buffer.
//! - Chain-shaped operators: `+`, `&&`, and comparisons keep their operand
//!   chains flat so code generation can fold them left to right.
//! - String literals keep the raw quoted slice; escape sequences and `{…}`
//!   interpolation are lowered during C emission, not at parse time.
//!
//! The tree is immutable after parsing and serialisable to JSON for
//! `--emit-ast`.

use serde::Serialize;

// ── Location ─────────────────────────────────────────────────────────────────

/// Byte offset of a token in the source file (0-indexed).
/// Using `u32` keeps nodes small; files >4 GB are not realistic.
pub type Offset = u32;

// ── Program ──────────────────────────────────────────────────────────────────

/// The optional `--- manual ---` / `--- automatic ---` mode directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    Automatic,
    Manual,
}

#[derive(Debug, Clone, Serialize)]
pub struct Program<'src> {
    pub mode: Option<Mode>,
    pub imports: Vec<Import<'src>>,
    pub items: Vec<Item<'src>>,
}

// ── Imports ──────────────────────────────────────────────────────────────────

/// `import <category:name>` or `import <category<module:member>>`.
#[derive(Debug, Clone, Serialize)]
pub struct Import<'src> {
    pub category: &'src str,
    pub path: ImportPath<'src>,
    pub offset: Offset,
}

#[derive(Debug, Clone, Serialize)]
pub enum ImportPath<'src> {
    /// A single header name: `import <c:stdio>`.
    Name(&'src str),
    /// A module/member pair: `import <virus<http:client>>`.
    Nested(&'src str, &'src str),
}

// ── Definitions ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub enum Item<'src> {
    Class(ClassDef<'src>),
    Func(FuncDef<'src>),
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassDef<'src> {
    pub name: &'src str,
    pub offset: Offset,
    pub funcs: Vec<FuncDef<'src>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FuncDef<'src> {
    pub name: &'src str,
    pub offset: Offset,
    /// Parameters are bare identifiers; types are inferred at emission.
    pub params: Vec<&'src str>,
    pub body: Vec<Stmt<'src>>,
}

// ── Statements ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stmt<'src> {
    pub offset: Offset,
    pub kind: StmtKind<'src>,
}

#[derive(Debug, Clone, Serialize)]
pub enum StmtKind<'src> {
    /// `lhs = rhs`
    Assign {
        target: Expr<'src>,
        value: Expr<'src>,
    },
    /// `log "…"` — the raw quoted string slice.
    Log(&'src str),
    /// A call in statement position.
    Call(Expr<'src>),
    Return(Option<Expr<'src>>),
    If {
        cond: Expr<'src>,
        body: Vec<Stmt<'src>>,
        elifs: Vec<ElseIf<'src>>,
        orelse: Option<Vec<Stmt<'src>>>,
    },
    /// `for x in coll [ … ]`
    For {
        var: &'src str,
        iter: Expr<'src>,
        body: Vec<Stmt<'src>>,
    },
}

/// One `else if cond [ … ]` arm.
#[derive(Debug, Clone, Serialize)]
pub struct ElseIf<'src> {
    pub cond: Expr<'src>,
    pub body: Vec<Stmt<'src>>,
}

// ── Expressions ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CmpOp {
    Eq, // ==
    Lt, // <
    Gt, // >
}

#[derive(Debug, Clone, Serialize)]
pub enum Expr<'src> {
    /// Integer literal — the lexeme is carried verbatim into the C output.
    Int(&'src str),
    /// String literal — the raw slice including the surrounding quotes.
    /// Escapes are passed through; `{…}` interpolation is lowered later.
    Str(&'src str),
    Null,
    Var(&'src str),
    /// `[a, b, c]`
    ArrayLit(Vec<Expr<'src>>),
    /// `new Name()`
    New(&'src str),
    /// `(expr)` — emitted transparently.
    Paren(Box<Expr<'src>>),
    /// `recv.field`
    Dot {
        recv: Box<Expr<'src>>,
        field: &'src str,
    },
    /// `callee(args…)`
    Call {
        callee: Box<Expr<'src>>,
        args: Vec<Expr<'src>>,
    },
    /// `recv[index]`
    Index {
        recv: Box<Expr<'src>>,
        index: Box<Expr<'src>>,
    },
    /// `a + b + c` — the whole chain, folded left to right at emission.
    Add(Vec<Expr<'src>>),
    /// `a == b < c` — first operand plus `(op, operand)` pairs.
    Compare {
        first: Box<Expr<'src>>,
        rest: Vec<(CmpOp, Expr<'src>)>,
    },
    /// `!expr`
    Not(Box<Expr<'src>>),
    /// `a && b && c`
    And(Vec<Expr<'src>>),
}
