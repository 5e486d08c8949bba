//! Recursive-descent HCS parser.
//!
//! Produces a [`Program`] from a source string using the zero-copy
//! [`Lexer`]. The grammar is deterministic under single-token lookahead:
//! statement kind is decided by the leading keyword, and expressions use a
//! precedence ladder (`&&` → `!`/comparisons → `+` → postfix chains →
//! atoms) mirroring the language's operator levels.
//!
//! Unlike the downstream passes, the parser is strict: any token the grammar
//! cannot place is a fatal [`ParseError`] naming the token and its byte
//! offset. Everything after parsing is permissive by design.

use crate::ast::{
    ClassDef, CmpOp, ElseIf, Expr, FuncDef, Import, ImportPath, Item, Mode, Offset, Program, Stmt,
    StmtKind,
};
use crate::syntax::lexer::{Lexer, Token};
use std::fmt;

// ── Errors ────────────────────────────────────────────────────────────────────

/// A fatal syntax error: what was found, what was expected, and where.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Byte offset of the offending token.
    pub offset: u32,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

type Result<T> = std::result::Result<T, ParseError>;

// ── Public entry point ────────────────────────────────────────────────────────

/// Parse an HCS source string into a [`Program`].
pub fn parse(src: &str) -> Result<Program<'_>> {
    let mut p = Parser::new(src);
    p.parse_program()
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser<'src> {
    lex: Lexer<'src>,
}

impl<'src> Parser<'src> {
    fn new(src: &'src str) -> Self {
        Self {
            lex: Lexer::new(src),
        }
    }

    // ── Program ───────────────────────────────────────────────────────────────

    fn parse_program(&mut self) -> Result<Program<'src>> {
        let mode = self.parse_directive()?;

        let mut imports = Vec::new();
        while self.peek() == Token::KwImport {
            imports.push(self.parse_import()?);
        }

        let mut items = Vec::new();
        loop {
            match self.peek() {
                Token::Eof => break,
                Token::KwClass => items.push(Item::Class(self.parse_class()?)),
                Token::KwFunc => items.push(Item::Func(self.parse_func()?)),
                other => {
                    return Err(self.error(format!("expected `class` or `func`, found {other}")));
                }
            }
        }

        Ok(Program {
            mode,
            imports,
            items,
        })
    }

    /// `--- manual ---` or `--- automatic ---`, if present.
    fn parse_directive(&mut self) -> Result<Option<Mode>> {
        if self.peek() != Token::Fence {
            return Ok(None);
        }
        self.lex.bump();
        let mode = match self.peek() {
            Token::Ident("manual") => Mode::Manual,
            Token::Ident("automatic") => Mode::Automatic,
            other => {
                return Err(self.error(format!(
                    "expected `manual` or `automatic` in mode directive, found {other}"
                )));
            }
        };
        self.lex.bump();
        self.expect(Token::Fence)?;
        Ok(Some(mode))
    }

    // ── import ────────────────────────────────────────────────────────────────

    fn parse_import(&mut self) -> Result<Import<'src>> {
        let offset = self.lex.peek_offset();
        self.lex.bump(); // consume `import`
        self.expect(Token::Lt)?;
        let category = self.expect_ident()?;
        let path = match self.peek() {
            Token::Colon => {
                self.lex.bump();
                ImportPath::Name(self.expect_ident()?)
            }
            Token::Lt => {
                self.lex.bump();
                let module = self.expect_ident()?;
                self.expect(Token::Colon)?;
                let member = self.expect_ident()?;
                self.expect(Token::Gt)?;
                ImportPath::Nested(module, member)
            }
            other => {
                return Err(self.error(format!("expected `:` or `<` in import, found {other}")));
            }
        };
        self.expect(Token::Gt)?;
        Ok(Import {
            category,
            path,
            offset,
        })
    }

    // ── class / func ──────────────────────────────────────────────────────────

    fn parse_class(&mut self) -> Result<ClassDef<'src>> {
        let offset = self.lex.peek_offset();
        self.lex.bump(); // consume `class`
        let name = self.expect_ident()?;
        self.expect(Token::LBracket)?;
        let mut funcs = Vec::new();
        while self.peek() == Token::KwFunc {
            funcs.push(self.parse_func()?);
        }
        self.expect(Token::RBracket)?;
        Ok(ClassDef {
            name,
            offset,
            funcs,
        })
    }

    fn parse_func(&mut self) -> Result<FuncDef<'src>> {
        let offset = self.lex.peek_offset();
        self.lex.bump(); // consume `func`
        let name = self.expect_ident()?;
        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        if let Token::Ident(_) = self.peek() {
            loop {
                params.push(self.expect_ident()?);
                if !self.lex.eat(Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;
        let body = self.parse_block()?;
        Ok(FuncDef {
            name,
            offset,
            params,
            body,
        })
    }

    // ── Statements ────────────────────────────────────────────────────────────

    /// `[` stmt* `]`
    fn parse_block(&mut self) -> Result<Vec<Stmt<'src>>> {
        self.expect(Token::LBracket)?;
        let mut stmts = Vec::new();
        while self.peek() != Token::RBracket {
            if self.peek() == Token::Eof {
                return Err(self.error("expected `]`, found end of input".to_string()));
            }
            stmts.push(self.parse_stmt()?);
        }
        self.lex.bump(); // consume `]`
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt<'src>> {
        let offset = self.lex.peek_offset();
        let kind = match self.peek() {
            Token::KwLog => {
                self.lex.bump();
                match self.peek() {
                    Token::Str(raw) => {
                        self.lex.bump();
                        StmtKind::Log(raw)
                    }
                    other => {
                        return Err(
                            self.error(format!("expected string after `log`, found {other}"))
                        );
                    }
                }
            }
            Token::KwReturn => {
                self.lex.bump();
                let value = if starts_expr(self.peek()) {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                StmtKind::Return(value)
            }
            Token::KwIf => self.parse_if()?,
            Token::KwFor => {
                self.lex.bump();
                let var = self.expect_ident()?;
                self.expect(Token::KwIn)?;
                let iter = self.parse_expr()?;
                let body = self.parse_block()?;
                StmtKind::For { var, iter, body }
            }
            _ => {
                // Assignment or call-as-statement.
                let expr = self.parse_expr()?;
                if self.lex.eat(Token::Assign) {
                    let value = self.parse_expr()?;
                    StmtKind::Assign {
                        target: expr,
                        value,
                    }
                } else if matches!(expr, Expr::Call { .. }) {
                    StmtKind::Call(expr)
                } else {
                    return Err(self.error(
                        "expected statement: only assignments and calls may stand alone"
                            .to_string(),
                    ));
                }
            }
        };
        Ok(Stmt { offset, kind })
    }

    fn parse_if(&mut self) -> Result<StmtKind<'src>> {
        self.lex.bump(); // consume `if`
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        let mut elifs = Vec::new();
        let mut orelse = None;
        while self.peek() == Token::KwElse {
            self.lex.bump();
            if self.peek() == Token::KwIf {
                self.lex.bump();
                let cond = self.parse_expr()?;
                let body = self.parse_block()?;
                elifs.push(ElseIf { cond, body });
            } else {
                orelse = Some(self.parse_block()?);
                break;
            }
        }
        Ok(StmtKind::If {
            cond,
            body,
            elifs,
            orelse,
        })
    }

    // ── Expressions ───────────────────────────────────────────────────────────
    //
    // Precedence, low → high: `&&`, `!`/comparison, `+`, postfix, atom.

    fn parse_expr(&mut self) -> Result<Expr<'src>> {
        let first = self.parse_cmp_term()?;
        if self.peek() != Token::AndAnd {
            return Ok(first);
        }
        let mut operands = vec![first];
        while self.lex.eat(Token::AndAnd) {
            operands.push(self.parse_cmp_term()?);
        }
        Ok(Expr::And(operands))
    }

    fn parse_cmp_term(&mut self) -> Result<Expr<'src>> {
        // `!` binds a bare additive expression; the grammar does not allow
        // comparisons directly under it.
        if self.lex.eat(Token::Bang) {
            let inner = self.parse_add()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        let first = self.parse_add()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                Token::EqEq => CmpOp::Eq,
                Token::Lt => CmpOp::Lt,
                Token::Gt => CmpOp::Gt,
                _ => break,
            };
            self.lex.bump();
            rest.push((op, self.parse_add()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn parse_add(&mut self) -> Result<Expr<'src>> {
        let first = self.parse_postfix()?;
        if self.peek() != Token::Plus {
            return Ok(first);
        }
        let mut operands = vec![first];
        while self.lex.eat(Token::Plus) {
            operands.push(self.parse_postfix()?);
        }
        Ok(Expr::Add(operands))
    }

    fn parse_postfix(&mut self) -> Result<Expr<'src>> {
        let mut expr = self.parse_atom()?;
        loop {
            match self.peek() {
                Token::Dot => {
                    self.lex.bump();
                    let field = self.expect_ident()?;
                    expr = Expr::Dot {
                        recv: Box::new(expr),
                        field,
                    };
                }
                Token::LParen => {
                    self.lex.bump();
                    let args = self.parse_args(Token::RParen)?;
                    self.expect(Token::RParen)?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                Token::LBracket => {
                    self.lex.bump();
                    let index = self.parse_expr()?;
                    self.expect(Token::RBracket)?;
                    expr = Expr::Index {
                        recv: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_atom(&mut self) -> Result<Expr<'src>> {
        match self.peek() {
            Token::Int(lexeme) => {
                self.lex.bump();
                Ok(Expr::Int(lexeme))
            }
            Token::Str(raw) => {
                self.lex.bump();
                Ok(Expr::Str(raw))
            }
            Token::KwNull => {
                self.lex.bump();
                Ok(Expr::Null)
            }
            Token::Ident(name) => {
                self.lex.bump();
                Ok(Expr::Var(name))
            }
            Token::LBracket => {
                self.lex.bump();
                let items = self.parse_args(Token::RBracket)?;
                self.expect(Token::RBracket)?;
                Ok(Expr::ArrayLit(items))
            }
            Token::KwNew => {
                self.lex.bump();
                let name = self.expect_ident()?;
                self.expect(Token::LParen)?;
                self.expect(Token::RParen)?;
                Ok(Expr::New(name))
            }
            Token::LParen => {
                self.lex.bump();
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(Expr::Paren(Box::new(inner)))
            }
            other => Err(self.error(format!("expected expression, found {other}"))),
        }
    }

    /// Comma-separated expressions up to (not consuming) `close`.
    fn parse_args(&mut self, close: Token<'src>) -> Result<Vec<Expr<'src>>> {
        let mut args = Vec::new();
        if self.peek() == close {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if !self.lex.eat(Token::Comma) {
                break;
            }
        }
        Ok(args)
    }

    // ── Helper utilities ──────────────────────────────────────────────────────

    fn peek(&mut self) -> Token<'src> {
        self.lex.peek()
    }

    fn expect(&mut self, expected: Token<'src>) -> Result<Offset> {
        let offset = self.lex.peek_offset();
        let found = self.peek();
        if found == expected {
            self.lex.bump();
            Ok(offset)
        } else {
            Err(self.error(format!("expected {expected}, found {found}")))
        }
    }

    fn expect_ident(&mut self) -> Result<&'src str> {
        match self.peek() {
            Token::Ident(name) => {
                self.lex.bump();
                Ok(name)
            }
            other => Err(self.error(format!("expected identifier, found {other}"))),
        }
    }

    fn error(&mut self, message: String) -> ParseError {
        ParseError {
            offset: self.lex.peek_offset(),
            message,
        }
    }
}

/// Whether `tok` can begin an expression — used to decide if `return` has a
/// value. A `return` directly followed by an assignment to a bare variable
/// reads the variable as the return value; the grammar itself is ambiguous
/// there and real programs place `return` last in a block.
fn starts_expr(tok: Token<'_>) -> bool {
    matches!(
        tok,
        Token::Int(_)
            | Token::Str(_)
            | Token::KwNull
            | Token::Ident(_)
            | Token::LBracket
            | Token::KwNew
            | Token::LParen
            | Token::Bang
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
