//! Zero-copy HCS lexer.
//!
//! Produces [`Token`] variants that borrow `&'src str` slices directly from
//! the source buffer — no heap allocation for identifiers or string content.
//!
//! Handles:
//! - All keyword tokens
//! - Integer literals and double-quoted string literals with `\` escapes
//!   (the raw slice is kept; interpolation is handled downstream)
//! - `---` mode fences
//! - Comments: `@` to end of line (skipped)
//! - The operator set `= == < > + && ! . , : ( ) [ ]`
//!
//! Whitespace and newlines are insignificant. Bytes the grammar has no use
//! for surface as [`Token::Unknown`] so the parser can report them.

use std::fmt;

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'src> {
    Ident(&'src str),
    /// Integer literal — the lexeme, carried verbatim into the output.
    Int(&'src str),
    /// String literal — the *raw source* slice including both quotes, so the
    /// emitter can pass escapes through and lower `{…}` interpolation itself.
    Str(&'src str),

    // Keywords
    KwImport,
    KwClass,
    KwFunc,
    KwLog,
    KwReturn,
    KwIf,
    KwElse,
    KwFor,
    KwIn,
    KwNull,
    KwNew,

    // Punctuation / operators
    Fence, // ---
    Lt,
    Gt,
    Colon,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Dot,
    Plus,
    Assign, // =
    EqEq,   // ==
    AndAnd, // &&
    Bang,   // !

    /// A byte the grammar has no use for; surfaced as a parse error.
    Unknown(char),
    Eof,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "identifier `{name}`"),
            Token::Int(lexeme) => write!(f, "integer `{lexeme}`"),
            Token::Str(_) => write!(f, "string literal"),
            Token::KwImport => write!(f, "`import`"),
            Token::KwClass => write!(f, "`class`"),
            Token::KwFunc => write!(f, "`func`"),
            Token::KwLog => write!(f, "`log`"),
            Token::KwReturn => write!(f, "`return`"),
            Token::KwIf => write!(f, "`if`"),
            Token::KwElse => write!(f, "`else`"),
            Token::KwFor => write!(f, "`for`"),
            Token::KwIn => write!(f, "`in`"),
            Token::KwNull => write!(f, "`null`"),
            Token::KwNew => write!(f, "`new`"),
            Token::Fence => write!(f, "`---`"),
            Token::Lt => write!(f, "`<`"),
            Token::Gt => write!(f, "`>`"),
            Token::Colon => write!(f, "`:`"),
            Token::LBracket => write!(f, "`[`"),
            Token::RBracket => write!(f, "`]`"),
            Token::LParen => write!(f, "`(`"),
            Token::RParen => write!(f, "`)`"),
            Token::Comma => write!(f, "`,`"),
            Token::Dot => write!(f, "`.`"),
            Token::Plus => write!(f, "`+`"),
            Token::Assign => write!(f, "`=`"),
            Token::EqEq => write!(f, "`==`"),
            Token::AndAnd => write!(f, "`&&`"),
            Token::Bang => write!(f, "`!`"),
            Token::Unknown(c) => write!(f, "character `{c}`"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

// ── TokenWithOffset ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TokenWithOffset<'src> {
    pub token: Token<'src>,
    pub offset: u32,
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

pub struct Lexer<'src> {
    src: &'src [u8],
    /// The same source as a `&str` — used for safe UTF-8 slicing without `unsafe`.
    src_str: &'src str,
    /// Current byte position.
    pos: usize,
    /// One-token lookahead buffer.
    peeked: Option<TokenWithOffset<'src>>,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src: src.as_bytes(),
            src_str: src,
            pos: 0,
            peeked: None,
        }
    }

    // ── public interface ──────────────────────────────────────────────────────

    /// Return (but do not consume) the next token.
    pub fn peek(&mut self) -> Token<'src> {
        if self.peeked.is_none() {
            let t = self.next_inner();
            self.peeked = Some(t);
        }
        self.peeked
            .as_ref()
            .expect("peeked is always Some after the fill above")
            .token
    }

    /// Return (but do not consume) the next token's byte offset.
    pub fn peek_offset(&mut self) -> u32 {
        if self.peeked.is_none() {
            let t = self.next_inner();
            self.peeked = Some(t);
        }
        self.peeked
            .as_ref()
            .expect("peeked is always Some after the fill above")
            .offset
    }

    /// Consume and return the next token with its offset.
    pub fn consume(&mut self) -> TokenWithOffset<'src> {
        match self.peeked.take() {
            Some(t) => t,
            None => self.next_inner(),
        }
    }

    /// Consume the next token and return just the token (discards offset).
    pub fn bump(&mut self) -> Token<'src> {
        self.consume().token
    }

    /// Consume the next token only if it matches `expected`.
    /// Returns `true` if it matched and was consumed.
    pub fn eat(&mut self, expected: Token<'src>) -> bool {
        if self.peek() == expected {
            self.bump();
            true
        } else {
            false
        }
    }

    // ── internal tokenisation ────────────────────────────────────────────────

    fn next_inner(&mut self) -> TokenWithOffset<'src> {
        loop {
            if self.pos >= self.src.len() {
                return TokenWithOffset {
                    token: Token::Eof,
                    offset: self.pos as u32,
                };
            }

            let start = self.pos;
            let b = self.src[self.pos];

            // ── Whitespace (newlines are insignificant) ───────────────────
            if b == b' ' || b == b'\t' || b == b'\r' || b == b'\n' {
                self.pos += 1;
                continue;
            }

            // ── Comment: `@` to end of line ───────────────────────────────
            if b == b'@' {
                while self.pos < self.src.len() && self.src[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }

            // ── String literal ────────────────────────────────────────────
            if b == b'"' {
                return self.lex_string(start);
            }

            // ── Integer ───────────────────────────────────────────────────
            if b.is_ascii_digit() {
                while self.pos < self.src.len() && self.src[self.pos].is_ascii_digit() {
                    self.pos += 1;
                }
                return TokenWithOffset {
                    token: Token::Int(&self.src_str[start..self.pos]),
                    offset: start as u32,
                };
            }

            // ── Identifiers and keywords ──────────────────────────────────
            if b.is_ascii_alphabetic() || b == b'_' {
                return self.lex_name(start);
            }

            // ── Operators and punctuation ─────────────────────────────────
            self.pos += 1;
            let tok = match b {
                b'-' => {
                    // Only `---` fences use dashes; anything shorter is an
                    // unknown byte the parser will report.
                    if self.src.get(self.pos) == Some(&b'-')
                        && self.src.get(self.pos + 1) == Some(&b'-')
                    {
                        self.pos += 2;
                        Token::Fence
                    } else {
                        Token::Unknown('-')
                    }
                }
                b'=' => {
                    if self.src.get(self.pos) == Some(&b'=') {
                        self.pos += 1;
                        Token::EqEq
                    } else {
                        Token::Assign
                    }
                }
                b'&' => {
                    if self.src.get(self.pos) == Some(&b'&') {
                        self.pos += 1;
                        Token::AndAnd
                    } else {
                        Token::Unknown('&')
                    }
                }
                b'<' => Token::Lt,
                b'>' => Token::Gt,
                b':' => Token::Colon,
                b'[' => Token::LBracket,
                b']' => Token::RBracket,
                b'(' => Token::LParen,
                b')' => Token::RParen,
                b',' => Token::Comma,
                b'.' => Token::Dot,
                b'+' => Token::Plus,
                b'!' => Token::Bang,
                other => Token::Unknown(other as char),
            };

            return TokenWithOffset {
                token: tok,
                offset: start as u32,
            };
        }
    }

    // ── Identifier / keyword lexing ───────────────────────────────────────────

    fn lex_name(&mut self, start: usize) -> TokenWithOffset<'src> {
        while self.pos < self.src.len() {
            let b = self.src[self.pos];
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        // All bytes we advanced over are ASCII, so `start..pos` is always on a
        // valid UTF-8 char boundary.
        let s = &self.src_str[start..self.pos];
        let tok = match s {
            "import" => Token::KwImport,
            "class" => Token::KwClass,
            "func" => Token::KwFunc,
            "log" => Token::KwLog,
            "return" => Token::KwReturn,
            "if" => Token::KwIf,
            "else" => Token::KwElse,
            "for" => Token::KwFor,
            "in" => Token::KwIn,
            "null" => Token::KwNull,
            "new" => Token::KwNew,
            other => Token::Ident(other),
        };
        TokenWithOffset {
            token: tok,
            offset: start as u32,
        }
    }

    // ── String lexing ─────────────────────────────────────────────────────────

    fn lex_string(&mut self, start: usize) -> TokenWithOffset<'src> {
        self.pos += 1; // consume opening quote
        while self.pos < self.src.len() {
            let b = self.src[self.pos];
            if b == b'\\' {
                self.pos += 2; // skip escaped char
                continue;
            }
            if b == b'"' {
                self.pos += 1;
                break;
            }
            self.pos += 1;
        }
        // An unterminated string runs to end of input; the missing closing
        // bracket of the enclosing block turns into a parse error there.
        let end = self.pos.min(self.src.len());
        TokenWithOffset {
            token: Token::Str(&self.src_str[start..end]),
            offset: start as u32,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
