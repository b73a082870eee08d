//! Syntax errors.
//!
//! Parsing stops at the first violation: every grammar rule propagates a [`SyntaxError`] unchanged
//! with `?`, and nothing catches it short of the entry point.

use std::fmt::{self, Display, Formatter};

use thiserror::Error;

use crate::diag::{Diag, Diagnostic};
use crate::span::Span;
use crate::tok::{LexErrorKind, Token, TokenKind};
use crate::util::oxford_or;

/// Result type for grammar rules.
pub type ParseRes<T> = Result<T, SyntaxError>;

/// The one error a parse can end in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("near line {line}: {kind}")]
pub struct SyntaxError {
    /// 1-based line of the offending token.
    pub line: usize,

    /// Span of the offending token.
    pub span: Span,

    pub kind: SyntaxErrorKind,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, span: Span, line: usize) -> Self {
        Self { line, span, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("expected {expected}, found {found}")]
    Unexpected { expected: Expected, found: Found },

    #[error("unclosed {}: expected {pair}, found {found}", .pair.desc())]
    Unclosed { pair: Pair, open: Span, found: Found },

    #[error("{kind}: `{lexeme}`")]
    Lexical { kind: LexErrorKind, lexeme: String },

    #[error("invalid assignment target")]
    InvalidAssignTarget,

    #[error("invalid increment/decrement target")]
    InvalidUpdateTarget,

    #[error("expression statement must be a call, allocation, assignment or update")]
    NotAStatement,

    #[error("`return` is only allowed at the end of a function body")]
    MisplacedReturn,

    #[error("`break` outside of a loop or switch")]
    BreakOutsideLoop,

    #[error("`continue` outside of a loop")]
    ContinueOutsideLoop,

    #[error("more than one `default` clause in switch")]
    DuplicateDefault { first: Span },
}

/// What a grammar rule was looking for when it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    /// An exact punctuator or keyword.
    Lit(&'static str),

    /// Any token of a class.
    Kind(TokenKind),

    /// One of several constructs, described in prose.
    OneOf(Vec<&'static str>),

    Statement,

    Expression,
}

impl Display for Expected {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Expected::Lit(lit) => write!(f, "`{lit}`"),
            Expected::Kind(kind) => write!(f, "{kind}"),
            Expected::OneOf(options) => write!(f, "{}", oxford_or(options)),
            Expected::Statement => write!(f, "statement"),
            Expected::Expression => write!(f, "expression"),
        }
    }
}

/// The token actually found where something else was expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Found {
    Token { kind: TokenKind, value: String },
    EndOfInput,
}

impl From<&Token> for Found {
    fn from(tok: &Token) -> Self {
        if tok.is_eof() {
            Found::EndOfInput
        } else {
            Found::Token {
                kind: tok.kind,
                value: tok.value.clone(),
            }
        }
    }
}

impl Display for Found {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Found::Token { kind, value } => {
                let tok = Token::new(*kind, value.as_str(), Span::default(), 0);
                Display::fmt(&tok, f)
            }
            Found::EndOfInput => write!(f, "end of input"),
        }
    }
}

/// Bracket pairs whose closers are checked against their openers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pair {
    Parens,
    Braces,
    Brackets,
}

impl Pair {
    pub fn close(self) -> &'static str {
        match self {
            Pair::Parens => ")",
            Pair::Braces => "}",
            Pair::Brackets => "]",
        }
    }

    fn desc(self) -> &'static str {
        match self {
            Pair::Parens => "parentheses",
            Pair::Braces => "braces",
            Pair::Brackets => "brackets",
        }
    }
}

impl Display for Pair {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "`{}`", self.close())
    }
}

impl SyntaxErrorKind {
    fn label(&self) -> String {
        match self {
            SyntaxErrorKind::Unexpected {
                found: Found::EndOfInput,
                ..
            } => "end of input here".into(),
            SyntaxErrorKind::Unexpected { .. } => "unexpected token here".into(),
            SyntaxErrorKind::Unclosed { pair, .. } => {
                format!("{} should have been closed here", pair.desc())
            }
            SyntaxErrorKind::Lexical { kind, .. } => match kind {
                LexErrorKind::UnrecognizedToken => {
                    "this character sequence is not a valid token".into()
                }
                LexErrorKind::UnterminatedString => "this string is missing a closing quote".into(),
                LexErrorKind::UnterminatedBlockComment => {
                    "this comment is missing a closing `*/`".into()
                }
                LexErrorKind::InvalidNumber => "this is not a valid number".into(),
            },
            SyntaxErrorKind::InvalidAssignTarget => "left-hand side cannot be assigned to".into(),
            SyntaxErrorKind::InvalidUpdateTarget => {
                "operand cannot be incremented or decremented".into()
            }
            SyntaxErrorKind::NotAStatement => "expression ends here".into(),
            SyntaxErrorKind::MisplacedReturn => "`return` here".into(),
            SyntaxErrorKind::BreakOutsideLoop => "`break` here".into(),
            SyntaxErrorKind::ContinueOutsideLoop => "`continue` here".into(),
            SyntaxErrorKind::DuplicateDefault { .. } => "second `default` here".into(),
        }
    }
}

impl Diagnostic for SyntaxError {
    fn into_diag(self) -> Diag {
        let label = self.kind.label();
        let diag = Diag::new(
            format!("syntax error: {}", self.kind),
            self.span,
            label,
        );

        match self.kind {
            SyntaxErrorKind::Unclosed { pair, open, .. } => {
                diag.with_secondary(open, format!("{} opened here", pair.desc()))
            }
            SyntaxErrorKind::DuplicateDefault { first } => {
                diag.with_secondary(first, "first `default` here")
            }
            SyntaxErrorKind::NotAStatement => {
                diag.with_note("a bare value has no effect as a statement")
            }
            SyntaxErrorKind::MisplacedReturn => diag
                .with_note("a function body is a list of statements followed by an optional `return`"),
            _ => diag,
        }
    }
}
