//! Tokens, the token source contract, and a lexer for JavaScript-like source text.

use std::fmt::{self, Display, Formatter};
use std::iter::Peekable;
use std::str::CharIndices;

use crate::span::Span;


/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    Keyword,
    Punct,
    Number,
    Str,
    Bool,
    Null,
    /// Lexically malformed input. The parser rejects these wherever they appear.
    Invalid(LexErrorKind),
    Eof,
}

impl TokenKind {
    /// Is this a literal value token?
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::Number | TokenKind::Str | TokenKind::Bool | TokenKind::Null
        )
    }

    /// Short human-readable description, used in diagnostics.
    pub fn desc(self) -> &'static str {
        match self {
            TokenKind::Ident => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::Punct => "punctuator",
            TokenKind::Number => "number",
            TokenKind::Str => "string",
            TokenKind::Bool => "boolean",
            TokenKind::Null => "`null`",
            TokenKind::Invalid(_) => "invalid token",
            TokenKind::Eof => "end of input",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.desc())
    }
}

/// Kinds of malformed input the lexer can encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexErrorKind {
    UnrecognizedToken,
    UnterminatedString,
    UnterminatedBlockComment,
    InvalidNumber,
}

impl Display for LexErrorKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let s = match self {
            LexErrorKind::UnrecognizedToken => "unrecognized token",
            LexErrorKind::UnterminatedString => "unterminated string literal",
            LexErrorKind::UnterminatedBlockComment => "unterminated block comment",
            LexErrorKind::InvalidNumber => "invalid number literal",
        };
        f.write_str(s)
    }
}

/// A single token.
///
/// `value` holds the lexeme. For string literals it holds the unescaped contents, without quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, span: Span, line: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            span,
            line,
        }
    }

    pub fn eof(span: Span, line: usize) -> Self {
        Self::new(TokenKind::Eof, "", span, line)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Is this the punctuator or keyword spelled `lit`?
    ///
    /// Identifiers and literals never match, so a string literal `"("` is not a `(`.
    pub fn is(&self, lit: &str) -> bool {
        matches!(self.kind, TokenKind::Punct | TokenKind::Keyword) && self.value == lit
    }

    /// Is this one of the given punctuators or keywords?
    pub fn is_any(&self, lits: &[&str]) -> bool {
        lits.iter().any(|lit| self.is(lit))
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str("end of input"),
            TokenKind::Punct | TokenKind::Keyword | TokenKind::Bool | TokenKind::Null => {
                write!(f, "`{}`", self.value)
            }
            TokenKind::Str => write!(f, "string {:?}", self.value),
            TokenKind::Invalid(kind) => write!(f, "{kind} `{}`", self.value),
            kind => write!(f, "{kind} `{}`", self.value),
        }
    }
}

/// A pull-based supplier of tokens.
///
/// `scan` hands out each token exactly once, in document order. Once the input is exhausted it
/// returns an end-of-input token on every call.
pub trait TokenSource {
    fn scan(&mut self) -> Token;

    /// The current 1-based source line, for diagnostics.
    fn line(&self) -> usize;
}

impl<S: TokenSource + ?Sized> TokenSource for &mut S {
    fn scan(&mut self) -> Token {
        (**self).scan()
    }

    fn line(&self) -> usize {
        (**self).line()
    }
}

/// A token source over an already-built list of tokens.
///
/// An end-of-input token is synthesized after the list runs out, unless the list already ends in
/// one.
#[derive(Debug, Clone)]
pub struct TokenList {
    tokens: std::vec::IntoIter<Token>,
    line: usize,
    eof: Token,
}

impl TokenList {
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof = tokens
            .iter()
            .rev()
            .find(|tok| tok.is_eof())
            .or(tokens.last())
            .map(|last| Token::eof(Span::empty(last.span.end()), last.line))
            .unwrap_or_else(|| Token::eof(Span::empty(0), 1));

        Self {
            tokens: tokens.into_iter(),
            line: 1,
            eof,
        }
    }
}

impl TokenSource for TokenList {
    fn scan(&mut self) -> Token {
        let tok = match self.tokens.next() {
            Some(tok) if !tok.is_eof() => tok,
            _ => self.eof.clone(),
        };
        self.line = tok.line;
        tok
    }

    fn line(&self) -> usize {
        self.line
    }
}

const KEYWORDS: &[&str] = &[
    "break", "case", "continue", "default", "else", "for", "function", "if", "new", "return",
    "switch", "this", "typeof", "var", "while",
];

/// Punctuators, longest first so that the first prefix match is the longest.
const PUNCTUATORS: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=", "-=", "*=", "/=", "%=",
    "{", "}", "(", ")", "[", "]", ";", ",", ".", "<", ">", "+", "-", "*", "/", "%", "!", "=",
    "?", ":",
];

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

fn is_token_start(c: char) -> bool {
    const NON_IDENT_STARTS: &str = "{}()[];,.<>+-*/%!=?:&|\"'";
    is_ident_start(c) || c.is_ascii_digit() || NON_IDENT_STARTS.contains(c)
}

fn unescape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        '\\' => Some('\\'),
        '\'' => Some('\''),
        '"' => Some('"'),
        _ => None,
    }
}

/// Lexer over a source string. Implements [`TokenSource`].
#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    text: &'src str,
    chars: Peekable<CharIndices<'src>>,
    span_start: usize,
    line: usize,
    token_line: usize,
    buffer: String,
}

impl<'src> Lexer<'src> {
    pub fn new(text: &'src str) -> Self {
        Self {
            text,
            chars: text.char_indices().peekable(),
            span_start: 0,
            line: 1,
            token_line: 1,
            buffer: String::new(),
        }
    }

    /// Byte offset of the next unscanned character.
    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|&(i, _)| i)
            .unwrap_or(self.text.len())
    }

    /// The current span, from the span start to the next unscanned character.
    fn span(&mut self) -> Span {
        let end = self.offset();
        Span::from(self.span_start..end)
    }

    /// The source text covered by the current span.
    fn lexeme(&mut self) -> &'src str {
        let span = self.span();
        let text = self.text;
        &text[span.range()]
    }

    /// Advance over a character, but do not add it to the buffer.
    ///
    /// Returns the skipped character, or `None` at the end of the input.
    fn skip(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Advance over a character and add it to the buffer.
    fn advance(&mut self) -> Option<char> {
        self.skip().inspect(|c| self.buffer.push(*c))
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Peek at the character after the next one.
    fn peek_second(&self) -> Option<char> {
        let mut chars = self.chars.clone();
        chars.next();
        chars.next().map(|(_, c)| c)
    }

    /// Advance over and buffer the next character if it satisfies the predicate.
    fn advance_if(&mut self, pred: impl FnOnce(char) -> bool) -> Option<char> {
        if pred(self.peek()?) {
            self.advance()
        } else {
            None
        }
    }

    /// Advance over and buffer as many consecutive characters as satisfy the predicate.
    fn advance_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while self.peek().map(&mut pred).unwrap_or(false) {
            self.advance();
        }
    }

    /// Skip as many consecutive characters as satisfy the predicate.
    fn skip_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while self.peek().map(&mut pred).unwrap_or(false) {
            self.skip();
        }
    }

    fn reset_span_start(&mut self) {
        self.span_start = self.offset();
        self.token_line = self.line;
        self.buffer.clear();
    }

    fn token(&mut self, kind: TokenKind, value: impl Into<String>) -> Token {
        let span = self.span();
        Token::new(kind, value, span, self.token_line)
    }

    /// Token whose value is the raw lexeme.
    fn token_from_lexeme(&mut self, kind: TokenKind) -> Token {
        let lexeme = self.lexeme();
        self.token(kind, lexeme)
    }

    fn invalid(&mut self, kind: LexErrorKind) -> Token {
        self.token_from_lexeme(TokenKind::Invalid(kind))
    }

    /// Skip whitespace and comments up to the start of the next token.
    ///
    /// Returns an invalid token if a block comment is left unterminated.
    fn skip_trivia(&mut self) -> Option<Token> {
        loop {
            self.skip_while(char::is_whitespace);
            match (self.peek(), self.peek_second()) {
                (Some('/'), Some('/')) => self.skip_while(|c| c != '\n'),
                (Some('/'), Some('*')) => {
                    self.reset_span_start();
                    self.skip();
                    self.skip();
                    if !self.skip_block_comment() {
                        return Some(self.invalid(LexErrorKind::UnterminatedBlockComment));
                    }
                }
                _ => return None,
            }
        }
    }

    /// Skip over a block comment body, assuming the opening `/*` is already consumed.
    ///
    /// Returns whether the closing `*/` was found.
    fn skip_block_comment(&mut self) -> bool {
        while let Some(c) = self.skip() {
            if c == '*' && self.peek() == Some('/') {
                self.skip();
                return true;
            }
        }
        false
    }

    /// Scan an identifier, keyword or keyword literal.
    ///
    /// Assumes the first character is already buffered.
    fn scan_ident(&mut self) -> Token {
        self.advance_while(is_ident_continue);
        let kind = match self.buffer.as_str() {
            "true" | "false" => TokenKind::Bool,
            "null" => TokenKind::Null,
            word if KEYWORDS.contains(&word) => TokenKind::Keyword,
            _ => TokenKind::Ident,
        };
        self.token_from_lexeme(kind)
    }

    /// Is the next character a `.` followed by a digit?
    fn at_fraction(&self) -> bool {
        let mut chars = self.chars.clone();
        matches!(chars.next(), Some((_, '.')))
            && chars.next().is_some_and(|(_, c)| c.is_ascii_digit())
    }

    /// Scan a number literal, assuming its first digit (or leading `.`) is already buffered.
    fn scan_number(&mut self, first: char) -> Token {
        if first == '0' && self.advance_if(|c| c == 'x' || c == 'X').is_some() {
            self.advance_while(|c| c.is_ascii_alphanumeric());
            let digits = &self.buffer[2..];
            return if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit()) {
                self.token_from_lexeme(TokenKind::Number)
            } else {
                self.invalid(LexErrorKind::InvalidNumber)
            };
        }

        let mut fraction = first == '.';
        self.advance_while(|c| c.is_ascii_digit());
        if !fraction && self.at_fraction() {
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
            fraction = true;
        }

        // A second fraction part, like `1.5.5`.
        if fraction && self.at_fraction() {
            self.advance_while(|c| c.is_ascii_digit() || c == '.');
            return self.invalid(LexErrorKind::InvalidNumber);
        }

        if self.advance_if(|c| c == 'e' || c == 'E').is_some() {
            self.advance_if(|c| c == '+' || c == '-');
            let before = self.buffer.len();
            self.advance_while(|c| c.is_ascii_digit());
            if self.buffer.len() == before {
                return self.invalid(LexErrorKind::InvalidNumber);
            }
        }

        // Identifier characters glued onto a number, like `3in`.
        if self.peek().is_some_and(is_ident_start) {
            self.advance_while(is_ident_continue);
            return self.invalid(LexErrorKind::InvalidNumber);
        }

        self.token_from_lexeme(TokenKind::Number)
    }

    /// Scan and unescape a string literal, assuming the opening quote is already consumed.
    fn scan_string(&mut self, quote: char) -> Token {
        self.buffer.clear();
        loop {
            match self.peek() {
                None | Some('\n') => return self.invalid(LexErrorKind::UnterminatedString),
                Some(c) if c == quote => {
                    self.skip();
                    let value = std::mem::take(&mut self.buffer);
                    return self.token(TokenKind::Str, value);
                }
                Some('\\') => {
                    self.skip();
                    match self.skip() {
                        None => return self.invalid(LexErrorKind::UnterminatedString),
                        // A backslash before a line break continues the string.
                        Some('\n') => {}
                        Some(c) => self.buffer.push(unescape(c).unwrap_or(c)),
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn scan_punct(&mut self) -> Option<Token> {
        let text = self.text;
        let rest = &text[self.span_start..];
        let punct = PUNCTUATORS.iter().find(|p| rest.starts_with(**p))?;
        for _ in 0..punct.len() {
            self.skip();
        }
        Some(self.token(TokenKind::Punct, *punct))
    }

    /// Consume a run of characters that cannot start any token.
    fn scan_unrecognized(&mut self) -> Token {
        self.skip();
        self.skip_while(|c| !is_token_start(c) && !c.is_whitespace());
        self.invalid(LexErrorKind::UnrecognizedToken)
    }
}

impl TokenSource for Lexer<'_> {
    fn scan(&mut self) -> Token {
        if let Some(invalid) = self.skip_trivia() {
            return invalid;
        }
        self.reset_span_start();

        match self.peek() {
            None => self.token(TokenKind::Eof, ""),
            Some(c) if is_ident_start(c) => {
                self.advance();
                self.scan_ident()
            }
            Some(c) if c.is_ascii_digit() => {
                self.advance();
                self.scan_number(c)
            }
            Some(c @ ('"' | '\'')) => {
                self.skip();
                self.scan_string(c)
            }
            Some('.') if self.at_fraction() => {
                self.advance();
                self.scan_number('.')
            }
            Some(_) => match self.scan_punct() {
                Some(tok) => tok,
                None => self.scan_unrecognized(),
            },
        }
    }

    fn line(&self) -> usize {
        self.token_line
    }
}
