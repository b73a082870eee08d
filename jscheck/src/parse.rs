//! Recursive-descent parser.
//!
//! The parser holds exactly one token of lookahead. Every grammar rule starts with the first token
//! of its production as the lookahead and, on success, returns with the lookahead on the first
//! token after the production. Nothing is ever pushed back, so there is no backtracking: each
//! decision between alternatives is made by inspecting the single lookahead token.
//!
//! The call stack is the parse stack. Recursion terminates because the grammar is not
//! left-recursive and every rule consumes a token before it can recurse into itself.
//!
//! Nesting depth is bounded only by the thread's stack. Each level of parentheses, brackets or
//! blocks costs several frames, so inputs nested thousands of levels deep can overflow a default
//! thread stack. Callers checking untrusted input should run the parser on a thread with a stack
//! sized for the nesting they accept.

use log::trace;

use crate::span::{Span, Spannable, Spanned};
use crate::syn::{CaseClause, Function, Program, SourceElement, Stmt};
use crate::tok::{Token, TokenKind, TokenSource};

mod error;
mod expr;
#[cfg(test)]
mod test;

pub use error::{Expected, Found, Pair, ParseRes, SyntaxError, SyntaxErrorKind};

// Grammar:
//
// program -> source_element* EOF
//
// source_element -> function_decl | stmt
//
// function_decl -> 'function' IDENT '(' params ')' function_body
//
// params -> ( IDENT ( ',' IDENT )* )?
//
// function_body -> '{' stmt* return_stmt? '}'
//
// return_stmt -> 'return' expr? ';'
//
// stmt -> block | var_stmt | if_stmt | while_stmt | for_stmt | switch_stmt
//       | break_stmt | continue_stmt | empty_stmt | expr_stmt
//
// block -> '{' stmt* '}'
//
// var_stmt -> var_decls ';'
//
// var_decls -> 'var' var_decl ( ',' var_decl )*
//
// var_decl -> IDENT ( '=' expr )?
//
// if_stmt -> 'if' '(' expr ')' stmt ( 'else' stmt )?
//
// while_stmt -> 'while' '(' expr ')' stmt
//
// for_stmt -> 'for' '(' ( var_decls | expr )? ';' expr? ';' expr? ')' stmt
//
// switch_stmt -> 'switch' '(' expr ')' '{' case_clause* '}'
//
// case_clause -> ( 'case' expr | 'default' ) ':' stmt*
//
// break_stmt -> 'break' ';'
//
// continue_stmt -> 'continue' ';'
//
// empty_stmt -> ';'
//
// expr_stmt -> ( ('++' | '--') call_member
//              | call_member ( assign_op expr | '++' | '--' )?
//              ) ';'
//
// The expression grammar is in `expr.rs`.

/// A parser over a token source.
///
/// Each parser owns its lookahead and its token source; independent parses need independent
/// parsers.
#[derive(Debug)]
pub struct Parser<S> {
    source: S,
    look: Token,

    /// Number of loops enclosing the current statement, within the current function.
    loop_depth: u32,

    /// Number of switch statements enclosing the current statement, within the current function.
    switch_depth: u32,
}

/// Parse a whole program from a token source.
pub fn parse_program<S: TokenSource>(source: S) -> ParseRes<Program> {
    Parser::new(source).program()
}

/// The statement production selected by a lookahead token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StmtStart {
    Block,
    Var,
    If,
    While,
    For,
    Switch,
    Break,
    Continue,
    Empty,
    Expr,
    Return,
    Invalid,
}

impl StmtStart {
    fn of(tok: &Token) -> Self {
        match tok.kind {
            TokenKind::Ident
            | TokenKind::Number
            | TokenKind::Str
            | TokenKind::Bool
            | TokenKind::Null => StmtStart::Expr,

            TokenKind::Punct => match tok.value.as_str() {
                "{" => StmtStart::Block,
                ";" => StmtStart::Empty,
                "(" | "++" | "--" => StmtStart::Expr,
                _ => StmtStart::Invalid,
            },

            TokenKind::Keyword => match tok.value.as_str() {
                "var" => StmtStart::Var,
                "if" => StmtStart::If,
                "while" => StmtStart::While,
                "for" => StmtStart::For,
                "switch" => StmtStart::Switch,
                "break" => StmtStart::Break,
                "continue" => StmtStart::Continue,
                "new" | "this" => StmtStart::Expr,
                "return" => StmtStart::Return,
                _ => StmtStart::Invalid,
            },

            TokenKind::Invalid(_) | TokenKind::Eof => StmtStart::Invalid,
        }
    }
}

/// Lookahead and matching primitives.
impl<S: TokenSource> Parser<S> {
    /// Create a parser, priming the lookahead with the first token from `source`.
    pub fn new(mut source: S) -> Self {
        let look = source.scan();
        Self {
            source,
            look,
            loop_depth: 0,
            switch_depth: 0,
        }
    }

    /// The current lookahead token.
    pub fn lookahead(&self) -> &Token {
        &self.look
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Install the next token as the lookahead, returning the one it replaces.
    fn advance(&mut self) -> Token {
        let next = self.source.scan();
        std::mem::replace(&mut self.look, next)
    }

    /// Is the lookahead the punctuator or keyword `lit`?
    fn check(&self, lit: &str) -> bool {
        self.look.is(lit)
    }

    fn check_any(&self, lits: &[&str]) -> bool {
        self.look.is_any(lits)
    }

    /// Advance over the lookahead if it is `lit`.
    fn eat(&mut self, lit: &str) -> Option<Token> {
        self.check(lit).then(|| self.advance())
    }

    /// Advance over the lookahead if it is exactly `expected`, or fail.
    fn match_literal(&mut self, expected: &'static str) -> ParseRes<Token> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(Expected::Lit(expected)))
        }
    }

    /// Advance over the lookahead if it is of class `expected`, or fail.
    fn match_type(&mut self, expected: TokenKind) -> ParseRes<Token> {
        if self.look.kind == expected {
            Ok(self.advance())
        } else {
            Err(self.unexpected(Expected::Kind(expected)))
        }
    }

    /// Advance over the closer of a pair whose opener was at `open`, or fail.
    fn match_close(&mut self, pair: Pair, open: Span) -> ParseRes<Token> {
        if self.check(pair.close()) {
            Ok(self.advance())
        } else {
            let found = Found::from(&self.look);
            Err(self.error(SyntaxErrorKind::Unclosed { pair, open, found }))
        }
    }

    fn identifier(&mut self) -> ParseRes<Spanned<String>> {
        let tok = self.match_type(TokenKind::Ident)?;
        Ok(tok.value.spanned(tok.span))
    }

    /// A syntax error at the lookahead.
    ///
    /// An invalid token in the lookahead takes precedence over whatever the grammar expected.
    fn error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        let kind = match self.look.kind {
            TokenKind::Invalid(lex) => SyntaxErrorKind::Lexical {
                kind: lex,
                lexeme: self.look.value.clone(),
            },
            _ => kind,
        };
        SyntaxError::new(kind, self.look.span, self.source.line())
    }

    /// A syntax error at an already-consumed token.
    fn error_at(&self, kind: SyntaxErrorKind, tok: &Token) -> SyntaxError {
        SyntaxError::new(kind, tok.span, tok.line)
    }

    fn unexpected(&self, expected: Expected) -> SyntaxError {
        let found = Found::from(&self.look);
        self.error(SyntaxErrorKind::Unexpected { expected, found })
    }
}

/// Program and statement grammar.
impl<S: TokenSource> Parser<S> {
    pub(crate) fn program(&mut self) -> ParseRes<Program> {
        trace!("= program");
        let mut elements = Vec::new();
        while !self.look.is_eof() {
            elements.push(self.source_element()?);
        }
        Ok(Program { elements })
    }

    fn source_element(&mut self) -> ParseRes<SourceElement> {
        if self.check("function") {
            self.function_declaration().map(SourceElement::Function)
        } else {
            self.statement().map(SourceElement::Stmt)
        }
    }

    pub(crate) fn function_declaration(&mut self) -> ParseRes<Function> {
        self.match_literal("function")?;
        let name = self.identifier()?;
        trace!("= function `{}` (line {})", name.node, self.look.line);

        let open = self.match_literal("(")?.span;
        let params = self.formal_parameter_list()?;
        self.match_close(Pair::Parens, open)?;

        // Jumps never cross a function boundary.
        let loop_depth = std::mem::take(&mut self.loop_depth);
        let switch_depth = std::mem::take(&mut self.switch_depth);
        let body = self.function_body();
        self.loop_depth = loop_depth;
        self.switch_depth = switch_depth;

        let (body, returns) = body?;
        Ok(Function {
            name,
            params,
            body,
            returns,
        })
    }

    fn formal_parameter_list(&mut self) -> ParseRes<Vec<Spanned<String>>> {
        let mut params = Vec::new();
        if self.check(")") {
            return Ok(params);
        }

        params.push(self.identifier()?);
        while self.eat(",").is_some() {
            params.push(self.identifier()?);
        }
        Ok(params)
    }

    fn function_body(&mut self) -> ParseRes<(Vec<Stmt>, bool)> {
        let open = self.match_literal("{")?.span;

        let mut body = Vec::new();
        while !self.check_any(&["}", "return"]) && !self.look.is_eof() {
            body.push(self.statement()?);
        }

        let returns = self.check("return");
        if returns {
            self.return_statement()?;
        }

        self.match_close(Pair::Braces, open)?;
        Ok((body, returns))
    }

    fn return_statement(&mut self) -> ParseRes<()> {
        self.match_literal("return")?;
        if !self.check(";") {
            self.expression()?;
        }
        self.match_literal(";")?;
        Ok(())
    }

    pub(crate) fn statement(&mut self) -> ParseRes<Stmt> {
        let start = StmtStart::of(&self.look);
        trace!("= statement {start:?} (line {})", self.look.line);

        match start {
            StmtStart::Block => self.block(),
            StmtStart::Var => self.variable_statement(),
            StmtStart::If => self.if_statement(),
            StmtStart::While => self.while_statement(),
            StmtStart::For => self.for_statement(),
            StmtStart::Switch => self.switch_statement(),
            StmtStart::Break => self.break_statement(),
            StmtStart::Continue => self.continue_statement(),
            StmtStart::Empty => self.empty_statement(),
            StmtStart::Expr => self.expression_statement().map(Stmt::Expr),
            StmtStart::Return => Err(self.error(SyntaxErrorKind::MisplacedReturn)),
            StmtStart::Invalid => Err(self.unexpected(Expected::Statement)),
        }
    }

    /// Statements up to, but not including, a lookahead of one of `terminators` or end of input.
    fn statements_until(&mut self, terminators: &[&str]) -> ParseRes<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.check_any(terminators) && !self.look.is_eof() {
            stmts.push(self.statement()?);
        }
        Ok(stmts)
    }

    fn block(&mut self) -> ParseRes<Stmt> {
        let open = self.match_literal("{")?.span;
        let stmts = self.statements_until(&["}"])?;
        self.match_close(Pair::Braces, open)?;
        Ok(Stmt::Block(stmts))
    }

    fn variable_statement(&mut self) -> ParseRes<Stmt> {
        let names = self.variable_declaration_list()?;
        self.match_literal(";")?;
        Ok(Stmt::Var(names))
    }

    fn variable_declaration_list(&mut self) -> ParseRes<Vec<Spanned<String>>> {
        self.match_literal("var")?;
        let mut names = vec![self.variable_declaration()?];
        while self.eat(",").is_some() {
            names.push(self.variable_declaration()?);
        }
        Ok(names)
    }

    fn variable_declaration(&mut self) -> ParseRes<Spanned<String>> {
        let name = self.identifier()?;
        if self.eat("=").is_some() {
            self.expression()?;
        }
        Ok(name)
    }

    /// A parenthesized condition, as in `if`, `while` and `switch`.
    fn condition(&mut self) -> ParseRes<()> {
        let open = self.match_literal("(")?.span;
        self.expression()?;
        self.match_close(Pair::Parens, open)?;
        Ok(())
    }

    fn if_statement(&mut self) -> ParseRes<Stmt> {
        self.match_literal("if")?;
        self.condition()?;
        let then = Box::new(self.statement()?);
        let otherwise = match self.eat("else") {
            Some(_) => Some(Box::new(self.statement()?)),
            None => None,
        };
        Ok(Stmt::If { then, otherwise })
    }

    fn loop_body(&mut self) -> ParseRes<Stmt> {
        self.loop_depth += 1;
        let body = self.statement();
        self.loop_depth -= 1;
        body
    }

    fn while_statement(&mut self) -> ParseRes<Stmt> {
        self.match_literal("while")?;
        self.condition()?;
        let body = self.loop_body()?;
        Ok(Stmt::While(Box::new(body)))
    }

    fn for_statement(&mut self) -> ParseRes<Stmt> {
        self.match_literal("for")?;
        let open = self.match_literal("(")?.span;

        if self.check("var") {
            self.variable_declaration_list()?;
        } else if !self.check(";") {
            self.expression()?;
        }
        self.match_literal(";")?;

        if !self.check(";") {
            self.expression()?;
        }
        self.match_literal(";")?;

        if !self.check(")") {
            self.expression()?;
        }
        self.match_close(Pair::Parens, open)?;

        let body = self.loop_body()?;
        Ok(Stmt::For(Box::new(body)))
    }

    fn switch_statement(&mut self) -> ParseRes<Stmt> {
        self.match_literal("switch")?;
        self.condition()?;
        let open = self.match_literal("{")?.span;

        self.switch_depth += 1;
        let clauses = self.case_clauses();
        self.switch_depth -= 1;

        let clauses = clauses?;
        self.match_close(Pair::Braces, open)?;
        Ok(Stmt::Switch(clauses))
    }

    fn case_clauses(&mut self) -> ParseRes<Vec<CaseClause>> {
        let mut clauses = Vec::new();
        let mut default: Option<Span> = None;

        while !self.check("}") && !self.look.is_eof() {
            let is_case = if self.eat("case").is_some() {
                self.expression()?;
                true
            } else if self.check("default") {
                if let Some(first) = default {
                    return Err(self.error(SyntaxErrorKind::DuplicateDefault { first }));
                }
                default = Some(self.advance().span);
                false
            } else {
                return Err(self.unexpected(Expected::OneOf(vec!["`case`", "`default`", "`}`"])));
            };

            self.match_literal(":")?;
            let body = self.statements_until(&["case", "default", "}"])?;
            clauses.push(CaseClause { is_case, body });
        }

        Ok(clauses)
    }

    fn break_statement(&mut self) -> ParseRes<Stmt> {
        if self.loop_depth == 0 && self.switch_depth == 0 {
            return Err(self.error(SyntaxErrorKind::BreakOutsideLoop));
        }
        self.match_literal("break")?;
        self.match_literal(";")?;
        Ok(Stmt::Break)
    }

    fn continue_statement(&mut self) -> ParseRes<Stmt> {
        if self.loop_depth == 0 {
            return Err(self.error(SyntaxErrorKind::ContinueOutsideLoop));
        }
        self.match_literal("continue")?;
        self.match_literal(";")?;
        Ok(Stmt::Continue)
    }

    fn empty_statement(&mut self) -> ParseRes<Stmt> {
        self.match_literal(";")?;
        Ok(Stmt::Empty)
    }
}
