//! Expression grammar.
//!
//! Expressions are checked but not built. Each rule reports the [`Shape`] of what it recognized,
//! which is all the statement grammar and the assignment checks need to know.

// expr -> assignment
//
// assignment -> conditional ( assign_op assignment )?
//
// assign_op -> '=' | '+=' | '-=' | '*=' | '/=' | '%='
//
// conditional -> logic_or ( '?' assignment ':' assignment )?
//
// logic_or -> logic_and ( '||' logic_and )*
//
// logic_and -> equality ( '&&' equality )*
//
// equality -> relational ( ( '==' | '!=' | '===' | '!==' ) relational )*
//
// relational -> additive ( ( '<' | '<=' | '>' | '>=' ) additive )*
//
// additive -> multiplicative ( ( '+' | '-' ) multiplicative )*
//
// multiplicative -> unary ( ( '*' | '/' | '%' ) unary )*
//
// unary -> ( '!' | '-' | '+' | 'typeof' ) unary
//        | ( '++' | '--' ) unary
//        | postfix
//
// postfix -> call_member ( '++' | '--' )?
//
// call_member -> primary ( '.' IDENT | '[' expr ']' | arguments )*
//
// arguments -> '(' ( expr ( ',' expr )* )? ')'
//
// primary -> IDENT | NUMBER | STRING | 'true' | 'false' | 'null' | 'this'
//          | '(' expr ')'
//          | '[' ( expr ( ',' expr )* )? ']'
//          | 'new' IDENT arguments

use log::trace;

use super::{Expected, Pair, ParseRes, Parser, SyntaxErrorKind};
use crate::syn::ExprStmt;
use crate::tok::{TokenKind, TokenSource};

const ASSIGN_OPS: &[&str] = &["=", "+=", "-=", "*=", "/=", "%="];
const UPDATE_OPS: &[&str] = &["++", "--"];
const UNARY_OPS: &[&str] = &["!", "-", "+", "typeof"];

/// What an expression rule recognized, as far as the enclosing rules care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Shape {
    /// A bare identifier.
    Name,

    /// `a.b` or `a[b]`.
    Member,

    /// A call whose callee is not a member access.
    Call,

    /// A call whose callee is a member access.
    MethodCall,

    /// `new C(..)`, with no accessors after it.
    New,

    /// Anything else.
    Value,
}

impl Shape {
    /// Can this be assigned to, or incremented?
    pub(super) fn is_place(self) -> bool {
        matches!(self, Shape::Name | Shape::Member)
    }
}

/// Expression statements.
impl<S: TokenSource> Parser<S> {
    /// Parse an expression statement.
    ///
    /// All five statement forms share the `call_member` prefix, so it is parsed once and the form
    /// is decided by its shape and the token after it.
    pub(super) fn expression_statement(&mut self) -> ParseRes<ExprStmt> {
        let kind = if self.check_any(UPDATE_OPS) {
            let op = self.advance();
            if !self.call_member()?.is_place() {
                return Err(self.error_at(SyntaxErrorKind::InvalidUpdateTarget, &op));
            }
            ExprStmt::Update
        } else {
            let prefix = self.call_member()?;
            self.expression_statement_rest(prefix)?
        };

        trace!("= expression statement: {kind}");
        self.match_literal(";")?;
        Ok(kind)
    }

    fn expression_statement_rest(&mut self, prefix: Shape) -> ParseRes<ExprStmt> {
        if self.check_any(ASSIGN_OPS) {
            if !prefix.is_place() {
                return Err(self.error(SyntaxErrorKind::InvalidAssignTarget));
            }
            self.advance();
            self.expression()?;
            return Ok(ExprStmt::Assignment);
        }

        if self.check_any(UPDATE_OPS) {
            if !prefix.is_place() {
                return Err(self.error(SyntaxErrorKind::InvalidUpdateTarget));
            }
            self.advance();
            return Ok(ExprStmt::Update);
        }

        match prefix {
            Shape::Call => Ok(ExprStmt::FunctionCall),
            Shape::MethodCall => Ok(ExprStmt::MethodCall),
            Shape::New => Ok(ExprStmt::Allocation),
            Shape::Name | Shape::Member | Shape::Value => {
                Err(self.error(SyntaxErrorKind::NotAStatement))
            }
        }
    }
}

/// Expressions, loosest-binding first.
impl<S: TokenSource> Parser<S> {
    pub(super) fn expression(&mut self) -> ParseRes<Shape> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseRes<Shape> {
        let target = self.conditional()?;
        if !self.check_any(ASSIGN_OPS) {
            return Ok(target);
        }

        if !target.is_place() {
            return Err(self.error(SyntaxErrorKind::InvalidAssignTarget));
        }
        self.advance();
        self.assignment()?;
        Ok(Shape::Value)
    }

    fn conditional(&mut self) -> ParseRes<Shape> {
        let test = self.logic_or()?;
        if self.eat("?").is_none() {
            return Ok(test);
        }

        self.assignment()?;
        self.match_literal(":")?;
        self.assignment()?;
        Ok(Shape::Value)
    }

    fn binop_chain_left_assoc(
        &mut self,
        operand: impl Fn(&mut Self) -> ParseRes<Shape>,
        ops: &[&str],
    ) -> ParseRes<Shape> {
        let mut shape = operand(self)?;
        while self.check_any(ops) {
            self.advance();
            operand(self)?;
            shape = Shape::Value;
        }
        Ok(shape)
    }

    fn logic_or(&mut self) -> ParseRes<Shape> {
        self.binop_chain_left_assoc(Self::logic_and, &["||"])
    }

    fn logic_and(&mut self) -> ParseRes<Shape> {
        self.binop_chain_left_assoc(Self::equality, &["&&"])
    }

    fn equality(&mut self) -> ParseRes<Shape> {
        self.binop_chain_left_assoc(Self::relational, &["==", "!=", "===", "!=="])
    }

    fn relational(&mut self) -> ParseRes<Shape> {
        self.binop_chain_left_assoc(Self::additive, &["<", "<=", ">", ">="])
    }

    fn additive(&mut self) -> ParseRes<Shape> {
        self.binop_chain_left_assoc(Self::multiplicative, &["+", "-"])
    }

    fn multiplicative(&mut self) -> ParseRes<Shape> {
        self.binop_chain_left_assoc(Self::unary, &["*", "/", "%"])
    }

    fn unary(&mut self) -> ParseRes<Shape> {
        if self.check_any(UNARY_OPS) {
            self.advance();
            self.unary()?;
            return Ok(Shape::Value);
        }

        if self.check_any(UPDATE_OPS) {
            let op = self.advance();
            if !self.unary()?.is_place() {
                return Err(self.error_at(SyntaxErrorKind::InvalidUpdateTarget, &op));
            }
            return Ok(Shape::Value);
        }

        self.postfix()
    }

    fn postfix(&mut self) -> ParseRes<Shape> {
        let operand = self.call_member()?;
        if !self.check_any(UPDATE_OPS) {
            return Ok(operand);
        }

        if !operand.is_place() {
            return Err(self.error(SyntaxErrorKind::InvalidUpdateTarget));
        }
        self.advance();
        Ok(Shape::Value)
    }

    pub(super) fn call_member(&mut self) -> ParseRes<Shape> {
        let mut shape = self.primary()?;
        loop {
            shape = if self.eat(".").is_some() {
                self.match_type(TokenKind::Ident)?;
                Shape::Member
            } else if self.check("[") {
                let open = self.advance().span;
                self.expression()?;
                self.match_close(Pair::Brackets, open)?;
                Shape::Member
            } else if self.check("(") {
                self.arguments()?;
                if shape == Shape::Member {
                    Shape::MethodCall
                } else {
                    Shape::Call
                }
            } else {
                return Ok(shape);
            };
        }
    }

    pub(super) fn arguments(&mut self) -> ParseRes<()> {
        let open = self.match_literal("(")?.span;
        self.expression_list(")")?;
        self.match_close(Pair::Parens, open)?;
        Ok(())
    }

    /// Comma-separated expressions up to, but not including, `close`.
    fn expression_list(&mut self, close: &str) -> ParseRes<()> {
        if self.check(close) {
            return Ok(());
        }

        self.expression()?;
        while self.eat(",").is_some() {
            self.expression()?;
        }
        Ok(())
    }

    fn primary(&mut self) -> ParseRes<Shape> {
        if self.look.kind == TokenKind::Ident {
            self.advance();
            return Ok(Shape::Name);
        }

        if self.look.kind.is_literal() || self.check("this") {
            self.advance();
            return Ok(Shape::Value);
        }

        if self.check("new") {
            return self.allocation();
        }

        if self.check("(") {
            let open = self.advance().span;
            self.expression()?;
            self.match_close(Pair::Parens, open)?;
            return Ok(Shape::Value);
        }

        if self.check("[") {
            let open = self.advance().span;
            self.expression_list("]")?;
            self.match_close(Pair::Brackets, open)?;
            return Ok(Shape::Value);
        }

        Err(self.unexpected(Expected::Expression))
    }

    fn allocation(&mut self) -> ParseRes<Shape> {
        self.match_literal("new")?;
        self.match_type(TokenKind::Ident)?;
        self.arguments()?;
        Ok(Shape::New)
    }
}
