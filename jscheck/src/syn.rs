//! Statement-level outline of a parsed program.
//!
//! The parser checks expressions but does not build trees for them. What it returns on success is
//! this outline: which production each statement was recognized as, and how statements nest.

use std::fmt::{self, Display, Formatter};

use crate::span::Spanned;

/// A successfully parsed program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    pub elements: Vec<SourceElement>,
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for element in &self.elements {
            writeln!(f, "{element}")?;
        }
        Ok(())
    }
}

/// A top-level program element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceElement {
    Function(Function),
    Stmt(Stmt),
}

impl Display for SourceElement {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            SourceElement::Function(fun) => Display::fmt(fun, f),
            SourceElement::Stmt(stmt) => Display::fmt(stmt, f),
        }
    }
}

/// A function declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: Spanned<String>,
    pub params: Vec<Spanned<String>>,
    pub body: Vec<Stmt>,

    /// Whether the body ends in a `return` statement.
    pub returns: bool,
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "function {}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") ")?;

        let mut items: Vec<String> = self.body.iter().map(Stmt::to_string).collect();
        if self.returns {
            items.push("return;".into());
        }
        write_braced(f, &items)
    }
}

/// A statement, as recognized by the statement dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Block(Vec<Stmt>),

    /// A `var` statement, with the declared names.
    Var(Vec<Spanned<String>>),

    If {
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },

    While(Box<Stmt>),

    For(Box<Stmt>),

    Switch(Vec<CaseClause>),

    Break,

    Continue,

    Empty,

    Expr(ExprStmt),
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Stmt::Block(stmts) => {
                let items: Vec<String> = stmts.iter().map(Stmt::to_string).collect();
                write_braced(f, &items)
            }
            Stmt::Var(names) => {
                write!(f, "var ")?;
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}")?;
                }
                write!(f, ";")
            }
            Stmt::If { then, otherwise } => {
                write!(f, "if (..) {then}")?;
                if let Some(otherwise) = otherwise {
                    write!(f, " else {otherwise}")?;
                }
                Ok(())
            }
            Stmt::While(body) => write!(f, "while (..) {body}"),
            Stmt::For(body) => write!(f, "for (..) {body}"),
            Stmt::Switch(clauses) => {
                let items: Vec<String> = clauses.iter().map(CaseClause::to_string).collect();
                write!(f, "switch (..) ")?;
                write_braced(f, &items)
            }
            Stmt::Break => write!(f, "break;"),
            Stmt::Continue => write!(f, "continue;"),
            Stmt::Empty => write!(f, ";"),
            Stmt::Expr(kind) => write!(f, "{kind};"),
        }
    }
}

/// A `case` or `default` clause of a switch statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseClause {
    /// `false` for the `default` clause.
    pub is_case: bool,
    pub body: Vec<Stmt>,
}

impl Display for CaseClause {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.is_case {
            write!(f, "case ..:")?;
        } else {
            write!(f, "default:")?;
        }
        for stmt in &self.body {
            write!(f, " {stmt}")?;
        }
        Ok(())
    }
}

/// The five forms an expression statement can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprStmt {
    /// `a.b(..)`
    MethodCall,

    /// `f(..)`
    FunctionCall,

    /// `new C(..)`
    Allocation,

    /// `a = ..`, `a.b += ..`
    Assignment,

    /// `a++`, `--a.b`
    Update,
}

impl Display for ExprStmt {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let s = match self {
            ExprStmt::MethodCall => "method-call",
            ExprStmt::FunctionCall => "call",
            ExprStmt::Allocation => "new",
            ExprStmt::Assignment => "assign",
            ExprStmt::Update => "update",
        };
        f.write_str(s)
    }
}

/// Write `{}` or `{ a b c }`.
fn write_braced(f: &mut Formatter, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return write!(f, "{{}}");
    }
    write!(f, "{{")?;
    for item in items {
        write!(f, " {item}")?;
    }
    write!(f, " }}")
}
