//! Passive AST data model: expression and statement node variants.
//!
//! Both families are *closed* enums, so the resolver, interpreter, and
//! printer are exhaustive matches — adding a node kind forces every consumer
//! to handle it at compile time.
//!
//! Lifetime `'a` ties nodes that contain token references back to the
//! borrowed token slice held by the parser.

use std::rc::Rc;

use crate::token::Token;

/// Identity of a single *occurrence* of a `Variable`/`Assign`/`This`/`Super`
/// node, allocated by the parser.  The resolver keys binding distances on
/// this id, so two syntactically identical sub-expressions at different
/// source positions resolve independently.
///
/// Ids are unique within one parser; a REPL threads the counter across lines
/// so entries recorded for earlier lines stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// A **literal constant** that appears directly in the source code.
///
/// These variants are the *terminal leaves* of the expression tree and
/// therefore do **not** retain a reference to the originating [`Token`].
/// The parser copies (or converts) the value at parse‑time.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    /// Integral lexemes such as `"3"` are still parsed as `3.0`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// The boolean constant `true`.
    True,

    /// The boolean constant `false`.
    False,

    /// The `nil` literal.
    Nil,
}

/// A function declaration: named when it comes from a `fun` statement or a
/// class method, anonymous (`name: None`) when it comes from a lambda
/// expression.  Shared via `Rc` so runtime function values own the
/// declaration without cloning the body.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl<'a> {
    /// Declared name; `None` for lambda expressions.
    pub name: Option<&'a Token<'a>>,

    /// Parameter name tokens (arity ≤ 255, enforced by the parser).
    pub params: Vec<&'a Token<'a>>,

    /// Body executed when the function is called.
    pub body: Vec<Stmt<'a>>,
}

impl<'a> FunctionDecl<'a> {
    /// Display name for diagnostics and `Display` on function values.
    pub fn name_str(&self) -> &str {
        self.name.map_or("lambda", |t| t.lexeme)
    }
}

/// **Abstract‑syntax‑tree node** representing every kind of *expression*.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr<'a>>),

    /// Prefix unary operator expression, e.g. `!isReady` or `-42`.
    Unary {
        /// The operator token (`!` or `-`).
        operator: &'a Token<'a>,
        /// Operand to which the operator is applied.
        right: Box<Expr<'a>>,
    },

    /// Infix binary operator expression, e.g. `a + b`, `x <= y`.
    Binary {
        left: Box<Expr<'a>>,
        /// Operator token such as `+`, `*`, `==`, …
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Short‑circuiting logical operators `and` / `or`.
    Logical {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>, // `AND` or `OR`
        right: Box<Expr<'a>>,
    },

    /// Variable access ‑ resolves to the identifier's current value.
    Variable {
        id: NodeId,
        name: &'a Token<'a>,
    },

    /// Assignment expression: `identifier "=" expression`.
    Assign {
        id: NodeId,
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    /// Function‑ or method‑call expression, e.g. `clock()` or `add(1, 2)`.
    Call {
        /// Expression that evaluates to a callable (variable, property, etc.).
        callee: Box<Expr<'a>>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: &'a Token<'a>,
        /// Argument list (may be empty).
        arguments: Vec<Expr<'a>>,
    },

    /// Property read: `object.property`.
    Get {
        object: Box<Expr<'a>>,
        name: &'a Token<'a>,
    },

    /// Property write: `object.property = value`.
    Set {
        object: Box<Expr<'a>>,
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    /// The `this` keyword inside a method.
    This {
        id: NodeId,
        keyword: &'a Token<'a>,
    },

    /// `super.method` inside a subclass method.
    Super {
        id: NodeId,
        keyword: &'a Token<'a>,
        method: &'a Token<'a>,
    },

    /// Anonymous function expression: `fun (params) { … }`.
    Lambda(Rc<FunctionDecl<'a>>),
}

/// **Abstract‑syntax‑tree node** for *statements* (complete executable
/// constructs).  A program is a sequence of these nodes returned by the
/// parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<'a> {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr<'a>),

    /// `print` statement used for output.
    Print(Expr<'a>),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: &'a Token<'a>,
        initializer: Option<Expr<'a>>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt<'a>>),

    /// `if` / `else` conditional.
    If {
        condition: Expr<'a>,
        then_branch: Box<Stmt<'a>>,
        else_branch: Option<Box<Stmt<'a>>>,
    },

    /// `while` loop.  `for` loops desugar to this wrapped in a block.
    While {
        condition: Expr<'a>,
        body: Box<Stmt<'a>>,
    },

    /// `break;` — terminates the nearest enclosing loop.
    Break { keyword: &'a Token<'a> },

    /// `continue;` — skips to the next iteration of the nearest loop.
    Continue { keyword: &'a Token<'a> },

    /// Function declaration ‑ becomes a first‑class callable value.
    Function(Rc<FunctionDecl<'a>>),

    /// `return` statement inside a function body.
    Return {
        /// The `return` keyword token (for error locations).
        keyword: &'a Token<'a>,

        /// Optional expression to return.  Absent ⇒ `nil` is returned.
        value: Option<Expr<'a>>,
    },

    /// Class declaration with an optional superclass (a `Variable` node)
    /// and a list of method declarations.
    Class {
        name: &'a Token<'a>,
        superclass: Option<Expr<'a>>,
        methods: Vec<Rc<FunctionDecl<'a>>>,
    },
}
